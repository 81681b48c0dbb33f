//! Extract eligibility records from free-form model text.
//!
//! Payload location, in priority order:
//! 1. a fenced block tagged `json`
//! 2. any fenced block whose body is a JSON object
//! 3. the first balanced `{ ... }` region anywhere in the text

use std::collections::HashSet;

use schemefinder_core::EligibilityRecord;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, trace};

const FENCE: &str = "```";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("no JSON payload found in model response")]
    NoPayload,

    #[error("malformed JSON payload: {0}")]
    Malformed(String),

    #[error("unexpected payload shape: {0}")]
    InvalidShape(String),
}

/// Parse the `schemes` array out of `raw`.
///
/// An object without a `schemes` field yields an empty list, not an error.
pub fn extract(raw: &str) -> Result<Vec<EligibilityRecord>, ExtractError> {
    let payload = locate_payload(raw).ok_or(ExtractError::NoPayload)?;
    trace!(payload_len = payload.len(), "Located JSON payload");

    let value: Value =
        serde_json::from_str(payload).map_err(|e| ExtractError::Malformed(e.to_string()))?;

    let schemes = match value {
        Value::Object(mut object) => match object.remove("schemes") {
            None | Some(Value::Null) => return Ok(Vec::new()),
            Some(Value::Array(items)) => items,
            Some(other) => {
                return Err(ExtractError::InvalidShape(format!(
                    "`schemes` must be an array, found {}",
                    json_kind(&other)
                )));
            }
        },
        _ => return Ok(Vec::new()),
    };

    // Entries that are not objects are dropped; the rest decode leniently.
    let records: Vec<EligibilityRecord> = schemes
        .into_iter()
        .filter_map(|item| match item {
            Value::Object(_) => serde_json::from_value(item).ok(),
            other => {
                trace!(kind = json_kind(&other), "Skipping non-object scheme entry");
                None
            }
        })
        .collect();

    let normalized = normalize(records);
    debug!(records = normalized.len(), "Extracted schemes from model response");
    Ok(normalized)
}

/// The substring to parse, or `None` when the text holds no object at all.
pub fn locate_payload(raw: &str) -> Option<&str> {
    let fences = fences(raw);

    fences
        .iter()
        .find(|f| f.info.eq_ignore_ascii_case("json"))
        .map(|f| f.body)
        .or_else(|| fences.iter().find(|f| f.body.starts_with('{')).map(|f| f.body))
        .or_else(|| first_object(raw))
}

struct Fence<'a> {
    info: &'a str,
    body: &'a str,
}

/// All closed fenced blocks, in order of appearance.
fn fences(text: &str) -> Vec<Fence<'_>> {
    let mut out = Vec::new();
    let mut rest = text;

    while let Some(open) = rest.find(FENCE) {
        let after = &rest[open + FENCE.len()..];
        let Some(close) = after.find(FENCE) else {
            break;
        };
        let inner = &after[..close];

        // The info string is the remainder of the opening line, unless the
        // payload itself starts on that line.
        let (info, body) = match inner.find('\n') {
            Some(nl) if !inner[..nl].trim_start().starts_with('{') => {
                (&inner[..nl], &inner[nl + 1..])
            }
            _ => ("", inner),
        };
        out.push(Fence {
            info: info.trim(),
            body: body.trim(),
        });

        rest = &after[close + FENCE.len()..];
    }

    out
}

/// First balanced brace region, skipping braces inside JSON strings.
fn first_object(text: &str) -> Option<&str> {
    text.match_indices('{')
        .find_map(|(start, _)| balanced_from(text, start))
}

fn balanced_from(text: &str, start: usize) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }

    None
}

/// Trim fields, drop nameless records, and make ids present and unique.
fn normalize(records: Vec<EligibilityRecord>) -> Vec<EligibilityRecord> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(records.len());

    for mut record in records {
        record.name = record.name.trim().to_string();
        if record.name.is_empty() {
            continue;
        }
        record.description = record.description.trim().to_string();
        record.category = record.category.trim().to_string();
        record.link = record.link.trim().to_string();
        record.eligibility_criteria.retain(|c| !c.trim().is_empty());
        record.application_process = record
            .application_process
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());

        let base = match record.id.trim() {
            "" => slugify(&record.name),
            id => id.to_string(),
        };
        let mut id = base.clone();
        let mut n = 2;
        while !seen.insert(id.clone()) {
            id = format!("{base}-{n}");
            n += 1;
        }
        record.id = id;

        out.push(record);
    }

    out
}

fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    let slug = slug.trim_end_matches('-').to_string();
    if slug.is_empty() { "scheme".into() } else { slug }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
