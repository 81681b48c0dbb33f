//! Eligibility records and the outcome returned to callers.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One candidate government program.
///
/// Field names follow the JSON schema the model is asked to produce, so the
/// same type is used for parsing model output and for serving results.
///
/// Text fields accept any JSON scalar (stringified); `null` and nested
/// values become empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityRecord {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,

    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,

    #[serde(default, deserialize_with = "lenient_string")]
    pub description: String,

    #[serde(default, deserialize_with = "lenient_string")]
    pub category: String,

    #[serde(default, deserialize_with = "lenient_list")]
    pub eligibility_criteria: Vec<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub link: String,

    #[serde(
        default,
        deserialize_with = "lenient_optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub application_process: Option<String>,
}

fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(scalar_text(Value::deserialize(deserializer)?).unwrap_or_default())
}

fn lenient_optional<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Ok(scalar_text(Value::deserialize(deserializer)?).filter(|s| !s.trim().is_empty()))
}

/// An array keeps its scalar items; a lone scalar becomes a one-item list.
fn lenient_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items.into_iter().filter_map(scalar_text).collect(),
        other => scalar_text(other).into_iter().collect(),
    })
}

/// The sole value handed back by a retrieval.
///
/// `used_fallback` is true whenever any record was synthesized locally; it is
/// never true when every record came from a parsed model response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrievalOutcome {
    pub records: Vec<EligibilityRecord>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<String>,

    pub used_fallback: bool,
}

impl RetrievalOutcome {
    /// Records parsed from a real model answer.
    pub fn real(records: Vec<EligibilityRecord>) -> Self {
        Self {
            records,
            diagnostic: None,
            used_fallback: false,
        }
    }

    /// Synthesized records, with the notice explaining why.
    pub fn fallback(records: Vec<EligibilityRecord>, diagnostic: impl Into<String>) -> Self {
        Self {
            records,
            diagnostic: Some(diagnostic.into()),
            used_fallback: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_uses_camel_case_fields() {
        let record = EligibilityRecord {
            id: "pm-kisan".into(),
            name: "PM-KISAN".into(),
            description: "Income support".into(),
            category: "Agriculture".into(),
            eligibility_criteria: vec!["Small farmer".into()],
            link: "https://pmkisan.gov.in/".into(),
            application_process: Some("Apply online".into()),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["eligibilityCriteria"][0], "Small farmer");
        assert_eq!(json["applicationProcess"], "Apply online");
    }

    #[test]
    fn missing_optional_fields_default() {
        let record: EligibilityRecord =
            serde_json::from_str(r#"{"name":"Only a name"}"#).unwrap();
        assert_eq!(record.name, "Only a name");
        assert!(record.id.is_empty());
        assert!(record.eligibility_criteria.is_empty());
        assert!(record.application_process.is_none());
    }

    #[test]
    fn loosely_typed_fields_are_accepted() {
        let record: EligibilityRecord = serde_json::from_str(
            r#"{"id":1,"name":"National Scholarship","link":null,"category":true,
                "eligibilityCriteria":["Student",2,null],"applicationProcess":null}"#,
        )
        .unwrap();
        assert_eq!(record.id, "1");
        assert_eq!(record.name, "National Scholarship");
        assert!(record.link.is_empty());
        assert_eq!(record.category, "true");
        assert_eq!(record.eligibility_criteria, vec!["Student", "2"]);
        assert!(record.application_process.is_none());
    }

    #[test]
    fn single_criterion_string_becomes_list() {
        let record: EligibilityRecord =
            serde_json::from_str(r#"{"name":"X","eligibilityCriteria":"Resident","description":{"text":"nested"}}"#)
                .unwrap();
        assert_eq!(record.eligibility_criteria, vec!["Resident"]);
        assert!(record.description.is_empty());
    }

    #[test]
    fn outcome_constructors_set_flag() {
        let real = RetrievalOutcome::real(vec![]);
        assert!(!real.used_fallback);
        assert!(real.diagnostic.is_none());

        let fb = RetrievalOutcome::fallback(vec![], "upstream down");
        assert!(fb.used_fallback);
        assert_eq!(fb.diagnostic.as_deref(), Some("upstream down"));

        let json = serde_json::to_value(&fb).unwrap();
        assert_eq!(json["usedFallback"], true);
    }
}
