//! Profile-derived signals that drive fallback synthesis.
//!
//! Normally built straight from the [`Profile`]. [`ProfileSignals::scan`]
//! recovers the same values from a prompt produced by [`crate::prompt::project`]
//! for callers that only kept the prompt text.

use schemefinder_core::Profile;

use crate::prompt::{AGE_LABEL, CURRENCY_SYMBOL, GENDER_LABEL, INCOME_LABEL, STATE_LABEL};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileSignals {
    pub state: Option<String>,
    pub gender: Option<String>,
    /// Annual income in whole rupees.
    pub income: Option<u64>,
    pub age: Option<u32>,
}

impl From<&Profile> for ProfileSignals {
    fn from(profile: &Profile) -> Self {
        Self {
            state: Some(profile.state().to_string()),
            gender: Some(profile.gender().to_string()),
            income: Some(profile.income()),
            age: Some(u32::from(profile.age())),
        }
    }
}

impl ProfileSignals {
    /// Read signals back out of projected prompt text.
    ///
    /// Lines that are missing or unparsable leave their field as `None`.
    pub fn scan(prompt: &str) -> Self {
        Self {
            state: labelled_value(prompt, STATE_LABEL).map(str::to_string),
            gender: labelled_value(prompt, GENDER_LABEL).map(str::to_string),
            income: labelled_value(prompt, INCOME_LABEL).and_then(parse_income),
            age: labelled_value(prompt, AGE_LABEL).and_then(leading_number),
        }
    }
}

/// Value of the first `- Label: value` (or `Label: value`) line.
fn labelled_value<'a>(text: &'a str, label: &str) -> Option<&'a str> {
    text.lines().find_map(|line| {
        let line = line.trim_start();
        let line = line.strip_prefix("- ").unwrap_or(line);
        line.strip_prefix(label)
            .map(str::trim)
            .filter(|v| !v.is_empty())
    })
}

fn parse_income(value: &str) -> Option<u64> {
    let value = value.strip_prefix(CURRENCY_SYMBOL).unwrap_or(value).trim();
    let digits: String = value.replace(',', "");
    leading_number(&digits)
}

fn leading_number<T: std::str::FromStr>(value: &str) -> Option<T> {
    let end = value
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(value.len());
    value[..end].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::project;

    #[test]
    fn scan_matches_profile_signals() {
        let profile = Profile::new("Maharashtra", "Female", 250_000, 25).unwrap();
        assert_eq!(
            ProfileSignals::scan(&project(&profile)),
            ProfileSignals::from(&profile)
        );
    }

    #[test]
    fn scan_handles_grouped_income() {
        let text = "- State/UT: Goa\n- Annual Income: ₹2,50,000\n- Age: 61 years\n";
        let signals = ProfileSignals::scan(text);
        assert_eq!(signals.state.as_deref(), Some("Goa"));
        assert_eq!(signals.income, Some(250_000));
        assert_eq!(signals.age, Some(61));
        assert_eq!(signals.gender, None);
    }

    #[test]
    fn unparsable_values_are_none() {
        let text = "State/UT:\nAnnual Income: ₹unknown\nAge: n/a\n";
        assert_eq!(ProfileSignals::scan(text), ProfileSignals::default());
    }

    #[test]
    fn unrelated_text_yields_nothing() {
        assert_eq!(
            ProfileSignals::scan("no labels here at all"),
            ProfileSignals::default()
        );
    }
}
