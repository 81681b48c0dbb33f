//! The user profile submitted for an eligibility check.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Youngest age accepted by the pipeline.
pub const MIN_AGE: u8 = 1;
/// Oldest age accepted by the pipeline.
pub const MAX_AGE: u8 = 120;

/// A validated user profile.
///
/// Fields are private so a `Profile` can only exist once it has passed
/// validation; it is never mutated after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawProfile")]
pub struct Profile {
    state: String,
    gender: String,
    income: u64,
    age: u8,
}

/// Wire form used for deserialization before validation.
#[derive(Deserialize)]
struct RawProfile {
    state: String,
    gender: String,
    income: u64,
    age: u8,
}

impl TryFrom<RawProfile> for Profile {
    type Error = Error;

    fn try_from(raw: RawProfile) -> Result<Self> {
        Profile::new(raw.state, raw.gender, raw.income, raw.age)
    }
}

impl Profile {
    /// Build a profile, rejecting out-of-range ages and blank text fields.
    pub fn new(
        state: impl Into<String>,
        gender: impl Into<String>,
        income: u64,
        age: u8,
    ) -> Result<Self> {
        let state = state.into().trim().to_string();
        let gender = gender.into().trim().to_string();

        if state.is_empty() {
            return Err(Error::InvalidProfile("state must not be empty".into()));
        }
        if gender.is_empty() {
            return Err(Error::InvalidProfile("gender must not be empty".into()));
        }
        if !(MIN_AGE..=MAX_AGE).contains(&age) {
            return Err(Error::InvalidProfile(format!(
                "age must be between {MIN_AGE} and {MAX_AGE}, got {age}"
            )));
        }

        Ok(Self {
            state,
            gender,
            income,
            age,
        })
    }

    pub fn state(&self) -> &str {
        &self.state
    }

    pub fn gender(&self) -> &str {
        &self.gender
    }

    /// Annual income in whole rupees.
    pub fn income(&self) -> u64 {
        self.income
    }

    pub fn age(&self) -> u8 {
        self.age
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_profile_is_trimmed() {
        let p = Profile::new("  Maharashtra ", "Female", 250_000, 25).unwrap();
        assert_eq!(p.state(), "Maharashtra");
        assert_eq!(p.gender(), "Female");
        assert_eq!(p.income(), 250_000);
        assert_eq!(p.age(), 25);
    }

    #[test]
    fn age_bounds_enforced() {
        assert!(Profile::new("Kerala", "Male", 0, 0).is_err());
        assert!(Profile::new("Kerala", "Male", 0, 121).is_err());
        assert!(Profile::new("Kerala", "Male", 0, 1).is_ok());
        assert!(Profile::new("Kerala", "Male", 0, 120).is_ok());
    }

    #[test]
    fn blank_fields_rejected() {
        let err = Profile::new("   ", "Male", 10, 40).unwrap_err();
        assert!(matches!(err, Error::InvalidProfile(_)));
        assert!(Profile::new("Goa", "", 10, 40).is_err());
    }

    #[test]
    fn deserialization_validates() {
        let ok: Profile = serde_json::from_str(
            r#"{"state":"Goa","gender":"Other","income":120000,"age":70}"#,
        )
        .unwrap();
        assert_eq!(ok.age(), 70);

        let bad = serde_json::from_str::<Profile>(
            r#"{"state":"Goa","gender":"Other","income":120000,"age":0}"#,
        );
        assert!(bad.is_err());
    }

    #[test]
    fn negative_income_is_not_representable() {
        let bad = serde_json::from_str::<Profile>(
            r#"{"state":"Goa","gender":"Other","income":-5,"age":30}"#,
        );
        assert!(bad.is_err());
    }
}
