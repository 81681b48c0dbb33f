//! Profile → prompt projection.
//!
//! The label constants are shared with [`crate::signals`], which reads the
//! same lines back out of a prompt.

use schemefinder_core::Profile;

pub const STATE_LABEL: &str = "State/UT:";
pub const GENDER_LABEL: &str = "Gender:";
pub const INCOME_LABEL: &str = "Annual Income:";
pub const AGE_LABEL: &str = "Age:";

/// Currency prefix written before the income figure.
pub const CURRENCY_SYMBOL: &str = "₹";

pub const MIN_RESULTS: usize = 3;
pub const MAX_RESULTS: usize = 5;

const OUTPUT_SCHEMA: &str = r#"{
  "schemes": [
    {
      "id": "unique-id",
      "name": "Scheme Name",
      "description": "Description of the scheme",
      "category": "Category Name",
      "eligibilityCriteria": ["Criterion 1", "Criterion 2"],
      "link": "https://scheme-website.gov",
      "applicationProcess": "How to apply (optional)"
    }
  ]
}"#;

/// Render the prompt for `profile`. Pure: same profile, same text.
pub fn project(profile: &Profile) -> String {
    format!(
        "You are a government scheme eligibility assistant. Your task is to identify eligible government schemes based on the following user information.

User Information:
- {STATE_LABEL} {state}
- {GENDER_LABEL} {gender}
- {INCOME_LABEL} {CURRENCY_SYMBOL}{income}
- {AGE_LABEL} {age} years

Please return only schemes that this person is likely eligible for based on the provided information.
For each scheme, include:
1. Name of the scheme
2. Brief description (2-3 sentences)
3. Eligibility criteria met by the user
4. Category (Education, Health, Employment, Agriculture, etc.)
5. Official website link
6. Application process, if known

Return at least {MIN_RESULTS} and at most {MAX_RESULTS} schemes. If fewer than {MIN_RESULTS} schemes clearly match, include the closest matches and state in the eligibility criteria which requirement may not be met.

Format your response as structured JSON in exactly this format, using these field names:
{OUTPUT_SCHEMA}
",
        state = profile.state(),
        gender = profile.gender(),
        income = profile.income(),
        age = profile.age(),
    )
}
