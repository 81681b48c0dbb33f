//! Deterministic fallback records keyed on profile signals.
//!
//! Output order is fixed: the three base records, then each rule that fires in
//! table order (region, youth, senior, low income).

use schemefinder_core::EligibilityRecord;

use crate::signals::ProfileSignals;

/// State that has a dedicated housing record.
pub const HOUSING_REGION: &str = "Maharashtra";
/// Strictly below this age the skills record is added.
pub const YOUTH_AGE_LIMIT: u32 = 30;
/// Strictly above this age the pension record is added.
pub const SENIOR_AGE_LIMIT: u32 = 60;
/// Strictly below this annual income (₹) the microfinance record is added.
pub const LOW_INCOME_LIMIT: u64 = 300_000;

/// Build the fallback record set. Never fails.
pub fn synthesize(signals: &ProfileSignals) -> Vec<EligibilityRecord> {
    let mut records = base_records();

    if signals
        .state
        .as_deref()
        .is_some_and(|s| s.trim().eq_ignore_ascii_case(HOUSING_REGION))
    {
        records.push(regional_housing());
    }

    if let Some(age) = signals.age {
        if age < YOUTH_AGE_LIMIT {
            records.push(youth_skills());
        }
        if age > SENIOR_AGE_LIMIT {
            records.push(senior_pension());
        }
    }

    if signals.income.is_some_and(|income| income < LOW_INCOME_LIMIT) {
        records.push(microfinance());
    }

    records
}

fn record(
    id: &str,
    name: &str,
    description: &str,
    category: &str,
    criteria: &[&str],
    link: &str,
    application_process: &str,
) -> EligibilityRecord {
    EligibilityRecord {
        id: id.into(),
        name: name.into(),
        description: description.into(),
        category: category.into(),
        eligibility_criteria: criteria.iter().map(|c| c.to_string()).collect(),
        link: link.into(),
        application_process: Some(application_process.into()),
    }
}

/// Agriculture income support, health insurance, clean cooking energy.
pub fn base_records() -> Vec<EligibilityRecord> {
    vec![
        record(
            "pm-kisan",
            "PM-KISAN",
            "Pradhan Mantri Kisan Samman Nidhi provides income support to farmers. Eligible farmers receive up to ₹6,000 per year in three equal installments.",
            "Agriculture",
            &["Small and marginal farmer", "Income below threshold"],
            "https://pmkisan.gov.in/",
            "Register through the PM-KISAN portal or at a Common Service Centre with Aadhaar and land records.",
        ),
        record(
            "pmjay",
            "Ayushman Bharat (PM-JAY)",
            "Provides health insurance coverage of ₹5 lakh per family per year for secondary and tertiary care hospitalization. Covers poor and vulnerable families identified through socio-economic criteria.",
            "Health",
            &["Income below poverty line", "No existing health coverage"],
            "https://pmjay.gov.in/",
            "Check eligibility on the PM-JAY portal and collect an Ayushman card at an empanelled hospital.",
        ),
        record(
            "pmuy",
            "Pradhan Mantri Ujjwala Yojana",
            "Provides LPG connections to women from below poverty line households. Aims to replace unclean cooking fuels with clean and efficient LPG.",
            "Energy",
            &["Below poverty line household", "No existing LPG connection"],
            "https://pmuy.gov.in/",
            "Apply at the nearest LPG distributor with a KYC form and proof of household status.",
        ),
    ]
}

fn regional_housing() -> EligibilityRecord {
    record(
        "maha-awas-yojana",
        "Maharashtra Awas Yojana",
        "Housing scheme for low-income residents of Maharashtra. Provides affordable housing and subsidies for construction.",
        "Housing",
        &["Maharashtra resident", "Income below threshold"],
        "https://housing.maharashtra.gov.in/",
        "Apply through the state housing department portal during an open allotment round.",
    )
}

fn youth_skills() -> EligibilityRecord {
    record(
        "skill-india",
        "Skill India Mission (PMKVY)",
        "Offers free skill training to youth to enhance employability. Includes certification and placement assistance.",
        "Education",
        &["Age below 35 years", "Looking for skill development"],
        "https://pmkvyofficial.org/",
        "Enrol at an accredited PMKVY training centre listed on the Skill India portal.",
    )
}

fn senior_pension() -> EligibilityRecord {
    record(
        "pm-vaya-vandana",
        "Pradhan Mantri Vaya Vandana Yojana",
        "Pension scheme for senior citizens providing assured returns. Offers financial security through regular pension payments.",
        "Senior Benefits",
        &["Age above 60 years"],
        "https://licindia.in/Products/Pension-Plans/Pradhan-Mantri-Vaya-Vandana-Yojana",
        "Purchase the plan online or at an LIC branch with age and identity proof.",
    )
}

fn microfinance() -> EligibilityRecord {
    record(
        "pm-svanidhi",
        "PM SVANidhi",
        "Provides affordable loans to street vendors. Helps with working capital needs and digital transactions.",
        "Microfinance",
        &["Street vendor or small business owner", "Low income"],
        "https://pmsvanidhi.mohua.gov.in/",
        "Apply online on the PM SVANidhi portal or through a lending institution with a vending certificate.",
    )
}
