use serde::{Deserialize, Serialize};

use crate::registry::domain::{Designation, FacultyMember};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityResult {
    pub is_eligible: bool,
    pub reason: String,
}

impl EligibilityResult {
    fn eligible() -> Self {
        Self {
            is_eligible: true,
            reason: "Eligible for supervision".to_string(),
        }
    }

    fn ineligible(reason: impl Into<String>) -> Self {
        Self {
            is_eligible: false,
            reason: reason.into(),
        }
    }
}

/// PhD is checked first; the publication count must strictly exceed the rank's threshold.
pub fn check_eligibility(
    designation: Designation,
    is_phd: bool,
    publications: u32,
) -> EligibilityResult {
    if !is_phd {
        return EligibilityResult::ineligible("PhD required for supervision");
    }

    match designation.publication_threshold() {
        Some(threshold) if publications > threshold => EligibilityResult::eligible(),
        Some(threshold) => EligibilityResult::ineligible(format!(
            "Requires more than {threshold} publications (current: {publications})"
        )),
        None => EligibilityResult::ineligible("Invalid designation"),
    }
}

pub fn eligibility_of(member: &FacultyMember) -> EligibilityResult {
    check_eligibility(member.designation, member.is_phd, member.publications)
}
