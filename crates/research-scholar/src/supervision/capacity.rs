use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::eligibility::eligibility_of;
use crate::config::SupervisionConfig;
use crate::registry::directory::{DirectoryError, FacultyDirectory, ScholarDirectory};
use crate::registry::domain::{CurrentAssignment, Designation, FacultyId, ScholarId};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SupervisionOperation {
    #[default]
    Assign,
    Change,
    Remove,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapacityStatus {
    Ok,
    Warning,
    Rejected,
    Error,
}

/// Outcome of checking one faculty member against their supervision cap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacityDecision {
    pub is_valid: bool,
    pub status: CapacityStatus,
    pub message: String,
    pub faculty_id: FacultyId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub designation: Option<Designation>,
    pub current_load: u32,
    pub effective_load: u32,
    pub max_capacity: u32,
    pub remaining_capacity: u32,
}

impl CapacityDecision {
    pub(crate) fn error(faculty_id: &FacultyId, message: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            status: CapacityStatus::Error,
            message: message.into(),
            faculty_id: faculty_id.clone(),
            name: None,
            designation: None,
            current_load: 0,
            effective_load: 0,
            max_capacity: 0,
            remaining_capacity: 0,
        }
    }
}

/// Post-operation load. Reassigning a faculty member who already holds a role on the
/// scholar leaves the load untouched.
pub fn effective_load(current_load: u32, operation: SupervisionOperation, already_assigned: bool) -> u32 {
    match operation {
        SupervisionOperation::Assign => current_load + 1,
        SupervisionOperation::Change if already_assigned => current_load,
        SupervisionOperation::Change => current_load + 1,
        SupervisionOperation::Remove => current_load.saturating_sub(1),
    }
}

pub fn classify(effective_load: u32, max_capacity: u32, warning_band: u32) -> CapacityStatus {
    if effective_load > max_capacity {
        CapacityStatus::Rejected
    } else if max_capacity - effective_load <= warning_band {
        CapacityStatus::Warning
    } else {
        CapacityStatus::Ok
    }
}

pub struct CapacityEvaluator<F, S> {
    faculty: Arc<F>,
    scholars: Arc<S>,
    warning_band: u32,
}

impl<F, S> CapacityEvaluator<F, S>
where
    F: FacultyDirectory,
    S: ScholarDirectory,
{
    pub fn new(faculty: Arc<F>, scholars: Arc<S>, config: &SupervisionConfig) -> Self {
        Self {
            faculty,
            scholars,
            warning_band: config.warning_band,
        }
    }

    /// Evaluate one faculty member, loading the scholar's recorded pair when reassigning.
    pub fn evaluate(
        &self,
        faculty_id: &FacultyId,
        operation: SupervisionOperation,
        scholar_id: Option<&ScholarId>,
    ) -> CapacityDecision {
        let current = match (operation, scholar_id) {
            (SupervisionOperation::Change, Some(id)) => self.current_assignment(id),
            _ => None,
        };
        self.evaluate_with(faculty_id, operation, current.as_ref())
    }

    /// Unresolvable scholars yield `None`, which counts the reassignment as new load.
    pub(crate) fn current_assignment(&self, scholar_id: &ScholarId) -> Option<CurrentAssignment> {
        match self.scholars.fetch_scholar(scholar_id) {
            Ok(record) => record.map(|record| record.assignment()),
            Err(err) => {
                warn!(%scholar_id, error = %err, "scholar lookup failed; counting as new assignment");
                None
            }
        }
    }

    pub(crate) fn evaluate_with(
        &self,
        faculty_id: &FacultyId,
        operation: SupervisionOperation,
        current: Option<&CurrentAssignment>,
    ) -> CapacityDecision {
        match self.try_evaluate(faculty_id, operation, current) {
            Ok(decision) => decision,
            Err(err) => {
                warn!(%faculty_id, error = %err, "capacity evaluation failed");
                CapacityDecision::error(faculty_id, "Error validating supervisor capacity")
            }
        }
    }

    fn try_evaluate(
        &self,
        faculty_id: &FacultyId,
        operation: SupervisionOperation,
        current: Option<&CurrentAssignment>,
    ) -> Result<CapacityDecision, DirectoryError> {
        let Some(member) = self.faculty.fetch_faculty(faculty_id)? else {
            return Ok(CapacityDecision::error(faculty_id, "Faculty member not found"));
        };

        let eligibility = eligibility_of(&member);
        if !eligibility.is_eligible {
            debug!(%faculty_id, reason = %eligibility.reason, "faculty not eligible");
            return Ok(CapacityDecision::error(faculty_id, eligibility.reason));
        }

        let current_load = self.scholars.supervision_load(faculty_id)?.total();
        let already_assigned = current
            .map(|assignment| assignment.involves(faculty_id))
            .unwrap_or(false);
        let effective_load = effective_load(current_load, operation, already_assigned);
        let max_capacity = member.max_scholars();
        let remaining_capacity = max_capacity.saturating_sub(effective_load);
        let status = classify(effective_load, max_capacity, self.warning_band);

        let message = match status {
            CapacityStatus::Rejected => format!(
                "{} would exceed maximum capacity ({}/{})",
                member.name, effective_load, max_capacity
            ),
            CapacityStatus::Warning => format!(
                "{} is near capacity ({}/{}, {} remaining)",
                member.name, effective_load, max_capacity, remaining_capacity
            ),
            _ => format!(
                "{} has capacity ({}/{}, {} remaining)",
                member.name, effective_load, max_capacity, remaining_capacity
            ),
        };

        if status == CapacityStatus::Rejected {
            warn!(%faculty_id, effective_load, max_capacity, "supervision capacity exceeded");
        } else {
            debug!(%faculty_id, ?operation, current_load, effective_load, ?status, "capacity evaluated");
        }

        Ok(CapacityDecision {
            is_valid: status != CapacityStatus::Rejected,
            status,
            message,
            faculty_id: faculty_id.clone(),
            name: Some(member.name),
            designation: Some(member.designation),
            current_load,
            effective_load,
            max_capacity,
            remaining_capacity,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remove_never_goes_negative() {
        assert_eq!(effective_load(0, SupervisionOperation::Remove, false), 0);
        assert_eq!(effective_load(3, SupervisionOperation::Remove, false), 2);
    }

    #[test]
    fn change_only_counts_new_faculty() {
        assert_eq!(effective_load(4, SupervisionOperation::Change, true), 4);
        assert_eq!(effective_load(4, SupervisionOperation::Change, false), 5);
    }

    #[test]
    fn warning_band_covers_last_two_slots() {
        assert_eq!(classify(5, 8, 2), CapacityStatus::Ok);
        assert_eq!(classify(6, 8, 2), CapacityStatus::Warning);
        assert_eq!(classify(8, 8, 2), CapacityStatus::Warning);
        assert_eq!(classify(9, 8, 2), CapacityStatus::Rejected);
    }
}
