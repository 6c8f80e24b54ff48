use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::capacity::{CapacityDecision, CapacityEvaluator, CapacityStatus, SupervisionOperation};
use crate::config::SupervisionConfig;
use crate::registry::directory::{FacultyDirectory, ScholarDirectory};
use crate::registry::domain::{FacultyId, ScholarId};

pub const SAME_PERSON_ERROR: &str = "Supervisor and co-supervisor cannot be the same person";

/// Supervisor pair proposed by a scholar create/update or a dashboard preview.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentRequest {
    #[serde(default)]
    pub supervisor_id: Option<FacultyId>,
    #[serde(default)]
    pub co_supervisor_id: Option<FacultyId>,
    #[serde(default)]
    pub operation: SupervisionOperation,
    #[serde(default)]
    pub scholar_id: Option<ScholarId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentRole {
    Supervisor,
    CoSupervisor,
}

impl AssignmentRole {
    pub fn label(&self) -> &'static str {
        match self {
            AssignmentRole::Supervisor => "Supervisor",
            AssignmentRole::CoSupervisor => "Co-supervisor",
        }
    }
}

/// Merged verdict over both roles. Warnings are advisory; errors block persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentDecision {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supervisor: Option<CapacityDecision>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub co_supervisor: Option<CapacityDecision>,
    pub overall_valid: bool,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl Default for AssignmentDecision {
    fn default() -> Self {
        Self {
            supervisor: None,
            co_supervisor: None,
            overall_valid: true,
            warnings: Vec::new(),
            errors: Vec::new(),
        }
    }
}

impl AssignmentDecision {
    fn record(&mut self, role: AssignmentRole, decision: CapacityDecision) {
        if !decision.is_valid {
            self.overall_valid = false;
            self.errors
                .push(format!("{}: {}", role.label(), decision.message));
        } else if decision.status == CapacityStatus::Warning {
            self.warnings
                .push(format!("{}: {}", role.label(), decision.message));
        }

        match role {
            AssignmentRole::Supervisor => self.supervisor = Some(decision),
            AssignmentRole::CoSupervisor => self.co_supervisor = Some(decision),
        }
    }

    pub(crate) fn reject_same_person(&mut self) {
        self.overall_valid = false;
        if !self.errors.iter().any(|error| error == SAME_PERSON_ERROR) {
            self.errors.push(SAME_PERSON_ERROR.to_string());
        }
    }

    pub fn summary(&self) -> String {
        if self.errors.is_empty() {
            "assignment accepted".to_string()
        } else {
            format!("assignment rejected: {}", self.errors.join("; "))
        }
    }
}

/// Runs the capacity evaluator over both roles and applies the cross-field rule.
pub struct AssignmentValidator<F, S> {
    evaluator: CapacityEvaluator<F, S>,
}

impl<F, S> AssignmentValidator<F, S>
where
    F: FacultyDirectory,
    S: ScholarDirectory,
{
    pub fn new(faculty: Arc<F>, scholars: Arc<S>, config: &SupervisionConfig) -> Self {
        Self {
            evaluator: CapacityEvaluator::new(faculty, scholars, config),
        }
    }

    pub fn validate(&self, request: &AssignmentRequest) -> AssignmentDecision {
        let current = match (request.operation, &request.scholar_id) {
            (SupervisionOperation::Change, Some(id)) => self.evaluator.current_assignment(id),
            _ => None,
        };

        let mut decision = AssignmentDecision::default();

        if let Some(id) = &request.supervisor_id {
            let outcome = self
                .evaluator
                .evaluate_with(id, request.operation, current.as_ref());
            decision.record(AssignmentRole::Supervisor, outcome);
        }

        if let Some(id) = &request.co_supervisor_id {
            let outcome = self
                .evaluator
                .evaluate_with(id, request.operation, current.as_ref());
            decision.record(AssignmentRole::CoSupervisor, outcome);
        }

        if let (Some(supervisor), Some(co_supervisor)) =
            (&request.supervisor_id, &request.co_supervisor_id)
        {
            if supervisor == co_supervisor {
                decision.reject_same_person();
            }
        }

        debug!(
            operation = ?request.operation,
            overall_valid = decision.overall_valid,
            warnings = decision.warnings.len(),
            errors = decision.errors.len(),
            "assignment validated"
        );

        decision
    }
}
