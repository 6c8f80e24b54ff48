//! Supervision-load rules: who may supervise, how many scholars they may hold, and how a
//! proposed supervisor pair is judged before a scholar record is written.

pub mod capacity;
pub mod eligibility;
pub mod locks;
pub mod validator;

#[cfg(test)]
mod tests;

pub use capacity::{
    classify, effective_load, CapacityDecision, CapacityEvaluator, CapacityStatus,
    SupervisionOperation,
};
pub use eligibility::{check_eligibility, eligibility_of, EligibilityResult};
pub use locks::{AssignmentGuard, AssignmentLocks};
pub use validator::{
    AssignmentDecision, AssignmentRequest, AssignmentRole, AssignmentValidator, SAME_PERSON_ERROR,
};
