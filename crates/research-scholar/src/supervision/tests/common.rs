use std::sync::Arc;

use chrono::{NaiveDate, TimeZone, Utc};

use crate::config::SupervisionConfig;
use crate::registry::directory::{DirectoryError, FacultyDirectory, ScholarDirectory};
use crate::registry::domain::{
    Designation, FacultyId, FacultyMember, ScholarFilter, ScholarId, ScholarRecord,
    SupervisionLoad, SupervisionSummary,
};
use crate::registry::memory::MemoryStore;
use crate::supervision::{AssignmentValidator, CapacityEvaluator};

pub(super) fn faculty(
    code: &str,
    designation: Designation,
    is_phd: bool,
    publications: u32,
) -> FacultyMember {
    FacultyMember {
        id: FacultyId(code.to_string()),
        name: format!("Dr. {code}"),
        department: "CSE".to_string(),
        designation,
        is_phd,
        publications,
        summary: SupervisionSummary::default(),
    }
}

pub(super) fn professor(code: &str) -> FacultyMember {
    faculty(code, Designation::Professor, true, 6)
}

pub(super) fn scholar(
    suffix: &str,
    supervisor: Option<&str>,
    co_supervisor: Option<&str>,
) -> ScholarRecord {
    ScholarRecord {
        id: ScholarId(format!("sch-{suffix}")),
        roll_number: format!("PHD-{suffix}"),
        registration_id: format!("REG-{suffix}"),
        email: format!("scholar.{suffix}@univ.edu"),
        name: format!("Scholar {suffix}"),
        department: "CSE".to_string(),
        research_area: None,
        supervisor: supervisor.map(|code| FacultyId(code.to_string())),
        co_supervisor: co_supervisor.map(|code| FacultyId(code.to_string())),
        is_active: true,
        enrolled_on: NaiveDate::from_ymd_opt(2024, 7, 1).expect("valid date"),
        updated_at: Utc.with_ymd_and_hms(2024, 7, 1, 9, 0, 0).unwrap(),
    }
}

/// Store holding `members` where the first member supervises `load` active scholars.
pub(super) fn store_with_load(members: Vec<FacultyMember>, load: u32) -> Arc<MemoryStore> {
    let lead = members
        .first()
        .map(|member| member.id.0.clone())
        .expect("at least one faculty member");
    let store = MemoryStore::with_faculty(members);
    for index in 0..load {
        store
            .insert_scholar(scholar(&format!("{lead}-{index}"), Some(&lead), None))
            .expect("seed scholar");
    }
    Arc::new(store)
}

pub(super) fn validator(store: &Arc<MemoryStore>) -> AssignmentValidator<MemoryStore, MemoryStore> {
    crate::telemetry::init_for_tests();
    AssignmentValidator::new(store.clone(), store.clone(), &SupervisionConfig::default())
}

pub(super) fn evaluator(store: &Arc<MemoryStore>) -> CapacityEvaluator<MemoryStore, MemoryStore> {
    crate::telemetry::init_for_tests();
    CapacityEvaluator::new(store.clone(), store.clone(), &SupervisionConfig::default())
}

pub(super) fn id(code: &str) -> FacultyId {
    FacultyId(code.to_string())
}

pub(super) struct UnavailableStore;

impl FacultyDirectory for UnavailableStore {
    fn insert_faculty(&self, _member: FacultyMember) -> Result<FacultyMember, DirectoryError> {
        Err(DirectoryError::Unavailable("database offline".to_string()))
    }

    fn update_faculty(&self, _member: FacultyMember) -> Result<(), DirectoryError> {
        Err(DirectoryError::Unavailable("database offline".to_string()))
    }

    fn fetch_faculty(&self, _id: &FacultyId) -> Result<Option<FacultyMember>, DirectoryError> {
        Err(DirectoryError::Unavailable("database offline".to_string()))
    }

    fn list_faculty(&self, _department: Option<&str>) -> Result<Vec<FacultyMember>, DirectoryError> {
        Err(DirectoryError::Unavailable("database offline".to_string()))
    }
}

impl ScholarDirectory for UnavailableStore {
    fn insert_scholar(&self, _record: ScholarRecord) -> Result<ScholarRecord, DirectoryError> {
        Err(DirectoryError::Unavailable("database offline".to_string()))
    }

    fn update_scholar(&self, _record: ScholarRecord) -> Result<(), DirectoryError> {
        Err(DirectoryError::Unavailable("database offline".to_string()))
    }

    fn fetch_scholar(&self, _id: &ScholarId) -> Result<Option<ScholarRecord>, DirectoryError> {
        Err(DirectoryError::Unavailable("database offline".to_string()))
    }

    fn list_scholars(&self, _filter: &ScholarFilter) -> Result<Vec<ScholarRecord>, DirectoryError> {
        Err(DirectoryError::Unavailable("database offline".to_string()))
    }

    fn supervision_load(&self, _faculty_id: &FacultyId) -> Result<SupervisionLoad, DirectoryError> {
        Err(DirectoryError::Unavailable("database offline".to_string()))
    }
}
