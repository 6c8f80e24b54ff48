use chrono::Utc;
use metrics_exporter_prometheus::PrometheusHandle;
use research_scholar::error::AppError;
use research_scholar::registry::{
    Designation, FacultyId, FacultyMember, MemoryStore, RegistryError, ScholarDirectory,
    ScholarId, ScholarRecord, SupervisionSummary,
};
use research_scholar::roster::FacultyRosterImporter;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Directory seeded from a roster CSV, or the built-in sample roster when none is given.
pub(crate) fn seed_store(roster: Option<&Path>) -> Result<MemoryStore, AppError> {
    let members = match roster {
        Some(path) => FacultyRosterImporter::from_path(path)?,
        None => demo_roster(),
    };
    info!(faculty = members.len(), "faculty directory seeded");
    Ok(MemoryStore::with_faculty(members))
}

pub(crate) fn demo_roster() -> Vec<FacultyMember> {
    let member = |code: &str, name: &str, designation, is_phd, publications| FacultyMember {
        id: FacultyId(code.to_string()),
        name: name.to_string(),
        department: "CSE".to_string(),
        designation,
        is_phd,
        publications,
        summary: SupervisionSummary::from_load(Default::default(), designation),
    };

    vec![
        member("CSE-101", "Dr. Kavita Iyer", Designation::Professor, true, 6),
        member("CSE-102", "Dr. Rohan Mehta", Designation::AssociateProfessor, true, 9),
        member("CSE-103", "Dr. Sana Qureshi", Designation::AssistantProfessor, true, 3),
        member("CSE-104", "Dr. Vikram Das", Designation::Professor, false, 40),
    ]
}

/// Insert `count` placeholder active scholars supervised by `faculty_id`.
pub(crate) fn seed_load(
    store: &MemoryStore,
    faculty_id: &FacultyId,
    count: u32,
) -> Result<(), AppError> {
    for index in 0..count {
        let suffix = format!("{}-{index:03}", faculty_id.0);
        store
            .insert_scholar(ScholarRecord {
                id: ScholarId(format!("seed-{suffix}")),
                roll_number: format!("SEED-{suffix}"),
                registration_id: format!("SEED-REG-{suffix}"),
                email: format!("seed.{suffix}@registry.local").to_ascii_lowercase(),
                name: format!("Seeded scholar {suffix}"),
                department: "CSE".to_string(),
                research_area: None,
                supervisor: Some(faculty_id.clone()),
                co_supervisor: None,
                is_active: true,
                enrolled_on: Utc::now().date_naive(),
                updated_at: Utc::now(),
            })
            .map_err(RegistryError::from)?;
    }
    Ok(())
}

/// Parses `EMPLOYEE_CODE=COUNT` load overrides.
pub(crate) fn parse_load_override(raw: &str) -> Result<(FacultyId, u32), String> {
    let (code, count) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected CODE=COUNT, got '{raw}'"))?;
    let code = code.trim();
    if code.is_empty() {
        return Err(format!("missing employee code in '{raw}'"));
    }
    let count = count
        .trim()
        .parse::<u32>()
        .map_err(|err| format!("invalid load count in '{raw}' ({err})"))?;
    Ok((FacultyId(code.to_string()), count))
}
