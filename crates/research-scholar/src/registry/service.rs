use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::directory::{DirectoryError, NotificationError, NotificationOutbox, RegistryStore};
use super::domain::{
    CurrentAssignment, Department, Designation, DrcMeeting, FacultyId, FacultyMember, MeetingId,
    Notification, NotificationKind, ScholarFilter, ScholarId, ScholarRecord, SupervisionSummary,
};
use crate::config::SupervisionConfig;
use crate::supervision::{
    eligibility_of, AssignmentDecision, AssignmentGuard, AssignmentLocks, AssignmentRequest,
    AssignmentValidator, EligibilityResult, SupervisionOperation,
};

#[derive(Debug, Clone, Deserialize)]
pub struct NewDepartment {
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FacultyRegistration {
    pub employee_code: String,
    pub name: String,
    pub department: String,
    pub designation: Designation,
    pub is_phd: bool,
    #[serde(default)]
    pub publications: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FacultyUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub designation: Option<Designation>,
    #[serde(default)]
    pub is_phd: Option<bool>,
    #[serde(default)]
    pub publications: Option<u32>,
}

/// Faculty record as served to the dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct FacultyView {
    #[serde(flatten)]
    pub member: FacultyMember,
    pub max_scholars: u32,
    pub eligibility: EligibilityResult,
}

impl From<FacultyMember> for FacultyView {
    fn from(member: FacultyMember) -> Self {
        let eligibility = eligibility_of(&member);
        Self {
            max_scholars: member.max_scholars(),
            eligibility,
            member,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScholarEnrollment {
    pub roll_number: String,
    pub registration_id: String,
    pub email: String,
    pub name: String,
    pub department: String,
    #[serde(default)]
    pub research_area: Option<String>,
    #[serde(default)]
    pub enrolled_on: Option<NaiveDate>,
    #[serde(default)]
    pub supervisor_id: Option<FacultyId>,
    #[serde(default)]
    pub co_supervisor_id: Option<FacultyId>,
}

/// Partial update. Supervisor fields left out keep their recorded value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScholarUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub research_area: Option<String>,
    #[serde(default)]
    pub supervisor_id: Option<FacultyId>,
    #[serde(default)]
    pub co_supervisor_id: Option<FacultyId>,
    #[serde(default)]
    pub remove_supervisor: bool,
    #[serde(default)]
    pub remove_co_supervisor: bool,
}

/// Persisted scholar plus any near-capacity warnings raised while validating it.
#[derive(Debug, Clone, Serialize)]
pub struct ScholarOutcome {
    pub scholar: ScholarRecord,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MeetingRequest {
    pub scheduled_for: NaiveDate,
    pub agenda: String,
    #[serde(default)]
    pub minutes_ref: Option<String>,
}

/// Error raised by the registry service.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("{0}")]
    Validation(String),
    #[error("{}", .0.summary())]
    AssignmentRejected(AssignmentDecision),
    #[error("{0}")]
    Forbidden(String),
    #[error(transparent)]
    Directory(#[from] DirectoryError),
    #[error(transparent)]
    Notification(#[from] NotificationError),
}

static SCHOLAR_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static MEETING_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_scholar_id() -> ScholarId {
    let id = SCHOLAR_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ScholarId(format!("sch-{id:06}"))
}

fn next_meeting_id() -> MeetingId {
    let id = MEETING_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    MeetingId(format!("drc-{id:06}"))
}

fn required(field: &str, value: &str) -> Result<String, RegistryError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(RegistryError::Validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

fn involved_ids<'a>(
    pairs: impl IntoIterator<Item = &'a CurrentAssignment>,
) -> BTreeSet<FacultyId> {
    pairs
        .into_iter()
        .flat_map(|pair| [pair.supervisor.clone(), pair.co_supervisor.clone()])
        .flatten()
        .collect()
}

/// Registry facade: departments, faculty, scholars and DRC meetings, with supervisor
/// assignments gated by the capacity validator.
pub struct RegistryService<St, N> {
    store: Arc<St>,
    outbox: Arc<N>,
    validator: AssignmentValidator<St, St>,
    locks: AssignmentLocks,
}

impl<St, N> RegistryService<St, N>
where
    St: RegistryStore,
    N: NotificationOutbox + 'static,
{
    pub fn new(store: Arc<St>, outbox: Arc<N>, config: SupervisionConfig) -> Self {
        let validator = AssignmentValidator::new(store.clone(), store.clone(), &config);
        Self {
            store,
            outbox,
            validator,
            locks: AssignmentLocks::default(),
        }
    }

    /// Dry run used for live form feedback. Nothing is persisted.
    pub fn validate_assignment(&self, request: &AssignmentRequest) -> AssignmentDecision {
        self.validator.validate(request)
    }

    pub fn create_department(&self, input: NewDepartment) -> Result<Department, RegistryError> {
        let department = Department {
            code: required("department code", &input.code)?.to_ascii_uppercase(),
            name: required("department name", &input.name)?,
        };
        Ok(self.store.insert_department(department)?)
    }

    pub fn list_departments(&self) -> Result<Vec<Department>, RegistryError> {
        Ok(self.store.list_departments()?)
    }

    pub fn register_faculty(
        &self,
        input: FacultyRegistration,
    ) -> Result<FacultyView, RegistryError> {
        if input.designation == Designation::Unrecognized {
            return Err(RegistryError::Validation(
                "designation must be Professor, Associate Professor or Assistant Professor"
                    .to_string(),
            ));
        }

        let id = FacultyId(required("employee code", &input.employee_code)?);
        let load = self.store.supervision_load(&id)?;
        let member = FacultyMember {
            name: required("name", &input.name)?,
            department: required("department", &input.department)?.to_ascii_uppercase(),
            designation: input.designation,
            is_phd: input.is_phd,
            publications: input.publications,
            summary: SupervisionSummary::from_load(load, input.designation),
            id,
        };

        let stored = self.store.insert_faculty(member)?;
        info!(faculty_id = %stored.id, designation = %stored.designation, "faculty registered");
        Ok(stored.into())
    }

    pub fn update_faculty(
        &self,
        id: &FacultyId,
        update: FacultyUpdate,
    ) -> Result<FacultyView, RegistryError> {
        let _guard = self.locks.acquire([id]);
        let mut member = self
            .store
            .fetch_faculty(id)?
            .ok_or(DirectoryError::NotFound)?;

        if let Some(name) = update.name {
            member.name = required("name", &name)?;
        }
        if let Some(department) = update.department {
            member.department = required("department", &department)?.to_ascii_uppercase();
        }
        if let Some(designation) = update.designation {
            if designation == Designation::Unrecognized {
                return Err(RegistryError::Validation(
                    "designation must be Professor, Associate Professor or Assistant Professor"
                        .to_string(),
                ));
            }
            member.designation = designation;
        }
        if let Some(is_phd) = update.is_phd {
            member.is_phd = is_phd;
        }
        if let Some(publications) = update.publications {
            member.publications = publications;
        }

        let load = self.store.supervision_load(id)?;
        member.summary = SupervisionSummary::from_load(load, member.designation);
        if load.total() > member.max_scholars() {
            warn!(
                faculty_id = %id,
                load = load.total(),
                max_scholars = member.max_scholars(),
                "faculty now supervises above capacity"
            );
        }

        self.store.update_faculty(member.clone())?;
        Ok(member.into())
    }

    pub fn faculty(&self, id: &FacultyId) -> Result<FacultyView, RegistryError> {
        let member = self
            .store
            .fetch_faculty(id)?
            .ok_or(DirectoryError::NotFound)?;
        Ok(member.into())
    }

    pub fn list_faculty(&self, department: Option<&str>) -> Result<Vec<FacultyView>, RegistryError> {
        Ok(self
            .store
            .list_faculty(department)?
            .into_iter()
            .map(FacultyView::from)
            .collect())
    }

    /// Create a scholar, rejecting the request when either proposed supervisor is blocked.
    pub fn enroll_scholar(
        &self,
        input: ScholarEnrollment,
    ) -> Result<ScholarOutcome, RegistryError> {
        let proposed = CurrentAssignment {
            supervisor: input.supervisor_id.clone(),
            co_supervisor: input.co_supervisor_id.clone(),
        };
        let affected = involved_ids([&proposed]);
        let _guard = self.locks.acquire(&affected);

        let decision = self.validator.validate(&AssignmentRequest {
            supervisor_id: proposed.supervisor.clone(),
            co_supervisor_id: proposed.co_supervisor.clone(),
            operation: SupervisionOperation::Assign,
            scholar_id: None,
        });
        if !decision.overall_valid {
            return Err(RegistryError::AssignmentRejected(decision));
        }

        let record = ScholarRecord {
            id: next_scholar_id(),
            roll_number: required("roll number", &input.roll_number)?,
            registration_id: required("registration id", &input.registration_id)?,
            email: required("email", &input.email)?.to_ascii_lowercase(),
            name: required("name", &input.name)?,
            department: required("department", &input.department)?.to_ascii_uppercase(),
            research_area: input.research_area,
            supervisor: proposed.supervisor.clone(),
            co_supervisor: proposed.co_supervisor.clone(),
            is_active: true,
            enrolled_on: input
                .enrolled_on
                .unwrap_or_else(|| Utc::now().date_naive()),
            updated_at: Utc::now(),
        };

        let stored = self.store.insert_scholar(record)?;
        self.refresh_aggregates(&affected)?;
        self.notify_new_roles(&stored, &CurrentAssignment::default());

        info!(
            scholar_id = %stored.id,
            warnings = decision.warnings.len(),
            "scholar enrolled"
        );
        Ok(ScholarOutcome {
            scholar: stored,
            warnings: decision.warnings,
        })
    }

    /// Apply a partial update. Only supervisor roles named in the update are re-validated,
    /// and a faculty member already on the scholar is not counted twice.
    pub fn update_scholar(
        &self,
        id: &ScholarId,
        update: ScholarUpdate,
    ) -> Result<ScholarOutcome, RegistryError> {
        loop {
            let snapshot = self.fetch_scholar(id)?;
            let before = snapshot.assignment();
            let after = CurrentAssignment {
                supervisor: if update.remove_supervisor {
                    None
                } else {
                    update.supervisor_id.clone().or(before.supervisor.clone())
                },
                co_supervisor: if update.remove_co_supervisor {
                    None
                } else {
                    update
                        .co_supervisor_id
                        .clone()
                        .or(before.co_supervisor.clone())
                },
            };

            let affected = involved_ids([&before, &after]);
            let _guard = self.locks.acquire(&affected);

            let mut record = self.fetch_scholar(id)?;
            if record.assignment() != before {
                // Reassigned while we waited for the locks; recompute the affected set.
                continue;
            }

            let mut decision = self.validator.validate(&AssignmentRequest {
                supervisor_id: update
                    .supervisor_id
                    .clone()
                    .filter(|_| !update.remove_supervisor),
                co_supervisor_id: update
                    .co_supervisor_id
                    .clone()
                    .filter(|_| !update.remove_co_supervisor),
                operation: SupervisionOperation::Change,
                scholar_id: Some(id.clone()),
            });
            if after.supervisor.is_some() && after.supervisor == after.co_supervisor {
                decision.reject_same_person();
            }
            if !decision.overall_valid {
                return Err(RegistryError::AssignmentRejected(decision));
            }

            if let Some(name) = &update.name {
                record.name = required("name", name)?;
            }
            if let Some(email) = &update.email {
                record.email = required("email", email)?.to_ascii_lowercase();
            }
            if let Some(department) = &update.department {
                record.department = required("department", department)?.to_ascii_uppercase();
            }
            if let Some(area) = &update.research_area {
                record.research_area = Some(area.trim().to_string()).filter(|a| !a.is_empty());
            }
            record.supervisor = after.supervisor.clone();
            record.co_supervisor = after.co_supervisor.clone();
            record.updated_at = Utc::now();

            self.store.update_scholar(record.clone())?;
            self.refresh_aggregates(&affected)?;
            self.notify_new_roles(&record, &before);

            info!(scholar_id = %id, "scholar updated");
            return Ok(ScholarOutcome {
                scholar: record,
                warnings: decision.warnings,
            });
        }
    }

    /// Soft delete. The scholar stops counting toward supervision load immediately.
    pub fn deactivate_scholar(&self, id: &ScholarId) -> Result<ScholarRecord, RegistryError> {
        let (mut record, guard) = self.lock_scholar(id)?;
        if !record.is_active {
            return Ok(record);
        }
        record.is_active = false;
        record.updated_at = Utc::now();
        self.store.update_scholar(record.clone())?;
        self.refresh_aggregates(guard.ids())?;

        info!(scholar_id = %id, "scholar deactivated");
        Ok(record)
    }

    /// Reactivation adds load back, so the recorded pair is validated as a fresh assignment.
    pub fn reactivate_scholar(&self, id: &ScholarId) -> Result<ScholarOutcome, RegistryError> {
        let (mut record, guard) = self.lock_scholar(id)?;
        if record.is_active {
            return Ok(ScholarOutcome {
                scholar: record,
                warnings: Vec::new(),
            });
        }

        let decision = self.validator.validate(&AssignmentRequest {
            supervisor_id: record.supervisor.clone(),
            co_supervisor_id: record.co_supervisor.clone(),
            operation: SupervisionOperation::Assign,
            scholar_id: Some(id.clone()),
        });
        if !decision.overall_valid {
            return Err(RegistryError::AssignmentRejected(decision));
        }

        record.is_active = true;
        record.updated_at = Utc::now();
        self.store.update_scholar(record.clone())?;
        self.refresh_aggregates(guard.ids())?;

        info!(scholar_id = %id, "scholar reactivated");
        Ok(ScholarOutcome {
            scholar: record,
            warnings: decision.warnings,
        })
    }

    pub fn scholar(&self, id: &ScholarId) -> Result<ScholarRecord, RegistryError> {
        self.fetch_scholar(id)
    }

    pub fn list_scholars(&self, filter: &ScholarFilter) -> Result<Vec<ScholarRecord>, RegistryError> {
        Ok(self.store.list_scholars(filter)?)
    }

    pub fn schedule_meeting(
        &self,
        scholar_id: &ScholarId,
        request: MeetingRequest,
    ) -> Result<DrcMeeting, RegistryError> {
        let scholar = self.fetch_scholar(scholar_id)?;
        if !scholar.is_active {
            return Err(RegistryError::Validation(
                "meetings can only be scheduled for active scholars".to_string(),
            ));
        }

        let meeting = DrcMeeting {
            id: next_meeting_id(),
            scholar_id: scholar_id.clone(),
            scheduled_for: request.scheduled_for,
            agenda: required("agenda", &request.agenda)?,
            minutes_ref: request
                .minutes_ref
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty()),
            recorded_at: Utc::now(),
        };
        let stored = self.store.insert_meeting(meeting)?;

        for recipient in involved_ids([&scholar.assignment()]) {
            let mut details = BTreeMap::new();
            details.insert("meeting_id".to_string(), stored.id.0.clone());
            details.insert("scheduled_for".to_string(), stored.scheduled_for.to_string());
            self.deliver(Notification {
                recipient,
                kind: NotificationKind::MeetingScheduled,
                scholar_id: scholar_id.clone(),
                details,
                created_at: Utc::now(),
            });
        }

        Ok(stored)
    }

    pub fn meetings_for(&self, scholar_id: &ScholarId) -> Result<Vec<DrcMeeting>, RegistryError> {
        self.fetch_scholar(scholar_id)?;
        Ok(self.store.meetings_for(scholar_id)?)
    }

    pub fn notifications_for(&self, id: &FacultyId) -> Result<Vec<Notification>, RegistryError> {
        Ok(self.outbox.for_recipient(id)?)
    }

    /// Recompute the stored load aggregate of each faculty member from live scholar records.
    pub fn refresh_aggregates<'a>(
        &self,
        ids: impl IntoIterator<Item = &'a FacultyId>,
    ) -> Result<(), RegistryError> {
        for id in ids {
            let Some(mut member) = self.store.fetch_faculty(id)? else {
                warn!(faculty_id = %id, "skipping aggregate refresh for unknown faculty");
                continue;
            };
            let load = self.store.supervision_load(id)?;
            let summary = SupervisionSummary::from_load(load, member.designation);
            if member.summary != summary {
                member.summary = summary;
                self.store.update_faculty(member)?;
            }
        }
        Ok(())
    }

    /// Locks the scholar's current supervisors and returns the record read under that lock,
    /// retrying if the pair was reassigned while waiting.
    fn lock_scholar(
        &self,
        id: &ScholarId,
    ) -> Result<(ScholarRecord, AssignmentGuard<'_>), RegistryError> {
        loop {
            let snapshot = self.fetch_scholar(id)?.assignment();
            let guard = self.locks.acquire(&involved_ids([&snapshot]));
            let record = self.fetch_scholar(id)?;
            if record.assignment() == snapshot {
                return Ok((record, guard));
            }
        }
    }

    fn fetch_scholar(&self, id: &ScholarId) -> Result<ScholarRecord, RegistryError> {
        Ok(self
            .store
            .fetch_scholar(id)?
            .ok_or(DirectoryError::NotFound)?)
    }

    /// Publishing happens after the write is committed, so a failed delivery is logged
    /// and never undoes or fails the operation.
    fn deliver(&self, notification: Notification) {
        let recipient = notification.recipient.clone();
        let kind = notification.kind;
        if let Err(err) = self.outbox.publish(notification) {
            warn!(faculty_id = %recipient, ?kind, error = %err, "notification not delivered");
        }
    }

    fn notify_new_roles(&self, record: &ScholarRecord, before: &CurrentAssignment) {
        let roles = [
            (
                &record.supervisor,
                &before.supervisor,
                NotificationKind::SupervisorAssigned,
            ),
            (
                &record.co_supervisor,
                &before.co_supervisor,
                NotificationKind::CoSupervisorAssigned,
            ),
        ];

        for (now, previous, kind) in roles {
            let Some(recipient) = now else { continue };
            if previous.as_ref() == Some(recipient) {
                continue;
            }
            let mut details = BTreeMap::new();
            details.insert("scholar_name".to_string(), record.name.clone());
            details.insert("roll_number".to_string(), record.roll_number.clone());
            self.deliver(Notification {
                recipient: recipient.clone(),
                kind,
                scholar_id: record.id.clone(),
                details,
                created_at: Utc::now(),
            });
        }
    }
}
