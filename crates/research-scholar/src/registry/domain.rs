use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Employee code identifying a faculty member.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FacultyId(pub String);

impl fmt::Display for FacultyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Registry-assigned identifier for a scholar record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScholarId(pub String);

impl fmt::Display for ScholarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MeetingId(pub String);

/// Academic rank. Fixes both the publication threshold and the scholar capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Designation {
    #[serde(rename = "Professor")]
    Professor,
    #[serde(rename = "Associate Professor")]
    AssociateProfessor,
    #[serde(rename = "Assistant Professor")]
    AssistantProfessor,
    /// Any rank outside the three recognised ones. Never eligible, zero capacity.
    #[serde(other)]
    Unrecognized,
}

impl Designation {
    pub fn label(&self) -> &'static str {
        match self {
            Designation::Professor => "Professor",
            Designation::AssociateProfessor => "Associate Professor",
            Designation::AssistantProfessor => "Assistant Professor",
            Designation::Unrecognized => "Unrecognized",
        }
    }

    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "professor" => Designation::Professor,
            "associate professor" => Designation::AssociateProfessor,
            "assistant professor" => Designation::AssistantProfessor,
            _ => Designation::Unrecognized,
        }
    }

    /// Combined supervisor and co-supervisor cap.
    pub fn max_scholars(&self) -> u32 {
        match self {
            Designation::Professor => 8,
            Designation::AssociateProfessor => 6,
            Designation::AssistantProfessor => 4,
            Designation::Unrecognized => 0,
        }
    }

    /// Publication count that must be strictly exceeded to supervise.
    pub fn publication_threshold(&self) -> Option<u32> {
        match self {
            Designation::Professor | Designation::AssociateProfessor => Some(5),
            Designation::AssistantProfessor => Some(3),
            Designation::Unrecognized => None,
        }
    }
}

impl fmt::Display for Designation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Active scholars pointing at a faculty member, split by role.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupervisionLoad {
    pub supervising: u32,
    pub co_supervising: u32,
}

impl SupervisionLoad {
    pub fn total(&self) -> u32 {
        self.supervising + self.co_supervising
    }
}

/// Load aggregate stored on the faculty record and refreshed after every reassignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupervisionSummary {
    pub supervising: u32,
    pub co_supervising: u32,
    pub total: u32,
    pub max_scholars: u32,
    pub remaining: u32,
}

impl SupervisionSummary {
    pub fn from_load(load: SupervisionLoad, designation: Designation) -> Self {
        let max_scholars = designation.max_scholars();
        Self {
            supervising: load.supervising,
            co_supervising: load.co_supervising,
            total: load.total(),
            max_scholars,
            remaining: max_scholars.saturating_sub(load.total()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacultyMember {
    pub id: FacultyId,
    pub name: String,
    pub department: String,
    pub designation: Designation,
    pub is_phd: bool,
    pub publications: u32,
    #[serde(default)]
    pub summary: SupervisionSummary,
}

impl FacultyMember {
    /// Always derived from the designation; there is no way to set it independently.
    pub fn max_scholars(&self) -> u32 {
        self.designation.max_scholars()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScholarRecord {
    pub id: ScholarId,
    pub roll_number: String,
    pub registration_id: String,
    pub email: String,
    pub name: String,
    pub department: String,
    #[serde(default)]
    pub research_area: Option<String>,
    pub supervisor: Option<FacultyId>,
    pub co_supervisor: Option<FacultyId>,
    pub is_active: bool,
    pub enrolled_on: NaiveDate,
    pub updated_at: DateTime<Utc>,
}

impl ScholarRecord {
    pub fn assignment(&self) -> CurrentAssignment {
        CurrentAssignment {
            supervisor: self.supervisor.clone(),
            co_supervisor: self.co_supervisor.clone(),
        }
    }
}

/// Supervisor pair recorded on a scholar at read time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentAssignment {
    pub supervisor: Option<FacultyId>,
    pub co_supervisor: Option<FacultyId>,
}

impl CurrentAssignment {
    pub fn involves(&self, faculty_id: &FacultyId) -> bool {
        self.supervisor.as_ref() == Some(faculty_id)
            || self.co_supervisor.as_ref() == Some(faculty_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub code: String,
    pub name: String,
}

/// Doctoral Research Committee meeting held for a scholar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrcMeeting {
    pub id: MeetingId,
    pub scholar_id: ScholarId,
    pub scheduled_for: NaiveDate,
    pub agenda: String,
    #[serde(default)]
    pub minutes_ref: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    SupervisorAssigned,
    CoSupervisorAssigned,
    MeetingScheduled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub recipient: FacultyId,
    pub kind: NotificationKind,
    pub scholar_id: ScholarId,
    pub details: BTreeMap<String, String>,
    pub created_at: DateTime<Utc>,
}

/// Filters accepted by scholar listings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ScholarFilter {
    #[serde(default)]
    pub supervisor: Option<FacultyId>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub active: Option<bool>,
}

impl ScholarFilter {
    pub fn matches(&self, record: &ScholarRecord) -> bool {
        if let Some(faculty) = &self.supervisor {
            if !record.assignment().involves(faculty) {
                return false;
            }
        }
        if let Some(department) = &self.department {
            if !record.department.eq_ignore_ascii_case(department) {
                return false;
            }
        }
        if let Some(active) = self.active {
            if record.is_active != active {
                return false;
            }
        }
        true
    }
}
