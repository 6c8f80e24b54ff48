use super::domain::{
    Department, DrcMeeting, FacultyId, FacultyMember, Notification, ScholarFilter, ScholarId,
    ScholarRecord, SupervisionLoad,
};

/// Lookup and persistence for faculty records.
pub trait FacultyDirectory: Send + Sync {
    fn insert_faculty(&self, member: FacultyMember) -> Result<FacultyMember, DirectoryError>;
    fn update_faculty(&self, member: FacultyMember) -> Result<(), DirectoryError>;
    fn fetch_faculty(&self, id: &FacultyId) -> Result<Option<FacultyMember>, DirectoryError>;
    fn list_faculty(&self, department: Option<&str>) -> Result<Vec<FacultyMember>, DirectoryError>;
}

/// Lookup and persistence for scholar records.
pub trait ScholarDirectory: Send + Sync {
    fn insert_scholar(&self, record: ScholarRecord) -> Result<ScholarRecord, DirectoryError>;
    fn update_scholar(&self, record: ScholarRecord) -> Result<(), DirectoryError>;
    fn fetch_scholar(&self, id: &ScholarId) -> Result<Option<ScholarRecord>, DirectoryError>;
    fn list_scholars(&self, filter: &ScholarFilter) -> Result<Vec<ScholarRecord>, DirectoryError>;

    /// Live count of active scholars referencing `faculty_id` in either role.
    fn supervision_load(&self, faculty_id: &FacultyId) -> Result<SupervisionLoad, DirectoryError>;
}

pub trait DepartmentDirectory: Send + Sync {
    fn insert_department(&self, department: Department) -> Result<Department, DirectoryError>;
    fn list_departments(&self) -> Result<Vec<Department>, DirectoryError>;
}

pub trait MeetingLog: Send + Sync {
    fn insert_meeting(&self, meeting: DrcMeeting) -> Result<DrcMeeting, DirectoryError>;
    fn meetings_for(&self, scholar_id: &ScholarId) -> Result<Vec<DrcMeeting>, DirectoryError>;
}

/// Everything the registry service needs from storage.
pub trait RegistryStore:
    FacultyDirectory + ScholarDirectory + DepartmentDirectory + MeetingLog + 'static
{
}

impl<T> RegistryStore for T where
    T: FacultyDirectory + ScholarDirectory + DepartmentDirectory + MeetingLog + 'static
{
}

/// Error enumeration for storage failures.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("record already exists: {0}")]
    Conflict(String),
    #[error("record not found")]
    NotFound,
    #[error("directory unavailable: {0}")]
    Unavailable(String),
}

/// Outbound notification hook. Delivery (e-mail, push) lives behind implementations.
pub trait NotificationOutbox: Send + Sync {
    fn publish(&self, notification: Notification) -> Result<(), NotificationError>;
    fn for_recipient(&self, recipient: &FacultyId) -> Result<Vec<Notification>, NotificationError>;
}

#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}
