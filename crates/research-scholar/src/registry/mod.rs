//! Departments, faculty, scholars, DRC meetings and notifications.

pub mod access;
pub mod directory;
pub mod domain;
pub mod memory;
pub mod router;
pub mod service;

pub use access::{authorize, Capability, Role, ROLE_HEADER};
pub use directory::{
    DepartmentDirectory, DirectoryError, FacultyDirectory, MeetingLog, NotificationError,
    NotificationOutbox, RegistryStore, ScholarDirectory,
};
pub use domain::{
    CurrentAssignment, Department, Designation, DrcMeeting, FacultyId, FacultyMember, MeetingId,
    Notification, NotificationKind, ScholarFilter, ScholarId, ScholarRecord, SupervisionLoad,
    SupervisionSummary,
};
pub use memory::{MemoryOutbox, MemoryStore};
pub use router::registry_router;
pub use service::{
    FacultyRegistration, FacultyUpdate, FacultyView, MeetingRequest, NewDepartment,
    RegistryError, RegistryService, ScholarEnrollment, ScholarOutcome, ScholarUpdate,
};
