use axum::http::HeaderMap;

use super::service::RegistryError;

/// Header carrying the caller's role, set by the authenticating gateway.
pub const ROLE_HEADER: &str = "x-user-role";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    DepartmentOffice,
    DrcChair,
    Faculty,
    Scholar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    ReadRegistry,
    PreviewAssignments,
    ManageDepartments,
    ManageFaculty,
    ManageScholars,
    ScheduleMeetings,
}

impl Role {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "admin" => Some(Role::Admin),
            "department_office" | "dept_office" => Some(Role::DepartmentOffice),
            "drc_chair" => Some(Role::DrcChair),
            "faculty" => Some(Role::Faculty),
            "scholar" => Some(Role::Scholar),
            _ => None,
        }
    }

    pub fn permits(&self, capability: Capability) -> bool {
        use Capability::*;
        match self {
            Role::Admin => true,
            Role::DepartmentOffice => matches!(
                capability,
                ReadRegistry | PreviewAssignments | ManageFaculty | ManageScholars
            ),
            Role::DrcChair => matches!(
                capability,
                ReadRegistry | PreviewAssignments | ScheduleMeetings
            ),
            Role::Faculty | Role::Scholar => capability == ReadRegistry,
        }
    }
}

pub fn authorize(headers: &HeaderMap, capability: Capability) -> Result<Role, RegistryError> {
    let role = headers
        .get(ROLE_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(Role::parse)
        .ok_or_else(|| RegistryError::Forbidden("missing or unknown role".to_string()))?;

    if role.permits(capability) {
        Ok(role)
    } else {
        Err(RegistryError::Forbidden(format!(
            "{role:?} may not perform {capability:?}"
        )))
    }
}
