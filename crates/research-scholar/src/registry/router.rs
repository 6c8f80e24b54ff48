use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::access::{authorize, Capability};
use super::directory::{DirectoryError, NotificationOutbox, RegistryStore};
use super::domain::{FacultyId, ScholarFilter, ScholarId};
use super::service::{
    FacultyRegistration, FacultyUpdate, MeetingRequest, NewDepartment, RegistryError,
    RegistryService, ScholarEnrollment, ScholarUpdate,
};
use crate::supervision::AssignmentRequest;

type Shared<St, N> = State<Arc<RegistryService<St, N>>>;

impl IntoResponse for RegistryError {
    fn into_response(self) -> Response {
        let (status, payload) = match &self {
            RegistryError::AssignmentRejected(decision) => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": self.to_string(),
                    "errors": decision.errors,
                    "warnings": decision.warnings,
                    "decision": decision,
                }),
            ),
            RegistryError::Validation(_) => {
                (StatusCode::BAD_REQUEST, json!({ "error": self.to_string() }))
            }
            RegistryError::Forbidden(_) => {
                (StatusCode::FORBIDDEN, json!({ "error": self.to_string() }))
            }
            RegistryError::Directory(DirectoryError::NotFound) => {
                (StatusCode::NOT_FOUND, json!({ "error": self.to_string() }))
            }
            RegistryError::Directory(DirectoryError::Conflict(_)) => {
                (StatusCode::CONFLICT, json!({ "error": self.to_string() }))
            }
            RegistryError::Directory(DirectoryError::Unavailable(_))
            | RegistryError::Notification(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": self.to_string() }),
            ),
        };
        (status, Json(payload)).into_response()
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct FacultyQuery {
    #[serde(default)]
    department: Option<String>,
}

/// Router builder exposing the registry and supervision endpoints.
pub fn registry_router<St, N>(service: Arc<RegistryService<St, N>>) -> Router
where
    St: RegistryStore,
    N: NotificationOutbox + 'static,
{
    Router::new()
        .route(
            "/api/v1/departments",
            get(list_departments_handler::<St, N>).post(create_department_handler::<St, N>),
        )
        .route(
            "/api/v1/faculty",
            get(list_faculty_handler::<St, N>).post(register_faculty_handler::<St, N>),
        )
        .route(
            "/api/v1/faculty/:faculty_id",
            get(faculty_handler::<St, N>).put(update_faculty_handler::<St, N>),
        )
        .route(
            "/api/v1/faculty/:faculty_id/notifications",
            get(notifications_handler::<St, N>),
        )
        .route(
            "/api/v1/scholars",
            get(list_scholars_handler::<St, N>).post(enroll_scholar_handler::<St, N>),
        )
        .route(
            "/api/v1/scholars/:scholar_id",
            get(scholar_handler::<St, N>).put(update_scholar_handler::<St, N>),
        )
        .route(
            "/api/v1/scholars/:scholar_id/deactivate",
            post(deactivate_scholar_handler::<St, N>),
        )
        .route(
            "/api/v1/scholars/:scholar_id/reactivate",
            post(reactivate_scholar_handler::<St, N>),
        )
        .route(
            "/api/v1/scholars/:scholar_id/meetings",
            get(meetings_handler::<St, N>).post(schedule_meeting_handler::<St, N>),
        )
        .route(
            "/api/v1/supervision/validate",
            post(validate_assignment_handler::<St, N>),
        )
        .with_state(service)
}

pub(crate) async fn list_departments_handler<St, N>(
    State(service): Shared<St, N>,
    headers: HeaderMap,
) -> Result<Response, RegistryError>
where
    St: RegistryStore,
    N: NotificationOutbox + 'static,
{
    authorize(&headers, Capability::ReadRegistry)?;
    Ok(Json(service.list_departments()?).into_response())
}

pub(crate) async fn create_department_handler<St, N>(
    State(service): Shared<St, N>,
    headers: HeaderMap,
    Json(input): Json<NewDepartment>,
) -> Result<Response, RegistryError>
where
    St: RegistryStore,
    N: NotificationOutbox + 'static,
{
    authorize(&headers, Capability::ManageDepartments)?;
    let department = service.create_department(input)?;
    Ok((StatusCode::CREATED, Json(department)).into_response())
}

pub(crate) async fn list_faculty_handler<St, N>(
    State(service): Shared<St, N>,
    headers: HeaderMap,
    Query(query): Query<FacultyQuery>,
) -> Result<Response, RegistryError>
where
    St: RegistryStore,
    N: NotificationOutbox + 'static,
{
    authorize(&headers, Capability::ReadRegistry)?;
    let faculty = service.list_faculty(query.department.as_deref())?;
    Ok(Json(faculty).into_response())
}

pub(crate) async fn register_faculty_handler<St, N>(
    State(service): Shared<St, N>,
    headers: HeaderMap,
    Json(input): Json<FacultyRegistration>,
) -> Result<Response, RegistryError>
where
    St: RegistryStore,
    N: NotificationOutbox + 'static,
{
    authorize(&headers, Capability::ManageFaculty)?;
    let view = service.register_faculty(input)?;
    Ok((StatusCode::CREATED, Json(view)).into_response())
}

pub(crate) async fn faculty_handler<St, N>(
    State(service): Shared<St, N>,
    headers: HeaderMap,
    Path(faculty_id): Path<String>,
) -> Result<Response, RegistryError>
where
    St: RegistryStore,
    N: NotificationOutbox + 'static,
{
    authorize(&headers, Capability::ReadRegistry)?;
    Ok(Json(service.faculty(&FacultyId(faculty_id))?).into_response())
}

pub(crate) async fn update_faculty_handler<St, N>(
    State(service): Shared<St, N>,
    headers: HeaderMap,
    Path(faculty_id): Path<String>,
    Json(update): Json<FacultyUpdate>,
) -> Result<Response, RegistryError>
where
    St: RegistryStore,
    N: NotificationOutbox + 'static,
{
    authorize(&headers, Capability::ManageFaculty)?;
    let view = service.update_faculty(&FacultyId(faculty_id), update)?;
    Ok(Json(view).into_response())
}

pub(crate) async fn notifications_handler<St, N>(
    State(service): Shared<St, N>,
    headers: HeaderMap,
    Path(faculty_id): Path<String>,
) -> Result<Response, RegistryError>
where
    St: RegistryStore,
    N: NotificationOutbox + 'static,
{
    authorize(&headers, Capability::ReadRegistry)?;
    let notifications = service.notifications_for(&FacultyId(faculty_id))?;
    Ok(Json(notifications).into_response())
}

pub(crate) async fn list_scholars_handler<St, N>(
    State(service): Shared<St, N>,
    headers: HeaderMap,
    Query(filter): Query<ScholarFilter>,
) -> Result<Response, RegistryError>
where
    St: RegistryStore,
    N: NotificationOutbox + 'static,
{
    authorize(&headers, Capability::ReadRegistry)?;
    Ok(Json(service.list_scholars(&filter)?).into_response())
}

pub(crate) async fn enroll_scholar_handler<St, N>(
    State(service): Shared<St, N>,
    headers: HeaderMap,
    Json(input): Json<ScholarEnrollment>,
) -> Result<Response, RegistryError>
where
    St: RegistryStore,
    N: NotificationOutbox + 'static,
{
    authorize(&headers, Capability::ManageScholars)?;
    let outcome = service.enroll_scholar(input)?;
    Ok((StatusCode::CREATED, Json(outcome)).into_response())
}

pub(crate) async fn scholar_handler<St, N>(
    State(service): Shared<St, N>,
    headers: HeaderMap,
    Path(scholar_id): Path<String>,
) -> Result<Response, RegistryError>
where
    St: RegistryStore,
    N: NotificationOutbox + 'static,
{
    authorize(&headers, Capability::ReadRegistry)?;
    Ok(Json(service.scholar(&ScholarId(scholar_id))?).into_response())
}

pub(crate) async fn update_scholar_handler<St, N>(
    State(service): Shared<St, N>,
    headers: HeaderMap,
    Path(scholar_id): Path<String>,
    Json(update): Json<ScholarUpdate>,
) -> Result<Response, RegistryError>
where
    St: RegistryStore,
    N: NotificationOutbox + 'static,
{
    authorize(&headers, Capability::ManageScholars)?;
    let outcome = service.update_scholar(&ScholarId(scholar_id), update)?;
    Ok(Json(outcome).into_response())
}

pub(crate) async fn deactivate_scholar_handler<St, N>(
    State(service): Shared<St, N>,
    headers: HeaderMap,
    Path(scholar_id): Path<String>,
) -> Result<Response, RegistryError>
where
    St: RegistryStore,
    N: NotificationOutbox + 'static,
{
    authorize(&headers, Capability::ManageScholars)?;
    Ok(Json(service.deactivate_scholar(&ScholarId(scholar_id))?).into_response())
}

pub(crate) async fn reactivate_scholar_handler<St, N>(
    State(service): Shared<St, N>,
    headers: HeaderMap,
    Path(scholar_id): Path<String>,
) -> Result<Response, RegistryError>
where
    St: RegistryStore,
    N: NotificationOutbox + 'static,
{
    authorize(&headers, Capability::ManageScholars)?;
    Ok(Json(service.reactivate_scholar(&ScholarId(scholar_id))?).into_response())
}

pub(crate) async fn meetings_handler<St, N>(
    State(service): Shared<St, N>,
    headers: HeaderMap,
    Path(scholar_id): Path<String>,
) -> Result<Response, RegistryError>
where
    St: RegistryStore,
    N: NotificationOutbox + 'static,
{
    authorize(&headers, Capability::ReadRegistry)?;
    Ok(Json(service.meetings_for(&ScholarId(scholar_id))?).into_response())
}

pub(crate) async fn schedule_meeting_handler<St, N>(
    State(service): Shared<St, N>,
    headers: HeaderMap,
    Path(scholar_id): Path<String>,
    Json(request): Json<MeetingRequest>,
) -> Result<Response, RegistryError>
where
    St: RegistryStore,
    N: NotificationOutbox + 'static,
{
    authorize(&headers, Capability::ScheduleMeetings)?;
    let meeting = service.schedule_meeting(&ScholarId(scholar_id), request)?;
    Ok((StatusCode::CREATED, Json(meeting)).into_response())
}

/// Returns the decision without persisting; a rejected pair still answers 200.
pub(crate) async fn validate_assignment_handler<St, N>(
    State(service): Shared<St, N>,
    headers: HeaderMap,
    Json(request): Json<AssignmentRequest>,
) -> Result<Response, RegistryError>
where
    St: RegistryStore,
    N: NotificationOutbox + 'static,
{
    authorize(&headers, Capability::PreviewAssignments)?;
    Ok(Json(service.validate_assignment(&request)).into_response())
}
