use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::availability;
use super::catalog::{
    ActivityDraft, AttachmentDraft, CatalogError, CatalogService, DriveDraft,
};
use super::domain::{ActivityId, CandidateId, DriveId, InstitutionId, VerificationStatus};
use super::enrollment::{EnrollmentError, EnrollmentService};
use super::onboarding::{OnboardingError, OnboardingForm, OnboardingService, ProfileUpdate};
use super::repository::{PlatformRepository, RepositoryError};

/// Shared handler state: the services plus the repository itself for the
/// read-only availability aggregations.
pub struct PlatformState<R> {
    pub repository: Arc<R>,
    pub enrollment: Arc<EnrollmentService<R>>,
    pub catalog: Arc<CatalogService<R>>,
    pub onboarding: Arc<OnboardingService<R>>,
}

impl<R> PlatformState<R>
where
    R: PlatformRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self {
            enrollment: Arc::new(EnrollmentService::new(repository.clone())),
            catalog: Arc::new(CatalogService::new(repository.clone())),
            onboarding: Arc::new(OnboardingService::new(repository.clone())),
            repository,
        }
    }
}

impl<R> Clone for PlatformState<R> {
    fn clone(&self) -> Self {
        Self {
            repository: self.repository.clone(),
            enrollment: self.enrollment.clone(),
            catalog: self.catalog.clone(),
            onboarding: self.onboarding.clone(),
        }
    }
}

/// Router builder exposing the candidate and admin HTTP endpoints.
pub fn platform_router<R>(state: PlatformState<R>) -> Router
where
    R: PlatformRepository + 'static,
{
    Router::new()
        .route("/api/v1/candidates", post(register_candidate_handler::<R>))
        .route(
            "/api/v1/candidates/:candidate_id/onboarding",
            post(onboarding_handler::<R>),
        )
        .route(
            "/api/v1/candidates/:candidate_id/profile",
            put(profile_handler::<R>),
        )
        .route(
            "/api/v1/candidates/:candidate_id/activities",
            get(candidate_activities_handler::<R>),
        )
        .route(
            "/api/v1/candidates/:candidate_id/drives",
            get(candidate_drives_handler::<R>),
        )
        .route(
            "/api/v1/candidates/:candidate_id/activities/:activity_id",
            get(activity_detail_handler::<R>),
        )
        .route(
            "/api/v1/candidates/:candidate_id/drives/:drive_id",
            get(drive_detail_handler::<R>),
        )
        .route(
            "/api/v1/candidates/:candidate_id/activities/:activity_id/enroll",
            post(enroll_activity_handler::<R>),
        )
        .route(
            "/api/v1/candidates/:candidate_id/drives/:drive_id/enroll",
            post(enroll_drive_handler::<R>),
        )
        .route("/api/v1/activities", post(create_activity_handler::<R>))
        .route(
            "/api/v1/activities/:activity_id",
            put(update_activity_handler::<R>),
        )
        .route("/api/v1/drives", post(create_drive_handler::<R>))
        .route("/api/v1/drives/:drive_id", put(update_drive_handler::<R>))
        .route("/api/v1/departments", get(departments_handler::<R>))
        .route(
            "/api/v1/institutions",
            get(institutions_handler::<R>).post(register_institution_handler::<R>),
        )
        .route(
            "/api/v1/institutions/:institution_id/verify",
            post(verify_institution_handler::<R>),
        )
        .route(
            "/api/v1/institutions/:institution_id/activities",
            post(attach_activity_handler::<R>),
        )
        .route(
            "/api/v1/institutions/:institution_id/drives",
            post(attach_drive_handler::<R>),
        )
        .with_state(state)
}

fn enrollment_failure(error: EnrollmentError) -> Response {
    match error {
        EnrollmentError::CandidateNotFound
        | EnrollmentError::ActivityNotFound
        | EnrollmentError::DriveNotFound => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        EnrollmentError::NotAvailable => {
            let payload = json!({ "error": "not available for your institution" });
            (StatusCode::FORBIDDEN, axum::Json(payload)).into_response()
        }
        EnrollmentError::PrerequisiteNotCompleted { missing } => {
            let payload = json!({
                "error": "prerequisite_not_completed",
                "missing": missing,
            });
            (StatusCode::FORBIDDEN, axum::Json(payload)).into_response()
        }
        EnrollmentError::Repository(err) => repository_failure(err),
    }
}

fn catalog_failure(error: CatalogError) -> Response {
    match error {
        CatalogError::ActivityNotFound
        | CatalogError::DriveNotFound
        | CatalogError::InstitutionNotFound => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        CatalogError::DuplicateAttachment => {
            let payload = json!({ "error": "already attached to this institution" });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        CatalogError::Repository(err) => repository_failure(err),
    }
}

fn onboarding_failure(error: OnboardingError) -> Response {
    match error {
        OnboardingError::CandidateNotFound | OnboardingError::DepartmentNotFound => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        OnboardingError::EmailAlreadyRegistered
        | OnboardingError::StudentIdTaken
        | OnboardingError::InstitutionMismatch => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        OnboardingError::SemesterOutOfRange | OnboardingError::AgeOutOfRange => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
        }
        OnboardingError::Catalog(err) => catalog_failure(err),
        OnboardingError::Repository(err) => repository_failure(err),
    }
}

fn repository_failure(error: RepositoryError) -> Response {
    let payload = json!({ "error": error.to_string() });
    (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
}

#[derive(Debug, Deserialize)]
struct RegisterCandidateRequest {
    email: String,
}

pub(crate) async fn register_candidate_handler<R>(
    State(state): State<PlatformState<R>>,
    axum::Json(request): axum::Json<RegisterCandidateRequest>,
) -> Response
where
    R: PlatformRepository + 'static,
{
    match state.onboarding.register_email(&request.email) {
        Ok(candidate) => (StatusCode::CREATED, axum::Json(candidate)).into_response(),
        Err(err) => onboarding_failure(err),
    }
}

pub(crate) async fn onboarding_handler<R>(
    State(state): State<PlatformState<R>>,
    Path(candidate_id): Path<String>,
    axum::Json(form): axum::Json<OnboardingForm>,
) -> Response
where
    R: PlatformRepository + 'static,
{
    let id = CandidateId(candidate_id);
    match state.onboarding.complete_onboarding(&id, form) {
        Ok(candidate) => (StatusCode::OK, axum::Json(candidate)).into_response(),
        Err(err) => onboarding_failure(err),
    }
}

pub(crate) async fn profile_handler<R>(
    State(state): State<PlatformState<R>>,
    Path(candidate_id): Path<String>,
    axum::Json(update): axum::Json<ProfileUpdate>,
) -> Response
where
    R: PlatformRepository + 'static,
{
    let id = CandidateId(candidate_id);
    match state.onboarding.update_profile(&id, update) {
        Ok(candidate) => (StatusCode::OK, axum::Json(candidate)).into_response(),
        Err(err) => onboarding_failure(err),
    }
}

pub(crate) async fn candidate_activities_handler<R>(
    State(state): State<PlatformState<R>>,
    Path(candidate_id): Path<String>,
) -> Response
where
    R: PlatformRepository + 'static,
{
    let id = CandidateId(candidate_id);
    match availability::activities_for_candidate(state.repository.as_ref(), &id) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(err) => enrollment_failure(err),
    }
}

pub(crate) async fn candidate_drives_handler<R>(
    State(state): State<PlatformState<R>>,
    Path(candidate_id): Path<String>,
) -> Response
where
    R: PlatformRepository + 'static,
{
    let id = CandidateId(candidate_id);
    match availability::drives_for_candidate(state.repository.as_ref(), &id) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(err) => enrollment_failure(err),
    }
}

pub(crate) async fn activity_detail_handler<R>(
    State(state): State<PlatformState<R>>,
    Path((candidate_id, activity_id)): Path<(String, String)>,
) -> Response
where
    R: PlatformRepository + 'static,
{
    let candidate = CandidateId(candidate_id);
    let activity = ActivityId(activity_id);
    match state.enrollment.activity_detail(&candidate, &activity) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(err) => enrollment_failure(err),
    }
}

pub(crate) async fn drive_detail_handler<R>(
    State(state): State<PlatformState<R>>,
    Path((candidate_id, drive_id)): Path<(String, String)>,
) -> Response
where
    R: PlatformRepository + 'static,
{
    let candidate = CandidateId(candidate_id);
    let drive = DriveId(drive_id);
    match state.enrollment.drive_detail(&candidate, &drive) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(err) => enrollment_failure(err),
    }
}

pub(crate) async fn enroll_activity_handler<R>(
    State(state): State<PlatformState<R>>,
    Path((candidate_id, activity_id)): Path<(String, String)>,
) -> Response
where
    R: PlatformRepository + 'static,
{
    let candidate = CandidateId(candidate_id);
    let activity = ActivityId(activity_id);
    match state.enrollment.enroll_in_activity(&candidate, &activity, None) {
        Ok(row) => (StatusCode::CREATED, axum::Json(row)).into_response(),
        Err(err) => enrollment_failure(err),
    }
}

pub(crate) async fn enroll_drive_handler<R>(
    State(state): State<PlatformState<R>>,
    Path((candidate_id, drive_id)): Path<(String, String)>,
) -> Response
where
    R: PlatformRepository + 'static,
{
    let candidate = CandidateId(candidate_id);
    let drive = DriveId(drive_id);
    match state.enrollment.enroll_in_drive(&candidate, &drive) {
        Ok(receipt) => {
            let code = if receipt.already_enrolled {
                StatusCode::OK
            } else {
                StatusCode::CREATED
            };
            (code, axum::Json(receipt)).into_response()
        }
        Err(err) => enrollment_failure(err),
    }
}

pub(crate) async fn create_activity_handler<R>(
    State(state): State<PlatformState<R>>,
    axum::Json(draft): axum::Json<ActivityDraft>,
) -> Response
where
    R: PlatformRepository + 'static,
{
    match state.catalog.create_activity(draft) {
        Ok(activity) => (StatusCode::CREATED, axum::Json(activity)).into_response(),
        Err(err) => catalog_failure(err),
    }
}

pub(crate) async fn update_activity_handler<R>(
    State(state): State<PlatformState<R>>,
    Path(activity_id): Path<String>,
    axum::Json(draft): axum::Json<ActivityDraft>,
) -> Response
where
    R: PlatformRepository + 'static,
{
    let id = ActivityId(activity_id);
    match state.catalog.update_activity(&id, draft) {
        Ok(activity) => (StatusCode::OK, axum::Json(activity)).into_response(),
        Err(err) => catalog_failure(err),
    }
}

pub(crate) async fn create_drive_handler<R>(
    State(state): State<PlatformState<R>>,
    axum::Json(draft): axum::Json<DriveDraft>,
) -> Response
where
    R: PlatformRepository + 'static,
{
    match state.catalog.create_drive(draft) {
        Ok(drive) => (StatusCode::CREATED, axum::Json(drive)).into_response(),
        Err(err) => catalog_failure(err),
    }
}

pub(crate) async fn update_drive_handler<R>(
    State(state): State<PlatformState<R>>,
    Path(drive_id): Path<String>,
    axum::Json(draft): axum::Json<DriveDraft>,
) -> Response
where
    R: PlatformRepository + 'static,
{
    let id = DriveId(drive_id);
    match state.catalog.update_drive(&id, draft) {
        Ok(drive) => (StatusCode::OK, axum::Json(drive)).into_response(),
        Err(err) => catalog_failure(err),
    }
}

pub(crate) async fn departments_handler<R>(State(state): State<PlatformState<R>>) -> Response
where
    R: PlatformRepository + 'static,
{
    match state.repository.departments() {
        Ok(departments) => (StatusCode::OK, axum::Json(departments)).into_response(),
        Err(err) => repository_failure(err),
    }
}

/// Verified institutions only, for the onboarding form's selection list.
pub(crate) async fn institutions_handler<R>(State(state): State<PlatformState<R>>) -> Response
where
    R: PlatformRepository + 'static,
{
    match state.repository.institutions(false) {
        Ok(institutions) => (StatusCode::OK, axum::Json(institutions)).into_response(),
        Err(err) => repository_failure(err),
    }
}

#[derive(Debug, Deserialize)]
struct RegisterInstitutionRequest {
    name: String,
    #[serde(default)]
    city: String,
    #[serde(default)]
    state: String,
    #[serde(default)]
    status: Option<VerificationStatus>,
}

pub(crate) async fn register_institution_handler<R>(
    State(state): State<PlatformState<R>>,
    axum::Json(request): axum::Json<RegisterInstitutionRequest>,
) -> Response
where
    R: PlatformRepository + 'static,
{
    match state.catalog.register_institution(
        request.name,
        request.city,
        request.state,
        request.status,
    ) {
        Ok(institution) => (StatusCode::CREATED, axum::Json(institution)).into_response(),
        Err(err) => catalog_failure(err),
    }
}

pub(crate) async fn verify_institution_handler<R>(
    State(state): State<PlatformState<R>>,
    Path(institution_id): Path<String>,
) -> Response
where
    R: PlatformRepository + 'static,
{
    let id = InstitutionId(institution_id);
    match state.catalog.verify_institution(&id) {
        Ok(institution) => (StatusCode::OK, axum::Json(institution)).into_response(),
        Err(err) => catalog_failure(err),
    }
}

#[derive(Debug, Deserialize)]
struct AttachActivityRequest {
    activity_id: ActivityId,
    #[serde(flatten)]
    overrides: AttachmentDraft,
}

pub(crate) async fn attach_activity_handler<R>(
    State(state): State<PlatformState<R>>,
    Path(institution_id): Path<String>,
    axum::Json(request): axum::Json<AttachActivityRequest>,
) -> Response
where
    R: PlatformRepository + 'static,
{
    let institution = InstitutionId(institution_id);
    match state
        .catalog
        .attach_activity(&institution, &request.activity_id, request.overrides)
    {
        Ok(attachment) => (StatusCode::CREATED, axum::Json(attachment)).into_response(),
        Err(err) => catalog_failure(err),
    }
}

#[derive(Debug, Deserialize)]
struct AttachDriveRequest {
    drive_id: DriveId,
    #[serde(flatten)]
    overrides: AttachmentDraft,
}

pub(crate) async fn attach_drive_handler<R>(
    State(state): State<PlatformState<R>>,
    Path(institution_id): Path<String>,
    axum::Json(request): axum::Json<AttachDriveRequest>,
) -> Response
where
    R: PlatformRepository + 'static,
{
    let institution = InstitutionId(institution_id);
    match state
        .catalog
        .attach_drive(&institution, &request.drive_id, request.overrides)
    {
        Ok(attachment) => (StatusCode::CREATED, axum::Json(attachment)).into_response(),
        Err(err) => catalog_failure(err),
    }
}
