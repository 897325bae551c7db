//! End-to-end enrollment scenarios driven through the seeded store and the
//! HTTP router, exercising the same surface an API consumer would see.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::response::Response;
use serde_json::{json, Value};
use tower::ServiceExt;

use placement_hub::platform::domain::{CandidateActivity, EnrollmentStatus};
use placement_hub::platform::repository::{DirectoryRepository, EnrollmentRepository};
use placement_hub::platform::{
    platform_router, seed_demo_data, MemoryStore, PlatformState, SeedReport,
};

fn seeded() -> (Arc<MemoryStore>, SeedReport, axum::Router) {
    let store = Arc::new(MemoryStore::new());
    let report = seed_demo_data(store.clone()).expect("seed");
    let router = platform_router(PlatformState::new(store.clone()));
    (store, report, router)
}

async fn dispatch(router: &axum::Router, request: Request<Body>) -> Response {
    router.clone().oneshot(request).await.expect("dispatch")
}

fn get(uri: String) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

fn post(uri: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

async fn read_json_body(response: Response) -> Value {
    let body = to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

#[tokio::test]
async fn seeded_candidate_sees_scoped_and_public_listings() {
    let (_store, report, router) = seeded();

    let response = dispatch(
        &router,
        get(format!("/api/v1/candidates/{}/drives", report.candidate_id.0)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let payload = read_json_body(response).await;
    let available = payload
        .get("available")
        .and_then(|value| value.as_array())
        .expect("available array");
    // The institution-attached drive and the public drive.
    assert_eq!(available.len(), 2);
    let scoped = available
        .iter()
        .find(|entry| entry.get("id") == Some(&json!(report.gated_drive_id.0)))
        .expect("scoped drive listed");
    // The institution's price override wins over the base price.
    assert_eq!(scoped.get("base_price"), Some(&json!(799)));
    assert_ne!(scoped.get("attachment_id"), Some(&Value::Null));
}

#[tokio::test]
async fn gated_drive_requires_the_prerequisite_before_enrollment_succeeds() {
    let (store, report, router) = seeded();
    let enroll_uri = format!(
        "/api/v1/candidates/{}/drives/{}/enroll",
        report.candidate_id.0, report.gated_drive_id.0
    );

    let rejected = dispatch(&router, post(enroll_uri.clone())).await;
    assert_eq!(rejected.status(), StatusCode::FORBIDDEN);
    let payload = read_json_body(rejected).await;
    assert_eq!(
        payload.get("error"),
        Some(&json!("prerequisite_not_completed"))
    );
    let missing = payload
        .get("missing")
        .and_then(|value| value.as_array())
        .expect("missing array");
    assert_eq!(missing.len(), 1);
    assert_eq!(
        missing[0].get("id"),
        Some(&json!(report.prerequisite_id.0))
    );

    // Complete the prerequisite out of band, then enroll.
    store
        .insert_candidate_activity(CandidateActivity {
            candidate_id: report.candidate_id.clone(),
            activity_id: report.prerequisite_id.clone(),
            drive_id: None,
            status: EnrollmentStatus::Completed,
            enrolled_at: chrono::Utc::now(),
        })
        .expect("completion row");

    let created = dispatch(&router, post(enroll_uri.clone())).await;
    assert_eq!(created.status(), StatusCode::CREATED);
    let payload = read_json_body(created).await;
    assert_eq!(payload.get("already_enrolled"), Some(&json!(false)));
    let cascade = payload
        .get("candidate_activities")
        .and_then(|value| value.as_array())
        .expect("cascade rows");
    // Both pipeline stages gained rows; the already-completed prerequisite
    // kept its own untagged row.
    assert_eq!(cascade.len(), 2);

    let repeat = dispatch(&router, post(enroll_uri)).await;
    assert_eq!(repeat.status(), StatusCode::OK);
    let payload = read_json_body(repeat).await;
    assert_eq!(payload.get("already_enrolled"), Some(&json!(true)));
}

#[tokio::test]
async fn activity_detail_reveals_the_external_url_only_after_enrollment() {
    let (_store, report, router) = seeded();
    let detail_uri = format!(
        "/api/v1/candidates/{}/activities/{}",
        report.candidate_id.0, report.workshop_id.0
    );

    let before = dispatch(&router, get(detail_uri.clone())).await;
    assert_eq!(before.status(), StatusCode::OK);
    let payload = read_json_body(before).await;
    assert!(payload.get("external_url").is_none());

    let enrolled = dispatch(
        &router,
        post(format!(
            "/api/v1/candidates/{}/activities/{}/enroll",
            report.candidate_id.0, report.workshop_id.0
        )),
    )
    .await;
    assert_eq!(enrolled.status(), StatusCode::CREATED);

    let after = dispatch(&router, get(detail_uri)).await;
    let payload = read_json_body(after).await;
    assert_eq!(
        payload.get("external_url"),
        Some(&json!("https://workshops.example.com/resume"))
    );
}

#[tokio::test]
async fn placeholder_candidate_is_limited_to_the_public_catalog() {
    let (store, report, router) = seeded();
    let placeholder = store
        .candidate_by_email("dev.mehta@example.edu")
        .expect("lookup")
        .expect("seeded placeholder");

    let response = dispatch(
        &router,
        get(format!("/api/v1/candidates/{}/activities", placeholder.id.0)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    let available = payload
        .get("available")
        .and_then(|value| value.as_array())
        .expect("available array");
    assert!(available
        .iter()
        .all(|entry| entry.get("id") != Some(&json!(report.interview_id.0))));

    // The institution-only activity stays forbidden for the placeholder.
    let forbidden = dispatch(
        &router,
        get(format!(
            "/api/v1/candidates/{}/activities/{}",
            placeholder.id.0, report.interview_id.0
        )),
    )
    .await;
    assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);
}
