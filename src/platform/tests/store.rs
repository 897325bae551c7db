use super::common::*;

use crate::platform::domain::EnrollmentStatus;
use crate::platform::repository::{EnrollmentRepository, RepositoryError};

#[test]
fn transaction_rolls_back_every_staged_write_on_error() {
    let store = store();

    let outcome: Result<(), RepositoryError> = store.transaction(|state| {
        state.insert_candidate_drive(drive_enrollment_row("cand-1", "drv-1"))?;
        state.insert_candidate_activity_skipping_duplicate(enrollment_row(
            "cand-1",
            "act-1",
            EnrollmentStatus::Enrolled,
        ));
        Err(RepositoryError::Unavailable("induced failure".to_string()))
    });
    assert!(outcome.is_err());

    // Neither staged row is visible.
    assert!(store
        .candidate_drive(&candidate_id("cand-1"), &drive_id("drv-1"))
        .expect("lookup")
        .is_none());
    assert!(store
        .candidate_activity(&candidate_id("cand-1"), &activity_id("act-1"))
        .expect("lookup")
        .is_none());
}

#[test]
fn create_drive_enrollment_conflicts_on_an_existing_pair_without_side_effects() {
    let store = store();
    store
        .create_drive_enrollment(
            drive_enrollment_row("cand-1", "drv-1"),
            vec![enrollment_row("cand-1", "act-1", EnrollmentStatus::Enrolled)],
        )
        .expect("first enrollment");

    let outcome = store.create_drive_enrollment(
        drive_enrollment_row("cand-1", "drv-1"),
        vec![enrollment_row("cand-1", "act-2", EnrollmentStatus::Enrolled)],
    );
    assert!(matches!(outcome, Err(RepositoryError::Conflict)));

    // The conflicting call's cascade row was rolled back with it.
    assert!(store
        .candidate_activity(&candidate_id("cand-1"), &activity_id("act-2"))
        .expect("lookup")
        .is_none());
}

#[test]
fn ensure_candidate_activities_skips_existing_pairs() {
    let store = store();
    store
        .insert_candidate_activity(enrollment_row(
            "cand-1",
            "act-1",
            EnrollmentStatus::Completed,
        ))
        .expect("row");

    let created = store
        .ensure_candidate_activities(vec![
            enrollment_row("cand-1", "act-1", EnrollmentStatus::Enrolled),
            enrollment_row("cand-1", "act-2", EnrollmentStatus::Enrolled),
        ])
        .expect("bulk insert");

    assert_eq!(created.len(), 1);
    assert_eq!(created[0].activity_id, activity_id("act-2"));

    // The pre-existing completed row was not downgraded.
    let kept = store
        .candidate_activity(&candidate_id("cand-1"), &activity_id("act-1"))
        .expect("lookup")
        .expect("row kept");
    assert_eq!(kept.status, EnrollmentStatus::Completed);
}

#[test]
fn duplicate_candidate_activity_insert_conflicts() {
    let store = store();
    store
        .insert_candidate_activity(enrollment_row(
            "cand-1",
            "act-1",
            EnrollmentStatus::Enrolled,
        ))
        .expect("row");

    let outcome = store.insert_candidate_activity(enrollment_row(
        "cand-1",
        "act-1",
        EnrollmentStatus::Enrolled,
    ));
    assert!(matches!(outcome, Err(RepositoryError::Conflict)));
}
