use super::common::*;

use crate::platform::domain::{AudienceTag, EnrollmentStatus};
use crate::platform::eligibility::{check_prerequisites, PrerequisiteCheck};
use crate::platform::repository::{CatalogRepository, EnrollmentRepository};

fn gated_drive_store() -> std::sync::Arc<crate::platform::store::MemoryStore> {
    let store = store();
    store
        .insert_drive(drive("drv-1", "Gated Drive", &[AudienceTag::Public]))
        .expect("drive");
    store
        .insert_activity(activity("act-pre", "Aptitude Screening", &[AudienceTag::Public]))
        .expect("activity");
    store
        .insert_activity(activity("act-stage", "Interview Stage", &[AudienceTag::Public]))
        .expect("activity");
    store
        .replace_drive_activities(
            &drive_id("drv-1"),
            vec![prerequisite("drv-1", "act-pre"), stage("drv-1", "act-stage")],
        )
        .expect("pipeline");
    store
}

#[test]
fn drive_without_prerequisites_is_satisfied() {
    let store = store();
    store
        .insert_drive(drive("drv-1", "Open Drive", &[AudienceTag::Public]))
        .expect("drive");
    store
        .insert_activity(activity("act-stage", "Interview Stage", &[AudienceTag::Public]))
        .expect("activity");
    store
        .replace_drive_activities(&drive_id("drv-1"), vec![stage("drv-1", "act-stage")])
        .expect("pipeline");

    let check = check_prerequisites(store.as_ref(), &candidate_id("cand-1"), &drive_id("drv-1"))
        .expect("check");
    assert_eq!(check, PrerequisiteCheck::Satisfied);
}

#[test]
fn missing_prerequisites_are_reported_with_names() {
    let store = gated_drive_store();

    let check = check_prerequisites(store.as_ref(), &candidate_id("cand-1"), &drive_id("drv-1"))
        .expect("check");
    match check {
        PrerequisiteCheck::Missing(missing) => {
            assert_eq!(missing.len(), 1);
            assert_eq!(missing[0].id, activity_id("act-pre"));
            assert_eq!(missing[0].name, "Aptitude Screening");
        }
        PrerequisiteCheck::Satisfied => panic!("gate should not be satisfied"),
    }
}

#[test]
fn enrolled_but_not_completed_does_not_satisfy_the_gate() {
    let store = gated_drive_store();
    store
        .insert_candidate_activity(enrollment_row(
            "cand-1",
            "act-pre",
            EnrollmentStatus::Enrolled,
        ))
        .expect("row");

    let check = check_prerequisites(store.as_ref(), &candidate_id("cand-1"), &drive_id("drv-1"))
        .expect("check");
    assert!(matches!(check, PrerequisiteCheck::Missing(missing) if missing.len() == 1));
}

#[test]
fn completed_prerequisite_satisfies_the_gate() {
    let store = gated_drive_store();
    store
        .insert_candidate_activity(enrollment_row(
            "cand-1",
            "act-pre",
            EnrollmentStatus::Completed,
        ))
        .expect("row");

    let check = check_prerequisites(store.as_ref(), &candidate_id("cand-1"), &drive_id("drv-1"))
        .expect("check");
    assert_eq!(check, PrerequisiteCheck::Satisfied);
}

#[test]
fn completing_a_stage_activity_does_not_stand_in_for_the_prerequisite() {
    let store = gated_drive_store();
    store
        .insert_candidate_activity(enrollment_row(
            "cand-1",
            "act-stage",
            EnrollmentStatus::Completed,
        ))
        .expect("row");

    let check = check_prerequisites(store.as_ref(), &candidate_id("cand-1"), &drive_id("drv-1"))
        .expect("check");
    assert!(matches!(check, PrerequisiteCheck::Missing(_)));
}
