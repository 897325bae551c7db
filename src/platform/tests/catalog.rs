use super::common::*;

use crate::platform::catalog::{
    ActivityDraft, AttachmentDraft, CatalogError, CatalogService, DriveDraft,
};
use crate::platform::domain::{
    ActivityCategory, ActivityKind, AudienceTag, DriveActivityKind, EntityStatus,
    VerificationStatus,
};
use crate::platform::repository::{CatalogRepository, DirectoryRepository};

fn activity_draft(name: &str) -> ActivityDraft {
    ActivityDraft {
        name: name.to_string(),
        kind: ActivityKind::Course,
        category: ActivityCategory::Independent,
        description: format!("{name} description"),
        details: String::new(),
        key_points: Vec::new(),
        base_price: 300,
        min_cgpa: None,
        min_semester: None,
        applies: tags(&[AudienceTag::Public]),
        departments: Vec::new(),
        external_url: None,
        status: Some(EntityStatus::Active),
    }
}

fn drive_draft(name: &str) -> DriveDraft {
    DriveDraft {
        name: name.to_string(),
        company_name: Some("Acme Corp".to_string()),
        company_details: String::new(),
        requirements: String::new(),
        available_positions: 5,
        description: format!("{name} description"),
        key_points: Vec::new(),
        base_price: 700,
        min_cgpa: None,
        min_semester: None,
        applies: tags(&[AudienceTag::Public]),
        departments: Vec::new(),
        status: Some(EntityStatus::Active),
        stages: Vec::new(),
        prerequisites: Vec::new(),
    }
}

#[test]
fn created_activities_default_to_pending_without_an_explicit_status() {
    let store = store();
    let catalog = CatalogService::new(store.clone());

    let mut draft = activity_draft("Draft Course");
    draft.status = None;
    let created = catalog.create_activity(draft).expect("create");
    assert_eq!(created.status, EntityStatus::Pending);

    let mut update = activity_draft("Draft Course");
    update.status = None;
    update.base_price = 450;
    let updated = catalog.update_activity(&created.id, update).expect("update");
    assert_eq!(updated.status, EntityStatus::Pending);
    assert_eq!(updated.base_price, 450);
    assert_eq!(updated.created_at, created.created_at);
}

#[test]
fn drive_pipeline_rows_are_created_and_replaced_wholesale() {
    let store = store();
    let catalog = CatalogService::new(store.clone());

    let screening = catalog
        .create_activity(activity_draft("Aptitude Screening"))
        .expect("activity");
    let interview = catalog
        .create_activity(activity_draft("Interview Stage"))
        .expect("activity");

    let mut draft = drive_draft("Graduate Drive");
    draft.stages = vec![interview.id.clone()];
    draft.prerequisites = vec![screening.id.clone()];
    let created = catalog.create_drive(draft).expect("drive");

    let rows = store.drive_activities(&created.id).expect("pipeline");
    assert_eq!(rows.len(), 2);

    let mut update = drive_draft("Graduate Drive");
    update.stages = vec![interview.id.clone()];
    let updated = catalog.update_drive(&created.id, update).expect("update");
    assert_eq!(updated.id, created.id);

    let rows = store.drive_activities(&created.id).expect("pipeline");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].kind, DriveActivityKind::Stage);
    assert_eq!(rows[0].activity_id, interview.id);
}

#[test]
fn drive_pipeline_rejects_unknown_activity_ids() {
    let store = store();
    let catalog = CatalogService::new(store.clone());

    let mut draft = drive_draft("Broken Drive");
    draft.stages = vec![activity_id("act-nope")];
    let outcome = catalog.create_drive(draft);
    assert!(matches!(outcome, Err(CatalogError::ActivityNotFound)));
}

#[test]
fn duplicate_attachment_is_rejected() {
    let store = store();
    let catalog = CatalogService::new(store.clone());

    let institution = catalog
        .register_institution(
            "Global Institute".to_string(),
            "Munich".to_string(),
            "Bavaria".to_string(),
            Some(VerificationStatus::Verified),
        )
        .expect("institution");
    let activity = catalog
        .create_activity(activity_draft("Campus Course"))
        .expect("activity");

    let first = catalog
        .attach_activity(&institution.id, &activity.id, AttachmentDraft::default())
        .expect("attachment");
    assert_eq!(first.institution_id, institution.id);

    let second = catalog.attach_activity(
        &institution.id,
        &activity.id,
        AttachmentDraft {
            base_price: Some(100),
            ..AttachmentDraft::default()
        },
    );
    assert!(matches!(second, Err(CatalogError::DuplicateAttachment)));

    // Only the original attachment row survives.
    let rows = store
        .institution_activities(&institution.id)
        .expect("rows");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].base_price, None);
}

#[test]
fn attaching_to_an_unknown_institution_is_not_found() {
    let store = store();
    let catalog = CatalogService::new(store.clone());
    let activity = catalog
        .create_activity(activity_draft("Campus Course"))
        .expect("activity");

    let outcome = catalog.attach_activity(
        &institution_id("inst-nope"),
        &activity.id,
        AttachmentDraft::default(),
    );
    assert!(matches!(outcome, Err(CatalogError::InstitutionNotFound)));
}

#[test]
fn get_or_create_institution_reuses_by_id_then_name() {
    let store = store();
    let catalog = CatalogService::new(store.clone());

    let existing = catalog
        .register_institution(
            "Tech University".to_string(),
            "Berlin".to_string(),
            "Berlin".to_string(),
            Some(VerificationStatus::Verified),
        )
        .expect("institution");

    let by_id = catalog
        .get_or_create_institution(Some(&existing.id), "ignored")
        .expect("by id");
    assert_eq!(by_id.id, existing.id);

    let by_name = catalog
        .get_or_create_institution(None, "Tech University")
        .expect("by name");
    assert_eq!(by_name.id, existing.id);

    let created = catalog
        .get_or_create_institution(None, "Night School")
        .expect("lazy creation");
    assert_ne!(created.id, existing.id);
    assert_eq!(created.status, VerificationStatus::Unverified);
    assert!(store
        .institution_by_name("Night School")
        .expect("lookup")
        .is_some());
}

#[test]
fn verify_institution_flips_the_status() {
    let store = store();
    let catalog = CatalogService::new(store.clone());

    let created = catalog
        .register_institution(
            "Night School".to_string(),
            String::new(),
            String::new(),
            None,
        )
        .expect("institution");
    assert_eq!(created.status, VerificationStatus::Unverified);

    let verified = catalog.verify_institution(&created.id).expect("verify");
    assert_eq!(verified.status, VerificationStatus::Verified);
}
