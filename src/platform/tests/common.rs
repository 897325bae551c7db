use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::platform::domain::{
    Activity, ActivityCategory, ActivityId, ActivityKind, AttachmentId, AudienceTag, Candidate,
    CandidateActivity, CandidateDrive, CandidateId, CandidateLifecycle, Department, DepartmentId,
    Drive, DriveActivity, DriveActivityKind, DriveId, EnrollmentStatus, EntityStatus, Gender,
    Institution, InstitutionActivity, InstitutionDrive, InstitutionId, VerificationStatus,
};
use crate::platform::repository::{CatalogRepository, DirectoryRepository};
use crate::platform::store::MemoryStore;

pub(super) fn store() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::new())
}

/// Fixed base instant plus an offset in minutes, so ordering assertions are
/// deterministic.
pub(super) fn ts(minutes: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap() + Duration::minutes(minutes)
}

pub(super) fn tags(items: &[AudienceTag]) -> BTreeSet<AudienceTag> {
    items.iter().copied().collect()
}

pub(super) fn activity(id: &str, name: &str, applies: &[AudienceTag]) -> Activity {
    Activity {
        id: ActivityId(id.to_string()),
        name: name.to_string(),
        kind: ActivityKind::Course,
        category: ActivityCategory::Independent,
        description: format!("{name} description"),
        details: String::new(),
        key_points: Vec::new(),
        base_price: 500,
        min_cgpa: None,
        min_semester: None,
        applies: tags(applies),
        departments: Vec::new(),
        external_url: None,
        status: EntityStatus::Active,
        created_at: ts(0),
        updated_at: ts(0),
    }
}

pub(super) fn drive(id: &str, name: &str, applies: &[AudienceTag]) -> Drive {
    Drive {
        id: DriveId(id.to_string()),
        name: name.to_string(),
        company_name: Some("Acme Corp".to_string()),
        company_details: String::new(),
        requirements: String::new(),
        available_positions: 10,
        description: format!("{name} description"),
        key_points: Vec::new(),
        base_price: 900,
        min_cgpa: None,
        min_semester: None,
        applies: tags(applies),
        departments: Vec::new(),
        status: EntityStatus::Active,
        created_at: ts(0),
        updated_at: ts(0),
    }
}

pub(super) fn institution(id: &str, name: &str) -> Institution {
    Institution {
        id: InstitutionId(id.to_string()),
        name: name.to_string(),
        city: "Munich".to_string(),
        state: "Bavaria".to_string(),
        status: VerificationStatus::Verified,
        contact_person: None,
        contact_phone: None,
        created_at: ts(0),
        updated_at: ts(0),
    }
}

pub(super) fn department(id: &str, short_name: &str) -> Department {
    Department {
        id: DepartmentId(id.to_string()),
        name: short_name.to_string(),
        short_name: short_name.to_string(),
        full_name: format!("Department of {short_name}"),
        description: String::new(),
    }
}

pub(super) fn candidate(id: &str, institution: Option<&str>) -> Candidate {
    Candidate {
        id: CandidateId(id.to_string()),
        email: format!("{id}@example.edu"),
        first_name: "Test".to_string(),
        last_name: "Candidate".to_string(),
        student_id: format!("sid-{id}"),
        age: 21,
        gender: Gender::Other,
        semester: 6,
        cgpa: Some(7.5),
        bio: None,
        resume: None,
        additional_documents: Vec::new(),
        lifecycle: CandidateLifecycle::Onboarded,
        verification: VerificationStatus::Verified,
        institution_id: institution.map(|value| InstitutionId(value.to_string())),
        department_id: None,
        created_at: ts(0),
        updated_at: ts(0),
    }
}

pub(super) fn placeholder_candidate(id: &str) -> Candidate {
    Candidate::placeholder(CandidateId(id.to_string()), format!("{id}@example.edu"), ts(0))
}

pub(super) fn activity_attachment(
    id: &str,
    institution: &str,
    activity: &str,
    minutes: i64,
) -> InstitutionActivity {
    InstitutionActivity {
        id: AttachmentId(id.to_string()),
        institution_id: InstitutionId(institution.to_string()),
        activity_id: ActivityId(activity.to_string()),
        base_price: None,
        min_cgpa: None,
        min_semester: None,
        is_required: false,
        status: EntityStatus::Active,
        created_at: ts(minutes),
    }
}

pub(super) fn drive_attachment(
    id: &str,
    institution: &str,
    drive: &str,
    minutes: i64,
) -> InstitutionDrive {
    InstitutionDrive {
        id: AttachmentId(id.to_string()),
        institution_id: InstitutionId(institution.to_string()),
        drive_id: DriveId(drive.to_string()),
        base_price: None,
        min_cgpa: None,
        min_semester: None,
        is_required: false,
        status: EntityStatus::Active,
        created_at: ts(minutes),
    }
}

pub(super) fn stage(drive: &str, activity: &str) -> DriveActivity {
    DriveActivity {
        drive_id: DriveId(drive.to_string()),
        activity_id: ActivityId(activity.to_string()),
        kind: DriveActivityKind::Stage,
        base_price: 0,
    }
}

pub(super) fn prerequisite(drive: &str, activity: &str) -> DriveActivity {
    DriveActivity {
        drive_id: DriveId(drive.to_string()),
        activity_id: ActivityId(activity.to_string()),
        kind: DriveActivityKind::Prerequisite,
        base_price: 0,
    }
}

pub(super) fn enrollment_row(
    candidate: &str,
    activity: &str,
    status: EnrollmentStatus,
) -> CandidateActivity {
    CandidateActivity {
        candidate_id: CandidateId(candidate.to_string()),
        activity_id: ActivityId(activity.to_string()),
        drive_id: None,
        status,
        enrolled_at: ts(1),
    }
}

pub(super) fn drive_enrollment_row(candidate: &str, drive: &str) -> CandidateDrive {
    CandidateDrive {
        candidate_id: CandidateId(candidate.to_string()),
        drive_id: DriveId(drive.to_string()),
        status: EnrollmentStatus::Enrolled,
        applied_at: ts(1),
    }
}

pub(super) fn activity_id(value: &str) -> ActivityId {
    ActivityId(value.to_string())
}

pub(super) fn drive_id(value: &str) -> DriveId {
    DriveId(value.to_string())
}

pub(super) fn candidate_id(value: &str) -> CandidateId {
    CandidateId(value.to_string())
}

pub(super) fn institution_id(value: &str) -> InstitutionId {
    InstitutionId(value.to_string())
}

/// A campus with one institution-only activity and drive attached to the
/// institution, one public activity and drive, and an onboarded candidate.
pub(super) struct Campus {
    pub store: Arc<MemoryStore>,
    pub candidate: CandidateId,
    pub public_activity: ActivityId,
    pub scoped_activity: ActivityId,
    pub public_drive: DriveId,
    pub scoped_drive: DriveId,
}

pub(super) fn campus() -> Campus {
    let store = store();
    store
        .insert_institution(institution("inst-1", "Global Institute"))
        .expect("institution");
    store
        .insert_candidate(candidate("cand-1", Some("inst-1")))
        .expect("candidate");

    store
        .insert_activity(activity("act-pub", "Resume Workshop", &[AudienceTag::Public]))
        .expect("activity");
    store
        .insert_activity(activity(
            "act-scoped",
            "Mock Interview",
            &[AudienceTag::Institution],
        ))
        .expect("activity");
    store
        .attach_activity(activity_attachment("att-1", "inst-1", "act-scoped", 5))
        .expect("attachment");

    store
        .insert_drive(drive("drv-pub", "Helix Internship Drive", &[AudienceTag::Public]))
        .expect("drive");
    store
        .insert_drive(drive(
            "drv-scoped",
            "Orion Graduate Drive",
            &[AudienceTag::Institution],
        ))
        .expect("drive");
    store
        .attach_drive(drive_attachment("att-2", "inst-1", "drv-scoped", 6))
        .expect("attachment");

    Campus {
        store,
        candidate: candidate_id("cand-1"),
        public_activity: activity_id("act-pub"),
        scoped_activity: activity_id("act-scoped"),
        public_drive: drive_id("drv-pub"),
        scoped_drive: drive_id("drv-scoped"),
    }
}
