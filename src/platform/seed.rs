//! Demo fixtures: reference departments, two institutions, a small activity
//! catalog and two drives, plus an onboarded candidate. Everything goes
//! through the regular services so the seeded state matches what the HTTP
//! boundary would have produced.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;

use super::catalog::{ActivityDraft, AttachmentDraft, CatalogError, CatalogService, DriveDraft};
use super::domain::{
    ActivityCategory, ActivityId, ActivityKind, AudienceTag, CandidateId, Department,
    DepartmentId, DriveId, EntityStatus, Gender, InstitutionId, VerificationStatus,
};
use super::onboarding::{InstitutionRef, OnboardingError, OnboardingForm, OnboardingService};
use super::repository::{PlatformRepository, RepositoryError};

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Onboarding(#[from] OnboardingError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Handles to the seeded fixtures, for the demo output and for tests.
#[derive(Debug, Clone)]
pub struct SeedReport {
    pub candidate_id: CandidateId,
    pub institution_id: InstitutionId,
    pub department_id: DepartmentId,
    pub prerequisite_id: ActivityId,
    pub workshop_id: ActivityId,
    pub interview_id: ActivityId,
    pub gated_drive_id: DriveId,
    pub open_drive_id: DriveId,
}

fn department(id: &str, name: &str, short_name: &str, full_name: &str, desc: &str) -> Department {
    Department {
        id: DepartmentId(id.to_string()),
        name: name.to_string(),
        short_name: short_name.to_string(),
        full_name: full_name.to_string(),
        description: desc.to_string(),
    }
}

fn public_and_institution() -> BTreeSet<AudienceTag> {
    BTreeSet::from([AudienceTag::Public, AudienceTag::Institution])
}

/// Populates the store with demo data and returns handles to the fixtures.
pub fn seed_demo_data<R>(repository: Arc<R>) -> Result<SeedReport, SeedError>
where
    R: PlatformRepository + 'static,
{
    let catalog = CatalogService::new(repository.clone());
    let onboarding = OnboardingService::new(repository.clone());

    let departments = [
        department(
            "dept-cse",
            "Computer Science",
            "CSE",
            "Department of Computer Science and Engineering",
            "Focuses on software development, programming, and computing systems",
        ),
        department(
            "dept-it",
            "Information Technology",
            "IT",
            "Department of Information Technology",
            "Focuses on IT systems, networks, and applications",
        ),
        department(
            "dept-ece",
            "Electronics & Communication",
            "ECE",
            "Department of Electronics and Communication Engineering",
            "Covers electronics, communication systems, and VLSI",
        ),
        department(
            "dept-me",
            "Mechanical Engineering",
            "ME",
            "Department of Mechanical Engineering",
            "Focuses on mechanical systems, manufacturing, and design",
        ),
        department(
            "dept-math",
            "Mathematics",
            "MATH",
            "Department of Mathematics",
            "Covers pure and applied mathematics",
        ),
        department(
            "dept-mba",
            "Management Studies",
            "MBA",
            "Department of Management Studies",
            "Covers business administration, management, and HR",
        ),
    ];
    for dept in departments {
        repository.insert_department(dept)?;
    }
    let department_id = DepartmentId("dept-cse".to_string());

    catalog.register_institution(
        "Tech University".to_string(),
        "Berlin".to_string(),
        "Berlin".to_string(),
        Some(VerificationStatus::Unverified),
    )?;
    let institution = catalog.register_institution(
        "Global Institute".to_string(),
        "Munich".to_string(),
        "Bavaria".to_string(),
        Some(VerificationStatus::Verified),
    )?;

    let prerequisite = catalog.create_activity(ActivityDraft {
        name: "Aptitude Screening".to_string(),
        kind: ActivityKind::Course,
        category: ActivityCategory::Prerequisite,
        description: "Timed aptitude and reasoning assessment".to_string(),
        details: "Covers quantitative, verbal, and logical sections".to_string(),
        key_points: vec![
            "90 minute timed assessment".to_string(),
            "Required before company drives".to_string(),
        ],
        base_price: 0,
        min_cgpa: None,
        min_semester: Some(4),
        applies: public_and_institution(),
        departments: vec![department_id.clone()],
        external_url: None,
        status: Some(EntityStatus::Active),
    })?;

    let workshop = catalog.create_activity(ActivityDraft {
        name: "Resume Workshop".to_string(),
        kind: ActivityKind::Seminar,
        category: ActivityCategory::Independent,
        description: "Hands-on resume and portfolio review".to_string(),
        details: String::new(),
        key_points: vec!["Bring a current resume draft".to_string()],
        base_price: 199,
        min_cgpa: None,
        min_semester: None,
        applies: BTreeSet::from([AudienceTag::Public]),
        departments: Vec::new(),
        external_url: Some("https://workshops.example.com/resume".to_string()),
        status: Some(EntityStatus::Active),
    })?;

    let interview = catalog.create_activity(ActivityDraft {
        name: "Mock Interview".to_string(),
        kind: ActivityKind::Interview,
        category: ActivityCategory::PartOfDrive,
        description: "Panel interview simulation with feedback".to_string(),
        details: String::new(),
        key_points: Vec::new(),
        base_price: 499,
        min_cgpa: Some(6.5),
        min_semester: Some(5),
        applies: BTreeSet::from([AudienceTag::Institution]),
        departments: vec![department_id.clone()],
        external_url: None,
        status: Some(EntityStatus::Active),
    })?;

    let discussion = catalog.create_activity(ActivityDraft {
        name: "Group Discussion Round".to_string(),
        kind: ActivityKind::GroupDiscussion,
        category: ActivityCategory::PartOfDrive,
        description: "Moderated group discussion on current topics".to_string(),
        details: String::new(),
        key_points: Vec::new(),
        base_price: 0,
        min_cgpa: None,
        min_semester: None,
        applies: public_and_institution(),
        departments: Vec::new(),
        external_url: None,
        status: Some(EntityStatus::Active),
    })?;

    let gated_drive = catalog.create_drive(DriveDraft {
        name: "Orion Software Graduate Drive".to_string(),
        company_name: Some("Orion Software".to_string()),
        company_details: "Product company building developer tooling".to_string(),
        requirements: "Strong fundamentals in data structures and algorithms".to_string(),
        available_positions: 12,
        description: "Campus hiring drive for graduate software engineers".to_string(),
        key_points: vec!["Three stage pipeline".to_string()],
        base_price: 999,
        min_cgpa: Some(7.0),
        min_semester: Some(6),
        applies: public_and_institution(),
        departments: vec![department_id.clone()],
        status: Some(EntityStatus::Active),
        stages: vec![interview.id.clone(), discussion.id.clone()],
        prerequisites: vec![prerequisite.id.clone()],
    })?;

    let open_drive = catalog.create_drive(DriveDraft {
        name: "Helix Analytics Internship Drive".to_string(),
        company_name: Some("Helix Analytics".to_string()),
        company_details: "Analytics consultancy with a campus internship track".to_string(),
        requirements: "Comfort with SQL and one scripting language".to_string(),
        available_positions: 8,
        description: "Internship drive open to all eligible candidates".to_string(),
        key_points: Vec::new(),
        base_price: 0,
        min_cgpa: None,
        min_semester: None,
        applies: BTreeSet::from([AudienceTag::Public]),
        departments: Vec::new(),
        status: Some(EntityStatus::Active),
        stages: vec![discussion.id.clone()],
        prerequisites: Vec::new(),
    })?;

    catalog.attach_activity(
        &institution.id,
        &interview.id,
        AttachmentDraft {
            base_price: Some(399),
            min_cgpa: None,
            min_semester: None,
            is_required: true,
            status: Some(EntityStatus::Active),
        },
    )?;
    catalog.attach_drive(
        &institution.id,
        &gated_drive.id,
        AttachmentDraft {
            base_price: Some(799),
            min_cgpa: Some(6.5),
            min_semester: None,
            is_required: false,
            status: Some(EntityStatus::Active),
        },
    )?;

    let candidate = onboarding.register_email("asha.rao@example.edu")?;
    let candidate = onboarding.complete_onboarding(
        &candidate.id,
        OnboardingForm {
            student_id: "GI-2023-0142".to_string(),
            first_name: "Asha".to_string(),
            last_name: "Rao".to_string(),
            age: 21,
            gender: Gender::Female,
            semester: 6,
            institution: InstitutionRef {
                id: Some(institution.id.clone()),
                name: institution.name.clone(),
            },
            department_id: department_id.clone(),
        },
    )?;

    // A second profile left at the placeholder stage.
    onboarding.register_email("dev.mehta@example.edu")?;

    tracing::info!(
        candidates = 2,
        activities = 4,
        drives = 2,
        at = %Utc::now(),
        "demo data seeded"
    );

    Ok(SeedReport {
        candidate_id: candidate.id,
        institution_id: institution.id,
        department_id,
        prerequisite_id: prerequisite.id,
        workshop_id: workshop.id,
        interview_id: interview.id,
        gated_drive_id: gated_drive.id,
        open_drive_id: open_drive.id,
    })
}
