use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for institutions.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct InstitutionId(pub String);

/// Identifier wrapper for departments (static reference data).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DepartmentId(pub String);

/// Identifier wrapper for candidate profiles.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CandidateId(pub String);

/// Identifier wrapper for activities.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ActivityId(pub String);

/// Identifier wrapper for recruitment drives.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DriveId(pub String);

/// Identifier wrapper for institution attachment (override) records.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AttachmentId(pub String);

/// Closed audience classification replacing the original loosely-typed
/// audience-id array. An entity with no tags resolves to non-public.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudienceTag {
    /// Visible to every candidate.
    Public,
    /// Attachable to specific institutions via override records.
    Institution,
}

/// Verification state shared by institutions and candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    Verified,
    Unverified,
}

/// Publication state for activities and drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityStatus {
    Active,
    Pending,
    Archived,
}

/// Candidate lifecycle: a placeholder row is created at first contact and
/// completed during onboarding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateLifecycle {
    Placeholder,
    Onboarded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    Other,
}

/// The kind of learning/assessment unit an activity represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Course,
    Seminar,
    Interview,
    GroupDiscussion,
}

/// How an activity participates in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityCategory {
    Independent,
    PartOfDrive,
    Prerequisite,
}

/// Role a drive activity plays in the drive's pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriveActivityKind {
    Stage,
    Prerequisite,
}

/// Status of a candidate's enrollment in an activity or drive. Only
/// `Completed` satisfies a prerequisite gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentStatus {
    Enrolled,
    Completed,
}

impl EnrollmentStatus {
    pub const fn label(self) -> &'static str {
        match self {
            EnrollmentStatus::Enrolled => "enrolled",
            EnrollmentStatus::Completed => "completed",
        }
    }
}

/// A school or college. Owns candidates and override records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Institution {
    pub id: InstitutionId,
    pub name: String,
    pub city: String,
    pub state: String,
    pub status: VerificationStatus,
    pub contact_person: Option<String>,
    pub contact_phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Static reference entity associated with candidates and eligibility lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub id: DepartmentId,
    pub name: String,
    pub short_name: String,
    pub full_name: String,
    pub description: String,
}

/// A student profile. The external identity provider's user record (email and
/// display names) is folded in; authentication itself stays out of scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: CandidateId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub student_id: String,
    pub age: u8,
    pub gender: Gender,
    pub semester: u8,
    pub cgpa: Option<f32>,
    pub bio: Option<String>,
    pub resume: Option<String>,
    pub additional_documents: Vec<String>,
    pub lifecycle: CandidateLifecycle,
    pub verification: VerificationStatus,
    pub institution_id: Option<InstitutionId>,
    pub department_id: Option<DepartmentId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Candidate {
    /// Minimal placeholder profile created at first contact (email only).
    pub fn placeholder(id: CandidateId, email: String, now: DateTime<Utc>) -> Self {
        Self {
            id,
            email,
            first_name: String::new(),
            last_name: String::new(),
            student_id: String::new(),
            age: 0,
            gender: Gender::Other,
            semester: 0,
            cgpa: None,
            bio: None,
            resume: None,
            additional_documents: Vec::new(),
            lifecycle: CandidateLifecycle::Placeholder,
            verification: VerificationStatus::Unverified,
            institution_id: None,
            department_id: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A learning/assessment unit: course, seminar, interview, or group
/// discussion. Independent of any institution unless an override attaches it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub id: ActivityId,
    pub name: String,
    pub kind: ActivityKind,
    pub category: ActivityCategory,
    pub description: String,
    pub details: String,
    pub key_points: Vec<String>,
    pub base_price: u32,
    pub min_cgpa: Option<f32>,
    pub min_semester: Option<u8>,
    pub applies: BTreeSet<AudienceTag>,
    pub departments: Vec<DepartmentId>,
    pub external_url: Option<String>,
    pub status: EntityStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Institution-specific override binding for an activity. Unique per
/// (institution, activity) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstitutionActivity {
    pub id: AttachmentId,
    pub institution_id: InstitutionId,
    pub activity_id: ActivityId,
    pub base_price: Option<u32>,
    pub min_cgpa: Option<f32>,
    pub min_semester: Option<u8>,
    pub is_required: bool,
    pub status: EntityStatus,
    pub created_at: DateTime<Utc>,
}

/// A recruitment campaign composed of stage and prerequisite activities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Drive {
    pub id: DriveId,
    pub name: String,
    pub company_name: Option<String>,
    pub company_details: String,
    pub requirements: String,
    pub available_positions: u32,
    pub description: String,
    pub key_points: Vec<String>,
    pub base_price: u32,
    pub min_cgpa: Option<f32>,
    pub min_semester: Option<u8>,
    pub applies: BTreeSet<AudienceTag>,
    pub departments: Vec<DepartmentId>,
    pub status: EntityStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Join record binding an activity into a drive's pipeline, either as an
/// interview stage or as an enrollment prerequisite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriveActivity {
    pub drive_id: DriveId,
    pub activity_id: ActivityId,
    pub kind: DriveActivityKind,
    pub base_price: u32,
}

/// Institution-specific override binding for a drive. Unique per
/// (institution, drive) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstitutionDrive {
    pub id: AttachmentId,
    pub institution_id: InstitutionId,
    pub drive_id: DriveId,
    pub base_price: Option<u32>,
    pub min_cgpa: Option<f32>,
    pub min_semester: Option<u8>,
    pub is_required: bool,
    pub status: EntityStatus,
    pub created_at: DateTime<Utc>,
}

/// Enrollment record linking a candidate to an activity. `drive_id` tags
/// rows created as a side effect of drive enrollment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateActivity {
    pub candidate_id: CandidateId,
    pub activity_id: ActivityId,
    pub drive_id: Option<DriveId>,
    pub status: EnrollmentStatus,
    pub enrolled_at: DateTime<Utc>,
}

/// Enrollment record linking a candidate to a drive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateDrive {
    pub candidate_id: CandidateId,
    pub drive_id: DriveId,
    pub status: EnrollmentStatus,
    pub applied_at: DateTime<Utc>,
}
