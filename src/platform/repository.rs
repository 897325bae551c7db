use std::collections::{BTreeMap, BTreeSet};

use super::domain::{
    Activity, ActivityId, Candidate, CandidateActivity, CandidateDrive, CandidateId, Department,
    DepartmentId, Drive, DriveActivity, DriveId, EntityStatus, Institution, InstitutionActivity,
    InstitutionDrive, InstitutionId,
};

/// Error enumeration for storage failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Queries over the activity/drive catalog and its institution overrides.
///
/// Every read is an explicit, intentional query; callers never rely on
/// implicit relation traversal.
pub trait CatalogRepository: Send + Sync {
    fn activity(&self, id: &ActivityId) -> Result<Option<Activity>, RepositoryError>;
    fn drive(&self, id: &DriveId) -> Result<Option<Drive>, RepositoryError>;
    fn activities_with_status(
        &self,
        status: EntityStatus,
    ) -> Result<Vec<Activity>, RepositoryError>;
    fn drives_with_status(&self, status: EntityStatus) -> Result<Vec<Drive>, RepositoryError>;
    fn drive_activities(&self, drive: &DriveId) -> Result<Vec<DriveActivity>, RepositoryError>;

    fn institution_activities(
        &self,
        institution: &InstitutionId,
    ) -> Result<Vec<InstitutionActivity>, RepositoryError>;
    fn institution_drives(
        &self,
        institution: &InstitutionId,
    ) -> Result<Vec<InstitutionDrive>, RepositoryError>;
    fn institution_activity_for(
        &self,
        institution: &InstitutionId,
        activity: &ActivityId,
    ) -> Result<Option<InstitutionActivity>, RepositoryError>;
    fn institution_drive_for(
        &self,
        institution: &InstitutionId,
        drive: &DriveId,
    ) -> Result<Option<InstitutionDrive>, RepositoryError>;

    fn insert_activity(&self, activity: Activity) -> Result<Activity, RepositoryError>;
    fn update_activity(&self, activity: Activity) -> Result<Activity, RepositoryError>;
    fn insert_drive(&self, drive: Drive) -> Result<Drive, RepositoryError>;
    fn update_drive(&self, drive: Drive) -> Result<Drive, RepositoryError>;
    /// Replaces the drive's pipeline rows wholesale (stage + prerequisite).
    fn replace_drive_activities(
        &self,
        drive: &DriveId,
        rows: Vec<DriveActivity>,
    ) -> Result<(), RepositoryError>;

    /// Fails with `Conflict` when the (institution, activity) pair exists.
    fn attach_activity(
        &self,
        attachment: InstitutionActivity,
    ) -> Result<InstitutionActivity, RepositoryError>;
    /// Fails with `Conflict` when the (institution, drive) pair exists.
    fn attach_drive(
        &self,
        attachment: InstitutionDrive,
    ) -> Result<InstitutionDrive, RepositoryError>;
}

/// Queries over institutions, departments, and candidate profiles.
pub trait DirectoryRepository: Send + Sync {
    fn institution(&self, id: &InstitutionId) -> Result<Option<Institution>, RepositoryError>;
    fn institution_by_name(&self, name: &str) -> Result<Option<Institution>, RepositoryError>;
    fn institutions(&self, include_unverified: bool)
        -> Result<Vec<Institution>, RepositoryError>;
    fn insert_institution(
        &self,
        institution: Institution,
    ) -> Result<Institution, RepositoryError>;
    fn update_institution(
        &self,
        institution: Institution,
    ) -> Result<Institution, RepositoryError>;

    fn department(&self, id: &DepartmentId) -> Result<Option<Department>, RepositoryError>;
    fn departments(&self) -> Result<Vec<Department>, RepositoryError>;
    fn insert_department(&self, department: Department) -> Result<Department, RepositoryError>;

    fn candidate(&self, id: &CandidateId) -> Result<Option<Candidate>, RepositoryError>;
    fn candidate_by_email(&self, email: &str) -> Result<Option<Candidate>, RepositoryError>;
    fn candidate_by_student_id(
        &self,
        student_id: &str,
    ) -> Result<Option<Candidate>, RepositoryError>;
    fn insert_candidate(&self, candidate: Candidate) -> Result<Candidate, RepositoryError>;
    fn update_candidate(&self, candidate: Candidate) -> Result<Candidate, RepositoryError>;
}

/// Queries and state transitions over enrollment join records. Composite
/// mutations are atomic: a failure leaves no partial rows behind.
pub trait EnrollmentRepository: Send + Sync {
    fn candidate_activity(
        &self,
        candidate: &CandidateId,
        activity: &ActivityId,
    ) -> Result<Option<CandidateActivity>, RepositoryError>;
    fn candidate_activities(
        &self,
        candidate: &CandidateId,
    ) -> Result<Vec<CandidateActivity>, RepositoryError>;
    fn candidate_drive(
        &self,
        candidate: &CandidateId,
        drive: &DriveId,
    ) -> Result<Option<CandidateDrive>, RepositoryError>;
    fn candidate_drives(
        &self,
        candidate: &CandidateId,
    ) -> Result<Vec<CandidateDrive>, RepositoryError>;
    fn candidate_activities_for_drive(
        &self,
        candidate: &CandidateId,
        drive: &DriveId,
    ) -> Result<Vec<CandidateActivity>, RepositoryError>;

    /// Activity ids, among `within`, for which the candidate holds a
    /// `Completed` enrollment row.
    fn completed_activity_ids(
        &self,
        candidate: &CandidateId,
        within: &[ActivityId],
    ) -> Result<BTreeSet<ActivityId>, RepositoryError>;

    /// Fails with `Conflict` when the (candidate, activity) pair exists.
    fn insert_candidate_activity(
        &self,
        row: CandidateActivity,
    ) -> Result<CandidateActivity, RepositoryError>;

    /// Best-effort bulk create: rows whose (candidate, activity) pair already
    /// exists are skipped, not errored. Returns the rows actually created.
    fn ensure_candidate_activities(
        &self,
        rows: Vec<CandidateActivity>,
    ) -> Result<Vec<CandidateActivity>, RepositoryError>;

    /// Atomically creates the drive enrollment row and fans out the cascade
    /// of activity rows, skipping duplicate pairs. Fails with `Conflict` when
    /// the (candidate, drive) pair already exists; any failure rolls back the
    /// whole step.
    fn create_drive_enrollment(
        &self,
        enrollment: CandidateDrive,
        cascade: Vec<CandidateActivity>,
    ) -> Result<(CandidateDrive, Vec<CandidateActivity>), RepositoryError>;

    fn activity_enrollment_counts(
        &self,
        ids: &[ActivityId],
    ) -> Result<BTreeMap<ActivityId, u64>, RepositoryError>;
    fn drive_enrollment_counts(
        &self,
        ids: &[DriveId],
    ) -> Result<BTreeMap<DriveId, u64>, RepositoryError>;
}

/// Convenience supertrait for stores backing the whole platform.
pub trait PlatformRepository:
    CatalogRepository + DirectoryRepository + EnrollmentRepository
{
}

impl<T> PlatformRepository for T where
    T: CatalogRepository + DirectoryRepository + EnrollmentRepository
{
}
