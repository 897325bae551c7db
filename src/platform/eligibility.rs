//! Prerequisite gate for drive enrollment. Only `Completed` enrollment rows
//! satisfy the gate; a mere `Enrolled` sign-up does not count as completion.

use serde::Serialize;

use super::domain::{ActivityId, CandidateId, DriveActivityKind, DriveId};
use super::repository::{CatalogRepository, EnrollmentRepository, RepositoryError};

/// A prerequisite the candidate has not completed, with a display name so the
/// caller can render actionable guidance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingPrerequisite {
    pub id: ActivityId,
    pub name: String,
}

/// Outcome of the prerequisite check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrerequisiteCheck {
    Satisfied,
    Missing(Vec<MissingPrerequisite>),
}

/// Gates drive enrollment on prerequisite completion: every drive activity of
/// kind `Prerequisite` must have a `Completed` enrollment row for the
/// candidate. A drive without prerequisites trivially passes.
pub fn check_prerequisites<R>(
    repository: &R,
    candidate: &CandidateId,
    drive: &DriveId,
) -> Result<PrerequisiteCheck, RepositoryError>
where
    R: CatalogRepository + EnrollmentRepository,
{
    let required: Vec<ActivityId> = repository
        .drive_activities(drive)?
        .into_iter()
        .filter(|row| row.kind == DriveActivityKind::Prerequisite)
        .map(|row| row.activity_id)
        .collect();

    if required.is_empty() {
        return Ok(PrerequisiteCheck::Satisfied);
    }

    let completed = repository.completed_activity_ids(candidate, &required)?;
    let mut missing = Vec::new();
    for id in required {
        if completed.contains(&id) {
            continue;
        }
        let name = repository
            .activity(&id)?
            .map(|activity| activity.name)
            .unwrap_or_else(|| id.0.clone());
        missing.push(MissingPrerequisite { id, name });
    }

    if missing.is_empty() {
        Ok(PrerequisiteCheck::Satisfied)
    } else {
        Ok(PrerequisiteCheck::Missing(missing))
    }
}
