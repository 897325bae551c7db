//! Availability aggregation: what a candidate sees on listing pages. The
//! available set is the audience-resolved institution/public merge minus
//! entities the candidate is already enrolled in.

use serde::Serialize;

use super::audience::{self, ActivityListing, DriveListing};
use super::domain::{ActivityId, CandidateId, DriveId, EnrollmentStatus};
use super::enrollment::EnrollmentError;
use super::repository::PlatformRepository;
use chrono::{DateTime, Utc};

/// An enrollment row joined with activity display fields.
#[derive(Debug, Clone, Serialize)]
pub struct EnrolledActivityView {
    pub activity_id: ActivityId,
    pub name: String,
    pub status: EnrollmentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drive_id: Option<DriveId>,
    pub enrolled_at: DateTime<Utc>,
}

/// An enrollment row joined with drive display fields.
#[derive(Debug, Clone, Serialize)]
pub struct EnrolledDriveView {
    pub drive_id: DriveId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    pub status: EnrollmentStatus,
    pub applied_at: DateTime<Utc>,
    pub enrolled_count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CandidateActivities {
    pub available: Vec<ActivityListing>,
    pub enrolled: Vec<EnrolledActivityView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CandidateDrives {
    pub available: Vec<DriveListing>,
    pub enrolled: Vec<EnrolledDriveView>,
}

/// Activities visible to the candidate, split into available and enrolled. A
/// placeholder candidate with no institution sees only the public set.
pub fn activities_for_candidate<R>(
    repository: &R,
    candidate_id: &CandidateId,
) -> Result<CandidateActivities, EnrollmentError>
where
    R: PlatformRepository,
{
    let candidate = repository
        .candidate(candidate_id)?
        .ok_or(EnrollmentError::CandidateNotFound)?;

    let rows = repository.candidate_activities(candidate_id)?;
    let mut enrolled = Vec::with_capacity(rows.len());
    for row in rows {
        let name = repository
            .activity(&row.activity_id)?
            .map(|activity| activity.name)
            .unwrap_or_else(|| row.activity_id.0.clone());
        enrolled.push(EnrolledActivityView {
            activity_id: row.activity_id,
            name,
            status: row.status,
            drive_id: row.drive_id,
            enrolled_at: row.enrolled_at,
        });
    }

    let mut available =
        audience::activities_for_institution(repository, candidate.institution_id.as_ref())?;
    available.retain(|listing| {
        enrolled
            .iter()
            .all(|row| row.activity_id != listing.id)
    });

    Ok(CandidateActivities { available, enrolled })
}

/// Drives visible to the candidate, split into available and enrolled, with
/// global enrollment counts attached for display.
pub fn drives_for_candidate<R>(
    repository: &R,
    candidate_id: &CandidateId,
) -> Result<CandidateDrives, EnrollmentError>
where
    R: PlatformRepository,
{
    let candidate = repository
        .candidate(candidate_id)?
        .ok_or(EnrollmentError::CandidateNotFound)?;

    let rows = repository.candidate_drives(candidate_id)?;
    let ids: Vec<DriveId> = rows.iter().map(|row| row.drive_id.clone()).collect();
    let counts = repository.drive_enrollment_counts(&ids)?;

    let mut enrolled = Vec::with_capacity(rows.len());
    for row in rows {
        let (name, company_name) = match repository.drive(&row.drive_id)? {
            Some(drive) => (drive.name, drive.company_name),
            None => (row.drive_id.0.clone(), None),
        };
        enrolled.push(EnrolledDriveView {
            enrolled_count: counts.get(&row.drive_id).copied().unwrap_or(0),
            drive_id: row.drive_id,
            name,
            company_name,
            status: row.status,
            applied_at: row.applied_at,
        });
    }

    let mut available =
        audience::drives_for_institution(repository, candidate.institution_id.as_ref())?;
    available.retain(|listing| enrolled.iter().all(|row| row.drive_id != listing.id));

    Ok(CandidateDrives { available, enrolled })
}
