//! Enrollment orchestration: the state transition of enrolling a candidate in
//! an activity or drive, with idempotency and cascading consistency.
//!
//! The caller's identity is threaded in explicitly as a candidate id; there is
//! no ambient session state. Visibility (public or institution-scoped) is
//! verified here before any write.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::info;

use super::audience;
use super::domain::{
    Activity, ActivityCategory, ActivityId, ActivityKind, Candidate, CandidateActivity,
    CandidateDrive, CandidateId, DepartmentId, Drive, DriveActivity, DriveActivityKind, DriveId,
    EnrollmentStatus, EntityStatus, InstitutionActivity, InstitutionDrive,
};
use super::eligibility::{check_prerequisites, MissingPrerequisite, PrerequisiteCheck};
use super::repository::{PlatformRepository, RepositoryError};

/// Error raised by the enrollment service. Business rejections are typed
/// variants the boundary maps to 4xx responses; only `Repository` carries
/// infrastructure faults.
#[derive(Debug, thiserror::Error)]
pub enum EnrollmentError {
    #[error("candidate not found")]
    CandidateNotFound,
    #[error("activity not found")]
    ActivityNotFound,
    #[error("drive not found")]
    DriveNotFound,
    #[error("not available for the candidate's institution")]
    NotAvailable,
    #[error("prerequisite activities must be completed before enrolling in this drive")]
    PrerequisiteNotCompleted { missing: Vec<MissingPrerequisite> },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Merged activity view returned by the detail endpoint. Institution override
/// fields replace the base values when an attachment exists. The external URL
/// is withheld until the candidate is enrolled.
#[derive(Debug, Clone, Serialize)]
pub struct ActivityDetailView {
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
    pub departments: Vec<DepartmentId>,
    pub status: EntityStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enrollment: Option<CandidateActivity>,
}

/// One pipeline entry in a drive detail view, resolved to a display name.
#[derive(Debug, Clone, Serialize)]
pub struct DriveActivityView {
    pub activity_id: ActivityId,
    pub name: String,
    pub kind: DriveActivityKind,
}

/// Merged drive view with stage/prerequisite sub-lists and, when the
/// candidate is enrolled, their drive and cascaded activity rows.
#[derive(Debug, Clone, Serialize)]
pub struct DriveDetailView {
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
    pub departments: Vec<DepartmentId>,
    pub status: EntityStatus,
    pub stages: Vec<DriveActivityView>,
    pub prerequisites: Vec<DriveActivityView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enrollment: Option<CandidateDrive>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub enrolled_activities: Vec<CandidateActivity>,
}

/// Result of a drive enrollment: the persisted drive row and the cascaded
/// activity rows for this (candidate, drive) pair.
#[derive(Debug, Clone, Serialize)]
pub struct DriveEnrollmentReceipt {
    pub candidate_drive: CandidateDrive,
    pub candidate_activities: Vec<CandidateActivity>,
    pub already_enrolled: bool,
}

/// Service performing candidate-facing reads and enrollment transitions.
pub struct EnrollmentService<R> {
    repository: Arc<R>,
}

impl<R> EnrollmentService<R>
where
    R: PlatformRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    fn candidate(&self, id: &CandidateId) -> Result<Candidate, EnrollmentError> {
        self.repository
            .candidate(id)?
            .ok_or(EnrollmentError::CandidateNotFound)
    }

    /// Resolves the activity and confirms it is visible to the candidate:
    /// public, or attached to the candidate's institution.
    fn visible_activity(
        &self,
        candidate: &Candidate,
        activity_id: &ActivityId,
    ) -> Result<(Activity, Option<InstitutionActivity>), EnrollmentError> {
        let activity = self
            .repository
            .activity(activity_id)?
            .ok_or(EnrollmentError::ActivityNotFound)?;

        let attachment = match &candidate.institution_id {
            Some(institution) => self
                .repository
                .institution_activity_for(institution, activity_id)?,
            None => None,
        };

        if attachment.is_none() && !audience::is_public_activity(self.repository.as_ref(), activity_id)? {
            return Err(EnrollmentError::NotAvailable);
        }

        Ok((activity, attachment))
    }

    fn visible_drive(
        &self,
        candidate: &Candidate,
        drive_id: &DriveId,
    ) -> Result<(Drive, Option<InstitutionDrive>), EnrollmentError> {
        let drive = self
            .repository
            .drive(drive_id)?
            .ok_or(EnrollmentError::DriveNotFound)?;

        let attachment = match &candidate.institution_id {
            Some(institution) => self
                .repository
                .institution_drive_for(institution, drive_id)?,
            None => None,
        };

        if attachment.is_none() && !audience::is_public_drive(self.repository.as_ref(), drive_id)? {
            return Err(EnrollmentError::NotAvailable);
        }

        Ok((drive, attachment))
    }

    /// Merged activity detail for a candidate, with override fields applied
    /// and the external URL revealed only to enrolled candidates.
    pub fn activity_detail(
        &self,
        candidate_id: &CandidateId,
        activity_id: &ActivityId,
    ) -> Result<ActivityDetailView, EnrollmentError> {
        let candidate = self.candidate(candidate_id)?;
        let (activity, attachment) = self.visible_activity(&candidate, activity_id)?;
        let enrollment = self
            .repository
            .candidate_activity(candidate_id, activity_id)?;

        let (base_price, min_cgpa, min_semester) = match &attachment {
            Some(row) => (
                row.base_price.unwrap_or(activity.base_price),
                row.min_cgpa.or(activity.min_cgpa),
                row.min_semester.or(activity.min_semester),
            ),
            None => (activity.base_price, activity.min_cgpa, activity.min_semester),
        };

        Ok(ActivityDetailView {
            id: activity.id,
            name: activity.name,
            kind: activity.kind,
            category: activity.category,
            description: activity.description,
            details: activity.details,
            key_points: activity.key_points,
            base_price,
            min_cgpa,
            min_semester,
            departments: activity.departments,
            status: activity.status,
            external_url: enrollment
                .as_ref()
                .and_then(|_| activity.external_url.clone()),
            enrollment,
        })
    }

    /// Merged drive detail with stage and prerequisite sub-lists.
    pub fn drive_detail(
        &self,
        candidate_id: &CandidateId,
        drive_id: &DriveId,
    ) -> Result<DriveDetailView, EnrollmentError> {
        let candidate = self.candidate(candidate_id)?;
        let (drive, attachment) = self.visible_drive(&candidate, drive_id)?;

        let pipeline = self.repository.drive_activities(drive_id)?;
        let mut stages = Vec::new();
        let mut prerequisites = Vec::new();
        for row in &pipeline {
            let name = self
                .repository
                .activity(&row.activity_id)?
                .map(|activity| activity.name)
                .unwrap_or_else(|| row.activity_id.0.clone());
            let view = DriveActivityView {
                activity_id: row.activity_id.clone(),
                name,
                kind: row.kind,
            };
            match row.kind {
                DriveActivityKind::Stage => stages.push(view),
                DriveActivityKind::Prerequisite => prerequisites.push(view),
            }
        }

        let enrollment = self.repository.candidate_drive(candidate_id, drive_id)?;
        let enrolled_activities = if enrollment.is_some() {
            self.repository
                .candidate_activities_for_drive(candidate_id, drive_id)?
        } else {
            Vec::new()
        };

        let (base_price, min_cgpa, min_semester) = match &attachment {
            Some(row) => (
                row.base_price.unwrap_or(drive.base_price),
                row.min_cgpa.or(drive.min_cgpa),
                row.min_semester.or(drive.min_semester),
            ),
            None => (drive.base_price, drive.min_cgpa, drive.min_semester),
        };

        Ok(DriveDetailView {
            id: drive.id,
            name: drive.name,
            company_name: drive.company_name,
            company_details: drive.company_details,
            requirements: drive.requirements,
            available_positions: drive.available_positions,
            description: drive.description,
            key_points: drive.key_points,
            base_price,
            min_cgpa,
            min_semester,
            departments: drive.departments,
            status: drive.status,
            stages,
            prerequisites,
            enrollment,
            enrolled_activities,
        })
    }

    /// Enrolls the candidate in an activity. Idempotent: an existing row is
    /// returned unchanged, preserving its status and any drive tag. A
    /// concurrent writer's insert conflict is re-read as "already enrolled".
    pub fn enroll_in_activity(
        &self,
        candidate_id: &CandidateId,
        activity_id: &ActivityId,
        originating_drive: Option<DriveId>,
    ) -> Result<CandidateActivity, EnrollmentError> {
        let candidate = self.candidate(candidate_id)?;
        self.visible_activity(&candidate, activity_id)?;

        if let Some(existing) = self
            .repository
            .candidate_activity(candidate_id, activity_id)?
        {
            return Ok(existing);
        }

        let row = CandidateActivity {
            candidate_id: candidate_id.clone(),
            activity_id: activity_id.clone(),
            drive_id: originating_drive,
            status: EnrollmentStatus::Enrolled,
            enrolled_at: Utc::now(),
        };

        match self.repository.insert_candidate_activity(row) {
            Ok(created) => {
                info!(candidate = %candidate_id.0, activity = %activity_id.0, "candidate enrolled in activity");
                Ok(created)
            }
            // The unique pair constraint is the final authority: a concurrent
            // writer beat us, so surface their row.
            Err(RepositoryError::Conflict) => self
                .repository
                .candidate_activity(candidate_id, activity_id)?
                .ok_or(EnrollmentError::Repository(RepositoryError::Conflict)),
            Err(err) => Err(err.into()),
        }
    }

    /// Enrolls the candidate in a drive. Prerequisites must be completed; the
    /// drive row and the cascade of activity rows are created in one atomic
    /// step. A second call is an idempotent success that also repairs any
    /// missing cascade rows from a prior partial failure.
    pub fn enroll_in_drive(
        &self,
        candidate_id: &CandidateId,
        drive_id: &DriveId,
    ) -> Result<DriveEnrollmentReceipt, EnrollmentError> {
        let candidate = self.candidate(candidate_id)?;
        self.visible_drive(&candidate, drive_id)?;

        let pipeline = self.repository.drive_activities(drive_id)?;

        if let Some(existing) = self.repository.candidate_drive(candidate_id, drive_id)? {
            return self.repair_cascade(existing, &pipeline);
        }

        match check_prerequisites(self.repository.as_ref(), candidate_id, drive_id)? {
            PrerequisiteCheck::Satisfied => {}
            PrerequisiteCheck::Missing(missing) => {
                info!(
                    candidate = %candidate_id.0,
                    drive = %drive_id.0,
                    missing = missing.len(),
                    "drive enrollment rejected: prerequisites not completed"
                );
                return Err(EnrollmentError::PrerequisiteNotCompleted { missing });
            }
        }

        let now = Utc::now();
        let enrollment = CandidateDrive {
            candidate_id: candidate_id.clone(),
            drive_id: drive_id.clone(),
            status: EnrollmentStatus::Enrolled,
            applied_at: now,
        };
        let cascade = cascade_rows(candidate_id, drive_id, &pipeline);

        match self
            .repository
            .create_drive_enrollment(enrollment, cascade)
        {
            Ok((candidate_drive, _created)) => {
                info!(candidate = %candidate_id.0, drive = %drive_id.0, "candidate enrolled in drive");
                let candidate_activities = self
                    .repository
                    .candidate_activities_for_drive(candidate_id, drive_id)?;
                Ok(DriveEnrollmentReceipt {
                    candidate_drive,
                    candidate_activities,
                    already_enrolled: false,
                })
            }
            // Lost the race against a concurrent enrollment; fall back to the
            // idempotent path against the winner's row.
            Err(RepositoryError::Conflict) => {
                let existing = self
                    .repository
                    .candidate_drive(candidate_id, drive_id)?
                    .ok_or(EnrollmentError::Repository(RepositoryError::Conflict))?;
                self.repair_cascade(existing, &pipeline)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Idempotent re-enrollment: ensure every expected cascade row exists,
    /// skipping pairs already present.
    fn repair_cascade(
        &self,
        existing: CandidateDrive,
        pipeline: &[DriveActivity],
    ) -> Result<DriveEnrollmentReceipt, EnrollmentError> {
        let rows = cascade_rows(&existing.candidate_id, &existing.drive_id, pipeline);
        if !rows.is_empty() {
            self.repository.ensure_candidate_activities(rows)?;
        }
        let candidate_activities = self
            .repository
            .candidate_activities_for_drive(&existing.candidate_id, &existing.drive_id)?;
        Ok(DriveEnrollmentReceipt {
            candidate_drive: existing,
            candidate_activities,
            already_enrolled: true,
        })
    }
}

fn cascade_rows(
    candidate_id: &CandidateId,
    drive_id: &DriveId,
    pipeline: &[DriveActivity],
) -> Vec<CandidateActivity> {
    let now = Utc::now();
    pipeline
        .iter()
        .map(|row| CandidateActivity {
            candidate_id: candidate_id.clone(),
            activity_id: row.activity_id.clone(),
            drive_id: Some(drive_id.clone()),
            status: EnrollmentStatus::Enrolled,
            enrolled_at: now,
        })
        .collect()
}
