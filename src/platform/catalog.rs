//! Administrative catalog operations: activity and drive records, drive
//! pipelines, institution records, and institution attachment with override
//! fields. Attachment is a guarded create: a duplicate (institution, entity)
//! pair is rejected by lookup before insert so the boundary can return a
//! friendly message instead of relying on the storage constraint alone.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use tracing::info;

use super::domain::{
    Activity, ActivityCategory, ActivityId, ActivityKind, AttachmentId, AudienceTag,
    DepartmentId, Drive, DriveActivity, DriveActivityKind, DriveId, EntityStatus, Institution,
    InstitutionActivity, InstitutionDrive, InstitutionId, VerificationStatus,
};
use super::repository::{PlatformRepository, RepositoryError};

/// Error raised by the catalog service.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("activity not found")]
    ActivityNotFound,
    #[error("drive not found")]
    DriveNotFound,
    #[error("institution not found")]
    InstitutionNotFound,
    #[error("already attached to this institution")]
    DuplicateAttachment,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

static ACTIVITY_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static DRIVE_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static INSTITUTION_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static ATTACHMENT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_activity_id() -> ActivityId {
    let id = ACTIVITY_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ActivityId(format!("act-{id:06}"))
}

fn next_drive_id() -> DriveId {
    let id = DRIVE_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    DriveId(format!("drv-{id:06}"))
}

fn next_institution_id() -> InstitutionId {
    let id = INSTITUTION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    InstitutionId(format!("inst-{id:06}"))
}

fn next_attachment_id() -> AttachmentId {
    let id = ATTACHMENT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    AttachmentId(format!("att-{id:06}"))
}

/// Fields for creating or updating an activity record.
#[derive(Debug, Clone, Deserialize)]
pub struct ActivityDraft {
    pub name: String,
    pub kind: ActivityKind,
    pub category: ActivityCategory,
    pub description: String,
    #[serde(default)]
    pub details: String,
    #[serde(default)]
    pub key_points: Vec<String>,
    pub base_price: u32,
    #[serde(default)]
    pub min_cgpa: Option<f32>,
    #[serde(default)]
    pub min_semester: Option<u8>,
    #[serde(default)]
    pub applies: BTreeSet<AudienceTag>,
    #[serde(default)]
    pub departments: Vec<DepartmentId>,
    #[serde(default)]
    pub external_url: Option<String>,
    #[serde(default)]
    pub status: Option<EntityStatus>,
}

/// Fields for creating or updating a drive record. Stage and prerequisite
/// activity id lists are fanned out into pipeline join rows.
#[derive(Debug, Clone, Deserialize)]
pub struct DriveDraft {
    pub name: String,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub company_details: String,
    #[serde(default)]
    pub requirements: String,
    pub available_positions: u32,
    pub description: String,
    #[serde(default)]
    pub key_points: Vec<String>,
    pub base_price: u32,
    #[serde(default)]
    pub min_cgpa: Option<f32>,
    #[serde(default)]
    pub min_semester: Option<u8>,
    #[serde(default)]
    pub applies: BTreeSet<AudienceTag>,
    #[serde(default)]
    pub departments: Vec<DepartmentId>,
    #[serde(default)]
    pub status: Option<EntityStatus>,
    #[serde(default)]
    pub stages: Vec<ActivityId>,
    #[serde(default)]
    pub prerequisites: Vec<ActivityId>,
}

/// Override fields supplied when attaching an activity or drive to an
/// institution. Absent fields fall back to the base entity's values at read
/// time rather than being copied here.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AttachmentDraft {
    #[serde(default)]
    pub base_price: Option<u32>,
    #[serde(default)]
    pub min_cgpa: Option<f32>,
    #[serde(default)]
    pub min_semester: Option<u8>,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default)]
    pub status: Option<EntityStatus>,
}

/// Admin-facing catalog service.
pub struct CatalogService<R> {
    repository: Arc<R>,
}

impl<R> CatalogService<R>
where
    R: PlatformRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    pub fn create_activity(&self, draft: ActivityDraft) -> Result<Activity, CatalogError> {
        let now = Utc::now();
        let activity = Activity {
            id: next_activity_id(),
            name: draft.name,
            kind: draft.kind,
            category: draft.category,
            description: draft.description,
            details: draft.details,
            key_points: draft.key_points,
            base_price: draft.base_price,
            min_cgpa: draft.min_cgpa,
            min_semester: draft.min_semester,
            applies: draft.applies,
            departments: draft.departments,
            external_url: draft.external_url,
            status: draft.status.unwrap_or(EntityStatus::Pending),
            created_at: now,
            updated_at: now,
        };
        Ok(self.repository.insert_activity(activity)?)
    }

    pub fn update_activity(
        &self,
        id: &ActivityId,
        draft: ActivityDraft,
    ) -> Result<Activity, CatalogError> {
        let existing = self
            .repository
            .activity(id)?
            .ok_or(CatalogError::ActivityNotFound)?;
        let activity = Activity {
            id: existing.id,
            name: draft.name,
            kind: draft.kind,
            category: draft.category,
            description: draft.description,
            details: draft.details,
            key_points: draft.key_points,
            base_price: draft.base_price,
            min_cgpa: draft.min_cgpa,
            min_semester: draft.min_semester,
            applies: draft.applies,
            departments: draft.departments,
            external_url: draft.external_url,
            status: draft.status.unwrap_or(existing.status),
            created_at: existing.created_at,
            updated_at: Utc::now(),
        };
        Ok(self.repository.update_activity(activity)?)
    }

    pub fn create_drive(&self, draft: DriveDraft) -> Result<Drive, CatalogError> {
        let id = next_drive_id();
        let pipeline = self.pipeline_rows(&id, &draft)?;
        let now = Utc::now();
        let drive = Drive {
            id: id.clone(),
            name: draft.name,
            company_name: draft.company_name,
            company_details: draft.company_details,
            requirements: draft.requirements,
            available_positions: draft.available_positions,
            description: draft.description,
            key_points: draft.key_points,
            base_price: draft.base_price,
            min_cgpa: draft.min_cgpa,
            min_semester: draft.min_semester,
            applies: draft.applies,
            departments: draft.departments,
            status: draft.status.unwrap_or(EntityStatus::Pending),
            created_at: now,
            updated_at: now,
        };
        let stored = self.repository.insert_drive(drive)?;
        self.repository.replace_drive_activities(&id, pipeline)?;
        Ok(stored)
    }

    /// Updates a drive; its pipeline rows are replaced wholesale from the
    /// draft's stage and prerequisite lists.
    pub fn update_drive(&self, id: &DriveId, draft: DriveDraft) -> Result<Drive, CatalogError> {
        let existing = self
            .repository
            .drive(id)?
            .ok_or(CatalogError::DriveNotFound)?;
        let pipeline = self.pipeline_rows(id, &draft)?;
        let drive = Drive {
            id: existing.id,
            name: draft.name,
            company_name: draft.company_name,
            company_details: draft.company_details,
            requirements: draft.requirements,
            available_positions: draft.available_positions,
            description: draft.description,
            key_points: draft.key_points,
            base_price: draft.base_price,
            min_cgpa: draft.min_cgpa,
            min_semester: draft.min_semester,
            applies: draft.applies,
            departments: draft.departments,
            status: draft.status.unwrap_or(existing.status),
            created_at: existing.created_at,
            updated_at: Utc::now(),
        };
        let stored = self.repository.update_drive(drive)?;
        self.repository.replace_drive_activities(id, pipeline)?;
        Ok(stored)
    }

    fn pipeline_rows(
        &self,
        drive_id: &DriveId,
        draft: &DriveDraft,
    ) -> Result<Vec<DriveActivity>, CatalogError> {
        let mut rows = Vec::with_capacity(draft.stages.len() + draft.prerequisites.len());
        for (ids, kind) in [
            (&draft.stages, DriveActivityKind::Stage),
            (&draft.prerequisites, DriveActivityKind::Prerequisite),
        ] {
            for activity_id in ids {
                if self.repository.activity(activity_id)?.is_none() {
                    return Err(CatalogError::ActivityNotFound);
                }
                rows.push(DriveActivity {
                    drive_id: drive_id.clone(),
                    activity_id: activity_id.clone(),
                    kind,
                    base_price: 0,
                });
            }
        }
        Ok(rows)
    }

    /// Binds an activity to an institution with override fields. Rejects a
    /// duplicate (institution, activity) pair.
    pub fn attach_activity(
        &self,
        institution_id: &InstitutionId,
        activity_id: &ActivityId,
        draft: AttachmentDraft,
    ) -> Result<InstitutionActivity, CatalogError> {
        self.repository
            .institution(institution_id)?
            .ok_or(CatalogError::InstitutionNotFound)?;
        self.repository
            .activity(activity_id)?
            .ok_or(CatalogError::ActivityNotFound)?;

        if self
            .repository
            .institution_activity_for(institution_id, activity_id)?
            .is_some()
        {
            return Err(CatalogError::DuplicateAttachment);
        }

        let attachment = InstitutionActivity {
            id: next_attachment_id(),
            institution_id: institution_id.clone(),
            activity_id: activity_id.clone(),
            base_price: draft.base_price,
            min_cgpa: draft.min_cgpa,
            min_semester: draft.min_semester,
            is_required: draft.is_required,
            status: draft.status.unwrap_or(EntityStatus::Active),
            created_at: Utc::now(),
        };

        match self.repository.attach_activity(attachment) {
            Ok(stored) => {
                info!(institution = %institution_id.0, activity = %activity_id.0, "activity attached to institution");
                Ok(stored)
            }
            Err(RepositoryError::Conflict) => Err(CatalogError::DuplicateAttachment),
            Err(err) => Err(err.into()),
        }
    }

    /// Binds a drive to an institution with override fields. Rejects a
    /// duplicate (institution, drive) pair.
    pub fn attach_drive(
        &self,
        institution_id: &InstitutionId,
        drive_id: &DriveId,
        draft: AttachmentDraft,
    ) -> Result<InstitutionDrive, CatalogError> {
        self.repository
            .institution(institution_id)?
            .ok_or(CatalogError::InstitutionNotFound)?;
        self.repository
            .drive(drive_id)?
            .ok_or(CatalogError::DriveNotFound)?;

        if self
            .repository
            .institution_drive_for(institution_id, drive_id)?
            .is_some()
        {
            return Err(CatalogError::DuplicateAttachment);
        }

        let attachment = InstitutionDrive {
            id: next_attachment_id(),
            institution_id: institution_id.clone(),
            drive_id: drive_id.clone(),
            base_price: draft.base_price,
            min_cgpa: draft.min_cgpa,
            min_semester: draft.min_semester,
            is_required: draft.is_required,
            status: draft.status.unwrap_or(EntityStatus::Active),
            created_at: Utc::now(),
        };

        match self.repository.attach_drive(attachment) {
            Ok(stored) => {
                info!(institution = %institution_id.0, drive = %drive_id.0, "drive attached to institution");
                Ok(stored)
            }
            Err(RepositoryError::Conflict) => Err(CatalogError::DuplicateAttachment),
            Err(err) => Err(err.into()),
        }
    }

    pub fn register_institution(
        &self,
        name: String,
        city: String,
        state: String,
        status: Option<VerificationStatus>,
    ) -> Result<Institution, CatalogError> {
        let now = Utc::now();
        let institution = Institution {
            id: next_institution_id(),
            name,
            city,
            state,
            status: status.unwrap_or(VerificationStatus::Unverified),
            contact_person: None,
            contact_phone: None,
            created_at: now,
            updated_at: now,
        };
        Ok(self.repository.insert_institution(institution)?)
    }

    pub fn verify_institution(&self, id: &InstitutionId) -> Result<Institution, CatalogError> {
        let mut institution = self
            .repository
            .institution(id)?
            .ok_or(CatalogError::InstitutionNotFound)?;
        institution.status = VerificationStatus::Verified;
        institution.updated_at = Utc::now();
        Ok(self.repository.update_institution(institution)?)
    }

    /// Returns the institution with the given id when known, otherwise lazily
    /// creates an unverified record under the supplied name.
    pub fn get_or_create_institution(
        &self,
        id: Option<&InstitutionId>,
        name: &str,
    ) -> Result<Institution, CatalogError> {
        if let Some(id) = id {
            if let Some(existing) = self.repository.institution(id)? {
                return Ok(existing);
            }
        }
        if let Some(existing) = self.repository.institution_by_name(name)? {
            return Ok(existing);
        }
        self.register_institution(
            name.to_string(),
            String::new(),
            String::new(),
            Some(VerificationStatus::Unverified),
        )
    }
}
