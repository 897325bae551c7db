//! Audience resolution: decides whether an activity or drive is publicly
//! visible or institution-gated, and merges institution override fields onto
//! the base entity. All operations here are read-only.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::domain::{
    Activity, ActivityId, AttachmentId, AudienceTag, Drive, DriveId, EntityStatus, InstitutionId,
};
use super::repository::{CatalogRepository, EnrollmentRepository, RepositoryError};

/// Merged listing entry for an activity. Institution-scoped entries carry the
/// attachment id of the override record; public entries do not.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityListing {
    pub id: ActivityId,
    pub name: String,
    pub description: String,
    pub status: EntityStatus,
    pub base_price: u32,
    pub min_cgpa: Option<f32>,
    pub min_semester: Option<u8>,
    pub attachment_id: Option<AttachmentId>,
    pub is_required: bool,
    pub enrolled_count: u64,
    pub updated_at: DateTime<Utc>,
}

/// Merged listing entry for a drive.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriveListing {
    pub id: DriveId,
    pub name: String,
    pub company_name: Option<String>,
    pub description: String,
    pub requirements: String,
    pub available_positions: u32,
    pub status: EntityStatus,
    pub base_price: u32,
    pub min_cgpa: Option<f32>,
    pub min_semester: Option<u8>,
    pub attachment_id: Option<AttachmentId>,
    pub is_required: bool,
    pub enrolled_count: u64,
    pub updated_at: DateTime<Utc>,
}

/// True iff the activity's audience set carries the `Public` tag. An unknown
/// activity or an empty set resolves to non-public.
pub fn is_public_activity<R>(repository: &R, id: &ActivityId) -> Result<bool, RepositoryError>
where
    R: CatalogRepository,
{
    Ok(repository
        .activity(id)?
        .map(|activity| activity.applies.contains(&AudienceTag::Public))
        .unwrap_or(false))
}

/// True iff the drive's audience set carries the `Public` tag.
pub fn is_public_drive<R>(repository: &R, id: &DriveId) -> Result<bool, RepositoryError>
where
    R: CatalogRepository,
{
    Ok(repository
        .drive(id)?
        .map(|drive| drive.applies.contains(&AudienceTag::Public))
        .unwrap_or(false))
}

fn is_public(applies: &std::collections::BTreeSet<AudienceTag>) -> bool {
    applies.contains(&AudienceTag::Public)
}

/// Activities visible to candidates of the given institution: active
/// institution overrides merged with override fields, followed by active
/// public activities not already represented. Institution-scoped entries
/// order most recently attached first.
pub fn activities_for_institution<R>(
    repository: &R,
    institution: Option<&InstitutionId>,
) -> Result<Vec<ActivityListing>, RepositoryError>
where
    R: CatalogRepository + EnrollmentRepository,
{
    let mut scoped: Vec<(DateTime<Utc>, ActivityListing)> = Vec::new();
    let mut scoped_ids: Vec<ActivityId> = Vec::new();

    if let Some(institution) = institution {
        let mut overrides = repository.institution_activities(institution)?;
        overrides.retain(|row| row.status == EntityStatus::Active);
        for row in overrides {
            // Attachment rows always mask the base entity in the public set,
            // even when the base is not active enough to be listed itself.
            scoped_ids.push(row.activity_id.clone());
            let Some(base) = repository.activity(&row.activity_id)? else {
                continue;
            };
            if base.status != EntityStatus::Active {
                continue;
            }
            scoped.push((
                row.created_at,
                ActivityListing {
                    id: base.id.clone(),
                    name: base.name.clone(),
                    description: base.description.clone(),
                    status: base.status,
                    base_price: row.base_price.unwrap_or(base.base_price),
                    min_cgpa: row.min_cgpa.or(base.min_cgpa),
                    min_semester: row.min_semester.or(base.min_semester),
                    attachment_id: Some(row.id.clone()),
                    is_required: row.is_required,
                    enrolled_count: 0,
                    updated_at: base.updated_at,
                },
            ));
        }
    }

    scoped.sort_by(|a, b| b.0.cmp(&a.0));
    let mut listings: Vec<ActivityListing> = scoped.into_iter().map(|(_, item)| item).collect();

    let mut public: Vec<Activity> = repository
        .activities_with_status(EntityStatus::Active)?
        .into_iter()
        .filter(|activity| is_public(&activity.applies) && !scoped_ids.contains(&activity.id))
        .collect();
    public.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    listings.extend(public.into_iter().map(|activity| ActivityListing {
        id: activity.id.clone(),
        name: activity.name,
        description: activity.description,
        status: activity.status,
        base_price: activity.base_price,
        min_cgpa: activity.min_cgpa,
        min_semester: activity.min_semester,
        attachment_id: None,
        is_required: false,
        enrolled_count: 0,
        updated_at: activity.updated_at,
    }));

    let ids: Vec<ActivityId> = listings.iter().map(|item| item.id.clone()).collect();
    let counts = repository.activity_enrollment_counts(&ids)?;
    for listing in &mut listings {
        listing.enrolled_count = counts.get(&listing.id).copied().unwrap_or(0);
    }

    Ok(listings)
}

/// Drives visible to candidates of the given institution, symmetric to
/// [`activities_for_institution`], with global enrollment counts attached.
pub fn drives_for_institution<R>(
    repository: &R,
    institution: Option<&InstitutionId>,
) -> Result<Vec<DriveListing>, RepositoryError>
where
    R: CatalogRepository + EnrollmentRepository,
{
    let mut scoped: Vec<(DateTime<Utc>, DriveListing)> = Vec::new();
    let mut scoped_ids: Vec<DriveId> = Vec::new();

    if let Some(institution) = institution {
        let mut overrides = repository.institution_drives(institution)?;
        overrides.retain(|row| row.status == EntityStatus::Active);
        for row in overrides {
            scoped_ids.push(row.drive_id.clone());
            let Some(base) = repository.drive(&row.drive_id)? else {
                continue;
            };
            if base.status != EntityStatus::Active {
                continue;
            }
            scoped.push((
                row.created_at,
                DriveListing {
                    id: base.id.clone(),
                    name: base.name.clone(),
                    company_name: base.company_name.clone(),
                    description: base.description.clone(),
                    requirements: base.requirements.clone(),
                    available_positions: base.available_positions,
                    status: base.status,
                    base_price: row.base_price.unwrap_or(base.base_price),
                    min_cgpa: row.min_cgpa.or(base.min_cgpa),
                    min_semester: row.min_semester.or(base.min_semester),
                    attachment_id: Some(row.id.clone()),
                    is_required: row.is_required,
                    enrolled_count: 0,
                    updated_at: base.updated_at,
                },
            ));
        }
    }

    scoped.sort_by(|a, b| b.0.cmp(&a.0));
    let mut listings: Vec<DriveListing> = scoped.into_iter().map(|(_, item)| item).collect();

    let mut public: Vec<Drive> = repository
        .drives_with_status(EntityStatus::Active)?
        .into_iter()
        .filter(|drive| is_public(&drive.applies) && !scoped_ids.contains(&drive.id))
        .collect();
    public.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    listings.extend(public.into_iter().map(|drive| DriveListing {
        id: drive.id.clone(),
        name: drive.name,
        company_name: drive.company_name,
        description: drive.description,
        requirements: drive.requirements,
        available_positions: drive.available_positions,
        status: drive.status,
        base_price: drive.base_price,
        min_cgpa: drive.min_cgpa,
        min_semester: drive.min_semester,
        attachment_id: None,
        is_required: false,
        enrolled_count: 0,
        updated_at: drive.updated_at,
    }));

    let ids: Vec<DriveId> = listings.iter().map(|item| item.id.clone()).collect();
    let counts = repository.drive_enrollment_counts(&ids)?;
    for listing in &mut listings {
        listing.enrolled_count = counts.get(&listing.id).copied().unwrap_or(0);
    }

    Ok(listings)
}
