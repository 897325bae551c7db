use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

use super::domain::{
    Activity, ActivityId, AttachmentId, Candidate, CandidateActivity, CandidateDrive, CandidateId,
    Department, DepartmentId, Drive, DriveActivity, DriveId, EnrollmentStatus, EntityStatus,
    Institution, InstitutionActivity, InstitutionDrive, InstitutionId, VerificationStatus,
};
use super::repository::{
    CatalogRepository, DirectoryRepository, EnrollmentRepository, RepositoryError,
};

/// In-memory backing store guarded by a single mutex. Mutations that touch
/// more than one table run through [`MemoryStore::transaction`], which stages
/// the change on a copy of state and commits all-or-nothing.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<StoreState>,
}

#[derive(Debug, Default, Clone)]
pub struct StoreState {
    institutions: BTreeMap<InstitutionId, Institution>,
    departments: BTreeMap<DepartmentId, Department>,
    candidates: BTreeMap<CandidateId, Candidate>,
    activities: BTreeMap<ActivityId, Activity>,
    drives: BTreeMap<DriveId, Drive>,
    drive_activities: Vec<DriveActivity>,
    institution_activities: BTreeMap<AttachmentId, InstitutionActivity>,
    institution_drives: BTreeMap<AttachmentId, InstitutionDrive>,
    candidate_activities: BTreeMap<(CandidateId, ActivityId), CandidateActivity>,
    candidate_drives: BTreeMap<(CandidateId, DriveId), CandidateDrive>,
}

impl StoreState {
    /// Fails with `Conflict` when the (candidate, drive) pair exists.
    pub fn insert_candidate_drive(
        &mut self,
        row: CandidateDrive,
    ) -> Result<CandidateDrive, RepositoryError> {
        let key = (row.candidate_id.clone(), row.drive_id.clone());
        if self.candidate_drives.contains_key(&key) {
            return Err(RepositoryError::Conflict);
        }
        self.candidate_drives.insert(key, row.clone());
        Ok(row)
    }

    /// Returns `true` when the row was created, `false` when the pair already
    /// existed and the insert was skipped.
    pub fn insert_candidate_activity_skipping_duplicate(
        &mut self,
        row: CandidateActivity,
    ) -> bool {
        let key = (row.candidate_id.clone(), row.activity_id.clone());
        if self.candidate_activities.contains_key(&key) {
            return false;
        }
        self.candidate_activities.insert(key, row);
        true
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read<T>(&self, f: impl FnOnce(&StoreState) -> T) -> Result<T, RepositoryError> {
        let guard = self
            .state
            .lock()
            .map_err(|_| RepositoryError::Unavailable("store mutex poisoned".to_string()))?;
        Ok(f(&guard))
    }

    /// Runs `f` against a staged copy of the store. The copy replaces the
    /// live state only when `f` returns `Ok`; on `Err` no change is visible.
    pub fn transaction<T>(
        &self,
        f: impl FnOnce(&mut StoreState) -> Result<T, RepositoryError>,
    ) -> Result<T, RepositoryError> {
        let mut guard = self
            .state
            .lock()
            .map_err(|_| RepositoryError::Unavailable("store mutex poisoned".to_string()))?;
        let mut staged = guard.clone();
        let value = f(&mut staged)?;
        *guard = staged;
        Ok(value)
    }
}

impl CatalogRepository for MemoryStore {
    fn activity(&self, id: &ActivityId) -> Result<Option<Activity>, RepositoryError> {
        self.read(|state| state.activities.get(id).cloned())
    }

    fn drive(&self, id: &DriveId) -> Result<Option<Drive>, RepositoryError> {
        self.read(|state| state.drives.get(id).cloned())
    }

    fn activities_with_status(
        &self,
        status: EntityStatus,
    ) -> Result<Vec<Activity>, RepositoryError> {
        self.read(|state| {
            state
                .activities
                .values()
                .filter(|activity| activity.status == status)
                .cloned()
                .collect()
        })
    }

    fn drives_with_status(&self, status: EntityStatus) -> Result<Vec<Drive>, RepositoryError> {
        self.read(|state| {
            state
                .drives
                .values()
                .filter(|drive| drive.status == status)
                .cloned()
                .collect()
        })
    }

    fn drive_activities(&self, drive: &DriveId) -> Result<Vec<DriveActivity>, RepositoryError> {
        self.read(|state| {
            state
                .drive_activities
                .iter()
                .filter(|row| &row.drive_id == drive)
                .cloned()
                .collect()
        })
    }

    fn institution_activities(
        &self,
        institution: &InstitutionId,
    ) -> Result<Vec<InstitutionActivity>, RepositoryError> {
        self.read(|state| {
            state
                .institution_activities
                .values()
                .filter(|row| &row.institution_id == institution)
                .cloned()
                .collect()
        })
    }

    fn institution_drives(
        &self,
        institution: &InstitutionId,
    ) -> Result<Vec<InstitutionDrive>, RepositoryError> {
        self.read(|state| {
            state
                .institution_drives
                .values()
                .filter(|row| &row.institution_id == institution)
                .cloned()
                .collect()
        })
    }

    fn institution_activity_for(
        &self,
        institution: &InstitutionId,
        activity: &ActivityId,
    ) -> Result<Option<InstitutionActivity>, RepositoryError> {
        self.read(|state| {
            state
                .institution_activities
                .values()
                .find(|row| &row.institution_id == institution && &row.activity_id == activity)
                .cloned()
        })
    }

    fn institution_drive_for(
        &self,
        institution: &InstitutionId,
        drive: &DriveId,
    ) -> Result<Option<InstitutionDrive>, RepositoryError> {
        self.read(|state| {
            state
                .institution_drives
                .values()
                .find(|row| &row.institution_id == institution && &row.drive_id == drive)
                .cloned()
        })
    }

    fn insert_activity(&self, activity: Activity) -> Result<Activity, RepositoryError> {
        self.transaction(|state| {
            if state.activities.contains_key(&activity.id) {
                return Err(RepositoryError::Conflict);
            }
            state.activities.insert(activity.id.clone(), activity.clone());
            Ok(activity)
        })
    }

    fn update_activity(&self, activity: Activity) -> Result<Activity, RepositoryError> {
        self.transaction(|state| {
            if !state.activities.contains_key(&activity.id) {
                return Err(RepositoryError::NotFound);
            }
            state.activities.insert(activity.id.clone(), activity.clone());
            Ok(activity)
        })
    }

    fn insert_drive(&self, drive: Drive) -> Result<Drive, RepositoryError> {
        self.transaction(|state| {
            if state.drives.contains_key(&drive.id) {
                return Err(RepositoryError::Conflict);
            }
            state.drives.insert(drive.id.clone(), drive.clone());
            Ok(drive)
        })
    }

    fn update_drive(&self, drive: Drive) -> Result<Drive, RepositoryError> {
        self.transaction(|state| {
            if !state.drives.contains_key(&drive.id) {
                return Err(RepositoryError::NotFound);
            }
            state.drives.insert(drive.id.clone(), drive.clone());
            Ok(drive)
        })
    }

    fn replace_drive_activities(
        &self,
        drive: &DriveId,
        rows: Vec<DriveActivity>,
    ) -> Result<(), RepositoryError> {
        self.transaction(|state| {
            state.drive_activities.retain(|row| &row.drive_id != drive);
            state.drive_activities.extend(rows);
            Ok(())
        })
    }

    fn attach_activity(
        &self,
        attachment: InstitutionActivity,
    ) -> Result<InstitutionActivity, RepositoryError> {
        self.transaction(|state| {
            let duplicate = state.institution_activities.values().any(|row| {
                row.institution_id == attachment.institution_id
                    && row.activity_id == attachment.activity_id
            });
            if duplicate {
                return Err(RepositoryError::Conflict);
            }
            state
                .institution_activities
                .insert(attachment.id.clone(), attachment.clone());
            Ok(attachment)
        })
    }

    fn attach_drive(
        &self,
        attachment: InstitutionDrive,
    ) -> Result<InstitutionDrive, RepositoryError> {
        self.transaction(|state| {
            let duplicate = state.institution_drives.values().any(|row| {
                row.institution_id == attachment.institution_id
                    && row.drive_id == attachment.drive_id
            });
            if duplicate {
                return Err(RepositoryError::Conflict);
            }
            state
                .institution_drives
                .insert(attachment.id.clone(), attachment.clone());
            Ok(attachment)
        })
    }
}

impl DirectoryRepository for MemoryStore {
    fn institution(&self, id: &InstitutionId) -> Result<Option<Institution>, RepositoryError> {
        self.read(|state| state.institutions.get(id).cloned())
    }

    fn institution_by_name(&self, name: &str) -> Result<Option<Institution>, RepositoryError> {
        self.read(|state| {
            state
                .institutions
                .values()
                .find(|institution| institution.name == name)
                .cloned()
        })
    }

    fn institutions(
        &self,
        include_unverified: bool,
    ) -> Result<Vec<Institution>, RepositoryError> {
        self.read(|state| {
            let mut rows: Vec<Institution> = state
                .institutions
                .values()
                .filter(|institution| {
                    include_unverified || institution.status == VerificationStatus::Verified
                })
                .cloned()
                .collect();
            rows.sort_by(|a, b| a.name.cmp(&b.name));
            rows
        })
    }

    fn insert_institution(
        &self,
        institution: Institution,
    ) -> Result<Institution, RepositoryError> {
        self.transaction(|state| {
            if state.institutions.contains_key(&institution.id) {
                return Err(RepositoryError::Conflict);
            }
            state
                .institutions
                .insert(institution.id.clone(), institution.clone());
            Ok(institution)
        })
    }

    fn update_institution(
        &self,
        institution: Institution,
    ) -> Result<Institution, RepositoryError> {
        self.transaction(|state| {
            if !state.institutions.contains_key(&institution.id) {
                return Err(RepositoryError::NotFound);
            }
            state
                .institutions
                .insert(institution.id.clone(), institution.clone());
            Ok(institution)
        })
    }

    fn department(&self, id: &DepartmentId) -> Result<Option<Department>, RepositoryError> {
        self.read(|state| state.departments.get(id).cloned())
    }

    fn departments(&self) -> Result<Vec<Department>, RepositoryError> {
        self.read(|state| state.departments.values().cloned().collect())
    }

    fn insert_department(&self, department: Department) -> Result<Department, RepositoryError> {
        self.transaction(|state| {
            if state.departments.contains_key(&department.id) {
                return Err(RepositoryError::Conflict);
            }
            state
                .departments
                .insert(department.id.clone(), department.clone());
            Ok(department)
        })
    }

    fn candidate(&self, id: &CandidateId) -> Result<Option<Candidate>, RepositoryError> {
        self.read(|state| state.candidates.get(id).cloned())
    }

    fn candidate_by_email(&self, email: &str) -> Result<Option<Candidate>, RepositoryError> {
        self.read(|state| {
            state
                .candidates
                .values()
                .find(|candidate| candidate.email == email)
                .cloned()
        })
    }

    fn candidate_by_student_id(
        &self,
        student_id: &str,
    ) -> Result<Option<Candidate>, RepositoryError> {
        self.read(|state| {
            state
                .candidates
                .values()
                .find(|candidate| {
                    !candidate.student_id.is_empty() && candidate.student_id == student_id
                })
                .cloned()
        })
    }

    fn insert_candidate(&self, candidate: Candidate) -> Result<Candidate, RepositoryError> {
        self.transaction(|state| {
            if state.candidates.contains_key(&candidate.id) {
                return Err(RepositoryError::Conflict);
            }
            state
                .candidates
                .insert(candidate.id.clone(), candidate.clone());
            Ok(candidate)
        })
    }

    fn update_candidate(&self, candidate: Candidate) -> Result<Candidate, RepositoryError> {
        self.transaction(|state| {
            if !state.candidates.contains_key(&candidate.id) {
                return Err(RepositoryError::NotFound);
            }
            state
                .candidates
                .insert(candidate.id.clone(), candidate.clone());
            Ok(candidate)
        })
    }
}

impl EnrollmentRepository for MemoryStore {
    fn candidate_activity(
        &self,
        candidate: &CandidateId,
        activity: &ActivityId,
    ) -> Result<Option<CandidateActivity>, RepositoryError> {
        self.read(|state| {
            state
                .candidate_activities
                .get(&(candidate.clone(), activity.clone()))
                .cloned()
        })
    }

    fn candidate_activities(
        &self,
        candidate: &CandidateId,
    ) -> Result<Vec<CandidateActivity>, RepositoryError> {
        self.read(|state| {
            let mut rows: Vec<CandidateActivity> = state
                .candidate_activities
                .values()
                .filter(|row| &row.candidate_id == candidate)
                .cloned()
                .collect();
            rows.sort_by(|a, b| b.enrolled_at.cmp(&a.enrolled_at));
            rows
        })
    }

    fn candidate_drive(
        &self,
        candidate: &CandidateId,
        drive: &DriveId,
    ) -> Result<Option<CandidateDrive>, RepositoryError> {
        self.read(|state| {
            state
                .candidate_drives
                .get(&(candidate.clone(), drive.clone()))
                .cloned()
        })
    }

    fn candidate_drives(
        &self,
        candidate: &CandidateId,
    ) -> Result<Vec<CandidateDrive>, RepositoryError> {
        self.read(|state| {
            let mut rows: Vec<CandidateDrive> = state
                .candidate_drives
                .values()
                .filter(|row| &row.candidate_id == candidate)
                .cloned()
                .collect();
            rows.sort_by(|a, b| b.applied_at.cmp(&a.applied_at));
            rows
        })
    }

    fn candidate_activities_for_drive(
        &self,
        candidate: &CandidateId,
        drive: &DriveId,
    ) -> Result<Vec<CandidateActivity>, RepositoryError> {
        self.read(|state| {
            state
                .candidate_activities
                .values()
                .filter(|row| {
                    &row.candidate_id == candidate && row.drive_id.as_ref() == Some(drive)
                })
                .cloned()
                .collect()
        })
    }

    fn completed_activity_ids(
        &self,
        candidate: &CandidateId,
        within: &[ActivityId],
    ) -> Result<BTreeSet<ActivityId>, RepositoryError> {
        self.read(|state| {
            within
                .iter()
                .filter(|id| {
                    state
                        .candidate_activities
                        .get(&(candidate.clone(), (*id).clone()))
                        .map(|row| row.status == EnrollmentStatus::Completed)
                        .unwrap_or(false)
                })
                .cloned()
                .collect()
        })
    }

    fn insert_candidate_activity(
        &self,
        row: CandidateActivity,
    ) -> Result<CandidateActivity, RepositoryError> {
        self.transaction(|state| {
            let key = (row.candidate_id.clone(), row.activity_id.clone());
            if state.candidate_activities.contains_key(&key) {
                return Err(RepositoryError::Conflict);
            }
            state.candidate_activities.insert(key, row.clone());
            Ok(row)
        })
    }

    fn ensure_candidate_activities(
        &self,
        rows: Vec<CandidateActivity>,
    ) -> Result<Vec<CandidateActivity>, RepositoryError> {
        self.transaction(|state| {
            let mut created = Vec::new();
            for row in rows {
                if state.insert_candidate_activity_skipping_duplicate(row.clone()) {
                    created.push(row);
                }
            }
            Ok(created)
        })
    }

    fn create_drive_enrollment(
        &self,
        enrollment: CandidateDrive,
        cascade: Vec<CandidateActivity>,
    ) -> Result<(CandidateDrive, Vec<CandidateActivity>), RepositoryError> {
        self.transaction(|state| {
            let stored = state.insert_candidate_drive(enrollment)?;
            let mut created = Vec::new();
            for row in cascade {
                if state.insert_candidate_activity_skipping_duplicate(row.clone()) {
                    created.push(row);
                }
            }
            Ok((stored, created))
        })
    }

    fn activity_enrollment_counts(
        &self,
        ids: &[ActivityId],
    ) -> Result<BTreeMap<ActivityId, u64>, RepositoryError> {
        self.read(|state| {
            let wanted: BTreeSet<&ActivityId> = ids.iter().collect();
            let mut counts: BTreeMap<ActivityId, u64> =
                ids.iter().map(|id| (id.clone(), 0)).collect();
            for row in state.candidate_activities.values() {
                if wanted.contains(&row.activity_id) {
                    *counts.entry(row.activity_id.clone()).or_insert(0) += 1;
                }
            }
            counts
        })
    }

    fn drive_enrollment_counts(
        &self,
        ids: &[DriveId],
    ) -> Result<BTreeMap<DriveId, u64>, RepositoryError> {
        self.read(|state| {
            let wanted: BTreeSet<&DriveId> = ids.iter().collect();
            let mut counts: BTreeMap<DriveId, u64> =
                ids.iter().map(|id| (id.clone(), 0)).collect();
            for row in state.candidate_drives.values() {
                if wanted.contains(&row.drive_id) {
                    *counts.entry(row.drive_id.clone()).or_insert(0) += 1;
                }
            }
            counts
        })
    }
}
