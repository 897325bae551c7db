//! Candidate lifecycle: a placeholder profile is created at first contact
//! (email only), completed through onboarding, and mutated later via profile
//! updates. Candidates are never hard-deleted here.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use tracing::info;

use super::catalog::{CatalogError, CatalogService};
use super::domain::{
    Candidate, CandidateId, CandidateLifecycle, DepartmentId, Gender, InstitutionId,
};
use super::repository::{PlatformRepository, RepositoryError};

/// Error raised by the onboarding service.
#[derive(Debug, thiserror::Error)]
pub enum OnboardingError {
    #[error("candidate not found")]
    CandidateNotFound,
    #[error("email already registered")]
    EmailAlreadyRegistered,
    #[error("student id already registered")]
    StudentIdTaken,
    #[error("semester must be between 1 and 8")]
    SemesterOutOfRange,
    #[error("age must be between 1 and 120")]
    AgeOutOfRange,
    #[error("department not found")]
    DepartmentNotFound,
    #[error("submitted institution does not match the candidate's record")]
    InstitutionMismatch,
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

static CANDIDATE_SEQUENCE: AtomicU64 = AtomicU64::new(1);

const SEMESTER_RANGE: std::ops::RangeInclusive<u8> = 1..=8;
const AGE_RANGE: std::ops::RangeInclusive<u8> = 1..=120;

fn check_semester(semester: u8) -> Result<(), OnboardingError> {
    if SEMESTER_RANGE.contains(&semester) {
        Ok(())
    } else {
        Err(OnboardingError::SemesterOutOfRange)
    }
}

fn check_age(age: u8) -> Result<(), OnboardingError> {
    if AGE_RANGE.contains(&age) {
        Ok(())
    } else {
        Err(OnboardingError::AgeOutOfRange)
    }
}

fn next_candidate_id() -> CandidateId {
    let id = CANDIDATE_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    CandidateId(format!("cand-{id:06}"))
}

/// Institution selection on the onboarding form: a known id, or just a name
/// for lazy creation when the institution is not registered yet.
#[derive(Debug, Clone, Deserialize)]
pub struct InstitutionRef {
    #[serde(default)]
    pub id: Option<InstitutionId>,
    pub name: String,
}

/// Onboarding form filling in the placeholder profile.
#[derive(Debug, Clone, Deserialize)]
pub struct OnboardingForm {
    pub student_id: String,
    pub first_name: String,
    pub last_name: String,
    pub age: u8,
    pub gender: Gender,
    pub semester: u8,
    pub institution: InstitutionRef,
    pub department_id: DepartmentId,
}

/// Later profile mutation. Optional fields left `None` keep their value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub age: Option<u8>,
    #[serde(default)]
    pub semester: Option<u8>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub cgpa: Option<f32>,
    #[serde(default)]
    pub resume: Option<String>,
    #[serde(default)]
    pub additional_documents: Option<Vec<String>>,
    #[serde(default)]
    pub department_id: Option<DepartmentId>,
}

/// Service owning the candidate lifecycle.
pub struct OnboardingService<R> {
    repository: Arc<R>,
    catalog: CatalogService<R>,
}

impl<R> OnboardingService<R>
where
    R: PlatformRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        let catalog = CatalogService::new(repository.clone());
        Self { repository, catalog }
    }

    /// Creates a placeholder candidate at first contact. Duplicate emails are
    /// rejected so a candidate keeps exactly one profile.
    pub fn register_email(&self, email: &str) -> Result<Candidate, OnboardingError> {
        if self.repository.candidate_by_email(email)?.is_some() {
            return Err(OnboardingError::EmailAlreadyRegistered);
        }
        let candidate =
            Candidate::placeholder(next_candidate_id(), email.to_string(), Utc::now());
        let stored = self.repository.insert_candidate(candidate)?;
        info!(candidate = %stored.id.0, "placeholder candidate registered");
        Ok(stored)
    }

    /// Completes onboarding: fills in the required profile fields, resolving
    /// the institution lazily (auto-created unverified when unknown), and
    /// flips the lifecycle to `Onboarded`.
    pub fn complete_onboarding(
        &self,
        candidate_id: &CandidateId,
        form: OnboardingForm,
    ) -> Result<Candidate, OnboardingError> {
        check_semester(form.semester)?;
        check_age(form.age)?;

        let mut candidate = self
            .repository
            .candidate(candidate_id)?
            .ok_or(OnboardingError::CandidateNotFound)?;

        if self
            .repository
            .department(&form.department_id)?
            .is_none()
        {
            return Err(OnboardingError::DepartmentNotFound);
        }

        if let Some(holder) = self
            .repository
            .candidate_by_student_id(&form.student_id)?
        {
            if holder.id != *candidate_id {
                return Err(OnboardingError::StudentIdTaken);
            }
        }

        // A candidate pre-registered by their institution must onboard under
        // that same institution.
        if let (Some(recorded), Some(submitted)) =
            (&candidate.institution_id, &form.institution.id)
        {
            if recorded != submitted {
                return Err(OnboardingError::InstitutionMismatch);
            }
        }

        let institution = self
            .catalog
            .get_or_create_institution(form.institution.id.as_ref(), &form.institution.name)?;

        candidate.student_id = form.student_id;
        candidate.first_name = form.first_name;
        candidate.last_name = form.last_name;
        candidate.age = form.age;
        candidate.gender = form.gender;
        candidate.semester = form.semester;
        candidate.institution_id = Some(institution.id);
        candidate.department_id = Some(form.department_id);
        candidate.lifecycle = CandidateLifecycle::Onboarded;
        candidate.updated_at = Utc::now();

        let stored = self.repository.update_candidate(candidate)?;
        info!(candidate = %stored.id.0, "candidate onboarding completed");
        Ok(stored)
    }

    /// Applies a partial profile update to an onboarded candidate.
    pub fn update_profile(
        &self,
        candidate_id: &CandidateId,
        update: ProfileUpdate,
    ) -> Result<Candidate, OnboardingError> {
        if let Some(semester) = update.semester {
            check_semester(semester)?;
        }
        if let Some(age) = update.age {
            check_age(age)?;
        }

        let mut candidate = self
            .repository
            .candidate(candidate_id)?
            .ok_or(OnboardingError::CandidateNotFound)?;

        if let Some(department_id) = &update.department_id {
            if self.repository.department(department_id)?.is_none() {
                return Err(OnboardingError::DepartmentNotFound);
            }
        }

        if let Some(first_name) = update.first_name {
            candidate.first_name = first_name;
        }
        if let Some(last_name) = update.last_name {
            candidate.last_name = last_name;
        }
        if let Some(age) = update.age {
            candidate.age = age;
        }
        if let Some(semester) = update.semester {
            candidate.semester = semester;
        }
        if let Some(bio) = update.bio {
            candidate.bio = Some(bio);
        }
        if let Some(cgpa) = update.cgpa {
            candidate.cgpa = Some(cgpa);
        }
        if let Some(resume) = update.resume {
            candidate.resume = Some(resume);
        }
        if let Some(documents) = update.additional_documents {
            candidate.additional_documents = documents;
        }
        if let Some(department_id) = update.department_id {
            candidate.department_id = Some(department_id);
        }
        candidate.updated_at = Utc::now();

        Ok(self.repository.update_candidate(candidate)?)
    }
}
