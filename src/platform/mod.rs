//! Placement platform core: institutions, candidates, activities, and
//! recruitment drives, with audience-scoped visibility and enrollment.
//!
//! Everything here is storage-agnostic behind the repository traits; the
//! bundled `MemoryStore` backs the service and the test suites.

pub mod audience;
pub mod availability;
pub mod catalog;
pub mod domain;
pub(crate) mod eligibility;
pub mod enrollment;
pub mod onboarding;
pub mod repository;
pub mod router;
pub mod seed;
pub mod store;

#[cfg(test)]
mod tests;

pub use availability::{CandidateActivities, CandidateDrives};
pub use catalog::{ActivityDraft, AttachmentDraft, CatalogError, CatalogService, DriveDraft};
pub use domain::{
    Activity, ActivityCategory, ActivityId, ActivityKind, AttachmentId, AudienceTag, Candidate,
    CandidateActivity, CandidateDrive, CandidateId, CandidateLifecycle, Department, DepartmentId,
    Drive, DriveActivity, DriveActivityKind, DriveId, EnrollmentStatus, EntityStatus, Gender,
    Institution, InstitutionActivity, InstitutionDrive, InstitutionId, VerificationStatus,
};
pub use eligibility::{MissingPrerequisite, PrerequisiteCheck};
pub use enrollment::{DriveEnrollmentReceipt, EnrollmentError, EnrollmentService};
pub use onboarding::{OnboardingError, OnboardingForm, OnboardingService, ProfileUpdate};
pub use repository::{
    CatalogRepository, DirectoryRepository, EnrollmentRepository, PlatformRepository,
    RepositoryError,
};
pub use router::{platform_router, PlatformState};
pub use seed::{seed_demo_data, SeedError, SeedReport};
pub use store::MemoryStore;
