//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod campaign_repo;
pub mod contact_list_repo;
pub mod job_repo;
pub mod lock_repo;

pub use campaign_repo::CampaignRepo;
pub use contact_list_repo::ContactListRepo;
pub use job_repo::JobRepo;
pub use lock_repo::{AcquireOutcome, CampaignLockRepo, ReleaseOutcome};
