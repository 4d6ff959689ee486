//! Client-side job status reconciliation for the job seeker dashboard.
//!
//! The listing feed, the saved-jobs overlay and the applications overlay are
//! fetched independently and merged by [`reconciler`] into one published
//! [`DashboardView`]. Status changes go through [`mutator`] only.

pub mod cli;
pub mod core;
pub mod dashboard;
pub mod error;
pub mod mutator;
pub mod reconciler;
pub mod resume_validator;
pub mod session;
pub mod sources;
pub mod types;
pub mod utils;

pub use crate::core::{ApiClient, ConfigManager, JobBoardApi, ResumeUpload};
pub use dashboard::Dashboard;
pub use error::{FetchError, MutationError};
pub use mutator::OptimisticMutator;
pub use reconciler::{reconcile, StatusStore};
pub use session::SessionStore;
pub use sources::RetryPolicy;
pub use types::{
    ApplicationRecord, DashboardView, JobId, JobRecord, JobStatus, Notice, PendingMutation,
    ViewEntry,
};
