// src/types/mod.rs
pub mod application;
pub mod job_record;
pub mod status;

pub use application::{ApplicationRecord, StatusUpdate};
pub use job_record::{JobId, JobRecord, SalaryRange, Skill};
pub use status::{
    DashboardView, JobStatus, MutationKind, Notice, NoticeLevel, OverlayKind, PendingMutation,
    SourceKind, ViewEntry,
};
