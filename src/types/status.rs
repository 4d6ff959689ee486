// src/types/status.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

use super::job_record::{JobId, JobRecord};
use crate::error::FetchError;

/// Display status of a listing for the signed-in job seeker.
///
/// Variants are declared in precedence order: `Applied` outranks `Saved`,
/// which outranks `New`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    #[default]
    New,
    Saved,
    Applied,
}

impl JobStatus {
    /// Resolve overlay membership to exactly one status.
    pub fn from_membership(saved: bool, applied: bool) -> Self {
        match (saved, applied) {
            (_, true) => Self::Applied,
            (true, false) => Self::Saved,
            (false, false) => Self::New,
        }
    }

    pub fn is_terminal(self) -> bool {
        self == Self::Applied
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Saved => "saved",
            Self::Applied => "applied",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One status dimension backed by its own endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlayKind {
    Saved,
    Applied,
}

/// Every independently fetched input of the merged view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Listings,
    Saved,
    Applied,
}

impl From<OverlayKind> for SourceKind {
    fn from(kind: OverlayKind) -> Self {
        match kind {
            OverlayKind::Saved => Self::Saved,
            OverlayKind::Applied => Self::Applied,
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Listings => "listings",
            Self::Saved => "saved",
            Self::Applied => "applied",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MutationKind {
    Save,
    Unsave,
    Apply,
}

impl MutationKind {
    pub fn target_status(self) -> JobStatus {
        match self {
            Self::Save => JobStatus::Saved,
            Self::Unsave => JobStatus::New,
            Self::Apply => JobStatus::Applied,
        }
    }
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Save => "save",
            Self::Unsave => "unsave",
            Self::Apply => "apply",
        })
    }
}

/// An optimistic status change awaiting its network call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingMutation {
    pub job_id: JobId,
    pub kind: MutationKind,
    pub from_status: JobStatus,
    pub to_status: JobStatus,
    pub request_id: Uuid,
    pub started_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewEntry {
    pub job: JobRecord,
    pub status: JobStatus,
}

/// The merged, published snapshot every consumer reads from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardView {
    pub entries: Vec<ViewEntry>,
    pub source_errors: BTreeMap<SourceKind, FetchError>,
    pub pending: usize,
}

impl DashboardView {
    pub fn status_of(&self, job_id: &JobId) -> Option<JobStatus> {
        self.entries
            .iter()
            .find(|entry| &entry.job.id == job_id)
            .map(|entry| entry.status)
    }

    pub fn with_status(&self, status: JobStatus) -> impl Iterator<Item = &ViewEntry> {
        self.entries.iter().filter(move |e| e.status == status)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Error,
}

/// User-visible notification about a settled mutation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notice {
    pub job_id: JobId,
    pub level: NoticeLevel,
    pub message: String,
}
