// src/sources/overlay_source.rs
//! Saved / applied status overlays and the denormalized records behind them

use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::{collection_items, with_retry, RetryPolicy};
use crate::core::JobBoardApi;
use crate::error::FetchError;
use crate::types::{ApplicationRecord, JobId, JobRecord, OverlayKind};
use crate::utils::{first_id, value_at};

/// One status dimension: the set of job ids the user saved or applied to.
pub struct OverlaySource<A> {
    kind: OverlayKind,
    api: Arc<A>,
    retry: RetryPolicy,
}

impl<A: JobBoardApi> OverlaySource<A> {
    pub fn new(kind: OverlayKind, api: Arc<A>, retry: RetryPolicy) -> Self {
        Self { kind, api, retry }
    }

    pub fn kind(&self) -> OverlayKind {
        self.kind
    }

    pub async fn fetch(&self) -> Result<HashSet<JobId>, FetchError> {
        let ids: HashSet<JobId> = match self.kind {
            OverlayKind::Saved => self
                .fetch_saved_job_records()
                .await?
                .into_iter()
                .map(|job| job.id)
                .collect(),
            OverlayKind::Applied => self
                .fetch_application_records()
                .await?
                .into_iter()
                .map(|app| app.job.id)
                .collect(),
        };
        info!("Fetched {:?} overlay with {} job ids", self.kind, ids.len());
        Ok(ids)
    }

    /// Saved-job snapshots, independent of the main listing feed
    pub async fn fetch_saved_job_records(&self) -> Result<Vec<JobRecord>, FetchError> {
        let payload = with_retry(self.retry, "saved jobs", || self.api.get_saved_jobs()).await?;
        normalize_saved_jobs(&payload)
    }

    /// Submitted applications, each with its own job snapshot
    pub async fn fetch_application_records(&self) -> Result<Vec<ApplicationRecord>, FetchError> {
        let payload =
            with_retry(self.retry, "applications", || self.api.get_applications()).await?;
        normalize_applications(&payload)
    }
}

/// Single-id saved confirmation (`check-saved-job`).
pub struct SavedCheck<A> {
    api: Arc<A>,
    retry: RetryPolicy,
}

impl<A: JobBoardApi> SavedCheck<A> {
    pub fn new(api: Arc<A>, retry: RetryPolicy) -> Self {
        Self { api, retry }
    }

    pub async fn check(&self, job_id: &JobId) -> Result<bool, FetchError> {
        let saved = with_retry(self.retry, "saved check", || self.api.check_saved_job(job_id)).await?;
        debug!("Job {} saved check: {}", job_id, saved);
        Ok(saved)
    }
}

pub fn normalize_saved_jobs(payload: &Value) -> Result<Vec<JobRecord>, FetchError> {
    let items = collection_items(payload, "saved jobs")?;
    let mut seen = HashSet::new();

    Ok(items
        .iter()
        .filter_map(|row| {
            let nested = value_at(row, "job")
                .or_else(|| value_at(row, "job_listing"))
                .filter(|v| v.is_object());

            // the saved row's own job reference wins over the snapshot id
            let id = first_id(row, &["job_id", "job_listing_id"])
                .or_else(|| nested.and_then(|job| first_id(job, &["id"])))
                .or_else(|| first_id(row, &["id"]));

            match id {
                Some(id) => Some(JobRecord::from_backend_with_id(
                    nested.unwrap_or(row),
                    JobId::new(id),
                )),
                None => {
                    warn!("Skipping saved job without a job id");
                    None
                }
            }
        })
        .filter(|job| seen.insert(job.id.clone()))
        .collect())
}

pub fn normalize_applications(payload: &Value) -> Result<Vec<ApplicationRecord>, FetchError> {
    let items = collection_items(payload, "applications")?;
    Ok(items
        .iter()
        .filter_map(|raw| {
            let record = ApplicationRecord::from_backend(raw);
            if record.is_none() {
                warn!("Skipping application without a job id");
            }
            record
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_saved_rows_prefer_row_job_id() {
        let payload = json!([
            {"id": 900, "job_id": 42, "job": {"id": 42, "title": "Engineer"}},
            {"id": 901, "job_listing": {"id": "7", "title": "Analyst"}},
            {"id": "5", "title": "Flat row"},
            {"id": 902, "job_id": 42},
            {"note": "nothing usable"}
        ]);
        let saved = normalize_saved_jobs(&payload).unwrap();
        let ids: Vec<&str> = saved.iter().map(|j| j.id.as_str()).collect();
        assert_eq!(ids, vec!["42", "7", "5"]);
        assert_eq!(saved[0].title, "Engineer");
        assert_eq!(saved[1].company_name, "Unknown Company");
    }

    #[test]
    fn test_applications_skip_unidentified() {
        let payload = json!({"applications": [
            {"job_listing_id": 1, "status": "pending"},
            {"status": "orphan"}
        ]});
        let apps = normalize_applications(&payload).unwrap();
        assert_eq!(apps.len(), 1);
        assert_eq!(apps[0].job_id(), &JobId::from("1"));
    }
}
