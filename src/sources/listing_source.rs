// src/sources/listing_source.rs
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};

use super::{collection_items, with_retry, RetryPolicy};
use crate::core::JobBoardApi;
use crate::error::FetchError;
use crate::types::JobRecord;

/// Authoritative job-listing feed. Carries no status of its own.
pub struct ListingSource<A> {
    api: Arc<A>,
    retry: RetryPolicy,
}

impl<A: JobBoardApi> ListingSource<A> {
    pub fn new(api: Arc<A>, retry: RetryPolicy) -> Self {
        Self { api, retry }
    }

    pub async fn fetch(&self) -> Result<Vec<JobRecord>, FetchError> {
        let payload = with_retry(self.retry, "listings", || self.api.get_all_jobs()).await?;
        let listings = normalize_listings(&payload)?;
        info!("Fetched {} job listings", listings.len());
        Ok(listings)
    }
}

/// Normalize a listing payload, keeping backend order.
///
/// Records without an id are skipped and duplicate ids keep their first
/// occurrence so item identity stays stable for the list view.
pub fn normalize_listings(payload: &Value) -> Result<Vec<JobRecord>, FetchError> {
    let items = collection_items(payload, "job listings")?;
    let mut seen = HashSet::with_capacity(items.len());
    let mut listings = Vec::with_capacity(items.len());

    for (index, item) in items.iter().enumerate() {
        let Some(job) = JobRecord::from_backend(item) else {
            warn!("Skipping job listing #{} without an id", index);
            continue;
        };
        if !seen.insert(job.id.clone()) {
            warn!("Skipping duplicate job listing {}", job.id);
            continue;
        }
        listings.push(job);
    }

    Ok(listings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::JobId;
    use serde_json::json;

    #[test]
    fn test_keeps_order_and_skips_bad_records() {
        let payload = json!({"jobs": [
            {"id": 3, "title": "C"},
            {"title": "no id"},
            {"id": "1", "title": "A"},
            {"id": 3, "title": "C again"},
            {"id": 2}
        ]});
        let listings = normalize_listings(&payload).unwrap();
        let ids: Vec<&str> = listings.iter().map(|j| j.id.as_str()).collect();
        assert_eq!(ids, vec!["3", "1", "2"]);
        assert_eq!(listings[0].title, "C");
        assert_eq!(listings[2].id, JobId::from("2"));
    }

    #[test]
    fn test_rejects_non_collection_payload() {
        assert!(matches!(
            normalize_listings(&json!({"message": "maintenance"})),
            Err(FetchError::MalformedResponse { .. })
        ));
    }
}
