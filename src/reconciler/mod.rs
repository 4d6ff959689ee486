// src/reconciler/mod.rs
//! Merge of the listing feed with the saved/applied overlays and any
//! optimistic mutations into the single published view.

pub mod store;

pub use store::{Epoch, SavedCheckTicket, StatusStore};

use std::collections::{HashMap, HashSet};

use crate::types::{JobId, JobRecord, JobStatus, PendingMutation, ViewEntry};

/// Committed status of one job from overlay membership alone.
pub fn base_status(job_id: &JobId, saved: &HashSet<JobId>, applied: &HashSet<JobId>) -> JobStatus {
    JobStatus::from_membership(saved.contains(job_id), applied.contains(job_id))
}

/// Pure merge, recomputed on every input change.
///
/// Output follows listing order exactly. Overlay ids that are not in the
/// listing are not emitted; a pending mutation overrides the overlay status
/// of its job.
pub fn reconcile(
    listings: &[JobRecord],
    saved: &HashSet<JobId>,
    applied: &HashSet<JobId>,
    pending: &HashMap<JobId, PendingMutation>,
) -> Vec<ViewEntry> {
    listings
        .iter()
        .map(|job| {
            let status = match pending.get(&job.id) {
                Some(mutation) => mutation.to_status,
                None => base_status(&job.id, saved, applied),
            };
            ViewEntry {
                job: job.clone(),
                status,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MutationKind;
    use serde_json::json;

    fn job(id: &str) -> JobRecord {
        JobRecord::from_backend(&json!({"id": id, "title": format!("Job {}", id)})).unwrap()
    }

    fn ids(list: &[&str]) -> HashSet<JobId> {
        list.iter().map(|id| JobId::from(*id)).collect()
    }

    fn pending(id: &str, kind: MutationKind, from: JobStatus) -> PendingMutation {
        PendingMutation {
            job_id: JobId::from(id),
            kind,
            from_status: from,
            to_status: kind.target_status(),
            request_id: uuid::Uuid::new_v4(),
            started_at: chrono::Utc::now(),
        }
    }

    fn statuses(entries: &[ViewEntry]) -> Vec<(&str, JobStatus)> {
        entries
            .iter()
            .map(|e| (e.job.id.as_str(), e.status))
            .collect()
    }

    #[test]
    fn test_precedence_over_overlap() {
        let listings = vec![job("1"), job("2"), job("3")];
        let view = reconcile(
            &listings,
            &ids(&["1", "2"]),
            &ids(&["2", "3"]),
            &HashMap::new(),
        );
        assert_eq!(
            statuses(&view),
            vec![
                ("1", JobStatus::Saved),
                ("2", JobStatus::Applied),
                ("3", JobStatus::Applied)
            ]
        );
    }

    #[test]
    fn test_absent_from_both_is_new() {
        let listings = vec![job("9")];
        let view = reconcile(&listings, &ids(&["1"]), &ids(&["2"]), &HashMap::new());
        assert_eq!(statuses(&view), vec![("9", JobStatus::New)]);
    }

    #[test]
    fn test_orphan_overlay_ids_not_emitted_and_order_kept() {
        let listings = vec![job("b"), job("a"), job("c")];
        let view = reconcile(
            &listings,
            &ids(&["deleted", "a"]),
            &ids(&["gone"]),
            &HashMap::new(),
        );
        let order: Vec<_> = view.iter().map(|e| e.job.id.as_str()).collect();
        assert_eq!(order, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_pending_overrides_overlays() {
        let listings = vec![job("1"), job("2")];
        let mut in_flight = HashMap::new();
        in_flight.insert(
            JobId::from("1"),
            pending("1", MutationKind::Save, JobStatus::New),
        );
        in_flight.insert(
            JobId::from("2"),
            pending("2", MutationKind::Unsave, JobStatus::Saved),
        );
        let view = reconcile(&listings, &ids(&["2"]), &HashSet::new(), &in_flight);
        assert_eq!(
            statuses(&view),
            vec![("1", JobStatus::Saved), ("2", JobStatus::New)]
        );
    }
}
