// src/dashboard.rs
//! Dashboard-level container: owns the sources, the store and the mutator
//! for one mounted session

use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use tracing::{info, warn};

use crate::core::{JobBoardApi, ResumeUpload};
use crate::error::{FetchError, MutationError};
use crate::mutator::OptimisticMutator;
use crate::reconciler::StatusStore;
use crate::sources::{ListingSource, OverlaySource, RetryPolicy, SavedCheck};
use crate::types::{
    ApplicationRecord, DashboardView, JobId, JobRecord, Notice, OverlayKind, SourceKind,
};

pub struct Dashboard<A> {
    store: Arc<StatusStore>,
    listings: ListingSource<A>,
    saved: OverlaySource<A>,
    applied: OverlaySource<A>,
    saved_check: SavedCheck<A>,
    mutator: OptimisticMutator<A>,
}

impl<A: JobBoardApi> Dashboard<A> {
    pub fn new(api: Arc<A>, retry: RetryPolicy) -> Self {
        let store = Arc::new(StatusStore::new());
        Self {
            listings: ListingSource::new(api.clone(), retry),
            saved: OverlaySource::new(OverlayKind::Saved, api.clone(), retry),
            applied: OverlaySource::new(OverlayKind::Applied, api.clone(), retry),
            saved_check: SavedCheck::new(api.clone(), retry),
            mutator: OptimisticMutator::new(api, store.clone()),
            store,
        }
    }

    /// Initial load of every source
    pub async fn mount(&self) -> Arc<DashboardView> {
        info!("Mounting job seeker dashboard");
        self.refresh().await
    }

    /// Refetch all sources concurrently; each settles into the store on its own
    pub async fn refresh(&self) -> Arc<DashboardView> {
        tokio::join!(
            self.refresh_listings(),
            self.refresh_overlay(OverlayKind::Saved),
            self.refresh_overlay(OverlayKind::Applied),
        );
        let view = self.view();
        for (source, err) in &view.source_errors {
            warn!("Dashboard shown without fresh {} data: {}", source, err);
        }
        view
    }

    pub async fn refresh_listings(&self) -> bool {
        if self.store.is_detached() {
            return false;
        }
        let epoch = self.store.begin_fetch(SourceKind::Listings);
        let result = self.listings.fetch().await;
        self.store.accept_listings(epoch, result)
    }

    pub async fn refresh_overlay(&self, kind: OverlayKind) -> bool {
        if self.store.is_detached() {
            return false;
        }
        let source = match kind {
            OverlayKind::Saved => &self.saved,
            OverlayKind::Applied => &self.applied,
        };
        let epoch = self.store.begin_fetch(kind.into());
        let result = source.fetch().await;
        self.store.accept_overlay(kind, epoch, result)
    }

    pub async fn refresh_overlays(&self) {
        tokio::join!(
            self.refresh_overlay(OverlayKind::Saved),
            self.refresh_overlay(OverlayKind::Applied),
        );
    }

    /// Another component saved, unsaved or applied: overlays may be stale
    pub async fn invalidate_statuses(&self) {
        info!("Status change signalled elsewhere, refreshing overlays");
        self.refresh_overlays().await;
    }

    /// Confirm one job's saved state without refetching the whole overlay
    pub async fn confirm_saved(&self, job_id: &JobId) -> Result<bool, FetchError> {
        let ticket = self.store.begin_saved_check();
        let saved = self.saved_check.check(job_id).await?;
        self.store.apply_saved_check(ticket, job_id, saved);
        Ok(saved)
    }

    /// Records for the saved-jobs tab, independent of the listing feed
    pub async fn saved_job_records(&self) -> Result<Vec<JobRecord>, FetchError> {
        self.saved.fetch_saved_job_records().await
    }

    /// Records for the applications tab, independent of the listing feed
    pub async fn application_records(&self) -> Result<Vec<ApplicationRecord>, FetchError> {
        self.applied.fetch_application_records().await
    }

    pub async fn save(&self, job_id: &JobId) -> Result<(), MutationError> {
        self.mutator.save(job_id).await
    }

    pub async fn unsave(&self, job_id: &JobId) -> Result<(), MutationError> {
        self.mutator.unsave(job_id).await
    }

    pub async fn apply(
        &self,
        job_id: &JobId,
        resume: Option<ResumeUpload>,
        cover_letter: &str,
    ) -> Result<(), MutationError> {
        self.mutator.apply(job_id, resume, cover_letter).await
    }

    pub fn view(&self) -> Arc<DashboardView> {
        self.store.view()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<DashboardView>> {
        self.store.subscribe()
    }

    pub fn subscribe_notices(&self) -> broadcast::Receiver<Notice> {
        self.store.subscribe_notices()
    }

    pub fn store(&self) -> &Arc<StatusStore> {
        &self.store
    }

    /// Tear down on unmount or logout; in-flight responses are ignored
    pub fn unmount(&self) {
        info!("Unmounting job seeker dashboard");
        self.store.detach();
    }
}
