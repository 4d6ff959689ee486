// src/reconciler/store.rs
//! Single owner of the overlay sets and pending mutations.
//!
//! Every input is held per source together with an epoch counter. Consumers
//! only read the published `DashboardView`; writes go through the fetch
//! accept methods and the mutation lifecycle below.

use chrono::Utc;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{base_status, reconcile};
use crate::error::{FetchError, MutationError};
use crate::types::{
    DashboardView, JobId, JobRecord, JobStatus, MutationKind, Notice, OverlayKind,
    PendingMutation, SourceKind,
};

const NOTICE_CAPACITY: usize = 64;

/// Request generation of one source. Responses carrying an epoch not newer
/// than the accepted one are discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Epoch(u64);

/// Saved-overlay generation observed when a single-id check was issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SavedCheckTicket(u64);

#[derive(Debug)]
struct Slot<T> {
    value: Option<T>,
    issued: u64,
    accepted: u64,
    error: Option<FetchError>,
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self {
            value: None,
            issued: 0,
            accepted: 0,
            error: None,
        }
    }
}

impl<T> Slot<T> {
    fn begin(&mut self) -> Epoch {
        self.issued += 1;
        Epoch(self.issued)
    }

    fn accept(&mut self, epoch: Epoch, result: Result<T, FetchError>) -> bool {
        if epoch.0 <= self.accepted {
            return false;
        }
        self.accepted = epoch.0;
        match result {
            Ok(value) => {
                self.value = Some(value);
                self.error = None;
            }
            // last good value stays in place
            Err(err) => self.error = Some(err),
        }
        true
    }

    /// Local write: everything issued before it is now stale.
    fn advance(&mut self) {
        self.issued += 1;
        self.accepted = self.issued;
    }
}

#[derive(Debug, Default)]
struct StoreState {
    listings: Slot<Vec<JobRecord>>,
    saved: Slot<HashSet<JobId>>,
    applied: Slot<HashSet<JobId>>,
    // single-id saved checks, keyed by job, with the saved epoch they outrank
    saved_points: HashMap<JobId, (u64, bool)>,
    pending: HashMap<JobId, PendingMutation>,
    detached: bool,
}

impl StoreState {
    fn overlay(&self, kind: OverlayKind) -> &Slot<HashSet<JobId>> {
        match kind {
            OverlayKind::Saved => &self.saved,
            OverlayKind::Applied => &self.applied,
        }
    }

    fn overlay_mut(&mut self, kind: OverlayKind) -> &mut Slot<HashSet<JobId>> {
        match kind {
            OverlayKind::Saved => &mut self.saved,
            OverlayKind::Applied => &mut self.applied,
        }
    }

    fn overlay_set(&self, kind: OverlayKind) -> &HashSet<JobId> {
        static EMPTY: std::sync::OnceLock<HashSet<JobId>> = std::sync::OnceLock::new();
        self.overlay(kind)
            .value
            .as_ref()
            .unwrap_or_else(|| EMPTY.get_or_init(HashSet::new))
    }

    /// Saved fetches issued before a point check must not undo it
    fn reapply_saved_points(&mut self, epoch: Epoch) {
        self.saved_points.retain(|_, (issued, _)| *issued >= epoch.0);
        if self.saved_points.is_empty() {
            return;
        }
        let set = self.saved.value.get_or_insert_with(HashSet::new);
        for (job_id, (_, saved)) in &self.saved_points {
            if *saved {
                set.insert(job_id.clone());
            } else {
                set.remove(job_id);
            }
        }
    }

    fn committed_status(&self, job_id: &JobId) -> JobStatus {
        base_status(
            job_id,
            self.overlay_set(OverlayKind::Saved),
            self.overlay_set(OverlayKind::Applied),
        )
    }

    fn displayed_status(&self, job_id: &JobId) -> JobStatus {
        self.pending
            .get(job_id)
            .map(|m| m.to_status)
            .unwrap_or_else(|| self.committed_status(job_id))
    }

    fn view(&self) -> DashboardView {
        let listings = self.listings.value.as_deref().unwrap_or_default();
        let entries = reconcile(
            listings,
            self.overlay_set(OverlayKind::Saved),
            self.overlay_set(OverlayKind::Applied),
            &self.pending,
        );

        let source_errors: BTreeMap<SourceKind, FetchError> = [
            (SourceKind::Listings, &self.listings.error),
            (SourceKind::Saved, &self.saved.error),
            (SourceKind::Applied, &self.applied.error),
        ]
        .into_iter()
        .filter_map(|(kind, err)| err.clone().map(|e| (kind, e)))
        .collect();

        DashboardView {
            entries,
            source_errors,
            pending: self.pending.len(),
        }
    }
}

pub struct StatusStore {
    state: Mutex<StoreState>,
    view_tx: watch::Sender<Arc<DashboardView>>,
    notice_tx: broadcast::Sender<Notice>,
}

impl Default for StatusStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusStore {
    pub fn new() -> Self {
        let (view_tx, _) = watch::channel(Arc::new(DashboardView::default()));
        let (notice_tx, _) = broadcast::channel(NOTICE_CAPACITY);
        Self {
            state: Mutex::new(StoreState::default()),
            view_tx,
            notice_tx,
        }
    }

    fn state(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Recompute and publish while the state lock is still held so
    /// publications keep the order of the writes that caused them
    fn publish(&self, state: &StoreState) {
        let view = state.view();
        debug!(
            "Publishing view: {} entries, {} pending, {} source errors",
            view.entries.len(),
            view.pending,
            view.source_errors.len()
        );
        self.view_tx.send_replace(Arc::new(view));
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<DashboardView>> {
        self.view_tx.subscribe()
    }

    pub fn subscribe_notices(&self) -> broadcast::Receiver<Notice> {
        self.notice_tx.subscribe()
    }

    /// Latest published view
    pub fn view(&self) -> Arc<DashboardView> {
        self.view_tx.borrow().clone()
    }

    pub fn notify(&self, notice: Notice) {
        // no subscriber is not an error
        let _ = self.notice_tx.send(notice);
    }

    pub fn is_detached(&self) -> bool {
        self.state().detached
    }

    /// Stop applying updates; the last published view stays readable
    pub fn detach(&self) {
        let mut state = self.state();
        if !state.detached {
            state.detached = true;
            info!(
                "Status store detached with {} pending mutations",
                state.pending.len()
            );
        }
    }

    pub fn begin_fetch(&self, source: SourceKind) -> Epoch {
        let mut state = self.state();
        match source {
            SourceKind::Listings => state.listings.begin(),
            SourceKind::Saved => state.saved.begin(),
            SourceKind::Applied => state.applied.begin(),
        }
    }

    pub fn accept_listings(&self, epoch: Epoch, result: Result<Vec<JobRecord>, FetchError>) -> bool {
        let mut state = self.state();
        if state.detached {
            debug!("Ignoring listings response after detach");
            return false;
        }
        if !state.listings.accept(epoch, result) {
            warn!("Discarding stale listings response (epoch {})", epoch.0);
            return false;
        }
        self.publish(&state);
        true
    }

    pub fn accept_overlay(
        &self,
        kind: OverlayKind,
        epoch: Epoch,
        result: Result<HashSet<JobId>, FetchError>,
    ) -> bool {
        let mut state = self.state();
        if state.detached {
            debug!("Ignoring {:?} overlay response after detach", kind);
            return false;
        }
        if !state.overlay_mut(kind).accept(epoch, result) {
            warn!("Discarding stale {:?} overlay response (epoch {})", kind, epoch.0);
            return false;
        }
        if kind == OverlayKind::Saved {
            state.reapply_saved_points(epoch);
        }
        self.publish(&state);
        true
    }

    pub fn begin_saved_check(&self) -> SavedCheckTicket {
        SavedCheckTicket(self.state().saved.issued)
    }

    /// Point update of the saved overlay from a single-id check.
    ///
    /// Dropped if the saved overlay was refetched or locally written since the
    /// check was issued, or if a mutation for the job is in flight. A saved
    /// fetch issued before the check that lands later keeps this answer.
    pub fn apply_saved_check(&self, ticket: SavedCheckTicket, job_id: &JobId, saved: bool) -> bool {
        let mut state = self.state();
        if state.detached || state.saved.issued != ticket.0 || state.pending.contains_key(job_id) {
            debug!("Dropping saved check for job {}", job_id);
            return false;
        }

        state.saved_points.insert(job_id.clone(), (ticket.0, saved));
        let set = state.saved.value.get_or_insert_with(HashSet::new);
        let changed = if saved {
            set.insert(job_id.clone())
        } else {
            set.remove(job_id)
        };
        if changed {
            self.publish(&state);
        }
        true
    }

    pub fn committed_status(&self, job_id: &JobId) -> JobStatus {
        self.state().committed_status(job_id)
    }

    pub fn status_of(&self, job_id: &JobId) -> JobStatus {
        self.state().displayed_status(job_id)
    }

    pub fn pending(&self, job_id: &JobId) -> Option<PendingMutation> {
        self.state().pending.get(job_id).cloned()
    }

    pub fn listing(&self, job_id: &JobId) -> Option<JobRecord> {
        self.state()
            .listings
            .value
            .as_ref()
            .and_then(|jobs| jobs.iter().find(|j| &j.id == job_id).cloned())
    }

    pub fn overlay_ids(&self, kind: OverlayKind) -> HashSet<JobId> {
        self.state().overlay_set(kind).clone()
    }

    /// Register an optimistic change, enforcing one mutation per job and the
    /// terminal `applied` state
    pub fn begin_mutation(
        &self,
        job_id: &JobId,
        kind: MutationKind,
    ) -> Result<PendingMutation, MutationError> {
        let mut state = self.state();
        if state.detached {
            return Err(MutationError::Detached);
        }
        if state.pending.contains_key(job_id) {
            return Err(MutationError::MutationInFlight {
                job_id: job_id.clone(),
            });
        }
        let from_status = state.committed_status(job_id);
        if from_status.is_terminal() {
            return Err(MutationError::AlreadyApplied {
                job_id: job_id.clone(),
            });
        }

        let mutation = PendingMutation {
            job_id: job_id.clone(),
            kind,
            from_status,
            to_status: kind.target_status(),
            request_id: Uuid::new_v4(),
            started_at: Utc::now(),
        };
        info!(
            "Begin {} for job {}: {} -> {} ({})",
            kind, job_id, from_status, mutation.to_status, mutation.request_id
        );
        state.pending.insert(job_id.clone(), mutation.clone());
        self.publish(&state);
        Ok(mutation)
    }

    /// Fold a confirmed mutation into its overlay and clear it
    pub fn commit_mutation(&self, mutation: &PendingMutation) -> bool {
        let mut state = self.state();
        if !Self::take_pending(&mut state, mutation) {
            return false;
        }

        let (kind, present) = match mutation.kind {
            MutationKind::Save => (OverlayKind::Saved, true),
            MutationKind::Unsave => (OverlayKind::Saved, false),
            MutationKind::Apply => (OverlayKind::Applied, true),
        };
        if kind == OverlayKind::Saved {
            state.saved_points.remove(&mutation.job_id);
        }
        let slot = state.overlay_mut(kind);
        slot.advance();
        let set = slot.value.get_or_insert_with(HashSet::new);
        if present {
            set.insert(mutation.job_id.clone());
        } else {
            set.remove(&mutation.job_id);
        }

        info!(
            "Committed {} for job {} ({})",
            mutation.kind, mutation.job_id, mutation.request_id
        );
        self.publish(&state);
        true
    }

    /// Drop a failed mutation; overlays are left untouched so the view falls
    /// back to the committed status
    pub fn rollback_mutation(&self, mutation: &PendingMutation) -> bool {
        let mut state = self.state();
        if !Self::take_pending(&mut state, mutation) {
            return false;
        }
        warn!(
            "Rolled back {} for job {} to {} ({})",
            mutation.kind, mutation.job_id, mutation.from_status, mutation.request_id
        );
        self.publish(&state);
        true
    }

    fn take_pending(state: &mut StoreState, mutation: &PendingMutation) -> bool {
        if state.detached {
            debug!("Ignoring settle of {} after detach", mutation.request_id);
            return false;
        }
        match state.pending.get(&mutation.job_id) {
            Some(current) if current.request_id == mutation.request_id => {
                state.pending.remove(&mutation.job_id);
                true
            }
            _ => false,
        }
    }
}
