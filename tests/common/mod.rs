// tests/common/mod.rs
#![allow(dead_code)]

use job_status::core::{ApplicationSubmission, JobBoardApi};
use job_status::{Dashboard, FetchError, JobId, RetryPolicy};
use serde_json::{json, Value};
use std::collections::{BTreeSet, HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// In-memory job board with scripted failures and latency.
#[derive(Default)]
pub struct FakeJobBoard {
    state: Mutex<FakeState>,
}

#[derive(Default)]
struct FakeState {
    listings: Vec<Value>,
    saved: BTreeSet<String>,
    applied: BTreeSet<String>,
    latency: Duration,
    scripted_saved: VecDeque<(Duration, Vec<String>)>,
    failures: HashMap<&'static str, VecDeque<FetchError>>,
    calls: Vec<String>,
    submissions: Vec<ApplicationSubmission>,
}

impl FakeJobBoard {
    pub fn with_jobs(jobs: &[(&str, &str)]) -> Self {
        let fake = Self::default();
        fake.state().listings = jobs
            .iter()
            .map(|(id, title)| json!({"id": id, "title": title, "employer_id": 77}))
            .collect();
        fake
    }

    fn state(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    pub fn set_latency(&self, latency: Duration) {
        self.state().latency = latency;
    }

    pub fn mark_saved(&self, id: &str) {
        self.state().saved.insert(id.to_string());
    }

    pub fn mark_applied(&self, id: &str) {
        self.state().applied.insert(id.to_string());
    }

    /// Queue one saved-jobs response delivered after `delay`
    pub fn script_saved_response(&self, delay: Duration, ids: &[&str]) {
        self.state()
            .scripted_saved
            .push_back((delay, ids.iter().map(|s| s.to_string()).collect()));
    }

    /// Make the next call to `op` fail with `err`
    pub fn fail_next(&self, op: &'static str, err: FetchError) {
        self.state().failures.entry(op).or_default().push_back(err);
    }

    pub fn calls(&self, op: &str) -> usize {
        self.state().calls.iter().filter(|c| c.as_str() == op).count()
    }

    pub fn server_saved(&self) -> BTreeSet<String> {
        self.state().saved.clone()
    }

    pub fn submissions(&self) -> Vec<ApplicationSubmission> {
        self.state().submissions.clone()
    }

    /// Record the call and pop a scripted failure, returning the latency to wait
    fn enter(&self, op: &'static str) -> Result<Duration, FetchError> {
        let mut state = self.state();
        state.calls.push(op.to_string());
        if let Some(err) = state.failures.get_mut(op).and_then(VecDeque::pop_front) {
            return Err(err);
        }
        Ok(state.latency)
    }

    fn job_snapshot(&self, id: &str) -> Value {
        self.state()
            .listings
            .iter()
            .find(|job| job["id"] == json!(id))
            .cloned()
            .unwrap_or_else(|| json!({"id": id}))
    }
}

impl JobBoardApi for FakeJobBoard {
    async fn get_all_jobs(&self) -> Result<Value, FetchError> {
        let latency = self.enter("listings")?;
        tokio::time::sleep(latency).await;
        Ok(json!({ "jobs": self.state().listings.clone() }))
    }

    async fn get_saved_jobs(&self) -> Result<Value, FetchError> {
        let latency = self.enter("saved")?;
        let scripted = self.state().scripted_saved.pop_front();
        let (delay, ids) = match scripted {
            Some(script) => script,
            None => (latency, self.state().saved.iter().cloned().collect()),
        };
        tokio::time::sleep(delay).await;
        Ok(Value::Array(
            ids.iter()
                .map(|id| json!({"job_id": id, "job": self.job_snapshot(id)}))
                .collect(),
        ))
    }

    async fn get_applications(&self) -> Result<Value, FetchError> {
        let latency = self.enter("applications")?;
        tokio::time::sleep(latency).await;
        let applied: Vec<String> = self.state().applied.iter().cloned().collect();
        Ok(Value::Array(
            applied
                .iter()
                .map(|id| {
                    json!({
                        "job_listing_id": id,
                        "status": "pending",
                        "job_listing": self.job_snapshot(id),
                        "status_updates": [{"date": "2024-06-01", "message": "Application received"}]
                    })
                })
                .collect(),
        ))
    }

    async fn check_saved_job(&self, job_id: &JobId) -> Result<bool, FetchError> {
        let latency = self.enter("check_saved")?;
        tokio::time::sleep(latency).await;
        Ok(self.state().saved.contains(job_id.as_str()))
    }

    async fn save_job(&self, job_id: &JobId) -> Result<(), FetchError> {
        let latency = self.enter("save")?;
        tokio::time::sleep(latency).await;
        if !self.state().saved.insert(job_id.to_string()) {
            return Err(FetchError::Conflict {
                message: "Job already saved".into(),
            });
        }
        Ok(())
    }

    async fn unsave_job(&self, job_id: &JobId) -> Result<(), FetchError> {
        let latency = self.enter("unsave")?;
        tokio::time::sleep(latency).await;
        if !self.state().saved.remove(job_id.as_str()) {
            return Err(FetchError::NotFound {
                resource: "saved job".into(),
            });
        }
        Ok(())
    }

    async fn submit_application(&self, submission: &ApplicationSubmission) -> Result<(), FetchError> {
        let latency = self.enter("apply")?;
        tokio::time::sleep(latency).await;
        let mut state = self.state();
        state.submissions.push(submission.clone());
        if !state.applied.insert(submission.job_id.to_string()) {
            return Err(FetchError::Conflict {
                message: "already applied".into(),
            });
        }
        Ok(())
    }
}

pub fn dashboard(fake: FakeJobBoard) -> (Arc<FakeJobBoard>, Dashboard<FakeJobBoard>) {
    let api = Arc::new(fake);
    let dashboard = Dashboard::new(api.clone(), RetryPolicy::none());
    (api, dashboard)
}

pub fn server_error() -> FetchError {
    FetchError::ServerError {
        status: 500,
        message: "Internal Server Error".into(),
    }
}
