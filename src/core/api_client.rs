// src/core/api_client.rs
//! reqwest implementation of the job board REST contracts

use anyhow::{Context, Result};
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Response};
use serde_json::{json, Value};
use tracing::{error, info, trace};

use super::config_manager::ApiConfig;
use super::job_board_api::{ApplicationSubmission, JobBoardApi};
use crate::error::FetchError;
use crate::session::SessionStore;
use crate::types::JobId;
use crate::utils::{first_string, preview};

const ALL_JOBS_ENDPOINT: &str = "/api/getAllJobs";
const SAVED_JOBS_ENDPOINT: &str = "/api/saved-jobs";
const SAVE_JOB_ENDPOINT: &str = "/api/save-job";
const UNSAVE_JOB_ENDPOINT: &str = "/api/unsave-job";
const CHECK_SAVED_ENDPOINT: &str = "/api/check-saved-job";
const APPLICATIONS_ENDPOINT: &str = "/api/applications";
const SUBMIT_APPLICATION_ENDPOINT: &str = "/api/job-applications";

pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    session: SessionStore,
}

impl ApiClient {
    pub fn new(config: &ApiConfig, session: SessionStore) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// Attach the bearer token, send, and turn any non-success status into
    /// a `FetchError`
    async fn send(&self, request: RequestBuilder) -> Result<Response, FetchError> {
        let token = self.session.bearer_token()?;

        let response = request.bearer_auth(token).send().await?;
        let status = response.status();
        trace!("Response status: {}", status);

        if status.is_success() {
            Ok(response)
        } else {
            Err(Self::error_from_response(response).await)
        }
    }

    async fn error_from_response(response: Response) -> FetchError {
        let status = response.status();
        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        let message = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|v| first_string(&v, &["message", "error", "detail"]))
            .unwrap_or_else(|| {
                if body.trim().is_empty() {
                    status.canonical_reason().unwrap_or("Unknown error").to_string()
                } else {
                    body.clone()
                }
            });

        error!(
            "Job board API error {}: {}",
            status,
            preview(&message, 200)
        );
        FetchError::from_status(status.as_u16(), message, retry_after)
    }

    async fn get_json(&self, endpoint: &str) -> Result<Value, FetchError> {
        let url = self.url(endpoint);
        info!("GET {}", url);

        let response = self.send(self.client.get(&url)).await?;
        response
            .json::<Value>()
            .await
            .map_err(|e| FetchError::malformed(format!("{}: {}", endpoint, e)))
    }
}

impl JobBoardApi for ApiClient {
    async fn get_all_jobs(&self) -> Result<Value, FetchError> {
        self.get_json(ALL_JOBS_ENDPOINT).await
    }

    async fn get_saved_jobs(&self) -> Result<Value, FetchError> {
        self.get_json(SAVED_JOBS_ENDPOINT).await
    }

    async fn get_applications(&self) -> Result<Value, FetchError> {
        self.get_json(APPLICATIONS_ENDPOINT).await
    }

    async fn check_saved_job(&self, job_id: &JobId) -> Result<bool, FetchError> {
        let payload = self
            .get_json(&format!("{}/{}", CHECK_SAVED_ENDPOINT, job_id))
            .await?;

        match &payload {
            Value::Bool(saved) => Ok(*saved),
            _ => ["is_saved", "saved", "isSaved"]
                .iter()
                .find_map(|key| payload.get(key).and_then(Value::as_bool))
                .ok_or_else(|| {
                    FetchError::malformed(format!("Unexpected check-saved payload: {}", payload))
                }),
        }
    }

    async fn save_job(&self, job_id: &JobId) -> Result<(), FetchError> {
        let url = self.url(SAVE_JOB_ENDPOINT);
        info!("Saving job {} via {}", job_id, url);

        self.send(self.client.post(&url).json(&json!({ "job_id": job_id })))
            .await?;
        Ok(())
    }

    async fn unsave_job(&self, job_id: &JobId) -> Result<(), FetchError> {
        let url = self.url(UNSAVE_JOB_ENDPOINT);
        info!("Unsaving job {} via {}", job_id, url);

        self.send(self.client.delete(&url).json(&json!({ "job_id": job_id })))
            .await?;
        Ok(())
    }

    async fn submit_application(&self, submission: &ApplicationSubmission) -> Result<(), FetchError> {
        let url = self.url(SUBMIT_APPLICATION_ENDPOINT);

        let mut form = Form::new()
            .text("job_listing_id", submission.job_id.to_string())
            .text("cover_letter", submission.cover_letter.clone());

        if let Some(employer_id) = &submission.employer_id {
            form = form.text("employer_id", employer_id.clone());
        }

        if let Some(resume) = &submission.resume {
            let part = Part::bytes(resume.content.clone())
                .file_name(resume.file_name.clone())
                .mime_str(resume.content_type())
                .map_err(|e| FetchError::validation(format!("Invalid resume type: {}", e)))?;
            form = form.part("resume", part);
        }

        info!("Submitting application for job {} to {}", submission.job_id, url);
        self.send(self.client.post(&url).multipart(form)).await?;
        Ok(())
    }
}
