// src/core/job_board_api.rs
//! The REST surface the reconciliation core depends on.
//!
//! Listing, saved-jobs and applications calls return the raw JSON payload;
//! normalization into `JobRecord`s belongs to the sources, so any
//! implementation (HTTP or in-memory) only has to move bytes.

use serde_json::Value;
use std::future::Future;

use crate::error::FetchError;
use crate::types::JobId;

/// A resume file ready to be attached to an application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumeUpload {
    pub file_name: String,
    pub content: Vec<u8>,
}

impl ResumeUpload {
    pub fn new(file_name: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content,
        }
    }

    pub async fn from_path(path: &std::path::Path) -> Result<Self, FetchError> {
        let content = tokio::fs::read(path).await.map_err(|e| {
            FetchError::validation(format!("Cannot read resume {}: {}", path.display(), e))
        })?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("resume")
            .to_string();
        Ok(Self { file_name, content })
    }

    pub fn content_type(&self) -> &'static str {
        match crate::utils::get_file_extension(&self.file_name).as_deref() {
            Some("pdf") => "application/pdf",
            Some("doc") => "application/msword",
            Some("docx") => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            _ => "application/octet-stream",
        }
    }
}

/// Multipart body of `POST /api/job-applications`.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplicationSubmission {
    pub job_id: JobId,
    pub employer_id: Option<String>,
    pub cover_letter: String,
    pub resume: Option<ResumeUpload>,
}

pub trait JobBoardApi: Send + Sync {
    /// `GET /api/getAllJobs`
    fn get_all_jobs(&self) -> impl Future<Output = Result<Value, FetchError>> + Send;

    /// `GET /api/saved-jobs`
    fn get_saved_jobs(&self) -> impl Future<Output = Result<Value, FetchError>> + Send;

    /// `GET /api/applications`
    fn get_applications(&self) -> impl Future<Output = Result<Value, FetchError>> + Send;

    /// `GET /api/check-saved-job/:id`
    fn check_saved_job(
        &self,
        job_id: &JobId,
    ) -> impl Future<Output = Result<bool, FetchError>> + Send;

    /// `POST /api/save-job`
    fn save_job(&self, job_id: &JobId) -> impl Future<Output = Result<(), FetchError>> + Send;

    /// `DELETE /api/unsave-job`
    fn unsave_job(&self, job_id: &JobId) -> impl Future<Output = Result<(), FetchError>> + Send;

    /// `POST /api/job-applications`
    fn submit_application(
        &self,
        submission: &ApplicationSubmission,
    ) -> impl Future<Output = Result<(), FetchError>> + Send;
}
