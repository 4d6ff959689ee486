// src/mutator.rs
//! Optimistic save / unsave / apply intents.
//!
//! Each intent registers a `PendingMutation` with the store (so the view
//! changes immediately), performs the request, then commits or rolls back.

use std::sync::Arc;
use tracing::{error, info, warn};

use crate::core::{ApplicationSubmission, JobBoardApi, ResumeUpload};
use crate::error::{FetchError, MutationError};
use crate::reconciler::StatusStore;
use crate::resume_validator::ResumeValidator;
use crate::types::{JobId, MutationKind, Notice, NoticeLevel, PendingMutation};

pub struct OptimisticMutator<A> {
    api: Arc<A>,
    store: Arc<StatusStore>,
}

impl<A: JobBoardApi> OptimisticMutator<A> {
    pub fn new(api: Arc<A>, store: Arc<StatusStore>) -> Self {
        Self { api, store }
    }

    pub async fn save(&self, job_id: &JobId) -> Result<(), MutationError> {
        let mutation = self.store.begin_mutation(job_id, MutationKind::Save)?;
        let result = self.api.save_job(job_id).await;
        self.settle(&mutation, result)
    }

    pub async fn unsave(&self, job_id: &JobId) -> Result<(), MutationError> {
        let mutation = self.store.begin_mutation(job_id, MutationKind::Unsave)?;
        let result = self.api.unsave_job(job_id).await;
        self.settle(&mutation, result)
    }

    /// Submit an application. Validation failures are reported before any
    /// optimistic state or request exists.
    pub async fn apply(
        &self,
        job_id: &JobId,
        resume: Option<ResumeUpload>,
        cover_letter: &str,
    ) -> Result<(), MutationError> {
        if let Err(err) = ResumeValidator::validate_application(resume.as_ref(), cover_letter) {
            let err = FetchError::from(err);
            self.notify_error(job_id, &err);
            return Err(err.into());
        }

        let mutation = self.store.begin_mutation(job_id, MutationKind::Apply)?;
        let submission = ApplicationSubmission {
            job_id: job_id.clone(),
            employer_id: self.store.listing(job_id).and_then(|job| job.employer_id),
            cover_letter: cover_letter.trim().to_string(),
            resume,
        };
        let result = self.api.submit_application(&submission).await;
        self.settle(&mutation, result)
    }

    fn settle(
        &self,
        mutation: &PendingMutation,
        result: Result<(), FetchError>,
    ) -> Result<(), MutationError> {
        match result {
            Ok(()) => {
                self.store.commit_mutation(mutation);
                self.store.notify(Notice {
                    job_id: mutation.job_id.clone(),
                    level: NoticeLevel::Info,
                    message: success_message(mutation.kind).to_string(),
                });
                Ok(())
            }
            Err(err) if confirms_target(mutation.kind, &err) => {
                // the server already holds the state this intent asked for
                info!(
                    "{} for job {} confirmed by server ({}), committing",
                    mutation.kind, mutation.job_id, err
                );
                self.store.commit_mutation(mutation);
                self.store.notify(Notice {
                    job_id: mutation.job_id.clone(),
                    level: NoticeLevel::Info,
                    message: already_message(mutation.kind).to_string(),
                });
                Ok(())
            }
            Err(err) => {
                error!(
                    "{} for job {} failed: {}",
                    mutation.kind, mutation.job_id, err
                );
                self.store.rollback_mutation(mutation);
                self.notify_error(&mutation.job_id, &err);
                Err(err.into())
            }
        }
    }

    fn notify_error(&self, job_id: &JobId, err: &FetchError) {
        let message = match err {
            FetchError::AuthRequired { .. } => "Please log in again to continue".to_string(),
            FetchError::Conflict { message } => format!("Request conflicts: {}", message),
            FetchError::RateLimited { .. } => {
                "Too many requests, please wait a moment and retry".to_string()
            }
            other => other.to_string(),
        };
        warn!("Notifying failure for job {}: {}", job_id, message);
        self.store.notify(Notice {
            job_id: job_id.clone(),
            level: NoticeLevel::Error,
            message,
        });
    }
}

/// Errors that prove the requested end state already holds server-side
fn confirms_target(kind: MutationKind, err: &FetchError) -> bool {
    match (kind, err) {
        (MutationKind::Apply, FetchError::Conflict { message }) => reports_existing(message),
        (MutationKind::Save, FetchError::Conflict { .. })
        | (MutationKind::Unsave, FetchError::NotFound { .. }) => true,
        _ => false,
    }
}

/// A 409 on apply only confirms the target when it names a prior application
fn reports_existing(message: &str) -> bool {
    let message = message.to_lowercase();
    ["already", "duplicate", "exists"]
        .iter()
        .any(|marker| message.contains(marker))
}

fn success_message(kind: MutationKind) -> &'static str {
    match kind {
        MutationKind::Save => "Job saved",
        MutationKind::Unsave => "Job removed from saved jobs",
        MutationKind::Apply => "Application submitted",
    }
}

fn already_message(kind: MutationKind) -> &'static str {
    match kind {
        MutationKind::Save => "Job was already saved",
        MutationKind::Unsave => "Job was not saved",
        MutationKind::Apply => "You have already applied to this job",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_confirms_only_matching_intents() {
        let conflict = FetchError::Conflict {
            message: "already applied".into(),
        };
        let missing = FetchError::NotFound {
            resource: "saved job".into(),
        };
        assert!(confirms_target(MutationKind::Apply, &conflict));
        assert!(confirms_target(MutationKind::Save, &conflict));
        assert!(!confirms_target(MutationKind::Unsave, &conflict));
        assert!(confirms_target(MutationKind::Unsave, &missing));
        assert!(!confirms_target(MutationKind::Apply, &missing));
        assert!(confirms_target(
            MutationKind::Apply,
            &FetchError::Conflict {
                message: "Duplicate application for this listing".into()
            }
        ));
        assert!(!confirms_target(
            MutationKind::Apply,
            &FetchError::Conflict {
                message: "Job listing is closed".into()
            }
        ));
        assert!(!confirms_target(
            MutationKind::Apply,
            &FetchError::ServerError {
                status: 500,
                message: "boom".into()
            }
        ));
    }
}
