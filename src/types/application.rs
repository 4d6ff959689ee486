// src/types/application.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::job_record::{JobId, JobRecord};
use crate::utils::{first_id, first_string, parse_timestamp, value_at};

/// One entry of an application's progress history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub date: Option<DateTime<Utc>>,
    pub message: String,
}

/// A submitted application with its own job snapshot.
///
/// The update history is owned by the server; it is only read here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub id: Option<String>,
    pub job: JobRecord,
    pub status: String,
    pub applied_at: Option<DateTime<Utc>>,
    status_updates: Vec<StatusUpdate>,
}

impl ApplicationRecord {
    pub fn from_backend(raw: &Value) -> Option<Self> {
        let nested = value_at(raw, "job")
            .or_else(|| value_at(raw, "job_listing"))
            .filter(|v| v.is_object());
        let snapshot = nested.unwrap_or(raw);

        let job_id = first_id(raw, &["job_listing_id", "job_id"])
            .or_else(|| first_id(snapshot, &["id"]))
            .map(JobId::new)?;

        // server history is append-only; order is kept as delivered
        let status_updates: Vec<StatusUpdate> = value_at(raw, "status_updates")
            .or_else(|| value_at(raw, "updates"))
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(parse_update).collect())
            .unwrap_or_default();

        Some(Self {
            id: if nested.is_some() {
                first_id(raw, &["id", "application_id"])
            } else {
                first_id(raw, &["application_id"])
            },
            job: JobRecord::from_backend_with_id(snapshot, job_id),
            status: first_string(raw, &["status", "application_status"])
                .unwrap_or_else(|| "pending".to_string()),
            applied_at: first_string(raw, &["applied_at", "created_at", "submitted_at"])
                .as_deref()
                .and_then(parse_timestamp),
            status_updates,
        })
    }

    pub fn job_id(&self) -> &JobId {
        &self.job.id
    }

    pub fn status_updates(&self) -> &[StatusUpdate] {
        &self.status_updates
    }

    /// Most recently dated update, or the last one delivered when undated
    pub fn latest_update(&self) -> Option<&StatusUpdate> {
        self.status_updates.iter().max_by_key(|u| u.date)
    }
}

fn parse_update(raw: &Value) -> Option<StatusUpdate> {
    let message = first_string(raw, &["message", "status", "note"])?;
    Some(StatusUpdate {
        date: first_string(raw, &["date", "created_at", "updated_at"])
            .as_deref()
            .and_then(parse_timestamp),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_application_with_nested_job() {
        let raw = json!({
            "id": 11,
            "job_listing_id": 42,
            "status": "reviewed",
            "created_at": "2024-06-01T09:00:00Z",
            "job_listing": {"id": 42, "title": "Engineer", "company": {"name": "Acme"}},
            "status_updates": [
                {"date": "2024-06-03", "message": "Interview scheduled"},
                {"date": "2024-06-01", "message": "Application received"}
            ]
        });
        let app = ApplicationRecord::from_backend(&raw).unwrap();
        assert_eq!(app.id.as_deref(), Some("11"));
        assert_eq!(app.job_id(), &JobId::from("42"));
        assert_eq!(app.job.company_name, "Acme");
        assert_eq!(app.status, "reviewed");
        let messages: Vec<&str> = app
            .status_updates()
            .iter()
            .map(|u| u.message.as_str())
            .collect();
        assert_eq!(messages, vec!["Interview scheduled", "Application received"]);
        assert_eq!(
            app.latest_update().map(|u| u.message.as_str()),
            Some("Interview scheduled")
        );
    }

    #[test]
    fn test_flat_application_defaults() {
        let raw = json!({"job_id": "9", "title": "Designer"});
        let app = ApplicationRecord::from_backend(&raw).unwrap();
        assert_eq!(app.id, None);
        assert_eq!(app.job.title, "Designer");
        assert_eq!(app.status, "pending");
        assert!(app.latest_update().is_none());
    }

    #[test]
    fn test_undated_updates_keep_server_order() {
        let raw = json!({
            "job_id": "5",
            "status_updates": [
                {"message": "Submitted"},
                {"date": "2024-06-02", "message": "Viewed"},
                {"message": "Shortlisted"}
            ]
        });
        let app = ApplicationRecord::from_backend(&raw).unwrap();
        let messages: Vec<&str> = app
            .status_updates()
            .iter()
            .map(|u| u.message.as_str())
            .collect();
        assert_eq!(messages, vec!["Submitted", "Viewed", "Shortlisted"]);
        assert_eq!(app.latest_update().map(|u| u.message.as_str()), Some("Viewed"));
    }
}
