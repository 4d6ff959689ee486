// src/types/job_record.rs
//! Canonical, display-ready job listing snapshot and its normalization from
//! the heterogeneous backend shapes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::utils::{first_id, first_number, first_string, parse_timestamp, value_at};

pub const DEFAULT_COMPANY: &str = "Unknown Company";
pub const DEFAULT_LOCATION: &str = "Remote";
pub const DEFAULT_TITLE: &str = "Untitled Position";

/// Stable, string-normalized job listing identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Read an id from a string or number JSON value
    pub fn from_value(value: &Value) -> Option<Self> {
        crate::utils::normalize_id(value).map(Self)
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JobId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for JobId {
    fn from(id: String) -> Self {
        Self::new(id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub currency: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    pub name: String,
    pub required: bool,
    pub importance: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: JobId,
    pub title: String,
    pub company_name: String,
    pub employer_id: Option<String>,
    pub employer_user_id: Option<String>,
    pub location: String,
    pub salary: Option<SalaryRange>,
    pub skills: Vec<Skill>,
    pub posted_at: Option<DateTime<Utc>>,
    pub description: Option<String>,
    pub employment_type: Option<String>,
    pub experience_level: Option<String>,
    pub is_remote: bool,
}

impl JobRecord {
    /// Normalize one backend listing object.
    ///
    /// Returns `None` only when no usable id can be found; every other missing
    /// field falls back to a display default.
    pub fn from_backend(raw: &Value) -> Option<Self> {
        let id = first_id(raw, &["id", "job_id", "job_listing_id"]).map(JobId)?;
        Some(Self::from_backend_with_id(raw, id))
    }

    /// Normalize a listing whose id is known from an enclosing record
    /// (saved-job rows and applications carry their own `job_id`).
    pub fn from_backend_with_id(raw: &Value, id: JobId) -> Self {
        let location = first_string(raw, &["location", "city", "job_location"])
            .unwrap_or_else(|| DEFAULT_LOCATION.to_string());
        let is_remote = value_at(raw, "is_remote")
            .and_then(Value::as_bool)
            .unwrap_or_else(|| location.eq_ignore_ascii_case(DEFAULT_LOCATION));

        Self {
            id,
            title: first_string(raw, &["title", "job_title", "position"])
                .unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            company_name: first_string(
                raw,
                &[
                    "company_name",
                    "company.name",
                    "employer.company_name",
                    "employer.name",
                ],
            )
            .unwrap_or_else(|| DEFAULT_COMPANY.to_string()),
            employer_id: first_id(raw, &["employer_id", "employer.id"]),
            employer_user_id: first_id(
                raw,
                &["employer_user_id", "employer.user_id", "employer.user.id"],
            ),
            location,
            salary: parse_salary(raw),
            skills: parse_skills(raw),
            posted_at: first_string(raw, &["posted_at", "created_at", "date_posted"])
                .as_deref()
                .and_then(parse_timestamp),
            description: first_string(raw, &["description", "job_description"]),
            employment_type: first_string(raw, &["employment_type", "job_type"]),
            experience_level: first_string(raw, &["experience_level"]),
            is_remote,
        }
    }

    pub fn required_skills(&self) -> impl Iterator<Item = &Skill> {
        self.skills.iter().filter(|s| s.required)
    }
}

fn parse_salary(raw: &Value) -> Option<SalaryRange> {
    let (min, max, currency) = match value_at(raw, "salary_range") {
        Some(range) if range.is_object() => (
            first_number(range, &["min", "minimum"]),
            first_number(range, &["max", "maximum"]),
            first_string(range, &["currency"]),
        ),
        _ => (
            first_number(raw, &["salary_min", "min_salary"]),
            first_number(raw, &["salary_max", "max_salary"]),
            first_string(raw, &["salary_currency", "currency"]),
        ),
    };

    if min.is_none() && max.is_none() {
        return None;
    }
    Some(SalaryRange { min, max, currency })
}

fn parse_skills(raw: &Value) -> Vec<Skill> {
    let Some(items) = value_at(raw, "skills")
        .or_else(|| value_at(raw, "required_skills"))
        .and_then(Value::as_array)
    else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| match item {
            Value::String(name) if !name.trim().is_empty() => Some(Skill {
                name: name.trim().to_string(),
                required: false,
                importance: None,
            }),
            Value::Object(_) => {
                let name = first_string(item, &["name", "skill_name", "skill.name"])?;
                Some(Skill {
                    name,
                    required: value_at(item, "is_required")
                        .and_then(Value::as_bool)
                        .unwrap_or(false),
                    importance: first_number(item, &["importance_level", "importance"])
                        .map(|level| level.clamp(0.0, u8::MAX as f64) as u8),
                })
            }
            _ => None,
        })
        .collect()
}
