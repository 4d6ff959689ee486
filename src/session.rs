// src/session.rs
//! Bearer-token storage for the signed-in job seeker.

use anyhow::{Context, Result};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::FetchError;

const TOKEN_ENV_VAR: &str = "JOBBOARD_TOKEN";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionFile {
    pub token: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ExpiryClaims {
    exp: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
    env_override: Option<String>,
}

impl SessionStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            env_override: std::env::var(TOKEN_ENV_VAR).ok(),
        }
    }

    /// Session backed only by the file, ignoring the environment
    pub fn from_file(path: PathBuf) -> Self {
        Self {
            path,
            env_override: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current bearer token, or `AuthRequired` when none is usable
    pub fn bearer_token(&self) -> Result<String, FetchError> {
        let token = match self.env_override.as_deref().map(str::trim) {
            Some(token) if !token.is_empty() => token.to_string(),
            _ => self
                .read_file()?
                .token
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .ok_or_else(|| FetchError::auth_required("No session token, please log in"))?,
        };

        if token_expired(&token, chrono::Utc::now().timestamp() as u64) {
            warn!("Session token has expired");
            return Err(FetchError::auth_required("Session expired, please log in again"));
        }
        Ok(token)
    }

    pub fn user_id(&self) -> Option<String> {
        self.read_file().ok().and_then(|f| f.user_id)
    }

    pub fn save_token(&self, token: &str, user_id: Option<String>) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        let file = SessionFile {
            token: Some(token.trim().to_string()),
            user_id,
        };
        let content = toml::to_string(&file).context("Failed to serialize session")?;
        std::fs::write(&self.path, content)
            .with_context(|| format!("Failed to write session file: {}", self.path.display()))?;
        info!("Session stored at {}", self.path.display());
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path).with_context(|| {
                format!("Failed to remove session file: {}", self.path.display())
            })?;
            info!("Session cleared");
        }
        Ok(())
    }

    fn read_file(&self) -> Result<SessionFile, FetchError> {
        if !self.path.exists() {
            return Ok(SessionFile::default());
        }
        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            FetchError::auth_required(format!("Cannot read session file: {}", e))
        })?;
        toml::from_str(&content)
            .map_err(|e| FetchError::auth_required(format!("Corrupted session file: {}", e)))
    }
}

/// True when the token is a JWT whose `exp` lies in the past.
///
/// Opaque tokens carry no expiry and are left for the server to judge.
fn token_expired(token: &str, now: u64) -> bool {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    match decode::<ExpiryClaims>(token, &DecodingKey::from_secret(&[]), &validation) {
        Ok(data) => data.claims.exp.is_some_and(|exp| exp <= now),
        Err(_) => false,
    }
}
