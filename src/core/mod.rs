// src/core/mod.rs
//! Configuration and the REST seam shared by every data source

pub mod api_client;
pub mod config_manager;
pub mod job_board_api;

pub use api_client::ApiClient;
pub use config_manager::{ApiConfig, ConfigManager, LoggingConfig, SessionConfig};
pub use job_board_api::{ApplicationSubmission, JobBoardApi, ResumeUpload};
