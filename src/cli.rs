// src/cli.rs
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

use crate::core::{ApiClient, ConfigManager, JobBoardApi, ResumeUpload};
use crate::dashboard::Dashboard;
use crate::error::MutationError;
use crate::session::SessionStore;
use crate::sources::RetryPolicy;
use crate::types::{DashboardView, JobId, JobRecord};

#[derive(Parser)]
#[command(name = "jobboard")]
#[command(about = "Job seeker dashboard: listings with saved and applied status")]
pub struct JobBoardCli {
    #[command(subcommand)]
    pub command: JobBoardCommand,

    /// Override the API base URL from configuration
    #[arg(long)]
    pub api_url: Option<String>,
}

#[derive(Subcommand)]
pub enum JobBoardCommand {
    /// Show every listing with its reconciled status
    List,
    /// Show saved jobs, including listings no longer in the feed
    Saved,
    /// Show submitted applications and their progress
    Applications,
    /// Save a job
    Save { job_id: String },
    /// Remove a job from saved jobs
    Unsave { job_id: String },
    /// Apply to a job
    Apply {
        job_id: String,
        #[arg(long)]
        cover_letter: String,
        #[arg(long)]
        resume: Option<PathBuf>,
    },
    /// Ask the server whether one job is saved
    CheckSaved { job_id: String },
    /// Store a bearer token for later commands
    Login {
        token: String,
        #[arg(long)]
        user_id: Option<String>,
    },
    /// Forget the stored token
    Logout,
}

pub async fn handle_command(cli: JobBoardCli, mut config: ConfigManager) -> Result<()> {
    if let Some(url) = cli.api_url {
        config.api.base_url = url.trim_end_matches('/').to_string();
    }

    let session = SessionStore::new(config.session.token_path.clone());

    match cli.command {
        JobBoardCommand::Login { token, user_id } => {
            session.save_token(&token, user_id)?;
            println!("✅ Logged in, token stored at {}", session.path().display());
            return Ok(());
        }
        JobBoardCommand::Logout => {
            session.clear()?;
            println!("✅ Logged out");
            return Ok(());
        }
        _ => {}
    }

    let api = Arc::new(ApiClient::new(&config.api, session)?);
    let dashboard = Dashboard::new(api, RetryPolicy::from_config(&config.api));
    info!("Using job board API at {}", config.api.base_url);

    let outcome = run(&dashboard, cli.command).await;
    dashboard.unmount();
    outcome
}

async fn run<A: JobBoardApi>(dashboard: &Dashboard<A>, command: JobBoardCommand) -> Result<()> {
    match command {
        JobBoardCommand::List => {
            let view = dashboard.mount().await;
            print_view(&view);
        }

        JobBoardCommand::Saved => {
            let jobs = dashboard
                .saved_job_records()
                .await
                .context("Failed to load saved jobs")?;
            if jobs.is_empty() {
                println!("No saved jobs");
            }
            for job in &jobs {
                print_job_line("saved", job);
            }
        }

        JobBoardCommand::Applications => {
            let applications = dashboard
                .application_records()
                .await
                .context("Failed to load applications")?;
            if applications.is_empty() {
                println!("No applications yet");
            }
            for app in &applications {
                print_job_line(&app.status, &app.job);
                for update in app.status_updates() {
                    let date = update
                        .date
                        .map(|d| d.format("%Y-%m-%d").to_string())
                        .unwrap_or_else(|| "----------".to_string());
                    println!("      {}  {}", date, update.message);
                }
            }
        }

        JobBoardCommand::Save { job_id } => {
            let job_id = JobId::from(job_id);
            dashboard.mount().await;
            report(dashboard.save(&job_id).await, "Saved", &job_id)?;
        }

        JobBoardCommand::Unsave { job_id } => {
            let job_id = JobId::from(job_id);
            dashboard.mount().await;
            report(dashboard.unsave(&job_id).await, "Removed from saved", &job_id)?;
        }

        JobBoardCommand::Apply {
            job_id,
            cover_letter,
            resume,
        } => {
            let job_id = JobId::from(job_id);
            let resume = match resume {
                Some(path) => Some(
                    ResumeUpload::from_path(&path)
                        .await
                        .with_context(|| format!("Failed to load resume {}", path.display()))?,
                ),
                None => None,
            };
            dashboard.mount().await;
            report(
                dashboard.apply(&job_id, resume, &cover_letter).await,
                "Applied to",
                &job_id,
            )?;
        }

        JobBoardCommand::CheckSaved { job_id } => {
            let job_id = JobId::from(job_id);
            let saved = dashboard
                .confirm_saved(&job_id)
                .await
                .context("Failed to check saved job")?;
            println!(
                "Job {} is {}",
                job_id,
                if saved { "saved" } else { "not saved" }
            );
        }

        JobBoardCommand::Login { .. } | JobBoardCommand::Logout => {}
    }

    Ok(())
}

fn report(result: Result<(), MutationError>, verb: &str, job_id: &JobId) -> Result<()> {
    match result {
        Ok(()) => {
            println!("✅ {} job {}", verb, job_id);
            Ok(())
        }
        Err(e) => {
            error!("Mutation on job {} failed: {}", job_id, e);
            println!("❌ Error: {}", e);
            Err(e.into())
        }
    }
}

fn print_view(view: &DashboardView) {
    for entry in &view.entries {
        print_job_line(entry.status.as_str(), &entry.job);
    }
    println!("{} listings", view.entries.len());
    for (source, err) in &view.source_errors {
        println!("⚠️  {} unavailable: {}", source, err);
    }
}

fn print_job_line(status: &str, job: &JobRecord) {
    println!(
        "[{:>8}] {:<8} {} @ {} ({})",
        status, job.id, job.title, job.company_name, job.location
    );
}
