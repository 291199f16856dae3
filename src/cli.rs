// src/cli.rs
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{error, info, warn};

use crate::core::ConfigManager;
use crate::jobs::JobService;

#[derive(Parser)]
#[command(name = "hrdesk")]
#[command(about = "HR job board service: API server and maintenance commands")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(long, default_value = "config.yaml")]
    pub config: PathBuf,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API with the periodic purge sweep
    Serve {
        /// Overrides the configured port
        #[arg(long)]
        port: Option<u16>,
    },
    /// Purge trashed jobs whose grace period has elapsed
    Cleanup,
    /// Inspect and manage job postings
    Jobs {
        #[command(subcommand)]
        command: JobsCommand,
    },
}

#[derive(Subcommand)]
pub enum JobsCommand {
    /// List active jobs, optionally scoped to a university
    List {
        #[arg(long)]
        tenant: Option<String>,
    },
    /// Move a job to the trash
    Delete {
        job_id: String,
        #[arg(long)]
        tenant: Option<String>,
    },
    /// Take a job back out of the trash
    Restore {
        job_id: String,
        #[arg(long)]
        tenant: Option<String>,
    },
}

pub async fn handle_command(command: Command, config: &ConfigManager, service: JobService) -> Result<()> {
    match command {
        Command::Serve { port } => {
            let port = port.unwrap_or(config.environment.port);
            if let Some(interval) = config.cleanup_interval() {
                spawn_cleanup_task(service.clone(), interval);
            } else {
                warn!("Periodic cleanup disabled; run `hrdesk cleanup` to purge expired jobs");
            }
            crate::web::start_web_server(service, port).await?;
        }

        Command::Cleanup => {
            let purged = service.cleanup_expired().await?;
            info!("✅ Purged {} expired jobs", purged);
        }

        Command::Jobs { command } => handle_jobs_command(command, &service).await?,
    }

    Ok(())
}

async fn handle_jobs_command(command: JobsCommand, service: &JobService) -> Result<()> {
    match command {
        JobsCommand::List { tenant } => {
            let jobs = service.jobs(tenant.as_deref(), true).await?;
            if jobs.is_empty() {
                info!("No active jobs found.");
                return Ok(());
            }

            info!(
                "{:<38} {:<30} {:<8} {:<6} {:<12}",
                "ID", "Title", "Status", "New", "Posted"
            );
            info!("{}", "-".repeat(98));
            for listing in jobs.iter() {
                info!(
                    "{:<38} {:<30} {:<8} {:<6} {:<12}",
                    listing.id,
                    listing.job.title,
                    format!("{:?}", listing.job.status),
                    if listing.job.new_applicants { "yes" } else { "no" },
                    listing.posted_label
                );
            }
        }

        JobsCommand::Delete { job_id, tenant } => {
            match service.soft_delete_job(tenant.as_deref(), &job_id).await {
                Ok(()) => info!("✅ Job {} moved to trash", job_id),
                Err(e) => {
                    error!("Failed to delete job {}: {:#}", job_id, e);
                    return Err(e);
                }
            }
        }

        JobsCommand::Restore { job_id, tenant } => {
            match service.restore_job(tenant.as_deref(), &job_id).await {
                Ok(()) => info!("✅ Job {} restored", job_id),
                Err(e) => {
                    error!("Failed to restore job {}: {:#}", job_id, e);
                    return Err(e);
                }
            }
        }
    }

    Ok(())
}

fn spawn_cleanup_task(service: JobService, interval: std::time::Duration) {
    info!("Purge sweep every {} s", interval.as_secs());
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            match service.cleanup_expired().await {
                Ok(0) => {}
                Ok(purged) => info!("Scheduled sweep purged {} jobs", purged),
                Err(e) => error!("Scheduled sweep failed: {:#}", e),
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_jobs_delete() {
        let cli = Cli::parse_from(["hrdesk", "jobs", "delete", "j1", "--tenant", "u1"]);
        match cli.command {
            Command::Jobs {
                command: JobsCommand::Delete { job_id, tenant },
            } => {
                assert_eq!(job_id, "j1");
                assert_eq!(tenant.as_deref(), Some("u1"));
            }
            _ => panic!("expected jobs delete"),
        }
        assert_eq!(cli.config, PathBuf::from("config.yaml"));
    }

    #[test]
    fn test_parse_serve_port() {
        let cli = Cli::parse_from(["hrdesk", "--config", "prod.yaml", "serve", "--port", "9000"]);
        assert!(matches!(cli.command, Command::Serve { port: Some(9000) }));
        assert_eq!(cli.config, PathBuf::from("prod.yaml"));
    }
}
