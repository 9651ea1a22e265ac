use std::{sync::Arc, time::Duration};

use anyhow::Result;
use clap::{Parser, Subcommand};
use client_core::{
    config, DeletionPhase, FetchState, HttpInterviewGateway, InterviewBrowser, MissingNavigator,
    NotificationSink, OwnedInterviewManager, StaticSession,
};
use shared::{
    domain::{ExperienceLevel, InterviewId, InterviewSummary, OwnedInterviewSummary},
    protocol::InterviewFilter,
};

#[derive(Parser, Debug)]
struct Cli {
    /// Overrides the configured api base url.
    #[arg(long)]
    api_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Browse shared interview experiences.
    Browse {
        #[arg(long)]
        company: Option<String>,
        #[arg(long)]
        role: Option<String>,
        #[arg(long)]
        level: Option<String>,
        #[arg(long)]
        tag: Option<String>,
        #[arg(long)]
        search: Option<String>,
    },
    /// List the interviews you shared.
    Mine {
        #[arg(long)]
        token: String,
    },
    /// Delete one of your interviews.
    Delete {
        #[arg(long)]
        token: String,
        #[arg(long)]
        id: String,
        /// Confirms the deletion; without it the request is cancelled.
        #[arg(long)]
        yes: bool,
    },
}

struct TerminalNotifications;

impl NotificationSink for TerminalNotifications {
    fn success(&self, message: &str) {
        println!("{message}");
    }

    fn failure(&self, message: &str) {
        eprintln!("{message}");
    }
}

fn print_summary(interview: &InterviewSummary) {
    let (tags, overflow) = interview.visible_tags();
    let mut line = format!(
        "{} - {} [{}] by {} ({} likes, {} comments)",
        interview.company,
        interview.role,
        interview.level,
        interview.author.display_name(),
        interview.likes,
        interview.comments,
    );
    if !tags.is_empty() {
        line.push_str(&format!("  #{}", tags.join(" #")));
    }
    if overflow > 0 {
        line.push_str(&format!(" +{overflow}"));
    }
    println!("{line}");
}

fn print_owned(interview: &OwnedInterviewSummary) {
    let mut line = format!(
        "{} - {} [{}] {} (posted {})",
        interview.company,
        interview.role,
        interview.level,
        interview.status.badge_label(),
        interview.created_at.format("%b %d, %Y"),
    );
    if interview.shows_engagement() {
        line.push_str(&format!(
            " {} views, {} likes, {} comments",
            interview.views, interview.likes, interview.comments
        ));
    }
    println!("{line}");
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();
    let cli = Cli::parse();

    let settings = config::load_settings();
    let base_url =
        config::prepare_api_base_url(cli.api_url.as_deref().unwrap_or(&settings.api_base_url))?;
    let gateway = Arc::new(HttpInterviewGateway::with_timeout(
        &base_url,
        Duration::from_secs(settings.request_timeout_seconds),
    )?);

    match cli.command {
        Command::Browse {
            company,
            role,
            level,
            tag,
            search,
        } => {
            let filter = InterviewFilter {
                company,
                role,
                level: level.map(ExperienceLevel::from),
                tag,
                search,
            };
            let browser = InterviewBrowser::new(gateway);
            browser.apply_filter(filter).await;
            match browser.state().await {
                FetchState::Ready(snapshot) => {
                    if snapshot.is_empty() {
                        println!("No interviews found. Try adjusting your filters.");
                    }
                    for interview in snapshot.renderable() {
                        print_summary(interview);
                    }
                }
                FetchState::Error(message) => anyhow::bail!(message),
                FetchState::Loading => anyhow::bail!("fetch did not resolve"),
            }
        }
        Command::Mine { token } => {
            let manager = OwnedInterviewManager::new(
                gateway,
                Arc::new(StaticSession::with_token(token)),
                Arc::new(TerminalNotifications),
                Arc::new(MissingNavigator),
            );
            manager.refresh().await;
            match manager.state().await {
                FetchState::Ready(snapshot) => {
                    if snapshot.is_empty() {
                        println!("No interviews shared yet.");
                    }
                    for interview in snapshot.renderable() {
                        print_owned(interview);
                    }
                }
                FetchState::Error(message) => anyhow::bail!(message),
                FetchState::Loading => anyhow::bail!("fetch did not resolve"),
            }
        }
        Command::Delete { token, id, yes } => {
            let manager = OwnedInterviewManager::new(
                gateway,
                Arc::new(StaticSession::with_token(token)),
                Arc::new(TerminalNotifications),
                Arc::new(MissingNavigator),
            );
            manager.refresh().await;
            let id = InterviewId::from(id);
            match manager.state().await {
                FetchState::Ready(snapshot) => {
                    if !snapshot.contains(&id) {
                        anyhow::bail!("interview '{id}' not found in your interviews");
                    }
                }
                FetchState::Error(message) => anyhow::bail!(message),
                FetchState::Loading => anyhow::bail!("fetch did not resolve"),
            }

            manager.request_delete(id.clone()).await;
            if !yes {
                manager.cancel_delete().await;
                println!("Deletion not confirmed; pass --yes to delete '{id}'.");
                return Ok(());
            }

            manager.confirm_delete().await;
            if manager.deletion().await != DeletionPhase::Idle {
                anyhow::bail!("delete did not complete");
            }
            if let FetchState::Ready(snapshot) = manager.state().await {
                if snapshot.contains(&id) {
                    anyhow::bail!("interview '{id}' was not deleted");
                }
            }
        }
    }

    Ok(())
}
