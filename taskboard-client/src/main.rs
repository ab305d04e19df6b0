//! # Taskboard CLI
//!
//! Prints a user's board: the current project's tasks grouped by status,
//! overdue tasks, and status counts across all projects.
//!
//! ## Usage
//!
//! ```bash
//! TASKBOARD_URL=http://localhost:8080 TASKBOARD_TOKEN=... TASKBOARD_USER_ID=... \
//!     cargo run -p taskboard-client
//! ```
//!
//! Ctrl-C abandons whatever request is in flight.

use anyhow::Context;
use chrono::Utc;
use taskboard_client::{actions, api::HttpClient, state::BoardState};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskboard_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let base_url =
        std::env::var("TASKBOARD_URL").unwrap_or_else(|_| "http://localhost:8080".to_string());
    let token = std::env::var("TASKBOARD_TOKEN").context("TASKBOARD_TOKEN must be set")?;
    let user_id = std::env::var("TASKBOARD_USER_ID").context("TASKBOARD_USER_ID must be set")?;

    let api = HttpClient::new(base_url)?.with_token(token);
    let mut board = BoardState::new();

    let cancel = CancellationToken::new();
    let on_ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupted, cancelling requests");
            on_ctrl_c.cancel();
        }
    });

    actions::load_projects(&api, &mut board, &user_id, &cancel).await;
    if let Some(message) = board.projects_fetch.error() {
        anyhow::bail!("Could not load projects: {}", message);
    }

    let Some(project) = board.current_project().cloned() else {
        println!("No projects yet.");
        return Ok(());
    };

    actions::load_tasks(&api, &mut board, &project.id, &cancel).await;
    if let Some(message) = board.tasks_fetch.error() {
        anyhow::bail!("Could not load tasks: {}", message);
    }

    println!("{} ({} projects)", project.name, board.projects.len());
    for (status, entries) in board.columns() {
        println!("\n{} [{}]", status, entries.len());
        for entry in entries {
            println!("  - {}", entry.title());
        }
    }

    let overdue = board.overdue_tasks(Utc::now().date_naive());
    if !overdue.is_empty() {
        println!("\nOverdue:");
        for task in overdue {
            if let Some(due) = task.due_date {
                println!("  - {} (due {})", task.title, due);
            }
        }
    }

    actions::fetch_analytics(&api, &mut board, &user_id, None, &cancel).await;
    match (&board.analytics, board.analytics_fetch.error()) {
        (_, Some(message)) => tracing::warn!(error = %message, "Analytics unavailable"),
        (Some(report), None) => {
            println!("\nAll projects:");
            for (label, count) in report.status_counts.iter() {
                println!("  {}: {}", label, count);
            }
        }
        (None, None) => {}
    }

    Ok(())
}
