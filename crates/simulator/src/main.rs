//! `lemos-simulator` -- simulated reading daemon.
//!
//! Generates randomized multi-zone readings and pushes them to the LEMOS API
//! on a fixed period, then logs the latest reading of the focused area.
//! Typing an area id on stdin switches the focused area.
//!
//! # Environment variables
//!
//! | Variable                  | Default                 | Description                      |
//! |---------------------------|-------------------------|----------------------------------|
//! | `BACKEND_URL`             | `http://localhost:3000` | Base URL of the LEMOS API        |
//! | `SIMULATOR_AREAS`         | `1,2,3`                 | Comma-separated simulated areas  |
//! | `SIMULATOR_INTERVAL_SECS` | `5`                     | Seconds between pushes           |
//! | `SIMULATOR_FOCUS_AREA`    | first area              | Area read back after each push   |

use lemos_core::types::AreaId;
use lemos_simulator::config::SimulatorConfig;
use lemos_simulator::scheduler::PollScheduler;
use lemos_simulator::sender::BackendClient;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lemos_simulator=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = SimulatorConfig::from_env().unwrap_or_else(|e| {
        tracing::error!(error = %e, "Invalid simulator configuration");
        std::process::exit(1);
    });

    let client = BackendClient::new(config.backend_url.clone()).unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to build HTTP client");
        std::process::exit(1);
    });

    tracing::info!(
        backend_url = %config.backend_url,
        areas = ?config.areas,
        interval_secs = config.interval.as_secs(),
        "Starting lemos-simulator",
    );

    let mut scheduler = PollScheduler::new(client, config.areas, config.interval);
    scheduler.start(config.focus);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Received SIGINT (Ctrl-C), stopping");
                break;
            }
            line = lines.next_line(), if stdin_open => match line {
                Ok(Some(line)) => handle_command(&mut scheduler, line.trim()),
                Ok(None) => {
                    tracing::debug!("stdin closed, area switching disabled");
                    stdin_open = false;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to read stdin");
                    stdin_open = false;
                }
            },
        }
    }

    scheduler.stop().await;
}

/// Interpret one stdin line as the next area to focus on.
fn handle_command(scheduler: &mut PollScheduler, line: &str) {
    if line.is_empty() {
        return;
    }
    match AreaId::new(line) {
        Ok(area_id) if scheduler.areas().contains(&area_id) => {
            if scheduler.focus() != Some(&area_id) {
                scheduler.switch_area(area_id);
            }
        }
        _ => {
            tracing::warn!(input = %line, areas = ?scheduler.areas(), "Unknown area");
        }
    }
}
