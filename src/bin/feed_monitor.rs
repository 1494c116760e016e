//! Headless feed monitor binary.
//!
//! Runs the avatar feed and the backend status poller against a configured
//! Lumi server and prints UI events as they arrive. Useful for checking a
//! deployment without the full UI: `RUST_LOG=debug lumi-feed`.

use std::sync::{Arc, Mutex};

use lumi_webui::feed::renderer::CanvasRenderer;
use lumi_webui::{FeedController, StatusPoller, UiConfig, UiEvent};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config_path = UiConfig::default_config_path();
    let config = if config_path.is_file() {
        UiConfig::from_file(&config_path)?
    } else {
        tracing::info!(path = %config_path.display(), "no config file; using defaults");
        UiConfig::default()
    };

    let (events_tx, mut events_rx) = tokio::sync::mpsc::unbounded_channel();
    let renderer = Arc::new(Mutex::new(CanvasRenderer::new(
        config.surface.width,
        config.surface.height,
    )));

    let cancel = CancellationToken::new();
    let poller = StatusPoller::new(&config.status, events_tx.clone(), cancel.child_token())?;
    tokio::spawn(poller.run());

    let mut controller = FeedController::new(config.feed.clone(), renderer, events_tx);
    controller.start()?;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutting down");
                break;
            }
            event = events_rx.recv() => match event {
                Some(event) => print_event(&event),
                None => break,
            }
        }
    }

    controller.stop();
    cancel.cancel();
    Ok(())
}

fn print_event(event: &UiEvent) {
    match event {
        UiEvent::FeedState { state, details } => {
            tracing::info!(state = %state, details = %details, "feed state");
        }
        UiEvent::Notification(message) => tracing::warn!(message = %message, "notification"),
        UiEvent::BackendStatus { reachable, details } => {
            tracing::info!(reachable = reachable, details = %details, "backend status");
        }
        other => tracing::info!(event = ?other, "channel event"),
    }
}
