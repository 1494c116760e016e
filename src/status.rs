//! Backend service status polling.
//!
//! [`StatusPoller`] probes the backend's status endpoint at a fixed
//! interval and reports reachability *changes* on the UI event channel, so
//! the status indicator flips exactly once per outage and once per
//! recovery. It runs as a background tokio task cancelled the same way as
//! the feeds.

use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::StatusConfig;
use crate::error::{Result, UiError};
use crate::event::UiEvent;

/// Service descriptor returned by the backend status endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceStatus {
    /// Reported service state, e.g. `online`.
    #[serde(default)]
    pub status: String,
    /// Service display name.
    #[serde(default)]
    pub name: String,
    /// Service version string.
    #[serde(default)]
    pub version: String,
    /// Feature flags advertised by the backend.
    #[serde(default)]
    pub features: HashMap<String, bool>,
}

/// Polls the backend status endpoint and emits reachability transitions.
pub struct StatusPoller {
    client: reqwest::Client,
    status_url: Url,
    poll_interval: Duration,
    events: mpsc::UnboundedSender<UiEvent>,
    cancel: CancellationToken,
}

impl StatusPoller {
    /// Create a poller from configuration.
    pub fn new(
        config: &StatusConfig,
        events: mpsc::UnboundedSender<UiEvent>,
        cancel: CancellationToken,
    ) -> Result<Self> {
        let status_url = Url::parse(&config.status_url)
            .map_err(|e| UiError::Config(format!("invalid status_url: {e}")))?;
        Ok(Self {
            client: reqwest::Client::new(),
            status_url,
            poll_interval: config.poll_interval(),
            events,
            cancel,
        })
    }

    /// Run the polling loop until the cancellation token is cancelled.
    ///
    /// Intended to be spawned as a background task:
    ///
    /// ```rust,ignore
    /// let poller = StatusPoller::new(&config.status, events, cancel.child_token())?;
    /// tokio::spawn(poller.run());
    /// ```
    pub async fn run(self) {
        info!(url = %self.status_url, "status poller started");
        let mut last_reachable: Option<bool> = None;

        loop {
            let probed = tokio::select! {
                () = self.cancel.cancelled() => break,
                result = self.probe() => result,
            };

            let (reachable, details) = match probed {
                Ok(status) => {
                    debug!(status = %status.status, "backend status probe ok");
                    (true, format!("{} {} ({})", status.name, status.version, status.status))
                }
                Err(e) => {
                    debug!(error = %e, "backend status probe failed");
                    (false, e.to_string())
                }
            };

            if last_reachable != Some(reachable) {
                if reachable {
                    info!(details = %details, "backend reachable");
                } else {
                    warn!(details = %details, "backend unreachable");
                }
                if self
                    .events
                    .send(UiEvent::BackendStatus { reachable, details })
                    .is_err()
                {
                    // UI went away; nothing left to report to.
                    break;
                }
                last_reachable = Some(reachable);
            }

            tokio::select! {
                () = self.cancel.cancelled() => break,
                () = tokio::time::sleep(self.poll_interval) => {}
            }
        }

        info!("status poller stopped");
    }

    /// Fetch and decode the service descriptor once.
    pub async fn probe(&self) -> Result<ServiceStatus> {
        let response = self
            .client
            .get(self.status_url.clone())
            .send()
            .await
            .map_err(|e| UiError::Status(e.to_string()))?
            .error_for_status()
            .map_err(|e| UiError::Status(e.to_string()))?;
        response
            .json::<ServiceStatus>()
            .await
            .map_err(|e| UiError::Status(e.to_string()))
    }
}
