//! Pull-mode feed: HTTP polling of the current avatar frame.
//!
//! [`PullFeed`] runs as a background tokio task. Each iteration fetches the
//! frame endpoint once with a cache-busting timestamp query, so at most one
//! request is ever in flight — the loop is sequential by construction. A
//! fetched frame arriving inside the budget window has only its
//! *presentation* delayed; it is never refetched or dropped. Fetch failures
//! report [`FeedState::Degraded`] and retry after a fixed delay independent
//! of the frame budget.
//!
//! Teardown is explicit: the controller cancels the task's token, which
//! also discards any response that resolves after cancellation.

use std::time::Instant;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use url::Url;

use crate::config::FeedConfig;
use crate::error::{Result, UiError};
use crate::feed::pacing::{FramePacer, PaceDecision};
use crate::feed::{FeedState, SharedFrameSink, StatusReporter};

/// HTTP-polling avatar feed.
pub struct PullFeed {
    client: reqwest::Client,
    frame_url: Url,
    pacer: FramePacer,
    retry_delay: std::time::Duration,
    sink: SharedFrameSink,
    reporter: StatusReporter,
    cancel: CancellationToken,
}

impl PullFeed {
    /// Create a pull feed from configuration.
    pub fn new(
        config: &FeedConfig,
        sink: SharedFrameSink,
        reporter: StatusReporter,
        cancel: CancellationToken,
    ) -> Result<Self> {
        let frame_url = Url::parse(&config.frame_url)
            .map_err(|e| UiError::Config(format!("invalid frame_url: {e}")))?;
        Ok(Self {
            client: reqwest::Client::new(),
            frame_url,
            pacer: FramePacer::new(config.frame_budget()),
            retry_delay: config.retry_delay(),
            sink,
            reporter,
            cancel,
        })
    }

    /// Run the polling loop until the cancellation token is cancelled.
    ///
    /// Intended to be spawned as a background task:
    ///
    /// ```rust,ignore
    /// let feed = PullFeed::new(&config, sink, reporter, cancel.child_token())?;
    /// tokio::spawn(feed.run());
    /// ```
    pub async fn run(mut self) {
        debug!(url = %self.frame_url, "pull feed started");

        loop {
            let fetched = tokio::select! {
                () = self.cancel.cancelled() => break,
                result = self.fetch_frame() => result,
            };
            // A response resolving after teardown belongs to a dead feed.
            if self.cancel.is_cancelled() {
                break;
            }

            match fetched {
                Ok(frame) => {
                    if let PaceDecision::Defer(remaining) = self.pacer.check(Instant::now()) {
                        // Keep the fetched frame; only its presentation waits.
                        tokio::select! {
                            () = self.cancel.cancelled() => break,
                            () = tokio::time::sleep(remaining) => {}
                        }
                    }
                    self.pacer.mark_presented(Instant::now());
                    {
                        let mut sink = match self.sink.lock() {
                            Ok(s) => s,
                            Err(p) => p.into_inner(),
                        };
                        sink.present(&frame);
                    }
                    self.reporter.report(FeedState::Active, "frame accepted");

                    tokio::select! {
                        () = self.cancel.cancelled() => break,
                        () = tokio::time::sleep(self.pacer.budget()) => {}
                    }
                }
                Err(e) => {
                    warn!(error = %e, "avatar frame fetch failed");
                    self.reporter.report(FeedState::Degraded, e.to_string());
                    tokio::select! {
                        () = self.cancel.cancelled() => break,
                        () = tokio::time::sleep(self.retry_delay) => {}
                    }
                }
            }
        }

        debug!("pull feed stopped");
    }

    /// Fetch and decode one frame, cache-busted with the current wall-clock
    /// time in milliseconds.
    async fn fetch_frame(&self) -> Result<image::DynamicImage> {
        let mut url = self.frame_url.clone();
        url.query_pairs_mut()
            .append_pair("t", &chrono::Utc::now().timestamp_millis().to_string());

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| UiError::Fetch(e.to_string()))?
            .error_for_status()
            .map_err(|e| UiError::Fetch(e.to_string()))?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| UiError::Fetch(e.to_string()))?;

        image::load_from_memory(&bytes).map_err(|e| UiError::Decode(format!("bad image: {e}")))
    }
}
