//! Feed lifecycle: mode selection, start/stop, toggle, restart.
//!
//! [`FeedController`] guarantees that at most one feed task is alive at any
//! time. Teardown is synchronous and idempotent: the active task's
//! cancellation token is cancelled and the task aborted before a new feed
//! is ever spawned, so a mode toggle can never leave a dangling timer or
//! socket behind.

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::FeedConfig;
use crate::error::Result;
use crate::event::UiEvent;
use crate::feed::pull::PullFeed;
use crate::feed::push::PushFeed;
use crate::feed::{FeedMode, FeedState, SharedFrameSink, StatusReporter};

/// Handle to the currently running feed task.
struct ActiveFeed {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

/// Owns the avatar feed lifecycle.
///
/// Construction picks the configured default mode but starts nothing;
/// callers drive [`start`](Self::start), [`stop`](Self::stop),
/// [`toggle_mode`](Self::toggle_mode) (a debug action in the UI) and
/// [`restart`](Self::restart) (recovery from a stuck state).
///
/// Methods that spawn must be called from within a tokio runtime.
pub struct FeedController {
    config: FeedConfig,
    sink: SharedFrameSink,
    reporter: StatusReporter,
    mode: FeedMode,
    active: Option<ActiveFeed>,
}

impl FeedController {
    /// Wire a controller to a frame sink and the UI event channel.
    #[must_use]
    pub fn new(
        config: FeedConfig,
        sink: SharedFrameSink,
        events: tokio::sync::mpsc::UnboundedSender<UiEvent>,
    ) -> Self {
        let mode = config.default_mode;
        Self {
            config,
            sink,
            reporter: StatusReporter::new(events),
            mode,
            active: None,
        }
    }

    /// The currently selected mode (active or not).
    #[must_use]
    pub fn mode(&self) -> FeedMode {
        self.mode
    }

    /// Current feed state.
    #[must_use]
    pub fn state(&self) -> FeedState {
        self.reporter.state()
    }

    /// Whether a feed task is currently running.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|active| !active.task.is_finished())
    }

    /// Start the feed in the selected mode. A no-op when already running.
    pub fn start(&mut self) -> Result<()> {
        if self.is_active() {
            debug!(mode = %self.mode, "feed already active; start ignored");
            return Ok(());
        }
        // A previously finished task (e.g. a dead channel) still holds a
        // slot; clear it before spawning.
        self.teardown();

        let cancel = CancellationToken::new();
        let task = match self.mode {
            FeedMode::Pull => {
                let feed = PullFeed::new(
                    &self.config,
                    std::sync::Arc::clone(&self.sink),
                    self.reporter.clone(),
                    cancel.child_token(),
                )?;
                tokio::spawn(feed.run())
            }
            FeedMode::Push => {
                let feed = PushFeed::new(
                    &self.config,
                    std::sync::Arc::clone(&self.sink),
                    self.reporter.clone(),
                    cancel.child_token(),
                )?;
                tokio::spawn(feed.run())
            }
        };

        self.active = Some(ActiveFeed { cancel, task });
        self.reporter
            .transition(FeedState::Starting, format!("{} feed starting", self.mode));
        info!(mode = %self.mode, "avatar feed started");
        Ok(())
    }

    /// Tear the active feed down. Idempotent: stopping twice, or before any
    /// start, is a no-op that still leaves the state [`FeedState::Stopped`].
    pub fn stop(&mut self) {
        let was_active = self.active.is_some();
        self.teardown();
        self.reporter.transition(FeedState::Stopped, "feed stopped");
        if was_active {
            info!(mode = %self.mode, "avatar feed stopped");
        }
    }

    /// Switch between pull and push. The previous feed is torn down
    /// completely before the other mode starts.
    pub fn toggle_mode(&mut self) -> Result<()> {
        self.teardown();
        self.reporter
            .transition(FeedState::Uninitialized, "mode toggle");
        self.mode = self.mode.other();
        info!(mode = %self.mode, "feed mode toggled");
        self.start()
    }

    /// Tear down and start again in the same mode (recovery from a stuck
    /// feed).
    pub fn restart(&mut self) -> Result<()> {
        self.teardown();
        self.reporter.transition(FeedState::Uninitialized, "restart");
        info!(mode = %self.mode, "avatar feed restarting");
        self.start()
    }

    /// Cancel and drop the active feed task, if any. Synchronous: the token
    /// cancellation discards in-flight work at the task's next suspension
    /// point and the abort reclaims the task itself.
    fn teardown(&mut self) {
        if let Some(active) = self.active.take() {
            active.cancel.cancel();
            active.task.abort();
        }
    }
}

impl Drop for FeedController {
    fn drop(&mut self) {
        self.teardown();
    }
}
