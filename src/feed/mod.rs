//! Avatar stream feed: dual-mode frame ingestion for the companion avatar.
//!
//! The feed obtains avatar frames from the backend in one of two modes and
//! paints them onto a rendering surface:
//!
//! - **Pull**: repeatedly fetch a single current frame over HTTP with a
//!   cache-busting query parameter ([`pull::PullFeed`]).
//! - **Push**: hold a WebSocket open on the avatar channel and consume
//!   server-delivered frames ([`push::PushFeed`]).
//!
//! Exactly one mode is active at a time. [`FeedController`] owns mode
//! selection and lifecycle; both feeds share the [`pacing::FramePacer`]
//! frame-rate ceiling and the [`renderer::FrameSink`] presentation seam.

pub mod controller;
pub mod pacing;
pub mod pull;
pub mod push;
pub mod renderer;

pub use controller::FeedController;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

use crate::event::UiEvent;

/// How avatar frames are obtained from the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedMode {
    /// Client repeatedly fetches the current frame over HTTP.
    Pull,
    /// Server delivers frames over a persistent WebSocket channel.
    Push,
}

impl FeedMode {
    /// The other mode (used by the controller's mode toggle).
    #[must_use]
    pub fn other(self) -> Self {
        match self {
            Self::Pull => Self::Push,
            Self::Push => Self::Pull,
        }
    }
}

impl fmt::Display for FeedMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pull => write!(f, "pull"),
            Self::Push => write!(f, "push"),
        }
    }
}

/// Lifecycle state of the avatar feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedState {
    /// No feed has been started since construction or the last teardown.
    Uninitialized,
    /// A feed has been started but has not yet presented a frame.
    Starting,
    /// Frames are flowing.
    Active,
    /// The last attempt to obtain a frame failed; a retry is scheduled.
    /// Not terminal.
    Degraded,
    /// Explicitly torn down. Reached only via [`FeedController::stop`],
    /// never by error.
    Stopped,
}

impl fmt::Display for FeedState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uninitialized => write!(f, "uninitialized"),
            Self::Starting => write!(f, "starting"),
            Self::Active => write!(f, "active"),
            Self::Degraded => write!(f, "degraded"),
            Self::Stopped => write!(f, "stopped"),
        }
    }
}

/// Shared status sink handed to feed tasks.
///
/// Owns the single authoritative [`FeedState`] and forwards transitions to
/// the UI event channel. State is mutated only here — feeds and the
/// controller go through [`report`](Self::report), never ad hoc.
#[derive(Clone)]
pub struct StatusReporter {
    state: Arc<Mutex<FeedState>>,
    events: mpsc::UnboundedSender<UiEvent>,
}

impl StatusReporter {
    /// Create a reporter starting in [`FeedState::Uninitialized`].
    #[must_use]
    pub fn new(events: mpsc::UnboundedSender<UiEvent>) -> Self {
        Self {
            state: Arc::new(Mutex::new(FeedState::Uninitialized)),
            events,
        }
    }

    /// Current feed state.
    #[must_use]
    pub fn state(&self) -> FeedState {
        match self.state.lock() {
            Ok(s) => *s,
            Err(p) => *p.into_inner(),
        }
    }

    /// Feed-side transition to `state`, emitting a [`UiEvent::FeedState`]
    /// when the state actually changes. Repeated reports of the same state
    /// (e.g. `Active` on every accepted frame) are deduplicated. Reports
    /// against a stopped feed are ignored: a task racing its own teardown
    /// must not move the state out of [`FeedState::Stopped`].
    pub fn report(&self, state: FeedState, details: impl Into<String>) {
        self.apply(state, details.into(), false);
    }

    /// Controller-side transition. Unlike [`report`](Self::report) this
    /// applies even out of [`FeedState::Stopped`] (e.g. a fresh start).
    pub fn transition(&self, state: FeedState, details: impl Into<String>) {
        self.apply(state, details.into(), true);
    }

    fn apply(&self, state: FeedState, details: String, from_controller: bool) {
        let changed = {
            let mut current = match self.state.lock() {
                Ok(s) => s,
                Err(p) => p.into_inner(),
            };
            if !from_controller && *current == FeedState::Stopped {
                return;
            }
            let changed = *current != state;
            *current = state;
            changed
        };
        if changed {
            // If the receiver is dropped the UI is gone — ignore the error.
            let _ = self.events.send(UiEvent::FeedState { state, details });
        }
    }

    /// Emit a transient user-facing notification.
    pub fn notify(&self, message: impl Into<String>) {
        let _ = self.events.send(UiEvent::Notification(message.into()));
    }

    /// Forward a non-state event (push-channel metadata, backend status).
    pub fn forward(&self, event: UiEvent) {
        let _ = self.events.send(event);
    }
}

/// Shared handle to the frame presentation sink.
pub type SharedFrameSink = Arc<Mutex<dyn renderer::FrameSink>>;
