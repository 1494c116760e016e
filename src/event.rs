//! UI events emitted by the feed controller and status poller.
//!
//! This is intentionally lightweight (no frame payloads) so feed tasks can
//! emit events without blocking the frame path. The surrounding UI consumes
//! the receiving end to drive its status indicator and transient
//! notifications.

use crate::feed::FeedState;

/// Events that describe what the presentation layer is doing "right now".
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    /// Feed state transition, with a short human-readable detail string.
    FeedState {
        /// New state of the active feed.
        state: FeedState,
        /// Short description of what caused the transition.
        details: String,
    },

    /// Transient user-facing notification (e.g. a channel error).
    Notification(String),

    /// Avatar channel handshake acknowledgement.
    AvatarConnected {
        camera_available: bool,
        camera_index: Option<u32>,
        vts_connected: bool,
    },

    /// Camera availability report from the backend.
    CameraStatus {
        available: bool,
        active: bool,
        index: Option<u32>,
    },

    /// Result of a backend camera scan.
    CameraScanResults { cameras: Vec<u32> },

    /// Whether the backend avatar stream is producing frames.
    StreamingStatus { active: bool, fps: Option<f32> },

    /// VTube Studio connection state change.
    VtsConnected { connected: bool },

    /// VTube Studio error surfaced by the backend.
    VtsError { message: String },

    /// Number of clients attached to the avatar channel.
    ConnectedClients { count: u32 },

    /// Backend service reachability change (from the status poller).
    BackendStatus {
        reachable: bool,
        /// Service self-description when reachable, error text otherwise.
        details: String,
    },
}
