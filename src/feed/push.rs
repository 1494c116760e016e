//! Push-mode feed: WebSocket client for the avatar channel.
//!
//! [`PushFeed`] holds a persistent connection to the backend's avatar
//! channel and consumes server-delivered frames. On connect it requests the
//! upstream camera status immediately and, after a short grace delay, asks
//! the backend to start the background stream — connection establishment is
//! decoupled from upstream readiness.
//!
//! Frames arriving faster than the frame budget land in a single pending
//! slot with last-one-wins overwrite; a deferred flush at the end of the
//! budget window guarantees the surviving frame is eventually presented
//! without exceeding the rate ceiling. Under load this drops frames by
//! design instead of queueing them.
//!
//! The channel is not reconnected automatically: close or transport error
//! reports [`FeedState::Degraded`] and the feed exits. Reconnection happens
//! only through a fresh controller start.

use std::time::Instant;

use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use url::Url;

use crate::config::FeedConfig;
use crate::error::{Result, UiError};
use crate::event::UiEvent;
use crate::feed::pacing::{FramePacer, PaceDecision};
use crate::feed::{FeedState, SharedFrameSink, StatusReporter};

type WsStream = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;
type WsWriter = SplitSink<WsStream, Message>;

// ---------------------------------------------------------------------------
// Wire protocol (tagged JSON events on the avatar channel)
// ---------------------------------------------------------------------------

/// Messages sent to the backend.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ClientMessage {
    GetCameraStatus,
    StartBackgroundStream,
}

/// Messages received from the backend.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
#[allow(dead_code)] // Fields populated by deserialization only.
enum ServerMessage {
    Connected {
        #[serde(default)]
        camera_available: bool,
        #[serde(default)]
        camera_index: Option<u32>,
        #[serde(default)]
        vts_connected: bool,
    },
    Live2dFrame {
        /// Inline-encoded image payload (`data:image/...;base64,` URL).
        frame: String,
        #[serde(default)]
        emotion: String,
        #[serde(default)]
        timestamp: f64,
        #[serde(default)]
        vts_connected: bool,
    },
    CameraStatus {
        #[serde(default)]
        available: bool,
        #[serde(default)]
        active: bool,
        #[serde(default)]
        index: Option<u32>,
    },
    CameraScanResults {
        #[serde(default)]
        cameras: Vec<u32>,
    },
    StreamingStatus {
        #[serde(default)]
        active: bool,
        #[serde(default)]
        fps: Option<f32>,
    },
    VtsConnected {
        #[serde(default)]
        connected: bool,
    },
    VtsError {
        #[serde(default)]
        message: String,
    },
    ConnectedClients {
        #[serde(default)]
        count: u32,
    },
}

// ---------------------------------------------------------------------------
// PushFeed
// ---------------------------------------------------------------------------

/// WebSocket-driven avatar feed.
pub struct PushFeed {
    socket_url: Url,
    pacer: FramePacer,
    grace_delay: std::time::Duration,
    sink: SharedFrameSink,
    reporter: StatusReporter,
    cancel: CancellationToken,
}

impl PushFeed {
    /// Create a push feed from configuration. Does not connect.
    pub fn new(
        config: &FeedConfig,
        sink: SharedFrameSink,
        reporter: StatusReporter,
        cancel: CancellationToken,
    ) -> Result<Self> {
        let socket_url = Url::parse(&config.socket_url)
            .map_err(|e| UiError::Config(format!("invalid socket_url: {e}")))?;
        Ok(Self {
            socket_url,
            pacer: FramePacer::new(config.frame_budget()),
            grace_delay: config.grace_delay(),
            sink,
            reporter,
            cancel,
        })
    }

    /// Connect and consume channel events until the token is cancelled or
    /// the connection drops. Intended to be spawned as a background task.
    ///
    /// No connect/read timeout is applied beyond transport defaults; the
    /// controller's cancellation token is the only local teardown path.
    pub async fn run(mut self) {
        debug!(url = %self.socket_url, "push feed connecting");

        let ws_stream = tokio::select! {
            () = self.cancel.cancelled() => return,
            result = tokio_tungstenite::connect_async(self.socket_url.as_str()) => {
                match result {
                    Ok((ws, _response)) => ws,
                    Err(e) => {
                        self.fail(&format!("connect failed: {e}"));
                        return;
                    }
                }
            }
        };
        let (mut write, mut read) = ws_stream.split();

        // Upstream status request goes out right away; the stream request
        // waits for the grace delay.
        if let Err(e) = send_message(&mut write, &ClientMessage::GetCameraStatus).await {
            self.fail(&e.to_string());
            return;
        }

        let grace = tokio::time::sleep(self.grace_delay);
        tokio::pin!(grace);
        let mut stream_requested = false;

        // Single pending slot; overwritten by newer frames inside the same
        // budget window, flushed at the window boundary.
        let mut pending: Option<DynamicImage> = None;
        let mut flush_at: Option<tokio::time::Instant> = None;

        loop {
            tokio::select! {
                () = self.cancel.cancelled() => break,
                () = &mut grace, if !stream_requested => {
                    stream_requested = true;
                    if let Err(e) =
                        send_message(&mut write, &ClientMessage::StartBackgroundStream).await
                    {
                        self.fail(&e.to_string());
                        break;
                    }
                }
                () = flush_sleep(flush_at), if flush_at.is_some() => {
                    flush_at = None;
                    if let Some(frame) = pending.take() {
                        self.present(&frame);
                    }
                }
                inbound = read.next() => {
                    match inbound {
                        Some(Ok(Message::Text(text))) => {
                            self.handle_message(&text, &mut pending, &mut flush_at);
                        }
                        Some(Ok(Message::Close(_))) | None => {
                            // A clean close is not a transport error: no
                            // user-facing notification, just the state.
                            warn!("avatar channel closed by server");
                            self.reporter
                                .report(FeedState::Degraded, "connection closed by server");
                            break;
                        }
                        Some(Err(e)) => {
                            self.fail(&format!("read error: {e}"));
                            break;
                        }
                        // Ping/Pong handled by tungstenite; binary frames unused.
                        _ => {}
                    }
                }
            }
        }

        // Dropping the stream halves closes the connection handle.
        debug!("push feed stopped");
    }

    /// Dispatch one inbound channel event.
    fn handle_message(
        &mut self,
        text: &str,
        pending: &mut Option<DynamicImage>,
        flush_at: &mut Option<tokio::time::Instant>,
    ) {
        let msg: ServerMessage = match serde_json::from_str(text) {
            Ok(m) => m,
            Err(e) => {
                debug!(error = %e, "ignoring unparseable channel message");
                return;
            }
        };

        match msg {
            ServerMessage::Live2dFrame { frame, .. } => match decode_data_url(&frame) {
                Ok(image) => self.accept_frame(image, pending, flush_at),
                // Malformed payloads are dropped without a state change.
                Err(e) => debug!(error = %e, "dropping undecodable frame"),
            },
            ServerMessage::Connected {
                camera_available,
                camera_index,
                vts_connected,
            } => self.reporter.forward(UiEvent::AvatarConnected {
                camera_available,
                camera_index,
                vts_connected,
            }),
            ServerMessage::CameraStatus {
                available,
                active,
                index,
            } => self.reporter.forward(UiEvent::CameraStatus {
                available,
                active,
                index,
            }),
            ServerMessage::CameraScanResults { cameras } => {
                self.reporter.forward(UiEvent::CameraScanResults { cameras });
            }
            ServerMessage::StreamingStatus { active, fps } => {
                self.reporter.forward(UiEvent::StreamingStatus { active, fps });
            }
            ServerMessage::VtsConnected { connected } => {
                self.reporter.forward(UiEvent::VtsConnected { connected });
            }
            ServerMessage::VtsError { message } => {
                warn!(message = %message, "VTube Studio error reported by backend");
                self.reporter.forward(UiEvent::VtsError { message });
            }
            ServerMessage::ConnectedClients { count } => {
                self.reporter.forward(UiEvent::ConnectedClients { count });
            }
        }
    }

    /// Apply the frame budget to a freshly decoded frame: present it
    /// immediately when the window is open, otherwise park it in the pending
    /// slot (overwriting any older pending frame).
    fn accept_frame(
        &mut self,
        frame: DynamicImage,
        pending: &mut Option<DynamicImage>,
        flush_at: &mut Option<tokio::time::Instant>,
    ) {
        match self.pacer.check(Instant::now()) {
            PaceDecision::Present => {
                // A frame parked in a previous window is older than this
                // one; drop it and its flush so it cannot present later.
                *pending = None;
                *flush_at = None;
                self.present(&frame);
            }
            PaceDecision::Defer(remaining) => {
                if pending.is_some() {
                    debug!("pending frame superseded");
                }
                *pending = Some(frame);
                // The flush deadline is the end of the current budget
                // window; a later overwrite keeps the earlier deadline.
                if flush_at.is_none() {
                    *flush_at = Some(tokio::time::Instant::now() + remaining);
                }
            }
        }
    }

    fn present(&mut self, frame: &DynamicImage) {
        self.pacer.mark_presented(Instant::now());
        {
            let mut sink = match self.sink.lock() {
                Ok(s) => s,
                Err(p) => p.into_inner(),
            };
            sink.present(frame);
        }
        self.reporter.report(FeedState::Active, "frame accepted");
    }

    /// Report a channel failure: degraded state plus a transient
    /// notification. The feed does not reconnect on its own.
    fn fail(&self, details: &str) {
        warn!(details = %details, "avatar channel failed");
        self.reporter.report(FeedState::Degraded, details);
        self.reporter.notify(format!("Avatar channel error: {details}"));
    }
}

/// Sleep until the pending-frame flush deadline.
async fn flush_sleep(at: Option<tokio::time::Instant>) {
    match at {
        Some(at) => tokio::time::sleep_until(at).await,
        // Guarded by `flush_at.is_some()` in the select; never polled.
        None => std::future::pending().await,
    }
}

/// Serialize and send one client message.
async fn send_message(write: &mut WsWriter, msg: &ClientMessage) -> Result<()> {
    let json = serde_json::to_string(msg).map_err(|e| UiError::Channel(format!("serialize: {e}")))?;
    write
        .send(Message::Text(json))
        .await
        .map_err(|e| UiError::Channel(format!("send error: {e}")))
}

/// Decode an inline base64 image payload.
///
/// Accepts both full `data:image/jpeg;base64,...` URLs and bare base64.
fn decode_data_url(payload: &str) -> Result<DynamicImage> {
    use base64::Engine as _;
    use base64::engine::general_purpose::STANDARD;

    let encoded = match payload.find("base64,") {
        Some(idx) => &payload[idx + "base64,".len()..],
        None => payload,
    };
    let bytes = STANDARD
        .decode(encoded.trim())
        .map_err(|e| UiError::Decode(format!("bad base64: {e}")))?;
    image::load_from_memory(&bytes).map_err(|e| UiError::Decode(format!("bad image: {e}")))
}
