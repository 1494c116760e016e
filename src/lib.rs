//! Lumi web UI: client-side presentation layer for the Lumi AI companion.
//!
//! This crate is the glue between the Lumi backend and whatever shows the
//! companion to the user: it ingests the live avatar video feed, tracks
//! backend reachability, and manages themes and UI preferences. The
//! backend does the actual AI inference and avatar rendering; everything
//! here is client-side plumbing.
//!
//! # Architecture
//!
//! The avatar feed is the core. It runs in one of two modes, selected and
//! supervised by [`feed::FeedController`]:
//! - **Pull**: poll the frame endpoint over HTTP ([`feed::pull`])
//! - **Push**: consume server-delivered frames over a WebSocket
//!   ([`feed::push`])
//!
//! Both modes share the [`feed::pacing::FramePacer`] frame-rate ceiling and
//! present through the [`feed::renderer::FrameSink`] seam. Status and
//! metadata flow out as [`UiEvent`]s on an unbounded channel consumed by
//! the surrounding UI.

pub mod config;
pub mod error;
pub mod event;
pub mod feed;
pub mod prefs;
pub mod status;
pub mod theme;

pub use config::UiConfig;
pub use error::{Result, UiError};
pub use event::UiEvent;
pub use feed::{FeedController, FeedMode, FeedState};
pub use prefs::PreferenceStore;
pub use status::{ServiceStatus, StatusPoller};
pub use theme::ThemeManager;
