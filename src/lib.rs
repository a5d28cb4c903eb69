//! A floating, draggable media player that survives page navigation.
//!
//! The crate is headless: the host forwards pointer, keyboard, resize and
//! route events to a [`FloatingPlayer`] and renders whatever it publishes.
//! Two embed backends sit behind the [`BackendAdapter`] contract, a
//! live-stream player driven by native events and a social-media video
//! player whose progress has to be polled.
//!
//! # Logging
//!
//! This library uses the `tracing` crate for logging. To enable logs, you'll need to
//! initialize a tracing subscriber in your application.
//!
//! Example using `tracing_subscriber`:
//! ```no_run
//! use tracing::Level;
//! use tracing_subscriber::FmtSubscriber;
//!
//! let subscriber = FmtSubscriber::builder()
//!     .with_max_level(Level::DEBUG)
//!     .finish();
//!
//! tracing::subscriber::set_global_default(subscriber)
//!     .expect("Failed to set tracing subscriber");
//! ```
//!
//! The log levels control what information is displayed:
//! - `DEBUG`: adapter lifecycle, ignored stale events, rejected progress samples
//! - `INFO`: video switches, closes, navigation pauses
//! - `WARN`: degraded backends, preference persistence failures

pub mod adapter;
mod config;
pub use config::{Config, CONFIG};
mod error;
pub use error::{BootstrapFailure, PlayerError};
mod events;
pub use events::{PlaybackEvent, PlayerEvent, PromptChoice};
mod geometry;
pub use geometry::{PlayerPosition, Point, Viewport, WindowSize};
mod handle;
pub use handle::{
    global, install_global, play_video, spawn, PlayerCommand, PlayerHandle, SettingsEdit,
};
mod models;
pub use models::{
    BackendKind, DefaultSize, PauseBehavior, PlaybackSnapshot, PlayerPreferences,
    PreferencesPatch, VideoRef,
};
mod navigation;
pub use navigation::{
    NavigationDecision, NavigationPausePolicy, PolicyState, DEFAULT_READING_ROUTE_PATTERN,
};
mod panel;
pub use panel::SettingsPanel;
mod preferences;
pub use preferences::{
    load_or_default, FilePreferenceStore, MemoryPreferenceStore, PreferenceStore,
};
mod session;
pub use session::{PlayOutcome, SessionState};
pub mod shell;
pub use shell::{FloatingPlayer, Surface};
mod utils;

pub use adapter::{
    AdapterEvent, AdapterEventKind, AdapterFactory, AdapterId, AdapterStatus, BackendAdapter,
    ContainerHandle, EmbedAdapterFactory,
};
