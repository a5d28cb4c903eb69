//! Adapter for the streaming-embed backend.
//!
//! The streaming SDK hands back a player handle synchronously and then pushes
//! its own ready, play, pause, ended and time-update callbacks, so no polling
//! is needed here.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};

use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info};

use super::bootstrap::{ScriptHost, ScriptRegistry};
use super::progress::ProgressGuard;
use super::{
    mark_ready, report_unavailable, AdapterCore, AdapterEventKind, AdapterEventSender, AdapterId,
    AdapterStatus, BackendAdapter, ContainerHandle,
};
use crate::config::Config;
use crate::error::{BootstrapFailure, PlayerError};
use crate::events::PlaybackEvent;
use crate::models::{BackendKind, PlaybackSnapshot};
use crate::utils::lock;

/// Native callbacks of the streaming SDK.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StreamSdkEvent {
    Ready,
    Play,
    Pause,
    Ended,
    TimeUpdate { current_time: f64, duration: f64 },
}

/// Native player object of the streaming SDK.
pub trait StreamEmbedPlayer: Send {
    fn play(&mut self);
    fn pause(&mut self);
    fn seek(&mut self, seconds: f64);
    fn set_muted(&mut self, muted: bool);
    fn muted(&self) -> bool;
    fn current_time(&self) -> f64;
    fn duration(&self) -> f64;
    /// Removes the iframe and every listener.
    fn destroy(&mut self);
}

pub trait StreamEmbedSdk: Send + Sync {
    /// Builds an embed for `channel` inside `container`; callbacks go to `events`.
    fn create_player(
        &self,
        container: &ContainerHandle,
        channel: &str,
        events: mpsc::UnboundedSender<StreamSdkEvent>,
    ) -> Result<Box<dyn StreamEmbedPlayer>, PlayerError>;
}

type SharedPlayer = Arc<Mutex<Option<Box<dyn StreamEmbedPlayer>>>>;

pub struct StreamEmbedAdapter {
    core: AdapterCore,
    registry: Arc<ScriptRegistry>,
    host: Arc<dyn ScriptHost>,
    sdk: Arc<dyn StreamEmbedSdk>,
    config: Config,
    player: SharedPlayer,
    reanchor: Arc<AtomicBool>,
}

impl StreamEmbedAdapter {
    pub fn new(
        registry: Arc<ScriptRegistry>,
        host: Arc<dyn ScriptHost>,
        sdk: Arc<dyn StreamEmbedSdk>,
        config: Config,
    ) -> Self {
        Self {
            core: AdapterCore::new(BackendKind::StreamEmbed),
            registry,
            host,
            sdk,
            config,
            player: Arc::new(Mutex::new(None)),
            reanchor: Arc::new(AtomicBool::new(false)),
        }
    }

    fn with_ready_player<R>(
        &self,
        f: impl FnOnce(&mut Box<dyn StreamEmbedPlayer>) -> R,
    ) -> Result<R, PlayerError> {
        if self.core.status() != AdapterStatus::Ready {
            return Err(self.core.unavailable_error());
        }
        let mut player = lock(&self.player);
        match player.as_mut() {
            Some(player) => Ok(f(player)),
            None => Err(self.core.unavailable_error()),
        }
    }
}

impl BackendAdapter for StreamEmbedAdapter {
    fn kind(&self) -> BackendKind {
        BackendKind::StreamEmbed
    }

    fn id(&self) -> AdapterId {
        self.core.id
    }

    fn status(&self) -> AdapterStatus {
        self.core.status()
    }

    fn initialize(&mut self, container: ContainerHandle, locator: &str, events: AdapterEventSender) {
        if !self.core.begin() {
            debug!(adapter = %self.core.id, "Stream adapter already initialized");
            return;
        }

        let emitter = self.core.emitter(events);
        let cancel = self.core.cancel.clone();
        let status = self.core.status.clone();
        let registry = self.registry.clone();
        let host = self.host.clone();
        let sdk = self.sdk.clone();
        let config = self.config.clone();
        let player = self.player.clone();
        let reanchor = self.reanchor.clone();
        let channel = locator.to_string();
        let id = self.core.id;

        let task = tokio::spawn(async move {
            let loaded = tokio::select! {
                _ = cancel.cancelled() => return,
                loaded = registry.ensure_loaded(
                    BackendKind::StreamEmbed,
                    host.as_ref(),
                    &config.stream_sdk_url,
                    &config,
                ) => loaded,
            };
            if let Err(failure) = loaded {
                report_unavailable(&status, &emitter, failure);
                return;
            }

            let (native_tx, mut native_rx) = mpsc::unbounded_channel();
            match sdk.create_player(&container, &channel, native_tx) {
                Ok(mut native) => {
                    // Checked under the slot lock so destroy() either sees the
                    // stored player or this task sees the cancellation.
                    let mut slot = lock(&player);
                    if cancel.is_cancelled() {
                        drop(slot);
                        native.destroy();
                        return;
                    }
                    *slot = Some(native);
                }
                Err(e) => {
                    let failure = BootstrapFailure::PlayerCreation {
                        kind: BackendKind::StreamEmbed,
                        reason: e.to_string(),
                    };
                    report_unavailable(&status, &emitter, failure);
                    return;
                }
            }

            let mut guard = ProgressGuard::new(config.desync_slack);
            loop {
                let event = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    event = native_rx.recv() => match event {
                        Some(event) => event,
                        None => break,
                    },
                };

                match event {
                    StreamSdkEvent::Ready => {
                        if !mark_ready(&status) {
                            continue;
                        }
                        let duration = lock(&player).as_ref().map_or(0.0, |p| p.duration());
                        info!(adapter = %id, %channel, duration, "Stream embed ready");
                        emitter.emit(AdapterEventKind::Ready { duration });
                    }
                    StreamSdkEvent::Play => {
                        emitter.emit(AdapterEventKind::State(PlaybackEvent::Playing));
                    }
                    StreamSdkEvent::Pause => {
                        emitter.emit(AdapterEventKind::State(PlaybackEvent::Paused));
                    }
                    StreamSdkEvent::Ended => {
                        emitter.emit(AdapterEventKind::State(PlaybackEvent::Ended));
                    }
                    StreamSdkEvent::TimeUpdate {
                        current_time,
                        duration,
                    } => {
                        if reanchor.swap(false, Ordering::SeqCst) {
                            guard.reanchor();
                        }
                        if !guard.accept(current_time, duration, Instant::now()) {
                            continue;
                        }
                        let is_muted = lock(&player).as_ref().is_some_and(|p| p.muted());
                        emitter.emit(AdapterEventKind::Progress(PlaybackSnapshot {
                            current_time,
                            duration,
                            is_muted,
                        }));
                    }
                }
            }
        });
        self.core.attach(task);
    }

    fn play(&self) -> Result<(), PlayerError> {
        self.with_ready_player(|p| p.play())
    }

    fn pause(&self) -> Result<(), PlayerError> {
        self.with_ready_player(|p| p.pause())
    }

    fn seek(&self, seconds: f64) -> Result<(), PlayerError> {
        self.with_ready_player(|p| p.seek(seconds))?;
        self.reanchor.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn mute(&self) -> Result<(), PlayerError> {
        self.with_ready_player(|p| p.set_muted(true))
    }

    fn unmute(&self) -> Result<(), PlayerError> {
        self.with_ready_player(|p| p.set_muted(false))
    }

    fn is_muted(&self) -> bool {
        lock(&self.player).as_ref().is_some_and(|p| p.muted())
    }

    fn current_time(&self) -> f64 {
        lock(&self.player).as_ref().map_or(0.0, |p| p.current_time())
    }

    fn duration(&self) -> f64 {
        lock(&self.player).as_ref().map_or(0.0, |p| p.duration())
    }

    fn destroy(&mut self) {
        if self.core.status() == AdapterStatus::Destroyed {
            return;
        }
        self.core.shutdown();
        if let Some(mut native) = lock(&self.player).take() {
            native.destroy();
        }
    }
}

impl Drop for StreamEmbedAdapter {
    fn drop(&mut self) {
        self.destroy();
    }
}
