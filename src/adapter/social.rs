//! Adapter for the social-platform embed backend.
//!
//! The social SDK parses a container and only later delivers the player
//! instance through its ready callback. It has no time-update event, so
//! progress is polled on a fixed cadence while (and only while) playing.

use std::fmt;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};

use tokio::sync::{mpsc, watch};
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{debug, info, trace, warn};

use super::bootstrap::{ScriptHost, ScriptRegistry};
use super::progress::ProgressGuard;
use super::{
    mark_ready, report_unavailable, AdapterCore, AdapterEventKind, AdapterEventSender, AdapterId,
    AdapterStatus, BackendAdapter, ContainerHandle, Emitter,
};
use crate::config::Config;
use crate::error::{BootstrapFailure, PlayerError};
use crate::events::PlaybackEvent;
use crate::models::{BackendKind, PlaybackSnapshot};
use crate::utils::lock;

/// Native player instance of the social SDK.
pub trait SocialEmbedPlayer: Send {
    fn play(&mut self);
    fn pause(&mut self);
    fn seek(&mut self, seconds: f64);
    fn mute(&mut self);
    fn unmute(&mut self);
    fn is_muted(&self) -> bool;
    fn get_current_position(&self) -> f64;
    fn get_duration(&self) -> f64;
    /// Drops every event subscription held by this instance.
    fn release(&mut self);
}

/// Native callbacks of the social SDK.
pub enum SocialSdkEvent {
    /// The embed finished parsing; carries the player instance.
    Ready(Box<dyn SocialEmbedPlayer>),
    StartedPlaying,
    Paused,
    FinishedPlaying,
    Error(String),
}

impl fmt::Debug for SocialSdkEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SocialSdkEvent::Ready(_) => f.write_str("Ready(..)"),
            SocialSdkEvent::StartedPlaying => f.write_str("StartedPlaying"),
            SocialSdkEvent::Paused => f.write_str("Paused"),
            SocialSdkEvent::FinishedPlaying => f.write_str("FinishedPlaying"),
            SocialSdkEvent::Error(e) => f.debug_tuple("Error").field(e).finish(),
        }
    }
}

pub trait SocialEmbedSdk: Send + Sync {
    /// Renders the embed for `href` inside `container`; callbacks go to `events`.
    fn parse(
        &self,
        container: &ContainerHandle,
        href: &str,
        events: mpsc::UnboundedSender<SocialSdkEvent>,
    ) -> Result<(), PlayerError>;
}

type SharedPlayer = Arc<Mutex<Option<Box<dyn SocialEmbedPlayer>>>>;

pub struct SocialEmbedAdapter {
    core: AdapterCore,
    registry: Arc<ScriptRegistry>,
    host: Arc<dyn ScriptHost>,
    sdk: Arc<dyn SocialEmbedSdk>,
    config: Config,
    player: SharedPlayer,
    /// Drives the progress poll; true only while playback runs.
    playing: Arc<watch::Sender<bool>>,
    reanchor: Arc<AtomicBool>,
}

impl SocialEmbedAdapter {
    pub fn new(
        registry: Arc<ScriptRegistry>,
        host: Arc<dyn ScriptHost>,
        sdk: Arc<dyn SocialEmbedSdk>,
        config: Config,
    ) -> Self {
        let (playing, _) = watch::channel(false);
        Self {
            core: AdapterCore::new(BackendKind::SocialEmbed),
            registry,
            host,
            sdk,
            config,
            player: Arc::new(Mutex::new(None)),
            playing: Arc::new(playing),
            reanchor: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Whether the progress poll is currently armed.
    pub fn is_polling(&self) -> bool {
        *self.playing.borrow() && self.core.status() == AdapterStatus::Ready
    }

    fn with_ready_player<R>(
        &self,
        f: impl FnOnce(&mut Box<dyn SocialEmbedPlayer>) -> R,
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

/// Reads position and duration once and forwards them if plausible.
fn poll_progress(player: &SharedPlayer, guard: &mut ProgressGuard, emitter: &Emitter) {
    let sample = lock(player).as_ref().map(|p| PlaybackSnapshot {
        current_time: p.get_current_position(),
        duration: p.get_duration(),
        is_muted: p.is_muted(),
    });
    let Some(snapshot) = sample else {
        return;
    };
    trace!(?snapshot, "Polled social embed progress");
    if guard.accept(snapshot.current_time, snapshot.duration, Instant::now()) {
        emitter.emit(AdapterEventKind::Progress(snapshot));
    }
}

impl BackendAdapter for SocialEmbedAdapter {
    fn kind(&self) -> BackendKind {
        BackendKind::SocialEmbed
    }

    fn id(&self) -> AdapterId {
        self.core.id
    }

    fn status(&self) -> AdapterStatus {
        self.core.status()
    }

    fn initialize(&mut self, container: ContainerHandle, locator: &str, events: AdapterEventSender) {
        if !self.core.begin() {
            debug!(adapter = %self.core.id, "Social adapter already initialized");
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
        let playing = self.playing.clone();
        let mut playing_rx = self.playing.subscribe();
        let reanchor = self.reanchor.clone();
        let href = locator.to_string();
        let id = self.core.id;

        let task = tokio::spawn(async move {
            let loaded = tokio::select! {
                _ = cancel.cancelled() => return,
                loaded = registry.ensure_loaded(
                    BackendKind::SocialEmbed,
                    host.as_ref(),
                    &config.social_sdk_url,
                    &config,
                ) => loaded,
            };
            if let Err(failure) = loaded {
                report_unavailable(&status, &emitter, failure);
                return;
            }

            let (native_tx, mut native_rx) = mpsc::unbounded_channel();
            if let Err(e) = sdk.parse(&container, &href, native_tx) {
                let failure = BootstrapFailure::PlayerCreation {
                    kind: BackendKind::SocialEmbed,
                    reason: e.to_string(),
                };
                report_unavailable(&status, &emitter, failure);
                return;
            }

            let mut guard = ProgressGuard::new(config.desync_slack);
            let mut ticker = interval(config.poll_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                let polling = *playing_rx.borrow() && lock(&player).is_some();
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    event = native_rx.recv() => {
                        let Some(event) = event else { break };
                        match event {
                            SocialSdkEvent::Ready(mut native) => {
                                let mut slot = lock(&player);
                                if cancel.is_cancelled() || !mark_ready(&status) {
                                    // Torn down (or already ready) before the SDK answered.
                                    drop(slot);
                                    native.release();
                                    continue;
                                }
                                let duration = native.get_duration();
                                *slot = Some(native);
                                drop(slot);
                                info!(adapter = %id, %href, duration, "Social embed ready");
                                emitter.emit(AdapterEventKind::Ready { duration });
                            }
                            SocialSdkEvent::StartedPlaying => {
                                playing.send_replace(true);
                                emitter.emit(AdapterEventKind::State(PlaybackEvent::Playing));
                            }
                            SocialSdkEvent::Paused => {
                                playing.send_replace(false);
                                emitter.emit(AdapterEventKind::State(PlaybackEvent::Paused));
                            }
                            SocialSdkEvent::FinishedPlaying => {
                                playing.send_replace(false);
                                emitter.emit(AdapterEventKind::State(PlaybackEvent::Ended));
                            }
                            SocialSdkEvent::Error(message) => {
                                warn!(adapter = %id, %message, "Social embed reported an error");
                            }
                        }
                    }
                    changed = playing_rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        if *playing_rx.borrow_and_update() {
                            if reanchor.swap(false, Ordering::SeqCst) {
                                guard.reanchor();
                            }
                            ticker.reset();
                        }
                    }
                    _ = ticker.tick(), if polling => {
                        if reanchor.swap(false, Ordering::SeqCst) {
                            guard.reanchor();
                        }
                        poll_progress(&player, &mut guard, &emitter);
                    }
                }
            }
            debug!(adapter = %id, "Social adapter task finished");
        });
        self.core.attach(task);
    }

    fn play(&self) -> Result<(), PlayerError> {
        self.with_ready_player(|p| p.play())?;
        self.playing.send_replace(true);
        Ok(())
    }

    fn pause(&self) -> Result<(), PlayerError> {
        // Stop polling first, even if the native call can't be made.
        self.playing.send_replace(false);
        self.with_ready_player(|p| p.pause())
    }

    fn seek(&self, seconds: f64) -> Result<(), PlayerError> {
        self.with_ready_player(|p| p.seek(seconds))?;
        self.reanchor.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn mute(&self) -> Result<(), PlayerError> {
        self.with_ready_player(|p| p.mute())
    }

    fn unmute(&self) -> Result<(), PlayerError> {
        self.with_ready_player(|p| p.unmute())
    }

    fn is_muted(&self) -> bool {
        lock(&self.player).as_ref().is_some_and(|p| p.is_muted())
    }

    fn current_time(&self) -> f64 {
        lock(&self.player)
            .as_ref()
            .map_or(0.0, |p| p.get_current_position())
    }

    fn duration(&self) -> f64 {
        lock(&self.player).as_ref().map_or(0.0, |p| p.get_duration())
    }

    fn destroy(&mut self) {
        if self.core.status() == AdapterStatus::Destroyed {
            return;
        }
        self.playing.send_replace(false);
        self.core.shutdown();
        if let Some(mut native) = lock(&self.player).take() {
            native.release();
        }
    }
}

impl Drop for SocialEmbedAdapter {
    fn drop(&mut self) {
        self.destroy();
    }
}
