//! The floating window.
//!
//! [`FloatingPlayer`] owns the session state, the one mounted adapter, all
//! pointer and keyboard input, the settings panel and the pause-on-navigate
//! prompt. Everything the host needs to draw is published through a
//! `watch` channel (session) and a `broadcast` channel ([`PlayerEvent`]).

pub mod controls;
pub mod gesture;

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, watch};
use tracing::{debug, info, warn};

use crate::adapter::{
    AdapterEvent, AdapterEventKind, AdapterEventSender, AdapterFactory, AdapterId, AdapterStatus,
    BackendAdapter, ContainerHandle,
};
use crate::config::Config;
use crate::error::PlayerError;
use crate::events::{PlaybackEvent, PlayerEvent, PromptChoice};
use crate::geometry::{PlayerPosition, Viewport};
use crate::models::{PauseBehavior, PlaybackSnapshot, PreferencesPatch, VideoRef};
use crate::navigation::{NavigationDecision, NavigationPausePolicy, PolicyState};
use crate::panel::SettingsPanel;
use crate::preferences::{load_or_default, PreferenceStore};
use crate::session::{PlayOutcome, SessionState};

use controls::{format_clock, key_command, seek_target, ControlAction, FocusContext, Key, KeyCommand};
use gesture::{ClickThresholds, DragGesture, GestureKind, HitRegion, PointerEvent};

/// What the host should render inside the window.
#[derive(Debug, Clone, PartialEq)]
pub enum Surface {
    Hidden,
    /// Backend still bootstrapping.
    Loading { thumbnail_url: String },
    /// The adapter is live inside the container.
    Embed { container: ContainerHandle },
    /// Degraded: static thumbnail plus an "open externally" link.
    Thumbnail {
        title: String,
        thumbnail_url: String,
        external_url: String,
    },
}

struct MountedAdapter {
    adapter: Box<dyn BackendAdapter>,
    video: VideoRef,
}

pub struct FloatingPlayer {
    config: Config,
    state: SessionState,
    session_tx: watch::Sender<SessionState>,
    store: Arc<dyn PreferenceStore>,
    factory: Arc<dyn AdapterFactory>,
    container: ContainerHandle,
    mounted: Option<MountedAdapter>,
    adapter_tx: AdapterEventSender,
    adapter_rx: mpsc::UnboundedReceiver<AdapterEvent>,
    snapshot: PlaybackSnapshot,
    gesture: Option<DragGesture>,
    policy: NavigationPausePolicy,
    panel: Option<SettingsPanel>,
    up_next: VecDeque<VideoRef>,
    events: broadcast::Sender<PlayerEvent>,
}

impl FloatingPlayer {
    /// Builds the player for one browsing session. Stored preferences are
    /// loaded here; a broken store just yields the defaults.
    pub fn new(
        config: Config,
        store: Arc<dyn PreferenceStore>,
        factory: Arc<dyn AdapterFactory>,
        container: ContainerHandle,
        viewport: Viewport,
    ) -> Result<Self, PlayerError> {
        let policy = NavigationPausePolicy::new(&config.reading_route_pattern)?;
        let preferences = load_or_default(store.as_ref());
        let state = SessionState::new(preferences, viewport, &config);
        let (session_tx, _) = watch::channel(state.clone());
        let (adapter_tx, adapter_rx) = mpsc::unbounded_channel();
        let (events, _) = broadcast::channel(config.event_buffer_capacity.max(1));

        Ok(Self {
            config,
            state,
            session_tx,
            store,
            factory,
            container,
            mounted: None,
            adapter_tx,
            adapter_rx,
            snapshot: PlaybackSnapshot::default(),
            gesture: None,
            policy,
            panel: None,
            up_next: VecDeque::new(),
            events,
        })
    }

    // Read side

    pub fn session(&self) -> watch::Receiver<SessionState> {
        self.session_tx.subscribe()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        self.snapshot
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PlayerEvent> {
        self.events.subscribe()
    }

    pub(crate) fn event_sender(&self) -> broadcast::Sender<PlayerEvent> {
        self.events.clone()
    }

    pub fn adapter_id(&self) -> Option<AdapterId> {
        self.mounted.as_ref().map(|m| m.adapter.id())
    }

    pub fn adapter_status(&self) -> Option<AdapterStatus> {
        self.mounted.as_ref().map(|m| m.adapter.status())
    }

    pub fn policy_state(&self) -> &PolicyState {
        self.policy.state()
    }

    pub fn prompt_open(&self) -> bool {
        self.policy.is_prompting()
    }

    pub fn settings_panel(&self) -> Option<&SettingsPanel> {
        self.panel.as_ref()
    }

    pub fn settings_panel_mut(&mut self) -> Option<&mut SettingsPanel> {
        self.panel.as_mut()
    }

    pub fn up_next(&self) -> impl Iterator<Item = &VideoRef> {
        self.up_next.iter()
    }

    pub fn elapsed_label(&self) -> String {
        format_clock(self.snapshot.current_time)
    }

    pub fn duration_label(&self) -> String {
        format_clock(self.snapshot.duration)
    }

    pub fn surface(&self) -> Surface {
        let Some(mounted) = self.mounted.as_ref().filter(|_| self.state.show_player) else {
            return Surface::Hidden;
        };
        match mounted.adapter.status() {
            AdapterStatus::Ready => Surface::Embed {
                container: self.container.clone(),
            },
            AdapterStatus::Unavailable(_) => Surface::Thumbnail {
                title: mounted.video.title.clone(),
                thumbnail_url: mounted.video.thumbnail_url.clone(),
                external_url: mounted.video.external_url(&self.config),
            },
            _ => Surface::Loading {
                thumbnail_url: mounted.video.thumbnail_url.clone(),
            },
        }
    }

    // Session entry points

    /// Hands a video to the player. Re-triggering the current video is a no-op.
    pub fn play_video(&mut self, video: VideoRef) {
        match self.state.play_video(video.clone()) {
            PlayOutcome::AlreadyCurrent => {
                debug!(video = %video.id, "Video already current, ignoring re-trigger");
            }
            PlayOutcome::Replaced(old) => {
                info!(from = %old.id, to = %video.id, "Switching video");
                self.unmount();
                self.mount(video);
            }
            PlayOutcome::Started => {
                info!(video = %video.id, backend = %video.backend_kind, "Starting video");
                self.mount(video);
            }
        }
        self.publish();
    }

    pub fn pause_video(&mut self) {
        if self.state.pause_video() {
            self.with_adapter("pause", |a| a.pause());
            self.publish();
        }
    }

    pub fn resume_video(&mut self) {
        if self.is_degraded() {
            debug!("Ignoring resume on a degraded player");
            return;
        }
        if self.state.resume_video() {
            self.with_adapter("play", |a| a.play());
            self.publish();
        }
    }

    pub fn toggle_play(&mut self) {
        if self.state.is_playing {
            self.pause_video();
        } else {
            self.resume_video();
        }
    }

    pub fn close_player(&mut self) {
        self.unmount();
        let closed = self.state.close_player();
        self.gesture = None;
        self.panel = None;
        self.up_next.clear();
        self.snapshot = PlaybackSnapshot::default();
        if self.policy.dismiss() {
            debug!("Open pause prompt dismissed by close");
        }
        self.publish();
        if let Some(video) = closed {
            info!(video = %video.id, "Player closed");
            self.emit(PlayerEvent::Closed);
        }
    }

    pub fn toggle_minimize(&mut self) {
        self.state.toggle_minimize();
        self.publish();
    }

    pub fn update_position(&mut self, position: PlayerPosition) {
        self.state.update_position(position);
        self.publish();
    }

    pub fn resize_viewport(&mut self, viewport: Viewport) {
        self.state.set_viewport(viewport);
        self.publish();
    }

    /// Merges, persists and publishes. Persistence failures never block.
    pub fn update_preferences(&mut self, patch: PreferencesPatch) {
        if patch.is_empty() {
            return;
        }
        self.state.update_preferences(patch);
        let prefs = self.state.preferences;
        if let Err(e) = self.store.save(&prefs) {
            warn!(error = %e, "Failed to persist preferences, keeping them for this session");
        }
        self.publish();
        self.emit(PlayerEvent::PreferencesSaved(prefs));
    }

    /// Queues a follow-up video for when the current one ends.
    pub fn enqueue(&mut self, video: VideoRef) {
        debug!(video = %video.id, "Queued up next");
        self.up_next.push_back(video);
    }

    // Pointer input

    pub fn pointer_down(&mut self, event: PointerEvent, region: HitRegion) {
        if !self.state.show_player || region == HitRegion::Controls {
            return;
        }
        self.gesture = Some(DragGesture::begin(event, self.state.position));
    }

    pub fn pointer_move(&mut self, event: PointerEvent) {
        let Some(gesture) = self.gesture else {
            return;
        };
        self.state.update_position(gesture.follow(event.point));
        self.publish();
    }

    /// Ends the press. A click toggles playback and leaves the window where it
    /// was; anything else is a drag with no playback side effect.
    pub fn pointer_up(&mut self, event: PointerEvent) -> Option<GestureKind> {
        let gesture = self.gesture.take()?;
        let kind = gesture.classify(event, ClickThresholds::from(&self.config));
        match kind {
            GestureKind::Click => {
                self.state.update_position(gesture.origin());
                self.toggle_play();
            }
            GestureKind::Drag => {
                self.state.update_position(gesture.follow(event.point));
            }
        }
        self.publish();
        Some(kind)
    }

    pub fn pointer_cancel(&mut self) {
        self.gesture = None;
    }

    // Controls overlay

    pub fn control(&mut self, action: ControlAction) {
        match action {
            ControlAction::TogglePlay => self.toggle_play(),
            ControlAction::ToggleMute => self.toggle_mute(),
            ControlAction::ToggleMinimize => self.toggle_minimize(),
            ControlAction::Close => self.close_player(),
            ControlAction::ToggleSettings => {
                if self.panel.is_some() {
                    self.close_settings();
                } else {
                    self.open_settings();
                }
            }
        }
    }

    pub fn toggle_mute(&mut self) {
        let muted = self.snapshot.is_muted;
        let applied = if muted {
            self.with_adapter("unmute", |a| a.unmute())
        } else {
            self.with_adapter("mute", |a| a.mute())
        };
        if applied {
            self.snapshot.is_muted = !muted;
            self.emit(PlayerEvent::Progress(self.snapshot));
        }
    }

    /// Click-to-seek on the progress bar. Returns the time sought to.
    pub fn seek_bar_click(&mut self, offset_px: f64, bar_width_px: f64) -> Option<f64> {
        let target = seek_target(offset_px, bar_width_px, self.snapshot.duration)?;
        self.seek_to(target)
    }

    /// Seeks within `[0, duration]`; nothing happens while the duration is unknown.
    pub fn seek_to(&mut self, seconds: f64) -> Option<f64> {
        let duration = self.snapshot.duration;
        if !duration.is_finite() || duration <= 0.0 || !seconds.is_finite() {
            return None;
        }
        let target = seconds.clamp(0.0, duration);
        if !self.with_adapter("seek", |a| a.seek(target)) {
            return None;
        }
        self.snapshot.current_time = target;
        self.emit(PlayerEvent::Progress(self.snapshot));
        Some(target)
    }

    pub fn seek_by(&mut self, delta: f64) -> Option<f64> {
        self.seek_to(self.snapshot.current_time + delta)
    }

    // Keyboard

    /// Returns whether the key was consumed. Keys are ignored while the player
    /// is hidden or the user is typing somewhere on the page.
    pub fn key_down(&mut self, key: Key, focus: FocusContext) -> bool {
        if !self.state.show_player || focus.text_input_focused {
            return false;
        }
        let Some(command) = key_command(key, self.config.seek_step) else {
            return false;
        };
        match command {
            KeyCommand::TogglePlay => self.toggle_play(),
            KeyCommand::SeekBy(delta) => {
                self.seek_by(delta);
            }
            KeyCommand::ToggleMute => self.toggle_mute(),
        }
        true
    }

    // Settings panel

    pub fn open_settings(&mut self) {
        self.panel = Some(SettingsPanel::open(self.state.preferences));
    }

    /// Closes the panel, discarding unsaved edits.
    pub fn close_settings(&mut self) {
        if let Some(panel) = self.panel.take() {
            if panel.is_dirty() {
                debug!("Settings closed without saving, edits discarded");
            }
        }
    }

    pub fn save_settings(&mut self) -> bool {
        let Some(panel) = self.panel.take() else {
            return false;
        };
        self.update_preferences(panel.save());
        true
    }

    // Navigation

    pub fn navigate(&mut self, route: &str) -> NavigationDecision {
        let decision = self.policy.on_navigate(route, &self.state);
        match decision {
            NavigationDecision::Pause => {
                info!(route, "Pausing playback for reading route");
                self.pause_video();
            }
            NavigationDecision::Prompt => {
                self.emit(PlayerEvent::PausePrompt {
                    route: route.to_string(),
                });
            }
            NavigationDecision::Ignore => {}
        }
        decision
    }

    /// Applies the user's answer to an open pause prompt.
    pub fn answer_prompt(&mut self, choice: PromptChoice) -> bool {
        let Some(choice) = self.policy.resolve(choice) else {
            return false;
        };
        match choice {
            PromptChoice::PauseNow => self.pause_video(),
            PromptChoice::KeepPlaying => {}
            PromptChoice::StopAsking => {
                self.update_preferences(PreferencesPatch::pause_behavior(PauseBehavior::AutoPause));
                self.pause_video();
            }
        }
        self.emit(PlayerEvent::PromptDismissed(choice));
        true
    }

    // Adapter feed

    /// Waits for the next report from an adapter.
    pub async fn next_adapter_event(&mut self) -> Option<AdapterEvent> {
        self.adapter_rx.recv().await
    }

    /// Applies every adapter report already queued. Returns how many there were.
    pub fn pump(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.adapter_rx.try_recv() {
            self.handle_adapter_event(event);
            handled += 1;
        }
        handled
    }

    pub fn handle_adapter_event(&mut self, event: AdapterEvent) {
        let Some(mounted) = &self.mounted else {
            debug!(adapter = %event.adapter, "Ignoring adapter event with nothing mounted");
            return;
        };
        if mounted.adapter.id() != event.adapter {
            debug!(adapter = %event.adapter, "Ignoring event from stale adapter");
            return;
        }

        match event.kind {
            AdapterEventKind::Ready { duration } => {
                self.snapshot.duration = duration;
                self.snapshot.is_muted = mounted.adapter.is_muted();
                self.emit(PlayerEvent::Ready { duration });
                // Flush whatever was asked for while the backend was loading.
                if self.state.is_playing {
                    self.with_adapter("play", |a| a.play());
                } else {
                    self.with_adapter("pause", |a| a.pause());
                }
            }
            AdapterEventKind::State(state) => {
                self.emit(PlayerEvent::BackendState(state));
                match state {
                    PlaybackEvent::Playing => {
                        if self.state.resume_video() {
                            self.publish();
                        }
                    }
                    PlaybackEvent::Paused => {
                        if self.state.pause_video() {
                            self.publish();
                        }
                    }
                    PlaybackEvent::Ended => self.on_ended(),
                }
            }
            AdapterEventKind::Progress(snapshot) => {
                self.snapshot = snapshot;
                self.emit(PlayerEvent::Progress(snapshot));
            }
            AdapterEventKind::Unavailable(reason) => {
                let video = mounted.video.clone();
                let external_url = video.external_url(&self.config);
                warn!(video = %video.id, error = %reason, "Showing thumbnail fallback");
                self.state.pause_video();
                self.publish();
                self.emit(PlayerEvent::Degraded {
                    video,
                    external_url,
                    reason,
                });
            }
        }
    }

    fn on_ended(&mut self) {
        self.state.pause_video();
        if self.state.preferences.auto_play_next {
            if let Some(next) = self.up_next.pop_front() {
                info!(next = %next.id, "Playback ended, playing next");
                self.play_video(next);
                return;
            }
        }
        info!("Playback ended with nothing queued, closing player");
        self.close_player();
    }

    // Internals

    fn mount(&mut self, video: VideoRef) {
        self.snapshot = PlaybackSnapshot::default();
        let mut adapter = self.factory.create(video.backend_kind);
        adapter.initialize(
            self.container.clone(),
            &video.backend_locator,
            self.adapter_tx.clone(),
        );
        debug!(adapter = %adapter.id(), video = %video.id, "Adapter mounted");
        self.mounted = Some(MountedAdapter { adapter, video });
    }

    fn unmount(&mut self) {
        if let Some(mut mounted) = self.mounted.take() {
            mounted.adapter.destroy();
            debug!(adapter = %mounted.adapter.id(), video = %mounted.video.id, "Adapter released");
        }
    }

    fn is_degraded(&self) -> bool {
        matches!(self.adapter_status(), Some(AdapterStatus::Unavailable(_)))
    }

    /// Runs a command on the mounted adapter; true if it went through.
    fn with_adapter(
        &self,
        command: &'static str,
        f: impl FnOnce(&dyn BackendAdapter) -> Result<(), PlayerError>,
    ) -> bool {
        let Some(mounted) = &self.mounted else {
            return false;
        };
        match f(mounted.adapter.as_ref()) {
            Ok(()) => true,
            Err(PlayerError::AdapterNotReady) => {
                debug!(command, "Adapter not ready, intent kept in session state");
                false
            }
            Err(e) if e.is_permanent() => {
                debug!(command, error = %e, "Adapter unavailable, command dropped");
                false
            }
            Err(e) => {
                warn!(command, error = %e, "Adapter command failed");
                false
            }
        }
    }

    fn publish(&self) {
        let state = &self.state;
        let _ = self.session_tx.send_if_modified(|published| {
            if published == state {
                return false;
            }
            published.clone_from(state);
            true
        });
    }

    fn emit(&self, event: PlayerEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}

impl fmt::Debug for FloatingPlayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FloatingPlayer")
            .field("state", &self.state)
            .field("snapshot", &self.snapshot)
            .field("adapter", &self.adapter_id())
            .field("policy", self.policy.state())
            .field("settings_open", &self.panel.is_some())
            .field("up_next", &self.up_next.len())
            .finish()
    }
}

impl Drop for FloatingPlayer {
    fn drop(&mut self) {
        self.unmount();
    }
}
