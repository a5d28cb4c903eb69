use crate::config::Config;
use crate::geometry::{PlayerPosition, Viewport, WindowSize};
use crate::models::{DefaultSize, PlayerPreferences, PreferencesPatch, VideoRef};

const DOCK_MARGIN: f64 = 16.0;

/// Result of [`SessionState::play_video`], telling the shell whether an
/// adapter has to be (re)mounted.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayOutcome {
    /// Nothing was loaded before.
    Started,
    /// A different video was current; its adapter must be released first.
    Replaced(VideoRef),
    /// Same id as the current video; no re-trigger.
    AlreadyCurrent,
}

/// Single source of truth for the floating player.
///
/// Invariants held after every method:
/// - `is_playing` implies a current video and `show_player`.
/// - `position` keeps the whole window inside `viewport` for the size implied
///   by `is_minimized`.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub current_video: Option<VideoRef>,
    pub is_playing: bool,
    pub is_minimized: bool,
    pub show_player: bool,
    pub position: PlayerPosition,
    pub preferences: PlayerPreferences,
    pub viewport: Viewport,
    mini_size: WindowSize,
    expanded_size: WindowSize,
}

impl SessionState {
    pub fn new(preferences: PlayerPreferences, viewport: Viewport, config: &Config) -> Self {
        let is_minimized = preferences.default_size == DefaultSize::Mini;
        let size = config.window_size(is_minimized);
        Self {
            current_video: None,
            is_playing: false,
            is_minimized,
            show_player: false,
            position: viewport.docked(size, DOCK_MARGIN),
            preferences,
            viewport,
            mini_size: config.mini_size,
            expanded_size: config.expanded_size,
        }
    }

    pub fn window_size(&self) -> WindowSize {
        if self.is_minimized {
            self.mini_size
        } else {
            self.expanded_size
        }
    }

    pub fn current_video_id(&self) -> Option<&str> {
        self.current_video.as_ref().map(|v| v.id.as_str())
    }

    pub fn play_video(&mut self, video: VideoRef) -> PlayOutcome {
        if self.current_video_id() == Some(video.id.as_str()) {
            self.show_player = true;
            return PlayOutcome::AlreadyCurrent;
        }

        let previous = self.current_video.replace(video);
        let was_visible = self.show_player;
        self.show_player = true;
        self.is_playing = true;
        self.is_minimized = self.preferences.default_size == DefaultSize::Mini;
        if !was_visible {
            self.position = self.viewport.docked(self.window_size(), DOCK_MARGIN);
        }
        self.reclamp();

        match previous {
            Some(old) => PlayOutcome::Replaced(old),
            None => PlayOutcome::Started,
        }
    }

    /// Returns whether anything changed.
    pub fn pause_video(&mut self) -> bool {
        if self.current_video.is_none() || !self.is_playing {
            return false;
        }
        self.is_playing = false;
        true
    }

    /// Returns whether anything changed.
    pub fn resume_video(&mut self) -> bool {
        if self.current_video.is_none() || self.is_playing {
            return false;
        }
        self.show_player = true;
        self.is_playing = true;
        true
    }

    /// Returns the video that was loaded, if any.
    pub fn close_player(&mut self) -> Option<VideoRef> {
        self.is_playing = false;
        self.show_player = false;
        self.current_video.take()
    }

    pub fn toggle_minimize(&mut self) {
        self.is_minimized = !self.is_minimized;
        self.reclamp();
    }

    pub fn update_position(&mut self, position: PlayerPosition) {
        self.position = self.viewport.clamp(position, self.window_size());
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.reclamp();
    }

    pub fn update_preferences(&mut self, patch: PreferencesPatch) {
        self.preferences.merge(patch);
    }

    fn reclamp(&mut self) {
        self.position = self.viewport.clamp(self.position, self.window_size());
    }
}
