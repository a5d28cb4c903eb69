use crate::error::BootstrapFailure;
use crate::models::{PlaybackSnapshot, PlayerPreferences, VideoRef};

/// Backend-initiated playback transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackEvent {
    Playing,
    Paused,
    Ended,
}

/// Outcomes offered by the pause-on-navigate confirmation surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptChoice {
    PauseNow,
    KeepPlaying,
    StopAsking,
}

// Event types broadcast to whoever renders the player
#[derive(Debug, Clone)]
pub enum PlayerEvent {
    /// Fresh progress numbers from the active adapter.
    Progress(PlaybackSnapshot),
    /// The backend reported a transition on its own.
    BackendState(PlaybackEvent),
    /// The adapter finished bootstrapping.
    Ready { duration: f64 },
    /// The embed can't be used; show the thumbnail and external link instead.
    Degraded {
        video: VideoRef,
        external_url: String,
        reason: BootstrapFailure,
    },
    /// Ask whether to pause because a reading route was entered.
    PausePrompt { route: String },
    PromptDismissed(PromptChoice),
    PreferencesSaved(PlayerPreferences),
    Closed,
}

impl PlayerEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            PlayerEvent::Progress(_) => "progress",
            PlayerEvent::BackendState(_) => "backendState",
            PlayerEvent::Ready { .. } => "ready",
            PlayerEvent::Degraded { .. } => "degraded",
            PlayerEvent::PausePrompt { .. } => "pausePrompt",
            PlayerEvent::PromptDismissed(_) => "promptDismissed",
            PlayerEvent::PreferencesSaved(_) => "preferencesSaved",
            PlayerEvent::Closed => "closed",
        }
    }

    /// If this event is a prompt, returns the route that triggered it.
    pub fn prompt_route(&self) -> Option<&str> {
        match self {
            PlayerEvent::PausePrompt { route } => Some(route),
            _ => None,
        }
    }
}
