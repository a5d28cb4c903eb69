use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::Config;

/// Which external embed backend plays a video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BackendKind {
    StreamEmbed,
    SocialEmbed,
}

impl BackendKind {
    pub fn as_str(self) -> &'static str {
        match self {
            BackendKind::StreamEmbed => "streamEmbed",
            BackendKind::SocialEmbed => "socialEmbed",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies a playable video. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoRef {
    pub id: String,
    pub title: String,
    pub backend_kind: BackendKind,
    /// Channel name for stream embeds, video URL for social embeds.
    pub backend_locator: String,
    pub thumbnail_url: String,
}

impl VideoRef {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        backend_kind: BackendKind,
        backend_locator: impl Into<String>,
        thumbnail_url: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            backend_kind,
            backend_locator: backend_locator.into(),
            thumbnail_url: thumbnail_url.into(),
        }
    }

    /// Where the "open externally" affordance points when the embed is unavailable.
    pub fn external_url(&self, config: &Config) -> String {
        match self.backend_kind {
            BackendKind::StreamEmbed => format!(
                "{}{}",
                config.stream_watch_url_base,
                self.backend_locator.trim_start_matches('/')
            ),
            BackendKind::SocialEmbed => self.backend_locator.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PauseBehavior {
    #[default]
    AlwaysAsk,
    AutoPause,
    NeverPause,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DefaultSize {
    #[default]
    Mini,
    Expanded,
}

/// Persisted user choices. Round-trips as `{pauseBehavior, defaultSize, autoPlayNext}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerPreferences {
    pub pause_behavior: PauseBehavior,
    pub default_size: DefaultSize,
    pub auto_play_next: bool,
}

impl PlayerPreferences {
    pub fn merge(&mut self, patch: PreferencesPatch) {
        if let Some(pause_behavior) = patch.pause_behavior {
            self.pause_behavior = pause_behavior;
        }
        if let Some(default_size) = patch.default_size {
            self.default_size = default_size;
        }
        if let Some(auto_play_next) = patch.auto_play_next {
            self.auto_play_next = auto_play_next;
        }
    }
}

/// Partial update for [`PlayerPreferences`]; `None` fields are left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PreferencesPatch {
    pub pause_behavior: Option<PauseBehavior>,
    pub default_size: Option<DefaultSize>,
    pub auto_play_next: Option<bool>,
}

impl PreferencesPatch {
    pub fn pause_behavior(pause_behavior: PauseBehavior) -> Self {
        Self {
            pause_behavior: Some(pause_behavior),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pause_behavior.is_none() && self.default_size.is_none() && self.auto_play_next.is_none()
    }
}

/// Adapter-reported progress; transient.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PlaybackSnapshot {
    pub current_time: f64,
    pub duration: f64,
    pub is_muted: bool,
}

impl PlaybackSnapshot {
    /// Progress through the video in `[0, 1]`, zero when the duration is unknown.
    pub fn progress(&self) -> f64 {
        if self.duration > 0.0 {
            (self.current_time / self.duration).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preferences_json_shape() {
        let prefs = PlayerPreferences {
            pause_behavior: PauseBehavior::AutoPause,
            default_size: DefaultSize::Expanded,
            auto_play_next: true,
        };
        let json = serde_json::to_value(prefs).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "pauseBehavior": "autoPause",
                "defaultSize": "expanded",
                "autoPlayNext": true
            })
        );
    }

    #[test]
    fn merge_only_touches_patched_fields() {
        let mut prefs = PlayerPreferences::default();
        prefs.merge(PreferencesPatch {
            auto_play_next: Some(true),
            ..PreferencesPatch::default()
        });
        assert_eq!(prefs.pause_behavior, PauseBehavior::AlwaysAsk);
        assert_eq!(prefs.default_size, DefaultSize::Mini);
        assert!(prefs.auto_play_next);
    }

    #[test]
    fn external_url_per_backend() {
        let config = Config::default();
        let stream = VideoRef::new("1", "Live", BackendKind::StreamEmbed, "newsroom", "t.jpg");
        assert_eq!(stream.external_url(&config), "https://www.twitch.tv/newsroom");

        let social = VideoRef::new(
            "2",
            "Clip",
            BackendKind::SocialEmbed,
            "https://www.facebook.com/page/videos/42",
            "t.jpg",
        );
        assert_eq!(
            social.external_url(&config),
            "https://www.facebook.com/page/videos/42"
        );
    }
}
