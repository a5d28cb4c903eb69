use once_cell::sync::Lazy;
use std::{env, time::Duration};

use crate::geometry::WindowSize;
use crate::navigation::DEFAULT_READING_ROUTE_PATTERN;

/// Holds all tunables, read-once from ENV with fallbacks.
#[derive(Debug, Clone)]
pub struct Config {
    /// A pointer gesture shorter than this may count as a click.
    pub click_max_elapsed: Duration,
    /// A pointer gesture travelling less than this (px) may count as a click.
    pub click_max_distance: f64,
    /// Cadence of the social-embed progress poll.
    pub poll_interval: Duration,
    pub bootstrap_poll_interval: Duration,
    pub bootstrap_max_attempts: u32,
    pub inject_max_retries: u32,
    pub inject_backoff: Duration,
    pub mini_size: WindowSize,
    pub expanded_size: WindowSize,
    /// Seconds moved per arrow key press.
    pub seek_step: f64,
    pub storage_key: String,
    pub reading_route_pattern: String,
    pub stream_sdk_url: String,
    pub social_sdk_url: String,
    pub stream_watch_url_base: String,
    pub event_buffer_capacity: usize,
    /// Extra seconds a poll sample may run ahead of wall-clock time.
    pub desync_slack: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            click_max_elapsed: Duration::from_millis(200),
            click_max_distance: 5.0,
            poll_interval: Duration::from_secs(1),
            bootstrap_poll_interval: Duration::from_millis(100),
            bootstrap_max_attempts: 50,
            inject_max_retries: 3,
            inject_backoff: Duration::from_millis(500),
            mini_size: WindowSize::new(320.0, 180.0),
            expanded_size: WindowSize::new(560.0, 315.0),
            seek_step: 5.0,
            storage_key: "floating-player.preferences".to_string(),
            reading_route_pattern: DEFAULT_READING_ROUTE_PATTERN.to_string(),
            stream_sdk_url: "https://player.twitch.tv/js/embed/v1.js".to_string(),
            social_sdk_url: "https://connect.facebook.net/en_US/sdk.js".to_string(),
            stream_watch_url_base: "https://www.twitch.tv/".to_string(),
            event_buffer_capacity: 100,
            desync_slack: 2.0,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        // optionally load .env
        let _ = dotenvy::dotenv();

        fn parse_millis(var: &str, default: Duration) -> Duration {
            env::var(var)
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_millis)
                .unwrap_or(default)
        }

        fn parse_num<T: std::str::FromStr>(var: &str, default: T) -> T {
            env::var(var)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default)
        }

        fn parse_string(var: &str, default: String) -> String {
            env::var(var).ok().filter(|v| !v.is_empty()).unwrap_or(default)
        }

        let d = Self::default();
        Config {
            click_max_elapsed: parse_millis("PLAYER_CLICK_MAX_MS", d.click_max_elapsed),
            click_max_distance: parse_num("PLAYER_CLICK_MAX_PX", d.click_max_distance),
            poll_interval: parse_millis("PLAYER_POLL_INTERVAL_MS", d.poll_interval),
            bootstrap_poll_interval: parse_millis(
                "PLAYER_BOOTSTRAP_POLL_MS",
                d.bootstrap_poll_interval,
            ),
            bootstrap_max_attempts: parse_num(
                "PLAYER_BOOTSTRAP_MAX_ATTEMPTS",
                d.bootstrap_max_attempts,
            ),
            inject_max_retries: parse_num("PLAYER_INJECT_MAX_RETRIES", d.inject_max_retries),
            inject_backoff: parse_millis("PLAYER_INJECT_BACKOFF_MS", d.inject_backoff),
            mini_size: d.mini_size,
            expanded_size: d.expanded_size,
            seek_step: parse_num("PLAYER_SEEK_STEP_SECS", d.seek_step),
            storage_key: parse_string("PLAYER_STORAGE_KEY", d.storage_key),
            reading_route_pattern: parse_string(
                "PLAYER_READING_ROUTE_PATTERN",
                d.reading_route_pattern,
            ),
            stream_sdk_url: parse_string("PLAYER_STREAM_SDK_URL", d.stream_sdk_url),
            social_sdk_url: parse_string("PLAYER_SOCIAL_SDK_URL", d.social_sdk_url),
            stream_watch_url_base: parse_string(
                "PLAYER_STREAM_WATCH_URL_BASE",
                d.stream_watch_url_base,
            ),
            event_buffer_capacity: parse_num(
                "PLAYER_EVENT_BUFFER_CAPACITY",
                d.event_buffer_capacity,
            ),
            desync_slack: parse_num("PLAYER_DESYNC_SLACK_SECS", d.desync_slack),
        }
    }

    /// Window footprint for the given minimized flag.
    pub fn window_size(&self, minimized: bool) -> WindowSize {
        if minimized {
            self.mini_size
        } else {
            self.expanded_size
        }
    }
}

/// Global config instance
pub static CONFIG: Lazy<Config> = Lazy::new(Config::from_env);
