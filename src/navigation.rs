//! Pause-on-navigate policy.
//!
//! Fires only on a route change *into* a reading route (an article page and
//! the like) while a video is playing. What happens then depends on the
//! user's [`PauseBehavior`].

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use crate::error::PlayerError;
use crate::events::PromptChoice;
use crate::models::PauseBehavior;
use crate::session::SessionState;

pub const DEFAULT_READING_ROUTE_PATTERN: &str = r"^/(articles?|news|posts?)/[^/]+/?$";

lazy_static! {
    static ref DEFAULT_READING_ROUTE: Regex = Regex::new(DEFAULT_READING_ROUTE_PATTERN).unwrap();
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyState {
    Idle,
    Prompting { route: String },
}

/// What the shell should do after a navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationDecision {
    Ignore,
    Pause,
    Prompt,
}

#[derive(Debug, Clone)]
pub struct NavigationPausePolicy {
    reading_route: Regex,
    previous_route: Option<String>,
    state: PolicyState,
}

impl Default for NavigationPausePolicy {
    fn default() -> Self {
        Self::with_regex(DEFAULT_READING_ROUTE.clone())
    }
}

impl NavigationPausePolicy {
    pub fn new(pattern: &str) -> Result<Self, PlayerError> {
        Ok(Self::with_regex(Regex::new(pattern)?))
    }

    fn with_regex(reading_route: Regex) -> Self {
        Self {
            reading_route,
            previous_route: None,
            state: PolicyState::Idle,
        }
    }

    pub fn state(&self) -> &PolicyState {
        &self.state
    }

    pub fn is_prompting(&self) -> bool {
        matches!(self.state, PolicyState::Prompting { .. })
    }

    pub fn is_reading_route(&self, route: &str) -> bool {
        self.reading_route.is_match(route_path(route))
    }

    pub fn on_navigate(&mut self, route: &str, session: &SessionState) -> NavigationDecision {
        let path = route_path(route).to_string();
        let changed = self.previous_route.as_deref() != Some(path.as_str());
        self.previous_route = Some(path.clone());

        if !changed || !session.is_playing || !self.reading_route.is_match(&path) {
            return NavigationDecision::Ignore;
        }
        if self.is_prompting() {
            // Already asking; one prompt at a time.
            return NavigationDecision::Ignore;
        }

        match session.preferences.pause_behavior {
            PauseBehavior::AutoPause => {
                debug!(route = %path, "Auto-pausing for reading route");
                NavigationDecision::Pause
            }
            PauseBehavior::AlwaysAsk => {
                debug!(route = %path, "Prompting before pausing for reading route");
                self.state = PolicyState::Prompting { route: path };
                NavigationDecision::Prompt
            }
            PauseBehavior::NeverPause => NavigationDecision::Ignore,
        }
    }

    /// Closes the prompt with the user's answer. `None` if no prompt was open.
    pub fn resolve(&mut self, choice: PromptChoice) -> Option<PromptChoice> {
        if !self.is_prompting() {
            return None;
        }
        self.state = PolicyState::Idle;
        Some(choice)
    }

    /// Drops an open prompt without an answer (e.g. the player was closed).
    pub fn dismiss(&mut self) -> bool {
        let was_prompting = self.is_prompting();
        self.state = PolicyState::Idle;
        was_prompting
    }
}

/// Path portion of a route, without query string or fragment.
fn route_path(route: &str) -> &str {
    let end = route.find(['?', '#']).unwrap_or(route.len());
    &route[..end]
}
