use std::time::{Duration, Instant};

use crate::config::Config;
use crate::geometry::{Point, PlayerPosition};

/// A pointer sample as delivered by the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub point: Point,
    pub at: Instant,
}

impl PointerEvent {
    pub fn new(x: f64, y: f64, at: Instant) -> Self {
        Self {
            point: Point::new(x, y),
            at,
        }
    }
}

/// Where on the window a pointer-down landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitRegion {
    /// The video surface; may start a drag or a click.
    Body,
    /// The control overlay; buttons handle their own clicks.
    Controls,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureKind {
    Click,
    Drag,
}

/// Limits under which a press-release counts as a click.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClickThresholds {
    pub max_elapsed: Duration,
    pub max_distance: f64,
}

impl From<&Config> for ClickThresholds {
    fn from(config: &Config) -> Self {
        Self {
            max_elapsed: config.click_max_elapsed,
            max_distance: config.click_max_distance,
        }
    }
}

/// One press on the window body, from pointer-down to pointer-up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragGesture {
    start: PointerEvent,
    origin: PlayerPosition,
}

impl DragGesture {
    pub fn begin(start: PointerEvent, origin: PlayerPosition) -> Self {
        Self { start, origin }
    }

    /// Window position when the press started.
    pub fn origin(&self) -> PlayerPosition {
        self.origin
    }

    /// Unclamped window position that follows the pointer.
    pub fn follow(&self, pointer: Point) -> PlayerPosition {
        PlayerPosition::new(
            self.origin.x + (pointer.x - self.start.point.x),
            self.origin.y + (pointer.y - self.start.point.y),
        )
    }

    pub fn classify(&self, end: PointerEvent, thresholds: ClickThresholds) -> GestureKind {
        let elapsed = end.at.saturating_duration_since(self.start.at);
        let distance = end.point.distance_to(self.start.point);
        if elapsed < thresholds.max_elapsed && distance < thresholds.max_distance {
            GestureKind::Click
        } else {
            GestureKind::Drag
        }
    }
}
