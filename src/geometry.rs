use serde::{Deserialize, Serialize};

/// Top-left corner of the floating window, in viewport pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PlayerPosition {
    pub x: f64,
    pub y: f64,
}

impl PlayerPosition {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A pointer location in viewport pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowSize {
    pub width: f64,
    pub height: f64,
}

impl WindowSize {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Largest allowed top-left corner for a window of `size`. Zero on an axis
    /// where the window does not fit at all.
    pub fn max_origin(&self, size: WindowSize) -> PlayerPosition {
        PlayerPosition {
            x: (self.width - size.width).max(0.0),
            y: (self.height - size.height).max(0.0),
        }
    }

    /// Keeps the full window footprint on screen.
    pub fn clamp(&self, position: PlayerPosition, size: WindowSize) -> PlayerPosition {
        let max = self.max_origin(size);
        PlayerPosition {
            x: sanitize(position.x).clamp(0.0, max.x),
            y: sanitize(position.y).clamp(0.0, max.y),
        }
    }

    pub fn contains(&self, position: PlayerPosition, size: WindowSize) -> bool {
        let max = self.max_origin(size);
        (0.0..=max.x).contains(&position.x) && (0.0..=max.y).contains(&position.y)
    }

    /// Bottom-right resting spot, inset by `margin` where space allows.
    pub fn docked(&self, size: WindowSize, margin: f64) -> PlayerPosition {
        let max = self.max_origin(size);
        self.clamp(
            PlayerPosition::new(max.x - margin, max.y - margin),
            size,
        )
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0, 720.0)
    }
}

fn sanitize(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_into_viewport() {
        let vp = Viewport::new(800.0, 600.0);
        let size = WindowSize::new(320.0, 180.0);
        let p = vp.clamp(PlayerPosition::new(700.0, -20.0), size);
        assert_eq!(p, PlayerPosition::new(480.0, 0.0));
        assert!(vp.contains(p, size));
    }

    #[test]
    fn oversized_window_pins_to_origin() {
        let vp = Viewport::new(200.0, 100.0);
        let p = vp.clamp(PlayerPosition::new(50.0, 50.0), WindowSize::new(320.0, 180.0));
        assert_eq!(p, PlayerPosition::new(0.0, 0.0));
    }

    #[test]
    fn non_finite_coordinates_collapse_to_zero() {
        let vp = Viewport::new(800.0, 600.0);
        let p = vp.clamp(
            PlayerPosition::new(f64::NAN, f64::INFINITY),
            WindowSize::new(100.0, 100.0),
        );
        assert_eq!(p, PlayerPosition::new(0.0, 0.0));
    }
}
