use tokio::time::Instant;
use tracing::debug;

/// Consecutive rejected samples after which the backend's numbers are trusted again.
const MAX_REJECTED: u32 = 3;

/// Filters progress samples that can't be right given elapsed wall-clock time,
/// e.g. a stalled backend returning stale or garbage positions.
#[derive(Debug)]
pub(crate) struct ProgressGuard {
    anchor: Option<(f64, Instant)>,
    slack: f64,
    rejected: u32,
}

impl ProgressGuard {
    pub(crate) fn new(slack: f64) -> Self {
        Self {
            anchor: None,
            slack,
            rejected: 0,
        }
    }

    /// Forget the last sample; the next one is taken as-is (e.g. after a seek).
    pub(crate) fn reanchor(&mut self) {
        self.anchor = None;
        self.rejected = 0;
    }

    pub(crate) fn accept(&mut self, current_time: f64, duration: f64, now: Instant) -> bool {
        if !current_time.is_finite() || current_time < 0.0 {
            return self.reject(current_time, "negative or non-finite position");
        }
        if duration.is_finite() && duration > 0.0 && current_time > duration + 0.5 {
            return self.reject(current_time, "position past duration");
        }
        if let Some((last_time, last_at)) = self.anchor {
            let elapsed = now.saturating_duration_since(last_at).as_secs_f64();
            if current_time - last_time > elapsed + self.slack && self.rejected < MAX_REJECTED {
                return self.reject(current_time, "position ran ahead of wall clock");
            }
        }
        self.anchor = Some((current_time, now));
        self.rejected = 0;
        true
    }

    fn reject(&mut self, current_time: f64, why: &'static str) -> bool {
        self.rejected += 1;
        debug!(current_time, why, rejected = self.rejected, "Discarding progress sample");
        false
    }
}
