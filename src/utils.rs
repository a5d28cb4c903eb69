use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Locks a mutex, recovering the data if a previous holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Helper to calculate backoff delay with jitter
pub(crate) fn calculate_backoff_delay(base_backoff: Duration) -> Duration {
    let jitter_factor = rand::random::<f32>() * 0.6 - 0.3; // -0.3 to +0.3
    let jitter = base_backoff.mul_f32(jitter_factor.abs());
    if jitter_factor >= 0.0 {
        base_backoff + jitter
    } else {
        base_backoff.saturating_sub(jitter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_stays_within_jitter_band() {
        let base = Duration::from_millis(1000);
        for _ in 0..200 {
            let d = calculate_backoff_delay(base);
            assert!(d >= Duration::from_millis(700) && d <= Duration::from_millis(1300));
        }
    }
}
