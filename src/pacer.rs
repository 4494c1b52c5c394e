use std::time::Duration;

use rand::Rng;
use tokio::sync::Mutex;

/// Closed interval a pacing delay is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaceWindow {
    pub min: Duration,
    pub max: Duration,
}

impl PaceWindow {
    pub const ZERO: PaceWindow = PaceWindow {
        min: Duration::ZERO,
        max: Duration::ZERO,
    };

    /// Negative or non-finite inputs clamp to zero; a reversed pair is swapped.
    pub fn from_secs(min: f64, max: f64) -> PaceWindow {
        PaceWindow::new(to_duration(min), to_duration(max))
    }

    pub fn new(min: Duration, max: Duration) -> PaceWindow {
        if min <= max {
            PaceWindow { min, max }
        } else {
            PaceWindow { min: max, max: min }
        }
    }

    pub fn is_zero(&self) -> bool {
        self.max.is_zero()
    }

    /// Uniform draw from `[min, max]`.
    pub fn sample(&self) -> Duration {
        if self.min == self.max {
            return self.min;
        }
        let secs = rand::rng().random_range(self.min.as_secs_f64()..=self.max.as_secs_f64());
        Duration::from_secs_f64(secs).clamp(self.min, self.max)
    }
}

fn to_duration(secs: f64) -> Duration {
    if secs.is_finite() && secs > 0.0 {
        Duration::from_secs_f64(secs)
    } else {
        Duration::ZERO
    }
}

/// Politeness throttle. One instance per pipeline run; callers sharing an
/// instance wait their turn, so delays never overlap.
#[derive(Debug, Default)]
pub struct Pacer {
    gate: Mutex<()>,
}

impl Pacer {
    pub fn new() -> Pacer {
        Pacer::default()
    }

    /// Suspend the caller for a random duration inside `window`.
    pub async fn pace(&self, window: PaceWindow) {
        let _turn = self.gate.lock().await;
        if window.is_zero() {
            return;
        }
        let delay = window.sample();
        tracing::debug!(delay_ms = delay.as_millis() as u64, "pacing before request");
        tokio::time::sleep(delay).await;
    }
}
