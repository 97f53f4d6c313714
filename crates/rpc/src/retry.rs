use std::time::Duration;

use rand::Rng;

/// Default retry budget for RPC operations (spec §4.6/§6).
pub const MAX_RETRIES_RPC: u32 = 8;

/// Default retry budget for pool/swarm fetches (spec §6).
pub const MAX_RETRIES_FETCH: u32 = 4;

/// Doubling backoff with jitter, grounded on the reference pack's
/// `ExponentialBackoff` pattern (used there to drive an HTTP client's own
/// retry loop, same shape reused here).
pub struct Backoff {
    initial: Duration,
    max: Duration,
    factor: f64,
    attempt: u32,
}

impl Backoff {
    pub fn new(initial: Duration, max: Duration, factor: f64) -> Self {
        Self {
            initial,
            max,
            factor,
            attempt: 0,
        }
    }

    /// Default curve: 200ms initial, 5s cap, factor 2.0.
    pub fn default_curve() -> Self {
        Self::new(Duration::from_millis(200), Duration::from_secs(5), 2.0)
    }

    fn next_duration(&mut self) -> Duration {
        let scaled = self.initial.as_secs_f64() * self.factor.powi(self.attempt as i32);
        self.attempt += 1;
        let capped = scaled.min(self.max.as_secs_f64());
        let jittered = capped * rand::thread_rng().gen_range(0.5..1.0);
        Duration::from_secs_f64(jittered)
    }

    pub async fn sleep_next(&mut self) {
        tokio::time::sleep(self.next_duration()).await;
    }

    pub fn reset(&mut self) {
        self.attempt = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn durations_grow_until_capped() {
        let mut backoff = Backoff::new(Duration::from_millis(100), Duration::from_secs(1), 2.0);
        let mut last = Duration::ZERO;
        for _ in 0..10 {
            let d = backoff.next_duration();
            assert!(d <= Duration::from_secs(1));
            last = d;
        }
        assert!(last <= Duration::from_secs(1));
    }

    #[test]
    fn reset_restarts_the_curve() {
        let mut backoff = Backoff::new(Duration::from_millis(100), Duration::from_secs(10), 2.0);
        backoff.next_duration();
        backoff.next_duration();
        backoff.reset();
        assert_eq!(backoff.attempt, 0);
    }
}
