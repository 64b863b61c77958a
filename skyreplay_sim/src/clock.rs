//! Virtual playback clock for deterministic runs.

use async_trait::async_trait;
use skyreplay_env::PlaybackClock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Clock backed by a virtual nanosecond counter.
///
/// `sleep` advances the counter and returns immediately, so a ten minute
/// playback runs as fast as the engine allows and always produces the same
/// ticks. Clones share the same counter.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    /// Current virtual time (nanoseconds since creation)
    virtual_time_ns: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an Arc-wrapped clock for sharing.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Advances virtual time by the given duration.
    pub fn advance_time(&self, duration: Duration) {
        self.virtual_time_ns
            .fetch_add(duration.as_nanos() as u64, Ordering::SeqCst);
    }

    /// Sets the virtual time to a specific value.
    pub fn set_time(&self, time_ns: u64) {
        self.virtual_time_ns.store(time_ns, Ordering::SeqCst);
    }

    pub fn time_ns(&self) -> u64 {
        self.virtual_time_ns.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PlaybackClock for ManualClock {
    fn now(&self) -> Duration {
        Duration::from_nanos(self.time_ns())
    }

    async fn sleep(&self, duration: Duration) {
        self.advance_time(duration);
    }

    fn is_realtime(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_time() {
        let clock = ManualClock::new();
        assert_eq!(clock.now(), Duration::ZERO);

        clock.advance_time(Duration::from_secs(1));
        assert_eq!(clock.now(), Duration::from_secs(1));

        clock.advance_time(Duration::from_millis(500));
        assert_eq!(clock.now(), Duration::from_millis(1500));

        clock.set_time(0);
        assert_eq!(clock.now(), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_manual_clock_sleep_advances_instantly() {
        let clock = ManualClock::new();
        clock.sleep(Duration::from_secs(3600)).await;
        assert_eq!(clock.now(), Duration::from_secs(3600));
        assert!(!clock.is_realtime());
    }

    #[test]
    fn test_manual_clock_clone_shares_time() {
        let clock1 = ManualClock::new();
        let clock2 = clock1.clone();

        clock1.advance_time(Duration::from_secs(5));

        // Both should see the same time
        assert_eq!(clock1.now(), clock2.now());
    }
}
