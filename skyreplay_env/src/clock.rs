//! Playback clock trait.

use async_trait::async_trait;
use std::time::Duration;

/// The time source driving playback.
///
/// # Implementations
///
/// - **Real time**: `TokioClock` - wraps `tokio::time`
/// - **Simulation**: `ManualClock` (skyreplay_sim) - virtual time, `sleep`
///   returns immediately after advancing it
#[async_trait]
pub trait PlaybackClock: Send + Sync + 'static {
    /// Monotonic time since the clock was created.
    fn now(&self) -> Duration;

    /// Suspends until `duration` has passed on this clock.
    ///
    /// The playback loop awaits this once per frame; it is the only point
    /// where a tick yields.
    async fn sleep(&self, duration: Duration);

    /// True if `sleep` tracks wall-clock time.
    fn is_realtime(&self) -> bool;
}
