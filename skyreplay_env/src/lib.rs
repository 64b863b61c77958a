//! SkyReplay Environment Abstraction Layer
//!
//! Everything the playback driver needs from the outside world sits behind
//! a trait so the same loop runs in **real time** (tokio) and in
//! **simulation** (a virtual clock that advances instantly):
//! - Time (`now()`, `sleep()`)
//! - Dataset retrieval (`fetch()`)
//!
//! # Example
//!
//! ```ignore
//! use skyreplay_env::{PlaybackClock, DatasetSource};
//!
//! async fn drive<C: PlaybackClock, S: DatasetSource>(clock: &C, source: &S) {
//!     let bytes = source.fetch().await?;
//!     loop {
//!         clock.sleep(Duration::from_secs_f64(1.0 / 60.0)).await;
//!         tick();
//!     }
//! }
//! ```

mod clock;
mod error;
mod source;
mod tokio_impl;

pub use clock::PlaybackClock;
pub use error::EnvError;
pub use source::{DatasetSource, MemorySource};
pub use tokio_impl::{FileSource, TokioClock};
