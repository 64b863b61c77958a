//! Interpolator - continuous position from discrete waypoints.
//!
//! For a query time `t` the bracketing pair is found from
//! `query_frame = floor(t * frame_rate)`: `k` is the first waypoint whose
//! frame is strictly greater than `query_frame`. Queries before the first
//! waypoint (`k == 0`) and at or past the last one (no such `k`) resolve to
//! `None`, so the drone is neither drawn nor analyzed on that tick.

use crate::skyreplay_timeline::{AgentTimeline, TimelineStore};
use nalgebra::Vector3;

/// Interpolated, scaled position of `timeline` at `time_secs`.
pub fn position_at(
    timeline: &AgentTimeline,
    time_secs: f64,
    frame_rate: f64,
    scale_factor: f64,
) -> Option<Vector3<f64>> {
    let waypoints = timeline.waypoints();
    let exact_frame = time_secs * frame_rate;
    let query_frame = exact_frame.floor();

    // Frames are sorted, so this is the first index with frame > query_frame.
    // A NaN query compares false everywhere and lands on k == 0.
    let k = waypoints.partition_point(|wp| wp.frame as f64 <= query_frame);
    if k == 0 || k == waypoints.len() {
        return None;
    }

    let from = &waypoints[k - 1];
    let to = &waypoints[k];
    let t = (exact_frame - from.frame as f64) / (to.frame - from.frame) as f64;

    let raw = from.position + (to.position - from.position) * t;
    Some(raw * scale_factor)
}

/// Interpolator bound to one store's frame rate and scale.
#[derive(Debug, Clone, Copy)]
pub struct Interpolator {
    frame_rate: f64,
    scale_factor: f64,
}

impl Interpolator {
    pub fn new(frame_rate: f64, scale_factor: f64) -> Self {
        Self {
            frame_rate,
            scale_factor,
        }
    }

    pub fn for_store(store: &TimelineStore) -> Self {
        Self::new(store.frame_rate(), store.scale_factor())
    }

    pub fn position_at(&self, timeline: &AgentTimeline, time_secs: f64) -> Option<Vector3<f64>> {
        position_at(timeline, time_secs, self.frame_rate, self.scale_factor)
    }
}
