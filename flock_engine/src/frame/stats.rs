/// Frame timing
///
/// `FrameStats` tracks frame time and fps for the log. `SlotClock` hands each
/// compute dispatch the time elapsed since the same slot last advanced its
/// own copy of the simulation buffers.

use std::time::{Duration, Instant};

use crate::frame::slot::{FrameSlot, PerSlot};
use crate::{engine_debug, engine_info};

/// Largest simulation step handed to a dispatch, in seconds
pub const MAX_SIMULATION_STEP: f32 = 0.1;

// ===== FRAME STATS =====

#[derive(Debug, Clone)]
pub struct FrameStats {
    last_frame: Option<Instant>,
    window_start: Option<Instant>,
    window_frames: u32,
    window_time: Duration,
    average_frame_ms: f32,
    fps: f32,
    total_frames: u64,
}

impl FrameStats {
    pub fn new() -> Self {
        Self {
            last_frame: None,
            window_start: None,
            window_frames: 0,
            window_time: Duration::ZERO,
            average_frame_ms: 0.0,
            fps: 0.0,
            total_frames: 0,
        }
    }

    /// Record a frame ending at `now`; returns its duration in seconds
    pub fn tick(&mut self, now: Instant) -> f32 {
        self.total_frames += 1;
        let window_start = *self.window_start.get_or_insert(now);

        let dt = match self.last_frame.replace(now) {
            Some(previous) => now.saturating_duration_since(previous),
            None => return 0.0,
        };

        self.window_frames += 1;
        self.window_time += dt;
        engine_debug!("flock::frame", "Frame {} took {:.3} ms", self.total_frames, dt.as_secs_f64() * 1000.0);

        let elapsed = now.saturating_duration_since(window_start);
        if elapsed >= Duration::from_secs(1) {
            self.average_frame_ms = self.window_time.as_secs_f32() * 1000.0 / self.window_frames as f32;
            self.fps = self.window_frames as f32 / elapsed.as_secs_f32();
            engine_info!("flock::frame", "{:.1} fps ({:.3} ms/frame)", self.fps, self.average_frame_ms);

            self.window_start = Some(now);
            self.window_frames = 0;
            self.window_time = Duration::ZERO;
        }

        dt.as_secs_f32()
    }

    /// Average frame time over the last completed one-second window
    pub fn average_frame_ms(&self) -> f32 {
        self.average_frame_ms
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }

    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }
}

impl Default for FrameStats {
    fn default() -> Self {
        Self::new()
    }
}

// ===== SLOT CLOCK =====

/// Per-slot simulation clock
#[derive(Debug, Clone)]
pub struct SlotClock {
    last_dispatch: PerSlot<Instant>,
}

impl SlotClock {
    /// Every slot starts at `start`, the moment the buffers were seeded
    pub fn new(start: Instant) -> Self {
        Self {
            last_dispatch: PerSlot::from_fn(|_| start),
        }
    }

    /// Seconds since `slot` last dispatched, clamped to [`MAX_SIMULATION_STEP`]
    pub fn advance(&mut self, slot: FrameSlot, now: Instant) -> f32 {
        let last = self.last_dispatch.get_mut(slot);
        let dt = now.saturating_duration_since(*last).as_secs_f32();
        *last = now;
        dt.min(MAX_SIMULATION_STEP)
    }
}

#[cfg(test)]
#[path = "stats_tests.rs"]
mod tests;
