//! Time management utilities

use std::time::Instant;

/// High-precision timer for host frame loops
pub struct Timer {
    last_frame: Instant,
    delta_time: f32,
    total_time: f32,
    frame_count: u64,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    /// Create a new timer
    pub fn new() -> Self {
        Self {
            last_frame: Instant::now(),
            delta_time: 0.0,
            total_time: 0.0,
            frame_count: 0,
        }
    }

    /// Update the timer (should be called once per frame)
    pub fn update(&mut self) {
        let now = Instant::now();
        self.delta_time = now.duration_since(self.last_frame).as_secs_f32();
        self.total_time += self.delta_time;
        self.last_frame = now;
        self.frame_count += 1;
    }

    /// Get the time since the last frame in seconds
    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    /// Get the total elapsed time since timer creation
    pub fn total_time(&self) -> f32 {
        self.total_time
    }

    /// Get the current frame count
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

/// Converts variable frame deltas into zero or more fixed simulation steps
///
/// Frame time is accumulated; each call to [`FixedStepAccumulator::step`]
/// consumes one fixed step's worth when available. Leftover time carries
/// over to the next frame, keeping the simulation deterministic regardless
/// of render frame rate.
#[derive(Debug, Clone)]
pub struct FixedStepAccumulator {
    fixed_step: f32,
    accumulator: f32,
}

impl FixedStepAccumulator {
    /// Create an accumulator with the given fixed step in seconds
    pub fn new(fixed_step: f32) -> Self {
        Self {
            fixed_step,
            accumulator: 0.0,
        }
    }

    /// Add elapsed real time to the accumulator
    pub fn accumulate(&mut self, delta: f32) {
        self.accumulator += delta;
    }

    /// Consume one fixed step if enough time has accumulated
    pub fn step(&mut self) -> bool {
        if self.accumulator >= self.fixed_step {
            self.accumulator -= self.fixed_step;
            true
        } else {
            false
        }
    }

    /// The fixed step size in seconds
    pub fn fixed_step(&self) -> f32 {
        self.fixed_step
    }

    /// Time currently buffered but not yet consumed
    pub fn remainder(&self) -> f32 {
        self.accumulator
    }

    /// Discard any buffered time
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}
