//! Frame timing

use std::time::Instant;

/// Per-frame timer
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
    /// Timer starting now
    pub fn new() -> Self {
        Self {
            last_frame: Instant::now(),
            delta_time: 0.0,
            total_time: 0.0,
            frame_count: 0,
        }
    }

    /// Advance by one frame
    pub fn update(&mut self) {
        let now = Instant::now();
        self.tick(now.duration_since(self.last_frame).as_secs_f32());
        self.last_frame = now;
    }

    fn tick(&mut self, delta: f32) {
        self.delta_time = delta;
        self.total_time += delta;
        self.frame_count += 1;
    }

    /// Seconds spent in the last frame
    pub const fn delta_time(&self) -> f32 {
        self.delta_time
    }

    /// Seconds accumulated over all frames
    pub const fn total_time(&self) -> f32 {
        self.total_time
    }

    /// Frames counted so far
    pub const fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Mean frames per second since creation
    #[allow(clippy::cast_precision_loss)]
    pub fn average_fps(&self) -> f32 {
        if self.total_time > 0.0 {
            self.frame_count as f32 / self.total_time
        } else {
            0.0
        }
    }
}
