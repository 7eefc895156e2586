//! Fixed-timestep frame loop implementing the "Fix Your Timestep" pattern.
//!
//! Decouples simulation (fixed tick rate) from rendering (variable rate)
//! using an accumulator. Provides interpolation alpha for smooth rendering
//! between simulation states.

use std::time::Instant;
use tracing::warn;

/// Maximum frame time clamp to prevent spiral of death.
/// If a frame takes longer than this, we clamp and accept slowdown
/// rather than trying to catch up with dozens of simulation steps.
pub const MAX_FRAME_TIME: f64 = 0.25; // 250ms = 4 FPS minimum

/// Fixed-timestep frame loop state.
///
/// Call [`tick`](Self::tick) once per frame to run simulation steps at a
/// fixed rate and render with interpolation.
pub struct FrameLoop {
    fixed_dt: f64,
    previous_time: Instant,
    accumulator: f64,
    total_sim_time: f64,
    frame_count: u64,
    update_count: u64,
}

impl FrameLoop {
    /// Creates a loop ticking simulation at `tick_rate` Hz, starting from
    /// the current instant.
    ///
    /// # Panics
    ///
    /// Panics if `tick_rate` is zero.
    pub fn new(tick_rate: u32) -> Self {
        assert!(tick_rate > 0, "tick rate must be positive");
        Self {
            fixed_dt: 1.0 / f64::from(tick_rate),
            previous_time: Instant::now(),
            accumulator: 0.0,
            total_sim_time: 0.0,
            frame_count: 0,
            update_count: 0,
        }
    }

    /// The fixed simulation step in seconds.
    pub fn fixed_dt(&self) -> f64 {
        self.fixed_dt
    }

    /// Runs one frame: measures elapsed time, runs fixed-rate simulation
    /// steps, then calls the render function with interpolation alpha.
    ///
    /// - `update_fn(fixed_dt, total_sim_time)` is called zero or more times
    ///   at the fixed rate.
    /// - `render_fn(alpha)` is called exactly once with the interpolation
    ///   alpha in `[0.0, 1.0)`.
    pub fn tick(&mut self, mut update_fn: impl FnMut(f64, f64), mut render_fn: impl FnMut(f64)) {
        let current_time = Instant::now();
        let mut frame_time = current_time
            .duration_since(self.previous_time)
            .as_secs_f64();
        self.previous_time = current_time;

        // Clamp frame time to prevent spiral of death
        if frame_time > MAX_FRAME_TIME {
            warn!(
                "frame time {:.1}ms exceeds maximum, clamping to {:.1}ms",
                frame_time * 1000.0,
                MAX_FRAME_TIME * 1000.0
            );
            frame_time = MAX_FRAME_TIME;
        }

        self.accumulator += frame_time;

        // Run simulation steps at fixed rate
        while self.accumulator >= self.fixed_dt {
            update_fn(self.fixed_dt, self.total_sim_time);
            self.total_sim_time += self.fixed_dt;
            self.accumulator -= self.fixed_dt;
            self.update_count += 1;
        }

        render_fn(self.alpha());
        self.frame_count += 1;
    }

    /// Returns the current interpolation alpha without running a tick.
    pub fn alpha(&self) -> f64 {
        if self.accumulator > 0.0 {
            self.accumulator / self.fixed_dt
        } else {
            0.0
        }
    }

    /// Returns the total number of frames rendered.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Returns the total number of simulation update steps executed.
    pub fn update_count(&self) -> u64 {
        self.update_count
    }

    /// Returns the total simulation time in seconds.
    pub fn total_sim_time(&self) -> f64 {
        self.total_sim_time
    }
}

/// A testable version of the frame loop that accepts explicit frame times
/// instead of measuring wall-clock time.
#[cfg(test)]
struct TestableFrameLoop {
    fixed_dt: f64,
    accumulator: f64,
    total_sim_time: f64,
    frame_count: u64,
    update_count: u64,
}

#[cfg(test)]
impl TestableFrameLoop {
    fn new(tick_rate: u32) -> Self {
        Self {
            fixed_dt: 1.0 / f64::from(tick_rate),
            accumulator: 0.0,
            total_sim_time: 0.0,
            frame_count: 0,
            update_count: 0,
        }
    }

    /// Tick with an explicit frame time (in seconds).
    fn tick(
        &mut self,
        frame_time: f64,
        mut update_fn: impl FnMut(f64, f64),
        mut render_fn: impl FnMut(f64),
    ) {
        let clamped = if frame_time > MAX_FRAME_TIME {
            MAX_FRAME_TIME
        } else {
            frame_time
        };

        self.accumulator += clamped;

        while self.accumulator >= self.fixed_dt {
            update_fn(self.fixed_dt, self.total_sim_time);
            self.total_sim_time += self.fixed_dt;
            self.accumulator -= self.fixed_dt;
            self.update_count += 1;
        }

        let alpha = if self.accumulator > 0.0 {
            self.accumulator / self.fixed_dt
        } else {
            0.0
        };

        render_fn(alpha);
        self.frame_count += 1;
    }
}
