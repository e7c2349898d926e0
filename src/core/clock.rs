//! High-resolution clock for frame timing.

use std::time::Instant;

/// A clock for measuring elapsed time and per-frame delta time.
pub struct Clock {
    /// Whether the clock is running.
    running: bool,
    /// Time of the last delta query in seconds.
    old_time: f64,
    /// Total elapsed time while running.
    elapsed_time: f64,
    /// Monotonic time source.
    instant: Option<Instant>,
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock {
    /// Create a new clock (not started).
    pub fn new() -> Self {
        Self {
            running: false,
            old_time: 0.0,
            elapsed_time: 0.0,
            instant: None,
        }
    }

    /// Create and start a new clock.
    pub fn start_new() -> Self {
        let mut clock = Self::new();
        clock.start();
        clock
    }

    /// Get the current time in seconds since start.
    fn now(&self) -> f64 {
        self.instant
            .map(|i| i.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }

    /// Start the clock.
    pub fn start(&mut self) {
        self.instant = Some(Instant::now());
        self.old_time = self.now();
        self.elapsed_time = 0.0;
        self.running = true;
    }

    /// Stop the clock.
    pub fn stop(&mut self) {
        self.get_elapsed_time();
        self.running = false;
    }

    /// Get the elapsed time since the clock started (in seconds).
    pub fn get_elapsed_time(&mut self) -> f64 {
        self.get_delta();
        self.elapsed_time
    }

    /// Get the time since the last call to get_delta (in seconds).
    pub fn get_delta(&mut self) -> f64 {
        if !self.running {
            self.start();
            return 0.0;
        }

        let new_time = self.now();
        let diff = new_time - self.old_time;
        self.old_time = new_time;
        self.elapsed_time += diff;

        diff
    }

    /// Check if the clock is running.
    #[inline]
    pub fn is_running(&self) -> bool {
        self.running
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_starts_stopped() {
        let clock = Clock::new();
        assert!(!clock.is_running());
    }

    #[test]
    fn test_clock_start() {
        let mut clock = Clock::new();
        clock.start();
        assert!(clock.is_running());
    }

    #[test]
    fn test_delta_accumulates_elapsed() {
        let mut clock = Clock::start_new();
        let d1 = clock.get_delta();
        let d2 = clock.get_delta();
        assert!(d1 >= 0.0 && d2 >= 0.0);
        assert!(clock.get_elapsed_time() >= d1 + d2);
    }
}
