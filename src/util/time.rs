//! Time utilities for game simulation

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Get current Unix timestamp in milliseconds
pub fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_millis() as u64
}

/// Server start time for uptime tracking
static SERVER_START: std::sync::OnceLock<Instant> = std::sync::OnceLock::new();

/// Initialize server start time (call once at startup)
pub fn init_server_time() {
    SERVER_START.get_or_init(Instant::now);
}

/// Get server uptime in seconds
pub fn uptime_secs() -> u64 {
    SERVER_START
        .get()
        .map(|start| start.elapsed().as_secs())
        .unwrap_or(0)
}

/// Tick rate configuration
pub const SIMULATION_TPS: u32 = 60; // matches a 60 Hz display refresh
pub const TICK_DURATION_MICROS: u64 = 1_000_000 / SIMULATION_TPS as u64;

/// Longest frame the integrator will accept, in seconds
pub const MAX_FRAME_DELTA: f32 = 0.1;

/// Nominal delta time for one tick (in seconds)
pub fn tick_delta() -> f32 {
    1.0 / SIMULATION_TPS as f32
}

/// Measures the real time between frames so physics stays frame-rate independent.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Option<Instant>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self { last: None }
    }

    /// Seconds since the previous call, clamped to `(0, MAX_FRAME_DELTA]`.
    /// The first call returns the nominal tick delta.
    pub fn delta(&mut self) -> f32 {
        let now = Instant::now();
        match self.last.replace(now) {
            Some(prev) => clamp_delta(now.duration_since(prev).as_secs_f32()),
            None => tick_delta(),
        }
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Clamp a measured frame time into the range the integrator accepts.
pub fn clamp_delta(dt: f32) -> f32 {
    if dt.is_finite() && dt > 0.0 {
        dt.min(MAX_FRAME_DELTA)
    } else {
        tick_delta()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_delta_rejects_stalls_and_garbage() {
        assert_eq!(clamp_delta(5.0), MAX_FRAME_DELTA);
        assert_eq!(clamp_delta(-1.0), tick_delta());
        assert_eq!(clamp_delta(f32::NAN), tick_delta());
        assert_eq!(clamp_delta(0.02), 0.02);
    }

    #[test]
    fn first_frame_uses_nominal_delta() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.delta(), tick_delta());
        let second = clock.delta();
        assert!(second > 0.0 && second <= MAX_FRAME_DELTA);
    }
}
