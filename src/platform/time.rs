//! Frame clock
//!
//! Turns host timestamps (milliseconds) into clamped simulation deltas.

#[derive(Debug, Clone)]
pub struct FrameClock {
    last_ms: Option<f64>,
    max_delta: f32,
}

impl FrameClock {
    pub fn new(max_delta: f32) -> Self {
        Self {
            last_ms: None,
            max_delta,
        }
    }

    pub fn max_delta(&self) -> f32 {
        self.max_delta
    }

    /// Seconds since the previous call, clamped to `[0, max_delta]`.
    /// The first call after construction or `suspend` returns 0.
    pub fn tick(&mut self, now_ms: f64) -> f32 {
        let dt = match self.last_ms {
            Some(last) => ((now_ms - last) / 1000.0) as f32,
            None => 0.0,
        };
        self.last_ms = Some(now_ms);
        if dt.is_finite() {
            dt.clamp(0.0, self.max_delta)
        } else {
            0.0
        }
    }

    /// Forget the last timestamp so a resume never replays the gap
    pub fn suspend(&mut self) {
        self.last_ms = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_tick_is_zero() {
        let mut clock = FrameClock::new(0.1);
        assert_eq!(clock.tick(1000.0), 0.0);
        assert!((clock.tick(1016.0) - 0.016).abs() < 1e-6);
    }

    #[test]
    fn test_stall_is_clamped() {
        let mut clock = FrameClock::new(0.1);
        clock.tick(0.0);
        assert_eq!(clock.tick(5000.0), 0.1);
    }

    #[test]
    fn test_time_going_backwards() {
        let mut clock = FrameClock::new(0.1);
        clock.tick(500.0);
        assert_eq!(clock.tick(400.0), 0.0);
    }

    #[test]
    fn test_suspend_drops_gap() {
        let mut clock = FrameClock::new(0.1);
        clock.tick(0.0);
        clock.tick(16.0);
        clock.suspend();
        assert_eq!(clock.tick(60_000.0), 0.0);
        assert!((clock.tick(60_016.0) - 0.016).abs() < 1e-6);
    }
}
