/// Turns an irregular stream of host timestamps into fixed-period ticks.
///
/// Timestamps are milliseconds, the period is seconds.
#[derive(Debug, Clone)]
pub struct FrameClock {
    period_seconds: f64,
    last_tick_ms: Option<f64>,
    frame_count: u64,
}

impl FrameClock {
    pub fn new(period_seconds: f64) -> Self {
        Self {
            period_seconds,
            last_tick_ms: None,
            frame_count: 0,
        }
    }

    pub fn period_seconds(&self) -> f64 {
        self.period_seconds
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn last_tick_ms(&self) -> Option<f64> {
        self.last_tick_ms
    }

    /// Decide whether the host callback at `timestamp_ms` is an accepted frame.
    ///
    /// The first call always is, since there is nothing to measure against.
    /// A timestamp that goes backwards yields a negative elapsed time and is
    /// simply rejected.
    pub fn tick(&mut self, timestamp_ms: f64) -> bool {
        if let Some(last) = self.last_tick_ms {
            let elapsed = timestamp_ms - last;
            if !(elapsed >= self.period_seconds * 1000.0) {
                return false;
            }
        }
        self.last_tick_ms = Some(timestamp_ms);
        self.frame_count += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_tick_is_always_accepted() {
        let mut clock = FrameClock::new(10.0);
        assert!(clock.tick(123.0));
        assert_eq!(clock.frame_count(), 1);
        assert_eq!(clock.last_tick_ms(), Some(123.0));
    }

    #[test]
    fn thirty_hz_scenario() {
        let mut clock = FrameClock::new(1.0 / 30.0);
        assert!(clock.tick(0.0));
        assert_eq!(clock.frame_count(), 1);

        assert!(!clock.tick(10.0));
        assert_eq!(clock.frame_count(), 1);
        assert_eq!(clock.last_tick_ms(), Some(0.0));

        assert!(clock.tick(40.0));
        assert_eq!(clock.frame_count(), 2);
    }

    #[test]
    fn callbacks_closer_than_the_period_accept_at_most_once() {
        let mut clock = FrameClock::new(0.1);
        clock.tick(0.0);
        let accepted = (1..10).filter(|i| clock.tick(*i as f64 * 10.0)).count();
        assert_eq!(accepted, 0);
        assert!(clock.tick(100.0));
    }

    #[test]
    fn callbacks_at_the_period_are_all_accepted() {
        let mut clock = FrameClock::new(0.05);
        for i in 0..20 {
            assert!(clock.tick(i as f64 * 50.0));
        }
        assert_eq!(clock.frame_count(), 20);
    }

    #[test]
    fn backwards_timestamp_is_a_skipped_frame() {
        let mut clock = FrameClock::new(0.01);
        clock.tick(1_000.0);
        assert!(!clock.tick(500.0));
        assert_eq!(clock.frame_count(), 1);
        assert_eq!(clock.last_tick_ms(), Some(1_000.0));
    }

    #[test]
    fn nan_timestamp_is_rejected() {
        let mut clock = FrameClock::new(0.01);
        clock.tick(0.0);
        assert!(!clock.tick(f64::NAN));
        assert_eq!(clock.frame_count(), 1);
    }
}
