use std::time::{Duration, Instant};

/// Rate limiter for pointer-driven work (hover lookups, recenter checks).
///
/// A request inside the cooldown window is not dropped: it is remembered
/// and `poll` runs it once the window has passed, so the last requested
/// state is always applied eventually.
#[derive(Debug, Clone)]
pub struct Throttle {
    interval: Duration,
    last_run: Option<Instant>,
    pending: bool,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_run: None,
            pending: false,
        }
    }

    fn ready(&self, now: Instant) -> bool {
        match self.last_run {
            Some(last) => now.saturating_duration_since(last) >= self.interval,
            None => true,
        }
    }

    /// True when the caller should run the action now; otherwise the
    /// request is kept for `poll`
    pub fn request(&mut self, now: Instant) -> bool {
        if self.ready(now) {
            self.last_run = Some(now);
            self.pending = false;
            true
        } else {
            self.pending = true;
            false
        }
    }

    /// True when a deferred request is now due
    pub fn poll(&mut self, now: Instant) -> bool {
        if self.pending && self.ready(now) {
            self.last_run = Some(now);
            self.pending = false;
            true
        } else {
            false
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_request_runs() {
        let mut t = Throttle::new(Duration::from_millis(100));
        assert!(t.request(Instant::now()));
        assert!(!t.is_pending());
    }

    #[test]
    fn test_burst_coalesces_to_one_trailing_run() {
        let t0 = Instant::now();
        let mut t = Throttle::new(Duration::from_millis(100));
        assert!(t.request(t0));
        assert!(!t.request(t0 + Duration::from_millis(10)));
        assert!(!t.request(t0 + Duration::from_millis(50)));
        assert!(t.is_pending());

        assert!(!t.poll(t0 + Duration::from_millis(99)));
        assert!(t.poll(t0 + Duration::from_millis(100)));
        assert!(!t.poll(t0 + Duration::from_millis(500)));
    }

    #[test]
    fn test_poll_without_request_does_nothing() {
        let mut t = Throttle::new(Duration::from_millis(200));
        assert!(!t.poll(Instant::now()));
    }
}
