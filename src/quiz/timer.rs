use std::time::Instant;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerKind {
    /// One countdown step
    Tick,
    /// End of the feedback window
    Resolve,
}

/// A scheduled timer, stamped with the session generation it belongs to.
/// A timer whose generation no longer matches the engine's is stale and
/// must be dropped when it fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timer {
    pub due: Instant,
    pub kind: TimerKind,
    pub generation: u64,
}

/// Deferred events, fired in due order by the host loop
#[derive(Debug, Default)]
pub struct TimerQueue {
    timers: Vec<Timer>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, due: Instant, kind: TimerKind, generation: u64) {
        self.timers.push(Timer { due, kind, generation });
    }

    pub fn cancel(&mut self, kind: TimerKind) {
        self.timers.retain(|t| t.kind != kind);
    }

    pub fn cancel_all(&mut self) {
        self.timers.clear();
    }

    /// Remove and return the earliest timer due at or before `now`
    pub fn pop_due(&mut self, now: Instant) -> Option<Timer> {
        let (idx, _) = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due <= now)
            .min_by_key(|(_, t)| t.due)?;
        Some(self.timers.swap_remove(idx))
    }

    pub fn next_due(&self) -> Option<Instant> {
        self.timers.iter().map(|t| t.due).min()
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_pops_in_due_order() {
        let t0 = Instant::now();
        let mut q = TimerQueue::new();
        q.schedule(t0 + Duration::from_millis(750), TimerKind::Resolve, 1);
        q.schedule(t0 + Duration::from_secs(1), TimerKind::Tick, 1);
        q.schedule(t0 + Duration::from_millis(100), TimerKind::Tick, 1);

        assert!(q.pop_due(t0).is_none());
        let now = t0 + Duration::from_secs(2);
        assert_eq!(q.pop_due(now).unwrap().due, t0 + Duration::from_millis(100));
        assert_eq!(q.pop_due(now).unwrap().kind, TimerKind::Resolve);
        assert_eq!(q.pop_due(now).unwrap().due, t0 + Duration::from_secs(1));
        assert!(q.is_empty());
    }

    #[test]
    fn test_cancel_by_kind() {
        let t0 = Instant::now();
        let mut q = TimerQueue::new();
        q.schedule(t0, TimerKind::Tick, 1);
        q.schedule(t0, TimerKind::Resolve, 1);
        q.cancel(TimerKind::Tick);
        assert_eq!(q.len(), 1);
        assert_eq!(q.next_due(), Some(t0));
        q.cancel_all();
        assert!(q.next_due().is_none());
    }
}
