use std::time::{Duration, Instant};

/// Cooperative trailing-edge debounce with a maximum wait.
///
/// Each `trigger` pushes the trailing deadline out by `delay`; the first
/// trigger of a burst also arms a `max_wait` deadline that later triggers do
/// not move. `poll` fires once either deadline has passed.
#[derive(Debug, Clone)]
pub struct Debounce {
    delay: Duration,
    max_wait: Duration,
    trailing: Option<Instant>,
    deadline: Option<Instant>,
}

impl Debounce {
    pub fn new(delay: Duration, max_wait: Duration) -> Self {
        Self {
            delay,
            max_wait: max_wait.max(delay),
            trailing: None,
            deadline: None,
        }
    }

    pub fn trigger(&mut self, now: Instant) {
        self.trailing = Some(now + self.delay);
        if self.deadline.is_none() {
            self.deadline = Some(now + self.max_wait);
        }
    }

    pub fn is_pending(&self) -> bool {
        self.trailing.is_some()
    }

    pub fn next_due(&self) -> Option<Instant> {
        match (self.trailing, self.deadline) {
            (Some(trailing), Some(deadline)) => Some(trailing.min(deadline)),
            (trailing, deadline) => trailing.or(deadline),
        }
    }

    pub fn poll(&mut self, now: Instant) -> bool {
        match self.next_due() {
            Some(due) if now >= due => {
                self.cancel();
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) {
        self.trailing = None;
        self.deadline = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn idle_debounce_never_fires() {
        let mut debounce = Debounce::new(50 * MS, 200 * MS);
        assert!(!debounce.poll(Instant::now() + 1000 * MS));
    }

    #[test]
    fn burst_fires_once_after_quiet_period() {
        let start = Instant::now();
        let mut debounce = Debounce::new(50 * MS, 200 * MS);
        debounce.trigger(start);
        debounce.trigger(start + 20 * MS);
        debounce.trigger(start + 40 * MS);

        assert!(!debounce.poll(start + 60 * MS));
        assert!(debounce.poll(start + 90 * MS));
        assert!(!debounce.poll(start + 95 * MS));
        assert!(!debounce.is_pending());
    }

    #[test]
    fn sustained_triggers_still_fire_at_max_wait() {
        let start = Instant::now();
        let mut debounce = Debounce::new(50 * MS, 200 * MS);
        let mut fired_at = None;
        for step in 0..30u32 {
            let now = start + step * 10 * MS;
            if debounce.poll(now) {
                fired_at = Some(step * 10);
                break;
            }
            debounce.trigger(now);
        }
        assert_eq!(fired_at, Some(200));
    }

    #[test]
    fn cancel_clears_both_timers() {
        let start = Instant::now();
        let mut debounce = Debounce::new(50 * MS, 200 * MS);
        debounce.trigger(start);
        debounce.cancel();
        assert_eq!(debounce.next_due(), None);
        assert!(!debounce.poll(start + 500 * MS));
    }
}
