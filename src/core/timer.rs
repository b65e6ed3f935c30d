//! Deadline timers polled from the widget's update loop.
//!
//! Both timers hold at most one pending deadline: arming again replaces the
//! previous deadline, so two timers for the same purpose never overlap.

use instant::Instant;
use std::time::Duration;

/// One-shot timer restarted on every trigger (search keystrokes)
#[derive(Debug, Clone)]
pub struct Debounce {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debounce {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Start or restart the quiet period from `now`
    pub fn restart(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns true exactly once when the deadline has passed
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// Repeating timer with an optional initial delay (survey rotation)
#[derive(Debug, Clone)]
pub struct IntervalTimer {
    interval: Duration,
    next_tick: Option<Instant>,
}

impl IntervalTimer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_tick: None,
        }
    }

    /// Arm the timer; the first tick is due after `initial_delay`
    pub fn start(&mut self, now: Instant, initial_delay: Duration) {
        self.next_tick = Some(now + initial_delay);
    }

    pub fn stop(&mut self) {
        self.next_tick = None;
    }

    pub fn is_running(&self) -> bool {
        self.next_tick.is_some()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Number of ticks elapsed up to `now`; the schedule advances so each tick
    /// is reported once and missed ticks are caught up rather than dropped
    pub fn due_ticks(&mut self, now: Instant) -> u32 {
        let Some(mut next) = self.next_tick else {
            return 0;
        };
        if self.interval.is_zero() {
            return 0;
        }

        let mut ticks = 0;
        while now >= next {
            ticks += 1;
            next += self.interval;
        }
        self.next_tick = Some(next);
        ticks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debounce_restart_replaces_deadline() {
        let start = Instant::now();
        let mut debounce = Debounce::new(Duration::from_millis(300));

        debounce.restart(start);
        debounce.restart(start + Duration::from_millis(200));

        assert!(!debounce.fire(start + Duration::from_millis(300)));
        assert!(debounce.is_pending());
        assert!(debounce.fire(start + Duration::from_millis(500)));
        assert!(!debounce.fire(start + Duration::from_millis(900)));
        assert!(!debounce.is_pending());
    }

    #[test]
    fn test_debounce_cancel() {
        let start = Instant::now();
        let mut debounce = Debounce::new(Duration::from_millis(300));
        debounce.restart(start);
        debounce.cancel();
        assert!(!debounce.fire(start + Duration::from_secs(5)));
    }

    #[test]
    fn test_interval_counts_ticks() {
        let start = Instant::now();
        let mut timer = IntervalTimer::new(Duration::from_millis(100));
        assert_eq!(timer.due_ticks(start + Duration::from_secs(1)), 0);

        timer.start(start, Duration::from_millis(2000));
        assert_eq!(timer.due_ticks(start + Duration::from_millis(1999)), 0);
        assert_eq!(timer.due_ticks(start + Duration::from_millis(2000)), 1);
        assert_eq!(timer.due_ticks(start + Duration::from_millis(2050)), 0);
        assert_eq!(timer.due_ticks(start + Duration::from_millis(2350)), 3);

        timer.stop();
        assert_eq!(timer.due_ticks(start + Duration::from_secs(10)), 0);
    }

    #[test]
    fn test_restart_replaces_schedule() {
        let start = Instant::now();
        let mut timer = IntervalTimer::new(Duration::from_millis(100));
        timer.start(start, Duration::ZERO);
        timer.start(start + Duration::from_millis(1000), Duration::from_millis(100));
        assert_eq!(timer.due_ticks(start + Duration::from_millis(1050)), 0);
        assert_eq!(timer.due_ticks(start + Duration::from_millis(1100)), 1);
    }
}
