//! One-shot deferred catalog build.
//!
//! The host's own configuration is not available the moment the engine is
//! attached, so the build waits for a settle delay (or an explicit ready
//! signal) and then fires exactly once.

use std::time::{Duration, Instant};

/// Default settle delay, a handful of frames at 60 updates per second.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    Armed { deadline: Instant },
    Fired,
}

/// Tracks whether the deferred build is still pending.
#[derive(Debug, Clone)]
pub struct DeferredBuild {
    settle: Duration,
    state: State,
}

impl DeferredBuild {
    pub fn new(settle: Duration) -> Self {
        Self {
            settle,
            state: State::Idle,
        }
    }

    /// Start the settle countdown. Re-arming a pending or fired task does nothing.
    pub fn arm(&mut self, now: Instant) {
        if self.state == State::Idle {
            self.state = State::Armed {
                deadline: now + self.settle,
            };
        }
    }

    pub fn is_armed(&self) -> bool {
        matches!(self.state, State::Armed { .. })
    }

    pub fn has_fired(&self) -> bool {
        self.state == State::Fired
    }

    /// Returns true exactly once: on the first poll at or after the deadline.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.state {
            State::Armed { deadline } if now >= deadline => {
                self.state = State::Fired;
                true
            }
            _ => false,
        }
    }

    /// Fire immediately, skipping the remaining delay. Returns false if already fired.
    pub fn fire_now(&mut self) -> bool {
        if self.state == State::Fired {
            return false;
        }
        self.state = State::Fired;
        true
    }
}

impl Default for DeferredBuild {
    fn default() -> Self {
        Self::new(DEFAULT_SETTLE_DELAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_after_deadline() {
        let start = Instant::now();
        let mut task = DeferredBuild::new(Duration::from_millis(30));
        task.arm(start);

        assert!(!task.poll(start));
        assert!(!task.poll(start + Duration::from_millis(29)));
        assert!(task.poll(start + Duration::from_millis(30)));
        assert!(task.has_fired());
        assert!(!task.poll(start + Duration::from_secs(10)));
    }

    #[test]
    fn unarmed_task_never_fires_on_poll() {
        let mut task = DeferredBuild::default();
        assert!(!task.poll(Instant::now() + Duration::from_secs(60)));
        assert!(!task.has_fired());
    }

    #[test]
    fn rearming_does_not_push_deadline() {
        let start = Instant::now();
        let mut task = DeferredBuild::new(Duration::from_millis(30));
        task.arm(start);
        task.arm(start + Duration::from_millis(20));
        assert!(task.poll(start + Duration::from_millis(30)));
    }

    #[test]
    fn ready_signal_preempts_delay() {
        let start = Instant::now();
        let mut task = DeferredBuild::new(Duration::from_secs(5));
        task.arm(start);
        assert!(task.fire_now());
        assert!(!task.fire_now());
        assert!(!task.poll(start + Duration::from_secs(6)));
    }
}
