//! Tick-driven timer tracking an in-flight animated slide.

use std::time::Duration;

use railslide_core::TimerState;

/// Accumulate-and-compare timer for slide animations.
///
/// The grid state is already final when the timer starts; the timer only
/// tells controllers when the external animator is expected to settle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlideTransition {
    state: TimerState,
    elapsed: Duration,
    duration: Duration,
}

impl SlideTransition {
    /// Creates an idle timer with the provided animation length.
    #[must_use]
    pub const fn new(duration: Duration) -> Self {
        Self {
            state: TimerState::Idle,
            elapsed: Duration::ZERO,
            duration,
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> TimerState {
        self.state
    }

    /// Reports whether a transition is still settling.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    /// Restarts the timer from zero.
    pub fn start(&mut self) {
        self.elapsed = Duration::ZERO;
        self.state = TimerState::Running;
    }

    /// Accumulates `dt`; returns `true` on the tick the deadline is reached.
    pub fn advance(&mut self, dt: Duration) -> bool {
        if self.state != TimerState::Running {
            return false;
        }

        self.elapsed = self.elapsed.saturating_add(dt);
        if self.elapsed >= self.duration {
            self.state = TimerState::Finished;
            return true;
        }
        false
    }

    /// Resets the timer to idle. Cancelling an idle timer is a no-op.
    pub fn cancel(&mut self) {
        self.elapsed = Duration::ZERO;
        self.state = TimerState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finishes_once_duration_accumulates() {
        let mut transition = SlideTransition::new(Duration::from_millis(300));
        transition.start();

        assert!(!transition.advance(Duration::from_millis(200)));
        assert!(transition.is_running());
        assert!(transition.advance(Duration::from_millis(100)));
        assert_eq!(transition.state(), TimerState::Finished);
        assert!(!transition.advance(Duration::from_millis(100)));
    }

    #[test]
    fn idle_timer_ignores_ticks() {
        let mut transition = SlideTransition::new(Duration::from_millis(10));
        assert!(!transition.advance(Duration::from_secs(1)));
        assert_eq!(transition.state(), TimerState::Idle);
    }

    #[test]
    fn cancel_is_idempotent() {
        let mut transition = SlideTransition::new(Duration::from_millis(300));
        transition.start();
        transition.cancel();
        let after_first = transition.clone();
        transition.cancel();

        assert_eq!(transition, after_first);
        assert_eq!(transition.state(), TimerState::Idle);
    }
}
