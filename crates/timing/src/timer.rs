//! The pausable timer primitive

use std::time::{Duration, Instant};

/// Lifecycle state of a [`PausableTimer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerState {
    /// Not started, or stopped.
    Idle,
    /// Accruing time since `since`.
    Running { since: Instant },
    /// Started but currently suspended; only banked time counts.
    Paused,
}

/// A monotonic timer that can be suspended and resumed.
///
/// The elapsed reading is the sum of all intervals during which the timer
/// was running — paused intervals contribute nothing. Every transition
/// takes the timestamp to apply, so a caller coordinating several timers
/// (pausing one while starting another) can use a single `Instant` for
/// both sides of the handoff.
///
/// Misuse (starting a running timer, pausing an idle one) is a programmer
/// error checked with `debug_assert!`; release builds leave these
/// preconditions unchecked.
#[derive(Debug, Clone)]
pub struct PausableTimer {
    state: TimerState,
    /// Time accrued before the most recent pause or resume.
    banked: Duration,
}

impl PausableTimer {
    /// Create a timer in the idle state.
    #[inline]
    pub fn new() -> Self {
        Self {
            state: TimerState::Idle,
            banked: Duration::ZERO,
        }
    }

    /// Create a timer already running from `now`.
    #[inline]
    pub fn started(now: Instant) -> Self {
        let mut timer = Self::new();
        timer.start(now);
        timer
    }

    /// Start accruing time from `now`.
    #[inline]
    pub fn start(&mut self, now: Instant) {
        debug_assert_eq!(self.state, TimerState::Idle, "timer started twice");
        self.banked = Duration::ZERO;
        self.state = TimerState::Running { since: now };
    }

    /// Suspend the timer at `now`, banking the interval since it last
    /// started or resumed.
    #[inline]
    pub fn pause(&mut self, now: Instant) {
        match self.state {
            TimerState::Running { since } => {
                self.banked += now.duration_since(since);
                self.state = TimerState::Paused;
            }
            _ => debug_assert!(false, "paused a timer that was not running"),
        }
    }

    /// Resume a suspended timer from `now`.
    #[inline]
    pub fn resume(&mut self, now: Instant) {
        debug_assert_eq!(self.state, TimerState::Paused, "resumed a timer that was not paused");
        self.state = TimerState::Running { since: now };
    }

    /// Total running time as of `now`.
    ///
    /// Valid while the timer is started (running or paused).
    #[inline]
    pub fn elapsed(&self, now: Instant) -> Duration {
        match self.state {
            TimerState::Running { since } => self.banked + now.duration_since(since),
            TimerState::Paused => self.banked,
            TimerState::Idle => {
                debug_assert!(false, "read elapsed time of an idle timer");
                self.banked
            }
        }
    }

    /// Stop the timer and return it to the idle state.
    #[inline]
    pub fn stop(&mut self) {
        debug_assert_ne!(self.state, TimerState::Idle, "stopped a timer that was never started");
        self.state = TimerState::Idle;
        self.banked = Duration::ZERO;
    }

    /// Whether the timer is currently accruing time.
    #[inline]
    pub fn is_running(&self) -> bool {
        matches!(self.state, TimerState::Running { .. })
    }

    /// Whether the timer is started but suspended.
    #[inline]
    pub fn is_paused(&self) -> bool {
        self.state == TimerState::Paused
    }

    /// Whether the timer has been started and not yet stopped.
    #[inline]
    pub fn is_started(&self) -> bool {
        self.state != TimerState::Idle
    }
}

impl Default for PausableTimer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    #[test]
    fn test_new_timer_is_idle() {
        let timer = PausableTimer::new();
        assert!(!timer.is_started());
        assert!(!timer.is_running());
        assert!(!timer.is_paused());
    }

    #[test]
    fn test_start_and_elapsed() {
        let t0 = Instant::now();
        let mut timer = PausableTimer::new();
        timer.start(t0);

        assert!(timer.is_running());
        assert_eq!(timer.elapsed(t0 + ms(10)), ms(10));
        assert_eq!(timer.elapsed(t0 + ms(25)), ms(25));
    }

    #[test]
    fn test_pause_excludes_suspended_interval() {
        let t0 = Instant::now();
        let mut timer = PausableTimer::started(t0);

        timer.pause(t0 + ms(10));
        assert!(timer.is_paused());
        // Reading while paused is stable regardless of the clock.
        assert_eq!(timer.elapsed(t0 + ms(100)), ms(10));

        timer.resume(t0 + ms(40));
        assert!(timer.is_running());
        assert_eq!(timer.elapsed(t0 + ms(55)), ms(25));
    }

    #[test]
    fn test_repeated_pause_resume_sums_running_intervals() {
        let t0 = Instant::now();
        let mut timer = PausableTimer::started(t0);

        timer.pause(t0 + ms(5));
        timer.resume(t0 + ms(10));
        timer.pause(t0 + ms(17));
        timer.resume(t0 + ms(30));

        // 5 + 7 + 10 = 22
        assert_eq!(timer.elapsed(t0 + ms(40)), ms(22));
    }

    #[test]
    fn test_stop_resets_to_idle() {
        let t0 = Instant::now();
        let mut timer = PausableTimer::started(t0);
        timer.stop();
        assert!(!timer.is_started());

        // A stopped timer can be started again from scratch.
        timer.start(t0 + ms(100));
        assert_eq!(timer.elapsed(t0 + ms(103)), ms(3));
    }

    #[test]
    fn test_elapsed_saturates_on_same_instant() {
        let t0 = Instant::now();
        let timer = PausableTimer::started(t0);
        assert_eq!(timer.elapsed(t0), Duration::ZERO);
    }

    proptest! {
        /// Elapsed time equals the sum of the running intervals, for any
        /// alternating pause/resume schedule.
        #[test]
        fn prop_elapsed_is_sum_of_running_intervals(
            intervals in prop::collection::vec(1u64..1_000, 1..20),
        ) {
            let t0 = Instant::now();
            let mut timer = PausableTimer::started(t0);

            let mut cursor = Duration::ZERO;
            let mut running_total = Duration::ZERO;
            let mut running = true;

            for (i, step) in intervals.iter().enumerate() {
                cursor += ms(*step);
                if running {
                    running_total += ms(*step);
                    timer.pause(t0 + cursor);
                } else {
                    timer.resume(t0 + cursor);
                }
                running = !running;
                prop_assert_eq!(timer.elapsed(t0 + cursor), running_total, "after step {}", i);
            }
        }
    }
}
