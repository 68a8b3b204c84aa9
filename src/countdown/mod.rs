//! Countdown state for timed notifications.
//!
//! A countdown holds a decaying value measured in time units (seconds on a
//! game server). The value is stored as an integer count of micro-units and
//! every step subtracts exactly 0.1, so repeated decrements never
//! accumulate binary floating point error.

use crate::error::TimerError;

/// Amount subtracted from the remaining time on every step.
pub const STEP: f64 = 0.1;

/// Micro-units in one time unit.
const MICROS_PER_UNIT: f64 = 1_000_000.0;

/// One step expressed in micro-units.
const STEP_MICROS: i64 = 100_000;

// ============================================================================
// TickResult
// ============================================================================

/// Result of advancing a countdown by one step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickResult {
    /// Remaining time after this tick. Zero or negative on the crossing tick.
    pub remaining: f64,
    /// True only on the tick that moved the countdown into completion.
    pub crossed: bool,
    /// True once the countdown has completed or been cancelled.
    pub completed: bool,
}

// ============================================================================
// CountdownState
// ============================================================================

/// Mutable countdown value with a fixed step and a completion flag.
///
/// `remaining` starts at `total` and only ever decreases. Once `completed`
/// is set the state never changes again.
#[derive(Debug, Clone, PartialEq)]
pub struct CountdownState {
    total: f64,
    total_micros: i64,
    remaining_micros: i64,
    completed: bool,
    cancelled: bool,
}

impl CountdownState {
    /// Creates a countdown of `total` time units.
    ///
    /// Any positive duration is accepted. A total that is not a multiple of
    /// 0.1 completes on the step that takes `remaining` to zero or below.
    ///
    /// # Errors
    ///
    /// Returns [`TimerError::InvalidDuration`] if `total` is not finite or
    /// not positive.
    pub fn new(total: f64) -> Result<Self, TimerError> {
        if !total.is_finite() || total <= 0.0 {
            return Err(TimerError::InvalidDuration(total));
        }
        // Float-to-int casts saturate, so absurdly long totals stay in range.
        let micros = ((total * MICROS_PER_UNIT).round() as i64).max(1);
        Ok(Self {
            total,
            total_micros: micros,
            remaining_micros: micros,
            completed: false,
            cancelled: false,
        })
    }

    /// Advances the countdown by one step.
    ///
    /// After completion (natural or cancelled) this is a no-op that reports
    /// `completed = true` and `crossed = false`.
    pub fn tick(&mut self) -> TickResult {
        if self.completed {
            return TickResult {
                remaining: self.remaining(),
                crossed: false,
                completed: true,
            };
        }

        self.remaining_micros = self.remaining_micros.saturating_sub(STEP_MICROS);
        let crossed = self.remaining_micros <= 0;
        if crossed {
            self.completed = true;
        }

        TickResult {
            remaining: self.remaining(),
            crossed,
            completed: self.completed,
        }
    }

    /// Forces completion without decrementing. Idempotent.
    ///
    /// Has no effect on a countdown that already expired naturally.
    pub fn cancel(&mut self) {
        if !self.completed {
            self.completed = true;
            self.cancelled = true;
        }
    }

    /// Returns the total duration exactly as it was given.
    pub fn total(&self) -> f64 {
        self.total
    }

    /// Returns the remaining time in time units.
    ///
    /// Negative once the final step overshot a total that is not a multiple
    /// of the step.
    pub fn remaining(&self) -> f64 {
        self.remaining_micros as f64 / MICROS_PER_UNIT
    }

    /// Returns the elapsed time in time units, at most `total`.
    pub fn elapsed(&self) -> f64 {
        let elapsed = self.total_micros - self.remaining_micros.max(0);
        elapsed as f64 / MICROS_PER_UNIT
    }

    /// Remaining and total time in micro-units, remaining floored at zero.
    pub(crate) fn micros(&self) -> (u64, u64) {
        (
            self.remaining_micros.max(0).unsigned_abs(),
            self.total_micros.unsigned_abs(),
        )
    }

    /// Returns true once the countdown expired or was cancelled.
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Returns true if the countdown was cancelled before expiring.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    mod construction_tests {
        use super::*;

        #[test]
        fn test_new_starts_full() {
            let state = CountdownState::new(10.0).unwrap();
            assert_eq!(state.total(), 10.0);
            assert_eq!(state.remaining(), 10.0);
            assert_eq!(state.elapsed(), 0.0);
            assert!(!state.is_completed());
            assert!(!state.is_cancelled());
        }

        #[test]
        fn test_new_rejects_non_positive() {
            assert_eq!(
                CountdownState::new(0.0),
                Err(TimerError::InvalidDuration(0.0))
            );
            assert_eq!(
                CountdownState::new(-5.0),
                Err(TimerError::InvalidDuration(-5.0))
            );
        }

        #[test]
        fn test_new_rejects_non_finite() {
            assert!(CountdownState::new(f64::NAN).is_err());
            assert!(CountdownState::new(f64::INFINITY).is_err());
        }

        #[test]
        fn test_new_accepts_less_than_one_step() {
            let mut state = CountdownState::new(0.04).unwrap();
            assert_eq!(state.total(), 0.04);
            assert_eq!(state.remaining(), 0.04);

            let result = state.tick();
            assert!(result.crossed);
            assert!(result.completed);
            assert!((result.remaining - -0.06).abs() < 1e-9);
            assert_eq!(state.elapsed(), 0.04);
        }

        #[test]
        fn test_new_keeps_total_exact() {
            let state = CountdownState::new(0.16).unwrap();
            assert_eq!(state.total(), 0.16);
            assert_eq!(state.remaining(), 0.16);

            let state = CountdownState::new(2.54).unwrap();
            assert_eq!(state.total(), 2.54);
            assert_eq!(state.remaining(), 2.54);
        }

        #[test]
        fn test_new_accepts_tiny_and_huge_totals() {
            let mut tiny = CountdownState::new(1e-12).unwrap();
            assert_eq!(tiny.total(), 1e-12);
            assert!(tiny.tick().crossed);

            let mut huge = CountdownState::new(1e30).unwrap();
            assert_eq!(huge.total(), 1e30);
            assert!(!huge.tick().completed);
        }
    }

    mod tick_tests {
        use super::*;

        #[test]
        fn test_tick_decrements_by_step() {
            let mut state = CountdownState::new(1.0).unwrap();
            let result = state.tick();
            assert_eq!(result.remaining, 0.9);
            assert!(!result.crossed);
            assert!(!result.completed);
            assert_eq!(state.elapsed(), 0.1);
        }

        #[test]
        fn test_no_drift_over_many_ticks() {
            let mut state = CountdownState::new(10.0).unwrap();
            for _ in 0..37 {
                state.tick();
            }
            assert_eq!(state.remaining(), 6.3);
            assert_eq!(state.elapsed(), 3.7);
        }

        #[test]
        fn test_partial_step_total_overshoots_on_last_tick() {
            let mut state = CountdownState::new(0.16).unwrap();

            let first = state.tick();
            assert!(!first.completed);
            assert!((first.remaining - 0.06).abs() < 1e-9);

            let second = state.tick();
            assert!(second.crossed);
            assert!((second.remaining - -0.04).abs() < 1e-9);
            assert_eq!(state.elapsed(), 0.16);

            assert!(!state.tick().crossed);
        }

        #[test]
        fn test_completes_after_total_over_step_ticks() {
            for total in [0.1, 0.5, 1.0, 2.5, 10.0, 33.3] {
                let mut state = CountdownState::new(total).unwrap();
                let bound = (total / STEP).ceil() as usize + 1;
                let mut calls = 0;
                let mut crossings = 0;
                while !state.is_completed() {
                    let result = state.tick();
                    calls += 1;
                    if result.crossed {
                        crossings += 1;
                        assert_eq!(result.remaining, 0.0);
                    }
                    assert!(calls <= bound, "total {total} took too long");
                }
                assert_eq!(crossings, 1);
                assert_eq!(calls, (total / STEP).round() as usize);
            }
        }

        #[test]
        fn test_tick_after_completion_is_noop() {
            let mut state = CountdownState::new(0.1).unwrap();
            assert!(state.tick().crossed);

            let after = state.tick();
            assert!(after.completed);
            assert!(!after.crossed);
            assert_eq!(after.remaining, 0.0);
            assert_eq!(state.remaining(), 0.0);
        }
    }

    mod cancel_tests {
        use super::*;

        #[test]
        fn test_cancel_keeps_remaining() {
            let mut state = CountdownState::new(5.0).unwrap();
            state.tick();
            state.cancel();
            assert!(state.is_completed());
            assert!(state.is_cancelled());
            assert_eq!(state.remaining(), 4.9);
        }

        #[test]
        fn test_cancel_is_idempotent() {
            let mut once = CountdownState::new(5.0).unwrap();
            once.cancel();

            let mut twice = CountdownState::new(5.0).unwrap();
            twice.cancel();
            twice.cancel();

            assert_eq!(once, twice);
        }

        #[test]
        fn test_tick_after_cancel_does_not_decrement() {
            let mut state = CountdownState::new(5.0).unwrap();
            state.cancel();
            let result = state.tick();
            assert!(result.completed);
            assert!(!result.crossed);
            assert_eq!(state.remaining(), 5.0);
        }

        #[test]
        fn test_cancel_after_expiry_is_not_a_cancellation() {
            let mut state = CountdownState::new(0.1).unwrap();
            state.tick();
            state.cancel();
            assert!(state.is_completed());
            assert!(!state.is_cancelled());
        }
    }
}
