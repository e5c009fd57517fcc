use std::time::Duration;

use crate::{
    bignum::BigUnsigned,
    cancel::{CancellationSignal, Signal},
};

/// Everything needed to continue a trajectory where it left off.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ComputationState {
    pub value: BigUnsigned,
    /// Total stopping time so far: every `3x+1` and every halving counts.
    pub steps: u64,
    /// One more than the largest power of two removed by a single even step.
    pub max_zero_run: u64,
    /// Wall-clock time spent in earlier run segments.
    pub elapsed: Duration,
}

impl ComputationState {
    pub fn new(value: BigUnsigned) -> Self {
        Self {
            value,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopOutcome {
    /// The value reached one, or was zero to begin with.
    Completed,
    /// A signal was observed between two transforms.
    Cancelled(Signal),
}

/// Applies Collatz transforms to `state` until it reaches one or `signal`
/// reports a pending cancellation.
///
/// The signal is polled once per transform, so on cancellation `state.value`
/// is always a fully transformed, normalized value.
#[tracing::instrument(skip_all)]
pub fn run_trajectory<S>(state: &mut ComputationState, signal: &S) -> LoopOutcome
where
    S: CancellationSignal + ?Sized,
{
    loop {
        if state.value.is_zero() || state.value.is_one() {
            return LoopOutcome::Completed;
        }
        if let Some(pending) = signal.poll() {
            return LoopOutcome::Cancelled(pending);
        }
        state.steps += if state.value.is_odd() {
            state.value.apply_odd_step()
        } else {
            state.value.apply_even_step(&mut state.max_zero_run)
        };
    }
}
