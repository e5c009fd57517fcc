//! Load-or-initialize, compute, save-or-finish.

use std::{
    io,
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use common::path::CheckpointPaths;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{
    bignum::BigUnsigned,
    cancel::{CancellationSignal, Signal},
    checkpoint::{load_literal, remove_checkpoint},
    trajectory::{run_trajectory, ComputationState, LoopOutcome},
    utils::{
        errors::{CheckpointError, RunError},
        time::{format_duration, DurationStyle},
    },
};

/// Where a fresh run takes its starting value from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitialValue {
    /// `2^p - 1`
    Mersenne(u32),
    /// `2^p + 1`
    PowerPlusOne(u32),
    /// A file holding a bare hexadecimal run.
    File(PathBuf),
    /// A decimal literal, or hexadecimal (`0x`) or binary (`0b`) with a prefix.
    Number(String),
}

impl InitialValue {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Mersenne(_) => "mersenne",
            Self::PowerPlusOne(_) => "plus-one",
            Self::File(_) => "file",
            Self::Number(_) => "number",
        }
    }

    pub fn argument(&self) -> String {
        match self {
            Self::Mersenne(power) | Self::PowerPlusOne(power) => power.to_string(),
            Self::File(path) => path.display().to_string(),
            Self::Number(literal) => literal.clone(),
        }
    }

    /// Mode tag followed by the argument; files are keyed by file name only.
    pub fn identifier(&self) -> String {
        match self {
            Self::Mersenne(power) => format!("-m{power}"),
            Self::PowerPlusOne(power) => format!("-p{power}"),
            Self::File(path) => {
                let name = path.file_name().unwrap_or(path.as_os_str());
                format!("-f{}", name.to_string_lossy())
            }
            Self::Number(literal) => format!("-n{}", literal.trim()),
        }
    }

    pub fn construct(&self) -> Result<BigUnsigned, RunError> {
        match self {
            Self::Mersenne(0) | Self::PowerPlusOne(0) => Err(RunError::InvalidInput(
                "exponent must be a positive number".to_string(),
            )),
            Self::Mersenne(power) => Ok(BigUnsigned::mersenne(*power)),
            Self::PowerPlusOne(power) => Ok(BigUnsigned::power_of_two_plus_one(*power)),
            Self::File(path) => load_literal(path).map_err(|source| RunError::Literal {
                path: path.clone(),
                source,
            }),
            Self::Number(literal) => {
                let value = BigUnsigned::parse_literal(literal)
                    .map_err(|e| RunError::InvalidInput(e.to_string()))?;
                if value.is_zero() {
                    return Err(RunError::InvalidInput(
                        "number must be a positive integer".to_string(),
                    ));
                }
                Ok(value)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub source: InitialValue,
    pub checkpoint_path: PathBuf,
}

impl RunConfig {
    /// Keys the checkpoint under `checkpoint_dir` by the source's identifier.
    pub fn new(source: InitialValue, checkpoint_dir: &Path) -> Self {
        let checkpoint_path = CheckpointPaths::checkpoint_path(checkpoint_dir, &source.identifier());
        Self {
            source,
            checkpoint_path,
        }
    }
}

/// The record printed once a trajectory reaches one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub kind: &'static str,
    pub argument: String,
    pub steps: u64,
    pub elapsed_secs: f64,
    pub max_zero_run: u64,
}

impl RunReport {
    pub fn elapsed(&self) -> Duration {
        Duration::from_secs_f64(self.elapsed_secs)
    }

    /// `kind,argument,steps,"formatted duration",seconds,max_zero_run`
    pub fn to_csv(&self, style: DurationStyle) -> String {
        format!(
            "{},{},{},\"{}\",{},{}",
            self.kind,
            self.argument,
            self.steps,
            format_duration(self.elapsed(), style),
            self.elapsed_secs,
            self.max_zero_run
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Completed(RunReport),
    /// Progress was saved and the run returned on request.
    Stopped { steps: u64, elapsed: Duration },
}

pub struct RunController {
    config: RunConfig,
}

impl RunController {
    pub fn new(config: RunConfig) -> Self {
        Self { config }
    }

    pub fn checkpoint_path(&self) -> &Path {
        &self.config.checkpoint_path
    }

    /// Runs until the trajectory completes or `signal` asks to stop.
    ///
    /// Rotate signals save the current state and continue from memory without
    /// reloading it.
    pub fn run<S>(&self, signal: &S) -> Result<RunOutcome, RunError>
    where
        S: CancellationSignal + ?Sized,
    {
        let mut state = self.load_or_initialize()?;

        loop {
            let segment_start = Instant::now();
            let outcome = run_trajectory(&mut state, signal);
            state.elapsed += segment_start.elapsed();

            match outcome {
                LoopOutcome::Completed => return Ok(RunOutcome::Completed(self.finish(state))),
                LoopOutcome::Cancelled(pending) => {
                    self.save(&state, pending)?;
                    if !pending.continues() {
                        return Ok(RunOutcome::Stopped {
                            steps: state.steps,
                            elapsed: state.elapsed,
                        });
                    }
                    signal.acknowledge(pending);
                }
            }
        }
    }

    fn load_or_initialize(&self) -> Result<ComputationState, RunError> {
        let path = self.checkpoint_path();
        match ComputationState::deserialize_from_file(path) {
            Ok(state) => {
                info!(
                    path = %path.display(),
                    steps = state.steps,
                    elapsed_secs = state.elapsed.as_secs_f64(),
                    "loaded checkpoint"
                );
                return Ok(state);
            }
            Err(CheckpointError::Io(e)) if e.kind() == io::ErrorKind::NotFound => {}
            Err(err) => warn!(path = %path.display(), %err, "discarding unusable checkpoint"),
        }

        let value = self.config.source.construct()?;
        info!(
            source = self.config.source.kind(),
            argument = %self.config.source.argument(),
            bits = value.bit_len(),
            "starting from scratch"
        );
        Ok(ComputationState::new(value))
    }

    fn save(&self, state: &ComputationState, signal: Signal) -> Result<(), RunError> {
        let path = self.checkpoint_path();
        state
            .serialize_to_file(path)
            .map_err(|source| RunError::Save {
                path: path.to_path_buf(),
                source,
            })?;

        let elapsed_secs = state.elapsed.as_secs_f64();
        let bits = state.value.bit_len();
        if signal.continues() {
            debug!(path = %path.display(), elapsed_secs, steps = state.steps, bits, ?signal, "saved checkpoint");
        } else {
            info!(path = %path.display(), elapsed_secs, steps = state.steps, bits, "interrupted, saved checkpoint");
        }
        Ok(())
    }

    fn finish(&self, state: ComputationState) -> RunReport {
        let path = self.checkpoint_path();
        if let Err(err) = remove_checkpoint(path) {
            warn!(path = %path.display(), %err, "could not remove checkpoint");
        }
        RunReport {
            kind: self.config.source.kind(),
            argument: self.config.source.argument(),
            steps: state.steps,
            elapsed_secs: state.elapsed.as_secs_f64(),
            max_zero_run: state.max_zero_run,
        }
    }
}
