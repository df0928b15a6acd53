//! Drift detection — determinism verification and state comparison.
//!
//! All numeric values are fixed-point i64 (SCALE = 10_000).

use narrow_path_engine::domain::{Calibration, Phase, RiskState};
use narrow_path_engine::error::EngineError;
use narrow_path_engine::events::EventEnvelope;
use thiserror::Error;

use crate::replay;

#[derive(Debug, Error)]
pub enum DriftError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("determinism failure: run 1 = {first}, run 2 = {second}")]
    Nondeterministic { first: String, second: String },
}

/// Replay the same events twice and require identical hashes.
/// Returns the agreed hash.
pub fn verify_determinism(
    events: &[EventEnvelope],
    calibration: &Calibration,
) -> Result<String, DriftError> {
    let first = replay::rebuild_hash(events, calibration)?;
    let second = replay::rebuild_hash(events, calibration)?;
    if first != second {
        return Err(DriftError::Nondeterministic { first, second });
    }
    Ok(first)
}

/// Structured state comparison. All values are integers.
pub fn compare_states(state_a: &RiskState, state_b: &RiskState) -> DriftReport {
    DriftReport {
        doom_a: state_a.doom,
        doom_b: state_b.doom,
        doom_delta: state_b.doom - state_a.doom,
        dystopia_a: state_a.dystopia,
        dystopia_b: state_b.dystopia,
        dystopia_delta: state_b.dystopia - state_a.dystopia,
        path_a: state_a.path_position,
        path_b: state_b.path_position,
        path_delta: state_b.path_position - state_a.path_position,
        phase_a: state_a.phase,
        phase_b: state_b.phase,
        calibration_changed: state_a.calibration != state_b.calibration,
    }
}

/// Structured drift report. Numeric fields are i64 units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriftReport {
    pub doom_a: i64,
    pub doom_b: i64,
    pub doom_delta: i64,
    pub dystopia_a: i64,
    pub dystopia_b: i64,
    pub dystopia_delta: i64,
    pub path_a: i64,
    pub path_b: i64,
    pub path_delta: i64,
    pub phase_a: Phase,
    pub phase_b: Phase,
    pub calibration_changed: bool,
}

impl DriftReport {
    /// True if the two states are identical.
    pub fn is_empty(&self) -> bool {
        self.doom_delta == 0
            && self.dystopia_delta == 0
            && self.path_delta == 0
            && self.phase_a == self.phase_b
            && !self.calibration_changed
    }

    pub fn phase_changed(&self) -> bool {
        self.phase_a != self.phase_b
    }
}
