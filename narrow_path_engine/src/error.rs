//! Engine error types.

use thiserror::Error;

/// A broken state or calibration rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("[INVARIANT:axis_range] {axis} = {value} is outside [0, {max}]")]
    AxisOutOfRange {
        axis: &'static str,
        value: i64,
        max: i64,
    },
    #[error("[INVARIANT:playing_past_threshold] state is playing but {condition}")]
    PlayingPastThreshold { condition: &'static str },
    #[error("[CALIBRATION:range] {field} = {value} is outside [0, {max}]")]
    CalibrationOutOfRange {
        field: &'static str,
        value: i64,
        max: i64,
    },
    #[error("[CALIBRATION:path_bounds] lower bound {lower} must be below upper bound {upper}")]
    PathBoundsInverted { lower: i64, upper: i64 },
    #[error("[CALIBRATION:initial_path] initial path {value} must lie strictly inside ({lower}, {upper})")]
    InitialPathOutsideBounds { value: i64, lower: i64, upper: i64 },
    #[error("[CALIBRATION:initial_meter] initial {field} = {value} must be below the loss threshold {threshold}")]
    InitialMeterAtThreshold {
        field: &'static str,
        value: i64,
        threshold: i64,
    },
}

/// Rejection of an event by the stateful engine.
///
/// A rejected event leaves the engine untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("schema version mismatch: expected {expected}, got {got}")]
    SchemaVersion { expected: u32, got: u32 },
    #[error("sequence violation: expected {expected}, got {got}")]
    Sequence { expected: u64, got: u64 },
    #[error("invariant violation: {0}")]
    Invariant(#[from] InvariantViolation),
    #[error("malformed event: {0}")]
    MalformedEvent(String),
}
