/// Narrow Path Engine — Invariant Checks
///
/// Every check returns the first violation it finds.
/// The engine runs `validate_invariants` after every transition.

use crate::arithmetic::{in_unit_range, SCALE};
use crate::domain::{Calibration, Phase, RiskState};
use crate::error::InvariantViolation;
use crate::transitions::evaluate_termination;

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Run every state check, calibration included.
pub fn validate_invariants(state: &RiskState) -> Result<(), InvariantViolation> {
    validate_calibration(&state.calibration)?;
    check_axis_ranges(state)?;
    check_playing_below_thresholds(state)?;
    Ok(())
}

/// Check that a calibration describes a playable game.
pub fn validate_calibration(c: &Calibration) -> Result<(), InvariantViolation> {
    for (field, value) in [
        ("initial_doom", c.initial_doom),
        ("initial_dystopia", c.initial_dystopia),
        ("initial_path_position", c.initial_path_position),
        ("meter_loss_threshold", c.meter_loss_threshold),
        ("path_lower_bound", c.path_lower_bound),
        ("path_upper_bound", c.path_upper_bound),
    ] {
        if !in_unit_range(value) {
            return Err(InvariantViolation::CalibrationOutOfRange {
                field,
                value,
                max: SCALE,
            });
        }
    }

    if c.path_lower_bound >= c.path_upper_bound {
        return Err(InvariantViolation::PathBoundsInverted {
            lower: c.path_lower_bound,
            upper: c.path_upper_bound,
        });
    }

    if c.initial_path_position <= c.path_lower_bound
        || c.initial_path_position >= c.path_upper_bound
    {
        return Err(InvariantViolation::InitialPathOutsideBounds {
            value: c.initial_path_position,
            lower: c.path_lower_bound,
            upper: c.path_upper_bound,
        });
    }

    for (field, value) in [
        ("doom", c.initial_doom),
        ("dystopia", c.initial_dystopia),
    ] {
        if value >= c.meter_loss_threshold {
            return Err(InvariantViolation::InitialMeterAtThreshold {
                field,
                value,
                threshold: c.meter_loss_threshold,
            });
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Individual checks (private)
// ---------------------------------------------------------------------------

/// Every axis within [0, SCALE].
fn check_axis_ranges(state: &RiskState) -> Result<(), InvariantViolation> {
    for (axis, value) in [
        ("doom", state.doom),
        ("dystopia", state.dystopia),
        ("path_position", state.path_position),
    ] {
        if !in_unit_range(value) {
            return Err(InvariantViolation::AxisOutOfRange {
                axis,
                value,
                max: SCALE,
            });
        }
    }
    Ok(())
}

/// A playing state must not already satisfy a termination condition.
fn check_playing_below_thresholds(state: &RiskState) -> Result<(), InvariantViolation> {
    if state.phase != Phase::Playing {
        return Ok(());
    }
    match evaluate_termination(
        state.doom,
        state.dystopia,
        state.path_position,
        &state.calibration,
    ) {
        Some(_) => Err(InvariantViolation::PlayingPastThreshold {
            condition: termination_condition(state),
        }),
        None => Ok(()),
    }
}

fn termination_condition(state: &RiskState) -> &'static str {
    let c = &state.calibration;
    if state.doom >= c.meter_loss_threshold {
        "doom reached the loss threshold"
    } else if state.dystopia >= c.meter_loss_threshold {
        "dystopia reached the loss threshold"
    } else if state.path_position <= c.path_lower_bound {
        "path crossed the chaos boundary"
    } else {
        "path crossed the control boundary"
    }
}
