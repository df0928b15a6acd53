/// Narrow Path Engine — State Construction
///
/// All axis values: int64 fixed-point (real * SCALE).

use crate::domain::{Calibration, Phase, RiskState};

/// Fresh state at the calibration's starting values, in the menu.
pub fn create_initial_state(calibration: &Calibration) -> RiskState {
    RiskState {
        doom: calibration.initial_doom,
        dystopia: calibration.initial_dystopia,
        path_position: calibration.initial_path_position,
        phase: Phase::Menu,
        calibration: calibration.clone(),
    }
}

impl Default for RiskState {
    fn default() -> Self {
        create_initial_state(&Calibration::default())
    }
}
