//! Read-outs — derived, display-ready views of a `RiskState`.
//!
//! Pure functions. Renderers call these every frame; nothing here feeds
//! back into the engine.

use serde::{Deserialize, Serialize};

use narrow_path_engine::arithmetic::{percent_from_units, SCALE};
use narrow_path_engine::domain::{GameOverReason, RiskState};

/// Half of the path axis: the centre of the narrow path.
const PATH_CENTRE: i64 = SCALE / 2;

/// Colour band of a risk meter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskBand {
    Safe,
    Caution,
    Danger,
    Catastrophe,
}

impl RiskBand {
    pub fn label(&self) -> &'static str {
        match self {
            RiskBand::Safe => "SAFE",
            RiskBand::Caution => "CAUTION",
            RiskBand::Danger => "DANGER",
            RiskBand::Catastrophe => "CATASTROPHE",
        }
    }
}

/// Lower edges of the caution, danger and catastrophe bands, in units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BandThresholds {
    pub caution: i64,
    pub danger: i64,
    pub catastrophe: i64,
}

impl Default for BandThresholds {
    fn default() -> Self {
        Self {
            caution: 2500,
            danger: 5000,
            catastrophe: 7500,
        }
    }
}

impl BandThresholds {
    /// Thresholds must be strictly increasing inside (0, SCALE].
    pub fn is_ordered(&self) -> bool {
        0 < self.caution
            && self.caution < self.danger
            && self.danger < self.catastrophe
            && self.catastrophe <= SCALE
    }
}

/// Band of a single meter value.
pub fn risk_band(units: i64, thresholds: &BandThresholds) -> RiskBand {
    if units >= thresholds.catastrophe {
        RiskBand::Catastrophe
    } else if units >= thresholds.danger {
        RiskBand::Danger
    } else if units >= thresholds.caution {
        RiskBand::Caution
    } else {
        RiskBand::Safe
    }
}

/// Band of the worse of the two meters.
pub fn overall_risk(state: &RiskState, thresholds: &BandThresholds) -> RiskBand {
    risk_band(state.doom.max(state.dystopia), thresholds)
}

/// Where the player stands relative to the centre of the path.
///
/// Below the centre is the chaos side, above it the control side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathStatus {
    OnTheNarrowPath,
    DriftingTowardChaos,
    DriftingTowardDystopia,
    LeaningChaos,
    LeaningControl,
}

impl PathStatus {
    pub fn label(&self) -> &'static str {
        match self {
            PathStatus::OnTheNarrowPath => "On The Narrow Path",
            PathStatus::DriftingTowardChaos => "Drifting Toward Chaos",
            PathStatus::DriftingTowardDystopia => "Drifting Toward Dystopia",
            PathStatus::LeaningChaos => "Leaning Chaos",
            PathStatus::LeaningControl => "Leaning Control",
        }
    }
}

/// Signed distance from the centre of the path, in units.
/// Negative on the chaos side.
pub fn path_offset(state: &RiskState) -> i64 {
    state.path_position - PATH_CENTRE
}

/// Path status from the distance to the centre: within 0.10 is on the
/// path, up to 0.30 is drifting, beyond that is leaning.
pub fn path_status(state: &RiskState) -> PathStatus {
    let offset = path_offset(state);
    let distance = offset.abs();
    let chaos_side = offset < 0;
    if distance < 1000 {
        PathStatus::OnTheNarrowPath
    } else if distance <= 3000 {
        if chaos_side {
            PathStatus::DriftingTowardChaos
        } else {
            PathStatus::DriftingTowardDystopia
        }
    } else if chaos_side {
        PathStatus::LeaningChaos
    } else {
        PathStatus::LeaningControl
    }
}

/// Colour zone of the path itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathZone {
    Safe,
    Caution,
    Danger,
    GameOver,
}

impl PathZone {
    /// Hex colour the renderer paints the path with.
    pub fn colour(&self) -> &'static str {
        match self {
            PathZone::Safe => "#10b981",
            PathZone::Caution => "#f59e0b",
            PathZone::Danger => "#f97316",
            PathZone::GameOver => "#ef4444",
        }
    }
}

pub fn path_zone(state: &RiskState) -> PathZone {
    let distance = path_offset(state).abs();
    let total_risk = state.doom.max(state.dystopia);
    if state.is_game_over() {
        PathZone::GameOver
    } else if distance > 3000 || total_risk > 7500 {
        PathZone::Danger
    } else if distance > 1500 {
        PathZone::Caution
    } else {
        PathZone::Safe
    }
}

/// "15%" style display of a meter.
pub fn format_percent(units: i64) -> String {
    format!("{}%", percent_from_units(units))
}

/// Banner text over the path: the game-over reason, or the path status.
pub fn headline(state: &RiskState) -> String {
    match state.game_over_reason() {
        Some(GameOverReason::Doom) => "GAME OVER: DOOM".to_string(),
        Some(GameOverReason::Dystopia) => "GAME OVER: DYSTOPIA".to_string(),
        Some(GameOverReason::Success) => "YOU WALKED THE NARROW PATH".to_string(),
        None => path_status(state).label().to_uppercase(),
    }
}

/// Everything a HUD shows, computed at once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Readout {
    pub doom_percent: String,
    pub dystopia_percent: String,
    pub doom_band: RiskBand,
    pub dystopia_band: RiskBand,
    pub overall: RiskBand,
    pub path_status: PathStatus,
    pub path_zone: PathZone,
    pub headline: String,
}

pub fn readout(state: &RiskState, thresholds: &BandThresholds) -> Readout {
    Readout {
        doom_percent: format_percent(state.doom),
        dystopia_percent: format_percent(state.dystopia),
        doom_band: risk_band(state.doom, thresholds),
        dystopia_band: risk_band(state.dystopia, thresholds),
        overall: overall_risk(state, thresholds),
        path_status: path_status(state),
        path_zone: path_zone(state),
        headline: headline(state),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use narrow_path_engine::domain::Phase;

    fn at(doom: i64, dystopia: i64, path_position: i64) -> RiskState {
        RiskState {
            doom,
            dystopia,
            path_position,
            phase: Phase::Playing,
            ..RiskState::default()
        }
    }

    #[test]
    fn test_band_edges() {
        let t = BandThresholds::default();
        assert_eq!(risk_band(0, &t), RiskBand::Safe);
        assert_eq!(risk_band(2499, &t), RiskBand::Safe);
        assert_eq!(risk_band(2500, &t), RiskBand::Caution);
        assert_eq!(risk_band(5000, &t), RiskBand::Danger);
        assert_eq!(risk_band(7500, &t), RiskBand::Catastrophe);
        assert_eq!(risk_band(SCALE, &t), RiskBand::Catastrophe);
    }

    #[test]
    fn test_overall_uses_worse_meter() {
        let t = BandThresholds::default();
        assert_eq!(overall_risk(&at(1000, 6000, 5000), &t), RiskBand::Danger);
        assert_eq!(overall_risk(&at(8000, 1000, 5000), &t), RiskBand::Catastrophe);
    }

    #[test]
    fn test_threshold_ordering() {
        assert!(BandThresholds::default().is_ordered());
        let bad = BandThresholds {
            caution: 5000,
            danger: 5000,
            catastrophe: 9000,
        };
        assert!(!bad.is_ordered());
    }

    #[test]
    fn test_path_status_sides() {
        assert_eq!(path_status(&at(0, 0, 4500)), PathStatus::OnTheNarrowPath);
        assert_eq!(path_status(&at(0, 0, 5999)), PathStatus::OnTheNarrowPath);
        assert_eq!(path_status(&at(0, 0, 4000)), PathStatus::DriftingTowardChaos);
        assert_eq!(path_status(&at(0, 0, 7000)), PathStatus::DriftingTowardDystopia);
        assert_eq!(path_status(&at(0, 0, 1500)), PathStatus::LeaningChaos);
        assert_eq!(path_status(&at(0, 0, 8500)), PathStatus::LeaningControl);
        assert_eq!(PathStatus::DriftingTowardChaos.label(), "Drifting Toward Chaos");
    }

    #[test]
    fn test_path_zone() {
        assert_eq!(path_zone(&at(1500, 2000, 4500)), PathZone::Safe);
        assert_eq!(path_zone(&at(1500, 2000, 6800)), PathZone::Caution);
        assert_eq!(path_zone(&at(1500, 2000, 8100)), PathZone::Danger);
        assert_eq!(path_zone(&at(8000, 2000, 5000)), PathZone::Danger);
        let over = RiskState {
            phase: Phase::GameOver {
                reason: GameOverReason::Doom,
            },
            ..at(SCALE, 0, 5000)
        };
        assert_eq!(path_zone(&over), PathZone::GameOver);
        assert_eq!(PathZone::GameOver.colour(), "#ef4444");
    }

    #[test]
    fn test_headline() {
        assert_eq!(headline(&at(1500, 2000, 4500)), "ON THE NARROW PATH");
        assert_eq!(headline(&at(1500, 2000, 3000)), "DRIFTING TOWARD CHAOS");
        let over = RiskState {
            phase: Phase::GameOver {
                reason: GameOverReason::Dystopia,
            },
            ..at(1500, 2000, 9300)
        };
        assert_eq!(headline(&over), "GAME OVER: DYSTOPIA");
    }

    #[test]
    fn test_readout_percentages() {
        let r = readout(&RiskState::default(), &BandThresholds::default());
        assert_eq!(r.doom_percent, "15%");
        assert_eq!(r.dystopia_percent, "20%");
        assert_eq!(r.overall, RiskBand::Safe);
        assert_eq!(r.path_status, PathStatus::OnTheNarrowPath);
    }
}
