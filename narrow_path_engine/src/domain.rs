/// Narrow Path Engine — Core Domain Types
///
/// Pure data. No transition logic.
/// All axis values: i64 fixed-point (SCALE = 10_000).

use serde::{Deserialize, Serialize};

use crate::arithmetic::{fraction_from_units, units_from_fraction, SCALE};

// ── Phase ──────────────────────────────────────────────────────────

/// Why a game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameOverReason {
    /// P(doom) reached the loss threshold, or the path crossed the chaos boundary.
    Doom,
    /// Dystopia reached the loss threshold, or the path crossed the control boundary.
    Dystopia,
    /// The scenario run finished with the player still on the path.
    Success,
}

impl GameOverReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameOverReason::Doom => "doom",
            GameOverReason::Dystopia => "dystopia",
            GameOverReason::Success => "success",
        }
    }
}

/// Lifecycle phase. The reason only exists inside `GameOver`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Phase {
    Menu,
    Playing,
    GameOver { reason: GameOverReason },
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Menu => "menu",
            Phase::Playing => "playing",
            Phase::GameOver { .. } => "game_over",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::GameOver { .. })
    }

    pub fn game_over_reason(&self) -> Option<GameOverReason> {
        match self {
            Phase::GameOver { reason } => Some(*reason),
            _ => None,
        }
    }
}

// ── Impact ─────────────────────────────────────────────────────────

/// Signed per-axis change applied by one choice, in fixed-point units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Impact {
    pub doom_delta: i64,
    pub dystopia_delta: i64,
    pub path_delta: i64,
}

impl Impact {
    pub fn new(doom_delta: i64, dystopia_delta: i64, path_delta: i64) -> Self {
        Self {
            doom_delta,
            dystopia_delta,
            path_delta,
        }
    }

    /// Build an impact from fractional deltas (0.05 == five points).
    pub fn from_fractions(doom: f64, dystopia: f64, path: f64) -> Self {
        Self {
            doom_delta: units_from_fraction(doom),
            dystopia_delta: units_from_fraction(dystopia),
            path_delta: units_from_fraction(path),
        }
    }
}

// ── Calibration ────────────────────────────────────────────────────

/// Every tunable number of the engine, as int64 fixed-point.
///
/// Carried inside `RiskState` so a replay reproduces the thresholds
/// the game was played with.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Calibration {
    pub initial_doom: i64,          // 1500 (0.15)
    pub initial_dystopia: i64,      // 2000 (0.20)
    pub initial_path_position: i64, // 4500 (0.45)
    pub meter_loss_threshold: i64,  // SCALE (1.0)
    pub path_lower_bound: i64,      // 1000 (0.1), chaos side
    pub path_upper_bound: i64,      // 9000 (0.9), control side
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            initial_doom: 1500,
            initial_dystopia: 2000,
            initial_path_position: 4500,
            meter_loss_threshold: SCALE,
            path_lower_bound: 1000,
            path_upper_bound: 9000,
        }
    }
}

// ── Risk State ─────────────────────────────────────────────────────

/// The complete game state: two risk meters, the path, and the phase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RiskState {
    pub doom: i64,
    pub dystopia: i64,
    pub path_position: i64,
    pub phase: Phase,
    pub calibration: Calibration,
}

impl RiskState {
    pub fn doom_fraction(&self) -> f64 {
        fraction_from_units(self.doom)
    }

    pub fn dystopia_fraction(&self) -> f64 {
        fraction_from_units(self.dystopia)
    }

    pub fn path_fraction(&self) -> f64 {
        fraction_from_units(self.path_position)
    }

    pub fn game_over_reason(&self) -> Option<GameOverReason> {
        self.phase.game_over_reason()
    }

    pub fn is_game_over(&self) -> bool {
        self.phase.is_terminal()
    }
}

// ── Transition Outcome ─────────────────────────────────────────────

/// Structured, immutable outcome of one engine event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransitionOutcome {
    pub event_type: String,
    /// False when the event was a no-op in the current phase.
    pub applied: bool,
    pub phase: Phase,
}

impl TransitionOutcome {
    pub fn game_over_reason(&self) -> Option<GameOverReason> {
        self.phase.game_over_reason()
    }
}
