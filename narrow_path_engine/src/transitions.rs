/// Narrow Path Engine — Centralized Transition Logic
///
/// ALL state-mutation logic lives here.
/// All math is pure integer. Thresholds read from state.calibration.
///
/// Every function takes the state by reference and returns a new one.
/// Calling a transition in the wrong phase is a no-op, never an error.

use tracing::{debug, info};

use crate::arithmetic::apply_clamped;
use crate::domain::{
    Calibration, GameOverReason, Impact, Phase, RiskState, TransitionOutcome,
};
use crate::events::GameEvent;
use crate::state::create_initial_state;

// ---------------------------------------------------------------------------
// Public dispatcher
// ---------------------------------------------------------------------------

/// Apply *event* to *state* and return `(new_state, outcome)`.
/// The original state is never mutated.
pub fn apply_event(state: &RiskState, event: &GameEvent) -> (RiskState, TransitionOutcome) {
    let new_state = match event {
        GameEvent::BeginPlaying => begin_playing(state),
        GameEvent::ApplyChoice { impact } => apply_choice(state, impact),
        GameEvent::Conclude => conclude(state),
        GameEvent::Reset => reset_state(state),
    };

    // Reset always counts as applied, even from an already-reset state.
    let applied = matches!(event, GameEvent::Reset) || new_state != *state;
    if !applied {
        debug!(
            event_type = event.event_type(),
            phase = state.phase.as_str(),
            "event ignored in current phase"
        );
    }

    let outcome = TransitionOutcome {
        event_type: event.event_type().to_string(),
        applied,
        phase: new_state.phase,
    };
    (new_state, outcome)
}

// ---------------------------------------------------------------------------
// Transitions
// ---------------------------------------------------------------------------

/// Apply one choice's impact while playing.
///
/// Clamp each axis into `[0, SCALE]`, then check termination in fixed
/// priority: doom meter, dystopia meter, chaos boundary, control boundary.
/// Outside `Playing` the state is returned unchanged.
pub fn apply_choice(state: &RiskState, impact: &Impact) -> RiskState {
    if state.phase != Phase::Playing {
        return state.clone();
    }

    let doom = apply_clamped(state.doom, impact.doom_delta);
    let dystopia = apply_clamped(state.dystopia, impact.dystopia_delta);
    let path_position = apply_clamped(state.path_position, impact.path_delta);

    let phase = match evaluate_termination(doom, dystopia, path_position, &state.calibration) {
        Some(reason) => {
            info!(
                reason = reason.as_str(),
                doom, dystopia, path_position, "game over"
            );
            Phase::GameOver { reason }
        }
        None => Phase::Playing,
    };

    debug!(
        doom,
        dystopia,
        path_position,
        phase = phase.as_str(),
        "choice applied"
    );

    RiskState {
        doom,
        dystopia,
        path_position,
        phase,
        calibration: state.calibration.clone(),
    }
}

/// Menu → Playing. Axes unchanged; no-op in any other phase.
pub fn begin_playing(state: &RiskState) -> RiskState {
    if state.phase != Phase::Menu {
        return state.clone();
    }
    RiskState {
        phase: Phase::Playing,
        ..state.clone()
    }
}

/// Playing → GameOver(Success): the run finished on the path.
pub fn conclude(state: &RiskState) -> RiskState {
    if state.phase != Phase::Playing {
        return state.clone();
    }
    info!(reason = GameOverReason::Success.as_str(), "game over");
    RiskState {
        phase: Phase::GameOver {
            reason: GameOverReason::Success,
        },
        ..state.clone()
    }
}

/// The canonical initial state with default calibration.
pub fn reset_game() -> RiskState {
    create_initial_state(&Calibration::default())
}

/// Back to the initial values of the state's own calibration, in the menu.
pub fn reset_state(state: &RiskState) -> RiskState {
    create_initial_state(&state.calibration)
}

/// Termination check in priority order. `None` means keep playing.
pub fn evaluate_termination(
    doom: i64,
    dystopia: i64,
    path_position: i64,
    calibration: &Calibration,
) -> Option<GameOverReason> {
    if doom >= calibration.meter_loss_threshold {
        Some(GameOverReason::Doom)
    } else if dystopia >= calibration.meter_loss_threshold {
        Some(GameOverReason::Dystopia)
    } else if path_position <= calibration.path_lower_bound {
        Some(GameOverReason::Doom)
    } else if path_position >= calibration.path_upper_bound {
        Some(GameOverReason::Dystopia)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arithmetic::SCALE;

    fn playing(doom: i64, dystopia: i64, path_position: i64) -> RiskState {
        RiskState {
            doom,
            dystopia,
            path_position,
            phase: Phase::Playing,
            calibration: Calibration::default(),
        }
    }

    #[test]
    fn test_initial_state_is_canonical_menu() {
        let s = reset_game();
        assert_eq!((s.doom, s.dystopia, s.path_position), (1500, 2000, 4500));
        assert_eq!(s.phase, Phase::Menu);
        assert_eq!(s.game_over_reason(), None);
    }

    #[test]
    fn test_begin_playing_keeps_axes() {
        let s = begin_playing(&reset_game());
        assert_eq!(s.phase, Phase::Playing);
        assert_eq!((s.doom, s.dystopia, s.path_position), (1500, 2000, 4500));
    }

    #[test]
    fn test_begin_playing_outside_menu_is_noop() {
        let s = playing(1500, 2000, 4500);
        assert_eq!(begin_playing(&s), s);

        let over = apply_choice(&s, &Impact::new(SCALE, 0, 0));
        assert_eq!(begin_playing(&over), over);
    }

    #[test]
    fn test_apply_choice_moves_all_axes() {
        let s = playing(1500, 2000, 4500);
        let next = apply_choice(&s, &Impact::from_fractions(-0.05, 0.08, 0.12));
        assert_eq!(next.doom, 1000);
        assert_eq!(next.dystopia, 2800);
        assert_eq!(next.path_position, 5700);
        assert_eq!(next.phase, Phase::Playing);
        assert_eq!(next.doom_fraction(), 0.10);
        assert_eq!(next.dystopia_fraction(), 0.28);
        assert_eq!(next.path_fraction(), 0.57);
    }

    #[test]
    fn test_apply_choice_does_not_mutate_input() {
        let s = playing(1500, 2000, 4500);
        let before = s.clone();
        let _ = apply_choice(&s, &Impact::new(100, 100, 100));
        assert_eq!(s, before);
    }

    #[test]
    fn test_doom_meter_ends_game() {
        let s = playing(9500, 2000, 5000);
        let next = apply_choice(&s, &Impact::from_fractions(0.10, 0.0, 0.0));
        assert_eq!(next.doom, SCALE);
        assert_eq!(
            next.phase,
            Phase::GameOver {
                reason: GameOverReason::Doom
            }
        );
    }

    #[test]
    fn test_game_over_is_terminal() {
        let s = playing(9500, 2000, 5000);
        let over = apply_choice(&s, &Impact::new(1000, 0, 0));
        for impact in [
            Impact::new(-5000, -5000, 0),
            Impact::new(0, 0, 0),
            Impact::new(SCALE, SCALE, SCALE),
        ] {
            assert_eq!(apply_choice(&over, &impact), over);
        }
        assert_eq!(conclude(&over), over);
    }

    #[test]
    fn test_apply_choice_in_menu_is_noop() {
        let s = reset_game();
        assert_eq!(apply_choice(&s, &Impact::new(500, 500, 500)), s);
    }

    #[test]
    fn test_clamping_with_huge_deltas() {
        let s = playing(5000, 5000, 5000);
        let up = apply_choice(&s, &Impact::from_fractions(5.0, 0.0, 0.0));
        assert_eq!(up.doom, SCALE);

        let down = apply_choice(&s, &Impact::from_fractions(-5.0, -5.0, 0.0));
        assert_eq!(down.doom, 0);
        assert_eq!(down.dystopia, 0);
        assert_eq!(down.phase, Phase::Playing);

        let extreme = apply_choice(&s, &Impact::new(i64::MAX, i64::MIN, i64::MAX));
        assert_eq!(extreme.doom, SCALE);
        assert_eq!(extreme.dystopia, 0);
        assert_eq!(extreme.path_position, SCALE);
    }

    #[test]
    fn test_doom_wins_over_dystopia() {
        let s = playing(9900, 9900, 5000);
        let next = apply_choice(&s, &Impact::new(500, 500, 0));
        assert_eq!(next.game_over_reason(), Some(GameOverReason::Doom));
    }

    #[test]
    fn test_meter_wins_over_path_boundary() {
        let s = playing(2000, 9900, 1500);
        let next = apply_choice(&s, &Impact::new(0, 500, -1000));
        assert_eq!(next.game_over_reason(), Some(GameOverReason::Dystopia));
    }

    #[test]
    fn test_chaos_boundary_ends_with_doom() {
        let s = playing(2000, 2000, 1500);
        let next = apply_choice(&s, &Impact::new(0, 0, -500));
        assert_eq!(next.path_position, 1000);
        assert_eq!(next.game_over_reason(), Some(GameOverReason::Doom));
    }

    #[test]
    fn test_control_boundary_ends_with_dystopia() {
        let s = playing(1500, 2000, 8800);
        let next = apply_choice(&s, &Impact::from_fractions(0.0, 0.0, 0.05));
        assert_eq!(next.path_position, 9300);
        assert_eq!(next.game_over_reason(), Some(GameOverReason::Dystopia));
        assert!(next.dystopia < SCALE);
    }

    #[test]
    fn test_just_inside_boundaries_keeps_playing() {
        let s = playing(1500, 2000, 4500);
        let low = apply_choice(&s, &Impact::new(0, 0, -3499));
        assert_eq!(low.path_position, 1001);
        assert_eq!(low.phase, Phase::Playing);

        let high = apply_choice(&s, &Impact::new(0, 0, 4499));
        assert_eq!(high.path_position, 8999);
        assert_eq!(high.phase, Phase::Playing);
    }

    #[test]
    fn test_conclude_only_from_playing() {
        let s = playing(1500, 2000, 4500);
        let done = conclude(&s);
        assert_eq!(done.game_over_reason(), Some(GameOverReason::Success));
        assert_eq!((done.doom, done.dystopia, done.path_position), (1500, 2000, 4500));

        let menu = reset_game();
        assert_eq!(conclude(&menu), menu);
    }

    #[test]
    fn test_reset_is_idempotent_from_any_state() {
        let canonical = reset_game();
        let over = apply_choice(&playing(9900, 0, 5000), &Impact::new(200, 0, 0));
        for s in [canonical.clone(), playing(3000, 4000, 6000), over] {
            assert_eq!(reset_state(&s), canonical);
        }
    }

    #[test]
    fn test_reset_keeps_custom_calibration() {
        let calibration = Calibration {
            initial_doom: 1000,
            initial_dystopia: 1000,
            initial_path_position: 5000,
            ..Calibration::default()
        };
        let s = RiskState {
            phase: Phase::Playing,
            ..create_initial_state(&calibration)
        };
        let reset = reset_state(&s);
        assert_eq!(reset.calibration, calibration);
        assert_eq!(reset.path_position, 5000);
        assert_eq!(reset.phase, Phase::Menu);
    }

    #[test]
    fn test_apply_event_reports_noop() {
        let s = reset_game();
        let (next, outcome) = apply_event(&s, &GameEvent::ApplyChoice {
            impact: Impact::new(100, 0, 0),
        });
        assert_eq!(next, s);
        assert!(!outcome.applied);
        assert_eq!(outcome.event_type, "apply_choice");

        let (next, outcome) = apply_event(&s, &GameEvent::BeginPlaying);
        assert!(outcome.applied);
        assert_eq!(outcome.phase, Phase::Playing);
        assert_eq!(next.phase, Phase::Playing);

        let (_, outcome) = apply_event(&s, &GameEvent::Reset);
        assert!(outcome.applied);
    }

    #[test]
    fn test_zero_impact_while_playing_reports_noop() {
        // Nothing changed, so the outcome reports it as not applied.
        let s = playing(1500, 2000, 4500);
        let (next, outcome) = apply_event(&s, &GameEvent::ApplyChoice {
            impact: Impact::default(),
        });
        assert_eq!(next, s);
        assert!(!outcome.applied);
    }

    #[test]
    fn test_axes_stay_in_range_over_grid() {
        let deltas = [-20_000, -SCALE, -1500, -1, 0, 1, 1500, SCALE, 20_000];
        for &start in &[0, 1001, 4500, 8999, SCALE] {
            for &d in &deltas {
                let s = playing(start.min(SCALE - 1), start.min(SCALE - 1), 5000);
                let next = apply_choice(&s, &Impact::new(d, -d, d));
                for v in [next.doom, next.dystopia, next.path_position] {
                    assert!((0..=SCALE).contains(&v), "axis {} out of range", v);
                }
            }
        }
    }
}
