/// Narrow Path Engine — Engine
///
/// Top-level orchestrator. Delegates mutation to transitions,
/// validates via invariants.
///
/// Strict sequence enforcement. A rejected event leaves the engine
/// exactly as it was.

use tracing::warn;

use crate::domain::{Calibration, RiskState, TransitionOutcome};
use crate::error::EngineError;
use crate::events::{EventEnvelope, SCHEMA_VERSION};
use crate::invariants::{validate_calibration, validate_invariants};
use crate::state::create_initial_state;
use crate::transitions::apply_event as transition_apply;

/// Stateful engine wrapping the pure functional transition layer.
#[derive(Debug, Clone)]
pub struct RiskEngine {
    state: RiskState,
    calibration: Calibration,
    last_sequence: u64,
}

impl RiskEngine {
    /// Create an engine in the initial menu state of `calibration`.
    pub fn new(calibration: Calibration) -> Result<Self, EngineError> {
        validate_calibration(&calibration)?;
        Ok(Self {
            state: create_initial_state(&calibration),
            calibration,
            last_sequence: 0,
        })
    }

    /// Access the current state.
    pub fn state(&self) -> &RiskState {
        &self.state
    }

    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    /// Sequence number of the last accepted event (0 before any).
    pub fn last_sequence(&self) -> u64 {
        self.last_sequence
    }

    /// Return to the initial state and sequence 0.
    pub fn initialize_state(&mut self) -> &RiskState {
        self.state = create_initial_state(&self.calibration);
        self.last_sequence = 0;
        &self.state
    }

    /// Apply a single event:
    ///   1. Validate schema version (must be 1)
    ///   2. Validate sequence (strictly increasing, no gaps)
    ///   3. Delegate to transitions::apply_event
    ///   4. Validate invariants on new state
    ///   5. Store and return
    pub fn apply_event(
        &mut self,
        event: &EventEnvelope,
    ) -> Result<(&RiskState, TransitionOutcome), EngineError> {
        if event.schema_version != SCHEMA_VERSION {
            warn!(got = event.schema_version, "rejected event: schema version");
            return Err(EngineError::SchemaVersion {
                expected: SCHEMA_VERSION,
                got: event.schema_version,
            });
        }

        let expected = self.last_sequence + 1;
        if event.sequence != expected {
            warn!(expected, got = event.sequence, "rejected event: sequence");
            return Err(EngineError::Sequence {
                expected,
                got: event.sequence,
            });
        }

        let (new_state, outcome) = transition_apply(&self.state, &event.event);
        if let Err(violation) = validate_invariants(&new_state) {
            warn!(%violation, sequence = event.sequence, "rejected event: invariant");
            return Err(violation.into());
        }

        self.state = new_state;
        self.last_sequence = event.sequence;
        Ok((&self.state, outcome))
    }

    /// Apply an ordered sequence of events deterministically.
    /// Stops at the first rejected event.
    pub fn apply_sequence(&mut self, events: &[EventEnvelope]) -> Result<&RiskState, EngineError> {
        for event in events {
            self.apply_event(event)?;
        }
        Ok(&self.state)
    }

    /// Event-sourced reconstruction: reset and replay.
    pub fn replay(&mut self, events: &[EventEnvelope]) -> Result<&RiskState, EngineError> {
        self.initialize_state();
        self.apply_sequence(events)
    }
}

impl Default for RiskEngine {
    fn default() -> Self {
        Self {
            state: RiskState::default(),
            calibration: Calibration::default(),
            last_sequence: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{GameOverReason, Impact, Phase};
    use crate::events::{sequence_events, GameEvent};

    fn choice(doom: i64, dystopia: i64, path: i64) -> GameEvent {
        GameEvent::ApplyChoice {
            impact: Impact::new(doom, dystopia, path),
        }
    }

    #[test]
    fn test_new_rejects_bad_calibration() {
        let c = Calibration {
            path_lower_bound: 5000,
            path_upper_bound: 5000,
            ..Calibration::default()
        };
        assert!(matches!(RiskEngine::new(c), Err(EngineError::Invariant(_))));
    }

    #[test]
    fn test_full_game_to_doom() {
        let events = sequence_events([
            GameEvent::BeginPlaying,
            choice(4000, 0, 0),
            choice(4000, 0, 0),
            choice(4000, 0, 0),
        ]);
        let mut engine = RiskEngine::default();
        let state = engine.apply_sequence(&events).unwrap();
        assert_eq!(state.doom, 10_000);
        assert_eq!(state.game_over_reason(), Some(GameOverReason::Doom));
        assert_eq!(engine.last_sequence(), 4);
    }

    #[test]
    fn test_sequence_gap_rejected_and_state_untouched() {
        let mut engine = RiskEngine::default();
        engine
            .apply_event(&EventEnvelope::new(1, GameEvent::BeginPlaying))
            .unwrap();
        let before = engine.state().clone();

        let err = engine
            .apply_event(&EventEnvelope::new(3, choice(100, 0, 0)))
            .unwrap_err();
        assert_eq!(err, EngineError::Sequence { expected: 2, got: 3 });
        assert_eq!(engine.state(), &before);
        assert_eq!(engine.last_sequence(), 1);
    }

    #[test]
    fn test_schema_version_rejected() {
        let mut engine = RiskEngine::default();
        let mut env = EventEnvelope::new(1, GameEvent::BeginPlaying);
        env.schema_version = 2;
        assert_eq!(
            engine.apply_event(&env).unwrap_err(),
            EngineError::SchemaVersion {
                expected: 1,
                got: 2
            }
        );
        assert_eq!(engine.last_sequence(), 0);
    }

    #[test]
    fn test_noop_event_still_advances_sequence() {
        let mut engine = RiskEngine::default();
        let (state, outcome) = engine
            .apply_event(&EventEnvelope::new(1, choice(500, 0, 0)))
            .unwrap();
        assert_eq!(state.phase, Phase::Menu);
        assert!(!outcome.applied);
        assert_eq!(engine.last_sequence(), 1);
    }

    #[test]
    fn test_replay_resets_first() {
        let events = sequence_events([GameEvent::BeginPlaying, choice(-500, 800, 1200)]);
        let mut engine = RiskEngine::default();
        engine.apply_sequence(&events).unwrap();
        let first = engine.state().clone();

        let replayed = engine.replay(&events).unwrap();
        assert_eq!(replayed, &first);
        assert_eq!((first.doom, first.dystopia, first.path_position), (1000, 2800, 5700));
    }

    #[test]
    fn test_reset_after_game_over_allows_new_game() {
        let events = sequence_events([
            GameEvent::BeginPlaying,
            choice(0, 0, 5000),
            GameEvent::Reset,
            GameEvent::BeginPlaying,
        ]);
        let mut engine = RiskEngine::default();
        let state = engine.apply_sequence(&events).unwrap();
        assert_eq!(state.phase, Phase::Playing);
        assert_eq!(state.path_position, 4500);
    }
}
