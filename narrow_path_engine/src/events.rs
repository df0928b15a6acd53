/// Narrow Path Engine — Event Definitions
///
/// Events are pure data. They carry intent and payload only.
/// They contain ZERO transition logic.
///
/// Schema version is locked at 1. Events with schema_version != 1
/// are rejected by the engine.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::Impact;
use crate::error::EngineError;

/// Schema version for v1 engine events. Hardcoded, never changes.
pub const SCHEMA_VERSION: u32 = 1;

/// Every input the engine accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "event_type")]
pub enum GameEvent {
    BeginPlaying,
    ApplyChoice { impact: Impact },
    Conclude,
    Reset,
}

impl GameEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            GameEvent::BeginPlaying => "begin_playing",
            GameEvent::ApplyChoice { .. } => "apply_choice",
            GameEvent::Conclude => "conclude",
            GameEvent::Reset => "reset",
        }
    }
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Sequenced event envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub sequence: u64,
    pub event: GameEvent,
}

impl EventEnvelope {
    pub fn new(sequence: u64, event: GameEvent) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            sequence,
            event,
        }
    }

    /// Parse an envelope from a serde_json::Value (fixtures, journals).
    pub fn from_value(v: &Value) -> Result<Self, EngineError> {
        serde_json::from_value(v.clone()).map_err(|e| EngineError::MalformedEvent(e.to_string()))
    }

    pub fn to_value(&self) -> Value {
        serde_json::json!({
            "schema_version": self.schema_version,
            "sequence": self.sequence,
            "event": self.event,
        })
    }
}

/// Number an event stream 1..=n in order.
pub fn sequence_events(events: impl IntoIterator<Item = GameEvent>) -> Vec<EventEnvelope> {
    events
        .into_iter()
        .zip(1u64..)
        .map(|(event, seq)| EventEnvelope::new(seq, event))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_parses_apply_choice() {
        let v = serde_json::json!({
            "sequence": 2,
            "event": {
                "event_type": "apply_choice",
                "impact": { "doom_delta": -500, "dystopia_delta": 800, "path_delta": 1200 }
            }
        });
        let env = EventEnvelope::from_value(&v).unwrap();
        assert_eq!(env.schema_version, SCHEMA_VERSION);
        assert_eq!(env.sequence, 2);
        assert_eq!(
            env.event,
            GameEvent::ApplyChoice {
                impact: Impact::new(-500, 800, 1200)
            }
        );
    }

    #[test]
    fn test_envelope_rejects_unknown_event() {
        let v = serde_json::json!({
            "sequence": 1,
            "event": { "event_type": "teleport" }
        });
        let err = EventEnvelope::from_value(&v).unwrap_err();
        assert!(matches!(err, EngineError::MalformedEvent(_)));
    }

    #[test]
    fn test_to_value_round_trips() {
        let env = EventEnvelope::new(7, GameEvent::Conclude);
        assert_eq!(EventEnvelope::from_value(&env.to_value()).unwrap(), env);
    }

    #[test]
    fn test_sequence_events_numbers_from_one() {
        let envs = sequence_events([GameEvent::BeginPlaying, GameEvent::Reset]);
        assert_eq!(envs[0].sequence, 1);
        assert_eq!(envs[1].sequence, 2);
        assert_eq!(envs[1].event.event_type(), "reset");
    }
}
