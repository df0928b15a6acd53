/// Narrow Path Engine — Canonical Hashing
///
/// Deterministic canonical serialization + SHA-256 hashing.
/// Produces byte-identical output across platforms.
///
/// Rules:
///   - Fixed field order: engine_version, doom, dystopia, path_position,
///     phase, game_over_reason, calibration
///   - game_over_reason is null unless the phase is game_over
///   - Calibration fields in declaration order
///   - UTF-8 JSON, no whitespace, no float

use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::domain::{Calibration, RiskState};
use crate::ENGINE_VERSION;

/// Canonical serialization of RiskState to UTF-8 JSON bytes.
pub fn canonical_serialize(state: &RiskState) -> Vec<u8> {
    build_canonical_value(state).to_string().into_bytes()
}

/// SHA-256 of canonical serialization. Lowercase hex string.
pub fn canonical_hash(state: &RiskState) -> String {
    sha256_hex(&canonical_serialize(state))
}

/// Lowercase hex SHA-256 of arbitrary bytes.
pub fn sha256_hex(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

/// Build the canonical serde_json::Value in strict field order.
///
/// Relies on serde_json's `preserve_order` feature: Map keeps
/// insertion order.
fn build_canonical_value(state: &RiskState) -> Value {
    let mut root = Map::new();
    // engine_version MUST be first: it binds the hash to the engine.
    root.insert(
        "engine_version".to_string(),
        Value::Number(ENGINE_VERSION.into()),
    );
    root.insert("doom".to_string(), Value::Number(state.doom.into()));
    root.insert("dystopia".to_string(), Value::Number(state.dystopia.into()));
    root.insert(
        "path_position".to_string(),
        Value::Number(state.path_position.into()),
    );
    root.insert(
        "phase".to_string(),
        Value::String(state.phase.as_str().to_string()),
    );
    root.insert(
        "game_over_reason".to_string(),
        match state.game_over_reason() {
            Some(reason) => Value::String(reason.as_str().to_string()),
            None => Value::Null,
        },
    );
    root.insert(
        "calibration".to_string(),
        calibration_value(&state.calibration),
    );
    Value::Object(root)
}

fn calibration_value(c: &Calibration) -> Value {
    let mut map = Map::new();
    for (key, value) in [
        ("initial_doom", c.initial_doom),
        ("initial_dystopia", c.initial_dystopia),
        ("initial_path_position", c.initial_path_position),
        ("meter_loss_threshold", c.meter_loss_threshold),
        ("path_lower_bound", c.path_lower_bound),
        ("path_upper_bound", c.path_upper_bound),
    ] {
        map.insert(key.to_string(), Value::Number(value.into()));
    }
    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{GameOverReason, Phase};

    #[test]
    fn test_canonical_serialize_default_state() {
        let json = String::from_utf8(canonical_serialize(&RiskState::default())).unwrap();
        assert_eq!(
            json,
            "{\"engine_version\":1,\"doom\":1500,\"dystopia\":2000,\"path_position\":4500,\
             \"phase\":\"menu\",\"game_over_reason\":null,\"calibration\":{\"initial_doom\":1500,\
             \"initial_dystopia\":2000,\"initial_path_position\":4500,\"meter_loss_threshold\":10000,\
             \"path_lower_bound\":1000,\"path_upper_bound\":9000}}"
        );
    }

    #[test]
    fn test_game_over_reason_serialized() {
        let s = RiskState {
            phase: Phase::GameOver {
                reason: GameOverReason::Dystopia,
            },
            ..RiskState::default()
        };
        let json = String::from_utf8(canonical_serialize(&s)).unwrap();
        assert!(json.contains("\"phase\":\"game_over\",\"game_over_reason\":\"dystopia\""));
    }

    #[test]
    fn test_hash_is_lowercase_hex() {
        let h = canonical_hash(&RiskState::default());
        assert_eq!(h.len(), 64);
        assert!(h.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn test_hash_distinguishes_phase() {
        let menu = RiskState::default();
        let playing = RiskState {
            phase: Phase::Playing,
            ..RiskState::default()
        };
        assert_ne!(canonical_hash(&menu), canonical_hash(&playing));
    }
}
