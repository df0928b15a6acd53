//! Snapshot layer — deterministic state snapshots.
//!
//! Snapshots contain canonical JSON + hash for verification.
//! No timestamps in snapshot content (determinism).
//!
//! Sessions keep snapshots in memory; `to_json` / `from_json` let a
//! presentation layer carry one across a page reload if it wants to.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use narrow_path_engine::domain::{Calibration, GameOverReason, Phase, RiskState};
use narrow_path_engine::error::InvariantViolation;
use narrow_path_engine::hashing::{canonical_hash, canonical_serialize, sha256_hex};
use narrow_path_engine::invariants::validate_invariants;
use narrow_path_engine::ENGINE_VERSION;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot hash mismatch: recorded {recorded}, computed {computed}")]
    HashMismatch { recorded: String, computed: String },
    #[error("snapshot engine version {got}, expected {expected}")]
    EngineVersion { expected: u32, got: u32 },
    #[error("bad snapshot: {0}")]
    Malformed(String),
    #[error("snapshot JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("restored state is invalid: {0}")]
    Invariant(#[from] InvariantViolation),
}

/// Snapshot format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Sequence number at which this snapshot was taken.
    pub sequence: u64,
    /// Canonical JSON of the state (UTF-8).
    pub canonical_json: String,
    /// SHA-256 of the canonical JSON.
    pub hash: String,
    /// Engine version at snapshot time.
    pub engine_version: u32,
}

impl Snapshot {
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Take a deterministic snapshot of `state`.
pub fn take_snapshot(sequence: u64, state: &RiskState) -> Snapshot {
    let canonical_json = String::from_utf8_lossy(&canonical_serialize(state)).into_owned();
    Snapshot {
        sequence,
        canonical_json,
        hash: canonical_hash(state),
        engine_version: ENGINE_VERSION,
    }
}

/// Verify a snapshot's internal hash consistency.
pub fn verify_snapshot_hash(snap: &Snapshot) -> bool {
    sha256_hex(snap.canonical_json.as_bytes()) == snap.hash
}

/// Rebuild the state a snapshot describes.
///
/// Checks engine version and hash, parses the canonical JSON, validates
/// invariants, and requires the state to re-serialize byte-identically.
pub fn restore_snapshot(snap: &Snapshot) -> Result<RiskState, SnapshotError> {
    if snap.engine_version != ENGINE_VERSION {
        return Err(SnapshotError::EngineVersion {
            expected: ENGINE_VERSION,
            got: snap.engine_version,
        });
    }
    let computed = sha256_hex(snap.canonical_json.as_bytes());
    if computed != snap.hash {
        return Err(SnapshotError::HashMismatch {
            recorded: snap.hash.clone(),
            computed,
        });
    }

    let value: Value = serde_json::from_str(&snap.canonical_json)?;
    let state = parse_canonical(&value)?;
    validate_invariants(&state)?;

    if canonical_hash(&state) != snap.hash {
        return Err(SnapshotError::Malformed(
            "canonical JSON is not in canonical form".to_string(),
        ));
    }
    Ok(state)
}

fn parse_canonical(v: &Value) -> Result<RiskState, SnapshotError> {
    let phase = match (str_field(v, "phase")?, &v["game_over_reason"]) {
        ("menu", Value::Null) => Phase::Menu,
        ("playing", Value::Null) => Phase::Playing,
        ("game_over", Value::String(reason)) => Phase::GameOver {
            reason: parse_reason(reason)?,
        },
        (phase, reason) => {
            return Err(SnapshotError::Malformed(format!(
                "phase {:?} with game_over_reason {}",
                phase, reason
            )))
        }
    };
    let calibration: Calibration = serde_json::from_value(v["calibration"].clone())?;

    Ok(RiskState {
        doom: int_field(v, "doom")?,
        dystopia: int_field(v, "dystopia")?,
        path_position: int_field(v, "path_position")?,
        phase,
        calibration,
    })
}

fn parse_reason(reason: &str) -> Result<GameOverReason, SnapshotError> {
    match reason {
        "doom" => Ok(GameOverReason::Doom),
        "dystopia" => Ok(GameOverReason::Dystopia),
        "success" => Ok(GameOverReason::Success),
        other => Err(SnapshotError::Malformed(format!(
            "unknown game_over_reason {:?}",
            other
        ))),
    }
}

fn int_field(v: &Value, key: &str) -> Result<i64, SnapshotError> {
    v[key]
        .as_i64()
        .ok_or_else(|| SnapshotError::Malformed(format!("missing integer field {:?}", key)))
}

fn str_field<'a>(v: &'a Value, key: &str) -> Result<&'a str, SnapshotError> {
    v[key]
        .as_str()
        .ok_or_else(|| SnapshotError::Malformed(format!("missing string field {:?}", key)))
}
