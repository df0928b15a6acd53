//! Replay orchestrator — rebuild state from an event journal.
//!
//! Delegates all domain logic to the engine.
//! No shortcuts, no cached state logic.

use narrow_path_engine::domain::{Calibration, RiskState};
use narrow_path_engine::engine::RiskEngine;
use narrow_path_engine::error::EngineError;
use narrow_path_engine::events::EventEnvelope;
use narrow_path_engine::hashing::canonical_hash;

/// Rebuild the game state from a sequence of events.
///
/// 1. Create fresh engine + state
/// 2. Pass each event sequentially to the engine
/// 3. Return (final_state, canonical_hash)
///
/// A pure function of the event stream and calibration.
pub fn rebuild_state(
    events: &[EventEnvelope],
    calibration: &Calibration,
) -> Result<(RiskState, String), EngineError> {
    let mut engine = RiskEngine::new(calibration.clone())?;
    let state = engine.apply_sequence(events)?.clone();
    let hash = canonical_hash(&state);
    Ok((state, hash))
}

/// Rebuild state and return only the canonical hash.
pub fn rebuild_hash(
    events: &[EventEnvelope],
    calibration: &Calibration,
) -> Result<String, EngineError> {
    rebuild_state(events, calibration).map(|(_, hash)| hash)
}
