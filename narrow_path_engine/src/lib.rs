#![forbid(unsafe_code)]

//! The Narrow Path — Risk State Engine.
//!
//! Pure, deterministic transitions over two risk meters (P(doom) and
//! dystopia) and the player's position on the path between them.

/// Engine v1. Behavioral changes require a new engine version.
pub const ENGINE_VERSION: u32 = 1;

pub mod arithmetic;
pub mod domain;
pub mod error;
pub mod events;
pub mod state;
pub mod transitions;
pub mod invariants;
pub mod hashing;
pub mod engine;

pub use domain::{Calibration, GameOverReason, Impact, Phase, RiskState, TransitionOutcome};
pub use engine::RiskEngine;
pub use error::{EngineError, InvariantViolation};
pub use events::{EventEnvelope, GameEvent};
pub use transitions::{apply_choice, begin_playing, conclude, reset_game};
