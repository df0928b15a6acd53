#![forbid(unsafe_code)]

//! The Narrow Path — runtime.
//!
//! Wraps the engine with scenario decks, play sessions, replay,
//! snapshots, drift detection, configuration, and the presentation
//! helpers (HUD readout, image prompts, checkout validation).
//!
//! No game rules live here; every transition and invariant is
//! delegated to `narrow_path_engine`.

pub mod config;
pub mod drift;
pub mod readout;
pub mod replay;
pub mod scenario;
pub mod session;
pub mod snapshot;
pub mod validation;
pub mod visual_context;
