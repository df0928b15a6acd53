//! Session manager — one play session with apply-before-journal semantics.
//!
//! Each session owns its engine, an in-memory event journal, and
//! snapshots keyed by sequence. Nothing is written to disk: a session
//! lives as long as the page that plays it.
//!
//! Apply-before-journal order:
//!   1. engine.apply_event(event)  — may reject (sequence, invariant)
//!   2. journal.push(event)        — only if step 1 succeeded
//!   3. snapshot if interval reached

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use thiserror::Error;

use narrow_path_engine::domain::{Calibration, Phase, RiskState, TransitionOutcome};
use narrow_path_engine::engine::RiskEngine;
use narrow_path_engine::error::EngineError;
use narrow_path_engine::events::{EventEnvelope, GameEvent};
use narrow_path_engine::hashing::canonical_hash;

use crate::config::RuntimeConfig;
use crate::replay;
use crate::scenario::{Choice, ScenarioDeck, ScenarioError};
use crate::snapshot::{self, Snapshot, SnapshotError};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Scenario(#[from] ScenarioError),
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
    #[error("replay produced hash {replayed}, live state has {live}")]
    ReplayDiverged { replayed: String, live: String },
}

/// An isolated play session with its own journal and state.
#[derive(Debug)]
pub struct Session {
    session_id: String,
    engine: RiskEngine,
    journal: Vec<EventEnvelope>,
    snapshots: BTreeMap<u64, Snapshot>,
    snapshot_interval: u64,
}

impl Session {
    /// Create a new session in the menu state of `calibration`.
    pub fn new(
        session_id: &str,
        calibration: Calibration,
        snapshot_interval: u64,
    ) -> Result<Self, SessionError> {
        let engine = RiskEngine::new(calibration)?;
        tracing::debug!(session_id, "session created");
        Ok(Self {
            session_id: session_id.to_string(),
            engine,
            journal: Vec::new(),
            snapshots: BTreeMap::new(),
            snapshot_interval,
        })
    }

    pub fn from_config(session_id: &str, config: &RuntimeConfig) -> Result<Self, SessionError> {
        Self::new(session_id, config.calibration.clone(), config.snapshot_interval)
    }

    /// Sequence and apply one event: validate via engine, then journal.
    pub fn submit(&mut self, event: GameEvent) -> Result<TransitionOutcome, SessionError> {
        let envelope = EventEnvelope::new(self.engine.last_sequence() + 1, event);
        self.apply_event(&envelope)
    }

    /// Apply an already sequenced event.
    pub fn apply_event(
        &mut self,
        envelope: &EventEnvelope,
    ) -> Result<TransitionOutcome, SessionError> {
        // Step 1: Apply to engine (may reject)
        let (state, outcome) = self.engine.apply_event(envelope)?;
        let state = state.clone();

        // Step 2: Journal (only if step 1 succeeded)
        self.journal.push(envelope.clone());

        // Step 3: Auto-snapshot at interval
        if self.snapshot_interval > 0 && envelope.sequence % self.snapshot_interval == 0 {
            self.snapshots
                .insert(envelope.sequence, snapshot::take_snapshot(envelope.sequence, &state));
        }

        tracing::debug!(
            session_id = %self.session_id,
            sequence = envelope.sequence,
            event_type = %outcome.event_type,
            applied = outcome.applied,
            "event accepted"
        );
        Ok(outcome)
    }

    pub fn begin_playing(&mut self) -> Result<TransitionOutcome, SessionError> {
        self.submit(GameEvent::BeginPlaying)
    }

    pub fn choose(&mut self, choice: &Choice) -> Result<TransitionOutcome, SessionError> {
        self.submit(GameEvent::ApplyChoice {
            impact: choice.impact,
        })
    }

    pub fn conclude(&mut self) -> Result<TransitionOutcome, SessionError> {
        self.submit(GameEvent::Conclude)
    }

    pub fn reset(&mut self) -> Result<TransitionOutcome, SessionError> {
        self.submit(GameEvent::Reset)
    }

    /// Full replay from the journal into a fresh engine.
    ///
    /// The replayed state must hash identically to the live one; on
    /// success the engine is swapped for the replayed one.
    pub fn replay_full(&mut self) -> Result<(RiskState, String), SessionError> {
        let (state, hash) = replay::rebuild_state(&self.journal, self.engine.calibration())?;
        let live = self.current_hash();
        if hash != live {
            return Err(SessionError::ReplayDiverged {
                replayed: hash,
                live,
            });
        }

        let mut engine = RiskEngine::new(self.engine.calibration().clone())?;
        engine.apply_sequence(&self.journal)?;
        self.engine = engine;
        Ok((state, hash))
    }

    /// Restore the state recorded in the latest snapshot.
    pub fn latest_snapshot_state(&self) -> Result<Option<(u64, RiskState)>, SessionError> {
        match self.snapshots.last_key_value() {
            Some((seq, snap)) => Ok(Some((*seq, snapshot::restore_snapshot(snap)?))),
            None => Ok(None),
        }
    }

    /// Get current state from the engine.
    pub fn state(&self) -> &RiskState {
        self.engine.state()
    }

    /// Get current canonical hash.
    pub fn current_hash(&self) -> String {
        canonical_hash(self.engine.state())
    }

    /// Get current sequence number.
    pub fn current_sequence(&self) -> u64 {
        self.engine.last_sequence()
    }

    pub fn journal(&self) -> &[EventEnvelope] {
        &self.journal
    }

    pub fn snapshots(&self) -> &BTreeMap<u64, Snapshot> {
        &self.snapshots
    }

    /// Get session ID.
    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}

/// Thread-safe session handle using Mutex.
///
/// Serializes calls from several input sources (a double click racing
/// a keyboard shortcut).
#[derive(Debug)]
pub struct SharedSession {
    inner: Mutex<Session>,
}

impl SharedSession {
    pub fn new(session: Session) -> Self {
        Self {
            inner: Mutex::new(session),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Session> {
        // The engine swaps state only after validation, so a poisoned
        // lock still guards a consistent session.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Submit event under lock.
    pub fn submit(&self, event: GameEvent) -> Result<TransitionOutcome, SessionError> {
        self.lock().submit(event)
    }

    pub fn choose(&self, choice: &Choice) -> Result<TransitionOutcome, SessionError> {
        self.lock().choose(choice)
    }

    /// Clone of the current state under lock.
    pub fn state(&self) -> RiskState {
        self.lock().state().clone()
    }

    /// Get current hash under lock.
    pub fn current_hash(&self) -> String {
        self.lock().current_hash()
    }

    /// Get current sequence under lock.
    pub fn current_sequence(&self) -> u64 {
        self.lock().current_sequence()
    }
}

/// A session driven through a scenario deck.
///
/// Answering a scenario applies the choice and advances the deck;
/// answering the last one while still on the path concludes the game.
#[derive(Debug)]
pub struct PlayThrough {
    session: Session,
    deck: ScenarioDeck,
}

impl PlayThrough {
    pub fn new(session: Session, deck: ScenarioDeck) -> Self {
        Self { session, deck }
    }

    pub fn start(&mut self) -> Result<TransitionOutcome, SessionError> {
        self.session.begin_playing()
    }

    /// Answer the current scenario with `choice_id`.
    ///
    /// Returns `None` when there is nothing to answer: the deck is
    /// exhausted or the game has not started or has ended.
    pub fn answer(&mut self, choice_id: &str) -> Result<Option<TransitionOutcome>, SessionError> {
        if self.session.state().phase != Phase::Playing {
            return Ok(None);
        }
        let Some(scenario) = self.deck.current() else {
            return Ok(None);
        };
        let choice = scenario.choice(choice_id)?.clone();

        let mut outcome = self.session.choose(&choice)?;
        self.deck.advance();

        if self.deck.is_exhausted() && !outcome.phase.is_terminal() {
            outcome = self.session.conclude()?;
        }
        Ok(Some(outcome))
    }

    /// Reset the game and rewind the deck.
    pub fn restart(&mut self) -> Result<TransitionOutcome, SessionError> {
        self.deck.rewind();
        self.session.reset()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn deck(&self) -> &ScenarioDeck {
        &self.deck
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use narrow_path_engine::domain::{GameOverReason, Impact};
    use std::sync::Arc;

    use crate::scenario::ScenarioCatalog;

    const DECK: &str = r#"[
        { "id": "ai-summit", "title": "Summit", "description": "d", "choices": [
            { "id": "1", "text": "moratorium", "impact": { "doom": -0.05, "dystopia": 0.08, "path": 0.12 } },
            { "id": "2", "text": "race", "impact": { "doom": 0.9 } } ] },
        { "id": "tech-startup", "title": "Startup", "description": "d", "choices": [
            { "id": "1", "text": "open source", "impact": { "doom": 0.02, "path": -0.02 } } ] }
    ]"#;

    fn session(interval: u64) -> Session {
        Session::new("test", Calibration::default(), interval).unwrap()
    }

    fn moratorium() -> Choice {
        Choice {
            id: "1".to_string(),
            text: "moratorium".to_string(),
            impact: Impact::new(-500, 800, 1200),
            description: None,
        }
    }

    #[test]
    fn test_submit_assigns_sequences() {
        let mut s = session(0);
        s.begin_playing().unwrap();
        let outcome = s.choose(&moratorium()).unwrap();
        assert!(outcome.applied);
        assert_eq!(s.current_sequence(), 2);
        assert_eq!(s.journal().len(), 2);
        assert_eq!(s.state().doom, 1000);
        assert_eq!(s.state().dystopia, 2800);
        assert_eq!(s.state().path_position, 5700);
    }

    #[test]
    fn test_rejected_event_is_not_journaled() {
        let mut s = session(0);
        let stale = EventEnvelope::new(5, GameEvent::BeginPlaying);
        assert!(matches!(
            s.apply_event(&stale),
            Err(SessionError::Engine(EngineError::Sequence { .. }))
        ));
        assert!(s.journal().is_empty());
        assert_eq!(s.state().phase, Phase::Menu);
    }

    #[test]
    fn test_wrong_phase_choice_is_journaled_noop() {
        let mut s = session(0);
        let before = s.current_hash();
        let outcome = s.choose(&moratorium()).unwrap();
        assert!(!outcome.applied);
        assert_eq!(s.current_hash(), before);
        assert_eq!(s.journal().len(), 1);
    }

    #[test]
    fn test_snapshots_at_interval() {
        let mut s = session(2);
        s.begin_playing().unwrap();
        assert!(s.latest_snapshot_state().unwrap().is_none());
        s.choose(&moratorium()).unwrap();
        s.choose(&moratorium()).unwrap();
        assert_eq!(s.snapshots().keys().copied().collect::<Vec<_>>(), vec![2]);
        let (seq, state) = s.latest_snapshot_state().unwrap().unwrap();
        assert_eq!(seq, 2);
        assert_eq!(state.doom, 1000);
    }

    #[test]
    fn test_replay_full_matches_live() {
        let mut s = session(0);
        s.begin_playing().unwrap();
        s.choose(&moratorium()).unwrap();
        s.conclude().unwrap();
        let live = s.current_hash();
        let (state, hash) = s.replay_full().unwrap();
        assert_eq!(hash, live);
        assert_eq!(state.game_over_reason(), Some(GameOverReason::Success));
        assert_eq!(s.current_sequence(), 3);
    }

    #[test]
    fn test_shared_session_serializes_submissions() {
        let shared = Arc::new(SharedSession::new(session(0)));
        shared.submit(GameEvent::BeginPlaying).unwrap();
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let shared = Arc::clone(&shared);
                std::thread::spawn(move || shared.choose(&moratorium()).unwrap())
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(shared.current_sequence(), 5);
        // The third moratorium pushes the path past the control bound.
        assert_eq!(
            shared.state().phase,
            Phase::GameOver {
                reason: GameOverReason::Dystopia
            }
        );
        assert_eq!(shared.state().doom, 0);
    }

    #[test]
    fn test_play_through_concludes_with_success() {
        let deck = ScenarioDeck::new(ScenarioCatalog::from_json_str(DECK).unwrap());
        let mut play = PlayThrough::new(session(0), deck);
        assert!(play.answer("1").unwrap().is_none());
        play.start().unwrap();

        let first = play.answer("1").unwrap().unwrap();
        assert_eq!(first.phase, Phase::Playing);
        let last = play.answer("1").unwrap().unwrap();
        assert_eq!(
            last.phase,
            Phase::GameOver {
                reason: GameOverReason::Success
            }
        );
        assert!(play.answer("1").unwrap().is_none());
        assert_eq!(play.session().current_sequence(), 4);
    }

    #[test]
    fn test_play_through_stops_on_game_over() {
        let deck = ScenarioDeck::new(ScenarioCatalog::from_json_str(DECK).unwrap());
        let mut play = PlayThrough::new(session(0), deck);
        play.start().unwrap();
        let outcome = play.answer("2").unwrap().unwrap();
        assert_eq!(
            outcome.phase,
            Phase::GameOver {
                reason: GameOverReason::Doom
            }
        );
        assert!(play.answer("1").unwrap().is_none());
        assert_eq!(play.deck().answered(), 1);

        play.restart().unwrap();
        assert_eq!(play.session().state().phase, Phase::Menu);
        assert_eq!(play.deck().answered(), 0);
    }

    #[test]
    fn test_play_through_unknown_choice() {
        let deck = ScenarioDeck::new(ScenarioCatalog::from_json_str(DECK).unwrap());
        let mut play = PlayThrough::new(session(0), deck);
        play.start().unwrap();
        assert!(matches!(
            play.answer("9"),
            Err(SessionError::Scenario(ScenarioError::UnknownChoice { .. }))
        ));
        assert_eq!(play.deck().answered(), 0);
    }
}
