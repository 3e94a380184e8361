//! Session snapshot and restore with BLAKE3 hashing.
//!
//! A [`SessionSnapshot`] holds everything that affects how a session will
//! respond to future actions: config, vector, turn, unlocked achievements,
//! conclusion state and the wildcard deck position. Its `hash` is a BLAKE3
//! digest of the canonical JSON of that state, with wall-clock timestamps
//! left out, so two sessions that went through the same turns hash the same.
//!
//! ```
//! use presidency_engine::prelude::*;
//!
//! let mut session =
//!     Session::new(SessionId(1), SessionConfig::default(), DeltaTables::builtin()).unwrap();
//! let fork = session.capture_snapshot().unwrap();
//!
//! session.act(&Action::new(ActionCategory::Law, "martial_law")).unwrap();
//! let hash_a = session.state_hash().unwrap();
//!
//! session.restore_from_snapshot(&fork).unwrap();
//! assert_eq!(session.turn(), 0);
//! session.act(&Action::new(ActionCategory::Law, "martial_law")).unwrap();
//! assert_eq!(session.state_hash().unwrap(), hash_a);
//! ```
//!
//! # What Is NOT Restored
//!
//! - **Timeline**: reset to empty on restore.
//! - **Archives**: sealed archives stay attached to the session.
//! - **Tables**: the session keeps its own ruleset.

use presidency_chronicle::canonical_json;
use presidency_core::prelude::{GameOverReason, StatVector};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::SessionConfig;
use crate::session::{Achievement, Session, SessionId};
use crate::wildcard::CosmicDeck;
use crate::SessionError;

/// A serializable snapshot of a session's simulation state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Session the snapshot was taken from. Not part of the hash.
    pub session_id: SessionId,
    /// Config the session runs under.
    pub config: SessionConfig,
    /// Current stat vector.
    pub vector: StatVector,
    /// Turns resolved so far.
    pub turn: u64,
    /// Achievements unlocked so far.
    pub achievements: Vec<Achievement>,
    /// Why the session ended, if it has.
    pub concluded: Option<GameOverReason>,
    /// Draws made from the wildcard deck.
    pub deck_draws: u64,
    /// BLAKE3 hex digest of the hashable state.
    pub hash: String,
}

fn compute_hash(
    config: &SessionConfig,
    vector: &StatVector,
    turn: u64,
    achievements: &[Achievement],
    concluded: Option<GameOverReason>,
    deck_draws: u64,
) -> Result<String, SessionError> {
    #[derive(Serialize)]
    struct HashableState<'a> {
        config: &'a SessionConfig,
        vector: &'a StatVector,
        turn: u64,
        achievements: Vec<(&'a str, u64)>,
        concluded: Option<GameOverReason>,
        deck_draws: u64,
    }

    let hashable = HashableState {
        config,
        vector,
        turn,
        achievements: achievements
            .iter()
            .map(|a| (a.key.as_str(), a.turn))
            .collect(),
        concluded,
        deck_draws,
    };
    let bytes = canonical_json(&hashable)?;
    Ok(blake3::hash(&bytes).to_hex().to_string())
}

impl Session {
    /// BLAKE3 hex digest of the current simulation state.
    pub fn state_hash(&self) -> Result<String, SessionError> {
        compute_hash(
            &self.config,
            &self.vector,
            self.turn,
            &self.achievements,
            self.concluded,
            self.deck.draws(),
        )
    }

    /// Capture the current state, hashed with [`state_hash`](Self::state_hash).
    pub fn capture_snapshot(&self) -> Result<SessionSnapshot, SessionError> {
        Ok(SessionSnapshot {
            session_id: self.id,
            config: self.config.clone(),
            vector: self.vector,
            turn: self.turn,
            achievements: self.achievements.clone(),
            concluded: self.concluded,
            deck_draws: self.deck.draws(),
            hash: self.state_hash()?,
        })
    }

    /// Restore state from a snapshot, possibly one taken from another
    /// session. Achievement records are re-attributed to this session.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::SnapshotMismatch`] if the snapshot's hash does
    /// not match its contents, or a config / vector validation error. The
    /// session is not modified on error.
    pub fn restore_from_snapshot(
        &mut self,
        snapshot: &SessionSnapshot,
    ) -> Result<(), SessionError> {
        let recomputed = compute_hash(
            &snapshot.config,
            &snapshot.vector,
            snapshot.turn,
            &snapshot.achievements,
            snapshot.concluded,
            snapshot.deck_draws,
        )?;
        if recomputed != snapshot.hash {
            return Err(SessionError::SnapshotMismatch {
                recorded: snapshot.hash.clone(),
                recomputed,
            });
        }
        snapshot.config.validate()?;
        snapshot.vector.validate()?;

        self.config = snapshot.config.clone();
        self.vector = snapshot.vector;
        self.turn = snapshot.turn;
        self.achievements = snapshot
            .achievements
            .iter()
            .cloned()
            .map(|mut a| {
                a.session_id = self.id;
                a
            })
            .collect();
        self.unlocked = self.achievements.iter().map(|a| a.key.clone()).collect();
        self.concluded = snapshot.concluded;
        self.deck = CosmicDeck::resume(snapshot.config.seed, snapshot.deck_draws);
        self.timeline = presidency_chronicle::Timeline::new();

        debug!(
            session = %self.id,
            turn = self.turn,
            hash = %snapshot.hash,
            "restored from snapshot"
        );
        Ok(())
    }
}
