//! Presidency Engine -- session driver, registry, snapshots and replay.
//!
//! This crate builds on [`presidency_core`] to run whole presidencies: a
//! [`Session`](session::Session) owns one stat vector and drives every action
//! through the turn pipeline (resolve, apply, evaluate achievements, evaluate
//! thresholds, commit, journal). Sessions can be snapshotted with a BLAKE3
//! state hash, recorded into an action log and replayed to verify
//! determinism.
//!
//! # Quick Start
//!
//! ```
//! use presidency_engine::prelude::*;
//!
//! let mut session = Session::new(
//!     SessionId(1),
//!     SessionConfig::default(),
//!     DeltaTables::builtin(),
//! ).unwrap();
//!
//! let outcome = session.act(&Action::new(ActionCategory::Law, "tax_cut")).unwrap();
//! assert_eq!(outcome.turn, 1);
//! assert_eq!(outcome.vector.laws, 1);
//! assert_eq!(outcome.unlocked[0].key, "first_law");
//!
//! let archive = session.end().unwrap();
//! assert!(session.is_concluded());
//! assert_eq!(archive.digest.len(), 64);
//! ```

#![deny(unsafe_code)]

pub mod config;
pub mod registry;
pub mod replay;
pub mod session;
pub mod snapshot;
pub mod wildcard;

use presidency_core::PresidencyError;

use crate::session::SessionId;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

/// Re-export the core crate for convenience.
pub use presidency_core;

/// Re-export the chronicle crate for convenience.
pub use presidency_chronicle;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced by session-level operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// An error from the resolution core or the archive encoder.
    #[error(transparent)]
    Core(#[from] PresidencyError),

    /// The session has ended and accepts no further actions.
    #[error("session {0} has concluded")]
    Concluded(SessionId),

    /// No session is registered under this id.
    #[error("session {0} does not exist (never opened or already closed)")]
    UnknownSession(SessionId),

    /// A thread panicked while holding the session's lock.
    #[error("session {0} is poisoned: a previous update panicked mid-turn")]
    Poisoned(SessionId),

    /// A snapshot's recorded hash does not match its contents.
    #[error("snapshot hash mismatch: recorded {recorded} but recomputed {recomputed}")]
    SnapshotMismatch {
        recorded: String,
        recomputed: String,
    },

    /// The session configuration is invalid.
    #[error("invalid session config: {0}")]
    Config(String),
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common engine usage.
pub mod prelude {
    pub use presidency_core::prelude::*;

    pub use crate::config::SessionConfig;
    pub use crate::registry::SessionRegistry;
    pub use crate::replay::{
        replay, ActionLog, ActionRecorder, LogEntry, ReplayDivergence, ReplayResult, TurnInput,
    };
    pub use crate::session::{
        Achievement, Action, ArchiveRecord, Session, SessionId, SessionRecord, TurnOutcome,
    };
    pub use crate::snapshot::SessionSnapshot;
    pub use crate::wildcard::CosmicDeck;
    pub use crate::SessionError;

    pub use presidency_chronicle::{ArchiveKind, EntryKind, Timeline, TimelineEntry};
}
