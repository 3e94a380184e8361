//! Deterministic replay with action recording and checkpoint verification.
//!
//! An [`ActionRecorder`] captures the input of every turn plus periodic
//! state-hash checkpoints into an [`ActionLog`]. [`replay`] restores the
//! log's initial snapshot, feeds the recorded inputs back turn by turn and
//! compares hashes at each checkpoint.
//!
//! # Recording
//!
//! ```
//! use presidency_engine::prelude::*;
//!
//! let mut session =
//!     Session::new(SessionId(1), SessionConfig::default(), DeltaTables::builtin()).unwrap();
//! let mut recorder = ActionRecorder::new(session.capture_snapshot().unwrap(), 2);
//!
//! let tax_cut = Action::new(ActionCategory::Law, "tax_cut");
//! recorder.play(&mut session, TurnInput::Action(tax_cut)).unwrap();
//! recorder.play(&mut session, TurnInput::Wildcard).unwrap();
//! let log = recorder.finish();
//!
//! let mut fresh =
//!     Session::new(SessionId(2), SessionConfig::default(), DeltaTables::builtin()).unwrap();
//! let result = replay(&mut fresh, &log).unwrap();
//! assert!(result.completed);
//! assert!(result.first_divergence.is_none());
//! assert_eq!(fresh.state_hash().unwrap(), session.state_hash().unwrap());
//! ```

use std::collections::BTreeMap;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::session::{Action, Session, TurnOutcome};
use crate::snapshot::SessionSnapshot;
use crate::SessionError;

// ---------------------------------------------------------------------------
// TurnInput
// ---------------------------------------------------------------------------

/// What the player did on one turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnInput {
    Action(Action),
    /// A draw from the session's cosmic deck.
    Wildcard,
}

impl TurnInput {
    /// Apply this input to `session` as one turn.
    pub fn apply(&self, session: &mut Session) -> Result<TurnOutcome, SessionError> {
        match self {
            TurnInput::Action(action) => session.act(action),
            TurnInput::Wildcard => session.draw_wildcard(),
        }
    }
}

// ---------------------------------------------------------------------------
// ActionLog
// ---------------------------------------------------------------------------

/// Initial snapshot plus the ordered inputs and checkpoints that followed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionLog {
    /// State the recording started from.
    pub initial_snapshot: SessionSnapshot,
    /// Number of turns recorded. Replay runs exactly this many.
    pub total_turns: u64,
    /// Inputs and checkpoints in recording order.
    pub entries: Vec<LogEntry>,
}

/// One entry of an [`ActionLog`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum LogEntry {
    /// The input applied when the session's turn counter read `turn`.
    Input { turn: u64, input: TurnInput },
    /// State hash taken before the input at `turn` was applied.
    Checkpoint { turn: u64, state_hash: String },
}

// ---------------------------------------------------------------------------
// ReplayResult
// ---------------------------------------------------------------------------

/// Outcome of [`replay`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayResult {
    /// `true` if every turn replayed without divergence.
    pub completed: bool,
    /// Turns applied before replay stopped.
    pub turns_replayed: u64,
    /// First checkpoint whose hash did not match, if any.
    pub first_divergence: Option<ReplayDivergence>,
}

/// A checkpoint whose recorded hash did not match the replayed state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayDivergence {
    /// Turn whose checkpoint failed.
    pub turn: u64,
    /// Hash recorded in the log.
    pub expected_hash: String,
    /// Hash computed during replay.
    pub actual_hash: String,
}

// ---------------------------------------------------------------------------
// ActionRecorder
// ---------------------------------------------------------------------------

/// Records a session's turns into an [`ActionLog`].
///
/// Turns must be recorded in strictly increasing order.
pub struct ActionRecorder {
    log: ActionLog,
    checkpoint_interval: u64,
    last_turn: Option<u64>,
}

impl ActionRecorder {
    /// `checkpoint_interval` of 10 checkpoints turns 0, 10, 20, ...; 0 means
    /// every turn that supplies a hash.
    pub fn new(snapshot: SessionSnapshot, checkpoint_interval: u64) -> Self {
        Self {
            log: ActionLog {
                initial_snapshot: snapshot,
                total_turns: 0,
                entries: Vec::new(),
            },
            checkpoint_interval,
            last_turn: None,
        }
    }

    /// Record one turn's input, and a checkpoint if `state_hash` is given and
    /// the turn falls on the interval.
    ///
    /// # Panics
    ///
    /// Panics if `turn` is not strictly greater than the previous turn.
    pub fn record_turn(&mut self, turn: u64, input: &TurnInput, state_hash: Option<String>) {
        if let Some(prev) = self.last_turn {
            assert!(
                turn > prev,
                "ActionRecorder::record_turn: turn {turn} is not after previous turn {prev}"
            );
        }
        self.last_turn = Some(turn);
        self.log.total_turns += 1;

        if let Some(hash) = state_hash {
            if self.checkpoint_interval == 0 || turn % self.checkpoint_interval == 0 {
                self.log.entries.push(LogEntry::Checkpoint {
                    turn,
                    state_hash: hash,
                });
            }
        }
        self.log.entries.push(LogEntry::Input {
            turn,
            input: input.clone(),
        });
    }

    /// Apply `input` to `session` and record it. Nothing is recorded if the
    /// turn fails.
    pub fn play(
        &mut self,
        session: &mut Session,
        input: TurnInput,
    ) -> Result<TurnOutcome, SessionError> {
        let turn = session.turn();
        let hash = session.state_hash()?;
        let outcome = input.apply(session)?;
        self.record_turn(turn, &input, Some(hash));
        Ok(outcome)
    }

    /// Stop recording and return the log.
    pub fn finish(self) -> ActionLog {
        self.log
    }
}

// ---------------------------------------------------------------------------
// replay()
// ---------------------------------------------------------------------------

/// Replay `log` on `session`, verifying determinism at every checkpoint.
///
/// The log is validated before the session is touched: duplicate entries,
/// turns without an input and turn-range overflow are errors, and leave the
/// session unmodified. Replay stops at the first divergence.
pub fn replay(session: &mut Session, log: &ActionLog) -> anyhow::Result<ReplayResult> {
    let mut inputs: BTreeMap<u64, &TurnInput> = BTreeMap::new();
    let mut checkpoints: BTreeMap<u64, &str> = BTreeMap::new();

    for entry in &log.entries {
        match entry {
            LogEntry::Input { turn, input } => {
                if inputs.insert(*turn, input).is_some() {
                    anyhow::bail!("action log contains duplicate input at turn {turn}");
                }
            }
            LogEntry::Checkpoint { turn, state_hash } => {
                if checkpoints.insert(*turn, state_hash.as_str()).is_some() {
                    anyhow::bail!("action log contains duplicate checkpoint at turn {turn}");
                }
            }
        }
    }

    let start = log.initial_snapshot.turn;
    let end = start.checked_add(log.total_turns).ok_or_else(|| {
        anyhow::anyhow!(
            "turn range overflow: start ({start}) + total_turns ({}) exceeds u64::MAX",
            log.total_turns
        )
    })?;
    if let Some(missing) = (start..end).find(|turn| !inputs.contains_key(turn)) {
        anyhow::bail!("action log has no input for turn {missing}");
    }

    session
        .restore_from_snapshot(&log.initial_snapshot)
        .context("failed to restore initial snapshot for replay")?;

    let mut turns_replayed = 0;
    for turn in start..end {
        if let Some(expected) = checkpoints.get(&turn) {
            let actual = session.state_hash()?;
            if actual != *expected {
                return Ok(ReplayResult {
                    completed: false,
                    turns_replayed,
                    first_divergence: Some(ReplayDivergence {
                        turn,
                        expected_hash: (*expected).to_owned(),
                        actual_hash: actual,
                    }),
                });
            }
        }

        let input = inputs
            .get(&turn)
            .with_context(|| format!("action log has no input for turn {turn}"))?;
        input
            .apply(session)
            .with_context(|| format!("replaying turn {turn}"))?;
        turns_replayed += 1;
    }

    Ok(ReplayResult {
        completed: true,
        turns_replayed,
        first_divergence: None,
    })
}
