//! The session driver: one presidency, one stat vector, one turn at a time.
//!
//! [`Session::act`] runs the turn pipeline:
//!
//! 1. Reject the action if the session has concluded.
//! 2. Validate the current vector. A corrupt vector is rejected before
//!    anything is touched.
//! 3. Resolve the action's delta against the session's tables and apply it.
//! 4. Evaluate achievements on the new vector, then the mythic branch.
//! 5. Evaluate game over (with the session's chaos threshold) and rebellion
//!    risk.
//! 6. Commit everything at once: vector, turn counter, unlocked keys,
//!    achievement records, timeline entries. If the session ended, it is
//!    concluded and an automatic archive is sealed.
//!
//! Steps 1-5 never mutate the session, so a failed turn leaves it exactly as
//! it was.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use presidency_chronicle::{ArchiveKind, SealedArchive, Timeline, TimelineEntry};
use presidency_core::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::SessionConfig;
use crate::wildcard::CosmicDeck;
use crate::SessionError;

// ---------------------------------------------------------------------------
// Identifiers and records
// ---------------------------------------------------------------------------

/// Identifies one session within a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A player action as received from the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// Category the key is looked up in.
    pub category: ActionCategory,
    /// Action key, normalized on lookup.
    pub key: String,
    /// Crisis resolution method; ignored for other categories.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
}

impl Action {
    /// An action with no crisis method.
    pub fn new(category: ActionCategory, key: impl Into<String>) -> Self {
        Self {
            category,
            key: key.into(),
            method: None,
        }
    }

    /// Set the crisis method, e.g. `"bold"`.
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }
}

/// An achievement unlocked in a specific session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Achievement {
    /// Session the achievement belongs to.
    pub session_id: SessionId,
    /// Rule key, e.g. `"first_law"`.
    pub key: String,
    /// Human-readable description.
    pub description: String,
    /// Turn on which it was unlocked.
    pub turn: u64,
    /// Wall-clock unlock time, Unix milliseconds.
    pub unlocked_at_ms: u64,
}

/// A sealed archive attached to a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchiveRecord {
    /// Session the archive was sealed from.
    pub session_id: SessionId,
    /// Automatic or manual.
    pub kind: ArchiveKind,
    /// Turn counter when sealed.
    pub turn: u64,
    /// Glyph rendering of the payload.
    pub glyphs: String,
    /// BLAKE3 hex digest of the payload.
    pub digest: String,
    /// The archived session view.
    pub payload: serde_json::Value,
}

/// Everything a caller needs to know about one resolved turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnOutcome {
    /// Turn number this outcome belongs to.
    pub turn: u64,
    /// Vector after the turn.
    pub vector: StatVector,
    /// Delta that was applied.
    pub delta: ActionDelta,
    /// `true` if the action key was unknown and the fallback delta applied.
    pub fallback: bool,
    /// Achievements unlocked this turn, in evaluation order.
    pub unlocked: Vec<Achievement>,
    /// Rebellion risk after the turn.
    pub rebellion: RebellionRisk,
    /// Game-over verdict after the turn.
    pub game_over: GameOver,
    /// The automatic archive, present when this turn ended the session.
    pub archive: Option<ArchiveRecord>,
}

/// The persistent state of a session between processes.
///
/// A record carries what the turn pipeline reads on the next turn besides
/// the config and tables: the vector, the turn counter, the achievements
/// already unlocked, and how far the cosmic deck has been drawn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Vector at the end of the last resolved turn.
    pub vector: StatVector,
    /// Turns resolved so far.
    pub turn: u64,
    /// Achievements unlocked so far.
    #[serde(default)]
    pub achievements: Vec<Achievement>,
    /// Cosmic deck position.
    #[serde(default)]
    pub deck_draws: u64,
}

/// The archived view of a session. Timestamps are left out so the same
/// history always produces the same digest.
#[derive(Serialize)]
struct ArchivePayload<'a> {
    president: &'a str,
    turn: u64,
    vector: &'a StatVector,
    achievements: Vec<&'a str>,
    concluded: Option<GameOverReason>,
    timeline: Vec<String>,
}

pub(crate) fn unix_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// One presidency.
#[derive(Debug, Clone)]
pub struct Session {
    pub(crate) id: SessionId,
    pub(crate) config: SessionConfig,
    pub(crate) tables: Arc<DeltaTables>,
    pub(crate) vector: StatVector,
    pub(crate) turn: u64,
    pub(crate) unlocked: BTreeSet<String>,
    pub(crate) achievements: Vec<Achievement>,
    pub(crate) timeline: Timeline,
    pub(crate) archives: Vec<ArchiveRecord>,
    pub(crate) concluded: Option<GameOverReason>,
    pub(crate) deck: CosmicDeck,
}

impl Session {
    /// Start a new session from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Config`] if the config does not validate.
    pub fn new(
        id: SessionId,
        config: SessionConfig,
        tables: Arc<DeltaTables>,
    ) -> Result<Self, SessionError> {
        config.validate()?;
        let vector = config.initial;
        Ok(Self::from_parts(id, config, tables, vector, 0))
    }

    /// Resume a session from a stored [`SessionRecord`].
    ///
    /// Stored achievements are re-attributed to `id` and seed the unlocked
    /// set, so nothing already earned unlocks a second time. A repeated key
    /// keeps its first record. The deck continues from `deck_draws` on the
    /// config's seed.
    ///
    /// The stored vector is not checked here; [`act`](Self::act) rejects it
    /// if it is corrupt.
    pub fn resume(
        id: SessionId,
        config: SessionConfig,
        tables: Arc<DeltaTables>,
        record: SessionRecord,
    ) -> Self {
        let mut session = Self::from_parts(id, config, tables, record.vector, record.turn);
        for achievement in record.achievements {
            if session.unlocked.insert(achievement.key.clone()) {
                session.achievements.push(Achievement {
                    session_id: id,
                    ..achievement
                });
            }
        }
        session.deck = CosmicDeck::resume(session.config.seed, record.deck_draws);
        debug!(
            session = %id,
            turn = session.turn,
            achievements = session.achievements.len(),
            draws = record.deck_draws,
            "session resumed"
        );
        session
    }

    /// The state needed to [`resume`](Self::resume) this session later.
    pub fn to_record(&self) -> SessionRecord {
        SessionRecord {
            vector: self.vector,
            turn: self.turn,
            achievements: self.achievements.clone(),
            deck_draws: self.deck.draws(),
        }
    }

    fn from_parts(
        id: SessionId,
        config: SessionConfig,
        tables: Arc<DeltaTables>,
        vector: StatVector,
        turn: u64,
    ) -> Self {
        let deck = CosmicDeck::new(config.seed);
        Self {
            id,
            config,
            tables,
            vector,
            turn,
            unlocked: BTreeSet::new(),
            achievements: Vec::new(),
            timeline: Timeline::new(),
            archives: Vec::new(),
            concluded: None,
            deck,
        }
    }

    // -- accessors ----------------------------------------------------------

    /// This session's id.
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// The config the session was started with.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Delta tables the session resolves actions against.
    pub fn tables(&self) -> &Arc<DeltaTables> {
        &self.tables
    }

    /// Current stat vector.
    pub fn vector(&self) -> &StatVector {
        &self.vector
    }

    /// Number of turns resolved so far.
    pub fn turn(&self) -> u64 {
        self.turn
    }

    /// Keys of every achievement unlocked so far.
    pub fn unlocked_keys(&self) -> &BTreeSet<String> {
        &self.unlocked
    }

    /// Achievement records, in unlock order.
    pub fn achievements(&self) -> &[Achievement] {
        &self.achievements
    }

    /// Everything that happened, turn by turn.
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Archives sealed so far, oldest first.
    pub fn archives(&self) -> &[ArchiveRecord] {
        &self.archives
    }

    /// Why the session ended, if it has.
    pub fn concluded(&self) -> Option<GameOverReason> {
        self.concluded
    }

    pub fn is_concluded(&self) -> bool {
        self.concluded.is_some()
    }

    /// The session's cosmic wildcard deck.
    pub fn deck(&self) -> &CosmicDeck {
        &self.deck
    }

    // -- turn pipeline ------------------------------------------------------

    /// Resolve one action and commit its effects.
    ///
    /// # Errors
    ///
    /// - [`SessionError::Concluded`] if the session has ended.
    /// - [`SessionError::Core`] with [`PresidencyError::InvalidVectorState`]
    ///   if the stored vector is corrupt.
    ///
    /// The session is unchanged on error.
    pub fn act(&mut self, action: &Action) -> Result<TurnOutcome, SessionError> {
        if self.concluded.is_some() {
            return Err(SessionError::Concluded(self.id));
        }
        self.vector.validate()?;

        let parsed = CrisisMethod::parse(action.method.as_deref());
        let Resolution { delta, fallback } =
            self.tables.resolve(action.category, &action.key, parsed);
        let before = self.vector;
        let after = before.apply(&delta);
        let turn = self.turn + 1;

        let mut fresh = evaluate_achievements(&self.unlocked, &after);
        if let Some(mythic) = mythic_unlock(action.category, &action.key) {
            if !self.unlocked.contains(&mythic.key) {
                fresh.push(mythic);
            }
        }

        let verdict = game_over(&after, self.config.chaos_threshold);
        let risk = rebellion_risk(&after);

        // Commit.
        let now = unix_ms();
        let unlocked: Vec<Achievement> = fresh
            .into_iter()
            .map(|a| Achievement {
                session_id: self.id,
                key: a.key,
                description: a.description,
                turn,
                unlocked_at_ms: now,
            })
            .collect();

        self.vector = after;
        self.turn = turn;

        let method = match action.category {
            ActionCategory::Crisis => parsed,
            _ => CrisisMethod::Unspecified,
        };
        self.timeline.record(TimelineEntry::action(
            turn,
            action.category,
            &action.key,
            method,
            fallback,
            delta,
            before,
            after,
        ));
        for achievement in &unlocked {
            self.unlocked.insert(achievement.key.clone());
            self.timeline.record(TimelineEntry::achievement(
                turn,
                &achievement.key,
                &achievement.description,
                achievement.key == MYTHIC_KEY,
            ));
        }
        self.achievements.extend(unlocked.iter().cloned());
        if let Some(entry) = TimelineEntry::rebellion(turn, &risk) {
            self.timeline.record(entry);
        }

        info!(
            session = %self.id,
            turn,
            category = %action.category,
            key = %action.key,
            chaos = after.chaos,
            approval = after.approval,
            stability = after.stability,
            "turn resolved"
        );
        debug!(session = %self.id, %delta, fallback, unlocked = unlocked.len(), "turn details");
        if risk.active {
            warn!(
                session = %self.id,
                intensity = risk.intensity,
                trigger = ?risk.trigger,
                "rebellion risk"
            );
        }

        let archive = match verdict.reason {
            Some(reason) => {
                warn!(session = %self.id, turn, %reason, "game over");
                self.conclude(reason)
            }
            None => None,
        };

        Ok(TurnOutcome {
            turn,
            vector: after,
            delta,
            fallback,
            unlocked,
            rebellion: risk,
            game_over: verdict,
            archive,
        })
    }

    /// Draw a cosmic wildcard from the session's deck and act on it.
    pub fn draw_wildcard(&mut self) -> Result<TurnOutcome, SessionError> {
        if self.concluded.is_some() {
            return Err(SessionError::Concluded(self.id));
        }
        self.vector.validate()?;
        let key = self
            .deck
            .draw(&self.tables)
            .map(str::to_owned)
            .ok_or_else(|| PresidencyError::Catalog("cosmic table has no entries".to_owned()))?;
        debug!(session = %self.id, %key, draws = self.deck.draws(), "wildcard drawn");
        self.act(&Action::new(ActionCategory::Cosmic, key))
    }

    /// End the session voluntarily and seal the automatic archive.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Concluded`] if the session already ended, or
    /// the archive error if sealing fails (the session still ends).
    pub fn end(&mut self) -> Result<ArchiveRecord, SessionError> {
        if self.concluded.is_some() {
            return Err(SessionError::Concluded(self.id));
        }
        info!(session = %self.id, turn = self.turn, "president resigned");
        self.mark_concluded(GameOverReason::Resigned);
        self.seal(ArchiveKind::Auto)
    }

    /// Seal a manual archive of the current state. Allowed at any time,
    /// including after the session ended.
    pub fn export_archive(&mut self) -> Result<ArchiveRecord, SessionError> {
        self.seal(ArchiveKind::Manual)
    }

    fn mark_concluded(&mut self, reason: GameOverReason) {
        self.concluded = Some(reason);
        self.timeline
            .record(TimelineEntry::game_over(self.turn, reason));
    }

    /// Conclude after a game over. The automatic archive is best-effort: a
    /// sealing failure is logged and the turn still stands.
    fn conclude(&mut self, reason: GameOverReason) -> Option<ArchiveRecord> {
        self.mark_concluded(reason);
        match self.seal(ArchiveKind::Auto) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(session = %self.id, error = %e, "automatic archive failed");
                None
            }
        }
    }

    fn seal(&mut self, kind: ArchiveKind) -> Result<ArchiveRecord, SessionError> {
        let payload = ArchivePayload {
            president: &self.config.president,
            turn: self.turn,
            vector: &self.vector,
            achievements: self.achievements.iter().map(|a| a.key.as_str()).collect(),
            concluded: self.concluded,
            timeline: self.timeline.lines(),
        };
        let sealed = SealedArchive::seal(&payload)?;

        let record = ArchiveRecord {
            session_id: self.id,
            kind,
            turn: self.turn,
            glyphs: sealed.glyphs,
            digest: sealed.digest,
            payload: sealed.payload,
        };
        self.timeline
            .record(TimelineEntry::archived(self.turn, kind, &record.digest));
        self.archives.push(record.clone());
        info!(session = %self.id, ?kind, digest = %record.digest, "archive sealed");
        Ok(record)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session::new(SessionId(1), SessionConfig::default(), DeltaTables::builtin()).unwrap()
    }

    #[test]
    fn act_advances_turn_and_vector() {
        let mut s = session();
        let outcome = s
            .act(&Action::new(ActionCategory::Crisis, "market_crash").with_method("bold"))
            .unwrap();
        assert_eq!(outcome.turn, 1);
        assert_eq!(s.turn(), 1);
        assert_eq!(s.vector().crises, 1);
        assert_eq!(s.vector().economy, 30);
        assert_eq!(*s.vector(), outcome.vector);
        assert!(!outcome.fallback);
    }

    #[test]
    fn fallback_is_reported() {
        let mut s = session();
        let outcome = s.act(&Action::new(ActionCategory::Law, "blue_sky_act")).unwrap();
        assert!(outcome.fallback);
        assert_eq!(outcome.vector.laws, 1);
        assert_eq!(outcome.vector.approval, 48);
    }

    #[test]
    fn method_on_non_crisis_is_ignored() {
        let mut a = session();
        let mut b = session();
        let plain = a.act(&Action::new(ActionCategory::Diplomacy, "trade_agreement")).unwrap();
        let with = b
            .act(&Action::new(ActionCategory::Diplomacy, "trade_agreement").with_method("bold"))
            .unwrap();
        assert_eq!(plain.vector, with.vector);
    }

    #[test]
    fn timeline_records_action_and_achievement() {
        let mut s = session();
        s.act(&Action::new(ActionCategory::Law, "tax_cut")).unwrap();
        let entries = s.timeline().all_entries();
        assert_eq!(entries.len(), 2);
        assert!(matches!(entries[0].kind, presidency_chronicle::EntryKind::ActionResolved { .. }));
        assert_eq!(s.timeline().achievement_keys().collect::<Vec<_>>(), ["first_law"]);
        assert_eq!(s.achievements()[0].turn, 1);
        assert_eq!(s.achievements()[0].session_id, SessionId(1));
    }

    #[test]
    fn end_concludes_and_archives() {
        let mut s = session();
        s.act(&Action::new(ActionCategory::Law, "tax_cut")).unwrap();
        let record = s.end().unwrap();
        assert_eq!(record.kind, ArchiveKind::Auto);
        assert_eq!(record.turn, 1);
        assert_eq!(s.concluded(), Some(GameOverReason::Resigned));
        assert!(matches!(s.end(), Err(SessionError::Concluded(SessionId(1)))));

        let manual = s.export_archive().unwrap();
        assert_eq!(manual.kind, ArchiveKind::Manual);
        assert_eq!(s.archives().len(), 2);
    }

    #[test]
    fn wildcard_draws_a_cosmic_action() {
        let mut s = session();
        let outcome = s.draw_wildcard().unwrap();
        assert_eq!(s.deck().draws(), 1);
        assert_eq!(outcome.turn, 1);
        assert!(!outcome.fallback);
        assert!(matches!(
            s.timeline().all_entries()[0].kind,
            presidency_chronicle::EntryKind::ActionResolved { category: ActionCategory::Cosmic, .. }
        ));
    }
}
