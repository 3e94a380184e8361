//! Session timeline: an append-only record of what happened, turn by turn.
//!
//! The [`Timeline`] collects [`TimelineEntry`] values as the session layer
//! resolves actions. Each entry carries the turn it happened on, a structured
//! [`EntryKind`] for programmatic queries, and a rendered human-readable
//! message for display.
//!
//! # Query API
//!
//! - **Turn**: [`Timeline::entries_for_turn`]
//! - **Achievements**: [`Timeline::achievement_keys`]
//! - **Everything, in order**: [`Timeline::all_entries`], [`Timeline::lines`]
//!
//! # Example
//!
//! ```
//! use presidency_chronicle::timeline::{Timeline, TimelineEntry};
//! use presidency_core::prelude::*;
//!
//! let before = StatVector::default();
//! let delta = ActionDelta::EMPTY.with(Axis::Approval, 6).with(Axis::Laws, 1);
//! let after = before.apply(&delta);
//!
//! let mut timeline = Timeline::new();
//! timeline.record(TimelineEntry::action(
//!     1, ActionCategory::Law, "tax_cut", CrisisMethod::Unspecified, false, delta, before, after,
//! ));
//! timeline.record(TimelineEntry::achievement(1, "first_law", "Signed the first law", false));
//!
//! assert_eq!(timeline.len(), 2);
//! assert_eq!(timeline.entries_for_turn(1).count(), 2);
//! assert_eq!(timeline.achievement_keys().collect::<Vec<_>>(), ["first_law"]);
//! ```

use presidency_core::prelude::{
    ActionCategory, ActionDelta, CrisisMethod, GameOverReason, RebellionRisk, RebellionTrigger,
    StatVector,
};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ArchiveKind
// ---------------------------------------------------------------------------

/// How an archive came to be taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArchiveKind {
    /// Taken automatically when the session ended.
    Auto,
    /// Requested by the player.
    Manual,
}

// ---------------------------------------------------------------------------
// EntryKind
// ---------------------------------------------------------------------------

/// Structured description of one timeline event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EntryKind {
    /// An action was resolved and applied.
    ActionResolved {
        category: ActionCategory,
        key: String,
        method: CrisisMethod,
        /// `true` when the key was unknown and the fallback delta applied.
        fallback: bool,
        delta: ActionDelta,
        before: StatVector,
        after: StatVector,
    },
    /// An achievement was unlocked.
    AchievementUnlocked { key: String, mythic: bool },
    /// Rebellion risk was active after the turn.
    RebellionWarning {
        intensity: u8,
        trigger: RebellionTrigger,
    },
    /// The session ended.
    GameOver { reason: GameOverReason },
    /// An archive was sealed.
    Archived { kind: ArchiveKind, digest: String },
}

// ---------------------------------------------------------------------------
// TimelineEntry
// ---------------------------------------------------------------------------

/// One event on a session's timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry {
    /// Turn number the event belongs to (turn 1 is the first action).
    pub turn: u64,
    /// Structured form of the event.
    pub kind: EntryKind,
    /// Rendered message, ready for display.
    pub message: String,
}

impl TimelineEntry {
    /// A resolved action, with the vector before and after its delta.
    #[allow(clippy::too_many_arguments)]
    pub fn action(
        turn: u64,
        category: ActionCategory,
        key: &str,
        method: CrisisMethod,
        fallback: bool,
        delta: ActionDelta,
        before: StatVector,
        after: StatVector,
    ) -> Self {
        let mut message = match (category, method) {
            (ActionCategory::Crisis, CrisisMethod::Unspecified) => {
                format!("crisis '{key}' resolved")
            }
            (ActionCategory::Crisis, method) => {
                format!("crisis '{key}' met with a {method} response")
            }
            (category, _) => format!("{category} '{key}' enacted"),
        };
        if fallback {
            message.push_str(" (unrecognized, minor effect)");
        }
        message.push_str(&format!(": {delta}"));

        Self {
            turn,
            kind: EntryKind::ActionResolved {
                category,
                key: key.to_owned(),
                method,
                fallback,
                delta,
                before,
                after,
            },
            message,
        }
    }

    /// An unlocked achievement. `mythic` marks the mythic branch.
    pub fn achievement(turn: u64, key: &str, description: &str, mythic: bool) -> Self {
        let label = if mythic { "mythic achievement" } else { "achievement" };
        Self {
            turn,
            kind: EntryKind::AchievementUnlocked {
                key: key.to_owned(),
                mythic,
            },
            message: format!("{label} unlocked: {description}"),
        }
    }

    /// Returns `None` for an inactive risk.
    pub fn rebellion(turn: u64, risk: &RebellionRisk) -> Option<Self> {
        let trigger = risk.trigger?;
        let cause = match trigger {
            RebellionTrigger::Unrest => "unrest in the streets",
            RebellionTrigger::Discontent => "the people are turning",
        };
        Some(Self {
            turn,
            kind: EntryKind::RebellionWarning {
                intensity: risk.intensity,
                trigger,
            },
            message: format!("rebellion brewing, {cause} (intensity {})", risk.intensity),
        })
    }

    /// The session ended for `reason`.
    pub fn game_over(turn: u64, reason: GameOverReason) -> Self {
        Self {
            turn,
            kind: EntryKind::GameOver { reason },
            message: format!("presidency over: {reason}"),
        }
    }

    /// A sealed archive. The message shows the first 12 characters of `digest`.
    pub fn archived(turn: u64, kind: ArchiveKind, digest: &str) -> Self {
        let short: String = digest.chars().take(12).collect();
        let how = match kind {
            ArchiveKind::Auto => "archived at the end of term",
            ArchiveKind::Manual => "archive exported",
        };
        Self {
            turn,
            kind: EntryKind::Archived {
                kind,
                digest: digest.to_owned(),
            },
            message: format!("{how} ({short})"),
        }
    }
}

// ---------------------------------------------------------------------------
// Timeline
// ---------------------------------------------------------------------------

/// Append-only list of [`TimelineEntry`] values in the order they occurred.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Timeline {
    entries: Vec<TimelineEntry>,
}

impl Timeline {
    /// An empty timeline.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append `entry` after every entry already recorded.
    pub fn record(&mut self, entry: TimelineEntry) {
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries in insertion order.
    pub fn all_entries(&self) -> &[TimelineEntry] {
        &self.entries
    }

    /// The most recent entry.
    pub fn last(&self) -> Option<&TimelineEntry> {
        self.entries.last()
    }

    /// Entries recorded for the given turn.
    pub fn entries_for_turn(&self, turn: u64) -> impl Iterator<Item = &TimelineEntry> {
        self.entries.iter().filter(move |e| e.turn == turn)
    }

    /// Keys of unlocked achievements, in unlock order.
    pub fn achievement_keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().filter_map(|e| match &e.kind {
            EntryKind::AchievementUnlocked { key, .. } => Some(key.as_str()),
            _ => None,
        })
    }

    /// Every entry rendered as `turn N: message`.
    pub fn lines(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|e| format!("turn {}: {}", e.turn, e.message))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use presidency_core::prelude::Axis;

    use super::*;

    fn law_entry(turn: u64, key: &str, fallback: bool) -> TimelineEntry {
        let before = StatVector::default();
        let delta = ActionDelta::EMPTY.with(Axis::Approval, -2).with(Axis::Laws, 1);
        TimelineEntry::action(
            turn,
            ActionCategory::Law,
            key,
            CrisisMethod::Unspecified,
            fallback,
            delta,
            before,
            before.apply(&delta),
        )
    }

    // -- 1. Empty timeline ----------------------------------------------------

    #[test]
    fn empty_timeline() {
        let timeline = Timeline::new();
        assert!(timeline.is_empty());
        assert_eq!(timeline.len(), 0);
        assert!(timeline.last().is_none());
        assert_eq!(timeline.entries_for_turn(1).count(), 0);
        assert_eq!(timeline.achievement_keys().count(), 0);
        assert!(timeline.lines().is_empty());
    }

    // -- 2. Messages ----------------------------------------------------------

    #[test]
    fn action_message_mentions_key_and_delta() {
        let entry = law_entry(3, "curfew", false);
        assert_eq!(entry.message, "law 'curfew' enacted: approval-2 laws+1");
    }

    #[test]
    fn fallback_actions_are_flagged() {
        let entry = law_entry(1, "mystery", true);
        assert!(entry.message.contains("unrecognized"));
        assert!(matches!(entry.kind, EntryKind::ActionResolved { fallback: true, .. }));
    }

    #[test]
    fn crisis_message_names_the_method() {
        let delta = ActionDelta::EMPTY.with(Axis::Crises, 1);
        let v = StatVector::default();
        let entry = TimelineEntry::action(
            2,
            ActionCategory::Crisis,
            "pandemic",
            CrisisMethod::Bold,
            false,
            delta,
            v,
            v.apply(&delta),
        );
        assert!(entry.message.starts_with("crisis 'pandemic' met with a bold response"));
    }

    #[test]
    fn inactive_rebellion_produces_no_entry() {
        assert!(TimelineEntry::rebellion(1, &RebellionRisk::CALM).is_none());
        let risk = RebellionRisk {
            active: true,
            intensity: 42,
            trigger: Some(RebellionTrigger::Unrest),
        };
        let entry = TimelineEntry::rebellion(1, &risk).unwrap();
        assert!(entry.message.contains("intensity 42"));
    }

    #[test]
    fn archived_message_shortens_digest() {
        let digest = "ab".repeat(32);
        let entry = TimelineEntry::archived(9, ArchiveKind::Manual, &digest);
        assert_eq!(entry.message, "archive exported (abababababab)");
        assert!(matches!(entry.kind, EntryKind::Archived { kind: ArchiveKind::Manual, .. }));
    }

    #[test]
    fn archived_message_handles_non_ascii_digest() {
        let digest = "✦".repeat(20);
        let entry = TimelineEntry::archived(1, ArchiveKind::Auto, &digest);
        assert_eq!(
            entry.message,
            format!("archived at the end of term ({})", "✦".repeat(12))
        );

        let short = TimelineEntry::archived(1, ArchiveKind::Auto, "ab✦");
        assert_eq!(short.message, "archived at the end of term (ab✦)");
    }

    // -- 3. Queries -----------------------------------------------------------

    #[test]
    fn queries_by_turn_and_achievement() {
        let mut timeline = Timeline::new();
        timeline.record(law_entry(1, "tax_cut", false));
        timeline.record(TimelineEntry::achievement(1, "first_law", "first law", false));
        timeline.record(law_entry(2, "curfew", false));
        timeline.record(TimelineEntry::achievement(2, "mythic_distortion", "bent reality", true));
        timeline.record(TimelineEntry::game_over(2, GameOverReason::ChaosExceeded));

        assert_eq!(timeline.len(), 5);
        assert_eq!(timeline.entries_for_turn(1).count(), 2);
        assert_eq!(timeline.entries_for_turn(2).count(), 3);
        assert_eq!(timeline.entries_for_turn(7).count(), 0);
        assert_eq!(
            timeline.achievement_keys().collect::<Vec<_>>(),
            ["first_law", "mythic_distortion"]
        );
        assert_eq!(
            timeline.last().map(|e| e.message.as_str()),
            Some("presidency over: chaos consumed the nation")
        );

        let lines = timeline.lines();
        assert_eq!(lines[1], "turn 1: achievement unlocked: first law");
        assert_eq!(lines[3], "turn 2: mythic achievement unlocked: bent reality");
    }

    // -- 4. Serialization -----------------------------------------------------

    #[test]
    fn timeline_serializes_with_tagged_kinds() {
        let mut timeline = Timeline::new();
        timeline.record(TimelineEntry::game_over(4, GameOverReason::StabilityCollapse));
        let json = serde_json::to_value(&timeline).unwrap();
        assert_eq!(json["entries"][0]["kind"]["type"], "game_over");
        assert_eq!(json["entries"][0]["kind"]["reason"], "stability_collapse");

        let back: Timeline = serde_json::from_value(json).unwrap();
        assert_eq!(back.all_entries(), timeline.all_entries());
    }
}
