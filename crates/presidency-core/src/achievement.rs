//! Achievement evaluation.
//!
//! Achievements are one-time unlocks. The rule table ([`RULES`]) is a fixed,
//! ordered list of `(key, description, predicate)` entries. A rule fires when
//! its predicate holds for the current vector and its key is not yet in the
//! session's unlocked set, which makes [`evaluate_achievements`] idempotent:
//!
//! ```
//! use std::collections::BTreeSet;
//! use presidency_core::prelude::*;
//!
//! let vector = StatVector { laws: 12, approval: 95, ..StatVector::default() };
//! let mut unlocked = BTreeSet::new();
//!
//! let first = evaluate_achievements(&unlocked, &vector);
//! assert!(!first.is_empty());
//! unlocked.extend(first.into_iter().map(|a| a.key));
//!
//! assert!(evaluate_achievements(&unlocked, &vector).is_empty());
//! ```
//!
//! The mythic achievement for the `distort` cosmic action is deliberately
//! NOT a rule: it fires on the event, not on the vector, so it lives in the
//! separate [`mythic_unlock`] branch and the caller guards against repeats.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::stats::{Axis, StatVector};
use crate::tables::ActionCategory;

/// Key of the mythic achievement granted by the `distort` cosmic action.
pub const MYTHIC_KEY: &str = "mythic_distortion";
/// Cosmic action key that triggers the mythic achievement.
pub const MYTHIC_TRIGGER: &str = "distort";
const MYTHIC_DESCRIPTION: &str = "Bent reality itself to the will of the office";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One entry of the achievement rule table.
#[derive(Debug, Clone, Copy)]
pub struct AchievementRule {
    /// Stable key recorded when the rule unlocks.
    pub key: &'static str,
    /// Human-readable description.
    pub description: &'static str,
    /// Unlock condition, checked against the post-action vector.
    pub predicate: fn(&StatVector) -> bool,
}

/// An achievement the evaluator decided to unlock.
///
/// Session id and timestamps are stamped by the caller when it persists the
/// unlock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockedAchievement {
    /// Rule key, or [`MYTHIC_KEY`] for the mythic branch.
    pub key: String,
    pub description: String,
}

impl From<&AchievementRule> for UnlockedAchievement {
    fn from(rule: &AchievementRule) -> Self {
        Self {
            key: rule.key.to_owned(),
            description: rule.description.to_owned(),
        }
    }
}

// ---------------------------------------------------------------------------
// Rule table
// ---------------------------------------------------------------------------

fn first_law(v: &StatVector) -> bool {
    v.laws >= 1
}

fn legislator(v: &StatVector) -> bool {
    v.laws >= 10
}

fn crisis_veteran(v: &StatVector) -> bool {
    v.crises >= 5
}

fn beloved_leader(v: &StatVector) -> bool {
    v.approval >= 90
}

fn iron_fist(v: &StatVector) -> bool {
    v.power >= 90
}

fn tyrant(v: &StatVector) -> bool {
    v.power >= 80 && v.justice <= 20
}

fn golden_age(v: &StatVector) -> bool {
    v.economy >= 85 && v.stability >= 70
}

fn philosopher_king(v: &StatVector) -> bool {
    v.justice >= 80 && v.approval >= 70
}

fn calm_in_the_storm(v: &StatVector) -> bool {
    v.chaos >= 50 && v.stability >= 60
}

fn agent_of_chaos(v: &StatVector) -> bool {
    v.chaos >= 100
}

fn perfect_balance(v: &StatVector) -> bool {
    v.laws >= 5 && Axis::BOUNDED.iter().all(|&axis| (45..=55).contains(&v.get(axis)))
}

/// Every vector-driven achievement, in evaluation order.
pub static RULES: &[AchievementRule] = &[
    AchievementRule {
        key: "first_law",
        description: "Signed the first law of the administration",
        predicate: first_law,
    },
    AchievementRule {
        key: "legislator",
        description: "Passed ten laws",
        predicate: legislator,
    },
    AchievementRule {
        key: "crisis_veteran",
        description: "Weathered five crises",
        predicate: crisis_veteran,
    },
    AchievementRule {
        key: "beloved_leader",
        description: "Reached 90 approval",
        predicate: beloved_leader,
    },
    AchievementRule {
        key: "iron_fist",
        description: "Reached 90 power",
        predicate: iron_fist,
    },
    AchievementRule {
        key: "tyrant",
        description: "Held 80 power while justice fell to 20",
        predicate: tyrant,
    },
    AchievementRule {
        key: "golden_age",
        description: "Economy at 85 with stability at 70",
        predicate: golden_age,
    },
    AchievementRule {
        key: "philosopher_king",
        description: "Justice at 80 with approval at 70",
        predicate: philosopher_king,
    },
    AchievementRule {
        key: "calm_in_the_storm",
        description: "Kept stability at 60 while chaos passed 50",
        predicate: calm_in_the_storm,
    },
    AchievementRule {
        key: "agent_of_chaos",
        description: "Let chaos reach 100",
        predicate: agent_of_chaos,
    },
    AchievementRule {
        key: "perfect_balance",
        description: "Five laws in with every axis between 45 and 55",
        predicate: perfect_balance,
    },
];

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// Achievements newly earned by `vector`, in rule order.
///
/// Keys already present in `unlocked` never fire again.
pub fn evaluate_achievements(
    unlocked: &BTreeSet<String>,
    vector: &StatVector,
) -> Vec<UnlockedAchievement> {
    RULES
        .iter()
        .filter(|rule| !unlocked.contains(rule.key) && (rule.predicate)(vector))
        .map(UnlockedAchievement::from)
        .collect()
}

/// The mythic achievement granted by the `distort` cosmic action.
///
/// Returns it unconditionally for that action and `None` for every other
/// action. This does not consult any unlocked set; the caller decides whether
/// it has already been granted.
pub fn mythic_unlock(category: ActionCategory, key: &str) -> Option<UnlockedAchievement> {
    let is_trigger = category == ActionCategory::Cosmic
        && key.trim().eq_ignore_ascii_case(MYTHIC_TRIGGER);
    is_trigger.then(|| UnlockedAchievement {
        key: MYTHIC_KEY.to_owned(),
        description: MYTHIC_DESCRIPTION.to_owned(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
