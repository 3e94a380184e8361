//! Presidency Core -- stat vector, delta tables, and derived evaluators.
//!
//! This crate holds the resolution engine of the presidency simulation. A
//! session's condition is a [`StatVector`](stats::StatVector): five bounded
//! axes, an unbounded chaos meter, and two event counters. Player actions are
//! resolved into an [`ActionDelta`](stats::ActionDelta) by the static
//! [`DeltaTables`](tables::DeltaTables), applied under clamping and
//! accumulation rules, and then inspected by the achievement and threshold
//! evaluators.
//!
//! Everything here is pure: no I/O, no global mutable state. Callers pass the
//! current vector in and receive the next vector back.
//!
//! # Quick Start
//!
//! ```
//! use presidency_core::prelude::*;
//!
//! let vector = StatVector::default();
//! let next = apply_action(&vector, ActionCategory::Crisis, "pandemic", Some("measured")).unwrap();
//! assert_eq!(next.crises, 1);
//!
//! let unlocked = evaluate_achievements(&Default::default(), &next);
//! assert!(unlocked.iter().all(|a| !a.key.is_empty()));
//!
//! let verdict = game_over(&next, 100);
//! assert!(!verdict.over);
//! ```

#![deny(unsafe_code)]

pub mod achievement;
pub mod resolve;
pub mod stats;
pub mod tables;
pub mod threshold;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced by the resolution core.
///
/// Each variant is a distinct kind so callers can choose a policy per kind;
/// nothing in this crate retries.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PresidencyError {
    /// An action key has no entry in its category table.
    ///
    /// Only strict lookups return this. The simulation path resolves unknown
    /// keys to the category fallback delta instead.
    #[error("unknown {category} action '{key}'")]
    UnknownActionKey {
        category: tables::ActionCategory,
        key: String,
    },

    /// A stat vector handed to the core violates its invariants.
    #[error("invalid stat vector: {field} = {value} is out of range")]
    InvalidVectorState {
        field: stats::Axis,
        value: i32,
    },

    /// A payload could not be serialized for archiving.
    #[error("failed to serialize archive payload: {0}")]
    SerializationFailure(String),

    /// A category name did not match any action category.
    #[error(
        "unknown action category '{0}'. Expected one of: law, crisis, diplomacy, rebellion, cosmic"
    )]
    UnknownCategory(String),

    /// Custom delta table data failed validation.
    #[error("invalid delta catalog: {0}")]
    Catalog(String),
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::achievement::{
        evaluate_achievements, mythic_unlock, AchievementRule, UnlockedAchievement, MYTHIC_KEY,
        RULES,
    };
    pub use crate::resolve::{apply_action, apply_action_with};
    pub use crate::stats::{ActionDelta, Axis, AxisRule, StatVector};
    pub use crate::tables::{ActionCategory, CrisisMethod, DeltaTables, Resolution};
    pub use crate::threshold::{
        game_over, rebellion_risk, GameOver, GameOverReason, RebellionRisk, RebellionTrigger,
    };
    pub use crate::PresidencyError;
}
