//! Threshold evaluators: game-over detection and rebellion risk.
//!
//! Both are pure functions of a [`StatVector`]; game-over additionally takes
//! the session's chaos threshold.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::stats::StatVector;

/// Chaos above this level puts the country in open unrest.
pub const UNREST_CHAOS: i32 = 65;
/// Stability below this level puts the country in open unrest.
pub const UNREST_STABILITY: i32 = 20;
/// Approval below this level breeds discontent.
pub const DISCONTENT_APPROVAL: i32 = 15;

// ---------------------------------------------------------------------------
// Game over
// ---------------------------------------------------------------------------

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameOverReason {
    /// Chaos reached the session's chaos threshold.
    ChaosExceeded,
    /// Stability fell to zero.
    StabilityCollapse,
    /// Approval fell to zero.
    ApprovalCollapse,
    /// The player ended the session.
    Resigned,
}

impl GameOverReason {
    /// One-line description, used in timeline messages.
    pub const fn describe(self) -> &'static str {
        match self {
            GameOverReason::ChaosExceeded => "chaos consumed the nation",
            GameOverReason::StabilityCollapse => "the state collapsed",
            GameOverReason::ApprovalCollapse => "the people abandoned their leader",
            GameOverReason::Resigned => "the president stepped down",
        }
    }
}

impl fmt::Display for GameOverReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// Result of [`game_over`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOver {
    /// `true` if the session must end.
    pub over: bool,
    /// Why it ended; `None` while it continues.
    pub reason: Option<GameOverReason>,
}

impl GameOver {
    /// The session continues.
    pub const CONTINUE: GameOver = GameOver {
        over: false,
        reason: None,
    };

    /// The session ended for `reason`.
    pub const fn ended(reason: GameOverReason) -> GameOver {
        GameOver {
            over: true,
            reason: Some(reason),
        }
    }
}

/// Decide whether the session is over.
///
/// Checks run in a fixed order and the first match is the only reason
/// reported: chaos at or past `chaos_threshold`, then stability at zero, then
/// approval at zero.
///
/// ```
/// use presidency_core::prelude::*;
///
/// let v = StatVector { chaos: 120, stability: 0, ..StatVector::default() };
/// assert_eq!(game_over(&v, 100).reason, Some(GameOverReason::ChaosExceeded));
/// ```
pub fn game_over(vector: &StatVector, chaos_threshold: i32) -> GameOver {
    if vector.chaos >= chaos_threshold {
        GameOver::ended(GameOverReason::ChaosExceeded)
    } else if vector.stability <= 0 {
        GameOver::ended(GameOverReason::StabilityCollapse)
    } else if vector.approval <= 0 {
        GameOver::ended(GameOverReason::ApprovalCollapse)
    } else {
        GameOver::CONTINUE
    }
}

// ---------------------------------------------------------------------------
// Rebellion risk
// ---------------------------------------------------------------------------

/// Which condition raised a rebellion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RebellionTrigger {
    /// High chaos or low stability.
    Unrest,
    /// Very low approval.
    Discontent,
}

/// Result of [`rebellion_risk`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RebellionRisk {
    /// `true` if either rebellion branch holds.
    pub active: bool,
    /// `0..=100`; zero when inactive.
    pub intensity: u8,
    /// Which branch fired; `None` when inactive.
    pub trigger: Option<RebellionTrigger>,
}

impl RebellionRisk {
    /// No rebellion risk.
    pub const CALM: RebellionRisk = RebellionRisk {
        active: false,
        intensity: 0,
        trigger: None,
    };
}

/// Score the risk of rebellion.
///
/// The two triggers have their own arithmetic and are kept apart:
///
/// - **Unrest** (`chaos > 65` or `stability < 20`):
///   `clamp(round((chaos + (50 - stability)) / 2), 0, 100)`, halves rounding
///   up.
/// - **Discontent** (`approval < 15`): `max(10, 40 - approval)`.
///
/// Unrest is checked first and wins when both hold.
pub fn rebellion_risk(vector: &StatVector) -> RebellionRisk {
    if vector.chaos > UNREST_CHAOS || vector.stability < UNREST_STABILITY {
        let pressure = i64::from(vector.chaos) + (50 - i64::from(vector.stability));
        let intensity = (pressure + 1).div_euclid(2).clamp(0, 100);
        RebellionRisk {
            active: true,
            intensity: intensity as u8,
            trigger: Some(RebellionTrigger::Unrest),
        }
    } else if vector.approval < DISCONTENT_APPROVAL {
        let intensity = (40 - i64::from(vector.approval)).max(10).clamp(0, 100);
        RebellionRisk {
            active: true,
            intensity: intensity as u8,
            trigger: Some(RebellionTrigger::Discontent),
        }
    } else {
        RebellionRisk::CALM
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
