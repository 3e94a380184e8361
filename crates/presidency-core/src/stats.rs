//! The stat vector and the deltas applied to it.
//!
//! A [`StatVector`] is the complete condition of a simulated government:
//!
//! - five **bounded** axes (`approval`, `stability`, `economy`, `justice`,
//!   `power`) that always stay within `0..=100`,
//! - a **floored** `chaos` meter that never drops below zero but has no
//!   ceiling,
//! - two **counters** (`laws`, `crises`) that only ever grow.
//!
//! An [`ActionDelta`] is a partial mapping from [`Axis`] to a signed
//! adjustment. [`StatVector::apply`] is the only way a vector changes.
//!
//! # Example
//!
//! ```
//! use presidency_core::stats::{ActionDelta, Axis, StatVector};
//!
//! let delta = ActionDelta::EMPTY
//!     .with(Axis::Approval, -10)
//!     .with(Axis::Power, 12)
//!     .with(Axis::Laws, 1);
//!
//! let next = StatVector::default().apply(&delta);
//! assert_eq!(next.approval, 40);
//! assert_eq!(next.power, 62);
//! assert_eq!(next.laws, 1);
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::PresidencyError;

/// Lower bound of every bounded axis.
pub const STAT_MIN: i32 = 0;
/// Upper bound of every bounded axis.
pub const STAT_MAX: i32 = 100;
/// Starting value of every bounded axis.
pub const STAT_DEFAULT: i32 = 50;

// ---------------------------------------------------------------------------
// Axis
// ---------------------------------------------------------------------------

/// One addressable key of a [`StatVector`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    Approval,
    Stability,
    Economy,
    Justice,
    Power,
    Chaos,
    Laws,
    Crises,
}

/// How a delta is folded into an axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisRule {
    /// Summed, then clamped to `STAT_MIN..=STAT_MAX`.
    Bounded,
    /// Summed, then floored at zero. No upper cap.
    Floored,
    /// Positive adjustments are added. Counters never decrease.
    Counter,
}

impl Axis {
    /// Every axis, in storage order.
    pub const ALL: [Axis; 8] = [
        Axis::Approval,
        Axis::Stability,
        Axis::Economy,
        Axis::Justice,
        Axis::Power,
        Axis::Chaos,
        Axis::Laws,
        Axis::Crises,
    ];

    /// The five axes clamped to `0..=100`.
    pub const BOUNDED: [Axis; 5] = [
        Axis::Approval,
        Axis::Stability,
        Axis::Economy,
        Axis::Justice,
        Axis::Power,
    ];

    /// Storage slot of this axis inside an [`ActionDelta`].
    pub const fn index(self) -> usize {
        self as usize
    }

    /// How [`StatVector::apply`] treats this axis.
    pub const fn rule(self) -> AxisRule {
        match self {
            Axis::Chaos => AxisRule::Floored,
            Axis::Laws | Axis::Crises => AxisRule::Counter,
            _ => AxisRule::Bounded,
        }
    }

    /// Lowercase name, as used in JSON and messages.
    pub const fn name(self) -> &'static str {
        match self {
            Axis::Approval => "approval",
            Axis::Stability => "stability",
            Axis::Economy => "economy",
            Axis::Justice => "justice",
            Axis::Power => "power",
            Axis::Chaos => "chaos",
            Axis::Laws => "laws",
            Axis::Crises => "crises",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// StatVector
// ---------------------------------------------------------------------------

/// The mutable state of one presidency session.
///
/// Fields are plain signed integers so that a corrupt record loaded from
/// storage can be represented and rejected by [`validate`](Self::validate)
/// instead of silently wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StatVector {
    /// Popular support, `0..=100`.
    pub approval: i32,
    /// Institutional stability, `0..=100`.
    pub stability: i32,
    /// Economic health, `0..=100`.
    pub economy: i32,
    /// Rule of law, `0..=100`.
    pub justice: i32,
    /// Executive power, `0..=100`.
    pub power: i32,
    /// Accumulated chaos. Floored at zero, no ceiling.
    pub chaos: i32,
    /// Laws enacted. Only ever increases.
    #[serde(default)]
    pub laws: i32,
    /// Crises faced. Only ever increases.
    #[serde(default)]
    pub crises: i32,
}

impl Default for StatVector {
    /// Every bounded axis at 50, chaos and counters at 0.
    fn default() -> Self {
        Self {
            approval: STAT_DEFAULT,
            stability: STAT_DEFAULT,
            economy: STAT_DEFAULT,
            justice: STAT_DEFAULT,
            power: STAT_DEFAULT,
            chaos: 0,
            laws: 0,
            crises: 0,
        }
    }
}

impl StatVector {
    /// Read one axis.
    pub fn get(&self, axis: Axis) -> i32 {
        match axis {
            Axis::Approval => self.approval,
            Axis::Stability => self.stability,
            Axis::Economy => self.economy,
            Axis::Justice => self.justice,
            Axis::Power => self.power,
            Axis::Chaos => self.chaos,
            Axis::Laws => self.laws,
            Axis::Crises => self.crises,
        }
    }

    fn slot_mut(&mut self, axis: Axis) -> &mut i32 {
        match axis {
            Axis::Approval => &mut self.approval,
            Axis::Stability => &mut self.stability,
            Axis::Economy => &mut self.economy,
            Axis::Justice => &mut self.justice,
            Axis::Power => &mut self.power,
            Axis::Chaos => &mut self.chaos,
            Axis::Laws => &mut self.laws,
            Axis::Crises => &mut self.crises,
        }
    }

    /// Check every invariant, reporting the first violated axis in storage
    /// order.
    ///
    /// # Errors
    ///
    /// Returns [`PresidencyError::InvalidVectorState`] if a bounded axis lies
    /// outside `0..=100`, or if `chaos` or a counter is negative.
    pub fn validate(&self) -> Result<(), PresidencyError> {
        for axis in Axis::ALL {
            let value = self.get(axis);
            let valid = match axis.rule() {
                AxisRule::Bounded => (STAT_MIN..=STAT_MAX).contains(&value),
                AxisRule::Floored | AxisRule::Counter => value >= 0,
            };
            if !valid {
                return Err(PresidencyError::InvalidVectorState { field: axis, value });
            }
        }
        Ok(())
    }

    /// Apply a delta and return the resulting vector.
    ///
    /// Axes absent from `delta` are copied unchanged. Arithmetic saturates,
    /// so this never panics regardless of the adjustment sizes.
    pub fn apply(&self, delta: &ActionDelta) -> StatVector {
        let mut next = *self;
        for (axis, adjustment) in delta.iter() {
            let current = self.get(axis);
            *next.slot_mut(axis) = match axis.rule() {
                AxisRule::Bounded => current.saturating_add(adjustment).clamp(STAT_MIN, STAT_MAX),
                AxisRule::Floored => current.saturating_add(adjustment).max(0),
                AxisRule::Counter => current.saturating_add(adjustment.max(0)),
            };
        }
        next
    }
}

// ---------------------------------------------------------------------------
// ActionDelta
// ---------------------------------------------------------------------------

/// A partial, signed per-axis adjustment for one resolved action.
///
/// Constructible in `const` context so the builtin delta tables can live in
/// static data:
///
/// ```
/// use presidency_core::stats::{ActionDelta, Axis};
///
/// const TAX_CUT: ActionDelta = ActionDelta::EMPTY
///     .with(Axis::Approval, 6)
///     .with(Axis::Economy, -8)
///     .with(Axis::Laws, 1);
///
/// assert_eq!(TAX_CUT.get(Axis::Economy), Some(-8));
/// assert_eq!(TAX_CUT.get(Axis::Chaos), None);
/// ```
///
/// Serializes as a JSON object containing only the present axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "BTreeMap<Axis, i32>", into = "BTreeMap<Axis, i32>")]
pub struct ActionDelta {
    slots: [Option<i32>; 8],
}

impl ActionDelta {
    /// A delta with no axes set.
    pub const EMPTY: ActionDelta = ActionDelta { slots: [None; 8] };

    /// Return a copy with `axis` set to `amount`, replacing any earlier value.
    pub const fn with(mut self, axis: Axis, amount: i32) -> Self {
        self.slots[axis.index()] = Some(amount);
        self
    }

    /// The adjustment for `axis`, or `None` if the delta leaves it alone.
    pub fn get(&self, axis: Axis) -> Option<i32> {
        self.slots[axis.index()]
    }

    /// Present axes and their adjustments, in storage order.
    pub fn iter(&self) -> impl Iterator<Item = (Axis, i32)> + '_ {
        Axis::ALL
            .into_iter()
            .filter_map(move |axis| self.get(axis).map(|amount| (axis, amount)))
    }

    /// `true` if no axis is present.
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Number of present axes.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Per-axis sum of two deltas. An axis present in only one side keeps
    /// that side's value.
    pub fn merge(&self, other: &ActionDelta) -> ActionDelta {
        let mut merged = *self;
        for (axis, amount) in other.iter() {
            let slot = &mut merged.slots[axis.index()];
            *slot = Some(slot.unwrap_or(0).saturating_add(amount));
        }
        merged
    }
}

impl From<BTreeMap<Axis, i32>> for ActionDelta {
    fn from(map: BTreeMap<Axis, i32>) -> Self {
        map.into_iter()
            .fold(ActionDelta::EMPTY, |delta, (axis, amount)| delta.with(axis, amount))
    }
}

impl From<ActionDelta> for BTreeMap<Axis, i32> {
    fn from(delta: ActionDelta) -> Self {
        delta.iter().collect()
    }
}

impl fmt::Display for ActionDelta {
    /// Compact form such as `approval-10 power+12 laws+1`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("(no effect)");
        }
        let mut first = true;
        for (axis, amount) in self.iter() {
            if !first {
                f.write_str(" ")?;
            }
            first = false;
            write!(f, "{axis}{amount:+}")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn vector(approval: i32, stability: i32, chaos: i32) -> StatVector {
        StatVector {
            approval,
            stability,
            chaos,
            ..StatVector::default()
        }
    }

    // -- 1. Defaults --------------------------------------------------------

    #[test]
    fn default_vector_is_valid_midpoint() {
        let v = StatVector::default();
        for axis in Axis::BOUNDED {
            assert_eq!(v.get(axis), 50, "{axis} should start at 50");
        }
        assert_eq!(v.chaos, 0);
        assert_eq!(v.laws, 0);
        assert_eq!(v.crises, 0);
        assert!(v.validate().is_ok());
    }

    // -- 2. Clamping ----------------------------------------------------------

    #[test]
    fn bounded_axes_clamp_at_both_ends() {
        let delta = ActionDelta::EMPTY
            .with(Axis::Approval, 500)
            .with(Axis::Stability, -500);
        let next = StatVector::default().apply(&delta);
        assert_eq!(next.approval, 100);
        assert_eq!(next.stability, 0);
    }

    #[test]
    fn chaos_floors_at_zero_but_is_not_capped() {
        let v = vector(50, 50, 95);
        let up = v.apply(&ActionDelta::EMPTY.with(Axis::Chaos, 30));
        assert_eq!(up.chaos, 125);

        let down = v.apply(&ActionDelta::EMPTY.with(Axis::Chaos, -200));
        assert_eq!(down.chaos, 0);
    }

    #[test]
    fn counters_add_and_ignore_negative_adjustments() {
        let mut v = StatVector::default();
        v.laws = 99;
        let next = v.apply(&ActionDelta::EMPTY.with(Axis::Laws, 1));
        assert_eq!(next.laws, 100);
        let next = next.apply(&ActionDelta::EMPTY.with(Axis::Laws, 1));
        assert_eq!(next.laws, 101, "counters are not clamped to 100");

        let unchanged = next.apply(&ActionDelta::EMPTY.with(Axis::Laws, -5));
        assert_eq!(unchanged.laws, 101);
    }

    #[test]
    fn absent_axes_are_untouched() {
        let v = StatVector {
            economy: 73,
            justice: 12,
            ..StatVector::default()
        };
        let next = v.apply(&ActionDelta::EMPTY.with(Axis::Power, 5));
        assert_eq!(next.economy, 73);
        assert_eq!(next.justice, 12);
        assert_eq!(next.power, 55);

        assert_eq!(v.apply(&ActionDelta::EMPTY), v);
    }

    #[test]
    fn extreme_adjustments_saturate_instead_of_overflowing() {
        let mut v = StatVector::default();
        v.chaos = i32::MAX - 1;
        let next = v.apply(&ActionDelta::EMPTY.with(Axis::Chaos, i32::MAX));
        assert_eq!(next.chaos, i32::MAX);
    }

    // -- 3. Validation --------------------------------------------------------

    #[test]
    fn validate_reports_first_bad_axis() {
        let v = StatVector {
            stability: 101,
            power: -1,
            ..StatVector::default()
        };
        assert_eq!(
            v.validate(),
            Err(PresidencyError::InvalidVectorState {
                field: Axis::Stability,
                value: 101
            })
        );
    }

    #[test]
    fn validate_rejects_negative_counters_and_chaos() {
        let v = StatVector {
            crises: -1,
            ..StatVector::default()
        };
        assert!(matches!(
            v.validate(),
            Err(PresidencyError::InvalidVectorState { field: Axis::Crises, .. })
        ));

        let v = vector(50, 50, -3);
        assert!(matches!(
            v.validate(),
            Err(PresidencyError::InvalidVectorState { field: Axis::Chaos, value: -3 })
        ));
    }

    #[test]
    fn chaos_above_hundred_is_valid() {
        assert!(vector(50, 50, 250).validate().is_ok());
    }

    // -- 4. ActionDelta -------------------------------------------------------

    #[test]
    fn merge_sums_shared_axes_and_keeps_the_rest() {
        let base = ActionDelta::EMPTY
            .with(Axis::Stability, -10)
            .with(Axis::Crises, 1);
        let modifier = ActionDelta::EMPTY
            .with(Axis::Stability, 6)
            .with(Axis::Chaos, -4);
        let merged = base.merge(&modifier);

        assert_eq!(merged.get(Axis::Stability), Some(-4));
        assert_eq!(merged.get(Axis::Crises), Some(1));
        assert_eq!(merged.get(Axis::Chaos), Some(-4));
        assert_eq!(merged.get(Axis::Approval), None);
        assert_eq!(merged.len(), 3);
    }

    #[test]
    fn delta_serializes_as_sparse_object() {
        let delta = ActionDelta::EMPTY
            .with(Axis::Approval, -10)
            .with(Axis::Laws, 1);
        let json = serde_json::to_value(delta).unwrap();
        assert_eq!(json, serde_json::json!({"approval": -10, "laws": 1}));

        let parsed: ActionDelta = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, delta);
    }

    #[test]
    fn delta_display_is_compact() {
        let delta = ActionDelta::EMPTY
            .with(Axis::Approval, -10)
            .with(Axis::Power, 12);
        assert_eq!(delta.to_string(), "approval-10 power+12");
        assert_eq!(ActionDelta::EMPTY.to_string(), "(no effect)");
    }

    #[test]
    fn vector_deserializes_without_counters() {
        let v: StatVector = serde_json::from_value(serde_json::json!({
            "approval": 50, "stability": 50, "economy": 50,
            "justice": 50, "power": 50, "chaos": 0
        }))
        .unwrap();
        assert_eq!(v, StatVector::default());
    }
}
