//! One-call action resolution: validate, look up, apply.

use crate::stats::StatVector;
use crate::tables::{ActionCategory, CrisisMethod, DeltaTables};
use crate::PresidencyError;

/// Resolve an action against the builtin tables and apply it.
///
/// `method` only matters for [`ActionCategory::Crisis`]; unknown keys and
/// unknown methods degrade to fallbacks rather than failing.
///
/// # Errors
///
/// Returns [`PresidencyError::InvalidVectorState`] if `vector` violates its
/// invariants. Nothing is computed in that case.
///
/// # Example
///
/// ```
/// use presidency_core::prelude::*;
///
/// let start = StatVector::default();
/// let next = apply_action(&start, ActionCategory::Law, "emergency_powers_act", None).unwrap();
/// assert_eq!(next.approval, 40);
/// assert_eq!(next.power, 62);
/// assert_eq!(next.laws, 1);
/// ```
pub fn apply_action(
    vector: &StatVector,
    category: ActionCategory,
    key: &str,
    method: Option<&str>,
) -> Result<StatVector, PresidencyError> {
    apply_action_with(&DeltaTables::builtin(), vector, category, key, method)
}

/// [`apply_action`] against an explicit ruleset.
pub fn apply_action_with(
    tables: &DeltaTables,
    vector: &StatVector,
    category: ActionCategory,
    key: &str,
    method: Option<&str>,
) -> Result<StatVector, PresidencyError> {
    vector.validate()?;
    let resolution = tables.resolve(category, key, CrisisMethod::parse(method));
    Ok(vector.apply(&resolution.delta))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::Axis;

    #[test]
    fn rejects_corrupt_input_before_applying() {
        let corrupt = StatVector {
            justice: 140,
            ..StatVector::default()
        };
        let err = apply_action(&corrupt, ActionCategory::Law, "tax_cut", None).unwrap_err();
        assert_eq!(
            err,
            PresidencyError::InvalidVectorState {
                field: Axis::Justice,
                value: 140
            }
        );
    }

    #[test]
    fn unknown_key_is_not_an_error() {
        let next =
            apply_action(&StatVector::default(), ActionCategory::Diplomacy, "???", None).unwrap();
        assert_eq!(next.approval, 49);
    }

    #[test]
    fn crisis_with_method_increments_counter_once() {
        let next = apply_action(
            &StatVector::default(),
            ActionCategory::Crisis,
            "market_crash",
            Some("bold"),
        )
        .unwrap();
        assert_eq!(next.crises, 1);
        assert_eq!(next.laws, 0);
        // -20 base, no economy in the bold modifier.
        assert_eq!(next.economy, 30);
        // -6 base + 5 bold.
        assert_eq!(next.approval, 49);
    }

    #[test]
    fn custom_tables_are_honoured() {
        let tables = DeltaTables::from_json_str(
            r#"{
                "law": { "curfew": { "stability": 20, "laws": 1 } },
                "crisis": { "flood": { "crises": 1 } },
                "diplomacy": { "treaty": {} },
                "rebellion": { "amnesty": {} },
                "cosmic": { "eclipse": {} }
            }"#,
        )
        .unwrap();
        let next =
            apply_action_with(&tables, &StatVector::default(), ActionCategory::Law, "curfew", None)
                .unwrap();
        assert_eq!(next.stability, 70);
        assert_eq!(next.laws, 1);
    }
}
