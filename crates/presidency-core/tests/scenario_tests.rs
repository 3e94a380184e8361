//! Scenario tests: fixed vectors and deltas with hand-computed results.

use std::collections::BTreeSet;

use presidency_core::prelude::*;

fn midpoint() -> StatVector {
    StatVector {
        approval: 50,
        stability: 50,
        economy: 50,
        justice: 50,
        power: 50,
        chaos: 0,
        laws: 0,
        crises: 0,
    }
}

#[test]
fn law_delta_from_midpoint() {
    let delta = ActionDelta::EMPTY
        .with(Axis::Approval, -10)
        .with(Axis::Stability, 10)
        .with(Axis::Justice, -8)
        .with(Axis::Power, 12)
        .with(Axis::Chaos, 5)
        .with(Axis::Laws, 1);

    let next = midpoint().apply(&delta);
    assert_eq!(
        next,
        StatVector {
            approval: 40,
            stability: 60,
            economy: 50,
            justice: 42,
            power: 62,
            chaos: 5,
            laws: 1,
            crises: 0,
        }
    );
}

#[test]
fn builtin_emergency_powers_act_matches_scenario() {
    let next =
        apply_action(&midpoint(), ActionCategory::Law, "emergency_powers_act", None).unwrap();
    assert_eq!((next.approval, next.stability, next.justice), (40, 60, 42));
    assert_eq!((next.power, next.chaos, next.laws), (62, 5, 1));
    assert_eq!(next.economy, 50);
}

#[test]
fn low_stability_raises_unrest_not_discontent() {
    let v = StatVector {
        stability: 15,
        ..midpoint()
    };
    let risk = rebellion_risk(&v);
    assert!(risk.active);
    assert_eq!(risk.trigger, Some(RebellionTrigger::Unrest));
    assert_eq!(risk.intensity, 18);
}

#[test]
fn chaos_past_threshold_ends_the_session() {
    let v = StatVector {
        chaos: 120,
        ..midpoint()
    };
    let verdict = game_over(&v, 100);
    assert!(verdict.over);
    assert_eq!(verdict.reason, Some(GameOverReason::ChaosExceeded));
}

#[test]
fn chaos_reported_over_stability_collapse() {
    let v = StatVector {
        chaos: 100,
        stability: 0,
        ..midpoint()
    };
    assert_eq!(game_over(&v, 100).reason, Some(GameOverReason::ChaosExceeded));
}

#[test]
fn a_short_reign() {
    // Law, crisis handled boldly, a cosmic distortion: walk the core the way
    // a session layer would and check the evaluators at each step.
    let mut v = midpoint();
    let mut unlocked = BTreeSet::new();

    v = apply_action(&v, ActionCategory::Law, "martial_law", None).unwrap();
    let fresh = evaluate_achievements(&unlocked, &v);
    assert_eq!(fresh.len(), 1);
    assert_eq!(fresh[0].key, "first_law");
    unlocked.extend(fresh.into_iter().map(|a| a.key));

    v = apply_action(&v, ActionCategory::Crisis, "border_skirmish", Some("bold")).unwrap();
    assert_eq!(v.crises, 1);
    assert!(evaluate_achievements(&unlocked, &v).is_empty());

    v = apply_action(&v, ActionCategory::Cosmic, "distort", None).unwrap();
    let mythic = mythic_unlock(ActionCategory::Cosmic, "distort").unwrap();
    assert_eq!(mythic.key, MYTHIC_KEY);
    assert!(v.chaos > 50);
    assert!(!game_over(&v, 100).over);
}
