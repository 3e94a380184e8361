//! Headless presidency simulator.
//!
//! Usage:
//!   presidency-sim run <seed> [turns]
//!   presidency-sim script <actions.json> [config.json]
//!
//! `run` cycles through one action of every category, drawing a cosmic
//! wildcard every fifth turn. `script` plays a JSON array of actions such as
//! `[{"category": "crisis", "key": "pandemic", "method": "bold"}]`; unknown
//! action keys are rejected up front.
//!
//! Set `RUST_LOG` (e.g. `RUST_LOG=debug`) for per-turn tracing.

use std::path::Path;

use anyhow::{bail, Context};
use presidency_engine::prelude::*;

const USAGE: &str = "usage:
  presidency-sim run <seed> [turns]
  presidency-sim script <actions.json> [config.json]";

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("run") => {
            let seed: u64 = args
                .get(1)
                .context(USAGE)?
                .parse()
                .context("seed must be an unsigned integer")?;
            let turns: u64 = match args.get(2) {
                Some(t) => t.parse().context("turns must be an unsigned integer")?,
                None => 25,
            };
            run(seed, turns)
        }
        Some("script") => {
            let actions = args.get(1).context(USAGE)?;
            script(Path::new(actions), args.get(2).map(Path::new))
        }
        _ => bail!(USAGE),
    }
}

fn cycle() -> Vec<Action> {
    vec![
        Action::new(ActionCategory::Law, "infrastructure_bill"),
        Action::new(ActionCategory::Crisis, "general_strike").with_method("measured"),
        Action::new(ActionCategory::Diplomacy, "peace_summit"),
        Action::new(ActionCategory::Rebellion, "negotiate"),
    ]
}

fn run(seed: u64, turns: u64) -> anyhow::Result<()> {
    let config = SessionConfig {
        seed,
        ..SessionConfig::default()
    };
    let mut session = Session::new(SessionId(1), config, DeltaTables::builtin())?;
    let mut script = cycle().into_iter().cycle();

    for n in 1..=turns {
        let outcome = if n % 5 == 0 {
            session.draw_wildcard()?
        } else {
            let action = script.next().context("empty action cycle")?;
            session.act(&action)?
        };
        report(&outcome);
        if outcome.game_over.over {
            break;
        }
    }
    finish(&mut session)
}

fn script(actions_path: &Path, config_path: Option<&Path>) -> anyhow::Result<()> {
    let config = match config_path {
        Some(path) => SessionConfig::from_file(path)?,
        None => SessionConfig::default(),
    };
    let raw = std::fs::read_to_string(actions_path)
        .with_context(|| format!("failed to read {}", actions_path.display()))?;
    let actions: Vec<Action> = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse {}", actions_path.display()))?;

    let tables = DeltaTables::builtin();
    for (i, action) in actions.iter().enumerate() {
        tables
            .lookup_strict(action.category, &action.key)
            .with_context(|| format!("action #{} in {}", i + 1, actions_path.display()))?;
    }

    let mut session = Session::new(SessionId(1), config, tables)?;
    for action in &actions {
        let outcome = session.act(action)?;
        report(&outcome);
        if outcome.game_over.over {
            break;
        }
    }
    finish(&mut session)
}

fn report(outcome: &TurnOutcome) {
    let v = &outcome.vector;
    println!(
        "turn {:>3}  approval {:>3}  stability {:>3}  economy {:>3}  justice {:>3}  \
         power {:>3}  chaos {:>3}  laws {:>2}  crises {:>2}",
        outcome.turn,
        v.approval,
        v.stability,
        v.economy,
        v.justice,
        v.power,
        v.chaos,
        v.laws,
        v.crises
    );
    for achievement in &outcome.unlocked {
        println!("          * {}", achievement.description);
    }
    if outcome.rebellion.active {
        println!("          ! rebellion risk {}", outcome.rebellion.intensity);
    }
    if let Some(reason) = outcome.game_over.reason {
        println!("          game over: {reason}");
    }
}

fn finish(session: &mut Session) -> anyhow::Result<()> {
    let archive = match session.archives().last() {
        Some(record) => record.clone(),
        None => session.end()?,
    };
    println!();
    for line in session.timeline().lines() {
        println!("{line}");
    }
    println!();
    println!("archive {}", archive.digest);
    println!("{}", archive.glyphs);
    Ok(())
}
