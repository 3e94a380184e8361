//! Delta tables: action keys to stat deltas, one table per action category.
//!
//! The builtin tables are static data, materialized once per process by
//! [`DeltaTables::builtin`] and shared read-only through an [`Arc`]. Alternate
//! balance data with the same shape can be loaded from JSON.
//!
//! Lookups never fail on the simulation path: an unknown key resolves to the
//! category's fallback delta (a small nudge) so that unrecognized input
//! degrades gracefully. Crisis resolution additionally folds in a
//! [`CrisisMethod`] modifier, summed per axis with the crisis's base delta.
//!
//! # Example
//!
//! ```
//! use presidency_core::stats::Axis;
//! use presidency_core::tables::{ActionCategory, CrisisMethod, DeltaTables};
//!
//! let tables = DeltaTables::builtin();
//! let resolution = tables.resolve(ActionCategory::Law, "no_such_law", CrisisMethod::Unspecified);
//! assert!(resolution.fallback);
//! assert_eq!(resolution.delta.get(Axis::Laws), Some(1));
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::stats::{ActionDelta, Axis};
use crate::stats::Axis::{Approval, Chaos, Crises, Economy, Justice, Laws, Power, Stability};
use crate::PresidencyError;

// ---------------------------------------------------------------------------
// ActionCategory
// ---------------------------------------------------------------------------

/// The kind of player action being resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionCategory {
    Law,
    Crisis,
    Diplomacy,
    Rebellion,
    Cosmic,
}

impl ActionCategory {
    /// Every category, in table order.
    pub const ALL: [ActionCategory; 5] = [
        ActionCategory::Law,
        ActionCategory::Crisis,
        ActionCategory::Diplomacy,
        ActionCategory::Rebellion,
        ActionCategory::Cosmic,
    ];

    /// Lowercase name, as used in catalogs and messages.
    pub const fn name(self) -> &'static str {
        match self {
            ActionCategory::Law => "law",
            ActionCategory::Crisis => "crisis",
            ActionCategory::Diplomacy => "diplomacy",
            ActionCategory::Rebellion => "rebellion",
            ActionCategory::Cosmic => "cosmic",
        }
    }
}

impl fmt::Display for ActionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ActionCategory {
    type Err = PresidencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        ActionCategory::ALL
            .into_iter()
            .find(|category| category.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| PresidencyError::UnknownCategory(s.to_owned()))
    }
}

// ---------------------------------------------------------------------------
// CrisisMethod
// ---------------------------------------------------------------------------

/// Response style chosen when resolving a crisis.
///
/// Orthogonal to crisis severity: the method's modifier is added on top of
/// whichever crisis is being resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrisisMethod {
    Bold,
    Measured,
    Ignore,
    #[default]
    Unspecified,
}

impl CrisisMethod {
    /// Parse an optional method name. Missing or unrecognized names resolve
    /// to [`CrisisMethod::Unspecified`].
    pub fn parse(method: Option<&str>) -> CrisisMethod {
        match method.map(|m| m.trim().to_ascii_lowercase()).as_deref() {
            Some("bold") => CrisisMethod::Bold,
            Some("measured") => CrisisMethod::Measured,
            Some("ignore") => CrisisMethod::Ignore,
            None | Some("") => CrisisMethod::Unspecified,
            Some(other) => {
                debug!(method = other, "unrecognized crisis method, treating as unspecified");
                CrisisMethod::Unspecified
            }
        }
    }

    /// Lowercase name. `Unspecified` renders as `"unspecified"`.
    pub const fn name(self) -> &'static str {
        match self {
            CrisisMethod::Bold => "bold",
            CrisisMethod::Measured => "measured",
            CrisisMethod::Ignore => "ignore",
            CrisisMethod::Unspecified => "unspecified",
        }
    }
}

impl fmt::Display for CrisisMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Builtin balance data
// ---------------------------------------------------------------------------

const D: ActionDelta = ActionDelta::EMPTY;

static LAW_TABLE: &[(&str, ActionDelta)] = &[
    (
        "emergency_powers_act",
        D
            .with(Approval, -10)
            .with(Stability, 10)
            .with(Justice, -8)
            .with(Power, 12)
            .with(Chaos, 5)
            .with(Laws, 1),
    ),
    (
        "free_press_act",
        D.with(Approval, 8).with(Stability, -3).with(Justice, 10).with(Power, -6).with(Laws, 1),
    ),
    ("tax_cut", D.with(Approval, 6).with(Economy, -8).with(Chaos, 2).with(Laws, 1)),
    (
        "universal_healthcare",
        D.with(Approval, 10).with(Economy, -6).with(Justice, 4).with(Laws, 1),
    ),
    (
        "surveillance_act",
        D
            .with(Approval, -6)
            .with(Stability, 8)
            .with(Justice, -12)
            .with(Power, 10)
            .with(Chaos, 3)
            .with(Laws, 1),
    ),
    (
        "infrastructure_bill",
        D.with(Approval, 4).with(Stability, 2).with(Economy, 8).with(Laws, 1),
    ),
    (
        "martial_law",
        D
            .with(Approval, -15)
            .with(Stability, 15)
            .with(Justice, -15)
            .with(Power, 18)
            .with(Chaos, 8)
            .with(Laws, 1),
    ),
    (
        "judicial_reform",
        D.with(Justice, 12).with(Power, -4).with(Stability, -2).with(Laws, 1),
    ),
];

static CRISIS_TABLE: &[(&str, ActionDelta)] = &[
    (
        "pandemic",
        D
            .with(Approval, -8)
            .with(Stability, -10)
            .with(Economy, -12)
            .with(Chaos, 10)
            .with(Crises, 1),
    ),
    (
        "market_crash",
        D.with(Approval, -6).with(Economy, -20).with(Chaos, 6).with(Crises, 1),
    ),
    (
        "border_skirmish",
        D.with(Stability, -8).with(Power, 4).with(Chaos, 8).with(Crises, 1),
    ),
    (
        "general_strike",
        D.with(Approval, -4).with(Stability, -10).with(Economy, -10).with(Chaos, 6).with(Crises, 1),
    ),
    (
        "natural_disaster",
        D.with(Stability, -12).with(Economy, -8).with(Chaos, 7).with(Crises, 1),
    ),
    (
        "corruption_scandal",
        D.with(Approval, -12).with(Justice, -8).with(Power, -4).with(Chaos, 4).with(Crises, 1),
    ),
];

static DIPLOMACY_TABLE: &[(&str, ActionDelta)] = &[
    ("trade_agreement", D.with(Approval, 3).with(Economy, 10).with(Power, -2)),
    ("military_alliance", D.with(Stability, 5).with(Power, 8).with(Chaos, -2)),
    ("sanctions", D.with(Economy, -6).with(Power, 6).with(Chaos, 3)),
    ("peace_summit", D.with(Approval, 5).with(Stability, 8).with(Chaos, -6)),
    ("state_visit", D.with(Approval, 4).with(Power, 3)),
    ("embargo", D.with(Economy, -10).with(Power, 4).with(Chaos, 4)),
];

static REBELLION_TABLE: &[(&str, ActionDelta)] = &[
    (
        "negotiate",
        D.with(Approval, 4).with(Stability, 6).with(Power, -6).with(Chaos, -8),
    ),
    (
        "crackdown",
        D.with(Approval, -10).with(Stability, 10).with(Justice, -12).with(Power, 8).with(Chaos, 6),
    ),
    (
        "concede",
        D.with(Approval, 8).with(Stability, -4).with(Power, -12).with(Chaos, -10),
    ),
    ("propaganda", D.with(Approval, 6).with(Justice, -4).with(Chaos, -3)),
];

static COSMIC_TABLE: &[(&str, ActionDelta)] = &[
    ("summon_meteor", D.with(Stability, -15).with(Economy, -10).with(Chaos, 25)),
    ("time_loop", D.with(Stability, -5).with(Chaos, 12)),
    ("invert_gravity", D.with(Approval, -5).with(Economy, -6).with(Chaos, 18)),
    ("alien_contact", D.with(Approval, 6).with(Power, 5).with(Chaos, 10)),
    (
        "distort",
        D.with(Stability, -20).with(Justice, -10).with(Power, 15).with(Chaos, 40),
    ),
];

const BOLD: ActionDelta = D.with(Approval, 5).with(Stability, -4).with(Power, 6).with(Chaos, 4);
const MEASURED: ActionDelta = D
    .with(Approval, 2)
    .with(Stability, 6)
    .with(Economy, -2)
    .with(Chaos, -4);
const IGNORE: ActionDelta = D.with(Approval, -10).with(Stability, -8).with(Chaos, 10);

// ---------------------------------------------------------------------------
// Catalog sections
// ---------------------------------------------------------------------------

/// Modifier deltas for each crisis response style.
///
/// [`CrisisMethod::Unspecified`] has no entry and contributes nothing. A
/// catalog that leaves out the section, or one of its methods, gets the
/// builtin modifier for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MethodModifiers {
    /// Added to a crisis handled with [`CrisisMethod::Bold`].
    pub bold: ActionDelta,
    /// Added to a crisis handled with [`CrisisMethod::Measured`].
    pub measured: ActionDelta,
    /// Added to a crisis handled with [`CrisisMethod::Ignore`].
    pub ignore: ActionDelta,
}

impl Default for MethodModifiers {
    fn default() -> Self {
        Self {
            bold: BOLD,
            measured: MEASURED,
            ignore: IGNORE,
        }
    }
}

/// Delta applied for an unrecognized key, per category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fallbacks {
    /// Unknown law. Still counts toward `laws`.
    pub law: ActionDelta,
    /// Unknown crisis. Still counts toward `crises`.
    pub crisis: ActionDelta,
    /// Unknown diplomatic action.
    pub diplomacy: ActionDelta,
    /// Unknown rebellion action.
    pub rebellion: ActionDelta,
    /// Unknown cosmic event.
    pub cosmic: ActionDelta,
}

impl Default for Fallbacks {
    fn default() -> Self {
        Self {
            law: D.with(Approval, -2).with(Chaos, 1).with(Laws, 1),
            crisis: D.with(Stability, -3).with(Chaos, 3).with(Crises, 1),
            diplomacy: D.with(Approval, -1),
            rebellion: D.with(Stability, -2).with(Chaos, 2),
            cosmic: D.with(Chaos, 5),
        }
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// The delta chosen for one action, and whether it came from the fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    /// Table delta, with any crisis method modifier merged in.
    pub delta: ActionDelta,
    /// `true` if the key was not in the table.
    pub fallback: bool,
}

// ---------------------------------------------------------------------------
// DeltaTables
// ---------------------------------------------------------------------------

/// All delta tables, method modifiers and fallbacks for one ruleset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeltaTables {
    /// Law deltas, by normalized key.
    pub law: BTreeMap<String, ActionDelta>,
    /// Crisis deltas, by normalized key.
    pub crisis: BTreeMap<String, ActionDelta>,
    /// Diplomacy deltas, by normalized key.
    pub diplomacy: BTreeMap<String, ActionDelta>,
    /// Rebellion deltas, by normalized key.
    pub rebellion: BTreeMap<String, ActionDelta>,
    /// Cosmic deltas, by normalized key. Wildcards draw from here.
    pub cosmic: BTreeMap<String, ActionDelta>,
    /// Crisis method modifiers.
    #[serde(default)]
    pub methods: MethodModifiers,
    /// Per-category deltas for unknown keys.
    #[serde(default)]
    pub fallback: Fallbacks,
}

/// The counter a category's actions advance, if any.
fn counter_for(category: ActionCategory) -> Option<Axis> {
    match category {
        ActionCategory::Law => Some(Laws),
        ActionCategory::Crisis => Some(Crises),
        _ => None,
    }
}

fn collect(rows: &[(&str, ActionDelta)]) -> BTreeMap<String, ActionDelta> {
    rows.iter()
        .map(|(key, delta)| ((*key).to_owned(), *delta))
        .collect()
}

impl DeltaTables {
    /// The builtin ruleset, built on first use and shared for the life of the
    /// process.
    pub fn builtin() -> Arc<Self> {
        static BUILTIN: OnceLock<Arc<DeltaTables>> = OnceLock::new();
        BUILTIN
            .get_or_init(|| {
                Arc::new(DeltaTables {
                    law: collect(LAW_TABLE),
                    crisis: collect(CRISIS_TABLE),
                    diplomacy: collect(DIPLOMACY_TABLE),
                    rebellion: collect(REBELLION_TABLE),
                    cosmic: collect(COSMIC_TABLE),
                    methods: MethodModifiers::default(),
                    fallback: Fallbacks::default(),
                })
            })
            .clone()
    }

    /// Parse and validate a JSON catalog.
    ///
    /// Keys are normalized to trimmed ASCII lowercase. Missing `methods` or
    /// `fallback` sections take the builtin defaults.
    ///
    /// # Errors
    ///
    /// Returns [`PresidencyError::Catalog`] if the JSON does not parse, two
    /// keys collide after normalization, or a category table is empty. Law
    /// (crisis) entries and their fallback must record exactly one law
    /// (crisis) and nothing else may touch either counter, including the
    /// crisis method modifiers.
    pub fn from_json_str(json: &str) -> Result<Self, PresidencyError> {
        let mut tables: DeltaTables =
            serde_json::from_str(json).map_err(|e| PresidencyError::Catalog(e.to_string()))?;
        tables.normalize()?;
        tables.validate()?;
        Ok(tables)
    }

    /// Read a JSON catalog from disk. See [`from_json_str`](Self::from_json_str).
    pub fn from_file(path: &Path) -> Result<Self, PresidencyError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            PresidencyError::Catalog(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_json_str(&contents)
    }

    fn normalize(&mut self) -> Result<(), PresidencyError> {
        for category in ActionCategory::ALL {
            let table = self.table_mut(category);
            let mut normalized = BTreeMap::new();
            for (key, delta) in std::mem::take(table) {
                let clean = key.trim().to_ascii_lowercase();
                if normalized.insert(clean.clone(), delta).is_some() {
                    return Err(PresidencyError::Catalog(format!(
                        "duplicate {category} key '{clean}'"
                    )));
                }
            }
            *table = normalized;
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), PresidencyError> {
        for category in ActionCategory::ALL {
            if self.table(category).is_empty() {
                return Err(PresidencyError::Catalog(format!(
                    "{category} table has no entries"
                )));
            }
        }

        let methods = [
            ("bold", &self.methods.bold),
            ("measured", &self.methods.measured),
            ("ignore", &self.methods.ignore),
        ];
        for (name, delta) in methods {
            if let Some(counter) = [Laws, Crises].into_iter().find(|c| delta.get(*c).is_some()) {
                return Err(PresidencyError::Catalog(format!(
                    "crisis method '{name}' must not set {counter}"
                )));
            }
        }

        for category in ActionCategory::ALL {
            let own = counter_for(category);
            let fallback = self.fallback(category);
            let entries = self
                .table(category)
                .iter()
                .map(|(key, delta)| (key.as_str(), *delta))
                .chain(std::iter::once(("<fallback>", fallback)));
            for (key, delta) in entries {
                for counter in [Laws, Crises] {
                    let value = delta.get(counter);
                    if Some(counter) == own && value != Some(1) {
                        return Err(PresidencyError::Catalog(format!(
                            "{category} '{key}' must set {counter} to 1"
                        )));
                    }
                    if Some(counter) != own && value.is_some() {
                        return Err(PresidencyError::Catalog(format!(
                            "{category} '{key}' must not set {counter}"
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    /// The table for one category.
    pub fn table(&self, category: ActionCategory) -> &BTreeMap<String, ActionDelta> {
        match category {
            ActionCategory::Law => &self.law,
            ActionCategory::Crisis => &self.crisis,
            ActionCategory::Diplomacy => &self.diplomacy,
            ActionCategory::Rebellion => &self.rebellion,
            ActionCategory::Cosmic => &self.cosmic,
        }
    }

    fn table_mut(&mut self, category: ActionCategory) -> &mut BTreeMap<String, ActionDelta> {
        match category {
            ActionCategory::Law => &mut self.law,
            ActionCategory::Crisis => &mut self.crisis,
            ActionCategory::Diplomacy => &mut self.diplomacy,
            ActionCategory::Rebellion => &mut self.rebellion,
            ActionCategory::Cosmic => &mut self.cosmic,
        }
    }

    /// Keys of one category in sorted order.
    pub fn keys(&self, category: ActionCategory) -> impl Iterator<Item = &str> {
        self.table(category).keys().map(String::as_str)
    }

    /// Delta applied when `category` has no entry for a key.
    pub fn fallback(&self, category: ActionCategory) -> ActionDelta {
        match category {
            ActionCategory::Law => self.fallback.law,
            ActionCategory::Crisis => self.fallback.crisis,
            ActionCategory::Diplomacy => self.fallback.diplomacy,
            ActionCategory::Rebellion => self.fallback.rebellion,
            ActionCategory::Cosmic => self.fallback.cosmic,
        }
    }

    /// Modifier merged into a crisis delta for `method`. Empty for `Unspecified`.
    pub fn method_modifier(&self, method: CrisisMethod) -> ActionDelta {
        match method {
            CrisisMethod::Bold => self.methods.bold,
            CrisisMethod::Measured => self.methods.measured,
            CrisisMethod::Ignore => self.methods.ignore,
            CrisisMethod::Unspecified => ActionDelta::EMPTY,
        }
    }

    /// Look up a key without falling back.
    ///
    /// # Errors
    ///
    /// Returns [`PresidencyError::UnknownActionKey`] if the key has no entry.
    pub fn lookup_strict(
        &self,
        category: ActionCategory,
        key: &str,
    ) -> Result<ActionDelta, PresidencyError> {
        let clean = key.trim().to_ascii_lowercase();
        self.table(category)
            .get(&clean)
            .copied()
            .ok_or_else(|| PresidencyError::UnknownActionKey {
                category,
                key: key.to_owned(),
            })
    }

    /// Resolve an action to the delta that should be applied.
    ///
    /// Unknown keys resolve to the category fallback. For crises, the method
    /// modifier is summed into the base delta; for every other category the
    /// method is ignored.
    pub fn resolve(&self, category: ActionCategory, key: &str, method: CrisisMethod) -> Resolution {
        let (base, fallback) = match self.lookup_strict(category, key) {
            Ok(delta) => (delta, false),
            Err(_) => {
                debug!(%category, key, "unknown action key, applying fallback delta");
                (self.fallback(category), true)
            }
        };

        let delta = match category {
            ActionCategory::Crisis => base.merge(&self.method_modifier(method)),
            _ => {
                if method != CrisisMethod::Unspecified {
                    debug!(%category, %method, "crisis method ignored for non-crisis action");
                }
                base
            }
        };

        Resolution { delta, fallback }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
