//! Seeded cosmic wildcard draws.
//!
//! A [`CosmicDeck`] picks cosmic action keys from a ruleset's cosmic table.
//! Each draw consumes exactly one `u64` from a `Pcg64` stream, so a deck is
//! fully described by its seed and draw count and can be rebuilt with
//! [`CosmicDeck::resume`].

use presidency_core::prelude::{ActionCategory, DeltaTables};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;

/// Deterministic source of cosmic wildcard keys for one session.
///
/// Two decks with the same seed draw the same keys in the same order from
/// the same tables.
#[derive(Debug, Clone)]
pub struct CosmicDeck {
    seed: u64,
    draws: u64,
    rng: Pcg64,
}

impl CosmicDeck {
    /// A deck that has not been drawn from yet.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            draws: 0,
            rng: Pcg64::seed_from_u64(seed),
        }
    }

    /// Rebuild a deck that has already been drawn from `draws` times.
    ///
    /// The stream is jumped ahead rather than replayed, so the cost grows
    /// with the logarithm of `draws`.
    pub fn resume(seed: u64, draws: u64) -> Self {
        let mut deck = Self::new(seed);
        deck.rng.advance(u128::from(draws));
        deck.draws = draws;
        deck
    }

    /// The seed the deck was created with.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of draws made so far.
    pub fn draws(&self) -> u64 {
        self.draws
    }

    /// Draw a cosmic key, indexing the table in sorted key order.
    ///
    /// Returns `None` (without advancing) if the cosmic table is empty.
    pub fn draw<'t>(&mut self, tables: &'t DeltaTables) -> Option<&'t str> {
        let count = tables.table(ActionCategory::Cosmic).len();
        if count == 0 {
            return None;
        }
        let roll: u64 = self.rng.gen();
        self.draws = self.draws.saturating_add(1);
        let index = (roll % count as u64) as usize;
        tables.keys(ActionCategory::Cosmic).nth(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_sequence() {
        let tables = DeltaTables::builtin();
        let mut a = CosmicDeck::new(42);
        let mut b = CosmicDeck::new(42);
        for _ in 0..32 {
            assert_eq!(a.draw(&tables), b.draw(&tables));
        }
        assert_eq!(a.draws(), 32);
    }

    #[test]
    fn draws_come_from_the_cosmic_table() {
        let tables = DeltaTables::builtin();
        let mut deck = CosmicDeck::new(7);
        for _ in 0..64 {
            let key = deck.draw(&tables).unwrap();
            assert!(tables.table(ActionCategory::Cosmic).contains_key(key));
        }
    }

    #[test]
    fn resume_continues_where_the_deck_left_off() {
        let tables = DeltaTables::builtin();
        let mut original = CosmicDeck::new(99);
        for _ in 0..10 {
            original.draw(&tables);
        }
        let mut resumed = CosmicDeck::resume(99, 10);
        assert_eq!(resumed.draws(), 10);
        for _ in 0..10 {
            assert_eq!(original.draw(&tables), resumed.draw(&tables));
        }
    }

    #[test]
    fn resume_jumps_far_ahead_without_replaying() {
        let tables = DeltaTables::builtin();
        let far = 1u64 << 48;
        let mut a = CosmicDeck::resume(3, far);
        let mut b = CosmicDeck::resume(3, far);
        assert_eq!(a.draws(), far);
        for _ in 0..8 {
            assert_eq!(a.draw(&tables), b.draw(&tables));
        }
        assert_eq!(a.draws(), far + 8);

        let mut last = CosmicDeck::resume(3, u64::MAX);
        assert!(last.draw(&tables).is_some());
        assert_eq!(last.draws(), u64::MAX);
    }

    #[test]
    fn empty_table_does_not_advance() {
        let mut tables = (*DeltaTables::builtin()).clone();
        tables.cosmic.clear();
        let mut deck = CosmicDeck::new(1);
        assert_eq!(deck.draw(&tables), None);
        assert_eq!(deck.draws(), 0);
    }
}
