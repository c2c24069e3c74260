//! Seeded random exploration.

use drone_field_core::{Action, Controller, Direction, Observation};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Controller that moves in a uniformly random direction every turn.
///
/// The generator is seeded, so two walkers built from the same seed produce
/// the same sequence of moves.
#[derive(Clone, Debug)]
pub struct RandomWalker {
    name: String,
    rng: ChaCha8Rng,
}

impl RandomWalker {
    /// Creates a walker drawing from a generator seeded with `seed`.
    #[must_use]
    pub fn new(name: impl Into<String>, seed: u64) -> Self {
        Self {
            name: name.into(),
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl Controller for RandomWalker {
    fn name(&self) -> &str {
        &self.name
    }

    fn decide(&mut self, _observation: &Observation) -> Option<Action> {
        let index = self.rng.gen_range(0..Direction::ALL.len());
        Some(Action::step(Direction::ALL[index]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drone_field_core::{ActionKind, CellCoord, ItemStore};

    fn decisions(walker: &mut RandomWalker, count: usize) -> Vec<Option<Direction>> {
        let view = Observation {
            turn: 0,
            time_remaining: None,
            position: CellCoord::new(0, 0),
            inventory: ItemStore::new(),
            tiles: Default::default(),
            width: 1,
            height: 1,
        };
        (0..count)
            .filter_map(|_| walker.decide(&view))
            .map(|action| {
                assert_eq!(action.kind, ActionKind::Move);
                action.direction
            })
            .collect()
    }

    #[test]
    fn equal_seeds_walk_identically() {
        let first = decisions(&mut RandomWalker::new("a", 7), 32);
        let second = decisions(&mut RandomWalker::new("b", 7), 32);

        assert_eq!(first.len(), 32);
        assert_eq!(first, second);
        assert!(first.iter().all(Option::is_some));
    }

    #[test]
    fn walks_cover_several_directions() {
        let moves = decisions(&mut RandomWalker::new("wanderer", 11), 64);
        let distinct: std::collections::BTreeSet<_> = moves.into_iter().flatten().collect();
        assert!(distinct.len() > 1);
    }
}
