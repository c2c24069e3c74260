//! Shortest-path navigation toward a visible goal tile.

use std::collections::{BTreeMap, VecDeque};

use drone_field_core::{Action, CellCoord, Controller, Direction, Observation, TerrainClass};
use tracing::trace;

const DEFAULT_NAME: &str = "Navigator";

/// Controller that walks a breadth-first path to the goal it can see.
///
/// The planned path is cached and replayed one move per decision; a new plan
/// is computed only once the cache runs dry. Without a visible goal the
/// navigator waits.
#[derive(Clone, Debug)]
pub struct BreadthFirstNavigator {
    name: String,
    path: VecDeque<Direction>,
}

impl BreadthFirstNavigator {
    /// Creates a navigator with the default display name.
    #[must_use]
    pub fn new() -> Self {
        Self::named(DEFAULT_NAME)
    }

    /// Creates a navigator reporting `name`.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: VecDeque::new(),
        }
    }

    /// Moves still queued from the last plan.
    pub fn remaining_path(&self) -> impl Iterator<Item = Direction> + '_ {
        self.path.iter().copied()
    }
}

impl Default for BreadthFirstNavigator {
    fn default() -> Self {
        Self::new()
    }
}

impl Controller for BreadthFirstNavigator {
    fn name(&self) -> &str {
        &self.name
    }

    fn decide(&mut self, observation: &Observation) -> Option<Action> {
        if self.path.is_empty() {
            let Some(goal) = observation.locate(TerrainClass::Goal) else {
                return Some(Action::wait());
            };
            self.path = plan_path(observation, goal);
            trace!(%goal, steps = self.path.len(), "planned path");
        }

        Some(self.path.pop_front().map_or_else(Action::wait, Action::step))
    }
}

/// Breadth-first path from the observer's position to `goal`.
///
/// Only visible tiles are searched. A tile is traversable unless it is an
/// obstacle or a base, except for the goal itself. Neighbours are expanded in
/// [`Direction::ALL`] order, which fixes the path chosen among equal-length
/// alternatives. Returns an empty path when already on the goal or when the
/// goal is unreachable through visible tiles.
#[must_use]
pub fn plan_path(observation: &Observation, goal: CellCoord) -> VecDeque<Direction> {
    let start = observation.position;
    if start == goal {
        return VecDeque::new();
    }

    let mut came_from = BTreeMap::from([(start, start)]);
    let mut frontier = VecDeque::from([start]);
    while let Some(current) = frontier.pop_front() {
        if current == goal {
            break;
        }
        for direction in Direction::ALL {
            let Some(neighbor) = current.neighbor(direction) else {
                continue;
            };
            let Some(terrain) = observation.terrain_at(neighbor) else {
                continue;
            };
            if came_from.contains_key(&neighbor) {
                continue;
            }
            if terrain.is_traversable() || neighbor == goal {
                let _ = came_from.insert(neighbor, current);
                frontier.push_back(neighbor);
            }
        }
    }

    let mut path = VecDeque::new();
    if !came_from.contains_key(&goal) {
        return path;
    }
    let mut current = goal;
    while current != start {
        let Some(&previous) = came_from.get(&current) else {
            break;
        };
        if let Some(direction) = Direction::between(previous, current) {
            path.push_front(direction);
        }
        current = previous;
    }
    path
}
