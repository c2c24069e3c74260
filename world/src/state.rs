//! Grid and agent state shared by the engine and scenario rules.

use drone_field_core::{
    AgentId, CellCoord, Direction, ItemStore, PlacementError, WorldError,
};
use tracing::{debug, trace};

use crate::{
    agents::{AgentRegistry, AgentState},
    grid::Grid,
};

/// Authoritative grid, agent, and turn state.
///
/// Scenario rules receive mutable access to this state from their hooks. Agent
/// positions can only change through movement resolution, which keeps tile
/// occupancy and agent positions consistent.
#[derive(Debug)]
pub struct WorldState {
    grid: Grid,
    agents: AgentRegistry,
    turn: u64,
    max_turns: Option<u64>,
}

impl WorldState {
    /// Creates an empty world of plain tiles with an optional turn cap.
    #[must_use]
    pub fn new(width: u32, height: u32, max_turns: Option<u64>) -> Self {
        Self {
            grid: Grid::new(width, height),
            agents: AgentRegistry::new(),
            turn: 0,
            max_turns,
        }
    }

    /// Tile grid backing the world.
    #[must_use]
    pub const fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Mutable tile grid backing the world.
    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.grid.width()
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.grid.height()
    }

    /// Number of completed turns.
    #[must_use]
    pub const fn turn(&self) -> u64 {
        self.turn
    }

    /// Configured turn cap, if any.
    #[must_use]
    pub const fn max_turns(&self) -> Option<u64> {
        self.max_turns
    }

    /// Turns left before the cap, if one is configured.
    #[must_use]
    pub fn time_remaining(&self) -> Option<u64> {
        self.max_turns
            .map(|max_turns| max_turns.saturating_sub(self.turn))
    }

    /// Reports whether the configured turn cap has been reached.
    #[must_use]
    pub fn cap_reached(&self) -> bool {
        self.max_turns
            .is_some_and(|max_turns| self.turn >= max_turns)
    }

    /// State of the agent registered under `id`.
    #[must_use]
    pub fn agent(&self, id: AgentId) -> Option<&AgentState> {
        self.agents.get(id)
    }

    /// Mutable state of the agent registered under `id`.
    pub fn agent_mut(&mut self, id: AgentId) -> Option<&mut AgentState> {
        self.agents.get_mut(id)
    }

    /// Iterator over every agent in ascending identifier order.
    pub fn agents(&self) -> impl Iterator<Item = &AgentState> {
        self.agents.iter()
    }

    /// Number of registered agents.
    #[must_use]
    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    /// Deposits `amount` units of `item` on the tile at `cell`.
    pub fn scatter_items(
        &mut self,
        cell: CellCoord,
        item: &str,
        amount: u32,
    ) -> Result<(), WorldError> {
        self.grid.tile_mut(cell)?.items_mut().add(item, amount);
        Ok(())
    }

    pub(crate) fn agent_ids(&self) -> Vec<AgentId> {
        self.agents.ids()
    }

    pub(crate) fn place_agent(
        &mut self,
        name: &str,
        position: CellCoord,
        inventory: ItemStore,
    ) -> Result<AgentId, WorldError> {
        let reason = match self.grid.get_tile(position) {
            Err(_) => Some(PlacementError::OutOfBounds),
            Ok(tile) if tile.is_blocking() => Some(PlacementError::Blocked),
            Ok(tile) if !tile.occupants().is_empty() => Some(PlacementError::Occupied),
            Ok(_) => None,
        };
        if let Some(reason) = reason {
            debug!(name, cell = %position, %reason, "rejected agent placement");
            return Err(WorldError::InvalidPlacement {
                cell: position,
                reason,
            });
        }

        let id = self.agents.allocate(name, position, inventory);
        self.grid.admit(id, position);
        debug!(agent = %id, name, cell = %position, "registered agent");
        Ok(id)
    }

    pub(crate) fn move_agent(&mut self, id: AgentId, direction: Direction) -> bool {
        let Some(from) = self.agents.get(id).map(AgentState::position) else {
            return false;
        };
        let Some(to) = from
            .neighbor(direction)
            .filter(|cell| self.grid.in_bounds(*cell))
        else {
            trace!(agent = %id, ?direction, "move leaves the grid; ignoring");
            return false;
        };
        if !self.grid.is_walkable(to) {
            trace!(agent = %id, cell = %to, "move target is not walkable; ignoring");
            return false;
        }

        self.grid.release(id, from);
        self.grid.admit(id, to);
        if let Some(agent) = self.agents.get_mut(id) {
            agent.relocate(to);
        }
        true
    }

    pub(crate) fn pick_up(&mut self, id: AgentId, item: Option<&str>) -> bool {
        let Some(agent) = self.agents.get_mut(id) else {
            return false;
        };
        let Ok(tile) = self.grid.tile_mut(agent.position()) else {
            return false;
        };
        let Some(name) = item.or_else(|| tile.items().first_item()).map(str::to_owned) else {
            return false;
        };
        if !tile.items_mut().remove_one(&name) {
            return false;
        }
        agent.inventory_mut().add(&name, 1);
        true
    }

    pub(crate) fn drop_item(&mut self, id: AgentId, item: Option<&str>) -> bool {
        let Some(name) = item else {
            return false;
        };
        let Some(agent) = self.agents.get_mut(id) else {
            return false;
        };
        let Ok(tile) = self.grid.tile_mut(agent.position()) else {
            return false;
        };
        if !agent.inventory_mut().remove_one(name) {
            return false;
        }
        tile.items_mut().add(name, 1);
        true
    }

    pub(crate) fn advance_turn(&mut self) {
        self.turn = self.turn.saturating_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drone_field_core::{Quantity, SEED, WATER};

    fn state_with_agent() -> (WorldState, AgentId) {
        let mut state = WorldState::new(3, 3, Some(10));
        let id = state
            .place_agent("drone", CellCoord::new(1, 1), ItemStore::new())
            .expect("placement succeeds");
        (state, id)
    }

    #[test]
    fn placement_rejects_blocked_and_occupied_tiles() {
        let (mut state, _) = state_with_agent();
        state
            .grid_mut()
            .tile_mut(CellCoord::new(0, 0))
            .unwrap()
            .set_blocking(true);

        let blocked = state.place_agent("b", CellCoord::new(0, 0), ItemStore::new());
        assert_eq!(
            blocked,
            Err(WorldError::InvalidPlacement {
                cell: CellCoord::new(0, 0),
                reason: PlacementError::Blocked,
            })
        );

        let occupied = state.place_agent("c", CellCoord::new(1, 1), ItemStore::new());
        assert!(matches!(
            occupied,
            Err(WorldError::InvalidPlacement {
                reason: PlacementError::Occupied,
                ..
            })
        ));

        let outside = state.place_agent("d", CellCoord::new(3, 1), ItemStore::new());
        assert!(matches!(
            outside,
            Err(WorldError::InvalidPlacement {
                reason: PlacementError::OutOfBounds,
                ..
            })
        ));
        assert_eq!(state.agent_count(), 1);
    }

    #[test]
    fn move_updates_occupancy_in_both_directions() {
        let (mut state, id) = state_with_agent();
        assert!(state.move_agent(id, Direction::East));

        let to = CellCoord::new(2, 1);
        assert_eq!(state.agent(id).unwrap().position(), to);
        assert_eq!(state.grid().get_tile(to).unwrap().occupants(), [id]);
        assert!(state.grid().is_walkable(CellCoord::new(1, 1)));
    }

    #[test]
    fn move_off_the_grid_is_ignored() {
        let (mut state, id) = state_with_agent();
        assert!(state.move_agent(id, Direction::North));
        assert!(!state.move_agent(id, Direction::North));
        assert_eq!(state.agent(id).unwrap().position(), CellCoord::new(1, 0));
    }

    #[test]
    fn pick_up_without_name_takes_first_inserted_item() {
        let (mut state, id) = state_with_agent();
        let cell = CellCoord::new(1, 1);
        state.scatter_items(cell, WATER, 2).unwrap();
        state.scatter_items(cell, SEED, 1).unwrap();

        assert!(state.pick_up(id, None));
        let agent = state.agent(id).unwrap();
        assert_eq!(agent.inventory().count(WATER), Quantity::Finite(1));
        assert!(!agent.inventory().contains(SEED));
    }

    #[test]
    fn pick_up_from_empty_tile_is_ignored() {
        let (mut state, id) = state_with_agent();
        assert!(!state.pick_up(id, None));
        assert!(!state.pick_up(id, Some(SEED)));
        assert!(state.agent(id).unwrap().inventory().is_empty());
    }

    #[test]
    fn drop_requires_a_held_item() {
        let (mut state, id) = state_with_agent();
        assert!(!state.drop_item(id, Some(SEED)));
        assert!(!state.drop_item(id, None));

        state.agent_mut(id).unwrap().inventory_mut().add(SEED, 1);
        assert!(state.drop_item(id, Some(SEED)));
        let tile = state.grid().get_tile(CellCoord::new(1, 1)).unwrap();
        assert_eq!(tile.items().count(SEED), Quantity::Finite(1));
        assert!(state.agent(id).unwrap().inventory().is_empty());
    }

    #[test]
    fn time_remaining_saturates_at_zero() {
        let mut state = WorldState::new(1, 1, Some(1));
        assert_eq!(state.time_remaining(), Some(1));
        state.advance_turn();
        state.advance_turn();
        assert_eq!(state.time_remaining(), Some(0));
        assert!(state.cap_reached());
    }
}
