#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Drone Field.
//!
//! [`World`] owns the tile grid, the agent registry, every agent's controller,
//! and the scenario [`Rules`] that specialise the engine. Each call to
//! [`World::step`] observes, decides, and resolves for every agent in
//! registration order before running the scenario's post-step housekeeping.

mod agents;
mod grid;
mod observation;
mod resolver;
mod rules;
mod state;

use std::{collections::BTreeMap, fmt};

use drone_field_core::{Action, AgentId, CellCoord, Controller, ItemStore, WorldError};
use tracing::debug;

pub use agents::AgentState;
pub use grid::{Grid, Tile};
pub use resolver::resolve;
pub use rules::{OpenField, Rules};
pub use state::WorldState;

/// Turn-based simulation driving registered controllers against a scenario.
pub struct World<R: Rules = OpenField> {
    state: WorldState,
    rules: R,
    controllers: BTreeMap<AgentId, Box<dyn Controller>>,
}

impl World<OpenField> {
    /// Creates an open world of plain tiles without scenario rules.
    #[must_use]
    pub fn new(width: u32, height: u32, max_turns: Option<u64>) -> Self {
        Self::from_parts(WorldState::new(width, height, max_turns), OpenField)
    }
}

impl<R: Rules> World<R> {
    /// Assembles a world from prepared state and the scenario rules driving it.
    #[must_use]
    pub fn from_parts(state: WorldState, rules: R) -> Self {
        Self {
            state,
            rules,
            controllers: BTreeMap::new(),
        }
    }

    /// Registers `controller` as a new agent standing on `position`.
    ///
    /// Fails without mutating the world when the position is outside the grid
    /// or not walkable. On success the scenario initialises its per-agent
    /// state before the controller learns its identifier.
    pub fn register_agent<C>(
        &mut self,
        controller: C,
        position: CellCoord,
        inventory: ItemStore,
    ) -> Result<AgentId, WorldError>
    where
        C: Controller + 'static,
    {
        let mut controller = Box::new(controller);
        let id = self
            .state
            .place_agent(controller.name(), position, inventory)?;
        self.rules.on_registered(&mut self.state, id);
        controller.on_registered(id);
        let _ = self.controllers.insert(id, controller);
        Ok(id)
    }

    /// Advances the simulation by a single turn.
    ///
    /// A field without agents keeps ticking: the scenario's post-step
    /// housekeeping still runs, so crops grow and resource tiles refill, and
    /// the turn counter still advances.
    pub fn step(&mut self) {
        for id in self.state.agent_ids() {
            let Some(controller) = self.controllers.get_mut(&id) else {
                continue;
            };
            let Some(observation) = observation::build(&self.state, &self.rules, id) else {
                continue;
            };
            let action = controller.decide(&observation);
            self.rules.execute(&mut self.state, id, action.as_ref());
        }
        self.rules.after_step(&mut self.state);
        self.state.advance_turn();
    }

    /// Steps until `steps` turns elapsed or the turn cap is reached.
    ///
    /// Without either bound the loop never returns. Yields the number of turns
    /// executed by this call.
    pub fn run(&mut self, steps: Option<u64>) -> u64 {
        let mut executed = 0;
        while steps.map_or(true, |limit| executed < limit) && !self.state.cap_reached() {
            self.step();
            executed += 1;
        }
        debug!(executed, turn = self.state.turn(), "run finished");
        executed
    }

    /// Queues `action` on the controller of `agent` for its next decision.
    ///
    /// Returns `false` when the agent is unknown or its controller does not
    /// accept injected actions.
    pub fn inject_action(&mut self, agent: AgentId, action: Action) -> bool {
        self.controllers
            .get_mut(&agent)
            .is_some_and(|controller| controller.enqueue(action))
    }

    /// Reports whether the configured turn cap has been reached.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.state.cap_reached()
    }

    /// Read-only access to the grid, agents, and turn counter.
    #[must_use]
    pub const fn state(&self) -> &WorldState {
        &self.state
    }

    /// Read-only access to the scenario rules.
    #[must_use]
    pub const fn rules(&self) -> &R {
        &self.rules
    }

    /// Controller attached to `agent`.
    #[must_use]
    pub fn controller(&self, agent: AgentId) -> Option<&dyn Controller> {
        self.controllers.get(&agent).map(|controller| &**controller)
    }
}

impl<R: Rules + fmt::Debug> fmt::Debug for World<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let controllers: Vec<_> = self
            .controllers
            .iter()
            .map(|(id, controller)| (*id, controller.name()))
            .collect();
        f.debug_struct("World")
            .field("state", &self.state)
            .field("rules", &self.rules)
            .field("controllers", &controllers)
            .finish()
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use drone_field_core::{
        AgentId, CellCoord, Observation, Quantity, Summary, TerrainClass, TileMetadata, WorldError,
    };

    use super::{observation, Rules, World};

    /// Scenario metadata for `cell`.
    ///
    /// Fails with [`WorldError::OutOfBounds`] outside the grid.
    pub fn tile_metadata<R: Rules>(
        world: &World<R>,
        cell: CellCoord,
    ) -> Result<TileMetadata, WorldError> {
        let _ = world.state.grid().get_tile(cell)?;
        Ok(world.rules.tile_metadata(&world.state, cell))
    }

    /// Classification controllers would see for `cell`.
    pub fn terrain_class<R: Rules>(
        world: &World<R>,
        cell: CellCoord,
    ) -> Result<TerrainClass, WorldError> {
        tile_metadata(world, cell).map(|metadata| TerrainClass::classify(&metadata))
    }

    /// Battery level of `agent`; unbounded when the scenario tracks no energy.
    #[must_use]
    pub fn battery_level<R: Rules>(world: &World<R>, agent: AgentId) -> Quantity {
        world.rules.battery_level(agent)
    }

    /// Concise progress snapshot reported by the scenario.
    #[must_use]
    pub fn summary<R: Rules>(world: &World<R>) -> Summary {
        world.rules.summary(&world.state)
    }

    /// Observation `agent` would receive if it decided now.
    #[must_use]
    pub fn observation<R: Rules>(world: &World<R>, agent: AgentId) -> Option<Observation> {
        observation::build(&world.state, &world.rules, agent)
    }

    /// Cell currently occupied by `agent`.
    #[must_use]
    pub fn agent_position<R: Rules>(world: &World<R>, agent: AgentId) -> Option<CellCoord> {
        world.state.agent(agent).map(|state| state.position())
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::Cell, rc::Rc};

    use super::*;
    use drone_field_core::{Direction, Observation, PlacementError, Quantity, SEED};

    struct Scripted {
        moves: Vec<Direction>,
    }

    impl Scripted {
        fn new(moves: &[Direction]) -> Self {
            Self {
                moves: moves.iter().rev().copied().collect(),
            }
        }
    }

    impl Controller for Scripted {
        fn name(&self) -> &str {
            "scripted"
        }

        fn decide(&mut self, _observation: &Observation) -> Option<Action> {
            self.moves.pop().map(Action::step)
        }
    }

    #[derive(Default)]
    struct Listener {
        assigned: Rc<Cell<Option<AgentId>>>,
        pending: Vec<Action>,
    }

    impl Controller for Listener {
        fn name(&self) -> &str {
            "listener"
        }

        fn on_registered(&mut self, agent: AgentId) {
            self.assigned.set(Some(agent));
        }

        fn decide(&mut self, _observation: &Observation) -> Option<Action> {
            self.pending.pop()
        }

        fn enqueue(&mut self, action: Action) -> bool {
            self.pending.push(action);
            true
        }
    }

    #[test]
    fn registration_assigns_increasing_identifiers() {
        let mut world = World::new(3, 3, None);
        let first = world
            .register_agent(Scripted::new(&[]), CellCoord::new(0, 0), ItemStore::new())
            .unwrap();
        let second = world
            .register_agent(Scripted::new(&[]), CellCoord::new(1, 0), ItemStore::new())
            .unwrap();

        assert_eq!(first, AgentId::new(1));
        assert_eq!(second, AgentId::new(2));
        assert_eq!(world.controller(first).map(|controller| controller.name()), Some("scripted"));
    }

    #[test]
    fn failed_registration_leaves_world_untouched() {
        let mut world = World::new(2, 2, None);
        let _ = world
            .register_agent(Scripted::new(&[]), CellCoord::new(0, 0), ItemStore::new())
            .unwrap();

        let result =
            world.register_agent(Scripted::new(&[]), CellCoord::new(0, 0), ItemStore::new());
        assert_eq!(
            result,
            Err(WorldError::InvalidPlacement {
                cell: CellCoord::new(0, 0),
                reason: PlacementError::Occupied,
            })
        );
        assert_eq!(world.state().agent_count(), 1);

        let next = world
            .register_agent(Scripted::new(&[]), CellCoord::new(1, 1), ItemStore::new())
            .unwrap();
        assert_eq!(next, AgentId::new(2));
    }

    #[test]
    fn earlier_agents_move_first_within_a_turn() {
        let mut world = World::new(3, 1, None);
        let left = world
            .register_agent(
                Scripted::new(&[Direction::East]),
                CellCoord::new(0, 0),
                ItemStore::new(),
            )
            .unwrap();
        let right = world
            .register_agent(
                Scripted::new(&[Direction::West]),
                CellCoord::new(2, 0),
                ItemStore::new(),
            )
            .unwrap();

        world.step();

        assert_eq!(query::agent_position(&world, left), Some(CellCoord::new(1, 0)));
        assert_eq!(query::agent_position(&world, right), Some(CellCoord::new(2, 0)));
        assert_eq!(world.state().turn(), 1);
    }

    #[test]
    fn run_stops_at_the_turn_cap() {
        let mut world = World::new(2, 2, Some(3));
        let _ = world
            .register_agent(Scripted::new(&[]), CellCoord::new(0, 0), ItemStore::new())
            .unwrap();

        assert_eq!(world.run(Some(10)), 3);
        assert!(world.is_finished());
        assert_eq!(world.run(None), 0);
    }

    #[test]
    fn run_honours_an_explicit_step_count() {
        let mut world = World::new(2, 2, None);
        assert_eq!(world.run(Some(4)), 4);
        assert_eq!(world.state().turn(), 4);
    }

    #[test]
    fn injected_actions_reach_the_controller() {
        let mut world = World::new(2, 2, None);
        let listener = Listener::default();
        let assigned = Rc::clone(&listener.assigned);
        let id = world
            .register_agent(listener, CellCoord::new(0, 0), ItemStore::new())
            .unwrap();
        assert_eq!(assigned.get(), Some(id));

        assert!(world.inject_action(id, Action::step(Direction::South)));
        assert!(!world.inject_action(AgentId::new(7), Action::wait()));
        world.step();

        assert_eq!(query::agent_position(&world, id), Some(CellCoord::new(0, 1)));
    }

    #[test]
    fn open_world_queries_report_neutral_values() {
        let mut world = World::new(2, 2, None);
        let id = world
            .register_agent(
                Scripted::new(&[]),
                CellCoord::new(1, 1),
                ItemStore::new().with(SEED, 1),
            )
            .unwrap();

        assert_eq!(query::battery_level(&world, id), Quantity::Unbounded);
        assert_eq!(query::summary(&world).turn, 0);
        assert!(matches!(
            query::tile_metadata(&world, CellCoord::new(2, 0)),
            Err(WorldError::OutOfBounds { .. })
        ));

        let observation = query::observation(&world, id).expect("observation");
        assert_eq!(observation.inventory.count(SEED), Quantity::Finite(1));
        assert_eq!(observation.tiles.len(), 3);
    }
}
