//! Scenario behaviour supplied to the engine at construction.

use drone_field_core::{Action, AgentId, CellCoord, Quantity, Summary, TileMetadata};

use crate::{resolver, state::WorldState};

/// Strategy object that specialises the engine for a scenario.
///
/// Every hook has a neutral default, so [`OpenField`] is a complete scenario
/// that only supports the base movement and item rules.
pub trait Rules {
    /// Initialises per-agent scenario state right after registration.
    fn on_registered(&mut self, state: &mut WorldState, agent: AgentId) {
        let _ = (state, agent);
    }

    /// Resolves one agent's action for the current turn.
    ///
    /// Scenarios that charge for actions wrap [`resolver::resolve`] here.
    fn execute(&mut self, state: &mut WorldState, agent: AgentId, action: Option<&Action>) {
        resolver::resolve(state, self, agent, action);
    }

    /// Handles `Use`, farming, and custom action kinds.
    ///
    /// Returns `false` when the action was not handled; the resolver then
    /// ignores it.
    fn handle_custom_action(
        &mut self,
        state: &mut WorldState,
        agent: AgentId,
        action: &Action,
    ) -> bool {
        let _ = (state, agent, action);
        false
    }

    /// Housekeeping executed after every agent acted in the current turn.
    fn after_step(&mut self, state: &mut WorldState) {
        let _ = state;
    }

    /// Supplementary information about `cell` for observers.
    fn tile_metadata(&self, state: &WorldState, cell: CellCoord) -> TileMetadata {
        let _ = (state, cell);
        TileMetadata::default()
    }

    /// Battery level of `agent`; unbounded unless the scenario tracks energy.
    fn battery_level(&self, agent: AgentId) -> Quantity {
        let _ = agent;
        Quantity::Unbounded
    }

    /// Concise progress snapshot.
    fn summary(&self, state: &WorldState) -> Summary {
        Summary::open(state.turn())
    }
}

/// Scenario with no rules beyond movement and item transfer.
#[derive(Clone, Copy, Debug, Default)]
pub struct OpenField;

impl Rules for OpenField {}
