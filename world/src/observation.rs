//! Visibility-limited observation construction.

use std::collections::BTreeMap;

use drone_field_core::{AgentId, Direction, Observation, TerrainClass};

use crate::{rules::Rules, state::WorldState};

/// Builds the observation `agent` decides from.
///
/// Only the agent's own tile and its in-bounds orthogonal neighbours are
/// visible, each reduced to a [`TerrainClass`].
pub(crate) fn build<R: Rules + ?Sized>(
    state: &WorldState,
    rules: &R,
    agent: AgentId,
) -> Option<Observation> {
    let agent_state = state.agent(agent)?;
    let position = agent_state.position();

    let visible = std::iter::once(position).chain(
        Direction::ALL
            .into_iter()
            .filter_map(|direction| position.neighbor(direction))
            .filter(|cell| state.grid().in_bounds(*cell)),
    );

    let tiles: BTreeMap<_, _> = visible
        .map(|cell| {
            let metadata = rules.tile_metadata(state, cell);
            (cell, TerrainClass::classify(&metadata))
        })
        .collect();

    Some(Observation {
        turn: state.turn(),
        time_remaining: state.time_remaining(),
        position,
        inventory: agent_state.inventory().clone(),
        tiles,
        width: state.width(),
        height: state.height(),
    })
}
