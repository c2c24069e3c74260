//! Action resolution shared by every scenario.

use drone_field_core::{Action, ActionKind, AgentId};
use tracing::trace;

use crate::{rules::Rules, state::WorldState};

/// Applies `action` on behalf of `agent`.
///
/// Gameplay misses such as walking into a tree, picking up from an empty tile,
/// or sending an action the scenario does not understand are ignored without
/// mutating state. A missing action waits.
pub fn resolve<R: Rules + ?Sized>(
    state: &mut WorldState,
    rules: &mut R,
    agent: AgentId,
    action: Option<&Action>,
) {
    let Some(action) = action else {
        return;
    };
    if state.agent(agent).is_none() {
        return;
    }

    match action.kind {
        ActionKind::Wait => {}
        ActionKind::Move => {
            let Some(direction) = action.direction else {
                trace!(agent = %agent, "move without direction; ignoring");
                return;
            };
            let _ = state.move_agent(agent, direction);
        }
        ActionKind::PickUp => {
            let _ = state.pick_up(agent, action.item.as_deref());
        }
        ActionKind::Drop => {
            let _ = state.drop_item(agent, action.item.as_deref());
        }
        ActionKind::Use
        | ActionKind::Plant
        | ActionKind::Water
        | ActionKind::Harvest
        | ActionKind::Custom(_) => {
            if !rules.handle_custom_action(state, agent, action) {
                trace!(agent = %agent, kind = ?action.kind, "action not handled; ignoring");
            }
        }
    }
}
