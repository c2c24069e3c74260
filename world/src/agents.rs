//! Registry of agent runtime state keyed by identifier.

use std::collections::BTreeMap;

use drone_field_core::{AgentId, CellCoord, ItemStore};

/// Runtime state tracked for each registered agent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AgentState {
    id: AgentId,
    name: String,
    position: CellCoord,
    inventory: ItemStore,
}

impl AgentState {
    /// Identifier assigned at registration.
    #[must_use]
    pub const fn id(&self) -> AgentId {
        self.id
    }

    /// Display name reported by the agent's controller.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Cell currently occupied by the agent.
    #[must_use]
    pub const fn position(&self) -> CellCoord {
        self.position
    }

    /// Items carried by the agent.
    #[must_use]
    pub const fn inventory(&self) -> &ItemStore {
        &self.inventory
    }

    /// Mutable access to the items carried by the agent.
    pub fn inventory_mut(&mut self) -> &mut ItemStore {
        &mut self.inventory
    }

    pub(crate) fn relocate(&mut self, cell: CellCoord) {
        self.position = cell;
    }
}

/// Ordered arena of agents that allocates monotonically increasing identifiers.
#[derive(Debug)]
pub(crate) struct AgentRegistry {
    entries: BTreeMap<AgentId, AgentState>,
    next_agent_id: u32,
}

impl AgentRegistry {
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_agent_id: 1,
        }
    }

    pub(crate) fn allocate(
        &mut self,
        name: &str,
        position: CellCoord,
        inventory: ItemStore,
    ) -> AgentId {
        let id = AgentId::new(self.next_agent_id);
        self.next_agent_id = self.next_agent_id.saturating_add(1);
        let _ = self.entries.insert(
            id,
            AgentState {
                id,
                name: name.to_owned(),
                position,
                inventory,
            },
        );
        id
    }

    pub(crate) fn get(&self, id: AgentId) -> Option<&AgentState> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: AgentId) -> Option<&mut AgentState> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &AgentState> {
        self.entries.values()
    }

    pub(crate) fn ids(&self) -> Vec<AgentId> {
        self.entries.keys().copied().collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
