#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Per-agent battery accounting layered onto action costs.

use std::collections::BTreeMap;

use drone_field_core::{Action, ActionKind, AgentId, Quantity};
use tracing::debug;

/// Battery capacity, action costs, and recharge rate of a scenario.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EnergyConfig {
    /// Level assigned at registration and upper bound for recharging.
    pub capacity: Quantity,
    /// Cost of waiting and of every action without a dedicated cost.
    pub idle_cost: u32,
    /// Cost of a move request.
    pub move_cost: u32,
    /// Cost of planting, watering, and harvesting.
    pub action_cost: u32,
    /// Energy gained per turn while standing on the base.
    pub recharge_rate: u32,
}

impl EnergyConfig {
    /// Energy charged for `action`, with `None` treated as waiting.
    #[must_use]
    pub fn cost_of(&self, action: Option<&Action>) -> u32 {
        match action.map(|action| &action.kind) {
            Some(ActionKind::Move) => self.move_cost,
            Some(ActionKind::Plant | ActionKind::Water | ActionKind::Harvest) => self.action_cost,
            _ => self.idle_cost,
        }
    }
}

/// Battery levels of every agent registered in an energy-bearing scenario.
#[derive(Clone, Debug)]
pub struct BatteryBank {
    config: EnergyConfig,
    levels: BTreeMap<AgentId, Quantity>,
}

impl BatteryBank {
    /// Creates an empty bank charging according to `config`.
    #[must_use]
    pub const fn new(config: EnergyConfig) -> Self {
        Self {
            config,
            levels: BTreeMap::new(),
        }
    }

    /// Costs and capacity applied by the bank.
    #[must_use]
    pub const fn config(&self) -> &EnergyConfig {
        &self.config
    }

    /// Starts tracking `agent` with a full battery.
    pub fn register(&mut self, agent: AgentId) {
        let _ = self.levels.insert(agent, self.config.capacity);
    }

    /// Gives `agent` a battery that never drains.
    pub fn grant_unbounded(&mut self, agent: AgentId) {
        let _ = self.levels.insert(agent, Quantity::Unbounded);
    }

    /// Reports whether `agent` has a battery in this bank.
    #[must_use]
    pub fn tracks(&self, agent: AgentId) -> bool {
        self.levels.contains_key(&agent)
    }

    /// Battery level of `agent`; untracked agents report an unbounded level.
    #[must_use]
    pub fn level(&self, agent: AgentId) -> Quantity {
        self.levels
            .get(&agent)
            .copied()
            .unwrap_or(Quantity::Unbounded)
    }

    /// Reports whether a tracked `agent` has run its battery down to zero.
    #[must_use]
    pub fn is_depleted(&self, agent: AgentId) -> bool {
        self.level(agent).is_zero()
    }

    /// Deducts the cost of `action` from `agent`, clamping at zero.
    pub fn charge_for(&mut self, agent: AgentId, action: Option<&Action>) {
        let cost = self.config.cost_of(action);
        let Some(level) = self.levels.get_mut(&agent) else {
            return;
        };
        let was_empty = level.is_zero();
        *level = level.saturating_sub(cost);
        if level.is_zero() && !was_empty {
            debug!(%agent, "battery depleted");
        }
    }

    /// Adds one turn of recharge to `agent`, clamped at capacity.
    pub fn recharge(&mut self, agent: AgentId) {
        let rate = self.config.recharge_rate;
        let capacity = self.config.capacity;
        if let Some(level) = self.levels.get_mut(&agent) {
            *level = level.saturating_add(rate).min(capacity.max(*level));
        }
    }
}
