//! Planting challenge: grow as many plots as possible around static trees.

use std::collections::BTreeSet;

use drone_field_core::{
    Action, AgentId, CellCoord, CropStage, Quantity, Summary, TileMetadata, VariantSummary,
    WorldError, SEED,
};
use drone_field_system_crops::GrowthRules;
use drone_field_system_energy::EnergyConfig;
use drone_field_world::{Rules, World, WorldState};
use tracing::debug;

use crate::{
    config::PlantingConfig,
    farm::{FarmCore, FarmParameters},
};

const SEED_SPAWN_RATE: u32 = 2;

/// Free-growth farming with a permanent record of grown plots.
#[derive(Clone, Debug)]
pub struct PlantingRules {
    core: FarmCore,
    grown: BTreeSet<CellCoord>,
    obstacles: BTreeSet<CellCoord>,
    auto_plant: bool,
}

impl PlantingRules {
    /// Farm machinery backing the scenario.
    #[must_use]
    pub const fn core(&self) -> &FarmCore {
        &self.core
    }

    /// Plots that have reached the ready stage at least once.
    pub fn grown_plots(&self) -> impl Iterator<Item = CellCoord> + '_ {
        self.grown.iter().copied()
    }

    /// Tree positions in coordinate order.
    #[must_use]
    pub fn obstacles(&self) -> Vec<CellCoord> {
        self.obstacles.iter().copied().collect()
    }

    /// Reports whether drones plant automatically after acting.
    #[must_use]
    pub const fn auto_plant(&self) -> bool {
        self.auto_plant
    }

    fn core_mut(&mut self) -> &mut FarmCore {
        &mut self.core
    }
}

impl Rules for PlantingRules {
    fn on_registered(&mut self, state: &mut WorldState, agent: AgentId) {
        self.core.grant_unbounded_battery(agent);
        if let Some(drone) = state.agent_mut(agent) {
            drone.inventory_mut().grant_unbounded(SEED);
        }
    }

    fn execute(&mut self, state: &mut WorldState, agent: AgentId, action: Option<&Action>) {
        FarmCore::execute(self, Self::core_mut, state, agent, action);
        if self.auto_plant {
            let _ = self.core.plant_for(state, agent);
        }
    }

    fn handle_custom_action(
        &mut self,
        state: &mut WorldState,
        agent: AgentId,
        action: &Action,
    ) -> bool {
        self.core.handle_farming(state, agent, action)
    }

    fn after_step(&mut self, state: &mut WorldState) {
        for cell in self.core.after_step(state) {
            if self.grown.insert(cell) {
                debug!(%cell, "plot fully grown");
            }
        }
    }

    fn tile_metadata(&self, _state: &WorldState, cell: CellCoord) -> TileMetadata {
        let base = self.core.tile_metadata(cell);
        TileMetadata {
            grown_crop: self.grown.contains(&cell),
            weed: base.soil.is_some_and(|soil| soil.stage == CropStage::Weed),
            obstacle: self.obstacles.contains(&cell),
            ..base
        }
    }

    fn battery_level(&self, agent: AgentId) -> Quantity {
        self.core.battery_level(agent)
    }

    fn summary(&self, state: &WorldState) -> Summary {
        let rules = self.core.soil().rules();
        self.core.summary(
            state.turn(),
            VariantSummary::Planting {
                grown_plots: count(self.grown.len()),
                seed_turns: rules.seedling_threshold(),
                growing_turns: rules.maturity_threshold(),
                obstacle_count: count(self.obstacles.len()),
            },
        )
    }
}

/// Sparse tree pattern used when no explicit obstacles are configured.
///
/// Fields narrower or shorter than four cells stay clear.
#[must_use]
pub fn default_obstacles(width: u32, height: u32) -> BTreeSet<CellCoord> {
    let mut obstacles = BTreeSet::new();
    if width < 4 || height < 4 {
        return obstacles;
    }

    let mid_row = (height / 2).max(1);
    for column in (1..width).step_by(3) {
        let _ = obstacles.insert(CellCoord::new(column, mid_row));
    }
    for row in (2..height).step_by(4) {
        let _ = obstacles.insert(CellCoord::new(width / 2, row));
    }
    obstacles
}

/// Builds a planting challenge from `config`.
///
/// Obstacles outside the grid or on the launch pad are skipped.
pub fn build(config: &PlantingConfig) -> Result<World<PlantingRules>, WorldError> {
    let mut state = WorldState::new(config.width, config.height, config.max_turns);
    let growth = GrowthRules::free_growth(config.seed_turns, config.growing_turns);
    let parameters = FarmParameters {
        growth,
        energy: EnergyConfig {
            capacity: Quantity::Unbounded,
            idle_cost: 1,
            move_cost: 2,
            action_cost: 3,
            recharge_rate: 5,
        },
        base: CellCoord::new(config.width.saturating_sub(1), 0),
        water_source_capacity: 0,
        seed_spawn_rate: SEED_SPAWN_RATE,
    };
    let mut core = FarmCore::install(&mut state, parameters)?;

    let requested = match &config.obstacles {
        Some(cells) => cells.iter().copied().collect(),
        None => default_obstacles(config.width, config.height),
    };
    let mut obstacles = BTreeSet::new();
    for cell in requested {
        if cell == core.base() {
            continue;
        }
        if core.place_obstacle(&mut state, cell) {
            let _ = obstacles.insert(cell);
        }
    }

    Ok(World::from_parts(
        state,
        PlantingRules {
            core,
            grown: BTreeSet::new(),
            obstacles,
            auto_plant: config.auto_plant,
        },
    ))
}

fn count(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}
