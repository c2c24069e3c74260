//! Drone farming field and the farm machinery shared by every variant.

use drone_field_core::{
    Action, ActionKind, AgentId, CellCoord, Quantity, Summary, Terrain, TileMetadata,
    VariantSummary, WorldError, SEED, WATER,
};
use drone_field_system_crops::{GrowthRules, SoilField};
use drone_field_system_energy::{BatteryBank, EnergyConfig};
use drone_field_world::{resolve, Rules, World, WorldState};
use tracing::trace;

use crate::config::FieldConfig;

/// Turns between two seed deliveries to the supply tiles.
pub const SEED_SPAWN_INTERVAL: u32 = 3;

/// Tunables a variant hands to [`FarmCore::install`].
#[derive(Clone, Copy, Debug)]
pub(crate) struct FarmParameters {
    pub(crate) growth: GrowthRules,
    pub(crate) energy: EnergyConfig,
    pub(crate) base: CellCoord,
    pub(crate) water_source_capacity: u32,
    pub(crate) seed_spawn_rate: u32,
}

impl From<&FieldConfig> for FarmParameters {
    fn from(config: &FieldConfig) -> Self {
        Self {
            growth: config.growth(),
            energy: config.energy(),
            base: config.base_or_default(),
            water_source_capacity: config.water_source_capacity,
            seed_spawn_rate: config.seed_spawn_rate,
        }
    }
}

/// Soil, batteries, launch pad, and resource tiles of a drone field.
#[derive(Clone, Debug)]
pub struct FarmCore {
    soil: SoilField,
    energy: BatteryBank,
    base: CellCoord,
    water_sources: Vec<CellCoord>,
    seed_supplies: Vec<CellCoord>,
    water_source_capacity: u32,
    seed_spawn_rate: u32,
    turns_since_seed_spawn: u32,
}

impl FarmCore {
    /// Lays out the launch pad and resource tiles on `state`.
    ///
    /// The water source sits at the bottom-centre and the seed supply in the
    /// bottom-left corner; neither they nor the launch pad can hold crops.
    pub(crate) fn install(
        state: &mut WorldState,
        parameters: FarmParameters,
    ) -> Result<Self, WorldError> {
        state
            .grid_mut()
            .tile_mut(parameters.base)?
            .set_terrain(Terrain::LaunchPad);

        let bottom = state.height().saturating_sub(1);
        let water_sources = vec![CellCoord::new(state.width() / 2, bottom)];
        let seed_supplies = vec![CellCoord::new(0, bottom)];

        let mut soil = SoilField::new(state.width(), state.height(), parameters.growth);
        for cell in water_sources.iter().chain(&seed_supplies) {
            soil.set_farmable(*cell, false);
        }
        soil.set_farmable(parameters.base, false);

        for cell in &water_sources {
            state.scatter_items(*cell, WATER, parameters.water_source_capacity)?;
        }
        for cell in &seed_supplies {
            state.scatter_items(*cell, SEED, parameters.seed_spawn_rate)?;
        }

        Ok(Self {
            soil,
            energy: BatteryBank::new(parameters.energy),
            base: parameters.base,
            water_sources,
            seed_supplies,
            water_source_capacity: parameters.water_source_capacity,
            seed_spawn_rate: parameters.seed_spawn_rate,
            turns_since_seed_spawn: 0,
        })
    }

    /// Launch pad where drones recharge.
    #[must_use]
    pub const fn base(&self) -> CellCoord {
        self.base
    }

    /// Soil plots of the field.
    #[must_use]
    pub const fn soil(&self) -> &SoilField {
        &self.soil
    }

    /// Battery levels of the registered drones.
    #[must_use]
    pub const fn energy(&self) -> &BatteryBank {
        &self.energy
    }

    /// Tiles refilled with water every turn.
    #[must_use]
    pub fn water_sources(&self) -> &[CellCoord] {
        &self.water_sources
    }

    /// Tiles receiving fresh seeds periodically.
    #[must_use]
    pub fn seed_supplies(&self) -> &[CellCoord] {
        &self.seed_supplies
    }

    pub(crate) fn register(&mut self, agent: AgentId) {
        self.energy.register(agent);
    }

    pub(crate) fn grant_unbounded_battery(&mut self, agent: AgentId) {
        self.energy.grant_unbounded(agent);
    }

    /// Resolves `action` and charges its energy cost.
    ///
    /// A drained drone is held in place for free.
    pub(crate) fn execute<R: Rules>(
        rules: &mut R,
        core: fn(&mut R) -> &mut FarmCore,
        state: &mut WorldState,
        agent: AgentId,
        action: Option<&Action>,
    ) {
        if core(rules).energy.is_depleted(agent) {
            trace!(%agent, "battery empty; waiting");
            return;
        }
        resolve(state, rules, agent, action);
        core(rules).energy.charge_for(agent, action);
    }

    pub(crate) fn handle_farming(
        &mut self,
        state: &mut WorldState,
        agent: AgentId,
        action: &Action,
    ) -> bool {
        let Some(agent_state) = state.agent_mut(agent) else {
            return false;
        };
        let position = agent_state.position();
        let inventory = agent_state.inventory_mut();
        match action.kind {
            ActionKind::Plant => self.soil.plant(position, inventory),
            ActionKind::Water => self.soil.water(position, inventory),
            ActionKind::Harvest => self.soil.harvest(position, inventory).is_handled(),
            _ => false,
        }
    }

    pub(crate) fn plant_for(&mut self, state: &mut WorldState, agent: AgentId) -> bool {
        self.handle_farming(state, agent, &Action::plant())
    }

    /// Grows crops, replenishes resources, and recharges drones on the pad.
    ///
    /// Returns the cells holding a ready crop after growth.
    pub(crate) fn after_step(&mut self, state: &mut WorldState) -> Vec<CellCoord> {
        let ready = self.soil.advance();
        self.replenish(state);
        for agent in state.agents() {
            if agent.position() == self.base {
                self.energy.recharge(agent.id());
            }
        }
        ready
    }

    pub(crate) fn tile_metadata(&self, cell: CellCoord) -> TileMetadata {
        TileMetadata {
            soil: self.soil.snapshot(cell),
            farmable: self.soil.is_farmable(cell),
            launch_pad: cell == self.base,
            ..TileMetadata::default()
        }
    }

    pub(crate) fn battery_level(&self, agent: AgentId) -> Quantity {
        self.energy.level(agent)
    }

    pub(crate) fn summary(&self, turn: u64, variant: VariantSummary) -> Summary {
        Summary {
            turn,
            total_harvested: self.soil.harvested(),
            weed_plots: self.soil.weed_count(),
            variant,
        }
    }

    /// Turns `cell` into a blocking tree without soil.
    pub(crate) fn place_obstacle(&mut self, state: &mut WorldState, cell: CellCoord) -> bool {
        let Ok(tile) = state.grid_mut().tile_mut(cell) else {
            return false;
        };
        tile.set_blocking(true);
        tile.set_terrain(Terrain::Tree);
        self.soil.set_farmable(cell, false);
        self.soil.reset(cell);
        true
    }

    /// Removes every resource tile and the items lying on them.
    pub(crate) fn clear_resources(&mut self, state: &mut WorldState) {
        for cell in self.water_sources.drain(..).chain(self.seed_supplies.drain(..)) {
            if let Ok(tile) = state.grid_mut().tile_mut(cell) {
                tile.items_mut().clear();
            }
        }
        self.turns_since_seed_spawn = 0;
    }

    pub(crate) fn set_farmable(&mut self, cell: CellCoord, farmable: bool) {
        self.soil.set_farmable(cell, farmable);
    }

    fn replenish(&mut self, state: &mut WorldState) {
        for cell in &self.water_sources {
            let Ok(tile) = state.grid_mut().tile_mut(*cell) else {
                continue;
            };
            if let Some(current) = tile.items().count(WATER).finite() {
                let missing = self.water_source_capacity.saturating_sub(current);
                tile.items_mut().add(WATER, missing);
            }
        }

        self.turns_since_seed_spawn += 1;
        if self.turns_since_seed_spawn >= SEED_SPAWN_INTERVAL {
            for cell in &self.seed_supplies {
                if let Ok(tile) = state.grid_mut().tile_mut(*cell) {
                    tile.items_mut().add(SEED, self.seed_spawn_rate);
                }
            }
            self.turns_since_seed_spawn = 0;
        }
    }
}

/// Drone farming field: hydrated crops, batteries, and resource tiles.
#[derive(Clone, Debug)]
pub struct FarmRules {
    core: FarmCore,
}

impl FarmRules {
    /// Farm machinery backing the scenario.
    #[must_use]
    pub const fn core(&self) -> &FarmCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut FarmCore {
        &mut self.core
    }
}

impl Rules for FarmRules {
    fn on_registered(&mut self, _state: &mut WorldState, agent: AgentId) {
        self.core.register(agent);
    }

    fn execute(&mut self, state: &mut WorldState, agent: AgentId, action: Option<&Action>) {
        FarmCore::execute(self, Self::core_mut, state, agent, action);
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
        let _ = self.core.after_step(state);
    }

    fn tile_metadata(&self, _state: &WorldState, cell: CellCoord) -> TileMetadata {
        self.core.tile_metadata(cell)
    }

    fn battery_level(&self, agent: AgentId) -> Quantity {
        self.core.battery_level(agent)
    }

    fn summary(&self, state: &WorldState) -> Summary {
        self.core.summary(state.turn(), VariantSummary::Farm)
    }
}

/// Builds a drone farming field from `config`.
///
/// Fails with [`WorldError::OutOfBounds`] when the launch pad lies outside
/// the grid.
pub fn build(config: &FieldConfig) -> Result<World<FarmRules>, WorldError> {
    let mut state = WorldState::new(config.width, config.height, config.max_turns);
    let core = FarmCore::install(&mut state, FarmParameters::from(config))?;
    Ok(World::from_parts(state, FarmRules { core }))
}
