#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Soil and crop lifecycle shared by the farming scenarios.
//!
//! A [`SoilField`] owns one [`SoilPlot`] per grid cell together with the
//! farmable mask. Agents interact with plots through [`SoilField::plant`],
//! [`SoilField::water`] and [`SoilField::harvest`]; the scenario calls
//! [`SoilField::advance`] once per turn during post-step housekeeping.

use drone_field_core::{CellCoord, CropStage, ItemStore, SoilSnapshot, CROP, SEED, WATER};
use tracing::debug;

/// Consecutive dry advancements after which a maturing crop turns to weed.
pub const WEED_AFTER_DRY_TURNS: u32 = 2;

/// Hydration units added by a single watering.
pub const WATERING_AMOUNT: u32 = 2;

/// Growth model applied to every plot of a field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GrowthRules {
    /// Crops grow only while hydrated and wither into weeds when dry.
    Hydrated {
        /// Growth needed for a planted seed to become a growing crop.
        seedling_threshold: u32,
        /// Growth needed for a growing crop to become ready.
        maturity_threshold: u32,
        /// Upper bound for stored hydration.
        max_hydration: u32,
    },
    /// Crops grow every turn, cannot be watered, and stay ready forever.
    FreeGrowth {
        /// Turns a planted seed needs to become a growing crop.
        seed_turns: u32,
        /// Turns a growing crop needs to become ready.
        growing_turns: u32,
    },
}

impl GrowthRules {
    /// Free-growth rules with both durations clamped to at least one turn.
    #[must_use]
    pub fn free_growth(seed_turns: u32, growing_turns: u32) -> Self {
        Self::FreeGrowth {
            seed_turns: seed_turns.max(1),
            growing_turns: growing_turns.max(1),
        }
    }

    /// Growth a planted seed needs before it sprouts.
    #[must_use]
    pub const fn seedling_threshold(&self) -> u32 {
        match *self {
            Self::Hydrated {
                seedling_threshold, ..
            } => seedling_threshold,
            Self::FreeGrowth { seed_turns, .. } => seed_turns,
        }
    }

    /// Growth a growing crop needs before it is ready.
    #[must_use]
    pub const fn maturity_threshold(&self) -> u32 {
        match *self {
            Self::Hydrated {
                maturity_threshold, ..
            } => maturity_threshold,
            Self::FreeGrowth { growing_turns, .. } => growing_turns,
        }
    }
}

/// Mutable state of a single patch of soil.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SoilPlot {
    stage: CropStage,
    growth: u32,
    hydration: u32,
    dry_turns: u32,
}

impl SoilPlot {
    /// Current lifecycle stage.
    #[must_use]
    pub const fn stage(&self) -> CropStage {
        self.stage
    }

    /// Growth accrued toward the next threshold.
    #[must_use]
    pub const fn growth(&self) -> u32 {
        self.growth
    }

    /// Remaining hydration units.
    #[must_use]
    pub const fn hydration(&self) -> u32 {
        self.hydration
    }

    /// Consecutive advancements spent without hydration.
    #[must_use]
    pub const fn dry_turns(&self) -> u32 {
        self.dry_turns
    }

    /// Reports whether a maturing crop has run out of hydration.
    #[must_use]
    pub const fn needs_water(&self) -> bool {
        self.stage.is_maturing() && self.hydration == 0
    }

    /// Immutable view handed to observers.
    #[must_use]
    pub const fn snapshot(&self) -> SoilSnapshot {
        SoilSnapshot {
            stage: self.stage,
            growth: self.growth,
            hydration: self.hydration,
            dry_turns: self.dry_turns,
            needs_water: self.needs_water(),
        }
    }

    fn reset(&mut self) {
        *self = Self::default();
    }

    fn advance_hydrated(&mut self, seedling_threshold: u32, maturity_threshold: u32) {
        if matches!(self.stage, CropStage::Empty | CropStage::Weed) {
            self.dry_turns = 0;
            return;
        }

        if self.hydration > 0 {
            self.growth = self.growth.saturating_add(1);
            self.hydration -= 1;
            self.dry_turns = 0;
        } else {
            self.dry_turns += 1;
        }

        match self.stage {
            CropStage::Planted if self.growth >= seedling_threshold => {
                self.stage = CropStage::Growing;
                self.growth = 0;
                self.dry_turns = 0;
            }
            CropStage::Growing if self.growth >= maturity_threshold => {
                self.stage = CropStage::Ready;
                self.growth = 0;
                self.dry_turns = 0;
            }
            _ if self.stage.is_maturing() && self.dry_turns >= WEED_AFTER_DRY_TURNS => {
                self.stage = CropStage::Weed;
                self.growth = 0;
                self.hydration = 0;
            }
            _ => {}
        }
    }

    fn advance_free(&mut self, seed_turns: u32, growing_turns: u32) {
        let (threshold, next) = match self.stage {
            CropStage::Planted => (seed_turns, CropStage::Growing),
            CropStage::Growing => (growing_turns, CropStage::Ready),
            CropStage::Empty | CropStage::Ready | CropStage::Weed => return,
        };
        self.growth = (self.growth + 1).min(threshold);
        if self.growth >= threshold {
            self.stage = next;
            self.growth = 0;
        }
    }
}

/// Outcome of a harvest request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HarvestOutcome {
    /// A ready crop was collected and the plot emptied.
    Crop,
    /// Weeds were cleared without yield.
    Cleared,
    /// Nothing on the plot could be harvested.
    NotHandled,
}

impl HarvestOutcome {
    /// Reports whether the harvest request changed the plot.
    #[must_use]
    pub const fn is_handled(self) -> bool {
        !matches!(self, Self::NotHandled)
    }
}

/// Dense grid of soil plots with a farmable mask.
#[derive(Clone, Debug)]
pub struct SoilField {
    width: u32,
    height: u32,
    plots: Vec<SoilPlot>,
    farmable: Vec<bool>,
    rules: GrowthRules,
    harvested: u32,
}

impl SoilField {
    /// Creates a field of empty, farmable plots.
    #[must_use]
    pub fn new(width: u32, height: u32, rules: GrowthRules) -> Self {
        let len = usize::try_from(u64::from(width) * u64::from(height)).unwrap_or(0);
        Self {
            width,
            height,
            plots: vec![SoilPlot::default(); len],
            farmable: vec![true; len],
            rules,
            harvested: 0,
        }
    }

    /// Growth model applied to the field.
    #[must_use]
    pub const fn rules(&self) -> GrowthRules {
        self.rules
    }

    /// Crops harvested from the field so far.
    #[must_use]
    pub const fn harvested(&self) -> u32 {
        self.harvested
    }

    /// Reports whether `cell` can hold crops. Cells outside the field never can.
    #[must_use]
    pub fn is_farmable(&self, cell: CellCoord) -> bool {
        self.index(cell).is_some_and(|index| self.farmable[index])
    }

    /// Marks `cell` as farmable or not. Cells outside the field are ignored.
    pub fn set_farmable(&mut self, cell: CellCoord, farmable: bool) {
        if let Some(index) = self.index(cell) {
            self.farmable[index] = farmable;
        }
    }

    /// Plot stored at `cell`, farmable or not.
    #[must_use]
    pub fn plot(&self, cell: CellCoord) -> Option<&SoilPlot> {
        self.index(cell).map(|index| &self.plots[index])
    }

    /// Soil snapshot for `cell`, present only on farmable plots.
    #[must_use]
    pub fn snapshot(&self, cell: CellCoord) -> Option<SoilSnapshot> {
        let index = self.index(cell)?;
        self.farmable[index].then(|| self.plots[index].snapshot())
    }

    /// Returns the plot at `cell` to empty, dry soil.
    pub fn reset(&mut self, cell: CellCoord) {
        if let Some(plot) = self.plot_mut(cell) {
            plot.reset();
        }
    }

    /// Plants a seed from `inventory` on the empty plot at `cell`.
    ///
    /// Under free growth the planter never runs out: an agent without seeds is
    /// granted an unbounded supply and no seed is consumed.
    pub fn plant(&mut self, cell: CellCoord, inventory: &mut ItemStore) -> bool {
        let rules = self.rules;
        let Some(plot) = self.farmable_plot_mut(cell) else {
            return false;
        };
        if plot.stage != CropStage::Empty {
            return false;
        }

        match rules {
            GrowthRules::Hydrated { .. } => {
                if !inventory.remove_one(SEED) {
                    return false;
                }
                plot.hydration = plot.hydration.max(1);
            }
            GrowthRules::FreeGrowth { .. } => {
                if !inventory.contains(SEED) {
                    inventory.grant_unbounded(SEED);
                }
                plot.hydration = 0;
            }
        }
        plot.stage = CropStage::Planted;
        plot.growth = 0;
        plot.dry_turns = 0;
        true
    }

    /// Waters the maturing crop at `cell` using one unit from `inventory`.
    pub fn water(&mut self, cell: CellCoord, inventory: &mut ItemStore) -> bool {
        let GrowthRules::Hydrated { max_hydration, .. } = self.rules else {
            return false;
        };
        let Some(plot) = self.farmable_plot_mut(cell) else {
            return false;
        };
        if !plot.stage.is_maturing() || !inventory.remove_one(WATER) {
            return false;
        }
        plot.hydration = (plot.hydration + WATERING_AMOUNT).min(max_hydration);
        plot.dry_turns = 0;
        true
    }

    /// Harvests a ready crop into `inventory` or clears weeds at `cell`.
    ///
    /// Ready crops under free growth are permanent and cannot be harvested.
    pub fn harvest(&mut self, cell: CellCoord, inventory: &mut ItemStore) -> HarvestOutcome {
        let rules = self.rules;
        let Some(plot) = self.farmable_plot_mut(cell) else {
            return HarvestOutcome::NotHandled;
        };
        match (plot.stage, rules) {
            (CropStage::Ready, GrowthRules::Hydrated { .. }) => {
                plot.reset();
                inventory.add(CROP, 1);
                self.harvested = self.harvested.saturating_add(1);
                HarvestOutcome::Crop
            }
            (CropStage::Weed, _) => {
                plot.reset();
                HarvestOutcome::Cleared
            }
            _ => HarvestOutcome::NotHandled,
        }
    }

    /// Advances every farmable plot by one turn.
    ///
    /// Returns the cells holding a ready crop afterwards, in row-major order.
    pub fn advance(&mut self) -> Vec<CellCoord> {
        let rules = self.rules;
        let mut ready = Vec::new();

        for index in 0..self.plots.len() {
            if !self.farmable[index] {
                continue;
            }
            let cell = self.cell_at(index);
            let plot = &mut self.plots[index];
            let before = plot.stage;

            match rules {
                GrowthRules::Hydrated {
                    seedling_threshold,
                    maturity_threshold,
                    ..
                } => plot.advance_hydrated(seedling_threshold, maturity_threshold),
                GrowthRules::FreeGrowth {
                    seed_turns,
                    growing_turns,
                } => plot.advance_free(seed_turns, growing_turns),
            }

            if plot.stage == CropStage::Weed && before != CropStage::Weed {
                debug!(%cell, "crop dried out and turned to weed");
            }
            if plot.stage == CropStage::Ready {
                ready.push(cell);
            }
        }
        ready
    }

    /// Number of farmable plots overrun by weeds.
    #[must_use]
    pub fn weed_count(&self) -> u32 {
        let count = self
            .plots
            .iter()
            .zip(&self.farmable)
            .filter(|(plot, farmable)| **farmable && plot.stage == CropStage::Weed)
            .count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    fn plot_mut(&mut self, cell: CellCoord) -> Option<&mut SoilPlot> {
        let index = self.index(cell)?;
        Some(&mut self.plots[index])
    }

    fn farmable_plot_mut(&mut self, cell: CellCoord) -> Option<&mut SoilPlot> {
        let index = self.index(cell)?;
        if !self.farmable[index] {
            return None;
        }
        Some(&mut self.plots[index])
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() >= self.width || cell.row() >= self.height {
            return None;
        }
        let index = u64::from(cell.row()) * u64::from(self.width) + u64::from(cell.column());
        usize::try_from(index).ok()
    }

    fn cell_at(&self, index: usize) -> CellCoord {
        let index = u32::try_from(index).unwrap_or(u32::MAX);
        CellCoord::new(index % self.width, index / self.width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drone_field_core::Quantity;

    const CELL: CellCoord = CellCoord::new(1, 1);

    fn hydrated() -> SoilField {
        SoilField::new(
            3,
            3,
            GrowthRules::Hydrated {
                seedling_threshold: 2,
                maturity_threshold: 3,
                max_hydration: 3,
            },
        )
    }

    #[test]
    fn planting_consumes_a_seed_and_primes_hydration() {
        let mut field = hydrated();
        let mut inventory = ItemStore::new().with(SEED, 1);

        assert!(field.plant(CELL, &mut inventory));
        assert!(!inventory.contains(SEED));

        let plot = field.plot(CELL).unwrap();
        assert_eq!(plot.stage(), CropStage::Planted);
        assert_eq!(plot.hydration(), 1);
        assert!(!field.plant(CELL, &mut ItemStore::new().with(SEED, 1)));
    }

    #[test]
    fn planting_without_seed_is_refused() {
        let mut field = hydrated();
        assert!(!field.plant(CELL, &mut ItemStore::new()));
        assert_eq!(field.plot(CELL).unwrap().stage(), CropStage::Empty);
    }

    #[test]
    fn non_farmable_plots_reject_every_interaction() {
        let mut field = hydrated();
        field.set_farmable(CELL, false);
        let mut inventory = ItemStore::new().with(SEED, 1).with(WATER, 1);

        assert!(!field.plant(CELL, &mut inventory));
        assert!(!field.water(CELL, &mut inventory));
        assert_eq!(field.harvest(CELL, &mut inventory), HarvestOutcome::NotHandled);
        assert_eq!(field.snapshot(CELL), None);
        assert_eq!(inventory.len(), 2);
    }

    #[test]
    fn watering_is_capped_and_resets_dry_turns() {
        let mut field = hydrated();
        let mut inventory = ItemStore::new().with(SEED, 1).with(WATER, 3);
        assert!(field.plant(CELL, &mut inventory));

        assert!(field.water(CELL, &mut inventory));
        assert_eq!(field.plot(CELL).unwrap().hydration(), 3);
        assert!(field.water(CELL, &mut inventory));
        assert_eq!(field.plot(CELL).unwrap().hydration(), 3);
        assert_eq!(inventory.count(WATER), Quantity::Finite(1));
    }

    #[test]
    fn watering_empty_soil_keeps_the_water() {
        let mut field = hydrated();
        let mut inventory = ItemStore::new().with(WATER, 1);
        assert!(!field.water(CELL, &mut inventory));
        assert_eq!(inventory.count(WATER), Quantity::Finite(1));
    }

    #[test]
    fn dry_crop_turns_to_weed_after_two_advancements() {
        let mut field = hydrated();
        let mut inventory = ItemStore::new().with(SEED, 1);
        assert!(field.plant(CELL, &mut inventory));

        let _ = field.advance();
        let plot = *field.plot(CELL).unwrap();
        assert_eq!((plot.stage(), plot.growth(), plot.hydration()), (CropStage::Planted, 1, 0));
        assert!(plot.needs_water());

        let _ = field.advance();
        assert_eq!(field.plot(CELL).unwrap().dry_turns(), 1);
        assert_eq!(field.plot(CELL).unwrap().stage(), CropStage::Planted);

        let _ = field.advance();
        let plot = *field.plot(CELL).unwrap();
        assert_eq!(plot.stage(), CropStage::Weed);
        assert_eq!((plot.growth(), plot.hydration()), (0, 0));
        assert_eq!(field.weed_count(), 1);

        assert_eq!(field.harvest(CELL, &mut inventory), HarvestOutcome::Cleared);
        assert_eq!(field.plot(CELL).unwrap().stage(), CropStage::Empty);
        assert!(!inventory.contains(CROP));
        assert_eq!(field.harvested(), 0);
    }

    #[test]
    fn ready_crop_keeps_drawing_hydration_without_weeding() {
        let mut field = SoilField::new(
            3,
            3,
            GrowthRules::Hydrated {
                seedling_threshold: 1,
                maturity_threshold: 1,
                max_hydration: 5,
            },
        );
        let mut inventory = ItemStore::new().with(SEED, 1).with(WATER, 2);
        assert!(field.plant(CELL, &mut inventory));
        assert!(field.water(CELL, &mut inventory));
        assert!(field.water(CELL, &mut inventory));

        let _ = field.advance();
        assert_eq!(field.advance(), [CELL]);
        let plot = *field.plot(CELL).unwrap();
        assert_eq!((plot.stage(), plot.hydration()), (CropStage::Ready, 3));

        let _ = field.advance();
        let plot = *field.plot(CELL).unwrap();
        assert_eq!(
            (plot.growth(), plot.hydration(), plot.dry_turns()),
            (1, 2, 0)
        );

        for _ in 0..5 {
            let _ = field.advance();
        }
        let plot = *field.plot(CELL).unwrap();
        assert_eq!(plot.stage(), CropStage::Ready);
        assert_eq!((plot.growth(), plot.hydration(), plot.dry_turns()), (3, 0, 3));
        assert!(!plot.needs_water());
        assert_eq!(field.weed_count(), 0);
        assert_eq!(field.snapshot(CELL).map(|soil| soil.dry_turns), Some(3));
    }

    #[test]
    fn watered_crop_matures_and_yields_one_harvest() {
        let mut field = hydrated();
        let mut inventory = ItemStore::new().with(SEED, 1).with(WATER, 10);
        assert!(field.plant(CELL, &mut inventory));

        let mut ready = Vec::new();
        for _ in 0..10 {
            if field.plot(CELL).unwrap().needs_water() {
                assert!(field.water(CELL, &mut inventory));
            }
            ready = field.advance();
            if !ready.is_empty() {
                break;
            }
        }

        assert_eq!(ready, [CELL]);
        assert_eq!(field.harvest(CELL, &mut inventory), HarvestOutcome::Crop);
        assert_eq!(inventory.count(CROP), Quantity::Finite(1));
        assert_eq!(field.harvested(), 1);
        assert_eq!(field.harvest(CELL, &mut inventory), HarvestOutcome::NotHandled);
        assert_eq!(field.harvested(), 1);
    }

    #[test]
    fn free_growth_plants_without_seeds_and_keeps_ready_crops() {
        let mut field = SoilField::new(2, 2, GrowthRules::free_growth(0, 2));
        let mut inventory = ItemStore::new();
        let cell = CellCoord::new(0, 0);

        assert!(field.plant(cell, &mut inventory));
        assert_eq!(inventory.count(SEED), Quantity::Unbounded);
        assert!(!field.water(cell, &mut inventory));

        assert!(field.advance().is_empty());
        assert_eq!(field.plot(cell).unwrap().stage(), CropStage::Growing);
        assert!(field.advance().is_empty());
        assert_eq!(field.advance(), [cell]);
        assert_eq!(field.advance(), [cell]);

        assert_eq!(field.harvest(cell, &mut inventory), HarvestOutcome::NotHandled);
        assert_eq!(field.plot(cell).unwrap().stage(), CropStage::Ready);
    }

    #[test]
    fn free_growth_keeps_finite_seed_counts() {
        let mut field = SoilField::new(1, 1, GrowthRules::free_growth(2, 3));
        let mut inventory = ItemStore::new().with(SEED, 1);

        assert!(field.plant(CellCoord::new(0, 0), &mut inventory));
        assert_eq!(inventory.count(SEED), Quantity::Finite(1));
        assert_eq!(field.rules().seedling_threshold(), 2);
        assert_eq!(field.rules().maturity_threshold(), 3);
    }

    #[test]
    fn out_of_bounds_cells_are_not_farmable() {
        let field = hydrated();
        assert!(!field.is_farmable(CellCoord::new(3, 0)));
        assert!(field.plot(CellCoord::new(0, 3)).is_none());
    }
}
