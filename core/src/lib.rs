#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Drone Field engine.
//!
//! This crate defines the vocabulary that connects controllers, the
//! authoritative world, and the pure subsystems. Controllers receive an
//! immutable [`Observation`] each turn and answer with an optional [`Action`];
//! the world resolves the action, lets the active scenario advance its
//! environment-owned processes, and exposes [`TileMetadata`] and [`Summary`]
//! snapshots to observers such as renderers.

use std::{collections::BTreeMap, fmt};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Item name used for seed units carried by agents and stored on supply tiles.
pub const SEED: &str = "seed";
/// Item name used for water units collected from water sources.
pub const WATER: &str = "water";
/// Item name granted to an agent for every harvested crop.
pub const CROP: &str = "crop";

/// Cardinal movement directions available to agents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
}

impl Direction {
    /// All directions in the order used for neighbour expansion.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::West,
        Direction::East,
    ];

    /// Unit `(column, row)` delta applied when stepping in this direction.
    #[must_use]
    pub const fn delta(self) -> (i64, i64) {
        match self {
            Self::North => (0, -1),
            Self::South => (0, 1),
            Self::West => (-1, 0),
            Self::East => (1, 0),
        }
    }

    /// Direction that leads from `from` to the orthogonally adjacent `to`.
    ///
    /// Returns `None` when the cells are not exactly one step apart.
    #[must_use]
    pub fn between(from: CellCoord, to: CellCoord) -> Option<Self> {
        let column_diff = from.column().abs_diff(to.column());
        let row_diff = from.row().abs_diff(to.row());

        if column_diff + row_diff != 1 {
            return None;
        }

        if column_diff == 1 {
            if to.column() > from.column() {
                Some(Self::East)
            } else {
                Some(Self::West)
            }
        } else if to.row() > from.row() {
            Some(Self::South)
        } else {
            Some(Self::North)
        }
    }
}

/// Unique identifier assigned to a registered agent.
///
/// Identifiers start at one and are never reused within a world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(u32);

impl AgentId {
    /// Creates a new agent identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }

    /// Cell reached by a single step in `direction`.
    ///
    /// Returns `None` when the step would leave the non-negative quadrant;
    /// upper bounds are the grid's concern.
    #[must_use]
    pub fn neighbor(self, direction: Direction) -> Option<CellCoord> {
        let (dx, dy) = direction.delta();
        let column = u32::try_from(i64::from(self.column) + dx).ok()?;
        let row = u32::try_from(i64::from(self.row) + dy).ok()?;
        Some(CellCoord::new(column, row))
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.column, self.row)
    }
}

/// Amount of a resource that may be unlimited.
///
/// Finite amounts always order below [`Quantity::Unbounded`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Quantity {
    /// A countable amount.
    Finite(u32),
    /// An inexhaustible amount.
    Unbounded,
}

impl Quantity {
    /// Reports whether the quantity is exactly zero.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        matches!(self, Self::Finite(0))
    }

    /// Reports whether the quantity is unlimited.
    #[must_use]
    pub const fn is_unbounded(self) -> bool {
        matches!(self, Self::Unbounded)
    }

    /// Finite amount, if the quantity is bounded.
    #[must_use]
    pub const fn finite(self) -> Option<u32> {
        match self {
            Self::Finite(value) => Some(value),
            Self::Unbounded => None,
        }
    }

    /// Adds `amount`, saturating at `u32::MAX`. Unbounded stays unbounded.
    #[must_use]
    pub const fn saturating_add(self, amount: u32) -> Self {
        match self {
            Self::Finite(value) => Self::Finite(value.saturating_add(amount)),
            Self::Unbounded => Self::Unbounded,
        }
    }

    /// Subtracts `amount`, clamping at zero. Unbounded stays unbounded.
    #[must_use]
    pub const fn saturating_sub(self, amount: u32) -> Self {
        match self {
            Self::Finite(value) => Self::Finite(value.saturating_sub(amount)),
            Self::Unbounded => Self::Unbounded,
        }
    }

    /// Reports whether at least `amount` units are available.
    #[must_use]
    pub const fn covers(self, amount: u32) -> bool {
        match self {
            Self::Finite(value) => value >= amount,
            Self::Unbounded => true,
        }
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Finite(value) => write!(f, "{value}"),
            Self::Unbounded => f.write_str("∞"),
        }
    }
}

/// Insertion-ordered mapping from item names to positive quantities.
///
/// Entries whose count drops to zero are removed, so every stored quantity is
/// strictly positive. Iteration follows first-insertion order, which makes the
/// "first available item" choice deterministic.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStore {
    items: IndexMap<String, Quantity>,
}

impl ItemStore {
    /// Creates an empty item store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style helper that adds `amount` units of `item`.
    #[must_use]
    pub fn with(mut self, item: &str, amount: u32) -> Self {
        self.add(item, amount);
        self
    }

    /// Builder-style helper that makes `item` inexhaustible.
    #[must_use]
    pub fn with_unbounded(mut self, item: &str) -> Self {
        self.grant_unbounded(item);
        self
    }

    /// Quantity of `item` currently held; absent items report zero.
    #[must_use]
    pub fn count(&self, item: &str) -> Quantity {
        self.items.get(item).copied().unwrap_or(Quantity::Finite(0))
    }

    /// Reports whether at least one unit of `item` is held.
    #[must_use]
    pub fn contains(&self, item: &str) -> bool {
        self.items.contains_key(item)
    }

    /// Adds `amount` units of `item`. Adding zero never creates an entry.
    pub fn add(&mut self, item: &str, amount: u32) {
        if amount == 0 {
            return;
        }
        match self.items.get_mut(item) {
            Some(quantity) => *quantity = quantity.saturating_add(amount),
            None => {
                let _ = self.items.insert(item.to_owned(), Quantity::Finite(amount));
            }
        }
    }

    /// Makes `item` inexhaustible, keeping its position if already present.
    pub fn grant_unbounded(&mut self, item: &str) {
        match self.items.get_mut(item) {
            Some(quantity) => *quantity = Quantity::Unbounded,
            None => {
                let _ = self.items.insert(item.to_owned(), Quantity::Unbounded);
            }
        }
    }

    /// Removes one unit of `item`, returning whether a unit was available.
    ///
    /// Unbounded entries never run out.
    pub fn remove_one(&mut self, item: &str) -> bool {
        let Some(quantity) = self.items.get_mut(item) else {
            return false;
        };
        match *quantity {
            Quantity::Unbounded => true,
            Quantity::Finite(0) => false,
            Quantity::Finite(1) => {
                let _ = self.items.shift_remove(item);
                true
            }
            Quantity::Finite(value) => {
                *quantity = Quantity::Finite(value - 1);
                true
            }
        }
    }

    /// Name of the first item in insertion order, if any.
    #[must_use]
    pub fn first_item(&self) -> Option<&str> {
        self.items.keys().next().map(String::as_str)
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Number of distinct item names held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Reports whether no items are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterator over `(item, quantity)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Quantity)> {
        self.items
            .iter()
            .map(|(name, quantity)| (name.as_str(), *quantity))
    }
}

/// Discrete action categories an agent can request.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    /// Stay in place for the turn.
    Wait,
    /// Step one tile in the action's direction.
    Move,
    /// Take one unit of an item from the current tile.
    PickUp,
    /// Leave one unit of an item on the current tile.
    Drop,
    /// Generic interaction handled by the active scenario.
    Use,
    /// Plant a seed in the current tile's soil.
    Plant,
    /// Water the crop on the current tile.
    Water,
    /// Harvest a ready crop or clear weeds on the current tile.
    Harvest,
    /// Scenario-defined action identified by name.
    Custom(String),
}

/// Request issued by a controller to the world.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// Category of the request.
    pub kind: ActionKind,
    /// Direction of travel, required by [`ActionKind::Move`].
    pub direction: Option<Direction>,
    /// Item the request refers to, if any.
    pub item: Option<String>,
    /// Free-form annotations attached by the controller.
    pub metadata: BTreeMap<String, String>,
}

impl Action {
    /// Creates an action of the provided kind with no parameters.
    #[must_use]
    pub fn new(kind: ActionKind) -> Self {
        Self {
            kind,
            direction: None,
            item: None,
            metadata: BTreeMap::new(),
        }
    }

    /// Action that leaves the agent in place.
    #[must_use]
    pub fn wait() -> Self {
        Self::new(ActionKind::Wait)
    }

    /// Action that steps one tile in `direction`.
    #[must_use]
    pub fn step(direction: Direction) -> Self {
        Self {
            direction: Some(direction),
            ..Self::new(ActionKind::Move)
        }
    }

    /// Action that picks up `item`, or the first available item when `None`.
    #[must_use]
    pub fn pick_up(item: Option<&str>) -> Self {
        Self {
            item: item.map(str::to_owned),
            ..Self::new(ActionKind::PickUp)
        }
    }

    /// Action that drops one unit of `item`.
    #[must_use]
    pub fn drop_item(item: &str) -> Self {
        Self {
            item: Some(item.to_owned()),
            ..Self::new(ActionKind::Drop)
        }
    }

    /// Action that plants a seed on the current tile.
    #[must_use]
    pub fn plant() -> Self {
        Self::new(ActionKind::Plant)
    }

    /// Action that waters the current tile.
    #[must_use]
    pub fn water() -> Self {
        Self::new(ActionKind::Water)
    }

    /// Action that harvests or clears the current tile.
    #[must_use]
    pub fn harvest() -> Self {
        Self::new(ActionKind::Harvest)
    }

    /// Returns a copy of the action with `key` set to `value` in its metadata.
    #[must_use]
    pub fn with_metadata(mut self, key: &str, value: &str) -> Self {
        let _ = self.metadata.insert(key.to_owned(), value.to_owned());
        self
    }
}

/// Terrain label stored on a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Terrain {
    /// Open ground.
    #[default]
    Plain,
    /// Launch pad where drones start and recharge.
    LaunchPad,
    /// Tree obstacle.
    Tree,
    /// Navigation goal marker.
    Goal,
}

impl Terrain {
    /// Stable lowercase label for the terrain.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::LaunchPad => "launch_pad",
            Self::Tree => "tree",
            Self::Goal => "goal",
        }
    }
}

/// Lifecycle stage of a soil plot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CropStage {
    /// Bare soil ready for planting.
    #[default]
    Empty,
    /// Seed in the ground.
    Planted,
    /// Seedling that has not yet matured.
    Growing,
    /// Mature crop that can be harvested.
    Ready,
    /// Plot overrun by weeds after drying out.
    Weed,
}

impl CropStage {
    /// Label exposed to observers for the stage.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Planted => "seed",
            Self::Growing => "growing",
            Self::Ready => "ready",
            Self::Weed => "weed",
        }
    }

    /// Reports whether a crop is in the ground and still maturing.
    #[must_use]
    pub const fn is_maturing(self) -> bool {
        matches!(self, Self::Planted | Self::Growing)
    }
}

/// Immutable view of a soil plot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoilSnapshot {
    /// Current lifecycle stage.
    pub stage: CropStage,
    /// Growth accrued toward the next stage threshold.
    pub growth: u32,
    /// Remaining hydration units.
    pub hydration: u32,
    /// Consecutive advancements without hydration.
    pub dry_turns: u32,
    /// Indicates a maturing crop with no hydration left.
    pub needs_water: bool,
}

/// Per-tile bundle consumed by observers and the observation builder.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileMetadata {
    /// Soil state for farmable tiles.
    pub soil: Option<SoilSnapshot>,
    /// Indicates whether crops can be planted on the tile.
    pub farmable: bool,
    /// Indicates the tile is the drone launch pad.
    pub launch_pad: bool,
    /// Indicates the tile holds a static obstacle.
    pub obstacle: bool,
    /// Indicates the tile is the navigation goal.
    pub goal: bool,
    /// Indicates the tile is the navigation start.
    pub start: bool,
    /// Indicates the tile has been recorded as fully grown.
    pub grown_crop: bool,
    /// Indicates the tile is overrun by weeds.
    pub weed: bool,
}

impl Default for TileMetadata {
    fn default() -> Self {
        Self {
            soil: None,
            farmable: true,
            launch_pad: false,
            obstacle: false,
            goal: false,
            start: false,
            grown_crop: false,
            weed: false,
        }
    }
}

/// Simplified terrain classification handed to controllers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TerrainClass {
    /// Static obstacle; never walkable.
    Obstacle,
    /// Launch pad or base tile.
    Base,
    /// Navigation goal.
    Goal,
    /// Soil holding a planted seed.
    Seed,
    /// Soil holding a growing crop.
    Growing,
    /// Soil holding a mature crop.
    Ready,
    /// Soil overrun by weeds.
    Weed,
    /// Tile that cannot hold crops.
    NonFarmable,
    /// Bare tile.
    Empty,
}

impl TerrainClass {
    /// Reduces tile metadata to a single class.
    ///
    /// Precedence: obstacle, base, goal, soil stage, non-farmable, empty.
    #[must_use]
    pub fn classify(metadata: &TileMetadata) -> Self {
        if metadata.obstacle {
            return Self::Obstacle;
        }
        if metadata.launch_pad {
            return Self::Base;
        }
        if metadata.goal {
            return Self::Goal;
        }
        if let Some(soil) = metadata.soil {
            return match soil.stage {
                CropStage::Planted => Self::Seed,
                CropStage::Growing => Self::Growing,
                CropStage::Ready => Self::Ready,
                CropStage::Weed => Self::Weed,
                CropStage::Empty => Self::Empty,
            };
        }
        if !metadata.farmable {
            return Self::NonFarmable;
        }
        Self::Empty
    }

    /// Label used by controllers and text front ends.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Obstacle => "obstacle",
            Self::Base => "base",
            Self::Goal => "goal",
            Self::Seed => "seed",
            Self::Growing => "growing",
            Self::Ready => "ready",
            Self::Weed => "weed",
            Self::NonFarmable => "non-farmable",
            Self::Empty => "empty",
        }
    }

    /// Reports whether planners should treat the class as traversable.
    #[must_use]
    pub const fn is_traversable(self) -> bool {
        !matches!(self, Self::Obstacle | Self::Base)
    }
}

impl fmt::Display for TerrainClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable snapshot delivered to a controller before it decides.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Observation {
    /// Zero-based index of the turn being decided.
    pub turn: u64,
    /// Turns left before the configured cap, if one is set.
    pub time_remaining: Option<u64>,
    /// Cell currently occupied by the observing agent.
    pub position: CellCoord,
    /// Copy of the agent's inventory.
    pub inventory: ItemStore,
    /// Classification of the agent's tile and its in-bounds orthogonal neighbours.
    pub tiles: BTreeMap<CellCoord, TerrainClass>,
    /// Grid width in cells.
    pub width: u32,
    /// Grid height in cells.
    pub height: u32,
}

impl Observation {
    /// Classification of `cell`, if it is visible.
    #[must_use]
    pub fn terrain_at(&self, cell: CellCoord) -> Option<TerrainClass> {
        self.tiles.get(&cell).copied()
    }

    /// First visible cell carrying `class`, in coordinate order.
    #[must_use]
    pub fn locate(&self, class: TerrainClass) -> Option<CellCoord> {
        self.tiles
            .iter()
            .find(|(_, terrain)| **terrain == class)
            .map(|(cell, _)| *cell)
    }
}

/// Decision-making entity attached to a registered agent.
pub trait Controller {
    /// Display name recorded for the agent.
    fn name(&self) -> &str;

    /// Notification carrying the identifier assigned at registration.
    fn on_registered(&mut self, agent: AgentId) {
        let _ = agent;
    }

    /// Chooses the action for the current turn; `None` waits.
    fn decide(&mut self, observation: &Observation) -> Option<Action>;

    /// Reports whether the controller expects external input between turns.
    fn requires_interaction(&self) -> bool {
        false
    }

    /// Reports whether externally injected actions are waiting.
    fn has_pending_actions(&self) -> bool {
        false
    }

    /// Queues an externally supplied action for a later decision.
    ///
    /// Returns `false` for controllers that do not accept injected input.
    fn enqueue(&mut self, action: Action) -> bool {
        let _ = action;
        false
    }
}

/// Record of the first agent to reach the navigation goal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalRecord {
    /// One-based turn on which the goal was observed occupied.
    pub turn: u64,
    /// Agent that reached the goal first.
    pub agent: AgentId,
}

/// Scenario-specific portion of a [`Summary`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum VariantSummary {
    /// Plain grid without farming rules.
    Open,
    /// Drone farming field.
    Farm,
    /// Navigation challenge progress.
    Navigation {
        /// First arrival at the goal, if any.
        goal: Option<GoalRecord>,
    },
    /// Planting challenge progress.
    Planting {
        /// Number of plots recorded as fully grown.
        grown_plots: u32,
        /// Turns a seed needs to become a growing crop.
        seed_turns: u32,
        /// Turns a growing crop needs to become ready.
        growing_turns: u32,
        /// Number of obstacles placed in the field.
        obstacle_count: u32,
    },
}

/// Concise snapshot of simulation progress.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    /// Number of completed turns.
    pub turn: u64,
    /// Crops harvested across all agents.
    pub total_harvested: u32,
    /// Plots currently overrun by weeds.
    pub weed_plots: u32,
    /// Scenario-specific fields.
    pub variant: VariantSummary,
}

impl Summary {
    /// Summary for a world without farming rules.
    #[must_use]
    pub const fn open(turn: u64) -> Self {
        Self {
            turn,
            total_harvested: 0,
            weed_plots: 0,
            variant: VariantSummary::Open,
        }
    }

    /// Reports whether any agent reached the navigation goal.
    #[must_use]
    pub const fn goal_reached(&self) -> bool {
        matches!(
            self.variant,
            VariantSummary::Navigation { goal: Some(_) }
        )
    }
}

/// Reasons an agent registration may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error)]
pub enum PlacementError {
    /// The requested cell lies outside the grid.
    #[error("position is outside the grid")]
    OutOfBounds,
    /// The requested cell is blocked by terrain.
    #[error("tile is blocked")]
    Blocked,
    /// The requested cell already holds an agent.
    #[error("tile is occupied")]
    Occupied,
}

/// Problems detected while parsing an ASCII layout.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    /// The layout row count differs from the configured grid height.
    #[error("layout has {actual} rows but the grid height is {expected}")]
    RowCount {
        /// Configured grid height.
        expected: u32,
        /// Number of rows supplied.
        actual: usize,
    },
    /// A layout row length differs from the configured grid width.
    #[error("layout row {row} has {actual} cells but the grid width is {expected}")]
    RowWidth {
        /// Zero-based row index.
        row: usize,
        /// Configured grid width.
        expected: u32,
        /// Number of cells in the row.
        actual: usize,
    },
    /// The layout contains a character outside the supported set.
    #[error("unsupported layout character {character:?} at {cell}")]
    UnsupportedCharacter {
        /// Offending character.
        character: char,
        /// Cell holding the character.
        cell: CellCoord,
    },
}

/// Structural failures reported by world construction and registration.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum WorldError {
    /// A position lies outside the grid.
    #[error("cell {cell} lies outside the {width}x{height} grid")]
    OutOfBounds {
        /// Offending cell.
        cell: CellCoord,
        /// Grid width in cells.
        width: u32,
        /// Grid height in cells.
        height: u32,
    },
    /// An agent could not be placed at the requested cell.
    #[error("cannot place agent at {cell}: {reason}")]
    InvalidPlacement {
        /// Requested cell.
        cell: CellCoord,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// An ASCII layout could not be parsed.
    #[error("invalid layout: {0}")]
    InvalidLayout(#[from] LayoutError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manhattan_distance_matches_expectation() {
        let origin = CellCoord::new(1, 1);
        let destination = CellCoord::new(4, 3);
        assert_eq!(origin.manhattan_distance(destination), 5);
        assert_eq!(destination.manhattan_distance(origin), 5);
    }

    #[test]
    fn neighbor_rejects_negative_coordinates() {
        let origin = CellCoord::new(0, 0);
        assert_eq!(origin.neighbor(Direction::North), None);
        assert_eq!(origin.neighbor(Direction::West), None);
        assert_eq!(
            origin.neighbor(Direction::East),
            Some(CellCoord::new(1, 0))
        );
        assert_eq!(
            origin.neighbor(Direction::South),
            Some(CellCoord::new(0, 1))
        );
    }

    #[test]
    fn direction_between_requires_adjacency() {
        let from = CellCoord::new(2, 2);
        assert_eq!(
            Direction::between(from, CellCoord::new(2, 1)),
            Some(Direction::North)
        );
        assert_eq!(
            Direction::between(from, CellCoord::new(3, 2)),
            Some(Direction::East)
        );
        assert_eq!(Direction::between(from, CellCoord::new(3, 3)), None);
        assert_eq!(Direction::between(from, from), None);
    }

    #[test]
    fn item_store_drops_exhausted_entries() {
        let mut store = ItemStore::new().with(SEED, 1).with(WATER, 2);

        assert!(store.remove_one(SEED));
        assert!(!store.contains(SEED));
        assert_eq!(store.count(SEED), Quantity::Finite(0));
        assert!(!store.remove_one(SEED));

        assert!(store.remove_one(WATER));
        assert_eq!(store.count(WATER), Quantity::Finite(1));
    }

    #[test]
    fn item_store_preserves_insertion_order() {
        let mut store = ItemStore::new().with("b", 1).with("a", 1).with("c", 1);
        assert_eq!(store.first_item(), Some("b"));

        assert!(store.remove_one("b"));
        assert_eq!(store.first_item(), Some("a"));

        let names: Vec<_> = store.iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["a", "c"]);
    }

    #[test]
    fn adding_zero_items_creates_no_entry() {
        let store = ItemStore::new().with(WATER, 0);
        assert!(store.is_empty());
    }

    #[test]
    fn unbounded_items_never_run_out() {
        let mut store = ItemStore::new().with(SEED, 3).with_unbounded(SEED);
        for _ in 0..100 {
            assert!(store.remove_one(SEED));
        }
        assert_eq!(store.count(SEED), Quantity::Unbounded);
    }

    #[test]
    fn quantity_orders_finite_below_unbounded() {
        assert!(Quantity::Finite(u32::MAX) < Quantity::Unbounded);
        assert_eq!(Quantity::Finite(3).min(Quantity::Finite(2)), Quantity::Finite(2));
        assert_eq!(Quantity::Finite(1).saturating_sub(5), Quantity::Finite(0));
        assert_eq!(Quantity::Unbounded.saturating_sub(5), Quantity::Unbounded);
        assert_eq!(Quantity::Unbounded.to_string(), "∞");
    }

    #[test]
    fn classification_follows_precedence() {
        let soil = SoilSnapshot {
            stage: CropStage::Ready,
            growth: 0,
            hydration: 0,
            dry_turns: 0,
            needs_water: false,
        };
        let everything = TileMetadata {
            soil: Some(soil),
            farmable: false,
            launch_pad: true,
            obstacle: true,
            goal: true,
            ..TileMetadata::default()
        };
        assert_eq!(TerrainClass::classify(&everything), TerrainClass::Obstacle);

        let base = TileMetadata {
            obstacle: false,
            ..everything
        };
        assert_eq!(TerrainClass::classify(&base), TerrainClass::Base);

        let goal = TileMetadata {
            launch_pad: false,
            ..base
        };
        assert_eq!(TerrainClass::classify(&goal), TerrainClass::Goal);

        let ready = TileMetadata { goal: false, ..goal };
        assert_eq!(TerrainClass::classify(&ready), TerrainClass::Ready);

        let barren = TileMetadata { soil: None, ..ready };
        assert_eq!(TerrainClass::classify(&barren), TerrainClass::NonFarmable);

        assert_eq!(
            TerrainClass::classify(&TileMetadata::default()),
            TerrainClass::Empty
        );
    }

    #[test]
    fn soil_stage_labels_match_observer_vocabulary() {
        assert_eq!(CropStage::Planted.label(), "seed");
        assert_eq!(TerrainClass::NonFarmable.as_str(), "non-farmable");
        assert!(!TerrainClass::Base.is_traversable());
        assert!(TerrainClass::Goal.is_traversable());
    }

    #[test]
    fn layout_error_converts_into_world_error() {
        let error: WorldError = LayoutError::UnsupportedCharacter {
            character: 'x',
            cell: CellCoord::new(1, 0),
        }
        .into();
        assert_eq!(
            error.to_string(),
            "invalid layout: unsupported layout character 'x' at (1, 0)"
        );
    }
}
