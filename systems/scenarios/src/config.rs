//! TOML-backed scenario configuration.

use std::{fs, path::Path};

use anyhow::{ensure, Context, Result};
use drone_field_core::{CellCoord, Quantity};
use drone_field_system_crops::GrowthRules;
use drone_field_system_energy::EnergyConfig;
use serde::{de::DeserializeOwned, Deserialize};

const DEFAULT_WIDTH: u32 = 8;
const DEFAULT_HEIGHT: u32 = 6;
const DEFAULT_MAX_TURNS: u64 = 120;

/// Parameters of the drone farming field.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FieldConfig {
    /// Grid width in cells.
    pub width: u32,
    /// Grid height in cells.
    pub height: u32,
    /// Turn cap; `None` runs without limit.
    pub max_turns: Option<u64>,
    /// Growth a planted seed needs before it sprouts.
    pub seedling_threshold: u32,
    /// Growth a sprouted crop needs before it is ready.
    pub maturity_threshold: u32,
    /// Upper bound for hydration stored in a plot.
    pub max_hydration: u32,
    /// Water units each source holds after replenishment.
    pub water_source_capacity: u32,
    /// Seeds added to each supply tile every third turn.
    pub seed_spawn_rate: u32,
    /// Battery level assigned at registration.
    pub battery_capacity: u32,
    /// Energy charged for waiting.
    pub idle_cost: u32,
    /// Energy charged for moving.
    pub move_cost: u32,
    /// Energy charged for planting, watering, and harvesting.
    pub action_cost: u32,
    /// Energy regained per turn on the launch pad.
    pub recharge_rate: u32,
    /// Launch pad position; defaults to the top-right corner.
    pub base: Option<CellCoord>,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            max_turns: Some(DEFAULT_MAX_TURNS),
            seedling_threshold: 2,
            maturity_threshold: 3,
            max_hydration: 3,
            water_source_capacity: 5,
            seed_spawn_rate: 1,
            battery_capacity: 80,
            idle_cost: 1,
            move_cost: 2,
            action_cost: 3,
            recharge_rate: 5,
            base: None,
        }
    }
}

impl FieldConfig {
    /// Default configuration for a `width` by `height` field.
    #[must_use]
    pub fn sized(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    /// Parses and validates a configuration from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self = parse(contents, "drone field")?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses, and validates a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_toml_str(&read(path.as_ref(), "drone field")?)
    }

    /// Checks dimensions, growth thresholds, and the launch pad position.
    pub fn validate(&self) -> Result<()> {
        validate_dimensions(self.width, self.height)?;
        ensure!(
            self.seedling_threshold >= 1 && self.maturity_threshold >= 1,
            "growth thresholds must be at least 1"
        );
        validate_cell("base", self.base, self.width, self.height)
    }

    pub(crate) fn base_or_default(&self) -> CellCoord {
        self.base
            .unwrap_or_else(|| CellCoord::new(self.width.saturating_sub(1), 0))
    }

    pub(crate) const fn growth(&self) -> GrowthRules {
        GrowthRules::Hydrated {
            seedling_threshold: self.seedling_threshold,
            maturity_threshold: self.maturity_threshold,
            max_hydration: self.max_hydration,
        }
    }

    pub(crate) const fn energy(&self) -> EnergyConfig {
        EnergyConfig {
            capacity: Quantity::Finite(self.battery_capacity),
            idle_cost: self.idle_cost,
            move_cost: self.move_cost,
            action_cost: self.action_cost,
            recharge_rate: self.recharge_rate,
        }
    }
}

/// Parameters of the planting challenge.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlantingConfig {
    /// Grid width in cells.
    pub width: u32,
    /// Grid height in cells.
    pub height: u32,
    /// Turn cap; `None` runs without limit.
    pub max_turns: Option<u64>,
    /// Turns a planted seed needs to sprout; clamped to at least one.
    pub seed_turns: u32,
    /// Turns a sprouted crop needs to mature; clamped to at least one.
    pub growing_turns: u32,
    /// Explicit tree positions; `None` generates the default pattern.
    pub obstacles: Option<Vec<CellCoord>>,
    /// Plants automatically on empty soil after every resolved action.
    pub auto_plant: bool,
}

impl Default for PlantingConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            max_turns: Some(DEFAULT_MAX_TURNS),
            seed_turns: 2,
            growing_turns: 3,
            obstacles: None,
            auto_plant: false,
        }
    }
}

impl PlantingConfig {
    /// Default configuration for a `width` by `height` field.
    #[must_use]
    pub fn sized(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    /// Parses and validates a configuration from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self = parse(contents, "planting")?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses, and validates a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_toml_str(&read(path.as_ref(), "planting")?)
    }

    /// Checks the field dimensions.
    pub fn validate(&self) -> Result<()> {
        validate_dimensions(self.width, self.height)
    }
}

/// Parameters of the navigation challenge.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NavigationConfig {
    /// Grid width in cells.
    pub width: u32,
    /// Grid height in cells.
    pub height: u32,
    /// Turn cap; `None` runs without limit.
    pub max_turns: Option<u64>,
    /// ASCII rows using `#`, `S`, `G`, `.` and space.
    pub layout: Option<Vec<String>>,
    /// Explicit obstacle positions; take precedence over the layout.
    pub obstacles: Option<Vec<CellCoord>>,
    /// Start and launch pad position; overrides the layout's `S`.
    pub start: Option<CellCoord>,
    /// Goal position; overrides the layout's `G`.
    pub goal: Option<CellCoord>,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            max_turns: Some(DEFAULT_MAX_TURNS),
            layout: None,
            obstacles: None,
            start: None,
            goal: None,
        }
    }
}

impl NavigationConfig {
    /// Default configuration for a `width` by `height` field.
    #[must_use]
    pub fn sized(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    /// Configuration whose dimensions are taken from `rows`.
    ///
    /// The width is the length of the first row; mismatched rows are reported
    /// when the field is built.
    #[must_use]
    pub fn from_layout<S: AsRef<str>>(rows: &[S]) -> Self {
        let height = u32::try_from(rows.len()).unwrap_or(u32::MAX);
        let width = rows
            .first()
            .map_or(0, |row| u32::try_from(row.as_ref().chars().count()).unwrap_or(u32::MAX));
        Self {
            width,
            height,
            layout: Some(rows.iter().map(|row| row.as_ref().to_owned()).collect()),
            ..Self::default()
        }
    }

    /// Parses and validates a configuration from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self = parse(contents, "navigation")?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses, and validates a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_toml_str(&read(path.as_ref(), "navigation")?)
    }

    /// Checks dimensions and the explicit start and goal positions.
    pub fn validate(&self) -> Result<()> {
        validate_dimensions(self.width, self.height)?;
        validate_cell("start", self.start, self.width, self.height)?;
        validate_cell("goal", self.goal, self.width, self.height)
    }
}

fn parse<T: DeserializeOwned>(contents: &str, scenario: &str) -> Result<T> {
    toml::from_str(contents).with_context(|| format!("failed to parse {scenario} config toml"))
}

fn read(path: &Path, scenario: &str) -> Result<String> {
    fs::read_to_string(path)
        .with_context(|| format!("failed to read {scenario} config at {}", path.display()))
}

fn validate_dimensions(width: u32, height: u32) -> Result<()> {
    ensure!(
        width > 0 && height > 0,
        "grid dimensions must be non-zero, got {width}x{height}"
    );
    Ok(())
}

fn validate_cell(label: &str, cell: Option<CellCoord>, width: u32, height: u32) -> Result<()> {
    if let Some(cell) = cell {
        ensure!(
            cell.column() < width && cell.row() < height,
            "{label} {cell} lies outside the {width}x{height} grid"
        );
    }
    Ok(())
}
