//! Navigation challenge: reach the goal tile through a field of trees.

use std::collections::BTreeSet;

use drone_field_core::{
    Action, AgentId, CellCoord, GoalRecord, LayoutError, Quantity, Summary, Terrain,
    TileMetadata, VariantSummary, WorldError,
};
use drone_field_system_energy::EnergyConfig;
use drone_field_world::{Rules, World, WorldState};
use tracing::info;

use crate::{
    config::{FieldConfig, NavigationConfig},
    farm::{FarmCore, FarmParameters},
};

const OBSTACLE: char = '#';
const START: char = 'S';
const GOAL: char = 'G';
const OPEN: char = '.';

const NAVIGATION_ENERGY: EnergyConfig = EnergyConfig {
    capacity: Quantity::Finite(60),
    idle_cost: 0,
    move_cost: 1,
    action_cost: 2,
    recharge_rate: 6,
};

/// Obstacles and markers read from an ASCII layout.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParsedLayout {
    /// Cells marked `#`.
    pub obstacles: BTreeSet<CellCoord>,
    /// Cell marked `S`; the last one wins when repeated.
    pub start: Option<CellCoord>,
    /// Cell marked `G`; the last one wins when repeated.
    pub goal: Option<CellCoord>,
}

/// Parses `rows` against the expected grid dimensions.
///
/// `#` marks an obstacle, `S` the start, `G` the goal, and `.` or a space an
/// open cell. Any other character is rejected.
pub fn parse_layout<S: AsRef<str>>(
    rows: &[S],
    width: u32,
    height: u32,
) -> Result<ParsedLayout, LayoutError> {
    if rows.len() != height as usize {
        return Err(LayoutError::RowCount {
            expected: height,
            actual: rows.len(),
        });
    }

    let mut layout = ParsedLayout::default();
    for (row_index, (row, y)) in rows.iter().zip(0u32..).enumerate() {
        let row = row.as_ref();
        let actual = row.chars().count();
        if actual != width as usize {
            return Err(LayoutError::RowWidth {
                row: row_index,
                expected: width,
                actual,
            });
        }
        for (character, x) in row.chars().zip(0u32..) {
            let cell = CellCoord::new(x, y);
            match character {
                OBSTACLE => {
                    let _ = layout.obstacles.insert(cell);
                }
                START => layout.start = Some(cell),
                GOAL => layout.goal = Some(cell),
                OPEN | ' ' => {}
                _ => return Err(LayoutError::UnsupportedCharacter { character, cell }),
            }
        }
    }
    Ok(layout)
}

/// Deterministic obstacle pattern with deliberate gaps.
///
/// A broken wall runs down the middle column on odd rows, a dotted line crosses
/// the middle row, and the cell just above the bottom row of the middle column
/// stays open. Fields narrower or shorter than four cells stay clear.
#[must_use]
pub fn default_obstacle_field(width: u32, height: u32) -> BTreeSet<CellCoord> {
    let mut obstacles = BTreeSet::new();
    if width < 4 || height < 4 {
        return obstacles;
    }

    let mid_column = width / 2;
    for row in (1..height - 1).filter(|row| row % 2 == 1) {
        let _ = obstacles.insert(CellCoord::new(mid_column, row));
    }
    for column in (1..width - 1).step_by(3) {
        let _ = obstacles.insert(CellCoord::new(column, height / 2));
    }
    let _ = obstacles.remove(&CellCoord::new(mid_column, height - 2));
    obstacles
}

/// Farm field with trees, a start pad, and a goal tile.
#[derive(Clone, Debug)]
pub struct NavigationRules {
    core: FarmCore,
    width: u32,
    height: u32,
    start: CellCoord,
    goal: CellCoord,
    obstacles: BTreeSet<CellCoord>,
    goal_record: Option<GoalRecord>,
}

impl NavigationRules {
    /// Farm machinery backing the scenario.
    #[must_use]
    pub const fn core(&self) -> &FarmCore {
        &self.core
    }

    /// Start cell, which doubles as the launch pad.
    #[must_use]
    pub const fn start(&self) -> CellCoord {
        self.start
    }

    /// Goal cell.
    #[must_use]
    pub const fn goal(&self) -> CellCoord {
        self.goal
    }

    /// Obstacle positions in coordinate order.
    #[must_use]
    pub fn obstacles(&self) -> Vec<CellCoord> {
        self.obstacles.iter().copied().collect()
    }

    /// First arrival at the goal, if any agent has reached it.
    #[must_use]
    pub const fn goal_record(&self) -> Option<GoalRecord> {
        self.goal_record
    }

    /// Renders the field back to ASCII rows.
    ///
    /// Open cells are written as `.`.
    #[must_use]
    pub fn layout_rows(&self) -> Vec<String> {
        (0..self.height)
            .map(|row| {
                (0..self.width)
                    .map(|column| {
                        let cell = CellCoord::new(column, row);
                        if cell == self.start {
                            START
                        } else if cell == self.goal {
                            GOAL
                        } else if self.obstacles.contains(&cell) {
                            OBSTACLE
                        } else {
                            OPEN
                        }
                    })
                    .collect()
            })
            .collect()
    }

    fn core_mut(&mut self) -> &mut FarmCore {
        &mut self.core
    }

    /// Clears the farm layout and lays out start, trees, and goal.
    fn prepare(
        &mut self,
        state: &mut WorldState,
        requested: BTreeSet<CellCoord>,
    ) -> Result<(), WorldError> {
        self.core.clear_resources(state);

        for cell in state.grid().cells().collect::<Vec<_>>() {
            let tile = state.grid_mut().tile_mut(cell)?;
            tile.set_blocking(false);
            tile.set_terrain(Terrain::Plain);
            self.core.set_farmable(cell, true);
        }

        state
            .grid_mut()
            .tile_mut(self.start)?
            .set_terrain(Terrain::LaunchPad);
        self.core.set_farmable(self.start, false);

        for cell in requested {
            if cell == self.start || cell == self.goal {
                continue;
            }
            if self.core.place_obstacle(state, cell) {
                let _ = self.obstacles.insert(cell);
            }
        }

        let goal = state.grid_mut().tile_mut(self.goal)?;
        goal.set_terrain(Terrain::Goal);
        goal.set_blocking(false);
        self.core.set_farmable(self.goal, true);
        Ok(())
    }
}

impl Rules for NavigationRules {
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
        if self.goal_record.is_some() {
            return;
        }
        if let Some(agent) = state.agents().find(|agent| agent.position() == self.goal) {
            let record = GoalRecord {
                turn: state.turn() + 1,
                agent: agent.id(),
            };
            info!(agent = %record.agent, turn = record.turn, "goal reached");
            self.goal_record = Some(record);
        }
    }

    fn tile_metadata(&self, _state: &WorldState, cell: CellCoord) -> TileMetadata {
        TileMetadata {
            obstacle: self.obstacles.contains(&cell),
            goal: cell == self.goal,
            start: cell == self.start,
            ..self.core.tile_metadata(cell)
        }
    }

    fn battery_level(&self, agent: AgentId) -> Quantity {
        self.core.battery_level(agent)
    }

    fn summary(&self, state: &WorldState) -> Summary {
        self.core.summary(
            state.turn(),
            VariantSummary::Navigation {
                goal: self.goal_record,
            },
        )
    }
}

/// Builds a navigation challenge from `config`.
///
/// Explicit obstacles take precedence over the layout's; the default field is
/// generated only when neither is supplied. Explicit start and goal positions
/// override the layout markers.
pub fn build(config: &NavigationConfig) -> Result<World<NavigationRules>, WorldError> {
    let (width, height) = (config.width, config.height);
    let layout = config
        .layout
        .as_deref()
        .map(|rows| parse_layout(rows, width, height))
        .transpose()?;

    let start = config
        .start
        .or_else(|| layout.as_ref().and_then(|layout| layout.start))
        .unwrap_or_else(|| CellCoord::new(0, height.saturating_sub(1)));
    let goal = config
        .goal
        .or_else(|| layout.as_ref().and_then(|layout| layout.goal))
        .unwrap_or_else(|| CellCoord::new(width.saturating_sub(1), 0));
    let requested = match (&config.obstacles, layout) {
        (Some(cells), _) => cells.iter().copied().collect(),
        (None, Some(layout)) => layout.obstacles,
        (None, None) => default_obstacle_field(width, height),
    };

    let mut state = WorldState::new(width, height, config.max_turns);
    let _ = state.grid().get_tile(goal)?;
    let farm = FieldConfig::sized(width, height);
    let parameters = FarmParameters {
        energy: NAVIGATION_ENERGY,
        base: start,
        water_source_capacity: 0,
        seed_spawn_rate: 0,
        ..FarmParameters::from(&farm)
    };
    let core = FarmCore::install(&mut state, parameters)?;

    let mut rules = NavigationRules {
        core,
        width,
        height,
        start,
        goal,
        obstacles: BTreeSet::new(),
        goal_record: None,
    };
    rules.prepare(&mut state, requested)?;
    Ok(World::from_parts(state, rules))
}

#[cfg(test)]
mod tests {
    use super::*;
    use drone_field_core::{Controller, Direction, ItemStore, Observation, TerrainClass};
    use drone_field_world::query;

    struct Scripted {
        moves: Vec<Direction>,
    }

    impl Controller for Scripted {
        fn name(&self) -> &str {
            "scripted"
        }

        fn decide(&mut self, _observation: &Observation) -> Option<Action> {
            self.moves.pop().map(Action::step)
        }
    }

    fn walker(moves: &[Direction]) -> Scripted {
        Scripted {
            moves: moves.iter().rev().copied().collect(),
        }
    }

    #[test]
    fn layout_round_trips_with_spaces_rendered_as_dots() {
        let rows = ["S.#.", "# . ", "...G"];
        let world = build(&NavigationConfig::from_layout(&rows)).unwrap();
        let rules = world.rules();

        assert_eq!(rules.start(), CellCoord::new(0, 0));
        assert_eq!(rules.goal(), CellCoord::new(3, 2));
        assert_eq!(
            rules.obstacles(),
            [CellCoord::new(0, 1), CellCoord::new(2, 0)]
        );
        assert_eq!(rules.layout_rows(), ["S.#.", "#...", "...G"]);
    }

    #[test]
    fn layout_with_unsupported_character_is_rejected() {
        let config = NavigationConfig::from_layout(&["S.x", "..G"]);
        assert_eq!(
            build(&config).unwrap_err(),
            WorldError::InvalidLayout(LayoutError::UnsupportedCharacter {
                character: 'x',
                cell: CellCoord::new(2, 0),
            })
        );
    }

    #[test]
    fn layout_dimensions_must_match_the_grid() {
        assert_eq!(
            parse_layout(&["S..", "..G"], 3, 3),
            Err(LayoutError::RowCount {
                expected: 3,
                actual: 2
            })
        );
        assert_eq!(
            parse_layout(&["S..", ".G"], 3, 2),
            Err(LayoutError::RowWidth {
                row: 1,
                expected: 3,
                actual: 2
            })
        );
    }

    #[test]
    fn default_field_leaves_a_gap_above_the_bottom_row() {
        let obstacles: Vec<_> = default_obstacle_field(8, 6).into_iter().collect();
        assert_eq!(
            obstacles,
            [
                CellCoord::new(1, 3),
                CellCoord::new(4, 1),
                CellCoord::new(4, 3),
            ]
        );
        assert!(default_obstacle_field(3, 3).is_empty());
    }

    #[test]
    fn explicit_obstacles_override_the_layout_and_skip_markers() {
        let config = NavigationConfig {
            obstacles: Some(vec![
                CellCoord::new(1, 1),
                CellCoord::new(0, 0),
                CellCoord::new(2, 1),
            ]),
            ..NavigationConfig::from_layout(&["S#.", "..G"])
        };
        let world = build(&config).unwrap();

        assert_eq!(world.rules().obstacles(), [CellCoord::new(1, 1)]);
        assert_eq!(
            query::terrain_class(&world, CellCoord::new(1, 0)),
            Ok(TerrainClass::Empty)
        );
        assert_eq!(
            query::terrain_class(&world, CellCoord::new(2, 1)),
            Ok(TerrainClass::Goal)
        );
        assert_eq!(
            query::terrain_class(&world, CellCoord::new(0, 0)),
            Ok(TerrainClass::Base)
        );
    }

    #[test]
    fn resources_are_cleared_from_the_field() {
        let world = build(&NavigationConfig::sized(4, 4)).unwrap();
        let core = world.rules().core();

        assert!(core.water_sources().is_empty());
        assert!(core.seed_supplies().is_empty());
        assert!(world
            .state()
            .grid()
            .cells()
            .all(|cell| world.state().grid().get_tile(cell).unwrap().items().is_empty()));
    }

    #[test]
    fn first_arrival_is_recorded_permanently() {
        let mut world = build(&NavigationConfig::from_layout(&["S.G", "..."])).unwrap();
        let first = world
            .register_agent(
                walker(&[Direction::East, Direction::East, Direction::West]),
                CellCoord::new(0, 0),
                ItemStore::new(),
            )
            .unwrap();
        let second = world
            .register_agent(
                walker(&[Direction::East, Direction::East, Direction::North]),
                CellCoord::new(0, 1),
                ItemStore::new(),
            )
            .unwrap();

        world.step();
        assert!(!query::summary(&world).goal_reached());
        world.step();
        let expected = GoalRecord {
            turn: 2,
            agent: first,
        };
        assert_eq!(world.rules().goal_record(), Some(expected));

        world.step();
        assert_eq!(
            query::agent_position(&world, second),
            Some(CellCoord::new(2, 0))
        );
        assert_eq!(
            query::summary(&world).variant,
            VariantSummary::Navigation {
                goal: Some(expected)
            }
        );
    }

    #[test]
    fn batteries_follow_navigation_costs() {
        let mut world = build(&NavigationConfig::sized(4, 4)).unwrap();
        let id = world
            .register_agent(walker(&[Direction::East]), CellCoord::new(0, 3), ItemStore::new())
            .unwrap();

        world.step();
        assert_eq!(query::battery_level(&world, id), Quantity::Finite(59));
        world.step();
        assert_eq!(query::battery_level(&world, id), Quantity::Finite(59));
    }
}
