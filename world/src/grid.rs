//! Dense tile storage indexed by cell coordinate.

use drone_field_core::{AgentId, CellCoord, ItemStore, Terrain, WorldError};

/// Mutable representation of a single grid cell.
#[derive(Clone, Debug, Default)]
pub struct Tile {
    terrain: Terrain,
    blocking: bool,
    items: ItemStore,
    occupants: Vec<AgentId>,
}

impl Tile {
    /// Terrain label assigned to the tile.
    #[must_use]
    pub const fn terrain(&self) -> Terrain {
        self.terrain
    }

    /// Replaces the tile's terrain label.
    pub fn set_terrain(&mut self, terrain: Terrain) {
        self.terrain = terrain;
    }

    /// Reports whether terrain blocks movement into the tile.
    #[must_use]
    pub const fn is_blocking(&self) -> bool {
        self.blocking
    }

    /// Marks the tile as blocking or open.
    pub fn set_blocking(&mut self, blocking: bool) {
        self.blocking = blocking;
    }

    /// Items lying on the tile.
    #[must_use]
    pub const fn items(&self) -> &ItemStore {
        &self.items
    }

    /// Mutable access to the items lying on the tile.
    pub fn items_mut(&mut self) -> &mut ItemStore {
        &mut self.items
    }

    /// Agents currently standing on the tile.
    #[must_use]
    pub fn occupants(&self) -> &[AgentId] {
        &self.occupants
    }

    /// Reports whether an agent may enter the tile.
    #[must_use]
    pub fn is_walkable(&self) -> bool {
        !self.blocking && self.occupants.is_empty()
    }

    fn admit(&mut self, agent: AgentId) {
        if !self.occupants.contains(&agent) {
            self.occupants.push(agent);
        }
    }

    fn release(&mut self, agent: AgentId) {
        self.occupants.retain(|occupant| *occupant != agent);
    }
}

/// Fixed-size rectangular arena of tiles stored in row-major order.
#[derive(Clone, Debug)]
pub struct Grid {
    width: u32,
    height: u32,
    tiles: Vec<Tile>,
}

impl Grid {
    /// Creates a grid of plain, open tiles.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        let capacity_u64 = u64::from(width) * u64::from(height);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Self {
            width,
            height,
            tiles: vec![Tile::default(); capacity],
        }
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Reports whether `cell` lies inside `[0, width) x [0, height)`.
    #[must_use]
    pub const fn in_bounds(&self, cell: CellCoord) -> bool {
        cell.column() < self.width && cell.row() < self.height
    }

    /// Tile stored at `cell`.
    pub fn get_tile(&self, cell: CellCoord) -> Result<&Tile, WorldError> {
        match self.index(cell) {
            Some(index) => Ok(&self.tiles[index]),
            None => Err(self.out_of_bounds(cell)),
        }
    }

    /// Mutable tile stored at `cell`.
    pub fn tile_mut(&mut self, cell: CellCoord) -> Result<&mut Tile, WorldError> {
        match self.index(cell) {
            Some(index) => Ok(&mut self.tiles[index]),
            None => Err(self.out_of_bounds(cell)),
        }
    }

    /// Reports whether an agent may enter `cell`. Out-of-bounds cells never are.
    #[must_use]
    pub fn is_walkable(&self, cell: CellCoord) -> bool {
        self.get_tile(cell).is_ok_and(Tile::is_walkable)
    }

    /// Iterator over every cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> {
        let width = self.width;
        (0..self.height).flat_map(move |row| (0..width).map(move |column| CellCoord::new(column, row)))
    }

    pub(crate) fn admit(&mut self, agent: AgentId, cell: CellCoord) {
        if let Some(index) = self.index(cell) {
            self.tiles[index].admit(agent);
        }
    }

    pub(crate) fn release(&mut self, agent: AgentId, cell: CellCoord) {
        if let Some(index) = self.index(cell) {
            self.tiles[index].release(agent);
        }
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if !self.in_bounds(cell) {
            return None;
        }
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let width = usize::try_from(self.width).ok()?;
        Some(row * width + column)
    }

    fn out_of_bounds(&self, cell: CellCoord) -> WorldError {
        WorldError::OutOfBounds {
            cell,
            width: self.width,
            height: self.height,
        }
    }
}
