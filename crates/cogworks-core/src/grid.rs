//! The grid store: a fixed-size rectangle of cells, each holding at most
//! one gear reference. The single source of truth for occupancy.
//!
//! All coordinate-taking operations fail soft on out-of-bounds input:
//! queries return empty/false and mutations no-op, never panic. Bounds are
//! surfaced as an explicit error one layer up, in the placement
//! transaction.

use crate::config::{ConfigError, GridConfig};
use crate::fixed::Fixed64;
use crate::id::GearId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// ---------------------------------------------------------------------------
// Positions
// ---------------------------------------------------------------------------

/// A position on the grid. Signed so off-board coordinates (from drag
/// release or neighbor offsets at the border) are representable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPosition {
    pub x: i32,
    pub y: i32,
}

/// 4-neighborhood offsets: up, down, left, right.
pub const NEIGHBOR_OFFSETS: [(i32, i32); 4] = [(0, 1), (0, -1), (-1, 0), (1, 0)];

impl GridPosition {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The four cardinal neighbors, in up/down/left/right order.
    pub fn neighbors_4(&self) -> [GridPosition; 4] {
        NEIGHBOR_OFFSETS.map(|(dx, dy)| GridPosition::new(self.x + dx, self.y + dy))
    }
}

// ---------------------------------------------------------------------------
// GearGrid
// ---------------------------------------------------------------------------

/// Fixed-size occupancy grid plus the last published active path.
///
/// The grid stores gear references only; gear state lives in the registry.
/// The placement transaction keeps the gear's stored position and the
/// cell back-reference in agreement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GearGrid {
    config: GridConfig,
    cells: Vec<Option<GearId>>,
    active_path: BTreeSet<GridPosition>,
}

impl GearGrid {
    pub fn new(config: GridConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            cells: vec![None; config.cell_count()],
            active_path: BTreeSet::new(),
        })
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn width(&self) -> u32 {
        self.config.width
    }

    pub fn height(&self) -> u32 {
        self.config.height
    }

    fn index(&self, pos: GridPosition) -> Option<usize> {
        if !self.is_inside(pos) {
            return None;
        }
        Some(pos.y as usize * self.config.width as usize + pos.x as usize)
    }

    // -- Queries --

    /// Whether a position lies within `[0, width) x [0, height)`.
    pub fn is_inside(&self, pos: GridPosition) -> bool {
        pos.x >= 0
            && (pos.x as u32) < self.config.width
            && pos.y >= 0
            && (pos.y as u32) < self.config.height
    }

    /// Whether a cell is inside the grid and unoccupied. Out-of-bounds
    /// positions are not empty (fail closed).
    pub fn is_empty(&self, pos: GridPosition) -> bool {
        match self.index(pos) {
            Some(i) => self.cells[i].is_none(),
            None => false,
        }
    }

    /// The gear occupying a cell, if any. Empty for out-of-bounds input.
    pub fn get(&self, pos: GridPosition) -> Option<GearId> {
        self.index(pos).and_then(|i| self.cells[i])
    }

    // -- Mutation --

    /// Unconditionally overwrite the cell reference. The caller is
    /// responsible for first clearing the gear's previous cell and for
    /// stamping the gear's stored position. No-op for out-of-bounds input.
    pub fn place(&mut self, gear: GearId, pos: GridPosition) {
        if let Some(i) = self.index(pos) {
            self.cells[i] = Some(gear);
        }
    }

    /// Clear a cell, returning its previous occupant. No-op if already
    /// empty or out of bounds.
    pub fn remove(&mut self, pos: GridPosition) -> Option<GearId> {
        self.index(pos).and_then(|i| self.cells[i].take())
    }

    // -- Iteration --

    /// All positions on the grid, row-major.
    pub fn positions(&self) -> impl Iterator<Item = GridPosition> + '_ {
        let w = self.config.width as i32;
        let h = self.config.height as i32;
        (0..h).flat_map(move |y| (0..w).map(move |x| GridPosition::new(x, y)))
    }

    /// All occupied cells with their gears, row-major.
    pub fn occupied(&self) -> impl Iterator<Item = (GridPosition, GearId)> + '_ {
        self.positions().filter_map(|pos| self.get(pos).map(|g| (pos, g)))
    }

    /// All unoccupied cells, row-major.
    pub fn empty_cells(&self) -> Vec<GridPosition> {
        self.positions().filter(|p| self.is_empty(*p)).collect()
    }

    // -- World-space conversion --

    /// World-space center of a cell. Empty for out-of-bounds input.
    pub fn cell_center(&self, pos: GridPosition) -> Option<(Fixed64, Fixed64)> {
        if !self.is_inside(pos) {
            return None;
        }
        let half = self.config.cell_size / Fixed64::from_num(2);
        let cx = Fixed64::from_num(pos.x) * self.config.cell_size + half;
        let cy = Fixed64::from_num(pos.y) * self.config.cell_size + half;
        Some((cx, cy))
    }

    /// The grid cell containing a world-space point. May lie outside the
    /// grid; callers bound-check with [`GearGrid::is_inside`].
    pub fn world_to_grid(&self, wx: Fixed64, wy: Fixed64) -> GridPosition {
        let x = (wx / self.config.cell_size).floor().to_num::<i32>();
        let y = (wy / self.config.cell_size).floor().to_num::<i32>();
        GridPosition::new(x, y)
    }

    // -- Active path --

    /// The last published active path.
    pub fn active_path(&self) -> &BTreeSet<GridPosition> {
        &self.active_path
    }

    /// Replace the published path atomically.
    pub fn set_active_path(&mut self, path: BTreeSet<GridPosition>) {
        self.active_path = path;
    }
}

// ===========================================================================
// Tests
// ===========================================================================
