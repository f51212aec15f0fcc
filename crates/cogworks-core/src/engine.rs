//! The headless board engine: owns the grid, the registry, and the event
//! bus, and sequences every operation so the published state is always
//! consistent.
//!
//! # Design
//!
//! Every successful topology mutation (spawn, placement, removal) runs the
//! same epilogue: resolve connectivity, stamp activation flags, recompute
//! character yields, publish the path, bump the tick. Failed operations
//! mutate nothing and emit nothing. Callers observe the engine through
//! [`GearEngine::drain_events`] and the read accessors; there is no other
//! channel.

use crate::config::{ConfigError, GridConfig};
use crate::event::{Event, EventBus};
use crate::fixed::{Fixed64, Ticks};
use crate::gear::{Gear, GearError, GearRegistry, GearType};
use crate::grid::{GearGrid, GridPosition};
use crate::id::GearId;
use crate::link;
use crate::placement::{self, PlacementError, PlacementOutcome};
use crate::production;
use crate::rng::SimRng;
use crate::rotate;
use std::collections::BTreeSet;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Rejected direct spawns.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SpawnError {
    #[error(transparent)]
    Gear(#[from] GearError),
    #[error("spawn position lies outside the grid")]
    OutOfBounds,
    #[error("spawn position is already occupied")]
    Occupied,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Owns one board and sequences all operations against it.
#[derive(Debug)]
pub struct GearEngine {
    grid: GearGrid,
    registry: GearRegistry,
    event_bus: EventBus,
    rng: SimRng,
    running: bool,
    tick: Ticks,
    mesh_tolerance: Fixed64,
}

impl GearEngine {
    /// Build an engine with a fixed default seed. Prefer
    /// [`GearEngine::with_seed`] when reproducibility across runs matters.
    pub fn new(config: GridConfig) -> Result<Self, ConfigError> {
        Self::with_seed(config, 0)
    }

    pub fn with_seed(config: GridConfig, seed: u64) -> Result<Self, ConfigError> {
        Ok(Self {
            grid: GearGrid::new(config)?,
            registry: GearRegistry::new(),
            event_bus: EventBus::new(),
            rng: SimRng::new(seed),
            running: false,
            tick: 0,
            mesh_tolerance: rotate::default_mesh_tolerance(),
        })
    }

    // -----------------------------------------------------------------------
    // Session control
    // -----------------------------------------------------------------------

    /// Start the session. Rotation ticks before this point spin gears but
    /// produce nothing.
    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Current tick counter. Bumped once per successful mutation or
    /// rotation trigger.
    pub fn tick(&self) -> Ticks {
        self.tick
    }

    pub fn set_mesh_tolerance(&mut self, tolerance: Fixed64) {
        self.mesh_tolerance = tolerance;
    }

    // -----------------------------------------------------------------------
    // Topology mutations
    // -----------------------------------------------------------------------

    /// Spawn a gear of the given type and subtype at an explicit cell.
    pub fn add_gear(
        &mut self,
        gear_type: GearType,
        subtype: u8,
        position: GridPosition,
    ) -> Result<GearId, SpawnError> {
        if !self.grid.is_inside(position) {
            return Err(SpawnError::OutOfBounds);
        }
        if !self.grid.is_empty(position) {
            return Err(SpawnError::Occupied);
        }

        let id = self.registry.spawn(gear_type, subtype, position)?;
        self.grid.place(id, position);
        self.event_bus.emit(Event::GearPlaced {
            gear: id,
            position,
            tick: self.tick,
        });
        self.resolve_and_publish();
        self.tick += 1;
        Ok(id)
    }

    /// Spawn a motor at a random empty cell. `None` on a full board.
    pub fn seed_motor(&mut self) -> Option<GearId> {
        let empty = self.grid.empty_cells();
        if empty.is_empty() {
            return None;
        }
        let position = empty[self.rng.next_index(empty.len())];
        // The cell came from empty_cells, so the spawn cannot fail.
        self.add_gear(GearType::Motor, 0, position).ok()
    }

    /// Resolve one drag release. On success the board re-resolves; on
    /// error nothing changed and no events fire.
    pub fn try_place(
        &mut self,
        dragged: GearId,
        target: GridPosition,
    ) -> Result<PlacementOutcome, PlacementError> {
        let outcome = placement::try_place(
            &mut self.grid,
            &mut self.registry,
            &mut self.event_bus,
            dragged,
            target,
            self.tick,
        )?;
        self.resolve_and_publish();
        self.tick += 1;
        Ok(outcome)
    }

    /// Remove the gear at a cell. `None` when the cell is empty or out of
    /// bounds; the board is untouched in that case.
    pub fn remove_gear(&mut self, position: GridPosition) -> Option<GearId> {
        let id = self.grid.remove(position)?;
        self.registry.despawn(id);
        self.event_bus.emit(Event::GearRemoved {
            gear: id,
            position,
            tick: self.tick,
        });
        self.resolve_and_publish();
        self.tick += 1;
        Some(id)
    }

    // -----------------------------------------------------------------------
    // Rotation
    // -----------------------------------------------------------------------

    /// Trigger one rotation wave from a cell. Every gear in the meshed
    /// cluster ticks once; active characters advance their production.
    pub fn propagate(&mut self, start: GridPosition) {
        rotate::propagate(
            &self.grid,
            &mut self.registry,
            &mut self.event_bus,
            start,
            self.running,
            self.mesh_tolerance,
            self.tick,
        );
        self.tick += 1;
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn grid(&self) -> &GearGrid {
        &self.grid
    }

    pub fn gear(&self, id: GearId) -> Option<&Gear> {
        self.registry.get(id)
    }

    pub fn gear_mut(&mut self, id: GearId) -> Option<&mut Gear> {
        self.registry.get_mut(id)
    }

    pub fn registry(&self) -> &GearRegistry {
        &self.registry
    }

    pub fn event_bus_mut(&mut self) -> &mut EventBus {
        &mut self.event_bus
    }

    /// The currently published active path.
    pub fn active_path(&self) -> &BTreeSet<GridPosition> {
        self.grid.active_path()
    }

    /// Shortest occupied chain from the first motor to the character at
    /// `target`, motor first.
    pub fn chain_to_character(&self, target: GridPosition) -> Vec<GearId> {
        link::chain_to_character(&self.grid, &self.registry, target)
    }

    /// Drain and deliver all buffered events in emission order.
    pub fn drain_events(&mut self) -> Vec<Event> {
        self.event_bus.deliver()
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    /// The shared epilogue of every successful topology mutation.
    fn resolve_and_publish(&mut self) {
        let path = link::resolve(&self.grid, &self.registry);
        link::apply_active_flags(&self.grid, &mut self.registry, &path);
        production::recalculate_fill(&self.grid, &mut self.registry, &path);
        self.grid.set_active_path(path.clone());
        self.event_bus.emit(Event::ActivePathChanged {
            path,
            tick: self.tick,
        });
    }
}

// ===========================================================================
// Tests
// ===========================================================================
