//! Rotation propagator: walks the physically-meshed cluster reachable
//! from a trigger position and issues one rotation tick per gear.
//!
//! Adjacent meshed gears spin in opposite directions, like a real gear
//! train, so the traversal flips spin on every mesh edge. The walk is an
//! explicit work-stack DFS with a per-call visited set; the set bounds
//! the traversal even when the mesh graph contains cycles.
//!
//! Meshing is geometric, not grid adjacency: two gears mesh when the
//! distance between their cell centers approximately equals the sum of
//! their physical radii. Grid-adjacent gears with small radii do not
//! mesh, and the walk will not cross them.

use crate::event::{Event, EventBus};
use crate::fixed::{Fixed64, Ticks};
use crate::gear::GearRegistry;
use crate::grid::{GearGrid, GridPosition};
use crate::production;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// ---------------------------------------------------------------------------
// Spin
// ---------------------------------------------------------------------------

/// Spin direction of a rotation tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Spin {
    Clockwise,
    CounterClockwise,
}

impl Spin {
    /// The opposite spin, taken across every mesh edge.
    pub fn opposite(self) -> Spin {
        match self {
            Spin::Clockwise => Spin::CounterClockwise,
            Spin::CounterClockwise => Spin::Clockwise,
        }
    }
}

/// Default meshing tolerance in world units. Matches a cell-sized sprite
/// with slight rounding slack.
pub fn default_mesh_tolerance() -> Fixed64 {
    Fixed64::from_num(0.06)
}

// ---------------------------------------------------------------------------
// Meshing test
// ---------------------------------------------------------------------------

/// Whether the gears at two cells are physically meshed:
/// `|distance(centers) - (r_a + r_b)| <= tolerance`.
///
/// Compared in squared form to stay inside fixed-point arithmetic. False
/// when either cell is empty or out of bounds.
pub fn gears_meshed(
    grid: &GearGrid,
    registry: &GearRegistry,
    a: GridPosition,
    b: GridPosition,
    tolerance: Fixed64,
) -> bool {
    let (Some(ga), Some(gb)) = (
        grid.get(a).and_then(|id| registry.get(id)),
        grid.get(b).and_then(|id| registry.get(id)),
    ) else {
        return false;
    };
    let (Some((ax, ay)), Some((bx, by))) = (grid.cell_center(a), grid.cell_center(b)) else {
        return false;
    };

    let cell = grid.config().cell_size;
    let expected = ga.physical_radius(cell) + gb.physical_radius(cell);

    let dx = ax - bx;
    let dy = ay - by;
    let dist_sq = dx * dx + dy * dy;

    let lo = (expected - tolerance).max(Fixed64::ZERO);
    let hi = expected + tolerance;
    dist_sq >= lo * lo && dist_sq <= hi * hi
}

// ---------------------------------------------------------------------------
// Propagation
// ---------------------------------------------------------------------------

/// Rotate the meshed cluster reachable from `start`. The trigger gear
/// always spins clockwise; each meshed neighbor gets the opposite spin of
/// the gear that discovered it. Every visited gear receives exactly one
/// [`Event::RotationTicked`]; active characters additionally advance
/// their production by one rotation. No-op for an out-of-bounds or empty
/// start.
pub fn propagate(
    grid: &GearGrid,
    registry: &mut GearRegistry,
    bus: &mut EventBus,
    start: GridPosition,
    running: bool,
    tolerance: Fixed64,
    tick: Ticks,
) {
    if !grid.is_inside(start) {
        return;
    }

    let mut visited: BTreeSet<GridPosition> = BTreeSet::new();
    let mut stack = vec![(start, Spin::Clockwise)];

    while let Some((pos, spin)) = stack.pop() {
        if visited.contains(&pos) {
            continue;
        }
        let Some(id) = grid.get(pos) else {
            continue;
        };
        if registry.get(id).is_none() {
            continue;
        }
        visited.insert(pos);

        bus.emit(Event::RotationTicked {
            gear: id,
            spin,
            tick,
        });
        production::advance_rotation(registry, bus, id, running, tick);

        for next in pos.neighbors_4() {
            if !grid.is_inside(next) || visited.contains(&next) || grid.get(next).is_none() {
                continue;
            }
            if gears_meshed(grid, registry, pos, next, tolerance) {
                stack.push((next, spin.opposite()));
            }
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
