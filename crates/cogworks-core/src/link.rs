//! Connectivity resolver: recomputes which occupied cells form a valid
//! power path from a motor to a character.
//!
//! The rule is deliberately asymmetric. Reachability is computed twice:
//! once flooding outward from all motors without restriction, and once
//! flooding outward from all characters while refusing to step *into* a
//! motor cell. The active path is the intersection, plus any motor whose
//! 4-neighbor lies in the character flood. This stops one motor's chain
//! from borrowing connectivity through a second motor, while a motor
//! directly bordering a valid character chain still powers on.
//!
//! Recomputation is full and synchronous on every topology change; the
//! resolver holds no state of its own.

use crate::gear::{GearRegistry, GearType};
use crate::grid::{GearGrid, GridPosition};
use crate::id::GearId;
use std::collections::{BTreeMap, BTreeSet, VecDeque};

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Compute the active path for the current board. Pure; deterministic for
/// a given occupancy.
pub fn resolve(grid: &GearGrid, registry: &GearRegistry) -> BTreeSet<GridPosition> {
    let mut motors = Vec::new();
    let mut characters = Vec::new();

    for (pos, id) in grid.occupied() {
        let Some(gear) = registry.get(id) else {
            continue;
        };
        match gear.gear_type() {
            GearType::Motor => motors.push(pos),
            GearType::Character => characters.push(pos),
            _ => {}
        }
    }

    // Either side missing: nothing can be powered.
    if motors.is_empty() || characters.is_empty() {
        return BTreeSet::new();
    }

    let motor_reach = flood(grid, registry, &motors, false);
    let char_reach_avoiding_motors = flood(grid, registry, &characters, true);

    let mut active: BTreeSet<GridPosition> = motor_reach
        .intersection(&char_reach_avoiding_motors)
        .copied()
        .collect();

    // A motor adjacent to a chain that reaches a character without routing
    // through another motor powers on, even though the character flood
    // cannot step into it.
    for &mpos in &motors {
        if mpos
            .neighbors_4()
            .iter()
            .any(|n| char_reach_avoiding_motors.contains(n))
        {
            active.insert(mpos);
        }
    }

    active
}

/// Multi-source BFS over the 4-neighborhood, restricted to occupied cells.
/// With `avoid_motors`, the search never steps into a motor cell (motors
/// may still be adjacent to visited cells).
fn flood(
    grid: &GearGrid,
    registry: &GearRegistry,
    starts: &[GridPosition],
    avoid_motors: bool,
) -> BTreeSet<GridPosition> {
    let mut visited = BTreeSet::new();
    let mut queue = VecDeque::new();

    for &start in starts {
        if visited.insert(start) {
            queue.push_back(start);
        }
    }

    while let Some(current) = queue.pop_front() {
        for next in current.neighbors_4() {
            if !grid.is_inside(next) || visited.contains(&next) {
                continue;
            }
            let Some(id) = grid.get(next) else {
                continue;
            };
            let Some(gear) = registry.get(id) else {
                continue;
            };
            if avoid_motors && gear.gear_type() == GearType::Motor {
                continue;
            }
            visited.insert(next);
            queue.push_back(next);
        }
    }

    visited
}

/// Stamp every occupied gear's activation flag from the path.
pub fn apply_active_flags(
    grid: &GearGrid,
    registry: &mut GearRegistry,
    path: &BTreeSet<GridPosition>,
) {
    let occupied: Vec<_> = grid.occupied().collect();
    for (pos, id) in occupied {
        if let Some(gear) = registry.get_mut(id) {
            gear.active = path.contains(&pos);
        }
    }
}

// ---------------------------------------------------------------------------
// Chain query
// ---------------------------------------------------------------------------

/// Shortest occupied chain from the first motor (row-major scan) to the
/// given character cell, motor first. Empty when no motor exists or no
/// chain connects them.
pub fn chain_to_character(
    grid: &GearGrid,
    registry: &GearRegistry,
    target: GridPosition,
) -> Vec<GearId> {
    let Some(motor_pos) = grid.occupied().find_map(|(pos, id)| {
        registry
            .get(id)
            .filter(|g| g.gear_type() == GearType::Motor)
            .map(|_| pos)
    }) else {
        return Vec::new();
    };

    // BFS with parent links for path reconstruction.
    let mut prev: BTreeMap<GridPosition, Option<GridPosition>> = BTreeMap::new();
    let mut queue = VecDeque::new();
    prev.insert(motor_pos, None);
    queue.push_back(motor_pos);

    let mut found = motor_pos == target;
    while let Some(current) = queue.pop_front() {
        if found {
            break;
        }
        for next in current.neighbors_4() {
            if !grid.is_inside(next) || prev.contains_key(&next) || grid.get(next).is_none() {
                continue;
            }
            prev.insert(next, Some(current));
            if next == target {
                found = true;
                break;
            }
            queue.push_back(next);
        }
    }

    if !found {
        return Vec::new();
    }

    let mut chain = Vec::new();
    let mut node = Some(target);
    while let Some(pos) = node {
        if let Some(id) = grid.get(pos) {
            chain.push(id);
        }
        node = prev.get(&pos).copied().flatten();
    }
    chain.reverse();
    chain
}

// ===========================================================================
// Tests
// ===========================================================================
