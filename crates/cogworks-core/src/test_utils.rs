//! Helpers shared by unit, property, and integration tests.

use crate::config::GridConfig;
use crate::engine::GearEngine;
use crate::fixed::{Fixed64, f64_to_fixed64};
use crate::gear::GearType;
use crate::grid::GridPosition;
use crate::id::GearId;

/// Shorthand for a fixed-point literal.
pub fn fixed(v: f64) -> Fixed64 {
    f64_to_fixed64(v)
}

/// A default 6x6 engine with a stable seed.
pub fn test_engine() -> GearEngine {
    GearEngine::with_seed(GridConfig::default(), 0xC06_F00D)
        .unwrap_or_else(|e| panic!("default config rejected: {e}"))
}

/// Spawn a gear through the engine, panicking on rejection.
pub fn put(engine: &mut GearEngine, gear_type: GearType, subtype: u8, x: i32, y: i32) -> GearId {
    engine
        .add_gear(gear_type, subtype, GridPosition::new(x, y))
        .unwrap_or_else(|e| panic!("spawn at ({x}, {y}) rejected: {e}"))
}

/// Check the occupancy/back-reference invariant: every occupied cell maps
/// to a live gear whose recorded position is that cell, and every live
/// gear sits in exactly one cell.
pub fn assert_board_consistent(engine: &GearEngine) {
    let mut cells = 0usize;
    for (pos, id) in engine.grid().occupied() {
        let gear = engine
            .gear(id)
            .unwrap_or_else(|| panic!("cell {pos:?} references a despawned gear"));
        assert_eq!(
            gear.position, pos,
            "gear at {pos:?} records position {:?}",
            gear.position
        );
        cells += 1;
    }
    assert_eq!(
        cells,
        engine.registry().len(),
        "occupied cell count and registry size disagree"
    );
}
