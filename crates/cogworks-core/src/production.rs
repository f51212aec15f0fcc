//! Production accumulator: converts active rotations into spawn events.
//!
//! Each character gear caches a fill-per-rotation yield, recomputed on
//! every active-path publication:
//!
//! ```text
//! fill = (base + sum of Number bonuses on the path) * product of
//!        Multiplier factors on the path
//! ```
//!
//! clamped non-negative, skipping the character's own cell. Motors on the
//! path neither gate nor scale the yield. On each rotation tick the cached
//! yield accumulates; crossing the threshold fires one spawn event and
//! resets the counter to zero (excess is dropped, not carried over).

use crate::event::{Event, EventBus};
use crate::fixed::{Fixed64, Ticks};
use crate::gear::{GearKind, GearRegistry};
use crate::grid::{GearGrid, GridPosition};
use crate::id::GearId;
use std::collections::BTreeSet;

/// Recompute the cached fill-per-rotation of every character gear from the
/// freshly published path.
pub fn recalculate_fill(
    grid: &GearGrid,
    registry: &mut GearRegistry,
    path: &BTreeSet<GridPosition>,
) {
    let mut updates = Vec::new();

    for id in registry.characters() {
        let Some(gear) = registry.get(id) else {
            continue;
        };
        let GearKind::Character(state) = &gear.kind else {
            continue;
        };
        let base = state.base_fill;
        let self_pos = gear.position;

        let mut additive = Fixed64::ZERO;
        let mut factor = Fixed64::ONE;
        for &pos in path {
            if pos == self_pos {
                continue;
            }
            let Some(other) = grid.get(pos).and_then(|gid| registry.get(gid)) else {
                continue;
            };
            match &other.kind {
                GearKind::Number { bonus } => additive += *bonus,
                GearKind::Multiplier { factor: f } => factor *= *f,
                GearKind::Motor | GearKind::Character(_) => {}
            }
        }

        let fill = ((base + additive) * factor).max(Fixed64::ZERO);
        updates.push((id, fill));
    }

    for (id, fill) in updates {
        if let Some(gear) = registry.get_mut(id)
            && let GearKind::Character(state) = &mut gear.kind
        {
            state.fill_per_rotation = fill;
        }
    }
}

/// Advance one character by one rotation. No-op unless the session is
/// running, the gear is active, and its cached yield is positive. Returns
/// whether a spawn fired.
pub fn advance_rotation(
    registry: &mut GearRegistry,
    bus: &mut EventBus,
    id: GearId,
    running: bool,
    tick: Ticks,
) -> bool {
    let Some(gear) = registry.get_mut(id) else {
        return false;
    };
    let active = gear.active;
    let position = gear.position;
    let GearKind::Character(state) = &mut gear.kind else {
        return false;
    };

    if !running || !active || state.fill_per_rotation <= Fixed64::ZERO {
        return false;
    }

    state.accumulated += state.fill_per_rotation;
    if state.accumulated >= state.threshold {
        state.accumulated = Fixed64::ZERO;
        bus.emit(Event::CharacterSpawned {
            gear: id,
            position,
            tick,
        });
        return true;
    }
    false
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GridConfig;
    use crate::event::EventKind;
    use crate::fixed::f64_to_fixed64;
    use crate::gear::GearType;
    use crate::link;

    fn board() -> (GearGrid, GearRegistry, EventBus) {
        let grid = GearGrid::new(GridConfig::default()).unwrap();
        (grid, GearRegistry::new(), EventBus::new())
    }

    fn put(
        grid: &mut GearGrid,
        registry: &mut GearRegistry,
        gear_type: GearType,
        subtype: u8,
        x: i32,
        y: i32,
    ) -> GearId {
        let pos = GridPosition::new(x, y);
        let id = registry.spawn(gear_type, subtype, pos).unwrap();
        grid.place(id, pos);
        id
    }

    fn fill_of(registry: &GearRegistry, id: GearId) -> Fixed64 {
        match &registry.get(id).unwrap().kind {
            GearKind::Character(state) => state.fill_per_rotation,
            _ => panic!("not a character"),
        }
    }

    fn assert_close(actual: Fixed64, expected: f64) {
        let diff = (actual - f64_to_fixed64(expected)).abs();
        assert!(
            diff < f64_to_fixed64(1e-6),
            "expected ~{expected}, got {actual}"
        );
    }

    // -----------------------------------------------------------------------
    // Yield recomputation
    // -----------------------------------------------------------------------

    #[test]
    fn yield_combines_bonus_and_multiplier() {
        // Number subtype 0 (0.06) and Multiplier subtype 0 (x1.25) feeding
        // a base-0.2 character: (0.2 + 0.06) * 1.25 = 0.325.
        let (mut grid, mut registry, _) = board();
        put(&mut grid, &mut registry, GearType::Motor, 0, 0, 0);
        put(&mut grid, &mut registry, GearType::Number, 0, 1, 0);
        put(&mut grid, &mut registry, GearType::Multiplier, 0, 2, 0);
        let c = put(&mut grid, &mut registry, GearType::Character, 0, 3, 0);

        let path = link::resolve(&grid, &registry);
        recalculate_fill(&grid, &mut registry, &path);

        assert_close(fill_of(&registry, c), 0.325);
    }

    #[test]
    fn yield_without_modifiers_is_base() {
        let (mut grid, mut registry, _) = board();
        put(&mut grid, &mut registry, GearType::Motor, 0, 0, 0);
        let c = put(&mut grid, &mut registry, GearType::Character, 0, 1, 0);

        let path = link::resolve(&grid, &registry);
        recalculate_fill(&grid, &mut registry, &path);

        // Own cell skipped; motor contributes nothing.
        assert_close(fill_of(&registry, c), 0.2);
    }

    #[test]
    fn off_path_modifiers_do_not_count() {
        let (mut grid, mut registry, _) = board();
        put(&mut grid, &mut registry, GearType::Motor, 0, 0, 0);
        let c = put(&mut grid, &mut registry, GearType::Character, 0, 1, 0);
        // Disconnected multiplier island.
        put(&mut grid, &mut registry, GearType::Multiplier, 2, 4, 4);

        let path = link::resolve(&grid, &registry);
        recalculate_fill(&grid, &mut registry, &path);
        assert_close(fill_of(&registry, c), 0.2);
    }

    #[test]
    fn empty_path_leaves_base_yield() {
        // An empty path still recomputes: no modifiers found, so the yield
        // falls back to base. Activation gating happens in advance, not here.
        let (mut grid, mut registry, _) = board();
        let c = put(&mut grid, &mut registry, GearType::Character, 0, 1, 0);

        recalculate_fill(&grid, &mut registry, &BTreeSet::new());
        assert_close(fill_of(&registry, c), 0.2);
        assert!(!registry.get(c).unwrap().active);
    }

    #[test]
    fn negative_yield_clamped_to_zero() {
        let (mut grid, mut registry, _) = board();
        let c = put(&mut grid, &mut registry, GearType::Character, 0, 1, 0);
        if let GearKind::Character(state) = &mut registry.get_mut(c).unwrap().kind {
            state.base_fill = f64_to_fixed64(-0.5);
        }

        recalculate_fill(&grid, &mut registry, &BTreeSet::new());
        assert_eq!(fill_of(&registry, c), Fixed64::ZERO);
    }

    // -----------------------------------------------------------------------
    // Accumulation and spawning
    // -----------------------------------------------------------------------

    fn primed_character(fill: f64) -> (GearRegistry, EventBus, GearId) {
        let (mut grid, mut registry, bus) = board();
        let c = put(&mut grid, &mut registry, GearType::Character, 0, 1, 0);
        {
            let gear = registry.get_mut(c).unwrap();
            gear.active = true;
            if let GearKind::Character(state) = &mut gear.kind {
                state.fill_per_rotation = f64_to_fixed64(fill);
            }
        }
        (registry, bus, c)
    }

    #[test]
    fn accumulates_until_threshold_then_spawns_once() {
        let (mut registry, mut bus, c) = primed_character(0.325);

        for _ in 0..3 {
            assert!(!advance_rotation(&mut registry, &mut bus, c, true, 0));
        }
        // 4th rotation: 1.3 >= 1.0 -- spawn, counter reset, excess dropped.
        assert!(advance_rotation(&mut registry, &mut bus, c, true, 0));

        let events = bus.deliver();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind(), EventKind::CharacterSpawned);

        if let GearKind::Character(state) = &registry.get(c).unwrap().kind {
            assert_eq!(state.accumulated, Fixed64::ZERO);
        }
    }

    #[test]
    fn not_running_is_a_no_op() {
        let (mut registry, mut bus, c) = primed_character(2.0);
        assert!(!advance_rotation(&mut registry, &mut bus, c, false, 0));
        if let GearKind::Character(state) = &registry.get(c).unwrap().kind {
            assert_eq!(state.accumulated, Fixed64::ZERO);
        }
    }

    #[test]
    fn inactive_character_does_not_accumulate() {
        let (mut registry, mut bus, c) = primed_character(2.0);
        registry.get_mut(c).unwrap().active = false;
        assert!(!advance_rotation(&mut registry, &mut bus, c, true, 0));
    }

    #[test]
    fn zero_yield_does_not_accumulate() {
        let (mut registry, mut bus, c) = primed_character(0.0);
        assert!(!advance_rotation(&mut registry, &mut bus, c, true, 0));
    }

    #[test]
    fn non_character_gear_is_ignored() {
        let (mut grid, mut registry, mut bus) = board();
        let m = put(&mut grid, &mut registry, GearType::Motor, 0, 0, 0);
        assert!(!advance_rotation(&mut registry, &mut bus, m, true, 0));
    }
}
