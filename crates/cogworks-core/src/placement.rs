//! The placement transaction: moving a dragged gear onto a target cell.
//!
//! A drag release resolves in a fixed decision order: out-of-bounds
//! rejection, plain placement into an empty cell, merge of two equal
//! Number/Multiplier gears into the next subtype, swap with any other
//! occupant, and finally the self-drop no-op. Failures are errors that
//! leave the grid and registry untouched; the caller restores the dragged
//! gear's visual position.

use crate::event::{Event, EventBus};
use crate::fixed::Ticks;
use crate::gear::GearRegistry;
use crate::grid::{GearGrid, GridPosition};
use crate::id::GearId;

// ---------------------------------------------------------------------------
// Outcomes and errors
// ---------------------------------------------------------------------------

/// How a successful placement resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementOutcome {
    /// The target cell was empty; the gear moved there.
    Placed,
    /// Two equal gears merged into one of the next subtype.
    Merged { upgraded: GearId },
    /// The dragged gear and the occupant exchanged cells.
    Swapped { displaced: GearId },
}

/// Rejected placements. All are recoverable: the board is unchanged and
/// the dragged gear returns to its origin.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PlacementError {
    #[error("target cell lies outside the grid")]
    OutOfBounds,
    #[error("merge chain is already at its subtype cap")]
    MergeAtCap,
    #[error("gear dropped onto its own cell")]
    SelfDrop,
    #[error("dragged gear is not registered")]
    UnknownGear,
}

// ---------------------------------------------------------------------------
// Transaction
// ---------------------------------------------------------------------------

/// Apply one drag-release transaction. On success the topology changed
/// and the caller must re-resolve connectivity; on error, state is
/// byte-for-byte unchanged.
pub(crate) fn try_place(
    grid: &mut GearGrid,
    registry: &mut GearRegistry,
    bus: &mut EventBus,
    dragged: GearId,
    target: GridPosition,
    tick: Ticks,
) -> Result<PlacementOutcome, PlacementError> {
    if !grid.is_inside(target) {
        return Err(PlacementError::OutOfBounds);
    }

    let dragged_gear = registry.get(dragged).ok_or(PlacementError::UnknownGear)?;
    let origin = dragged_gear.position;
    let gear_type = dragged_gear.gear_type();
    let subtype = dragged_gear.subtype;

    let Some(existing) = grid.get(target) else {
        // Empty cell: clear the previous cell, then place.
        grid.remove(origin);
        grid.place(dragged, target);
        if let Some(gear) = registry.get_mut(dragged) {
            gear.position = target;
        }
        bus.emit(Event::GearPlaced {
            gear: dragged,
            position: target,
            tick,
        });
        return Ok(PlacementOutcome::Placed);
    };

    if existing == dragged {
        // Dropped onto its own cell: a cancelled drag, not a mutation.
        return Err(PlacementError::SelfDrop);
    }

    let existing_gear = registry.get(existing).ok_or(PlacementError::UnknownGear)?;
    let mergeable = gear_type.merges()
        && existing_gear.gear_type() == gear_type
        && existing_gear.subtype == subtype;

    if mergeable {
        let next = subtype + 1;
        if next > gear_type.max_subtype() {
            return Err(PlacementError::MergeAtCap);
        }

        grid.remove(origin);
        grid.remove(target);
        registry.despawn(dragged);
        registry.despawn(existing);

        // next <= max_subtype, so the parameter table has an entry.
        let upgraded = registry
            .spawn(gear_type, next, target)
            .expect("upgraded subtype within table cap");
        grid.place(upgraded, target);

        bus.emit(Event::GearsMerged {
            upgraded,
            position: target,
            subtype: next,
            tick,
        });
        return Ok(PlacementOutcome::Merged { upgraded });
    }

    // Any other occupant: exchange cells.
    grid.remove(origin);
    grid.remove(target);
    grid.place(dragged, target);
    grid.place(existing, origin);
    if let Some(gear) = registry.get_mut(dragged) {
        gear.position = target;
    }
    if let Some(gear) = registry.get_mut(existing) {
        gear.position = origin;
    }

    bus.emit(Event::GearsSwapped {
        dragged,
        displaced: existing,
        tick,
    });
    Ok(PlacementOutcome::Swapped {
        displaced: existing,
    })
}

// ===========================================================================
// Tests
// ===========================================================================
