//! Gear entities, per-type parameter tables, and the gear registry.
//!
//! Each gear is one of four closed kinds:
//!
//! - **Motor** -- topological power source; no numeric parameter.
//! - **Character** -- consumer; accumulates fill per rotation and spawns at
//!   a threshold.
//! - **Number** -- passive additive bonus on the active path.
//! - **Multiplier** -- passive multiplicative factor on the active path.
//!
//! Parameters come from fixed per-type subtype tables, so a gear is fully
//! described by `(type, subtype)`. Number and Multiplier gears form merge
//! chains: two equal gears combine into `subtype + 1` up to the table cap.

use crate::fixed::Fixed64;
use crate::grid::GridPosition;
use crate::id::GearId;
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

// ---------------------------------------------------------------------------
// Gear type tags and parameter tables
// ---------------------------------------------------------------------------

/// Closed tag for the four gear families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GearType {
    Motor,
    Character,
    Number,
    Multiplier,
}

impl GearType {
    /// Whether two equal gears of this type combine into the next subtype.
    /// Motors and characters never merge.
    pub fn merges(self) -> bool {
        matches!(self, GearType::Number | GearType::Multiplier)
    }

    /// Highest valid subtype index for this type.
    pub fn max_subtype(self) -> u8 {
        match self {
            GearType::Motor => 0,
            GearType::Character => 1,
            GearType::Number => 3,
            GearType::Multiplier => 2,
        }
    }
}

/// Additive bonus contributed by a Number gear, by subtype.
pub fn number_bonus(subtype: u8) -> Option<Fixed64> {
    let v = match subtype {
        0 => 0.06,
        1 => 0.11,
        2 => 0.17,
        3 => 0.22,
        _ => return None,
    };
    Some(Fixed64::from_num(v))
}

/// Multiplicative factor contributed by a Multiplier gear, by subtype.
pub fn multiplier_factor(subtype: u8) -> Option<Fixed64> {
    let v = match subtype {
        0 => 1.25,
        1 => 1.5,
        2 => 2.0,
        _ => return None,
    };
    Some(Fixed64::from_num(v))
}

/// Base fill added per rotation for a Character gear, by subtype
/// (0 = Round, 1 = Square).
pub fn character_base_fill(subtype: u8) -> Option<Fixed64> {
    let v = match subtype {
        0 => 0.2,
        1 => 0.25,
        _ => return None,
    };
    Some(Fixed64::from_num(v))
}

/// Fill threshold at which a character spawns. Same for every subtype.
pub fn spawn_threshold() -> Fixed64 {
    Fixed64::ONE
}

// ---------------------------------------------------------------------------
// Gear kinds
// ---------------------------------------------------------------------------

/// Accumulation state for a Character gear.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionState {
    /// Base fill per rotation, before path bonuses.
    pub base_fill: Fixed64,
    /// Cached fill per rotation, recomputed on every active-path change.
    pub fill_per_rotation: Fixed64,
    /// Accumulated fill. Reset to zero when the threshold fires.
    pub accumulated: Fixed64,
    /// Spawn threshold.
    pub threshold: Fixed64,
}

impl ProductionState {
    pub fn new(base_fill: Fixed64) -> Self {
        Self {
            base_fill,
            fill_per_rotation: Fixed64::ZERO,
            accumulated: Fixed64::ZERO,
            threshold: spawn_threshold(),
        }
    }
}

/// A gear's kind with its per-type parameters. Matched exhaustively by the
/// connectivity resolver and the production accumulator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GearKind {
    Motor,
    Character(ProductionState),
    Number { bonus: Fixed64 },
    Multiplier { factor: Fixed64 },
}

impl GearKind {
    pub fn gear_type(&self) -> GearType {
        match self {
            GearKind::Motor => GearType::Motor,
            GearKind::Character(_) => GearType::Character,
            GearKind::Number { .. } => GearType::Number,
            GearKind::Multiplier { .. } => GearType::Multiplier,
        }
    }
}

// ---------------------------------------------------------------------------
// Gear entity
// ---------------------------------------------------------------------------

/// A live gear on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gear {
    pub kind: GearKind,
    pub subtype: u8,
    /// Grid cell this gear occupies. Kept in agreement with the grid's
    /// cell back-reference by the placement transaction.
    pub position: GridPosition,
    /// Whether this gear lies on the active motor-to-character path.
    pub active: bool,
    /// Explicit physical radius for the meshing test. `None` falls back to
    /// half the cell size (the visual-footprint approximation).
    pub radius: Option<Fixed64>,
}

impl Gear {
    pub fn gear_type(&self) -> GearType {
        self.kind.gear_type()
    }

    /// Radius used by the meshing test: the explicit physical size when
    /// present, else half the cell footprint.
    pub fn physical_radius(&self, cell_size: Fixed64) -> Fixed64 {
        self.radius
            .unwrap_or_else(|| cell_size / Fixed64::from_num(2))
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Errors from gear creation.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum GearError {
    #[error("unknown subtype {subtype} for {gear_type:?}")]
    UnknownSubtype { gear_type: GearType, subtype: u8 },
}

/// Owns every live gear. Gears are spawned on placement and despawned on
/// removal or when consumed by a merge; a `GearId` is never valid outside
/// that window.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GearRegistry {
    gears: SlotMap<GearId, Gear>,
}

impl GearRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a gear of the given type and subtype at a position. Fails if
    /// the subtype has no entry in the type's parameter table.
    pub fn spawn(
        &mut self,
        gear_type: GearType,
        subtype: u8,
        position: GridPosition,
    ) -> Result<GearId, GearError> {
        let unknown = GearError::UnknownSubtype { gear_type, subtype };
        let kind = match gear_type {
            GearType::Motor => {
                if subtype != 0 {
                    return Err(unknown);
                }
                GearKind::Motor
            }
            GearType::Character => {
                let base = character_base_fill(subtype).ok_or(unknown)?;
                GearKind::Character(ProductionState::new(base))
            }
            GearType::Number => {
                let bonus = number_bonus(subtype).ok_or(unknown)?;
                GearKind::Number { bonus }
            }
            GearType::Multiplier => {
                let factor = multiplier_factor(subtype).ok_or(unknown)?;
                GearKind::Multiplier { factor }
            }
        };
        Ok(self.gears.insert(Gear {
            kind,
            subtype,
            position,
            active: false,
            radius: None,
        }))
    }

    /// Destroy a gear, returning its final state.
    pub fn despawn(&mut self, id: GearId) -> Option<Gear> {
        self.gears.remove(id)
    }

    pub fn get(&self, id: GearId) -> Option<&Gear> {
        self.gears.get(id)
    }

    pub fn get_mut(&mut self, id: GearId) -> Option<&mut Gear> {
        self.gears.get_mut(id)
    }

    pub fn contains(&self, id: GearId) -> bool {
        self.gears.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (GearId, &Gear)> {
        self.gears.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (GearId, &mut Gear)> {
        self.gears.iter_mut()
    }

    /// IDs of all character gears, in registry order.
    pub fn characters(&self) -> Vec<GearId> {
        self.gears
            .iter()
            .filter(|(_, g)| matches!(g.kind, GearKind::Character(_)))
            .map(|(id, _)| id)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.gears.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gears.is_empty()
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed::f64_to_fixed64;

    fn origin() -> GridPosition {
        GridPosition::new(0, 0)
    }

    #[test]
    fn number_bonus_table() {
        assert_eq!(number_bonus(0), Some(f64_to_fixed64(0.06)));
        assert_eq!(number_bonus(3), Some(f64_to_fixed64(0.22)));
        assert_eq!(number_bonus(4), None);
    }

    #[test]
    fn multiplier_factor_table() {
        assert_eq!(multiplier_factor(0), Some(f64_to_fixed64(1.25)));
        assert_eq!(multiplier_factor(2), Some(f64_to_fixed64(2.0)));
        assert_eq!(multiplier_factor(3), None);
    }

    #[test]
    fn character_base_fill_table() {
        assert_eq!(character_base_fill(0), Some(f64_to_fixed64(0.2)));
        assert_eq!(character_base_fill(1), Some(f64_to_fixed64(0.25)));
        assert_eq!(character_base_fill(2), None);
    }

    #[test]
    fn merge_rules() {
        assert!(GearType::Number.merges());
        assert!(GearType::Multiplier.merges());
        assert!(!GearType::Motor.merges());
        assert!(!GearType::Character.merges());

        assert_eq!(GearType::Number.max_subtype(), 3);
        assert_eq!(GearType::Multiplier.max_subtype(), 2);
    }

    #[test]
    fn spawn_builds_kind_from_tables() {
        let mut reg = GearRegistry::new();
        let id = reg.spawn(GearType::Number, 1, origin()).unwrap();
        let gear = reg.get(id).unwrap();
        assert_eq!(
            gear.kind,
            GearKind::Number {
                bonus: f64_to_fixed64(0.11)
            }
        );
        assert_eq!(gear.subtype, 1);
        assert!(!gear.active);
    }

    #[test]
    fn spawn_unknown_subtype_rejected() {
        let mut reg = GearRegistry::new();
        assert_eq!(
            reg.spawn(GearType::Motor, 1, origin()),
            Err(GearError::UnknownSubtype {
                gear_type: GearType::Motor,
                subtype: 1
            })
        );
        assert_eq!(
            reg.spawn(GearType::Multiplier, 9, origin()),
            Err(GearError::UnknownSubtype {
                gear_type: GearType::Multiplier,
                subtype: 9
            })
        );
        assert!(reg.is_empty());
    }

    #[test]
    fn despawn_invalidates_id() {
        let mut reg = GearRegistry::new();
        let id = reg.spawn(GearType::Motor, 0, origin()).unwrap();
        assert!(reg.contains(id));
        let gear = reg.despawn(id).unwrap();
        assert_eq!(gear.gear_type(), GearType::Motor);
        assert!(!reg.contains(id));
        assert!(reg.despawn(id).is_none());
    }

    #[test]
    fn characters_filter() {
        let mut reg = GearRegistry::new();
        reg.spawn(GearType::Motor, 0, origin()).unwrap();
        let c = reg.spawn(GearType::Character, 0, origin()).unwrap();
        reg.spawn(GearType::Number, 0, origin()).unwrap();
        assert_eq!(reg.characters(), vec![c]);
    }

    #[test]
    fn physical_radius_fallback_is_half_cell() {
        let mut reg = GearRegistry::new();
        let id = reg.spawn(GearType::Motor, 0, origin()).unwrap();
        let cell = f64_to_fixed64(0.75);
        assert_eq!(
            reg.get(id).unwrap().physical_radius(cell),
            cell / f64_to_fixed64(2.0)
        );

        reg.get_mut(id).unwrap().radius = Some(f64_to_fixed64(0.5));
        assert_eq!(
            reg.get(id).unwrap().physical_radius(cell),
            f64_to_fixed64(0.5)
        );
    }
}
