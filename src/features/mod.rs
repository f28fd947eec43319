//! Property tables, one module per feature.
//!
//! Every applier follows the same contract:
//!
//! * **Arguments** - the first entity id, the number of entities, the
//!   property id, and a [`ByteReader`] positioned at the first value.
//! * **Cursor sync** - a recognised property consumes exactly one value per
//!   entity, whether or not the property is implemented, so the next
//!   property in the record decodes correctly.
//! * **Outcome** - [`PropertyOutcome::Unknown`] means the width of the
//!   property is not known; the caller stops decoding the record.
//!
//! ## Features
//!
//! | Id   | Module        | Entities |
//! |------|---------------|----------|
//! | 0x00 | [`vehicles`]  | Trains |
//! | 0x01 | [`vehicles`]  | Road vehicles |
//! | 0x02 | [`vehicles`]  | Ships |
//! | 0x03 | [`vehicles`]  | Aircraft |
//! | 0x04 | [`station`]   | Stations (per file) |
//! | 0x06 | [`bridge`]    | Bridges |
//! | 0x08 | [`globals`]   | Prices, currencies, snow line, translation tables |
//! | 0x0C | [`sound`]     | Sound effects |

pub mod bridge;
pub mod globals;
pub mod sound;
pub mod station;
pub mod vehicles;

use crate::Result;
use crate::cursor::ByteReader;

/// Entity kind addressed by a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GrfFeature {
    Trains,
    RoadVehicles,
    Ships,
    Aircraft,
    Stations,
    Canals,
    Bridges,
    Houses,
    GlobalVars,
    IndustryTiles,
    Industries,
    Cargoes,
    Sounds,
}

impl GrfFeature {
    pub fn from_u8(id: u8) -> Option<Self> {
        use GrfFeature::*;
        Some(match id {
            0x00 => Trains,
            0x01 => RoadVehicles,
            0x02 => Ships,
            0x03 => Aircraft,
            0x04 => Stations,
            0x05 => Canals,
            0x06 => Bridges,
            0x07 => Houses,
            0x08 => GlobalVars,
            0x09 => IndustryTiles,
            0x0A => Industries,
            0x0B => Cargoes,
            0x0C => Sounds,
            _ => return None,
        })
    }

    /// Vehicle kind for the four vehicle features.
    pub fn vehicle_type(self) -> Option<vehicles::VehicleType> {
        match self {
            GrfFeature::Trains => Some(vehicles::VehicleType::Rail),
            GrfFeature::RoadVehicles => Some(vehicles::VehicleType::Road),
            GrfFeature::Ships => Some(vehicles::VehicleType::Ship),
            GrfFeature::Aircraft => Some(vehicles::VehicleType::Aircraft),
            _ => None,
        }
    }

    /// Features whose graphics are chosen through sprite groups.
    pub fn has_sprite_groups(self) -> bool {
        matches!(
            self,
            GrfFeature::Trains
                | GrfFeature::RoadVehicles
                | GrfFeature::Ships
                | GrfFeature::Aircraft
                | GrfFeature::Stations
        )
    }
}

/// Cargo slot a group is mapped to by a mapping record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CargoSlot {
    Cargo(u8),
    /// Build and purchase lists (cargo id 0xFF).
    Purchase,
    /// Fallback for every other cargo.
    Default,
}

impl CargoSlot {
    pub fn from_cargo(cargo: u8) -> Self {
        match cargo {
            0xFF => CargoSlot::Purchase,
            c => CargoSlot::Cargo(c),
        }
    }
}

/// Result of applying one property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyOutcome {
    Applied,
    /// Known property, consumed but not stored.
    Ignored,
    /// Width unknown; nothing consumed.
    Unknown,
}

/// Operand width of a property value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    Byte,
    Word,
    Dword,
    Fixed(usize),
}

/// Consume one `width` value for each of `count` entities.
pub(crate) fn skip_each(buf: &mut ByteReader<'_>, count: usize, width: Width) -> Result<PropertyOutcome> {
    for _ in 0..count {
        match width {
            Width::Byte => buf.skip(1)?,
            Width::Word => buf.skip(2)?,
            Width::Dword => buf.skip(4)?,
            Width::Fixed(n) => buf.skip(n)?,
        }
    }
    Ok(PropertyOutcome::Ignored)
}

/// Read one `width` value for each of `count` entities and hand it to `f`
/// together with the entity offset.
pub(crate) fn apply_each(
    buf: &mut ByteReader<'_>,
    count: usize,
    width: Width,
    mut f: impl FnMut(usize, u32),
) -> Result<PropertyOutcome> {
    for i in 0..count {
        let value = match width {
            Width::Byte => u32::from(buf.read_u8()?),
            Width::Word => u32::from(buf.read_u16()?),
            Width::Dword => buf.read_u32()?,
            Width::Fixed(n) => {
                buf.skip(n)?;
                continue;
            }
        };
        f(i, value);
    }
    Ok(PropertyOutcome::Applied)
}
