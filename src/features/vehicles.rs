//! Vehicle property tables (features 0x00-0x03).
//!
//! Engines are numbered globally: trains first, then road vehicles, ships
//! and aircraft. Property records address them by local id within their
//! kind.
//!
//! ## Common properties
//! ```text
//! 0x00  introduction date        W  days since 1920
//! 0x02  reliability decay speed  B
//! 0x03  vehicle life             B  years
//! 0x04  model life               B  years
//! 0x06  climate availability     B  bit mask
//! 0x07  loading speed            B
//! ```

use crate::Result;
use crate::cursor::ByteReader;
use crate::diagnostics::Diagnostics;
use crate::features::{PropertyOutcome, Width, apply_each, skip_each};

pub const NUM_TRAIN_ENGINES: usize = 116;
pub const NUM_ROAD_ENGINES: usize = 88;
pub const NUM_SHIP_ENGINES: usize = 11;
pub const NUM_AIRCRAFT_ENGINES: usize = 41;
pub const NUM_ENGINES: usize =
    NUM_TRAIN_ENGINES + NUM_ROAD_ENGINES + NUM_SHIP_ENGINES + NUM_AIRCRAFT_ENGINES;

/// Global engine index.
pub type EngineId = u16;

/// Image index that selects the engine's custom graphics.
pub const CUSTOM_IMAGE: u8 = 0xFD;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VehicleType {
    Rail,
    Road,
    Ship,
    Aircraft,
}

impl VehicleType {
    /// Number of engines of this kind.
    pub fn count(self) -> usize {
        match self {
            VehicleType::Rail => NUM_TRAIN_ENGINES,
            VehicleType::Road => NUM_ROAD_ENGINES,
            VehicleType::Ship => NUM_SHIP_ENGINES,
            VehicleType::Aircraft => NUM_AIRCRAFT_ENGINES,
        }
    }

    /// Global index of local engine 0.
    pub fn offset(self) -> usize {
        match self {
            VehicleType::Rail => 0,
            VehicleType::Road => NUM_TRAIN_ENGINES,
            VehicleType::Ship => NUM_TRAIN_ENGINES + NUM_ROAD_ENGINES,
            VehicleType::Aircraft => NUM_TRAIN_ENGINES + NUM_ROAD_ENGINES + NUM_SHIP_ENGINES,
        }
    }

    pub fn engine(self, local: usize) -> EngineId {
        (self.offset() + local) as EngineId
    }
}

/// Properties shared by every engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineInfo {
    /// Days since 1920-01-01.
    pub base_intro: u16,
    /// Low 7 bits only.
    pub decay_speed: u8,
    pub lifelength: u8,
    pub base_life: u8,
    pub climates: u8,
    pub load_amount: u8,
    pub refit_mask: u32,
    pub callback_mask: u8,
    pub name: Option<String>,
    /// Image index the engine used before switching to custom graphics.
    pub original_image: Option<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RailVehicleInfo {
    pub image_index: u8,
    pub is_wagon: bool,
    pub multihead: bool,
    pub railtype: u8,
    pub base_cost: u8,
    pub running_cost: u8,
    /// Running cost class selected by base price (0x0E).
    pub running_cost_class: u8,
    /// Traction type (0 steam, 1 diesel, 2 electric).
    pub engclass: u8,
    pub max_speed: u16,
    pub power: u16,
    pub weight: u16,
    pub capacity: u8,
    pub cargo_type: u8,
    pub pow_wag_power: u16,
    pub pow_wag_weight: u8,
    pub visual_effect: u8,
    pub shorten_factor: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoadVehicleInfo {
    pub image_index: u8,
    pub base_cost: u8,
    pub running_cost: u8,
    pub sfx: u8,
    pub max_speed: u8,
    pub capacity: u8,
    pub cargo_type: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShipVehicleInfo {
    pub image_index: u8,
    pub refittable: bool,
    pub base_cost: u8,
    pub max_speed: u8,
    pub cargo_type: u8,
    pub capacity: u16,
    pub running_cost: u8,
    pub sfx: u8,
}

/// Aircraft subtype bits. A subtype of 0 is a helicopter.
pub const AIR_CTOL: u8 = 0x01;
pub const AIR_FAST: u8 = 0x02;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AircraftVehicleInfo {
    pub image_index: u8,
    pub subtype: u8,
    pub base_cost: u8,
    pub max_speed: u8,
    pub acceleration: u8,
    pub running_cost: u8,
    pub passenger_capacity: u16,
    pub mail_capacity: u8,
    pub sfx: u8,
}

impl Default for AircraftVehicleInfo {
    fn default() -> Self {
        Self {
            image_index: 0,
            subtype: AIR_CTOL,
            base_cost: 0,
            max_speed: 0,
            acceleration: 0,
            running_cost: 0,
            passenger_capacity: 0,
            mail_capacity: 0,
            sfx: 0,
        }
    }
}

/// Every engine record, overwritten in place by property records.
#[derive(Debug, Clone)]
pub struct VehicleTables {
    pub engines: Vec<EngineInfo>,
    pub rail: Vec<RailVehicleInfo>,
    pub road: Vec<RoadVehicleInfo>,
    pub ships: Vec<ShipVehicleInfo>,
    pub aircraft: Vec<AircraftVehicleInfo>,
}

impl Default for VehicleTables {
    fn default() -> Self {
        Self {
            engines: vec![EngineInfo::default(); NUM_ENGINES],
            rail: vec![RailVehicleInfo::default(); NUM_TRAIN_ENGINES],
            road: vec![RoadVehicleInfo::default(); NUM_ROAD_ENGINES],
            ships: vec![ShipVehicleInfo::default(); NUM_SHIP_ENGINES],
            aircraft: vec![AircraftVehicleInfo::default(); NUM_AIRCRAFT_ENGINES],
        }
    }
}

impl VehicleTables {
    pub fn engine(&self, id: EngineId) -> Option<&EngineInfo> {
        self.engines.get(id as usize)
    }

    /// Apply property `prop` to `count` engines of kind `vtype` starting at
    /// local id `first`. The caller guarantees the range is in bounds.
    pub fn change_info(
        &mut self,
        vtype: VehicleType,
        first: usize,
        count: usize,
        prop: u8,
        buf: &mut ByteReader<'_>,
        diag: &mut Diagnostics,
    ) -> Result<PropertyOutcome> {
        let base = vtype.offset() + first;
        let outcome = common_change_info(&mut self.engines[base..base + count], prop, buf)?;
        if outcome != PropertyOutcome::Unknown {
            return Ok(outcome);
        }
        match vtype {
            VehicleType::Rail => self.rail_change_info(first, count, prop, buf, diag),
            VehicleType::Road => self.road_change_info(first, count, prop, buf),
            VehicleType::Ship => self.ship_change_info(first, count, prop, buf),
            VehicleType::Aircraft => self.aircraft_change_info(first, count, prop, buf),
        }
    }

    fn rail_change_info(
        &mut self,
        first: usize,
        count: usize,
        prop: u8,
        buf: &mut ByteReader<'_>,
        diag: &mut Diagnostics,
    ) -> Result<PropertyOutcome> {
        let base = VehicleType::Rail.offset() + first;
        let rail = &mut self.rail[first..first + count];
        let engines = &mut self.engines[base..base + count];

        let outcome = match prop {
            0x05 => apply_each(buf, count, Width::Byte, |i, v| rail[i].railtype = v as u8)?,
            0x09 => apply_each(buf, count, Width::Word, |i, v| {
                // 0xFFFF means "no speed".
                let speed = if v == 0xFFFF { 0 } else { v as u16 };
                rail[i].max_speed = speed;
                dewagonize(u32::from(speed), &mut rail[i]);
            })?,
            0x0B => apply_each(buf, count, Width::Word, |i, v| {
                let power = if rail[i].multihead { v / 2 } else { v };
                rail[i].power = power as u16;
                dewagonize(power, &mut rail[i]);
            })?,
            0x0D => apply_each(buf, count, Width::Byte, |i, v| {
                rail[i].running_cost = v as u8;
                dewagonize(v, &mut rail[i]);
            })?,
            0x0E => {
                let mut unknown = Vec::new();
                let outcome = apply_each(buf, count, Width::Dword, |i, v| {
                    match v {
                        0x4C30 => rail[i].running_cost_class = 0,
                        0x4C36 => rail[i].running_cost_class = 1,
                        0x4C3C => rail[i].running_cost_class = 2,
                        _ => unknown.push(v),
                    }
                    dewagonize(v, &mut rail[i]);
                })?;
                for v in unknown {
                    diag.warn(format!("Unsupported running cost base 0x{v:04X}, ignoring"));
                }
                outcome
            }
            0x12 => apply_each(buf, count, Width::Byte, |i, v| {
                set_image(&mut rail[i].image_index, &mut engines[i], v as u8);
            })?,
            0x13 => apply_each(buf, count, Width::Byte, |i, v| {
                let r = &mut rail[i];
                if v != 0 && !r.multihead {
                    r.multihead = true;
                    r.power /= 2;
                    r.running_cost /= 2;
                } else if v == 0 && r.multihead {
                    r.multihead = false;
                    r.power = r.power.saturating_mul(2);
                    r.running_cost = r.running_cost.saturating_mul(2);
                }
            })?,
            0x14 => apply_each(buf, count, Width::Byte, |i, v| rail[i].capacity = v as u8)?,
            0x15 => apply_each(buf, count, Width::Byte, |i, v| rail[i].cargo_type = v as u8)?,
            0x16 => apply_each(buf, count, Width::Byte, |i, v| {
                rail[i].weight = (rail[i].weight & 0xFF00) | v as u16
            })?,
            0x17 => apply_each(buf, count, Width::Byte, |i, v| rail[i].base_cost = v as u8)?,
            0x19 => apply_each(buf, count, Width::Byte, |i, v| {
                rail[i].engclass = match v {
                    0x00..=0x07 => 0,
                    0x08..=0x27 => 1,
                    _ => 2,
                };
            })?,
            0x1B => apply_each(buf, count, Width::Word, |i, v| rail[i].pow_wag_power = v as u16)?,
            0x1D => apply_each(buf, count, Width::Dword, |i, v| engines[i].refit_mask = v)?,
            0x1E => apply_each(buf, count, Width::Byte, |i, v| engines[i].callback_mask = v as u8)?,
            0x21 => apply_each(buf, count, Width::Byte, |i, v| rail[i].shorten_factor = v as u8)?,
            0x22 => apply_each(buf, count, Width::Byte, |i, v| rail[i].visual_effect = v as u8)?,
            0x23 => apply_each(buf, count, Width::Byte, |i, v| rail[i].pow_wag_weight = v as u8)?,
            0x24 => apply_each(buf, count, Width::Byte, |i, v| {
                rail[i].weight = (rail[i].weight & 0x00FF) | ((v as u16) << 8)
            })?,
            // AI passenger service, AI rank, sort order, refit cost,
            // tractive effort, air drag, user data, retire early, misc flags.
            0x08 | 0x18 | 0x1A | 0x1C | 0x1F | 0x20 | 0x25 | 0x26 | 0x27 => {
                skip_each(buf, count, Width::Byte)?
            }
            // Cargo class masks.
            0x28 | 0x29 => skip_each(buf, count, Width::Word)?,
            // Long introduction date.
            0x2A => skip_each(buf, count, Width::Dword)?,
            _ => PropertyOutcome::Unknown,
        };
        Ok(outcome)
    }

    fn road_change_info(
        &mut self,
        first: usize,
        count: usize,
        prop: u8,
        buf: &mut ByteReader<'_>,
    ) -> Result<PropertyOutcome> {
        let base = VehicleType::Road.offset() + first;
        let road = &mut self.road[first..first + count];
        let engines = &mut self.engines[base..base + count];

        let outcome = match prop {
            0x08 => apply_each(buf, count, Width::Byte, |i, v| road[i].max_speed = v as u8)?,
            0x09 => apply_each(buf, count, Width::Byte, |i, v| road[i].running_cost = v as u8)?,
            0x0E => apply_each(buf, count, Width::Byte, |i, v| {
                set_image(&mut road[i].image_index, &mut engines[i], custom_id(v));
            })?,
            0x0F => apply_each(buf, count, Width::Byte, |i, v| road[i].capacity = v as u8)?,
            0x10 => apply_each(buf, count, Width::Byte, |i, v| road[i].cargo_type = v as u8)?,
            0x11 => apply_each(buf, count, Width::Byte, |i, v| road[i].base_cost = v as u8)?,
            0x12 => apply_each(buf, count, Width::Byte, |i, v| road[i].sfx = v as u8)?,
            0x16 => apply_each(buf, count, Width::Dword, |i, v| engines[i].refit_mask = v)?,
            0x17 => apply_each(buf, count, Width::Byte, |i, v| engines[i].callback_mask = v as u8)?,
            // Running cost base.
            0x0A => skip_each(buf, count, Width::Dword)?,
            // Power, weight, realistic speed, tractive effort, air drag,
            // refit cost, retire early.
            0x13 | 0x14 | 0x15 | 0x18 | 0x19 | 0x1A | 0x1B => skip_each(buf, count, Width::Byte)?,
            _ => PropertyOutcome::Unknown,
        };
        Ok(outcome)
    }

    fn ship_change_info(
        &mut self,
        first: usize,
        count: usize,
        prop: u8,
        buf: &mut ByteReader<'_>,
    ) -> Result<PropertyOutcome> {
        let base = VehicleType::Ship.offset() + first;
        let ships = &mut self.ships[first..first + count];
        let engines = &mut self.engines[base..base + count];

        let outcome = match prop {
            0x08 => apply_each(buf, count, Width::Byte, |i, v| {
                set_image(&mut ships[i].image_index, &mut engines[i], custom_id(v));
            })?,
            0x09 => apply_each(buf, count, Width::Byte, |i, v| ships[i].refittable = v != 0)?,
            0x0A => apply_each(buf, count, Width::Byte, |i, v| ships[i].base_cost = v as u8)?,
            0x0B => apply_each(buf, count, Width::Byte, |i, v| ships[i].max_speed = v as u8)?,
            0x0C => apply_each(buf, count, Width::Byte, |i, v| ships[i].cargo_type = v as u8)?,
            0x0D => apply_each(buf, count, Width::Word, |i, v| ships[i].capacity = v as u16)?,
            0x0F => apply_each(buf, count, Width::Byte, |i, v| ships[i].running_cost = v as u8)?,
            0x10 => apply_each(buf, count, Width::Byte, |i, v| ships[i].sfx = v as u8)?,
            0x11 => apply_each(buf, count, Width::Dword, |i, v| engines[i].refit_mask = v)?,
            0x12 => apply_each(buf, count, Width::Byte, |i, v| engines[i].callback_mask = v as u8)?,
            // Refit cost, ocean speed, canal speed, retire early.
            0x13 | 0x14 | 0x15 | 0x16 => skip_each(buf, count, Width::Byte)?,
            _ => PropertyOutcome::Unknown,
        };
        Ok(outcome)
    }

    fn aircraft_change_info(
        &mut self,
        first: usize,
        count: usize,
        prop: u8,
        buf: &mut ByteReader<'_>,
    ) -> Result<PropertyOutcome> {
        let base = VehicleType::Aircraft.offset() + first;
        let air = &mut self.aircraft[first..first + count];
        let engines = &mut self.engines[base..base + count];

        let outcome = match prop {
            0x08 => apply_each(buf, count, Width::Byte, |i, v| {
                set_image(&mut air[i].image_index, &mut engines[i], custom_id(v));
            })?,
            0x09 => apply_each(buf, count, Width::Byte, |i, v| {
                if v == 0 {
                    air[i].subtype = 0;
                } else {
                    air[i].subtype |= AIR_CTOL;
                }
            })?,
            0x0A => apply_each(buf, count, Width::Byte, |i, v| {
                if v == 0 {
                    air[i].subtype &= !AIR_FAST;
                } else {
                    air[i].subtype |= AIR_FAST;
                }
            })?,
            0x0B => apply_each(buf, count, Width::Byte, |i, v| air[i].base_cost = v as u8)?,
            0x0C => apply_each(buf, count, Width::Byte, |i, v| air[i].max_speed = v as u8)?,
            0x0D => apply_each(buf, count, Width::Byte, |i, v| air[i].acceleration = v as u8)?,
            0x0E => apply_each(buf, count, Width::Byte, |i, v| air[i].running_cost = v as u8)?,
            0x0F => apply_each(buf, count, Width::Word, |i, v| {
                air[i].passenger_capacity = v as u16
            })?,
            0x11 => apply_each(buf, count, Width::Byte, |i, v| air[i].mail_capacity = v as u8)?,
            0x12 => apply_each(buf, count, Width::Byte, |i, v| air[i].sfx = v as u8)?,
            0x13 => apply_each(buf, count, Width::Dword, |i, v| engines[i].refit_mask = v)?,
            0x14 => apply_each(buf, count, Width::Byte, |i, v| engines[i].callback_mask = v as u8)?,
            // Refit cost, retire early, misc flags.
            0x15 | 0x16 | 0x17 => skip_each(buf, count, Width::Byte)?,
            _ => PropertyOutcome::Unknown,
        };
        Ok(outcome)
    }
}

/// Properties shared by all four vehicle kinds.
fn common_change_info(
    engines: &mut [EngineInfo],
    prop: u8,
    buf: &mut ByteReader<'_>,
) -> Result<PropertyOutcome> {
    let count = engines.len();
    let outcome = match prop {
        0x00 => apply_each(buf, count, Width::Word, |i, v| engines[i].base_intro = v as u16)?,
        0x02 => apply_each(buf, count, Width::Byte, |i, v| {
            engines[i].decay_speed = (v & 0x7F) as u8
        })?,
        0x03 => apply_each(buf, count, Width::Byte, |i, v| engines[i].lifelength = v as u8)?,
        0x04 => apply_each(buf, count, Width::Byte, |i, v| engines[i].base_life = v as u8)?,
        0x06 => apply_each(buf, count, Width::Byte, |i, v| {
            engines[i].climates = (v & 0x0F) as u8
        })?,
        0x07 => apply_each(buf, count, Width::Byte, |i, v| engines[i].load_amount = v as u8)?,
        _ => PropertyOutcome::Unknown,
    };
    Ok(outcome)
}

/// Non-rail vehicles spell the custom image as 0xFF.
fn custom_id(v: u32) -> u8 {
    if v == 0xFF { CUSTOM_IMAGE } else { v as u8 }
}

/// Store a new image index, remembering the previous one when the engine
/// switches to custom graphics.
fn set_image(image: &mut u8, engine: &mut EngineInfo, value: u8) {
    if value == CUSTOM_IMAGE && *image != CUSTOM_IMAGE {
        engine.original_image = Some(*image);
    }
    *image = value;
}

/// A non-zero speed, power or running cost turns a wagon into an engine;
/// zero turns it back into a wagon.
fn dewagonize(condition: u32, rail: &mut RailVehicleInfo) {
    rail.is_wagon = condition == 0;
}
