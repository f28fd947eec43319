//! Station property table (feature 0x04).
//!
//! Stations are local to the file that defines them. Property 0x08 (class
//! label) allocates the station; every other property needs an allocated
//! station and is decoded and dropped with a warning otherwise.
//!
//! ## Sprite layout (property 0x09), per station
//! ```text
//! tiles        extended
//! per tile:
//!   ground     D            0 = no building sprites follow
//!   repeated:  dx B (0x80 ends the tile), dy B, dz B,
//!              size x B, size y B, size z B, image D
//! ```
//!
//! ## Custom layout (property 0x0E), per station
//! ```text
//! repeated: length B, platforms B (either 0 ends the list),
//!           length * platforms tile bytes
//! ```

use std::collections::HashMap;

use crate::Result;
use crate::cursor::ByteReader;
use crate::diagnostics::Diagnostics;
use crate::features::{CargoSlot, PropertyOutcome, Width, skip_each};
use crate::registry::{GrfFile, MAX_STATIONS};
use crate::spritegroup::GroupId;

/// Station class label, stored as read (little-endian dword).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StationClass {
    Default,
    Waypoint,
    Custom(u32),
}

impl StationClass {
    pub const DFLT: u32 = u32::from_le_bytes(*b"DFLT");
    pub const WAYP: u32 = u32::from_le_bytes(*b"WAYP");

    pub fn from_label(label: u32) -> Self {
        match label {
            Self::DFLT => StationClass::Default,
            Self::WAYP => StationClass::Waypoint,
            other => StationClass::Custom(other),
        }
    }
}

/// One building sprite of a station tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileSeq {
    pub delta_x: i8,
    pub delta_y: i8,
    pub delta_z: i8,
    pub size_x: u8,
    pub size_y: u8,
    pub size_z: u8,
    pub image: u32,
}

/// Sprites drawn for one station tile type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TileLayout {
    pub ground: u32,
    pub seq: Vec<TileSeq>,
}

/// Custom station defined by one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationSpec {
    pub grfid: u32,
    pub local_id: u8,
    pub class: StationClass,
    pub name: Option<String>,
    pub tiles: Vec<TileLayout>,
    /// Bit n clear means n+1 platforms are not allowed.
    pub allowed_platforms: u8,
    pub allowed_lengths: u8,
    /// Fixed layouts indexed by `[length - 1][platforms - 1]`.
    pub layouts: Vec<Vec<Option<Vec<u8>>>>,
    pub callback_mask: u8,
    pub cargo_threshold: u16,
    pub pylons: u8,
    pub cargo_triggers: u32,
    pub flags: u8,
    pub wires: u8,
    pub blocked: u8,
    pub groups: HashMap<CargoSlot, GroupId>,
}

impl StationSpec {
    pub fn new(grfid: u32, local_id: u8) -> Self {
        Self {
            grfid,
            local_id,
            class: StationClass::Default,
            name: None,
            tiles: Vec::new(),
            allowed_platforms: 0,
            allowed_lengths: 0,
            layouts: Vec::new(),
            callback_mask: 0,
            cargo_threshold: 0,
            pylons: 0,
            cargo_triggers: 0,
            flags: 0,
            wires: 0,
            blocked: 0,
            groups: HashMap::new(),
        }
    }

    /// Group for `cargo`, falling back to the default group.
    pub fn group(&self, cargo: CargoSlot) -> Option<GroupId> {
        self.groups
            .get(&cargo)
            .or_else(|| self.groups.get(&CargoSlot::Default))
            .copied()
    }

    /// Fixed layout for a station of `length` by `platforms` tiles.
    pub fn layout(&self, length: usize, platforms: usize) -> Option<&[u8]> {
        self.layouts
            .get(length.checked_sub(1)?)?
            .get(platforms.checked_sub(1)?)?
            .as_deref()
    }
}

fn read_tiles(buf: &mut ByteReader<'_>) -> Result<Vec<TileLayout>> {
    let count = buf.read_extended()? as usize;
    // Every tile has at least its ground sprite.
    buf.require(count * 4, "StationChangeInfo")?;
    let mut tiles = Vec::with_capacity(count);
    for _ in 0..count {
        let ground = buf.read_u32()?;
        let mut seq = Vec::new();
        if ground != 0 {
            loop {
                let dx = buf.read_u8()?;
                if dx == 0x80 {
                    break;
                }
                buf.require(9, "StationChangeInfo")?;
                seq.push(TileSeq {
                    delta_x: dx as i8,
                    delta_y: buf.read_u8()? as i8,
                    delta_z: buf.read_u8()? as i8,
                    size_x: buf.read_u8()?,
                    size_y: buf.read_u8()?,
                    size_z: buf.read_u8()?,
                    image: buf.read_u32()?,
                });
            }
        }
        tiles.push(TileLayout { ground, seq });
    }
    Ok(tiles)
}

fn read_layouts(buf: &mut ByteReader<'_>) -> Result<Vec<Vec<Option<Vec<u8>>>>> {
    let mut layouts: Vec<Vec<Option<Vec<u8>>>> = Vec::new();
    loop {
        buf.require(2, "StationChangeInfo")?;
        let length = buf.read_u8()? as usize;
        let platforms = buf.read_u8()? as usize;
        if length == 0 || platforms == 0 {
            break;
        }
        buf.require(length * platforms, "StationChangeInfo")?;
        let tiles = buf.read_bytes(length * platforms)?.to_vec();

        if layouts.len() < length {
            layouts.resize_with(length, Vec::new);
        }
        let row = &mut layouts[length - 1];
        if row.len() < platforms {
            row.resize(platforms, None);
        }
        row[platforms - 1] = Some(tiles);
    }
    Ok(layouts)
}

/// Apply property `prop` to stations `first..first + count` of `file`.
pub fn change_info(
    file: &mut GrfFile,
    first: usize,
    count: usize,
    prop: u8,
    buf: &mut ByteReader<'_>,
    diag: &mut Diagnostics,
) -> Result<PropertyOutcome> {
    if first + count > MAX_STATIONS {
        diag.warn(format!(
            "Station {} is invalid, max {} stations",
            first + count,
            MAX_STATIONS
        ));
        return Ok(PropertyOutcome::Unknown);
    }

    let mut outcome = PropertyOutcome::Applied;
    for id in first..first + count {
        match prop {
            0x08 => {
                let class = StationClass::from_label(buf.read_u32()?);
                file.station_or_insert(id).class = class;
                continue;
            }
            0x09..=0x18 => {}
            _ => return Ok(PropertyOutcome::Unknown),
        }

        let defined = file.station(id).is_some();
        if !defined {
            diag.warn(format!(
                "Attempt to modify undefined station {id}, ignoring property 0x{prop:02X}"
            ));
        }

        match prop {
            0x09 => {
                let tiles = read_tiles(buf)?;
                if let Some(st) = file.station_mut(id) {
                    st.tiles = tiles;
                }
            }
            0x0A => {
                let src = buf.read_u8()? as usize;
                match file.station(src).map(|s| s.tiles.clone()) {
                    Some(tiles) => {
                        if let Some(st) = file.station_mut(id) {
                            st.tiles = tiles;
                        }
                    }
                    None => diag.warn(format!("Tried to copy sprite layout from undefined station {src}")),
                }
            }
            0x0B => {
                let v = buf.read_u8()?;
                if let Some(st) = file.station_mut(id) {
                    st.callback_mask = v;
                }
            }
            0x0C => {
                let v = buf.read_u8()?;
                if let Some(st) = file.station_mut(id) {
                    st.allowed_platforms = !v;
                }
            }
            0x0D => {
                let v = buf.read_u8()?;
                if let Some(st) = file.station_mut(id) {
                    st.allowed_lengths = !v;
                }
            }
            0x0E => {
                let layouts = read_layouts(buf)?;
                if let Some(st) = file.station_mut(id) {
                    st.layouts = layouts;
                }
            }
            0x0F => {
                let src = buf.read_u8()? as usize;
                match file.station(src).map(|s| s.layouts.clone()) {
                    Some(layouts) => {
                        if let Some(st) = file.station_mut(id) {
                            st.layouts = layouts;
                        }
                    }
                    None => diag.warn(format!("Tried to copy custom layout from undefined station {src}")),
                }
            }
            0x10 => {
                let v = buf.read_u16()?;
                if let Some(st) = file.station_mut(id) {
                    st.cargo_threshold = v;
                }
            }
            0x11 => {
                let v = buf.read_u8()?;
                if let Some(st) = file.station_mut(id) {
                    st.pylons = v;
                }
            }
            0x12 => {
                let v = buf.read_u32()?;
                if let Some(st) = file.station_mut(id) {
                    st.cargo_triggers = v;
                }
            }
            0x13 => {
                let v = buf.read_u8()?;
                if let Some(st) = file.station_mut(id) {
                    st.flags = v;
                }
            }
            0x14 => {
                let v = buf.read_u8()?;
                if let Some(st) = file.station_mut(id) {
                    st.wires = v;
                }
            }
            0x15 => {
                let v = buf.read_u8()?;
                if let Some(st) = file.station_mut(id) {
                    st.blocked = v;
                }
            }
            // Animation info, animation triggers.
            0x16 | 0x18 => outcome = skip_each(buf, 1, Width::Word)?,
            // Animation speed.
            0x17 => outcome = skip_each(buf, 1, Width::Byte)?,
            _ => unreachable!("filtered above"),
        }
    }
    Ok(outcome)
}
