//! Bridge property table (feature 0x06).
//!
//! ## Properties
//! ```text
//! 0x08  introduction year    B  years since 1920
//! 0x09  minimum length       B
//! 0x0A  maximum length       B
//! 0x0B  cost factor          B
//! 0x0C  maximum speed        W
//! 0x0D  sprite tables        first table B, table count B, 32 x D each
//! 0x0E  flags                B
//! 0x0F  long intro year      D
//! 0x10  name                 W
//! 0x11  rail bridge name     W
//! 0x12  road bridge name     W
//! 0x13  long cost factor     W
//! ```

use crate::Result;
use crate::cursor::ByteReader;
use crate::diagnostics::Diagnostics;
use crate::features::{PropertyOutcome, Width, apply_each};

pub const NUM_BRIDGES: usize = 13;

/// Number of sprite tables per bridge (one per bridge piece).
pub const BRIDGE_TABLES: usize = 7;

/// Sprites in one table.
pub const BRIDGE_TABLE_SPRITES: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeSpec {
    /// Calendar year.
    pub avail_year: u32,
    pub min_length: u8,
    pub max_length: u16,
    pub price: u16,
    pub speed: u16,
    pub flags: u8,
    pub sprite_tables: [Option<Vec<u32>>; BRIDGE_TABLES],
    pub material: u16,
    pub rail_name: u16,
    pub road_name: u16,
}

impl Default for BridgeSpec {
    fn default() -> Self {
        Self {
            avail_year: 1920,
            min_length: 0,
            max_length: 0xFFFF,
            price: 0,
            speed: 0,
            flags: 0,
            sprite_tables: Default::default(),
            material: 0,
            rail_name: 0,
            road_name: 0,
        }
    }
}

/// Apply `prop` to bridges `first..first + count`. The caller checks the
/// range against [`NUM_BRIDGES`].
pub fn change_info(
    bridges: &mut [BridgeSpec],
    first: usize,
    count: usize,
    prop: u8,
    buf: &mut ByteReader<'_>,
    diag: &mut Diagnostics,
) -> Result<PropertyOutcome> {
    let bridges = &mut bridges[first..first + count];
    let outcome = match prop {
        0x08 => apply_each(buf, count, Width::Byte, |i, v| bridges[i].avail_year = 1920 + v)?,
        0x09 => apply_each(buf, count, Width::Byte, |i, v| {
            // Zero is treated as one.
            bridges[i].min_length = (v as u8).max(1)
        })?,
        0x0A => apply_each(buf, count, Width::Byte, |i, v| {
            bridges[i].max_length = if v > 16 { 0xFFFF } else { v as u16 }
        })?,
        0x0B => apply_each(buf, count, Width::Byte, |i, v| bridges[i].price = v as u16)?,
        0x0C => apply_each(buf, count, Width::Word, |i, v| bridges[i].speed = v as u16)?,
        0x0D => {
            for bridge in bridges.iter_mut() {
                buf.require(2, "BridgeChangeInfo")?;
                let table_id = buf.read_u8()? as usize;
                let num_tables = buf.read_u8()? as usize;
                buf.require(num_tables * BRIDGE_TABLE_SPRITES * 4, "BridgeChangeInfo")?;
                for table in table_id..table_id + num_tables {
                    let mut sprites = Vec::with_capacity(BRIDGE_TABLE_SPRITES);
                    for _ in 0..BRIDGE_TABLE_SPRITES {
                        sprites.push(buf.read_u32()?);
                    }
                    match bridge.sprite_tables.get_mut(table) {
                        Some(slot) => *slot = Some(sprites),
                        None => diag.warn(format!("Table {table} >= {BRIDGE_TABLES}, skipping")),
                    }
                }
            }
            PropertyOutcome::Applied
        }
        0x0E => apply_each(buf, count, Width::Byte, |i, v| bridges[i].flags = v as u8)?,
        0x0F => apply_each(buf, count, Width::Dword, |i, v| bridges[i].avail_year = v)?,
        0x10 => apply_each(buf, count, Width::Word, |i, v| bridges[i].material = v as u16)?,
        0x11 => apply_each(buf, count, Width::Word, |i, v| bridges[i].rail_name = v as u16)?,
        0x12 => apply_each(buf, count, Width::Word, |i, v| bridges[i].road_name = v as u16)?,
        0x13 => apply_each(buf, count, Width::Word, |i, v| bridges[i].price = v as u16)?,
        _ => PropertyOutcome::Unknown,
    };
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_properties() {
        let mut bridges = vec![BridgeSpec::default(); NUM_BRIDGES];
        let mut diag = Diagnostics::new();
        let mut buf = ByteReader::new(&[0x00, 0x20]);
        change_info(&mut bridges, 4, 2, 0x09, &mut buf, &mut diag).unwrap();
        assert_eq!(bridges[4].min_length, 1);
        assert_eq!(bridges[5].min_length, 0x20);

        let mut buf = ByteReader::new(&[0x40, 0x01]);
        change_info(&mut bridges, 0, 1, 0x0C, &mut buf, &mut diag).unwrap();
        assert_eq!(bridges[0].speed, 0x140);
    }

    #[test]
    fn sprite_tables() {
        let mut bridges = vec![BridgeSpec::default(); NUM_BRIDGES];
        let mut diag = Diagnostics::new();
        let mut data = vec![6, 2];
        for i in 0..(2 * BRIDGE_TABLE_SPRITES as u32) {
            data.extend_from_slice(&i.to_le_bytes());
        }
        let mut buf = ByteReader::new(&data);
        change_info(&mut bridges, 0, 1, 0x0D, &mut buf, &mut diag).unwrap();
        assert!(!buf.has_more());
        let table = bridges[0].sprite_tables[6].as_ref().unwrap();
        assert_eq!(table[1], 1);
        // Table 7 does not exist.
        assert_eq!(diag.entries().len(), 1);
    }
}
