//! Global variables (feature 0x08).
//!
//! The entity id selects a price, currency or translation-table slot
//! depending on the property.
//!
//! ## Properties
//! ```text
//! 0x08  price base multiplier    B  stored as value - 8
//! 0x09  cargo translation        D  per-file table
//! 0x0A  currency name            W  string id
//! 0x0B  currency rate            D  divided by 1000
//! 0x0C  currency options         W  separator (low byte), symbol position (bit 8)
//! 0x0D  currency prefix          D  up to four characters
//! 0x0E  currency suffix          D
//! 0x0F  euro introduction year   W
//! 0x10  snow line table          12 x 32 B, once
//! 0x11  GRF match                8 bytes, ignored
//! 0x12  rail type translation    D  per-file table
//! ```

use crate::Result;
use crate::cursor::ByteReader;
use crate::diagnostics::Diagnostics;
use crate::features::{PropertyOutcome, Width, skip_each};
use crate::registry::GrfFile;

pub const NUM_PRICES: usize = 49;
pub const NUM_CURRENCIES: usize = 24;
pub const MAX_PRICE_MODIFIER: i8 = 16;
pub const SNOW_LINE_MONTHS: usize = 12;
pub const SNOW_LINE_DAYS: usize = 32;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CurrencySpec {
    pub name: u16,
    pub rate: u32,
    pub separator: u8,
    /// 0 = prefix, 1 = suffix.
    pub symbol_pos: u8,
    pub prefix: String,
    pub suffix: String,
    /// Year of the switch to the euro, 0 for never.
    pub to_euro: u16,
}

/// Snow line height for each day of each month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnowLine {
    pub table: [[u8; SNOW_LINE_DAYS]; SNOW_LINE_MONTHS],
    pub highest: u8,
    pub lowest: u8,
}

#[derive(Debug, Clone)]
pub struct GlobalTables {
    pub price_multipliers: Vec<i8>,
    pub currencies: Vec<CurrencySpec>,
    pub snow_line: Option<Box<SnowLine>>,
}

impl Default for GlobalTables {
    fn default() -> Self {
        Self {
            price_multipliers: vec![0; NUM_PRICES],
            currencies: vec![
                CurrencySpec {
                    rate: 1,
                    separator: b',',
                    ..CurrencySpec::default()
                };
                NUM_CURRENCIES
            ],
            snow_line: None,
        }
    }
}

fn read_snow_line(buf: &mut ByteReader<'_>) -> Result<SnowLine> {
    let mut line = SnowLine {
        table: [[0; SNOW_LINE_DAYS]; SNOW_LINE_MONTHS],
        highest: 0,
        lowest: u8::MAX,
    };
    for month in line.table.iter_mut() {
        for day in month.iter_mut() {
            let level = buf.read_u8()?;
            // Values of 128 and above mean "no snow".
            *day = if level >= 128 { 0xFF } else { level };
            line.highest = line.highest.max(*day);
            line.lowest = line.lowest.min(*day);
        }
    }
    Ok(line)
}

/// Apply `prop` to global slots `first..first + count`.
pub fn change_info(
    globals: &mut GlobalTables,
    file: &mut GrfFile,
    first: usize,
    count: usize,
    prop: u8,
    buf: &mut ByteReader<'_>,
    diag: &mut Diagnostics,
) -> Result<PropertyOutcome> {
    match prop {
        0x10 => {
            buf.require(count * SNOW_LINE_MONTHS * SNOW_LINE_DAYS, "GlobalVarChangeInfo")?;
            for _ in 0..count {
                let line = read_snow_line(buf)?;
                if count > 1 || globals.snow_line.is_some() {
                    diag.warn("The snow line can only be set once");
                } else {
                    globals.snow_line = Some(Box::new(line));
                }
            }
            return Ok(PropertyOutcome::Applied);
        }
        0x11 => return skip_each(buf, count, Width::Fixed(8)),
        _ => {}
    }

    for id in first..first + count {
        match prop {
            0x08 => {
                let factor = buf.read_u8()? as i32;
                match globals.price_multipliers.get_mut(id) {
                    Some(slot) => *slot = (factor - 8).min(i32::from(MAX_PRICE_MODIFIER)) as i8,
                    None => diag.warn(format!("Price {id} out of range, ignoring")),
                }
            }
            0x09 | 0x12 => {
                let label = buf.read_u32()?;
                let table = if prop == 0x09 {
                    &mut file.cargo_translation
                } else {
                    &mut file.railtype_translation
                };
                if table.len() <= id {
                    table.resize(id + 1, 0);
                }
                table[id] = label;
            }
            0x0A..=0x0F => {
                let width = if matches!(prop, 0x0B | 0x0D | 0x0E) { 4 } else { 2 };
                let Some(currency) = globals.currencies.get_mut(id) else {
                    diag.warn(format!("Currency {id} out of range, ignoring"));
                    buf.skip(width)?;
                    continue;
                };
                match prop {
                    0x0A => currency.name = buf.read_u16()?,
                    0x0B => currency.rate = buf.read_u32()? / 1000,
                    0x0C => {
                        let options = buf.read_u16()?;
                        currency.separator = (options & 0xFF) as u8;
                        currency.symbol_pos = ((options >> 8) & 1) as u8;
                    }
                    0x0D => currency.prefix = buf.read_dword_string()?,
                    0x0E => currency.suffix = buf.read_dword_string()?,
                    _ => currency.to_euro = buf.read_u16()?,
                }
            }
            _ => return Ok(PropertyOutcome::Unknown),
        }
    }
    Ok(PropertyOutcome::Applied)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(
        globals: &mut GlobalTables,
        first: usize,
        count: usize,
        prop: u8,
        data: &[u8],
    ) -> (PropertyOutcome, usize, Diagnostics) {
        let mut file = GrfFile::new("g.grf", &[]);
        let mut buf = ByteReader::new(data);
        let mut diag = Diagnostics::new();
        let outcome = change_info(globals, &mut file, first, count, prop, &mut buf, &mut diag).unwrap();
        (outcome, buf.position(), diag)
    }

    #[test]
    fn price_multipliers_are_offset() {
        let mut g = GlobalTables::default();
        apply(&mut g, 3, 2, 0x08, &[10, 200]);
        assert_eq!(g.price_multipliers[3], 2);
        assert_eq!(g.price_multipliers[4], MAX_PRICE_MODIFIER);
    }

    #[test]
    fn currency_fields() {
        let mut g = GlobalTables::default();
        apply(&mut g, 1, 1, 0x0B, &1_500_000u32.to_le_bytes());
        assert_eq!(g.currencies[1].rate, 1500);
        apply(&mut g, 1, 1, 0x0C, &[b'.', 0x01]);
        assert_eq!(g.currencies[1].separator, b'.');
        assert_eq!(g.currencies[1].symbol_pos, 1);
        apply(&mut g, 1, 1, 0x0D, b"Kr\0\0");
        assert_eq!(g.currencies[1].prefix, "Kr");
    }

    #[test]
    fn out_of_range_currency_stays_in_sync() {
        let mut g = GlobalTables::default();
        let (outcome, used, diag) = apply(&mut g, NUM_CURRENCIES, 2, 0x0F, &[1, 2, 3, 4]);
        assert_eq!(outcome, PropertyOutcome::Applied);
        assert_eq!(used, 4);
        assert_eq!(diag.entries().len(), 2);
    }

    #[test]
    fn snow_line_once() {
        let mut g = GlobalTables::default();
        let mut data = vec![40u8; SNOW_LINE_MONTHS * SNOW_LINE_DAYS];
        data[0] = 200;
        let (_, used, _) = apply(&mut g, 0, 1, 0x10, &data);
        assert_eq!(used, data.len());
        let line = g.snow_line.as_ref().unwrap();
        assert_eq!(line.table[0][0], 0xFF);
        assert_eq!(line.lowest, 40);

        let (_, _, diag) = apply(&mut g, 0, 1, 0x10, &data);
        assert_eq!(diag.entries().len(), 1);
    }

    #[test]
    fn grf_match_is_skipped() {
        let mut g = GlobalTables::default();
        let (outcome, used, _) = apply(&mut g, 0, 2, 0x11, &[0; 16]);
        assert_eq!(outcome, PropertyOutcome::Ignored);
        assert_eq!(used, 16);
    }
}
