//! Action 0x04: names for vehicles and stations, and generic strings.
//!
//! ```text
//! <04> <feature B> <lang B> <num B> <offset B, or W with lang bit 7>
//!      <name S>...
//! ```

use tracing::debug;

use crate::Result;
use crate::actions::Context;
use crate::cursor::ByteReader;
use crate::features::GrfFeature;

/// Longest name kept; longer ones are dropped.
const MAX_NAME_LEN: usize = 128;

/// Whether names in `lang` are kept for a file of `version`.
pub(crate) fn accepts_language(lang: u8, version: u8) -> bool {
    if version < 7 {
        // Language bit mask; bits 0-1 are the English variants.
        lang & 0x03 != 0
    } else {
        matches!(lang & 0x7F, 0x00 | 0x01 | 0x7F)
    }
}

pub fn new_names(ctx: &mut Context<'_>, buf: &mut ByteReader<'_>) -> Result<()> {
    buf.require(4, "VehicleNewName")?;
    let feature_id = buf.read_u8()?;
    let lang = buf.read_u8()?;
    let num = buf.read_u8()?;
    let generic = lang & 0x80 != 0;
    let offset = if generic {
        buf.read_u16()?
    } else {
        u16::from(buf.read_u8()?)
    };

    if !accepts_language(lang, ctx.file().version) {
        debug!(lang, num, "skipping names in another language");
        return Ok(());
    }

    let feature = GrfFeature::from_u8(feature_id);
    let file = &mut ctx.registry[ctx.file];
    for i in 0..u16::from(num) {
        if !buf.has_more() {
            break;
        }
        let name = buf.read_string();
        let id = offset.wrapping_add(i);
        if name.len() >= MAX_NAME_LEN {
            debug!(id, len = name.len(), "skipping over-long name");
            continue;
        }

        if generic {
            file.generic_strings.insert(id, name);
            continue;
        }
        match feature {
            Some(GrfFeature::Stations) => match file.station_mut(id as usize) {
                Some(station) => station.name = Some(name),
                None => ctx
                    .diag
                    .warn(format!("VehicleNewName: Station {id} undefined, ignoring name")),
            },
            Some(f) => match f.vehicle_type() {
                Some(vtype) if (id as usize) < vtype.count() => {
                    let engine = vtype.engine(id as usize) as usize;
                    ctx.data.vehicles.engines[engine].name = Some(name);
                }
                Some(vtype) => ctx.diag.warn(format!(
                    "VehicleNewName: Engine {id} out of range for {vtype:?}, ignoring name"
                )),
                None => debug!(feature = feature_id, id, "names not supported for feature"),
            },
            None => debug!(feature = feature_id, id, "names not supported for feature"),
        }
    }
    Ok(())
}
