//! Action 0x03: bind sprite groups to vehicles and stations.
//!
//! ```text
//! <03> <feature B> <n-id B> <id B>... <num-cid B> (<cargo B> <group W>)...
//!      <default group W>
//! ```
//!
//! Bit 7 of `n-id` turns a vehicle mapping into a wagon override that
//! applies behind the engines of the file's previous plain mapping. Cargo
//! 0xFF is the purchase list slot.

use tracing::debug;

use crate::Result;
use crate::actions::Context;
use crate::cursor::ByteReader;
use crate::data::StationRef;
use crate::features::vehicles::{EngineId, VehicleType};
use crate::features::{CargoSlot, GrfFeature};
use crate::spritegroup::GroupId;

pub fn map_sprite_groups(ctx: &mut Context<'_>, buf: &mut ByteReader<'_>) -> Result<()> {
    buf.require(2, "MapSpriteGroup")?;
    let feature_id = buf.read_u8()?;
    let n_id = buf.read_u8()?;
    let wagon_override = n_id & 0x80 != 0;
    let idcount = (n_id & 0x7F) as usize;

    if idcount == 0 {
        ctx.diag
            .notice("MapSpriteGroup: Feature callbacks not implemented, skipping");
        return Ok(());
    }

    buf.require(idcount + 1, "MapSpriteGroup")?;
    let ids = buf.read_bytes(idcount)?;
    let cidcount = buf.read_u8()? as usize;
    buf.require(cidcount * 3 + 2, "MapSpriteGroup")?;
    let mut cargo_words = Vec::with_capacity(cidcount);
    for _ in 0..cidcount {
        let cargo = buf.read_u8()?;
        let word = buf.read_u16()?;
        cargo_words.push((CargoSlot::from_cargo(cargo), word));
    }
    let default_word = buf.read_u16()?;

    let file = &ctx.registry[ctx.file];
    if file.spritegroups.is_empty() {
        ctx.diag.warn("MapSpriteGroup: No sprite groups to work on! Skipping");
        return Ok(());
    }

    let mut cargo_groups = Vec::with_capacity(cidcount);
    for (slot, word) in cargo_words {
        let Some(group) = file.group(word) else {
            ctx.diag.warn(format!(
                "MapSpriteGroup: Group 0x{word:04X} for cargo {slot:?} is not defined, skipping"
            ));
            return Ok(());
        };
        cargo_groups.push((slot, group));
    }
    let Some(default) = file.group(default_word) else {
        ctx.diag.warn(format!(
            "MapSpriteGroup: Default group 0x{default_word:04X} is not defined, skipping"
        ));
        return Ok(());
    };

    let feature = GrfFeature::from_u8(feature_id);
    match feature.and_then(GrfFeature::vehicle_type) {
        Some(vtype) => map_vehicles(ctx, vtype, wagon_override, ids, &cargo_groups, default),
        None if feature == Some(GrfFeature::Stations) => {
            map_stations(ctx, ids, &cargo_groups, default);
        }
        None => ctx.diag.warn(format!(
            "MapSpriteGroup: Unsupported feature 0x{feature_id:02X}, skipping"
        )),
    }
    Ok(())
}

fn map_stations(
    ctx: &mut Context<'_>,
    ids: &[u8],
    cargo_groups: &[(CargoSlot, GroupId)],
    default: GroupId,
) {
    let index = ctx.file;
    let file = &mut ctx.registry[index];
    let grfid = file.grfid;
    for &id in ids {
        let Some(station) = file.station_mut(id as usize) else {
            ctx.diag
                .warn(format!("MapSpriteGroup: Station {id} undefined, skipping"));
            continue;
        };
        for &(slot, group) in cargo_groups {
            station.groups.insert(slot, group);
        }
        station.groups.insert(CargoSlot::Default, default);
        station.grfid = grfid;

        let entry = StationRef {
            file: index,
            local_id: id,
        };
        if !ctx.data.custom_stations.contains(&entry) {
            ctx.data.custom_stations.push(entry);
        }
    }
}

fn map_vehicles(
    ctx: &mut Context<'_>,
    vtype: VehicleType,
    wagon_override: bool,
    ids: &[u8],
    cargo_groups: &[(CargoSlot, GroupId)],
    default: GroupId,
) {
    let file = &mut ctx.registry[ctx.file];
    if wagon_override && file.last_engines.is_empty() {
        ctx.diag
            .error("MapSpriteGroup: WagonOverride: No engine to do override with");
        return;
    }

    let mut engines: Vec<EngineId> = Vec::with_capacity(ids.len());
    for &id in ids {
        if id as usize >= vtype.count() {
            ctx.diag.error(format!(
                "MapSpriteGroup: Engine {id} out of range for {vtype:?} ({} engines)",
                vtype.count()
            ));
            return;
        }
        engines.push(vtype.engine(id as usize));
    }

    for &engine in &engines {
        if wagon_override {
            for &(slot, _) in cargo_groups {
                debug!(engine, ?slot, "cargo-specific wagon override not stored");
            }
            ctx.data
                .set_wagon_override(engine, default, &file.last_engines);
        } else {
            for &(slot, group) in cargo_groups {
                ctx.data.set_engine_group(engine, slot, group);
            }
            ctx.data.set_engine_group(engine, CargoSlot::Default, default);
        }
    }

    if !wagon_override {
        file.last_engines = engines;
    }
}
