//! Sound table declaration (0x11) and the blocks that fill it.
//!
//! ```text
//! <11> <num W>
//! <FF> <name-len B> <name> <sample data>
//! <FE> <00> <grfid D> <sound W>
//! ```
//!
//! The table reserves `num` slots at the end of the global sound list; each
//! following 0xFF or 0xFE block fills the next slot in order.

use tracing::debug;

use crate::Result;
use crate::actions::Context;
use crate::cursor::ByteReader;
use crate::features::sound::{ORIGINAL_SAMPLE_COUNT, SoundEntry, SoundSource};

pub fn sound_table(ctx: &mut Context<'_>, buf: &mut ByteReader<'_>) -> Result<()> {
    buf.require(2, "GRFSound")?;
    let num = buf.read_u16()? as usize;

    let offset = ctx.data.sounds.len();
    let file = &mut ctx.registry[ctx.file];
    file.sound_offset = offset;
    file.num_sounds = num;
    ctx.state.pending_sounds = num;
    ctx.data
        .sounds
        .extend((0..num).map(|_| SoundEntry::new(SoundSource::Empty)));
    debug!(num, offset, "sound table");
    Ok(())
}

/// Slot of the next expected sound block, consuming it.
fn next_slot(ctx: &mut Context<'_>, kind: &str) -> Option<usize> {
    if ctx.state.pending_sounds == 0 {
        ctx.diag
            .notice(format!("{kind}: Block outside a sound table, skipping"));
        return None;
    }
    let file = ctx.file();
    let slot = file.sound_offset + (file.num_sounds - ctx.state.pending_sounds);
    ctx.state.pending_sounds -= 1;
    Some(slot)
}

/// Embedded sound sample (0xFF block).
pub fn binary_block(ctx: &mut Context<'_>, buf: &mut ByteReader<'_>) -> Result<()> {
    // The slot is used up even when the block turns out to be malformed.
    let Some(slot) = next_slot(ctx, "LoadGRFSound") else {
        return Ok(());
    };
    buf.require(1, "LoadGRFSound")?;
    let name_len = buf.read_u8()? as usize;
    buf.require(name_len, "LoadGRFSound")?;
    let name = String::from_utf8_lossy(buf.read_bytes(name_len)?).into_owned();
    let data = buf.rest().to_vec();

    debug!(slot, %name, len = data.len(), "embedded sound");
    ctx.data.sounds[slot].source = SoundSource::Embedded { name, data };
    Ok(())
}

/// Sound imported from the base set or another file (0xFE block).
pub fn import_block(ctx: &mut Context<'_>, buf: &mut ByteReader<'_>) -> Result<()> {
    let Some(slot) = next_slot(ctx, "ImportGRFSound") else {
        return Ok(());
    };
    buf.require(7, "ImportGRFSound")?;
    let kind = buf.read_u8()?;
    if kind != 0 {
        ctx.diag.warn(format!(
            "ImportGRFSound: Unsupported import block type 0x{kind:02X}, skipping"
        ));
        return Ok(());
    }
    let grfid = buf.read_u32()?;
    let sound = buf.read_u16()? as usize;

    let source = if sound < ORIGINAL_SAMPLE_COUNT {
        Some(ctx.data.sounds[sound].clone())
    } else {
        ctx.registry
            .by_grfid(grfid)
            .filter(|f| sound - ORIGINAL_SAMPLE_COUNT < f.num_sounds)
            .and_then(|f| {
                ctx.data
                    .sounds
                    .get(f.sound_offset + sound - ORIGINAL_SAMPLE_COUNT)
            })
            .cloned()
    };
    match source {
        Some(entry) => ctx.data.sounds[slot] = entry,
        None => ctx.diag.warn(format!(
            "ImportGRFSound: Sound {sound} of GRFID {grfid:08X} not found"
        )),
    }
    Ok(())
}
