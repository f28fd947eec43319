//! Actions that announce raw sprites: sprite sets (0x01), new graphics
//! blocks (0x05) and base sprite replacement (0x0A).
//!
//! Each queues a run of [`SpriteTarget`]s for the raw sprites that follow;
//! the loader pops them as raw sprite records arrive.
//!
//! ```text
//! <01> <feature B> <num-sets B> <num-ents ext>
//! <05> <type B> <num ext>
//! <0A> <num-sets B> (<num-sprites B> <first-sprite W>)...
//! ```

use tracing::debug;

use crate::Result;
use crate::actions::Context;
use crate::cursor::ByteReader;
use crate::registry::SpriteSets;
use crate::source::SpriteTarget;

pub fn new_sprite_set(ctx: &mut Context<'_>, buf: &mut ByteReader<'_>) -> Result<()> {
    buf.require(3, "NewSpriteSet")?;
    let feature = buf.read_u8()?;
    let num_sets = u16::from(buf.read_u8()?);
    let num_ents = buf.read_extended()?;

    let start = ctx.data.next_custom_sprite;
    let total = u32::from(num_sets) * u32::from(num_ents);
    debug!(start, feature, num_sets, num_ents, total, "new sprite set");

    ctx.file_mut().spritesets = Some(SpriteSets {
        feature,
        start,
        num_sets,
        num_ents,
    });
    ctx.state.sprites.push_run(SpriteTarget::Custom(start), total);
    ctx.data.next_custom_sprite = start.wrapping_add(total);
    Ok(())
}

pub fn new_graphics(ctx: &mut Context<'_>, buf: &mut ByteReader<'_>) -> Result<()> {
    buf.require(2, "GraphicsNew")?;
    let kind = buf.read_u8()?;
    let num = buf.read_extended()?;
    debug!(kind, num, "new graphics block");
    ctx.state
        .sprites
        .push_run(SpriteTarget::Graphics { kind, index: 0 }, u32::from(num));
    Ok(())
}

pub fn sprite_replace(ctx: &mut Context<'_>, buf: &mut ByteReader<'_>) -> Result<()> {
    buf.require(1, "SpriteReplace")?;
    let num_sets = buf.read_u8()? as usize;
    buf.require(num_sets * 3, "SpriteReplace")?;
    for set in 0..num_sets {
        let num_sprites = buf.read_u8()?;
        let first = buf.read_u16()?;
        debug!(set, num_sprites, first, "replacing base sprites");
        ctx.state
            .sprites
            .push_run(SpriteTarget::Replace(first), u32::from(num_sprites));
    }
    Ok(())
}
