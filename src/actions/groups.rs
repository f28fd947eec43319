//! Action 0x02: sprite group definition.
//!
//! ```text
//! <02> <feature B> <set-id B> <type B> <body>
//!
//! type 0x81/0x82/0x85/0x86/0x89/0x8A  deterministic
//!      bit 1: parent scope, bits 2-3: operand size (byte/word/dword)
//!      adjust: [<op B>] <variable B> [<param B>] <varadjust B>
//!              <and-mask V> [<add V> <divmod V>]
//!              (no op for the first adjust; varadjust bit 5 = another follows;
//!               varadjust bits 6-7: 0 none, 1 div, 2 mod)
//!      <num-ranges B> (<group W> <low V> <high V>)... <default W>
//!
//! type 0x80/0x83/0x84  randomized (self/parent/relative)
//!      [<count B>] <triggers B> <lowest-bit B> <num B> <group W>...
//!
//! otherwise            real: type = num-loaded
//!      <num-loading B> <set W>... <set W>...
//! ```
//!
//! Group words with bit 15 set are callback results.

use tracing::debug;

use crate::Result;
use crate::actions::Context;
use crate::cursor::ByteReader;
use crate::diagnostics::Diagnostics;
use crate::features::GrfFeature;
use crate::registry::GrfFile;
use crate::spritegroup::{
    AdjustOp, AdjustType, DeterministicGroup, GroupId, GroupRange, GroupSize, RandomizedGroup,
    RealGroup, SpriteGroup, SpriteGroupPool, TriggerMode, VarAdjust, VarScope,
};

/// Value of a callback result word. Files before version 8 mark 8-bit
/// results with 0xFF in the high byte.
pub fn callback_value(word: u16, version: u8) -> u16 {
    if version < 8 && word >> 8 == 0xFF {
        word & 0xFF
    } else {
        word & 0x7FFF
    }
}

/// Resolve a group word of `file` to a pool handle.
fn child(
    pool: &mut SpriteGroupPool,
    file: &GrfFile,
    diag: &mut Diagnostics,
    word: u16,
) -> Option<GroupId> {
    if word & 0x8000 != 0 {
        return Some(pool.callback(callback_value(word, file.version)));
    }
    let group = file.group(word);
    if group.is_none() {
        diag.warn(format!("NewSpriteGroup: Group 0x{word:04X} is not defined, ignoring"));
    }
    group
}

pub fn new_sprite_group(ctx: &mut Context<'_>, buf: &mut ByteReader<'_>) -> Result<()> {
    buf.require(3, "NewSpriteGroup")?;
    let feature = buf.read_u8()?;
    let set_id = u16::from(buf.read_u8()?);
    let kind = buf.read_u8()?;

    let file = &mut ctx.registry[ctx.file];
    let pool = &mut ctx.data.groups;
    let diag = &mut *ctx.diag;

    let group = match kind {
        0x81 | 0x82 | 0x85 | 0x86 | 0x89 | 0x8A => {
            SpriteGroup::Deterministic(read_deterministic(kind, buf, pool, file, diag)?)
        }
        0x80 | 0x83 | 0x84 => SpriteGroup::Randomized(read_randomized(kind, buf, pool, file, diag)?),
        num_loaded => {
            let has_groups = GrfFeature::from_u8(feature).is_some_and(|f| f.has_sprite_groups());
            if !has_groups {
                diag.warn(format!(
                    "NewSpriteGroup: Feature 0x{feature:02X} has no real sprite groups, skipping"
                ));
                return Ok(());
            }
            let Some(sets) = file.spritesets else {
                diag.error("NewSpriteGroup: No sprite set to work on! Skipping");
                return Ok(());
            };
            if sets.feature != feature {
                diag.warn(format!(
                    "NewSpriteGroup: Group feature 0x{feature:02X} doesn't match set feature 0x{:02X}",
                    sets.feature
                ));
            }

            let num_loaded = num_loaded as usize;
            buf.require(1, "NewSpriteGroup")?;
            let num_loading = buf.read_u8()? as usize;
            buf.require(2 * (num_loaded + num_loading), "NewSpriteGroup")?;

            let mut real = RealGroup::default();
            for i in 0..num_loaded + num_loading {
                let word = buf.read_u16()?;
                let result = if word & 0x8000 != 0 {
                    Some(pool.callback(callback_value(word, file.version)))
                } else if sets.is_valid(word) {
                    Some(pool.insert(SpriteGroup::Result {
                        sprite: sets.sprite(word),
                        num_sprites: sets.num_ents,
                    }))
                } else {
                    diag.warn(format!(
                        "NewSpriteGroup: Sprite set 0x{word:04X} out of range (0x{:X} sets), ignoring",
                        sets.num_sets
                    ));
                    None
                };
                if i < num_loaded {
                    real.loaded.push(result);
                } else {
                    real.loading.push(result);
                }
            }
            debug!(set_id, num_loaded, num_loading, "new real sprite group");
            SpriteGroup::Real(real)
        }
    };

    let id = pool.insert(group);
    file.set_group(set_id, id);
    Ok(())
}

fn read_deterministic(
    kind: u8,
    buf: &mut ByteReader<'_>,
    pool: &mut SpriteGroupPool,
    file: &GrfFile,
    diag: &mut Diagnostics,
) -> Result<DeterministicGroup> {
    let scope = if kind & 0x02 != 0 { VarScope::Parent } else { VarScope::Current };
    let size = match (kind >> 2) & 0x03 {
        0 => GroupSize::Byte,
        1 => GroupSize::Word,
        _ => GroupSize::Dword,
    };
    let width = size.width();

    let mut adjusts = Vec::new();
    loop {
        let op = if adjusts.is_empty() {
            AdjustOp::Add
        } else {
            let op = buf.read_u8()?;
            AdjustOp::from_u8(op).unwrap_or_else(|| {
                diag.warn(format!("NewSpriteGroup: Unknown adjust operation 0x{op:02X}, using add"));
                AdjustOp::Add
            })
        };

        let variable = buf.read_u8()?;
        let mut parameter = 0;
        let mut subroutine = None;
        if variable == 0x7E {
            let word = u16::from(buf.read_u8()?);
            subroutine = child(pool, file, diag, word);
        } else if (0x60..=0x7F).contains(&variable) {
            parameter = buf.read_u8()?;
        }

        let varadjust = buf.read_u8()?;
        let shift = varadjust & 0x1F;
        let more = varadjust & 0x20 != 0;
        let adjust_type = match varadjust >> 6 {
            0 => AdjustType::None,
            1 => AdjustType::Div,
            2 => AdjustType::Mod,
            _ => {
                diag.warn("NewSpriteGroup: Unknown adjust type 3, using none");
                AdjustType::None
            }
        };

        let and_mask = buf.read_sized(width)?;
        let (add_val, divmod_val) = if adjust_type == AdjustType::None {
            (0, 0)
        } else {
            let add = buf.read_sized(width)?;
            // A zero divisor would trap at evaluation time.
            let divmod = buf.read_sized(width)?.max(1);
            (add, divmod)
        };

        adjusts.push(VarAdjust {
            op,
            kind: adjust_type,
            variable,
            parameter,
            subroutine,
            shift,
            and_mask,
            add_val,
            divmod_val,
        });
        if !more {
            break;
        }
    }

    let num_ranges = buf.read_u8()? as usize;
    buf.require(num_ranges * (2 + 2 * width) + 2, "NewSpriteGroup")?;
    let mut ranges = Vec::with_capacity(num_ranges);
    for _ in 0..num_ranges {
        let word = buf.read_u16()?;
        let group = child(pool, file, diag, word);
        let low = buf.read_sized(width)?;
        let high = buf.read_sized(width)?;
        ranges.push(GroupRange { group, low, high });
    }
    let default_word = buf.read_u16()?;
    let default = child(pool, file, diag, default_word);

    Ok(DeterministicGroup {
        scope,
        size,
        adjusts,
        ranges,
        default,
    })
}

fn read_randomized(
    kind: u8,
    buf: &mut ByteReader<'_>,
    pool: &mut SpriteGroupPool,
    file: &GrfFile,
    diag: &mut Diagnostics,
) -> Result<RandomizedGroup> {
    let (scope, count) = match kind {
        0x80 => (VarScope::Current, 0),
        0x83 => (VarScope::Parent, 0),
        _ => (VarScope::Parent, buf.read_u8()?),
    };
    buf.require(3, "NewSpriteGroup")?;
    let triggers = buf.read_u8()?;
    let mode = if triggers & 0x80 != 0 { TriggerMode::All } else { TriggerMode::Any };
    let lowest_randbit = buf.read_u8()?;
    let num_groups = buf.read_u8()? as usize;
    if !num_groups.is_power_of_two() {
        diag.warn(format!(
            "NewSpriteGroup: Random group with {num_groups} children, expected a power of two"
        ));
    }

    buf.require(2 * num_groups, "NewSpriteGroup")?;
    let mut groups = Vec::with_capacity(num_groups);
    for _ in 0..num_groups {
        let word = buf.read_u16()?;
        groups.push(child(pool, file, diag, word));
    }

    Ok(RandomizedGroup {
        scope,
        mode,
        triggers: triggers & 0x7F,
        count,
        lowest_randbit,
        groups,
    })
}
