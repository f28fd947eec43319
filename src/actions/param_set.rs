//! Action 0x0D: parameter computation.
//!
//! ```text
//! <0D> <target B> <op B> <src1 B> <src2 B> [<data D>]
//! ```
//!
//! Bit 7 of `op` skips the record when `target` is already defined. Source
//! 0xFF is the literal `data`; other sources go through the variable engine.
//! `src2 == 0xFE` (only with op 0) reads `src1` from the file whose GRFID is
//! `data`, or a patch variable when the low byte of `data` is 0xFF.
//!
//! ## Operations
//! ```text
//! 00 src1              07 src1 & src2
//! 01 src1 + src2       08 src1 | src2
//! 02 src1 - src2       09 src1 / src2 unsigned
//! 03 src1 * src2 u     0A src1 / src2 signed
//! 04 src1 * src2 s     0B src1 % src2 unsigned
//! 05 shift unsigned    0C src1 % src2 signed
//! 06 shift signed      (shift left by src2, right when src2 < 0)
//! ```
//!
//! Division and modulo by zero yield `src1`.
//!
//! ## Targets
//! ```text
//! 00-7F  file parameters
//! 8E     train sprite y-offset
//! 8F     rail type cost multipliers
//! 9E     misc GRF features
//! ```

use tracing::debug;

use crate::Result;
use crate::actions::Context;
use crate::cursor::ByteReader;
use crate::vars::{BASE_YEAR, UNKNOWN_VARIABLE};

/// Apply operation `op` to `a` and `b`. `None` for unknown operations.
pub fn evaluate(op: u8, a: u32, b: u32) -> Option<u32> {
    let (sa, sb) = (a as i32, b as i32);
    let value = match op {
        0x00 => a,
        0x01 => a.wrapping_add(b),
        0x02 => a.wrapping_sub(b),
        0x03 => a.wrapping_mul(b),
        0x04 => sa.wrapping_mul(sb) as u32,
        0x05 => {
            if sb < 0 {
                a.checked_shr(sb.unsigned_abs()).unwrap_or(0)
            } else {
                a.checked_shl(b).unwrap_or(0)
            }
        }
        0x06 => {
            if sb < 0 {
                let fill = if sa < 0 { -1 } else { 0 };
                sa.checked_shr(sb.unsigned_abs()).unwrap_or(fill) as u32
            } else {
                sa.checked_shl(b).unwrap_or(0) as u32
            }
        }
        0x07 => a & b,
        0x08 => a | b,
        0x09 => a.checked_div(b).unwrap_or(a),
        0x0A => match sb {
            0 => a,
            _ => sa.wrapping_div(sb) as u32,
        },
        0x0B => a.checked_rem(b).unwrap_or(a),
        0x0C => match sb {
            0 => a,
            _ => sa.wrapping_rem(sb) as u32,
        },
        _ => return None,
    };
    Some(value)
}

pub fn param_set(ctx: &mut Context<'_>, buf: &mut ByteReader<'_>) -> Result<()> {
    buf.require(4, "ParamSet")?;
    let target = buf.read_u8()?;
    let mut op = buf.read_u8()?;
    let src1 = buf.read_u8()?;
    let src2 = buf.read_u8()?;
    let data = if buf.remaining() >= 4 { buf.read_u32()? } else { 0 };

    if op & 0x80 != 0 {
        if target < 0x80 && ctx.file().params.is_defined(target as usize) {
            debug!(target, "ParamSet: parameter already defined, skipping");
            return Ok(());
        }
        op &= 0x7F;
    }

    let (a, b) = if src2 == 0xFE {
        if op != 0 {
            ctx.diag.warn(format!(
                "ParamSet: Source 0xFE needs operation 0x00, got 0x{op:02X}, skipping"
            ));
            return Ok(());
        }
        let value = if data & 0xFF == 0xFF {
            patch_variable(ctx, src1)
        } else if src1 == 0xFE {
            ctx.registry
                .by_grfid(data)
                .filter(|f| f.is_active())
                .map_or(0, |f| u32::from(f.version))
        } else {
            ctx.registry.foreign_param(data, src1 as usize)
        };
        (value, 0)
    } else {
        let a = if src1 == 0xFF { data } else { ctx.variable(src1, None) };
        let b = if src2 == 0xFF { data } else { ctx.variable(src2, None) };
        (a, b)
    };

    let Some(result) = evaluate(op, a, b) else {
        ctx.diag
            .error(format!("ParamSet: Unknown operation 0x{op:02X}, skipping"));
        return Ok(());
    };
    debug!(target, op, a, b, result, "ParamSet");

    if target < 0x80 {
        ctx.file_mut().params.set(target as usize, result);
        return Ok(());
    }

    if target != 0x9E {
        ctx.file_mut().is_unsafe = true;
    }
    let tuning = &mut ctx.data.tuning;
    match target {
        0x8E => tuning.traininfo_vehicle_pitch = result as u8 as i8,
        0x8F => {
            let [b0, b1, b2, _] = result.to_le_bytes();
            // Rail, electric, monorail, maglev; monorail shares the maglev byte.
            tuning.railtype_cost_multipliers = [b0, b1, b2, b2];
        }
        0x9E => tuning.misc_grf_features = result,
        0x93..=0x99 | 0x9F => ctx.diag.notice(format!(
            "ParamSet: Target 0x{target:02X} not implemented, ignoring"
        )),
        _ => debug!(target, "ParamSet: read-only target"),
    }
    Ok(())
}

/// Patch variable `id` for a 0xFE source.
fn patch_variable(ctx: &mut Context<'_>, id: u8) -> u32 {
    match id {
        0x0B => u32::from(ctx.settings.start_year).max(BASE_YEAR) - BASE_YEAR,
        0x0E => u32::from(ctx.settings.freight_trains),
        _ => {
            ctx.diag
                .warn(format!("ParamSet: Unknown patch variable 0x{id:02X}"));
            UNKNOWN_VARIABLE
        }
    }
}
