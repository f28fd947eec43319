//! Action 0x06: patch the next pseudo-sprite with parameter bytes.
//!
//! ```text
//! <06> (<param B> <size B> <offset ext>)... <FF>
//!
//! size bit 7: add to the existing bytes instead of overwriting
//! ```
//!
//! The next record is peeked without consuming it. The patched copy is
//! staged in [`FileState::staged`](crate::actions::FileState) and replaces
//! the stream bytes when the loader reaches that record.

use tracing::debug;

use crate::Result;
use crate::actions::{Context, StagedRecord};
use crate::cursor::ByteReader;
use crate::utils::peek_pseudo_sprite;

pub fn cfg_apply(ctx: &mut Context<'_>, buf: &mut ByteReader<'_>) -> Result<()> {
    let Some(mut data) = peek_pseudo_sprite(&mut *ctx.stream)? else {
        debug!("CfgApply: next record is not a pseudo-sprite, nothing to patch");
        return Ok(());
    };

    while buf.has_more() {
        let param = buf.read_u8()?;
        if param == 0xFF {
            break;
        }
        let size = buf.read_u8()?;
        let add = size & 0x80 != 0;
        let size = (size & 0x7F) as usize;
        let offset = buf.read_extended()? as usize;

        if offset + size > data.len() {
            ctx.diag.warn(format!(
                "CfgApply: Patch of {size} bytes at offset {offset} out of bounds (record is {} bytes), ignoring the rest",
                data.len()
            ));
            break;
        }

        let mut carry = false;
        for i in 0..size {
            if i % 4 == 0 {
                carry = false;
            }
            let value = ctx.variable(param.wrapping_add((i / 4) as u8), None);
            let byte = (value >> ((i % 4) * 8)) as u8;
            let slot = &mut data[offset + i];
            if add {
                let (sum, c1) = slot.overflowing_add(byte);
                let (sum, c2) = sum.overflowing_add(u8::from(carry));
                *slot = sum;
                carry = c1 || c2;
            } else {
                *slot = byte;
            }
        }
    }

    ctx.state.staged = Some(StagedRecord {
        record: ctx.state.record + 1,
        data,
    });
    Ok(())
}
