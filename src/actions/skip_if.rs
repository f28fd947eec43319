//! Actions 0x07 and 0x09: conditional skip.
//!
//! ```text
//! <07|09> <param B> <size B> <cond B> <value size bytes> <num B>
//!
//! size 8:  <value D> <mask D>
//! cond 0/1 always read a one-byte bit number
//! ```
//!
//! ## Conditions
//! ```text
//! 0  bit set             6   GRFID active
//! 1  bit clear           7   GRFID not active
//! 2  ==                  8   GRFID will be active
//! 3  !=                  9   GRFID inactive or unknown
//! 4  <                   10  GRFID missing or disabled
//! 5  >
//! ```
//!
//! When the test holds, `num` names a label to jump to or, failing that, the
//! number of records to skip. `num == 0` skips to the end of the file.

use tracing::debug;

use crate::Result;
use crate::actions::{Context, Skip};
use crate::cursor::ByteReader;
use crate::registry::GrfStatus;
use crate::vars::LoadStage;

/// Parameter id of the GRFID tests.
const GRFID_PARAM: u8 = 0x88;

pub fn skip_if(ctx: &mut Context<'_>, buf: &mut ByteReader<'_>) -> Result<()> {
    buf.require(3, "SkipIf")?;
    let param = buf.read_u8()?;
    let mut size = buf.read_u8()? as usize;
    let cond = buf.read_u8()?;
    if cond < 2 {
        size = 1;
    }

    let (mut cond_val, mask) = match size {
        1 | 2 | 4 => {
            buf.require(size, "SkipIf")?;
            let mask = u32::MAX >> (32 - 8 * size);
            (buf.read_sized(size)?, mask)
        }
        8 => {
            buf.require(8, "SkipIf")?;
            (buf.read_u32()?, buf.read_u32()?)
        }
        _ => {
            ctx.diag
                .warn(format!("SkipIf: Unsupported value size {size}, ignoring test"));
            return Ok(());
        }
    };

    let result = if param == GRFID_PARAM {
        if !(6..=10).contains(&cond) {
            ctx.diag.warn(format!(
                "SkipIf: Condition {cond} cannot test a GRFID, ignoring test"
            ));
            return Ok(());
        }
        let grfid = cond_val & mask;
        let status = ctx.registry.by_grfid(grfid).map(|f| f.status);
        if status.is_none() && cond != 10 {
            debug!(grfid, cond, "SkipIf: GRFID not found, ignoring test");
            return Ok(());
        }
        match (cond, status) {
            (6, Some(s)) => s == GrfStatus::Activated,
            (7, Some(s)) => s != GrfStatus::Activated,
            (8, Some(s)) => s == GrfStatus::Initialised,
            (9, Some(s)) => matches!(s, GrfStatus::Unknown | GrfStatus::Disabled),
            (_, s) => matches!(s, None | Some(GrfStatus::Disabled)),
        }
    } else {
        let param_val = ctx.variable(param, Some(&mut cond_val));
        match cond {
            0 => cond_val < 32 && param_val & (1 << cond_val) != 0,
            1 => !(cond_val < 32 && param_val & (1 << cond_val) != 0),
            2 => param_val & mask == cond_val,
            3 => param_val & mask != cond_val,
            4 => param_val & mask < cond_val,
            5 => param_val & mask > cond_val,
            6..=10 => {
                ctx.diag.warn(format!(
                    "SkipIf: Condition {cond} needs the GRFID parameter, got 0x{param:02X}, ignoring test"
                ));
                return Ok(());
            }
            _ => {
                ctx.diag
                    .warn(format!("SkipIf: Unsupported condition type {cond}, ignoring test"));
                return Ok(());
            }
        }
    };

    if !result {
        debug!(param, cond, cond_val, "SkipIf: test failed, not skipping");
        return Ok(());
    }

    let num = buf.read_u8()?;
    if let Some(label) = ctx.file().label(num, ctx.state.record) {
        debug!(label = num, record = label.record, "SkipIf: jumping to label");
        ctx.state.jump = Some(label);
        return Ok(());
    }

    if num == 0 {
        debug!("SkipIf: skipping to end of file");
        ctx.state.skip = Skip::ToEnd;
        // A file that bails out before identifying itself for this stage
        // is not loaded.
        let expected = match ctx.stage {
            LoadStage::Apply => GrfStatus::Activated,
            _ => GrfStatus::Initialised,
        };
        if ctx.stage != LoadStage::Reserve && ctx.file().status != expected {
            ctx.disable_file();
        }
    } else {
        debug!(num, "SkipIf: skipping records");
        ctx.state.skip = Skip::Records(u32::from(num));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::testing::Harness;
    use crate::registry::{GrfFile, Label};

    fn harness() -> Harness {
        let mut h = Harness::new(LoadStage::Activation);
        h.file_mut().params.set(0, 5);
        h.file_mut().params.set(1, 0b100);
        h.file_mut().params.set(2, 0x1234);
        h
    }

    #[test]
    fn bit_tests_are_complements() {
        let mut h = harness();
        h.run(&[0x07, 0x01, 0x01, 0x00, 0x02, 0x03]).unwrap();
        assert_eq!(h.state.skip, Skip::Records(3));

        let mut h = harness();
        h.run(&[0x07, 0x01, 0x01, 0x01, 0x02, 0x03]).unwrap();
        assert_eq!(h.state.skip, Skip::None);

        for bit in 0..8u8 {
            let mut set = harness();
            let mut clear = harness();
            set.run(&[0x09, 0x01, 0x04, 0x00, bit, 0x01]).unwrap();
            clear.run(&[0x09, 0x01, 0x04, 0x01, bit, 0x01]).unwrap();
            assert_ne!(set.state.skip, clear.state.skip, "bit {bit}");
        }
    }

    #[test]
    fn numeric_comparisons() {
        let cases: [(u8, u8, bool); 4] = [(2, 5, true), (3, 5, false), (4, 6, true), (5, 4, true)];
        for (cond, value, expected) in cases {
            let mut h = harness();
            h.run(&[0x07, 0x00, 0x01, cond, value, 0x02]).unwrap();
            assert_eq!(h.state.skip != Skip::None, expected, "cond {cond}");
        }
    }

    #[test]
    fn word_comparison_masks_the_parameter() {
        let mut h = harness();
        h.file_mut().params.set(2, 0xFFFF_1234);
        h.run(&[0x07, 0x02, 0x02, 0x02, 0x34, 0x12, 0x01]).unwrap();
        assert_eq!(h.state.skip, Skip::Records(1));
    }

    #[test]
    fn explicit_mask() {
        let mut h = harness();
        h.run(&[
            0x07, 0x02, 0x08, 0x02, 0x00, 0x12, 0x00, 0x00, 0x00, 0xFF, 0x00, 0x00, 0x01,
        ])
        .unwrap();
        assert_eq!(h.state.skip, Skip::Records(1));
    }

    #[test]
    fn patch_flag_bit_test() {
        let mut h = harness();
        // Bit 0x1B of flag word 0 is always reported.
        h.run(&[0x07, 0x85, 0x01, 0x00, 0x1B, 0x01]).unwrap();
        assert_eq!(h.state.skip, Skip::Records(1));
    }

    #[test]
    fn grfid_tests() {
        let mut h = harness();
        let mut other = GrfFile::new("other.grf", &[]);
        other.grfid = 0xAABB_CCDD;
        other.status = GrfStatus::Initialised;
        h.registry.push(other);

        h.run(&[0x07, 0x88, 0x04, 0x08, 0xDD, 0xCC, 0xBB, 0xAA, 0x01]).unwrap();
        assert_eq!(h.state.skip, Skip::Records(1));

        let mut h2 = harness();
        h2.registry.push(h.registry[1].clone());
        h2.run(&[0x07, 0x88, 0x04, 0x06, 0xDD, 0xCC, 0xBB, 0xAA, 0x01]).unwrap();
        assert_eq!(h2.state.skip, Skip::None);
    }

    #[test]
    fn unknown_grfid_only_satisfies_missing_test() {
        let mut h = harness();
        h.run(&[0x07, 0x88, 0x04, 0x0A, 0x01, 0x02, 0x03, 0x09, 0x02]).unwrap();
        assert_eq!(h.state.skip, Skip::Records(2));

        let mut h = harness();
        h.run(&[0x07, 0x88, 0x04, 0x07, 0x01, 0x02, 0x03, 0x09, 0x02]).unwrap();
        assert_eq!(h.state.skip, Skip::None);
    }

    #[test]
    fn jumps_to_labels() {
        let mut h = harness();
        h.file_mut().labels.push(Label { id: 3, record: 10, position: 123 });
        h.state.record = 5;
        h.run(&[0x07, 0x00, 0x01, 0x02, 0x05, 0x03]).unwrap();
        assert_eq!(h.state.jump.map(|l| l.position), Some(123));
        assert_eq!(h.state.skip, Skip::None);
    }

    #[test]
    fn skip_to_end() {
        let mut h = harness();
        h.run(&[0x07, 0x00, 0x01, 0x02, 0x05, 0x00]).unwrap();
        assert_eq!(h.state.skip, Skip::ToEnd);
        assert_eq!(h.file().status, GrfStatus::Initialised);

        // Not yet activated in the apply stage: the file is dropped.
        let mut h = harness();
        h.stage = LoadStage::Apply;
        h.run(&[0x07, 0x00, 0x01, 0x02, 0x05, 0x00]).unwrap();
        assert_eq!(h.file().status, GrfStatus::Disabled);
    }

    #[test]
    fn bad_sizes_and_conditions_warn() {
        let mut h = harness();
        h.run(&[0x07, 0x00, 0x03, 0x02, 0x00, 0x00, 0x00, 0x01]).unwrap();
        h.run(&[0x07, 0x00, 0x01, 0x07, 0x00, 0x01]).unwrap();
        h.run(&[0x07, 0x00, 0x01, 0x0F, 0x00, 0x01]).unwrap();
        assert_eq!(h.state.skip, Skip::None);
        assert_eq!(h.diag.entries().len(), 3);
    }

    #[test]
    fn short_record_is_an_error() {
        let mut h = harness();
        assert!(h.run(&[0x07, 0x00, 0x02, 0x02, 0x01]).is_err());
    }
}
