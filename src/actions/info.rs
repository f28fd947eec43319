//! File identity and housekeeping actions.
//!
//! ```text
//! <08> <version B> <grfid D> <name S> <description S>
//! <0B> <severity B> <lang B> <msg-id B> [<message S>] [<data S>]
//! <0C> <anything>
//! <0E> <num B> <grfid D>...
//! <10> <label B> <anything>
//! ```


use tracing::{debug, info, trace};

use crate::Result;
use crate::actions::Context;
use crate::actions::names::accepts_language;
use crate::cursor::ByteReader;
use crate::diagnostics::Severity;
use crate::registry::{GrfStatus, Label};
use crate::vars::LoadStage;

/// Built-in messages of the error action; `%s` takes the data string.
const ERROR_MESSAGES: [&str; 4] = [
    "Requires at least pseudo-TTDPatch version %s.",
    "This file is for %s version of TTD.",
    "Designed to be used with %s",
    "Invalid parameter %s.",
];

/// Action 0x08.
pub fn grf_info(ctx: &mut Context<'_>, buf: &mut ByteReader<'_>) -> Result<()> {
    buf.require(5, "GRFInfo")?;
    let version = buf.read_u8()?;
    let grfid = buf.read_u32()?;
    let name = buf.read_string();
    let description = buf.read_string();

    let duplicate = ctx
        .registry
        .iter()
        .enumerate()
        .find(|(i, f)| *i != ctx.file && f.grfid == grfid && f.is_active())
        .map(|(_, f)| f.filename.clone());
    if let Some(other) = duplicate {
        ctx.diag.error(format!(
            "GRFInfo: GRFID {grfid:08X} is already used by '{other}', disabling"
        ));
        ctx.disable_file();
        return Ok(());
    }

    let stage = ctx.stage;
    let file = ctx.file_mut();
    file.version = version;
    file.grfid = grfid;
    file.name = name;
    file.description = description;
    file.status = match stage {
        LoadStage::Apply => GrfStatus::Activated,
        _ => GrfStatus::Initialised,
    };
    info!(
        grfid = %format!("{grfid:08X}"),
        version,
        name = %file.name,
        stage = ?stage,
        "loaded NewGRF identity"
    );
    Ok(())
}

/// Action 0x0B.
pub fn grf_error(ctx: &mut Context<'_>, buf: &mut ByteReader<'_>) -> Result<()> {
    buf.require(3, "GRFError")?;
    let severity = buf.read_u8()?;
    let lang = buf.read_u8()?;
    let msgid = buf.read_u8()?;

    // Bit 7 reports during the activation scan, otherwise only on apply.
    let report_now = if severity & 0x80 != 0 {
        ctx.stage == LoadStage::Activation
    } else {
        ctx.stage == LoadStage::Apply
    };
    if !report_now {
        return Ok(());
    }
    if !accepts_language(lang, ctx.file().version) {
        trace!(lang, msgid, "GRFError: message in another language");
        return Ok(());
    }

    let template = match msgid {
        0xFF => buf.read_string(),
        0..=3 => ERROR_MESSAGES[msgid as usize].to_owned(),
        _ => {
            ctx.diag
                .warn(format!("GRFError: Invalid message id 0x{msgid:02X}"));
            return Ok(());
        }
    };
    let data = if buf.has_more() {
        buf.read_string()
    } else {
        String::new()
    };
    let message = template.replacen("%s", &data, 1);

    let severity = Severity::from_grf(severity);
    ctx.diag.report(severity, message);
    if severity == Severity::Fatal {
        ctx.disable_file();
    }
    Ok(())
}

/// Action 0x0C.
pub fn grf_comment(_ctx: &mut Context<'_>, buf: &mut ByteReader<'_>) -> Result<()> {
    trace!(len = buf.remaining(), "comment");
    Ok(())
}

/// Action 0x0E.
pub fn grf_inhibit(ctx: &mut Context<'_>, buf: &mut ByteReader<'_>) -> Result<()> {
    buf.require(1, "GRFInhibit")?;
    let num = buf.read_u8()? as usize;
    buf.require(num * 4, "GRFInhibit")?;

    let own = ctx.file().grfid;
    for _ in 0..num {
        let grfid = buf.read_u32()?;
        if grfid == own {
            continue;
        }
        let Some(index) = ctx.registry.index_of_grfid(grfid) else {
            debug!(grfid, "GRFInhibit: file not loaded");
            continue;
        };
        let target = &mut ctx.registry[index];
        if target.status != GrfStatus::Disabled {
            target.status = GrfStatus::Disabled;
            ctx.diag
                .notice(format!("GRFInhibit: Deactivating file '{}'", target.filename));
        }
    }
    Ok(())
}

/// Action 0x10.
pub fn define_label(ctx: &mut Context<'_>, buf: &mut ByteReader<'_>) -> Result<()> {
    buf.require(1, "DefineGotoLabel")?;
    let id = buf.read_u8()?;
    let label = Label {
        id,
        record: ctx.state.record,
        position: ctx.stream.stream_position()?,
    };
    debug!(id, record = label.record, position = label.position, "label defined");
    ctx.file_mut().labels.push(label);
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Seek, SeekFrom};

    use super::*;
    use crate::actions::testing::Harness;
    use crate::registry::GrfFile;

    const INFO: &[u8] = b"\x08\x07\x44\x43\x42\x41Trains\0A train set\0";

    fn other(grfid: u32) -> GrfFile {
        let mut f = GrfFile::new("other.grf", &[]);
        f.grfid = grfid;
        f.status = GrfStatus::Initialised;
        f
    }

    #[test]
    fn info_sets_identity_per_stage() {
        let mut h = Harness::new(LoadStage::Activation);
        h.file_mut().status = GrfStatus::Unknown;
        h.run(INFO).unwrap();
        let f = h.file();
        assert_eq!(f.grfid, 0x4142_4344);
        assert_eq!(f.version, 7);
        assert_eq!(f.name, "Trains");
        assert_eq!(f.description, "A train set");
        assert_eq!(f.status, GrfStatus::Initialised);

        let mut h = Harness::new(LoadStage::Apply);
        h.run(INFO).unwrap();
        assert_eq!(h.file().status, GrfStatus::Activated);
    }

    #[test]
    fn duplicate_grfid_disables_the_file() {
        let mut h = Harness::new(LoadStage::Activation);
        h.registry.push(other(0x4142_4344));
        h.run(INFO).unwrap();
        assert_eq!(h.file().status, GrfStatus::Disabled);
        assert!(h.state.stop);
        assert!(h.diag.contains("already used"));
    }

    #[test]
    fn errors_wait_for_apply_unless_forced() {
        let mut h = Harness::new(LoadStage::Activation);
        h.run(b"\x0B\x01\x7F\x03\x00").unwrap();
        assert!(h.diag.entries().is_empty());

        h.run(b"\x0B\x81\x7F\x034\0").unwrap();
        assert_eq!(h.diag.entries()[0].message, "Invalid parameter 4.");
        assert_eq!(h.diag.entries()[0].severity, Severity::Warning);

        let mut h = Harness::new(LoadStage::Apply);
        h.run(b"\x0B\x02\x7F\xFFBroken: %s\0part\0").unwrap();
        assert_eq!(h.diag.entries()[0].message, "Broken: part");
        assert_eq!(h.file().status, GrfStatus::Initialised);
    }

    #[test]
    fn fatal_error_disables_the_file() {
        let mut h = Harness::new(LoadStage::Apply);
        h.run(b"\x0B\x03\x7F\x02DBSetXL\0").unwrap();
        assert_eq!(h.file().status, GrfStatus::Disabled);
        assert!(h.state.stop);
        assert!(h.diag.contains("Designed to be used with DBSetXL"));
    }

    #[test]
    fn inhibit_disables_other_files() {
        let mut h = Harness::new(LoadStage::Activation);
        h.registry.push(other(0x1111_1111));
        // Own GRFID is ignored.
        h.run(&[0x0E, 0x02, 0x11, 0x11, 0x11, 0x11, 0x01, 0x02, 0x03, 0x04])
            .unwrap();
        assert_eq!(h.registry[1].status, GrfStatus::Disabled);
        assert_eq!(h.file().status, GrfStatus::Initialised);
        assert!(h.diag.contains("other.grf"));
    }

    #[test]
    fn labels_record_stream_position() {
        let mut h = Harness::new(LoadStage::Reserve);
        h.stream = Cursor::new(vec![0; 16]);
        h.stream.seek(SeekFrom::Start(7)).unwrap();
        h.state.record = 4;
        h.run(&[0x10, 0x03, 0x00]).unwrap();
        assert_eq!(
            h.file().labels,
            vec![Label { id: 3, record: 4, position: 7 }]
        );
    }

    #[test]
    fn comments_are_ignored() {
        let mut h = Harness::new(LoadStage::Apply);
        h.run(b"\x0Chello").unwrap();
        assert!(h.diag.entries().is_empty());
    }
}
