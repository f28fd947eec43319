//! Pseudo-sprite handlers.
//!
//! Byte 0 of a pseudo-sprite selects the action. Every handler has the same
//! shape: it receives the [`Context`] of the file being walked and a
//! [`ByteReader`] positioned after the action byte, and returns `Err` only
//! for a malformed record. The loader reports such errors and moves on to
//! the next record.
//!
//! ## Actions
//!
//! | Id   | Module          | Meaning |
//! |------|-----------------|---------|
//! | 0x00 | [`change_info`] | Property overrides |
//! | 0x01 | [`sprites`]     | Sprite set declaration |
//! | 0x02 | [`groups`]      | Sprite group definition |
//! | 0x03 | [`mapping`]     | Entity to group mapping |
//! | 0x04 | [`names`]       | Names and generic strings |
//! | 0x05 | [`sprites`]     | New graphics block |
//! | 0x06 | [`cfg_apply`]   | Patch the next record with parameters |
//! | 0x07 | [`skip_if`]     | Conditional skip |
//! | 0x08 | [`info`]        | File identity |
//! | 0x09 | [`skip_if`]     | Conditional skip |
//! | 0x0A | [`sprites`]     | Base sprite replacement |
//! | 0x0B | [`info`]        | Error / message |
//! | 0x0C | [`info`]        | Comment |
//! | 0x0D | [`param_set`]   | Parameter computation |
//! | 0x0E | [`info`]        | Inhibit other files |
//! | 0x10 | [`info`]        | Define label |
//! | 0x11 | [`sounds`]      | Sound table |
//! | 0xFE | [`sounds`]      | Sound import block |
//! | 0xFF | [`sounds`]      | Embedded sound block |
//!
//! ## Stages
//! ```text
//! Reserve     0x10
//! Activation  0x00-0x05, 0x07-0x0C, 0x0E, 0x11, 0xFE, 0xFF
//! Apply       Activation + 0x06, 0x0D
//! ```

pub mod cfg_apply;
pub mod change_info;
pub mod groups;
pub mod info;
pub mod mapping;
pub mod names;
pub mod param_set;
pub mod skip_if;
pub mod sounds;
pub mod sprites;

use tracing::{debug, trace};

use crate::Result;
use crate::config::GameSettings;
use crate::cursor::ByteReader;
use crate::data::GameData;
use crate::diagnostics::Diagnostics;
use crate::registry::{FileRegistry, GrfFile, GrfStatus, Label};
use crate::source::{ReadSeek, SpriteQueue};
use crate::vars::{LoadStage, PatchFlags, VarEnv, resolve_variable};

/// Handler of one action.
pub type Handler = fn(&mut Context<'_>, &mut ByteReader<'_>) -> Result<()>;

const HANDLERS: [Option<Handler>; 0x12] = [
    Some(change_info::feature_change_info),
    Some(sprites::new_sprite_set),
    Some(groups::new_sprite_group),
    Some(mapping::map_sprite_groups),
    Some(names::new_names),
    Some(sprites::new_graphics),
    Some(cfg_apply::cfg_apply),
    Some(skip_if::skip_if),
    Some(info::grf_info),
    Some(skip_if::skip_if),
    Some(sprites::sprite_replace),
    Some(info::grf_error),
    Some(info::grf_comment),
    Some(param_set::param_set),
    Some(info::grf_inhibit),
    // 0x0F: town names.
    None,
    Some(info::define_label),
    Some(sounds::sound_table),
];

const fn mask(actions: &[u8]) -> u32 {
    let mut mask = 0;
    let mut i = 0;
    while i < actions.len() {
        mask |= 1 << actions[i];
        i += 1;
    }
    mask
}

const RESERVE_ACTIONS: u32 = mask(&[0x10]);
const ACTIVATION_ACTIONS: u32 = mask(&[
    0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x07, 0x08, 0x09, 0x0A, 0x0B, 0x0C, 0x0E, 0x11,
]);
const APPLY_ACTIONS: u32 = ACTIVATION_ACTIONS | mask(&[0x06, 0x0D]);

/// Action id of an embedded content block.
pub const BINARY_BLOCK: u8 = 0xFF;

/// Action id of an import block.
pub const IMPORT_BLOCK: u8 = 0xFE;

/// Whether `action` runs during `stage`.
pub fn stage_allows(stage: LoadStage, action: u8) -> bool {
    if action >= IMPORT_BLOCK {
        return stage != LoadStage::Reserve;
    }
    let mask = match stage {
        LoadStage::Reserve => RESERVE_ACTIONS,
        LoadStage::Activation => ACTIVATION_ACTIONS,
        LoadStage::Apply => APPLY_ACTIONS,
    };
    action < 32 && mask & (1 << action) != 0
}

/// Pending skip set by a conditional skip.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Skip {
    #[default]
    None,
    /// Discard this many records.
    Records(u32),
    /// Discard the rest of the file.
    ToEnd,
}

/// Bytes of the next record, already patched with parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedRecord {
    /// Record index the bytes belong to.
    pub record: u32,
    pub data: Vec<u8>,
}

/// Walk state of the file being decoded, reset for every file and stage.
#[derive(Debug, Default)]
pub struct FileState {
    /// Index of the record being dispatched.
    pub record: u32,
    pub skip: Skip,
    /// Label to continue from after the current record.
    pub jump: Option<Label>,
    /// Destinations of the raw sprites that follow.
    pub sprites: SpriteQueue,
    /// Sound blocks still expected by the last sound table.
    pub pending_sounds: usize,
    pub staged: Option<StagedRecord>,
    /// Stop processing the file after the current record.
    pub stop: bool,
}

/// Everything a handler may read or change.
pub struct Context<'a> {
    pub stage: LoadStage,
    pub settings: &'a GameSettings,
    pub flags: &'a PatchFlags,
    pub registry: &'a mut FileRegistry,
    /// Index of the current file in the registry.
    pub file: usize,
    pub data: &'a mut GameData,
    pub diag: &'a mut Diagnostics,
    pub state: &'a mut FileState,
    /// Stream of the current file, positioned after the current record.
    pub stream: &'a mut dyn ReadSeek,
}

impl Context<'_> {
    pub fn file(&self) -> &GrfFile {
        &self.registry[self.file]
    }

    pub fn file_mut(&mut self) -> &mut GrfFile {
        &mut self.registry[self.file]
    }

    /// Resolve a parameter or variable selector against the current file.
    pub fn variable(&mut self, id: u8, cond: Option<&mut u32>) -> u32 {
        let env = VarEnv {
            settings: self.settings,
            flags: self.flags,
            tuning: &self.data.tuning,
            stage: self.stage,
            params: &self.registry[self.file].params,
        };
        resolve_variable(id, cond, &env, self.diag)
    }

    /// Stop walking the current file.
    pub fn disable_file(&mut self) {
        self.file_mut().status = GrfStatus::Disabled;
        self.state.stop = true;
    }
}

/// Route one pseudo-sprite to its handler.
pub fn dispatch(ctx: &mut Context<'_>, data: &[u8]) -> Result<()> {
    let mut buf = ByteReader::new(data);
    let action = buf.read_u8()?;

    if action < IMPORT_BLOCK && action as usize >= HANDLERS.len() {
        if ctx.stage == LoadStage::Apply {
            ctx.diag.notice(format!("Unknown action 0x{action:02X}, skipping"));
        } else {
            debug!(action, "skipping unknown action");
        }
        return Ok(());
    }

    if !stage_allows(ctx.stage, action) {
        trace!(action, stage = ?ctx.stage, "skipping action in this stage");
        return Ok(());
    }

    match action {
        BINARY_BLOCK => sounds::binary_block(ctx, &mut buf),
        IMPORT_BLOCK => sounds::import_block(ctx, &mut buf),
        _ => match HANDLERS[action as usize] {
            Some(handler) => {
                trace!(action, stage = ?ctx.stage, "handling action");
                handler(ctx, &mut buf)
            }
            None => {
                debug!(action, "skipping unsupported action");
                Ok(())
            }
        },
    }
}

/// Shared scaffolding for handler tests.
#[cfg(test)]
pub(crate) mod testing {
    use std::io::Cursor;

    use super::*;

    pub struct Harness {
        pub stage: LoadStage,
        pub settings: GameSettings,
        pub flags: PatchFlags,
        pub registry: FileRegistry,
        pub data: GameData,
        pub diag: Diagnostics,
        pub state: FileState,
        pub stream: Cursor<Vec<u8>>,
        pub file: usize,
    }

    impl Harness {
        pub fn new(stage: LoadStage) -> Self {
            let settings = GameSettings::default();
            let mut registry = FileRegistry::new();
            let mut file = GrfFile::new("test.grf", &[]);
            file.grfid = 0x0403_0201;
            file.version = 7;
            file.status = GrfStatus::Initialised;
            let index = registry.push(file);
            Self {
                stage,
                flags: PatchFlags::from_settings(&settings),
                data: GameData::new(settings.first_custom_sprite),
                settings,
                registry,
                diag: Diagnostics::new(),
                state: FileState::default(),
                stream: Cursor::new(Vec::new()),
                file: index,
            }
        }

        pub fn file(&self) -> &GrfFile {
            &self.registry[self.file]
        }

        pub fn file_mut(&mut self) -> &mut GrfFile {
            &mut self.registry[self.file]
        }

        /// Dispatch `record` (action byte included).
        pub fn run(&mut self, record: &[u8]) -> Result<()> {
            let mut ctx = Context {
                stage: self.stage,
                settings: &self.settings,
                flags: &self.flags,
                registry: &mut self.registry,
                file: self.file,
                data: &mut self.data,
                diag: &mut self.diag,
                state: &mut self.state,
                stream: &mut self.stream,
            };
            dispatch(&mut ctx, record)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::Harness;
    use super::*;

    #[test]
    fn stage_masks() {
        assert!(stage_allows(LoadStage::Reserve, 0x10));
        assert!(!stage_allows(LoadStage::Reserve, 0x00));
        assert!(!stage_allows(LoadStage::Reserve, BINARY_BLOCK));

        assert!(stage_allows(LoadStage::Activation, 0x08));
        assert!(!stage_allows(LoadStage::Activation, 0x06));
        assert!(!stage_allows(LoadStage::Activation, 0x0D));
        assert!(!stage_allows(LoadStage::Activation, 0x10));

        assert!(stage_allows(LoadStage::Apply, 0x06));
        assert!(stage_allows(LoadStage::Apply, 0x0D));
        assert!(stage_allows(LoadStage::Apply, IMPORT_BLOCK));
        assert!(!stage_allows(LoadStage::Apply, 0x12));
    }

    #[test]
    fn masked_actions_do_nothing() {
        let mut h = Harness::new(LoadStage::Activation);
        // Parameter 0 = 5, ignored outside the apply stage.
        h.run(&[0x0D, 0x00, 0x00, 0xFF, 0x00, 5, 0, 0, 0]).unwrap();
        assert_eq!(h.file().params.end(), 0);
    }

    #[test]
    fn unknown_actions_are_reported() {
        let mut h = Harness::new(LoadStage::Apply);
        h.run(&[0x0F, 0x00]).unwrap();
        assert!(h.diag.entries().is_empty());
        h.run(&[0x13]).unwrap();
        assert!(h.diag.contains("Unknown action 0x13"));
    }

    #[test]
    fn empty_record_is_an_error() {
        let mut h = Harness::new(LoadStage::Apply);
        assert!(h.run(&[]).is_err());
    }
}
