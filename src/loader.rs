//! Three-stage load driver.
//!
//! Every configured file is walked once per [`LoadStage`], in load order:
//!
//! ```text
//! Reserve     all files             labels only
//! Activation  files not disabled    identity, skips, scratch product
//! Apply       initialised files     everything, for real
//! ```
//!
//! ## Record stream
//! ```text
//! <len W> <type B> <len bytes>     type 0xFF = pseudo-sprite
//! <00 00>                          end of file
//! ```
//! The first record must be a 4-byte pseudo-sprite holding the sprite count.
//!
//! A malformed pseudo-sprite only costs that record: the handler's error is
//! reported and the walk carries on. A missing file aborts the whole load.

use std::io::{ErrorKind, Read, Seek, SeekFrom};

use tracing::{debug, info, trace};

use crate::actions::{self, Context, FileState, Skip};
use crate::config::LoadConfig;
use crate::data::GameData;
use crate::diagnostics::Diagnostics;
use crate::registry::{FileRegistry, GrfFile, GrfStatus};
use crate::source::{FileProvider, NullSink, SpriteSink};
use crate::utils::{PSEUDO_SPRITE, RecordHeader, bytesv, le_u32, record_header, skip};
use crate::vars::{LoadStage, PatchFlags};
use crate::{Error, Result};

/// Label jumps allowed per file and stage.
const MAX_JUMPS: u32 = 0x1_0000;

/// Loads a set of NewGRFs and owns everything they produce.
pub struct Loader<P: FileProvider> {
    provider: P,
    config: LoadConfig,
    flags: PatchFlags,
    registry: FileRegistry,
    data: GameData,
    diag: Diagnostics,
}

impl<P: FileProvider> Loader<P> {
    pub fn new(provider: P, config: LoadConfig) -> Self {
        let flags = PatchFlags::from_settings(&config.settings);
        let data = GameData::new(config.settings.first_custom_sprite);
        Self {
            provider,
            config,
            flags,
            registry: FileRegistry::new(),
            data,
            diag: Diagnostics::new(),
        }
    }

    /// Run all three stages, discarding raw sprites.
    pub fn load(&mut self) -> Result<()> {
        self.load_with(&mut NullSink)
    }

    /// Run all three stages, handing raw sprites of the apply stage to `sink`.
    ///
    /// Everything a previous load produced is dropped first.
    pub fn load_with<S: SpriteSink + ?Sized>(&mut self, sink: &mut S) -> Result<()> {
        let first_sprite = self.config.settings.first_custom_sprite;
        self.registry.reset();
        self.data.reset(first_sprite);
        self.diag.clear();
        for entry in &self.config.files {
            self.registry.push(GrfFile::new(entry.path.as_str(), &entry.params));
        }

        for stage in LoadStage::ALL {
            if stage == LoadStage::Apply {
                // The activation scan only decided which files load.
                self.data.reset(first_sprite);
                self.registry.iter_mut().for_each(GrfFile::reset_product);
            }
            debug!(?stage, files = self.registry.len(), "load stage");
            for index in 0..self.registry.len() {
                if self.visits(index, stage) {
                    self.load_file(index, stage, sink)?;
                }
            }
        }

        let active = self.registry.iter().filter(|f| f.is_active()).count();
        info!(
            files = self.registry.len(),
            active,
            diagnostics = self.diag.entries().len(),
            "NewGRF load finished"
        );
        Ok(())
    }

    fn visits(&self, index: usize, stage: LoadStage) -> bool {
        let status = self.registry[index].status;
        match stage {
            LoadStage::Reserve => true,
            LoadStage::Activation => status != GrfStatus::Disabled,
            LoadStage::Apply => status == GrfStatus::Initialised,
        }
    }

    fn load_file<S: SpriteSink + ?Sized>(
        &mut self,
        index: usize,
        stage: LoadStage,
        sink: &mut S,
    ) -> Result<()> {
        let Self {
            provider,
            config,
            flags,
            registry,
            data,
            diag,
        } = self;

        let filename = registry[index].filename.clone();
        diag.set_location(&filename, 0);
        let mut stream = match provider.open(&filename) {
            Ok(stream) => stream,
            Err(e) => {
                diag.fatal(format!("Could not open NewGRF: {e}"));
                return Err(e);
            }
        };

        if let Err(e) = read_sprite_count(&mut stream) {
            match e {
                Error::InvalidContainer(_) => {
                    diag.error(e.to_string());
                    registry[index].status = GrfStatus::Disabled;
                    return Ok(());
                }
                _ => return Err(e),
            }
        }
        debug!(file = %filename, ?stage, "walking file");

        let mut state = FileState::default();
        let mut jumps = 0;
        while let Some(header) = record_header(&mut stream)? {
            state.record += 1;
            diag.set_record(state.record);
            let staged = state
                .staged
                .take()
                .filter(|staged| staged.record == state.record);

            if let Skip::Records(n) = state.skip {
                state.skip = if n > 1 { Skip::Records(n - 1) } else { Skip::None };
                skip(&mut stream, u64::from(header.len))?;
                if !header.is_pseudo() {
                    state.sprites.pop_front();
                }
                trace!(record = state.record, "record skipped");
                continue;
            }

            if !header.is_pseudo() {
                raw_sprite(&mut stream, &mut state, header, stage, sink)?;
                continue;
            }

            let Some(mut payload) = read_payload(&mut stream, header.len as usize)? else {
                diag.error("Unexpected end of file inside a pseudo-sprite");
                break;
            };
            if let Some(staged) = staged {
                payload = staged.data;
            }

            let mut ctx = Context {
                stage,
                settings: &config.settings,
                flags: &*flags,
                registry: &mut *registry,
                file: index,
                data: &mut *data,
                diag: &mut *diag,
                state: &mut state,
                stream: &mut stream,
            };
            match actions::dispatch(&mut ctx, &payload) {
                Ok(()) => {}
                Err(e @ Error::Io(_)) => return Err(e),
                Err(e) => diag.error(e.to_string()),
            }

            if state.stop || state.skip == Skip::ToEnd {
                break;
            }
            if let Some(label) = state.jump.take() {
                jumps += 1;
                if jumps > MAX_JUMPS {
                    diag.error("Too many label jumps, stopping the file");
                    break;
                }
                stream.seek(SeekFrom::Start(label.position))?;
                state.record = label.record;
                trace!(label = label.id, record = label.record, "jumped to label");
            }
        }
        Ok(())
    }

    pub fn config(&self) -> &LoadConfig {
        &self.config
    }

    pub fn registry(&self) -> &FileRegistry {
        &self.registry
    }

    pub fn data(&self) -> &GameData {
        &self.data
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diag
    }

    /// Hand over the loaded state.
    pub fn into_parts(self) -> (FileRegistry, GameData, Diagnostics) {
        (self.registry, self.data, self.diag)
    }
}

/// Read the header record holding the sprite count.
fn read_sprite_count<R: Read + ?Sized>(r: &mut R) -> Result<u32> {
    let bad = Error::InvalidContainer("file does not start with a sprite count");
    match record_header(r)? {
        Some(RecordHeader {
            len: 4,
            kind: PSEUDO_SPRITE,
        }) => match le_u32(r) {
            Ok(count) => Ok(count),
            Err(Error::Io(e)) if e.kind() == ErrorKind::UnexpectedEof => Err(bad),
            Err(e) => Err(e),
        },
        _ => Err(bad),
    }
}

/// Read a record payload; `None` if the stream ends first.
fn read_payload<R: Read + ?Sized>(r: &mut R, len: usize) -> Result<Option<Vec<u8>>> {
    match bytesv(r, len) {
        Ok(data) => Ok(Some(data)),
        Err(Error::Io(e)) if e.kind() == ErrorKind::UnexpectedEof => Ok(None),
        Err(e) => Err(e),
    }
}

fn raw_sprite<R: Read + Seek + ?Sized, S: SpriteSink + ?Sized>(
    stream: &mut R,
    state: &mut FileState,
    header: RecordHeader,
    stage: LoadStage,
    sink: &mut S,
) -> Result<()> {
    let Some(target) = state.sprites.pop_front() else {
        debug!(record = state.record, kind = header.kind, "raw sprite without destination");
        return skip(stream, u64::from(header.len));
    };
    if stage != LoadStage::Apply {
        return skip(stream, u64::from(header.len));
    }
    match read_payload(stream, header.len as usize)? {
        Some(data) => sink.sprite(target, header.kind, &data),
        None => debug!(?target, "raw sprite cut short by end of file"),
    }
    Ok(())
}
