//! Loaded files, their parameters and goto labels.
//!
//! The registry owns every [`GrfFile`] for the lifetime of one load. Files
//! are keyed by position in the load order; lookups by GRFID serve the
//! cross-file features (parameter reads, activation tests, inhibition and
//! sound imports).

use std::collections::BTreeMap;
use std::ops::{Index, IndexMut};

use crate::features::station::StationSpec;
use crate::spritegroup::GroupId;

/// Number of parameter slots per file.
pub const MAX_PARAMS: usize = 0x80;

/// Number of local station ids per file.
pub const MAX_STATIONS: usize = 256;

/// Per-file parameter array with a high-water mark.
///
/// A parameter is *defined* when its index is below the mark. Reads of
/// undefined parameters yield 0.
#[derive(Debug, Clone)]
pub struct Parameters {
    values: [u32; MAX_PARAMS],
    end: usize,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            values: [0; MAX_PARAMS],
            end: 0,
        }
    }
}

impl Parameters {
    /// Build from externally configured values; extra values are dropped.
    pub fn from_configured(values: &[u32]) -> Self {
        let mut params = Self::default();
        let n = values.len().min(MAX_PARAMS);
        params.values[..n].copy_from_slice(&values[..n]);
        params.end = n;
        params
    }

    pub fn get(&self, index: usize) -> u32 {
        if index < self.end {
            self.values[index]
        } else {
            0
        }
    }

    pub fn is_defined(&self, index: usize) -> bool {
        index < self.end
    }

    /// Write a parameter and raise the high-water mark past it.
    pub fn set(&mut self, index: usize, value: u32) {
        if index >= MAX_PARAMS {
            return;
        }
        self.values[index] = value;
        self.end = self.end.max(index + 1);
    }

    /// One past the highest defined index.
    pub fn end(&self) -> usize {
        self.end
    }

    /// Defined values, in index order.
    pub fn defined(&self) -> &[u32] {
        &self.values[..self.end]
    }
}

/// Jump target recorded by a define-label record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Label {
    pub id: u8,
    /// Index of the label record itself.
    pub record: u32,
    /// Stream offset of the record that follows the label.
    pub position: u64,
}

/// Activation state of a file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GrfStatus {
    /// Identity not seen yet.
    #[default]
    Unknown,
    /// Identity seen during the activation scan; will be applied.
    Initialised,
    /// Identity seen during the apply stage.
    Activated,
    /// Turned off by a fatal error, inhibition or a bad header.
    Disabled,
}

/// Base sprite id and shape of the most recent sprite-set declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpriteSets {
    pub feature: u8,
    /// Custom sprite id of the first sprite of set 0.
    pub start: u32,
    pub num_sets: u16,
    /// Sprites per set (one per view).
    pub num_ents: u16,
}

impl SpriteSets {
    pub fn is_valid(&self, set: u16) -> bool {
        set < self.num_sets
    }

    /// First sprite id of `set`.
    pub fn sprite(&self, set: u16) -> u32 {
        self.start + u32::from(set) * u32::from(self.num_ents)
    }
}

/// One NewGRF being loaded.
#[derive(Debug, Clone)]
pub struct GrfFile {
    pub filename: String,
    /// Stable identity from the info record; 0 until it is seen.
    pub grfid: u32,
    /// Declared format version.
    pub version: u8,
    pub name: String,
    pub description: String,
    pub status: GrfStatus,
    /// Set when the file writes process-wide tuning state.
    pub is_unsafe: bool,
    pub params: Parameters,
    configured: Vec<u32>,
    pub labels: Vec<Label>,
    pub stations: Vec<Option<Box<StationSpec>>>,
    /// Group table indexed by the file's local group ids.
    pub spritegroups: Vec<Option<GroupId>>,
    pub spritesets: Option<SpriteSets>,
    /// Engines of the last non-override vehicle mapping.
    pub last_engines: Vec<u16>,
    /// Index of the file's first sound in the global sound table.
    pub sound_offset: usize,
    pub num_sounds: usize,
    /// Strings added with word-sized ids.
    pub generic_strings: BTreeMap<u16, String>,
    pub cargo_translation: Vec<u32>,
    pub railtype_translation: Vec<u32>,
}

impl GrfFile {
    pub fn new(filename: impl Into<String>, params: &[u32]) -> Self {
        Self {
            filename: filename.into(),
            grfid: 0,
            version: 0,
            name: String::new(),
            description: String::new(),
            status: GrfStatus::Unknown,
            is_unsafe: false,
            params: Parameters::from_configured(params),
            configured: params.iter().copied().take(MAX_PARAMS).collect(),
            labels: Vec::new(),
            stations: Vec::new(),
            spritegroups: Vec::new(),
            spritesets: None,
            last_engines: Vec::new(),
            sound_offset: 0,
            num_sounds: 0,
            generic_strings: BTreeMap::new(),
            cargo_translation: Vec::new(),
            railtype_translation: Vec::new(),
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.status, GrfStatus::Initialised | GrfStatus::Activated)
    }

    /// Find the jump target for label `id`.
    ///
    /// The first matching label after `after_record` wins; failing that, the
    /// first matching label in the file.
    pub fn label(&self, id: u8, after_record: u32) -> Option<Label> {
        let mut matching = self.labels.iter().filter(|l| l.id == id);
        let first = matching.clone().next().copied();
        matching
            .find(|l| l.record > after_record)
            .copied()
            .or(first)
    }

    pub fn station(&self, id: usize) -> Option<&StationSpec> {
        self.stations.get(id).and_then(|s| s.as_deref())
    }

    pub fn station_mut(&mut self, id: usize) -> Option<&mut StationSpec> {
        self.stations.get_mut(id).and_then(|s| s.as_deref_mut())
    }

    /// Allocate (or fetch) station `id`.
    pub fn station_or_insert(&mut self, id: usize) -> &mut StationSpec {
        if self.stations.len() <= id {
            self.stations.resize_with(id + 1, || None);
        }
        let grfid = self.grfid;
        self.stations[id].get_or_insert_with(|| Box::new(StationSpec::new(grfid, id as u8)))
    }

    /// Look up a group by local id.
    pub fn group(&self, id: u16) -> Option<GroupId> {
        self.spritegroups.get(id as usize).copied().flatten()
    }

    pub fn set_group(&mut self, id: u16, group: GroupId) {
        let id = id as usize;
        if self.spritegroups.len() <= id {
            self.spritegroups.resize(id + 1, None);
        }
        self.spritegroups[id] = Some(group);
    }

    /// Drop everything an apply pass builds, keeping identity, labels and
    /// configured parameters.
    pub fn reset_product(&mut self) {
        self.params = Parameters::from_configured(&self.configured);
        self.stations.clear();
        self.spritegroups.clear();
        self.spritesets = None;
        self.last_engines.clear();
        self.sound_offset = 0;
        self.num_sounds = 0;
        self.generic_strings.clear();
        self.cargo_translation.clear();
        self.railtype_translation.clear();
    }
}

/// All files of the current load, in load order.
#[derive(Debug, Default)]
pub struct FileRegistry {
    files: Vec<GrfFile>,
}

impl FileRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove every file and everything they own.
    pub fn reset(&mut self) {
        self.files.clear();
    }

    /// Register a file and return its index.
    pub fn push(&mut self, file: GrfFile) -> usize {
        self.files.push(file);
        self.files.len() - 1
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&GrfFile> {
        self.files.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut GrfFile> {
        self.files.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &GrfFile> {
        self.files.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut GrfFile> {
        self.files.iter_mut()
    }

    pub fn index_of_grfid(&self, grfid: u32) -> Option<usize> {
        self.files
            .iter()
            .position(|f| f.grfid == grfid && f.status != GrfStatus::Unknown)
    }

    pub fn by_grfid(&self, grfid: u32) -> Option<&GrfFile> {
        self.index_of_grfid(grfid).map(|i| &self.files[i])
    }

    pub fn by_filename(&self, filename: &str) -> Option<&GrfFile> {
        self.files.iter().find(|f| f.filename == filename)
    }

    /// Parameter `index` of the file identified by `grfid`.
    ///
    /// Unknown or inactive files read as 0.
    pub fn foreign_param(&self, grfid: u32, index: usize) -> u32 {
        match self.by_grfid(grfid) {
            Some(f) if f.is_active() => f.params.get(index),
            _ => 0,
        }
    }
}

impl Index<usize> for FileRegistry {
    type Output = GrfFile;

    fn index(&self, index: usize) -> &GrfFile {
        &self.files[index]
    }
}

impl IndexMut<usize> for FileRegistry {
    fn index_mut(&mut self, index: usize) -> &mut GrfFile {
        &mut self.files[index]
    }
}
