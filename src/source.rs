//! Collaborators at the edges of the loader: where file bytes come from and
//! where raw sprites go.

use std::collections::{HashMap, VecDeque};
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::PathBuf;

use crate::{Error, Result};

/// Seekable byte stream, object-safe.
pub trait ReadSeek: Read + Seek {}

impl<T: Read + Seek> ReadSeek for T {}

/// Opens configured NewGRF files by name.
pub trait FileProvider {
    type Reader: Read + Seek;

    /// Open `name`, failing with [`Error::MissingFile`] if it is absent.
    fn open(&self, name: &str) -> Result<Self::Reader>;
}

/// Files below a directory on disk.
#[derive(Debug, Clone)]
pub struct DiskFiles {
    root: PathBuf,
}

impl DiskFiles {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl FileProvider for DiskFiles {
    type Reader = BufReader<File>;

    fn open(&self, name: &str) -> Result<Self::Reader> {
        let path = self.root.join(name);
        match File::open(&path) {
            Ok(file) => Ok(BufReader::new(file)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(Error::MissingFile(path)),
            Err(e) => Err(e.into()),
        }
    }
}

/// Files held in memory, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct MemoryFiles {
    files: HashMap<String, Vec<u8>>,
}

impl MemoryFiles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, data: Vec<u8>) {
        self.files.insert(name.into(), data);
    }

    pub fn with(mut self, name: impl Into<String>, data: Vec<u8>) -> Self {
        self.insert(name, data);
        self
    }
}

impl FileProvider for MemoryFiles {
    type Reader = Cursor<Vec<u8>>;

    fn open(&self, name: &str) -> Result<Self::Reader> {
        self.files
            .get(name)
            .map(|data| Cursor::new(data.clone()))
            .ok_or_else(|| Error::MissingFile(PathBuf::from(name)))
    }
}

/// Where a raw sprite that follows a sprite-declaring record belongs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpriteTarget {
    /// Custom sprite of a sprite set.
    Custom(u32),
    /// Sprite `index` of a new-graphics block of type `kind`.
    Graphics { kind: u8, index: u16 },
    /// Replacement for base-game sprite `id`.
    Replace(u16),
}

impl SpriteTarget {
    /// The destination `n` places after this one.
    fn advance(self, n: u32) -> Self {
        match self {
            SpriteTarget::Custom(id) => SpriteTarget::Custom(id.wrapping_add(n)),
            SpriteTarget::Graphics { kind, index } => SpriteTarget::Graphics {
                kind,
                index: index.wrapping_add(n as u16),
            },
            SpriteTarget::Replace(id) => SpriteTarget::Replace(id.wrapping_add(n as u16)),
        }
    }
}

/// Consecutive destinations announced by one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SpriteRun {
    first: SpriteTarget,
    len: u32,
}

/// Destinations of the raw sprites that follow, in arrival order.
///
/// Each announcement is one run, expanded a target at a time as raw
/// sprites arrive.
#[derive(Debug, Clone, Default)]
pub struct SpriteQueue {
    runs: VecDeque<SpriteRun>,
}

impl SpriteQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `len` destinations starting at `first`.
    pub fn push_run(&mut self, first: SpriteTarget, len: u32) {
        if len > 0 {
            self.runs.push_back(SpriteRun { first, len });
        }
    }

    pub fn pop_front(&mut self) -> Option<SpriteTarget> {
        let run = self.runs.front_mut()?;
        let target = run.first;
        run.first = target.advance(1);
        run.len -= 1;
        if run.len == 0 {
            self.runs.pop_front();
        }
        Some(target)
    }

    /// Number of queued destinations.
    pub fn len(&self) -> u64 {
        self.runs.iter().map(|r| u64::from(r.len)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Number of stored runs.
    pub fn runs(&self) -> usize {
        self.runs.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = SpriteTarget> + '_ {
        self.runs
            .iter()
            .flat_map(|r| (0..r.len).map(move |i| r.first.advance(i)))
    }

    pub fn back(&self) -> Option<SpriteTarget> {
        self.runs.back().map(|r| r.first.advance(r.len - 1))
    }
}

/// Receives raw sprite blocks. Decoding pixels is the sink's business.
pub trait SpriteSink {
    /// `kind` is the record type byte, `data` the undecoded payload.
    fn sprite(&mut self, target: SpriteTarget, kind: u8, data: &[u8]);
}

/// Discards every sprite.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl SpriteSink for NullSink {
    fn sprite(&mut self, _target: SpriteTarget, _kind: u8, _data: &[u8]) {}
}

/// A sprite kept by a [`Vec`] sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedSprite {
    pub target: SpriteTarget,
    pub kind: u8,
    pub data: Vec<u8>,
}

impl SpriteSink for Vec<LoadedSprite> {
    fn sprite(&mut self, target: SpriteTarget, kind: u8, data: &[u8]) {
        self.push(LoadedSprite {
            target,
            kind,
            data: data.to_vec(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_files_open_copies() {
        let files = MemoryFiles::new().with("a.grf", vec![1, 2, 3]);
        let mut r = files.open("a.grf").unwrap();
        let mut out = Vec::new();
        r.read_to_end(&mut out).unwrap();
        assert_eq!(out, [1, 2, 3]);
    }

    #[test]
    fn missing_files_are_reported_by_name() {
        let files = MemoryFiles::new();
        match files.open("b.grf") {
            Err(Error::MissingFile(path)) => assert_eq!(path, PathBuf::from("b.grf")),
            other => panic!("unexpected {other:?}"),
        }
        let disk = DiskFiles::new("/nonexistent-grf-root");
        assert!(matches!(disk.open("b.grf"), Err(Error::MissingFile(_))));
    }

    #[test]
    fn queue_expands_runs_in_order() {
        let mut q = SpriteQueue::new();
        q.push_run(SpriteTarget::Custom(0x4000), 2);
        q.push_run(SpriteTarget::Replace(7), 0);
        q.push_run(SpriteTarget::Replace(0xFFFF), 2);
        assert_eq!(q.len(), 4);
        assert_eq!(q.runs(), 2);
        assert_eq!(q.back(), Some(SpriteTarget::Replace(0)));

        let popped: Vec<_> = std::iter::from_fn(|| q.pop_front()).collect();
        assert_eq!(
            popped,
            vec![
                SpriteTarget::Custom(0x4000),
                SpriteTarget::Custom(0x4001),
                SpriteTarget::Replace(0xFFFF),
                SpriteTarget::Replace(0),
            ]
        );
        assert!(q.is_empty());
    }
}
