//! Builders for synthetic NewGRF streams.

#![allow(dead_code)]

use grfkit::config::LoadConfig;
use grfkit::loader::Loader;
use grfkit::source::MemoryFiles;

const PSEUDO: u8 = 0xFF;

/// One record of a GRF stream.
enum Record {
    Pseudo(Vec<u8>),
    Raw { kind: u8, data: Vec<u8> },
}

/// Builds the bytes of a NewGRF file, header record and terminator included.
#[derive(Default)]
pub struct GrfBuilder {
    records: Vec<Record>,
}

impl GrfBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pseudo(mut self, data: &[u8]) -> Self {
        self.records.push(Record::Pseudo(data.to_vec()));
        self
    }

    pub fn raw(mut self, kind: u8, data: &[u8]) -> Self {
        self.records.push(Record::Raw {
            kind,
            data: data.to_vec(),
        });
        self
    }

    /// Action 0x08 with format version 7.
    pub fn info(self, grfid: u32, name: &str) -> Self {
        let mut data = vec![0x08, 0x07];
        data.extend_from_slice(&grfid.to_le_bytes());
        data.extend_from_slice(name.as_bytes());
        data.extend_from_slice(&[0, 0]);
        self.pseudo(&data)
    }

    /// Action 0x0D: `target = op(src1, src2)` with an inline literal.
    pub fn param(self, target: u8, op: u8, src1: u8, src2: u8, value: u32) -> Self {
        let mut data = vec![0x0D, target, op, src1, src2];
        data.extend_from_slice(&value.to_le_bytes());
        self.pseudo(&data)
    }

    pub fn label(self, id: u8) -> Self {
        self.pseudo(&[0x10, id])
    }

    pub fn build(&self) -> Vec<u8> {
        let mut out = Vec::new();
        push_record(&mut out, PSEUDO, &(self.records.len() as u32).to_le_bytes());
        for record in &self.records {
            match record {
                Record::Pseudo(data) => push_record(&mut out, PSEUDO, data),
                Record::Raw { kind, data } => push_record(&mut out, *kind, data),
            }
        }
        out.extend_from_slice(&[0, 0]);
        out
    }
}

fn push_record(out: &mut Vec<u8>, kind: u8, data: &[u8]) {
    out.extend_from_slice(&(data.len() as u16).to_le_bytes());
    out.push(kind);
    out.extend_from_slice(data);
}

/// A loader over in-memory files, configured in the given order.
pub fn loader(files: &[(&str, Vec<u8>, &[u32])]) -> Loader<MemoryFiles> {
    let mut provider = MemoryFiles::new();
    let mut config = LoadConfig::default();
    for (name, bytes, params) in files {
        provider.insert(*name, bytes.clone());
        config = config.with_file(*name, params);
    }
    Loader::new(provider, config)
}

/// Load a single file with the given configured parameters.
pub fn load_one(grf: &GrfBuilder, params: &[u32]) -> Loader<MemoryFiles> {
    let mut l = loader(&[("test.grf", grf.build(), params)]);
    l.load().expect("load");
    l
}
