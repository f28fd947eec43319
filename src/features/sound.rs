//! Sound effect table (feature 0x0C).
//!
//! The global table starts with the original samples. Files append their
//! own sounds through the sound-table action; properties address a file's
//! sounds by `ORIGINAL_SAMPLE_COUNT + local index`. Ids outside the file's
//! own table are rejected.
//!
//! ## Properties
//! ```text
//! 0x08  relative volume    B
//! 0x09  priority           B
//! 0x0A  override original  W  original sample id to replace
//! ```

use std::ops::Range;

use crate::Result;
use crate::cursor::ByteReader;
use crate::diagnostics::Diagnostics;
use crate::features::PropertyOutcome;

/// Number of samples shipped with the base game.
pub const ORIGINAL_SAMPLE_COUNT: usize = 73;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SoundSource {
    /// Sample `n` of the base game.
    Original(u16),
    /// Sample carried by a NewGRF.
    Embedded { name: String, data: Vec<u8> },
    /// Reserved slot whose block never arrived.
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoundEntry {
    pub source: SoundSource,
    pub volume: u8,
    pub priority: u8,
}

impl SoundEntry {
    pub fn new(source: SoundSource) -> Self {
        Self {
            source,
            volume: 128,
            priority: 0,
        }
    }
}

/// Table holding only the original samples.
pub fn original_sounds() -> Vec<SoundEntry> {
    (0..ORIGINAL_SAMPLE_COUNT as u16)
        .map(|id| SoundEntry::new(SoundSource::Original(id)))
        .collect()
}

/// Apply `prop` to the file's sounds `first..first + count`. The file's
/// own sounds occupy `own` in `sounds`.
pub fn change_info(
    sounds: &mut [SoundEntry],
    own: Range<usize>,
    first: usize,
    count: usize,
    prop: u8,
    buf: &mut ByteReader<'_>,
    diag: &mut Diagnostics,
) -> Result<PropertyOutcome> {
    let width = match prop {
        0x08 | 0x09 => 1,
        0x0A => 2,
        _ => return Ok(PropertyOutcome::Unknown),
    };
    buf.require(count * width, "SoundEffectChangeInfo")?;

    for id in first..first + count {
        let slot = id
            .checked_sub(ORIGINAL_SAMPLE_COUNT)
            .map(|local| own.start + local)
            .filter(|&slot| own.contains(&slot) && slot < sounds.len());
        let Some(slot) = slot else {
            diag.warn(format!(
                "Attempt to change undefined sound effect ({id}), ignoring"
            ));
            buf.skip(width)?;
            continue;
        };

        match prop {
            0x08 => sounds[slot].volume = buf.read_u8()?,
            0x09 => sounds[slot].priority = buf.read_u8()?,
            _ => {
                let original = buf.read_u16()? as usize;
                if original >= ORIGINAL_SAMPLE_COUNT {
                    diag.warn(format!(
                        "Sound effect override {original} is not an original sample, ignoring"
                    ));
                } else {
                    // The original slot takes over the new sample.
                    sounds[original] = sounds[slot].clone();
                }
            }
        }
    }
    Ok(PropertyOutcome::Applied)
}
