//! Low-level stream primitives used by the record walker.
//!
//! Each function reads exactly the bytes it promises or returns an error -
//! there is no partial-read ambiguity. Pseudo-sprite payloads are decoded
//! with [`crate::cursor::ByteReader`] instead.

use std::io::{Read, Seek, SeekFrom};

use crate::Result;

/// Record type byte marking a pseudo-sprite.
pub const PSEUDO_SPRITE: u8 = 0xFF;

/// Read one byte.
#[inline]
pub(crate) fn u8<R: Read + ?Sized>(r: &mut R) -> Result<u8> {
    let mut b = [0u8; 1];
    r.read_exact(&mut b)?;
    Ok(b[0])
}

/// Read a little-endian `u32`.
#[inline]
pub(crate) fn le_u32<R: Read + ?Sized>(r: &mut R) -> Result<u32> {
    let mut b = [0u8; 4];
    r.read_exact(&mut b)?;
    Ok(u32::from_le_bytes(b))
}

/// Read exactly `len` bytes into a `Vec`.
#[inline]
pub(crate) fn bytesv<R: Read + ?Sized>(r: &mut R, len: usize) -> Result<Vec<u8>> {
    let mut b = vec![0u8; len];
    r.read_exact(&mut b)?;
    Ok(b)
}

/// Move forward `len` bytes without reading them.
#[inline]
pub(crate) fn skip<R: Seek + ?Sized>(r: &mut R, len: u64) -> Result<()> {
    r.seek(SeekFrom::Current(len as i64))?;
    Ok(())
}

/// Header of one record in the sprite stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RecordHeader {
    pub len: u16,
    pub kind: u8,
}

impl RecordHeader {
    #[inline]
    pub fn is_pseudo(&self) -> bool {
        self.kind == PSEUDO_SPRITE
    }
}

/// Read the next record header.
///
/// Returns `None` on the zero-length terminator. A stream that simply ends
/// is treated the same way.
pub(crate) fn record_header<R: Read + ?Sized>(r: &mut R) -> Result<Option<RecordHeader>> {
    let mut b = [0u8; 2];
    match r.read_exact(&mut b) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e.into()),
    }
    let len = u16::from_le_bytes(b);
    if len == 0 {
        return Ok(None);
    }
    let kind = u8(r)?;
    Ok(Some(RecordHeader { len, kind }))
}

/// Read the header and payload of the next record, then rewind to where the
/// stream was.
///
/// Returns `None` for raw sprites and the terminator, leaving the stream
/// untouched either way.
pub(crate) fn peek_pseudo_sprite<R: Read + Seek + ?Sized>(r: &mut R) -> Result<Option<Vec<u8>>> {
    let pos = r.stream_position()?;
    let data = match record_header(r)? {
        Some(header) if header.is_pseudo() => Some(bytesv(r, header.len as usize)?),
        _ => None,
    };
    r.seek(SeekFrom::Start(pos))?;
    Ok(data)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn header_terminator() {
        let mut c = Cursor::new(vec![0x00, 0x00, 0xFF]);
        assert_eq!(record_header(&mut c).unwrap(), None);
    }

    #[test]
    fn header_at_eof() {
        let mut c = Cursor::new(Vec::<u8>::new());
        assert_eq!(record_header(&mut c).unwrap(), None);
    }

    #[test]
    fn peek_rewinds() {
        let mut c = Cursor::new(vec![0x02, 0x00, 0xFF, 0x0C, 0x00]);
        let data = peek_pseudo_sprite(&mut c).unwrap();
        assert_eq!(data.as_deref(), Some(&[0x0C, 0x00][..]));
        assert_eq!(c.position(), 0);
    }

    #[test]
    fn peek_ignores_raw_sprites() {
        let mut c = Cursor::new(vec![0x03, 0x00, 0x01, 0xAA, 0xBB, 0xCC]);
        assert_eq!(peek_pseudo_sprite(&mut c).unwrap(), None);
        assert_eq!(c.position(), 0);
    }
}
