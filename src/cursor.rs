//! Bounds-checked reader over one pseudo-sprite.
//!
//! Pseudo-sprites are small and fully buffered, so every decoder in
//! [`crate::actions`] and [`crate::features`] works on a [`ByteReader`]
//! borrowed from the record bytes. Reads never go past the end of the
//! buffer: they return [`Error::ReadBounds`] instead.
//!
//! ## Integer encodings
//! ```text
//! byte      1 byte
//! word      2 bytes LE
//! dword     4 bytes LE
//! extended  1 byte; 0xFF means a word follows and carries the value
//! ```

use crate::{Error, Result};

/// Cursor over a borrowed pseudo-sprite payload.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Offset of the next byte to be read.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Total length of the underlying record.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Bytes left between the cursor and the end of the record.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    #[inline]
    pub fn has_more(&self) -> bool {
        self.pos < self.data.len()
    }

    /// Fail with [`Error::ShortRecord`] unless at least `min_len` bytes remain.
    ///
    /// Call this before any loop whose trip count was read earlier in the
    /// same record.
    pub fn require(&self, min_len: usize, context: &'static str) -> Result<()> {
        if self.remaining() < min_len {
            return Err(Error::ShortRecord {
                context,
                wanted: min_len,
                available: self.remaining(),
            });
        }
        Ok(())
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self.pos.checked_add(n).ok_or(Error::ReadBounds)?;
        let slice = self.data.get(self.pos..end).ok_or(Error::ReadBounds)?;
        self.pos = end;
        Ok(slice)
    }

    #[inline]
    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    #[inline]
    pub fn read_u16(&mut self) -> Result<u16> {
        let b = self.take(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    #[inline]
    pub fn read_u32(&mut self) -> Result<u32> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Read a compact count: one byte, or a word when the byte is 0xFF.
    pub fn read_extended(&mut self) -> Result<u16> {
        match self.read_u8()? {
            0xFF => self.read_u16(),
            b => Ok(u16::from(b)),
        }
    }

    /// Read an operand of `width` bytes (1, 2 or 4).
    pub fn read_sized(&mut self, width: usize) -> Result<u32> {
        match width {
            1 => self.read_u8().map(u32::from),
            2 => self.read_u16().map(u32::from),
            4 => self.read_u32(),
            _ => Err(Error::ReadBounds),
        }
    }

    /// Borrow the next `n` bytes.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        self.take(n)
    }

    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.take(n).map(|_| ())
    }

    /// Read a NUL-terminated string.
    ///
    /// A missing terminator consumes the rest of the record.
    pub fn read_string(&mut self) -> String {
        let rest = &self.data[self.pos..];
        let (text, consumed) = match rest.iter().position(|&b| b == 0) {
            Some(end) => (&rest[..end], end + 1),
            None => (rest, rest.len()),
        };
        self.pos += consumed;
        String::from_utf8_lossy(text).into_owned()
    }

    /// Read four bytes as a short text label such as a currency symbol.
    pub fn read_dword_string(&mut self) -> Result<String> {
        let b = self.take(4)?;
        let end = b.iter().position(|&c| c == 0).unwrap_or(4);
        Ok(String::from_utf8_lossy(&b[..end]).into_owned())
    }

    /// Everything from the cursor to the end of the record.
    pub fn rest(&mut self) -> &'a [u8] {
        let rest = &self.data[self.pos..];
        self.pos = self.data.len();
        rest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_reads_are_little_endian() {
        let mut r = ByteReader::new(&[0x01, 0x34, 0x12, 0x78, 0x56, 0x34, 0x12]);
        assert_eq!(r.read_u8().unwrap(), 0x01);
        assert_eq!(r.read_u16().unwrap(), 0x1234);
        assert_eq!(r.read_u32().unwrap(), 0x1234_5678);
        assert!(!r.has_more());
    }

    #[test]
    fn extended_short_form() {
        let mut r = ByteReader::new(&[0x2A, 0xFE]);
        assert_eq!(r.read_extended().unwrap(), 0x2A);
        assert_eq!(r.read_extended().unwrap(), 0xFE);
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn extended_long_form() {
        let mut r = ByteReader::new(&[0xFF, 0x00, 0x01, 0xFF, 0xFF, 0x00]);
        assert_eq!(r.read_extended().unwrap(), 0x0100);
        // 0xFF escaped as a word.
        assert_eq!(r.read_extended().unwrap(), 0x00FF);
    }

    #[test]
    fn reads_never_pass_the_end() {
        let mut r = ByteReader::new(&[0xAA, 0xBB, 0xCC]);
        assert!(matches!(r.read_u32(), Err(Error::ReadBounds)));
        // A failed read does not move the cursor.
        assert_eq!(r.position(), 0);
        assert_eq!(r.read_u16().unwrap(), 0xBBAA);
        assert!(r.read_u16().is_err());
    }

    #[test]
    fn require_reports_context() {
        let r = ByteReader::new(&[0; 3]);
        assert!(r.require(3, "test").is_ok());
        match r.require(5, "SkipIf") {
            Err(Error::ShortRecord {
                context,
                wanted,
                available,
            }) => {
                assert_eq!(context, "SkipIf");
                assert_eq!(wanted, 5);
                assert_eq!(available, 3);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn strings_stop_at_nul() {
        let mut r = ByteReader::new(b"Hello\0World");
        assert_eq!(r.read_string(), "Hello");
        assert_eq!(r.read_string(), "World");
        assert!(!r.has_more());
    }

    #[test]
    fn sized_operands() {
        let mut r = ByteReader::new(&[0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07]);
        assert_eq!(r.read_sized(1).unwrap(), 0x01);
        assert_eq!(r.read_sized(2).unwrap(), 0x0302);
        assert_eq!(r.read_sized(4).unwrap(), 0x0706_0504);
        assert!(r.read_sized(3).is_err());
    }
}
