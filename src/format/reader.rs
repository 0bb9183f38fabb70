//! Low-level binary reading utilities.
//!
//! [`BinaryReader`] reads fixed-width integers and length-prefixed or
//! NUL-terminated strings from any seekable stream. The detector uses it to
//! sniff signatures and to capture input that is not a ZIP archive.

use std::io::{self, Read, Seek, SeekFrom};

/// Byte order used for multi-byte integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ByteOrder {
    /// Least significant byte first.
    #[default]
    LittleEndian,
    /// Most significant byte first.
    BigEndian,
}

/// Reads fixed-width fields from a seekable stream at arbitrary positions.
///
/// # Example
///
/// ```rust
/// use std::io::Cursor;
/// use z21cfg::format::reader::{BinaryReader, ByteOrder};
///
/// let mut reader = BinaryReader::new(Cursor::new(vec![0x34, 0x12, 0xFF]));
/// assert_eq!(reader.read_u16().unwrap(), 0x1234);
/// assert_eq!(reader.remaining().unwrap(), 1);
///
/// let mut reader = BinaryReader::with_byte_order(Cursor::new(vec![0x12, 0x34]), ByteOrder::BigEndian);
/// assert_eq!(reader.read_u16().unwrap(), 0x1234);
/// ```
#[derive(Debug)]
pub struct BinaryReader<R> {
    inner: R,
    order: ByteOrder,
}

impl<R: Read + Seek> BinaryReader<R> {
    /// Creates a little-endian reader.
    pub fn new(inner: R) -> Self {
        Self::with_byte_order(inner, ByteOrder::LittleEndian)
    }

    /// Creates a reader with an explicit byte order.
    pub fn with_byte_order(inner: R, order: ByteOrder) -> Self {
        Self { inner, order }
    }

    /// Returns the configured byte order.
    pub fn byte_order(&self) -> ByteOrder {
        self.order
    }

    /// Reads exactly `count` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`io::ErrorKind::UnexpectedEof`] if fewer bytes remain.
    pub fn read_bytes(&mut self, count: usize) -> io::Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(count.min(crate::READ_BUFFER_SIZE));
        let read = (&mut self.inner).take(count as u64).read_to_end(&mut buf)?;
        if read < count {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("expected {} bytes, got {}", count, read),
            ));
        }
        Ok(buf)
    }

    fn read_array<const N: usize>(&mut self) -> io::Result<[u8; N]> {
        let mut buf = [0u8; N];
        self.inner.read_exact(&mut buf)?;
        Ok(buf)
    }

    /// Reads an unsigned 8-bit integer.
    pub fn read_u8(&mut self) -> io::Result<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    /// Reads a signed 8-bit integer.
    pub fn read_i8(&mut self) -> io::Result<i8> {
        Ok(self.read_u8()? as i8)
    }

    /// Reads an unsigned 16-bit integer.
    pub fn read_u16(&mut self) -> io::Result<u16> {
        let b = self.read_array::<2>()?;
        Ok(match self.order {
            ByteOrder::LittleEndian => u16::from_le_bytes(b),
            ByteOrder::BigEndian => u16::from_be_bytes(b),
        })
    }

    /// Reads a signed 16-bit integer.
    pub fn read_i16(&mut self) -> io::Result<i16> {
        Ok(self.read_u16()? as i16)
    }

    /// Reads an unsigned 32-bit integer.
    pub fn read_u32(&mut self) -> io::Result<u32> {
        let b = self.read_array::<4>()?;
        Ok(match self.order {
            ByteOrder::LittleEndian => u32::from_le_bytes(b),
            ByteOrder::BigEndian => u32::from_be_bytes(b),
        })
    }

    /// Reads a signed 32-bit integer.
    pub fn read_i32(&mut self) -> io::Result<i32> {
        Ok(self.read_u32()? as i32)
    }

    /// Reads a fixed-length string, stripping trailing NUL padding.
    ///
    /// Invalid UTF-8 sequences are dropped.
    pub fn read_string(&mut self, length: usize) -> io::Result<String> {
        let mut data = self.read_bytes(length)?;
        while data.last() == Some(&0) {
            data.pop();
        }
        Ok(decode_dropping_invalid(&data))
    }

    /// Reads a NUL-terminated string of at most `max_length` bytes.
    ///
    /// The terminator is consumed but not returned. If no terminator is found
    /// within `max_length` bytes, the bytes read so far are returned.
    pub fn read_null_terminated_string(&mut self, max_length: usize) -> io::Result<String> {
        let mut data = Vec::new();
        for _ in 0..max_length {
            let byte = self.read_u8()?;
            if byte == 0 {
                break;
            }
            data.push(byte);
        }
        Ok(decode_dropping_invalid(&data))
    }

    /// Returns the current stream position.
    pub fn position(&mut self) -> io::Result<u64> {
        self.inner.stream_position()
    }

    /// Seeks to a position in the stream.
    pub fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.inner.seek(pos)
    }

    /// Reads `count` bytes without advancing the position.
    pub fn peek(&mut self, count: usize) -> io::Result<Vec<u8>> {
        let pos = self.position()?;
        let result = self.read_bytes(count);
        self.inner.seek(SeekFrom::Start(pos))?;
        result
    }

    /// Returns the total length of the stream. The position is unchanged.
    pub fn len(&mut self) -> io::Result<u64> {
        let pos = self.position()?;
        let end = self.inner.seek(SeekFrom::End(0))?;
        self.inner.seek(SeekFrom::Start(pos))?;
        Ok(end)
    }

    /// Returns `true` if the stream is empty.
    pub fn is_empty(&mut self) -> io::Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Returns the number of bytes between the current position and the end.
    pub fn remaining(&mut self) -> io::Result<u64> {
        let pos = self.position()?;
        Ok(self.len()?.saturating_sub(pos))
    }

    /// Consumes the reader, returning the underlying stream.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

/// Decodes UTF-8, dropping invalid sequences instead of substituting them.
pub(crate) fn decode_dropping_invalid(data: &[u8]) -> String {
    match std::str::from_utf8(data) {
        Ok(s) => s.to_string(),
        Err(_) => {
            let mut out = String::with_capacity(data.len());
            for chunk in data.utf8_chunks() {
                out.push_str(chunk.valid());
            }
            out
        }
    }
}
