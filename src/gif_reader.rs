use crate::error::{DecodeError, Result};

/// Struct helping with the parsing of the different values encountered in a
/// GIF buffer.
/// This struct provides methods to consume and parse the N next bytes into
/// the wanted "format" (e.g. u16, u8, raw slice...).
/// Every method checks that the requested bytes actually exist: a request
/// past the end of the buffer means the file was truncated, and the
/// resulting error aborts the decode that issued it.
pub struct GifReader<'a> {
    /// The complete GIF buffer.
    data : &'a [u8],

    /// Current position in the GIF buffer.
    pos : usize,
}

impl<'a> GifReader<'a> {
    /// Create a new GifReader over the given GIF buffer.
    pub fn new(data : &'a [u8]) -> GifReader<'a> {
        GifReader { data, pos: 0 }
    }

    /// Number of bytes left before the end of the buffer.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Get the next byte without consuming it.
    pub fn peek_u8(&self) -> Result<u8> {
        match self.data.get(self.pos) {
            Some(byte) => Ok(*byte),
            None => Err(self.end_of_data()),
        }
    }

    /// Get the next byte.
    pub fn read_u8(&mut self) -> Result<u8> {
        let byte = self.peek_u8()?;
        self.pos += 1;
        Ok(byte)
    }

    /// Get the next two bytes as an u16.
    /// GIF numbers are little-endian on the wire; they are assembled
    /// byte-by-byte so the host endianness never matters.
    pub fn read_u16(&mut self) -> Result<u16> {
        let bytes = self.read_bytes(2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    /// Return the next N bytes as a slice of u8, advancing past them.
    pub fn read_bytes(&mut self, nb_bytes : usize) -> Result<&'a [u8]> {
        if self.remaining() < nb_bytes {
            return Err(self.end_of_data());
        }
        let bytes = &self.data[self.pos..self.pos + nb_bytes];
        self.pos += nb_bytes;
        Ok(bytes)
    }

    /// Skip `nb_bytes` number of bytes.
    pub fn skip_bytes(&mut self, nb_bytes : usize) -> Result<()> {
        if self.remaining() < nb_bytes {
            return Err(self.end_of_data());
        }
        self.pos += nb_bytes;
        Ok(())
    }

    /// Get the GifReader's current position in the buffer.
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Re-borrow a range of the buffer that was already read.
    /// Used to hand sub-block chains to the caller without copying them.
    pub(crate) fn slice(&self, start : usize, end : usize) -> &'a [u8] {
        &self.data[start..end]
    }

    fn end_of_data(&self) -> DecodeError {
        DecodeError::UnexpectedEndOfData { position: self.pos }
    }
}
