//! GIF stores variable-length payloads (image data, extension contents) as
//! a chain of sub-blocks: a length byte, that many data bytes, repeated
//! until a zero length byte closes the chain.

use crate::error::Result;
use crate::gif_reader::GifReader;

/// Presents a sub-block chain as one flat byte stream, hiding the length
/// prefixes from its consumer.
pub struct SubBlockReader<'r, 'a> {
    rdr : &'r mut GifReader<'a>,

    /// Data bytes left in the current sub-block.
    left : u8,

    /// Set once the zero-length terminator was consumed.
    done : bool,
}

impl<'r, 'a> SubBlockReader<'r, 'a> {
    pub fn new(rdr : &'r mut GifReader<'a>) -> SubBlockReader<'r, 'a> {
        SubBlockReader { rdr, left: 0, done: false }
    }

    /// Return the next data byte of the chain, or `None` once the chain's
    /// terminator was reached.
    pub fn next_byte(&mut self) -> Result<Option<u8>> {
        while self.left == 0 {
            if self.done {
                return Ok(None);
            }
            let len = self.rdr.read_u8()?;
            if len == 0 {
                self.done = true;
                return Ok(None);
            }
            self.left = len;
        }
        self.left -= 1;
        Ok(Some(self.rdr.read_u8()?))
    }

    /// Consume whatever remains of the chain, terminator included.
    pub fn skip_remaining(&mut self) -> Result<()> {
        if self.done {
            return Ok(());
        }
        self.rdr.skip_bytes(self.left as usize)?;
        self.left = 0;
        skip_sub_blocks(self.rdr)?;
        self.done = true;
        Ok(())
    }
}

/// Allows to skip sub-blocks when reached. You might want to do that when
/// reaching a part of the GIF buffer containing sub-blocks you don't care
/// for (e.g. comments).
pub fn skip_sub_blocks(rdr : &mut GifReader) -> Result<()> {
    loop {
        let size_of_block = rdr.read_u8()? as usize;
        if size_of_block == 0 {
            return Ok(());
        }
        rdr.skip_bytes(size_of_block)?;
    }
}

/// Consume a whole sub-block chain and return it verbatim - length
/// prefixes and terminator included - as a slice borrowed from the input
/// buffer. The chain is contiguous on the wire, so no copy is needed.
pub fn raw_sub_blocks<'a>(rdr : &mut GifReader<'a>) -> Result<&'a [u8]> {
    let start = rdr.pos();
    skip_sub_blocks(rdr)?;
    Ok(rdr.slice(start, rdr.pos()))
}
