use crate::alloc::{self, Allocator};
use crate::error::{DecodeError, Result};
use crate::gif_reader::GifReader;
use crate::sub_blocks::SubBlockReader;

/// Total number of codes a GIF LZW stream can address: codes are at most
/// 12 bits wide.
const MAX_TABLE_LEN : usize = 1 << 12;

/// One table entry. A code's string is its prefix code's string followed
/// by one more byte; literals are implicit and need no entry.
#[derive(Debug, Clone, Copy, Default)]
struct LzwEntry {
    prefix : u16,
    suffix : u8,
}

/// Decompress the LZW-compressed image data of a GIF buffer.
/// The table and the unwind stack are acquired once and reused for every
/// image of the decode call that owns this decoder.
pub struct LzwDecoder {
    table : Vec<LzwEntry>,
    stack : Vec<u8>,
}

impl LzwDecoder {
    pub fn new<A: Allocator>(allocator : &A) -> Result<LzwDecoder> {
        let table = alloc::acquire::<LzwEntry, A>(allocator, MAX_TABLE_LEN)?;
        let stack = match alloc::acquire::<u8, A>(allocator, MAX_TABLE_LEN) {
            Ok(stack) => stack,
            Err(e) => {
                allocator.release(table);
                return Err(e);
            }
        };
        Ok(LzwDecoder { table, stack })
    }

    /// Give the working buffers back to the allocator they came from.
    pub fn release<A: Allocator>(self, allocator : &A) {
        allocator.release(self.table);
        allocator.release(self.stack);
    }

    /// Decode one image's sub-block chain into `out`, returning the number
    /// of palette indices written.
    ///
    /// The chain is always consumed up to and including its terminator,
    /// even when `out` fills up early - any excess data is discarded. A
    /// short return value means the chain ended (END code or terminator)
    /// before the image was complete; deciding what to do with the partial
    /// image is the caller's call.
    pub fn decode_image(
        &mut self,
        rdr : &mut GifReader,
        min_code_size : u8,
        out : &mut [u8]
    ) -> Result<usize> {
        if min_code_size < 1 || min_code_size > 8 {
            return Err(DecodeError::InvalidMinimumCodeSize { size: min_code_size });
        }
        let clear_code : u16 = 1 << min_code_size;
        let end_code : u16 = clear_code + 1;

        let mut width = min_code_size + 1;
        let mut next_slot = end_code + 1;
        let mut prev : Option<u16> = None;
        let mut written : usize = 0;

        let mut blocks = SubBlockReader::new(rdr);

        // Codes are packed LSB-first across the byte boundaries of the
        // chain; `acc` accumulates whole bytes and codes are peeled off
        // its low end.
        let mut acc : u32 = 0;
        let mut nb_bits : u8 = 0;

        loop {
            if written == out.len() {
                blocks.skip_remaining()?;
                return Ok(written);
            }
            while nb_bits < width {
                match blocks.next_byte()? {
                    Some(byte) => {
                        acc |= u32::from(byte) << nb_bits;
                        nb_bits += 8;
                    }
                    // Chain closed without an END code: accept what was
                    // decoded so far.
                    None => return Ok(written),
                }
            }
            let code = (acc & ((1 << width) - 1)) as u16;
            acc >>= width;
            nb_bits -= width;

            if code == clear_code {
                width = min_code_size + 1;
                next_slot = end_code + 1;
                prev = None;
                continue;
            }
            if code == end_code {
                blocks.skip_remaining()?;
                return Ok(written);
            }

            let prev_code = match prev {
                // The first code of a stream (or after a clear) has no
                // previous string to combine with: it must be a literal.
                None => {
                    if code >= clear_code {
                        return Err(DecodeError::InvalidLzwCode { code });
                    }
                    out[written] = code as u8;
                    written += 1;
                    prev = Some(code);
                    continue;
                }
                Some(prev_code) => prev_code,
            };

            // A code one past the last assigned slot is the classic
            // "KwKwK" pattern: the string being defined is used before its
            // entry exists. Anything further out is corruption.
            if code > next_slot {
                return Err(DecodeError::InvalidLzwCode { code });
            }
            let kwkwk = code == next_slot;

            // Walk the prefix chain, collecting the string back-to-front.
            // Prefixes strictly decrease, so the walk ends at a literal
            // after at most `MAX_TABLE_LEN` steps and the stack cannot
            // overflow.
            let mut cur = if kwkwk { prev_code } else { code };
            let mut sp : usize = 0;
            while cur >= clear_code {
                let entry = self.table[cur as usize];
                self.stack[sp] = entry.suffix;
                sp += 1;
                cur = entry.prefix;
            }
            let first = cur as u8;

            written = push_pixel(out, written, first);
            while sp > 0 {
                sp -= 1;
                written = push_pixel(out, written, self.stack[sp]);
            }
            if kwkwk {
                written = push_pixel(out, written, first);
            }

            // New entry: the previous string extended with the first byte
            // of the one just emitted. Once the table is full, decoding
            // goes on without it until a CLEAR or the end of the stream.
            if next_slot < MAX_TABLE_LEN as u16 {
                self.table[next_slot as usize] = LzwEntry {
                    prefix: prev_code,
                    suffix: first,
                };
                next_slot += 1;
                if next_slot == (1 << width) && width < 12 {
                    width += 1;
                }
            }
            prev = Some(code);
        }
    }
}

fn push_pixel(out : &mut [u8], written : usize, value : u8) -> usize {
    if written < out.len() {
        out[written] = value;
        written + 1
    } else {
        written
    }
}
