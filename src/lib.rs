//! Pull-style decoder for the core of animated GIF (87a/89a) files.
//!
//! Point [`decode`] at a buffer holding a GIF file and it walks the block
//! structure, inflates every image's LZW data and hands each frame - its
//! palette indices, rectangle, palette, transparency, timing, disposal
//! mode and interlace flag - to the [`FrameSink`] you provide. Application
//! extensions (NETSCAPE2.0 loop counts, XMP...) are passed through raw, at
//! the position they occupy in the stream.
//!
//! What you do with the frames is up to you: this crate does no
//! compositing, no RGB conversion, no interlace rearrangement, no timing
//! and no I/O. It only ever borrows the input buffer and sizes its few
//! working buffers through a pluggable [`Allocator`].
//!
//! Truncated files are handled at frame granularity: every frame that
//! decoded fully is delivered, and the returned [`DecodeSummary`] says
//! whether the trailer was reached. There is no seek table in a GIF, so
//! growing files are resumed by decoding again from the start with
//! `skip_frames` set to the number of frames already seen.

mod alloc;
mod color;
mod decoder;
mod error;
mod frame;
mod gif_reader;
mod header;
mod parser;
mod sub_blocks;

pub use crate::alloc::{Allocator, HeapAllocator};
pub use crate::color::Rgb;
pub use crate::error::{DecodeError, Result};
pub use crate::frame::{
    ApplicationExtension, DecodeSummary, DisposalMethod, FrameInfo, FrameSink,
};

use crate::gif_reader::GifReader;

/// The signature plus the Logical Screen Descriptor: the least a GIF
/// buffer can hold.
const MIN_GIF_LEN : usize = 13;

/// Decode the GIF file held in `data`, feeding `sink` one call per frame.
///
/// The first `skip_frames` decoded frames are swallowed silently (parsing
/// still runs through them); pass 0 to get every frame. The callbacks'
/// borrows die with each call - copy out what must outlive it.
///
/// An `Err` means nothing could be decoded at all. An `Ok` summary with
/// `complete` unset means the buffer stopped early: the delivered frames
/// stand, and a caller streaming a growing file can come back with a
/// longer buffer and `skip_frames` set to `frames_parsed`.
pub fn decode<S: FrameSink>(
    data : &[u8],
    sink : &mut S,
    skip_frames : usize
) -> Result<DecodeSummary> {
    decode_with_allocator(data, sink, skip_frames, &HeapAllocator)
}

/// [`decode`], with the working buffers managed by `allocator` instead of
/// the heap. Every buffer acquired during the call is released before it
/// returns, on every exit path.
pub fn decode_with_allocator<S: FrameSink, A: Allocator>(
    data : &[u8],
    sink : &mut S,
    skip_frames : usize,
    allocator : &A
) -> Result<DecodeSummary> {
    if data.len() < MIN_GIF_LEN {
        return Err(DecodeError::UnexpectedEndOfData { position: data.len() });
    }
    let mut rdr = GifReader::new(data);
    parser::run(&mut rdr, sink, skip_frames, allocator)
}
