use std::convert::TryFrom;
use std::mem;

use log::{debug, warn};

use crate::alloc::{self, Allocator};
use crate::color::{self, Rgb};
use crate::decoder::LzwDecoder;
use crate::error::{DecodeError, Result};
use crate::frame::{
    ApplicationExtension, DecodeSummary, DisposalMethod, FrameInfo, FrameSink,
};
use crate::gif_reader::GifReader;
use crate::header::{self, GifHeader};
use crate::sub_blocks;

/// GIF block ID for the "Image Descriptor".
const IMAGE_DESCRIPTOR_BLOCK_ID : u8 = 0x2C;

/// GIF block ID for the "Trailer".
const TRAILER_BLOCK_ID : u8 = 0x3B;

/// GIF block ID for the "Extension Introducer".
const EXTENSION_INTRODUCER_ID : u8 = 0x21;

/// GIF block ID for the "Graphic Control Extension".
const GRAPHIC_CONTROL_EXTENSION_LABEL : u8 = 0xF9;

/// GIF block ID for an "Application Extension".
const APPLICATION_EXTENSION_LABEL : u8 = 0xFF;

/// GIF block ID for a "Comment Extension".
const COMMENT_EXTENSION_LABEL : u8 = 0xFE;

/// GIF block ID for a "Plain Text Extension".
const PLAIN_TEXT_EXTENSION_LABEL : u8 = 0x01;

/// Parse the whole buffer behind `rdr`, feeding `sink`.
/// The preamble must parse for the call to return a summary at all; past
/// it, whatever stops the parsing loop is folded into the summary so that
/// the frames already delivered stand.
pub(crate) fn run<S: FrameSink, A: Allocator>(
    rdr : &mut GifReader,
    sink : &mut S,
    skip_frames : usize,
    allocator : &A
) -> Result<DecodeSummary> {
    let header = header::parse_header(rdr, allocator)?;
    debug!(
        "logical screen {}x{}, background color {}, aspect ratio byte {}",
        header.width, header.height,
        header.background_color_index, header.pixel_aspect_ratio
    );
    let session = DecodeSession::new(header, allocator)?;
    session.run(rdr, sink, skip_frames)
}

/// Value of a parsed Graphic Control Extension from a GIF buffer.
/// Its fields apply to the image following it.
#[derive(Debug)]
struct GraphicControlExtension {
    disposal_method : DisposalMethod,

    /// The index of the color to treat as transparent, present if and only
    /// if the Transparency Flag was set.
    transparent_color_index : Option<u8>,

    /// Time to wait before processing goes on, in hundredths of a second.
    delay : u16,
}

/// All the state of one decode call. Dropped - with its buffers given back
/// to the allocator - before the call returns, whatever the exit path.
struct DecodeSession<'alloc, A: Allocator> {
    allocator : &'alloc A,
    screen_width : u16,
    screen_height : u16,
    background_color_index : u8,
    global_color_table : Option<Vec<Rgb>>,

    /// The color table of the image being decoded, when it has its own.
    /// Held here so an abandoned frame still gets it released.
    local_color_table : Option<Vec<Rgb>>,

    /// Pixel index scratch buffer, screen-sized and reused across frames.
    pixels : Vec<u8>,

    lzw : LzwDecoder,

    /// The last Graphic Control Extension seen, consumed by the next
    /// image. An image with no preceding extension gets the defaults.
    next_control : Option<GraphicControlExtension>,

    frames_parsed : usize,
    frames_delivered : usize,
}

impl<'alloc, A: Allocator> DecodeSession<'alloc, A> {
    fn new(header : GifHeader, allocator : &'alloc A) -> Result<DecodeSession<'alloc, A>> {
        let GifHeader {
            width,
            height,
            background_color_index,
            global_color_table,
            ..
        } = header;

        let nb_pixels = match checked_area(width, height) {
            Ok(nb_pixels) => nb_pixels,
            Err(e) => {
                release_color_table(allocator, global_color_table);
                return Err(e);
            }
        };
        let pixels = match alloc::acquire::<u8, A>(allocator, nb_pixels) {
            Ok(pixels) => pixels,
            Err(e) => {
                release_color_table(allocator, global_color_table);
                return Err(e);
            }
        };
        let lzw = match LzwDecoder::new(allocator) {
            Ok(lzw) => lzw,
            Err(e) => {
                allocator.release(pixels);
                release_color_table(allocator, global_color_table);
                return Err(e);
            }
        };

        Ok(DecodeSession {
            allocator,
            screen_width: width,
            screen_height: height,
            background_color_index,
            global_color_table,
            local_color_table: None,
            pixels,
            lzw,
            next_control: None,
            frames_parsed: 0,
            frames_delivered: 0,
        })
    }

    fn run<S: FrameSink>(
        mut self,
        rdr : &mut GifReader,
        sink : &mut S,
        skip_frames : usize
    ) -> Result<DecodeSummary> {
        let outcome = self.block_loop(rdr, sink, skip_frames);
        self.finish(outcome)
    }

    /// Dispatch on block introducers until the trailer, the end of the
    /// buffer, or a frame that cannot be decoded.
    fn block_loop<S: FrameSink>(
        &mut self,
        rdr : &mut GifReader,
        sink : &mut S,
        skip_frames : usize
    ) -> Result<()> {
        loop {
            let position = rdr.pos();
            match rdr.read_u8()? {
                IMAGE_DESCRIPTOR_BLOCK_ID => {
                    if !self.handle_image(rdr, sink, skip_frames)? {
                        // The image data ran short. The partial frame was
                        // delivered, but whatever follows in the buffer
                        // cannot be trusted.
                        return Err(DecodeError::UnexpectedEndOfData {
                            position: rdr.pos(),
                        });
                    }
                }
                TRAILER_BLOCK_ID => {
                    debug!("trailer reached, {} frame(s) parsed", self.frames_parsed);
                    return Ok(());
                }
                EXTENSION_INTRODUCER_ID => match rdr.read_u8()? {
                    GRAPHIC_CONTROL_EXTENSION_LABEL => {
                        self.next_control =
                            Some(parse_graphic_control_extension(rdr)?);
                    }
                    APPLICATION_EXTENSION_LABEL => {
                        let extension = parse_application_extension(rdr)?;
                        debug!(
                            "application extension {:?}",
                            String::from_utf8_lossy(extension.identifier)
                        );
                        sink.on_application_extension(&extension);
                    }
                    COMMENT_EXTENSION_LABEL => {
                        // We don't care about comments
                        sub_blocks::skip_sub_blocks(rdr)?;
                    }
                    PLAIN_TEXT_EXTENSION_LABEL => {
                        skip_plain_text_extension(rdr)?;
                    }
                    label => {
                        // Whatever an unknown 89a extension may mean, its
                        // sub-block framing makes it skippable.
                        warn!("skipping unrecognized extension 0x{:02X}", label);
                        sub_blocks::skip_sub_blocks(rdr)?;
                    }
                },
                code => {
                    return Err(DecodeError::UnrecognizedBlock { code, position });
                }
            }
        }
    }

    /// Parse one Image Descriptor and everything it drags along (local
    /// color table, LZW data), then dispatch the frame.
    /// Returns `false` when the image data stopped before filling the
    /// frame rectangle.
    fn handle_image<S: FrameSink>(
        &mut self,
        rdr : &mut GifReader,
        sink : &mut S,
        skip_frames : usize
    ) -> Result<bool> {
        let frame_left = rdr.read_u16()?;
        let frame_top = rdr.read_u16()?;
        let frame_width = rdr.read_u16()?;
        let frame_height = rdr.read_u16()?;
        let field = rdr.read_u8()?;

        let has_local_color_table = field & 0x80 != 0;
        let interlaced = field & 0x40 != 0;
        // Bit 5 is the sort flag, bits 3-4 are reserved.
        let nb_color_entries : usize = 1 << ((field & 0x07) + 1);

        debug!(
            "image descriptor: {}x{} at ({}, {})",
            frame_width, frame_height, frame_left, frame_top
        );
        if u32::from(frame_left) + u32::from(frame_width) > u32::from(self.screen_width)
            || u32::from(frame_top) + u32::from(frame_height)
                > u32::from(self.screen_height)
        {
            // Tolerated: the rectangle is surfaced as declared, and the
            // caller is the one compositing.
            warn!(
                "frame rectangle {}x{} at ({}, {}) exceeds the {}x{} screen",
                frame_width, frame_height, frame_left, frame_top,
                self.screen_width, self.screen_height
            );
        }

        if has_local_color_table {
            let table =
                color::parse_color_table(rdr, nb_color_entries, self.allocator)?;
            self.local_color_table = Some(table);
        }

        let nb_pixels = checked_area(frame_width, frame_height)?;
        if nb_pixels > self.pixels.len() {
            // Only reachable with a frame larger than the screen: the
            // scratch buffer has to grow past its screen-sized default.
            let bigger = alloc::acquire::<u8, A>(self.allocator, nb_pixels)?;
            self.allocator.release(mem::replace(&mut self.pixels, bigger));
        }

        let min_code_size = rdr.read_u8()?;
        let written =
            self.lzw.decode_image(rdr, min_code_size, &mut self.pixels[..nb_pixels])?;

        let palette : &[Rgb] = match self
            .local_color_table
            .as_deref()
            .or_else(|| self.global_color_table.as_deref())
        {
            Some(palette) => palette,
            None => return Err(DecodeError::NoColorTable),
        };

        // An index the caller cannot look up would push a bounds problem
        // into every sink; refuse the frame instead.
        if let Some(&index) = self.pixels[..written]
            .iter()
            .find(|&&px| usize::from(px) >= palette.len())
        {
            return Err(DecodeError::ColorOutOfRange { index });
        }

        let (disposal_method, delay_cs, transparent_color_index) =
            match self.next_control.take() {
                Some(control) => (
                    control.disposal_method,
                    control.delay,
                    control.transparent_color_index,
                ),
                None => (DisposalMethod::NoDisposalSpecified, 0, None),
            };
        let transparent_color_index = transparent_color_index.filter(|&idx| {
            let in_range = usize::from(idx) < palette.len();
            if !in_range {
                warn!("transparent color {} is out of the color table, ignored", idx);
            }
            in_range
        });

        self.frames_parsed += 1;
        let index = self.frames_parsed - 1;
        if index >= skip_frames {
            sink.on_frame(&FrameInfo {
                screen_width: self.screen_width,
                screen_height: self.screen_height,
                frame_left,
                frame_top,
                frame_width,
                frame_height,
                pixels: &self.pixels[..written],
                palette,
                background_color_index: self.background_color_index,
                transparent_color_index,
                interlaced,
                disposal_method,
                delay_cs,
                index,
                frames_seen: index + 1,
            });
            self.frames_delivered += 1;
        }

        if let Some(table) = self.local_color_table.take() {
            self.allocator.release(table);
        }
        Ok(written == nb_pixels)
    }

    /// Give every buffer back and turn the loop's outcome into what the
    /// caller sees: an error when nothing was parsed, a summary otherwise.
    fn finish(mut self, outcome : Result<()>) -> Result<DecodeSummary> {
        release_color_table(self.allocator, self.global_color_table.take());
        release_color_table(self.allocator, self.local_color_table.take());
        self.allocator.release(mem::take(&mut self.pixels));
        self.lzw.release(self.allocator);

        match outcome {
            Ok(()) => Ok(DecodeSummary {
                frames_parsed: self.frames_parsed,
                frames_delivered: self.frames_delivered,
                complete: true,
                error: None,
            }),
            Err(error) => {
                if self.frames_parsed == 0 {
                    Err(error)
                } else {
                    Ok(DecodeSummary {
                        frames_parsed: self.frames_parsed,
                        frames_delivered: self.frames_delivered,
                        complete: false,
                        error: Some(error),
                    })
                }
            }
        }
    }
}

fn release_color_table<A: Allocator>(allocator : &A, table : Option<Vec<Rgb>>) {
    if let Some(table) = table {
        allocator.release(table);
    }
}

/// `width * height` as a buffer length, refused when the target cannot
/// even address it.
fn checked_area(width : u16, height : u16) -> Result<usize> {
    usize::try_from(u32::from(width) * u32::from(height))
        .map_err(|_| DecodeError::AllocationFailed { len: usize::MAX })
}

fn parse_graphic_control_extension(
    rdr : &mut GifReader
) -> Result<GraphicControlExtension> {
    let block_size = rdr.read_u8()?;
    if block_size != 4 {
        return Err(DecodeError::UnexpectedLength {
            block_name: "Graphic Control Extension",
            expected: 4,
            got: block_size,
        });
    }
    let packed_fields = rdr.read_u8()?;
    let disposal_method = DisposalMethod::from_wire((packed_fields & 0b0001_1100) >> 2);
    let transparent_color_flag = packed_fields & 0x01 != 0;
    let delay = rdr.read_u16()?;
    let transparent_color_index = if transparent_color_flag {
        Some(rdr.read_u8()?)
    } else {
        rdr.skip_bytes(1)?;
        None
    };
    if rdr.read_u8()? != 0 {
        return Err(DecodeError::ExpectedBlockTerminator {
            block_name: "Graphic Control Extension",
        });
    }
    Ok(GraphicControlExtension {
        disposal_method,
        transparent_color_index,
        delay,
    })
}

/// Parse an Application Extension. Its payload is not interpreted: the
/// identifier and the raw sub-block chain go to the sink as stored, so
/// loop counts (NETSCAPE2.0), XMP packets and the like stay the caller's
/// business.
fn parse_application_extension<'a>(
    rdr : &mut GifReader<'a>
) -> Result<ApplicationExtension<'a>> {
    let block_size = rdr.read_u8()?;
    if block_size != 11 {
        return Err(DecodeError::UnexpectedLength {
            block_name: "Application Extension",
            expected: 11,
            got: block_size,
        });
    }
    // `read_bytes` hands back exactly eleven bytes, so the conversion
    // cannot fail.
    let identifier = <&[u8; 11]>::try_from(rdr.read_bytes(11)?)
        .map_err(|_| DecodeError::UnexpectedEndOfData { position: rdr.pos() })?;
    let data = sub_blocks::raw_sub_blocks(rdr)?;
    Ok(ApplicationExtension { identifier, data })
}

/// The plain text extension is an 89a GIF extension allowing to render
/// text in a GIF image. This feature seems to be very rarely used, we can
/// safely ignore it.
fn skip_plain_text_extension(rdr : &mut GifReader) -> Result<()> {
    let block_size = rdr.read_u8()?;
    if block_size != 12 {
        return Err(DecodeError::UnexpectedLength {
            block_name: "Plain Text Extension",
            expected: 12,
            got: block_size,
        });
    }
    rdr.skip_bytes(12)?; // Skip whole plain text header
    sub_blocks::skip_sub_blocks(rdr)?;
    Ok(())
}
