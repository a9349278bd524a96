use crate::alloc::Allocator;
use crate::color::{self, Rgb};
use crate::error::{DecodeError, Result};
use crate::gif_reader::GifReader;

/// Everything the preamble of a GIF buffer declares: the signature has
/// been checked, the Logical Screen Descriptor parsed and the Global Color
/// Table, if one was announced, read.
#[derive(Debug, PartialEq)]
pub struct GifHeader {
    pub width : u16,
    pub height : u16,
    pub background_color_index : u8,
    pub pixel_aspect_ratio : u8,
    pub global_color_table : Option<Vec<Rgb>>,
}

/// Parse the header part of a GIF buffer and the Global Color Table, if
/// one.
pub fn parse_header<A: Allocator>(
    rdr : &mut GifReader,
    allocator : &A
) -> Result<GifHeader> {
    if rdr.read_bytes(3)? != b"GIF" {
        return Err(DecodeError::NoGifHeader);
    }
    let version = rdr.read_bytes(3)?;
    if version != b"87a" && version != b"89a" {
        return Err(DecodeError::UnsupportedVersion([
            version[0], version[1], version[2],
        ]));
    }

    let width = rdr.read_u16()?;
    let height = rdr.read_u16()?;

    let field = rdr.read_u8()?;
    let has_global_color_table = field & 0x80 != 0;
    // Color resolution (bits 4-6) and the sort flag (bit 3) carry no
    // information a decoder needs.
    let nb_entries : usize = 1 << ((field & 0x07) + 1);

    let background_color_index = rdr.read_u8()?;
    let pixel_aspect_ratio = rdr.read_u8()?;

    let global_color_table = if has_global_color_table {
        Some(color::parse_color_table(rdr, nb_entries, allocator)?)
    } else {
        None
    };

    Ok(GifHeader {
        width,
        height,
        background_color_index,
        pixel_aspect_ratio,
        global_color_table,
    })
}
