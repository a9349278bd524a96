use crate::alloc::{self, Allocator};
use crate::error::Result;
use crate::gif_reader::GifReader;

/// One entry of a GIF color table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rgb {
    pub r : u8,
    pub g : u8,
    pub b : u8,
}

/// Parse a color table of `nb_entries` RGB triplets.
/// `nb_entries` always comes from a 3-bit wire field as 2^(n+1), so it is a
/// power of two between 2 and 256.
pub fn parse_color_table<A: Allocator>(
    rdr : &mut GifReader,
    nb_entries : usize,
    allocator : &A
) -> Result<Vec<Rgb>> {
    let raw_color_table = rdr.read_bytes(nb_entries * 3)?;
    let mut ct = alloc::acquire::<Rgb, A>(allocator, nb_entries)?;
    for (entry, raw) in ct.iter_mut().zip(raw_color_table.chunks_exact(3)) {
        *entry = Rgb { r: raw[0], g: raw[1], b: raw[2] };
    }
    Ok(ct)
}
