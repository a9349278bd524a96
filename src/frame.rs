use crate::color::Rgb;
use crate::error::DecodeError;

/// The available values for the `disposal_method` parsed from a graphic
/// control extension: what the compositor should do with the canvas after
/// this frame was displayed, before drawing the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisposalMethod {
    /// The decoder is not required to take any action.
    NoDisposalSpecified,

    /// The graphic is to be left in place.
    DoNotDispose,

    /// The area used by the graphic must be restored to the background
    /// color.
    RestoreToBackgroundColor,

    /// The decoder is required to restore the area overwritten by the
    /// graphic with what was there prior to rendering the graphic.
    RestoreToPrevious,
}

impl DisposalMethod {
    /// Reserved wire values (4..=7) carry no defined meaning and are
    /// folded into `NoDisposalSpecified`.
    pub(crate) fn from_wire(value : u8) -> DisposalMethod {
        match value {
            1 => DisposalMethod::DoNotDispose,
            2 => DisposalMethod::RestoreToBackgroundColor,
            3 => DisposalMethod::RestoreToPrevious,
            _ => DisposalMethod::NoDisposalSpecified,
        }
    }
}

/// Everything known about one decoded frame, handed to
/// [`FrameSink::on_frame`].
///
/// The `pixels` and `palette` borrows point into the decoder's working
/// buffers: they are only valid for the duration of the callback. A sink
/// that wants to keep them must copy them out.
#[derive(Debug, Clone, Copy)]
pub struct FrameInfo<'a> {
    /// Dimensions of the logical screen the frames compose onto.
    pub screen_width : u16,
    pub screen_height : u16,

    /// Position of the frame rectangle within the screen. Malformed files
    /// may declare a rectangle partially outside the screen; it is
    /// surfaced as declared and clipping is left to the caller.
    pub frame_left : u16,
    pub frame_top : u16,
    pub frame_width : u16,
    pub frame_height : u16,

    /// Palette indices for the frame rectangle, row by row in file order.
    /// For interlaced frames the rows come in the GIF pass order
    /// (0, 8, 16... then 4, 12... then 2, 6... then 1, 3...).
    /// Shorter than `frame_width * frame_height` only when the image data
    /// ended early, in which case the decode is reported as incomplete.
    pub pixels : &'a [u8],

    /// The color table active for this frame: the frame's local table if
    /// it has one, the global one otherwise. Every value in `pixels` is an
    /// index into it.
    pub palette : &'a [Rgb],

    pub background_color_index : u8,

    /// Index of the color to treat as transparent, or `None` when this
    /// frame has no transparency. Always within the palette when present.
    pub transparent_color_index : Option<u8>,

    pub interlaced : bool,

    pub disposal_method : DisposalMethod,

    /// Time to wait before presenting the next frame, in hundredths of a
    /// second. 0 when the frame carried no graphic control extension.
    pub delay_cs : u16,

    /// 0-based index of this frame in the file.
    pub index : usize,

    /// Number of frames seen so far, this one included. The running count:
    /// whether more frames follow is only known once `decode` returns.
    pub frames_seen : usize,
}

/// An application extension encountered in the stream, handed to
/// [`FrameSink::on_application_extension`] untouched.
#[derive(Debug, Clone, Copy)]
pub struct ApplicationExtension<'a> {
    /// The 8-byte application identifier followed by its 3-byte
    /// authentication code (e.g. `b"NETSCAPE2.0"`), borrowed from the
    /// input buffer like `data`.
    pub identifier : &'a [u8; 11],

    /// The raw payload as stored in the file: a sub-block chain with its
    /// length prefixes and terminator still in place.
    pub data : &'a [u8],
}

/// What a decode call feeds. The sink receives every decoded frame in
/// stream order, plus application extensions at the position they occupy
/// in the stream.
pub trait FrameSink {
    /// Called once per decoded frame, skipped frames excepted.
    fn on_frame(&mut self, frame : &FrameInfo<'_>);

    /// Called once per application extension. The default implementation
    /// ignores them.
    fn on_application_extension(&mut self, _extension : &ApplicationExtension<'_>) {}
}

/// The outcome of a decode call that made it past the preamble.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeSummary {
    /// Frames parsed from the buffer, the skipped ones included.
    pub frames_parsed : usize,

    /// Frames actually handed to the sink.
    pub frames_delivered : usize,

    /// `true` when the stream ended with its trailer byte. `false` means
    /// the buffer stopped early (or a frame was corrupt): the frames
    /// delivered so far stand, but more data may exist beyond the buffer.
    pub complete : bool,

    /// Why parsing stopped, when `complete` is `false`.
    pub error : Option<DecodeError>,
}
