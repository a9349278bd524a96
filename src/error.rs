use std::error::Error;
use std::fmt;

pub type Result<T> = std::result::Result<T, DecodeError>;

/// Every way a GIF buffer can fail to decode.
///
/// Errors hit before any frame could be parsed abort the whole decode.
/// Errors hit later stop the parsing loop but keep the frames already
/// handed to the sink; they are then reported through the `DecodeSummary`
/// rather than through a `Result`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The buffer does not begin with the "GIF" signature.
    NoGifHeader,

    /// The three version bytes after the signature are neither "87a" nor
    /// "89a".
    UnsupportedVersion([u8; 3]),

    /// The buffer ended in the middle of a block, a color table or a
    /// sub-block chain.
    UnexpectedEndOfData { position : usize },

    /// A fixed-size block announced a length other than the one its
    /// specification mandates.
    UnexpectedLength { block_name : &'static str, expected : u8, got : u8 },

    /// A block terminator (0x00) should have been found here.
    ExpectedBlockTerminator { block_name : &'static str },

    /// A byte which is neither an extension introducer, an image
    /// descriptor nor a trailer was found where a block should begin.
    UnrecognizedBlock { code : u8, position : usize },

    /// An image has no local color table and the file has no global one.
    NoColorTable,

    /// A decoded pixel refers to a color past the end of the active color
    /// table.
    ColorOutOfRange { index : u8 },

    /// The LZW minimum code size of an image is outside 1..=8.
    InvalidMinimumCodeSize { size : u8 },

    /// An LZW code which is neither a literal, a control code nor an
    /// already-assigned table entry was read.
    InvalidLzwCode { code : u16 },

    /// The allocator could not provide a working buffer.
    AllocationFailed { len : usize },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f : &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::NoGifHeader =>
                write!(f, "no \"GIF\" signature found"),
            DecodeError::UnsupportedVersion(v) =>
                write!(f, "unsupported GIF version {:?}", String::from_utf8_lossy(v)),
            DecodeError::UnexpectedEndOfData { position } =>
                write!(f, "unexpected end of data at position {}", position),
            DecodeError::UnexpectedLength { block_name, expected, got } =>
                write!(f, "{} block has length {}, expected {}", block_name, got, expected),
            DecodeError::ExpectedBlockTerminator { block_name } =>
                write!(f, "expected a block terminator at the end of a {} block", block_name),
            DecodeError::UnrecognizedBlock { code, position } =>
                write!(f, "unrecognized block 0x{:02X} at position {}", code, position),
            DecodeError::NoColorTable =>
                write!(f, "image has neither a local nor a global color table"),
            DecodeError::ColorOutOfRange { index } =>
                write!(f, "pixel refers to color {} past the end of the color table", index),
            DecodeError::InvalidMinimumCodeSize { size } =>
                write!(f, "invalid LZW minimum code size {}", size),
            DecodeError::InvalidLzwCode { code } =>
                write!(f, "invalid LZW code {}", code),
            DecodeError::AllocationFailed { len } =>
                write!(f, "could not allocate a working buffer of {} bytes", len),
        }
    }
}

impl Error for DecodeError {}
