///
/// Broad classification shared by every error in this crate.
///
/// Callers that only need to know whether a parse failed because of bad data, a short stream, an I/O problem or because it was abandoned can match on this rather than on individual variants.
///
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The data is malformed: bad vint, element crossing its parent boundary, invalid scalar width or encoding.
    Format,
    /// The source ended before a declared vint or element was satisfied.
    Truncation,
    /// The parse was abandoned while waiting on the source.
    Cancellation,
    /// The underlying transport failed.
    Io,
}

pub mod tool {
    use thiserror::Error;

    #[derive(Debug, Error)]
    pub enum ToolError {
        #[error("Vint first byte is zero; no length marker found within 8 bytes.")]
        ReadVintOverflow,
        #[error("Element id uses {0} octets; at most 4 are allowed.")]
        ReadIdOverflow(usize),
        #[error("Could not read unsigned int from array: {0:?}")]
        ReadU64Overflow(Vec<u8>),
        #[error("Could not read int from array: {0:?}")]
        ReadI64Overflow(Vec<u8>),
        #[error("Could not read float from array: {0:?}")]
        ReadF64Mismatch(Vec<u8>),
        #[error("Could not read date from array: {0:?}")]
        ReadDateMismatch(Vec<u8>),
        #[error("Date offset of {0}ns is out of range.")]
        DateOutOfRange(i64),
        #[error("Byte 0x{byte:02x} at index {index} is not ASCII.")]
        InvalidAscii { byte: u8, index: usize },
        #[error("Could not read utf8 data: {1}")]
        FromUtf8Error(Vec<u8>, #[source] std::string::FromUtf8Error),
    }
}

pub mod cursor {
    use super::tool::ToolError;
    use super::ErrorKind;
    use std::io;
    use thiserror::Error;

    #[derive(Debug, Error)]
    pub enum CursorError {
        #[error("Encountered corrupted data at position {position}. {problem}")]
        CorruptedData {
            position: u64,
            #[source]
            problem: ToolError,
        },
        #[error("Element 0x{tag_id:x} at position {position} declares {size} bytes, crossing the end of its parent at {scope_end}.")]
        OversizedChildElement {
            position: u64,
            tag_id: u64,
            size: u64,
            scope_end: u64,
        },
        #[error("Source is at position {position}, past the expected boundary {boundary}.")]
        Overread { position: u64, boundary: u64 },
        #[error("Element 0x{tag_id:x} is no longer current; its cursor has moved on.")]
        StaleElement { tag_id: u64 },
        #[error("Element 0x{tag_id:x} has an unknown size and cannot be read as a value.")]
        UnknownSizeData { tag_id: u64 },
        #[error("Source ended at position {position} while {needed} more bytes were expected.")]
        Truncated { position: u64, needed: u64 },
        #[error("Error reading from source.")]
        ReadError {
            #[source]
            source: io::Error,
        },
    }

    impl CursorError {
        pub fn kind(&self) -> ErrorKind {
            match self {
                CursorError::Truncated { .. } => ErrorKind::Truncation,
                CursorError::ReadError { source } if source.kind() == io::ErrorKind::UnexpectedEof => ErrorKind::Truncation,
                CursorError::ReadError { .. } => ErrorKind::Io,
                _ => ErrorKind::Format,
            }
        }
    }
}

pub mod matroska {
    use super::cursor::CursorError;
    use super::ErrorKind;
    use thiserror::Error;

    #[derive(Debug, Error)]
    pub enum MatroskaError {
        #[error(transparent)]
        Cursor(#[from] CursorError),
        #[error("Required element {0} is missing.")]
        MissingElement(&'static str),
        #[error("Source does not contain a Segment element.")]
        MissingSegment,
        #[error("Parse was cancelled.")]
        Cancelled,
    }

    impl MatroskaError {
        pub fn kind(&self) -> ErrorKind {
            match self {
                MatroskaError::Cursor(err) => err.kind(),
                MatroskaError::MissingElement(_) | MatroskaError::MissingSegment => ErrorKind::Format,
                MatroskaError::Cancelled => ErrorKind::Cancellation,
            }
        }
    }
}
