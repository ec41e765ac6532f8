//! This crate provides a lazy, forward-only cursor over [EBML][EBML] data and a [Matroska][mkv] mapper built on top of it.  Its primary goal is to read segment metadata from a stream without ever holding more than one element header (or one requested value) in memory.
//!
//! [EBML][EBML] stands for Extensible Binary Meta-Language and is somewhat of a
//! binary version of XML. It's used for container formats like [WebM][webm] or
//! [MKV][mkv].
//!
//! # Layers
//! - [`tools`] holds pure decoders for vints and scalar values.
//! - [`ElementCursor`] walks one scope of sibling elements over a [`ByteSource`]; child cursors borrow their parent, so a parent can never be advanced while a child is alive.
//! - [`matroska`] maps a Matroska element tree onto [`MatroskaSegmentInfo`](matroska::MatroskaSegmentInfo).
//!
//! # Known Limitations
//! This library is read-only and strictly forward streaming.  Elements with an "Unknown Data Size" as defined in [RFC8794][rfc8794] are supported at the top level (where they run to the end of the stream); below it they are bounded by their parent's scope.
//!
//! [EBML]: http://ebml.sourceforge.net/
//! [webm]: https://www.webmproject.org/
//! [mkv]: http://www.matroska.org/technical/specs/index.html
//! [rfc8794]: https://datatracker.ietf.org/doc/rfc8794/
//!

mod cursor;
mod element;
mod errors;
mod source;
pub mod matroska;
pub mod specs;
pub mod tools;

pub use self::cursor::{ElementCursor, ElementValue};
pub use self::element::{EbmlElement, ElementSize};
pub use self::source::{BufferedSource, ByteSource, DEFAULT_BUFFER_LEN};

pub mod error {
    pub use crate::errors::ErrorKind;
    pub use crate::errors::cursor::CursorError;
    pub use crate::errors::matroska::MatroskaError;
    pub use crate::errors::tool::ToolError;
}
