use crate::element::ElementSize::{Known, Unknown};

///
/// The declared data size of an element.
///
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ElementSize {
    Known(u64),
    /// All value bits of the size vint were set.  The element extends to the end of its enclosing scope.
    Unknown,
}

impl ElementSize {
    ///
    /// Interprets a decoded size vint.  `size` has its marker bit removed and `vint_length` is the encoded length in octets.
    ///
    pub fn new(size: u64, vint_length: usize) -> Self {
        if vint_length > 0 && vint_length <= 8 && size == (1u64 << (7 * vint_length)) - 1 {
            Unknown
        } else {
            Known(size)
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Known(_))
    }

    pub fn known(&self) -> Option<u64> {
        match self {
            Known(size) => Some(*size),
            Unknown => None,
        }
    }
}

///
/// Describes one element yielded by an [`ElementCursor`](crate::ElementCursor).
///
/// Positions are relative to where the byte source started; no absolute seeking is involved.  An element stays usable only until the cursor that produced it advances again - after that, descending into it or reading its value fails with [`CursorError::StaleElement`](crate::error::CursorError::StaleElement).
///
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct EbmlElement {
    /// Element id, vint marker bits included.
    pub id: u64,
    pub size: ElementSize,
    /// Position of the first byte of the element id.
    pub header_start: u64,
    /// Position of the first data byte.
    pub data_start: u64,
}

impl EbmlElement {
    ///
    /// Position just past the last data byte, when the size is known.
    ///
    pub fn data_end(&self) -> Option<u64> {
        self.size.known().map(|size| self.data_start + size)
    }

    pub fn header_length(&self) -> u64 {
        self.data_start - self.header_start
    }
}
