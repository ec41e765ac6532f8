use chrono::{DateTime, Utc};
use tracing::{trace, warn};

use super::element::{EbmlElement, ElementSize};
use super::errors::cursor::CursorError;
use super::errors::tool::ToolError;
use super::source::ByteSource;
use super::specs::ElementType;
use super::tools;

///
/// Where the source has to be before the next sibling can be read.
///
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Pending {
    Nothing,
    Until(u64),
    /// The last element had an unknown size in an unbounded scope; it runs to the end of the stream.
    EndOfStream,
}

///
/// A decoded scalar value, as returned by [`ElementCursor::read_value()`].
///
#[derive(Clone, Debug, PartialEq)]
pub enum ElementValue {
    UnsignedInt(u64),
    Integer(i64),
    Float(f64),
    Date(DateTime<Utc>),
    Ascii(String),
    Utf8(String),
    Binary(Vec<u8>),
}

///
/// Provides lazy, forward-only iteration over the sibling elements of one scope of an EBML document.
///
/// A cursor never buffers more than the element header it is decoding.  Each call to [`Self::advance()`] first discards whatever the consumer left unread of the previously returned element, so the consumer is free to read an element's value, [`descend`](Self::descend) into it, or ignore it entirely.
///
/// Child cursors mutably borrow their parent, so the parent cannot be advanced until the child is dropped.  Dropping a child early is fine: the parent's next advance skips to the end of the element.
///
/// ## Example
///
/// ```
/// use ebml_cursor::{BufferedSource, ElementCursor};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// // EBML header containing a DocType of "webm"
/// let data = vec![0x1a, 0x45, 0xdf, 0xa3, 0x87, 0x42, 0x82, 0x84, b'w', b'e', b'b', b'm'];
/// let mut source = BufferedSource::new(futures::io::Cursor::new(data));
///
/// let doc_type = futures::executor::block_on(async {
///     let mut cursor = ElementCursor::new(&mut source);
///     let header = cursor.advance().await?.expect("header present");
///     let mut children = cursor.descend(&header)?;
///     let doc_type = children.advance().await?.expect("doc type present");
///     children.read_ascii(&doc_type).await
/// })?;
/// assert_eq!("webm", doc_type);
/// # Ok(())
/// # }
/// ```
///
pub struct ElementCursor<'s, S: ByteSource> {
    source: &'s mut S,
    scope_end: Option<u64>,
    pending: Pending,
    depth: usize,
    exhausted: bool,
}

impl<'s, S: ByteSource> ElementCursor<'s, S> {
    ///
    /// Returns the top-level cursor of a document.  Its scope is unbounded: it ends when the source does.
    ///
    pub fn new(source: &'s mut S) -> Self {
        ElementCursor {
            source,
            scope_end: None,
            pending: Pending::Nothing,
            depth: 0,
            exhausted: false,
        }
    }

    ///
    /// Nesting level of this cursor; the top-level cursor is at depth 0.
    ///
    pub fn depth(&self) -> usize {
        self.depth
    }

    ///
    /// Position just past the end of this cursor's scope, or `None` if it is unbounded.
    ///
    pub fn scope_end(&self) -> Option<u64> {
        self.scope_end
    }

    ///
    /// Bytes left before the end of this cursor's scope, or `None` if it is unbounded.
    ///
    pub fn remaining(&self) -> Option<u64> {
        self.scope_end.map(|end| end.saturating_sub(self.source.position()))
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    ///
    /// Moves to the next sibling element.
    ///
    /// Returns `Ok(None)` once the scope is fully consumed; from then on every call returns `Ok(None)` without touching the source.
    ///
    /// # Errors
    ///
    /// Fails if the element header is malformed, the source ends inside the scope, or the element declares more data than its scope has left.  After an error the whole cursor chain should be discarded.
    ///
    pub async fn advance(&mut self) -> Result<Option<EbmlElement>, CursorError> {
        if self.exhausted {
            return Ok(None);
        }

        self.skip_pending().await?;

        let header_start = self.source.position();
        match self.scope_end {
            Some(end) if header_start >= end => {
                if header_start > end {
                    return Err(CursorError::Overread { position: header_start, boundary: end });
                }
                self.exhausted = true;
                return Ok(None);
            },
            Some(_) => {},
            None => {
                if !self.source.ensure(1).await? {
                    self.exhausted = true;
                    return Ok(None);
                }
            },
        }

        let id = self.read_id().await?;
        let size = self.read_size().await?;
        let element = EbmlElement {
            id,
            size,
            header_start,
            data_start: self.source.position(),
        };
        trace!(depth = self.depth, id = format_args!("0x{:x}", id), ?size, position = header_start, "element");

        self.pending = match (element.data_end(), self.scope_end) {
            (Some(data_end), Some(scope_end)) if data_end > scope_end => {
                return Err(CursorError::OversizedChildElement {
                    position: header_start,
                    tag_id: id,
                    size: size.known().unwrap_or_default(),
                    scope_end,
                });
            },
            (Some(data_end), _) => Pending::Until(data_end),
            (None, Some(scope_end)) => {
                if element.data_start > scope_end {
                    return Err(CursorError::Overread { position: element.data_start, boundary: scope_end });
                }
                Pending::Until(scope_end)
            },
            (None, None) => Pending::EndOfStream,
        };

        Ok(Some(element))
    }

    ///
    /// Returns a cursor over the children of `element`, which must be the element most recently returned by [`Self::advance()`].
    ///
    /// The child is bounded by the element's declared size.  An element of unknown size inherits this cursor's scope end (and is unbounded at the top level).
    ///
    /// # Errors
    ///
    /// Fails with [`CursorError::StaleElement`] if `element` is not current or part of its data has already been consumed.
    ///
    pub fn descend(&mut self, element: &EbmlElement) -> Result<ElementCursor<'_, S>, CursorError> {
        self.check_current(element)?;

        let scope_end = match element.size {
            ElementSize::Known(_) => element.data_end(),
            ElementSize::Unknown => {
                if self.depth > 0 {
                    warn!(id = format_args!("0x{:x}", element.id), depth = self.depth, "unknown-sized element below the top level; bounding it by its parent");
                }
                self.scope_end
            },
        };

        Ok(ElementCursor {
            source: &mut *self.source,
            scope_end,
            pending: Pending::Nothing,
            depth: self.depth + 1,
            exhausted: false,
        })
    }

    ///
    /// Drives this cursor to the end of its scope without looking at the remaining elements.
    ///
    pub async fn finish(&mut self) -> Result<(), CursorError> {
        while self.advance().await?.is_some() {}
        Ok(())
    }

    ///
    /// Reads the data of `element` and decodes it with `decode`.
    ///
    /// The whole value is buffered before `decode` runs, so `decode` never suspends.
    ///
    pub async fn read_with<T>(&mut self, element: &EbmlElement, decode: impl FnOnce(&[u8]) -> Result<T, ToolError>) -> Result<T, CursorError> {
        let len = self.value_length(element)?;
        self.read_exact_with(element, len, decode).await
    }

    pub async fn read_unsigned(&mut self, element: &EbmlElement) -> Result<u64, CursorError> {
        let len = self.value_length(element)?;
        if len > 8 {
            return Err(self.corrupted(element, ToolError::ReadU64Overflow(Vec::new())));
        }
        self.read_exact_with(element, len, tools::arr_to_u64).await
    }

    pub async fn read_signed(&mut self, element: &EbmlElement) -> Result<i64, CursorError> {
        let len = self.value_length(element)?;
        if len > 8 {
            return Err(self.corrupted(element, ToolError::ReadI64Overflow(Vec::new())));
        }
        self.read_exact_with(element, len, tools::arr_to_i64).await
    }

    pub async fn read_float(&mut self, element: &EbmlElement) -> Result<f64, CursorError> {
        let len = self.value_length(element)?;
        if len != 4 && len != 8 {
            return Err(self.corrupted(element, ToolError::ReadF64Mismatch(Vec::new())));
        }
        self.read_exact_with(element, len, tools::arr_to_f64).await
    }

    pub async fn read_date(&mut self, element: &EbmlElement) -> Result<DateTime<Utc>, CursorError> {
        let len = self.value_length(element)?;
        if len != 8 {
            return Err(self.corrupted(element, ToolError::ReadDateMismatch(Vec::new())));
        }
        self.read_exact_with(element, len, tools::arr_to_date).await
    }

    pub async fn read_ascii(&mut self, element: &EbmlElement) -> Result<String, CursorError> {
        self.read_with(element, tools::arr_to_ascii).await
    }

    pub async fn read_utf8(&mut self, element: &EbmlElement) -> Result<String, CursorError> {
        self.read_with(element, tools::arr_to_utf8).await
    }

    pub async fn read_binary(&mut self, element: &EbmlElement) -> Result<Vec<u8>, CursorError> {
        self.read_with(element, |data| Ok(data.to_vec())).await
    }

    ///
    /// Reads the data of `element` as the given data type.
    ///
    /// Returns `Ok(None)` for [`ElementType::Master`]; use [`Self::descend()`] for those.
    ///
    pub async fn read_value(&mut self, element: &EbmlElement, data_type: ElementType) -> Result<Option<ElementValue>, CursorError> {
        Ok(Some(match data_type {
            ElementType::Master => return Ok(None),
            ElementType::UnsignedInt => ElementValue::UnsignedInt(self.read_unsigned(element).await?),
            ElementType::Integer => ElementValue::Integer(self.read_signed(element).await?),
            ElementType::Float => ElementValue::Float(self.read_float(element).await?),
            ElementType::Date => ElementValue::Date(self.read_date(element).await?),
            ElementType::Ascii => ElementValue::Ascii(self.read_ascii(element).await?),
            ElementType::Utf8 => ElementValue::Utf8(self.read_utf8(element).await?),
            ElementType::Binary => ElementValue::Binary(self.read_binary(element).await?),
        }))
    }

    async fn skip_pending(&mut self) -> Result<(), CursorError> {
        match std::mem::replace(&mut self.pending, Pending::Nothing) {
            Pending::Nothing => Ok(()),
            Pending::Until(end) => {
                let position = self.source.position();
                if position > end {
                    return Err(CursorError::Overread { position, boundary: end });
                }
                let needed = end - position;
                let skipped = self.source.skip(needed).await?;
                if skipped < needed {
                    return Err(CursorError::Truncated { position: self.source.position(), needed: needed - skipped });
                }
                Ok(())
            },
            Pending::EndOfStream => {
                while self.source.skip(u64::MAX).await? == u64::MAX {}
                Ok(())
            },
        }
    }

    async fn read_id(&mut self) -> Result<u64, CursorError> {
        let position = self.source.position();
        let length = self.ensure_vint().await?;
        match tools::read_element_id(&self.source.buffered()[..length]) {
            Ok(Some((id, length))) => {
                self.source.consume(length);
                Ok(id)
            },
            Ok(None) => Err(CursorError::Truncated { position, needed: length as u64 }),
            Err(problem) => Err(CursorError::CorruptedData { position, problem }),
        }
    }

    async fn read_size(&mut self) -> Result<ElementSize, CursorError> {
        let position = self.source.position();
        let length = self.ensure_vint().await?;
        match tools::read_element_size(&self.source.buffered()[..length]) {
            Ok(Some((size, length))) => {
                self.source.consume(length);
                Ok(size)
            },
            Ok(None) => Err(CursorError::Truncated { position, needed: length as u64 }),
            Err(problem) => Err(CursorError::CorruptedData { position, problem }),
        }
    }

    /// Buffers the vint at the current position and returns its length.
    async fn ensure_vint(&mut self) -> Result<usize, CursorError> {
        let position = self.source.position();
        if !self.source.ensure(1).await? {
            return Err(CursorError::Truncated { position, needed: 1 });
        }
        let length = tools::vint_length(self.source.buffered()[0]).map_err(|problem| CursorError::CorruptedData { position, problem })?;
        if !self.source.ensure(length).await? {
            return Err(CursorError::Truncated { position, needed: (length - self.source.buffered().len()) as u64 });
        }
        Ok(length)
    }

    fn check_current(&self, element: &EbmlElement) -> Result<(), CursorError> {
        let is_current = match self.pending {
            Pending::Until(end) => element.data_end().map_or(true, |data_end| data_end == end),
            Pending::EndOfStream => !element.size.is_known(),
            Pending::Nothing => false,
        };
        if is_current && self.source.position() == element.data_start {
            Ok(())
        } else {
            Err(CursorError::StaleElement { tag_id: element.id })
        }
    }

    fn value_length(&self, element: &EbmlElement) -> Result<usize, CursorError> {
        self.check_current(element)?;
        let size = element.size.known().ok_or(CursorError::UnknownSizeData { tag_id: element.id })?;
        usize::try_from(size).map_err(|_| CursorError::OversizedChildElement {
            position: element.header_start,
            tag_id: element.id,
            size,
            scope_end: self.scope_end.unwrap_or(u64::MAX),
        })
    }

    async fn read_exact_with<T>(&mut self, element: &EbmlElement, len: usize, decode: impl FnOnce(&[u8]) -> Result<T, ToolError>) -> Result<T, CursorError> {
        if !self.source.ensure(len).await? {
            return Err(CursorError::Truncated {
                position: self.source.position(),
                needed: (len - self.source.buffered().len()) as u64,
            });
        }
        let value = decode(&self.source.buffered()[..len]).map_err(|problem| self.corrupted(element, problem))?;
        self.source.consume(len);
        Ok(value)
    }

    fn corrupted(&self, element: &EbmlElement, problem: ToolError) -> CursorError {
        CursorError::CorruptedData { position: element.data_start, problem }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::BufferedSource;
    use futures::executor::block_on;
    use futures::io::Cursor;

    fn source(data: Vec<u8>) -> BufferedSource<Cursor<Vec<u8>>> {
        BufferedSource::with_capacity(Cursor::new(data), 16)
    }

    #[test]
    fn iterates_siblings_to_end_of_stream() {
        // 0x83 TrackType = 1, 0x86 CodecID = "A"
        let mut source = source(vec![0x83, 0x81, 0x01, 0x86, 0x81, b'A']);
        block_on(async {
            let mut cursor = ElementCursor::new(&mut source);
            let first = cursor.advance().await.unwrap().unwrap();
            assert_eq!(0x83, first.id);
            assert_eq!(ElementSize::Known(1), first.size);
            let second = cursor.advance().await.unwrap().unwrap();
            assert_eq!(0x86, second.id);
            assert_eq!(4, second.header_start);
            assert!(cursor.advance().await.unwrap().is_none());
            assert!(cursor.is_exhausted());
            assert!(cursor.advance().await.unwrap().is_none());
        });
        assert_eq!(6, source.position());
    }

    #[test]
    fn zero_length_element_has_exhausted_child() {
        let mut source = source(vec![0xae, 0x80, 0x83, 0x81, 0x02]);
        block_on(async {
            let mut cursor = ElementCursor::new(&mut source);
            let entry = cursor.advance().await.unwrap().unwrap();
            {
                let mut child = cursor.descend(&entry).unwrap();
                assert_eq!(Some(0), child.remaining());
                assert!(child.advance().await.unwrap().is_none());
            }
            let next = cursor.advance().await.unwrap().unwrap();
            assert_eq!(0x83, next.id);
            assert_eq!(2, cursor.read_unsigned(&next).await.unwrap());
        });
    }

    #[test]
    fn abandoned_child_is_skipped_by_parent() {
        // 0xae [0x83=1, 0x86="ab"], 0xd7 = 5
        let mut source = source(vec![0xae, 0x87, 0x83, 0x81, 0x01, 0x86, 0x82, b'a', b'b', 0xd7, 0x81, 0x05]);
        block_on(async {
            let mut cursor = ElementCursor::new(&mut source);
            let entry = cursor.advance().await.unwrap().unwrap();
            {
                let mut child = cursor.descend(&entry).unwrap();
                let first = child.advance().await.unwrap().unwrap();
                assert_eq!(0x83, first.id);
            }
            let next = cursor.advance().await.unwrap().unwrap();
            assert_eq!(0xd7, next.id);
            assert_eq!(5, cursor.read_unsigned(&next).await.unwrap());
        });
    }

    #[test]
    fn stale_elements_are_rejected() {
        let mut source = source(vec![0x83, 0x81, 0x01, 0x86, 0x81, b'A']);
        block_on(async {
            let mut cursor = ElementCursor::new(&mut source);
            let first = cursor.advance().await.unwrap().unwrap();
            let _second = cursor.advance().await.unwrap().unwrap();
            assert!(matches!(cursor.read_unsigned(&first).await, Err(CursorError::StaleElement { tag_id: 0x83 })));
            assert!(matches!(cursor.descend(&first), Err(CursorError::StaleElement { .. })));
        });
    }

    #[test]
    fn values_can_only_be_read_once() {
        let mut source = source(vec![0x83, 0x81, 0x01]);
        block_on(async {
            let mut cursor = ElementCursor::new(&mut source);
            let first = cursor.advance().await.unwrap().unwrap();
            assert_eq!(1, cursor.read_unsigned(&first).await.unwrap());
            assert!(matches!(cursor.read_unsigned(&first).await, Err(CursorError::StaleElement { .. })));
        });
    }

    #[test]
    fn oversized_child_is_an_error() {
        // 0xae declares 3 bytes but its child declares 4
        let mut source = source(vec![0xae, 0x83, 0x83, 0x84, 0x01, 0x02, 0x03, 0x04]);
        block_on(async {
            let mut cursor = ElementCursor::new(&mut source);
            let entry = cursor.advance().await.unwrap().unwrap();
            let mut child = cursor.descend(&entry).unwrap();
            let err = child.advance().await.unwrap_err();
            assert!(matches!(err, CursorError::OversizedChildElement { tag_id: 0x83, size: 4, scope_end: 5, .. }));
            assert_eq!(crate::error::ErrorKind::Format, err.kind());
        });
    }

    #[test]
    fn truncated_element_is_reported() {
        let mut source = source(vec![0xa3, 0x88, 0x00, 0x01]);
        block_on(async {
            let mut cursor = ElementCursor::new(&mut source);
            cursor.advance().await.unwrap().unwrap();
            let err = cursor.advance().await.unwrap_err();
            assert!(matches!(err, CursorError::Truncated { position: 4, needed: 6 }));
            assert_eq!(crate::error::ErrorKind::Truncation, err.kind());
        });
    }

    #[test]
    fn truncated_header_is_reported() {
        let mut source = source(vec![0x1a, 0x45]);
        block_on(async {
            let mut cursor = ElementCursor::new(&mut source);
            assert!(matches!(cursor.advance().await, Err(CursorError::Truncated { position: 0, needed: 2 })));
        });
    }

    #[test]
    fn zero_vint_is_corrupted_data() {
        let mut source = source(vec![0x00, 0x81, 0x01]);
        block_on(async {
            let mut cursor = ElementCursor::new(&mut source);
            assert!(matches!(cursor.advance().await, Err(CursorError::CorruptedData { position: 0, problem: ToolError::ReadVintOverflow })));
        });
    }

    #[test]
    fn unknown_size_at_top_level_runs_to_end_of_stream() {
        let mut source = source(vec![0x18, 0x53, 0x80, 0x67, 0xff, 0x83, 0x81, 0x01, 0x86, 0x81, b'A']);
        block_on(async {
            let mut cursor = ElementCursor::new(&mut source);
            let segment = cursor.advance().await.unwrap().unwrap();
            assert_eq!(ElementSize::Unknown, segment.size);
            {
                let mut child = cursor.descend(&segment).unwrap();
                assert_eq!(None, child.scope_end());
                let first = child.advance().await.unwrap().unwrap();
                assert_eq!(0x83, first.id);
            }
            assert!(cursor.advance().await.unwrap().is_none());
        });
        assert_eq!(11, source.position());
    }

    #[test]
    fn unknown_size_value_cannot_be_read() {
        let mut source = source(vec![0x86, 0xff, b'A']);
        block_on(async {
            let mut cursor = ElementCursor::new(&mut source);
            let element = cursor.advance().await.unwrap().unwrap();
            assert!(matches!(cursor.read_ascii(&element).await, Err(CursorError::UnknownSizeData { tag_id: 0x86 })));
        });
    }

    #[test]
    fn float_width_is_checked_before_buffering() {
        let mut source = source(vec![0x44, 0x89, 0x82, 0x40, 0x00]);
        block_on(async {
            let mut cursor = ElementCursor::new(&mut source);
            let element = cursor.advance().await.unwrap().unwrap();
            assert!(matches!(cursor.read_float(&element).await, Err(CursorError::CorruptedData { problem: ToolError::ReadF64Mismatch(_), .. })));
        });
    }

    #[test]
    fn read_value_dispatches_on_type() {
        let mut source = source(vec![0x44, 0x89, 0x84, 0x47, 0x3b, 0x80, 0x00, 0x7b, 0xa9, 0x82, b'h', b'i']);
        block_on(async {
            let mut cursor = ElementCursor::new(&mut source);
            let duration = cursor.advance().await.unwrap().unwrap();
            assert_eq!(Some(ElementValue::Float(48000.0)), cursor.read_value(&duration, ElementType::Float).await.unwrap());
            let title = cursor.advance().await.unwrap().unwrap();
            assert_eq!(Some(ElementValue::Utf8("hi".to_string())), cursor.read_value(&title, ElementType::Utf8).await.unwrap());
        });
    }
}
