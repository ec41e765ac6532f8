//!
//! Maps a Matroska (or WebM) element tree onto [`MatroskaSegmentInfo`].
//!
//! The mapper makes a single forward pass: it reads the EBML header, descends into the first Segment and reads Info, Tracks and Attachments.  Everything else inside the Segment (Clusters, Cues, Chapters, Tags, ...) is skipped without being decoded, so only the metadata is ever held in memory.
//!
//! ## Example
//!
//! ```no_run
//! use ebml_cursor::BufferedSource;
//! use ebml_cursor::matroska::parse_segment_information;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut source = BufferedSource::from_read(std::fs::File::open("movie.mkv")?);
//! let info = futures::executor::block_on(parse_segment_information(&mut source))?;
//! for track in &info.tracks {
//!     println!("{:?} {}", track.track_type, track.codec);
//! }
//! # Ok(())
//! # }
//! ```
//!

pub mod catalog;
mod mapper;
mod model;

use futures::future::{AbortRegistration, Abortable, Aborted};
use tracing::{debug, warn};

use self::catalog::TopLevelElement;
use crate::error::MatroskaError;
use crate::specs::ElementCatalog;
use crate::{ByteSource, ElementCursor};

pub use self::model::{
    AudioFormat, EbmlHeader, MatroskaAttachment, MatroskaDocument, MatroskaSegmentInfo, MatroskaTrack, TrackFormat, TrackType, VideoFormat,
};

///
/// Options for [`parse_document()`].
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseOptions {
    retain_attachment_data: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            retain_attachment_data: true,
        }
    }
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    ///
    /// Whether attachment payloads are copied into [`MatroskaAttachment::data`].  When `false` payloads are skipped and `data` is `None`.
    ///
    pub fn retain_attachment_data(mut self, retain: bool) -> Self {
        self.retain_attachment_data = retain;
        self
    }
}

///
/// Reads the EBML header and the first Segment of a Matroska stream.
///
/// Top-level elements other than the header and the Segment are skipped.  The source is left at the end of the Segment (the end of the stream for a Segment of unknown size).
///
/// # Errors
///
/// Any structural problem aborts the parse; there is no partial result.  A stream without a Segment fails with [`MatroskaError::MissingSegment`], and a Segment without a TimecodeScale with [`MatroskaError::MissingElement`].
///
pub async fn parse_document<S: ByteSource>(source: &mut S, options: &ParseOptions) -> Result<MatroskaDocument, MatroskaError> {
    let mut cursor = ElementCursor::new(source);
    let mut header = None;

    while let Some(element) = cursor.advance().await? {
        match TopLevelElement::from_id(element.id) {
            TopLevelElement::Ebml => {
                let parsed = mapper::read_header(&mut cursor.descend(&element)?).await?;
                if parsed.doc_type != "matroska" && parsed.doc_type != "webm" {
                    warn!(doc_type = %parsed.doc_type, "unexpected document type");
                }
                header = Some(parsed);
            },
            TopLevelElement::Segment => {
                let segment = mapper::read_segment(&mut cursor.descend(&element)?, options).await?;
                return Ok(MatroskaDocument {
                    header: header.unwrap_or_default(),
                    segment,
                });
            },
            TopLevelElement::Unrecognized(id) => debug!(id = format_args!("0x{:x}", id), "skipping top-level element"),
        }
    }

    Err(MatroskaError::MissingSegment)
}

///
/// Reads the segment information of a Matroska stream with default [`ParseOptions`].
///
pub async fn parse_segment_information<S: ByteSource>(source: &mut S) -> Result<MatroskaSegmentInfo, MatroskaError> {
    parse_document(source, &ParseOptions::default()).await.map(|document| document.segment)
}

///
/// Same as [`parse_segment_information()`], but can be cancelled through the [`AbortHandle`](futures::future::AbortHandle) paired with `registration`.
///
/// The source is taken by value: a cancelled parse leaves it at an arbitrary position, so it is dropped together with the cursors.  Cancellation is reported as [`MatroskaError::Cancelled`].
///
pub async fn parse_segment_information_abortable<S: ByteSource>(mut source: S, registration: AbortRegistration) -> Result<MatroskaSegmentInfo, MatroskaError> {
    let parse = async move { parse_segment_information(&mut source).await };
    match Abortable::new(parse, registration).await {
        Ok(result) => result,
        Err(Aborted) => {
            debug!("segment parse cancelled");
            Err(MatroskaError::Cancelled)
        },
    }
}
