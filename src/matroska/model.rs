use chrono::{DateTime, Utc};
use tracing::debug;

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::error::MatroskaError;

///
/// Contents of the EBML header that precedes a Matroska segment.
///
/// Values missing from the stream take their EBML defaults.
///
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct EbmlHeader {
    pub version: u64,
    pub read_version: u64,
    pub max_id_length: u64,
    pub max_size_length: u64,
    pub doc_type: String,
    pub doc_type_version: u64,
    pub doc_type_read_version: u64,
}

impl Default for EbmlHeader {
    fn default() -> Self {
        EbmlHeader {
            version: 1,
            read_version: 1,
            max_id_length: 4,
            max_size_length: 8,
            doc_type: String::new(),
            doc_type_version: 1,
            doc_type_read_version: 1,
        }
    }
}

///
/// Metadata of one Matroska segment.
///
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct MatroskaSegmentInfo {
    pub title: Option<String>,
    pub date: Option<DateTime<Utc>>,
    /// Duration in timecode units; multiply by `time_code_scale` for nanoseconds.
    pub duration: Option<f64>,
    /// Nanoseconds per timecode unit.
    pub time_code_scale: u64,
    pub muxing_app: Option<String>,
    pub writing_app: Option<String>,
    pub tracks: Vec<MatroskaTrack>,
    pub attachments: Vec<MatroskaAttachment>,
}

impl MatroskaSegmentInfo {
    ///
    /// Converts `duration` to wall-clock time.  Returns `None` if there is no duration or it is negative or not finite.
    ///
    pub fn duration_as_time(&self) -> Option<std::time::Duration> {
        self.duration
            .map(|duration| duration * self.time_code_scale as f64 / 1_000_000_000.0)
            .and_then(|seconds| std::time::Duration::try_from_secs_f64(seconds).ok())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum TrackType {
    Video,
    Audio,
    Subtitle,
    /// Any other track type code (complex, logo, buttons, control, metadata...).
    Other(u64),
}

impl From<u64> for TrackType {
    fn from(code: u64) -> Self {
        match code {
            1 => TrackType::Video,
            2 => TrackType::Audio,
            0x11 => TrackType::Subtitle,
            other => TrackType::Other(other),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct VideoFormat {
    pub pixel_width: u64,
    pub pixel_height: u64,
    pub display_width: u64,
    pub display_height: u64,
}

#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct AudioFormat {
    pub sampling_frequency: f64,
    pub channels: u64,
    /// `0` when the track does not declare a bit depth.
    pub bits_per_sample: u64,
}

#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum TrackFormat {
    Video(VideoFormat),
    Audio(AudioFormat),
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct MatroskaTrack {
    pub number: Option<u64>,
    pub uid: Option<u64>,
    pub track_type: TrackType,
    pub enabled: bool,
    pub default: bool,
    pub forced: bool,
    pub codec: String,
    pub codec_name: Option<String>,
    /// Nanoseconds per frame.
    pub default_duration: Option<u64>,
    pub language: Option<String>,
    pub name: Option<String>,
    /// Present only when it matches `track_type`.
    pub format: Option<TrackFormat>,
}

impl MatroskaTrack {
    pub fn video_format(&self) -> Option<&VideoFormat> {
        match &self.format {
            Some(TrackFormat::Video(format)) => Some(format),
            _ => None,
        }
    }

    pub fn audio_format(&self) -> Option<&AudioFormat> {
        match &self.format {
            Some(TrackFormat::Audio(format)) => Some(format),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct MatroskaAttachment {
    pub name: String,
    pub content_type: String,
    pub description: Option<String>,
    pub uid: Option<u64>,
    /// Raw payload; `None` when the parse was configured to skip payloads.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub data: Option<Vec<u8>>,
}

///
/// An EBML header together with the first segment that followed it.
///
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct MatroskaDocument {
    pub header: EbmlHeader,
    pub segment: MatroskaSegmentInfo,
}

#[derive(Default)]
pub(crate) struct SegmentInfoBuilder {
    pub title: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub duration: Option<f64>,
    pub time_code_scale: Option<u64>,
    pub muxing_app: Option<String>,
    pub writing_app: Option<String>,
    pub tracks: Vec<MatroskaTrack>,
    pub attachments: Vec<MatroskaAttachment>,
}

impl SegmentInfoBuilder {
    pub fn build(self) -> Result<MatroskaSegmentInfo, MatroskaError> {
        Ok(MatroskaSegmentInfo {
            title: self.title,
            date: self.date,
            duration: self.duration,
            time_code_scale: self.time_code_scale.ok_or(MatroskaError::MissingElement("TimecodeScale"))?,
            muxing_app: self.muxing_app,
            writing_app: self.writing_app,
            tracks: self.tracks,
            attachments: self.attachments,
        })
    }
}

#[derive(Default)]
pub(crate) struct VideoFormatBuilder {
    pub pixel_width: Option<u64>,
    pub pixel_height: Option<u64>,
    pub display_width: Option<u64>,
    pub display_height: Option<u64>,
}

impl VideoFormatBuilder {
    pub fn build(self) -> VideoFormat {
        let pixel_width = self.pixel_width.unwrap_or_default();
        let pixel_height = self.pixel_height.unwrap_or_default();
        VideoFormat {
            pixel_width,
            pixel_height,
            display_width: self.display_width.unwrap_or(pixel_width),
            display_height: self.display_height.unwrap_or(pixel_height),
        }
    }
}

#[derive(Default)]
pub(crate) struct AudioFormatBuilder {
    pub sampling_frequency: Option<f64>,
    pub channels: Option<u64>,
    pub bits_per_sample: Option<u64>,
}

impl AudioFormatBuilder {
    pub fn build(self) -> AudioFormat {
        AudioFormat {
            sampling_frequency: self.sampling_frequency.unwrap_or(8000.0),
            channels: self.channels.unwrap_or(1),
            bits_per_sample: self.bits_per_sample.unwrap_or_default(),
        }
    }
}

#[derive(Default)]
pub(crate) struct TrackBuilder {
    pub number: Option<u64>,
    pub uid: Option<u64>,
    pub track_type: Option<u64>,
    pub enabled: Option<u64>,
    pub default: Option<u64>,
    pub forced: Option<u64>,
    pub codec: Option<String>,
    pub codec_name: Option<String>,
    pub default_duration: Option<u64>,
    pub language: Option<String>,
    pub name: Option<String>,
    pub format: Option<TrackFormat>,
}

impl TrackBuilder {
    pub fn build(self) -> MatroskaTrack {
        let track_type = TrackType::from(self.track_type.unwrap_or_default());
        let format = match (track_type, self.format) {
            (TrackType::Video, Some(format @ TrackFormat::Video(_))) => Some(format),
            (TrackType::Audio, Some(format @ TrackFormat::Audio(_))) => Some(format),
            (_, Some(format)) => {
                debug!(?track_type, ?format, "dropping format that does not match the track type");
                None
            },
            (_, None) => None,
        };

        MatroskaTrack {
            number: self.number,
            uid: self.uid,
            track_type,
            enabled: self.enabled.map_or(true, |flag| flag != 0),
            default: self.default.map_or(true, |flag| flag != 0),
            forced: self.forced.map_or(false, |flag| flag != 0),
            codec: self.codec.unwrap_or_default(),
            codec_name: self.codec_name,
            default_duration: self.default_duration,
            language: self.language,
            name: self.name,
            format,
        }
    }
}

#[derive(Default)]
pub(crate) struct AttachmentBuilder {
    pub name: Option<String>,
    pub content_type: Option<String>,
    pub description: Option<String>,
    pub uid: Option<u64>,
    pub data: Option<Vec<u8>>,
}

impl AttachmentBuilder {
    pub fn build(self) -> MatroskaAttachment {
        MatroskaAttachment {
            name: self.name.unwrap_or_default(),
            content_type: self.content_type.unwrap_or_default(),
            description: self.description,
            uid: self.uid,
            data: self.data,
        }
    }
}
