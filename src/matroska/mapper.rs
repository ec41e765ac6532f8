use tracing::debug;

use super::catalog::{
    AttachedFileElement, AttachmentsElement, AudioElement, HeaderElement, InfoElement, SegmentElement, TrackEntryElement, TracksElement, VideoElement,
};
use super::model::{
    AttachmentBuilder, AudioFormatBuilder, EbmlHeader, MatroskaSegmentInfo, SegmentInfoBuilder, TrackBuilder, TrackFormat, VideoFormatBuilder,
};
use super::ParseOptions;
use crate::error::MatroskaError;
use crate::specs::ElementCatalog;
use crate::{ByteSource, ElementCursor};

fn skipped<C: ElementCatalog>(entry: C, depth: usize) {
    match entry.element_type() {
        Some(data_type) => debug!(?entry, ?data_type, depth, "skipping unmapped element"),
        None => debug!(id = format_args!("0x{:x}", entry.get_id()), depth, "skipping unrecognized element"),
    }
}

pub(crate) async fn read_header<S: ByteSource>(cursor: &mut ElementCursor<'_, S>) -> Result<EbmlHeader, MatroskaError> {
    let mut header = EbmlHeader::default();
    while let Some(element) = cursor.advance().await? {
        match HeaderElement::from_id(element.id) {
            HeaderElement::EbmlVersion => header.version = cursor.read_unsigned(&element).await?,
            HeaderElement::EbmlReadVersion => header.read_version = cursor.read_unsigned(&element).await?,
            HeaderElement::EbmlMaxIdLength => header.max_id_length = cursor.read_unsigned(&element).await?,
            HeaderElement::EbmlMaxSizeLength => header.max_size_length = cursor.read_unsigned(&element).await?,
            HeaderElement::DocType => header.doc_type = cursor.read_ascii(&element).await?,
            HeaderElement::DocTypeVersion => header.doc_type_version = cursor.read_unsigned(&element).await?,
            HeaderElement::DocTypeReadVersion => header.doc_type_read_version = cursor.read_unsigned(&element).await?,
            entry @ HeaderElement::Unrecognized(_) => skipped(entry, cursor.depth()),
        }
    }
    Ok(header)
}

///
/// Walks the children of a Segment until its cursor is exhausted.
///
pub(crate) async fn read_segment<S: ByteSource>(cursor: &mut ElementCursor<'_, S>, options: &ParseOptions) -> Result<MatroskaSegmentInfo, MatroskaError> {
    let mut builder = SegmentInfoBuilder::default();
    while let Some(element) = cursor.advance().await? {
        match SegmentElement::from_id(element.id) {
            SegmentElement::Info => read_info(&mut cursor.descend(&element)?, &mut builder).await?,
            SegmentElement::Tracks => read_tracks(&mut cursor.descend(&element)?, &mut builder).await?,
            SegmentElement::Attachments => read_attachments(&mut cursor.descend(&element)?, &mut builder, options).await?,
            entry => skipped(entry, cursor.depth()),
        }
    }
    builder.build()
}

async fn read_info<S: ByteSource>(cursor: &mut ElementCursor<'_, S>, builder: &mut SegmentInfoBuilder) -> Result<(), MatroskaError> {
    while let Some(element) = cursor.advance().await? {
        match InfoElement::from_id(element.id) {
            InfoElement::TimecodeScale => builder.time_code_scale = Some(cursor.read_unsigned(&element).await?),
            InfoElement::Duration => builder.duration = Some(cursor.read_float(&element).await?),
            InfoElement::DateUtc => builder.date = Some(cursor.read_date(&element).await?),
            InfoElement::Title => builder.title = Some(cursor.read_utf8(&element).await?),
            InfoElement::MuxingApp => builder.muxing_app = Some(cursor.read_utf8(&element).await?),
            InfoElement::WritingApp => builder.writing_app = Some(cursor.read_utf8(&element).await?),
            entry @ InfoElement::Unrecognized(_) => skipped(entry, cursor.depth()),
        }
    }
    Ok(())
}

async fn read_tracks<S: ByteSource>(cursor: &mut ElementCursor<'_, S>, builder: &mut SegmentInfoBuilder) -> Result<(), MatroskaError> {
    while let Some(element) = cursor.advance().await? {
        match TracksElement::from_id(element.id) {
            TracksElement::TrackEntry => {
                let track = read_track_entry(&mut cursor.descend(&element)?).await?;
                builder.tracks.push(track.build());
            },
            entry @ TracksElement::Unrecognized(_) => skipped(entry, cursor.depth()),
        }
    }
    Ok(())
}

async fn read_track_entry<S: ByteSource>(cursor: &mut ElementCursor<'_, S>) -> Result<TrackBuilder, MatroskaError> {
    let mut track = TrackBuilder::default();
    while let Some(element) = cursor.advance().await? {
        match TrackEntryElement::from_id(element.id) {
            TrackEntryElement::TrackNumber => track.number = Some(cursor.read_unsigned(&element).await?),
            TrackEntryElement::TrackUid => track.uid = Some(cursor.read_unsigned(&element).await?),
            TrackEntryElement::TrackType => track.track_type = Some(cursor.read_unsigned(&element).await?),
            TrackEntryElement::FlagEnabled => track.enabled = Some(cursor.read_unsigned(&element).await?),
            TrackEntryElement::FlagDefault => track.default = Some(cursor.read_unsigned(&element).await?),
            TrackEntryElement::FlagForced => track.forced = Some(cursor.read_unsigned(&element).await?),
            TrackEntryElement::DefaultDuration => track.default_duration = Some(cursor.read_unsigned(&element).await?),
            TrackEntryElement::Name => track.name = Some(cursor.read_utf8(&element).await?),
            TrackEntryElement::Language => track.language = Some(cursor.read_ascii(&element).await?),
            TrackEntryElement::CodecId => track.codec = Some(cursor.read_ascii(&element).await?),
            TrackEntryElement::CodecName => track.codec_name = Some(cursor.read_utf8(&element).await?),
            TrackEntryElement::Video => {
                let video = read_video(&mut cursor.descend(&element)?).await?;
                track.format = Some(TrackFormat::Video(video.build()));
            },
            TrackEntryElement::Audio => {
                let audio = read_audio(&mut cursor.descend(&element)?).await?;
                track.format = Some(TrackFormat::Audio(audio.build()));
            },
            entry @ TrackEntryElement::Unrecognized(_) => skipped(entry, cursor.depth()),
        }
    }
    Ok(track)
}

async fn read_video<S: ByteSource>(cursor: &mut ElementCursor<'_, S>) -> Result<VideoFormatBuilder, MatroskaError> {
    let mut video = VideoFormatBuilder::default();
    while let Some(element) = cursor.advance().await? {
        match VideoElement::from_id(element.id) {
            VideoElement::PixelWidth => video.pixel_width = Some(cursor.read_unsigned(&element).await?),
            VideoElement::PixelHeight => video.pixel_height = Some(cursor.read_unsigned(&element).await?),
            VideoElement::DisplayWidth => video.display_width = Some(cursor.read_unsigned(&element).await?),
            VideoElement::DisplayHeight => video.display_height = Some(cursor.read_unsigned(&element).await?),
            entry @ VideoElement::Unrecognized(_) => skipped(entry, cursor.depth()),
        }
    }
    Ok(video)
}

async fn read_audio<S: ByteSource>(cursor: &mut ElementCursor<'_, S>) -> Result<AudioFormatBuilder, MatroskaError> {
    let mut audio = AudioFormatBuilder::default();
    while let Some(element) = cursor.advance().await? {
        match AudioElement::from_id(element.id) {
            AudioElement::SamplingFrequency => audio.sampling_frequency = Some(cursor.read_float(&element).await?),
            AudioElement::Channels => audio.channels = Some(cursor.read_unsigned(&element).await?),
            AudioElement::BitDepth => audio.bits_per_sample = Some(cursor.read_unsigned(&element).await?),
            entry @ AudioElement::Unrecognized(_) => skipped(entry, cursor.depth()),
        }
    }
    Ok(audio)
}

async fn read_attachments<S: ByteSource>(cursor: &mut ElementCursor<'_, S>, builder: &mut SegmentInfoBuilder, options: &ParseOptions) -> Result<(), MatroskaError> {
    while let Some(element) = cursor.advance().await? {
        match AttachmentsElement::from_id(element.id) {
            AttachmentsElement::AttachedFile => {
                let attachment = read_attached_file(&mut cursor.descend(&element)?, options).await?;
                builder.attachments.push(attachment.build());
            },
            entry @ AttachmentsElement::Unrecognized(_) => skipped(entry, cursor.depth()),
        }
    }
    Ok(())
}

async fn read_attached_file<S: ByteSource>(cursor: &mut ElementCursor<'_, S>, options: &ParseOptions) -> Result<AttachmentBuilder, MatroskaError> {
    let mut attachment = AttachmentBuilder::default();
    while let Some(element) = cursor.advance().await? {
        match AttachedFileElement::from_id(element.id) {
            AttachedFileElement::FileName => attachment.name = Some(cursor.read_utf8(&element).await?),
            AttachedFileElement::FileMimeType => attachment.content_type = Some(cursor.read_ascii(&element).await?),
            AttachedFileElement::FileDescription => attachment.description = Some(cursor.read_utf8(&element).await?),
            AttachedFileElement::FileUid => attachment.uid = Some(cursor.read_unsigned(&element).await?),
            AttachedFileElement::FileData if options.retain_attachment_data => attachment.data = Some(cursor.read_binary(&element).await?),
            entry => skipped(entry, cursor.depth()),
        }
    }
    Ok(attachment)
}
