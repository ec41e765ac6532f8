//!
//! Element ids known to the Matroska mapper, one catalog per nesting level.
//!

use crate::specs::{ElementCatalog, ElementType};

///
/// Declares a catalog enum along with its [`ElementCatalog`] implementation.
///
/// Every catalog gets an extra `Unrecognized(u64)` variant for ids it does not list.
///
macro_rules! catalog {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($variant:ident : $data_type:ident = $id:literal),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
        $vis enum $name {
            $($variant,)*
            Unrecognized(u64),
        }

        impl ElementCatalog for $name {
            fn from_id(id: u64) -> Self {
                match id {
                    $($id => $name::$variant,)*
                    other => $name::Unrecognized(other),
                }
            }

            fn get_id(&self) -> u64 {
                match self {
                    $($name::$variant => $id,)*
                    $name::Unrecognized(id) => *id,
                }
            }

            fn element_type(&self) -> Option<ElementType> {
                match self {
                    $($name::$variant => Some(ElementType::$data_type),)*
                    $name::Unrecognized(_) => None,
                }
            }
        }
    };
}

catalog! {
    /// Root level of a document.
    pub enum TopLevelElement {
        Ebml: Master = 0x1a45dfa3,
        Segment: Master = 0x18538067,
    }
}

catalog! {
    pub enum HeaderElement {
        EbmlVersion: UnsignedInt = 0x4286,
        EbmlReadVersion: UnsignedInt = 0x42f7,
        EbmlMaxIdLength: UnsignedInt = 0x42f2,
        EbmlMaxSizeLength: UnsignedInt = 0x42f3,
        DocType: Ascii = 0x4282,
        DocTypeVersion: UnsignedInt = 0x4287,
        DocTypeReadVersion: UnsignedInt = 0x4285,
    }
}

catalog! {
    /// Direct children of the Segment.  Only Info, Tracks and Attachments are mapped; the rest are skipped.
    pub enum SegmentElement {
        SeekHead: Master = 0x114d9b74,
        Info: Master = 0x1549a966,
        Tracks: Master = 0x1654ae6b,
        Attachments: Master = 0x1941a469,
        Chapters: Master = 0x1043a770,
        Cues: Master = 0x1c53bb6b,
        Tags: Master = 0x1254c367,
        Cluster: Master = 0x1f43b675,
        Void: Binary = 0xec,
        Crc32: Binary = 0xbf,
    }
}

catalog! {
    pub enum InfoElement {
        TimecodeScale: UnsignedInt = 0x2ad7b1,
        Duration: Float = 0x4489,
        DateUtc: Date = 0x4461,
        Title: Utf8 = 0x7ba9,
        MuxingApp: Utf8 = 0x4d80,
        WritingApp: Utf8 = 0x5741,
    }
}

catalog! {
    pub enum TracksElement {
        TrackEntry: Master = 0xae,
    }
}

catalog! {
    pub enum TrackEntryElement {
        TrackNumber: UnsignedInt = 0xd7,
        TrackUid: UnsignedInt = 0x73c5,
        TrackType: UnsignedInt = 0x83,
        FlagEnabled: UnsignedInt = 0xb9,
        FlagDefault: UnsignedInt = 0x88,
        FlagForced: UnsignedInt = 0x55aa,
        DefaultDuration: UnsignedInt = 0x23e383,
        Name: Utf8 = 0x536e,
        Language: Ascii = 0x22b59c,
        CodecId: Ascii = 0x86,
        CodecName: Utf8 = 0x258688,
        Video: Master = 0xe0,
        Audio: Master = 0xe1,
    }
}

catalog! {
    pub enum VideoElement {
        PixelWidth: UnsignedInt = 0xb0,
        PixelHeight: UnsignedInt = 0xba,
        DisplayWidth: UnsignedInt = 0x54b0,
        DisplayHeight: UnsignedInt = 0x54ba,
    }
}

catalog! {
    pub enum AudioElement {
        SamplingFrequency: Float = 0xb5,
        Channels: UnsignedInt = 0x9f,
        BitDepth: UnsignedInt = 0x6264,
    }
}

catalog! {
    pub enum AttachmentsElement {
        AttachedFile: Master = 0x61a7,
    }
}

catalog! {
    pub enum AttachedFileElement {
        FileDescription: Utf8 = 0x467e,
        FileName: Utf8 = 0x466e,
        FileMimeType: Ascii = 0x4660,
        FileData: Binary = 0x465c,
        FileUid: UnsignedInt = 0x46ae,
    }
}
