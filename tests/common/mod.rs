#![allow(dead_code)]

use ebml_cursor::BufferedSource;
use futures::io::Cursor;

pub fn source(data: Vec<u8>) -> BufferedSource<Cursor<Vec<u8>>> {
    BufferedSource::new(Cursor::new(data))
}

pub fn source_with_capacity(data: Vec<u8>, capacity: usize) -> BufferedSource<Cursor<Vec<u8>>> {
    BufferedSource::with_capacity(Cursor::new(data), capacity)
}

pub fn size_vint(size: u64) -> Vec<u8> {
    let mut length = 1;
    while length < 8 && size >= (1 << (7 * length)) - 1 {
        length += 1;
    }
    let bytes = size.to_be_bytes();
    let mut result = Vec::from(&bytes[(8 - length)..]);
    result[0] |= 1 << (8 - length);
    result
}

pub fn id_bytes(id: u64) -> Vec<u8> {
    let bytes = id.to_be_bytes();
    let start = bytes.iter().position(|b| *b != 0).unwrap_or(7);
    Vec::from(&bytes[start..])
}

pub fn element(id: u64, data: &[u8]) -> Vec<u8> {
    let mut result = id_bytes(id);
    result.extend(size_vint(data.len() as u64));
    result.extend_from_slice(data);
    result
}

pub fn master(id: u64, children: &[Vec<u8>]) -> Vec<u8> {
    element(id, &children.concat())
}

pub fn unknown_sized(id: u64, children: &[Vec<u8>]) -> Vec<u8> {
    let mut result = id_bytes(id);
    result.extend([0x01, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]);
    result.extend(children.concat());
    result
}

pub fn uint(id: u64, value: u64) -> Vec<u8> {
    let bytes = value.to_be_bytes();
    let start = bytes.iter().position(|b| *b != 0).unwrap_or(7);
    element(id, &bytes[start..])
}

pub fn float32(id: u64, value: f32) -> Vec<u8> {
    element(id, &value.to_be_bytes())
}

pub fn float64(id: u64, value: f64) -> Vec<u8> {
    element(id, &value.to_be_bytes())
}

pub fn string(id: u64, value: &str) -> Vec<u8> {
    element(id, value.as_bytes())
}

pub fn date(id: u64, nanos_since_2001: i64) -> Vec<u8> {
    element(id, &nanos_since_2001.to_be_bytes())
}

pub const EBML: u64 = 0x1a45dfa3;
pub const SEGMENT: u64 = 0x18538067;
pub const SEEK_HEAD: u64 = 0x114d9b74;
pub const INFO: u64 = 0x1549a966;
pub const TRACKS: u64 = 0x1654ae6b;
pub const TRACK_ENTRY: u64 = 0xae;
pub const ATTACHMENTS: u64 = 0x1941a469;
pub const ATTACHED_FILE: u64 = 0x61a7;
pub const CHAPTERS: u64 = 0x1043a770;
pub const CLUSTER: u64 = 0x1f43b675;
pub const CUES: u64 = 0x1c53bb6b;
pub const VOID: u64 = 0xec;

pub fn ebml_header(doc_type: &str) -> Vec<u8> {
    master(EBML, &[
        uint(0x4286, 1),
        uint(0x42f7, 1),
        uint(0x42f2, 4),
        uint(0x42f3, 8),
        string(0x4282, doc_type),
        uint(0x4287, 4),
        uint(0x4285, 2),
    ])
}

pub fn info() -> Vec<u8> {
    master(INFO, &[
        uint(0x2ad7b1, 1_000_000),
        string(0x4d80, "libebml v1.4.0 + libmatroska v1.6.2"),
        string(0x5741, "mkvmerge v51.0.0"),
        float64(0x4489, 544.0),
        date(0x4461, 629383704700000000),
        string(0x7ba9, "тестовый файл"),
    ])
}

pub fn tracks() -> Vec<u8> {
    master(TRACKS, &[
        master(TRACK_ENTRY, &[
            uint(0xd7, 1),
            uint(0x73c5, 0x5eed),
            uint(0x83, 1),
            string(0x86, "V_MS/VFW/FOURCC"),
            element(0x63a2, &[0x28; 40]),
            uint(0x23e383, 40_000_000),
            string(0x22b59c, "und"),
            master(0xe0, &[uint(0xb0, 720), uint(0xba, 576), uint(0x54b0, 1024), uint(0x54ba, 576)]),
        ]),
        master(TRACK_ENTRY, &[
            uint(0xd7, 2),
            uint(0x83, 2),
            uint(0x88, 0),
            string(0x86, "A_AC3"),
            master(0xe1, &[float32(0xb5, 48000.0), uint(0x9f, 2)]),
        ]),
        master(TRACK_ENTRY, &[
            uint(0xd7, 3),
            uint(0x83, 0x11),
            uint(0x55aa, 1),
            string(0x86, "S_TEXT/UTF8"),
            string(0x22b59c, "rus"),
            string(0x536e, "Русские"),
        ]),
    ])
}

pub fn attachments(payload: &[u8]) -> Vec<u8> {
    master(ATTACHMENTS, &[
        master(ATTACHED_FILE, &[
            string(0x466e, "пальмовая ветвь"),
            string(0x4660, "image/png"),
            element(0x465c, payload),
            uint(0x46ae, 77),
        ]),
    ])
}

pub fn png_payload(len: usize) -> Vec<u8> {
    let mut payload = vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];
    payload.extend((0..len.saturating_sub(8)).map(|i| (i % 251) as u8));
    payload
}

pub fn segment_children(payload: &[u8]) -> Vec<Vec<u8>> {
    vec![
        master(SEEK_HEAD, &[master(0x4dbb, &[element(0x53ab, &[0x15, 0x49, 0xa9, 0x66]), uint(0x53ac, 0x40)])]),
        element(VOID, &[0; 10]),
        info(),
        tracks(),
        master(CHAPTERS, &[master(0x45b9, &[master(0xb6, &[uint(0x73c4, 1), uint(0x91, 0)])])]),
        attachments(payload),
        master(CLUSTER, &[uint(0xe7, 0), element(0xa3, &[0x81, 0x00, 0x00, 0x80, 0xde, 0xad, 0xbe, 0xef])]),
        master(CUES, &[master(0xbb, &[uint(0xb3, 0), master(0xb7, &[uint(0xf7, 1), uint(0xf1, 0x200)])])]),
    ]
}

pub fn fixture() -> Vec<u8> {
    let payload = png_payload(300);
    [ebml_header("matroska"), master(SEGMENT, &segment_children(&payload))].concat()
}
