//!
//! Contains the pure decoding functions used by the cursor: variable-length integers and EBML scalar values.
//!
//! None of these perform I/O; they operate on bytes that are already buffered.
//!

use chrono::{DateTime, Utc};

use super::element::ElementSize;
use super::errors::tool::ToolError;

/// Seconds between the unix epoch and the EBML date epoch (2001-01-01T00:00:00 UTC).
const EBML_EPOCH_UNIX_SECONDS: i64 = 978_307_200;

/// Longest element id, in octets, this crate accepts.
pub const MAX_ID_LENGTH: usize = 4;

/// Longest vint, in octets, EBML allows.
pub const MAX_VINT_LENGTH: usize = 8;

///
/// Returns the length in octets of the vint that starts with `first`.
///
/// # Errors
///
/// This method returns an error if `first` is zero, meaning no length marker is present within 8 octets.
///
pub fn vint_length(first: u8) -> Result<usize, ToolError> {
    if first == 0 {
        return Err(ToolError::ReadVintOverflow);
    }
    Ok(first.leading_zeros() as usize + 1)
}

///
/// Reads a vint from the beginning of the input array slice.
///
/// This method returns an option with the `None` variant used to indicate there was not enough data in the buffer to completely read a vint.
///
/// The returned tuple contains the value of the vint (`u64`, marker bit removed) and the length of the vint (`usize`).  The length will be less than or equal to the length of the input slice.
///
/// # Errors
///
/// This method can return a `ToolError` if the input array cannot be read as a vint.
///
pub fn read_vint(buffer: &[u8]) -> Result<Option<(u64, usize)>, ToolError> {
    if buffer.is_empty() {
        return Ok(None);
    }

    let length = vint_length(buffer[0])?;

    if length > buffer.len() {
        // Not enough data in the buffer to read out the vint value
        return Ok(None);
    }

    let mut value = buffer[0] as u64;
    value -= 1 << (8 - length);

    for item in buffer.iter().take(length).skip(1) {
        value <<= 8;
        value += *item as u64;
    }

    Ok(Some((value, length)))
}

///
/// Reads an element id from the beginning of the input array slice.
///
/// Unlike sizes, ids keep their marker bits, so `[0x1a, 0x45, 0xdf, 0xa3]` reads as `0x1a45dfa3`.
///
/// # Errors
///
/// Returns an error if the vint is malformed or longer than [`MAX_ID_LENGTH`].
///
pub fn read_element_id(buffer: &[u8]) -> Result<Option<(u64, usize)>, ToolError> {
    match read_vint(buffer)? {
        Some((_, length)) if length > MAX_ID_LENGTH => Err(ToolError::ReadIdOverflow(length)),
        Some((value, length)) => Ok(Some((value + (1 << (7 * length)), length))),
        None => Ok(None),
    }
}

///
/// Reads an element size from the beginning of the input array slice.
///
/// A size whose value bits are all set reads as [`ElementSize::Unknown`].
///
/// # Errors
///
/// Returns an error if the vint is malformed.
///
pub fn read_element_size(buffer: &[u8]) -> Result<Option<(ElementSize, usize)>, ToolError> {
    Ok(read_vint(buffer)?.map(|(value, length)| (ElementSize::new(value, length), length)))
}

///
/// Reads a `u64` value from any length array slice.
///
/// Rather than forcing the input to be a `[u8; 8]` like standard library methods, this can interpret a `u64` from a slice of any length <= 8.  Bytes are big-endian - i.e. an array of `[4, 0]` would return a value of `1024`.  An empty slice reads as `0`.
///
/// # Errors
///
/// This method will return an error if the input slice has a length > 8.
///
/// ## Example
///
/// ```
/// # use ebml_cursor::tools::arr_to_u64;
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let result = arr_to_u64(&[16,0])?;
/// assert_eq!(result, 4096);
/// # Ok(())
/// # }
/// ```
///
pub fn arr_to_u64(arr: &[u8]) -> Result<u64, ToolError> {
    if arr.len() > 8 {
        return Err(ToolError::ReadU64Overflow(Vec::from(arr)));
    }

    let mut val = 0u64;
    for byte in arr {
        val = (val << 8) | *byte as u64;
    }
    Ok(val)
}

///
/// Reads an `i64` value from any length array slice.
///
/// The value is two's complement big-endian, sign extended from the first byte.  An empty slice reads as `0`.
///
/// # Errors
///
/// This method will return an error if the input slice has a length > 8.
///
/// ## Example
///
/// ```
/// # use ebml_cursor::tools::arr_to_i64;
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// assert_eq!(arr_to_i64(&[4,0])?, 1024);
/// assert_eq!(arr_to_i64(&[0xff,0xfe])?, -2);
/// # Ok(())
/// # }
/// ```
///
pub fn arr_to_i64(arr: &[u8]) -> Result<i64, ToolError> {
    if arr.len() > 8 {
        return Err(ToolError::ReadI64Overflow(Vec::from(arr)));
    }

    let mut val: i64 = match arr.first() {
        Some(first) if *first > 127 => -1,
        _ => 0,
    };
    for byte in arr {
        val = (val << 8) | *byte as i64;
    }
    Ok(val)
}

///
/// Reads an `f64` value from an array slice of length 4 or 8.
///
/// This method wraps `f32` and `f64` conversions from big endian byte arrays and casts the result as an `f64`.
///
/// # Errors
///
/// This method will return an error if the input slice length is not 4 or 8.
///
pub fn arr_to_f64(arr: &[u8]) -> Result<f64, ToolError> {
    match arr.len() {
        4 => {
            let mut bytes = [0u8; 4];
            bytes.copy_from_slice(arr);
            Ok(f32::from_be_bytes(bytes) as f64)
        },
        8 => {
            let mut bytes = [0u8; 8];
            bytes.copy_from_slice(arr);
            Ok(f64::from_be_bytes(bytes))
        },
        _ => Err(ToolError::ReadF64Mismatch(Vec::from(arr))),
    }
}

///
/// Reads an EBML date from an array slice of length 8.
///
/// EBML dates are a signed count of nanoseconds relative to 2001-01-01T00:00:00 UTC.
///
/// # Errors
///
/// This method will return an error if the input slice length is not 8 or if the offset cannot be represented as a timestamp.
///
pub fn arr_to_date(arr: &[u8]) -> Result<DateTime<Utc>, ToolError> {
    if arr.len() != 8 {
        return Err(ToolError::ReadDateMismatch(Vec::from(arr)));
    }

    let offset = arr_to_i64(arr)?;
    EBML_EPOCH_UNIX_SECONDS
        .checked_mul(1_000_000_000)
        .and_then(|epoch| epoch.checked_add(offset))
        .map(DateTime::from_timestamp_nanos)
        .ok_or(ToolError::DateOutOfRange(offset))
}

///
/// Reads an ASCII string.  Trailing NUL padding is removed.
///
/// # Errors
///
/// This method will return an error if any byte is greater than 127.
///
pub fn arr_to_ascii(arr: &[u8]) -> Result<String, ToolError> {
    if let Some((index, byte)) = arr.iter().enumerate().find(|(_, b)| !b.is_ascii()) {
        return Err(ToolError::InvalidAscii { byte: *byte, index });
    }

    Ok(trim_padding(arr.iter().map(|b| *b as char).collect()))
}

///
/// Reads a UTF-8 string.  Trailing NUL padding is removed.
///
/// # Errors
///
/// This method will return an error if the input is not valid UTF-8.
///
pub fn arr_to_utf8(arr: &[u8]) -> Result<String, ToolError> {
    String::from_utf8(arr.to_vec())
        .map(trim_padding)
        .map_err(|e| ToolError::FromUtf8Error(arr.to_vec(), e))
}

fn trim_padding(mut value: String) -> String {
    let len = value.trim_end_matches('\0').len();
    value.truncate(len);
    value
}
