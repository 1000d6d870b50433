//! Zstandard frame-header decoding.
//!
//! Only the header is touched (no payload block is examined), so parsing is
//! synchronous, allocation-free, and bounded by the header size (at most 18
//! bytes after the magic).
//!
//! Layout (RFC 8878):
//! ```text
//! magic:u32 LE (0xFD2FB528)
//! frame header descriptor: 1 byte
//!   bits 7-6  Frame_Content_Size_flag
//!   bit 5     Single_Segment_flag
//!   bit 4     unused
//!   bit 3     reserved (must be 0)
//!   bit 2     Content_Checksum_flag
//!   bits 1-0  Dictionary_ID_flag
//! window descriptor: 1 byte, absent in single-segment frames
//! dictionary ID: 0 / 1 / 2 / 4 bytes LE
//! frame content size: 0 / 1 / 2 / 4 / 8 bytes LE (2-byte form stores value - 256)
//! ```
//!
//! Skippable frames use magic `0x184D2A5?` followed by a 4-byte LE length.

use std::fmt;

use crate::error::{Error, Result};

/// Magic number opening every standard Zstandard frame (little-endian).
pub const MAGIC: u32 = 0xFD2F_B528;

/// Skippable-frame magic: any value in `0x184D2A50..=0x184D2A5F`.
const SKIPPABLE_MAGIC_START: u32 = 0x184D_2A50;
const SKIPPABLE_MAGIC_MASK: u32 = 0xFFFF_FFF0;

/// Fixed size of a skippable-frame header: magic + 4-byte length.
const SKIPPABLE_HEADER_SIZE: usize = 8;

/// Largest window exponent the format allows on 64-bit targets
/// (`window_log = (byte >> 3) + 10` may not exceed 31).
const MAX_WINDOW_LOG: u32 = 31;

/// Declared decompressed size of a frame.
///
/// A frame written without a known content size (for example by a streaming
/// encoder that was never told the total) carries no FCS field at all; that
/// case surfaces as [`ContentSize::Unknown`], never as a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentSize {
    Known(u64),
    Unknown,
}

impl ContentSize {
    /// The declared size, if the frame carries one.
    pub fn known(self) -> Option<u64> {
        match self {
            ContentSize::Known(n) => Some(n),
            ContentSize::Unknown => None,
        }
    }
}

impl fmt::Display for ContentSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentSize::Known(n) => write!(f, "{n}"),
            ContentSize::Unknown => f.write_str("unknown"),
        }
    }
}

/// The two frame kinds the format defines. Total by construction: parsing
/// decides by magic number, so no third value can ever be observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameType {
    Standard,
    Skippable,
}

impl fmt::Display for FrameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameType::Standard => f.write_str("standard frame"),
            FrameType::Skippable => f.write_str("skippable frame"),
        }
    }
}

/// Decoded frame-header record.
///
/// For skippable frames this mirrors the reference decoder: only
/// `content_size` (the skippable length field) and `frame_type` are
/// populated; every other field is zero, including `header_size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// Declared decompressed size, or [`ContentSize::Unknown`].
    pub content_size: ContentSize,
    /// Back-reference window in bytes. Equals the content size for
    /// single-segment frames.
    pub window_size: u64,
    pub frame_type: FrameType,
    /// Header length in bytes, counting the magic. Never exceeds the length
    /// of the buffer it was parsed from.
    pub header_size: u32,
    /// Dictionary ID, 0 when the frame names none.
    pub dict_id: u32,
    /// Whether a 4-byte content checksum follows the last block.
    pub checksum_flag: bool,
    /// Carried for layout compatibility with the reference decoder's record;
    /// always zero today.
    pub reserved1: u32,
    pub reserved2: u32,
}

/// Decode the frame header at the start of `data`.
///
/// Fails with [`Error::MalformedHeader`] on a truncated buffer, an unknown
/// magic number, a set reserved descriptor bit, or an oversized window.
pub fn parse(data: &[u8]) -> Result<FrameHeader> {
    if data.len() < 4 {
        return Err(truncated("magic number", 4, data.len()));
    }
    let magic = u32::from_le_bytes([data[0], data[1], data[2], data[3]]);

    if magic != MAGIC {
        if magic & SKIPPABLE_MAGIC_MASK == SKIPPABLE_MAGIC_START {
            return parse_skippable(data);
        }
        return Err(Error::MalformedHeader(format!(
            "unknown frame magic 0x{magic:08x}"
        )));
    }

    if data.len() < 5 {
        return Err(truncated("frame header descriptor", 5, data.len()));
    }
    let descriptor = data[4];
    if descriptor & 0x08 != 0 {
        return Err(Error::MalformedHeader(
            "reserved descriptor bit is set".into(),
        ));
    }
    let fcs_code = descriptor >> 6;
    let single_segment = descriptor & 0x20 != 0;
    let checksum_flag = descriptor & 0x04 != 0;
    let did_code = descriptor & 0x03;

    let mut offset = 5usize;

    // Window descriptor, unless the whole frame lives in one segment.
    let mut window_size = 0u64;
    if !single_segment {
        if data.len() < offset + 1 {
            return Err(truncated("window descriptor", offset + 1, data.len()));
        }
        let wd = data[offset];
        offset += 1;
        let window_log = (wd >> 3) as u32 + 10;
        if window_log > MAX_WINDOW_LOG {
            return Err(Error::MalformedHeader(format!(
                "window log {window_log} exceeds maximum {MAX_WINDOW_LOG}"
            )));
        }
        let base = 1u64 << window_log;
        window_size = base + (base >> 3) * u64::from(wd & 0x07);
    }

    let did_len = match did_code {
        0 => 0,
        1 => 1,
        2 => 2,
        _ => 4,
    };
    let dict_id = if did_len > 0 {
        if data.len() < offset + did_len {
            return Err(truncated("dictionary ID", offset + did_len, data.len()));
        }
        let id = read_le(&data[offset..offset + did_len]) as u32;
        offset += did_len;
        id
    } else {
        0
    };

    // FCS flag 0 means "one byte" in single-segment frames and "absent"
    // otherwise; absence is the unknown-size sentinel.
    let fcs_len = match fcs_code {
        0 => usize::from(single_segment),
        1 => 2,
        2 => 4,
        _ => 8,
    };
    let content_size = if fcs_len > 0 {
        if data.len() < offset + fcs_len {
            return Err(truncated("frame content size", offset + fcs_len, data.len()));
        }
        let mut n = read_le(&data[offset..offset + fcs_len]);
        if fcs_len == 2 {
            n += 256;
        }
        offset += fcs_len;
        ContentSize::Known(n)
    } else {
        ContentSize::Unknown
    };

    if single_segment {
        // No window descriptor: the window is the whole content.
        window_size = match content_size {
            ContentSize::Known(n) => n,
            ContentSize::Unknown => 0,
        };
    }

    Ok(FrameHeader {
        content_size,
        window_size,
        frame_type: FrameType::Standard,
        header_size: offset as u32,
        dict_id,
        checksum_flag,
        reserved1: 0,
        reserved2: 0,
    })
}

fn parse_skippable(data: &[u8]) -> Result<FrameHeader> {
    if data.len() < SKIPPABLE_HEADER_SIZE {
        return Err(truncated(
            "skippable frame header",
            SKIPPABLE_HEADER_SIZE,
            data.len(),
        ));
    }
    let skip_len = u32::from_le_bytes([data[4], data[5], data[6], data[7]]);
    Ok(FrameHeader {
        content_size: ContentSize::Known(u64::from(skip_len)),
        window_size: 0,
        frame_type: FrameType::Skippable,
        header_size: 0,
        dict_id: 0,
        checksum_flag: false,
        reserved1: 0,
        reserved2: 0,
    })
}

fn truncated(field: &str, needed: usize, got: usize) -> Error {
    Error::MalformedHeader(format!(
        "truncated at {field}: need {needed} bytes, got {got}"
    ))
}

fn read_le(bytes: &[u8]) -> u64 {
    let mut n = 0u64;
    for (i, &b) in bytes.iter().enumerate() {
        n |= u64::from(b) << (8 * i);
    }
    n
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standard(rest: &[u8]) -> Vec<u8> {
        let mut buf = MAGIC.to_le_bytes().to_vec();
        buf.extend_from_slice(rest);
        buf
    }

    #[test]
    fn single_segment_one_byte_fcs() {
        // descriptor 0x20: single segment, FCS code 0 -> 1-byte size field
        let header = parse(&standard(&[0x20, 0x2A])).unwrap();
        assert_eq!(header.content_size, ContentSize::Known(42));
        assert_eq!(header.window_size, 42);
        assert_eq!(header.frame_type, FrameType::Standard);
        assert_eq!(header.header_size, 6);
        assert!(!header.checksum_flag);
    }

    #[test]
    fn two_byte_fcs_adds_256() {
        // descriptor 0x60: single segment, FCS code 1 -> 2 bytes, value + 256
        let header = parse(&standard(&[0x60, 0x00, 0x01])).unwrap();
        assert_eq!(header.content_size, ContentSize::Known(256 + 256));
    }

    #[test]
    fn eight_byte_fcs() {
        let header = parse(&standard(&[
            0xE0, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08,
        ]))
        .unwrap();
        assert_eq!(header.content_size, ContentSize::Known(0x0807_0605_0403_0201));
    }

    #[test]
    fn no_fcs_is_the_unknown_sentinel() {
        // descriptor 0x00: windowed frame, FCS absent
        let header = parse(&standard(&[0x00, 0x00])).unwrap();
        assert_eq!(header.content_size, ContentSize::Unknown);
        assert_eq!(header.content_size.known(), None);
        assert_eq!(header.window_size, 1024); // exponent 0, mantissa 0
        assert_eq!(header.header_size, 6);
    }

    #[test]
    fn window_descriptor_mantissa() {
        // exponent 0, mantissa 7: 1 KiB + 7/8 KiB
        let header = parse(&standard(&[0x00, 0x07])).unwrap();
        assert_eq!(header.window_size, 1024 + 896);
        // exponent 10, mantissa 0: 1 MiB
        let header = parse(&standard(&[0x00, 0x50])).unwrap();
        assert_eq!(header.window_size, 1024 * 1024);
    }

    #[test]
    fn oversized_window_rejected() {
        // exponent 22 -> window log 32, over the 31 cap
        let err = parse(&standard(&[0x00, 22 << 3])).unwrap_err();
        assert!(matches!(err, Error::MalformedHeader(_)));
    }

    #[test]
    fn dictionary_id_widths() {
        // descriptor 0x21: single segment, 1-byte dict ID, then 1-byte FCS
        let header = parse(&standard(&[0x21, 0x7F, 0x05])).unwrap();
        assert_eq!(header.dict_id, 0x7F);
        assert_eq!(header.content_size, ContentSize::Known(5));
        // descriptor 0x23: single segment, 4-byte dict ID
        let header = parse(&standard(&[0x23, 0x78, 0x56, 0x34, 0x12, 0x00])).unwrap();
        assert_eq!(header.dict_id, 0x1234_5678);
        assert_eq!(header.header_size, 10);
    }

    #[test]
    fn checksum_flag_surfaces() {
        let header = parse(&standard(&[0x24, 0x00])).unwrap();
        assert!(header.checksum_flag);
    }

    #[test]
    fn reserved_bit_rejected() {
        let err = parse(&standard(&[0x08, 0x00])).unwrap_err();
        assert!(err.to_string().contains("reserved"));
    }

    #[test]
    fn bad_magic_rejected() {
        let err = parse(&[0xDE, 0xAD, 0xBE, 0xEF, 0x00]).unwrap_err();
        assert!(err.to_string().contains("magic"));
    }

    #[test]
    fn truncation_at_each_field() {
        assert!(parse(&[]).is_err());
        assert!(parse(&[0x28, 0xB5]).is_err());
        assert!(parse(&standard(&[])).is_err()); // no descriptor
        assert!(parse(&standard(&[0x00])).is_err()); // no window byte
        assert!(parse(&standard(&[0x60, 0x00])).is_err()); // half an FCS field
    }

    #[test]
    fn skippable_frame_mirrors_reference_decoder() {
        let mut buf = 0x184D_2A53u32.to_le_bytes().to_vec();
        buf.extend_from_slice(&1000u32.to_le_bytes());
        let header = parse(&buf).unwrap();
        assert_eq!(header.frame_type, FrameType::Skippable);
        assert_eq!(header.content_size, ContentSize::Known(1000));
        assert_eq!(header.window_size, 0);
        assert_eq!(header.header_size, 0);
        assert_eq!(header.dict_id, 0);
    }

    #[test]
    fn skippable_frame_truncated() {
        let buf = 0x184D_2A50u32.to_le_bytes().to_vec();
        assert!(parse(&buf).is_err());
    }

    #[test]
    fn display_text() {
        assert_eq!(FrameType::Standard.to_string(), "standard frame");
        assert_eq!(FrameType::Skippable.to_string(), "skippable frame");
        assert_eq!(ContentSize::Unknown.to_string(), "unknown");
        assert_eq!(ContentSize::Known(7).to_string(), "7");
    }
}
