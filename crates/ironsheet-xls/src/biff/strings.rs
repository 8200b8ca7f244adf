//! BIFF8 string decoding.
//!
//! A BIFF8 string is a character count (1 byte in BOUNDSHEET-style short
//! strings, 2 bytes everywhere else), a flags byte, optional rich-text
//! and extended-data headers, the character data, then the rich/extended
//! payloads:
//! - flags bit 0 (`fHighByte`): 0 = one byte per character, widened by
//!   zero extension; 1 = UTF-16LE
//! - flags bit 2 (`fExtSt`): 4-byte extended-data size follows the
//!   header, extended data trails the characters
//! - flags bit 3 (`fRichSt`): 2-byte run count follows the header, runs
//!   (4 bytes each) trail the characters
//!
//! When character data crosses a CONTINUE boundary (a `borders` offset of
//! the carrying record), the first byte after the seam is a fresh flags
//! byte — only the wideness bit matters there — and no new character
//! count. Rich and extended payloads do not restart at seams.

use crate::binary::{read_u16, read_u32, read_u8, skip};
use crate::error::{XlsError, XlsResult};

/// Read a short string: 1-byte character count (BOUNDSHEET sheet names).
pub fn read_short_string(data: &[u8], borders: &[usize], offset: &mut usize) -> XlsResult<String> {
    let char_count = read_u8(data, offset)? as usize;
    read_string_tail(data, borders, offset, char_count)
}

/// Read a unicode string: 2-byte character count (SST, LABEL, STRING).
pub fn read_unicode_string(
    data: &[u8],
    borders: &[usize],
    offset: &mut usize,
) -> XlsResult<String> {
    let char_count = read_u16(data, offset)? as usize;
    read_string_tail(data, borders, offset, char_count)
}

/// Decode flags, headers, and exactly `char_count` characters.
fn read_string_tail(
    data: &[u8],
    borders: &[usize],
    offset: &mut usize,
    char_count: usize,
) -> XlsResult<String> {
    let flags = read_u8(data, offset)?;
    let mut wide = flags & 0x01 != 0;
    let rich = flags & 0x08 != 0;
    let ext = flags & 0x04 != 0;

    let run_count = if rich { read_u16(data, offset)? } else { 0 };
    let ext_size = if ext { read_u32(data, offset)? } else { 0 };

    let mut units: Vec<u16> = Vec::with_capacity(char_count);
    for _ in 0..char_count {
        // A seam in the carrying record restarts the encoding: the next
        // byte is a new flags byte, and the wideness may have flipped.
        if borders.binary_search(offset).is_ok() {
            let seam_flags = read_u8(data, offset)?;
            wide = seam_flags & 0x01 != 0;
        }
        if wide {
            units.push(read_u16(data, offset)?);
        } else {
            units.push(u16::from(read_u8(data, offset)?));
        }
    }

    if rich {
        skip(data, offset, run_count as usize * 4)?;
    }
    if ext {
        skip(data, offset, ext_size as usize)?;
    }

    String::from_utf16(&units)
        .map_err(|e| XlsError::InvalidFormat(format!("invalid UTF-16 string data: {e}")))
}
