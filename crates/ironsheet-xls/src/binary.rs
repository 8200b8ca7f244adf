//! Low-level binary reading helpers.
//!
//! Every multi-byte integer in both layers of the format (the compound
//! document container and the BIFF8 records inside it) is little-endian,
//! and floating point values are IEEE 754 doubles stored as 8
//! little-endian bytes.
//!
//! Two families:
//! - `read_*(data, &mut offset)` — checked, advancing reads used by the
//!   record decoders, where the input length comes from the file;
//! - `*_at(data, offset)` — plain reads for fixed-layout structures
//!   (the 512-byte header, 128-byte directory entries) whose buffers are
//!   sized before parsing.

use thiserror::Error;

/// A checked read ran past the end of the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unexpected end of data at offset {offset}, need {need} bytes")]
pub struct Truncated {
    /// Offset the read started at
    pub offset: usize,
    /// Bytes the read required
    pub need: usize,
}

impl From<Truncated> for crate::error::XlsError {
    fn from(t: Truncated) -> Self {
        crate::error::XlsError::InvalidFormat(t.to_string())
    }
}

#[inline]
fn take<'a>(data: &'a [u8], offset: &mut usize, need: usize) -> Result<&'a [u8], Truncated> {
    let start = *offset;
    let end = start.checked_add(need).filter(|&e| e <= data.len());
    match end {
        Some(end) => {
            *offset = end;
            Ok(&data[start..end])
        }
        None => Err(Truncated {
            offset: start,
            need,
        }),
    }
}

/// Read a `u8`, advancing `offset`.
#[inline]
pub fn read_u8(data: &[u8], offset: &mut usize) -> Result<u8, Truncated> {
    Ok(take(data, offset, 1)?[0])
}

/// Read a little-endian `u16`, advancing `offset`.
#[inline]
pub fn read_u16(data: &[u8], offset: &mut usize) -> Result<u16, Truncated> {
    let b = take(data, offset, 2)?;
    Ok(u16::from_le_bytes([b[0], b[1]]))
}

/// Read a little-endian `u32`, advancing `offset`.
#[inline]
pub fn read_u32(data: &[u8], offset: &mut usize) -> Result<u32, Truncated> {
    let b = take(data, offset, 4)?;
    Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}

/// Read a little-endian `i32`, advancing `offset`.
#[inline]
pub fn read_i32(data: &[u8], offset: &mut usize) -> Result<i32, Truncated> {
    read_u32(data, offset).map(|v| v as i32)
}

/// Read a little-endian IEEE 754 double, advancing `offset`.
#[inline]
pub fn read_f64(data: &[u8], offset: &mut usize) -> Result<f64, Truncated> {
    let b = take(data, offset, 8)?;
    let bytes: [u8; 8] = [b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]];
    Ok(f64::from_le_bytes(bytes))
}

/// Skip `count` bytes, checking they exist.
#[inline]
pub fn skip(data: &[u8], offset: &mut usize, count: usize) -> Result<(), Truncated> {
    take(data, offset, count).map(|_| ())
}

/// Read a little-endian `u16` at a fixed offset.
#[inline]
pub fn u16_at(data: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([data[offset], data[offset + 1]])
}

/// Read a little-endian `u32` at a fixed offset.
#[inline]
pub fn u32_at(data: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}

/// Read a little-endian `i32` at a fixed offset.
#[inline]
pub fn i32_at(data: &[u8], offset: usize) -> i32 {
    u32_at(data, offset) as i32
}
