//! Compound document header.
//!
//! The first 512 bytes of the file. Everything the container layer needs
//! is here: sector sizes, the entry points of the three allocation
//! tables, and the head of the directory stream.

use crate::binary::{i32_at, u16_at, u32_at};

use super::sat::SecId;
use super::{CfbError, CfbResult};

/// The header always occupies 512 bytes, regardless of sector size.
pub const HEADER_SIZE: usize = 512;

/// Number of MSAT entries stored directly in the header.
pub const MSAT_ENTRIES_IN_HEADER: usize = 109;

/// Compound document file identifier.
pub const MAGIC: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// Byte-order mark for little-endian files (`FE FF` on disk).
const BYTE_ORDER_LITTLE_ENDIAN: u16 = 0xFFFE;

/// Parsed compound document header.
#[derive(Debug, Clone)]
pub struct Header {
    /// Sector size in bytes (header stores the power of two)
    pub sector_size: usize,
    /// Short-sector size in bytes
    pub short_sector_size: usize,
    /// Total number of sectors used for the SAT
    pub sectors_in_sat: u32,
    /// First sector of the directory stream
    pub dir_stream_sec_id: SecId,
    /// Minimum byte size of a SAT-chained (standard) stream
    pub stream_min_size: u64,
    /// First sector of the short-sector allocation table
    pub ssat_first_sec_id: SecId,
    /// Total number of sectors used for the SSAT
    pub sectors_in_ssat: u32,
    /// First sector of the master sector allocation table
    pub msat_first_sec_id: SecId,
    /// Total number of sectors used for the MSAT beyond the header
    pub sectors_in_msat: u32,
    /// The first 109 MSAT entries, stored in the header itself
    pub msat_head: [SecId; MSAT_ENTRIES_IN_HEADER],
}

impl Header {
    /// Parse the header from the first 512 bytes of the file.
    pub fn parse(buf: &[u8; HEADER_SIZE]) -> CfbResult<Header> {
        if buf[0..8] != MAGIC {
            return Err(CfbError::BadMagic);
        }

        let byte_order = u16_at(buf, 28);
        if byte_order != BYTE_ORDER_LITTLE_ENDIAN {
            return Err(CfbError::UnsupportedByteOrder(byte_order));
        }

        let sector_size_power = u16_at(buf, 30);
        let short_sector_size_power = u16_at(buf, 32);
        // Powers outside this window cannot describe a real file and
        // would overflow the shift below.
        if !(4..=20).contains(&sector_size_power)
            || short_sector_size_power > sector_size_power
        {
            return Err(CfbError::MalformedChain(format!(
                "implausible sector size powers {sector_size_power}/{short_sector_size_power}"
            )));
        }

        let sectors_in_sat = i32_at(buf, 44);
        let sectors_in_ssat = i32_at(buf, 64);
        let sectors_in_msat = i32_at(buf, 72);
        if sectors_in_sat < 0 || sectors_in_ssat < 0 || sectors_in_msat < 0 {
            return Err(CfbError::MalformedChain(
                "negative sector count in header".to_string(),
            ));
        }

        let mut msat_head = [0 as SecId; MSAT_ENTRIES_IN_HEADER];
        for (i, entry) in msat_head.iter_mut().enumerate() {
            *entry = i32_at(buf, 76 + i * 4);
        }

        Ok(Header {
            sector_size: 1usize << sector_size_power,
            short_sector_size: 1usize << short_sector_size_power,
            sectors_in_sat: sectors_in_sat as u32,
            dir_stream_sec_id: i32_at(buf, 48),
            stream_min_size: u64::from(u32_at(buf, 56)),
            ssat_first_sec_id: i32_at(buf, 60),
            sectors_in_ssat: sectors_in_ssat as u32,
            msat_first_sec_id: i32_at(buf, 68),
            sectors_in_msat: sectors_in_msat as u32,
            msat_head,
        })
    }
}
