//! Sector allocation tables.
//!
//! Three tables with one shape: a sequence of [`SecId`]s indexed by
//! sector, where entry S names the sector following S in its chain.
//! - the MSAT lists which sectors hold the SAT (first 109 entries in the
//!   header, the rest chained through dedicated sectors);
//! - the SAT chains ordinary sectors;
//! - the SSAT chains short sectors inside the root container stream.

use std::io::{Read, Seek};

use crate::binary::i32_at;

use super::header::Header;
use super::{read_sector, CfbError, CfbResult};

/// Signed 32-bit sector identifier.
pub type SecId = i32;

/// Unallocated sector.
pub const FREE_SEC_ID: SecId = -1;
/// Terminates every sector chain.
pub const END_OF_CHAIN_SEC_ID: SecId = -2;
/// Sector is part of the SAT itself.
pub const SAT_SEC_ID: SecId = -3;
/// Sector is part of the MSAT.
pub const MSAT_SEC_ID: SecId = -4;

/// One allocation table: `next(s)` follows the chain one step.
#[derive(Debug, Clone, Default)]
pub struct AllocTable {
    entries: Vec<SecId>,
}

impl AllocTable {
    /// Wrap a decoded entry list.
    pub fn new(entries: Vec<SecId>) -> Self {
        AllocTable { entries }
    }

    /// Number of entries (indexable sectors).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The sector following `sec` in its chain.
    pub fn next(&self, sec: SecId) -> CfbResult<SecId> {
        if sec < 0 {
            return Err(CfbError::MalformedChain(format!(
                "chain walks through sentinel sector {sec}"
            )));
        }
        self.entries
            .get(sec as usize)
            .copied()
            .ok_or_else(|| {
                CfbError::MalformedChain(format!(
                    "sector {sec} beyond allocation table of {} entries",
                    self.entries.len()
                ))
            })
    }

    /// Collect the whole chain starting at `first`, in order.
    ///
    /// An unallocated head (`-1`) yields an empty chain (zero-length
    /// streams are stored that way). A chain longer than the table must
    /// contain a cycle and is rejected.
    pub fn chain(&self, first: SecId) -> CfbResult<Vec<SecId>> {
        let mut chain = Vec::new();
        let mut cur = first;
        loop {
            match cur {
                END_OF_CHAIN_SEC_ID => return Ok(chain),
                FREE_SEC_ID if chain.is_empty() => return Ok(chain),
                sec if sec < 0 => {
                    return Err(CfbError::MalformedChain(format!(
                        "chain interrupted by sentinel sector {sec}"
                    )))
                }
                sec => {
                    if chain.len() >= self.entries.len() {
                        return Err(CfbError::MalformedChain(format!(
                            "cycle detected in chain starting at sector {first}"
                        )));
                    }
                    chain.push(sec);
                    cur = self.next(sec)?;
                }
            }
        }
    }
}

/// Build the MSAT: the header's 109 entries, then any continuation
/// sectors. Each continuation sector carries `sector_size / 4 - 1`
/// entries followed by the SecID of the next continuation sector.
pub fn build_msat<R: Read + Seek>(source: &mut R, header: &Header) -> CfbResult<Vec<SecId>> {
    let mut msat: Vec<SecId> = header.msat_head.to_vec();
    let entries_per_sector = header.sector_size / 4 - 1;

    let mut cur = header.msat_first_sec_id;
    let mut sectors_read = 0u32;
    while cur != END_OF_CHAIN_SEC_ID && cur != FREE_SEC_ID {
        if cur < 0 {
            return Err(CfbError::MalformedChain(format!(
                "MSAT continues through sentinel sector {cur}"
            )));
        }
        if sectors_read >= header.sectors_in_msat {
            return Err(CfbError::MalformedChain(format!(
                "MSAT chain exceeds the {} sectors declared in the header",
                header.sectors_in_msat
            )));
        }
        let buf = read_sector(source, cur, header.sector_size)?;
        for i in 0..entries_per_sector {
            msat.push(i32_at(&buf, i * 4));
        }
        cur = i32_at(&buf, entries_per_sector * 4);
        sectors_read += 1;
    }

    msat.truncate(header.sectors_in_sat as usize);
    Ok(msat)
}

/// Build the SAT by concatenating every sector the MSAT lists.
pub fn build_sat<R: Read + Seek>(
    source: &mut R,
    header: &Header,
    msat: &[SecId],
) -> CfbResult<AllocTable> {
    let entries_per_sector = header.sector_size / 4;
    let mut entries = Vec::with_capacity(msat.len() * entries_per_sector);

    for &sec in msat {
        if sec < 0 {
            return Err(CfbError::MalformedChain(format!(
                "MSAT lists sentinel sector {sec} as a SAT sector"
            )));
        }
        let buf = read_sector(source, sec, header.sector_size)?;
        for i in 0..entries_per_sector {
            entries.push(i32_at(&buf, i * 4));
        }
    }

    Ok(AllocTable::new(entries))
}

/// Build the SSAT by following its chain through the SAT for the number
/// of sectors the header declares.
pub fn build_ssat<R: Read + Seek>(
    source: &mut R,
    header: &Header,
    sat: &AllocTable,
) -> CfbResult<AllocTable> {
    let entries_per_sector = header.sector_size / 4;
    let mut entries = Vec::with_capacity(header.sectors_in_ssat as usize * entries_per_sector);

    let mut cur = header.ssat_first_sec_id;
    for _ in 0..header.sectors_in_ssat {
        if cur < 0 {
            return Err(CfbError::MalformedChain(format!(
                "SSAT chain shorter than the {} sectors declared in the header",
                header.sectors_in_ssat
            )));
        }
        let buf = read_sector(source, cur, header.sector_size)?;
        for i in 0..entries_per_sector {
            entries.push(i32_at(&buf, i * 4));
        }
        cur = sat.next(cur)?;
    }

    Ok(AllocTable::new(entries))
}
