//! Compound document directory.
//!
//! The directory stream is an array of 128-byte entries naming every
//! stream and storage in the file. On disk the entries form a red-black
//! tree for lookup; the tree links are ignored here and names are
//! resolved with a flat scan, which is all a workbook reader needs.

use std::io::{Read, Seek};

use crate::binary::{i32_at, u16_at, u32_at};

use super::header::Header;
use super::sat::{AllocTable, SecId};
use super::{read_sector, CfbError, CfbResult};

/// Size of one directory entry on disk.
pub const DIR_ENTRY_SIZE: usize = 128;

/// Directory entry kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryType {
    /// Unused slot
    Empty,
    /// A storage (folder-like, no data of its own)
    Storage,
    /// A user stream
    Stream,
    /// The root storage; owns the short-stream container
    Root,
}

impl EntryType {
    fn from_byte(b: u8) -> EntryType {
        match b {
            1 => EntryType::Storage,
            2 => EntryType::Stream,
            5 => EntryType::Root,
            _ => EntryType::Empty,
        }
    }
}

/// One directory entry.
#[derive(Debug, Clone)]
pub struct DirEntry {
    /// Decoded UTF-16 name (at most 31 characters)
    pub name: String,
    /// Entry kind
    pub entry_type: EntryType,
    /// First sector of the entry's stream
    pub first_sec_id: SecId,
    /// Stream length in bytes; for the root entry, the total length of
    /// the short-stream container
    pub size: u32,
}

/// The parsed directory.
#[derive(Debug, Clone)]
pub struct Directory {
    entries: Vec<DirEntry>,
}

impl Directory {
    /// Read and parse the directory stream.
    pub fn load<R: Read + Seek>(
        source: &mut R,
        header: &Header,
        sat: &AllocTable,
    ) -> CfbResult<Directory> {
        let chain = sat.chain(header.dir_stream_sec_id)?;
        let mut data = Vec::with_capacity(chain.len() * header.sector_size);
        for &sec in &chain {
            data.extend_from_slice(&read_sector(source, sec, header.sector_size)?);
        }

        let entries: Vec<DirEntry> = data.chunks_exact(DIR_ENTRY_SIZE).map(parse_entry).collect();
        if entries.is_empty() {
            return Err(CfbError::MalformedChain(
                "directory stream has no entries".to_string(),
            ));
        }
        Ok(Directory { entries })
    }

    /// The root entry (always entry 0).
    pub fn root(&self) -> CfbResult<&DirEntry> {
        self.entries
            .first()
            .filter(|e| e.entry_type == EntryType::Root)
            .ok_or_else(|| {
                CfbError::MalformedChain("directory entry 0 is not the root storage".to_string())
            })
    }

    /// Find a stream, storage, or root entry by exact (case-sensitive)
    /// name.
    pub fn find(&self, name: &str) -> Option<&DirEntry> {
        self.entries.iter().find(|e| {
            matches!(
                e.entry_type,
                EntryType::Stream | EntryType::Storage | EntryType::Root
            ) && e.name == name
        })
    }

    /// All entries, in directory order (including empty slots).
    pub fn entries(&self) -> &[DirEntry] {
        &self.entries
    }
}

fn parse_entry(raw: &[u8]) -> DirEntry {
    // Name: UTF-16LE at offset 0, length in bytes (terminator included)
    // at offset 64. Anything inconsistent is treated as an unnamed slot.
    let name_len = u16_at(raw, 64) as usize;
    let name = if (2..=64).contains(&name_len) && name_len % 2 == 0 {
        decode_utf16le(&raw[0..name_len - 2])
    } else {
        String::new()
    };

    DirEntry {
        name,
        entry_type: EntryType::from_byte(raw[66]),
        first_sec_id: i32_at(raw, 116),
        size: u32_at(raw, 120),
    }
}

fn decode_utf16le(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    String::from_utf16_lossy(&units)
}
