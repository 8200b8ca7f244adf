//! OLE2/CFBF compound document container.
//!
//! A compound document is a miniature filesystem inside one file: space is
//! allocated in fixed-size sectors, a FAT-like Sector Allocation Table
//! chains sectors into streams, and a directory maps names to stream
//! heads. Streams smaller than a cutoff live in "short sectors" packed
//! inside a container stream owned by the root directory entry, with
//! their own allocation table.
//!
//! [`CompoundFile`] parses the allocation structures up front;
//! [`Stream`] then exposes any named stream as a seekable byte source.

pub mod directory;
pub mod header;
pub mod sat;
pub mod stream;

use std::io::{Read, Seek, SeekFrom};

use thiserror::Error;

pub use directory::{DirEntry, Directory, EntryType};
pub use header::Header;
pub use sat::{AllocTable, SecId};
pub use stream::Stream;

/// Result type for container operations
pub type CfbResult<T> = std::result::Result<T, CfbError>;

/// Errors from the compound document layer
#[derive(Debug, Error)]
pub enum CfbError {
    /// IO error from the underlying byte source
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The file does not start with the compound document magic
    #[error("wrong file identifier; not a compound document")]
    BadMagic,

    /// The header's byte-order mark is not little-endian
    #[error("unsupported byte order mark 0x{0:04X}; only little-endian files are supported")]
    UnsupportedByteOrder(u16),

    /// An allocation table or sector chain is inconsistent
    #[error("malformed sector chain: {0}")]
    MalformedChain(String),

    /// No directory entry with the requested name
    #[error("no directory entry named {0:?}")]
    NotFound(String),

    /// A seek or read outside the logical stream
    #[error("position out of range: {0}")]
    OutOfRange(String),
}

/// An open compound document.
#[derive(Debug)]
pub struct CompoundFile<R: Read + Seek> {
    source: R,
    header: Header,
    sat: AllocTable,
    ssat: AllocTable,
    directory: Directory,
}

impl<R: Read + Seek> CompoundFile<R> {
    /// Parse the header, allocation tables, and directory of a compound
    /// document.
    pub fn open(mut source: R) -> CfbResult<Self> {
        source.seek(SeekFrom::Start(0))?;
        let mut buf = [0u8; header::HEADER_SIZE];
        source.read_exact(&mut buf)?;
        let header = Header::parse(&buf)?;

        let msat = sat::build_msat(&mut source, &header)?;
        let sat = sat::build_sat(&mut source, &header, &msat)?;
        let ssat = sat::build_ssat(&mut source, &header, &sat)?;
        let directory = Directory::load(&mut source, &header, &sat)?;

        Ok(CompoundFile {
            source,
            header,
            sat,
            ssat,
            directory,
        })
    }

    /// The parsed header.
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// The directory of named entries.
    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    /// Whether a stream or storage with this exact name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.directory.find(name).is_some()
    }

    /// Open the named stream as a seekable byte source.
    ///
    /// Streams at least `stream_min_size` bytes long are chained through
    /// the SAT over whole sectors; smaller ones are chained through the
    /// SSAT over short sectors packed in the root entry's container
    /// stream.
    pub fn stream(&mut self, name: &str) -> CfbResult<Stream<'_, R>> {
        let entry = self
            .directory
            .find(name)
            .ok_or_else(|| CfbError::NotFound(name.to_string()))?;
        if entry.entry_type != EntryType::Stream {
            return Err(CfbError::NotFound(name.to_string()));
        }
        let (first, size) = (entry.first_sec_id, u64::from(entry.size));

        if size >= self.header.stream_min_size {
            let chain = self.sat.chain(first)?;
            Stream::long(&mut self.source, chain, size, self.header.sector_size)
        } else {
            let root = self.directory.root()?;
            let container = self.sat.chain(root.first_sec_id)?;
            let chain = self.ssat.chain(first)?;
            Stream::short(
                &mut self.source,
                chain,
                size,
                container,
                self.header.sector_size,
                self.header.short_sector_size,
            )
        }
    }
}

/// Read one whole sector. Sector N starts at byte `(N + 1) * sector_size`;
/// the header occupies the space before sector 0.
pub(crate) fn read_sector<R: Read + Seek>(
    source: &mut R,
    sec: SecId,
    sector_size: usize,
) -> CfbResult<Vec<u8>> {
    if sec < 0 {
        return Err(CfbError::MalformedChain(format!(
            "attempt to read sentinel sector {sec}"
        )));
    }
    let position = (sec as u64 + 1) * sector_size as u64;
    source.seek(SeekFrom::Start(position))?;
    let mut buf = vec![0u8; sector_size];
    source.read_exact(&mut buf)?;
    Ok(buf)
}
