//! Stream virtualizer.
//!
//! Presents a directory entry's fragmented sector chain as one logical,
//! seekable byte stream. Long streams read whole sectors at absolute file
//! offsets; short streams read short sectors that live inside the root
//! entry's container stream, so every access translates twice: logical
//! offset → short sector → container offset → file offset.
//!
//! The chain is materialized once at construction (with cycle detection),
//! after which positioning is pure arithmetic.

use std::cmp;
use std::io::{self, Read, Seek, SeekFrom};

use super::sat::SecId;
use super::{CfbError, CfbResult};

#[derive(Debug)]
enum Backing {
    /// Sectors addressed directly in the file
    Long { sector_size: u64 },
    /// Short sectors addressed inside the root container stream
    Short {
        short_sector_size: u64,
        sector_size: u64,
        /// The container's own (long) sector chain
        container: Vec<SecId>,
    },
}

/// A logical stream over a sector chain.
#[derive(Debug)]
pub struct Stream<'a, R: Read + Seek> {
    source: &'a mut R,
    backing: Backing,
    chain: Vec<SecId>,
    size: u64,
    pos: u64,
}

impl<'a, R: Read + Seek> Stream<'a, R> {
    /// Stream backed by whole sectors chained through the SAT.
    pub(crate) fn long(
        source: &'a mut R,
        chain: Vec<SecId>,
        size: u64,
        sector_size: usize,
    ) -> CfbResult<Self> {
        let stream = Stream {
            source,
            backing: Backing::Long {
                sector_size: sector_size as u64,
            },
            chain,
            size,
            pos: 0,
        };
        stream.check_chain_covers_size()?;
        Ok(stream)
    }

    /// Stream backed by short sectors chained through the SSAT, stored
    /// inside the root entry's container stream.
    pub(crate) fn short(
        source: &'a mut R,
        chain: Vec<SecId>,
        size: u64,
        container: Vec<SecId>,
        sector_size: usize,
        short_sector_size: usize,
    ) -> CfbResult<Self> {
        let stream = Stream {
            source,
            backing: Backing::Short {
                short_sector_size: short_sector_size as u64,
                sector_size: sector_size as u64,
                container,
            },
            chain,
            size,
            pos: 0,
        };
        stream.check_chain_covers_size()?;
        Ok(stream)
    }

    fn check_chain_covers_size(&self) -> CfbResult<()> {
        let needed = self.size.div_ceil(self.unit());
        if (self.chain.len() as u64) < needed {
            return Err(CfbError::MalformedChain(format!(
                "chain of {} sectors cannot back a stream of {} bytes",
                self.chain.len(),
                self.size
            )));
        }
        Ok(())
    }

    /// Sector size the chain is expressed in.
    fn unit(&self) -> u64 {
        match &self.backing {
            Backing::Long { sector_size } => *sector_size,
            Backing::Short {
                short_sector_size, ..
            } => *short_sector_size,
        }
    }

    /// Translate a logical offset to an absolute file offset.
    fn file_offset(&self, pos: u64) -> CfbResult<u64> {
        let unit = self.unit();
        let sec = self.chain[(pos / unit) as usize];
        let intra = pos % unit;
        match &self.backing {
            Backing::Long { sector_size } => Ok((sec as u64 + 1) * sector_size + intra),
            Backing::Short {
                short_sector_size,
                sector_size,
                container,
            } => {
                let container_off = sec as u64 * short_sector_size + intra;
                let container_sec = container
                    .get((container_off / sector_size) as usize)
                    .copied()
                    .ok_or_else(|| {
                        CfbError::MalformedChain(format!(
                            "short sector {sec} lies outside the container stream"
                        ))
                    })?;
                Ok((container_sec as u64 + 1) * sector_size + container_off % sector_size)
            }
        }
    }

    /// Total logical length in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Current logical position.
    pub fn pos(&self) -> u64 {
        self.pos
    }

    /// Whether the position has reached the end of the stream.
    pub fn eof(&self) -> bool {
        self.pos >= self.size
    }

    /// Reposition the stream. Seeking before the start or past the end
    /// is an error; seeking exactly to the end is allowed.
    pub fn seek(&mut self, pos: SeekFrom) -> CfbResult<u64> {
        let target: i128 = match pos {
            SeekFrom::Start(off) => off as i128,
            SeekFrom::Current(delta) => self.pos as i128 + delta as i128,
            SeekFrom::End(delta) => self.size as i128 + delta as i128,
        };
        if target < 0 || target > self.size as i128 {
            return Err(CfbError::OutOfRange(format!(
                "seek to {target} in a stream of {} bytes",
                self.size
            )));
        }
        self.pos = target as u64;
        Ok(self.pos)
    }

    /// Read up to `buf.len()` bytes, crossing sector boundaries as
    /// needed. Returns the number of bytes read; 0 at end of stream.
    pub fn read(&mut self, buf: &mut [u8]) -> CfbResult<usize> {
        let mut written = 0usize;
        while written < buf.len() && self.pos < self.size {
            let unit = self.unit();
            let left_in_sector = unit - self.pos % unit;
            let left_in_stream = self.size - self.pos;
            let step = cmp::min(
                (buf.len() - written) as u64,
                cmp::min(left_in_sector, left_in_stream),
            ) as usize;

            let file_off = self.file_offset(self.pos)?;
            self.source.seek(SeekFrom::Start(file_off))?;
            self.source.read_exact(&mut buf[written..written + step])?;

            written += step;
            self.pos += step as u64;
        }
        Ok(written)
    }

    /// Read exactly `buf.len()` bytes or fail with `OutOfRange`.
    pub fn read_exact(&mut self, buf: &mut [u8]) -> CfbResult<()> {
        let n = self.read(buf)?;
        if n < buf.len() {
            return Err(CfbError::OutOfRange(format!(
                "read of {} bytes at position {} in a stream of {} bytes",
                buf.len(),
                self.pos - n as u64,
                self.size
            )));
        }
        Ok(())
    }
}

fn to_io_error(err: CfbError) -> io::Error {
    match err {
        CfbError::Io(e) => e,
        CfbError::OutOfRange(_) => io::Error::new(io::ErrorKind::UnexpectedEof, err),
        other => io::Error::new(io::ErrorKind::InvalidData, other),
    }
}

impl<R: Read + Seek> Read for Stream<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Stream::read(self, buf).map_err(to_io_error)
    }
}

impl<R: Read + Seek> Seek for Stream<'_, R> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        Stream::seek(self, pos).map_err(to_io_error)
    }

    fn stream_position(&mut self) -> io::Result<u64> {
        Ok(self.pos)
    }
}
