//! BIFF8 (Binary Interchange File Format) record handling.
//!
//! A BIFF8 stream is a sequence of records, each a 4-byte header (2-byte
//! record code + 2-byte body length) followed by the body. Bodies longer
//! than the per-record limit spill into CONTINUE records (code `0x003C`)
//! that extend the preceding record.
//!
//! CONTINUE bodies are joined into one buffer at read time, but the join
//! offsets are kept in [`Record::borders`]: string character data that
//! crosses a join restarts with a fresh flags byte, so the string decoder
//! needs to know exactly where the seams are.

pub mod formula;
pub mod records;
pub mod strings;

use std::io::{Read, Seek, SeekFrom};

use crate::binary::u16_at;
use crate::error::{XlsError, XlsResult};

/// A single BIFF8 record with CONTINUE bodies already merged.
#[derive(Debug, Clone)]
pub struct Record {
    code: u16,
    data: Vec<u8>,
    borders: Vec<usize>,
}

impl Record {
    /// Read one record, gluing any CONTINUE records that follow it.
    ///
    /// The stream is left positioned at the next non-CONTINUE record
    /// header (or at the end of the stream).
    pub fn read<R: Read + Seek>(stream: &mut R) -> XlsResult<Record> {
        let mut header = [0u8; 4];
        stream.read_exact(&mut header).map_err(truncated)?;
        let code = u16_at(&header, 0);
        let length = u16_at(&header, 2) as usize;

        let mut data = vec![0u8; length];
        stream.read_exact(&mut data).map_err(truncated)?;

        let mut borders = Vec::new();
        loop {
            let mark = stream.stream_position()?;
            match stream.read_exact(&mut header) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    stream.seek(SeekFrom::Start(mark))?;
                    break;
                }
                Err(e) => return Err(e.into()),
            }
            if u16_at(&header, 0) != records::CONTINUE {
                stream.seek(SeekFrom::Start(mark))?;
                break;
            }

            let length = u16_at(&header, 2) as usize;
            borders.push(data.len());
            let start = data.len();
            data.resize(start + length, 0);
            stream.read_exact(&mut data[start..]).map_err(truncated)?;
        }

        Ok(Record {
            code,
            data,
            borders,
        })
    }

    /// Record code (e.g. [`records::SST`]).
    pub fn code(&self) -> u16 {
        self.code
    }

    /// Record body with CONTINUE bodies concatenated.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Offsets into [`Self::data`] where CONTINUE bodies were joined,
    /// strictly increasing. The implicit leading 0 is not stored.
    pub fn borders(&self) -> &[usize] {
        &self.borders
    }
}

fn truncated(e: std::io::Error) -> XlsError {
    if e.kind() == std::io::ErrorKind::UnexpectedEof {
        XlsError::InvalidFormat("unexpected end of the workbook stream inside a record".to_string())
    } else {
        XlsError::Io(e)
    }
}

/// Extract `(version, substream_type)` from a BOF record body.
///
/// `version` is `0x0600` for BIFF8; `substream_type` is `0x0005` for
/// workbook globals, `0x0010` for a worksheet, and so on.
pub fn parse_bof(data: &[u8]) -> XlsResult<(u16, u16)> {
    if data.len() < 4 {
        return Err(XlsError::InvalidFormat("BOF record too short".to_string()));
    }
    Ok((u16_at(data, 0), u16_at(data, 2)))
}

/// Decode an RK-packed number.
///
/// RK squeezes a number into 30 bits plus two flag bits:
/// - bit 1 set: bits 2..31 are a signed integer;
///   clear: bits 2..31 are the top 30 bits of an IEEE 754 double, the
///   remaining 34 bits zero;
/// - bit 0 set: divide the decoded value by 100.
#[inline]
pub fn decode_rk(rk: u32) -> f64 {
    let value = if rk & 0x02 != 0 {
        ((rk as i32) >> 2) as f64
    } else {
        f64::from_bits(u64::from(rk & 0xFFFF_FFFC) << 32)
    };

    if rk & 0x01 != 0 {
        value / 100.0
    } else {
        value
    }
}
