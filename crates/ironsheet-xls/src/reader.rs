//! XLS workbook driver.
//!
//! Opens the compound document, finds the `Workbook` (or `Book`) stream,
//! scans the workbook globals (BOF gate, shared strings, bound sheets,
//! date mode), then seeks to each worksheet substream and dispatches its
//! cell records into a [`Storage`] sink.

use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use ironsheet_core::{DateMode, Storage, Workbook, WorkbookStorage};

use crate::biff::formula::parse_formula;
use crate::biff::{self, decode_rk, records, strings, Record};
use crate::binary::{read_f64, read_i32, read_u16, read_u32, read_u8, skip, u16_at};
use crate::cfb::CompoundFile;
use crate::error::{XlsError, XlsResult};

/// XLS file reader.
pub struct XlsReader;

/// Substream kind from the high byte of the BOUNDSHEET type field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SheetKind {
    Worksheet,
    MacroSheet,
    Chart,
    VisualBasicModule,
    Other(u8),
}

impl SheetKind {
    fn from_type_byte(b: u8) -> SheetKind {
        match b {
            0x00 => SheetKind::Worksheet,
            0x01 => SheetKind::MacroSheet,
            0x02 => SheetKind::Chart,
            0x06 => SheetKind::VisualBasicModule,
            other => SheetKind::Other(other),
        }
    }
}

/// Metadata parsed from a BOUNDSHEET record.
#[derive(Debug)]
struct BoundSheet {
    /// Byte offset of the sheet's BOF within the workbook stream
    bof_position: u32,
    /// Sheet visibility: 0 = visible, 1 = hidden, 2 = very hidden
    #[allow(dead_code)]
    visibility: u8,
    /// Substream kind
    kind: SheetKind,
    /// Sheet name
    name: String,
}

impl XlsReader {
    /// Read an XLS workbook from a filesystem path.
    pub fn read_file<P: AsRef<Path>>(path: P) -> XlsResult<Workbook> {
        let file = std::fs::File::open(path.as_ref())?;
        Self::read(file)
    }

    /// Read an XLS workbook from any `Read + Seek` source.
    pub fn read<R: Read + Seek>(source: R) -> XlsResult<Workbook> {
        let mut storage = WorkbookStorage::new();
        Self::load(source, &mut storage)?;
        Ok(storage.finish())
    }

    /// Parse an XLS workbook, emitting every sheet, shared string, and
    /// cell into `storage`. This is the streaming entry point; `read`
    /// is this plus the default workbook-building sink.
    pub fn load<R: Read + Seek, S: Storage>(source: R, storage: &mut S) -> XlsResult<()> {
        let mut cfb = CompoundFile::open(source)?;

        // BIFF8 writers name the stream "Workbook"; "Book" is the BIFF5
        // name, still produced by some exporters.
        let stream_name = if cfb.contains("Workbook") {
            "Workbook"
        } else if cfb.contains("Book") {
            "Book"
        } else {
            return Err(XlsError::MissingWorkbookStream);
        };

        let mut stream = cfb.stream(stream_name)?;
        let bound_sheets = Self::load_globals(&mut stream, storage)?;
        Self::load_worksheets(&bound_sheets, &mut stream, storage)
    }

    /// Scan the workbook-globals substream from the start of the stream
    /// up to its EOF record.
    fn load_globals<R: Read + Seek, S: Storage>(
        stream: &mut R,
        storage: &mut S,
    ) -> XlsResult<Vec<BoundSheet>> {
        let mut bound_sheets = Vec::new();
        let mut bof_seen = false;

        loop {
            let record = Record::read(stream)?;
            match record.code() {
                records::BOF => {
                    let (version, substream) = biff::parse_bof(record.data())?;
                    if version != records::BIFF8_VERSION {
                        return Err(XlsError::UnsupportedVersion(version));
                    }
                    if substream != records::BOF_WORKBOOK_GLOBALS {
                        log::debug!("globals BOF has substream type 0x{substream:04X}");
                    }
                    bof_seen = true;
                }
                records::FILEPASS => return Err(XlsError::Encrypted),
                records::SST => Self::parse_sst(&record, storage)?,
                records::BOUNDSHEET => bound_sheets.push(Self::parse_bound_sheet(&record)?),
                records::DATEMODE => Self::parse_date_mode(&record, storage)?,
                records::EOF => break,
                records::CONTINUE => {
                    log::warn!("orphaned CONTINUE record in workbook globals");
                }
                code => log::debug!("skipping record 0x{code:04X} in workbook globals"),
            }
        }

        if !bof_seen {
            return Err(XlsError::InvalidFormat(
                "workbook stream has no globals BOF".to_string(),
            ));
        }
        Ok(bound_sheets)
    }

    /// SST: `total:i32, unique:i32`, then `unique` strings back to back.
    /// Entries stream straight into the sink in index order.
    fn parse_sst<S: Storage>(record: &Record, storage: &mut S) -> XlsResult<()> {
        let data = record.data();
        let mut offset = 0;

        let _total = read_i32(data, &mut offset)?;
        let unique = read_i32(data, &mut offset)?;
        if unique < 0 {
            return Err(XlsError::InvalidFormat(
                "negative unique-string count in SST".to_string(),
            ));
        }

        for index in 0..unique as usize {
            let value = strings::read_unicode_string(data, record.borders(), &mut offset)?;
            storage.on_shared_string(unique as usize, index, value)?;
        }
        Ok(())
    }

    /// DATEMODE: a single u16, 0 = 1900 date system, 1 = 1904.
    fn parse_date_mode<S: Storage>(record: &Record, storage: &mut S) -> XlsResult<()> {
        let mut offset = 0;
        let mode = read_u16(record.data(), &mut offset)?;
        let mode = if mode == 1 {
            DateMode::Jan1_1904
        } else {
            DateMode::Dec31_1899
        };
        storage.on_date_mode(mode)?;
        Ok(())
    }

    /// BOUNDSHEET: `bof_pos:i32`, visibility byte, type byte, short name.
    fn parse_bound_sheet(record: &Record) -> XlsResult<BoundSheet> {
        let data = record.data();
        let mut offset = 0;

        let bof_position = read_i32(data, &mut offset)?;
        if bof_position < 0 {
            return Err(XlsError::InvalidFormat(format!(
                "negative BOF offset {bof_position} in BOUNDSHEET"
            )));
        }
        let visibility = read_u8(data, &mut offset)?;
        let kind = SheetKind::from_type_byte(read_u8(data, &mut offset)?);
        let name = strings::read_short_string(data, record.borders(), &mut offset)?;

        Ok(BoundSheet {
            bof_position: bof_position as u32,
            visibility,
            kind,
            name,
        })
    }

    /// Walk the bound sheets in file order, announcing and parsing the
    /// worksheets. Non-worksheet substreams keep their ordinal but are
    /// not parsed.
    fn load_worksheets<R: Read + Seek, S: Storage>(
        bound_sheets: &[BoundSheet],
        stream: &mut R,
        storage: &mut S,
    ) -> XlsResult<()> {
        for (index, sheet) in bound_sheets.iter().enumerate() {
            if sheet.kind == SheetKind::Worksheet {
                storage.on_sheet(index, &sheet.name)?;
                Self::load_sheet(index, sheet, stream, storage)?;
            } else {
                log::debug!("skipping {:?} substream {:?}", sheet.kind, sheet.name);
            }
        }
        Ok(())
    }

    /// Parse one worksheet substream: seek to its BOF, gate the version,
    /// then dispatch cell records until EOF.
    fn load_sheet<R: Read + Seek, S: Storage>(
        sheet_index: usize,
        sheet: &BoundSheet,
        stream: &mut R,
        storage: &mut S,
    ) -> XlsResult<()> {
        stream.seek(SeekFrom::Start(u64::from(sheet.bof_position)))?;

        let bof = Record::read(stream)?;
        if bof.code() != records::BOF {
            return Err(XlsError::InvalidFormat(format!(
                "sheet {:?} does not start with a BOF record",
                sheet.name
            )));
        }
        let (version, _substream) = biff::parse_bof(bof.data())?;
        if version != records::BIFF8_VERSION {
            return Err(XlsError::UnsupportedVersion(version));
        }

        loop {
            let record = Record::read(stream)?;
            match record.code() {
                records::LABELSST => Self::handle_label_sst(&record, sheet_index, storage)?,
                records::LABEL => Self::handle_label(&record, sheet_index, storage)?,
                records::RK | records::RK_BIFF3 => Self::handle_rk(&record, sheet_index, storage)?,
                records::MULRK => Self::handle_mulrk(&record, sheet_index, storage)?,
                records::NUMBER => Self::handle_number(&record, sheet_index, storage)?,
                records::FORMULA => {
                    Self::handle_formula(&record, stream, sheet_index, storage)?;
                }
                records::EOF => break,
                code => log::debug!("skipping record 0x{code:04X} in sheet {:?}", sheet.name),
            }
        }
        Ok(())
    }

    // ── Cell record handlers ─────────────────────────────────────────────

    /// LABELSST: `row:u16, col:u16, xf:u16, sst_index:i32`.
    fn handle_label_sst<S: Storage>(
        record: &Record,
        sheet_index: usize,
        storage: &mut S,
    ) -> XlsResult<()> {
        let data = record.data();
        let mut offset = 0;
        let row = read_u16(data, &mut offset)?;
        let column = read_u16(data, &mut offset)?;
        skip(data, &mut offset, 2)?; // xf
        let sst_index = read_i32(data, &mut offset)?;
        if sst_index < 0 {
            return Err(XlsError::InvalidFormat(format!(
                "negative SST index {sst_index} in LABELSST"
            )));
        }
        storage.on_cell_shared_string(sheet_index, row, column, sst_index as usize)?;
        Ok(())
    }

    /// LABEL: `row:u16, col:u16, xf:u16`, then an inline unicode string.
    fn handle_label<S: Storage>(
        record: &Record,
        sheet_index: usize,
        storage: &mut S,
    ) -> XlsResult<()> {
        let data = record.data();
        let mut offset = 0;
        let row = read_u16(data, &mut offset)?;
        let column = read_u16(data, &mut offset)?;
        skip(data, &mut offset, 2)?; // xf
        let value = strings::read_unicode_string(data, record.borders(), &mut offset)?;
        storage.on_cell_string(sheet_index, row, column, value)?;
        Ok(())
    }

    /// RK: `row:u16, col:u16, xf:u16, rk:u32`.
    fn handle_rk<S: Storage>(record: &Record, sheet_index: usize, storage: &mut S) -> XlsResult<()> {
        let data = record.data();
        let mut offset = 0;
        let row = read_u16(data, &mut offset)?;
        let column = read_u16(data, &mut offset)?;
        skip(data, &mut offset, 2)?; // xf
        let rk = read_u32(data, &mut offset)?;
        storage.on_cell_number(sheet_index, row, column, decode_rk(rk))?;
        Ok(())
    }

    /// MULRK: `row:u16, col_first:u16, (xf:u16, rk:u32)*, col_last:u16`.
    /// The RK count comes from the column span; `col_last` sits in the
    /// final two bytes of the record.
    fn handle_mulrk<S: Storage>(
        record: &Record,
        sheet_index: usize,
        storage: &mut S,
    ) -> XlsResult<()> {
        let data = record.data();
        let mut offset = 0;
        let row = read_u16(data, &mut offset)?;
        let col_first = read_u16(data, &mut offset)?;

        if data.len() < 6 {
            return Err(XlsError::InvalidFormat("MULRK record too short".to_string()));
        }
        let col_last = u16_at(data, data.len() - 2);
        if col_last < col_first {
            return Err(XlsError::InvalidFormat(format!(
                "MULRK column span {col_first}..{col_last} is inverted"
            )));
        }

        for i in 0..=(col_last - col_first) {
            skip(data, &mut offset, 2)?; // xf
            let rk = read_u32(data, &mut offset)?;
            storage.on_cell_number(sheet_index, row, col_first + i, decode_rk(rk))?;
        }
        Ok(())
    }

    /// NUMBER: `row:u16, col:u16, xf:u16, value:f64`.
    fn handle_number<S: Storage>(
        record: &Record,
        sheet_index: usize,
        storage: &mut S,
    ) -> XlsResult<()> {
        let data = record.data();
        let mut offset = 0;
        let row = read_u16(data, &mut offset)?;
        let column = read_u16(data, &mut offset)?;
        skip(data, &mut offset, 2)?; // xf
        let value = read_f64(data, &mut offset)?;
        storage.on_cell_number(sheet_index, row, column, value)?;
        Ok(())
    }

    /// FORMULA, plus the STRING record that carries a cached string
    /// result. A SHRFMLA or ARRAY record may sit between the two and is
    /// consumed when present.
    fn handle_formula<R: Read + Seek, S: Storage>(
        record: &Record,
        stream: &mut R,
        sheet_index: usize,
        storage: &mut S,
    ) -> XlsResult<()> {
        let parsed = parse_formula(record)?;
        let mut formula = parsed.formula;

        if parsed.needs_string {
            let mut string_record = Record::read(stream)?;
            if string_record.code() == records::SHRFMLA || string_record.code() == records::ARRAY {
                string_record = Record::read(stream)?;
            }
            if string_record.code() != records::STRING {
                return Err(XlsError::InvalidFormat(format!(
                    "expected a STRING record after FORMULA, found 0x{:04X}",
                    string_record.code()
                )));
            }
            let mut offset = 0;
            let text = strings::read_unicode_string(
                string_record.data(),
                string_record.borders(),
                &mut offset,
            )?;
            formula.set_string(text);
        }

        storage.on_cell_formula(sheet_index, formula)?;
        Ok(())
    }
}
