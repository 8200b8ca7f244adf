//! Reading tests over synthesized .xls images.

use std::io::Cursor;

use ironsheet_core::{CellKind, DateMode, FormulaError};
use ironsheet_xls::error::CfbError;
use ironsheet_xls::{XlsError, XlsReader};

use crate::common::*;

/// A workbook with one sheet covering every cell record kind.
fn sample_workbook_stream() -> Vec<u8> {
    let mut sheet = bof(0x0010);
    sheet.extend(label_sst(0, 0, 0));
    sheet.extend(label_sst(0, 1, 1));
    sheet.extend(number(1, 0, 10.5));
    sheet.extend(rk_int(1, 1, -42));
    sheet.extend(mulrk_ints(2, 0, &[100, 200, 300]));
    sheet.extend(label(3, 0, "inline note"));
    sheet.extend(formula_number(4, 0, 2.5));
    sheet.extend(formula_bool(4, 1, true));
    sheet.extend(formula_error(4, 2, 0x2A));
    sheet.extend(formula_string(5, 0, "cached text"));
    sheet.extend(eof());

    assemble_workbook(
        |positions| {
            let mut globals = bof(0x0005);
            globals.extend(datemode(1));
            globals.extend(sst(&["first", "second"]));
            globals.extend(boundsheet(positions[0], 0, 0, "Data"));
            globals.extend(eof());
            globals
        },
        &[sheet],
    )
}

fn assert_sample_workbook(image: Vec<u8>) {
    let workbook = XlsReader::read(Cursor::new(image)).unwrap();

    assert_eq!(workbook.date_mode(), DateMode::Jan1_1904);
    assert_eq!(workbook.sheet_count(), 1);

    let sheet = workbook.sheet(0).unwrap();
    assert_eq!(sheet.name(), "Data");
    assert_eq!(sheet.rows_count(), 6);
    assert_eq!(sheet.columns_count(), 3);

    assert_eq!(sheet.cell(0, 0).as_string(), Some("first"));
    assert_eq!(sheet.cell(0, 1).as_string(), Some("second"));
    assert_eq!(sheet.cell(1, 0).as_number(), Some(10.5));
    assert_eq!(sheet.cell(1, 1).as_number(), Some(-42.0));
    assert_eq!(sheet.cell(2, 0).as_number(), Some(100.0));
    assert_eq!(sheet.cell(2, 1).as_number(), Some(200.0));
    assert_eq!(sheet.cell(2, 2).as_number(), Some(300.0));
    assert_eq!(sheet.cell(3, 0).as_string(), Some("inline note"));

    let f = sheet.cell(4, 0).as_formula().unwrap();
    assert_eq!(f.as_number(), Some(2.5));
    let f = sheet.cell(4, 1).as_formula().unwrap();
    assert_eq!(f.as_boolean(), Some(true));
    let f = sheet.cell(4, 2).as_formula().unwrap();
    assert_eq!(f.as_error(), Some(FormulaError::Na));
    let f = sheet.cell(5, 0).as_formula().unwrap();
    assert_eq!(f.as_string(), Some("cached text"));

    // Out-of-extent reads are empty, never a panic.
    assert_eq!(sheet.cell(100, 0).kind(), CellKind::Empty);
    assert_eq!(sheet.cell(0, 100).kind(), CellKind::Empty);
    // Cells inside the extents that were never written are empty too.
    assert_eq!(sheet.cell(3, 2).kind(), CellKind::Empty);
}

#[test]
fn reads_standard_stream_workbook() {
    assert_sample_workbook(cfb_long("Workbook", &sample_workbook_stream()));
}

#[test]
fn reads_short_stream_workbook() {
    // The same workbook below the standard-stream cutoff exercises the
    // SSAT and the root container translation.
    let stream = sample_workbook_stream();
    assert!((stream.len() as u32) < STREAM_MIN_SIZE);
    assert_sample_workbook(cfb_short("Workbook", &stream));
}

#[test]
fn accepts_book_stream_name() {
    let image = cfb_long("Book", &sample_workbook_stream());
    let workbook = XlsReader::read(Cursor::new(image)).unwrap();
    assert_eq!(workbook.sheet_count(), 1);
}

#[test]
fn long_and_short_layouts_agree() {
    let stream = sample_workbook_stream();
    let from_long = XlsReader::read(Cursor::new(cfb_long("Workbook", &stream))).unwrap();
    let from_short = XlsReader::read(Cursor::new(cfb_short("Workbook", &stream))).unwrap();
    assert_eq!(from_long, from_short);
}

#[test]
fn parsing_is_idempotent() {
    let image = cfb_long("Workbook", &sample_workbook_stream());
    let first = XlsReader::read(Cursor::new(image.clone())).unwrap();
    let second = XlsReader::read(Cursor::new(image)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn event_ordering_sheets_before_cells() {
    let image = cfb_long("Workbook", &sample_workbook_stream());
    let mut log = EventLog::default();
    XlsReader::load(Cursor::new(image), &mut log).unwrap();

    let sst0 = log.events.iter().position(|e| e == "sst 0/2 first").unwrap();
    let sst1 = log
        .events
        .iter()
        .position(|e| e == "sst 1/2 second")
        .unwrap();
    let sheet = log.events.iter().position(|e| e == "sheet 0 Data").unwrap();
    let first_cell = log
        .events
        .iter()
        .position(|e| e.starts_with("cell"))
        .unwrap();

    assert!(sst0 < sst1, "shared strings arrive in index order");
    assert!(sheet < first_cell, "a sheet is announced before its cells");
    assert!(sst1 < first_cell, "the string pool precedes cell references");
}

#[test]
fn non_worksheet_substreams_keep_their_ordinal() {
    // Sheet 0 is a chart; sheet 1 is the only worksheet. The worksheet
    // must still be announced with ordinal 1.
    let mut chart = bof(0x0020);
    chart.extend(eof());
    let mut data = bof(0x0010);
    data.extend(number(0, 0, 7.0));
    data.extend(eof());

    let stream = assemble_workbook(
        |positions| {
            let mut globals = bof(0x0005);
            globals.extend(boundsheet(positions[0], 0, 0x02, "Plot"));
            globals.extend(boundsheet(positions[1], 0, 0x00, "Numbers"));
            globals.extend(eof());
            globals
        },
        &[chart, data],
    );

    let mut log = EventLog::default();
    XlsReader::load(Cursor::new(cfb_long("Workbook", &stream)), &mut log).unwrap();
    assert_eq!(
        log.events,
        vec!["sheet 1 Numbers", "cellnum 1 (0,0) 7"]
    );

    let workbook = XlsReader::read(Cursor::new(cfb_long("Workbook", &stream))).unwrap();
    assert_eq!(workbook.sheet_count(), 1);
    assert_eq!(workbook.sheet(0).unwrap().name(), "Numbers");
}

#[test]
fn multiple_worksheets() {
    let mut one = bof(0x0010);
    one.extend(number(0, 0, 1.0));
    one.extend(eof());
    let mut two = bof(0x0010);
    two.extend(number(2, 3, 2.0));
    two.extend(eof());

    let stream = assemble_workbook(
        |positions| {
            let mut globals = bof(0x0005);
            globals.extend(boundsheet(positions[0], 0, 0, "One"));
            globals.extend(boundsheet(positions[1], 0, 0, "Two"));
            globals.extend(eof());
            globals
        },
        &[one, two],
    );

    let workbook = XlsReader::read(Cursor::new(cfb_long("Workbook", &stream))).unwrap();
    assert_eq!(workbook.sheet_count(), 2);
    assert_eq!(workbook.sheet_by_name("One").unwrap().cell(0, 0).as_number(), Some(1.0));
    let two = workbook.sheet_by_name("Two").unwrap();
    assert_eq!(two.cell(2, 3).as_number(), Some(2.0));
    assert_eq!(two.rows_count(), 3);
    assert_eq!(two.columns_count(), 4);
}

#[test]
fn default_date_mode_is_1900() {
    let mut sheet = bof(0x0010);
    sheet.extend(eof());
    let stream = assemble_workbook(
        |positions| {
            let mut globals = bof(0x0005);
            globals.extend(boundsheet(positions[0], 0, 0, "S"));
            globals.extend(eof());
            globals
        },
        &[sheet],
    );
    let workbook = XlsReader::read(Cursor::new(cfb_long("Workbook", &stream))).unwrap();
    assert_eq!(workbook.date_mode(), DateMode::Dec31_1899);
}

// ── Failure modes ───────────────────────────────────────────────────────

#[test]
fn bad_magic_is_rejected() {
    let mut image = cfb_long("Workbook", &sample_workbook_stream());
    image[0] = 0x50;
    let err = XlsReader::read(Cursor::new(image)).unwrap_err();
    assert!(matches!(err, XlsError::Cfb(CfbError::BadMagic)));
}

#[test]
fn missing_workbook_stream_is_rejected() {
    let image = cfb_long("Notes", &sample_workbook_stream());
    let err = XlsReader::read(Cursor::new(image)).unwrap_err();
    assert!(matches!(err, XlsError::MissingWorkbookStream));
}

#[test]
fn encrypted_file_is_rejected() {
    let mut globals = bof(0x0005);
    globals.extend(filepass());
    globals.extend(eof());
    let err = XlsReader::read(Cursor::new(cfb_long("Workbook", &globals))).unwrap_err();
    assert!(matches!(err, XlsError::Encrypted));
}

#[test]
fn biff5_version_is_rejected() {
    let mut globals = Vec::new();
    let mut body = Vec::new();
    body.extend_from_slice(&0x0500u16.to_le_bytes());
    body.extend_from_slice(&0x0005u16.to_le_bytes());
    body.extend_from_slice(&[0u8; 12]);
    globals.extend(rec(0x0809, &body));
    globals.extend(eof());

    let err = XlsReader::read(Cursor::new(cfb_long("Workbook", &globals))).unwrap_err();
    assert!(matches!(err, XlsError::UnsupportedVersion(0x0500)));
}

#[test]
fn truncated_workbook_stream_is_rejected() {
    // Globals without an EOF record: the reader runs off the end of the
    // stream while expecting another record, which must surface as a
    // format error, not a hang or a panic.
    let mut globals = bof(0x0005);
    globals.extend(sst(&["x"]));
    // no EOF record

    let err = XlsReader::read(Cursor::new(cfb_short("Workbook", &globals))).unwrap_err();
    assert!(matches!(err, XlsError::InvalidFormat(_)));
}

#[test]
fn sst_index_out_of_range_is_rejected() {
    let mut sheet = bof(0x0010);
    sheet.extend(label_sst(0, 0, 17)); // SST only has one entry
    sheet.extend(eof());
    let stream = assemble_workbook(
        |positions| {
            let mut globals = bof(0x0005);
            globals.extend(sst(&["only"]));
            globals.extend(boundsheet(positions[0], 0, 0, "S"));
            globals.extend(eof());
            globals
        },
        &[sheet],
    );

    let err = XlsReader::read(Cursor::new(cfb_long("Workbook", &stream))).unwrap_err();
    assert!(matches!(err, XlsError::Storage(_)));
}
