//! FORMULA record decoding.
//!
//! The interesting part is the 8-byte cached-result field. A real
//! numeric result is simply the IEEE 754 double; every other result kind
//! sets the two high bytes to `0xFFFF` (an NaN pattern no real result
//! uses) and tags the kind in byte 0:
//!
//! | byte 0 | meaning | payload |
//! |---|---|---|
//! | 0 | string | byte 2 unused; text follows in a STRING record |
//! | 1 | boolean | byte 2 is 0 or 1 |
//! | 2 | error | byte 2 is the error code |
//!
//! The expression token stream after the fixed fields is captured
//! verbatim and not interpreted.

use ironsheet_core::{Formula, FormulaError, FormulaValue};

use crate::binary::{read_f64, read_u16, read_u32};
use crate::error::{XlsError, XlsResult};

use super::Record;

/// A decoded FORMULA record.
#[derive(Debug, Clone)]
pub struct FormulaRecord {
    /// The formula cell, possibly with a pending (empty) string result
    pub formula: Formula,
    /// Whether a STRING record with the cached text must follow
    pub needs_string: bool,
}

/// Decode a FORMULA record body:
/// `row:u16, col:u16, xf:u16, result:8, flags:u16, chain:u32, tokens…`
pub fn parse_formula(record: &Record) -> XlsResult<FormulaRecord> {
    let data = record.data();
    let mut offset = 0;

    let row = read_u16(data, &mut offset)?;
    let column = read_u16(data, &mut offset)?;
    let _xf = read_u16(data, &mut offset)?;

    if data.len() < offset + 8 {
        return Err(XlsError::InvalidFormat(
            "FORMULA record too short for its result field".to_string(),
        ));
    }
    let result = &data[offset..offset + 8];
    offset += 8;

    let _flags = read_u16(data, &mut offset)?;
    let _chain = read_u32(data, &mut offset)?;
    let tokens = data[offset..].to_vec();

    let (value, needs_string) = if result[6] == 0xFF && result[7] == 0xFF {
        match result[0] {
            0x00 => (FormulaValue::String(String::new()), true),
            0x01 => (FormulaValue::Boolean(result[2] != 0), false),
            0x02 => (FormulaValue::Error(FormulaError::from_code(result[2])), false),
            _ => (FormulaValue::Unknown, false),
        }
    } else {
        let mut roff = 0;
        let number = read_f64(result, &mut roff)?;
        (FormulaValue::Number(number), false)
    };

    Ok(FormulaRecord {
        formula: Formula::new(row, column, value, tokens),
        needs_string,
    })
}
