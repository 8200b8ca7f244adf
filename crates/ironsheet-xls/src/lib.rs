//! # ironsheet-xls
//!
//! Reader for the legacy Excel binary format (.xls) used by Excel 97,
//! 2000, 2002, and 2003.
//!
//! An .xls file is two binary formats stacked: an OLE2/CFBF compound
//! document (a FAT-like sector allocator carrying named streams, handled
//! by [`cfb`]) and, inside the `Workbook` stream, a BIFF8 record sequence
//! (handled by [`biff`] and driven by [`reader`]).
//!
//! # Example
//!
//! ```rust,no_run
//! use ironsheet_xls::XlsReader;
//!
//! let workbook = XlsReader::read_file("input.xls").unwrap();
//! let sheet = workbook.sheet(0).unwrap();
//! println!("{:?}", sheet.cell(0, 0));
//! ```

pub mod biff;
pub mod binary;
pub mod cfb;
pub mod error;
pub mod reader;

pub use error::{XlsError, XlsResult};
pub use reader::XlsReader;
