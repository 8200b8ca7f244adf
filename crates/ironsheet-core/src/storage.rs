//! Parser output sink
//!
//! Format parsers do not build the document model directly; they emit a
//! stream of events into a [`Storage`] implementation. [`WorkbookStorage`]
//! is the default sink and assembles a [`Workbook`], but callers that only
//! want a row count, a single column, or a streaming conversion can supply
//! their own sink and skip the model entirely.

use std::collections::HashMap;

use crate::cell::{Cell, Formula};
use crate::error::{Error, Result};
use crate::sheet::Sheet;
use crate::workbook::{DateMode, Workbook};

/// Sink for parser events.
///
/// Guarantees made by parsers:
/// - `on_sheet` is called for a sheet before any cell event for it, in
///   the order sheets are declared by the file;
/// - `on_shared_string` events arrive in index order, before any
///   `on_cell_shared_string` that references them;
/// - cell events for one sheet arrive in record order.
pub trait Storage {
    /// A sheet was declared. `index` is the file's sheet ordinal; sheets
    /// that are declared but not parsed (charts, macros) still consume an
    /// ordinal, so indices may be sparse.
    fn on_sheet(&mut self, index: usize, name: &str) -> Result<()>;

    /// The workbook's date system was declared.
    fn on_date_mode(&mut self, mode: DateMode) -> Result<()>;

    /// One entry of the shared string table. `count` is the declared
    /// number of unique strings, `index` this entry's position.
    fn on_shared_string(&mut self, count: usize, index: usize, value: String) -> Result<()>;

    /// A cell referencing the shared string table.
    fn on_cell_shared_string(
        &mut self,
        sheet: usize,
        row: u16,
        column: u16,
        sst_index: usize,
    ) -> Result<()>;

    /// A cell with an inline string value.
    fn on_cell_string(&mut self, sheet: usize, row: u16, column: u16, value: String) -> Result<()>;

    /// A cell with a numeric value.
    fn on_cell_number(&mut self, sheet: usize, row: u16, column: u16, value: f64) -> Result<()>;

    /// A formula cell; coordinates travel on the formula itself.
    fn on_cell_formula(&mut self, sheet: usize, formula: Formula) -> Result<()>;
}

/// The default sink: builds a [`Workbook`] out of the event stream.
#[derive(Debug, Default)]
pub struct WorkbookStorage {
    sheets: Vec<Sheet>,
    /// Maps file sheet ordinals to positions in `sheets`
    index_map: HashMap<usize, usize>,
    sst: Vec<String>,
    date_mode: DateMode,
}

impl WorkbookStorage {
    /// Create an empty sink.
    pub fn new() -> Self {
        WorkbookStorage::default()
    }

    /// Consume the sink and produce the assembled workbook.
    pub fn finish(self) -> Workbook {
        Workbook::new(self.sheets, self.date_mode)
    }

    fn sheet_mut(&mut self, index: usize) -> Result<&mut Sheet> {
        let pos = *self
            .index_map
            .get(&index)
            .ok_or(Error::UnknownSheet(index))?;
        Ok(&mut self.sheets[pos])
    }
}

impl Storage for WorkbookStorage {
    fn on_sheet(&mut self, index: usize, name: &str) -> Result<()> {
        self.index_map.insert(index, self.sheets.len());
        self.sheets.push(Sheet::new(name));
        Ok(())
    }

    fn on_date_mode(&mut self, mode: DateMode) -> Result<()> {
        self.date_mode = mode;
        Ok(())
    }

    fn on_shared_string(&mut self, count: usize, index: usize, value: String) -> Result<()> {
        if self.sst.is_empty() {
            self.sst.reserve(count);
        }
        debug_assert_eq!(index, self.sst.len());
        self.sst.push(value);
        Ok(())
    }

    fn on_cell_shared_string(
        &mut self,
        sheet: usize,
        row: u16,
        column: u16,
        sst_index: usize,
    ) -> Result<()> {
        let value = self
            .sst
            .get(sst_index)
            .ok_or(Error::SharedStringOutOfRange {
                index: sst_index,
                count: self.sst.len(),
            })?
            .clone();
        self.sheet_mut(sheet)?.set_cell(row, column, Cell::String(value));
        Ok(())
    }

    fn on_cell_string(&mut self, sheet: usize, row: u16, column: u16, value: String) -> Result<()> {
        self.sheet_mut(sheet)?.set_cell(row, column, Cell::String(value));
        Ok(())
    }

    fn on_cell_number(&mut self, sheet: usize, row: u16, column: u16, value: f64) -> Result<()> {
        self.sheet_mut(sheet)?.set_cell(row, column, Cell::Number(value));
        Ok(())
    }

    fn on_cell_formula(&mut self, sheet: usize, formula: Formula) -> Result<()> {
        let (row, column) = (formula.row(), formula.column());
        self.sheet_mut(sheet)?
            .set_cell(row, column, Cell::Formula(formula));
        Ok(())
    }
}
