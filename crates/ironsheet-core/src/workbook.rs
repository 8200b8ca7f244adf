//! Workbook type

use crate::sheet::Sheet;

/// Base date for serial date numbers in the workbook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateMode {
    /// Days counted from 31 December 1899 (the 1900 date system)
    #[default]
    Dec31_1899,
    /// Days counted from 1 January 1904 (the 1904 date system)
    Jan1_1904,
}

/// A loaded workbook: sheets plus workbook-global settings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workbook {
    sheets: Vec<Sheet>,
    date_mode: DateMode,
}

impl Workbook {
    /// Create an empty workbook.
    pub fn new(sheets: Vec<Sheet>, date_mode: DateMode) -> Self {
        Workbook { sheets, date_mode }
    }

    /// Number of sheets.
    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    /// The sheet at `index`, in workbook order.
    pub fn sheet(&self, index: usize) -> Option<&Sheet> {
        self.sheets.get(index)
    }

    /// Find a sheet by its name (case-sensitive).
    pub fn sheet_by_name(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name() == name)
    }

    /// Iterate over the sheets in workbook order.
    pub fn sheets(&self) -> impl Iterator<Item = &Sheet> {
        self.sheets.iter()
    }

    /// The workbook's date system.
    pub fn date_mode(&self) -> DateMode {
        self.date_mode
    }
}
