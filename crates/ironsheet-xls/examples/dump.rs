//! Print the contents of an .xls file named on the command line.
//!
//! ```sh
//! cargo run --example dump -- path/to/file.xls
//! ```

use std::process::ExitCode;

use ironsheet_core::{Cell, DateMode};
use ironsheet_xls::XlsReader;

fn main() -> ExitCode {
    let Some(path) = std::env::args().nth(1) else {
        eprintln!("usage: dump <file.xls>");
        return ExitCode::FAILURE;
    };

    let workbook = match XlsReader::read_file(&path) {
        Ok(workbook) => workbook,
        Err(err) => {
            eprintln!("{path}: {err}");
            return ExitCode::FAILURE;
        }
    };

    println!(
        "date mode: days since {}",
        match workbook.date_mode() {
            DateMode::Dec31_1899 => "31 December 1899",
            DateMode::Jan1_1904 => "1 January 1904",
        }
    );

    for sheet in workbook.sheets() {
        println!(
            "sheet {:?}: {} rows x {} columns",
            sheet.name(),
            sheet.rows_count(),
            sheet.columns_count()
        );
        for (row, column, cell) in sheet.iter() {
            let rendered = match cell {
                Cell::Empty => continue,
                Cell::String(s) => s.clone(),
                Cell::Number(n) => n.to_string(),
                Cell::Formula(f) => format!("formula {:?}", f.value()),
            };
            println!("  ({row}, {column}): {rendered}");
        }
    }

    ExitCode::SUCCESS
}
