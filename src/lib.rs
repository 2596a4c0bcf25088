//! # xldump
//!
//! Diagnostic dumps of an XLSX package's internals.
//!
//! The package is opened as a ZIP archive and three parts are read: the
//! shared string table, the sheet list declared in the workbook manifest,
//! and the first rows of every `xl/worksheets/sheet*.xml` entry with
//! shared-string references resolved to their text.
//!
//! ## Quick Start
//!
//! ```no_run
//! use xldump::{dump_file, DumpOptions};
//!
//! let stdout = std::io::stdout();
//! dump_file("workbook.xlsx", &DumpOptions::default(), &mut stdout.lock())?;
//! # Ok::<(), xldump::Error>(())
//! ```
//!
//! ## Reading parts directly
//!
//! ```no_run
//! use xldump::container::Archive;
//! use xldump::xlsx::{read_sheet_descriptors, SharedStringTable};
//!
//! let archive = Archive::open("workbook.xlsx")?;
//! let strings = SharedStringTable::read(&archive)?.unwrap_or_default();
//! let sheets = read_sheet_descriptors(&archive)?;
//! println!("{} strings, {} sheets", strings.len(), sheets.len());
//! # Ok::<(), xldump::Error>(())
//! ```

pub mod container;
pub mod dump;
pub mod error;
pub mod render;
pub mod xlsx;

// Re-exports
pub use container::Archive;
pub use dump::{
    dump_archive, dump_file, write_headers, write_shared_strings, DumpOptions, Notice,
    WorkbookReport,
};
pub use error::{Error, Result};
pub use xlsx::{DumpedRow, SharedStringTable, SheetDescriptor, SheetDump};

use std::path::Path;

/// Open a package and collect a full report.
///
/// # Example
///
/// ```no_run
/// let report = xldump::inspect_file("workbook.xlsx", &xldump::DumpOptions::default())?;
/// println!("{} worksheets", report.worksheets.len());
/// # Ok::<(), xldump::Error>(())
/// ```
pub fn inspect_file(path: impl AsRef<Path>, options: &DumpOptions) -> Result<WorkbookReport> {
    let archive = Archive::open(path)?;
    WorkbookReport::collect(&archive, options)
}

/// Open a package and render its report as JSON.
pub fn to_json(
    path: impl AsRef<Path>,
    options: &DumpOptions,
    format: render::JsonFormat,
) -> Result<String> {
    let report = inspect_file(path, options)?;
    render::to_json(&report, format)
}
