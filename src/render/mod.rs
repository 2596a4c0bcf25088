//! Output rendering.
//!
//! Console lines for the text dump, and JSON for a collected
//! [`WorkbookReport`](crate::dump::WorkbookReport).
//!
//! # Example
//!
//! ```no_run
//! use xldump::container::Archive;
//! use xldump::dump::{DumpOptions, WorkbookReport};
//! use xldump::render::{to_json, JsonFormat};
//!
//! let archive = Archive::open("workbook.xlsx")?;
//! let report = WorkbookReport::collect(&archive, &DumpOptions::default())?;
//! println!("{}", to_json(&report, JsonFormat::Pretty)?);
//! # Ok::<(), xldump::Error>(())
//! ```

mod json;
mod text;

pub use json::{to_json, JsonFormat};
pub use text::{format_headers, format_list, format_row, format_sheets, repr_str};
