//! Readers for the three XLSX parts xldump inspects.
//!
//! - [`SharedStringTable`]: `xl/sharedStrings.xml`
//! - [`read_sheet_descriptors`]: the sheet list declared in `xl/workbook.xml`
//! - [`SheetDump`]: row/cell grid of each `xl/worksheets/sheet*.xml`
//!
//! # Example
//!
//! ```no_run
//! use xldump::container::Archive;
//! use xldump::xlsx::{SharedStringTable, SheetDump};
//!
//! let archive = Archive::open("workbook.xlsx")?;
//! let strings = SharedStringTable::read(&archive)?.unwrap_or_default();
//!
//! if let Some(dump) = SheetDump::read(&archive, "sheet1.xml", &strings, 20)? {
//!     for row in &dump.rows {
//!         println!("{}: {:?}", row.number, row.values);
//!     }
//! }
//! # Ok::<(), xldump::Error>(())
//! ```

mod shared_strings;
mod workbook;
mod worksheet;

pub use shared_strings::SharedStringTable;
pub use workbook::{parse_sheet_descriptors, read_sheet_descriptors, SheetDescriptor};
pub use worksheet::{
    resolve_cell_value, scan_rows, worksheet_files, worksheet_path, DumpedRow, SheetDump,
};

use quick_xml::events::BytesText;
use quick_xml::name::{Namespace, ResolveResult};

use crate::error::{Error, Result};

/// SpreadsheetML main namespace.
pub const SPREADSHEETML_NS: &[u8] = b"http://schemas.openxmlformats.org/spreadsheetml/2006/main";

/// Office document relationships namespace (`r:id`).
pub const RELATIONSHIPS_NS: &[u8] =
    b"http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// Shared string table entry.
pub const SHARED_STRINGS_PATH: &str = "xl/sharedStrings.xml";

/// Workbook manifest entry.
pub const WORKBOOK_PATH: &str = "xl/workbook.xml";

/// Directory holding worksheet entries.
pub const WORKSHEETS_DIR: &str = "xl/worksheets/";

/// Prefix every worksheet entry name starts with.
pub const WORKSHEET_PREFIX: &str = "xl/worksheets/sheet";

/// Cell type marker for a shared-string reference.
pub const SHARED_STRING_TYPE: &str = "s";

/// Rows printed per worksheet unless configured otherwise.
pub const DEFAULT_ROW_LIMIT: usize = 20;

/// True when `ns` resolved to `uri`.
fn is_ns(ns: &ResolveResult<'_>, uri: &[u8]) -> bool {
    matches!(ns, ResolveResult::Bound(Namespace(bound)) if *bound == uri)
}

/// True when `ns` resolved to the SpreadsheetML main namespace.
fn in_main_ns(ns: &ResolveResult<'_>) -> bool {
    is_ns(ns, SPREADSHEETML_NS)
}

/// Note an element opening at `depth`; only one document element is allowed.
fn open_element(depth: usize, root_seen: &mut bool) -> Result<()> {
    if depth == 0 {
        if *root_seen {
            return Err(Error::XmlParse("junk after document element".into()));
        }
        *root_seen = true;
    }
    Ok(())
}

/// Only whitespace may sit outside the document element.
fn check_top_level_text(text: &BytesText<'_>) -> Result<()> {
    if text.iter().all(u8::is_ascii_whitespace) {
        Ok(())
    } else {
        Err(Error::XmlParse("text outside the document element".into()))
    }
}

/// End of input is only valid once the document element has been closed.
fn check_eof(depth: usize, root_seen: bool) -> Result<()> {
    if !root_seen {
        Err(Error::XmlParse("no element found".into()))
    } else if depth != 0 {
        Err(Error::XmlParse(format!(
            "unexpected end of document with {} unclosed element(s)",
            depth
        )))
    } else {
        Ok(())
    }
}
