//! The inspection pass: shared strings, sheet list, then every worksheet.
//!
//! [`dump_archive`] streams console lines to a writer as it goes, so rows
//! printed before a fatal error stay visible. [`WorkbookReport::collect`]
//! runs the same pass into a value for structured output.

use std::fmt;
use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::container::Archive;
use crate::error::Result;
use crate::render::{format_headers, format_list, format_row, format_sheets, repr_str};
use crate::xlsx::{
    read_sheet_descriptors, scan_rows, worksheet_files, worksheet_path, SharedStringTable,
    SheetDescriptor, SheetDump, DEFAULT_ROW_LIMIT, WORKBOOK_PATH,
};

/// Options for an inspection pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DumpOptions {
    /// Rows considered per worksheet.
    pub row_limit: usize,
}

impl Default for DumpOptions {
    fn default() -> Self {
        Self {
            row_limit: DEFAULT_ROW_LIMIT,
        }
    }
}

impl DumpOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_row_limit(mut self, row_limit: usize) -> Self {
        self.row_limit = row_limit;
        self
    }
}

/// A non-fatal condition met during the pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Notice {
    /// `xl/sharedStrings.xml` is absent.
    MissingSharedStrings,
    /// `xl/workbook.xml` could not be read; carries the cause.
    ManifestUnreadable(String),
    /// A worksheet entry could not be opened; carries the file name.
    MissingWorksheet(String),
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::MissingSharedStrings => write!(f, "No shared strings found."),
            Notice::ManifestUnreadable(cause) => {
                let file = WORKBOOK_PATH.rsplit('/').next().unwrap_or(WORKBOOK_PATH);
                write!(f, "Error reading {}: {}", file, cause)
            }
            Notice::MissingWorksheet(file) => {
                write!(f, "Sheet file {} not found in zip.", file)
            }
        }
    }
}

/// Everything one pass over a workbook found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkbookReport {
    pub shared_strings: SharedStringTable,
    pub sheets: Vec<SheetDescriptor>,
    /// Worksheet entry names, in archive order.
    pub worksheet_files: Vec<String>,
    /// Dumps of the worksheets that could be opened.
    pub worksheets: Vec<SheetDump>,
    pub notices: Vec<Notice>,
}

impl WorkbookReport {
    /// Run the pass and collect the result.
    pub fn collect(archive: &Archive, options: &DumpOptions) -> Result<Self> {
        let mut notices = Vec::new();

        let (shared_strings, notice) = load_shared_strings(archive)?;
        notices.extend(notice);

        let (sheets, notice) = load_sheets(archive);
        notices.extend(notice);

        let worksheet_files = worksheet_files(archive);
        let mut worksheets = Vec::new();
        for entry in &worksheet_files {
            let file_name = base_name(entry);
            match SheetDump::read(archive, file_name, &shared_strings, options.row_limit)? {
                Some(dump) => worksheets.push(dump),
                None => notices.push(Notice::MissingWorksheet(file_name.to_string())),
            }
        }

        Ok(Self {
            shared_strings,
            sheets,
            worksheet_files,
            worksheets,
            notices,
        })
    }
}

/// Open `path` and stream the text dump to `out`.
///
/// # Example
///
/// ```no_run
/// use xldump::dump::{dump_file, DumpOptions};
///
/// let stdout = std::io::stdout();
/// dump_file("workbook.xlsx", &DumpOptions::default(), &mut stdout.lock())?;
/// # Ok::<(), xldump::Error>(())
/// ```
pub fn dump_file<W: Write>(
    path: impl AsRef<Path>,
    options: &DumpOptions,
    out: &mut W,
) -> Result<()> {
    let archive = Archive::open(path)?;
    writeln!(out, "Opened xlsx as zip.")?;
    dump_archive(&archive, options, out)
}

/// Stream the text dump of an opened archive to `out`.
pub fn dump_archive<W: Write>(
    archive: &Archive,
    options: &DumpOptions,
    out: &mut W,
) -> Result<()> {
    let (shared_strings, notice) = load_shared_strings(archive)?;
    if let Some(notice) = notice {
        writeln!(out, "{}", notice)?;
    }

    let (sheets, notice) = load_sheets(archive);
    if let Some(notice) = notice {
        writeln!(out, "{}", notice)?;
    }
    writeln!(out, "Sheets: {}", format_sheets(&sheets))?;

    let files = worksheet_files(archive);
    writeln!(out, "Found worksheet files: {}", format_list(&files))?;

    for entry in &files {
        let file_name = base_name(entry);
        writeln!(out)?;
        writeln!(out, "--- Dumping {} ---", file_name)?;

        match archive.read_xml_opt(&worksheet_path(file_name))? {
            Some(xml) => scan_rows(&xml, &shared_strings, options.row_limit, |row| {
                writeln!(out, "{}", format_row(&row))?;
                Ok(())
            })?,
            None => writeln!(out, "{}", Notice::MissingWorksheet(file_name.to_string()))?,
        }
    }

    Ok(())
}

/// Print the sheet names, then the first displayable row of each worksheet.
pub fn write_headers<W: Write>(
    archive: &Archive,
    options: &DumpOptions,
    out: &mut W,
) -> Result<()> {
    let (shared_strings, notice) = load_shared_strings(archive)?;
    if let Some(notice) = notice {
        writeln!(out, "{}", notice)?;
    }

    let (sheets, notice) = load_sheets(archive);
    if let Some(notice) = notice {
        writeln!(out, "{}", notice)?;
    }
    let names: Vec<&str> = sheets.iter().filter_map(|s| s.name.as_deref()).collect();
    writeln!(out, "Sheets: {}", names.join(", "))?;

    for entry in worksheet_files(archive) {
        let file_name = base_name(&entry);
        writeln!(out)?;
        writeln!(out, "Sheet: {}", file_name)?;
        match SheetDump::read(archive, file_name, &shared_strings, options.row_limit)? {
            Some(dump) => writeln!(out, "Headers: {}", format_headers(dump.header_row()))?,
            None => writeln!(out, "{}", Notice::MissingWorksheet(file_name.to_string()))?,
        }
    }

    Ok(())
}

/// Print every shared string with its index.
pub fn write_shared_strings<W: Write>(archive: &Archive, out: &mut W) -> Result<()> {
    let (shared_strings, notice) = load_shared_strings(archive)?;
    if let Some(notice) = notice {
        writeln!(out, "{}", notice)?;
        return Ok(());
    }

    writeln!(out, "Shared strings: {}", shared_strings.len())?;
    for (idx, value) in shared_strings.iter().enumerate() {
        writeln!(out, "[{}] {}", idx, repr_str(value))?;
    }
    Ok(())
}

fn load_shared_strings(archive: &Archive) -> Result<(SharedStringTable, Option<Notice>)> {
    Ok(match SharedStringTable::read(archive)? {
        Some(table) => (table, None),
        None => (SharedStringTable::default(), Some(Notice::MissingSharedStrings)),
    })
}

/// Never fails: any manifest error becomes an empty list plus a notice.
fn load_sheets(archive: &Archive) -> (Vec<SheetDescriptor>, Option<Notice>) {
    match read_sheet_descriptors(archive) {
        Ok(sheets) => (sheets, None),
        Err(e) => {
            log::warn!("could not read {}: {}", WORKBOOK_PATH, e);
            (Vec::new(), Some(Notice::ManifestUnreadable(e.to_string())))
        }
    }
}

fn base_name(entry: &str) -> &str {
    entry.rsplit('/').next().unwrap_or(entry)
}
