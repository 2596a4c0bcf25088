//! Worksheet row dumping.

use crate::container::Archive;
use crate::error::{Error, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::reader::NsReader;
use serde::Serialize;

use super::shared_strings::SharedStringTable;
use super::{
    check_eof, check_top_level_text, in_main_ns, open_element, SHARED_STRING_TYPE, WORKSHEETS_DIR,
    WORKSHEET_PREFIX,
};

/// One printed worksheet row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DumpedRow {
    /// 1-based position among the `<row>` elements of `<sheetData>`.
    pub number: usize,
    /// Non-empty resolved cell values in document order.
    pub values: Vec<String>,
}

/// The rows of one worksheet entry that have something to show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SheetDump {
    /// Entry file name, e.g. `sheet1.xml`.
    pub file_name: String,
    pub rows: Vec<DumpedRow>,
}

impl SheetDump {
    /// Read `xl/worksheets/<file_name>` and collect up to `limit` rows.
    ///
    /// Returns `Ok(None)` when the entry does not exist.
    pub fn read(
        archive: &Archive,
        file_name: &str,
        strings: &SharedStringTable,
        limit: usize,
    ) -> Result<Option<Self>> {
        match archive.read_xml_opt(&worksheet_path(file_name))? {
            Some(xml) => Self::parse(file_name, &xml, strings, limit).map(Some),
            None => {
                log::debug!("worksheet {} not present", file_name);
                Ok(None)
            }
        }
    }

    /// Collect up to `limit` rows from worksheet XML.
    pub fn parse(
        file_name: &str,
        xml: &str,
        strings: &SharedStringTable,
        limit: usize,
    ) -> Result<Self> {
        let mut rows = Vec::new();
        scan_rows(xml, strings, limit, |row| {
            rows.push(row);
            Ok(())
        })?;

        Ok(Self {
            file_name: file_name.to_string(),
            rows,
        })
    }

    /// The header row: the first collected row that has a displayable value.
    ///
    /// Blank leading rows are skipped, so a sheet whose first `<row>` is empty
    /// takes its header from the next non-empty one, the way a used range
    /// starts at its first populated row. Only rows within the dump limit
    /// are considered.
    pub fn header_row(&self) -> Option<&DumpedRow> {
        self.rows.first()
    }
}

/// Archive path of a worksheet entry given its file name.
pub fn worksheet_path(file_name: &str) -> String {
    format!("{}{}", WORKSHEETS_DIR, file_name)
}

/// Worksheet entries found by name prefix, in archive order.
pub fn worksheet_files(archive: &Archive) -> Vec<String> {
    archive.list_files_with_prefix(WORKSHEET_PREFIX)
}

/// Resolve a cell's display value.
///
/// A `t="s"` cell whose raw value is all ASCII digits is replaced by that
/// shared string. Any other cell keeps its raw text.
pub fn resolve_cell_value(
    cell_type: Option<&str>,
    raw: String,
    strings: &SharedStringTable,
) -> Result<String> {
    if cell_type != Some(SHARED_STRING_TYPE) || !is_decimal(&raw) {
        return Ok(raw);
    }

    match raw.parse::<usize>().ok().and_then(|idx| strings.get(idx)) {
        Some(value) => Ok(value.to_string()),
        None => {
            log::warn!(
                "shared string index {} out of range ({} entries)",
                raw,
                strings.len()
            );
            Err(Error::SharedStringIndex {
                index: raw,
                len: strings.len(),
            })
        }
    }
}

fn is_decimal(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

#[derive(Default)]
struct CellState {
    cell_type: Option<String>,
    value: Option<String>,
    capturing: bool,
}

/// Walk the first `limit` `<row>` elements of the first `<sheetData>`.
///
/// `on_row` is called, in order, for each row that has at least one
/// non-empty resolved value. Rows past `limit` are never parsed, so the
/// document only has to be well formed up to the row that hits the limit.
pub fn scan_rows<F>(
    xml: &str,
    strings: &SharedStringTable,
    limit: usize,
    mut on_row: F,
) -> Result<()>
where
    F: FnMut(DumpedRow) -> Result<()>,
{
    let mut reader = NsReader::from_str(xml);

    let mut buf = Vec::new();
    let mut depth = 0usize;
    let mut root_seen = false;
    let mut in_sheet_data = false;
    let mut sheet_data_seen = false;
    let mut row_count = 0usize;
    let mut row: Option<Vec<String>> = None;
    let mut cell: Option<CellState> = None;

    loop {
        let (ns, event) = reader
            .read_resolved_event_into(&mut buf)
            .map_err(|e| Error::XmlParse(e.to_string()))?;
        let main = in_main_ns(&ns);

        match event {
            Event::Start(e) => {
                open_element(depth, &mut root_seen)?;
                depth += 1;
                let local = e.local_name();
                match (depth, local.as_ref()) {
                    _ if cell.as_ref().is_some_and(|c| c.capturing) => {
                        if let Some(c) = cell.as_mut() {
                            c.capturing = false;
                        }
                    }
                    (2, b"sheetData") if main && !sheet_data_seen => {
                        in_sheet_data = true;
                        sheet_data_seen = true;
                    }
                    (3, b"row") if main && in_sheet_data => {
                        if row_count == limit {
                            return Ok(());
                        }
                        row_count += 1;
                        row = Some(Vec::new());
                    }
                    (4, b"c") if main && row.is_some() => {
                        cell = Some(CellState {
                            cell_type: cell_type(&reader, &e)?,
                            ..Default::default()
                        });
                    }
                    (5, b"v") if main => {
                        if let Some(c) = cell.as_mut().filter(|c| c.value.is_none()) {
                            c.value = Some(String::new());
                            c.capturing = true;
                        }
                    }
                    _ => {}
                }
            }
            Event::Empty(e) => {
                open_element(depth, &mut root_seen)?;
                let local = e.local_name();
                match (depth + 1, local.as_ref()) {
                    _ if cell.as_ref().is_some_and(|c| c.capturing) => {
                        if let Some(c) = cell.as_mut() {
                            c.capturing = false;
                        }
                    }
                    (2, b"sheetData") if main => {
                        sheet_data_seen = true;
                    }
                    (3, b"row") if main && in_sheet_data => {
                        if row_count == limit {
                            return Ok(());
                        }
                        row_count += 1;
                    }
                    (5, b"v") if main => {
                        if let Some(c) = cell.as_mut().filter(|c| c.value.is_none()) {
                            c.value = Some(String::new());
                        }
                    }
                    _ => {}
                }
            }
            Event::Text(e) if depth == 0 => check_top_level_text(&e)?,
            Event::Text(e) => {
                if let Some(c) = cell.as_mut().filter(|c| c.capturing) {
                    let text = e.unescape().map_err(|e| Error::XmlParse(e.to_string()))?;
                    if let Some(value) = c.value.as_mut() {
                        value.push_str(&text);
                    }
                }
            }
            Event::CData(e) => {
                if let Some(c) = cell.as_mut().filter(|c| c.capturing) {
                    if let Some(value) = c.value.as_mut() {
                        value.push_str(&String::from_utf8_lossy(&e));
                    }
                }
            }
            Event::End(_) => {
                match depth {
                    5 => {
                        if let Some(c) = cell.as_mut() {
                            c.capturing = false;
                        }
                    }
                    4 => {
                        if let Some(c) = cell.take() {
                            let raw = c.value.unwrap_or_default();
                            let value = resolve_cell_value(c.cell_type.as_deref(), raw, strings)?;
                            if let Some(values) = row.as_mut().filter(|_| !value.is_empty()) {
                                values.push(value);
                            }
                        }
                    }
                    3 => {
                        if let Some(values) = row.take().filter(|v| !v.is_empty()) {
                            on_row(DumpedRow {
                                number: row_count,
                                values,
                            })?;
                        }
                    }
                    2 => in_sheet_data = false,
                    _ => {}
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof => return check_eof(depth, root_seen),
            _ => {}
        }
        buf.clear();
    }
}

fn cell_type<R>(reader: &NsReader<R>, e: &BytesStart<'_>) -> Result<Option<String>> {
    for attr in e.attributes() {
        let attr = attr?;
        let (ns, local) = reader.resolve_attribute(attr.key);
        if matches!(ns, ResolveResult::Unbound) && local.as_ref() == b"t" {
            let value = attr
                .unescape_value()
                .map_err(|e| Error::XmlParse(e.to_string()))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::zip_bytes;

    fn sheet(rows: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>{}</sheetData></worksheet>"#,
            rows
        )
    }

    fn strings() -> SharedStringTable {
        SharedStringTable::from(vec![
            "Name".to_string(),
            "Value".to_string(),
            "Risk".to_string(),
        ])
    }

    #[test]
    fn test_shared_string_cells() {
        let xml = sheet(r#"<row r="1"><c r="A1" t="s"><v>0</v></c><c r="B1" t="s"><v>2</v></c></row>"#);
        let dump = SheetDump::parse("sheet1.xml", &xml, &strings(), 20).unwrap();
        assert_eq!(
            dump.rows,
            vec![DumpedRow {
                number: 1,
                values: vec!["Name".to_string(), "Risk".to_string()],
            }]
        );
    }

    #[test]
    fn test_resolve_cell_value() {
        let ss = strings();
        assert_eq!(resolve_cell_value(Some("s"), "2".into(), &ss).unwrap(), "Risk");
        assert_eq!(resolve_cell_value(Some("s"), "x".into(), &ss).unwrap(), "x");
        assert_eq!(resolve_cell_value(Some("s"), "-1".into(), &ss).unwrap(), "-1");
        assert_eq!(resolve_cell_value(Some("s"), "".into(), &ss).unwrap(), "");
        assert_eq!(resolve_cell_value(None, "2".into(), &ss).unwrap(), "2");
        assert_eq!(resolve_cell_value(Some("n"), "1.5".into(), &ss).unwrap(), "1.5");
        assert_eq!(
            resolve_cell_value(Some("str"), "0".into(), &ss).unwrap(),
            "0"
        );
    }

    #[test]
    fn test_out_of_range_index() {
        let err = resolve_cell_value(Some("s"), "3".into(), &strings()).unwrap_err();
        assert!(matches!(err, Error::SharedStringIndex { len: 3, .. }));

        let huge = "99999999999999999999999999";
        let err = resolve_cell_value(Some("s"), huge.into(), &strings()).unwrap_err();
        assert!(matches!(err, Error::SharedStringIndex { .. }));
    }

    #[test]
    fn test_empty_values_and_rows_are_dropped() {
        let xml = sheet(
            r#"<row r="1"><c r="A1"/><c r="B1"><v></v></c></row>
<row r="2"/>
<row r="3"><c r="A3"><v>42</v></c><c r="B3"/><c r="C3" t="inlineStr"><is><t>inline</t></is></c><c r="D3"><v>7</v></c></row>"#,
        );
        let dump = SheetDump::parse("sheet1.xml", &xml, &strings(), 20).unwrap();
        assert_eq!(
            dump.rows,
            vec![DumpedRow {
                number: 3,
                values: vec!["42".to_string(), "7".to_string()],
            }]
        );
    }

    #[test]
    fn test_empty_shared_string_is_dropped() {
        let ss = SharedStringTable::from(vec![String::new(), "x".to_string()]);
        let xml = sheet(r#"<row><c t="s"><v>0</v></c></row><row><c t="s"><v>0</v></c><c t="s"><v>1</v></c></row>"#);
        let dump = SheetDump::parse("sheet1.xml", &xml, &ss, 20).unwrap();
        assert_eq!(dump.rows.len(), 1);
        assert_eq!(dump.rows[0].number, 2);
        assert_eq!(dump.rows[0].values, vec!["x"]);
    }

    #[test]
    fn test_row_limit() {
        let rows: String = (1..=25)
            .map(|i| format!(r#"<row r="{i}"><c><v>{i}</v></c></row>"#))
            .collect();
        let dump = SheetDump::parse("sheet1.xml", &sheet(&rows), &strings(), 20).unwrap();
        assert_eq!(dump.rows.len(), 20);
        assert_eq!(dump.rows.last().unwrap().values, vec!["20"]);

        let dump = SheetDump::parse("sheet1.xml", &sheet(&rows), &strings(), 0).unwrap();
        assert!(dump.rows.is_empty());
    }

    #[test]
    fn test_rows_past_limit_are_not_parsed() {
        // The bad index sits in row 3; with a limit of 2 it is never reached.
        let xml = sheet(
            r#"<row><c><v>a</v></c></row><row><c><v>b</v></c></row><row><c t="s"><v>99</v></c></row>"#,
        );
        let dump = SheetDump::parse("sheet1.xml", &xml, &strings(), 2).unwrap();
        assert_eq!(dump.rows.len(), 2);
        assert!(SheetDump::parse("sheet1.xml", &xml, &strings(), 3).is_err());
    }

    #[test]
    fn test_rows_before_bad_index_are_reported() {
        let xml = sheet(r#"<row><c><v>ok</v></c></row><row><c t="s"><v>5</v></c></row>"#);
        let mut seen = Vec::new();
        let result = scan_rows(&xml, &strings(), 20, |row| {
            seen.push(row);
            Ok(())
        });
        assert!(matches!(result, Err(Error::SharedStringIndex { .. })));
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].values, vec!["ok"]);
    }

    #[test]
    fn test_first_value_element_only() {
        let xml = sheet(r#"<row><c><f>SUM(A1)</f><v>3</v><v>4</v></c></row>"#);
        let dump = SheetDump::parse("sheet1.xml", &xml, &strings(), 20).unwrap();
        assert_eq!(dump.rows[0].values, vec!["3"]);
    }

    #[test]
    fn test_no_sheet_data() {
        let xml = r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><dimension ref="A1"/></worksheet>"#;
        let dump = SheetDump::parse("sheet1.xml", xml, &strings(), 20).unwrap();
        assert!(dump.rows.is_empty());
    }

    #[test]
    fn test_incomplete_documents_are_rejected() {
        let truncated = r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData><row><c><v>1</v></c></row><row><c><v>2"#;
        let unclosed = r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData><row><c><v>1</v></c></row></sheetData>"#;
        for xml in [truncated, unclosed, "not xml at all", ""] {
            assert!(
                matches!(
                    SheetDump::parse("sheet1.xml", xml, &strings(), 20),
                    Err(Error::XmlParse(_))
                ),
                "accepted {:?}",
                xml
            );
        }

        let mut seen = Vec::new();
        let result = scan_rows(truncated, &strings(), 20, |row| {
            seen.push(row);
            Ok(())
        });
        assert!(matches!(result, Err(Error::XmlParse(_))));
        assert_eq!(seen.len(), 1);
    }

    #[test]
    fn test_limit_stops_before_truncation() {
        let xml = r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData><row><c><v>1</v></c></row><row><c><v>2"#;
        let dump = SheetDump::parse("sheet1.xml", xml, &strings(), 1).unwrap();
        assert_eq!(dump.rows.len(), 1);
    }

    #[test]
    fn test_header_row_skips_blank_leading_rows() {
        let xml = sheet(r#"<row r="1"><c r="A1"/></row><row r="2"><c t="s"><v>0</v></c><c t="s"><v>2</v></c></row><row r="3"><c><v>9</v></c></row>"#);
        let dump = SheetDump::parse("sheet1.xml", &xml, &strings(), 20).unwrap();
        let header = dump.header_row().unwrap();
        assert_eq!(header.number, 2);
        assert_eq!(header.values, vec!["Name", "Risk"]);

        let blank = sheet(r#"<row><c/></row>"#);
        let dump = SheetDump::parse("sheet1.xml", &blank, &strings(), 20).unwrap();
        assert!(dump.header_row().is_none());
    }

    #[test]
    fn test_namespaced_type_attribute_is_not_the_marker() {
        let xml = r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:x="urn:x"><sheetData>
<row><c x:t="s"><v>1</v></c></row></sheetData></worksheet>"#;
        let dump = SheetDump::parse("sheet1.xml", xml, &strings(), 20).unwrap();
        assert_eq!(dump.rows[0].values, vec!["1"]);
    }

    #[test]
    fn test_read_from_archive() {
        let archive = Archive::from_bytes(zip_bytes(&[
            ("xl/worksheets/sheet1.xml", sheet(r#"<row><c t="s"><v>1</v></c></row>"#).as_str()),
            ("xl/worksheets/_rels/sheet1.xml.rels", "<Relationships/>"),
        ]))
        .unwrap();

        assert_eq!(worksheet_files(&archive), vec!["xl/worksheets/sheet1.xml"]);

        let dump = SheetDump::read(&archive, "sheet1.xml", &strings(), 20)
            .unwrap()
            .unwrap();
        assert_eq!(dump.header_row().unwrap().values, vec!["Value"]);

        assert!(SheetDump::read(&archive, "sheet9.xml", &strings(), 20)
            .unwrap()
            .is_none());
    }
}
