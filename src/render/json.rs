//! JSON renderer implementation.

use crate::dump::WorkbookReport;
use crate::error::{Error, Result};

/// JSON output format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum JsonFormat {
    /// Compact single-line JSON
    Compact,
    /// Pretty-printed with 2-space indentation
    #[default]
    Pretty,
}

/// Convert a report to JSON.
pub fn to_json(report: &WorkbookReport, format: JsonFormat) -> Result<String> {
    let json = match format {
        JsonFormat::Compact => serde_json::to_string(report),
        JsonFormat::Pretty => serde_json::to_string_pretty(report),
    };
    json.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dump::Notice;
    use crate::xlsx::{DumpedRow, SharedStringTable, SheetDescriptor, SheetDump};

    fn report() -> WorkbookReport {
        WorkbookReport {
            shared_strings: SharedStringTable::from(vec!["Name".to_string()]),
            sheets: vec![SheetDescriptor::new("Scenarios", "rId1")],
            worksheet_files: vec!["xl/worksheets/sheet1.xml".to_string()],
            worksheets: vec![SheetDump {
                file_name: "sheet1.xml".to_string(),
                rows: vec![DumpedRow {
                    number: 1,
                    values: vec!["Name".to_string()],
                }],
            }],
            notices: vec![Notice::MissingWorksheet("sheet2.xml".to_string())],
        }
    }

    #[test]
    fn test_to_json_pretty() {
        let json = to_json(&report(), JsonFormat::Pretty).unwrap();
        assert!(json.contains('\n'));
        assert!(json.contains("\"rel_id\": \"rId1\""));
        assert!(json.contains("\"file_name\": \"sheet1.xml\""));
    }

    #[test]
    fn test_to_json_compact() {
        let json = to_json(&report(), JsonFormat::Compact).unwrap();
        assert!(!json.contains('\n'));
        assert!(json.contains("\"shared_strings\":[\"Name\"]"));
    }

    #[test]
    fn test_json_structure() {
        let json = to_json(&report(), JsonFormat::Compact).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["worksheets"][0]["rows"][0]["number"], 1);
        assert_eq!(value["worksheets"][0]["rows"][0]["values"][0], "Name");
        assert_eq!(value["notices"][0]["missing_worksheet"], "sheet2.xml");
    }
}
