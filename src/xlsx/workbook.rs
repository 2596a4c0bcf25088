//! Sheet list from the workbook manifest.

use crate::container::Archive;
use crate::error::{Error, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::NsReader;
use serde::Serialize;

use super::{
    check_eof, check_top_level_text, in_main_ns, is_ns, open_element, RELATIONSHIPS_NS,
    WORKBOOK_PATH,
};

/// A `<sheet>` declaration from `xl/workbook.xml`.
///
/// Informational only: the relationship id is not followed to a worksheet
/// entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SheetDescriptor {
    /// The `name` attribute.
    pub name: Option<String>,
    /// The `r:id` attribute in the relationships namespace.
    pub rel_id: Option<String>,
}

impl SheetDescriptor {
    pub fn new(name: impl Into<String>, rel_id: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            rel_id: Some(rel_id.into()),
        }
    }
}

/// Read the sheet declarations of `xl/workbook.xml`.
///
/// A missing manifest is [`Error::MissingComponent`]; callers that only want
/// a best-effort list should fall back to an empty one.
pub fn read_sheet_descriptors(archive: &Archive) -> Result<Vec<SheetDescriptor>> {
    let xml = archive.read_xml(WORKBOOK_PATH)?;
    parse_sheet_descriptors(&xml)
}

/// Parse the `<sheet>` children of the first top-level `<sheets>` element.
pub fn parse_sheet_descriptors(xml: &str) -> Result<Vec<SheetDescriptor>> {
    let mut sheets = Vec::new();
    let mut reader = NsReader::from_str(xml);

    let mut buf = Vec::new();
    let mut depth = 0usize;
    let mut root_seen = false;
    let mut in_sheets = false;
    let mut sheets_seen = false;

    loop {
        let (ns, event) = reader
            .read_resolved_event_into(&mut buf)
            .map_err(|e| Error::XmlParse(e.to_string()))?;
        let main = in_main_ns(&ns);

        match event {
            Event::Start(e) => {
                open_element(depth, &mut root_seen)?;
                depth += 1;
                if depth == 2 && main && !sheets_seen && e.local_name().as_ref() == b"sheets" {
                    in_sheets = true;
                    sheets_seen = true;
                } else if depth == 3 && in_sheets && main && e.local_name().as_ref() == b"sheet" {
                    sheets.push(sheet_descriptor(&reader, &e)?);
                }
            }
            Event::Empty(e) => {
                open_element(depth, &mut root_seen)?;
                if depth + 1 == 2 && main && e.local_name().as_ref() == b"sheets" {
                    sheets_seen = true;
                } else if depth + 1 == 3 && in_sheets && main && e.local_name().as_ref() == b"sheet"
                {
                    sheets.push(sheet_descriptor(&reader, &e)?);
                }
            }
            Event::Text(e) if depth == 0 => check_top_level_text(&e)?,
            Event::End(_) => {
                if depth == 2 {
                    in_sheets = false;
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof => {
                check_eof(depth, root_seen)?;
                break;
            }
            _ => {}
        }
        buf.clear();
    }

    log::debug!("found {} sheet declarations", sheets.len());
    Ok(sheets)
}

fn sheet_descriptor<R>(reader: &NsReader<R>, e: &BytesStart<'_>) -> Result<SheetDescriptor> {
    let mut descriptor = SheetDescriptor::default();

    for attr in e.attributes() {
        let attr = attr?;
        let (ns, local) = reader.resolve_attribute(attr.key);
        let value = attr
            .unescape_value()
            .map_err(|e| Error::XmlParse(e.to_string()))?
            .into_owned();

        match local.as_ref() {
            b"name" if matches!(ns, quick_xml::name::ResolveResult::Unbound) => {
                descriptor.name = Some(value);
            }
            b"id" if is_ns(&ns, RELATIONSHIPS_NS) => {
                descriptor.rel_id = Some(value);
            }
            _ => {}
        }
    }

    Ok(descriptor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::zip_bytes;

    const WORKBOOK: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"
          xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
  <bookViews><workbookView/></bookViews>
  <sheets>
    <sheet name="Scenarios" sheetId="1" r:id="rId1"/>
    <sheet name="Risk &amp; Impact" sheetId="2" r:id="rId3"/>
    <sheet name="Data" sheetId="3" r:id="rId2"></sheet>
  </sheets>
</workbook>"#;

    #[test]
    fn test_parse_sheet_descriptors() {
        let sheets = parse_sheet_descriptors(WORKBOOK).unwrap();
        assert_eq!(
            sheets,
            vec![
                SheetDescriptor::new("Scenarios", "rId1"),
                SheetDescriptor::new("Risk & Impact", "rId3"),
                SheetDescriptor::new("Data", "rId2"),
            ]
        );
    }

    #[test]
    fn test_relationship_prefix_is_resolved_by_namespace() {
        let xml = r#"<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"
            xmlns:rel="http://schemas.openxmlformats.org/officeDocument/2006/relationships"
            xmlns:r="urn:not-relationships">
  <sheets><sheet name="One" r:id="wrong" rel:id="rId9"/></sheets>
</workbook>"#;

        let sheets = parse_sheet_descriptors(xml).unwrap();
        assert_eq!(sheets, vec![SheetDescriptor::new("One", "rId9")]);
    }

    #[test]
    fn test_missing_attributes() {
        let xml = r#"<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <sheets><sheet sheetId="1"/></sheets>
</workbook>"#;

        let sheets = parse_sheet_descriptors(xml).unwrap();
        assert_eq!(sheets, vec![SheetDescriptor::default()]);
    }

    #[test]
    fn test_only_first_sheets_container() {
        let xml = r#"<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <sheets><sheet name="A"/></sheets>
  <sheets><sheet name="B"/></sheets>
  <other><sheets><sheet name="C"/></sheets></other>
</workbook>"#;

        let sheets = parse_sheet_descriptors(xml).unwrap();
        assert_eq!(sheets.len(), 1);
        assert_eq!(sheets[0].name.as_deref(), Some("A"));
    }

    #[test]
    fn test_no_sheets_container() {
        let xml = r#"<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"/>"#;
        assert!(parse_sheet_descriptors(xml).unwrap().is_empty());
    }

    #[test]
    fn test_malformed_manifest() {
        let xml = r#"<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheets></workbook>"#;
        assert!(matches!(
            parse_sheet_descriptors(xml),
            Err(Error::XmlParse(_))
        ));
    }

    #[test]
    fn test_incomplete_manifest() {
        let cases = [
            r#"<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheets><sheet name="A"/>"#,
            r#"<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheets><sheet name="A"/></sheets>"#,
            "not xml at all",
            "",
            "   \n",
            "junk <workbook/>",
        ];
        for xml in cases {
            assert!(
                matches!(parse_sheet_descriptors(xml), Err(Error::XmlParse(_))),
                "accepted {:?}",
                xml
            );
        }
    }

    #[test]
    fn test_read_from_archive() {
        let archive = Archive::from_bytes(zip_bytes(&[("xl/workbook.xml", WORKBOOK)])).unwrap();
        assert_eq!(read_sheet_descriptors(&archive).unwrap().len(), 3);

        let empty = Archive::from_bytes(zip_bytes(&[("other.xml", "<a/>")])).unwrap();
        assert!(matches!(
            read_sheet_descriptors(&empty),
            Err(Error::MissingComponent(_))
        ));
    }
}
