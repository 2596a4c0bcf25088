//! XLSX shared strings parsing.

use crate::container::Archive;
use crate::error::{Error, Result};
use quick_xml::events::Event;
use quick_xml::reader::NsReader;
use serde::Serialize;

use super::{check_eof, check_top_level_text, in_main_ns, open_element, SHARED_STRINGS_PATH};

/// Shared strings table, indexed by the `<v>` value of `t="s"` cells.
///
/// Each entry is the text of the first `<t>` child of an `<si>` item, or an
/// empty string when the item has none. Rich-text runs (`<si><r><t>`) are not
/// direct children and therefore read as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SharedStringTable {
    strings: Vec<String>,
}

impl SharedStringTable {
    /// Read the table from `xl/sharedStrings.xml`.
    ///
    /// Returns `Ok(None)` when the package has no shared strings entry.
    pub fn read(archive: &Archive) -> Result<Option<Self>> {
        match archive.read_xml_opt(SHARED_STRINGS_PATH)? {
            Some(xml) => Self::parse(&xml).map(Some),
            None => {
                log::debug!("{} not present", SHARED_STRINGS_PATH);
                Ok(None)
            }
        }
    }

    /// Parse shared strings from XML content.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut strings = Vec::new();
        let mut reader = NsReader::from_str(xml);

        let mut buf = Vec::new();
        let mut depth = 0usize;
        let mut root_seen = false;
        // Some while inside an <si>; holds the first <t> text once seen.
        let mut item: Option<Option<String>> = None;
        let mut capturing = false;

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
                    if capturing {
                        // Markup inside <t> ends its leading text.
                        capturing = false;
                    } else if depth == 2 && main && local.as_ref() == b"si" {
                        item = Some(None);
                    } else if depth == 3 && main && local.as_ref() == b"t" {
                        if let Some(slot) = item.as_mut().filter(|slot| slot.is_none()) {
                            *slot = Some(String::new());
                            capturing = true;
                        }
                    }
                }
                Event::Empty(e) => {
                    open_element(depth, &mut root_seen)?;
                    let local = e.local_name();
                    if capturing {
                        capturing = false;
                    } else if depth + 1 == 2 && main && local.as_ref() == b"si" {
                        strings.push(String::new());
                    } else if depth + 1 == 3 && main && local.as_ref() == b"t" {
                        if let Some(slot) = item.as_mut().filter(|slot| slot.is_none()) {
                            *slot = Some(String::new());
                        }
                    }
                }
                Event::Text(e) if depth == 0 => check_top_level_text(&e)?,
                Event::Text(e) if capturing => {
                    let text = e.unescape().map_err(|e| Error::XmlParse(e.to_string()))?;
                    if let Some(Some(current)) = item.as_mut() {
                        current.push_str(&text);
                    }
                }
                Event::CData(e) if capturing => {
                    if let Some(Some(current)) = item.as_mut() {
                        current.push_str(&String::from_utf8_lossy(&e));
                    }
                }
                Event::End(_) => {
                    if depth == 3 {
                        capturing = false;
                    }
                    if depth == 2 {
                        if let Some(text) = item.take() {
                            strings.push(text.unwrap_or_default());
                        }
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

        log::debug!("parsed {} shared strings", strings.len());
        Ok(Self { strings })
    }

    /// Get a string by index.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.strings.get(index).map(|s| s.as_str())
    }

    /// Get the count of shared strings.
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    /// Iterate the strings in table order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.strings.iter().map(|s| s.as_str())
    }
}

impl From<Vec<String>> for SharedStringTable {
    fn from(strings: Vec<String>) -> Self {
        Self { strings }
    }
}
