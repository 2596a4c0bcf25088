//! Console line formatting.
//!
//! Values are quoted the way Python's `repr` quotes strings, so a dumped row
//! reads `Row 1: ['Name', 'Risk']`.

use crate::xlsx::{DumpedRow, SheetDescriptor};

/// Quote a string: single quotes unless the value contains a single quote
/// and no double quote.
pub fn repr_str(value: &str) -> String {
    let quote = if value.contains('\'') && !value.contains('"') {
        '"'
    } else {
        '\''
    };

    let mut out = String::with_capacity(value.len() + 2);
    out.push(quote);
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if !is_printable(c) => push_escape(&mut out, c),
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

/// Characters `repr` writes as-is: everything except controls, format
/// characters, private use, and separators other than the ASCII space.
fn is_printable(c: char) -> bool {
    if c == ' ' {
        return true;
    }
    !(c.is_control()
        || matches!(
            c,
            '\u{a0}'
                | '\u{ad}'
                | '\u{600}'..='\u{605}'
                | '\u{61c}'
                | '\u{6dd}'
                | '\u{70f}'
                | '\u{1680}'
                | '\u{180e}'
                | '\u{2000}'..='\u{200f}'
                | '\u{2028}'..='\u{202f}'
                | '\u{205f}'..='\u{2064}'
                | '\u{2066}'..='\u{206f}'
                | '\u{3000}'
                | '\u{e000}'..='\u{f8ff}'
                | '\u{feff}'
                | '\u{fff9}'..='\u{fffb}'
                | '\u{f0000}'..='\u{10ffff}'
        ))
}

fn push_escape(out: &mut String, c: char) {
    let code = c as u32;
    let escaped = if code < 0x100 {
        format!("\\x{:02x}", code)
    } else if code < 0x10000 {
        format!("\\u{:04x}", code)
    } else {
        format!("\\U{:08x}", code)
    };
    out.push_str(&escaped);
}

fn repr_opt(value: Option<&str>) -> String {
    value.map(repr_str).unwrap_or_else(|| "None".to_string())
}

/// Render `['a', 'b']`.
pub fn format_list<I, S>(items: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let quoted: Vec<String> = items.into_iter().map(|s| repr_str(s.as_ref())).collect();
    format!("[{}]", quoted.join(", "))
}

/// Render `Row <n>: [<values>]`.
pub fn format_row(row: &DumpedRow) -> String {
    format!("Row {}: {}", row.number, format_list(&row.values))
}

/// Render the sheet list as `[('Name', 'rId1'), ...]`.
pub fn format_sheets(sheets: &[SheetDescriptor]) -> String {
    let pairs: Vec<String> = sheets
        .iter()
        .map(|s| {
            format!(
                "({}, {})",
                repr_opt(s.name.as_deref()),
                repr_opt(s.rel_id.as_deref())
            )
        })
        .collect();
    format!("[{}]", pairs.join(", "))
}

/// Render a header row as `a | b | c`.
pub fn format_headers(row: Option<&DumpedRow>) -> String {
    row.map(|r| r.values.join(" | ")).unwrap_or_default()
}
