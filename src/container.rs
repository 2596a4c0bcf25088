//! Read-only ZIP container access for XLSX packages.

use crate::error::{Error, Result};
use std::cell::RefCell;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::Path;

/// Rewrite a UTF-16 encoding declaration to UTF-8.
///
/// Once UTF-16 XML has been decoded into a Rust `String`, the declaration
/// still claims UTF-16 and quick-xml would try to decode it a second time.
fn fix_xml_encoding_declaration(content: &str) -> String {
    if content.starts_with("<?xml") {
        if let Some(end_decl) = content.find("?>") {
            let decl = &content[..end_decl + 2];
            let rest = &content[end_decl + 2..];

            let fixed_decl = decl
                .replace("encoding=\"UTF-16\"", "encoding=\"UTF-8\"")
                .replace("encoding='UTF-16'", "encoding='UTF-8'")
                .replace("encoding=\"utf-16\"", "encoding=\"UTF-8\"")
                .replace("encoding='utf-16'", "encoding='UTF-8'");

            return format!("{}{}", fixed_decl, rest);
        }
    }
    content.to_string()
}

/// Decode entry bytes into a string, honouring a UTF-8 or UTF-16 BOM.
pub fn decode_xml_bytes(bytes: &[u8]) -> Result<String> {
    if let Some(rest) = bytes.strip_prefix(b"\xEF\xBB\xBF") {
        return decode_utf8(rest);
    }

    if let Some(rest) = bytes.strip_prefix(b"\xFF\xFE") {
        let content = decode_utf16(rest, u16::from_le_bytes)?;
        return Ok(fix_xml_encoding_declaration(&content));
    }

    if let Some(rest) = bytes.strip_prefix(b"\xFE\xFF") {
        let content = decode_utf16(rest, u16::from_be_bytes)?;
        return Ok(fix_xml_encoding_declaration(&content));
    }

    decode_utf8(bytes)
}

fn decode_utf8(bytes: &[u8]) -> Result<String> {
    String::from_utf8(bytes.to_vec())
        .map_err(|e| Error::XmlParse(format!("invalid UTF-8: {}", e)))
}

fn decode_utf16(bytes: &[u8], unit: fn([u8; 2]) -> u16) -> Result<String> {
    let units = bytes.chunks_exact(2).map(|pair| unit([pair[0], pair[1]]));

    char::decode_utf16(units)
        .collect::<std::result::Result<String, _>>()
        .map_err(|e| Error::XmlParse(format!("invalid UTF-16: {}", e)))
}

/// An opened XLSX package.
///
/// The whole file is read into memory on open, so the underlying file
/// handle is released before any entry is parsed. Dropping the archive
/// releases the buffer.
pub struct Archive {
    archive: RefCell<zip::ZipArchive<Cursor<Vec<u8>>>>,
}

impl Archive {
    /// Open a package from a file path.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use xldump::container::Archive;
    ///
    /// let archive = Archive::open("workbook.xlsx")?;
    /// println!("{} entries", archive.list_files().len());
    /// # Ok::<(), xldump::Error>(())
    /// ```
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| Error::Archive(format!("{}: {}", path.display(), e)))?;
        let mut reader = BufReader::new(file);
        let mut data = Vec::new();
        reader
            .read_to_end(&mut data)
            .map_err(|e| Error::Archive(format!("{}: {}", path.display(), e)))?;
        Self::from_bytes(data)
    }

    /// Open a package held in memory.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let archive = zip::ZipArchive::new(Cursor::new(data))?;
        log::debug!("opened archive with {} entries", archive.len());
        Ok(Self {
            archive: RefCell::new(archive),
        })
    }

    /// Open a package from any seekable reader.
    pub fn from_reader<R: Read + Seek>(mut reader: R) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(data)
    }

    /// Read an XML entry as a string.
    ///
    /// Fails with [`Error::MissingComponent`] when the entry does not exist.
    pub fn read_xml(&self, path: &str) -> Result<String> {
        self.read_xml_opt(path)?
            .ok_or_else(|| Error::MissingComponent(path.to_string()))
    }

    /// Read an XML entry as a string, or `None` if the entry does not exist.
    pub fn read_xml_opt(&self, path: &str) -> Result<Option<String>> {
        let mut archive = self.archive.borrow_mut();
        let mut file = match archive.by_name(path) {
            Ok(file) => file,
            Err(zip::result::ZipError::FileNotFound) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)?;

        decode_xml_bytes(&bytes).map(Some)
    }

    /// List all entry names in archive order.
    pub fn list_files(&self) -> Vec<String> {
        self.archive
            .borrow()
            .file_names()
            .map(String::from)
            .collect()
    }

    /// List entry names starting with `prefix`, in archive order.
    pub fn list_files_with_prefix(&self, prefix: &str) -> Vec<String> {
        self.archive
            .borrow()
            .file_names()
            .filter(|n| n.starts_with(prefix))
            .map(String::from)
            .collect()
    }
}

impl std::fmt::Debug for Archive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Archive")
            .field("files", &self.archive.borrow().len())
            .finish()
    }
}

/// Build an in-memory ZIP from `(name, content)` pairs, in order.
#[cfg(test)]
pub(crate) fn zip_bytes(entries: &[(&str, &str)]) -> Vec<u8> {
    let raw: Vec<(&str, &[u8])> = entries.iter().map(|(n, c)| (*n, c.as_bytes())).collect();
    zip_bytes_raw(&raw)
}

#[cfg(test)]
pub(crate) fn zip_bytes_raw(entries: &[(&str, &[u8])]) -> Vec<u8> {
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    let mut buf = Vec::new();
    {
        let mut zip = zip::ZipWriter::new(Cursor::new(&mut buf));
        let options = SimpleFileOptions::default();
        for (name, content) in entries {
            zip.start_file(*name, options).unwrap();
            zip.write_all(content).unwrap();
        }
        zip.finish().unwrap();
    }
    buf
}
