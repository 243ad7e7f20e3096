//! ZIP package access for spreadsheet workbooks.

use crate::error::{Error, Result};
use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{Cursor, Read};
use std::path::{Component, Path, PathBuf};

/// Relationship targets of one package part, keyed by relationship ID.
#[derive(Debug, Clone, Default)]
pub struct Relationships {
    targets: HashMap<String, String>,
}

impl Relationships {
    /// Get the raw target of a relationship.
    pub fn target(&self, id: &str) -> Option<&str> {
        self.targets.get(id).map(String::as_str)
    }

    /// Number of relationships.
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Check if there are no relationships.
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Parse a `.rels` part.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut targets = HashMap::new();
        let mut reader = quick_xml::Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();
        loop {
            match reader.read_event_into(&mut buf) {
                Ok(quick_xml::events::Event::Empty(e)) | Ok(quick_xml::events::Event::Start(e))
                    if e.name().local_name().as_ref() == b"Relationship" =>
                {
                    let mut id = None;
                    let mut target = None;
                    let mut external = false;

                    for attr in e.attributes().flatten() {
                        let value = String::from_utf8_lossy(&attr.value).to_string();
                        match attr.key.as_ref() {
                            b"Id" => id = Some(value),
                            b"Target" => target = Some(value),
                            b"TargetMode" => external = value.eq_ignore_ascii_case("external"),
                            _ => {}
                        }
                    }

                    if let (Some(id), Some(target), false) = (id, target, external) {
                        targets.insert(id, target);
                    }
                }
                Ok(quick_xml::events::Event::Eof) => break,
                Err(e) => return Err(Error::XmlParse(e.to_string())),
                _ => {}
            }
            buf.clear();
        }

        Ok(Self { targets })
    }
}

/// Rewrite a UTF-16 encoding declaration after the text has been decoded.
fn fix_encoding_declaration(content: String) -> String {
    if !content.starts_with("<?xml") {
        return content;
    }
    match content.find("?>") {
        Some(end) => {
            let declaration = content[..end + 2]
                .replace("UTF-16", "UTF-8")
                .replace("utf-16", "UTF-8");
            format!("{}{}", declaration, &content[end + 2..])
        }
        None => content,
    }
}

fn decode_utf16(bytes: &[u8], from_bytes: fn([u8; 2]) -> u16) -> Result<String> {
    let units = bytes.chunks_exact(2).map(|pair| from_bytes([pair[0], pair[1]]));
    char::decode_utf16(units)
        .collect::<std::result::Result<String, _>>()
        .map_err(|e| Error::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}

/// Decode XML part bytes, honoring UTF-8 and UTF-16 byte order marks.
pub fn decode_xml_bytes(bytes: &[u8]) -> Result<String> {
    match bytes {
        [0xEF, 0xBB, 0xBF, rest @ ..] => String::from_utf8(rest.to_vec())
            .map_err(|e| Error::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e))),
        [0xFF, 0xFE, rest @ ..] => decode_utf16(rest, u16::from_le_bytes).map(fix_encoding_declaration),
        [0xFE, 0xFF, rest @ ..] => decode_utf16(rest, u16::from_be_bytes).map(fix_encoding_declaration),
        _ => Ok(String::from_utf8_lossy(bytes).into_owned()),
    }
}

/// An Office Open XML package held in memory.
pub struct OoxmlPackage {
    archive: RefCell<zip::ZipArchive<Cursor<Vec<u8>>>>,
}

impl OoxmlPackage {
    /// Open a package from bytes.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let archive = zip::ZipArchive::new(Cursor::new(data))?;
        Ok(Self {
            archive: RefCell::new(archive),
        })
    }

    /// Read a part as text.
    pub fn read_xml(&self, path: &str) -> Result<String> {
        let mut archive = self.archive.borrow_mut();
        let mut file = archive
            .by_name(path)
            .map_err(|_| Error::MissingComponent(path.to_string()))?;

        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)?;
        decode_xml_bytes(&bytes)
    }

    /// Read a part as text, or `None` when the part does not exist.
    pub fn read_optional_xml(&self, path: &str) -> Result<Option<String>> {
        if !self.exists(path) {
            return Ok(None);
        }
        self.read_xml(path).map(Some)
    }

    /// Check if a part exists.
    pub fn exists(&self, path: &str) -> bool {
        let archive = self.archive.borrow();
        let found = archive.file_names().any(|n| n == path);
        found
    }

    /// List all part names.
    pub fn list_files(&self) -> Vec<String> {
        let archive = self.archive.borrow();
        archive.file_names().map(String::from).collect()
    }

    /// Read the relationships of a part; a missing `.rels` part yields none.
    pub fn read_relationships(&self, part_path: &str) -> Result<Relationships> {
        let part = Path::new(part_path);
        let parent = part.parent().unwrap_or(Path::new(""));
        let file_name = part.file_name().unwrap_or_default().to_string_lossy();
        let rels_path = parent
            .join("_rels")
            .join(format!("{}.rels", file_name))
            .to_string_lossy()
            .replace('\\', "/");

        match self.read_optional_xml(&rels_path)? {
            Some(xml) if !xml.trim().is_empty() => Relationships::parse(&xml),
            _ => Ok(Relationships::default()),
        }
    }

    /// Resolve a relationship target against the part that declares it.
    pub fn resolve_path(base: &str, target: &str) -> String {
        if let Some(absolute) = target.strip_prefix('/') {
            return absolute.to_string();
        }

        let mut resolved: PathBuf = Path::new(base).parent().unwrap_or(Path::new("")).into();
        for component in Path::new(target).components() {
            match component {
                Component::ParentDir => {
                    resolved.pop();
                }
                Component::Normal(part) => resolved.push(part),
                _ => {}
            }
        }

        resolved.to_string_lossy().replace('\\', "/")
    }
}

impl std::fmt::Debug for OoxmlPackage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OoxmlPackage")
            .field("parts", &self.list_files().len())
            .finish()
    }
}
