//! ZIP archive reading and XML parsing utilities

use crate::docx::error::{DocxError, DocxResult};
use crate::docx::part_names;
use quick_xml::events::{BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::io::{Read, Seek};
use zip::ZipArchive;

/// A wrapper around a ZIP archive for reading DOCX files
pub struct DocxReader<R: Read + Seek> {
    archive: ZipArchive<R>,
}

impl<R: Read + Seek> DocxReader<R> {
    /// Create a new DOCX reader from a source that implements Read + Seek
    pub fn new(reader: R) -> DocxResult<Self> {
        let archive = ZipArchive::new(reader)?;
        Ok(Self { archive })
    }

    /// Read a file from the archive as a string
    pub fn read_file_as_string(&mut self, path: &str) -> DocxResult<String> {
        let bytes = self.read_file_as_bytes(path)?;
        Ok(String::from_utf8(bytes)?)
    }

    /// Read a file from the archive as bytes
    pub fn read_file_as_bytes(&mut self, path: &str) -> DocxResult<Vec<u8>> {
        let mut file = self.archive.by_name(path).map_err(|e| {
            if matches!(e, zip::result::ZipError::FileNotFound) {
                DocxError::MissingPart(path.to_string())
            } else {
                DocxError::from(e)
            }
        })?;

        let mut contents = Vec::new();
        file.read_to_end(&mut contents)?;
        Ok(contents)
    }

    /// Read every file entry in archive order, skipping directory entries
    pub fn read_all(&mut self) -> DocxResult<Vec<(String, Vec<u8>)>> {
        let mut entries = Vec::with_capacity(self.archive.len());
        for index in 0..self.archive.len() {
            let mut file = self.archive.by_index(index)?;
            if file.is_dir() {
                continue;
            }
            let name = file.name().to_string();
            let mut contents = Vec::new();
            file.read_to_end(&mut contents)?;
            entries.push((name, contents));
        }
        Ok(entries)
    }

    /// Check if a file exists in the archive
    pub fn file_exists(&self, path: &str) -> bool {
        self.archive.file_names().any(|name| name == path)
    }

    /// Check if this looks like an OPC package; the main document part is
    /// checked once it has been resolved
    pub fn is_valid_docx(&self) -> bool {
        self.file_exists(part_names::CONTENT_TYPES)
    }
}

/// XML reader utilities for parsing DOCX XML content
pub struct XmlParser;

impl XmlParser {
    /// Create a new XML reader from a string.
    ///
    /// Text is not trimmed: whitespace inside `w:t` is content.
    pub fn from_string(content: &str) -> Reader<&[u8]> {
        let mut reader = Reader::from_str(content);
        reader.config_mut().trim_text(false);
        reader
    }

    /// Get an unescaped attribute value from an event
    pub fn get_attribute(event: &BytesStart, name: &[u8]) -> Option<String> {
        event.attributes()
            .filter_map(|a| a.ok())
            .find(|a| a.key.as_ref() == name)
            .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
    }

    /// Get an attribute value with a namespace prefix
    pub fn get_prefixed_attribute(event: &BytesStart, prefix: &str, local: &str) -> Option<String> {
        let key = format!("{}:{}", prefix, local);
        Self::get_attribute(event, key.as_bytes())
    }

    /// Get a w: namespaced attribute (most common in DOCX)
    pub fn get_w_attribute(event: &BytesStart, name: &str) -> Option<String> {
        Self::get_prefixed_attribute(event, "w", name)
            .or_else(|| Self::get_attribute(event, name.as_bytes()))
    }

    /// Get a r: namespaced attribute
    pub fn get_r_attribute(event: &BytesStart, name: &str) -> Option<String> {
        Self::get_prefixed_attribute(event, "r", name)
    }

    /// Parse a half-point value to points
    /// DOCX uses half-points for font sizes
    pub fn parse_half_points(value: &str) -> Option<f32> {
        value.parse::<f32>().ok().map(|v| v / 2.0)
    }

    /// Parse a boolean value (0/1, true/false, on/off)
    pub fn parse_bool(value: &str) -> bool {
        matches!(value.to_lowercase().as_str(), "1" | "true" | "on" | "yes")
    }

    /// Check if an element name matches with optional namespace prefix
    pub fn matches_element(name: &[u8], expected: &str) -> bool {
        Self::local_name(name) == expected
    }

    /// Element name without its namespace prefix
    pub fn local_name(name: &[u8]) -> &str {
        let name_str = std::str::from_utf8(name).unwrap_or("");
        match name_str.rsplit_once(':') {
            Some((_, local)) => local,
            None => name_str,
        }
    }
}

/// Re-serializes a stream of events so a fragment can be written back
/// exactly as it was read
pub struct XmlCapture {
    writer: Writer<Vec<u8>>,
}

impl XmlCapture {
    /// Start a capture with its opening event
    pub fn starting_with(event: &Event) -> DocxResult<Self> {
        let mut capture = Self { writer: Writer::new(Vec::new()) };
        capture.push(event)?;
        Ok(capture)
    }

    /// Append an event to the capture
    pub fn push(&mut self, event: &Event) -> DocxResult<()> {
        self.writer
            .write_event(event.clone())
            .map_err(|e| DocxError::XmlParse(e.to_string()))
    }

    /// Byte offset the next event will be written at
    pub fn position(&self) -> usize {
        self.writer.get_ref().len()
    }

    /// Finish the capture and return the fragment
    pub fn finish(self) -> DocxResult<String> {
        Ok(String::from_utf8(self.writer.into_inner())?)
    }

    /// Serialize a single event
    pub fn event_to_string(event: &Event) -> DocxResult<String> {
        Self::starting_with(event)?.finish()
    }
}
