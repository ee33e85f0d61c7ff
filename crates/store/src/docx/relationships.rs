//! Relationships (.rels) file parsing and generation
//!
//! DOCX uses relationships to connect parts of the document together.
//! Entries keep their file order so a rewritten part differs from the
//! original only by what was added.

use crate::docx::document_writer::escape_xml;
use crate::docx::error::{DocxError, DocxResult};
use crate::docx::reader::XmlParser;
use crate::docx::relationship_types;
use quick_xml::events::Event;

/// A single relationship in a .rels file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    /// Unique ID within the rels file (e.g., "rId1")
    pub id: String,
    /// Relationship type URI
    pub rel_type: String,
    /// Target path (relative to the source part)
    pub target: String,
    /// Target mode (Internal or External)
    pub target_mode: TargetMode,
}

/// Target mode for relationships
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TargetMode {
    /// Internal target within the package
    #[default]
    Internal,
    /// External target (URL)
    External,
}

/// Collection of relationships from a .rels file
#[derive(Debug, Clone)]
pub struct Relationships {
    relationships: Vec<Relationship>,
    /// Counter for generating new IDs
    next_id: u32,
}

impl Default for Relationships {
    fn default() -> Self {
        Self::new()
    }
}

impl Relationships {
    /// Create a new empty relationships collection
    pub fn new() -> Self {
        Self {
            relationships: Vec::new(),
            next_id: 1,
        }
    }

    /// Parse a .rels file from its XML content
    pub fn parse(content: &str) -> DocxResult<Self> {
        let mut result = Self::new();
        let mut reader = XmlParser::from_string(content);
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => {
                    let name = e.name();
                    if XmlParser::matches_element(name.as_ref(), "Relationship") {
                        let id = XmlParser::get_attribute(e, b"Id")
                            .ok_or_else(|| DocxError::InvalidStructure("Relationship missing Id".into()))?;
                        let rel_type = XmlParser::get_attribute(e, b"Type")
                            .ok_or_else(|| DocxError::InvalidStructure("Relationship missing Type".into()))?;
                        let target = XmlParser::get_attribute(e, b"Target")
                            .ok_or_else(|| DocxError::InvalidStructure("Relationship missing Target".into()))?;
                        let target_mode = match XmlParser::get_attribute(e, b"TargetMode").as_deref() {
                            Some("External") => TargetMode::External,
                            _ => TargetMode::Internal,
                        };

                        result.push(Relationship { id, rel_type, target, target_mode });
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(DocxError::from(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(result)
    }

    fn push(&mut self, rel: Relationship) {
        // New IDs are allocated after the highest existing rIdN
        if let Some(num) = rel.id.strip_prefix("rId").and_then(|n| n.parse::<u32>().ok()) {
            self.next_id = self.next_id.max(num + 1);
        }
        self.relationships.push(rel);
    }

    /// Add a relationship and return its ID
    pub fn add(&mut self, rel_type: &str, target: &str, target_mode: TargetMode) -> String {
        let mut id = format!("rId{}", self.next_id);
        while self.contains(&id) {
            self.next_id += 1;
            id = format!("rId{}", self.next_id);
        }

        self.push(Relationship {
            id: id.clone(),
            rel_type: rel_type.to_string(),
            target: target.to_string(),
            target_mode,
        });

        id
    }

    /// ID of an external hyperlink relationship to `url`, adding one when needed.
    /// The flag is true when a new relationship was created.
    pub fn hyperlink_id(&mut self, url: &str) -> (String, bool) {
        let existing = self.relationships.iter().find(|r| {
            r.rel_type == relationship_types::HYPERLINK
                && r.target_mode == TargetMode::External
                && r.target == url
        });
        match existing {
            Some(rel) => (rel.id.clone(), false),
            None => (self.add(relationship_types::HYPERLINK, url, TargetMode::External), true),
        }
    }

    /// Get a relationship by ID
    pub fn get(&self, id: &str) -> Option<&Relationship> {
        self.relationships.iter().find(|r| r.id == id)
    }

    /// Get a relationship by type
    pub fn get_by_type(&self, rel_type: &str) -> Option<&Relationship> {
        self.relationships.iter().find(|r| r.rel_type == rel_type)
    }

    /// Get the target path for a relationship ID
    pub fn get_target(&self, id: &str) -> Option<&str> {
        self.get(id).map(|r| r.target.as_str())
    }

    /// Check if a relationship exists
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Number of relationships
    pub fn len(&self) -> usize {
        self.relationships.len()
    }

    /// Check if there are no relationships
    pub fn is_empty(&self) -> bool {
        self.relationships.is_empty()
    }

    /// Generate XML content for the .rels file
    pub fn to_xml(&self) -> String {
        let mut xml = String::new();
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push('\n');
        xml.push_str(r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#);

        for rel in &self.relationships {
            xml.push_str(&format!(
                r#"<Relationship Id="{}" Type="{}" Target="{}""#,
                escape_xml(&rel.id),
                escape_xml(&rel.rel_type),
                escape_xml(&rel.target)
            ));
            if rel.target_mode == TargetMode::External {
                xml.push_str(r#" TargetMode="External""#);
            }
            xml.push_str("/>");
        }

        xml.push_str("</Relationships>");
        xml
    }
}

/// Create the root .rels file for a new DOCX
pub fn create_root_rels() -> Relationships {
    let mut rels = Relationships::new();
    rels.add(
        relationship_types::DOCUMENT,
        "word/document.xml",
        TargetMode::Internal,
    );
    rels
}
