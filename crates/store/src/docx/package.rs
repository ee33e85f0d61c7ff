//! In-memory DOCX package

use crate::docx::part_names;
use crate::docx::relationships::Relationships;
use doc_model::{DocumentTree, Node, NodeId};
use std::collections::HashMap;

/// A loaded DOCX package: the editable document tree plus everything needed
/// to write the package back without losing parts the tree does not model
#[derive(Debug, Clone)]
pub struct DocxPackage {
    /// The document body as a tree of paragraphs, runs and hyperlinks
    pub tree: DocumentTree,
    /// Every entry of the source archive in its original order
    pub parts: Vec<(String, Vec<u8>)>,
    /// Name of the main document part (usually `word/document.xml`)
    pub document_part: String,
    /// Relationships of the main document part
    pub relationships: Relationships,
    /// Body layout of the source document
    pub layout: DocumentLayout,
}

impl DocxPackage {
    /// A package with no source parts; minimal package files are generated on export
    pub fn new(tree: DocumentTree) -> Self {
        Self {
            tree,
            parts: Vec::new(),
            document_part: part_names::DOCUMENT.to_string(),
            relationships: Relationships::new(),
            layout: DocumentLayout::default(),
        }
    }

    /// Raw bytes of a package part
    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.parts
            .iter()
            .find(|(part_name, _)| part_name == name)
            .map(|(_, data)| data.as_slice())
    }

    /// Whether this package was read from an existing file
    pub fn has_source(&self) -> bool {
        !self.parts.is_empty()
    }
}

/// Document.xml content outside the paragraphs of the tree, in source order
#[derive(Debug, Clone, Default)]
pub struct DocumentLayout {
    /// Opening tag of the root element, with its namespace declarations
    pub root_tag: Option<String>,
    /// Qualified name of the root element
    pub root_name: Option<String>,
    /// Root children before the body (e.g. `w:background`)
    pub preamble: Vec<String>,
    /// Body children in order
    pub body: Vec<BodyBlock>,
    /// Final section properties of the body
    pub section_properties: Option<String>,
    /// Numeric `w:id` of each bookmark name found in the source
    pub bookmark_ids: HashMap<String, u32>,
    /// Lowest `w:id` not used by any source bookmark
    pub next_bookmark_id: u32,
}

/// A body-level element
#[derive(Debug, Clone)]
pub enum BodyBlock {
    /// A paragraph held in the tree
    Paragraph(ParagraphSource),
    /// Any other element (tables, content controls, ...) kept verbatim
    Raw(String),
}

/// A paragraph with the XML it was loaded from
#[derive(Debug, Clone)]
pub struct ParagraphSource {
    /// Paragraph node in the tree
    pub id: NodeId,
    /// Original `w:p` element
    pub xml: String,
    /// Offset in `xml` where inline content begins (after `w:pPr`)
    pub content_start: usize,
    /// Offset in `xml` of the closing tag; `None` for an empty element
    pub content_end: Option<usize>,
    /// State of the paragraph right after loading
    pub fingerprint: Option<ParagraphFingerprint>,
}

/// How a paragraph differs from the XML it was loaded from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParagraphChange {
    Unchanged,
    /// Same content with these bookmarks added
    BookmarksAdded(Vec<String>),
    /// Content or properties changed; the XML no longer describes it
    Rewritten,
}

impl ParagraphSource {
    pub fn change(&self, tree: &DocumentTree) -> ParagraphChange {
        let Some(loaded) = &self.fingerprint else {
            return ParagraphChange::Rewritten;
        };
        let current = ParagraphFingerprint::of(tree, self.id);
        if current.content != loaded.content
            || !loaded.bookmarks.iter().all(|name| current.bookmarks.contains(name))
        {
            return ParagraphChange::Rewritten;
        }

        let added: Vec<String> = current
            .bookmarks
            .into_iter()
            .filter(|name| !loaded.bookmarks.contains(name))
            .collect();
        if added.is_empty() {
            ParagraphChange::Unchanged
        } else {
            ParagraphChange::BookmarksAdded(added)
        }
    }

    /// Whether the paragraph still matches what was loaded
    pub fn is_unchanged(&self, tree: &DocumentTree) -> bool {
        self.change(tree) == ParagraphChange::Unchanged
    }

    /// The original XML with extra markup placed just inside the paragraph:
    /// `opening` after the paragraph properties, `closing` before the end tag
    pub fn splice(&self, opening: &str, closing: &str) -> Option<String> {
        let end = self.content_end?;
        let start = self.content_start.min(end);
        let head = self.xml.get(..start)?;
        let content = self.xml.get(start..end)?;
        let tail = self.xml.get(end..)?;
        Some(format!("{}{}{}{}{}", head, opening, content, closing, tail))
    }
}

/// What a paragraph looks like to the model; equal content means the
/// original XML can be written back as is
#[derive(Debug, Clone, PartialEq)]
pub struct ParagraphFingerprint {
    content: ParagraphContent,
    bookmarks: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
struct ParagraphContent {
    children: Vec<NodeId>,
    text: String,
    style_id: Option<String>,
    raw_properties: Option<String>,
}

impl ParagraphFingerprint {
    /// Fingerprint of a paragraph in its current state
    pub fn of(tree: &DocumentTree, para_id: NodeId) -> Self {
        let para = tree.get_paragraph(para_id);
        Self {
            content: ParagraphContent {
                children: para.map(|p| p.children().to_vec()).unwrap_or_default(),
                text: tree.paragraph_text(para_id),
                style_id: para.and_then(|p| p.style_id.clone()),
                raw_properties: para.and_then(|p| p.raw_properties.clone()),
            },
            bookmarks: tree
                .bookmarks_in_paragraph(para_id)
                .iter()
                .map(|b| b.name().to_string())
                .collect(),
        }
    }
}
