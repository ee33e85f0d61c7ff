//! Document.xml writer
//!
//! Converts the DocumentTree back to document.xml. Paragraphs whose content
//! is unchanged since loading are written from their original XML, with any
//! bookmarks added since then spliced in around that content.

use crate::docx::error::DocxResult;
use crate::docx::namespaces;
use crate::docx::document::{NON_BREAKING_HYPHEN, SOFT_HYPHEN};
use crate::docx::package::{BodyBlock, DocumentLayout, ParagraphChange, ParagraphSource};
use crate::docx::relationships::Relationships;
use doc_model::{DocumentTree, Hyperlink, HyperlinkTarget, Node, NodeId, Paragraph, Run};
use std::collections::{HashMap, HashSet};

const DEFAULT_ROOT_NAME: &str = "w:document";

/// Writer for document.xml
pub struct DocumentWriter<'a> {
    /// Document relationships; external hyperlinks are registered here
    rels: &'a mut Relationships,
    added_relationships: usize,
    bookmark_ids: HashMap<String, u32>,
    next_bookmark_id: u32,
}

impl<'a> DocumentWriter<'a> {
    /// Create a new document writer
    pub fn new(rels: &'a mut Relationships, layout: &DocumentLayout) -> Self {
        Self {
            rels,
            added_relationships: 0,
            bookmark_ids: layout.bookmark_ids.clone(),
            next_bookmark_id: layout.next_bookmark_id,
        }
    }

    /// Number of relationships added while writing
    pub fn added_relationships(&self) -> usize {
        self.added_relationships
    }

    /// Generate document.xml content
    pub fn write(&mut self, tree: &DocumentTree, layout: &DocumentLayout) -> DocxResult<String> {
        let mut body = String::new();
        let mut written: HashSet<NodeId> = HashSet::new();

        for block in &layout.body {
            match block {
                BodyBlock::Paragraph(source) => {
                    let Some(para) = tree.get_paragraph(source.id) else {
                        continue;
                    };
                    match source.change(tree) {
                        ParagraphChange::Unchanged => body.push_str(&source.xml),
                        ParagraphChange::BookmarksAdded(names) => {
                            match self.splice_bookmarks(tree, source, &names) {
                                Some(xml) => body.push_str(&xml),
                                None => self.write_paragraph(&mut body, tree, para)?,
                            }
                        }
                        ParagraphChange::Rewritten => self.write_paragraph(&mut body, tree, para)?,
                    }
                    written.insert(source.id);
                }
                BodyBlock::Raw(xml) => body.push_str(xml),
            }
        }

        // Paragraphs added after loading (or every paragraph of a new document)
        for para in tree.paragraphs() {
            if !written.contains(&para.id()) {
                self.write_paragraph(&mut body, tree, para)?;
            }
        }

        if let Some(sect_pr) = &layout.section_properties {
            body.push_str(sect_pr);
        }

        let root_name = layout.root_name.as_deref().unwrap_or(DEFAULT_ROOT_NAME);
        let root_tag = match &layout.root_tag {
            Some(tag) => tag.clone(),
            None => format!("<{}>", DEFAULT_ROOT_NAME),
        };
        let root_tag = ensure_namespace(&root_tag, "w", namespaces::W);
        let root_tag = ensure_namespace(&root_tag, "r", namespaces::R);

        let mut xml = String::new();
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push('\n');
        xml.push_str(&root_tag);
        for item in &layout.preamble {
            xml.push_str(item);
        }
        xml.push_str("<w:body>");
        xml.push_str(&body);
        xml.push_str("</w:body>");
        xml.push_str(&format!("</{}>", root_name));

        Ok(xml)
    }

    /// Write a paragraph element
    fn write_paragraph(
        &mut self,
        xml: &mut String,
        tree: &DocumentTree,
        para: &Paragraph,
    ) -> DocxResult<()> {
        xml.push_str("<w:p>");

        // Paragraph properties
        if let Some(raw) = &para.raw_properties {
            xml.push_str(raw);
        } else if let Some(style) = &para.style_id {
            xml.push_str(&format!(r#"<w:pPr><w:pStyle w:val="{}"/></w:pPr>"#, escape_xml(style)));
        }

        let bookmarks = tree.bookmarks_in_paragraph(para.id());

        // Bookmarks starting here open before any content
        for bookmark in &bookmarks {
            if bookmark.start_position().node_id == para.id() {
                let id = self.bookmark_id(bookmark.name());
                xml.push_str(&format!(
                    r#"<w:bookmarkStart w:id="{}" w:name="{}"/>"#,
                    id,
                    escape_xml(bookmark.name())
                ));
            }
        }

        // Paragraph content (runs and hyperlinks)
        for child_id in para.children() {
            if let Some(run) = tree.get_run(*child_id) {
                write_run(xml, run);
            } else if let Some(hyperlink) = tree.get_hyperlink(*child_id) {
                self.write_hyperlink(xml, tree, hyperlink);
            }
        }

        // ...and close after it
        for bookmark in &bookmarks {
            if bookmark.end_position().node_id == para.id() {
                let id = self.bookmark_id(bookmark.name());
                xml.push_str(&format!(r#"<w:bookmarkEnd w:id="{}"/>"#, id));
            }
        }

        xml.push_str("</w:p>");
        Ok(())
    }

    /// Original paragraph XML with new bookmark markers around its content
    fn splice_bookmarks(
        &mut self,
        tree: &DocumentTree,
        source: &ParagraphSource,
        names: &[String],
    ) -> Option<String> {
        let mut opening = String::new();
        let mut closing = String::new();
        for name in names {
            let bookmark = tree.get_bookmark_by_name(name)?;
            if bookmark.start_position().node_id == source.id {
                let id = self.bookmark_id(name);
                opening.push_str(&format!(
                    r#"<w:bookmarkStart w:id="{}" w:name="{}"/>"#,
                    id,
                    escape_xml(name)
                ));
            }
            if bookmark.end_position().node_id == source.id {
                let id = self.bookmark_id(name);
                closing.push_str(&format!(r#"<w:bookmarkEnd w:id="{}"/>"#, id));
            }
        }
        source.splice(&opening, &closing)
    }

    fn bookmark_id(&mut self, name: &str) -> u32 {
        if let Some(id) = self.bookmark_ids.get(name) {
            return *id;
        }
        let id = self.next_bookmark_id;
        self.next_bookmark_id += 1;
        self.bookmark_ids.insert(name.to_string(), id);
        id
    }

    /// Write a hyperlink element
    fn write_hyperlink(&mut self, xml: &mut String, tree: &DocumentTree, hyperlink: &Hyperlink) {
        match &hyperlink.target {
            HyperlinkTarget::Internal(bookmark) => {
                xml.push_str(&format!(r#"<w:hyperlink w:anchor="{}""#, escape_xml(bookmark)));
            }
            HyperlinkTarget::External(url) => {
                let (rel_id, added) = self.rels.hyperlink_id(url);
                if added {
                    self.added_relationships += 1;
                }
                xml.push_str(&format!(r#"<w:hyperlink r:id="{}""#, escape_xml(&rel_id)));
            }
        }
        if let Some(tooltip) = &hyperlink.tooltip {
            xml.push_str(&format!(r#" w:tooltip="{}""#, escape_xml(tooltip)));
        }
        if hyperlink.history {
            xml.push_str(r#" w:history="1""#);
        }
        xml.push('>');

        for child_id in hyperlink.children() {
            if let Some(run) = tree.get_run(*child_id) {
                write_run(xml, run);
            }
        }

        xml.push_str("</w:hyperlink>");
    }
}

/// Write a run element
fn write_run(xml: &mut String, run: &Run) {
    xml.push_str("<w:r>");
    write_run_properties(xml, run);

    let mut segment = String::new();
    for c in run.text.chars() {
        match c {
            '\t' => {
                flush_text(xml, &mut segment);
                xml.push_str("<w:tab/>");
            }
            '\n' => {
                flush_text(xml, &mut segment);
                xml.push_str("<w:br/>");
            }
            NON_BREAKING_HYPHEN => {
                flush_text(xml, &mut segment);
                xml.push_str("<w:noBreakHyphen/>");
            }
            SOFT_HYPHEN => {
                flush_text(xml, &mut segment);
                xml.push_str("<w:softHyphen/>");
            }
            _ => segment.push(c),
        }
    }
    flush_text(xml, &mut segment);

    xml.push_str("</w:r>");
}

fn flush_text(xml: &mut String, segment: &mut String) {
    if segment.is_empty() {
        return;
    }
    // xml:space="preserve" keeps leading/trailing spaces
    let needs_preserve = segment.starts_with(char::is_whitespace) || segment.ends_with(char::is_whitespace);
    if needs_preserve {
        xml.push_str(r#"<w:t xml:space="preserve">"#);
    } else {
        xml.push_str("<w:t>");
    }
    xml.push_str(&escape_xml(segment));
    xml.push_str("</w:t>");
    segment.clear();
}

/// Write run properties
fn write_run_properties(xml: &mut String, run: &Run) {
    if let Some(raw) = &run.raw_properties {
        xml.push_str(raw);
        return;
    }

    let props = &run.direct_formatting;
    if run.character_style_id.is_none() && props.is_empty() {
        return;
    }

    xml.push_str("<w:rPr>");

    if let Some(style) = &run.character_style_id {
        xml.push_str(&format!(r#"<w:rStyle w:val="{}"/>"#, escape_xml(style)));
    }

    if let Some(font) = &props.font_family {
        let font = escape_xml(font);
        xml.push_str(&format!(
            r#"<w:rFonts w:ascii="{0}" w:hAnsi="{0}" w:cs="{0}"/>"#,
            font
        ));
    }

    if let Some(bold) = props.bold {
        xml.push_str(if bold { "<w:b/>" } else { r#"<w:b w:val="0"/>"# });
    }

    if let Some(italic) = props.italic {
        xml.push_str(if italic { "<w:i/>" } else { r#"<w:i w:val="0"/>"# });
    }

    if let Some(color) = &props.color {
        let color_val = color.trim_start_matches('#');
        xml.push_str(&format!(r#"<w:color w:val="{}"/>"#, escape_xml(color_val)));
    }

    // Font size (in half-points)
    if let Some(size) = props.font_size {
        let half_pts = (size * 2.0).round() as i32;
        xml.push_str(&format!(r#"<w:sz w:val="{}"/>"#, half_pts));
        xml.push_str(&format!(r#"<w:szCs w:val="{}"/>"#, half_pts));
    }

    if let Some(underline) = props.underline {
        xml.push_str(if underline { r#"<w:u w:val="single"/>"# } else { r#"<w:u w:val="none"/>"# });
    }

    xml.push_str("</w:rPr>");
}

/// Add a namespace declaration to an opening tag when it is missing
fn ensure_namespace(tag: &str, prefix: &str, uri: &str) -> String {
    let declaration = format!("xmlns:{}=", prefix);
    if tag.contains(&declaration) {
        return tag.to_string();
    }
    match tag.strip_suffix('>') {
        Some(head) => format!(r#"{} xmlns:{}="{}">"#, head, prefix, uri),
        None => tag.to_string(),
    }
}

/// Escape special XML characters
pub(crate) fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
