//! Document.xml parser
//!
//! Parses body paragraphs (runs, text, hyperlinks and bookmarks) into the
//! DocumentTree, and records everything else in a [`DocumentLayout`] so the
//! part can be written back faithfully.

use crate::docx::error::{DocxError, DocxResult};
use crate::docx::package::{BodyBlock, DocumentLayout, ParagraphFingerprint, ParagraphSource};
use crate::docx::reader::{XmlCapture, XmlParser};
use crate::docx::relationships::Relationships;
use doc_model::{
    Bookmark, CharacterProperties, DocumentTree, Hyperlink, HyperlinkTarget, Paragraph, Position,
    Run,
};
use quick_xml::events::{BytesStart, BytesText, Event};
use std::collections::HashMap;
use tracing::debug;

/// Text stand-ins for `w:noBreakHyphen` and `w:softHyphen`
pub(crate) const NON_BREAKING_HYPHEN: char = '\u{2011}';
pub(crate) const SOFT_HYPHEN: char = '\u{00AD}';

/// Parser for document.xml
pub struct DocumentParser<'a> {
    /// Document relationships (external hyperlink targets)
    doc_rels: &'a Relationships,
}

impl<'a> DocumentParser<'a> {
    /// Create a new document parser
    pub fn new(doc_rels: &'a Relationships) -> Self {
        Self { doc_rels }
    }

    /// Parse document.xml and populate the DocumentTree
    pub fn parse(&self, content: &str, tree: &mut DocumentTree) -> DocxResult<DocumentLayout> {
        let mut reader = XmlParser::from_string(content);
        let mut buf = Vec::new();
        let mut state = ParseState::default();

        loop {
            let event = reader.read_event_into(&mut buf).map_err(DocxError::from)?;
            match &event {
                Event::Eof => break,
                Event::Start(e) => {
                    let level = state.depth;
                    state.depth += 1;
                    self.on_start(&mut state, &event, e, level, false, tree)?;
                }
                Event::Empty(e) => {
                    let level = state.depth;
                    self.on_start(&mut state, &event, e, level, true, tree)?;
                }
                Event::End(e) => {
                    state.depth = state.depth.saturating_sub(1);
                    let level = state.depth;
                    let name = e.name();
                    self.on_end(&mut state, &event, XmlParser::local_name(name.as_ref()), level, tree)?;
                }
                Event::Text(text) => state.on_text(&event, text)?,
                _ => state.forward(&event)?,
            }
            buf.clear();
        }

        state.finish(tree)
    }

    fn on_start(
        &self,
        state: &mut ParseState,
        event: &Event,
        e: &BytesStart,
        level: usize,
        empty: bool,
        tree: &mut DocumentTree,
    ) -> DocxResult<()> {
        if let Some(para) = state.para.as_mut() {
            return para.on_start(event, e, level, empty);
        }
        if let Some(block) = state.block.as_mut() {
            return block.capture.push(event);
        }

        let name = e.name();
        let local = XmlParser::local_name(name.as_ref());

        match level {
            0 => {
                state.layout.root_tag = Some(XmlCapture::event_to_string(event)?);
                state.layout.root_name = Some(String::from_utf8_lossy(name.as_ref()).into_owned());
            }
            1 if local == "body" => state.in_body = !empty,
            1 => state.start_block(event, level, empty, BlockKind::Preamble)?,
            2 if state.in_body && local == "p" => {
                let para = ParsedParagraph::new(event, level)?;
                if empty {
                    self.commit_paragraph(para, &mut state.bookmarks, &mut state.layout, tree)?;
                } else {
                    state.para = Some(para);
                }
            }
            2 if state.in_body && local == "sectPr" => {
                state.start_block(event, level, empty, BlockKind::SectionProperties)?
            }
            2 if state.in_body => state.start_block(event, level, empty, BlockKind::Body)?,
            _ => {}
        }

        Ok(())
    }

    fn on_end(
        &self,
        state: &mut ParseState,
        event: &Event,
        local: &str,
        level: usize,
        tree: &mut DocumentTree,
    ) -> DocxResult<()> {
        if let Some(para) = state.para.as_mut() {
            if para.on_end(event, local, level)? {
                if let Some(parsed) = state.para.take() {
                    self.commit_paragraph(parsed, &mut state.bookmarks, &mut state.layout, tree)?;
                }
            }
            return Ok(());
        }

        if let Some(block) = state.block.as_mut() {
            block.capture.push(event)?;
            if level == block.level {
                if let Some(block) = state.block.take() {
                    let xml = block.capture.finish()?;
                    state.place_block(block.kind, xml);
                }
            }
            return Ok(());
        }

        if level == 1 && local == "body" {
            state.in_body = false;
        }
        Ok(())
    }

    /// Commit a parsed paragraph to the tree
    fn commit_paragraph(
        &self,
        parsed: ParsedParagraph,
        bookmarks: &mut BookmarkCollector,
        layout: &mut DocumentLayout,
        tree: &mut DocumentTree,
    ) -> DocxResult<()> {
        let ParsedParagraph {
            node,
            source,
            content_start,
            content_end,
            items,
            bookmark_starts,
            bookmark_ends,
            ..
        } = parsed;

        let para_id = tree.insert_paragraph(node, None);

        // Grapheme offset after each run, indexed by the number of runs seen
        let mut run_offsets = vec![0usize];
        let mut push_offset = |run: &Run| {
            let last = run_offsets.last().copied().unwrap_or(0);
            run_offsets.push(last + run.grapheme_count());
        };

        for item in items {
            match item {
                ParsedInline::Run(parsed_run) => {
                    let run = parsed_run.into_run();
                    push_offset(&run);
                    tree.insert_run(run, para_id, None)?;
                }
                ParsedInline::Hyperlink(parsed_link) => match self.resolve_target(&parsed_link) {
                    Some(target) => {
                        let mut hyperlink = Hyperlink::new(target);
                        hyperlink.history = parsed_link.history;
                        hyperlink.tooltip = parsed_link.tooltip;
                        let hyperlink_id = tree.insert_hyperlink(hyperlink, para_id, None)?;
                        for parsed_run in parsed_link.runs {
                            let run = parsed_run.into_run();
                            push_offset(&run);
                            tree.insert_run_into_hyperlink(run, hyperlink_id)?;
                        }
                    }
                    None => {
                        // Unresolvable target: keep the text, drop the link
                        debug!(rel_id = ?parsed_link.rel_id, "Hyperlink target not found");
                        for parsed_run in parsed_link.runs {
                            let run = parsed_run.into_run();
                            push_offset(&run);
                            tree.insert_run(run, para_id, None)?;
                        }
                    }
                },
            }
        }

        let offset_at = |runs_seen: usize| {
            run_offsets
                .get(runs_seen)
                .or(run_offsets.last())
                .copied()
                .unwrap_or(0)
        };
        for (id, name, runs_seen) in bookmark_starts {
            bookmarks.open(id, name, Position::new(para_id, offset_at(runs_seen)));
        }
        for (id, runs_seen) in bookmark_ends {
            bookmarks.close(&id, Position::new(para_id, offset_at(runs_seen)), tree);
        }

        layout.body.push(BodyBlock::Paragraph(ParagraphSource {
            id: para_id,
            xml: source.finish()?,
            content_start,
            content_end,
            fingerprint: None,
        }));
        Ok(())
    }

    /// Determine the hyperlink target
    fn resolve_target(&self, link: &ParsedHyperlink) -> Option<HyperlinkTarget> {
        if let Some(anchor) = &link.anchor {
            // Internal bookmark link
            return Some(HyperlinkTarget::internal(anchor));
        }
        link.rel_id
            .as_deref()
            .and_then(|rel_id| self.doc_rels.get_target(rel_id))
            .map(HyperlinkTarget::external)
    }
}

/// Where a captured non-paragraph element goes in the layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockKind {
    Preamble,
    Body,
    SectionProperties,
}

struct RawBlock {
    level: usize,
    kind: BlockKind,
    capture: XmlCapture,
}

#[derive(Default)]
struct ParseState {
    depth: usize,
    in_body: bool,
    layout: DocumentLayout,
    block: Option<RawBlock>,
    para: Option<ParsedParagraph>,
    bookmarks: BookmarkCollector,
}

impl ParseState {
    fn start_block(&mut self, event: &Event, level: usize, empty: bool, kind: BlockKind) -> DocxResult<()> {
        let capture = XmlCapture::starting_with(event)?;
        if empty {
            let xml = capture.finish()?;
            self.place_block(kind, xml);
        } else {
            self.block = Some(RawBlock { level, kind, capture });
        }
        Ok(())
    }

    fn place_block(&mut self, kind: BlockKind, xml: String) {
        match kind {
            BlockKind::Preamble => self.layout.preamble.push(xml),
            BlockKind::Body => self.layout.body.push(BodyBlock::Raw(xml)),
            BlockKind::SectionProperties => self.layout.section_properties = Some(xml),
        }
    }

    fn on_text(&mut self, event: &Event, text: &BytesText) -> DocxResult<()> {
        if let Some(para) = self.para.as_mut() {
            return para.on_text(event, text);
        }
        self.forward(event)
    }

    /// Pass an event that carries no structure to whatever is capturing
    fn forward(&mut self, event: &Event) -> DocxResult<()> {
        if let Some(para) = self.para.as_mut() {
            para.forward(event)
        } else if let Some(block) = self.block.as_mut() {
            block.capture.push(event)
        } else {
            Ok(())
        }
    }

    fn finish(mut self, tree: &mut DocumentTree) -> DocxResult<DocumentLayout> {
        if self.para.is_some() || self.block.is_some() {
            return Err(DocxError::XmlParse("document.xml ended inside an element".into()));
        }

        self.bookmarks.finish(tree);
        self.layout.bookmark_ids = std::mem::take(&mut self.bookmarks.ids);
        self.layout.next_bookmark_id = self.bookmarks.next_id;

        for block in &mut self.layout.body {
            if let BodyBlock::Paragraph(source) = block {
                source.fingerprint = Some(ParagraphFingerprint::of(tree, source.id));
            }
        }

        debug!(
            paragraphs = tree.paragraph_ids().len(),
            bookmarks = tree.bookmark_registry().len(),
            "Parsed document body"
        );
        Ok(self.layout)
    }
}

/// Pairs `w:bookmarkStart`/`w:bookmarkEnd` by id across paragraphs
#[derive(Default)]
struct BookmarkCollector {
    open: HashMap<String, (String, Position)>,
    ids: HashMap<String, u32>,
    next_id: u32,
}

impl BookmarkCollector {
    fn open(&mut self, id: String, name: String, start: Position) {
        if let Ok(num) = id.parse::<u32>() {
            self.next_id = self.next_id.max(num + 1);
            self.ids.insert(name.clone(), num);
        }
        self.open.insert(id, (name, start));
    }

    fn close(&mut self, id: &str, end: Position, tree: &mut DocumentTree) {
        if let Some((name, start)) = self.open.remove(id) {
            Self::register(Bookmark::new_range(name, start, end), tree);
        }
    }

    fn finish(&mut self, tree: &mut DocumentTree) {
        for (_, (name, start)) in self.open.drain() {
            Self::register(Bookmark::new_point(name, start), tree);
        }
    }

    fn register(bookmark: Bookmark, tree: &mut DocumentTree) {
        let registry = tree.bookmark_registry_mut();
        if registry.contains_name(bookmark.name()) {
            debug!(name = bookmark.name(), "Duplicate bookmark name ignored");
            return;
        }
        // Names written by other tools (e.g. `_GoBack`) do not follow the naming rules
        if registry.insert(bookmark.clone()).is_err() {
            registry.insert_unchecked(bookmark);
        }
    }
}

/// Parsed paragraph data (before committing to tree)
struct ParsedParagraph {
    level: usize,
    node: Paragraph,
    source: XmlCapture,
    content_start: usize,
    content_end: Option<usize>,
    props: Option<XmlCapture>,
    items: Vec<ParsedInline>,
    run: Option<ParsedRun>,
    link: Option<ParsedHyperlink>,
    runs_seen: usize,
    bookmark_starts: Vec<(String, String, usize)>,
    bookmark_ends: Vec<(String, usize)>,
}

enum ParsedInline {
    Run(ParsedRun),
    Hyperlink(ParsedHyperlink),
}

impl ParsedParagraph {
    fn new(event: &Event, level: usize) -> DocxResult<Self> {
        let source = XmlCapture::starting_with(event)?;
        Ok(Self {
            level,
            node: Paragraph::new(),
            content_start: source.position(),
            content_end: None,
            source,
            props: None,
            items: Vec::new(),
            run: None,
            link: None,
            runs_seen: 0,
            bookmark_starts: Vec::new(),
            bookmark_ends: Vec::new(),
        })
    }

    fn on_start(&mut self, event: &Event, e: &BytesStart, level: usize, empty: bool) -> DocxResult<()> {
        self.source.push(event)?;

        if let Some(props) = self.props.as_mut() {
            props.push(event)?;
            if level == self.level + 2 && XmlParser::matches_element(e.name().as_ref(), "pStyle") {
                self.node.style_id = XmlParser::get_w_attribute(e, "val");
            }
            return Ok(());
        }

        if let Some(run) = self.run.as_mut() {
            return run.on_start(event, e, level, empty);
        }

        let container_level = self.link.as_ref().map_or(self.level, |link| link.level);
        if level != container_level + 1 {
            return Ok(());
        }

        let name = e.name();
        match XmlParser::local_name(name.as_ref()) {
            "pPr" if self.link.is_none() => {
                if empty {
                    self.node.raw_properties = Some(XmlCapture::event_to_string(event)?);
                    self.content_start = self.source.position();
                } else {
                    self.props = Some(XmlCapture::starting_with(event)?);
                }
            }
            "r" if !empty => self.run = Some(ParsedRun::new(level)),
            "hyperlink" if self.link.is_none() && !empty => {
                self.link = Some(ParsedHyperlink::from_element(e, level));
            }
            "bookmarkStart" => {
                if let (Some(id), Some(name)) = (
                    XmlParser::get_w_attribute(e, "id"),
                    XmlParser::get_w_attribute(e, "name"),
                ) {
                    self.bookmark_starts.push((id, name, self.runs_seen));
                }
            }
            "bookmarkEnd" => {
                if let Some(id) = XmlParser::get_w_attribute(e, "id") {
                    self.bookmark_ends.push((id, self.runs_seen));
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Returns true when the paragraph element itself closes
    fn on_end(&mut self, event: &Event, local: &str, level: usize) -> DocxResult<bool> {
        let closing_at = self.source.position();
        self.source.push(event)?;

        if let Some(props) = self.props.as_mut() {
            props.push(event)?;
            if level == self.level + 1 {
                if let Some(props) = self.props.take() {
                    self.node.raw_properties = Some(props.finish()?);
                    self.content_start = self.source.position();
                }
            }
            return Ok(false);
        }

        if let Some(run) = self.run.as_mut() {
            if run.on_end(event, local, level)? {
                if let Some(run) = self.run.take() {
                    self.runs_seen += 1;
                    match self.link.as_mut() {
                        Some(link) => link.runs.push(run),
                        None => self.items.push(ParsedInline::Run(run)),
                    }
                }
            }
            return Ok(false);
        }

        if self.link.as_ref().is_some_and(|link| link.level == level) {
            if let Some(link) = self.link.take() {
                self.items.push(ParsedInline::Hyperlink(link));
            }
            return Ok(false);
        }

        if level == self.level {
            self.content_end = Some(closing_at);
            return Ok(true);
        }
        Ok(false)
    }

    fn on_text(&mut self, event: &Event, text: &BytesText) -> DocxResult<()> {
        self.forward(event)?;
        if let Some(run) = self.run.as_mut() {
            if run.in_text && run.props_capture.is_none() {
                let text = text.unescape().map_err(|e| DocxError::XmlParse(e.to_string()))?;
                run.text.push_str(&text);
            }
        }
        Ok(())
    }

    fn forward(&mut self, event: &Event) -> DocxResult<()> {
        self.source.push(event)?;
        if let Some(props) = self.props.as_mut() {
            props.push(event)?;
        }
        if let Some(props) = self.run.as_mut().and_then(|run| run.props_capture.as_mut()) {
            props.push(event)?;
        }
        Ok(())
    }
}

/// Parsed run data
struct ParsedRun {
    level: usize,
    style_id: Option<String>,
    props: CharacterProperties,
    props_capture: Option<XmlCapture>,
    raw_properties: Option<String>,
    in_text: bool,
    text: String,
}

impl ParsedRun {
    fn new(level: usize) -> Self {
        Self {
            level,
            style_id: None,
            props: CharacterProperties::default(),
            props_capture: None,
            raw_properties: None,
            in_text: false,
            text: String::new(),
        }
    }

    fn on_start(&mut self, event: &Event, e: &BytesStart, level: usize, empty: bool) -> DocxResult<()> {
        if let Some(capture) = self.props_capture.as_mut() {
            capture.push(event)?;
            if level == self.level + 2 {
                self.parse_property(e);
            }
            return Ok(());
        }

        if level != self.level + 1 {
            return Ok(());
        }

        let name = e.name();
        match XmlParser::local_name(name.as_ref()) {
            "rPr" => {
                if empty {
                    self.raw_properties = Some(XmlCapture::event_to_string(event)?);
                } else {
                    self.props_capture = Some(XmlCapture::starting_with(event)?);
                }
            }
            "t" if !empty => self.in_text = true,
            "tab" => self.text.push('\t'),
            "br" | "cr" => self.text.push('\n'),
            "noBreakHyphen" => self.text.push(NON_BREAKING_HYPHEN),
            "softHyphen" => self.text.push(SOFT_HYPHEN),
            _ => {}
        }
        Ok(())
    }

    /// Returns true when the run element itself closes
    fn on_end(&mut self, event: &Event, local: &str, level: usize) -> DocxResult<bool> {
        if let Some(capture) = self.props_capture.as_mut() {
            capture.push(event)?;
            if level == self.level + 1 {
                if let Some(capture) = self.props_capture.take() {
                    self.raw_properties = Some(capture.finish()?);
                }
            }
            return Ok(false);
        }

        if level == self.level + 1 && local == "t" {
            self.in_text = false;
        }
        Ok(level == self.level)
    }

    /// Parse a run property element
    fn parse_property(&mut self, e: &BytesStart) {
        let name = e.name();
        let val = XmlParser::get_w_attribute(e, "val");

        match XmlParser::local_name(name.as_ref()) {
            "rStyle" => self.style_id = val,
            "b" => self.props.bold = Some(val.map(|v| XmlParser::parse_bool(&v)).unwrap_or(true)),
            "i" => self.props.italic = Some(val.map(|v| XmlParser::parse_bool(&v)).unwrap_or(true)),
            "u" => self.props.underline = Some(val.map(|v| v != "none").unwrap_or(true)),
            "sz" => {
                if let Some(val) = val {
                    self.props.font_size = XmlParser::parse_half_points(&val);
                }
            }
            "rFonts" => {
                // Font family - try ascii, then hAnsi, then cs
                if let Some(font) = XmlParser::get_w_attribute(e, "ascii")
                    .or_else(|| XmlParser::get_w_attribute(e, "hAnsi"))
                    .or_else(|| XmlParser::get_w_attribute(e, "cs"))
                {
                    self.props.font_family = Some(font);
                }
            }
            "color" => {
                if let Some(val) = val.filter(|v| v != "auto") {
                    self.props.color = Some(format!("#{}", val));
                }
            }
            _ => {}
        }
    }

    fn into_run(self) -> Run {
        let mut run = Run::with_direct_formatting(self.text, self.props);
        run.character_style_id = self.style_id;
        run.raw_properties = self.raw_properties;
        run
    }
}

/// Parsed hyperlink data
struct ParsedHyperlink {
    level: usize,
    rel_id: Option<String>,
    anchor: Option<String>,
    tooltip: Option<String>,
    history: bool,
    runs: Vec<ParsedRun>,
}

impl ParsedHyperlink {
    fn from_element(e: &BytesStart, level: usize) -> Self {
        Self {
            level,
            rel_id: XmlParser::get_r_attribute(e, "id"),
            anchor: XmlParser::get_w_attribute(e, "anchor"),
            tooltip: XmlParser::get_w_attribute(e, "tooltip"),
            history: XmlParser::get_w_attribute(e, "history")
                .map(|v| XmlParser::parse_bool(&v))
                .unwrap_or(false),
            runs: Vec::new(),
        }
    }
}
