//! Document tree operations and storage

use crate::{
    Bookmark, BookmarkRegistry, Document, DocModelError, Hyperlink, HyperlinkTarget, Node, NodeId,
    NodeType, Paragraph, Position, Result, Run,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::ops::Range;

/// Storage for different node types
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeStorage {
    pub paragraphs: HashMap<NodeId, Paragraph>,
    pub runs: HashMap<NodeId, Run>,
    pub hyperlinks: HashMap<NodeId, Hyperlink>,
}

/// Inline content built ahead of time and attached to a paragraph in one step
#[derive(Debug, Clone)]
pub enum InlineContent {
    /// A plain run
    Run(Run),
    /// A hyperlink with the runs it displays
    Hyperlink { link: Hyperlink, runs: Vec<Run> },
}

impl InlineContent {
    /// Text displayed by this piece of content
    pub fn text(&self) -> String {
        match self {
            InlineContent::Run(run) => run.text.clone(),
            InlineContent::Hyperlink { runs, .. } => runs.iter().map(|r| r.text.as_str()).collect(),
        }
    }
}

/// The complete document tree structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentTree {
    /// The root document
    pub document: Document,
    /// Storage for all nodes
    pub nodes: NodeStorage,
    /// Bookmark registry for this document
    #[serde(default)]
    pub bookmarks: BookmarkRegistry,
}

impl DocumentTree {
    /// Create a new empty document tree
    pub fn new() -> Self {
        Self {
            document: Document::new(),
            nodes: NodeStorage::default(),
            bookmarks: BookmarkRegistry::default(),
        }
    }

    /// Get the document root ID
    pub fn root_id(&self) -> NodeId {
        self.document.id()
    }

    /// Get a paragraph by ID
    pub fn get_paragraph(&self, id: NodeId) -> Option<&Paragraph> {
        self.nodes.paragraphs.get(&id)
    }

    /// Get a mutable paragraph by ID
    pub fn get_paragraph_mut(&mut self, id: NodeId) -> Option<&mut Paragraph> {
        self.nodes.paragraphs.get_mut(&id)
    }

    /// Get a run by ID
    pub fn get_run(&self, id: NodeId) -> Option<&Run> {
        self.nodes.runs.get(&id)
    }

    /// Get a hyperlink by ID
    pub fn get_hyperlink(&self, id: NodeId) -> Option<&Hyperlink> {
        self.nodes.hyperlinks.get(&id)
    }

    /// Get the node type for a given ID
    pub fn node_type(&self, id: NodeId) -> Option<NodeType> {
        if id == self.document.id() {
            return Some(NodeType::Document);
        }
        if self.nodes.paragraphs.contains_key(&id) {
            return Some(NodeType::Paragraph);
        }
        if self.nodes.runs.contains_key(&id) {
            return Some(NodeType::Run);
        }
        if self.nodes.hyperlinks.contains_key(&id) {
            return Some(NodeType::Hyperlink);
        }
        None
    }

    /// Insert a paragraph into the body, appending when no index is given
    pub fn insert_paragraph(&mut self, mut para: Paragraph, index: Option<usize>) -> NodeId {
        let para_id = para.id();
        para.set_parent(Some(self.document.id()));

        match index {
            Some(idx) => self.document.insert_body_child(idx, para_id),
            None => self.document.add_body_child(para_id),
        }

        self.nodes.paragraphs.insert(para_id, para);
        para_id
    }

    /// Append a paragraph made of the given runs
    pub fn append_paragraph(&mut self, para: Paragraph, runs: Vec<Run>) -> Result<NodeId> {
        let para_id = self.insert_paragraph(para, None);
        for run in runs {
            self.insert_run(run, para_id, None)?;
        }
        Ok(para_id)
    }

    /// Insert a run into a paragraph
    pub fn insert_run(&mut self, mut run: Run, para_id: NodeId, index: Option<usize>) -> Result<NodeId> {
        let run_id = run.id();
        run.set_parent(Some(para_id));

        let para = self.nodes.paragraphs.get_mut(&para_id)
            .ok_or(DocModelError::NodeNotFound(para_id.as_uuid()))?;

        match index {
            Some(idx) => para.insert_child(idx, run_id),
            None => para.add_child(run_id),
        }

        self.nodes.runs.insert(run_id, run);
        Ok(run_id)
    }

    /// Insert a hyperlink into the tree under a paragraph
    pub fn insert_hyperlink(&mut self, mut hyperlink: Hyperlink, para_id: NodeId, index: Option<usize>) -> Result<NodeId> {
        let hyperlink_id = hyperlink.id();
        hyperlink.set_parent(Some(para_id));

        let para = self.nodes.paragraphs.get_mut(&para_id)
            .ok_or(DocModelError::NodeNotFound(para_id.as_uuid()))?;

        match index {
            Some(idx) => para.insert_child(idx, hyperlink_id),
            None => para.add_child(hyperlink_id),
        }

        self.nodes.hyperlinks.insert(hyperlink_id, hyperlink);
        Ok(hyperlink_id)
    }

    /// Insert a run into a hyperlink
    pub fn insert_run_into_hyperlink(&mut self, mut run: Run, hyperlink_id: NodeId) -> Result<NodeId> {
        let run_id = run.id();
        run.set_parent(Some(hyperlink_id));

        let hyperlink = self.nodes.hyperlinks.get_mut(&hyperlink_id)
            .ok_or(DocModelError::NodeNotFound(hyperlink_id.as_uuid()))?;
        hyperlink.add_child(run_id);

        self.nodes.runs.insert(run_id, run);
        Ok(run_id)
    }

    /// Remove a paragraph and everything inside it
    pub fn remove_paragraph(&mut self, para_id: NodeId) -> Result<Paragraph> {
        let mut para = self.nodes.paragraphs.remove(&para_id)
            .ok_or(DocModelError::NodeNotFound(para_id.as_uuid()))?;

        for child_id in para.take_children() {
            self.drop_inline_node(child_id);
        }
        self.document.remove_body_child(para_id);

        Ok(para)
    }

    /// Replace all inline content of a paragraph.
    ///
    /// The new content is validated before anything is touched, so the
    /// paragraph either ends up with exactly `content` or is left unchanged.
    /// Link targets the paragraph already holds are carried over unchecked;
    /// documents may contain links that would not be accepted as new ones.
    pub fn replace_paragraph_content(&mut self, para_id: NodeId, content: Vec<InlineContent>) -> Result<()> {
        if !self.nodes.paragraphs.contains_key(&para_id) {
            return Err(DocModelError::NodeNotFound(para_id.as_uuid()));
        }
        let existing: Vec<&HyperlinkTarget> = self
            .paragraph_hyperlinks(para_id)
            .into_iter()
            .map(|link| &link.target)
            .collect();
        for item in &content {
            if let InlineContent::Hyperlink { link, .. } = item {
                if existing.contains(&&link.target) {
                    continue;
                }
                link.validate().map_err(|e| {
                    DocModelError::InvalidOperation(format!("Invalid hyperlink target: {}", e))
                })?;
            }
        }

        let old_children = match self.nodes.paragraphs.get_mut(&para_id) {
            Some(para) => para.take_children(),
            None => return Err(DocModelError::NodeNotFound(para_id.as_uuid())),
        };
        for child_id in old_children {
            self.drop_inline_node(child_id);
        }

        for item in content {
            match item {
                InlineContent::Run(run) => {
                    self.insert_run(run, para_id, None)?;
                }
                InlineContent::Hyperlink { link, runs } => {
                    let link_id = self.insert_hyperlink(link, para_id, None)?;
                    for run in runs {
                        self.insert_run_into_hyperlink(run, link_id)?;
                    }
                }
            }
        }

        self.document.increment_version();
        Ok(())
    }

    /// Drop an inline node (run or hyperlink with its runs) from storage
    fn drop_inline_node(&mut self, node_id: NodeId) {
        if self.nodes.runs.remove(&node_id).is_some() {
            return;
        }
        if let Some(link) = self.nodes.hyperlinks.remove(&node_id) {
            for run_id in link.children() {
                self.nodes.runs.remove(run_id);
            }
        }
    }

    /// Iterate over all paragraphs in document order
    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.document.children()
            .iter()
            .filter_map(|id| self.nodes.paragraphs.get(id))
    }

    /// Paragraph IDs in document order
    pub fn paragraph_ids(&self) -> Vec<NodeId> {
        self.document.children().to_vec()
    }

    /// Runs of a paragraph in reading order, including runs inside hyperlinks
    pub fn paragraph_runs(&self, para_id: NodeId) -> Vec<&Run> {
        let Some(para) = self.nodes.paragraphs.get(&para_id) else {
            return Vec::new();
        };

        let mut runs = Vec::new();
        for child_id in para.children() {
            if let Some(run) = self.nodes.runs.get(child_id) {
                runs.push(run);
            } else if let Some(link) = self.nodes.hyperlinks.get(child_id) {
                runs.extend(link.children().iter().filter_map(|id| self.nodes.runs.get(id)));
            }
        }
        runs
    }

    /// Plain text of a paragraph
    pub fn paragraph_text(&self, para_id: NodeId) -> String {
        self.paragraph_runs(para_id)
            .into_iter()
            .map(|run| run.text.as_str())
            .collect()
    }

    /// Length of a paragraph's text in grapheme clusters
    pub fn paragraph_len(&self, para_id: NodeId) -> usize {
        self.paragraph_runs(para_id)
            .into_iter()
            .map(Run::grapheme_count)
            .sum()
    }

    /// Hyperlinks directly inside a paragraph
    pub fn paragraph_hyperlinks(&self, para_id: NodeId) -> Vec<&Hyperlink> {
        self.nodes.paragraphs
            .get(&para_id)
            .map(|para| {
                para.children()
                    .iter()
                    .filter_map(|id| self.nodes.hyperlinks.get(id))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Hyperlinks of a paragraph with the byte range of their text within
    /// `paragraph_text`
    pub fn paragraph_link_ranges(&self, para_id: NodeId) -> Vec<(Range<usize>, &Hyperlink)> {
        let Some(para) = self.nodes.paragraphs.get(&para_id) else {
            return Vec::new();
        };

        let mut ranges = Vec::new();
        let mut offset = 0;
        for child_id in para.children() {
            if let Some(run) = self.nodes.runs.get(child_id) {
                offset += run.len();
            } else if let Some(link) = self.nodes.hyperlinks.get(child_id) {
                let len: usize = link.children()
                    .iter()
                    .filter_map(|id| self.nodes.runs.get(id))
                    .map(Run::len)
                    .sum();
                ranges.push((offset..offset + len, link));
                offset += len;
            }
        }
        ranges
    }

    /// Detached copy of a paragraph's inline content, suitable for passing
    /// back to `replace_paragraph_content`
    pub fn paragraph_content(&self, para_id: NodeId) -> Vec<InlineContent> {
        let Some(para) = self.nodes.paragraphs.get(&para_id) else {
            return Vec::new();
        };

        para.children()
            .iter()
            .filter_map(|child_id| {
                if let Some(run) = self.nodes.runs.get(child_id) {
                    Some(InlineContent::Run(run.detached()))
                } else {
                    self.nodes.hyperlinks.get(child_id).map(|link| InlineContent::Hyperlink {
                        link: link.detached(),
                        runs: link.children()
                            .iter()
                            .filter_map(|id| self.nodes.runs.get(id))
                            .map(Run::detached)
                            .collect(),
                    })
                }
            })
            .collect()
    }

    /// Check whether a paragraph contains any hyperlink
    pub fn paragraph_has_hyperlinks(&self, para_id: NodeId) -> bool {
        !self.paragraph_hyperlinks(para_id).is_empty()
    }

    /// Get the total text content of the document
    pub fn text_content(&self) -> String {
        let mut result = String::new();
        for para in self.paragraphs() {
            result.push_str(&self.paragraph_text(para.id()));
            result.push('\n');
        }
        result
    }

    // =========================================================================
    // Bookmark Methods
    // =========================================================================

    /// Get the bookmark registry
    pub fn bookmark_registry(&self) -> &BookmarkRegistry {
        &self.bookmarks
    }

    /// Get a mutable reference to the bookmark registry
    pub fn bookmark_registry_mut(&mut self) -> &mut BookmarkRegistry {
        &mut self.bookmarks
    }

    /// Insert a bookmark spanning a whole paragraph
    pub fn insert_paragraph_bookmark(&mut self, name: impl Into<String>, para_id: NodeId) -> Result<NodeId> {
        if !self.nodes.paragraphs.contains_key(&para_id) {
            return Err(DocModelError::NodeNotFound(para_id.as_uuid()));
        }
        let end = Position::new(para_id, self.paragraph_len(para_id));
        let bookmark = Bookmark::new_range(name, Position::start_of(para_id), end);
        Ok(self.bookmarks.insert(bookmark)?)
    }

    /// Get a bookmark by name
    pub fn get_bookmark_by_name(&self, name: &str) -> Option<&Bookmark> {
        self.bookmarks.get_by_name(name)
    }

    /// Check if a bookmark with the given name exists
    pub fn has_bookmark(&self, name: &str) -> bool {
        self.bookmarks.contains_name(name)
    }

    /// Bookmarks that start or end in a paragraph
    pub fn bookmarks_in_paragraph(&self, para_id: NodeId) -> Vec<&Bookmark> {
        self.bookmarks.find_in_paragraph(para_id)
    }
}

impl Default for DocumentTree {
    fn default() -> Self {
        Self::new()
    }
}
