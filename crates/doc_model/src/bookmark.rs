//! Bookmark - marks a location or range in the document
//!
//! Bookmarks provide named anchors that can be referenced by hyperlinks
//! for internal document navigation. Reference entries carry one each so
//! that linked citations can jump to them.

use crate::{NodeId, Position};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The range a bookmark covers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookmarkRange {
    /// Point bookmark - marks a single position
    Point(Position),
    /// Range bookmark - marks a span of content
    Range { start: Position, end: Position },
}

/// Errors that can occur during bookmark validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookmarkValidationError {
    /// Name is empty
    EmptyName,
    /// Name contains invalid characters
    InvalidCharacters,
    /// Name doesn't start with a letter
    MustStartWithLetter,
    /// Name already exists
    DuplicateName,
    /// Name is too long (max 40 characters)
    NameTooLong,
}

impl std::fmt::Display for BookmarkValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BookmarkValidationError::EmptyName => write!(f, "Bookmark name cannot be empty"),
            BookmarkValidationError::InvalidCharacters => {
                write!(f, "Bookmark name can only contain letters, numbers, and underscores")
            }
            BookmarkValidationError::MustStartWithLetter => {
                write!(f, "Bookmark name must start with a letter")
            }
            BookmarkValidationError::DuplicateName => {
                write!(f, "A bookmark with this name already exists")
            }
            BookmarkValidationError::NameTooLong => {
                write!(f, "Bookmark name cannot exceed 40 characters")
            }
        }
    }
}

impl std::error::Error for BookmarkValidationError {}

/// Maximum bookmark name length
pub const MAX_BOOKMARK_NAME_LENGTH: usize = 40;

/// Validate a bookmark name
pub fn validate_bookmark_name(name: &str) -> Result<(), BookmarkValidationError> {
    let first_char = match name.chars().next() {
        Some(c) => c,
        None => return Err(BookmarkValidationError::EmptyName),
    };

    if name.len() > MAX_BOOKMARK_NAME_LENGTH {
        return Err(BookmarkValidationError::NameTooLong);
    }

    if !first_char.is_ascii_alphabetic() {
        return Err(BookmarkValidationError::MustStartWithLetter);
    }

    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(BookmarkValidationError::InvalidCharacters);
    }

    Ok(())
}

/// A bookmark marks a location or range in the document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bookmark {
    /// Unique identifier for this bookmark
    id: NodeId,
    /// Name targeted by internal hyperlinks (unique within document)
    name: String,
    /// The range this bookmark covers
    range: BookmarkRange,
}

impl Bookmark {
    /// Create a new point bookmark at a single position
    pub fn new_point(name: impl Into<String>, position: Position) -> Self {
        Self {
            id: NodeId::new(),
            name: name.into(),
            range: BookmarkRange::Point(position),
        }
    }

    /// Create a new range bookmark spanning from start to end
    pub fn new_range(name: impl Into<String>, start: Position, end: Position) -> Self {
        Self {
            id: NodeId::new(),
            name: name.into(),
            range: BookmarkRange::Range { start, end },
        }
    }

    /// Get the bookmark ID
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Get the bookmark name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the bookmark range
    pub fn range(&self) -> &BookmarkRange {
        &self.range
    }

    /// Get the start position of the bookmark
    pub fn start_position(&self) -> Position {
        match &self.range {
            BookmarkRange::Point(pos) => *pos,
            BookmarkRange::Range { start, .. } => *start,
        }
    }

    /// Get the end position of the bookmark (same as start for point bookmarks)
    pub fn end_position(&self) -> Position {
        match &self.range {
            BookmarkRange::Point(pos) => *pos,
            BookmarkRange::Range { end, .. } => *end,
        }
    }

    /// Validate this bookmark's name
    pub fn validate(&self) -> Result<(), BookmarkValidationError> {
        validate_bookmark_name(&self.name)
    }
}

/// Registry for managing bookmarks within a document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookmarkRegistry {
    /// Bookmarks indexed by ID
    bookmarks: HashMap<NodeId, Bookmark>,
    /// Name to ID mapping for fast lookup by name
    name_index: HashMap<String, NodeId>,
}

impl BookmarkRegistry {
    /// Create a new empty bookmark registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a bookmark into the registry
    ///
    /// Returns an error if the name is invalid or already in use
    pub fn insert(&mut self, bookmark: Bookmark) -> Result<NodeId, BookmarkValidationError> {
        bookmark.validate()?;

        if self.name_index.contains_key(&bookmark.name) {
            return Err(BookmarkValidationError::DuplicateName);
        }

        let id = bookmark.id();
        self.name_index.insert(bookmark.name.clone(), id);
        self.bookmarks.insert(id, bookmark);

        Ok(id)
    }

    /// Insert a bookmark loaded from a file without enforcing the naming
    /// rules, which files written by other tools do not always follow
    pub fn insert_unchecked(&mut self, bookmark: Bookmark) -> Option<NodeId> {
        if self.name_index.contains_key(&bookmark.name) {
            return None;
        }
        let id = bookmark.id();
        self.name_index.insert(bookmark.name.clone(), id);
        self.bookmarks.insert(id, bookmark);
        Some(id)
    }

    /// Get a bookmark by ID
    pub fn get(&self, id: NodeId) -> Option<&Bookmark> {
        self.bookmarks.get(&id)
    }

    /// Get a bookmark by name
    pub fn get_by_name(&self, name: &str) -> Option<&Bookmark> {
        self.name_index
            .get(name)
            .and_then(|id| self.bookmarks.get(id))
    }

    /// Check if a bookmark with the given name exists
    pub fn contains_name(&self, name: &str) -> bool {
        self.name_index.contains_key(name)
    }

    /// Get all bookmarks
    pub fn all(&self) -> impl Iterator<Item = &Bookmark> {
        self.bookmarks.values()
    }

    /// Get all bookmark names sorted alphabetically
    pub fn names_sorted(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.name_index.keys().map(|s| s.as_str()).collect();
        names.sort();
        names
    }

    /// Get the number of bookmarks
    pub fn len(&self) -> usize {
        self.bookmarks.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.bookmarks.is_empty()
    }

    /// Find bookmarks starting or ending in a paragraph, ordered by name
    pub fn find_in_paragraph(&self, para_id: NodeId) -> Vec<&Bookmark> {
        let mut found: Vec<&Bookmark> = self.bookmarks
            .values()
            .filter(|b| {
                b.start_position().node_id == para_id || b.end_position().node_id == para_id
            })
            .collect();
        found.sort_by(|a, b| a.name.cmp(&b.name));
        found
    }
}
