//! Document Model - manuscript paragraphs, runs, links and anchors
//!
//! This crate provides the in-memory form of a loaded manuscript: an ordered
//! sequence of paragraphs whose inline content is styled runs and hyperlinks,
//! plus a registry of named bookmarks that hyperlinks can target.

mod node;
mod document;
mod paragraph;
mod run;
mod selection;
mod node_id;
mod tree;
mod error;
mod hyperlink;
mod style;
mod bookmark;

pub use node::*;
pub use document::*;
pub use paragraph::*;
pub use run::*;
pub use selection::*;
pub use node_id::*;
pub use tree::*;
pub use error::*;
pub use hyperlink::*;
pub use style::*;
pub use bookmark::*;
