//! Citation engine - links in-text author-year citations to their reference entries
//!
//! Processing runs in two passes over a [`doc_model::DocumentTree`]:
//!
//! 1. the reference section is scanned and every recognizable entry gets a
//!    bookmark anchor keyed by `Surname_Year`;
//! 2. body paragraphs before the reference heading are searched for
//!    parenthetical and narrative citations, which are rewritten into internal
//!    hyperlinks when their key resolves.
//!
//! Both passes share one [`CorrelationSession`], which also produces the
//! [`ValidationReport`] of broken citations and unused references.

mod config;
mod correlator;
mod error;
mod key;
mod locator;
mod references;
mod report;
mod rewriter;
mod section;
mod session;

pub use config::*;
pub use correlator::*;
pub use error::*;
pub use key::*;
pub use locator::*;
pub use references::*;
pub use report::*;
pub use rewriter::*;
pub use section::*;
pub use session::*;
