//! Struct tag synthesis and rewriting for Go source files.
//!
//! This crate locates every `struct` type in a Go file, generates tags for
//! its exported fields from the field names, and writes the file back with
//! all other text preserved:
//!
//! - **Case conversion** via [`CaseStyle`] (`snake`, `camel`, `pascal`)
//! - **Tag synthesis** via [`synthesize`], which merges generated segments
//!   into an existing tag without touching the segments already there
//! - **Record rewriting** via [`RecordRewriter`], a [`RecordVisitor`] that
//!   applies a [`RewritePlan`] to each field
//! - **File processing** via [`TreeDriver`], which parses, rewrites, prints
//!   and atomically replaces a file
//!
//! # Example
//!
//! ```
//! use std::path::Path;
//! use tagwright_syntax::{CaseStyle, RewritePlan, TagRequest, TreeDriver};
//!
//! let plan = RewritePlan::new(vec![TagRequest::new("json", CaseStyle::Snake)]);
//! let mut driver = TreeDriver::new()?;
//! let result = driver.rewrite_source(
//!     Path::new("user.go"),
//!     "package m\n\ntype User struct {\n\tUserID int\n}\n",
//!     &plan,
//! )?;
//!
//! assert!(result.output().contains("`json:\"user_id\"`"));
//! # Ok::<(), tagwright_syntax::ProcessError>(())
//! ```

mod case;
mod driver;
mod error;
mod parser;
mod record;
mod tag;
mod tree;

pub use case::{CaseStyle, to_camel, to_pascal, to_snake};
pub use driver::{ProcessOutcome, Rewritten, TreeDriver};
pub use error::{ProcessError, TagError};
pub use parser::{ParseResult, Parser, SyntaxErrorInfo};
pub use record::{RecordRewriter, RewritePlan, SkippedField};
pub use tag::{
    OMIT_EMPTY_MODIFIER, SynthesisOptions, TagLiteral, TagRequest, TagSegment, synthesize,
};
pub use tree::{Field, RecordType, RecordVisitor, SourceFile};

#[cfg(test)]
mod tests;
