//! CLI argument definitions for tagwright.

use clap::Parser;

/// Command-line interface for the tagwright struct tag rewriter.
///
/// Configuration flags such as `--default-tag` are split off before this
/// parser runs and never reach it.
#[derive(Parser, Debug)]
#[command(
    name = "tagwright",
    version,
    about = "Generates struct tags for exported Go fields from their names."
)]
pub(crate) struct Cli {
    /// Removes existing tags before generating new ones.
    #[arg(short = 'r', long = "remove")]
    pub(crate) remove: bool,
    /// Appends `,omitempty` to every generated value.
    #[arg(short = 'o', long = "omitempty")]
    pub(crate) omit_empty: bool,
    /// File or glob pattern naming the Go sources to rewrite.
    #[arg(value_name = "PATTERN")]
    pub(crate) pattern: String,
    /// Further patterns, and tag requests of the form `tag[:case]` where case
    /// is `snake`, `camel` or `pascal`.
    #[arg(value_name = "PATTERN|TAG[:CASE]", num_args = 0..)]
    pub(crate) tokens: Vec<String>,
}
