//! Tree-sitter parsing of Go source.
//!
//! Tree-sitter recovers from syntax errors by inserting ERROR and MISSING
//! nodes, so a tree is produced for any input. [`ParseResult::errors`]
//! surfaces those nodes so callers can refuse to rewrite a broken file.

use std::fmt;
use std::ops::Range;

use crate::error::ProcessError;

/// Result of parsing Go source.
#[derive(Debug)]
pub struct ParseResult {
    tree: tree_sitter::Tree,
    source: String,
}

impl ParseResult {
    /// Returns the source code that was parsed.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns the root node of the syntax tree.
    #[must_use]
    pub fn root_node(&self) -> tree_sitter::Node<'_> {
        self.tree.root_node()
    }

    /// Returns whether the tree contains ERROR or MISSING nodes.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.tree.root_node().has_error()
    }

    /// Collects every syntax error in document order.
    #[must_use]
    pub fn errors(&self) -> Vec<SyntaxErrorInfo> {
        let mut errors = Vec::new();
        collect_error_nodes(self.tree.root_node(), &self.source, &mut errors);
        errors
    }

    /// Returns the first syntax error, if any.
    #[must_use]
    pub fn first_error(&self) -> Option<SyntaxErrorInfo> {
        self.errors().into_iter().next()
    }

    pub(crate) fn into_source(self) -> String {
        self.source
    }
}

/// Location and description of one syntax error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxErrorInfo {
    /// Byte range of the error in the source.
    pub byte_range: Range<usize>,
    /// Line number (one-based) where the error starts.
    pub line: u32,
    /// Column number (one-based) where the error starts.
    pub column: u32,
    /// A snippet of the problematic source text.
    pub context: String,
    /// Human-readable description of the error.
    pub message: String,
}

impl SyntaxErrorInfo {
    fn from_node(node: tree_sitter::Node<'_>, source: &str) -> Self {
        let byte_range = node.byte_range();
        let context = source
            .get(byte_range.clone())
            .map(|text| {
                let first_line = text.lines().next().unwrap_or_default();
                if first_line.chars().count() > 40 {
                    let truncated: String = first_line.chars().take(37).collect();
                    format!("{truncated}...")
                } else {
                    first_line.to_owned()
                }
            })
            .unwrap_or_default();

        let message = if node.is_missing() {
            format!("missing {}", node.kind())
        } else {
            "syntax error".to_owned()
        };

        let (line, column) = point_to_one_based(node.start_position());

        Self {
            byte_range,
            line,
            column,
            context,
            message,
        }
    }
}

impl fmt::Display for SyntaxErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.line, self.column, self.message)?;
        if !self.context.is_empty() {
            write!(f, " near '{}'", self.context)?;
        }
        Ok(())
    }
}

/// Tree-sitter parser configured for Go.
pub struct Parser {
    inner: tree_sitter::Parser,
}

impl Parser {
    /// Creates a Go parser.
    ///
    /// # Errors
    ///
    /// Returns an error if the Go grammar is incompatible with the linked
    /// Tree-sitter runtime.
    pub fn new() -> Result<Self, ProcessError> {
        let mut inner = tree_sitter::Parser::new();
        let language: tree_sitter::Language = tree_sitter_go::LANGUAGE.into();
        inner
            .set_language(&language)
            .map_err(|e| ProcessError::parser_init(e.to_string()))?;
        Ok(Self { inner })
    }

    /// Parses Go source.
    ///
    /// Returns `None` only when Tree-sitter gives up entirely, which does not
    /// happen for a configured parser without a timeout or cancellation flag.
    #[must_use]
    pub fn parse(&mut self, source: &str) -> Option<ParseResult> {
        self.inner.parse(source, None).map(|tree| ParseResult {
            tree,
            source: source.to_owned(),
        })
    }
}

impl fmt::Debug for Parser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parser").field("language", &"go").finish()
    }
}

fn collect_error_nodes(
    node: tree_sitter::Node<'_>,
    source: &str,
    errors: &mut Vec<SyntaxErrorInfo>,
) {
    if node.is_error() || node.is_missing() {
        errors.push(SyntaxErrorInfo::from_node(node, source));
        return;
    }
    if !node.has_error() {
        return;
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_error_nodes(child, source, errors);
    }
}

fn point_to_one_based(pos: tree_sitter::Point) -> (u32, u32) {
    let line = u32::try_from(pos.row.saturating_add(1)).unwrap_or(u32::MAX);
    let column = u32::try_from(pos.column.saturating_add(1)).unwrap_or(u32::MAX);
    (line, column)
}
