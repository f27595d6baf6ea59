//! Owned record tree extracted from a Go syntax tree.
//!
//! Tree-sitter trees are immutable, so the parts this crate rewrites are
//! copied into an owned hierarchy: a [`SourceFile`] owns its top-level
//! [`RecordType`]s, each record owns its [`Field`]s, and each field owns the
//! record types nested in its type expression. Fields remember where their
//! names, type, tag and trailing comment sit in the original text.
//!
//! [`SourceFile::print`] only touches field lists that changed. Their
//! single-line fields are laid out the way `gofmt` does: consecutive lines
//! form a section whose name, type, tag and comment columns are padded to a
//! common width. Everything outside those lines is reproduced byte for byte.

use std::ops::Range;
use std::path::{Path, PathBuf};

use crate::error::ProcessError;
use crate::parser::{ParseResult, Parser};

const STRUCT_TYPE: &str = "struct_type";
const FIELD_DECLARATION_LIST: &str = "field_declaration_list";
const FIELD_DECLARATION: &str = "field_declaration";

/// Spaces added after the widest cell of an aligned column.
const CELL_PADDING: usize = 1;

/// Visits record types in a [`SourceFile`].
///
/// Records are visited in document order, parents before the records
/// nested in their fields.
pub trait RecordVisitor {
    /// Called once for every record type in the file.
    fn visit_record(&mut self, record: &mut RecordType);
}

/// A parsed Go source file and the record types it declares.
#[derive(Debug, Clone)]
pub struct SourceFile {
    path: PathBuf,
    source: String,
    records: Vec<RecordType>,
}

impl SourceFile {
    /// Parses `source` and extracts every record type in it.
    ///
    /// Record types are found at any depth: top-level declarations, types
    /// declared inside function bodies, anonymous structs in expressions and
    /// structs nested inside other structs' field types.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessError::ParseError`] if the source contains syntax
    /// errors. Rewriting a partially understood file could corrupt it.
    pub fn parse(
        parser: &mut Parser,
        path: impl Into<PathBuf>,
        source: &str,
    ) -> Result<Self, ProcessError> {
        let path = path.into();
        let parsed = parser
            .parse(source)
            .ok_or_else(|| ProcessError::parse(&path, "parser produced no syntax tree"))?;

        if let Some(error) = parsed.first_error() {
            return Err(ProcessError::parse(&path, error.to_string()));
        }

        let records = extract_records(&parsed);
        Ok(Self {
            path,
            source: parsed.into_source(),
            records,
        })
    }

    /// Returns the path this source was read from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the outermost record types in document order.
    #[must_use]
    pub fn records(&self) -> &[RecordType] {
        &self.records
    }

    /// Returns the number of record types at any depth.
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.records.iter().map(RecordType::record_count).sum()
    }

    /// Walks every record type, nested ones included.
    pub fn walk_records_mut<V>(&mut self, visitor: &mut V)
    where
        V: RecordVisitor + ?Sized,
    {
        for record in &mut self.records {
            walk_record(record, visitor);
        }
    }

    /// Returns the number of fields whose tag differs from the source.
    #[must_use]
    pub fn modified_field_count(&self) -> usize {
        self.records
            .iter()
            .map(RecordType::modified_field_count)
            .sum()
    }

    /// Prints the file with every changed tag in place.
    ///
    /// Field lists containing a change are realigned; all other text,
    /// comments and blank lines included, is reproduced byte for byte.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessError::RenderError`] if two edits overlap or an
    /// edit does not fall on a UTF-8 boundary.
    pub fn print(&self) -> Result<String, ProcessError> {
        let render_error = |message: String| ProcessError::render(&self.path, message);

        let mut edits = Vec::new();
        for record in &self.records {
            record
                .collect_edits(&self.source, &mut edits)
                .map_err(render_error)?;
        }
        apply_edits(&self.source, 0, edits).map_err(render_error)
    }
}

/// A Go `struct` type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordType {
    name: Option<String>,
    line: u32,
    fields: Vec<Field>,
}

impl RecordType {
    /// Returns the declared type name, or `None` for anonymous structs.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the one-based line of the `struct` keyword.
    #[must_use]
    pub const fn line(&self) -> u32 {
        self.line
    }

    /// Returns the fields in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Returns the fields in declaration order for mutation.
    pub fn fields_mut(&mut self) -> &mut [Field] {
        &mut self.fields
    }

    fn record_count(&self) -> usize {
        let nested: usize = self
            .fields
            .iter()
            .flat_map(|field| field.nested.iter())
            .map(Self::record_count)
            .sum();
        nested.saturating_add(1)
    }

    fn modified_field_count(&self) -> usize {
        self.fields
            .iter()
            .map(|field| {
                let nested: usize = field.nested.iter().map(Self::modified_field_count).sum();
                nested.saturating_add(usize::from(field.is_modified()))
            })
            .sum()
    }

    /// Collects the edits for this record and every record nested in it.
    ///
    /// Unchanged records produce no edits, so their layout is left exactly
    /// as written.
    fn collect_edits(&self, source: &str, edits: &mut Vec<Edit>) -> Result<(), String> {
        if self.modified_field_count() == 0 {
            return Ok(());
        }

        let mut section: Vec<&Field> = Vec::new();
        let mut previous_row: Option<usize> = None;
        for field in &self.fields {
            let continues = field.layout != Layout::Inline
                && previous_row.is_some_and(|row| field.start_row == row.saturating_add(1));
            if !continues {
                flush_section(&mut section, source, edits)?;
            }

            previous_row = None;
            match field.layout {
                Layout::Row => {
                    previous_row = Some(field.start_row);
                    section.push(field);
                }
                // The opening line still aligns with the lines above it,
                // but nothing after a multi-line field shares its columns.
                Layout::Opening => {
                    section.push(field);
                    flush_section(&mut section, source, edits)?;
                }
                Layout::Inline => field.collect_inline_edits(source, edits)?,
            }
        }
        flush_section(&mut section, source, edits)
    }
}

/// How a field sits in its source lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    /// Alone on one line, optionally followed by a comment.
    Row,
    /// Starts its own line and continues over several, like a nested
    /// struct type.
    Opening,
    /// Shares its line with other code; printed without realignment.
    Inline,
}

/// One field declaration inside a record type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    names: Vec<String>,
    layout: Layout,
    start: usize,
    start_row: usize,
    type_range: Range<usize>,
    row_end: usize,
    comment: Option<String>,
    original_tag: Option<OriginalTag>,
    tag: Option<String>,
    nested: Vec<RecordType>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct OriginalTag {
    text: String,
    range: Range<usize>,
    removal: Range<usize>,
}

struct Edit {
    range: Range<usize>,
    replacement: String,
}

impl Field {
    /// Returns the field identifier, or `None` for embedded fields.
    ///
    /// For declarations such as `A, B int` this is the first name.
    #[must_use]
    pub fn identifier(&self) -> Option<&str> {
        self.names.first().map(String::as_str)
    }

    /// Returns every name declared by this field.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Returns whether the identifier starts with an uppercase letter.
    #[must_use]
    pub fn is_exported(&self) -> bool {
        self.identifier()
            .and_then(|name| name.chars().next())
            .is_some_and(char::is_uppercase)
    }

    /// Returns the current tag literal, delimiters included.
    #[must_use]
    pub fn raw_tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    /// Replaces the tag literal; `None` removes the tag.
    pub fn set_raw_tag(&mut self, tag: Option<String>) {
        self.tag = tag;
    }

    /// Returns whether the tag differs from the one in the source.
    #[must_use]
    pub fn is_modified(&self) -> bool {
        self.original_tag.as_ref().map(|original| &original.text) != self.tag.as_ref()
    }

    /// Returns the record types nested in this field's type.
    #[must_use]
    pub fn nested(&self) -> &[RecordType] {
        &self.nested
    }

    /// Splits the field into tabwriter cells, as `gofmt` does.
    ///
    /// Named fields give `names, type[, tag][, comment]`. Embedded fields
    /// give `type[, tag][, comment]`, with an empty cell standing in for a
    /// missing tag so the comment stays in the comment column. An opening
    /// line only contributes its names.
    fn cells(&self, source: &str) -> Result<Vec<String>, String> {
        let mut cells = Vec::with_capacity(4);
        if !self.names.is_empty() {
            cells.push(self.names.join(", "));
        }
        if self.layout == Layout::Opening {
            cells.push(String::new());
            return Ok(cells);
        }

        let mut nested_edits = Vec::new();
        for nested in &self.nested {
            nested.collect_edits(source, &mut nested_edits)?;
        }
        let type_text = source
            .get(self.type_range.clone())
            .ok_or_else(|| "field type is not on a UTF-8 boundary".to_owned())?;
        cells.push(apply_edits(type_text, self.type_range.start, nested_edits)?);

        if let Some(tag) = &self.tag {
            cells.push(tag.clone());
        }
        if let Some(comment) = &self.comment {
            if self.names.is_empty() && self.tag.is_none() {
                cells.push(String::new());
            }
            cells.push(comment.clone());
        }
        Ok(cells)
    }

    fn collect_inline_edits(&self, source: &str, edits: &mut Vec<Edit>) -> Result<(), String> {
        for nested in &self.nested {
            nested.collect_edits(source, edits)?;
        }
        edits.extend(self.tag_edit());
        Ok(())
    }

    fn tag_edit(&self) -> Option<Edit> {
        match (&self.original_tag, &self.tag) {
            (Some(original), Some(tag)) if original.text == *tag => None,
            (Some(original), Some(tag)) => Some(Edit {
                range: original.range.clone(),
                replacement: tag.clone(),
            }),
            (Some(original), None) => Some(Edit {
                range: original.removal.clone(),
                replacement: String::new(),
            }),
            (None, Some(tag)) => Some(Edit {
                range: self.type_range.end..self.type_range.end,
                replacement: format!(" {tag}"),
            }),
            (None, None) => None,
        }
    }
}

/// Lays out one section of consecutive lines and drains it.
fn flush_section(
    section: &mut Vec<&Field>,
    source: &str,
    edits: &mut Vec<Edit>,
) -> Result<(), String> {
    if section.is_empty() {
        return Ok(());
    }

    let rows = section
        .iter()
        .map(|field| field.cells(source))
        .collect::<Result<Vec<_>, _>>()?;
    let widths = column_widths(&rows);

    for ((field, cells), row_widths) in section.drain(..).zip(&rows).zip(&widths) {
        let line = render_row(cells, row_widths);
        if field.layout == Layout::Opening {
            edits.push(Edit {
                range: field.start..field.type_range.start,
                replacement: line,
            });
            field.collect_inline_edits(source, edits)?;
        } else {
            edits.push(Edit {
                range: field.start..field.row_end,
                replacement: line,
            });
        }
    }
    Ok(())
}

/// Computes padded widths the way `text/tabwriter` does.
///
/// A column block is a run of consecutive rows that have a cell in that
/// column followed by another cell; the last cell of a row never takes
/// part. Blocks whose cells are all empty collapse to zero width.
fn column_widths(rows: &[Vec<String>]) -> Vec<Vec<usize>> {
    let mut widths: Vec<Vec<usize>> = rows.iter().map(|cells| vec![0; cells.len()]).collect();
    fill_column(rows, &mut widths, 0..rows.len(), 0);
    widths
}

fn fill_column(rows: &[Vec<String>], widths: &mut [Vec<usize>], lines: Range<usize>, column: usize) {
    let has_cell = |line: usize| {
        rows.get(line)
            .is_some_and(|cells| cells.len() > column.saturating_add(1))
    };

    let mut line = lines.start;
    while line < lines.end {
        if !has_cell(line) {
            line = line.saturating_add(1);
            continue;
        }

        let block_start = line;
        while line < lines.end && has_cell(line) {
            line = line.saturating_add(1);
        }

        let widest = rows
            .get(block_start..line)
            .into_iter()
            .flatten()
            .filter_map(|cells| cells.get(column))
            .map(|cell| cell.chars().count())
            .max()
            .unwrap_or_default();
        let width = if widest == 0 {
            0
        } else {
            widest.saturating_add(CELL_PADDING)
        };
        for row in widths.get_mut(block_start..line).into_iter().flatten() {
            if let Some(slot) = row.get_mut(column) {
                *slot = width;
            }
        }

        fill_column(rows, widths, block_start..line, column.saturating_add(1));
    }
}

fn render_row(cells: &[String], widths: &[usize]) -> String {
    let last = cells.len().saturating_sub(1);
    let mut line = String::new();
    for (index, (cell, width)) in cells.iter().zip(widths).enumerate() {
        line.push_str(cell);
        if index < last {
            let padding = width.saturating_sub(cell.chars().count());
            line.push_str(&" ".repeat(padding));
        }
    }
    line
}

/// Applies edits given in absolute offsets to `text`, which starts at
/// `offset` in the source.
fn apply_edits(text: &str, offset: usize, mut edits: Vec<Edit>) -> Result<String, String> {
    edits.sort_by(|a, b| b.range.start.cmp(&a.range.start));

    let mut output = text.to_owned();
    let mut limit = output.len();
    for edit in edits {
        let at = edit.range.start;
        let (Some(start), Some(end)) = (
            edit.range.start.checked_sub(offset),
            edit.range.end.checked_sub(offset),
        ) else {
            return Err(format!("tag edit at byte {at} falls outside its field"));
        };
        if start > end || end > limit {
            return Err(format!("overlapping tag edit at byte {at}"));
        }
        if !output.is_char_boundary(start) || !output.is_char_boundary(end) {
            return Err("tag edit is not on a UTF-8 boundary".to_owned());
        }
        output.replace_range(start..end, &edit.replacement);
        limit = start;
    }
    Ok(output)
}

fn walk_record<V>(record: &mut RecordType, visitor: &mut V)
where
    V: RecordVisitor + ?Sized,
{
    visitor.visit_record(record);
    for field in &mut record.fields {
        for nested in &mut field.nested {
            walk_record(nested, visitor);
        }
    }
}

fn extract_records(parsed: &ParseResult) -> Vec<RecordType> {
    let mut records = Vec::new();
    collect_records(parsed.root_node(), parsed.source(), &mut records);
    records
}

/// Collects the outermost struct types at or below `node`.
fn collect_records(node: tree_sitter::Node<'_>, source: &str, out: &mut Vec<RecordType>) {
    if node.kind() == STRUCT_TYPE {
        out.push(build_record(node, source));
        return;
    }

    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        collect_records(child, source, out);
    }
}

fn build_record(node: tree_sitter::Node<'_>, source: &str) -> RecordType {
    let name = node
        .parent()
        .filter(|parent| parent.kind() == "type_spec")
        .and_then(|spec| spec.child_by_field_name("name"))
        .map(|name| node_text(name, source).to_owned());
    let line = u32::try_from(node.start_position().row.saturating_add(1)).unwrap_or(u32::MAX);

    let mut fields = Vec::new();
    let mut cursor = node.walk();
    for list in node
        .named_children(&mut cursor)
        .filter(|child| child.kind() == FIELD_DECLARATION_LIST)
    {
        let mut list_cursor = list.walk();
        for declaration in list
            .named_children(&mut list_cursor)
            .filter(|child| child.kind() == FIELD_DECLARATION)
        {
            fields.push(build_field(declaration, source));
        }
    }

    RecordType { name, line, fields }
}

fn build_field(node: tree_sitter::Node<'_>, source: &str) -> Field {
    let mut cursor = node.walk();
    let names: Vec<String> = node
        .children_by_field_name("name", &mut cursor)
        .map(|name| node_text(name, source).to_owned())
        .collect();

    let start = node.start_byte();
    let start_row = node.start_position().row;
    let type_node = node.child_by_field_name("type");
    let type_end = type_node.map_or_else(|| node.end_byte(), |ty| ty.end_byte());
    // An embedded field's type cell includes a leading `*`.
    let type_start = match type_node {
        Some(ty) if !names.is_empty() => ty.start_byte(),
        _ => start,
    };

    let tag_node = node.child_by_field_name("tag");
    let original_tag = tag_node.map(|tag| {
        let range = tag.byte_range();
        let gap_is_blank = source
            .get(type_end..range.start)
            .is_some_and(|gap| gap.trim().is_empty());
        let removal_start = if gap_is_blank { type_end } else { range.start };
        OriginalTag {
            text: node_text(tag, source).to_owned(),
            removal: removal_start..range.end,
            range,
        }
    });

    let declaration_end = tag_node.map_or(type_end, |tag| tag.end_byte());
    let trailing = trailing_comment(source, declaration_end);
    let own_line = starts_line(source, start);
    let single_row = node.end_position().row == start_row;
    let opens_on_first_row = !names.is_empty()
        && type_node.is_some_and(|ty| ty.start_position().row == start_row);

    let (layout, comment, row_end) = match trailing {
        Some((comment, row_end)) if own_line && single_row => (Layout::Row, comment, row_end),
        _ if own_line && !single_row && opens_on_first_row => {
            (Layout::Opening, None, declaration_end)
        }
        _ => (Layout::Inline, None, declaration_end),
    };

    let mut nested = Vec::new();
    if let Some(ty) = type_node {
        collect_records(ty, source, &mut nested);
    }

    Field {
        names,
        layout,
        start,
        start_row,
        type_range: type_start..type_end,
        row_end,
        comment,
        tag: original_tag.as_ref().map(|original| original.text.clone()),
        original_tag,
        nested,
    }
}

/// Returns whether only whitespace precedes `offset` on its line.
fn starts_line(source: &str, offset: usize) -> bool {
    let line_start = source
        .get(..offset)
        .and_then(|before| before.rfind('\n'))
        .map_or(0, |newline| newline.saturating_add(1));
    source
        .get(line_start..offset)
        .is_some_and(|prefix| prefix.trim().is_empty())
}

/// Reads what follows `offset` on its line.
///
/// Returns the trailing comment, if any, and the offset where it ends, or
/// `None` when the line continues with anything other than one comment.
fn trailing_comment(source: &str, offset: usize) -> Option<(Option<String>, usize)> {
    let line = source.get(offset..)?.split('\n').next().unwrap_or_default();
    let text = line.trim();
    if text.is_empty() {
        return Some((None, offset));
    }

    let line_comment = text.starts_with("//");
    let block_comment = text.starts_with("/*")
        && text.len() >= 4
        && text.find("*/") == Some(text.len().saturating_sub(2));
    if !line_comment && !block_comment {
        return None;
    }

    let leading = line.len().saturating_sub(line.trim_start().len());
    let end = offset.saturating_add(leading).saturating_add(text.len());
    Some((Some(text.to_owned()), end))
}

fn node_text<'s>(node: tree_sitter::Node<'_>, source: &'s str) -> &'s str {
    source.get(node.byte_range()).unwrap_or_default()
}
