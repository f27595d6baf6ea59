//! Per-record tag rewriting.

use tracing::{debug, warn};

use crate::error::TagError;
use crate::tag::{SynthesisOptions, TagLiteral, TagRequest, synthesize};
use crate::tree::{Field, RecordType, RecordVisitor};

/// What to do to every eligible field of a file.
///
/// The plan is fixed for a whole run and shared by every file in it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewritePlan {
    requests: Vec<TagRequest>,
    remove_existing: bool,
    options: SynthesisOptions,
}

impl RewritePlan {
    /// Creates a plan generating `requests` on top of existing tags.
    ///
    /// No defaulting happens here: an empty request list generates
    /// nothing.
    #[must_use]
    pub fn new(requests: Vec<TagRequest>) -> Self {
        Self {
            requests,
            remove_existing: false,
            options: SynthesisOptions::new(),
        }
    }

    /// Discards existing tags before generating new ones when set.
    #[must_use]
    pub const fn with_remove_existing(mut self, remove_existing: bool) -> Self {
        self.remove_existing = remove_existing;
        self
    }

    /// Sets the synthesis options.
    #[must_use]
    pub const fn with_options(mut self, options: SynthesisOptions) -> Self {
        self.options = options;
        self
    }

    /// Returns the requests in order.
    #[must_use]
    pub fn requests(&self) -> &[TagRequest] {
        &self.requests
    }

    /// Returns whether existing tags are discarded first.
    #[must_use]
    pub const fn remove_existing(&self) -> bool {
        self.remove_existing
    }

    /// Returns the synthesis options.
    #[must_use]
    pub const fn options(&self) -> SynthesisOptions {
        self.options
    }
}

/// A field that could not be rewritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedField {
    /// The record's declared name, if it has one.
    pub record: Option<String>,
    /// One-based line of the record's `struct` keyword.
    pub line: u32,
    /// Why the field was left alone.
    pub error: TagError,
}

/// Applies a [`RewritePlan`] to record types, one field at a time.
#[derive(Debug)]
pub struct RecordRewriter<'a> {
    plan: &'a RewritePlan,
    records_visited: usize,
    skipped: Vec<SkippedField>,
}

impl<'a> RecordRewriter<'a> {
    /// Creates a rewriter for `plan`.
    #[must_use]
    pub const fn new(plan: &'a RewritePlan) -> Self {
        Self {
            plan,
            records_visited: 0,
            skipped: Vec::new(),
        }
    }

    /// Rewrites the tags of every exported, named field of `record`.
    ///
    /// Embedded fields and fields whose identifier does not start with an
    /// uppercase letter keep their tag as is, whatever the plan says.
    pub fn rewrite(&mut self, record: &mut RecordType) {
        self.records_visited = self.records_visited.saturating_add(1);
        debug!(
            record = record.name().unwrap_or("<anonymous>"),
            line = record.line(),
            fields = record.fields().len(),
            "rewriting record"
        );

        let name = record.name().map(str::to_owned);
        let line = record.line();
        for field in record.fields_mut() {
            if let Err(error) = self.rewrite_field(field) {
                warn!(
                    record = name.as_deref().unwrap_or("<anonymous>"),
                    line,
                    %error,
                    "skipping field"
                );
                self.skipped.push(SkippedField {
                    record: name.clone(),
                    line,
                    error,
                });
            }
        }
    }

    /// Returns the number of records rewritten so far.
    #[must_use]
    pub const fn records_visited(&self) -> usize {
        self.records_visited
    }

    /// Returns the fields left alone because their tag could not be built.
    #[must_use]
    pub fn skipped(&self) -> &[SkippedField] {
        &self.skipped
    }

    /// Consumes the rewriter, returning the skipped fields.
    #[must_use]
    pub fn into_skipped(self) -> Vec<SkippedField> {
        self.skipped
    }

    fn rewrite_field(&self, field: &mut Field) -> Result<(), TagError> {
        let Some(identifier) = field.identifier() else {
            return Ok(());
        };
        if !field.is_exported() {
            debug!(field = identifier, "skipping unexported field");
            return Ok(());
        }

        let remove_existing = self.plan.remove_existing();
        let existing = if remove_existing {
            ""
        } else {
            field.raw_tag().unwrap_or_default()
        };
        let tag = synthesize(
            identifier,
            existing,
            self.plan.requests(),
            self.plan.options(),
        )?;

        // Generated segments are only ever appended, so an unchanged count
        // means every requested key was already there.
        let appended = tag.segments().len() > TagLiteral::parse(existing).segments().len();
        if remove_existing || appended {
            field.set_raw_tag((!tag.is_empty()).then(|| tag.to_string()));
        }
        Ok(())
    }
}

impl RecordVisitor for RecordRewriter<'_> {
    fn visit_record(&mut self, record: &mut RecordType) {
        self.rewrite(record);
    }
}
