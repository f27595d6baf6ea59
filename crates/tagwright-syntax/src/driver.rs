//! Parse, rewrite and print lifecycle for Go source files.
//!
//! [`TreeDriver`] treats each file as an atomic unit: the new content is
//! computed and checked in memory, then written to a temporary file in the
//! destination directory and persisted over the original. Any failure on the
//! way leaves the original file exactly as it was.

use std::fs;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::ProcessError;
use crate::parser::Parser;
use crate::record::{RecordRewriter, RewritePlan, SkippedField};
use crate::tree::SourceFile;

/// Result of rewriting one source text in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewritten {
    output: String,
    records: usize,
    modified_fields: usize,
    skipped: Vec<SkippedField>,
}

impl Rewritten {
    /// Returns the rewritten source text.
    #[must_use]
    pub fn output(&self) -> &str {
        &self.output
    }

    /// Consumes the result, returning the rewritten source text.
    #[must_use]
    pub fn into_output(self) -> String {
        self.output
    }

    /// Returns the number of record types found.
    #[must_use]
    pub const fn records(&self) -> usize {
        self.records
    }

    /// Returns the number of fields whose tag changed.
    #[must_use]
    pub const fn modified_fields(&self) -> usize {
        self.modified_fields
    }

    /// Returns the fields that were left alone because of an error.
    #[must_use]
    pub fn skipped(&self) -> &[SkippedField] {
        &self.skipped
    }

    /// Returns whether any tag changed.
    #[must_use]
    pub const fn has_changes(&self) -> bool {
        self.modified_fields > 0
    }
}

/// Summary of processing one file on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutcome {
    /// Number of record types found.
    pub records: usize,
    /// Number of fields whose tag changed.
    pub modified_fields: usize,
    /// Fields left alone because of an error.
    pub skipped: Vec<SkippedField>,
    /// Whether the file was rewritten. Unchanged files are not touched.
    pub written: bool,
}

/// Owns the parser and drives files through parse, rewrite and print.
#[derive(Debug)]
pub struct TreeDriver {
    parser: Parser,
}

impl TreeDriver {
    /// Creates a driver with a fresh Go parser.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessError::ParserInitError`] if the grammar cannot be
    /// loaded.
    pub fn new() -> Result<Self, ProcessError> {
        Ok(Self {
            parser: Parser::new()?,
        })
    }

    /// Rewrites the file at `path` in place.
    ///
    /// The file is only opened for writing once the new content has been
    /// printed and re-parsed without errors. Files whose content would not
    /// change are left untouched.
    ///
    /// # Errors
    ///
    /// Returns a [`ProcessError`] naming `path` if the file cannot be read,
    /// parsed, printed or written. The file is unchanged in every case.
    pub fn process(
        &mut self,
        path: &Path,
        plan: &RewritePlan,
    ) -> Result<ProcessOutcome, ProcessError> {
        let source = fs::read_to_string(path).map_err(|e| ProcessError::read(path, e))?;
        let rewritten = self.rewrite_source(path, &source, plan)?;

        let written = rewritten.output() != source;
        if written {
            replace_contents(path, rewritten.output())?;
        } else {
            debug!(path = %path.display(), "no tag changes; leaving file untouched");
        }

        Ok(ProcessOutcome {
            records: rewritten.records,
            modified_fields: rewritten.modified_fields,
            skipped: rewritten.skipped,
            written,
        })
    }

    /// Rewrites `source` in memory. `path` is only used in error messages.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessError::ParseError`] for invalid input and
    /// [`ProcessError::RenderError`] if the printed output would not parse.
    pub fn rewrite_source(
        &mut self,
        path: &Path,
        source: &str,
        plan: &RewritePlan,
    ) -> Result<Rewritten, ProcessError> {
        let mut file = SourceFile::parse(&mut self.parser, path, source)?;

        let mut rewriter = RecordRewriter::new(plan);
        file.walk_records_mut(&mut rewriter);
        let records = rewriter.records_visited();
        let skipped = rewriter.into_skipped();

        let modified_fields = file.modified_field_count();
        let output = file.print()?;
        if modified_fields > 0 {
            self.check_printed(path, &output)?;
        }

        debug!(
            path = %path.display(),
            records,
            modified_fields,
            skipped = skipped.len(),
            "rewrote source"
        );

        Ok(Rewritten {
            output,
            records,
            modified_fields,
            skipped,
        })
    }

    fn check_printed(&mut self, path: &Path, output: &str) -> Result<(), ProcessError> {
        let reparsed = self
            .parser
            .parse(output)
            .ok_or_else(|| ProcessError::render(path, "printed source could not be re-parsed"))?;
        match reparsed.first_error() {
            Some(error) => Err(ProcessError::render(
                path,
                format!("printed source is not valid Go: {error}"),
            )),
            None => Ok(()),
        }
    }
}

/// Replaces the file at `path` with `contents` via a sibling temporary file.
fn replace_contents(path: &Path, contents: &str) -> Result<(), ProcessError> {
    let directory = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let permissions = fs::metadata(path)
        .map_err(|e| ProcessError::write(path, e))?
        .permissions();

    let mut temp = NamedTempFile::new_in(directory).map_err(|e| ProcessError::write(path, e))?;
    temp.write_all(contents.as_bytes())
        .and_then(|()| temp.flush())
        .map_err(|e| ProcessError::write(path, e))?;
    temp.as_file()
        .set_permissions(permissions)
        .map_err(|e| ProcessError::write(path, e))?;
    temp.persist(path)
        .map_err(|e| ProcessError::write(path, e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::case::CaseStyle;
    use crate::tag::{SynthesisOptions, TagRequest};
    use tempfile::TempDir;

    fn driver() -> TreeDriver {
        TreeDriver::new().expect("driver init")
    }

    #[test]
    fn process_rewrites_file_in_place() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("user.go");
        fs::write(&path, "package m\n\ntype User struct {\n\tEmail string\n}\n").expect("write");

        let plan = RewritePlan::new(vec![TagRequest::new("json", CaseStyle::Camel)])
            .with_options(SynthesisOptions::new().with_omit_empty(true));
        let outcome = driver().process(&path, &plan).expect("process");

        assert!(outcome.written);
        assert_eq!(outcome.modified_fields, 1);
        assert_eq!(
            fs::read_to_string(&path).expect("read back"),
            "package m\n\ntype User struct {\n\tEmail string `json:\"email,omitempty\"`\n}\n"
        );
    }

    #[test]
    fn process_is_idempotent_on_disk() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("user.go");
        fs::write(&path, "package m\n\ntype User struct {\n\tUserID int `json:\"id\"`\n}\n")
            .expect("write");
        let plan = RewritePlan::new(vec![TagRequest::new("bson", CaseStyle::Snake)]);

        let mut driver = driver();
        let first = driver.process(&path, &plan).expect("first run");
        let after_first = fs::read_to_string(&path).expect("read back");
        let second = driver.process(&path, &plan).expect("second run");

        assert!(first.written);
        assert!(!second.written);
        assert_eq!(fs::read_to_string(&path).expect("read back"), after_first);
        assert!(after_first.contains("`json:\"id\" bson:\"user_id\"`"));
    }

    #[test]
    fn parse_failure_leaves_file_untouched() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("broken.go");
        let broken = "package m\n\ntype User struct {\n\tName string\n";
        fs::write(&path, broken).expect("write");

        let plan = RewritePlan::new(vec![TagRequest::new("json", CaseStyle::Camel)]);
        let error = driver()
            .process(&path, &plan)
            .expect_err("broken source");

        assert!(matches!(error, ProcessError::ParseError { .. }));
        assert_eq!(error.path(), Some(path.as_path()));
        assert_eq!(fs::read_to_string(&path).expect("read back"), broken);
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("absent.go");
        let error = driver()
            .process(&path, &RewritePlan::default())
            .expect_err("missing file");
        assert!(matches!(error, ProcessError::ReadError { .. }));
    }

    #[test]
    fn rewrite_source_reports_counts() {
        let plan = RewritePlan::new(vec![TagRequest::new("json", CaseStyle::Camel)]);
        let rewritten = driver()
            .rewrite_source(
                Path::new("inline.go"),
                "package m\n\nfunc f() {\n\ttype row struct {\n\t\tID int\n\t\tnote string\n\t}\n}\n",
                &plan,
            )
            .expect("rewrite");
        assert_eq!(rewritten.records(), 1);
        assert_eq!(rewritten.modified_fields(), 1);
        assert!(rewritten.has_changes());
        assert!(rewritten.output().contains("\t\tID   int `json:\"id\"`\n\t\tnote string\n"));
    }
}
