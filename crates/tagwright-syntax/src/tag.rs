//! Struct tag parsing and synthesis.
//!
//! A Go struct tag is a string literal of space-separated `key:"value"`
//! segments. [`TagLiteral`] keeps those segments verbatim so that tags the
//! caller did not ask for survive a rewrite unchanged, and [`synthesize`]
//! appends the segments that are missing for a set of [`TagRequest`]s.

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::case::CaseStyle;
use crate::error::TagError;

/// Modifier appended to generated values when omit-empty is enabled.
pub const OMIT_EMPTY_MODIFIER: &str = "omitempty";

/// A request to generate one tag key in one naming convention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagRequest {
    name: String,
    case: CaseStyle,
}

impl TagRequest {
    /// Creates a request for `name` rendered in `case`.
    #[must_use]
    pub fn new(name: impl Into<String>, case: CaseStyle) -> Self {
        Self {
            name: name.into(),
            case,
        }
    }

    /// Returns the tag key this request generates.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the naming convention for the generated value.
    #[must_use]
    pub const fn case(&self) -> CaseStyle {
        self.case
    }
}

impl fmt::Display for TagRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.case)
    }
}

impl FromStr for TagRequest {
    type Err = TagError;

    /// Parses a `name[:case]` token. The case defaults to camel.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let token = input.trim();
        let (name, case) = match token.split_once(':') {
            Some((name, style)) => {
                let case = CaseStyle::from_str(style)
                    .map_err(|_| TagError::unknown_case_style(style.trim(), token))?;
                (name.trim(), case)
            }
            None => (token, CaseStyle::default()),
        };

        if !is_valid_key(name) {
            return Err(TagError::invalid_request(token));
        }
        Ok(Self::new(name, case))
    }
}

/// Options that stay fixed for a whole run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SynthesisOptions {
    omit_empty: bool,
}

impl SynthesisOptions {
    /// Creates options with every modifier disabled.
    #[must_use]
    pub const fn new() -> Self {
        Self { omit_empty: false }
    }

    /// Appends `,omitempty` to every generated value when set.
    #[must_use]
    pub const fn with_omit_empty(mut self, omit_empty: bool) -> Self {
        self.omit_empty = omit_empty;
        self
    }

    /// Returns whether generated values carry the omit-empty modifier.
    #[must_use]
    pub const fn omit_empty(&self) -> bool {
        self.omit_empty
    }
}

/// One segment of a struct tag, kept exactly as written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagSegment {
    text: String,
    key_len: Option<usize>,
}

impl TagSegment {
    /// Wraps segment text, recognising a `key:"value"` shape when present.
    ///
    /// Text that does not have that shape is still kept and printed back
    /// verbatim; it simply has no key.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let key_len = text
            .split_once(":\"")
            .filter(|(key, value)| is_valid_key(key) && value.ends_with('"'))
            .map(|(key, _)| key.len());
        Self { text, key_len }
    }

    fn generated(name: &str, value: &str, options: SynthesisOptions) -> Self {
        let text = if options.omit_empty() {
            format!("{name}:\"{value},{OMIT_EMPTY_MODIFIER}\"")
        } else {
            format!("{name}:\"{value}\"")
        };
        Self::new(text)
    }

    /// Returns the key of a well-formed segment.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        self.key_len
            .and_then(|len| self.text.get(..len))
    }

    /// Returns the segment text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for TagSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// A parsed struct tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagLiteral {
    segments: Vec<TagSegment>,
}

impl TagLiteral {
    /// Parses a tag literal as it appears in source.
    ///
    /// Both raw (backtick) and interpreted (double-quoted) literals are
    /// accepted, as is bare tag content without delimiters. An empty input
    /// yields an empty tag.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let content = strip_delimiters(raw.trim());
        Self {
            segments: split_segments(&content)
                .into_iter()
                .map(TagSegment::new)
                .collect(),
        }
    }

    /// Returns the segments in order.
    #[must_use]
    pub fn segments(&self) -> &[TagSegment] {
        &self.segments
    }

    /// Returns the segment keyed by `key`, if present.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&TagSegment> {
        self.segments
            .iter()
            .find(|segment| segment.key() == Some(key))
    }

    /// Returns whether a segment keyed by `key` exists.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Returns whether the tag has no segments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns the segments joined by single spaces, without delimiters.
    #[must_use]
    pub fn content(&self) -> String {
        self.segments
            .iter()
            .map(TagSegment::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for TagLiteral {
    /// Prints the tag as a Go string literal.
    ///
    /// A raw literal is used unless the content contains a backtick, which
    /// raw literals cannot express.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let content = self.content();
        if content.contains('`') {
            write!(f, "\"{}\"", escape_interpreted(&content))
        } else {
            write!(f, "`{content}`")
        }
    }
}

/// Produces the tag for a field given its current tag and the requests.
///
/// Existing segments are kept in their original order and text. A request
/// whose key is already present is not regenerated, even if its value or
/// case style differs from what would be generated now. Missing keys are
/// appended in request order.
///
/// # Errors
///
/// Returns [`TagError::InvalidIdentifier`] if `identifier` cannot be
/// converted. The caller should leave the field untouched in that case.
pub fn synthesize(
    identifier: &str,
    existing: &str,
    requests: &[TagRequest],
    options: SynthesisOptions,
) -> Result<TagLiteral, TagError> {
    let mut tag = TagLiteral::parse(existing);
    let mut generated: Vec<TagSegment> = Vec::new();

    for request in requests {
        let name = request.name();
        let already_generated = generated.iter().any(|segment| segment.key() == Some(name));
        if tag.contains_key(name) || already_generated {
            debug!(identifier, tag = name, "tag already present");
            continue;
        }
        let value = request.case().apply(identifier)?;
        generated.push(TagSegment::generated(name, &value, options));
    }

    tag.segments.extend(generated);
    Ok(tag)
}

fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|ch| !ch.is_whitespace() && !ch.is_control() && ch != ':' && ch != '"')
}

fn strip_delimiters(raw: &str) -> String {
    if let Some(inner) = raw
        .strip_prefix('`')
        .and_then(|rest| rest.strip_suffix('`'))
    {
        return inner.to_owned();
    }
    if let Some(inner) = raw
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    {
        return unescape_interpreted(inner);
    }
    raw.to_owned()
}

/// Splits tag content into segments, honouring quoted values.
fn split_segments(content: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut escaped = false;

    for ch in content.chars() {
        if in_quotes {
            current.push(ch);
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_quotes = false;
                segments.push(std::mem::take(&mut current));
            }
            continue;
        }

        if ch.is_whitespace() {
            if !current.is_empty() {
                segments.push(std::mem::take(&mut current));
            }
        } else {
            if ch == '"' {
                in_quotes = true;
            }
            current.push(ch);
        }
    }

    if !current.is_empty() {
        segments.push(current);
    }
    segments
}

fn unescape_interpreted(inner: &str) -> String {
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

fn escape_interpreted(content: &str) -> String {
    let mut out = String::with_capacity(content.len().saturating_add(8));
    for ch in content.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out
}
