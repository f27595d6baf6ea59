//! Naming conventions applied to field identifiers.
//!
//! This module provides the [`CaseStyle`] enum selected by tag requests and
//! the conversion functions behind it. The conversions follow Go naming:
//! acronyms stay together, so `UserID` becomes `user_id` in snake case and
//! `userID` in camel case.

use std::fmt;
use std::str::FromStr;

use crate::error::TagError;

/// Naming conventions a tag value can be generated in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CaseStyle {
    /// `user_id`
    Snake,
    /// `userID`
    #[default]
    Camel,
    /// `UserID`
    Pascal,
}

impl CaseStyle {
    /// Converts an identifier into this naming convention.
    ///
    /// # Errors
    ///
    /// Returns [`TagError::InvalidIdentifier`] if the identifier is empty or
    /// contains characters other than letters, digits and underscores.
    pub fn apply(self, identifier: &str) -> Result<String, TagError> {
        match self {
            Self::Snake => to_snake(identifier),
            Self::Camel => to_camel(identifier),
            Self::Pascal => to_pascal(identifier),
        }
    }

    /// Returns the lower-case name used in request tokens.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Snake => "snake",
            Self::Camel => "camel",
            Self::Pascal => "pascal",
        }
    }

    /// Returns all supported case styles.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Snake, Self::Camel, Self::Pascal]
    }
}

impl fmt::Display for CaseStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CaseStyle {
    type Err = TagError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let normalised = input.trim().to_ascii_lowercase();
        match normalised.as_str() {
            "snake" => Ok(Self::Snake),
            "camel" => Ok(Self::Camel),
            "pascal" => Ok(Self::Pascal),
            _ => Err(TagError::unknown_case_style(input.trim(), input)),
        }
    }
}

/// Converts an identifier to `snake_case`.
///
/// An underscore is inserted before an uppercase letter that is followed by
/// a lowercase letter or preceded by one, so a run of capitals is split only
/// where a new word starts.
///
/// # Errors
///
/// Returns [`TagError::InvalidIdentifier`] for empty or malformed input.
pub fn to_snake(identifier: &str) -> Result<String, TagError> {
    validate(identifier)?;

    let chars: Vec<char> = identifier.chars().collect();
    let mut out = String::with_capacity(identifier.len().saturating_add(4));

    for (index, current) in chars.iter().copied().enumerate() {
        if index > 0 && current.is_uppercase() {
            let next_is_lower = chars
                .get(index.saturating_add(1))
                .is_some_and(|next| next.is_lowercase());
            let previous_is_lower = chars
                .get(index.saturating_sub(1))
                .is_some_and(|previous| previous.is_lowercase());
            if next_is_lower || previous_is_lower {
                out.push('_');
            }
        }
        out.push(lower(current));
    }

    Ok(out)
}

/// Converts an identifier to `camelCase`.
///
/// The leading run of non-lowercase characters is lowercased. When that run
/// is longer than one character and does not cover the whole identifier,
/// its last character starts the next word and is uppercased again, so
/// `APIKey` becomes `apiKey`.
///
/// # Errors
///
/// Returns [`TagError::InvalidIdentifier`] for empty or malformed input.
pub fn to_camel(identifier: &str) -> Result<String, TagError> {
    validate(identifier)?;

    let mut chars: Vec<char> = identifier.chars().collect();
    let mut run: usize = 0;
    for ch in &mut chars {
        if ch.is_lowercase() {
            break;
        }
        *ch = lower(*ch);
        run = run.saturating_add(1);
    }

    if run > 1 && run != chars.len() {
        if let Some(boundary) = chars.get_mut(run.saturating_sub(1)) {
            *boundary = upper(*boundary);
        }
    }

    Ok(chars.into_iter().collect())
}

/// Returns the identifier unchanged.
///
/// Exported Go identifiers are already `PascalCase`.
///
/// # Errors
///
/// Returns [`TagError::InvalidIdentifier`] for empty or malformed input.
pub fn to_pascal(identifier: &str) -> Result<String, TagError> {
    validate(identifier)?;
    Ok(identifier.to_owned())
}

fn validate(identifier: &str) -> Result<(), TagError> {
    let well_formed = !identifier.is_empty()
        && identifier
            .chars()
            .all(|ch| ch.is_alphanumeric() || ch == '_');
    if well_formed {
        Ok(())
    } else {
        Err(TagError::invalid_identifier(identifier))
    }
}

fn lower(ch: char) -> char {
    ch.to_lowercase().next().unwrap_or(ch)
}

fn upper(ch: char) -> char {
    ch.to_uppercase().next().unwrap_or(ch)
}
