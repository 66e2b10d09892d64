//! Page model
//!
//! A page is a titled blob of bytes. Titles are restricted to ASCII letters and
//! digits, which keeps the title-to-file mapping injective and free of path
//! separators.

mod store;

use std::fmt;

use crate::error::TitleError;

pub use store::PageStore;

/// Validated page title
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Title(String);

impl Title {
    pub fn parse(raw: &str) -> Result<Self, TitleError> {
        if raw.is_empty() {
            return Err(TitleError::Empty);
        }
        if !raw.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(TitleError::InvalidCharacter(raw.to_string()));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Title {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A page held in memory for the duration of one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub title: Title,
    pub body: Vec<u8>,
}

impl Page {
    pub fn new(title: Title, body: impl Into<Vec<u8>>) -> Self {
        Self {
            title,
            body: body.into(),
        }
    }

    /// Page with no content yet, used for the first edit of a title
    pub const fn blank(title: Title) -> Self {
        Self {
            title,
            body: Vec::new(),
        }
    }
}
