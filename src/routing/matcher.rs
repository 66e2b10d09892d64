//! Path validation module
//!
//! Recognizes `/<operation>/<title>` and nothing else.

use std::sync::LazyLock;

use regex::Regex;

use super::Operation;
use crate::page::Title;

static VALID_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new("^/(view|edit|save)/([a-zA-Z0-9]+)$").expect("page path pattern is valid")
});

/// Match a request path against the page routes
///
/// Returns the operation and title on a match, `None` for every other path.
pub fn match_path(path: &str) -> Option<(Operation, Title)> {
    let caps = VALID_PATH.captures(path)?;
    let operation = Operation::from_name(caps.get(1)?.as_str())?;
    let title = Title::parse(caps.get(2)?.as_str()).ok()?;
    Some((operation, title))
}
