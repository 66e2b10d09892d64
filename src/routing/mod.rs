//! Routing module
//!
//! Maps request paths onto the three page operations.

mod matcher;

use std::fmt;

pub use matcher::match_path;

/// Page operation named by the first path segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    View,
    Edit,
    Save,
}

impl Operation {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "view" => Some(Self::View),
            "edit" => Some(Self::Edit),
            "save" => Some(Self::Save),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Edit => "edit",
            Self::Save => "save",
        }
    }

    /// Location of this operation for a title, e.g. `/edit/Home`
    pub fn path_for(self, title: &str) -> String {
        format!("/{}/{title}", self.name())
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
