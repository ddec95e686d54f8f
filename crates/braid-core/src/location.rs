//! Source locations.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A line/column position within a source file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub line: u32,
    pub column: u32,
}

/// Identifies a span in a source file.
///
/// Positions are 1-based; `1:1` is the first character of the file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    /// The file the span points into.
    pub file_path: PathBuf,
    /// Start of the span.
    pub start: Location,
    /// End of the span, inclusive.
    pub end: Location,
}

impl SourceLocation {
    pub fn new(file_path: impl Into<PathBuf>, start: (u32, u32), end: (u32, u32)) -> Self {
        SourceLocation {
            file_path: file_path.into(),
            start: Location {
                line: start.0,
                column: start.1,
            },
            end: Location {
                line: end.0,
                column: end.1,
            },
        }
    }
}
