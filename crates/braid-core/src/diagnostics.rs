//! User-facing diagnostics.
//!
//! Propagation reports problems in the user's code (a missing export, say)
//! as values rather than errors: the build keeps going degraded and the
//! caller renders the collected diagnostics at the end. The shape here is a
//! plain cloneable, serializable record so it can cross worker boundaries
//! with the graph snapshot.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::location::SourceLocation;

/// Diagnostic severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    Error,
    Warning,
}

/// A single problem found in the user's code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub message: String,
    pub severity: DiagnosticSeverity,
    /// File the problem was found in.
    pub file: Option<PathBuf>,
    /// Source frame to render under the message.
    pub loc: Option<SourceLocation>,
    pub help: Option<String>,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
            severity: DiagnosticSeverity::Error,
            file: None,
            loc: None,
            help: None,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Diagnostic {
            severity: DiagnosticSeverity::Warning,
            ..Diagnostic::error(message)
        }
    }

    pub fn with_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn with_loc(mut self, loc: SourceLocation) -> Self {
        self.loc = Some(loc);
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }
}
