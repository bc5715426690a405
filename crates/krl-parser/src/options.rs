//! Per-call parser configuration

use serde::{Deserialize, Serialize};

/// Options for [`crate::parse_with_options`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Name shown in rendered diagnostics (`file.krl:4:12`)
    pub filename: Option<String>,
}

impl ParseOptions {
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }
}
