//! Export options.

use serde::{Deserialize, Serialize};

/// Inclusion flags for an export.
///
/// The continuous-narrative appendix is mutually exclusive with per-stage
/// titles; [`ExportOptions::normalized`] enforces the rule regardless of the
/// stored preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    /// Include the original raw idea section.
    pub include_original_idea: bool,
    /// Include a "Framework: …" subtitle.
    pub include_framework_title: bool,
    /// Include per-stage titles and descriptions.
    pub include_stage_titles: bool,
    /// Append the stages joined into one continuous narrative.
    pub include_continuous_narrative: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            include_original_idea: true,
            include_framework_title: true,
            include_stage_titles: true,
            include_continuous_narrative: false,
        }
    }
}

impl ExportOptions {
    /// Applies the mutual-exclusion rule: stage titles force the continuous
    /// narrative off.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        if self.include_stage_titles {
            self.include_continuous_narrative = false;
        }
        self
    }
}
