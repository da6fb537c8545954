//! Assist request types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// What shape of text the provider is asked to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Narrative prose.
    Creative,
    /// Bullet-point outline.
    Outline,
    /// Guiding questions for the user to write from.
    Prompt,
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Creative => "creative",
            Self::Outline => "outline",
            Self::Prompt => "prompt",
        };
        f.write_str(label)
    }
}

/// One answered clarifying question, folded into a follow-up generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionAnswer {
    /// The question that was asked.
    pub question: String,
    /// The user's answer (may be empty).
    pub answer: String,
}

/// The stage being worked on, with whatever story context exists so far.
#[derive(Debug, Clone)]
pub struct StageContext {
    /// Display name of the stage.
    pub stage_name: String,
    /// What belongs in the stage.
    pub stage_description: String,
    /// Story context assembled from prior and current user input.
    pub story_context: String,
}
