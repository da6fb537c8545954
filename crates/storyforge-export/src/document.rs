//! Document assembly and rendering.

use serde::{Deserialize, Serialize};
use storyforge_catalog::Framework;
use storyforge_projects::Project;

use crate::options::ExportOptions;

const NO_STAGE_CONTENT: &str = "[No content for this stage]";
const NO_NARRATIVE_CONTENT: &str = "[No story content available to form a continuous narrative.]";

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportFormat {
    /// GitHub-flavored Markdown.
    #[serde(rename = "markdown")]
    Markdown,
    /// Plain text with underlined headings.
    #[serde(rename = "text")]
    PlainText,
}

impl ExportFormat {
    fn extension(self) -> &'static str {
        match self {
            Self::Markdown => "md",
            Self::PlainText => "txt",
        }
    }
}

/// Format-independent document blocks, in render order.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Block {
    Title(String),
    Subtitle(String),
    Meta(String),
    Heading(String),
    Note(String),
    Paragraph(String),
    Placeholder(String),
    Break,
}

fn build_blocks(project: &Project, framework: &Framework, options: ExportOptions) -> Vec<Block> {
    let options = options.normalized();
    let mut blocks = vec![Block::Title(project.name.clone())];

    if options.include_framework_title {
        blocks.push(Block::Subtitle(format!("Framework: {}", framework.name)));
    }
    blocks.push(Block::Meta(format!(
        "Last Modified: {}",
        project.last_modified.format("%B %d, %Y %H:%M")
    )));

    if options.include_original_idea {
        if let Some(idea) = project.raw_story_idea.as_deref().filter(|i| !i.trim().is_empty()) {
            blocks.push(Block::Heading("Original Story Idea".to_owned()));
            for line in idea.lines().filter(|l| !l.trim().is_empty()) {
                blocks.push(Block::Paragraph(line.to_owned()));
            }
        }
    }

    // Segmented stage sections, always in framework order.
    for stage in &framework.stages {
        if options.include_stage_titles {
            blocks.push(Block::Heading(stage.name.clone()));
            blocks.push(Block::Note(stage.description.clone()));
        }

        let content = project.stage_content(&stage.id);
        if content.trim().is_empty() {
            if options.include_stage_titles {
                blocks.push(Block::Placeholder(NO_STAGE_CONTENT.to_owned()));
            }
        } else {
            for line in content.lines().filter(|l| !l.trim().is_empty()) {
                blocks.push(Block::Paragraph(line.to_owned()));
            }
        }
    }

    if options.include_continuous_narrative {
        blocks.push(Block::Break);
        blocks.push(Block::Heading("Continuous Narrative".to_owned()));

        let narrative = framework
            .stages
            .iter()
            .map(|stage| project.stage_content(&stage.id))
            .filter(|content| !content.trim().is_empty())
            .collect::<Vec<_>>()
            .join("\n\n");

        if narrative.is_empty() {
            blocks.push(Block::Placeholder(NO_NARRATIVE_CONTENT.to_owned()));
        } else {
            for line in narrative.lines().filter(|l| !l.trim().is_empty()) {
                blocks.push(Block::Paragraph(line.to_owned()));
            }
        }
    }

    blocks
}

fn render_markdown(blocks: &[Block]) -> String {
    let mut out = String::new();
    for block in blocks {
        match block {
            Block::Title(text) => out.push_str(&format!("# {text}\n\n")),
            Block::Subtitle(text) => out.push_str(&format!("## {text}\n\n")),
            Block::Meta(text) => out.push_str(&format!("*{text}*\n\n")),
            Block::Heading(text) => out.push_str(&format!("### {text}\n\n")),
            Block::Note(text) => out.push_str(&format!("_{text}_\n\n")),
            Block::Paragraph(text) => out.push_str(&format!("{text}\n\n")),
            Block::Placeholder(text) => out.push_str(&format!("*{text}*\n\n")),
            Block::Break => out.push_str("---\n\n"),
        }
    }
    out.trim_end().to_owned() + "\n"
}

fn underline(text: &str, with: char) -> String {
    format!("{text}\n{}\n\n", with.to_string().repeat(text.chars().count()))
}

fn render_plain(blocks: &[Block]) -> String {
    let mut out = String::new();
    for block in blocks {
        match block {
            Block::Title(text) => out.push_str(&underline(text, '=')),
            Block::Subtitle(text) | Block::Heading(text) => out.push_str(&underline(text, '-')),
            Block::Meta(text) | Block::Note(text) | Block::Placeholder(text) => {
                out.push_str(&format!("{text}\n\n"));
            }
            Block::Paragraph(text) => out.push_str(&format!("{text}\n\n")),
            Block::Break => out.push_str("* * *\n\n"),
        }
    }
    out.trim_end().to_owned() + "\n"
}

/// Renders a project to the requested format.
#[must_use]
pub fn render(
    project: &Project,
    framework: &Framework,
    options: ExportOptions,
    format: ExportFormat,
) -> String {
    let blocks = build_blocks(project, framework, options);
    match format {
        ExportFormat::Markdown => render_markdown(&blocks),
        ExportFormat::PlainText => render_plain(&blocks),
    }
}

/// Sanitizes a project name into a lowercase filename stem.
#[must_use]
pub fn safe_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-') {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}

/// Full export filename for a project.
#[must_use]
pub fn export_filename(project: &Project, format: ExportFormat) -> String {
    format!("{}.{}", safe_filename(&project.name), format.extension())
}
