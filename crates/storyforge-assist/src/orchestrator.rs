//! The assist orchestrator.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use storyforge_catalog::{Framework, Stage};
use storyforge_core::error::DomainError;
use storyforge_core::json::parse_json;
use storyforge_core::provider::TextGenerator;

use crate::prompts;
use crate::types::{OutputMode, QuestionAnswer, StageContext};

/// What to insert for a stage the provider failed to cover.
#[derive(Debug, Clone, Copy)]
enum MissingFill {
    /// An explicit placeholder: generation was requested and failed.
    Placeholder,
    /// An empty string: there was simply nothing to map.
    Empty,
}

/// Stateless orchestrator over the text-generation provider.
#[derive(Clone)]
pub struct AssistOrchestrator {
    provider: Arc<dyn TextGenerator>,
}

impl AssistOrchestrator {
    /// Creates an orchestrator over the given provider.
    #[must_use]
    pub fn new(provider: Arc<dyn TextGenerator>) -> Self {
        Self { provider }
    }

    /// Generates 3–4 clarifying questions for one stage.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Provider` on transport failure, unparseable
    /// JSON, or a response without a `questions` array.
    pub async fn clarifying_questions(
        &self,
        ctx: &StageContext,
        instruction: Option<&str>,
    ) -> Result<Vec<String>, DomainError> {
        let raw = self
            .provider
            .generate(prompts::clarifying_questions(ctx, instruction))
            .await?;
        let value = parse_json(&raw)?;

        let Some(entries) = value.get("questions").and_then(Value::as_array) else {
            return Err(DomainError::Provider(
                "unexpected format for questions: expected {\"questions\": [...]}".into(),
            ));
        };

        Ok(entries
            .iter()
            .filter_map(|entry| entry.as_str().map(str::to_owned))
            .collect())
    }

    /// Generates a suggestion for one stage in the given output mode.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Provider` on transport failure or an empty
    /// response.
    pub async fn single_stage_suggestion(
        &self,
        ctx: &StageContext,
        mode: OutputMode,
        answers: &[QuestionAnswer],
        instruction: Option<&str>,
    ) -> Result<String, DomainError> {
        let text = self
            .provider
            .generate(prompts::single_stage(ctx, mode, answers, instruction))
            .await?;
        if text.trim().is_empty() {
            return Err(DomainError::Provider(
                "provider returned no text for the stage suggestion".into(),
            ));
        }
        Ok(text)
    }

    /// Drafts every stage of the framework from a raw idea.
    ///
    /// A blank idea short-circuits to an all-empty mapping without calling
    /// the provider. The result always carries a key for every stage:
    /// stages the provider failed to cover are placeholder-filled.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Provider` on transport failure or a response
    /// that is not a JSON object.
    pub async fn full_draft_from_idea(
        &self,
        framework: &Framework,
        raw_idea: &str,
        mode: OutputMode,
        instruction: Option<&str>,
    ) -> Result<HashMap<String, String>, DomainError> {
        if raw_idea.trim().is_empty() {
            return Ok(framework.empty_content());
        }

        let raw = self
            .provider
            .generate(prompts::full_draft(framework, raw_idea, mode, instruction))
            .await?;
        let value = parse_json(&raw)?;
        let requested: Vec<&Stage> = framework.stages.iter().collect();
        validated_stage_map(&value, &requested, MissingFill::Placeholder, mode, "full draft")
    }

    /// Generates content for only the currently-empty stages, preserving
    /// everything already written.
    ///
    /// Returns a mapping covering exactly the empty stages; if none are
    /// empty, returns an empty mapping without calling the provider.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Provider` on transport failure or a response
    /// that is not a JSON object.
    pub async fn complete_remaining_stages(
        &self,
        framework: &Framework,
        existing: &HashMap<String, String>,
        mode: OutputMode,
        instruction: Option<&str>,
    ) -> Result<HashMap<String, String>, DomainError> {
        let is_empty = |stage: &Stage| {
            existing
                .get(&stage.id)
                .is_none_or(|content| content.trim().is_empty())
        };

        let empty: Vec<&Stage> = framework.stages.iter().filter(|s| is_empty(s)).collect();
        if empty.is_empty() {
            return Ok(HashMap::new());
        }

        let filled: Vec<(usize, &str)> = framework
            .stages
            .iter()
            .enumerate()
            .filter(|(_, stage)| !is_empty(stage))
            .map(|(index, stage)| (index, existing[&stage.id].as_str()))
            .collect();

        let raw = self
            .provider
            .generate(prompts::complete_remaining(
                framework,
                &filled,
                &empty,
                mode,
                instruction,
            ))
            .await?;
        let value = parse_json(&raw)?;
        validated_stage_map(&value, &empty, MissingFill::Placeholder, mode, "stage completion")
    }

    /// Distributes a raw idea across the framework's stages. This is mapping,
    /// not generation: stages the idea does not reach stay empty.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Provider` on transport failure or a response
    /// that is not a JSON object.
    pub async fn map_idea_to_framework(
        &self,
        raw_idea: &str,
        framework: &Framework,
    ) -> Result<HashMap<String, String>, DomainError> {
        if raw_idea.trim().is_empty() {
            return Ok(framework.empty_content());
        }

        let raw = self
            .provider
            .generate(prompts::map_idea(framework, raw_idea))
            .await?;
        let value = parse_json(&raw)?;
        let requested: Vec<&Stage> = framework.stages.iter().collect();
        validated_stage_map(
            &value,
            &requested,
            MissingFill::Empty,
            OutputMode::Creative,
            "idea mapping",
        )
    }
}

fn placeholder(stage: &Stage, mode: OutputMode) -> String {
    format!(
        "[AI content for {} ({} mode) was not generated or was in an invalid format.]",
        stage.name, mode
    )
}

/// Checks a strict-JSON stage mapping key by key. A requested stage that is
/// missing or not a string is filled per `on_missing` and logged, never
/// silently dropped. Keys the response invents are logged and never trusted
/// into the result.
fn validated_stage_map(
    value: &Value,
    requested: &[&Stage],
    on_missing: MissingFill,
    mode: OutputMode,
    operation: &str,
) -> Result<HashMap<String, String>, DomainError> {
    let Value::Object(map) = value else {
        return Err(DomainError::Provider(format!(
            "unexpected format for {operation}: expected a JSON object keyed by stage id"
        )));
    };

    let mut result = HashMap::new();
    for stage in requested {
        match map.get(&stage.id) {
            Some(Value::String(text)) => {
                result.insert(stage.id.clone(), text.clone());
            }
            _ => {
                tracing::warn!(
                    stage_id = %stage.id,
                    operation,
                    "provider response missing or invalid for stage"
                );
                let fill = match on_missing {
                    MissingFill::Placeholder => placeholder(stage, mode),
                    MissingFill::Empty => String::new(),
                };
                result.insert(stage.id.clone(), fill);
            }
        }
    }

    for key in map.keys() {
        if !requested.iter().any(|stage| stage.id == *key) {
            tracing::warn!(key = %key, operation, "ignoring unrecognized stage key in response");
        }
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use storyforge_catalog::Catalog;
    use storyforge_core::provider::ResponseFormat;
    use storyforge_test_support::ScriptedTextGenerator;

    use super::*;

    fn orchestrator_with(provider: Arc<ScriptedTextGenerator>) -> AssistOrchestrator {
        AssistOrchestrator::new(provider)
    }

    fn stage_ctx() -> StageContext {
        StageContext {
            stage_name: "8. The Ordeal".to_owned(),
            stage_description: "The hero faces a major crisis.".to_owned(),
            story_context: "A reluctant blacksmith left her village.".to_owned(),
        }
    }

    fn framework() -> Framework {
        Catalog::builtin().unwrap().get("sixStagePlot").unwrap().clone()
    }

    #[tokio::test]
    async fn test_clarifying_questions_parses_fenced_json() {
        let provider = Arc::new(ScriptedTextGenerator::new());
        provider.push_text(
            "```json\n{\"questions\": [\"What breaks?\", \"Who watches?\", 3, \"Why now?\"]}\n```",
        );
        let orchestrator = orchestrator_with(provider.clone());

        let questions = orchestrator
            .clarifying_questions(&stage_ctx(), None)
            .await
            .unwrap();

        // Non-string entries are dropped, order is preserved.
        assert_eq!(questions, vec!["What breaks?", "Who watches?", "Why now?"]);

        let request = &provider.requests()[0];
        assert_eq!(request.response_format, ResponseFormat::Json);
        assert!((request.temperature - 0.5).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn test_clarifying_questions_rejects_wrong_shape() {
        let provider = Arc::new(ScriptedTextGenerator::new());
        provider.push_text("{\"prompts\": []}");
        let orchestrator = orchestrator_with(provider);

        let result = orchestrator.clarifying_questions(&stage_ctx(), None).await;

        assert!(matches!(result, Err(DomainError::Provider(_))));
    }

    #[tokio::test]
    async fn test_single_stage_temperature_tracks_mode() {
        let provider = Arc::new(ScriptedTextGenerator::new());
        provider.push_text("The forge glows.");
        provider.push_text("* Beat one\n* Beat two");
        let orchestrator = orchestrator_with(provider.clone());

        orchestrator
            .single_stage_suggestion(&stage_ctx(), OutputMode::Creative, &[], None)
            .await
            .unwrap();
        orchestrator
            .single_stage_suggestion(&stage_ctx(), OutputMode::Outline, &[], None)
            .await
            .unwrap();

        let requests = provider.requests();
        assert!((requests[0].temperature - 0.7).abs() < f32::EPSILON);
        assert!((requests[1].temperature - 0.5).abs() < f32::EPSILON);
        assert_eq!(requests[0].top_k, Some(40));
        assert_eq!(requests[0].response_format, ResponseFormat::Text);
    }

    #[tokio::test]
    async fn test_single_stage_folds_answers_into_prompt() {
        let provider = Arc::new(ScriptedTextGenerator::new());
        provider.push_text("text");
        let orchestrator = orchestrator_with(provider.clone());

        let answers = vec![QuestionAnswer {
            question: "What does she fear?".to_owned(),
            answer: String::new(),
        }];
        orchestrator
            .single_stage_suggestion(&stage_ctx(), OutputMode::Creative, &answers, Some("keep it short"))
            .await
            .unwrap();

        let request = &provider.requests()[0];
        assert!(request.user_content.contains("Q1: What does she fear?"));
        assert!(request.user_content.contains("(No answer provided)"));
        assert!(request.user_content.contains("keep it short"));
    }

    #[tokio::test]
    async fn test_full_draft_covers_every_stage_with_placeholder_fill() {
        let framework = framework();
        let provider = Arc::new(ScriptedTextGenerator::new());
        // Covers two stages, misses the rest, and invents one key.
        provider.push_text(
            "{\"setup\": \"She mends plows.\", \"newSituation\": \"A dragon writ arrives.\", \"epilogue\": \"ignored\"}",
        );
        let orchestrator = orchestrator_with(provider);

        let draft = orchestrator
            .full_draft_from_idea(&framework, "A blacksmith is drafted to slay a dragon", OutputMode::Creative, None)
            .await
            .unwrap();

        assert_eq!(draft.len(), framework.stages.len());
        assert_eq!(draft["setup"], "She mends plows.");
        assert!(draft["turningPoint1"].starts_with("[AI content for"));
        assert!(draft["turningPoint1"].contains("(creative mode)"));
        assert!(!draft.contains_key("epilogue"));
    }

    #[tokio::test]
    async fn test_full_draft_blank_idea_short_circuits() {
        let framework = framework();
        let provider = Arc::new(ScriptedTextGenerator::new());
        let orchestrator = orchestrator_with(provider.clone());

        let draft = orchestrator
            .full_draft_from_idea(&framework, "   ", OutputMode::Creative, None)
            .await
            .unwrap();

        assert_eq!(provider.call_count(), 0);
        assert_eq!(draft.len(), framework.stages.len());
        assert!(draft.values().all(String::is_empty));
    }

    #[tokio::test]
    async fn test_complete_remaining_requests_only_empty_stages() {
        let framework = framework();
        let provider = Arc::new(ScriptedTextGenerator::new());
        provider.push_text(
            "{\"turningPoint1\": \"She commits.\", \"risingAction\": \"Trials mount.\", \"turningPoint2\": \"All is lost.\", \"climaxAndResolution\": \"The dragon yields.\", \"setup\": \"overwrite attempt\"}",
        );
        let orchestrator = orchestrator_with(provider.clone());

        let existing = HashMap::from([
            ("setup".to_owned(), "She mends plows.".to_owned()),
            ("newSituation".to_owned(), "A dragon writ arrives.".to_owned()),
            ("turningPoint1".to_owned(), "   ".to_owned()),
        ]);

        let completed = orchestrator
            .complete_remaining_stages(&framework, &existing, OutputMode::Creative, None)
            .await
            .unwrap();

        // Whitespace-only counts as empty; filled stages never come back.
        assert_eq!(completed.len(), 4);
        assert!(!completed.contains_key("setup"));
        assert!(!completed.contains_key("newSituation"));
        assert_eq!(completed["turningPoint1"], "She commits.");

        // The prompt names only the empty stages as targets.
        let request = &provider.requests()[0];
        assert!(request.system_instruction.contains("Stage ID \"risingAction\""));
    }

    #[tokio::test]
    async fn test_complete_remaining_with_nothing_empty_skips_provider() {
        let framework = framework();
        let provider = Arc::new(ScriptedTextGenerator::new());
        let orchestrator = orchestrator_with(provider.clone());

        let existing: HashMap<String, String> = framework
            .stages
            .iter()
            .map(|s| (s.id.clone(), format!("{} text", s.name)))
            .collect();

        let completed = orchestrator
            .complete_remaining_stages(&framework, &existing, OutputMode::Creative, None)
            .await
            .unwrap();

        assert!(completed.is_empty());
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_complete_remaining_placeholder_fills_missing_targets() {
        let framework = framework();
        let provider = Arc::new(ScriptedTextGenerator::new());
        provider.push_text("{}");
        let orchestrator = orchestrator_with(provider);

        let existing = HashMap::from([("setup".to_owned(), "text".to_owned())]);
        let completed = orchestrator
            .complete_remaining_stages(&framework, &existing, OutputMode::Outline, None)
            .await
            .unwrap();

        assert_eq!(completed.len(), framework.stages.len() - 1);
        assert!(completed["risingAction"].contains("(outline mode)"));
    }

    #[tokio::test]
    async fn test_map_idea_fills_missing_stages_with_empty_strings() {
        let framework = framework();
        let provider = Arc::new(ScriptedTextGenerator::new());
        provider.push_text("{\"setup\": \"The village forge.\"}");
        let orchestrator = orchestrator_with(provider);

        let mapped = orchestrator
            .map_idea_to_framework("A blacksmith and a dragon", &framework)
            .await
            .unwrap();

        assert_eq!(mapped.len(), framework.stages.len());
        assert_eq!(mapped["setup"], "The village forge.");
        assert_eq!(mapped["climaxAndResolution"], "");
    }

    #[tokio::test]
    async fn test_transport_failure_surfaces_as_one_error() {
        let framework = framework();
        let provider = Arc::new(ScriptedTextGenerator::new());
        provider.push_error("connection reset by peer");
        let orchestrator = orchestrator_with(provider.clone());

        let result = orchestrator
            .full_draft_from_idea(&framework, "an idea", OutputMode::Creative, None)
            .await;

        assert!(matches!(result, Err(DomainError::Provider(_))));
        // No retry: exactly one provider call.
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_non_object_response_is_rejected() {
        let framework = framework();
        let provider = Arc::new(ScriptedTextGenerator::new());
        provider.push_text("[\"not\", \"an\", \"object\"]");
        let orchestrator = orchestrator_with(provider);

        let result = orchestrator
            .map_idea_to_framework("an idea", &framework)
            .await;

        assert!(matches!(result, Err(DomainError::Provider(_))));
    }
}
