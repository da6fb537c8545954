//! Prompt composition.
//!
//! Sampling parameters are fixed per operation: creative generation runs
//! hotter than structural output, and every strict-JSON operation pins the
//! expected document shape in its system instruction.

use std::fmt::Write as _;

use storyforge_catalog::Framework;
use storyforge_core::provider::{GenerationRequest, ResponseFormat};

use crate::types::{OutputMode, QuestionAnswer, StageContext};

const PRESENT_TENSE: &str = " Always write in the present tense, as if the events are unfolding in real time, like the story is happening right in front of you. This is a strict requirement.";

const PRESENT_TENSE_BULK: &str = "All story content MUST be written in the present tense, as if the events are unfolding in real time. This is a strict requirement for each stage's content.";

fn context_or_fallback(story_context: &str) -> &str {
    if story_context.trim().is_empty() {
        "No prior context provided."
    } else {
        story_context
    }
}

fn stage_roster(framework: &Framework) -> String {
    framework
        .stages
        .iter()
        .map(|s| format!("- Stage ID \"{}\": \"{}\" (Description: {})", s.id, s.name, s.description))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Request for 3–4 clarifying questions about one stage.
pub fn clarifying_questions(ctx: &StageContext, instruction: Option<&str>) -> GenerationRequest {
    let instruction_line = instruction.map_or(String::new(), |text| {
        format!("Consider this specific instruction from the user: \"{text}\"\n")
    });

    let system = format!(
        "You are an AI assistant specialized in creative writing and story structure. Your task is to help a writer flesh out a specific stage of their story by generating insightful questions.\n\n\
         The writer is working on the \"{name}\" stage.\n\
         The description of this stage is: \"{description}\"\n\
         The story context developed so far is:\n\"{context}\"\n\
         {instruction_line}\n\
         Based on this, generate 3 to 4 open-ended questions that will prompt the user to think critically and creatively about this specific stage. The questions should be tailored to the essence of the stage.\n\
         Respond ONLY with a JSON object containing a single key \"questions\" which is an array of strings.",
        name = ctx.stage_name,
        description = ctx.stage_description,
        context = context_or_fallback(&ctx.story_context),
    );

    GenerationRequest::new(
        system,
        "Please generate questions based on the system instruction.",
        ResponseFormat::Json,
        0.5,
    )
}

/// Request for one stage's suggestion in the given output mode.
pub fn single_stage(
    ctx: &StageContext,
    mode: OutputMode,
    answers: &[QuestionAnswer],
    instruction: Option<&str>,
) -> GenerationRequest {
    let mut base = format!(
        "I am working on the \"{name}\" stage of my story.\n\
         Stage Description: {description}\n\
         The story context from previous and current user inputs is:\n{context}\n\n",
        name = ctx.stage_name,
        description = ctx.stage_description,
        context = context_or_fallback(&ctx.story_context),
    );

    if !answers.is_empty() {
        base.push_str("Based on my answers to these clarifying questions:\n");
        for (index, qa) in answers.iter().enumerate() {
            let answer = if qa.answer.is_empty() {
                "(No answer provided)"
            } else {
                &qa.answer
            };
            let _ = writeln!(base, "Q{n}: {q}\nA{n}: {a}", n = index + 1, q = qa.question, a = answer);
        }
        base.push('\n');
    }

    if let Some(text) = instruction {
        let _ = writeln!(base, "Specific instruction for this generation: {text}\n");
    }

    let (system, user) = match mode {
        OutputMode::Outline => (
            format!(
                "You are a master story structuralist and creative writer. Your task is to generate a concise, narrative bullet-point outline for the story stage: \"{name}\".\n\
                 This outline should describe 2-4 key events, character actions, or plot points that happen within this stage, as if you are summarizing the core beats of the story itself.\n\
                 It should be a creative scaffold, not instructional advice.\n\
                 The stage is described as: \"{description}\".\n\
                 Format the output with clear bullet points.\n\
                 Respond ONLY with the bullet-point outline itself, without any introductory phrases, explanations, or conversational filler.",
                name = ctx.stage_name,
                description = ctx.stage_description,
            ),
            format!("{base}Generate the narrative outline now."),
        ),
        OutputMode::Prompt => (
            format!(
                "You are an insightful writing coach. Your task is to provide 2-3 thought-provoking guiding questions or prompts to help a writer creatively develop the story stage: \"{name}\".\n\
                 These prompts should inspire the writer to think about character motivations, plot progression, thematic elements, or descriptive details relevant to this stage.\n\
                 The stage is described as: \"{description}\".\n\
                 Do not write the story content. Respond ONLY with the list of 2-3 questions/prompts, each on a new line.",
                name = ctx.stage_name,
                description = ctx.stage_description,
            ),
            format!("{base}Generate the guiding prompts now."),
        ),
        OutputMode::Creative => (
            format!(
                "You are a helpful writing assistant. Directly generate a story segment for the specified stage. Format with clear paragraphs. Your output must be only the story segment itself, without any introductory phrases, explanations, or conversational filler.{PRESENT_TENSE}"
            ),
            format!(
                "{base}Now, please generate a compelling story segment for the \"{name}\" stage, incorporating all the provided information. Ensure the story segment itself is well-paragraphed.",
                name = ctx.stage_name,
            ),
        ),
    };

    let temperature = if mode == OutputMode::Creative { 0.7 } else { 0.5 };
    GenerationRequest::new(system, user, ResponseFormat::Text, temperature).with_sampling(40, 0.95)
}

fn bulk_mode_task(mode: OutputMode) -> String {
    match mode {
        OutputMode::Outline => "generate a concise, narrative bullet-point outline for EACH stage, describing 2-4 key events, character actions, or plot points that happen within each stage, as if you are summarizing the core beats of the story itself. The outlines should be creative scaffolds, not instructional advice.".to_owned(),
        OutputMode::Prompt => "generate 2-3 insightful guiding questions or thought-provoking prompts for EACH stage to help the user think about how to approach writing that stage.".to_owned(),
        OutputMode::Creative => format!(
            "generate compelling story content for EACH stage, formatted with clear paragraphs. {PRESENT_TENSE_BULK}"
        ),
    }
}

/// Request for a full draft across every stage, from a raw idea.
pub fn full_draft(
    framework: &Framework,
    raw_idea: &str,
    mode: OutputMode,
    instruction: Option<&str>,
) -> GenerationRequest {
    let system = format!(
        "You are an AI story generation assistant. The user will provide a raw story idea, a target story framework (with its name, description, and a list of stages, each stage having an ID, name, and description), and optionally, some overall instructions.\n\
         Your task is to {task} of the framework, based on the raw story idea and the user's instructions. The generated content for each stage should be detailed and well-written according to the requested mode.\n\
         The output MUST be a valid JSON object where keys are the stage IDs from the provided framework, and values are the generated strings for those respective stages.\n\
         Do not include any other text, explanations, or markdown formatting around the JSON object. Ensure each stage receives substantial, relevant content based on the overall idea and requested mode.",
        task = bulk_mode_task(mode),
    );

    let user = format!(
        "Raw Story Idea:\n--- IDEA START ---\n{raw_idea}\n--- IDEA END ---\n\n\
         Framework: {name} ({description})\n\
         Stages:\n{roster}\n\n\
         Output Mode Requested: {mode}\n\
         User Instructions for entire story (if any): {instructions}\n\n\
         Please generate the full story draft according to these details and the system instruction.",
        name = framework.name,
        description = framework.description,
        roster = stage_roster(framework),
        instructions = instruction.unwrap_or(
            "None. Focus on creativity and adherence to the framework structure and selected output mode based on the idea."
        ),
    );

    let temperature = if mode == OutputMode::Creative { 0.75 } else { 0.6 };
    GenerationRequest::new(system, user, ResponseFormat::Json, temperature).with_sampling(40, 0.95)
}

/// Request to complete only the currently-empty stages.
///
/// `filled` carries `(stage index into the framework, content)` pairs for
/// stages that already hold text; `empty` lists the stages to generate.
pub fn complete_remaining(
    framework: &Framework,
    filled: &[(usize, &str)],
    empty: &[&storyforge_catalog::Stage],
    mode: OutputMode,
    instruction: Option<&str>,
) -> GenerationRequest {
    let filled_details = if filled.is_empty() {
        "No prior content provided for filled stages.".to_owned()
    } else {
        filled
            .iter()
            .map(|&(index, content)| {
                let stage = &framework.stages[index];
                format!(
                    "Stage: {name} (ID: {id})\nDescription: {description}\nContent:\n{content}\n---",
                    name = stage.name,
                    id = stage.id,
                    description = stage.description,
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    };

    let empty_details = empty
        .iter()
        .map(|s| format!("- Stage ID \"{}\": \"{}\" (Description: {})", s.id, s.name, s.description))
        .collect::<Vec<_>>()
        .join("\n");

    let system = format!(
        "You are an AI story generation assistant. The user is partially through writing a story using the \"{name}\" framework and needs help completing the remaining stages.\n\
         Framework Description: \"{description}\"\n\n\
         Existing Story Content (if any):\n{filled_details}\n\n\
         Remaining Stages to Generate Content For:\n{empty_details}\n\n\
         Output Mode Requested: {mode}\n\
         User Instructions for completing story (if any): {instructions}\n\n\
         Your task is to {task}.\n\
         The output MUST be a valid JSON object where keys are the stage IDs of ONLY THE NEWLY GENERATED STAGES (the remaining stages listed above), and values are the generated strings for those respective stages.\n\
         Do not include stages for which content was already provided by the user in your JSON response.\n\
         Ensure each generated stage receives substantial, relevant content.",
        name = framework.name,
        description = framework.description,
        instructions = instruction.unwrap_or(
            "None. Focus on creativity, logical continuation from existing content, adherence to the framework structure, and the selected output mode."
        ),
        task = bulk_mode_task(mode),
    );

    let user = "Based on the existing story content and the framework details, please generate content for the remaining empty stages as per the system instruction.";

    let temperature = if mode == OutputMode::Creative { 0.75 } else { 0.6 };
    GenerationRequest::new(system, user, ResponseFormat::Json, temperature).with_sampling(40, 0.95)
}

/// Request to distribute a raw idea across a framework's stages.
pub fn map_idea(framework: &Framework, raw_idea: &str) -> GenerationRequest {
    let system = format!(
        "You are an expert story analyst and structuralist.\n\
         The user has provided a raw story idea and a target story framework. Your task is to intelligently map the user's story idea to the different stages of the provided framework.\n\n\
         The user's raw story idea is:\n--- IDEA START ---\n{raw_idea}\n--- IDEA END ---\n\n\
         The target story framework is \"{name}\", described as: \"{description}\".\n\
         The stages of this framework (with their IDs) are:\n{roster}\n\n\
         Analyze the raw story idea and distribute its content across these stages.\n\
         For each stage ID, provide the relevant segment of the story idea that fits that stage.\n\
         If a part of the idea seems to span multiple stages, try to break it down logically.\n\
         If a stage has no direct corresponding content in the idea, leave its content as an empty string. Focus on extracting existing content.\n\n\
         Respond ONLY with a JSON object. The keys of this object MUST be the stage IDs. The values should be the story content assigned to each stage as a string.\n\
         Ensure the output is a single, valid JSON object and nothing else.",
        name = framework.name,
        description = framework.description,
        roster = stage_roster(framework),
    );

    GenerationRequest::new(
        system,
        "Please map the idea to the framework based on the system instruction.",
        ResponseFormat::Json,
        0.3,
    )
}
