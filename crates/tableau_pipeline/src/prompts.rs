//! Prompts, response schemas and payload parsing for the structured stages.
//!
//! Schemas use the uppercase type names of the Gemini `responseSchema`
//! dialect.

use serde::Deserialize;
use serde_json::{Value, json};
use tableau_core::{
    AnalyzedCharacter, CohesivePrompt, DialogueLine, SceneElement, Script, StoryElements,
    reference_key,
};
use tableau_error::GenerationErrorKind;

/// Result of parsing a structured payload.
pub type ParseResult<T> = Result<T, GenerationErrorKind>;

fn malformed(what: &str, e: impl std::fmt::Display) -> GenerationErrorKind {
    GenerationErrorKind::MalformedPayload(format!("{}: {}", what, e))
}

/// Prompt for extracting story elements.
pub fn story_prompt(source_text: &str) -> String {
    format!(
        "You are a story editor. Read the reference material below and extract its story elements: \
         a working title, a one-sentence logline, the setting, the main themes, every named character, \
         and the key plot points in order.\n\nREFERENCE MATERIAL:\n{}",
        source_text
    )
}

/// Schema for [`StoryElements`].
pub fn story_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "title": {"type": "STRING"},
            "logline": {"type": "STRING"},
            "setting": {"type": "STRING"},
            "themes": {"type": "ARRAY", "items": {"type": "STRING"}},
            "characters": {"type": "ARRAY", "items": {"type": "STRING"}},
            "plot_points": {"type": "ARRAY", "items": {"type": "STRING"}}
        },
        "required": ["title", "logline", "setting", "characters", "plot_points"]
    })
}

/// Parse story elements.
pub fn parse_story(value: Value) -> ParseResult<StoryElements> {
    let story: StoryElements = serde_json::from_value(value).map_err(|e| malformed("story", e))?;
    if story.title.trim().is_empty() {
        return Err(GenerationErrorKind::EmptyPayload("story title".to_string()));
    }
    Ok(story)
}

/// Prompt for writing the script.
pub fn script_prompt(story: &StoryElements, source_text: &str) -> String {
    format!(
        "You are a screenwriter. Write a short screenplay for the story below as an ordered list of \
         elements. Each element is one of: scene_heading (e.g. \"INT. KITCHEN - NIGHT\"), action \
         (a visual description of one moment that can be drawn as a single frame), dialogue_block \
         (a character name plus ordered parts of type dialogue or parenthetical), or transition \
         (e.g. \"CUT TO:\"). Start every scene with a scene_heading. Keep each action visual and \
         self-contained.\n\nTITLE: {}\nLOGLINE: {}\nSETTING: {}\nCHARACTERS: {}\nPLOT POINTS:\n{}\n\n\
         REFERENCE MATERIAL:\n{}",
        story.title,
        story.logline,
        story.setting,
        story.characters.join(", "),
        story
            .plot_points
            .iter()
            .enumerate()
            .map(|(i, point)| format!("{}. {}", i + 1, point))
            .collect::<Vec<_>>()
            .join("\n"),
        source_text
    )
}

/// Schema for a [`Script`].
pub fn script_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "title": {"type": "STRING"},
            "elements": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "type": {
                            "type": "STRING",
                            "enum": ["scene_heading", "action", "dialogue_block", "transition"]
                        },
                        "content": {"type": "STRING"},
                        "character": {"type": "STRING"},
                        "elements": {
                            "type": "ARRAY",
                            "items": {
                                "type": "OBJECT",
                                "properties": {
                                    "type": {"type": "STRING", "enum": ["dialogue", "parenthetical"]},
                                    "content": {"type": "STRING"}
                                },
                                "required": ["type", "content"]
                            }
                        }
                    },
                    "required": ["type"]
                }
            }
        },
        "required": ["title", "elements"]
    })
}

/// A parsed script plus the number of elements that had to be dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedScript {
    /// Script built from the usable elements
    pub script: Script,
    /// Elements that did not match any element shape
    pub dropped: usize,
}

#[derive(Deserialize)]
struct RawScript {
    title: String,
    #[serde(default)]
    elements: Vec<Value>,
}

/// Parse a script, dropping individual malformed elements.
///
/// Scene indices refer to positions in the returned script, so they are
/// assigned after malformed elements are removed.
pub fn parse_script(value: Value) -> ParseResult<ParsedScript> {
    let raw: RawScript = serde_json::from_value(value).map_err(|e| malformed("script", e))?;
    let total = raw.elements.len();
    let elements: Vec<SceneElement> = raw
        .elements
        .into_iter()
        .filter_map(|element| serde_json::from_value(element).ok())
        .collect();
    let dropped = total - elements.len();
    Ok(ParsedScript {
        script: Script::new(raw.title, elements),
        dropped,
    })
}

/// Prompt for describing the characters of a script.
pub fn characters_prompt(script: &Script, story: &StoryElements) -> String {
    let mut names = script.speaking_characters();
    for name in &story.characters {
        if !names.iter().any(|known| reference_key(known) == reference_key(name)) {
            names.push(name.clone());
        }
    }
    format!(
        "You are a casting director. For each character listed below, describe how they look so an \
         illustrator can draw them consistently: gender presentation, race or species if known, \
         voice, and other visual descriptors such as age, build, hair and clothing. Use the exact \
         names given.\n\nCHARACTERS: {}\n\nSCRIPT:\n{}",
        names.join(", "),
        script.to_screenplay()
    )
}

/// Schema for the character list.
pub fn characters_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "characters": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "name": {"type": "STRING"},
                        "gender": {"type": "STRING"},
                        "race": {"type": "STRING"},
                        "voice_description": {"type": "STRING"},
                        "other_descriptors": {"type": "STRING"}
                    },
                    "required": ["name", "gender"]
                }
            }
        },
        "required": ["characters"]
    })
}

#[derive(Deserialize)]
struct RawCharacters {
    characters: Vec<AnalyzedCharacter>,
}

/// Parse analysed characters, keeping the first entry per normalized name.
pub fn parse_characters(value: Value) -> ParseResult<Vec<AnalyzedCharacter>> {
    let raw: RawCharacters =
        serde_json::from_value(value).map_err(|e| malformed("characters", e))?;
    let mut characters: Vec<AnalyzedCharacter> = Vec::with_capacity(raw.characters.len());
    for character in raw.characters {
        let key = reference_key(character.name());
        if key.is_empty() || characters.iter().any(|c| reference_key(c.name()) == key) {
            continue;
        }
        characters.push(character);
    }
    Ok(characters)
}

/// Image prompt for a character portrait.
pub fn portrait_prompt(character: &AnalyzedCharacter) -> String {
    let mut prompt = format!(
        "Character reference portrait of {}. Head and shoulders, neutral background, even lighting, \
         facing the viewer.",
        character.description()
    );
    if let Some(voice) = character.voice_description() {
        prompt.push_str(&format!(" Their expression should suit a voice that is {}.", voice));
    }
    prompt
}

/// Prompt for turning selected action lines into image prompts.
pub fn cohesive_prompt(
    script: &Script,
    scene_indices: &[usize],
    characters: &[AnalyzedCharacter],
    style: &str,
) -> String {
    let cast = characters
        .iter()
        .map(|c| format!("- {}", c.description()))
        .collect::<Vec<_>>()
        .join("\n");
    let actions = scene_indices
        .iter()
        .filter_map(|&index| {
            script
                .element(index)
                .and_then(SceneElement::action_text)
                .map(|text| format!("[{}] {}", index, text))
        })
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "You are a storyboard artist. For each numbered action line below, write one self-contained \
         image prompt that depicts that moment, keeping characters, locations and lighting consistent \
         across the whole sequence. Describe characters by appearance, and list the names of the \
         characters visible in each frame. Return one entry per line, using the number in brackets \
         as scene_index. Visual style: {}.\n\nCAST:\n{}\n\nACTION LINES:\n{}\n\nFULL SCRIPT:\n{}",
        style,
        cast,
        actions,
        script.to_screenplay()
    )
}

/// Schema for the cohesive prompt list.
pub fn cohesive_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "prompts": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "scene_index": {"type": "INTEGER"},
                        "prompt": {"type": "STRING"},
                        "characters": {"type": "ARRAY", "items": {"type": "STRING"}}
                    },
                    "required": ["scene_index", "prompt"]
                }
            }
        },
        "required": ["prompts"]
    })
}

#[derive(Deserialize)]
struct RawPrompts {
    prompts: Vec<Value>,
}

/// Parse cohesive prompts for `selected` scenes.
///
/// Entries for unselected scenes, blank prompts and repeated scene indices
/// are discarded. An empty result is an error.
pub fn parse_cohesive(value: Value, selected: &[usize]) -> ParseResult<Vec<CohesivePrompt>> {
    let raw: RawPrompts =
        serde_json::from_value(value).map_err(|e| malformed("cohesive prompts", e))?;
    let mut prompts: Vec<CohesivePrompt> = Vec::new();
    for entry in raw.prompts {
        let Ok(prompt) = serde_json::from_value::<CohesivePrompt>(entry) else {
            continue;
        };
        let wanted = selected.contains(&prompt.scene_index);
        let seen = prompts.iter().any(|p| p.scene_index == prompt.scene_index);
        if wanted && !seen && !prompt.prompt.trim().is_empty() {
            prompts.push(prompt);
        }
    }
    if prompts.is_empty() {
        return Err(GenerationErrorKind::EmptyPayload("cohesive prompts".to_string()));
    }
    prompts.sort_by_key(|p| p.scene_index);
    Ok(prompts)
}

/// Prompt for rewriting associated dialogue.
///
/// Each line carries its occurrence count; repeated uses of the same source
/// line should escalate in self-awareness with every occurrence.
pub fn rewrite_prompt(lines: &[DialogueLine], story: &StoryElements) -> String {
    let listing = lines
        .iter()
        .map(|line| {
            format!(
                "[{}] {}: \"{}\" (occurrence {}{})",
                line.scene_index,
                line.character,
                line.text,
                line.occurrence,
                if line.is_duplicate {
                    ", reused line"
                } else {
                    ""
                }
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "You are a dialogue editor for a storyboard titled \"{}\". Rewrite each numbered line as a \
         single short caption of at most two sentences, in the speaker's voice. Lines marked as \
         reused accompany more than one frame: make each further occurrence increasingly \
         meta and self-referential, escalating with the occurrence number, so the repetition \
         reads as deliberate. Return one entry per line, using the number in brackets as \
         scene_index.\n\nLINES:\n{}",
        story.title, listing
    )
}

/// Schema for rewritten dialogue.
pub fn rewrite_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "lines": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "scene_index": {"type": "INTEGER"},
                        "text": {"type": "STRING"}
                    },
                    "required": ["scene_index", "text"]
                }
            }
        },
        "required": ["lines"]
    })
}

/// One rewritten line.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RewrittenLine {
    /// Scene index of the image the line belongs to
    pub scene_index: usize,
    /// New text
    pub text: String,
}

#[derive(Deserialize)]
struct RawRewrites {
    lines: Vec<Value>,
}

/// Parse rewritten lines, dropping malformed or blank entries.
pub fn parse_rewrites(value: Value) -> ParseResult<Vec<RewrittenLine>> {
    let raw: RawRewrites =
        serde_json::from_value(value).map_err(|e| malformed("dialogue rewrite", e))?;
    Ok(raw
        .lines
        .into_iter()
        .filter_map(|line| serde_json::from_value::<RewrittenLine>(line).ok())
        .filter(|line| !line.text.trim().is_empty())
        .collect())
}
