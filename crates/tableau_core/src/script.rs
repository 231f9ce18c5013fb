//! Script and scene element types.
//!
//! A [`Script`] is produced once per run and never renumbered: the position
//! of an element in [`Script::elements`] is its scene index, the identity
//! every downstream stage keys on.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// Kind of a dialogue part inside a dialogue block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "snake_case")]
pub enum DialoguePartKind {
    /// Stage direction for the speaker, e.g. "(whispering)"
    #[display("parenthetical")]
    Parenthetical,
    /// Spoken line
    #[display("dialogue")]
    Dialogue,
}

/// One ordered part of a dialogue block.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DialoguePart {
    /// Whether this is a parenthetical or a spoken line
    #[serde(rename = "type")]
    pub kind: DialoguePartKind,
    /// Text content
    pub content: String,
}

impl DialoguePart {
    /// Create a spoken line.
    pub fn dialogue(content: impl Into<String>) -> Self {
        Self {
            kind: DialoguePartKind::Dialogue,
            content: content.into(),
        }
    }

    /// Create a parenthetical.
    pub fn parenthetical(content: impl Into<String>) -> Self {
        Self {
            kind: DialoguePartKind::Parenthetical,
            content: content.into(),
        }
    }
}

/// Discriminant of a [`SceneElement`], without its payload.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::EnumIter,
    derive_more::Display,
)]
pub enum SceneElementKind {
    /// Scene heading (slugline)
    #[display("scene_heading")]
    SceneHeading,
    /// Action line
    #[display("action")]
    Action,
    /// Transition, e.g. "CUT TO:"
    #[display("transition")]
    Transition,
    /// Character dialogue block
    #[display("dialogue_block")]
    DialogueBlock,
}

/// One ordered unit of a generated script.
///
/// Only [`SceneElement::Action`] seeds image generation and only
/// [`SceneElement::DialogueBlock`] seeds dialogue association.
///
/// # Examples
///
/// ```
/// use tableau_core::{DialoguePart, SceneElement};
///
/// let json = r#"{"type": "dialogue_block", "character": "Jane",
///               "elements": [{"type": "dialogue", "content": "Hello."}]}"#;
/// let element: SceneElement = serde_json::from_str(json).unwrap();
/// assert_eq!(element.first_dialogue(), Some(("Jane", "Hello.")));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SceneElement {
    /// Scene heading; marks a scene boundary
    SceneHeading {
        /// Heading text, e.g. "INT. KITCHEN - NIGHT"
        content: String,
    },
    /// Action line describing what is seen
    Action {
        /// Action text
        content: String,
    },
    /// Transition between scenes
    Transition {
        /// Transition text
        content: String,
    },
    /// A character speaking
    DialogueBlock {
        /// Speaking character as written in the script
        character: String,
        /// Parentheticals and spoken lines, in order
        elements: Vec<DialoguePart>,
    },
}

impl SceneElement {
    /// Get the element discriminant.
    pub fn kind(&self) -> SceneElementKind {
        match self {
            SceneElement::SceneHeading { .. } => SceneElementKind::SceneHeading,
            SceneElement::Action { .. } => SceneElementKind::Action,
            SceneElement::Transition { .. } => SceneElementKind::Transition,
            SceneElement::DialogueBlock { .. } => SceneElementKind::DialogueBlock,
        }
    }

    /// Whether this element is a scene boundary.
    pub fn is_scene_heading(&self) -> bool {
        matches!(self, SceneElement::SceneHeading { .. })
    }

    /// Action text, if this is an action line.
    pub fn action_text(&self) -> Option<&str> {
        match self {
            SceneElement::Action { content } => Some(content),
            _ => None,
        }
    }

    /// Speaker and first spoken line, if this is a dialogue block with at
    /// least one `dialogue` part.
    pub fn first_dialogue(&self) -> Option<(&str, &str)> {
        match self {
            SceneElement::DialogueBlock {
                character,
                elements,
            } => elements
                .iter()
                .find(|part| part.kind == DialoguePartKind::Dialogue)
                .map(|part| (character.as_str(), part.content.as_str())),
            _ => None,
        }
    }

    fn render(&self, out: &mut String) {
        match self {
            SceneElement::SceneHeading { content } => {
                out.push_str(&content.trim().to_uppercase());
                out.push('\n');
            }
            SceneElement::Action { content } => {
                out.push_str(content.trim());
                out.push('\n');
            }
            SceneElement::Transition { content } => {
                out.push_str(&" ".repeat(40));
                out.push_str(&content.trim().to_uppercase());
                out.push('\n');
            }
            SceneElement::DialogueBlock {
                character,
                elements,
            } => {
                out.push_str(&" ".repeat(20));
                out.push_str(&character.trim().to_uppercase());
                out.push('\n');
                for part in elements {
                    let text = part.content.trim();
                    match part.kind {
                        DialoguePartKind::Parenthetical => {
                            out.push_str(&" ".repeat(15));
                            if text.starts_with('(') {
                                out.push_str(text);
                            } else {
                                out.push('(');
                                out.push_str(text);
                                out.push(')');
                            }
                        }
                        DialoguePartKind::Dialogue => {
                            out.push_str(&" ".repeat(10));
                            out.push_str(text);
                        }
                    }
                    out.push('\n');
                }
            }
        }
    }
}

/// A generated narrative script.
///
/// Fields are read-only once constructed; the element position is the
/// stable scene index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct Script {
    /// Script title
    title: String,
    /// Ordered scene elements
    elements: Vec<SceneElement>,
}

impl Script {
    /// Create a script from its title and ordered elements.
    pub fn new(title: impl Into<String>, elements: Vec<SceneElement>) -> Self {
        Self {
            title: title.into(),
            elements,
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether the script has no elements.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Element at a scene index.
    pub fn element(&self, scene_index: usize) -> Option<&SceneElement> {
        self.elements.get(scene_index)
    }

    /// Scene indices of all action elements, ascending.
    pub fn action_indices(&self) -> Vec<usize> {
        self.elements
            .iter()
            .enumerate()
            .filter(|(_, element)| element.kind() == SceneElementKind::Action)
            .map(|(index, _)| index)
            .collect()
    }

    /// Distinct speaking characters in first-appearance order.
    ///
    /// Names are compared case-insensitively after trimming; the first
    /// spelling encountered is kept.
    pub fn speaking_characters(&self) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        let mut names = Vec::new();
        for element in &self.elements {
            if let SceneElement::DialogueBlock { character, .. } = element {
                let trimmed = character.trim();
                if !trimmed.is_empty() && seen.insert(trimmed.to_lowercase()) {
                    names.push(trimmed.to_string());
                }
            }
        }
        names
    }

    /// Render as a plain-text screenplay.
    ///
    /// # Examples
    ///
    /// ```
    /// use tableau_core::{Script, SceneElement};
    ///
    /// let script = Script::new("Dawn", vec![
    ///     SceneElement::SceneHeading { content: "ext. field - day".to_string() },
    ///     SceneElement::Action { content: "The sun rises.".to_string() },
    /// ]);
    /// let text = script.to_screenplay();
    /// assert!(text.contains("EXT. FIELD - DAY"));
    /// assert!(text.contains("The sun rises."));
    /// ```
    pub fn to_screenplay(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.title.trim().to_uppercase());
        out.push_str("\n\n");
        for element in &self.elements {
            element.render(&mut out);
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    fn sample() -> Script {
        Script::new(
            "Sample",
            vec![
                SceneElement::SceneHeading {
                    content: "INT. HALL - NIGHT".to_string(),
                },
                SceneElement::Action {
                    content: "Jane enters.".to_string(),
                },
                SceneElement::DialogueBlock {
                    character: "Jane".to_string(),
                    elements: vec![
                        DialoguePart::parenthetical("quietly"),
                        DialoguePart::dialogue("Is anyone here?"),
                    ],
                },
                SceneElement::DialogueBlock {
                    character: "JANE ".to_string(),
                    elements: vec![DialoguePart::dialogue("Hello?")],
                },
                SceneElement::Transition {
                    content: "cut to:".to_string(),
                },
                SceneElement::Action {
                    content: "Silence.".to_string(),
                },
            ],
        )
    }

    #[test]
    fn action_indices_follow_script_order() {
        assert_eq!(sample().action_indices(), vec![1, 5]);
    }

    #[test]
    fn speaking_characters_are_deduplicated_case_insensitively() {
        assert_eq!(sample().speaking_characters(), vec!["Jane".to_string()]);
    }

    #[test]
    fn first_dialogue_skips_parentheticals() {
        let script = sample();
        assert_eq!(
            script.element(2).and_then(SceneElement::first_dialogue),
            Some(("Jane", "Is anyone here?"))
        );
    }

    #[test]
    fn dialogue_block_without_spoken_line_has_no_first_dialogue() {
        let element = SceneElement::DialogueBlock {
            character: "Jane".to_string(),
            elements: vec![DialoguePart::parenthetical("sighs")],
        };
        assert_eq!(element.first_dialogue(), None);
    }

    #[test]
    fn every_kind_round_trips_through_json_tag() {
        let script = sample();
        let json = serde_json::to_value(&script).unwrap();
        let tags: Vec<&str> = json["elements"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|e| e["type"].as_str())
            .collect();
        for kind in SceneElementKind::iter() {
            assert!(tags.contains(&kind.to_string().as_str()), "missing {kind}");
        }
    }

    #[test]
    fn screenplay_wraps_bare_parentheticals() {
        let text = sample().to_screenplay();
        assert!(text.contains("(quietly)"));
        assert!(text.contains("CUT TO:"));
    }
}
