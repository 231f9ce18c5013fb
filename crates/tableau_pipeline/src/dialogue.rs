//! Scene to dialogue association and duplicate tracking.

use std::collections::HashMap;
use tableau_core::{DialogueLine, SceneElement, Script};

/// Dialogue found near an action element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Association {
    /// Speaking character, uppercased
    pub character: String,
    /// Text of the block's first dialogue part
    pub text: String,
    /// Scene index of the dialogue block
    pub source_element_index: usize,
}

fn dialogue_at(script: &Script, index: usize) -> Option<Association> {
    let (character, text) = script.element(index)?.first_dialogue()?;
    Some(Association {
        character: character.to_uppercase(),
        text: text.to_string(),
        source_element_index: index,
    })
}

/// Scan `indices` until a scene heading, returning the first dialogue.
fn scan(script: &Script, indices: impl Iterator<Item = usize>) -> Option<Association> {
    for index in indices {
        match script.element(index) {
            Some(SceneElement::SceneHeading { .. }) | None => return None,
            Some(SceneElement::DialogueBlock { .. }) => {
                if let Some(found) = dialogue_at(script, index) {
                    return Some(found);
                }
            }
            Some(SceneElement::Action { .. } | SceneElement::Transition { .. }) => {}
        }
    }
    None
}

/// Find the dialogue that accompanies the action at `scene_index`.
///
/// Scans forward first and stops at the next scene heading; if nothing is
/// found, scans backward and stops at the previous scene heading. Returns
/// `None` when `scene_index` is not an action element or neither direction
/// finds a dialogue block with a dialogue part.
///
/// # Examples
///
/// ```
/// use tableau_core::{DialoguePart, SceneElement, Script};
/// use tableau_pipeline::associate;
///
/// let script = Script::new("Pier", vec![
///     SceneElement::Action { content: "Waves crash.".into() },
///     SceneElement::DialogueBlock {
///         character: "Ada".into(),
///         elements: vec![DialoguePart::dialogue("Hold on!")],
///     },
/// ]);
///
/// let found = associate(&script, 0).unwrap();
/// assert_eq!(found.character, "ADA");
/// assert_eq!(found.source_element_index, 1);
/// ```
pub fn associate(script: &Script, scene_index: usize) -> Option<Association> {
    if !matches!(script.element(scene_index), Some(SceneElement::Action { .. })) {
        return None;
    }
    scan(script, scene_index + 1..script.len()).or_else(|| scan(script, (0..scene_index).rev()))
}

/// Per-run record of which dialogue blocks were already consumed.
///
/// Owned by one pipeline run and dropped with it.
#[derive(Debug, Clone, Default)]
pub struct DuplicateTracker {
    uses: HashMap<usize, usize>,
}

impl DuplicateTracker {
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a use of `source_element_index`, returning how many times it
    /// had been used before.
    pub fn record(&mut self, source_element_index: usize) -> usize {
        let uses = self.uses.entry(source_element_index).or_insert(0);
        let previous = *uses;
        *uses += 1;
        previous
    }

    /// Whether the block has been used at least once.
    pub fn is_consumed(&self, source_element_index: usize) -> bool {
        self.uses.contains_key(&source_element_index)
    }

    /// Turn an association into a dialogue line, classifying duplicates.
    pub fn line(&mut self, scene_index: usize, association: Association) -> DialogueLine {
        let occurrence = self.record(association.source_element_index);
        DialogueLine {
            scene_index,
            character: association.character,
            text: association.text,
            source_element_index: association.source_element_index,
            is_duplicate: occurrence > 0,
            occurrence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tableau_core::DialoguePart;

    fn action(text: &str) -> SceneElement {
        SceneElement::Action {
            content: text.to_string(),
        }
    }

    fn heading(text: &str) -> SceneElement {
        SceneElement::SceneHeading {
            content: text.to_string(),
        }
    }

    fn says(who: &str, text: &str) -> SceneElement {
        SceneElement::DialogueBlock {
            character: who.to_string(),
            elements: vec![DialoguePart::dialogue(text)],
        }
    }

    #[test]
    fn forward_match_stops_at_heading() {
        let script = Script::new(
            "t",
            vec![
                action("a0"),
                says("Ann", "Hi."),
                heading("EXT. ROAD"),
                action("a3"),
            ],
        );

        let first = associate(&script, 0).unwrap();
        assert_eq!(first.character, "ANN");
        assert_eq!(first.text, "Hi.");
        assert_eq!(first.source_element_index, 1);

        assert_eq!(associate(&script, 3), None);
    }

    #[test]
    fn backward_scan_used_when_forward_finds_nothing() {
        let script = Script::new(
            "t",
            vec![
                heading("INT. ROOM"),
                says("Bo", "Before."),
                action("a2"),
                heading("EXT. YARD"),
                says("Cy", "After heading."),
            ],
        );
        let found = associate(&script, 2).unwrap();
        assert_eq!(found.character, "BO");
    }

    #[test]
    fn backward_scan_stops_at_heading() {
        let script = Script::new(
            "t",
            vec![says("Bo", "Old scene."), heading("INT. ROOM"), action("a2")],
        );
        assert_eq!(associate(&script, 2), None);
    }

    #[test]
    fn parenthetical_only_blocks_are_skipped() {
        let script = Script::new(
            "t",
            vec![
                action("a0"),
                SceneElement::DialogueBlock {
                    character: "Dee".to_string(),
                    elements: vec![DialoguePart::parenthetical("sighs")],
                },
                says("Eve", "Finally."),
            ],
        );
        assert_eq!(associate(&script, 0).unwrap().source_element_index, 2);
    }

    #[test]
    fn non_action_index_has_no_association() {
        let script = Script::new("t", vec![says("Ann", "Hi."), action("a1")]);
        assert_eq!(associate(&script, 0), None);
        assert_eq!(associate(&script, 9), None);
    }

    #[test]
    fn tracker_counts_occurrences() {
        let mut tracker = DuplicateTracker::new();
        let assoc = Association {
            character: "ANN".to_string(),
            text: "Hi.".to_string(),
            source_element_index: 1,
        };

        let first = tracker.line(0, assoc.clone());
        let second = tracker.line(5, assoc.clone());
        let third = tracker.line(7, assoc);

        assert!(!first.is_duplicate);
        assert_eq!((second.is_duplicate, second.occurrence), (true, 1));
        assert_eq!((third.is_duplicate, third.occurrence), (true, 2));
        assert!(tracker.is_consumed(1));
        assert!(!tracker.is_consumed(2));
    }
}
