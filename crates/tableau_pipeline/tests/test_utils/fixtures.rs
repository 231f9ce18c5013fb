//! Storyboard fixture: a two-scene harbor story.
//!
//! Script element indices:
//!
//! ```text
//! 0 EXT. HARBOR - DAWN
//! 1 action    -> prompt "SCENE ONE"   (Ada)
//! 2 ADA: We're nearly there. Hold on.
//! 3 action    -> prompt "SCENE TWO"   (Ben)
//! 4 INT. LIGHTHOUSE - NIGHT
//! 5 action    -> prompt "SCENE THREE" (Ada, Ben)
//! 6 BEN: It's holding. For now.
//! ```

use serde_json::{Value, json};
use tableau_error::GenerationErrorKind;
use tableau_ingest::UploadedItem;

pub fn story_upload() -> UploadedItem {
    UploadedItem::new(
        "harbor.txt",
        b"Ada rows Ben out to the lighthouse before the storm.".to_vec(),
    )
}

pub fn ada_portrait() -> UploadedItem {
    UploadedItem::new("ada.png", b"uploaded-ada".to_vec())
}

pub fn story() -> Value {
    json!({
        "title": "Harbor Light",
        "logline": "Two keepers race a storm.",
        "setting": "A fishing harbor",
        "themes": ["duty"],
        "characters": ["Ada", "Ben"],
        "plot_points": ["They row out", "They light the lamp"]
    })
}

pub fn harbor_script() -> Value {
    json!({
        "title": "Harbor Light",
        "elements": [
            {"type": "scene_heading", "content": "EXT. HARBOR - DAWN"},
            {"type": "action", "content": "Ada rows toward the lighthouse."},
            {"type": "dialogue_block", "character": "Ada",
             "elements": [{"type": "dialogue", "content": "We're nearly there. Hold on."}]},
            {"type": "action", "content": "Ben lights the lamp."},
            {"type": "scene_heading", "content": "INT. LIGHTHOUSE - NIGHT"},
            {"type": "action", "content": "Rain hammers the window."},
            {"type": "dialogue_block", "character": "Ben",
             "elements": [
                {"type": "parenthetical", "content": "(grim)"},
                {"type": "dialogue", "content": "It's holding. For now."}
             ]}
        ]
    })
}

pub fn characters() -> Value {
    json!({
        "characters": [
            {"name": "Ada", "gender": "female", "other_descriptors": "oilskin coat"},
            {"name": "Ben", "gender": "male", "race": "human"}
        ]
    })
}

pub fn cohesive() -> Value {
    json!({
        "prompts": [
            {"scene_index": 1, "prompt": "SCENE ONE: a woman rowing", "characters": ["Ada"]},
            {"scene_index": 3, "prompt": "SCENE TWO: a man at the lamp", "characters": ["Ben"]},
            {"scene_index": 5, "prompt": "SCENE THREE: storm at the window", "characters": ["ADA", "Ben", "Gull"]}
        ]
    })
}

pub fn rewrites() -> Value {
    json!({
        "lines": [
            {"scene_index": 1, "text": "Almost there."},
            {"scene_index": 3, "text": "Almost there. Again."},
            {"scene_index": 5, "text": "Holding."}
        ]
    })
}

/// Responses for a full run, with `rewrite` as the final answer.
pub fn harbor_run(rewrite: Result<Value, GenerationErrorKind>) -> Vec<Result<Value, GenerationErrorKind>> {
    vec![
        Ok(story()),
        Ok(harbor_script()),
        Ok(characters()),
        Ok(cohesive()),
        rewrite,
    ]
}

/// A script with actions but no dialogue at all.
pub fn action_only_story() -> Vec<Result<Value, GenerationErrorKind>> {
    vec![
        Ok(story()),
        Ok(json!({
            "title": "Quiet",
            "elements": [
                {"type": "scene_heading", "content": "EXT. SHORE - DAY"},
                {"type": "action", "content": "Waves roll in."}
            ]
        })),
        Ok(json!({"characters": []})),
        Ok(json!({"prompts": [{"scene_index": 1, "prompt": "SCENE ONE: waves"}]})),
    ]
}
