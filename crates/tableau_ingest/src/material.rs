//! Ingestion results and the deterministic merge.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use tableau_core::{CharacterReference, ReferenceOrigin, ReferenceSet, reference_key};

/// A named text blob.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct TextBlob {
    /// Upload or archive entry name
    name: String,
    /// Decoded text
    text: String,
}

impl TextBlob {
    /// Create a text blob.
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}

/// A named character image.
///
/// The character name is the file stem, e.g. `cast/Jane Doe.png` is a
/// reference for "Jane Doe".
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct ImageBlob {
    /// Upload or archive entry name
    name: String,
    /// Character name derived from the file stem
    character: String,
    /// Encoded image bytes
    bytes: Vec<u8>,
    /// MIME type inferred from the extension
    mime_type: String,
}

impl ImageBlob {
    /// Create an image blob.
    pub fn new(
        name: impl Into<String>,
        character: impl Into<String>,
        bytes: Vec<u8>,
        mime_type: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            character: character.into(),
            bytes,
            mime_type: mime_type.into(),
        }
    }
}

/// An upload or archive entry that was not used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IgnoredItem {
    /// Upload or archive entry name
    pub name: String,
    /// Why it was ignored
    pub reason: String,
}

/// A later item replaced an earlier one with the same normalized key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyCollision {
    /// Normalized key both items mapped to
    pub key: String,
    /// Name of the item that was kept
    pub kept: String,
    /// Name of the item that was overwritten
    pub replaced: String,
}

/// One classified unit produced while processing an upload.
#[derive(Debug, Clone)]
pub(crate) enum Ingested {
    Text(TextBlob),
    Image(ImageBlob),
    Ignored(IgnoredItem),
}

impl Ingested {
    pub(crate) fn ignored(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Ingested::Ignored(IgnoredItem {
            name: name.into(),
            reason: reason.into(),
        })
    }
}

/// Everything ingestion produced for one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Getters)]
pub struct IngestedMaterial {
    /// Text blobs keyed by normalized entry name, in first-seen order
    texts: Vec<TextBlob>,
    /// Images keyed by normalized character name, in first-seen order
    images: Vec<ImageBlob>,
    /// Items that were skipped
    ignored: Vec<IgnoredItem>,
    /// Overwrites that happened during the merge
    collisions: Vec<KeyCollision>,
}

impl IngestedMaterial {
    /// Merge classified units in the given order.
    pub(crate) fn merge(units: impl IntoIterator<Item = Ingested>) -> Self {
        let mut material = Self::default();
        for unit in units {
            match unit {
                Ingested::Text(blob) => material.insert_text(blob),
                Ingested::Image(blob) => material.insert_image(blob),
                Ingested::Ignored(item) => material.ignored.push(item),
            }
        }
        material
    }

    fn insert_text(&mut self, blob: TextBlob) {
        let key = reference_key(blob.name());
        match self
            .texts
            .iter_mut()
            .find(|existing| reference_key(existing.name()) == key)
        {
            Some(existing) => {
                let replaced = std::mem::replace(existing, blob);
                self.collisions.push(KeyCollision {
                    key,
                    kept: existing.name.clone(),
                    replaced: replaced.name,
                });
            }
            None => self.texts.push(blob),
        }
    }

    fn insert_image(&mut self, blob: ImageBlob) {
        let key = reference_key(blob.character());
        match self
            .images
            .iter_mut()
            .find(|existing| reference_key(existing.character()) == key)
        {
            Some(existing) => {
                let replaced = std::mem::replace(existing, blob);
                self.collisions.push(KeyCollision {
                    key,
                    kept: existing.name.clone(),
                    replaced: replaced.name,
                });
            }
            None => self.images.push(blob),
        }
    }

    /// All text blobs joined in order, each preceded by its name.
    ///
    /// Returns an empty string when no text was ingested.
    pub fn combined_text(&self) -> String {
        self.texts
            .iter()
            .map(|blob| format!("--- {} ---\n{}", blob.name, blob.text.trim()))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Whether any non-blank text was ingested.
    pub fn has_text(&self) -> bool {
        self.texts.iter().any(|blob| !blob.text.trim().is_empty())
    }

    /// Uploaded images as character references.
    pub fn references(&self) -> ReferenceSet {
        let mut set = ReferenceSet::new();
        for image in &self.images {
            set.insert(CharacterReference::new(
                image.character.clone(),
                image.bytes.clone(),
                image.mime_type.clone(),
                ReferenceOrigin::Uploaded,
            ));
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_image_overwrites_and_records_collision() {
        let material = IngestedMaterial::merge(vec![
            Ingested::Image(ImageBlob::new("Jane.png", "Jane", vec![1], "image/png")),
            Ingested::Image(ImageBlob::new("cast/jane.jpg", "jane", vec![2], "image/jpeg")),
        ]);

        assert_eq!(material.images().len(), 1);
        assert_eq!(material.images()[0].bytes(), &vec![2]);
        assert_eq!(
            material.collisions(),
            &vec![KeyCollision {
                key: "jane".to_string(),
                kept: "cast/jane.jpg".to_string(),
                replaced: "Jane.png".to_string(),
            }]
        );
    }

    #[test]
    fn combined_text_keeps_upload_order() {
        let material = IngestedMaterial::merge(vec![
            Ingested::Text(TextBlob::new("b.txt", "second")),
            Ingested::Text(TextBlob::new("a.txt", "first")),
        ]);
        let combined = material.combined_text();
        assert!(combined.find("second") < combined.find("first"));
        assert!(material.has_text());
    }

    #[test]
    fn blank_text_does_not_count() {
        let material = IngestedMaterial::merge(vec![Ingested::Text(TextBlob::new("a.txt", "  \n"))]);
        assert!(!material.has_text());
    }
}
