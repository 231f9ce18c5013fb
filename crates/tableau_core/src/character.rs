//! Character references and analysed characters.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// Canonical map key for a character name: trimmed and lowercased.
///
/// # Examples
///
/// ```
/// use tableau_core::reference_key;
///
/// assert_eq!(reference_key("  Jane Doe "), "jane doe");
/// ```
pub fn reference_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Where a character reference image came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceOrigin {
    /// Supplied by the user in the upload batch
    #[display("uploaded")]
    Uploaded,
    /// Produced by the portrait stage
    #[display("generated")]
    Generated,
}

/// An image reference for one character.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct CharacterReference {
    /// Display name
    name: String,
    /// Encoded image bytes
    image: Vec<u8>,
    /// MIME type of `image`
    mime_type: String,
    /// Provenance
    origin: ReferenceOrigin,
}

impl CharacterReference {
    /// Create a new reference.
    pub fn new(
        name: impl Into<String>,
        image: Vec<u8>,
        mime_type: impl Into<String>,
        origin: ReferenceOrigin,
    ) -> Self {
        Self {
            name: name.into(),
            image,
            mime_type: mime_type.into(),
            origin,
        }
    }

    /// Normalized map key for this reference.
    pub fn key(&self) -> String {
        reference_key(&self.name)
    }
}

/// Character references keyed by [`reference_key`], in insertion order.
///
/// Iteration order is the order in which keys were first inserted, which
/// makes tie-breaking during fuzzy resolution deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceSet {
    entries: Vec<CharacterReference>,
}

impl ReferenceSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the reference for its key.
    ///
    /// A replaced entry keeps its original position. Returns the replaced
    /// reference, if any.
    pub fn insert(&mut self, reference: CharacterReference) -> Option<CharacterReference> {
        let key = reference.key();
        match self.entries.iter_mut().find(|existing| existing.key() == key) {
            Some(existing) => Some(std::mem::replace(existing, reference)),
            None => {
                self.entries.push(reference);
                None
            }
        }
    }

    /// Insert only if no reference exists for the key.
    ///
    /// Returns `false` when an existing reference took precedence.
    pub fn insert_if_absent(&mut self, reference: CharacterReference) -> bool {
        if self.contains(reference.name()) {
            return false;
        }
        self.entries.push(reference);
        true
    }

    /// Look up by name (normalized).
    pub fn get(&self, name: &str) -> Option<&CharacterReference> {
        let key = reference_key(name);
        self.entries.iter().find(|reference| reference.key() == key)
    }

    /// Whether a reference exists for the name (normalized).
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterate in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &CharacterReference> {
        self.entries.iter()
    }

    /// Number of references.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// References with the given origin, in insertion order.
    pub fn with_origin(&self, origin: ReferenceOrigin) -> impl Iterator<Item = &CharacterReference> {
        self.entries
            .iter()
            .filter(move |reference| *reference.origin() == origin)
    }
}

/// A character as described by the analysis collaborator.
///
/// Only used to enrich description strings; never gates generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct AnalyzedCharacter {
    /// Character name
    name: String,
    /// Gender presentation
    #[serde(default)]
    gender: String,
    /// Ethnicity or species, if stated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    race: Option<String>,
    /// How the character sounds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    voice_description: Option<String>,
    /// Anything else visually relevant
    #[serde(default, skip_serializing_if = "Option::is_none")]
    other_descriptors: Option<String>,
}

impl AnalyzedCharacter {
    /// Create a character with only the required fields.
    pub fn new(name: impl Into<String>, gender: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            gender: gender.into(),
            race: None,
            voice_description: None,
            other_descriptors: None,
        }
    }

    /// Set the race descriptor.
    pub fn with_race(mut self, race: impl Into<String>) -> Self {
        self.race = Some(race.into());
        self
    }

    /// Set the voice description.
    pub fn with_voice_description(mut self, voice: impl Into<String>) -> Self {
        self.voice_description = Some(voice.into());
        self
    }

    /// Set other visual descriptors.
    pub fn with_other_descriptors(mut self, other: impl Into<String>) -> Self {
        self.other_descriptors = Some(other.into());
        self
    }

    /// One-line description used in prompts.
    ///
    /// # Examples
    ///
    /// ```
    /// use tableau_core::AnalyzedCharacter;
    ///
    /// let jane = AnalyzedCharacter::new("Jane", "female").with_other_descriptors("red coat");
    /// assert_eq!(jane.description(), "Jane (female; red coat)");
    /// ```
    pub fn description(&self) -> String {
        let details: Vec<&str> = [
            Some(self.gender.as_str()),
            self.race.as_deref(),
            self.other_descriptors.as_deref(),
        ]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|detail| !detail.is_empty())
        .collect();

        if details.is_empty() {
            self.name.clone()
        } else {
            format!("{} ({})", self.name, details.join("; "))
        }
    }
}
