//! Fuzzy resolution of character names to image references.

use crate::matcher::distance;
use tableau_core::{CharacterReference, ReferenceSet};
use tracing::debug;

/// Default acceptance threshold for `distance / max_len`.
pub const DEFAULT_MATCH_THRESHOLD: f64 = 0.5;

/// Strip every non-alphanumeric character and lowercase the rest.
///
/// # Examples
///
/// ```
/// use tableau_pipeline::normalize;
///
/// assert_eq!(normalize("Jane-Doe 2"), "janedoe2");
/// ```
pub fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// A successful match.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution<'a> {
    /// The matched reference
    pub reference: &'a CharacterReference,
    /// Edit distance between the normalized names
    pub distance: usize,
    /// `distance / max(len(query), len(candidate))`
    pub ratio: f64,
}

/// References resolved for one scene.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneReferences<'a> {
    /// Matched references, one per distinct reference, in query order
    pub resolved: Vec<&'a CharacterReference>,
    /// Names that did not match anything
    pub unresolved: Vec<String>,
}

/// Maps names from generated prompts to the best available reference.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceResolver {
    threshold: f64,
}

impl Default for ReferenceResolver {
    fn default() -> Self {
        Self::new(DEFAULT_MATCH_THRESHOLD)
    }
}

impl ReferenceResolver {
    /// Resolver accepting matches with ratio strictly below `threshold`.
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// Acceptance threshold.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Resolve one name.
    ///
    /// The candidate with the smallest edit distance wins; ties go to the
    /// earliest candidate in the set's iteration order. Returns `None` when
    /// the set is empty, the query normalizes to nothing, or the best ratio
    /// is not below the threshold.
    pub fn resolve<'a>(&self, query: &str, references: &'a ReferenceSet) -> Option<Resolution<'a>> {
        let query = normalize(query);
        if references.is_empty() || query.is_empty() {
            return None;
        }

        let mut best: Option<(&'a CharacterReference, String, usize)> = None;
        for reference in references.iter() {
            let candidate = normalize(&reference.key());
            let d = distance(&query, &candidate);
            if best.as_ref().is_none_or(|(_, _, best_d)| d < *best_d) {
                best = Some((reference, candidate, d));
            }
        }

        let (reference, candidate, d) = best?;
        let max_len = query.chars().count().max(candidate.chars().count());
        let ratio = d as f64 / max_len as f64;
        if ratio < self.threshold {
            Some(Resolution {
                reference,
                distance: d,
                ratio,
            })
        } else {
            debug!(query = %query, candidate = %candidate, ratio, "Best match rejected");
            None
        }
    }

    /// The reference whose normalized name equals `name`'s, if any.
    ///
    /// Unlike [`resolve`](Self::resolve) this never accepts a near miss, so
    /// "Mary" is not covered by a reference named "Mark".
    pub fn exact<'a>(&self, name: &str, references: &'a ReferenceSet) -> Option<&'a CharacterReference> {
        let name = normalize(name);
        if name.is_empty() {
            return None;
        }
        references
            .iter()
            .find(|reference| normalize(&reference.key()) == name)
    }

    /// Resolve every name mentioned in one scene.
    pub fn resolve_scene<'a, S: AsRef<str>>(
        &self,
        names: &[S],
        references: &'a ReferenceSet,
    ) -> SceneReferences<'a> {
        let mut scene = SceneReferences::default();
        for name in names {
            match self.resolve(name.as_ref(), references) {
                Some(resolution) => {
                    let key = resolution.reference.key();
                    if !scene.resolved.iter().any(|r| r.key() == key) {
                        scene.resolved.push(resolution.reference);
                    }
                }
                None => scene.unresolved.push(name.as_ref().to_string()),
            }
        }
        scene
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tableau_core::ReferenceOrigin;

    fn set(names: &[&str]) -> ReferenceSet {
        let mut set = ReferenceSet::new();
        for (i, name) in names.iter().enumerate() {
            set.insert(CharacterReference::new(
                *name,
                vec![i as u8],
                "image/png",
                ReferenceOrigin::Uploaded,
            ));
        }
        set
    }

    #[test]
    fn normalize_is_idempotent() {
        for s in ["Jane-Doe 2", "  O'Brien ", "Dr. Ada LOVELACE", "", "---"] {
            assert_eq!(normalize(&normalize(s)), normalize(s));
        }
        assert_eq!(normalize("Jane-Doe 2"), "janedoe2");
    }

    #[test]
    fn exact_name_resolves() {
        let refs = set(&["jane", "john"]);
        let hit = ReferenceResolver::default().resolve("Jane", &refs).unwrap();
        assert_eq!(hit.reference.name(), "jane");
        assert_eq!(hit.distance, 0);
    }

    #[test]
    fn distant_name_is_unresolved() {
        let refs = set(&["jane", "john"]);
        assert!(ReferenceResolver::default().resolve("Xyzzy", &refs).is_none());
    }

    #[test]
    fn punctuation_and_case_are_ignored() {
        let refs = set(&["Mary_Ann"]);
        assert!(ReferenceResolver::default().resolve("MARY ANN", &refs).is_some());
    }

    #[test]
    fn ties_go_to_first_candidate() {
        let refs = set(&["jana", "jano"]);
        let hit = ReferenceResolver::default().resolve("jan", &refs).unwrap();
        assert_eq!(hit.reference.name(), "jana");
    }

    #[test]
    fn empty_inputs_short_circuit() {
        let refs = set(&["jane"]);
        assert!(ReferenceResolver::default().resolve("!!!", &refs).is_none());
        assert!(ReferenceResolver::default().resolve("jane", &ReferenceSet::new()).is_none());
    }

    #[test]
    fn ratio_must_be_strictly_below_threshold() {
        // "ab" vs "ax": distance 1, ratio exactly 0.5
        let refs = set(&["ab"]);
        assert!(ReferenceResolver::default().resolve("ax", &refs).is_none());
        assert!(ReferenceResolver::new(0.51).resolve("ax", &refs).is_some());
    }

    #[test]
    fn exact_lookup_rejects_near_misses() {
        let refs = set(&["mark", "jane_doe"]);
        let resolver = ReferenceResolver::default();
        assert!(resolver.resolve("Mary", &refs).is_some());
        assert!(resolver.exact("Mary", &refs).is_none());
        assert_eq!(resolver.exact("MARK", &refs).map(|r| r.name().as_str()), Some("mark"));
        assert_eq!(resolver.exact("Jane Doe", &refs).map(|r| r.name().as_str()), Some("jane_doe"));
        assert!(resolver.exact("...", &refs).is_none());
    }

    #[test]
    fn scene_resolution_dedupes_and_collects_misses() {
        let refs = set(&["jane", "john"]);
        let scene = ReferenceResolver::default().resolve_scene(&["Jane", "JANE.", "Xyzzy"], &refs);
        assert_eq!(scene.resolved.len(), 1);
        assert_eq!(scene.unresolved, vec!["Xyzzy".to_string()]);
    }
}
