//! Sequential scene generation with a continuity baton.

use crate::report::{EntryStatus, GenerationReport, Stage};
use tableau_core::{GeneratedSceneImage, ImageRequest, ReferenceImage, Script};
use tableau_error::{GenerationError, GenerationErrorKind, TableauResult};
use tableau_interface::ImageGeneration;
use tracing::{debug, info, instrument, warn};

/// Action elements chosen for generation, split at the cap.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SceneSelection {
    /// Scene indices to generate, ascending
    pub selected: Vec<usize>,
    /// Eligible scene indices beyond the cap, ascending
    pub over_capacity: Vec<usize>,
}

/// Select the first `cap` action elements of `script`.
///
/// # Examples
///
/// ```
/// use tableau_core::{SceneElement, Script};
/// use tableau_pipeline::select_scenes;
///
/// let action = |s: &str| SceneElement::Action { content: s.into() };
/// let script = Script::new("t", vec![action("a"), action("b"), action("c")]);
///
/// let selection = select_scenes(&script, 2);
/// assert_eq!(selection.selected, vec![0, 1]);
/// assert_eq!(selection.over_capacity, vec![2]);
/// ```
pub fn select_scenes(script: &Script, cap: usize) -> SceneSelection {
    let mut eligible = script.action_indices();
    let over_capacity = eligible.split_off(cap.min(eligible.len()));
    SceneSelection {
        selected: eligible,
        over_capacity,
    }
}

/// Everything needed to request one scene image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenePlan {
    /// Scene index of the action element
    pub scene_index: usize,
    /// Image prompt
    pub prompt: String,
    /// Resolved character references
    pub references: Vec<ReferenceImage>,
}

/// Result of one link in the chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneOutcome {
    /// An image was produced
    Generated {
        /// Scene index
        scene_index: usize,
        /// Whether safety filtering altered the request
        safety_altered: bool,
    },
    /// The request was blocked by content-safety filtering
    SafetyBlocked {
        /// Scene index
        scene_index: usize,
        /// Service detail
        message: String,
    },
    /// The request failed
    Failed {
        /// Scene index
        scene_index: usize,
        /// Failure detail
        message: String,
    },
}

impl SceneOutcome {
    /// Scene index this outcome belongs to.
    pub fn scene_index(&self) -> usize {
        match self {
            SceneOutcome::Generated { scene_index, .. }
            | SceneOutcome::SafetyBlocked { scene_index, .. }
            | SceneOutcome::Failed { scene_index, .. } => *scene_index,
        }
    }

    /// Whether safety filtering was involved.
    pub fn is_safety_flagged(&self) -> bool {
        matches!(
            self,
            SceneOutcome::SafetyBlocked { .. }
                | SceneOutcome::Generated {
                    safety_altered: true,
                    ..
                }
        )
    }
}

/// Fold accumulator: the continuity baton plus everything produced so far.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChainState {
    /// Most recent successful image; failed scenes never replace it
    pub last_successful: Option<ReferenceImage>,
    /// Successful images in ascending scene order
    pub results: Vec<GeneratedSceneImage>,
    /// One outcome per attempted scene
    pub outcomes: Vec<SceneOutcome>,
}

/// Drives scene generation one request at a time.
///
/// Each request carries the last successful image as its continuity
/// reference, so requests cannot overlap.
pub struct ContinuityChain<'a> {
    generator: &'a dyn ImageGeneration,
    style: &'a str,
    aspect_ratio: &'a str,
}

impl<'a> ContinuityChain<'a> {
    /// Create a chain over `generator`.
    pub fn new(generator: &'a dyn ImageGeneration, style: &'a str, aspect_ratio: &'a str) -> Self {
        Self {
            generator,
            style,
            aspect_ratio,
        }
    }

    /// Generate every plan in ascending scene order.
    ///
    /// Per-scene failures are recorded and skipped. Authentication failures
    /// abort the chain and are returned as-is.
    #[instrument(skip_all, fields(scenes = plans.len()))]
    pub async fn run(
        &self,
        mut plans: Vec<ScenePlan>,
        report: &mut GenerationReport,
    ) -> TableauResult<ChainState> {
        plans.sort_by_key(|plan| plan.scene_index);

        let mut state = ChainState::default();
        for plan in plans {
            state = self.step(state, plan, report).await?;
        }

        info!(
            generated = state.results.len(),
            attempted = state.outcomes.len(),
            "Continuity chain finished"
        );
        Ok(state)
    }

    #[instrument(skip_all, fields(scene_index = plan.scene_index, continuity = state.last_successful.is_some()))]
    async fn step(
        &self,
        mut state: ChainState,
        plan: ScenePlan,
        report: &mut GenerationReport,
    ) -> TableauResult<ChainState> {
        let scene_index = plan.scene_index;
        let request = ImageRequest::builder()
            .prompt(plan.prompt.clone())
            .references(plan.references)
            .continuity(state.last_successful.clone())
            .style(self.style)
            .aspect_ratio(self.aspect_ratio)
            .build()
            .map_err(|e| GenerationError::new(GenerationErrorKind::Service(e.to_string())))?;

        let outcome = match self.generator.generate_image(&request).await {
            Err(e) if e.is_authentication() => return Err(e),
            Err(e) if e.is_safety_rejection() => SceneOutcome::SafetyBlocked {
                scene_index,
                message: e.to_string(),
            },
            Err(e) => SceneOutcome::Failed {
                scene_index,
                message: e.to_string(),
            },
            Ok(response) => match response.image {
                Some(image) => {
                    state.last_successful = Some(ReferenceImage {
                        name: format!("scene {}", scene_index),
                        data: image.data.clone(),
                        mime_type: image.mime_type.clone(),
                    });
                    state.results.push(GeneratedSceneImage {
                        scene_index,
                        image: image.data,
                        mime_type: image.mime_type,
                        prompt: plan.prompt,
                    });
                    SceneOutcome::Generated {
                        scene_index,
                        safety_altered: response.safety_blocked,
                    }
                }
                None if response.safety_blocked => SceneOutcome::SafetyBlocked {
                    scene_index,
                    message: "no image returned, request blocked by safety filter".to_string(),
                },
                None => SceneOutcome::Failed {
                    scene_index,
                    message: GenerationErrorKind::EmptyPayload(format!("scene {}", scene_index))
                        .to_string(),
                },
            },
        };

        match &outcome {
            SceneOutcome::Generated { safety_altered, .. } => {
                debug!("Scene image generated");
                let continuity = if request.continuity().is_some() {
                    " and continuity"
                } else {
                    ""
                };
                let note = if *safety_altered {
                    " (request altered by safety filter)"
                } else {
                    ""
                };
                report.record(
                    Stage::GenerateSceneImages,
                    EntryStatus::Succeeded,
                    format!(
                        "Scene {} generated with {} reference(s){}{}",
                        scene_index,
                        request.references().len(),
                        continuity,
                        note
                    ),
                );
            }
            SceneOutcome::SafetyBlocked { message, .. } => {
                warn!(message = %message, "Scene image blocked by safety filter");
                report.record(
                    Stage::GenerateSceneImages,
                    EntryStatus::SafetyBlocked,
                    format!("Scene {} skipped: {}", scene_index, message),
                );
            }
            SceneOutcome::Failed { message, .. } => {
                warn!(message = %message, "Scene image generation failed");
                report.record(
                    Stage::GenerateSceneImages,
                    EntryStatus::Failed,
                    format!("Scene {} skipped: {}", scene_index, message),
                );
            }
        }

        state.outcomes.push(outcome);
        Ok(state)
    }
}
