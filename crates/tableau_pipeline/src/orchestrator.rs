//! Pipeline orchestration.
//!
//! Stages run strictly in order. Stages whose output later stages need are
//! fatal; per-item stages skip failed items; dialogue rewriting falls back
//! to a local first-sentence rule. Authentication failures always abort.

use crate::config::PipelineConfig;
use crate::continuity::{ChainState, ContinuityChain, ScenePlan, select_scenes};
use crate::dialogue::{DuplicateTracker, associate};
use crate::fallback::first_sentence;
use crate::prompts;
use crate::report::{EntryStatus, GenerationReport, Stage};
use crate::resolver::ReferenceResolver;
use derive_getters::Getters;
use futures::future::join_all;
use serde_json::Value;
use tableau_core::{
    AnalyzedCharacter, CharacterReference, CohesivePrompt, DialogueLine, GeneratedSceneImage,
    ImageRequest, ImageResponse, ReferenceImage, ReferenceOrigin, ReferenceSet, SceneElement,
    Script, StoryElements,
};
use tableau_error::{
    GenerationError, GenerationErrorKind, PipelineError, PipelineErrorKind, TableauError,
    TableauResult,
};
use tableau_ingest::{IgnoredItem, UploadedItem, ingest};
use tableau_interface::{ImageGeneration, StructuredGeneration};
use tracing::{debug, error, info, instrument, warn};

type StageResult<T> = Result<T, (Stage, TableauError)>;

/// Everything a successful run produced.
#[derive(Debug, Clone, Getters)]
pub struct GenerationArtifacts {
    /// Story elements from the analysis stage
    story: StoryElements,
    /// The generated script
    script: Script,
    /// Analysed characters
    characters: Vec<AnalyzedCharacter>,
    /// Uploaded and generated references, uploaded first
    references: ReferenceSet,
    /// Portraits generated in this run
    portraits: Vec<CharacterReference>,
    /// Image prompts for the selected scenes
    cohesive_prompts: Vec<CohesivePrompt>,
    /// Successful scene images, ascending by scene index
    scene_images: Vec<GeneratedSceneImage>,
    /// One dialogue line per associated scene
    dialogue: Vec<DialogueLine>,
    /// Eligible scenes beyond the cap
    skipped_for_capacity: Vec<usize>,
    /// Scenes blocked or altered by safety filtering
    safety_flagged_scenes: Vec<usize>,
    /// Characters whose portrait was blocked or altered by safety filtering
    safety_flagged_portraits: Vec<String>,
    /// Uploads that were not used
    ignored: Vec<IgnoredItem>,
    /// Full run transcript
    report: GenerationReport,
}

/// A run that stopped at a fatal stage.
///
/// The report covers every stage attempted before the failure and ends with
/// an `Aborted` entry.
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Pipeline failed at {}: {}", stage, error)]
pub struct PipelineFailure {
    /// Stage that failed
    pub stage: Stage,
    /// Underlying error
    #[error(source)]
    pub error: TableauError,
    /// Partial report
    pub report: GenerationReport,
}

impl PipelineFailure {
    /// Whether the run stopped because credentials were rejected.
    pub fn is_authentication(&self) -> bool {
        self.error.is_authentication()
    }
}

/// Intermediate results carried between stages of one run.
struct RunOutput {
    story: StoryElements,
    script: Script,
    characters: Vec<AnalyzedCharacter>,
    references: ReferenceSet,
    portraits: Vec<CharacterReference>,
    safety_flagged_portraits: Vec<String>,
    cohesive_prompts: Vec<CohesivePrompt>,
    chain: ChainState,
    skipped_for_capacity: Vec<usize>,
    dialogue: Vec<DialogueLine>,
    ignored: Vec<IgnoredItem>,
}

impl RunOutput {
    fn into_artifacts(self, report: GenerationReport) -> GenerationArtifacts {
        let safety_flagged_scenes = self
            .chain
            .outcomes
            .iter()
            .filter(|outcome| outcome.is_safety_flagged())
            .map(|outcome| outcome.scene_index())
            .collect();
        GenerationArtifacts {
            story: self.story,
            script: self.script,
            characters: self.characters,
            references: self.references,
            portraits: self.portraits,
            cohesive_prompts: self.cohesive_prompts,
            scene_images: self.chain.results,
            dialogue: self.dialogue,
            skipped_for_capacity: self.skipped_for_capacity,
            safety_flagged_scenes,
            safety_flagged_portraits: self.safety_flagged_portraits,
            ignored: self.ignored,
            report,
        }
    }
}

/// Portrait stage output.
struct Portraits {
    generated: Vec<CharacterReference>,
    safety_flagged: Vec<String>,
}

/// Drives one storyboard generation at a time.
///
/// `run` takes `&mut self`, so a pipeline can never have two runs in
/// flight. All per-run state lives inside the run.
pub struct Pipeline<T, I> {
    text: T,
    images: I,
    config: PipelineConfig,
    resolver: ReferenceResolver,
    runs: u64,
}

impl<T, I> Pipeline<T, I>
where
    T: StructuredGeneration,
    I: ImageGeneration,
{
    /// Create a pipeline over the given collaborators.
    pub fn new(text: T, images: I, config: PipelineConfig) -> Self {
        let resolver = ReferenceResolver::new(*config.match_threshold());
        Self {
            text,
            images,
            config,
            resolver,
            runs: 0,
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Text collaborator.
    pub fn text_service(&self) -> &T {
        &self.text
    }

    /// Image collaborator.
    pub fn image_service(&self) -> &I {
        &self.images
    }

    /// Number of runs started so far.
    pub fn runs(&self) -> u64 {
        self.runs
    }

    /// Run the full pipeline over a batch of uploads.
    ///
    /// # Errors
    ///
    /// Returns a [`PipelineFailure`] carrying the partial report when a
    /// fatal stage fails or credentials are rejected.
    #[instrument(skip_all, fields(run = self.runs + 1, uploads = uploads.len()))]
    pub async fn run(
        &mut self,
        uploads: Vec<UploadedItem>,
    ) -> Result<GenerationArtifacts, PipelineFailure> {
        self.runs += 1;
        let mut report = GenerationReport::new();

        match self.execute(uploads, &mut report).await {
            Ok(output) => {
                info!(
                    scenes = output.chain.results.len(),
                    portraits = output.portraits.len(),
                    dialogue = output.dialogue.len(),
                    "Pipeline run complete"
                );
                Ok(output.into_artifacts(report))
            }
            Err((stage, error)) => {
                error!(stage = %stage, error = %error, "Pipeline run aborted");
                report.record(stage, EntryStatus::Aborted, format!("Run aborted: {}", error));
                Err(PipelineFailure {
                    stage,
                    error,
                    report,
                })
            }
        }
    }

    async fn execute(
        &self,
        uploads: Vec<UploadedItem>,
        report: &mut GenerationReport,
    ) -> StageResult<RunOutput> {
        // Ingest
        report.record(
            Stage::Ingest,
            EntryStatus::Started,
            format!("{} upload(s)", uploads.len()),
        );
        let material = ingest(uploads).await;
        for item in material.ignored() {
            report.record(
                Stage::Ingest,
                EntryStatus::Skipped,
                format!("Ignored {}: {}", item.name, item.reason),
            );
        }
        for collision in material.collisions() {
            report.record(
                Stage::Ingest,
                EntryStatus::Info,
                format!(
                    "{} replaced {} (both map to '{}')",
                    collision.kept, collision.replaced, collision.key
                ),
            );
        }
        if !material.has_text() {
            return Err((
                Stage::Ingest,
                PipelineError::new(PipelineErrorKind::NoSourceText).into(),
            ));
        }
        let source_text = material.combined_text();
        let mut references = material.references();
        report.record(
            Stage::Ingest,
            EntryStatus::Succeeded,
            format!(
                "{} text file(s) ({} chars), {} character image(s)",
                material.texts().len(),
                source_text.len(),
                references.len()
            ),
        );

        // AnalyzeStory
        let story = self
            .structured(
                Stage::AnalyzeStory,
                prompts::story_prompt(&source_text),
                prompts::story_schema(),
                prompts::parse_story,
                report,
            )
            .await
            .map_err(|e| (Stage::AnalyzeStory, e))?;
        report.record(
            Stage::AnalyzeStory,
            EntryStatus::Succeeded,
            format!(
                "'{}': {} character(s), {} plot point(s)",
                story.title,
                story.characters.len(),
                story.plot_points.len()
            ),
        );

        // GenerateScript
        let script = self
            .generate_script(&story, &source_text, report)
            .await
            .map_err(|e| (Stage::GenerateScript, e))?;

        // AnalyzeCharacters
        let characters = self
            .structured(
                Stage::AnalyzeCharacters,
                prompts::characters_prompt(&script, &story),
                prompts::characters_schema(),
                prompts::parse_characters,
                report,
            )
            .await
            .map_err(|e| (Stage::AnalyzeCharacters, e))?;
        report.record(
            Stage::AnalyzeCharacters,
            EntryStatus::Succeeded,
            format!(
                "{} character(s): {}",
                characters.len(),
                characters
                    .iter()
                    .map(|c| c.name().as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        );

        // GeneratePortraits
        let portraits = self
            .generate_portraits(&characters, &mut references, report)
            .await
            .map_err(|e| (Stage::GeneratePortraits, e))?;

        // GenerateCohesivePrompts
        let selection = select_scenes(&script, *self.config.max_scene_images());
        let cohesive_prompts = self
            .generate_cohesive_prompts(&script, &selection.selected, &characters, report)
            .await
            .map_err(|e| (Stage::GenerateCohesivePrompts, e))?;

        // GenerateSceneImages
        report.record(
            Stage::GenerateSceneImages,
            EntryStatus::Started,
            format!(
                "{} scene(s) selected, cap {}",
                selection.selected.len(),
                self.config.max_scene_images()
            ),
        );
        for scene_index in &selection.over_capacity {
            report.record(
                Stage::GenerateSceneImages,
                EntryStatus::Skipped,
                format!("Scene {} skipped for capacity", scene_index),
            );
        }
        let plans = self.plan_scenes(&script, &selection.selected, &cohesive_prompts, &references, report);
        let chain = ContinuityChain::new(
            &self.images,
            self.config.style(),
            self.config.aspect_ratio(),
        )
        .run(plans, report)
        .await
        .map_err(|e| (Stage::GenerateSceneImages, e))?;
        report.record(
            Stage::GenerateSceneImages,
            EntryStatus::Succeeded,
            format!(
                "{} of {} scene image(s) generated",
                chain.results.len(),
                chain.outcomes.len()
            ),
        );

        // AssociateDialogue
        let lines = associate_dialogue(&script, &chain.results, report);

        // RewriteDialogue
        let dialogue = self
            .rewrite_dialogue(lines, &story, report)
            .await
            .map_err(|e| (Stage::RewriteDialogue, e))?;

        Ok(RunOutput {
            story,
            script,
            characters,
            references,
            portraits: portraits.generated,
            safety_flagged_portraits: portraits.safety_flagged,
            cohesive_prompts,
            chain,
            skipped_for_capacity: selection.over_capacity,
            dialogue,
            ignored: material.ignored().clone(),
        })
    }

    /// One structured call: record the request, reject empty payloads, parse.
    async fn structured<R>(
        &self,
        stage: Stage,
        prompt: String,
        schema: Value,
        parse: impl FnOnce(Value) -> Result<R, GenerationErrorKind>,
        report: &mut GenerationReport,
    ) -> TableauResult<R> {
        report.record(
            stage,
            EntryStatus::Started,
            format!(
                "Requesting {} ({} prompt chars)",
                self.text.model_name(),
                prompt.len()
            ),
        );
        debug!(stage = %stage, prompt_len = prompt.len(), "Structured request");

        let value = self.text.generate_structured(&prompt, &schema).await?;
        if value.is_null() {
            return Err(GenerationError::new(GenerationErrorKind::EmptyPayload(stage.to_string())).into());
        }
        parse(value).map_err(|kind| GenerationError::new(kind).into())
    }

    async fn generate_script(
        &self,
        story: &StoryElements,
        source_text: &str,
        report: &mut GenerationReport,
    ) -> TableauResult<Script> {
        let parsed = self
            .structured(
                Stage::GenerateScript,
                prompts::script_prompt(story, source_text),
                prompts::script_schema(),
                prompts::parse_script,
                report,
            )
            .await?;
        if parsed.dropped > 0 {
            warn!(dropped = parsed.dropped, "Dropped malformed script elements");
            report.record(
                Stage::GenerateScript,
                EntryStatus::Info,
                format!("Dropped {} malformed element(s)", parsed.dropped),
            );
        }

        let script = parsed.script;
        if script.is_empty() {
            return Err(PipelineError::new(PipelineErrorKind::EmptyScript).into());
        }
        let dialogue_blocks = script
            .elements()
            .iter()
            .filter(|e| matches!(e, SceneElement::DialogueBlock { .. }))
            .count();
        report.record(
            Stage::GenerateScript,
            EntryStatus::Succeeded,
            format!(
                "'{}': {} element(s), {} action(s), {} dialogue block(s)",
                script.title(),
                script.len(),
                script.action_indices().len(),
                dialogue_blocks
            ),
        );
        Ok(script)
    }

    async fn portrait(&self, character: &AnalyzedCharacter) -> TableauResult<ImageResponse> {
        let request = ImageRequest::builder()
            .prompt(prompts::portrait_prompt(character))
            .style(self.config.style().clone())
            .aspect_ratio(self.config.portrait_aspect_ratio().clone())
            .build()
            .map_err(|e| GenerationError::new(GenerationErrorKind::Service(e.to_string())))?;
        self.images.generate_image(&request).await
    }

    /// Generate portraits concurrently for characters whose normalized name
    /// has no reference yet. Individual failures are skipped.
    #[instrument(skip_all, fields(characters = characters.len()))]
    async fn generate_portraits(
        &self,
        characters: &[AnalyzedCharacter],
        references: &mut ReferenceSet,
        report: &mut GenerationReport,
    ) -> TableauResult<Portraits> {
        let mut pending = Vec::new();
        for character in characters {
            match self.resolver.exact(character.name(), references) {
                Some(found) => report.record(
                    Stage::GeneratePortraits,
                    EntryStatus::Skipped,
                    format!(
                        "{}: using {} reference '{}'",
                        character.name(),
                        found.origin(),
                        found.name()
                    ),
                ),
                None => pending.push(character),
            }
        }

        let mut portraits = Portraits {
            generated: Vec::new(),
            safety_flagged: Vec::new(),
        };
        if pending.is_empty() {
            report.record(
                Stage::GeneratePortraits,
                EntryStatus::Skipped,
                "No portraits needed",
            );
            return Ok(portraits);
        }
        report.record(
            Stage::GeneratePortraits,
            EntryStatus::Started,
            format!("{} portrait(s) requested concurrently", pending.len()),
        );

        let results = join_all(pending.iter().map(|character| self.portrait(character))).await;

        for (character, result) in pending.into_iter().zip(results) {
            let name = character.name();
            match result {
                Err(e) if e.is_authentication() => return Err(e),
                Err(e) if e.is_safety_rejection() => {
                    warn!(character = %name, "Portrait blocked by safety filter");
                    portraits.safety_flagged.push(name.clone());
                    report.record(
                        Stage::GeneratePortraits,
                        EntryStatus::SafetyBlocked,
                        format!("{}: {}", name, e),
                    );
                }
                Err(e) => {
                    warn!(character = %name, error = %e, "Portrait generation failed");
                    report.record(Stage::GeneratePortraits, EntryStatus::Failed, format!("{}: {}", name, e));
                }
                Ok(ImageResponse {
                    image: Some(image),
                    safety_blocked,
                }) => {
                    if safety_blocked {
                        portraits.safety_flagged.push(name.clone());
                    }
                    let reference = CharacterReference::new(
                        name.clone(),
                        image.data,
                        image.mime_type,
                        ReferenceOrigin::Generated,
                    );
                    if references.insert_if_absent(reference.clone()) {
                        portraits.generated.push(reference);
                        report.record(
                            Stage::GeneratePortraits,
                            EntryStatus::Succeeded,
                            format!(
                                "{}: portrait generated{}",
                                name,
                                if safety_blocked {
                                    " (request altered by safety filter)"
                                } else {
                                    ""
                                }
                            ),
                        );
                    } else {
                        report.record(
                            Stage::GeneratePortraits,
                            EntryStatus::Skipped,
                            format!("{}: a reference with the same key already exists", name),
                        );
                    }
                }
                Ok(ImageResponse {
                    image: None,
                    safety_blocked: true,
                }) => {
                    portraits.safety_flagged.push(name.clone());
                    report.record(
                        Stage::GeneratePortraits,
                        EntryStatus::SafetyBlocked,
                        format!("{}: no image returned, blocked by safety filter", name),
                    );
                }
                Ok(ImageResponse { image: None, .. }) => {
                    report.record(
                        Stage::GeneratePortraits,
                        EntryStatus::Failed,
                        format!("{}: {}", name, GenerationErrorKind::EmptyPayload("portrait".to_string())),
                    );
                }
            }
        }

        report.record(
            Stage::GeneratePortraits,
            EntryStatus::Succeeded,
            format!("{} portrait(s) generated", portraits.generated.len()),
        );
        Ok(portraits)
    }

    async fn generate_cohesive_prompts(
        &self,
        script: &Script,
        selected: &[usize],
        characters: &[AnalyzedCharacter],
        report: &mut GenerationReport,
    ) -> TableauResult<Vec<CohesivePrompt>> {
        if selected.is_empty() {
            report.record(
                Stage::GenerateCohesivePrompts,
                EntryStatus::Skipped,
                "Script has no action lines",
            );
            return Ok(Vec::new());
        }

        let prompts = self
            .structured(
                Stage::GenerateCohesivePrompts,
                prompts::cohesive_prompt(script, selected, characters, self.config.style()),
                prompts::cohesive_schema(),
                |value| prompts::parse_cohesive(value, selected),
                report,
            )
            .await?;
        report.record(
            Stage::GenerateCohesivePrompts,
            EntryStatus::Succeeded,
            format!("{} prompt(s) for {} selected scene(s)", prompts.len(), selected.len()),
        );
        Ok(prompts)
    }

    /// Build one plan per selected scene, resolving the characters named by
    /// its cohesive prompt. Scenes without a prompt use their action text.
    fn plan_scenes(
        &self,
        script: &Script,
        selected: &[usize],
        cohesive_prompts: &[CohesivePrompt],
        references: &ReferenceSet,
        report: &mut GenerationReport,
    ) -> Vec<ScenePlan> {
        let mut plans = Vec::with_capacity(selected.len());
        for &scene_index in selected {
            let cohesive = cohesive_prompts.iter().find(|p| p.scene_index == scene_index);
            let (prompt, names) = match cohesive {
                Some(cohesive) => (cohesive.prompt.clone(), cohesive.characters.as_slice()),
                None => {
                    let action = script
                        .element(scene_index)
                        .and_then(SceneElement::action_text)
                        .unwrap_or_default()
                        .to_string();
                    report.record(
                        Stage::GenerateSceneImages,
                        EntryStatus::Info,
                        format!("Scene {}: no cohesive prompt, using the action text", scene_index),
                    );
                    (action, &[][..])
                }
            };

            let scene = self.resolver.resolve_scene(names, references);
            for name in &scene.unresolved {
                report.record(
                    Stage::GenerateSceneImages,
                    EntryStatus::Info,
                    format!("Scene {}: no reference matches '{}'", scene_index, name),
                );
            }
            plans.push(ScenePlan {
                scene_index,
                prompt,
                references: scene
                    .resolved
                    .iter()
                    .map(|reference| ReferenceImage {
                        name: reference.name().clone(),
                        data: reference.image().clone(),
                        mime_type: reference.mime_type().clone(),
                    })
                    .collect(),
            });
        }
        plans
    }

    /// Rewrite dialogue lines, falling back to the first sentence of each
    /// line when the service fails or omits a line.
    async fn rewrite_dialogue(
        &self,
        mut lines: Vec<DialogueLine>,
        story: &StoryElements,
        report: &mut GenerationReport,
    ) -> TableauResult<Vec<DialogueLine>> {
        if lines.is_empty() {
            report.record(
                Stage::RewriteDialogue,
                EntryStatus::Skipped,
                "No dialogue to rewrite",
            );
            return Ok(lines);
        }

        let result = self
            .structured(
                Stage::RewriteDialogue,
                prompts::rewrite_prompt(&lines, story),
                prompts::rewrite_schema(),
                prompts::parse_rewrites,
                report,
            )
            .await;

        match result {
            Err(e) if e.is_authentication() => Err(e),
            Err(e) => {
                warn!(error = %e, "Dialogue rewrite failed, using local fallback");
                report.record(
                    Stage::RewriteDialogue,
                    EntryStatus::Fallback,
                    format!("Rewrite failed ({}); using the first sentence of each line", e),
                );
                for line in &mut lines {
                    line.text = first_sentence(&line.text);
                }
                Ok(lines)
            }
            Ok(rewrites) => {
                let mut fallbacks = 0;
                for line in &mut lines {
                    match rewrites.iter().find(|r| r.scene_index == line.scene_index) {
                        Some(rewrite) => line.text = rewrite.text.trim().to_string(),
                        None => {
                            fallbacks += 1;
                            line.text = first_sentence(&line.text);
                            report.record(
                                Stage::RewriteDialogue,
                                EntryStatus::Fallback,
                                format!("Scene {}: no rewrite returned, using the first sentence", line.scene_index),
                            );
                        }
                    }
                }
                report.record(
                    Stage::RewriteDialogue,
                    EntryStatus::Succeeded,
                    format!(
                        "{} line(s) rewritten, {} fallback(s)",
                        lines.len() - fallbacks,
                        fallbacks
                    ),
                );
                Ok(lines)
            }
        }
    }
}

/// Associate dialogue with every generated scene, in ascending scene order.
fn associate_dialogue(
    script: &Script,
    scene_images: &[GeneratedSceneImage],
    report: &mut GenerationReport,
) -> Vec<DialogueLine> {
    let mut tracker = DuplicateTracker::new();
    let mut lines = Vec::new();

    for image in scene_images {
        match associate(script, image.scene_index) {
            Some(association) => {
                let line = tracker.line(image.scene_index, association);
                report.record(
                    Stage::AssociateDialogue,
                    EntryStatus::Info,
                    format!(
                        "Scene {} -> element {} ({}){}",
                        line.scene_index,
                        line.source_element_index,
                        line.character,
                        if line.is_duplicate {
                            format!(", duplicate #{}", line.occurrence)
                        } else {
                            String::new()
                        }
                    ),
                );
                lines.push(line);
            }
            None => report.record(
                Stage::AssociateDialogue,
                EntryStatus::Info,
                format!("Scene {} has no nearby dialogue", image.scene_index),
            ),
        }
    }

    report.record(
        Stage::AssociateDialogue,
        EntryStatus::Succeeded,
        format!(
            "{} line(s), {} duplicate(s)",
            lines.len(),
            lines.iter().filter(|line| line.is_duplicate).count()
        ),
    );
    lines
}
