//! Append-only generation report.

use serde::Serialize;
use strum::{Display, EnumIter};

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Display, EnumIter)]
pub enum Stage {
    /// Read uploads into text and image blobs
    Ingest,
    /// Extract story elements from the reference text
    AnalyzeStory,
    /// Write the script
    GenerateScript,
    /// Describe every speaking character
    AnalyzeCharacters,
    /// Generate portraits for characters without an uploaded image
    GeneratePortraits,
    /// Turn action lines into image prompts
    GenerateCohesivePrompts,
    /// Generate the continuity-linked scene images
    GenerateSceneImages,
    /// Attach dialogue to generated scenes
    AssociateDialogue,
    /// Rewrite attached dialogue
    RewriteDialogue,
}

/// Outcome recorded by one report entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryStatus {
    /// Stage began
    Started,
    /// Informational detail about inputs or decisions
    Info,
    /// A unit of work (or the stage) succeeded
    Succeeded,
    /// A unit of work failed and was skipped
    Failed,
    /// A unit of work was blocked or altered by content-safety filtering
    SafetyBlocked,
    /// A unit of work was not attempted
    Skipped,
    /// A local fallback replaced an external result
    Fallback,
    /// The run stopped here
    Aborted,
}

/// A single report line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportEntry {
    /// Position in the report, starting at 1
    pub sequence: usize,
    /// Stage that wrote the entry
    pub stage: Stage,
    /// Outcome
    pub status: EntryStatus,
    /// Human-readable detail
    pub message: String,
}

/// Ordered, append-only transcript of a pipeline run.
///
/// Entries can only be added; there is no way to edit or remove one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GenerationReport {
    entries: Vec<ReportEntry>,
}

impl GenerationReport {
    /// Creates an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry.
    pub fn record(&mut self, stage: Stage, status: EntryStatus, message: impl Into<String>) {
        let entry = ReportEntry {
            sequence: self.entries.len() + 1,
            stage,
            status,
            message: message.into(),
        };
        self.entries.push(entry);
    }

    /// All entries in write order.
    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    /// Entries written by `stage`.
    pub fn for_stage(&self, stage: Stage) -> impl Iterator<Item = &ReportEntry> {
        self.entries.iter().filter(move |entry| entry.stage == stage)
    }

    /// Number of entries with `status`.
    pub fn count(&self, status: EntryStatus) -> usize {
        self.entries.iter().filter(|entry| entry.status == status).count()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render the report as plain text, one line per entry.
    ///
    /// # Examples
    ///
    /// ```
    /// use tableau_pipeline::{EntryStatus, GenerationReport, Stage};
    ///
    /// let mut report = GenerationReport::new();
    /// report.record(Stage::Ingest, EntryStatus::Started, "2 uploads");
    /// assert_eq!(report.render(), "[001] Ingest STARTED: 2 uploads\n");
    /// ```
    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(|entry| {
                format!(
                    "[{:03}] {} {}: {}\n",
                    entry.sequence, entry.stage, entry.status, entry.message
                )
            })
            .collect()
    }
}
