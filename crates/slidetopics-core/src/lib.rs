use serde::{Deserialize, Serialize};

pub mod backend;
pub mod cluster;
pub mod config;
pub mod config_file;
pub mod frequency;
pub mod headers;
pub mod hierarchy;
pub mod normalize;
pub mod page;
pub mod pipeline;
pub mod rank;
pub mod similarity;

pub use backend::{ExtractError, PageText, PageTextExtractor, TextLine};
pub use config::{ConfigError, Thresholds};
pub use normalize::normalize_text;
pub use pipeline::{DisplayRow, TopicExtractor, extract_topic_candidates, group_subtopics};
pub use similarity::{SimilarityScorer, default_scorer};

/// One surviving line of slide text at some pipeline stage.
///
/// `normalized_text` is the grouping key: two candidates with equal
/// normalized text are the same topic for counting purposes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub text: String,
    pub normalized_text: String,
    pub font_size: f32,
    /// 1-based page index within `source_file`.
    pub page_num: usize,
    pub source_file: Option<String>,
    /// Distinct pages this text (or its cluster) appeared on.
    pub occurrence_count: usize,
    /// Mean font size across merged instances, set by the clusterer.
    pub avg_font_size: Option<f32>,
}

impl Candidate {
    pub fn new(text: impl Into<String>, font_size: f32, page_num: usize) -> Self {
        let text = text.into();
        let normalized_text = normalize_text(&text);
        Self {
            text,
            normalized_text,
            font_size,
            page_num,
            source_file: None,
            occurrence_count: 1,
            avg_font_size: None,
        }
    }

    pub fn with_source(mut self, source_file: impl Into<String>) -> Self {
        self.source_file = Some(source_file.into());
        self
    }

    /// Font size used for ranking: the cluster mean when known, else the raw size.
    pub fn ranking_font_size(&self) -> f32 {
        self.avg_font_size.unwrap_or(self.font_size)
    }

    /// Key identifying the page this instance came from across a multi-file batch.
    pub(crate) fn page_key(&self) -> (Option<&str>, usize) {
        (self.source_file.as_deref(), self.page_num)
    }
}

/// A ranked, course-level topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topic {
    pub name: String,
    pub normalized_text: String,
    pub font_size: f32,
    pub avg_font_size: Option<f32>,
    pub occurrence_count: usize,
    pub source_file: Option<String>,
    pub has_subtopics: bool,
    pub num_subtopics: usize,
}

impl Topic {
    pub fn ranking_font_size(&self) -> f32 {
        self.avg_font_size.unwrap_or(self.font_size)
    }
}

impl From<Candidate> for Topic {
    fn from(c: Candidate) -> Self {
        Self {
            name: c.text,
            normalized_text: c.normalized_text,
            font_size: c.font_size,
            avg_font_size: c.avg_font_size,
            occurrence_count: c.occurrence_count,
            source_file: c.source_file,
            has_subtopics: false,
            num_subtopics: 0,
        }
    }
}

/// A candidate folded under a parent topic by the hierarchical merger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subtopic {
    pub parent_topic: String,
    #[serde(flatten)]
    pub candidate: Candidate,
}

/// A file the orchestrator could not read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedFile {
    pub filename: String,
    pub reason: String,
}

/// Funnel counters for one orchestrator run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineStats {
    pub files_processed: usize,
    pub total_pages: usize,
    pub raw_candidates: usize,
    pub after_header_filter: usize,
    pub after_frequency_filter: usize,
    pub after_clustering: usize,
    pub after_hierarchical_merge: usize,
    pub final_topics: usize,
    pub adaptive_cap: usize,
    pub subtopics: Vec<Subtopic>,
    pub skipped_files: Vec<SkippedFile>,
}
