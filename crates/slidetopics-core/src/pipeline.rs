use crate::backend::{ExtractError, PageTextExtractor};
use crate::cluster::cluster_similar_topics;
use crate::config::Thresholds;
use crate::frequency::filter_by_frequency;
use crate::headers::filter_repeated_headers;
use crate::hierarchy::merge_hierarchical_topics;
use crate::page::extract_page_candidates;
use crate::rank::{adaptive_cap, rank_and_cap_topics};
use crate::similarity::{SimilarityScorer, default_scorer};
use crate::{Candidate, PipelineStats, SkippedFile, Subtopic, Topic};

/// Topic extraction pipeline with its thresholds and similarity capability
/// fixed at construction.
///
/// Stages run in a fixed order over the combined candidates of every file:
/// 1. Per-page heading selection via the supplied [`PageTextExtractor`]
/// 2. Repeated-header removal
/// 3. Frequency filtering
/// 4. Similarity clustering and substring removal
/// 5. Hierarchical merge
/// 6. Ranking and adaptive cap
pub struct TopicExtractor {
    thresholds: Thresholds,
    scorer: Option<Box<dyn SimilarityScorer>>,
}

impl Default for TopicExtractor {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            scorer: default_scorer(),
        }
    }
}

impl TopicExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Replace the similarity scorer. `None` disables clustering.
    pub fn with_scorer(mut self, scorer: Option<Box<dyn SimilarityScorer>>) -> Self {
        self.scorer = scorer;
        self
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// Stage 1 for one file: decode pages and collect their heading candidates.
    ///
    /// Returns the candidates (tagged with `filename`) and the number of pages read.
    pub fn extract_file_candidates(
        &self,
        bytes: &[u8],
        filename: &str,
        backend: &dyn PageTextExtractor,
    ) -> Result<(Vec<Candidate>, usize), ExtractError> {
        let pages = backend.extract_pages(bytes, filename)?;
        let candidates = pages
            .iter()
            .enumerate()
            .flat_map(|(i, page)| extract_page_candidates(page, i + 1, &self.thresholds))
            .map(|c| c.with_source(filename))
            .collect();
        Ok((candidates, pages.len()))
    }

    /// Run the whole pipeline over a batch of `(bytes, filename)` files.
    ///
    /// A file that fails to decode is logged and skipped; the rest of the
    /// batch still runs and thresholds use the pages of the files that did
    /// decode. Never fails: an empty or fully unreadable batch yields no
    /// topics.
    pub fn extract_topics<B, S>(
        &self,
        files: &[(B, S)],
        backend: &dyn PageTextExtractor,
    ) -> (Vec<Topic>, PipelineStats)
    where
        B: AsRef<[u8]>,
        S: AsRef<str>,
    {
        let mut all_candidates = Vec::new();
        let mut total_pages = 0;
        let mut files_processed = 0;
        let mut skipped_files = Vec::new();

        for (bytes, filename) in files {
            let filename = filename.as_ref();
            match self.extract_file_candidates(bytes.as_ref(), filename, backend) {
                Ok((candidates, pages)) => {
                    tracing::debug!(filename, pages, candidates = candidates.len(), "extracted file");
                    all_candidates.extend(candidates);
                    total_pages += pages;
                    files_processed += 1;
                }
                Err(e) => {
                    tracing::warn!(filename, error = %e, "skipping file");
                    skipped_files.push(SkippedFile {
                        filename: filename.to_string(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        let (topics, mut stats) = self.process_candidates(all_candidates, total_pages);
        stats.files_processed = files_processed;
        stats.skipped_files = skipped_files;

        tracing::info!(
            files = stats.files_processed,
            skipped = stats.skipped_files.len(),
            pages = stats.total_pages,
            raw = stats.raw_candidates,
            topics = stats.final_topics,
            "topic extraction complete"
        );
        (topics, stats)
    }

    /// Stages 2–6 over candidates that were already extracted.
    ///
    /// `total_pages` is the page count of the whole corpus the candidates
    /// came from; all thresholds scale with it.
    pub fn process_candidates(
        &self,
        candidates: Vec<Candidate>,
        total_pages: usize,
    ) -> (Vec<Topic>, PipelineStats) {
        let t = &self.thresholds;
        let raw_candidates = candidates.len();

        let after_headers = filter_repeated_headers(candidates, total_pages, t);
        let after_header_filter = after_headers.len();

        let after_frequency = filter_by_frequency(after_headers, total_pages, t);
        let after_frequency_filter = after_frequency.len();

        let after_cluster = cluster_similar_topics(after_frequency, self.scorer.as_deref(), t);
        let after_clustering = after_cluster.len();

        let (main_topics, subtopics) = merge_hierarchical_topics(after_cluster);
        let after_hierarchical_merge = main_topics.len();

        let topics = rank_and_cap_topics(main_topics, total_pages, t);

        tracing::debug!(
            raw_candidates,
            after_header_filter,
            after_frequency_filter,
            after_clustering,
            after_hierarchical_merge,
            final_topics = topics.len(),
            "pipeline funnel"
        );

        let stats = PipelineStats {
            files_processed: 0,
            total_pages,
            raw_candidates,
            after_header_filter,
            after_frequency_filter,
            after_clustering,
            after_hierarchical_merge,
            final_topics: topics.len(),
            adaptive_cap: adaptive_cap(total_pages, t),
            subtopics,
            skipped_files: Vec::new(),
        };
        (topics, stats)
    }
}

/// Run the pipeline with default thresholds and the compiled-in scorer.
pub fn extract_topic_candidates<B, S>(
    files: &[(B, S)],
    backend: &dyn PageTextExtractor,
) -> (Vec<Topic>, PipelineStats)
where
    B: AsRef<[u8]>,
    S: AsRef<str>,
{
    TopicExtractor::new().extract_topics(files, backend)
}

/// A ranked topic together with the subtopics folded under it, for display.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayRow<'a> {
    pub topic: &'a Topic,
    pub subtopics: Vec<&'a Subtopic>,
}

/// Pair each ranked topic with its subtopics, keeping ranked order.
/// Subtopics whose parent did not make the cut are left out.
pub fn group_subtopics<'a>(topics: &'a [Topic], subtopics: &'a [Subtopic]) -> Vec<DisplayRow<'a>> {
    topics
        .iter()
        .map(|topic| DisplayRow {
            topic,
            subtopics: if topic.has_subtopics {
                subtopics
                    .iter()
                    .filter(|s| s.parent_topic == topic.name)
                    .collect()
            } else {
                Vec::new()
            },
        })
        .collect()
}
