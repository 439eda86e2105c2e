use crate::config::Thresholds;
use crate::Topic;

/// Deck-size-aware output size:
/// `min(ceiling, max(floor, round(sqrt(total_pages) * multiplier)))`.
pub fn adaptive_cap(total_pages: usize, thresholds: &Thresholds) -> usize {
    let scaled = ((total_pages as f64).sqrt() * thresholds.cap_multiplier).round() as usize;
    scaled.max(thresholds.cap_floor).min(thresholds.cap_ceiling)
}

/// Order topics by occurrence count, then by (average) font size, both
/// descending, and keep the first [`adaptive_cap`] of them. Ties keep their
/// input order.
pub fn rank_and_cap_topics(mut topics: Vec<Topic>, total_pages: usize, thresholds: &Thresholds) -> Vec<Topic> {
    topics.sort_by(|a, b| {
        b.occurrence_count
            .cmp(&a.occurrence_count)
            .then_with(|| b.ranking_font_size().total_cmp(&a.ranking_font_size()))
    });
    topics.truncate(adaptive_cap(total_pages, thresholds));
    topics
}
