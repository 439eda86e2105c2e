use std::collections::{HashMap, HashSet};

use crate::config::Thresholds;
use crate::Candidate;

/// Most distinct pages a text may appear on before it counts as a running
/// banner: `max(1, floor(total_pages * ratio))`.
pub fn max_allowed_pages(total_pages: usize, thresholds: &Thresholds) -> usize {
    ((total_pages as f64 * thresholds.repeated_header_ratio).floor() as usize).max(1)
}

/// Drop every candidate whose normalized text shows up on more pages than
/// [`max_allowed_pages`] allows.
///
/// All instances of surviving texts are kept (no deduplication) and each is
/// annotated with the number of distinct pages its text appears on.
pub fn filter_repeated_headers(
    candidates: Vec<Candidate>,
    total_pages: usize,
    thresholds: &Thresholds,
) -> Vec<Candidate> {
    if candidates.is_empty() {
        return candidates;
    }

    let page_counts: HashMap<String, usize> = {
        let mut pages: HashMap<&str, HashSet<(Option<&str>, usize)>> = HashMap::new();
        for c in &candidates {
            pages
                .entry(c.normalized_text.as_str())
                .or_default()
                .insert(c.page_key());
        }
        pages
            .into_iter()
            .map(|(text, set)| (text.to_string(), set.len()))
            .collect()
    };

    let max_pages = max_allowed_pages(total_pages, thresholds);
    let excluded = page_counts.values().filter(|&&n| n > max_pages).count();
    tracing::debug!(max_pages, excluded, "repeated-header filter");

    candidates
        .into_iter()
        .filter_map(|mut c| {
            let count = page_counts[&c.normalized_text];
            if count > max_pages {
                return None;
            }
            c.occurrence_count = count;
            Some(c)
        })
        .collect()
}
