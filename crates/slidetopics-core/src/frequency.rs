use std::collections::{HashMap, HashSet};

use crate::config::Thresholds;
use crate::Candidate;

/// Fewest distinct pages a section-level topic must appear on:
/// `max(floor, ceil(total_pages * ratio))`.
pub fn min_occurrences(total_pages: usize, thresholds: &Thresholds) -> usize {
    ((total_pages as f64 * thresholds.min_frequency_ratio).ceil() as usize)
        .max(thresholds.min_frequency_floor)
}

struct Group<'a> {
    /// Index of the representative in the input.
    best: usize,
    pages: HashSet<(Option<&'a str>, usize)>,
}

/// Collapse each normalized text to one representative, keeping only texts
/// that recur on at least [`min_occurrences`] distinct pages.
///
/// The representative has the largest font size, then the longest text;
/// remaining ties go to the first instance seen. Output keeps the order in
/// which each text first appeared.
pub fn filter_by_frequency(
    candidates: Vec<Candidate>,
    total_pages: usize,
    thresholds: &Thresholds,
) -> Vec<Candidate> {
    if candidates.is_empty() {
        return candidates;
    }

    let min = min_occurrences(total_pages, thresholds);

    let (groups, survivors): (usize, Vec<(usize, usize)>) = {
        let mut index: HashMap<&str, usize> = HashMap::new();
        let mut groups: Vec<Group<'_>> = Vec::new();

        for (i, c) in candidates.iter().enumerate() {
            match index.get(c.normalized_text.as_str()) {
                Some(&g) => {
                    let group = &mut groups[g];
                    group.pages.insert(c.page_key());
                    if outranks(c, &candidates[group.best]) {
                        group.best = i;
                    }
                }
                None => {
                    index.insert(c.normalized_text.as_str(), groups.len());
                    groups.push(Group {
                        best: i,
                        pages: HashSet::from([c.page_key()]),
                    });
                }
            }
        }

        let survivors = groups
            .iter()
            .filter(|g| g.pages.len() >= min)
            .map(|g| (g.best, g.pages.len()))
            .collect();
        (groups.len(), survivors)
    };

    let mut slots: Vec<Option<Candidate>> = candidates.into_iter().map(Some).collect();
    let kept: Vec<Candidate> = survivors
        .into_iter()
        .filter_map(|(i, pages)| {
            let mut best = slots[i].take()?;
            best.occurrence_count = pages;
            Some(best)
        })
        .collect();

    tracing::debug!(min_occurrences = min, groups, kept = kept.len(), "frequency filter");
    kept
}

/// Larger font wins, then longer text. Equal candidates do not displace the
/// incumbent.
fn outranks(challenger: &Candidate, incumbent: &Candidate) -> bool {
    let key = |c: &Candidate| (c.font_size, c.text.chars().count());
    let (cf, cl) = key(challenger);
    let (inf, il) = key(incumbent);
    cf > inf || (cf == inf && cl > il)
}
