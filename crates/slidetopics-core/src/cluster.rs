use crate::config::Thresholds;
use crate::similarity::SimilarityScorer;
use crate::Candidate;

/// Merge near-duplicate phrasings, then drop topics that are strict
/// substrings of another topic.
///
/// Each unassigned candidate seeds a cluster and pulls in every later
/// unassigned candidate scoring at least `similarity_threshold` against the
/// seed. The representative is chosen by occurrence count, then text length
/// (capped at `representative_max_chars`), then font size; it takes the
/// summed occurrence count and the mean font size of the cluster.
///
/// With no scorer the candidates pass through unchanged.
pub fn cluster_similar_topics(
    candidates: Vec<Candidate>,
    scorer: Option<&dyn SimilarityScorer>,
    thresholds: &Thresholds,
) -> Vec<Candidate> {
    let Some(scorer) = scorer else {
        tracing::debug!("no similarity scorer, clustering skipped");
        return candidates;
    };
    if candidates.is_empty() {
        return candidates;
    }

    let mut slots: Vec<Option<Candidate>> = candidates.into_iter().map(Some).collect();
    let mut merged = Vec::new();

    for i in 0..slots.len() {
        let Some(seed) = slots[i].take() else {
            continue;
        };

        let mut cluster = vec![seed];
        for slot in slots.iter_mut().skip(i + 1) {
            let joins = slot.as_ref().is_some_and(|other| {
                scorer.ratio(&cluster[0].normalized_text, &other.normalized_text)
                    >= thresholds.similarity_threshold
            });
            if joins {
                cluster.extend(slot.take());
            }
        }

        merged.push(collapse_cluster(cluster, thresholds));
    }

    tracing::debug!(clusters = merged.len(), "similarity clustering");
    remove_strict_substrings(merged)
}

fn collapse_cluster(mut cluster: Vec<Candidate>, thresholds: &Thresholds) -> Candidate {
    let total: usize = cluster.iter().map(|c| c.occurrence_count).sum();
    let avg_font = cluster.iter().map(|c| c.font_size).sum::<f32>() / cluster.len() as f32;

    let cap = thresholds.representative_max_chars;
    let mut best_idx = 0;
    for (i, c) in cluster.iter().enumerate().skip(1) {
        let b = &cluster[best_idx];
        let key_c = (c.occurrence_count, c.text.chars().count().min(cap));
        let key_b = (b.occurrence_count, b.text.chars().count().min(cap));
        if key_c > key_b || (key_c == key_b && c.font_size > b.font_size) {
            best_idx = i;
        }
    }

    let mut best = cluster.swap_remove(best_idx);
    best.occurrence_count = total;
    best.avg_font_size = Some(avg_font);
    best
}

/// Remove every topic whose normalized text is a strict substring of some
/// other topic's normalized text.
///
/// Containment is decided against the full input set, so a name nested in
/// several longer names is removed exactly once.
pub fn remove_strict_substrings(candidates: Vec<Candidate>) -> Vec<Candidate> {
    let redundant: Vec<bool> = candidates
        .iter()
        .enumerate()
        .map(|(i, a)| {
            candidates.iter().enumerate().any(|(j, b)| {
                i != j
                    && a.normalized_text != b.normalized_text
                    && b.normalized_text.contains(a.normalized_text.as_str())
            })
        })
        .collect();

    candidates
        .into_iter()
        .zip(redundant)
        .filter_map(|(c, drop)| (!drop).then_some(c))
        .collect()
}
