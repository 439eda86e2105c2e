use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::normalize::normalize_text;
use crate::{Candidate, Subtopic, Topic};

/// `<Parent> <Marker><Separator><Subtitle>`, e.g. "Oligopoly II: Bertrand".
///
/// Markers are short roman numerals (either case), decimal numbers or one
/// capital letter.
/// The capital-letter case also matches ordinary phrases such as
/// "Theory X: Applications"; that over-match is accepted as is.
static HIERARCHY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?P<parent>.+?)\s+(?:(?P<roman>(?i:i{1,3}|iv|v|vi{0,3}))|(?P<number>\d+)|(?P<letter>[A-Z]))[\s:.\-]+(?P<subtitle>.+)$",
    )
    .unwrap()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    Roman,
    Number,
    Letter,
}

/// Capture groups of a hierarchical heading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HierarchyMatch<'a> {
    pub parent: &'a str,
    pub marker: &'a str,
    pub kind: MarkerKind,
    pub subtitle: &'a str,
}

/// Split a heading into parent, marker and subtitle, if it has that shape.
pub fn match_hierarchical(text: &str) -> Option<HierarchyMatch<'_>> {
    let caps = HIERARCHY_RE.captures(text)?;
    let (marker, kind) = if let Some(m) = caps.name("roman") {
        (m, MarkerKind::Roman)
    } else if let Some(m) = caps.name("number") {
        (m, MarkerKind::Number)
    } else {
        (caps.name("letter")?, MarkerKind::Letter)
    };

    Some(HierarchyMatch {
        parent: caps.name("parent")?.as_str().trim(),
        marker: marker.as_str(),
        kind,
        subtitle: caps.name("subtitle")?.as_str().trim(),
    })
}

struct ParentGroup {
    name: String,
    key: String,
    children: Vec<Candidate>,
}

/// Fold numbered/lettered parts into one parent topic each.
///
/// Returns `(main_topics, subtopics)`: parents in order of first appearance
/// followed by the standalone topics, and every folded candidate tagged with
/// its parent's name.
pub fn merge_hierarchical_topics(candidates: Vec<Candidate>) -> (Vec<Topic>, Vec<Subtopic>) {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut parents: Vec<ParentGroup> = Vec::new();
    let mut standalone: Vec<Candidate> = Vec::new();

    for c in candidates {
        let parent = match match_hierarchical(c.text.trim()) {
            Some(m) => m.parent.to_string(),
            None => {
                standalone.push(c);
                continue;
            }
        };
        let key = normalize_text(&parent);
        if key.is_empty() {
            standalone.push(c);
            continue;
        }

        match index.get(&key) {
            Some(&i) => parents[i].children.push(c),
            None => {
                index.insert(key.clone(), parents.len());
                parents.push(ParentGroup {
                    name: parent,
                    key,
                    children: vec![c],
                });
            }
        }
    }

    let standalone = absorb_into_parents(&mut parents, standalone);

    let mut main_topics = Vec::with_capacity(parents.len() + standalone.len());
    let mut subtopics = Vec::new();

    for group in parents {
        main_topics.push(parent_topic(&group));
        subtopics.extend(group.children.into_iter().map(|candidate| Subtopic {
            parent_topic: group.name.clone(),
            candidate,
        }));
    }
    main_topics.extend(standalone.into_iter().map(Topic::from));

    (main_topics, subtopics)
}

/// Parent names are new strings the clusterer never compared, so another
/// main topic of the same family ("Oligopoly Models" next to parent
/// "Oligopoly") can still have one as a word prefix. Fold such topics, and
/// any standalone topic equal to a parent name, into the shortest parent
/// they extend. Unrelated topics that merely contain a parent name stay
/// where they are. Returns the standalone candidates that stay top-level.
fn absorb_into_parents(parents: &mut Vec<ParentGroup>, standalone: Vec<Candidate>) -> Vec<Candidate> {
    if parents.is_empty() {
        return standalone;
    }

    let keys: Vec<String> = parents.iter().map(|p| p.key.clone()).collect();
    let family_root = |text: &str, skip: Option<usize>| -> Option<usize> {
        keys.iter()
            .enumerate()
            .filter(|&(j, k)| Some(j) != skip && extends_family(text, k))
            .min_by_key(|&(j, k)| (k.len(), j))
            .map(|(j, _)| j)
    };

    // Word prefixes nest, so the shortest root never extends another parent
    // and one pass settles every fold.
    let targets: Vec<Option<usize>> = (0..parents.len())
        .map(|i| family_root(&keys[i], Some(i)))
        .collect();
    for (i, target) in targets.iter().enumerate() {
        if let Some(j) = *target {
            tracing::debug!(from = %parents[i].name, into = %parents[j].name, "folding parent topic");
            let moved = std::mem::take(&mut parents[i].children);
            parents[j].children.extend(moved);
        }
    }

    let mut kept = Vec::new();
    for c in standalone {
        match family_root(&c.normalized_text, None) {
            Some(j) => {
                tracing::debug!(topic = %c.text, into = %parents[j].name, "folding topic under parent");
                parents[j].children.push(c);
            }
            None => kept.push(c),
        }
    }

    parents.retain(|p| !p.children.is_empty());
    kept
}

/// `text` is `key` itself or `key` followed by more words.
fn extends_family(text: &str, key: &str) -> bool {
    text.strip_prefix(key)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with(' '))
}

fn parent_topic(group: &ParentGroup) -> Topic {
    let n = group.children.len();
    let occurrence_count = group.children.iter().map(|c| c.occurrence_count).sum();
    let avg_font = group
        .children
        .iter()
        .map(|c| c.ranking_font_size())
        .sum::<f32>()
        / n as f32;
    let font_size = group
        .children
        .iter()
        .map(|c| c.font_size)
        .fold(0.0_f32, f32::max);

    Topic {
        name: group.name.clone(),
        normalized_text: group.key.clone(),
        font_size,
        avg_font_size: Some(avg_font),
        occurrence_count,
        source_file: group.children.first().and_then(|c| c.source_file.clone()),
        has_subtopics: true,
        num_subtopics: n,
    }
}
