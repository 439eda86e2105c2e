//! End-to-end tests for the topic pipeline.
//!
//! Decks are described as lists of slide titles and served by a mock
//! [`PageTextExtractor`], so no PDF library is involved.

use std::collections::HashMap;

use slidetopics_core::frequency::min_occurrences;
use slidetopics_core::headers::max_allowed_pages;
use slidetopics_core::rank::adaptive_cap;
use slidetopics_core::{
    ExtractError, PageText, PageTextExtractor, TextLine, Thresholds, TopicExtractor, extract_topic_candidates,
    normalize_text,
};

const COURSE_BANNER: &str = "Economics 101 - Fall 2024";
const RUNNING_TITLE: &str = "Intermediate Microeconomics";

const SECTION_TOPICS: [&str; 13] = [
    "Supply and Demand",
    "Consumer Choice Theory",
    "Production Functions",
    "Cost Curves",
    "Perfect Competition",
    "Monopoly Pricing",
    "Price Discrimination",
    "Game Theory Basics",
    "Market Failures",
    "Public Goods",
    "Externalities and Taxes",
    "Labor Markets",
    "General Equilibrium",
];

const OLIGOPOLY_PARTS: [&str; 3] = [
    "Oligopoly I: Cournot",
    "Oligopoly II: Bertrand",
    "Oligopoly III: Stackelberg",
];

const BOILERPLATE_SLIDES: [&str; 4] = ["Agenda", "Thank You", "Questions?", "Summary"];

/// Serves pre-built pages keyed by filename; unknown files fail to open.
#[derive(Default)]
struct MockDecks {
    decks: HashMap<String, Vec<PageText>>,
}

impl MockDecks {
    fn with_deck(mut self, filename: &str, pages: Vec<PageText>) -> Self {
        self.decks.insert(filename.to_string(), pages);
        self
    }
}

impl PageTextExtractor for MockDecks {
    fn extract_pages(&self, _bytes: &[u8], filename: &str) -> Result<Vec<PageText>, ExtractError> {
        self.decks
            .get(filename)
            .cloned()
            .ok_or_else(|| ExtractError::Open(format!("not a PDF: {filename}")))
    }
}

/// One slide: optional banner lines, an optional title, and body text.
fn slide(title: Option<&str>, banners: &[&str]) -> PageText {
    let mut lines: Vec<TextLine> = banners
        .iter()
        .enumerate()
        .map(|(i, b)| TextLine::new(*b, 28.0, 40.0 + 20.0 * i as f32))
        .collect();
    if let Some(t) = title {
        lines.push(TextLine::new(t, 28.0, 120.0));
    }
    lines.push(TextLine::new("Some explanatory body text on the slide", 14.0, 300.0));
    lines.push(TextLine::new("Page footer line", 10.0, 580.0));
    PageText { height: 600.0, lines }
}

/// The reference 100-page lecture deck.
fn reference_deck() -> Vec<PageText> {
    let mut titles: Vec<String> = Vec::new();
    for (i, topic) in SECTION_TOPICS.iter().enumerate() {
        let times = 3 + i % 3;
        titles.extend(std::iter::repeat_n(topic.to_string(), times));
    }
    for part in OLIGOPOLY_PARTS {
        titles.extend(std::iter::repeat_n(part.to_string(), 3));
    }
    titles.extend(BOILERPLATE_SLIDES.iter().map(|s| s.to_string()));
    titles.extend((1..=20).map(|i| format!("Worked Example Number {i}")));
    assert!(titles.len() <= 100);

    (0..100)
        .map(|p| {
            let mut banners = vec![COURSE_BANNER];
            if p < 90 {
                banners.push(RUNNING_TITLE);
            }
            slide(titles.get(p).map(String::as_str), &banners)
        })
        .collect()
}

fn run_reference() -> (Vec<slidetopics_core::Topic>, slidetopics_core::PipelineStats) {
    let backend = MockDecks::default().with_deck("econ.pdf", reference_deck());
    let files = vec![(Vec::<u8>::new(), "econ.pdf".to_string())];
    extract_topic_candidates(&files, &backend)
}

#[test]
fn reference_deck_drops_banners_and_one_offs() {
    let (topics, stats) = run_reference();
    let names: Vec<&str> = topics.iter().map(|t| t.name.as_str()).collect();

    assert!(!names.contains(&COURSE_BANNER));
    assert!(!names.contains(&RUNNING_TITLE));
    assert!(!names.contains(&"Agenda"));
    assert!(!names.iter().any(|n| n.starts_with("Worked Example")));

    assert_eq!(stats.files_processed, 1);
    assert_eq!(stats.total_pages, 100);
    // 90 running titles + 80 non-boilerplate slide titles
    assert_eq!(stats.raw_candidates, 170);
    assert_eq!(stats.after_header_filter, 80);
    assert_eq!(stats.after_frequency_filter, 16);
    assert_eq!(stats.after_hierarchical_merge, 14);
}

#[test]
fn reference_deck_merges_oligopoly_parts() {
    let (topics, stats) = run_reference();

    let oligopoly = topics
        .iter()
        .find(|t| t.name == "Oligopoly")
        .expect("parent topic present");
    assert!(oligopoly.has_subtopics);
    assert_eq!(oligopoly.num_subtopics, 3);
    assert_eq!(oligopoly.occurrence_count, 9);

    assert_eq!(stats.subtopics.len(), 3);
    assert!(stats.subtopics.iter().all(|s| s.parent_topic == "Oligopoly"));
    assert!(!topics.iter().any(|t| t.name.starts_with("Oligopoly I")));
}

#[test]
fn reference_deck_final_count_in_range() {
    let (topics, stats) = run_reference();
    assert!((8..=25).contains(&topics.len()), "got {} topics", topics.len());
    assert_eq!(stats.final_topics, topics.len());
    assert_eq!(stats.adaptive_cap, 25);
    for topic in SECTION_TOPICS {
        assert!(topics.iter().any(|t| t.name == topic), "missing {topic}");
    }
}

#[test]
fn reference_deck_ranked_by_occurrence() {
    let (topics, _) = run_reference();
    assert_eq!(topics[0].name, "Oligopoly");
    assert!(topics.windows(2).all(|w| w[0].occurrence_count >= w[1].occurrence_count));
}

#[test]
fn final_topics_satisfy_invariants() {
    let (topics, stats) = run_reference();
    let t = Thresholds::default();

    let min = min_occurrences(stats.total_pages, &t);
    assert!(topics.iter().all(|topic| topic.occurrence_count >= min));

    assert!(topics.len() <= adaptive_cap(stats.total_pages, &t));
    assert!(topics.len() <= stats.after_hierarchical_merge);

    for a in &topics {
        for b in &topics {
            if a.normalized_text != b.normalized_text {
                assert!(
                    !b.normalized_text.contains(a.normalized_text.as_str()),
                    "{:?} is a substring of {:?}",
                    a.name,
                    b.name
                );
            }
        }
    }
}

#[test]
fn header_filter_bound_holds_for_any_page_count() {
    let t = Thresholds::default();
    for total in 1..=60 {
        // A banner on every page of a `total`-page deck, plus one title
        // repeated on exactly max_allowed_pages pages.
        let allowed = max_allowed_pages(total, &t);
        let pages: Vec<PageText> = (0..total)
            .map(|p| {
                let title = (p < allowed).then_some("Bounded Heading");
                slide(title, &["Recurring Banner Line"])
            })
            .collect();
        let backend = MockDecks::default().with_deck("deck.pdf", pages);
        let (candidates, n) = TopicExtractor::new()
            .extract_file_candidates(b"", "deck.pdf", &backend)
            .unwrap();
        assert_eq!(n, total);

        let kept = slidetopics_core::headers::filter_repeated_headers(candidates, total, &t);
        if total > allowed {
            assert!(kept.iter().all(|c| c.text != "Recurring Banner Line"), "total={total}");
        }
        assert_eq!(
            kept.iter().filter(|c| c.text == "Bounded Heading").count(),
            allowed,
            "total={total}"
        );
    }
}

#[test]
fn multiple_files_form_one_corpus() {
    // Each topic appears twice per 30-page file: 4 of 60 pages combined.
    let deck = |prefix: &str| -> Vec<PageText> {
        (0..30)
            .map(|p| {
                let title = match p {
                    0 | 1 => Some("Bargaining Models".to_string()),
                    2 | 3 => Some("Auction Formats".to_string()),
                    _ => Some(format!("{prefix} Filler Slide {p}")),
                };
                slide(title.as_deref(), &[])
            })
            .collect()
    };
    let backend = MockDecks::default()
        .with_deck("week1.pdf", deck("Alpha"))
        .with_deck("week2.pdf", deck("Beta"));
    let files = vec![
        (Vec::<u8>::new(), "week1.pdf".to_string()),
        (Vec::<u8>::new(), "week2.pdf".to_string()),
    ];

    let (topics, stats) = extract_topic_candidates(&files, &backend);
    assert_eq!(stats.files_processed, 2);
    assert_eq!(stats.total_pages, 60);

    let names: Vec<&str> = topics.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["Bargaining Models", "Auction Formats"]);
    assert!(topics.iter().all(|t| t.occurrence_count == 4));
}

#[test]
fn unreadable_file_does_not_abort_batch() {
    let backend = MockDecks::default().with_deck("econ.pdf", reference_deck());
    let files = vec![
        (b"garbage".to_vec(), "corrupt.pdf".to_string()),
        (Vec::new(), "econ.pdf".to_string()),
    ];

    let (topics, stats) = extract_topic_candidates(&files, &backend);
    assert_eq!(stats.files_processed, 1);
    assert_eq!(stats.skipped_files.len(), 1);
    assert_eq!(stats.skipped_files[0].filename, "corrupt.pdf");
    assert!(stats.skipped_files[0].reason.contains("not a PDF"));
    assert!(!topics.is_empty());
}

#[test]
fn all_files_unreadable_yields_empty_result() {
    let backend = MockDecks::default();
    let files = vec![(b"x".to_vec(), "a.pdf".to_string()), (b"y".to_vec(), "b.pdf".to_string())];

    let (topics, stats) = extract_topic_candidates(&files, &backend);
    assert!(topics.is_empty());
    assert_eq!(stats.files_processed, 0);
    assert_eq!(stats.total_pages, 0);
    assert_eq!(stats.skipped_files.len(), 2);
}

#[test]
fn zero_files() {
    let files: Vec<(Vec<u8>, String)> = Vec::new();
    let (topics, stats) = extract_topic_candidates(&files, &MockDecks::default());
    assert!(topics.is_empty());
    assert_eq!(stats.files_processed, 0);
    assert_eq!(stats.total_pages, 0);
    assert_eq!(stats.raw_candidates, 0);
    assert!(stats.subtopics.is_empty());
}

#[test]
fn pipeline_is_deterministic() {
    let (a, sa) = run_reference();
    let (b, sb) = run_reference();
    assert_eq!(a, b);
    assert_eq!(sa, sb);
}

#[test]
fn without_scorer_clustering_is_skipped() {
    let backend = MockDecks::default().with_deck("econ.pdf", reference_deck());
    let files = vec![(Vec::<u8>::new(), "econ.pdf".to_string())];

    let (topics, stats) = TopicExtractor::new()
        .with_scorer(None)
        .extract_topics(&files, &backend);
    assert_eq!(stats.after_clustering, stats.after_frequency_filter);
    assert!(topics.iter().any(|t| t.name == "Oligopoly"));
}

#[test]
fn custom_thresholds_change_the_cap() {
    let backend = MockDecks::default().with_deck("econ.pdf", reference_deck());
    let files = vec![(Vec::<u8>::new(), "econ.pdf".to_string())];
    let thresholds = Thresholds {
        cap_ceiling: 10,
        ..Thresholds::default()
    };

    let (topics, stats) = TopicExtractor::new()
        .with_thresholds(thresholds)
        .extract_topics(&files, &backend);
    assert_eq!(stats.adaptive_cap, 10);
    assert_eq!(topics.len(), 10);
}

#[test]
fn caller_duplicate_check_uses_normalized_names() {
    let (topics, _) = run_reference();
    let existing = ["supply AND demand.", "GAME THEORY basics!"];
    let existing: Vec<String> = existing.iter().map(|s| normalize_text(s)).collect();

    let duplicates: Vec<&str> = topics
        .iter()
        .filter(|t| existing.contains(&normalize_text(&t.name)))
        .map(|t| t.name.as_str())
        .collect();
    assert_eq!(duplicates.len(), 2);
    assert!(duplicates.contains(&"Game Theory Basics"));
}

#[test]
fn topics_serialize_to_json() {
    let (topics, stats) = run_reference();
    let json = serde_json::to_value(&topics).unwrap();
    assert_eq!(json[0]["name"], "Oligopoly");
    assert_eq!(json[0]["has_subtopics"], true);

    let stats_json = serde_json::to_value(&stats).unwrap();
    assert_eq!(stats_json["total_pages"], 100);
    assert_eq!(stats_json["subtopics"][0]["parent_topic"], "Oligopoly");
    assert_eq!(stats_json["subtopics"][0]["text"], "Oligopoly I: Cournot");
}
