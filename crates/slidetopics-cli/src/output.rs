use std::collections::HashSet;
use std::io::Write;

use owo_colors::OwoColorize;
use serde::Serialize;
use slidetopics_core::{DisplayRow, PipelineStats, Topic, normalize_text};

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

/// Normalized names of topics the user already has.
#[derive(Debug, Clone, Default)]
pub struct ExistingTopics(HashSet<String>);

impl ExistingTopics {
    /// One topic name per line; blank lines are ignored.
    pub fn parse(content: &str) -> Self {
        Self(
            content
                .lines()
                .map(normalize_text)
                .filter(|n| !n.is_empty())
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, topic: &Topic) -> bool {
        self.0.contains(&topic.normalized_text)
    }
}

#[derive(Serialize)]
struct TopicEntry<'a> {
    #[serde(flatten)]
    topic: &'a Topic,
    already_exists: bool,
}

#[derive(Serialize)]
struct Report<'a> {
    topics: Vec<TopicEntry<'a>>,
    stats: &'a PipelineStats,
}

/// Write `{ "topics": [...], "stats": {...} }`.
pub fn write_json(
    w: &mut dyn Write,
    topics: &[Topic],
    stats: &PipelineStats,
    existing: &ExistingTopics,
) -> anyhow::Result<()> {
    let report = Report {
        topics: topics
            .iter()
            .map(|topic| TopicEntry {
                topic,
                already_exists: existing.contains(topic),
            })
            .collect(),
        stats,
    };
    serde_json::to_writer_pretty(&mut *w, &report)?;
    writeln!(w)?;
    Ok(())
}

/// Print the ranked topics, optionally with their subtopics indented below.
pub fn print_topics(
    w: &mut dyn Write,
    rows: &[DisplayRow<'_>],
    existing: &ExistingTopics,
    show_subtopics: bool,
    color: ColorMode,
) -> std::io::Result<()> {
    if rows.is_empty() {
        writeln!(w, "No topics found.")?;
        return Ok(());
    }

    for (i, row) in rows.iter().enumerate() {
        let topic = row.topic;
        let mut line = format!("{:>3}. {}", i + 1, topic.name);
        if topic.has_subtopics {
            line.push_str(&format!(" ({} parts)", topic.num_subtopics));
        }
        let detail = format!(
            "  pages: {}, font: {:.1}",
            topic.occurrence_count,
            topic.ranking_font_size()
        );
        let exists = existing.contains(topic);

        if color.enabled() {
            if exists {
                write!(w, "{}", line.dimmed())?;
                write!(w, "{}", " [exists]".yellow())?;
            } else {
                write!(w, "{}", line.bold())?;
            }
            writeln!(w, "{}", detail.dimmed())?;
        } else {
            write!(w, "{line}")?;
            if exists {
                write!(w, " [exists]")?;
            }
            writeln!(w, "{detail}")?;
        }

        if show_subtopics {
            for sub in &row.subtopics {
                let text = format!("       - {}", sub.candidate.text);
                if color.enabled() {
                    writeln!(w, "{}", text.cyan())?;
                } else {
                    writeln!(w, "{text}")?;
                }
            }
        }
    }
    Ok(())
}

/// Print how many candidates survived each stage.
pub fn print_funnel(w: &mut dyn Write, stats: &PipelineStats, color: ColorMode) -> std::io::Result<()> {
    writeln!(w)?;
    let header = format!(
        "Processed {} file(s), {} page(s)",
        stats.files_processed, stats.total_pages
    );
    if color.enabled() {
        writeln!(w, "{}", header.bold())?;
    } else {
        writeln!(w, "{header}")?;
    }

    let stages = [
        ("raw candidates", stats.raw_candidates),
        ("after header filter", stats.after_header_filter),
        ("after frequency filter", stats.after_frequency_filter),
        ("after clustering", stats.after_clustering),
        ("after hierarchical merge", stats.after_hierarchical_merge),
        ("final topics", stats.final_topics),
    ];
    for (label, count) in stages {
        writeln!(w, "  {label:<26}{count:>6}")?;
    }
    writeln!(w, "  {:<26}{:>6}", "adaptive cap", stats.adaptive_cap)?;
    writeln!(w, "  {:<26}{:>6}", "subtopics", stats.subtopics.len())?;

    for skipped in &stats.skipped_files {
        let msg = format!("Skipped {}: {}", skipped.filename, skipped.reason);
        if color.enabled() {
            writeln!(w, "{}", msg.red())?;
        } else {
            writeln!(w, "{msg}")?;
        }
    }
    Ok(())
}
