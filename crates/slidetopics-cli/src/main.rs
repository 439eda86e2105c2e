use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use slidetopics_core::config_file::{ConfigFile, load_config, read_config};
use slidetopics_core::{TopicExtractor, group_subtopics, normalize_text};
use slidetopics_mupdf::MupdfExtractor;

mod output;

use output::{ColorMode, ExistingTopics};

/// Slide Topic Extractor - Find the recurring course topics in lecture slide PDFs
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract ranked topics from one or more slide-deck PDFs
    Extract {
        /// PDF files making up the course
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Emit topics and pipeline statistics as JSON
        #[arg(long)]
        json: bool,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,

        /// List the numbered parts folded under each topic
        #[arg(long)]
        show_subtopics: bool,

        /// Read at most this many pages per file (0 = no limit)
        #[arg(long)]
        max_pages: Option<usize>,

        /// Skip fuzzy clustering of near-duplicate titles
        #[arg(long)]
        no_fuzzy: bool,

        /// File of already known topics, one per line; matches are flagged
        #[arg(long)]
        existing: Option<PathBuf>,

        /// Path to output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Config file to use instead of the platform/CWD cascade
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Print the normalized form of each argument
    Normalize {
        /// Texts to normalize
        #[arg(required = true)]
        texts: Vec<String>,
    },
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Normalize { texts } => {
            for text in texts {
                println!("{}", normalize_text(&text));
            }
            Ok(())
        }
        Command::Extract {
            files,
            json,
            no_color,
            show_subtopics,
            max_pages,
            no_fuzzy,
            existing,
            output,
            config,
        } => extract(ExtractArgs {
            files,
            json,
            no_color,
            show_subtopics,
            max_pages,
            no_fuzzy,
            existing,
            output,
            config,
        }),
    }
}

struct ExtractArgs {
    files: Vec<PathBuf>,
    json: bool,
    no_color: bool,
    show_subtopics: bool,
    max_pages: Option<usize>,
    no_fuzzy: bool,
    existing: Option<PathBuf>,
    output: Option<PathBuf>,
    config: Option<PathBuf>,
}

fn extract(args: ExtractArgs) -> anyhow::Result<()> {
    let config = match &args.config {
        Some(path) => read_config(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => load_config(),
    };

    let thresholds = config.thresholds();
    thresholds.validate().context("Invalid thresholds in config")?;

    // Priority: CLI flag > env var > config file
    let max_pages = resolve_max_pages(args.max_pages, &config)?;
    if let Some(limit) = max_pages {
        tracing::info!(limit, "page budget per file");
    }

    let existing = match &args.existing {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read existing topics {}", path.display()))?;
            let existing = ExistingTopics::parse(&content);
            tracing::info!(path = %path.display(), topics = existing.len(), "loaded existing topics");
            existing
        }
        None => ExistingTopics::default(),
    };

    let mut inputs = Vec::with_capacity(args.files.len());
    for path in &args.files {
        let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
        inputs.push((bytes, display_name(path)));
    }

    let backend = MupdfExtractor::new().with_max_pages(max_pages.unwrap_or(0));
    let mut extractor = TopicExtractor::new().with_thresholds(thresholds);
    if args.no_fuzzy {
        extractor = extractor.with_scorer(None);
    }

    let (topics, stats) = extractor.extract_topics(&inputs, &backend);

    let mut writer: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(
            std::fs::File::create(path)
                .with_context(|| format!("Failed to create output file {}", path.display()))?,
        ),
        None => Box::new(std::io::stdout().lock()),
    };

    if args.json {
        output::write_json(&mut *writer, &topics, &stats, &existing)?;
    } else {
        // Files never get ANSI codes.
        let color = ColorMode(!args.no_color && args.output.is_none());
        let rows = group_subtopics(&topics, &stats.subtopics);
        output::print_topics(&mut *writer, &rows, &existing, args.show_subtopics, color)?;
        output::print_funnel(&mut *writer, &stats, color)?;
    }
    writer.flush()?;

    if stats.files_processed == 0 && !inputs.is_empty() {
        anyhow::bail!("None of the {} input file(s) could be read", inputs.len());
    }
    Ok(())
}

fn resolve_max_pages(flag: Option<usize>, config: &ConfigFile) -> anyhow::Result<Option<usize>> {
    if flag.is_some() {
        return Ok(flag);
    }
    if let Ok(value) = std::env::var("SLIDETOPICS_MAX_PAGES") {
        let parsed = value
            .trim()
            .parse::<usize>()
            .with_context(|| format!("SLIDETOPICS_MAX_PAGES is not a page count: {value:?}"))?;
        return Ok(Some(parsed));
    }
    Ok(config.max_pages_per_file())
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
