use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, Thresholds};

/// `config.toml` contents. Every key is optional; missing keys fall back to
/// [`Thresholds::default`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    pub thresholds: Option<ThresholdsConfig>,
    pub extraction: Option<ExtractionConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThresholdsConfig {
    pub font_tolerance: Option<f32>,
    pub header_band: Option<f32>,
    pub footer_band: Option<f32>,
    pub min_line_chars: Option<usize>,
    pub max_line_chars: Option<usize>,
    pub min_alnum_ratio: Option<f64>,
    pub repeated_header_ratio: Option<f64>,
    pub min_frequency_ratio: Option<f64>,
    pub min_frequency_floor: Option<usize>,
    pub similarity_threshold: Option<f64>,
    pub representative_max_chars: Option<usize>,
    pub cap_floor: Option<usize>,
    pub cap_ceiling: Option<usize>,
    pub cap_multiplier: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Stop reading a file after this many pages.
    pub max_pages_per_file: Option<usize>,
}

impl ConfigFile {
    /// Resolve the `[thresholds]` table over the built-in defaults.
    pub fn thresholds(&self) -> Thresholds {
        let d = Thresholds::default();
        let Some(t) = self.thresholds.as_ref() else {
            return d;
        };
        Thresholds {
            font_tolerance: t.font_tolerance.unwrap_or(d.font_tolerance),
            header_band: t.header_band.unwrap_or(d.header_band),
            footer_band: t.footer_band.unwrap_or(d.footer_band),
            min_line_chars: t.min_line_chars.unwrap_or(d.min_line_chars),
            max_line_chars: t.max_line_chars.unwrap_or(d.max_line_chars),
            min_alnum_ratio: t.min_alnum_ratio.unwrap_or(d.min_alnum_ratio),
            repeated_header_ratio: t.repeated_header_ratio.unwrap_or(d.repeated_header_ratio),
            min_frequency_ratio: t.min_frequency_ratio.unwrap_or(d.min_frequency_ratio),
            min_frequency_floor: t.min_frequency_floor.unwrap_or(d.min_frequency_floor),
            similarity_threshold: t.similarity_threshold.unwrap_or(d.similarity_threshold),
            representative_max_chars: t
                .representative_max_chars
                .unwrap_or(d.representative_max_chars),
            cap_floor: t.cap_floor.unwrap_or(d.cap_floor),
            cap_ceiling: t.cap_ceiling.unwrap_or(d.cap_ceiling),
            cap_multiplier: t.cap_multiplier.unwrap_or(d.cap_multiplier),
        }
    }

    pub fn max_pages_per_file(&self) -> Option<usize> {
        self.extraction.as_ref().and_then(|e| e.max_pages_per_file)
    }
}

/// Platform config directory path: `<config_dir>/slidetopics/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("slidetopics").join("config.toml"))
}

/// Platform config, overlaid by `./.slidetopics.toml` when present.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(".slidetopics.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// `None` when `path` is missing or fails to parse; parse failures are logged.
pub fn load_from_path(path: &Path) -> Option<ConfigFile> {
    if !path.exists() {
        return None;
    }
    match read_config(path) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable config");
            None
        }
    }
}

/// Read and parse a config file, surfacing IO and TOML errors.
pub fn read_config(path: &Path) -> Result<ConfigFile, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Key-by-key merge where `overlay` wins.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    let thresholds = match (base.thresholds, overlay.thresholds) {
        (None, None) => None,
        (b, o) => {
            let b = b.unwrap_or_default();
            let o = o.unwrap_or_default();
            Some(ThresholdsConfig {
                font_tolerance: o.font_tolerance.or(b.font_tolerance),
                header_band: o.header_band.or(b.header_band),
                footer_band: o.footer_band.or(b.footer_band),
                min_line_chars: o.min_line_chars.or(b.min_line_chars),
                max_line_chars: o.max_line_chars.or(b.max_line_chars),
                min_alnum_ratio: o.min_alnum_ratio.or(b.min_alnum_ratio),
                repeated_header_ratio: o.repeated_header_ratio.or(b.repeated_header_ratio),
                min_frequency_ratio: o.min_frequency_ratio.or(b.min_frequency_ratio),
                min_frequency_floor: o.min_frequency_floor.or(b.min_frequency_floor),
                similarity_threshold: o.similarity_threshold.or(b.similarity_threshold),
                representative_max_chars: o
                    .representative_max_chars
                    .or(b.representative_max_chars),
                cap_floor: o.cap_floor.or(b.cap_floor),
                cap_ceiling: o.cap_ceiling.or(b.cap_ceiling),
                cap_multiplier: o.cap_multiplier.or(b.cap_multiplier),
            })
        }
    };

    let extraction = match (base.extraction, overlay.extraction) {
        (None, None) => None,
        (b, o) => Some(ExtractionConfig {
            max_pages_per_file: o
                .and_then(|e| e.max_pages_per_file)
                .or_else(|| b.and_then(|e| e.max_pages_per_file)),
        }),
    };

    ConfigFile {
        thresholds,
        extraction,
    }
}
