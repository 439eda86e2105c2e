use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid threshold `{field}`: {reason}")]
    InvalidThreshold { field: &'static str, reason: String },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Numeric constants of the topic pipeline.
///
/// Every stage receives these explicitly; `Thresholds::default()` is the
/// tuned set used in production.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    // ── page.rs ──
    /// Lines must be at least this fraction of the page's largest font size.
    pub font_tolerance: f32,
    /// Lines whose top edge is above this fraction of page height are headers.
    pub header_band: f32,
    /// Lines whose top edge is below this fraction of page height are footers.
    pub footer_band: f32,
    pub min_line_chars: usize,
    pub max_line_chars: usize,
    /// Minimum share of alphanumeric characters in a candidate line.
    pub min_alnum_ratio: f64,

    // ── headers.rs ──
    /// Text on more than this fraction of pages is a running banner.
    pub repeated_header_ratio: f64,

    // ── frequency.rs ──
    pub min_frequency_ratio: f64,
    pub min_frequency_floor: usize,

    // ── cluster.rs ──
    /// Similarity (0–100) at or above which two topics share a cluster.
    pub similarity_threshold: f64,
    /// Text length beyond which longer cluster members gain no preference.
    pub representative_max_chars: usize,

    // ── rank.rs ──
    pub cap_floor: usize,
    pub cap_ceiling: usize,
    pub cap_multiplier: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            font_tolerance: 0.95,
            header_band: 0.05,
            footer_band: 0.90,
            min_line_chars: 6,
            max_line_chars: 80,
            min_alnum_ratio: 0.5,
            repeated_header_ratio: 0.10,
            min_frequency_ratio: 0.03,
            min_frequency_floor: 2,
            similarity_threshold: 90.0,
            representative_max_chars: 80,
            cap_floor: 8,
            cap_ceiling: 25,
            cap_multiplier: 3.0,
        }
    }
}

impl Thresholds {
    /// Reject combinations that would make a stage meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn fraction(field: &'static str, v: f64) -> Result<(), ConfigError> {
            if (0.0..=1.0).contains(&v) {
                Ok(())
            } else {
                Err(ConfigError::InvalidThreshold {
                    field,
                    reason: format!("{v} is outside 0.0..=1.0"),
                })
            }
        }

        fraction("font_tolerance", self.font_tolerance as f64)?;
        fraction("header_band", self.header_band as f64)?;
        fraction("footer_band", self.footer_band as f64)?;
        fraction("min_alnum_ratio", self.min_alnum_ratio)?;
        fraction("repeated_header_ratio", self.repeated_header_ratio)?;
        fraction("min_frequency_ratio", self.min_frequency_ratio)?;

        if self.header_band >= self.footer_band {
            return Err(ConfigError::InvalidThreshold {
                field: "header_band",
                reason: format!(
                    "header band {} must lie above footer band {}",
                    self.header_band, self.footer_band
                ),
            });
        }
        if self.min_line_chars > self.max_line_chars {
            return Err(ConfigError::InvalidThreshold {
                field: "min_line_chars",
                reason: format!("{} exceeds max_line_chars {}", self.min_line_chars, self.max_line_chars),
            });
        }
        if !(0.0..=100.0).contains(&self.similarity_threshold) {
            return Err(ConfigError::InvalidThreshold {
                field: "similarity_threshold",
                reason: format!("{} is outside 0..=100", self.similarity_threshold),
            });
        }
        if self.cap_floor > self.cap_ceiling {
            return Err(ConfigError::InvalidThreshold {
                field: "cap_floor",
                reason: format!("{} exceeds cap_ceiling {}", self.cap_floor, self.cap_ceiling),
            });
        }
        if self.cap_multiplier.is_nan() || self.cap_multiplier < 0.0 {
            return Err(ConfigError::InvalidThreshold {
                field: "cap_multiplier",
                reason: format!("{} must be non-negative", self.cap_multiplier),
            });
        }
        Ok(())
    }
}
