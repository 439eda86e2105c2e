/// String similarity on a 0–100 scale, symmetric.
///
/// Inputs are already normalized, so implementations need not care about
/// case or punctuation.
pub trait SimilarityScorer: Send + Sync {
    fn ratio(&self, a: &str, b: &str) -> f64;
}

/// Indel-distance ratio from `rapidfuzz`.
#[cfg(feature = "fuzzy")]
#[derive(Debug, Clone, Copy, Default)]
pub struct RapidFuzzScorer;

#[cfg(feature = "fuzzy")]
impl SimilarityScorer for RapidFuzzScorer {
    fn ratio(&self, a: &str, b: &str) -> f64 {
        rapidfuzz::fuzz::ratio(a.chars(), b.chars()) * 100.0
    }
}

/// The scorer compiled into this build, or `None` when the `fuzzy` feature is
/// off, in which case clustering is skipped.
pub fn default_scorer() -> Option<Box<dyn SimilarityScorer>> {
    #[cfg(feature = "fuzzy")]
    {
        Some(Box::new(RapidFuzzScorer))
    }
    #[cfg(not(feature = "fuzzy"))]
    {
        None
    }
}
