//! Pipeline configuration with environment overrides.
//!
//! Plain structs with `Default` and builder-style setters. `from_env` loads
//! a `.env` file when present and applies `RAGTREE_*` overrides; unset or
//! unparsable variables fall back to the defaults.

use std::str::FromStr;

/// Default restored-paragraph length at which summarization kicks in.
pub const DEFAULT_SUMMARY_THRESHOLD: usize = 200;

/// Controls the ingestion pipeline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IngestionConfig {
    /// Restored-paragraph length (characters) at or above which the
    /// summarizer runs before embedding. Inclusive boundary.
    pub summary_threshold: usize,
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            summary_threshold: DEFAULT_SUMMARY_THRESHOLD,
        }
    }
}

impl IngestionConfig {
    /// Overrides the summarization threshold.
    #[must_use]
    pub fn with_summary_threshold(mut self, threshold: usize) -> Self {
        self.summary_threshold = threshold;
        self
    }

    /// Defaults overridden by `RAGTREE_SUMMARY_THRESHOLD`.
    #[must_use]
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self {
            summary_threshold: env_or("RAGTREE_SUMMARY_THRESHOLD", DEFAULT_SUMMARY_THRESHOLD),
        }
    }
}

/// Controls the relevance ranker.
#[derive(Clone, Debug, PartialEq)]
pub struct RankingConfig {
    /// Nearest neighbors fetched per query term.
    pub top_k: usize,
    /// Similarity floor for neighbor hits.
    pub min_score: f32,
    /// Exponent applied to term weights in the combined score.
    pub weight_exponent: f64,
    /// Blend factor: `score = α · quantity + (1-α) · distance`.
    pub blend_alpha: f64,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            top_k: 10,
            min_score: 0.5,
            weight_exponent: 1.5,
            blend_alpha: 0.5,
        }
    }
}

impl RankingConfig {
    /// Overrides the per-term neighbor count.
    #[must_use]
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Overrides the similarity floor.
    #[must_use]
    pub fn with_min_score(mut self, min_score: f32) -> Self {
        self.min_score = min_score;
        self
    }

    /// Overrides the weight exponent.
    #[must_use]
    pub fn with_weight_exponent(mut self, exponent: f64) -> Self {
        self.weight_exponent = exponent;
        self
    }

    /// Overrides the blend factor, clamped to `[0, 1]`.
    #[must_use]
    pub fn with_blend_alpha(mut self, alpha: f64) -> Self {
        self.blend_alpha = alpha.clamp(0.0, 1.0);
        self
    }

    /// Defaults overridden by `RAGTREE_TOP_K`, `RAGTREE_MIN_SCORE`,
    /// `RAGTREE_WEIGHT_EXPONENT`, and `RAGTREE_BLEND_ALPHA`.
    #[must_use]
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let defaults = Self::default();
        Self {
            top_k: env_or("RAGTREE_TOP_K", defaults.top_k),
            min_score: env_or("RAGTREE_MIN_SCORE", defaults.min_score),
            weight_exponent: env_or("RAGTREE_WEIGHT_EXPONENT", defaults.weight_exponent),
            blend_alpha: env_or::<f64>("RAGTREE_BLEND_ALPHA", defaults.blend_alpha)
                .clamp(0.0, 1.0),
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(default)
}
