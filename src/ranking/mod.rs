//! Weighted multi-query relevance ranking over the vector store.
//!
//! A free-text profile is decomposed into weighted query terms by the
//! completion collaborator; each term is embedded and searched
//! independently (concurrently), and the per-term hit sets are aggregated
//! into one ranking. The blend of match frequency (`quantity_weight`) and
//! match strength (`distance_weight`) keeps a single strong-but-narrow
//! match from dominating a candidate matched broadly but moderately, and
//! vice versa; per-set normalization makes the blend scale-invariant across
//! queries with very different score distributions.

pub mod profile;

use std::sync::Arc;

use futures_util::future::join_all;
use rustc_hash::FxHashMap;
use serde::Deserialize;
use tracing::{debug, error, warn};

use crate::config::RankingConfig;
use crate::services::{ChatMessage, CompletionOutcome, CompletionService, EmbeddingService};
use crate::stores::{VectorHit, VectorStore};

const TERM_EXTRACTION_PROMPT: &str = "\
You are a retrieval query planner. You are given a free-form profile of a \
person's interests and activity. Decompose it into search query terms for a \
vector database, each with an importance weight between 0.0 and 1.0.

Respond with only a JSON array, no other text, no markdown fences:
[{\"text\": \"<query term>\", \"weight\": <0.0-1.0>}, ...]";

/// A single weighted query extracted from a profile.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct QueryTerm {
    /// Search text for the term.
    pub text: String,
    /// Importance weight in `[0, 1]`.
    pub weight: f64,
}

/// Per-candidate aggregation result, ordered by final score.
#[derive(Clone, Debug, PartialEq)]
pub struct CandidateScore {
    /// The candidate's owning-entity identifier.
    pub candidate_id: String,
    /// Number of hits across all query terms.
    pub hit_count: usize,
    /// Normalized hit frequency in `[0, 1]`.
    pub quantity_weight: f64,
    /// Normalized mean combined score in `[0, 1]`.
    pub distance_weight: f64,
    /// Final blended ranking score.
    pub score: f64,
}

/// Ranks stored candidates against a free-text profile.
pub struct RelevanceRanker {
    completion: Arc<dyn CompletionService>,
    embedder: Arc<dyn EmbeddingService>,
    store: Arc<dyn VectorStore>,
    config: RankingConfig,
}

impl RelevanceRanker {
    /// Ranker with the default configuration.
    #[must_use]
    pub fn new(
        completion: Arc<dyn CompletionService>,
        embedder: Arc<dyn EmbeddingService>,
        store: Arc<dyn VectorStore>,
    ) -> Self {
        Self {
            completion,
            embedder,
            store,
            config: RankingConfig::default(),
        }
    }

    /// Replaces the ranking configuration.
    #[must_use]
    pub fn with_config(mut self, config: RankingConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns candidate ids ordered by relevance, highest first.
    ///
    /// An empty profile, an unusable term extraction, or an empty candidate
    /// set all yield an empty list — valid outcomes, not errors.
    pub async fn rank(&self, profile: &str) -> Vec<String> {
        self.rank_scored(profile)
            .await
            .into_iter()
            .map(|candidate| candidate.candidate_id)
            .collect()
    }

    /// Like [`rank`](Self::rank) but keeps the per-candidate score detail.
    pub async fn rank_scored(&self, profile: &str) -> Vec<CandidateScore> {
        if profile.trim().is_empty() {
            debug!("empty profile; returning empty ranking");
            return Vec::new();
        }

        let terms = self.extract_terms(profile).await;
        if terms.is_empty() {
            debug!("no query terms extracted; returning empty ranking");
            return Vec::new();
        }

        // Per-term embedding and search are independent; aggregate after the
        // join barrier.
        let term_hits = join_all(terms.iter().map(|term| self.search_term(term))).await;
        score_candidates(&term_hits, &self.config)
    }

    async fn extract_terms(&self, profile: &str) -> Vec<QueryTerm> {
        let messages = [
            ChatMessage::system(TERM_EXTRACTION_PROMPT),
            ChatMessage::user(profile),
        ];
        let outcome = match self.completion.complete(&messages, &[]).await {
            Ok(outcome) => outcome,
            Err(err) => {
                error!(error = %err, "term extraction failed");
                return Vec::new();
            }
        };
        match outcome {
            CompletionOutcome::Text(text) => parse_terms(&text),
            CompletionOutcome::ToolCalls(_) => {
                warn!("term extraction returned tool calls; treating as zero terms");
                Vec::new()
            }
        }
    }

    /// One term's hit set; failures collapse to an empty set and are logged.
    async fn search_term(&self, term: &QueryTerm) -> (f64, Vec<VectorHit>) {
        let vector = match self.embedder.embed(&term.text).await {
            Ok(vector) => vector,
            Err(err) => {
                error!(term = %term.text, error = %err, "term embedding failed; excluding term");
                return (term.weight, Vec::new());
            }
        };
        match self
            .store
            .query(&vector, self.config.top_k, self.config.min_score)
            .await
        {
            Ok(hits) => (term.weight, hits),
            Err(err) => {
                error!(term = %term.text, error = %err, "term search failed; excluding term");
                (term.weight, Vec::new())
            }
        }
    }
}

/// Parses the extraction output into terms. Malformed output is zero terms.
///
/// Accepts a bare JSON array, optionally wrapped in markdown code fences.
/// Weights are clamped to `[0, 1]`; terms with empty text are dropped.
fn parse_terms(raw: &str) -> Vec<QueryTerm> {
    let stripped = strip_code_fences(raw);
    let parsed: Vec<QueryTerm> = match serde_json::from_str(stripped) {
        Ok(terms) => terms,
        Err(err) => {
            warn!(error = %err, "unparsable term extraction output; treating as zero terms");
            return Vec::new();
        }
    };
    parsed
        .into_iter()
        .filter(|term| !term.text.trim().is_empty())
        .map(|term| QueryTerm {
            weight: term.weight.clamp(0.0, 1.0),
            ..term
        })
        .collect()
}

fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

/// Per-hit combined score: similarity scaled by the term weight raised to
/// `exponent`, or 0 when either input is non-positive.
#[must_use]
pub fn combined_score(similarity: f64, weight: f64, exponent: f64) -> f64 {
    if similarity <= 0.0 || weight <= 0.0 {
        return 0.0;
    }
    similarity * weight.powf(exponent)
}

/// Aggregates per-term hit sets into the final candidate ordering.
///
/// Every hit is kept (a candidate hit by several terms accumulates all of
/// them). Candidates are normalized against the set's maxima, blended with
/// `blend_alpha`, and sorted descending; ties keep first-encounter order.
#[must_use]
pub fn score_candidates(
    term_hits: &[(f64, Vec<VectorHit>)],
    config: &RankingConfig,
) -> Vec<CandidateScore> {
    let mut order: Vec<String> = Vec::new();
    let mut combined: FxHashMap<String, Vec<f64>> = FxHashMap::default();

    for (weight, hits) in term_hits {
        for hit in hits {
            let Some(candidate_id) = candidate_id(&hit.metadata) else {
                warn!(hit_id = %hit.id, "hit metadata has no owner_id; skipping hit");
                continue;
            };
            let score = combined_score(f64::from(hit.score), *weight, config.weight_exponent);
            if !combined.contains_key(&candidate_id) {
                order.push(candidate_id.clone());
            }
            combined.entry(candidate_id).or_default().push(score);
        }
    }

    if order.is_empty() {
        return Vec::new();
    }

    let averages: FxHashMap<&str, f64> = combined
        .iter()
        .map(|(id, scores)| {
            (
                id.as_str(),
                scores.iter().sum::<f64>() / scores.len() as f64,
            )
        })
        .collect();
    let max_count = combined.values().map(Vec::len).max().unwrap_or(0);
    let max_avg = averages.values().copied().fold(0.0_f64, f64::max);

    let mut candidates: Vec<CandidateScore> = order
        .into_iter()
        .map(|candidate_id| {
            let hit_count = combined[&candidate_id].len();
            let avg = averages[candidate_id.as_str()];
            let quantity_weight = if max_count == 0 {
                0.0
            } else {
                hit_count as f64 / max_count as f64
            };
            let distance_weight = if max_avg <= 0.0 { 0.0 } else { avg / max_avg };
            let score = config.blend_alpha * quantity_weight
                + (1.0 - config.blend_alpha) * distance_weight;
            CandidateScore {
                candidate_id,
                hit_count,
                quantity_weight,
                distance_weight,
                score,
            }
        })
        .collect();

    // Stable sort keeps first-encounter order on ties.
    candidates.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    candidates
}

fn candidate_id(metadata: &serde_json::Value) -> Option<String> {
    metadata
        .get("owner_id")
        .and_then(serde_json::Value::as_str)
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn hit(owner: &str, score: f32) -> VectorHit {
        VectorHit {
            id: format!("{owner}-hit"),
            score,
            metadata: json!({ "owner_id": owner }),
        }
    }

    #[test]
    fn parse_terms_accepts_bare_and_fenced_json() {
        let bare = r#"[{"text": "travel camera", "weight": 0.9}]"#;
        let fenced = format!("```json\n{bare}\n```");
        assert_eq!(parse_terms(bare).len(), 1);
        assert_eq!(parse_terms(&fenced).len(), 1);
        assert_eq!(parse_terms(bare)[0].text, "travel camera");
    }

    #[test]
    fn parse_terms_clamps_weights_and_drops_empty_text() {
        let raw = r#"[
            {"text": "kept", "weight": 1.8},
            {"text": "   ", "weight": 0.5},
            {"text": "negative", "weight": -0.3}
        ]"#;
        let terms = parse_terms(raw);
        assert_eq!(terms.len(), 2);
        assert_eq!(terms[0].weight, 1.0);
        assert_eq!(terms[1].weight, 0.0);
    }

    #[test]
    fn parse_terms_malformed_is_zero_terms() {
        assert!(parse_terms("no json here").is_empty());
        assert!(parse_terms("{\"text\": \"not an array\"}").is_empty());
        assert!(parse_terms("").is_empty());
    }

    #[test]
    fn combined_score_zeroes_non_positive_inputs() {
        assert_eq!(combined_score(0.0, 0.9, 1.5), 0.0);
        assert_eq!(combined_score(-0.2, 0.9, 1.5), 0.0);
        assert_eq!(combined_score(0.8, 0.0, 1.5), 0.0);
        assert!(combined_score(0.8, 0.9, 1.5) > 0.0);
    }

    #[test]
    fn combined_score_is_monotone_in_weight() {
        let mut previous = 0.0;
        for step in 1..=10 {
            let weight = f64::from(step) / 10.0;
            let score = combined_score(0.8, weight, 1.5);
            assert!(score >= previous, "weight {weight} decreased the score");
            previous = score;
        }
    }

    #[test]
    fn disjoint_candidates_rank_by_term_weight() {
        let term_hits = vec![
            (0.5, vec![hit("mid", 0.8)]),
            (0.1, vec![hit("low", 0.8)]),
            (0.9, vec![hit("high", 0.8)]),
        ];
        let ranked = score_candidates(&term_hits, &RankingConfig::default());
        let ids: Vec<&str> = ranked.iter().map(|c| c.candidate_id.as_str()).collect();
        assert_eq!(ids, vec!["high", "mid", "low"]);
    }

    #[test]
    fn normalization_bounds_hold_and_maxima_are_reached() {
        let term_hits = vec![
            (0.9, vec![hit("broad", 0.6), hit("strong", 0.95)]),
            (0.7, vec![hit("broad", 0.55)]),
            (0.4, vec![hit("broad", 0.5)]),
        ];
        let ranked = score_candidates(&term_hits, &RankingConfig::default());
        assert!(!ranked.is_empty());
        for candidate in &ranked {
            assert!((0.0..=1.0).contains(&candidate.quantity_weight));
            assert!((0.0..=1.0).contains(&candidate.distance_weight));
        }
        assert!(ranked.iter().any(|c| c.quantity_weight == 1.0));
        assert!(ranked.iter().any(|c| c.distance_weight == 1.0));
    }

    #[test]
    fn all_hits_accumulate_not_just_the_best() {
        let term_hits = vec![
            (1.0, vec![hit("both", 0.9), hit("single", 0.5)]),
            (1.0, vec![hit("both", 0.3)]),
        ];
        let ranked = score_candidates(&term_hits, &RankingConfig::default());
        let both = ranked
            .iter()
            .find(|c| c.candidate_id == "both")
            .expect("candidate present");
        let single = ranked
            .iter()
            .find(|c| c.candidate_id == "single")
            .expect("candidate present");
        assert_eq!(both.hit_count, 2);
        // "both" averages (0.9 + 0.3) / 2 = 0.6, the set maximum; "single"
        // normalizes against the mean, not against the best hit (0.9).
        assert!((both.distance_weight - 1.0).abs() < 1e-12);
        assert!((single.distance_weight - 0.5 / 0.6).abs() < 1e-12);
    }

    #[test]
    fn ties_keep_first_encounter_order() {
        let term_hits = vec![(0.8, vec![hit("first", 0.7), hit("second", 0.7)])];
        let ranked = score_candidates(&term_hits, &RankingConfig::default());
        assert_eq!(ranked[0].candidate_id, "first");
        assert_eq!(ranked[1].candidate_id, "second");
        assert_eq!(ranked[0].score, ranked[1].score);
    }

    #[test]
    fn empty_hit_sets_yield_empty_ranking() {
        let term_hits: Vec<(f64, Vec<VectorHit>)> = vec![(0.9, Vec::new())];
        assert!(score_candidates(&term_hits, &RankingConfig::default()).is_empty());
        assert!(score_candidates(&[], &RankingConfig::default()).is_empty());
    }

    #[test]
    fn hits_without_owner_metadata_are_skipped() {
        let orphan = VectorHit {
            id: "orphan".into(),
            score: 0.9,
            metadata: json!({ "content": "no owner" }),
        };
        let term_hits = vec![(0.9, vec![orphan, hit("kept", 0.8)])];
        let ranked = score_candidates(&term_hits, &RankingConfig::default());
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].candidate_id, "kept");
    }
}
