//! Similarity policies used to group hypotheses into agreement clusters.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Default Jaccard threshold for two answers to count as agreeing.
pub const DEFAULT_JACCARD_THRESHOLD: f64 = 0.6;

/// Tokens that flip the polarity of a statement.
///
/// Contractions are split on the apostrophe, so `isn't` yields `isn`.
const NEGATIONS: &[&str] = &[
    "not", "no", "never", "none", "nothing", "neither", "nor", "cannot", "isn", "aren", "wasn",
    "weren", "don", "doesn", "didn", "won", "wouldn", "shouldn", "couldn", "hasn", "haven",
    "hadn",
];

/// Decides how alike two answers are.
///
/// Implementations must be deterministic: the same pair of texts always
/// yields the same score, in `[0.0, 1.0]`.
pub trait SimilarityPolicy: Send + Sync {
    /// Similarity score between two answers.
    fn similarity(&self, a: &str, b: &str) -> f64;

    /// Minimum score at which two answers belong to the same cluster.
    fn threshold(&self) -> f64;

    /// Short name used in logs.
    fn name(&self) -> &'static str;

    fn agrees(&self, a: &str, b: &str) -> bool {
        self.similarity(a, b) >= self.threshold()
    }
}

/// Jaccard index over lowercased alphanumeric tokens.
///
/// Two answers whose numbers differ, or where only one side is negated,
/// score 0 regardless of how many other words they share.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TokenJaccard {
    pub threshold: f64,
}

impl TokenJaccard {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    fn tokens(text: &str) -> BTreeSet<String> {
        text.split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase)
            .collect()
    }

    fn numbers(tokens: &BTreeSet<String>) -> BTreeSet<&str> {
        tokens
            .iter()
            .filter(|t| t.chars().any(|c| c.is_ascii_digit()))
            .map(String::as_str)
            .collect()
    }

    fn is_negated(tokens: &BTreeSet<String>) -> bool {
        tokens.iter().any(|t| NEGATIONS.contains(&t.as_str()))
    }

    /// Whether the two token sets make incompatible claims.
    fn contradicts(left: &BTreeSet<String>, right: &BTreeSet<String>) -> bool {
        Self::numbers(left) != Self::numbers(right)
            || Self::is_negated(left) != Self::is_negated(right)
    }
}

impl Default for TokenJaccard {
    fn default() -> Self {
        Self::new(DEFAULT_JACCARD_THRESHOLD)
    }
}

impl SimilarityPolicy for TokenJaccard {
    fn similarity(&self, a: &str, b: &str) -> f64 {
        let left = Self::tokens(a);
        let right = Self::tokens(b);

        if left.is_empty() && right.is_empty() {
            return 1.0;
        }
        if Self::contradicts(&left, &right) {
            return 0.0;
        }

        let shared = left.intersection(&right).count();
        let union = left.union(&right).count();
        shared as f64 / union as f64
    }

    fn threshold(&self) -> f64 {
        self.threshold
    }

    fn name(&self) -> &'static str {
        "jaccard"
    }
}

/// Equality after collapsing whitespace and case.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExactMatch;

impl ExactMatch {
    fn normalize(text: &str) -> String {
        text.split_whitespace()
            .map(str::to_lowercase)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl SimilarityPolicy for ExactMatch {
    fn similarity(&self, a: &str, b: &str) -> f64 {
        if Self::normalize(a) == Self::normalize(b) {
            1.0
        } else {
            0.0
        }
    }

    fn threshold(&self) -> f64 {
        1.0
    }

    fn name(&self) -> &'static str {
        "exact"
    }
}

/// Configurable choice of similarity policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimilarityKind {
    #[default]
    Jaccard,
    Exact,
}

impl SimilarityKind {
    /// Build the policy; `threshold` only applies to `Jaccard`.
    pub fn into_policy(self, threshold: f64) -> Box<dyn SimilarityPolicy> {
        match self {
            SimilarityKind::Jaccard => Box::new(TokenJaccard::new(threshold)),
            SimilarityKind::Exact => Box::new(ExactMatch),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SimilarityKind::Jaccard => "jaccard",
            SimilarityKind::Exact => "exact",
        }
    }
}

impl std::fmt::Display for SimilarityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SimilarityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "jaccard" | "token_jaccard" => Ok(SimilarityKind::Jaccard),
            "exact" | "exact_match" => Ok(SimilarityKind::Exact),
            _ => Err(format!(
                "Unknown similarity policy: {}. Valid: jaccard, exact",
                s
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jaccard_identical_and_disjoint() {
        let policy = TokenJaccard::default();
        assert_eq!(policy.similarity("The answer is 4", "the ANSWER is 4."), 1.0);
        assert_eq!(policy.similarity("alpha beta", "gamma delta"), 0.0);
    }

    #[test]
    fn test_jaccard_partial_overlap() {
        let policy = TokenJaccard::default();
        // {paris, is, the, capital} vs {paris, is, the, capital, city}
        let score = policy.similarity("Paris is the capital", "The capital city is Paris");
        assert!((score - 0.8).abs() < 1e-9);
        assert!(policy.agrees("Paris is the capital", "The capital city is Paris"));
    }

    #[test]
    fn test_jaccard_different_numbers_disagree() {
        let policy = TokenJaccard::default();
        assert_eq!(policy.similarity("The answer is 42", "The answer is 17"), 0.0);
        assert!(policy.agrees("The answer is 42", "I think the answer is 42"));
    }

    #[test]
    fn test_jaccard_negation_disagrees() {
        let policy = TokenJaccard::default();
        assert_eq!(
            policy.similarity(
                "Paris is the capital of France",
                "Paris is not the capital of France"
            ),
            0.0
        );
        assert_eq!(policy.similarity("It is prime", "It isn't prime"), 0.0);
        // Both sides negated still compare on shared words
        assert!(policy.agrees("It is not prime", "No, it is not prime"));
    }

    #[test]
    fn test_jaccard_empty_texts() {
        let policy = TokenJaccard::default();
        assert_eq!(policy.similarity("", "   "), 1.0);
        assert_eq!(policy.similarity("", "word"), 0.0);
    }

    #[test]
    fn test_exact_match_normalizes_whitespace_and_case() {
        let policy = ExactMatch;
        assert!(policy.agrees("Forty  two", "forty two"));
        assert!(!policy.agrees("forty two", "forty-two"));
    }

    #[test]
    fn test_similarity_kind_from_str() {
        assert_eq!("jaccard".parse::<SimilarityKind>().unwrap(), SimilarityKind::Jaccard);
        assert_eq!("EXACT".parse::<SimilarityKind>().unwrap(), SimilarityKind::Exact);
        assert!("cosine".parse::<SimilarityKind>().is_err());
    }

    #[test]
    fn test_into_policy() {
        let policy = SimilarityKind::Jaccard.into_policy(0.3);
        assert_eq!(policy.name(), "jaccard");
        assert_eq!(policy.threshold(), 0.3);
        assert_eq!(SimilarityKind::Exact.into_policy(0.3).threshold(), 1.0);
    }
}
