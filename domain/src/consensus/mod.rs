//! Consensus: clustering resolved hypotheses and selecting a winner.
//!
//! Answers are grouped by a [`SimilarityPolicy`]. The largest cluster wins;
//! ties go to the higher mean confidence, then to the earliest dispatched
//! member. Every pair of hypotheses split across clusters is recorded as a
//! [`ConflictRecord`].

pub mod aggregator;
pub mod result;
pub mod rule;
pub mod similarity;

pub use aggregator::{ConsensusAggregator, NEUTRAL_CONFIDENCE};
pub use result::{
    ClusterId, ClusterSummary, ConflictRecord, ConsensusResult, Resolution, SelectionRule,
};
pub use rule::AgreementRule;
pub use similarity::{
    DEFAULT_JACCARD_THRESHOLD, ExactMatch, SimilarityKind, SimilarityPolicy, TokenJaccard,
};
