//! Consensus result types.

use super::rule::AgreementRule;
use crate::hypothesis::HypothesisId;
use serde::{Deserialize, Serialize};

/// Index of an agreement cluster, in order of founding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClusterId(u32);

impl ClusterId {
    pub fn new(index: u32) -> Self {
        Self(index)
    }

    pub fn index(&self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for ClusterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "c{}", self.0)
    }
}

/// Which tie-break level decided the winning cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionRule {
    /// Only one cluster existed
    Uncontested,
    /// Strictly larger than every other cluster
    Majority,
    /// Tied on size, highest mean confidence
    Confidence,
    /// Tied on size and confidence, earliest dispatched member
    DispatchOrder,
}

impl SelectionRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            SelectionRule::Uncontested => "uncontested",
            SelectionRule::Majority => "majority",
            SelectionRule::Confidence => "confidence",
            SelectionRule::DispatchOrder => "dispatch_order",
        }
    }
}

impl std::fmt::Display for SelectionRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One agreement cluster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterSummary {
    pub id: ClusterId,
    /// Members in dispatch order
    pub members: Vec<HypothesisId>,
    /// Mean reported confidence; missing confidence counts as neutral
    pub mean_confidence: f64,
}

impl ClusterSummary {
    pub fn size(&self) -> usize {
        self.members.len()
    }
}

/// How a conflict between two hypotheses was settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Resolution {
    /// One side is in the winning cluster
    Kept { winner: HypothesisId, by: SelectionRule },
    /// Neither side is in the winning cluster
    BothDiscarded,
}

/// Two succeeded hypotheses that ended up in different clusters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictRecord {
    pub left: HypothesisId,
    pub left_cluster: ClusterId,
    pub right: HypothesisId,
    pub right_cluster: ClusterId,
    pub resolution: Resolution,
}

/// Output of a consensus reduction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsensusResult {
    /// Answer text of the winning cluster's representative
    pub content: String,
    pub winning_cluster: ClusterId,
    /// Members of the winning cluster
    pub contributing: Vec<HypothesisId>,
    /// The hypothesis whose answer is reported as `content`
    pub representative: HypothesisId,
    /// Winning cluster size divided by the number of succeeded hypotheses
    pub agreement: f64,
    /// Mean confidence of the winning cluster
    pub confidence: f64,
    pub quorum_reached: bool,
    pub rule: AgreementRule,
    pub decided_by: SelectionRule,
    pub clusters: Vec<ClusterSummary>,
    pub conflicts: Vec<ConflictRecord>,
}

impl ConsensusResult {
    pub fn is_unanimous(&self) -> bool {
        self.clusters.len() == 1
    }

    /// Hypotheses outside the winning cluster, in dispatch order.
    pub fn dissenting(&self) -> Vec<HypothesisId> {
        let mut ids: Vec<HypothesisId> = self
            .clusters
            .iter()
            .filter(|c| c.id != self.winning_cluster)
            .flat_map(|c| c.members.iter().copied())
            .collect();
        ids.sort();
        ids
    }

    pub fn succeeded_count(&self) -> usize {
        self.clusters.iter().map(ClusterSummary::size).sum()
    }
}
