//! Consensus reduction over resolved hypotheses.

use super::result::{
    ClusterId, ClusterSummary, ConflictRecord, ConsensusResult, Resolution, SelectionRule,
};
use super::rule::AgreementRule;
use super::similarity::{SimilarityPolicy, TokenJaccard};
use crate::core::error::DomainError;
use crate::hypothesis::{Hypothesis, HypothesisId};
use std::cmp::Ordering;

/// Confidence assumed for a hypothesis that did not report one.
pub const NEUTRAL_CONFIDENCE: f64 = 0.5;

/// Reduces a set of resolved hypotheses to one answer.
///
/// Pure and synchronous: it only looks at the hypotheses it is given.
pub struct ConsensusAggregator {
    policy: Box<dyn SimilarityPolicy>,
    rule: AgreementRule,
}

/// A candidate answer during clustering.
struct Candidate {
    id: HypothesisId,
    answer: String,
    confidence: f64,
}

struct Cluster {
    members: Vec<usize>,
    mean_confidence: f64,
}

impl ConsensusAggregator {
    pub fn new(policy: Box<dyn SimilarityPolicy>, rule: AgreementRule) -> Self {
        Self { policy, rule }
    }

    pub fn with_rule(mut self, rule: AgreementRule) -> Self {
        self.rule = rule;
        self
    }

    pub fn policy_name(&self) -> &'static str {
        self.policy.name()
    }

    pub fn rule(&self) -> AgreementRule {
        self.rule
    }

    /// Reduce hypotheses to a consensus.
    ///
    /// Only `Succeeded` hypotheses participate. Fails with
    /// `NoSucceededHypotheses` when none did.
    pub fn reduce(&self, hypotheses: &[Hypothesis]) -> Result<ConsensusResult, DomainError> {
        let mut candidates: Vec<Candidate> = hypotheses
            .iter()
            .filter(|h| h.is_succeeded())
            .map(|h| Candidate {
                id: h.id,
                answer: h.answer().unwrap_or_default(),
                confidence: h.confidence.unwrap_or(NEUTRAL_CONFIDENCE),
            })
            .collect();

        if candidates.is_empty() {
            return Err(DomainError::NoSucceededHypotheses);
        }
        candidates.sort_by_key(|c| c.id);

        let clusters = self.cluster(&candidates);
        let (winner, decided_by) = select_winner(&clusters, &candidates);

        let mut cluster_of = vec![0usize; candidates.len()];
        for (ci, cluster) in clusters.iter().enumerate() {
            for &member in &cluster.members {
                cluster_of[member] = ci;
            }
        }

        let winning = &clusters[winner];
        let representative = winning
            .members
            .iter()
            .copied()
            .reduce(|best, m| {
                if candidates[m].confidence > candidates[best].confidence {
                    m
                } else {
                    best
                }
            })
            .unwrap_or(winning.members[0]);

        let mut conflicts = Vec::new();
        for i in 0..candidates.len() {
            for j in (i + 1)..candidates.len() {
                if cluster_of[i] == cluster_of[j] {
                    continue;
                }
                let resolution = if cluster_of[i] == winner {
                    Resolution::Kept {
                        winner: candidates[i].id,
                        by: decided_by,
                    }
                } else if cluster_of[j] == winner {
                    Resolution::Kept {
                        winner: candidates[j].id,
                        by: decided_by,
                    }
                } else {
                    Resolution::BothDiscarded
                };
                conflicts.push(ConflictRecord {
                    left: candidates[i].id,
                    left_cluster: cluster_id(cluster_of[i]),
                    right: candidates[j].id,
                    right_cluster: cluster_id(cluster_of[j]),
                    resolution,
                });
            }
        }

        let succeeded = candidates.len();
        let winning_size = winning.members.len();

        Ok(ConsensusResult {
            content: candidates[representative].answer.clone(),
            winning_cluster: cluster_id(winner),
            contributing: winning.members.iter().map(|&m| candidates[m].id).collect(),
            representative: candidates[representative].id,
            agreement: winning_size as f64 / succeeded as f64,
            confidence: winning.mean_confidence,
            quorum_reached: self.rule.is_satisfied(winning_size, succeeded),
            rule: self.rule,
            decided_by,
            clusters: clusters
                .iter()
                .enumerate()
                .map(|(ci, c)| ClusterSummary {
                    id: cluster_id(ci),
                    members: c.members.iter().map(|&m| candidates[m].id).collect(),
                    mean_confidence: c.mean_confidence,
                })
                .collect(),
            conflicts,
        })
    }

    /// Greedy clustering in dispatch order against each cluster's first member.
    fn cluster(&self, candidates: &[Candidate]) -> Vec<Cluster> {
        let mut clusters: Vec<Cluster> = Vec::new();

        for (index, candidate) in candidates.iter().enumerate() {
            let mut best: Option<(usize, f64)> = None;
            for (ci, cluster) in clusters.iter().enumerate() {
                let founder = &candidates[cluster.members[0]];
                let score = self.policy.similarity(&founder.answer, &candidate.answer);
                if score < self.policy.threshold() {
                    continue;
                }
                if best.is_none_or(|(_, s)| score > s) {
                    best = Some((ci, score));
                }
            }

            match best {
                Some((ci, _)) => clusters[ci].members.push(index),
                None => clusters.push(Cluster {
                    members: vec![index],
                    mean_confidence: 0.0,
                }),
            }
        }

        for cluster in &mut clusters {
            let total: f64 = cluster.members.iter().map(|&m| candidates[m].confidence).sum();
            cluster.mean_confidence = total / cluster.members.len() as f64;
        }
        clusters
    }
}

impl Default for ConsensusAggregator {
    fn default() -> Self {
        Self::new(Box::new(TokenJaccard::default()), AgreementRule::default())
    }
}

impl std::fmt::Debug for ConsensusAggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsensusAggregator")
            .field("policy", &self.policy.name())
            .field("threshold", &self.policy.threshold())
            .field("rule", &self.rule)
            .finish()
    }
}

fn cluster_id(index: usize) -> ClusterId {
    ClusterId::new(index as u32)
}

/// Order clusters best-first: size, then mean confidence, then earliest member.
fn compare(a: &Cluster, b: &Cluster, candidates: &[Candidate]) -> Ordering {
    b.members
        .len()
        .cmp(&a.members.len())
        .then_with(|| b.mean_confidence.total_cmp(&a.mean_confidence))
        .then_with(|| candidates[a.members[0]].id.cmp(&candidates[b.members[0]].id))
}

fn select_winner(clusters: &[Cluster], candidates: &[Candidate]) -> (usize, SelectionRule) {
    let mut order: Vec<usize> = (0..clusters.len()).collect();
    order.sort_by(|&a, &b| compare(&clusters[a], &clusters[b], candidates));

    let winner = order[0];
    let Some(&runner_up) = order.get(1) else {
        return (winner, SelectionRule::Uncontested);
    };

    let (w, r) = (&clusters[winner], &clusters[runner_up]);
    let rule = if w.members.len() > r.members.len() {
        SelectionRule::Majority
    } else if w.mean_confidence > r.mean_confidence {
        SelectionRule::Confidence
    } else {
        SelectionRule::DispatchOrder
    };
    (winner, rule)
}
