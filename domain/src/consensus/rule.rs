//! Agreement rules deciding whether a winning cluster is a quorum.

use serde::{Deserialize, Serialize};

/// Rule for deciding whether the winning cluster constitutes a quorum
///
/// The winning cluster is always selected; the rule only decides whether
/// its agreement is strong enough to be reported as `quorum_reached`.
///
/// # Example
///
/// ```
/// use superposition_domain::consensus::AgreementRule;
///
/// let rule = AgreementRule::Majority;
/// assert!(rule.is_satisfied(2, 3));  // 2/3 > 50%
/// assert!(!rule.is_satisfied(1, 2)); // 1/2 is not more than half
///
/// let strict = AgreementRule::Unanimous;
/// assert!(!strict.is_satisfied(2, 3));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AgreementRule {
    /// More than half of the succeeded hypotheses agree
    #[default]
    Majority,

    /// Every succeeded hypothesis agrees
    Unanimous,

    /// At least n hypotheses agree
    AtLeast(usize),

    /// At least this percentage agree (0-100)
    Percentage(u8),
}

impl AgreementRule {
    /// Check if `agreeing` out of `total` satisfies this rule
    pub fn is_satisfied(&self, agreeing: usize, total: usize) -> bool {
        if total == 0 {
            return false;
        }

        agreeing >= self.min_agreeing(total)
    }

    /// Minimum cluster size needed for a quorum among `total` hypotheses
    pub fn min_agreeing(&self, total: usize) -> usize {
        match self {
            AgreementRule::Majority => total / 2 + 1,
            AgreementRule::Unanimous => total,
            AgreementRule::AtLeast(n) => *n,
            AgreementRule::Percentage(p) => (total as f64 * (*p as f64 / 100.0)).ceil() as usize,
        }
    }

    pub fn description(&self) -> String {
        match self {
            AgreementRule::Majority => "majority (more than half)".to_string(),
            AgreementRule::Unanimous => "unanimous (all agree)".to_string(),
            AgreementRule::AtLeast(n) => format!("at least {} agreeing", n),
            AgreementRule::Percentage(p) => format!("at least {}% agreeing", p),
        }
    }
}

impl std::fmt::Display for AgreementRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

impl std::str::FromStr for AgreementRule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "majority" => Ok(AgreementRule::Majority),
            "unanimous" => Ok(AgreementRule::Unanimous),
            s if s.starts_with("atleast:") || s.starts_with("at_least:") => {
                let n: usize = s
                    .split(':')
                    .nth(1)
                    .ok_or("Missing number after atleast:")?
                    .parse()
                    .map_err(|_| "Invalid number for atleast")?;
                Ok(AgreementRule::AtLeast(n))
            }
            s if s.starts_with("percentage:") || s.ends_with('%') => {
                let num_str = s.trim_start_matches("percentage:").trim_end_matches('%');
                let p: u8 = num_str.parse().map_err(|_| "Invalid percentage")?;
                if p > 100 {
                    return Err(format!("Percentage out of range: {}", p));
                }
                Ok(AgreementRule::Percentage(p))
            }
            _ => Err(format!(
                "Unknown agreement rule: {}. Valid: majority, unanimous, atleast:N, percentage:N or N%",
                s
            )),
        }
    }
}
