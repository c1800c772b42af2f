//! Sampling parameters sent with each model call

use super::error::DomainError;
use serde::{Deserialize, Serialize};

/// Highest temperature accepted by the supported providers.
pub const MAX_TEMPERATURE: f32 = 2.0;

/// Inclusive temperature range spread across the hypotheses of one query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemperatureRange {
    pub min: f32,
    pub max: f32,
}

impl TemperatureRange {
    pub fn new(min: f32, max: f32) -> Result<Self, DomainError> {
        let range = Self { min, max };
        range.validate()?;
        Ok(range)
    }

    /// A degenerate range holding a single temperature.
    pub fn fixed(temperature: f32) -> Self {
        Self {
            min: temperature,
            max: temperature,
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if !(0.0..=MAX_TEMPERATURE).contains(&self.min)
            || !(0.0..=MAX_TEMPERATURE).contains(&self.max)
            || self.min > self.max
        {
            return Err(DomainError::InvalidQuery(format!(
                "temperature range {}..{} must satisfy 0 <= min <= max <= {}",
                self.min, self.max, MAX_TEMPERATURE
            )));
        }
        Ok(())
    }

    /// `n` evenly spaced temperatures from `min` to `max`.
    pub fn spread(&self, n: usize) -> Vec<f32> {
        match n {
            0 => Vec::new(),
            1 => vec![self.min],
            _ => {
                let step = (self.max - self.min) / (n - 1) as f32;
                (0..n).map(|i| self.min + step * i as f32).collect()
            }
        }
    }
}

impl Default for TemperatureRange {
    fn default() -> Self {
        Self { min: 0.3, max: 0.9 }
    }
}

impl std::str::FromStr for TemperatureRange {
    type Err = DomainError;

    /// Parses `"0.2..0.8"` or a single `"0.7"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse = |v: &str| {
            v.trim()
                .parse::<f32>()
                .map_err(|_| DomainError::InvalidQuery(format!("invalid temperature: {}", v)))
        };
        match s.split_once("..") {
            Some((min, max)) => Self::new(parse(min)?, parse(max)?),
            None => {
                let t = parse(s)?;
                Self::new(t, t)
            }
        }
    }
}

/// Sampling parameters for a single model call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplingParams {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spread_endpoints() {
        let range = TemperatureRange::new(0.2, 1.0).unwrap();
        let temps = range.spread(3);
        assert_eq!(temps.len(), 3);
        assert!((temps[0] - 0.2).abs() < f32::EPSILON);
        assert!((temps[1] - 0.6).abs() < 1e-6);
        assert!((temps[2] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_spread_single() {
        let range = TemperatureRange::new(0.4, 0.9).unwrap();
        assert_eq!(range.spread(1), vec![0.4]);
        assert!(range.spread(0).is_empty());
    }

    #[test]
    fn test_invalid_ranges() {
        assert!(TemperatureRange::new(0.9, 0.1).is_err());
        assert!(TemperatureRange::new(-0.1, 0.5).is_err());
        assert!(TemperatureRange::new(0.0, 2.5).is_err());
    }

    #[test]
    fn test_parse_range() {
        let range: TemperatureRange = "0.1..0.5".parse().unwrap();
        assert_eq!(range, TemperatureRange { min: 0.1, max: 0.5 });

        let fixed: TemperatureRange = "0.7".parse().unwrap();
        assert_eq!(fixed, TemperatureRange::fixed(0.7));

        assert!("hot..cold".parse::<TemperatureRange>().is_err());
    }
}
