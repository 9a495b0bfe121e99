//! Requested quantile probabilities and their output labels

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Quantiles reported when the caller does not ask for others
pub const DEFAULT_QUANTILES: [f64; 5] = [0.01, 0.10, 0.50, 0.90, 0.99];

/// Format the label under which a quantile is reported
///
/// `q * 100` is rounded to an integer and zero-padded to two digits,
/// so `0.5` becomes `"q50"` and `0.01` becomes `"q01"`.
///
/// # Examples
///
/// ```rust
/// use episode_core::quantile_label;
///
/// assert_eq!(quantile_label(0.5), "q50");
/// assert_eq!(quantile_label(0.01), "q01");
/// assert_eq!(quantile_label(1.0), "q100");
/// ```
pub fn quantile_label(q: f64) -> String {
    format!("q{:02}", (q * 100.0).round() as u64)
}

/// Whether `key` looks like a quantile label (`q` followed by digits)
pub fn is_quantile_label(key: &str) -> bool {
    key.len() > 1
        && key.starts_with('q')
        && key[1..].bytes().all(|b| b.is_ascii_digit())
}

/// An ordered set of quantile probabilities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct QuantileSet {
    probabilities: Vec<f64>,
}

impl QuantileSet {
    /// Create a quantile set, checking every probability lies in `[0, 1]`
    ///
    /// Probabilities that share a label (`0.5` and `0.504` are both `q50`)
    /// are rejected, since each label can hold only one estimate.
    pub fn new(probabilities: Vec<f64>) -> Result<Self> {
        let mut seen = BTreeSet::new();
        for &p in &probabilities {
            if !(0.0..=1.0).contains(&p) {
                return Err(Error::invalid_quantile(p));
            }
            let label = quantile_label(p);
            if !seen.insert(label.clone()) {
                return Err(Error::InvalidParameter(format!(
                    "Quantile {p} duplicates label '{label}'"
                )));
            }
        }
        Ok(Self { probabilities })
    }

    /// The probabilities in request order
    pub fn probabilities(&self) -> &[f64] {
        &self.probabilities
    }

    /// Labels matching [`probabilities`](Self::probabilities) one-to-one
    pub fn labels(&self) -> Vec<String> {
        self.probabilities.iter().map(|&q| quantile_label(q)).collect()
    }

    /// Iterate `(probability, label)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (f64, String)> + '_ {
        self.probabilities.iter().map(|&q| (q, quantile_label(q)))
    }

    pub fn len(&self) -> usize {
        self.probabilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probabilities.is_empty()
    }
}

impl Default for QuantileSet {
    fn default() -> Self {
        Self {
            probabilities: DEFAULT_QUANTILES.to_vec(),
        }
    }
}

impl TryFrom<Vec<f64>> for QuantileSet {
    type Error = Error;

    fn try_from(probabilities: Vec<f64>) -> Result<Self> {
        Self::new(probabilities)
    }
}

impl From<QuantileSet> for Vec<f64> {
    fn from(set: QuantileSet) -> Self {
        set.probabilities
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_labels() {
        let set = QuantileSet::default();
        assert_eq!(set.labels(), vec!["q01", "q10", "q50", "q90", "q99"]);
        assert_eq!(set.len(), 5);
    }

    #[test]
    fn test_label_rounding() {
        // 0.29 * 100 is 28.999999999999996 in binary floating point
        assert_eq!(quantile_label(0.29), "q29");
        assert_eq!(quantile_label(0.0), "q00");
        assert_eq!(quantile_label(0.125), "q13");
    }

    #[test]
    fn test_is_quantile_label() {
        assert!(is_quantile_label("q01"));
        assert!(is_quantile_label("q100"));
        assert!(!is_quantile_label("q"));
        assert!(!is_quantile_label("qx1"));
        assert!(!is_quantile_label("mean"));
    }

    #[test]
    fn test_rejects_out_of_range() {
        assert!(QuantileSet::new(vec![0.5, 1.2]).is_err());
        assert!(QuantileSet::new(vec![-0.1]).is_err());
        assert!(QuantileSet::new(vec![0.0, 1.0]).is_ok());
    }

    #[test]
    fn test_rejects_colliding_labels() {
        for probabilities in [vec![0.5, 0.504], vec![0.0, 0.001], vec![0.9, 0.9]] {
            let result = QuantileSet::new(probabilities.clone());
            assert!(
                matches!(result, Err(Error::InvalidParameter(_))),
                "{probabilities:?}"
            );
        }
        assert_eq!(QuantileSet::new(vec![0.5, 0.51]).unwrap().len(), 2);
    }

    #[test]
    fn test_deserialize_rejects_colliding_labels() {
        assert!(serde_json::from_str::<QuantileSet>("[0.5, 0.504]").is_err());
        let set: QuantileSet = serde_json::from_str("[0.25, 0.75]").unwrap();
        assert_eq!(set.labels(), vec!["q25", "q75"]);
    }
}
