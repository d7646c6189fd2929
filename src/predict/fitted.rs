//! Pieces shared by fitted models: input scaling and JSON persistence

use crate::Result;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Per-column min-max scaling to [0, 1], fitted on training data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScaler {
    pub min: Vec<f64>,
    pub max: Vec<f64>,
}

impl MinMaxScaler {
    /// Fit on `rows`; all rows must have the same length
    pub fn fit(rows: &[Vec<f64>]) -> Self {
        let dim = rows.first().map(Vec::len).unwrap_or(0);
        let mut min = vec![f64::INFINITY; dim];
        let mut max = vec![f64::NEG_INFINITY; dim];
        for row in rows {
            for (j, &v) in row.iter().enumerate() {
                min[j] = min[j].min(v);
                max[j] = max[j].max(v);
            }
        }
        MinMaxScaler { min, max }
    }

    /// Number of input columns
    pub fn dimension(&self) -> usize {
        self.min.len()
    }

    /// Constant columns map to 0
    pub fn transform(&self, row: &[f64]) -> Vec<f64> {
        row.iter()
            .zip(self.min.iter().zip(&self.max))
            .map(|(&v, (&lo, &hi))| {
                let range = hi - lo;
                if range == 0.0 {
                    0.0
                } else {
                    (v - lo) / range
                }
            })
            .collect()
    }
}

/// Write `value` as pretty JSON, creating the parent directory
pub(crate) fn save_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let content = serde_json::to_string_pretty(value)?;
    std::fs::write(path, content)?;
    Ok(())
}

pub(crate) fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scaler() {
        let rows = vec![vec![1.0, 5.0, 3.0], vec![3.0, 5.0, -1.0]];
        let scaler = MinMaxScaler::fit(&rows);
        assert_eq!(scaler.dimension(), 3);
        assert_eq!(scaler.transform(&[2.0, 5.0, 3.0]), vec![0.5, 0.0, 1.0]);
        assert_eq!(scaler.transform(&[5.0, 9.0, -1.0]), vec![2.0, 0.0, 0.0]);
    }
}
