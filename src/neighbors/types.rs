use serde::{Deserialize, Serialize};

use crate::error::{GutError, Result};

/// Slack allowed when checking that the two fractions fit in one gut
const SUM_TOLERANCE: f64 = 1e-9;

/// A user's phylum fractions, validated on construction
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QueryPoint {
    bacteroidetes: f64,
    firmicutes: f64,
}

impl QueryPoint {
    /// Both fractions must lie in [0, 1] and together not exceed 1
    pub fn new(bacteroidetes: f64, firmicutes: f64) -> Result<Self> {
        for (name, value) in [("bacteroidetes", bacteroidetes), ("firmicutes", firmicutes)] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(GutError::InvalidArgument(format!(
                    "{} fraction {} is outside [0, 1]",
                    name, value
                )));
            }
        }
        if bacteroidetes + firmicutes > 1.0 + SUM_TOLERANCE {
            return Err(GutError::InvalidArgument(format!(
                "bacteroidetes ({}) and firmicutes ({}) add up to more than 1",
                bacteroidetes, firmicutes
            )));
        }
        Ok(QueryPoint {
            bacteroidetes,
            firmicutes,
        })
    }

    /// Build from slider percentages (0 to 100)
    pub fn from_percentages(bacteroidetes: f64, firmicutes: f64) -> Result<Self> {
        Self::new(bacteroidetes / 100.0, firmicutes / 100.0)
    }

    pub fn bacteroidetes(&self) -> f64 {
        self.bacteroidetes
    }

    pub fn firmicutes(&self) -> f64 {
        self.firmicutes
    }

    /// Euclidean distance to a point in phylum space
    pub fn distance_to(&self, bacteroidetes: f64, firmicutes: f64) -> f64 {
        let db = bacteroidetes - self.bacteroidetes;
        let df = firmicutes - self.firmicutes;
        (db * db + df * df).sqrt()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    pub id: String,
    pub distance: f64,
}

/// Closest samples, nearest first
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NeighborSet {
    neighbors: Vec<Neighbor>,
}

impl NeighborSet {
    pub fn new(neighbors: Vec<Neighbor>) -> Self {
        NeighborSet { neighbors }
    }

    pub fn neighbors(&self) -> &[Neighbor] {
        &self.neighbors
    }

    pub fn ids(&self) -> Vec<&str> {
        self.neighbors.iter().map(|n| n.id.as_str()).collect()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.neighbors.iter().any(|n| n.id == id)
    }

    pub fn len(&self) -> usize {
        self.neighbors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_bounds() {
        assert!(QueryPoint::new(0.0, 0.0).is_ok());
        assert!(QueryPoint::new(1.0, 0.0).is_ok());
        assert!(QueryPoint::new(0.5, 0.5).is_ok());
        for (b, f) in [(-0.1, 0.2), (0.2, 1.1), (f64::NAN, 0.1), (0.7, 0.4)] {
            assert!(matches!(
                QueryPoint::new(b, f),
                Err(GutError::InvalidArgument(_))
            ));
        }
    }

    #[test]
    fn test_from_percentages() {
        let query = QueryPoint::from_percentages(40.0, 20.0).unwrap();
        assert!((query.bacteroidetes() - 0.4).abs() < 1e-12);
        assert!((query.firmicutes() - 0.2).abs() < 1e-12);
        assert!(QueryPoint::from_percentages(60.0, 50.0).is_err());
    }

    #[test]
    fn test_distance() {
        let query = QueryPoint::new(0.5, 0.5).unwrap();
        assert!((query.distance_to(0.2, 0.4) - 0.10_f64.sqrt()).abs() < 1e-12);
        assert!((query.distance_to(0.2, 0.2) - 0.18_f64.sqrt()).abs() < 1e-12);
        assert_eq!(query.distance_to(0.5, 0.5), 0.0);
    }
}
