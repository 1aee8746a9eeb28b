//! Scatter data for the ordination plot. Drawing is left to the renderer.

use serde::Serialize;

use crate::dataset::SampleTable;
use crate::error::{GutError, Result};
use crate::neighbors::NeighborSet;

pub const DEFAULT_POINT_SIZE: f64 = 16.0;
pub const POINT_SIZE_RANGE: (f64, f64) = (2.0, 30.0);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FigurePoint {
    pub id: String,
    pub pc1: f64,
    pub pc2: f64,
    pub bacteroidetes: f64,
    pub firmicutes: f64,
    /// Bacteroidetes minus Firmicutes, -1 (blue) to 1 (red)
    pub color: f64,
    pub size: f64,
    pub highlighted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Figure {
    pub title: &'static str,
    pub points: Vec<FigurePoint>,
}

/// Reject marker sizes outside `POINT_SIZE_RANGE`
pub fn check_point_size(point_size: f64) -> Result<()> {
    let (low, high) = POINT_SIZE_RANGE;
    if !(low..=high).contains(&point_size) {
        return Err(GutError::InvalidArgument(format!(
            "point size {} is outside [{}, {}]",
            point_size, low, high
        )));
    }
    Ok(())
}

impl Figure {
    /// Lay out every sample, marking the neighbours. Background points scale
    /// with their combined abundance; highlighted points share one size.
    pub fn build(samples: &SampleTable, neighbors: &NeighborSet, point_size: f64) -> Result<Self> {
        check_point_size(point_size)?;

        let highlight_size = (point_size * 1.25).max(2.0);
        let points = samples
            .iter()
            .map(|s| {
                let highlighted = neighbors.contains(&s.id);
                FigurePoint {
                    id: s.id.clone(),
                    pc1: s.pc1,
                    pc2: s.pc2,
                    bacteroidetes: s.bacteroidetes,
                    firmicutes: s.firmicutes,
                    color: s.bacteroidetes - s.firmicutes,
                    size: if highlighted {
                        highlight_size
                    } else {
                        (s.bacteroidetes + s.firmicutes) * point_size
                    },
                    highlighted,
                }
            })
            .collect();

        Ok(Figure {
            title: "Bray-Curtis PCoA",
            points,
        })
    }

    pub fn highlighted(&self) -> impl Iterator<Item = &FigurePoint> {
        self.points.iter().filter(|p| p.highlighted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::types::Sample;
    use crate::neighbors::types::Neighbor;

    fn table() -> SampleTable {
        SampleTable::new(vec![
            Sample {
                id: "A".to_string(),
                pc1: 0.1,
                pc2: 0.2,
                bacteroidetes: 0.6,
                firmicutes: 0.2,
            },
            Sample {
                id: "B".to_string(),
                pc1: -0.3,
                pc2: 0.4,
                bacteroidetes: 0.1,
                firmicutes: 0.7,
            },
        ])
        .unwrap()
    }

    #[test]
    fn test_build_marks_neighbours() {
        let neighbors = NeighborSet::new(vec![Neighbor {
            id: "B".to_string(),
            distance: 0.0,
        }]);
        let figure = Figure::build(&table(), &neighbors, 16.0).unwrap();

        assert_eq!(figure.points.len(), 2);
        let a = &figure.points[0];
        assert!(!a.highlighted);
        assert!((a.color - 0.4).abs() < 1e-12);
        assert!((a.size - 12.8).abs() < 1e-12);

        let highlighted: Vec<_> = figure.highlighted().map(|p| p.id.as_str()).collect();
        assert_eq!(highlighted, vec!["B"]);
        assert_eq!(figure.points[1].size, 20.0);
    }

    #[test]
    fn test_point_size_range() {
        let none = NeighborSet::default();
        assert!(Figure::build(&table(), &none, 2.0).is_ok());
        assert!(matches!(
            Figure::build(&table(), &none, 1.0),
            Err(GutError::InvalidArgument(_))
        ));
        assert!(Figure::build(&table(), &none, 31.0).is_err());
        assert!(check_point_size(f64::NAN).is_err());
        assert!(check_point_size(30.0).is_ok());
    }
}
