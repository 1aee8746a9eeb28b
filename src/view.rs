//! One full recomputation of everything the dashboard shows for a query.

use chrono::Datelike;
use log::{debug, warn};
use serde::Serialize;

use crate::cohort::{describe, healthiest, Attribute, CohortSummary, ReferencePoint};
use crate::dataset::Dataset;
use crate::error::{GutError, Result};
use crate::figure::{check_point_size, Figure, DEFAULT_POINT_SIZE};
use crate::neighbors::{find_closest, NeighborSet, QueryPoint};

pub const DEFAULT_NEIGHBORS: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct ViewOptions {
    pub neighbors: usize,
    pub point_size: f64,
    /// Year ages are computed against
    pub reference_year: i32,
    pub include_figure: bool,
}

impl Default for ViewOptions {
    fn default() -> Self {
        ViewOptions {
            neighbors: DEFAULT_NEIGHBORS,
            point_size: DEFAULT_POINT_SIZE,
            reference_year: current_year(),
            include_figure: false,
        }
    }
}

pub fn current_year() -> i32 {
    chrono::Local::now().year()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub query: QueryPoint,
    pub neighbors: NeighborSet,
    pub summary: CohortSummary,
    /// Absent when no healthy individual is in the sample table
    pub reference: Option<ReferencePoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub figure: Option<Figure>,
}

impl DashboardView {
    /// Recompute the view from scratch. The dataset is only read.
    pub fn compute(dataset: &Dataset, options: &ViewOptions, query: QueryPoint) -> Result<Self> {
        check_point_size(options.point_size)?;
        let neighbors = find_closest(query, &dataset.samples, options.neighbors)?;
        let summary = describe(neighbors.ids(), &dataset.metadata, options.reference_year);

        let reference = match healthiest(&dataset.samples, &dataset.metadata) {
            Ok(reference) => Some(reference),
            Err(GutError::EmptyCohort(reason)) => {
                warn!("No healthy reference: {}", reason);
                None
            }
            Err(e) => return Err(e),
        };

        let figure = if options.include_figure {
            Some(Figure::build(&dataset.samples, &neighbors, options.point_size)?)
        } else {
            None
        };

        debug!(
            "Computed view for {:?}: {} neighbours, {} with metadata, mean age {:?}",
            query,
            neighbors.len(),
            summary.with_metadata,
            summary.get(Attribute::Age).and_then(|age| age.mean())
        );
        Ok(DashboardView {
            query,
            neighbors,
            summary,
            reference,
            figure,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::types::{Reported, Sample};
    use crate::dataset::{Condition, Diagnosis, Flag, MetadataRecord, MetadataTable, SampleTable};

    fn dataset(healthy: bool) -> Dataset {
        let samples = SampleTable::new(
            [("A", 0.5, 0.1), ("B", 0.2, 0.4), ("C", 0.5, 0.5)]
                .iter()
                .map(|&(id, b, f)| Sample {
                    id: id.to_string(),
                    pc1: b,
                    pc2: f,
                    bacteroidetes: b,
                    firmicutes: f,
                })
                .collect(),
        )
        .unwrap();

        let mut c = MetadataRecord::new("C");
        c.dog = Reported::Value(Flag(true));
        if healthy {
            for condition in Condition::ALL {
                c.set_diagnosis(condition, Reported::Value(Diagnosis::NotDiagnosed));
            }
            c.bmi = Reported::Value(21.0);
            c.birth_year = Reported::Value(1985);
        }
        let (metadata, _) = MetadataTable::new(vec![c]);
        Dataset { samples, metadata }
    }

    fn options(include_figure: bool) -> ViewOptions {
        ViewOptions {
            neighbors: 2,
            point_size: DEFAULT_POINT_SIZE,
            reference_year: 2020,
            include_figure,
        }
    }

    #[test]
    fn test_compute_view() {
        let data = dataset(true);
        let query = QueryPoint::new(0.5, 0.5).unwrap();
        let view = DashboardView::compute(&data, &options(true), query).unwrap();

        assert_eq!(view.neighbors.ids(), vec!["C", "B"]);
        assert_eq!(view.summary.cohort_size, 2);
        assert_eq!(view.summary.with_metadata, 1);
        assert_eq!(view.summary.get(Attribute::Dog).unwrap().count(), Some(1));
        let reference = view.reference.unwrap();
        assert_eq!(reference.n, 1);
        assert_eq!(reference.bacteroidetes, 0.5);
        assert_eq!(view.figure.unwrap().highlighted().count(), 2);
    }

    #[test]
    fn test_view_without_healthy_reference() {
        let data = dataset(false);
        let query = QueryPoint::new(0.2, 0.2).unwrap();
        let view = DashboardView::compute(&data, &options(false), query).unwrap();
        assert!(view.reference.is_none());
        assert!(view.figure.is_none());
    }

    #[test]
    fn test_point_size_checked_without_figure() {
        let data = dataset(true);
        let options = ViewOptions {
            point_size: 500.0,
            ..options(false)
        };
        let err = DashboardView::compute(&data, &options, QueryPoint::new(0.5, 0.5).unwrap())
            .unwrap_err();
        assert!(matches!(err, GutError::InvalidArgument(_)));
    }

    #[test]
    fn test_view_serializes() {
        let data = dataset(true);
        let query = QueryPoint::new(0.5, 0.5).unwrap();
        let view = DashboardView::compute(&data, &options(false), query).unwrap();
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["neighbors"][0]["id"], "C");
        assert_eq!(json["summary"]["entries"][0]["attribute"], "dog");
        assert_eq!(json["summary"]["entries"][11]["value"]["kind"], "mean");
        assert!(json.get("figure").is_none());
    }
}
