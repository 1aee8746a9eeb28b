use log::debug;

use super::types::{Neighbor, NeighborSet, QueryPoint};
use crate::dataset::SampleTable;
use crate::error::{GutError, Result};

/// Find the `n` samples closest to `query` in (Bacteroidetes, Firmicutes)
/// space. Ties keep table order. The table is only read.
pub fn find_closest(query: QueryPoint, samples: &SampleTable, n: usize) -> Result<NeighborSet> {
    if samples.is_empty() {
        return Err(GutError::InvalidArgument(
            "cannot search an empty sample table".to_string(),
        ));
    }

    let mut distances: Vec<(usize, f64)> = samples
        .iter()
        .enumerate()
        .map(|(idx, sample)| (idx, query.distance_to(sample.bacteroidetes, sample.firmicutes)))
        .collect();
    // sort_by is stable, so equal distances stay in table order
    distances.sort_by(|a, b| a.1.total_cmp(&b.1));
    distances.truncate(n);

    let rows = samples.rows();
    let neighbors: Vec<Neighbor> = distances
        .into_iter()
        .map(|(idx, distance)| Neighbor {
            id: rows[idx].id.clone(),
            distance,
        })
        .collect();

    debug!(
        "Found {} neighbours for {:?}, closest at {:.4}",
        neighbors.len(),
        query,
        neighbors.first().map(|n| n.distance).unwrap_or(f64::NAN)
    );
    Ok(NeighborSet::new(neighbors))
}
