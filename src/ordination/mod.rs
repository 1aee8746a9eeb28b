pub(crate) mod distance;
pub(crate) mod pcoa;
pub(crate) mod rarefy;
pub(crate) mod table;

use log::info;

use crate::error::{GutError, Result};
use crate::io::OrdinationRow;
use crate::taxa::GenusRecord;
use table::CountTable;

pub const DEFAULT_DEPTH: u64 = 1000;

/// Genus counts to a two-axis Bray-Curtis PCoA: pivot, rarefy to `depth`,
/// pairwise distances, then the two leading principal coordinates.
pub fn ordinate(
    records: &[GenusRecord],
    depth: u64,
    seed: Option<u64>,
) -> Result<Vec<OrdinationRow>> {
    let table = CountTable::from_records(records)?;
    info!(
        "Pivoted {} rows into {} samples x {} genera",
        records.len(),
        table.n_samples(),
        table.genera.len()
    );

    let rarefied = rarefy::rarefy(&table, depth, seed)?;
    if rarefied.n_samples() < 2 {
        return Err(GutError::EmptyCohort(format!(
            "{} samples left after rarefying to {} reads",
            rarefied.n_samples(),
            depth
        )));
    }

    info!("Computing Bray-Curtis distances for {} samples", rarefied.n_samples());
    let distances = distance::distance_matrix(&rarefied.counts);
    let (coordinates, eigenvalues) = pcoa::pcoa(&distances, 2)?;
    info!("PCoA eigenvalues: {:?}", eigenvalues);

    Ok(rarefied
        .sample_ids
        .into_iter()
        .zip(coordinates)
        .map(|(id, axes)| OrdinationRow {
            id,
            pc1: axes.first().copied().unwrap_or(0.0),
            pc2: axes.get(1).copied().unwrap_or(0.0),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records() -> Vec<GenusRecord> {
        let mut records = Vec::new();
        for (id, a, b, c) in [
            ("s1", 40.0, 10.0, 0.0),
            ("s2", 10.0, 40.0, 0.0),
            ("s3", 0.0, 10.0, 40.0),
            ("s4", 25.0, 25.0, 0.0),
            ("tiny", 1.0, 0.0, 0.0),
        ] {
            records.push(GenusRecord::new(id, Some("Bacteroides"), Some("Bacteroidetes"), a));
            records.push(GenusRecord::new(id, Some("Blautia"), Some("Firmicutes"), b));
            records.push(GenusRecord::new(id, Some("Prevotella"), Some("Bacteroidetes"), c));
        }
        records
    }

    #[test]
    fn test_ordinate() {
        let rows = ordinate(&records(), 50, Some(7)).unwrap();
        let ids: Vec<&str> = rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["s1", "s2", "s3", "s4"]);
        assert!(rows.iter().all(|r| r.pc1.is_finite() && r.pc2.is_finite()));
    }

    #[test]
    fn test_ordinate_seeded_is_reproducible() {
        assert_eq!(
            ordinate(&records(), 30, Some(11)).unwrap(),
            ordinate(&records(), 30, Some(11)).unwrap()
        );
    }

    #[test]
    fn test_too_shallow() {
        assert!(matches!(
            ordinate(&records(), 500, Some(1)),
            Err(GutError::EmptyCohort(_))
        ));
    }
}
