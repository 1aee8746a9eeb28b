use std::path::PathBuf;

use fxhash::FxHashMap;
use log::{info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::types::{MetadataTable, Sample, SampleTable};
use crate::error::{GutError, Result};
use crate::io::reader::{read_genera, read_metadata, read_ordination, OrdinationRow};
use crate::taxa::{PhylumCounter, PhylumProfile};

pub const DEFAULT_SUBSAMPLE: usize = 1000;

/// Where the input tables live and how to sample them
#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub ordination: PathBuf,
    pub genera: PathBuf,
    pub metadata: PathBuf,
    /// Number of ordination rows to draw
    pub subsample: usize,
    /// Fixed seed for the draw; `None` draws a fresh sample every run
    pub seed: Option<u64>,
}

/// The working population and its survey answers, loaded once and only
/// ever read afterwards
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub samples: SampleTable,
    pub metadata: MetadataTable,
}

impl Dataset {
    pub fn load(options: &LoadOptions) -> Result<Self> {
        if options.subsample == 0 {
            return Err(GutError::InvalidArgument(
                "subsample size must be at least 1".to_string(),
            ));
        }

        let ordination = read_ordination(&options.ordination)?;

        let counter = PhylumCounter::new();
        counter.count_records(&read_genera(&options.genera)?)?;
        let phyla = counter.relative_abundances();
        info!(
            "Computed phylum abundances for {} of {} samples",
            phyla.len(),
            counter.sample_count()
        );

        let sampled = subsample(ordination, options.subsample, options.seed);
        let samples = join(sampled, &phyla)?;
        if samples.is_empty() {
            return Err(GutError::EmptyCohort(
                "no sampled individuals have phylum abundances".to_string(),
            ));
        }

        let metadata = read_metadata(&options.metadata)?;
        if metadata.is_empty() {
            warn!("No metadata records; cohort summaries will have no data");
        }
        let without_metadata = samples
            .iter()
            .filter(|s| metadata.get(&s.id).is_none())
            .count();
        if without_metadata > 0 {
            warn!(
                "{} of {} samples have no metadata and will be left out of cohort summaries",
                without_metadata,
                samples.len()
            );
        }

        info!(
            "Loaded {} samples and {} metadata records",
            samples.len(),
            metadata.len()
        );
        Ok(Dataset { samples, metadata })
    }
}

/// Draw `size` rows without replacement, keeping file order. Returns every
/// row when the table is smaller than `size`.
pub fn subsample(rows: Vec<OrdinationRow>, size: usize, seed: Option<u64>) -> Vec<OrdinationRow> {
    if rows.len() <= size {
        info!("Using all {} ordination rows", rows.len());
        return rows;
    }

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut picked = rand::seq::index::sample(&mut rng, rows.len(), size).into_vec();
    picked.sort_unstable();

    info!("Subsampled {} of {} ordination rows", size, rows.len());
    let mut keep = vec![false; rows.len()];
    for idx in picked {
        keep[idx] = true;
    }
    rows.into_iter()
        .zip(keep)
        .filter_map(|(row, keep)| keep.then_some(row))
        .collect()
}

/// Inner join of ordination rows with phylum abundances on sample id
pub fn join(
    rows: Vec<OrdinationRow>,
    phyla: &FxHashMap<String, PhylumProfile>,
) -> Result<SampleTable> {
    let total = rows.len();
    let samples: Vec<Sample> = rows
        .into_iter()
        .filter_map(|row| {
            phyla.get(&row.id).map(|profile| Sample {
                id: row.id,
                pc1: row.pc1,
                pc2: row.pc2,
                bacteroidetes: profile.bacteroidetes,
                firmicutes: profile.firmicutes,
            })
        })
        .collect();

    if samples.len() < total {
        warn!(
            "Dropped {} sampled rows without phylum abundances",
            total - samples.len()
        );
    }
    SampleTable::new(samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    fn rows(n: usize) -> Vec<OrdinationRow> {
        (0..n)
            .map(|i| OrdinationRow {
                id: format!("s{}", i),
                pc1: i as f64,
                pc2: -(i as f64),
            })
            .collect()
    }

    #[test]
    fn test_subsample_size_and_order() {
        let picked = subsample(rows(50), 10, Some(7));
        assert_eq!(picked.len(), 10);
        assert!(picked.windows(2).all(|w| w[0].pc1 < w[1].pc1));
    }

    #[test]
    fn test_subsample_seed_is_reproducible() {
        assert_eq!(subsample(rows(50), 10, Some(42)), subsample(rows(50), 10, Some(42)));
    }

    #[test]
    fn test_subsample_small_table_kept_whole() {
        assert_eq!(subsample(rows(5), 10, None), rows(5));
    }

    #[test]
    fn test_join_is_inner() {
        let mut phyla = FxHashMap::default();
        phyla.insert(
            "s1".to_string(),
            PhylumProfile {
                bacteroidetes: 0.3,
                firmicutes: 0.6,
            },
        );
        let table = join(rows(3), &phyla).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(
            table.get("s1").unwrap(),
            &Sample {
                id: "s1".to_string(),
                pc1: 1.0,
                pc2: -1.0,
                bacteroidetes: 0.3,
                firmicutes: 0.6,
            }
        );
    }

    #[test]
    fn test_join_rejects_duplicate_ids() {
        let mut phyla = FxHashMap::default();
        phyla.insert("s0".to_string(), PhylumProfile::default());
        let mut dup = rows(1);
        dup.extend(rows(1));
        assert!(matches!(join(dup, &phyla), Err(GutError::DuplicateSample(_))));
    }

    #[test]
    fn test_load() -> Result<()> {
        let dir = tempdir()?;
        let ordination = dir.path().join("pcoa.csv");
        let genera = dir.path().join("genus.csv");
        let metadata = dir.path().join("metadata.tsv");

        let mut file = File::create(&ordination)?;
        writeln!(file, ",PC1,PC2\nA,0.1,0.2\nB,0.3,0.4\nC,0.5,0.6")?;
        let mut file = File::create(&genera)?;
        writeln!(file, "id,Genus,Phylum,count")?;
        writeln!(file, "A,Bacteroides,Bacteroidetes,50\nA,Blautia,Firmicutes,50")?;
        writeln!(file, "B,Bacteroides,Bacteroidetes,10\nB,Blautia,Firmicutes,30")?;
        let mut file = File::create(&metadata)?;
        writeln!(file, "sample_name\tdog\nA\ttrue")?;

        let dataset = Dataset::load(&LoadOptions {
            ordination,
            genera,
            metadata,
            subsample: DEFAULT_SUBSAMPLE,
            seed: None,
        })?;

        assert_eq!(dataset.samples.len(), 2);
        let b = dataset.samples.get("B").unwrap();
        assert!((b.bacteroidetes - 0.25).abs() < 1e-12);
        assert!((b.firmicutes - 0.75).abs() < 1e-12);
        assert!(dataset.samples.get("C").is_none());
        assert_eq!(dataset.metadata.len(), 1);
        Ok(())
    }
}
