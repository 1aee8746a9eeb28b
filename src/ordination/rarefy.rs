use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use super::table::CountTable;
use crate::error::{GutError, Result};

/// Draw `depth` reads without replacement from one sample's counts
fn subsample_counts(counts: &[u64], depth: u64, rng: &mut StdRng) -> Vec<u64> {
    let total: u64 = counts.iter().sum();
    let mut cumulative = Vec::with_capacity(counts.len());
    let mut running = 0u64;
    for &c in counts {
        running += c;
        cumulative.push(running);
    }

    let mut drawn = vec![0u64; counts.len()];
    for read in rand::seq::index::sample(rng, total as usize, depth as usize).iter() {
        // first bin whose cumulative count exceeds the read index
        let bin = cumulative.partition_point(|&upto| upto <= read as u64);
        drawn[bin] += 1;
    }
    drawn
}

/// Rarefy every sample to `depth` reads, dropping those with fewer.
/// Samples are drawn in parallel; with a seed the result is reproducible.
pub fn rarefy(table: &CountTable, depth: u64, seed: Option<u64>) -> Result<CountTable> {
    if depth == 0 {
        return Err(GutError::InvalidArgument(
            "rarefaction depth must be at least 1".to_string(),
        ));
    }
    info!(
        "Subsampling {}x{} count matrix to a depth of {}",
        table.n_samples(),
        table.genera.len(),
        depth
    );

    let base_seed = seed.unwrap_or_else(|| rand::thread_rng().gen());
    let keep: Vec<usize> = (0..table.n_samples())
        .filter(|&row| table.library_size(row) >= depth)
        .collect();
    info!(
        "Removing {} samples due to low depth",
        table.n_samples() - keep.len()
    );

    let counts: Vec<Vec<u64>> = keep
        .par_iter()
        .map(|&row| {
            let mut rng = StdRng::seed_from_u64(base_seed.wrapping_add(row as u64));
            subsample_counts(&table.counts[row], depth, &mut rng)
        })
        .collect();

    Ok(CountTable {
        sample_ids: keep.iter().map(|&row| table.sample_ids[row].clone()).collect(),
        genera: table.genera.clone(),
        counts,
    })
}
