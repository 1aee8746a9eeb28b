use dashmap::DashMap;
use fxhash::FxHashMap;
use log::debug;
use rayon::prelude::*;

use super::types::{GenusRecord, PhylumProfile, BACTEROIDETES, FIRMICUTES};
use crate::error::{GutError, Result};

/// Accumulates per-sample library sizes and phylum read counts
pub struct PhylumCounter {
    library: DashMap<String, f64>,
    phyla: DashMap<(String, String), f64>,
}

impl PhylumCounter {
    pub fn new() -> Self {
        PhylumCounter {
            library: DashMap::new(),
            phyla: DashMap::new(),
        }
    }

    /// Count one genus row towards its sample
    pub fn count_record(&self, record: &GenusRecord) -> Result<()> {
        if !record.count.is_finite() || record.count < 0.0 {
            return Err(GutError::MalformedField {
                column: "count".to_string(),
                value: record.count.to_string(),
                sample: record.id.clone(),
            });
        }

        *self.library.entry(record.id.clone()).or_insert(0.0) += record.count;
        // Rows without a phylum still count towards the library size
        if let Some(phylum) = &record.phylum {
            *self
                .phyla
                .entry((record.id.clone(), phylum.clone()))
                .or_insert(0.0) += record.count;
        }
        Ok(())
    }

    /// Process records in parallel using rayon
    pub fn count_records(&self, records: &[GenusRecord]) -> Result<()> {
        records.par_iter().try_for_each(|record| self.count_record(record))
    }

    /// Number of samples seen so far
    pub fn sample_count(&self) -> usize {
        self.library.len()
    }

    /// Bacteroidetes and Firmicutes as a fraction of each sample's library.
    /// Samples with an empty library are skipped.
    pub fn relative_abundances(&self) -> FxHashMap<String, PhylumProfile> {
        let phylum_count = |id: &str, phylum: &str| {
            self.phyla
                .get(&(id.to_string(), phylum.to_string()))
                .map(|entry| *entry.value())
                .unwrap_or(0.0)
        };

        self.library
            .iter()
            .filter_map(|entry| {
                let (id, total) = (entry.key(), *entry.value());
                if total <= 0.0 {
                    debug!("Sample {} has an empty library, skipping", id);
                    return None;
                }
                Some((
                    id.clone(),
                    PhylumProfile {
                        bacteroidetes: phylum_count(id, BACTEROIDETES) / total,
                        firmicutes: phylum_count(id, FIRMICUTES) / total,
                    },
                ))
            })
            .collect()
    }
}

impl Default for PhylumCounter {
    fn default() -> Self {
        Self::new()
    }
}
