use std::collections::BTreeMap;

use crate::error::{GutError, Result};
use crate::taxa::GenusRecord;

/// Largest read count accepted for a single genus row
pub const MAX_COUNT: f64 = u32::MAX as f64;

/// Dense sample × genus read counts
#[derive(Debug, Clone, PartialEq)]
pub struct CountTable {
    pub sample_ids: Vec<String>,
    pub genera: Vec<String>,
    /// One row per sample, one column per genus
    pub counts: Vec<Vec<u64>>,
}

impl CountTable {
    /// Pivot long-format genus rows, summing repeated (sample, genus) pairs.
    /// Rows without a genus are left out. Samples and genera come out sorted.
    pub fn from_records(records: &[GenusRecord]) -> Result<Self> {
        let mut cells: BTreeMap<&str, BTreeMap<&str, u64>> = BTreeMap::new();
        let mut genera: BTreeMap<&str, usize> = BTreeMap::new();

        for record in records {
            let Some(genus) = record.genus.as_deref() else {
                continue;
            };
            let malformed = || GutError::MalformedField {
                column: "count".to_string(),
                value: record.count.to_string(),
                sample: record.id.clone(),
            };
            let count = record.count;
            if !(0.0..=MAX_COUNT).contains(&count) || count.fract() != 0.0 {
                return Err(malformed());
            }
            let cell = cells
                .entry(record.id.as_str())
                .or_default()
                .entry(genus)
                .or_insert(0);
            *cell = cell.checked_add(count as u64).ok_or_else(malformed)?;
            genera.insert(genus, 0);
        }

        for (idx, slot) in genera.values_mut().enumerate() {
            *slot = idx;
        }

        let counts = cells
            .values()
            .map(|row| {
                let mut dense = vec![0u64; genera.len()];
                for (genus, &count) in row {
                    dense[genera[genus]] = count;
                }
                dense
            })
            .collect();

        Ok(CountTable {
            sample_ids: cells.keys().map(|id| id.to_string()).collect(),
            genera: genera.keys().map(|g| g.to_string()).collect(),
            counts,
        })
    }

    pub fn library_size(&self, row: usize) -> u64 {
        self.counts[row].iter().sum()
    }

    pub fn n_samples(&self) -> usize {
        self.sample_ids.len()
    }
}
