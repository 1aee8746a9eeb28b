use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use fxhash::FxHashMap;
use log::{info, warn};

use crate::dataset::{MetadataRecord, MetadataTable};
use crate::error::{GutError, Result};
use crate::taxa::GenusRecord;

/// A sample's position in the 2-D ordination
#[derive(Debug, Clone, PartialEq)]
pub struct OrdinationRow {
    pub id: String,
    pub pc1: f64,
    pub pc2: f64,
}

fn column_index(headers: &StringRecord, name: &str, path: &Path) -> Result<usize> {
    headers
        .iter()
        .position(|h| h.trim() == name)
        .ok_or_else(|| GutError::MissingColumn {
            file: path.display().to_string(),
            column: name.to_string(),
        })
}

fn parse_coordinate(record: &StringRecord, idx: usize, column: &str, id: &str) -> Result<f64> {
    let raw = record.get(idx).unwrap_or("");
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| GutError::MalformedField {
            column: column.to_string(),
            value: raw.to_string(),
            sample: id.to_string(),
        })
}

/// Read the ordination table. The first column holds the sample id whatever
/// its header says; `PC1` and `PC2` are located by name.
pub fn read_ordination<P: AsRef<Path>>(path: P) -> Result<Vec<OrdinationRow>> {
    let path = path.as_ref();
    info!("Reading ordination from {}", path.display());

    let mut reader = ReaderBuilder::new().from_path(path)?;
    let headers = reader.headers()?.clone();
    let pc1_idx = column_index(&headers, "PC1", path)?;
    let pc2_idx = column_index(&headers, "PC2", path)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let id = record.get(0).unwrap_or("").trim().to_string();
        if id.is_empty() {
            warn!("Skipping ordination row without a sample id");
            continue;
        }
        let pc1 = parse_coordinate(&record, pc1_idx, "PC1", &id)?;
        let pc2 = parse_coordinate(&record, pc2_idx, "PC2", &id)?;
        rows.push(OrdinationRow { id, pc1, pc2 });
    }

    info!("Read {} ordination rows from {}", rows.len(), path.display());
    Ok(rows)
}

/// Read the long-format genus table (`id`, `Genus`, `Phylum`, `count`, ...)
pub fn read_genera<P: AsRef<Path>>(path: P) -> Result<Vec<GenusRecord>> {
    let path = path.as_ref();
    info!("Reading genus-level data from {}", path.display());

    let mut reader = ReaderBuilder::new().from_path(path)?;
    let headers = reader.headers()?.clone();
    for required in ["id", "count"] {
        column_index(&headers, required, path)?;
    }

    let records = reader
        .deserialize::<GenusRecord>()
        .collect::<std::result::Result<Vec<_>, _>>()?;

    info!("Read {} genus rows from {}", records.len(), path.display());
    Ok(records)
}

/// Read the tab-separated metadata table, indexed on `sample_name`.
/// Malformed numeric fields are logged and treated as missing.
pub fn read_metadata<P: AsRef<Path>>(path: P) -> Result<MetadataTable> {
    let path = path.as_ref();
    info!("Reading metadata from {}", path.display());

    let mut reader = ReaderBuilder::new()
        .delimiter(b'\t')
        .flexible(true)
        .from_path(path)?;
    let headers = reader.headers()?.clone();
    let name_idx = column_index(&headers, MetadataRecord::SAMPLE_NAME, path)?;
    let mut columns: FxHashMap<&str, usize> = FxHashMap::default();
    for (idx, header) in headers.iter().enumerate() {
        columns.entry(header.trim()).or_insert(idx);
    }

    let mut records = Vec::new();
    let mut num_malformed = 0;
    for row in reader.records() {
        let row = row?;
        let sample_name = row.get(name_idx).unwrap_or("").trim();
        if sample_name.is_empty() {
            warn!("Skipping metadata row without a sample name");
            continue;
        }

        let (record, malformed) = MetadataRecord::parse(sample_name, |column| {
            columns.get(column).and_then(|&idx| row.get(idx))
        });
        for err in &malformed {
            warn!("{}; treating as missing", err);
        }
        num_malformed += malformed.len();
        records.push(record);
    }

    let (table, duplicates) = MetadataTable::new(records);
    if !duplicates.is_empty() {
        warn!(
            "Ignored {} duplicate metadata rows (first: {})",
            duplicates.len(),
            duplicates[0]
        );
    }
    info!("Read metadata for {} samples", table.len());
    if num_malformed > 0 {
        warn!("Treated {} malformed numeric fields as missing", num_malformed);
    }
    Ok(table)
}
