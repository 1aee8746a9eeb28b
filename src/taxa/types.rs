use serde::{Deserialize, Serialize};

pub const BACTEROIDETES: &str = "Bacteroidetes";
pub const FIRMICUTES: &str = "Firmicutes";

/// One row of the long-format genus table
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GenusRecord {
    pub id: String,
    #[serde(rename = "Genus", default)]
    pub genus: Option<String>,
    #[serde(rename = "Phylum", default)]
    pub phylum: Option<String>,
    pub count: f64,
}

#[cfg(test)]
impl GenusRecord {
    pub fn new(id: &str, genus: Option<&str>, phylum: Option<&str>, count: f64) -> Self {
        GenusRecord {
            id: id.to_string(),
            genus: genus.map(str::to_string),
            phylum: phylum.map(str::to_string),
            count,
        }
    }
}

/// Relative abundances of the two phyla the dashboard works with
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PhylumProfile {
    pub bacteroidetes: f64,
    pub firmicutes: f64,
}
