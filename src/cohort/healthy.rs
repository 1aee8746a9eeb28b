use log::{debug, info};

use super::types::ReferencePoint;
use crate::dataset::{Condition, Diagnosis, MetadataRecord, MetadataTable, SampleTable};
use crate::error::{GutError, Result};

/// Rules an individual must meet to count towards the healthy reference.
/// All bounds are exclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HealthyCriteria {
    pub bmi: (f64, f64),
    pub birth_year: (i32, i32),
}

impl Default for HealthyCriteria {
    fn default() -> Self {
        HealthyCriteria {
            bmi: (18.5, 25.0),
            birth_year: (1959, 1999),
        }
    }
}

impl HealthyCriteria {
    pub fn matches(&self, record: &MetadataRecord) -> bool {
        let no_conditions = Condition::ALL
            .iter()
            .all(|&c| record.diagnosis(c).is(&Diagnosis::NotDiagnosed));
        let bmi_ok = record
            .bmi
            .value()
            .is_some_and(|&bmi| bmi > self.bmi.0 && bmi < self.bmi.1);
        let age_ok = record
            .birth_year
            .value()
            .is_some_and(|&year| year > self.birth_year.0 && year < self.birth_year.1);
        no_conditions && bmi_ok && age_ok
    }
}

/// Mean position of the healthy individuals in the sample table, using the
/// default criteria
pub fn healthiest(samples: &SampleTable, metadata: &MetadataTable) -> Result<ReferencePoint> {
    healthiest_with(samples, metadata, &HealthyCriteria::default())
}

pub fn healthiest_with(
    samples: &SampleTable,
    metadata: &MetadataTable,
    criteria: &HealthyCriteria,
) -> Result<ReferencePoint> {
    let healthy: Vec<&str> = metadata
        .iter()
        .filter(|record| criteria.matches(record))
        .map(|record| record.sample_name.as_str())
        .collect();
    debug!("{} metadata records meet the healthy criteria", healthy.len());

    let matched: Vec<_> = healthy.iter().filter_map(|id| samples.get(id)).collect();
    if matched.is_empty() {
        return Err(GutError::EmptyCohort(format!(
            "none of the {} healthy individuals are in the sample table",
            healthy.len()
        )));
    }

    let n = matched.len() as f64;
    let mut reference = ReferencePoint {
        bacteroidetes: 0.0,
        firmicutes: 0.0,
        pc1: 0.0,
        pc2: 0.0,
        n: matched.len(),
    };
    for sample in &matched {
        reference.bacteroidetes += sample.bacteroidetes / n;
        reference.firmicutes += sample.firmicutes / n;
        reference.pc1 += sample.pc1 / n;
        reference.pc2 += sample.pc2 / n;
    }

    info!(
        "Healthy reference from {} samples: Bacteroidetes {:.3}, Firmicutes {:.3}",
        reference.n, reference.bacteroidetes, reference.firmicutes
    );
    Ok(reference)
}
