use fxhash::FxHashSet;
use log::debug;

use super::types::{Attribute, CohortSummary, SummaryEntry, SummaryValue};
use crate::dataset::{Condition, Diagnosis, Flag, Frequency, MetadataRecord, MetadataTable, Sex};

/// Plausible BMI values, exclusive
pub const BMI_RANGE: (f64, f64) = (13.0, 40.0);
/// Plausible heights in cm, exclusive
pub const HEIGHT_RANGE: (f64, f64) = (130.0, 220.0);

fn within(value: f64, (low, high): (f64, f64)) -> bool {
    value > low && value < high
}

fn mean_of(values: impl Iterator<Item = f64>) -> SummaryValue {
    let (sum, n) = values.fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    SummaryValue::Mean {
        mean: (n > 0).then(|| sum / n as f64),
        n,
    }
}

fn count_of<F>(members: &[&MetadataRecord], predicate: F) -> SummaryValue
where
    F: Fn(&MetadataRecord) -> bool,
{
    SummaryValue::Count {
        count: members.iter().filter(|r| predicate(**r)).count(),
        of: members.len(),
    }
}

fn professionally_diagnosed(record: &MetadataRecord, condition: Condition) -> bool {
    record.diagnosis(condition).is(&Diagnosis::Professional)
}

fn evaluate(
    attribute: Attribute,
    members: &[&MetadataRecord],
    reference_year: i32,
) -> SummaryValue {
    match attribute {
        Attribute::Dog => count_of(members, |r| r.dog.is(&Flag(true))),
        Attribute::Cat => count_of(members, |r| r.cat.is(&Flag(true))),
        Attribute::Diagnosed => count_of(members, |r| {
            Condition::ALL
                .iter()
                .any(|&c| professionally_diagnosed(r, c))
        }),
        Attribute::Ibd => count_of(members, |r| professionally_diagnosed(r, Condition::Ibd)),
        Attribute::Ibs => count_of(members, |r| professionally_diagnosed(r, Condition::Ibs)),
        Attribute::Diabetes => {
            count_of(members, |r| professionally_diagnosed(r, Condition::Diabetes))
        }
        Attribute::CollegeDegree => count_of(members, |r| {
            r.education.value().is_some_and(|e| e.has_degree())
        }),
        Attribute::Smoker => count_of(members, |r| {
            r.smoking.value().is_some_and(|f| *f != Frequency::Never)
        }),
        Attribute::Drinker => count_of(members, |r| {
            r.alcohol.value().is_some_and(|f| *f >= Frequency::Regularly)
        }),
        Attribute::Female => count_of(members, |r| r.sex.is(&Sex::Female)),
        Attribute::Male => count_of(members, |r| r.sex.is(&Sex::Male)),
        Attribute::Age => mean_of(
            members
                .iter()
                .filter_map(|r| r.birth_year.value())
                .map(|&year| (reference_year - year) as f64)
                .filter(|&age| age >= 0.0),
        ),
        Attribute::Bmi => mean_of(
            members
                .iter()
                .filter_map(|r| r.bmi.value().copied())
                .filter(|&bmi| within(bmi, BMI_RANGE)),
        ),
        Attribute::Height => mean_of(
            members
                .iter()
                .filter_map(|r| r.height_cm.value().copied())
                .filter(|&height| within(height, HEIGHT_RANGE)),
        ),
    }
}

/// Summarize the survey answers of a cohort. Repeated ids count once and
/// ids without metadata are left out of every aggregate. Ages are taken
/// relative to `reference_year`.
pub fn describe<'a, I>(ids: I, metadata: &MetadataTable, reference_year: i32) -> CohortSummary
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = FxHashSet::default();
    let mut cohort_size = 0;
    let mut members = Vec::new();
    for id in ids {
        if !seen.insert(id) {
            continue;
        }
        cohort_size += 1;
        match metadata.require(id) {
            Ok(record) => members.push(record),
            Err(e) => debug!("{}; excluded from summary", e),
        }
    }

    let entries = Attribute::ALL
        .iter()
        .map(|&attribute| SummaryEntry {
            attribute,
            icon: attribute.icon(),
            label: attribute.label(),
            value: evaluate(attribute, &members, reference_year),
        })
        .collect();

    CohortSummary {
        cohort_size,
        with_metadata: members.len(),
        entries,
    }
}
