use fxhash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{GutError, Result};

/// One individual of the working population
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub id: String,
    pub pc1: f64,
    pub pc2: f64,
    /// Relative abundance of Bacteroidetes (0.0 to 1.0)
    pub bacteroidetes: f64,
    /// Relative abundance of Firmicutes (0.0 to 1.0)
    pub firmicutes: f64,
}

/// The sampled population, in table order. Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct SampleTable {
    rows: Vec<Sample>,
    index: FxHashMap<String, usize>,
}

impl SampleTable {
    /// Build a table, rejecting duplicate ids and abundances outside [0, 1]
    pub fn new(rows: Vec<Sample>) -> Result<Self> {
        let mut index = FxHashMap::default();
        for (idx, sample) in rows.iter().enumerate() {
            for (name, value) in [
                ("Bacteroidetes", sample.bacteroidetes),
                ("Firmicutes", sample.firmicutes),
            ] {
                if !(0.0..=1.0).contains(&value) {
                    return Err(GutError::InvalidArgument(format!(
                        "{} abundance {} for sample '{}' is outside [0, 1]",
                        name, value, sample.id
                    )));
                }
            }
            if !sample.pc1.is_finite() || !sample.pc2.is_finite() {
                return Err(GutError::InvalidArgument(format!(
                    "non-finite ordination coordinates for sample '{}'",
                    sample.id
                )));
            }
            if index.insert(sample.id.clone(), idx).is_some() {
                return Err(GutError::DuplicateSample(sample.id.clone()));
            }
        }
        Ok(SampleTable { rows, index })
    }

    pub fn get(&self, id: &str) -> Option<&Sample> {
        self.index.get(id).map(|&idx| &self.rows[idx])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Sample> {
        self.rows.iter()
    }

    pub fn rows(&self) -> &[Sample] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A metadata answer with the survey's non-answers kept apart from real values
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Reported<T> {
    Value(T),
    NotApplicable,
    NotProvided,
    /// Blank, absent column, or a value that could not be understood
    Missing,
}

impl<T> Default for Reported<T> {
    fn default() -> Self {
        Reported::Missing
    }
}

impl<T> Reported<T> {
    pub fn value(&self) -> Option<&T> {
        match self {
            Reported::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn is(&self, expected: &T) -> bool
    where
        T: PartialEq,
    {
        self.value() == Some(expected)
    }

    /// Recognise the survey sentinels; `None` means the raw text needs parsing
    fn sentinel(raw: &str) -> Option<Self> {
        match raw.trim() {
            "" => Some(Reported::Missing),
            s if s.eq_ignore_ascii_case("not applicable") => Some(Reported::NotApplicable),
            s if s.eq_ignore_ascii_case("not provided")
                || s.eq_ignore_ascii_case("unspecified")
                || s.eq_ignore_ascii_case("nan") =>
            {
                Some(Reported::NotProvided)
            }
            _ => None,
        }
    }
}

impl<T: FromStr> Reported<T> {
    /// Parse a categorical label; unknown labels become `Missing`
    pub fn parse_label(raw: &str) -> Self {
        Self::sentinel(raw).unwrap_or_else(|| {
            raw.trim()
                .parse::<T>()
                .map(Reported::Value)
                .unwrap_or(Reported::Missing)
        })
    }
}

impl Reported<f64> {
    /// Parse a numeric-as-string field, failing on anything that is neither
    /// a sentinel nor a finite number
    pub fn parse_numeric(column: &str, sample: &str, raw: &str) -> Result<Self> {
        if let Some(sentinel) = Self::sentinel(raw) {
            return Ok(sentinel);
        }
        match raw.trim().parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(Reported::Value(v)),
            _ => Err(GutError::MalformedField {
                column: column.to_string(),
                value: raw.to_string(),
                sample: sample.to_string(),
            }),
        }
    }
}

impl Reported<i32> {
    /// Parse a whole-number field; `1980.0` is accepted as 1980
    pub fn parse_integer(column: &str, sample: &str, raw: &str) -> Result<Self> {
        match Reported::<f64>::parse_numeric(column, sample, raw)? {
            Reported::Value(v) if v.fract() == 0.0 && v.abs() < i32::MAX as f64 => {
                Ok(Reported::Value(v as i32))
            }
            Reported::Value(_) => Err(GutError::MalformedField {
                column: column.to_string(),
                value: raw.to_string(),
                sample: sample.to_string(),
            }),
            Reported::NotApplicable => Ok(Reported::NotApplicable),
            Reported::NotProvided => Ok(Reported::NotProvided),
            Reported::Missing => Ok(Reported::Missing),
        }
    }
}

/// Yes/no answers such as pet ownership
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flag(pub bool);

impl FromStr for Flag {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, ()> {
        match s.to_ascii_lowercase().as_str() {
            "true" | "yes" => Ok(Flag(true)),
            "false" | "no" => Ok(Flag(false)),
            _ => Err(()),
        }
    }
}

/// Chronic conditions asked about in the survey
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Condition {
    Cancer,
    Alzheimers,
    CardiovascularDisease,
    Diabetes,
    Ibd,
    Ibs,
    KidneyDisease,
    LiverDisease,
    LungDisease,
    MentalIllness,
    SkinCondition,
}

impl Condition {
    pub const COUNT: usize = 11;

    pub const ALL: [Condition; Condition::COUNT] = [
        Condition::Cancer,
        Condition::Alzheimers,
        Condition::CardiovascularDisease,
        Condition::Diabetes,
        Condition::Ibd,
        Condition::Ibs,
        Condition::KidneyDisease,
        Condition::LiverDisease,
        Condition::LungDisease,
        Condition::MentalIllness,
        Condition::SkinCondition,
    ];

    /// Column name in the metadata table
    pub fn column(&self) -> &'static str {
        match self {
            Condition::Cancer => "cancer",
            Condition::Alzheimers => "alzheimers",
            Condition::CardiovascularDisease => "cardiovascular_disease",
            Condition::Diabetes => "diabetes",
            Condition::Ibd => "ibd",
            Condition::Ibs => "ibs",
            Condition::KidneyDisease => "kidney_disease",
            Condition::LiverDisease => "liver_disease",
            Condition::LungDisease => "lung_disease",
            Condition::MentalIllness => "mental_illness",
            Condition::SkinCondition => "skin_condition",
        }
    }

    fn slot(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.column())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Diagnosis {
    NotDiagnosed,
    Professional,
    AlternativePractitioner,
    SelfDiagnosed,
}

impl FromStr for Diagnosis {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, ()> {
        let s = s.to_ascii_lowercase();
        if s == "i do not have this condition" {
            Ok(Diagnosis::NotDiagnosed)
        } else if s.starts_with("diagnosed by a medical professional") {
            Ok(Diagnosis::Professional)
        } else if s.starts_with("diagnosed by an alternative medicine practitioner") {
            Ok(Diagnosis::AlternativePractitioner)
        } else if s == "self-diagnosed" {
            Ok(Diagnosis::SelfDiagnosed)
        } else {
            Err(())
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sex {
    Female,
    Male,
    Other,
}

impl FromStr for Sex {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, ()> {
        match s.to_ascii_lowercase().as_str() {
            "female" => Ok(Sex::Female),
            "male" => Ok(Sex::Male),
            "other" => Ok(Sex::Other),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Education {
    DidNotCompleteHighSchool,
    HighSchool,
    SomeCollege,
    Associate,
    Bachelor,
    SomeGraduate,
    Graduate,
}

impl Education {
    /// Bachelor's degree or higher
    pub fn has_degree(&self) -> bool {
        *self >= Education::Bachelor
    }
}

impl FromStr for Education {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, ()> {
        let s = s.to_ascii_lowercase();
        if s.starts_with("did not complete high school") {
            Ok(Education::DidNotCompleteHighSchool)
        } else if s.starts_with("high school") {
            Ok(Education::HighSchool)
        } else if s.starts_with("some college") {
            Ok(Education::SomeCollege)
        } else if s.starts_with("associate") {
            Ok(Education::Associate)
        } else if s.starts_with("bachelor") {
            Ok(Education::Bachelor)
        } else if s.starts_with("some graduate") {
            Ok(Education::SomeGraduate)
        } else if s.starts_with("graduate or professional") {
            Ok(Education::Graduate)
        } else {
            Err(())
        }
    }
}

/// How often something happens, as used by the smoking and alcohol questions
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Frequency {
    Never,
    Rarely,
    Occasionally,
    Regularly,
    Daily,
}

impl FromStr for Frequency {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, ()> {
        let s = s.to_ascii_lowercase();
        if s.starts_with("never") {
            Ok(Frequency::Never)
        } else if s.starts_with("rarely") {
            Ok(Frequency::Rarely)
        } else if s.starts_with("occasionally") {
            Ok(Frequency::Occasionally)
        } else if s.starts_with("regularly") {
            Ok(Frequency::Regularly)
        } else if s.starts_with("daily") {
            Ok(Frequency::Daily)
        } else {
            Err(())
        }
    }
}

/// Survey answers for one individual, typed at load time
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataRecord {
    pub sample_name: String,
    pub dog: Reported<Flag>,
    pub cat: Reported<Flag>,
    pub diagnoses: [Reported<Diagnosis>; Condition::COUNT],
    pub education: Reported<Education>,
    pub sex: Reported<Sex>,
    pub smoking: Reported<Frequency>,
    pub alcohol: Reported<Frequency>,
    pub birth_year: Reported<i32>,
    pub bmi: Reported<f64>,
    pub height_cm: Reported<f64>,
}

impl MetadataRecord {
    pub const SAMPLE_NAME: &'static str = "sample_name";

    /// A record where nothing was answered
    pub fn new(sample_name: impl Into<String>) -> Self {
        MetadataRecord {
            sample_name: sample_name.into(),
            ..Default::default()
        }
    }

    /// Build a record from raw column values. `field` looks a column up by
    /// name; numeric fields that fail to parse are returned alongside the
    /// record and left as `Missing`.
    pub fn parse<'a, F>(sample_name: &str, field: F) -> (Self, Vec<GutError>)
    where
        F: Fn(&str) -> Option<&'a str>,
    {
        let mut malformed = Vec::new();
        let raw = |column: &str| field(column).unwrap_or("");

        let mut record = MetadataRecord::new(sample_name);
        record.dog = Reported::parse_label(raw("dog"));
        record.cat = Reported::parse_label(raw("cat"));
        for condition in Condition::ALL {
            record.set_diagnosis(condition, Reported::parse_label(raw(condition.column())));
        }
        record.education = Reported::parse_label(raw("level_of_education"));
        record.sex = Reported::parse_label(raw("sex"));
        record.smoking = Reported::parse_label(raw("smoking_frequency"));
        record.alcohol = Reported::parse_label(raw("alcohol_frequency"));

        record.birth_year = Reported::parse_integer("birth_year", sample_name, raw("birth_year"))
            .unwrap_or_else(|e| {
                malformed.push(e);
                Reported::Missing
            });
        for (column, slot) in [("bmi", &mut record.bmi), ("height_cm", &mut record.height_cm)] {
            *slot = Reported::parse_numeric(column, sample_name, raw(column)).unwrap_or_else(|e| {
                malformed.push(e);
                Reported::Missing
            });
        }

        (record, malformed)
    }

    pub fn diagnosis(&self, condition: Condition) -> &Reported<Diagnosis> {
        &self.diagnoses[condition.slot()]
    }

    pub fn set_diagnosis(&mut self, condition: Condition, diagnosis: Reported<Diagnosis>) {
        self.diagnoses[condition.slot()] = diagnosis;
    }
}

/// Metadata indexed by sample name. Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct MetadataTable {
    records: Vec<MetadataRecord>,
    index: FxHashMap<String, usize>,
}

impl MetadataTable {
    /// Index records by sample name; later duplicates are returned, not kept
    pub fn new(records: Vec<MetadataRecord>) -> (Self, Vec<String>) {
        let mut table = MetadataTable::default();
        let mut duplicates = Vec::new();
        for record in records {
            if table.index.contains_key(&record.sample_name) {
                duplicates.push(record.sample_name);
                continue;
            }
            table.index.insert(record.sample_name.clone(), table.records.len());
            table.records.push(record);
        }
        (table, duplicates)
    }

    pub fn get(&self, sample_name: &str) -> Option<&MetadataRecord> {
        self.index.get(sample_name).map(|&idx| &self.records[idx])
    }

    /// Look up a sample, reporting absence as `MissingMetadata`
    pub fn require(&self, sample_name: &str) -> Result<&MetadataRecord> {
        self.get(sample_name)
            .ok_or_else(|| GutError::MissingMetadata(sample_name.to_string()))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MetadataRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn sample(id: &str, b: f64, f: f64) -> Sample {
        Sample {
            id: id.to_string(),
            pc1: 0.0,
            pc2: 0.0,
            bacteroidetes: b,
            firmicutes: f,
        }
    }

    #[test]
    fn test_sample_table_rejects_duplicates() {
        let err = SampleTable::new(vec![sample("A", 0.1, 0.2), sample("A", 0.3, 0.4)]).unwrap_err();
        assert!(matches!(err, GutError::DuplicateSample(id) if id == "A"));
    }

    #[test]
    fn test_sample_table_rejects_out_of_range_abundance() {
        let err = SampleTable::new(vec![sample("A", 1.2, 0.2)]).unwrap_err();
        assert!(matches!(err, GutError::InvalidArgument(_)));
    }

    #[test]
    fn test_sample_table_lookup() {
        let table = SampleTable::new(vec![sample("A", 0.1, 0.2), sample("B", 0.3, 0.4)]).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("B").unwrap().firmicutes, 0.4);
        assert!(table.get("C").is_none());
    }

    #[test]
    fn test_sentinels() {
        assert_eq!(Reported::<Sex>::parse_label("Not applicable"), Reported::NotApplicable);
        assert_eq!(Reported::<Sex>::parse_label("Not provided"), Reported::NotProvided);
        assert_eq!(Reported::<Sex>::parse_label(""), Reported::Missing);
        assert_eq!(Reported::<Sex>::parse_label("female"), Reported::Value(Sex::Female));
        assert_eq!(Reported::<Sex>::parse_label("alien"), Reported::Missing);
    }

    #[test]
    fn test_numeric_parsing() {
        assert_eq!(
            Reported::parse_numeric("bmi", "s1", "22.5").unwrap(),
            Reported::Value(22.5)
        );
        assert_eq!(
            Reported::parse_numeric("bmi", "s1", "Not provided").unwrap(),
            Reported::NotProvided
        );
        let err = Reported::parse_numeric("bmi", "s1", "tall").unwrap_err();
        assert!(matches!(err, GutError::MalformedField { column, .. } if column == "bmi"));
        assert_eq!(
            Reported::parse_integer("birth_year", "s1", "1980.0").unwrap(),
            Reported::Value(1980)
        );
        assert!(Reported::parse_integer("birth_year", "s1", "1980.5").is_err());
    }

    #[test]
    fn test_record_parse() {
        let raw: HashMap<&str, &str> = [
            ("dog", "true"),
            ("cat", "false"),
            ("ibd", "Diagnosed by a medical professional (doctor, physician assistant)"),
            ("ibs", "I do not have this condition"),
            ("level_of_education", "Graduate or Professional degree"),
            ("sex", "male"),
            ("smoking_frequency", "Rarely (a few times/month)"),
            ("birth_year", "1975"),
            ("bmi", "n/a"),
            ("height_cm", "Not applicable"),
        ]
        .into_iter()
        .collect();

        let (record, malformed) = MetadataRecord::parse("s1", |c| raw.get(c).copied());

        assert_eq!(record.dog, Reported::Value(Flag(true)));
        assert_eq!(record.cat, Reported::Value(Flag(false)));
        assert_eq!(*record.diagnosis(Condition::Ibd), Reported::Value(Diagnosis::Professional));
        assert_eq!(*record.diagnosis(Condition::Ibs), Reported::Value(Diagnosis::NotDiagnosed));
        assert_eq!(*record.diagnosis(Condition::Cancer), Reported::Missing);
        assert!(record.education.value().unwrap().has_degree());
        assert_eq!(record.smoking, Reported::Value(Frequency::Rarely));
        assert_eq!(record.birth_year, Reported::Value(1975));
        assert_eq!(record.bmi, Reported::Missing);
        assert_eq!(record.height_cm, Reported::NotApplicable);
        assert_eq!(malformed.len(), 1);
    }

    #[test]
    fn test_metadata_table_keeps_first_duplicate() {
        let mut first = MetadataRecord::new("s1");
        first.dog = Reported::Value(Flag(true));
        let (table, duplicates) =
            MetadataTable::new(vec![first, MetadataRecord::new("s1"), MetadataRecord::new("s2")]);
        assert_eq!(table.len(), 2);
        assert_eq!(duplicates, vec!["s1".to_string()]);
        assert!(table.get("s1").unwrap().dog.is(&Flag(true)));
        assert!(matches!(table.require("s3"), Err(GutError::MissingMetadata(_))));
    }
}
