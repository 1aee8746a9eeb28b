use serde::Serialize;

/// The attributes every cohort summary reports, in output order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    Dog,
    Cat,
    Diagnosed,
    Ibd,
    Ibs,
    Diabetes,
    CollegeDegree,
    Smoker,
    Drinker,
    Female,
    Male,
    Age,
    Bmi,
    Height,
}

impl Attribute {
    pub const ALL: [Attribute; 14] = [
        Attribute::Dog,
        Attribute::Cat,
        Attribute::Diagnosed,
        Attribute::Ibd,
        Attribute::Ibs,
        Attribute::Diabetes,
        Attribute::CollegeDegree,
        Attribute::Smoker,
        Attribute::Drinker,
        Attribute::Female,
        Attribute::Male,
        Attribute::Age,
        Attribute::Bmi,
        Attribute::Height,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Attribute::Dog => "dog",
            Attribute::Cat => "cat",
            Attribute::Diagnosed => "diagnosed",
            Attribute::Ibd => "ibd",
            Attribute::Ibs => "ibs",
            Attribute::Diabetes => "diabetes",
            Attribute::CollegeDegree => "college_degree",
            Attribute::Smoker => "smoker",
            Attribute::Drinker => "drinker",
            Attribute::Female => "female",
            Attribute::Male => "male",
            Attribute::Age => "age",
            Attribute::Bmi => "bmi",
            Attribute::Height => "height",
        }
    }

    /// Font Awesome icon name for the renderer
    pub fn icon(&self) -> &'static str {
        match self {
            Attribute::Dog => "dog",
            Attribute::Cat => "cat",
            Attribute::Diagnosed => "ambulance",
            Attribute::Ibd | Attribute::Ibs => "notes-medical",
            Attribute::Diabetes => "syringe",
            Attribute::CollegeDegree => "graduation-cap",
            Attribute::Smoker => "smoking",
            Attribute::Drinker => "wine-glass",
            Attribute::Female => "venus",
            Attribute::Male => "mars",
            Attribute::Age => "birthday-cake",
            Attribute::Bmi => "weight",
            Attribute::Height => "ruler-vertical",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Attribute::Dog => "own a dog",
            Attribute::Cat => "own a cat",
            Attribute::Diagnosed => "have a diagnosed condition",
            Attribute::Ibd => "have IBD",
            Attribute::Ibs => "have IBS",
            Attribute::Diabetes => "have diabetes",
            Attribute::CollegeDegree => "have a college degree",
            Attribute::Smoker => "smoke",
            Attribute::Drinker => "drink alcohol regularly",
            Attribute::Female => "are female",
            Attribute::Male => "are male",
            Attribute::Age => "average age (years)",
            Attribute::Bmi => "average BMI",
            Attribute::Height => "average height (cm)",
        }
    }

    pub fn is_mean(&self) -> bool {
        matches!(self, Attribute::Age | Attribute::Bmi | Attribute::Height)
    }
}

impl std::fmt::Display for Attribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SummaryValue {
    /// Members matching the attribute, out of members with metadata
    Count { count: usize, of: usize },
    /// Average over members with a usable value; `None` means no data
    Mean { mean: Option<f64>, n: usize },
}

impl SummaryValue {
    /// Share of members matching, 0 to 100. `None` when nobody had metadata.
    pub fn percent(&self) -> Option<f64> {
        match *self {
            SummaryValue::Count { count, of } if of > 0 => Some(count as f64 / of as f64 * 100.0),
            _ => None,
        }
    }

    pub fn count(&self) -> Option<usize> {
        match *self {
            SummaryValue::Count { count, .. } => Some(count),
            SummaryValue::Mean { .. } => None,
        }
    }

    pub fn mean(&self) -> Option<f64> {
        match *self {
            SummaryValue::Mean { mean, .. } => mean,
            SummaryValue::Count { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryEntry {
    pub attribute: Attribute,
    pub icon: &'static str,
    pub label: &'static str,
    pub value: SummaryValue,
}

/// Aggregated survey answers of a cohort, in `Attribute::ALL` order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CohortSummary {
    /// Distinct ids asked about
    pub cohort_size: usize,
    /// Ids that had a metadata record
    pub with_metadata: usize,
    pub entries: Vec<SummaryEntry>,
}

impl CohortSummary {
    pub fn get(&self, attribute: Attribute) -> Option<&SummaryValue> {
        self.entries
            .iter()
            .find(|e| e.attribute == attribute)
            .map(|e| &e.value)
    }
}

/// Mean position of a cohort in phylum and ordination space
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReferencePoint {
    pub bacteroidetes: f64,
    pub firmicutes: f64,
    pub pc1: f64,
    pub pc2: f64,
    /// Number of samples averaged
    pub n: usize,
}
