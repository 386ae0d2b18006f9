// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

/// The kind of election a source document describes.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum ElectionType {
    Primary,
    General,
    Special,
    Municipal,
}

impl ElectionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ElectionType::Primary => "primary",
            ElectionType::General => "general",
            ElectionType::Special => "special",
            ElectionType::Municipal => "municipal",
        }
    }
}

/// The quality of the document the data was imported from.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum SourceType {
    /// A PDF with an embedded text layer.
    DigitalPdf,
    Excel,
    /// A PDF that only holds images. Text was recovered by hand or OCR.
    ScannedPdf,
    ManualEntry,
}

impl SourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::DigitalPdf => "digital_pdf",
            SourceType::Excel => "excel",
            SourceType::ScannedPdf => "scanned_pdf",
            SourceType::ManualEntry => "manual_entry",
        }
    }

    pub fn parse(s: &str) -> Option<SourceType> {
        match s {
            "digital_pdf" => Some(SourceType::DigitalPdf),
            "excel" => Some(SourceType::Excel),
            "scanned_pdf" => Some(SourceType::ScannedPdf),
            "manual_entry" => Some(SourceType::ManualEntry),
            _ => None,
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Election {
    pub id: String,
    pub year: u32,
    pub election_type: ElectionType,
    /// ISO date (YYYY-MM-DD).
    pub date: String,
    pub name: Option<String>,
    /// None when the import pipeline could not tell.
    pub source_type: Option<SourceType>,
    /// The total number of ballots cast, as printed in the header of the source document.
    pub total_ballots_cast: Option<u64>,
    pub notes: Option<String>,
}

/// The jurisdiction level of a race.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum RaceLevel {
    Local,
    County,
    Party,
    State,
    Federal,
    BallotMeasure,
    /// No classification rule applied.
    Other,
}

impl RaceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RaceLevel::Local => "local",
            RaceLevel::County => "county",
            RaceLevel::Party => "party",
            RaceLevel::State => "state",
            RaceLevel::Federal => "federal",
            RaceLevel::BallotMeasure => "ballot_measure",
            RaceLevel::Other => "other",
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub struct RaceId(pub u32);

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Race {
    pub id: RaceId,
    /// The name as extracted from the source document.
    pub raw_name: String,
    pub normalized_name: String,
    pub level: RaceLevel,
    /// Number of seats. Each ballot may carry up to this many votes in the race.
    pub vote_for: u32,
}

/// The number of votes for one candidate in one precinct.
///
/// A result always belongs to a precinct: county-wide totals are not results.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ResultRow {
    pub race: RaceId,
    pub candidate: String,
    pub precinct: String,
    pub votes: u64,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct TurnoutRecord {
    pub precinct: String,
    pub registered_voters: Option<u64>,
    pub ballots_cast: Option<u64>,
}

/// All the imported data for a single election.
///
/// Use the [crate::builder::ElectionBuilder] to construct it.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ElectionData {
    pub election: Election,
    pub races: Vec<Race>,
    pub results: Vec<ResultRow>,
    pub turnout: Vec<TurnoutRecord>,
    /// The number of precincts the county reported for this election, if known.
    pub expected_precincts: Option<u32>,
}

/// A vote total taken independently from the summary page of a source document.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct CrossValidationEntry {
    pub race_label: String,
    pub candidate: String,
    pub votes: u64,
}

// ******** Output data structures *********

#[derive(Eq, PartialEq, Debug, Clone, Copy, PartialOrd, Ord, Hash)]
pub enum Rating {
    Low,
    Medium,
    High,
}

impl Rating {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rating::High => "HIGH",
            Rating::Medium => "MEDIUM",
            Rating::Low => "LOW",
        }
    }
}

/// The five sub-scores, each in [0, 1].
#[derive(PartialEq, Debug, Clone, Copy)]
pub struct SubScores {
    pub source_type: f64,
    pub race_names_clean: f64,
    pub turnout_consistent: f64,
    pub cross_validated: f64,
    pub precinct_count_match: f64,
}

/// A scoring input that was missing or unusable.
/// The corresponding sub-score fell back to its worst-case value.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum IncompleteInput {
    SourceType,
    Races,
    TurnoutRecords,
    ExpectedPrecinctCount,
}

impl IncompleteInput {
    pub fn as_str(&self) -> &'static str {
        match self {
            IncompleteInput::SourceType => "source_type",
            IncompleteInput::Races => "races",
            IncompleteInput::TurnoutRecords => "turnout_records",
            IncompleteInput::ExpectedPrecinctCount => "expected_precinct_count",
        }
    }
}

#[derive(PartialEq, Debug, Clone)]
pub struct ConfidenceScore {
    pub sub_scores: SubScores,
    pub score: f64,
    pub rating: Rating,
    /// True when no cross-validation total could be compared. The cross_validated
    /// sub-score is then an assumption, not a measurement.
    pub unvalidated: bool,
    /// False when the expected number of precincts was not configured.
    pub precinct_count_known: bool,
    pub observed_precincts: u32,
    pub corrupted_race_count: u32,
    pub pdf_parsed_ok: bool,
    pub incomplete_inputs: Vec<IncompleteInput>,
    pub turnout_detail: String,
    pub notes: Vec<String>,
}

impl ConfidenceScore {
    pub fn incomplete(&self) -> bool {
        !self.incomplete_inputs.is_empty()
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct NormalizedRace {
    pub race: RaceId,
    pub raw_name: String,
    pub normalized_name: String,
    pub changed: bool,
    /// Whether the raw name passed the cleanliness check.
    pub clean: bool,
    pub level: RaceLevel,
}

/// The outcome of pairing a cross-validation label with a race.
#[derive(PartialEq, Debug, Clone)]
pub enum RaceMatch {
    Exact(RaceId),
    Similar { race: RaceId, score: f64 },
    /// Several races are equally good candidates.
    Ambiguous(Vec<RaceId>),
    NoMatch,
}

impl RaceMatch {
    pub fn race(&self) -> Option<RaceId> {
        match self {
            RaceMatch::Exact(rid) => Some(*rid),
            RaceMatch::Similar { race, .. } => Some(*race),
            RaceMatch::Ambiguous(_) | RaceMatch::NoMatch => None,
        }
    }
}

/// Why a cross-validation total differs from the local total.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum MismatchCause {
    /// The source covers a school corporation across several counties, the local
    /// data only holds the in-county precincts.
    SchoolCorpPartialPrecincts,
    /// The label could not be paired reliably with a race.
    RaceNameMismatch,
    /// Small delta on a write-in or retention question total.
    RoundingWriteIn,
    /// A real discrepancy.
    DataDiscrepancy,
}

impl MismatchCause {
    pub fn tag(&self) -> &'static str {
        match self {
            MismatchCause::SchoolCorpPartialPrecincts => "school-corp-partial-precincts",
            MismatchCause::RaceNameMismatch => "race-name-mismatch",
            MismatchCause::RoundingWriteIn => "rounding-writein",
            MismatchCause::DataDiscrepancy => "data-discrepancy",
        }
    }

    /// Explained differences are reported but excluded from the match rate.
    pub fn is_explained(&self) -> bool {
        !matches!(self, MismatchCause::DataDiscrepancy)
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum CheckStatus {
    Match,
    Mismatch(MismatchCause),
}

#[derive(PartialEq, Debug, Clone)]
pub struct CrossValidationCheck {
    pub entry: CrossValidationEntry,
    pub race_match: RaceMatch,
    pub local_votes: u64,
    pub status: CheckStatus,
}

#[derive(PartialEq, Debug, Clone)]
pub struct CrossValidationReport {
    /// False when the caller did not supply any cross-validation data.
    pub supplied: bool,
    pub checks: Vec<CrossValidationCheck>,
    pub matched: u32,
    /// Explained mismatches, excluded from the match rate.
    pub excluded: u32,
    pub discrepancies: u32,
}

impl CrossValidationReport {
    pub fn mismatches(&self) -> impl Iterator<Item = (&CrossValidationCheck, MismatchCause)> {
        self.checks.iter().filter_map(|c| match c.status {
            CheckStatus::Mismatch(cause) => Some((c, cause)),
            CheckStatus::Match => None,
        })
    }
}

#[derive(PartialEq, Debug, Clone)]
pub struct ScoringOutcome {
    pub election_id: String,
    pub score: ConfidenceScore,
    pub races: Vec<NormalizedRace>,
    pub cross_validation: CrossValidationReport,
}

/// Errors raised while assembling inputs or validating the configuration.
/// Scoring itself degrades instead of failing.
#[derive(PartialEq, Debug, Clone)]
pub enum ScoringErrors {
    /// A result without precinct assignment.
    OrphanedResult { race: RaceId, candidate: String },
    UnknownRace(RaceId),
    DuplicateRace(String),
    InvalidWeights(f64),
    InvalidRules(String),
    InvalidTables(String),
}

impl Error for ScoringErrors {}

impl Display for ScoringErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScoringErrors::OrphanedResult { race, candidate } => write!(
                f,
                "result for candidate {:?} in race {} has no precinct",
                candidate, race.0
            ),
            ScoringErrors::UnknownRace(rid) => write!(f, "unknown race id {}", rid.0),
            ScoringErrors::DuplicateRace(name) => write!(f, "race {:?} declared twice", name),
            ScoringErrors::InvalidWeights(total) => {
                write!(f, "sub-score weights must sum to 1.0, got {}", total)
            }
            ScoringErrors::InvalidRules(msg) => write!(f, "invalid scoring rules: {}", msg),
            ScoringErrors::InvalidTables(msg) => write!(f, "invalid normalization tables: {}", msg),
        }
    }
}

// ********* Configuration **********

#[derive(PartialEq, Debug, Clone, Copy)]
pub struct Weights {
    pub source_type: f64,
    pub race_names_clean: f64,
    pub turnout_consistent: f64,
    pub cross_validated: f64,
    pub precinct_count_match: f64,
}

impl Weights {
    pub fn total(&self) -> f64 {
        self.source_type
            + self.race_names_clean
            + self.turnout_consistent
            + self.cross_validated
            + self.precinct_count_match
    }

    pub fn apply(&self, s: &SubScores) -> f64 {
        self.source_type * s.source_type
            + self.race_names_clean * s.race_names_clean
            + self.turnout_consistent * s.turnout_consistent
            + self.cross_validated * s.cross_validated
            + self.precinct_count_match * s.precinct_count_match
    }
}

#[derive(PartialEq, Debug, Clone)]
pub struct ScoringRules {
    pub weights: Weights,
    /// Relative tolerance when reconciling turnout with results and with the header total.
    pub turnout_tolerance: f64,
    /// Minimum normalized Levenshtein similarity for a fuzzy race match.
    pub fuzzy_threshold: f64,
    /// Two fuzzy candidates closer than this are ambiguous.
    pub ambiguity_margin: f64,
    /// Similarity granted when one comparison key contains the other.
    pub substring_score: f64,
    /// Largest absolute delta explained as rounding on write-in or retention totals.
    pub rounding_tolerance: u64,
    pub high_threshold: f64,
    pub medium_threshold: f64,
}

impl ScoringRules {
    pub const DEFAULT_RULES: ScoringRules = ScoringRules {
        weights: Weights {
            source_type: 0.25,
            race_names_clean: 0.20,
            turnout_consistent: 0.20,
            cross_validated: 0.20,
            precinct_count_match: 0.15,
        },
        turnout_tolerance: 0.10,
        fuzzy_threshold: 0.80,
        ambiguity_margin: 0.05,
        substring_score: 0.90,
        rounding_tolerance: 10,
        high_threshold: 0.90,
        medium_threshold: 0.70,
    };

    pub fn validate(&self) -> Result<(), ScoringErrors> {
        let total = self.weights.total();
        if (total - 1.0).abs() > 1e-9 {
            return Err(ScoringErrors::InvalidWeights(total));
        }
        let unit = |name: &str, x: f64| {
            if (0.0..=1.0).contains(&x) {
                Ok(())
            } else {
                Err(ScoringErrors::InvalidRules(format!(
                    "{} must be in [0, 1], got {}",
                    name, x
                )))
            }
        };
        unit("turnoutTolerance", self.turnout_tolerance)?;
        unit("fuzzyThreshold", self.fuzzy_threshold)?;
        unit("ambiguityMargin", self.ambiguity_margin)?;
        unit("substringScore", self.substring_score)?;
        unit("highThreshold", self.high_threshold)?;
        unit("mediumThreshold", self.medium_threshold)?;
        if self.medium_threshold > self.high_threshold {
            return Err(ScoringErrors::InvalidRules(
                "mediumThreshold is above highThreshold".to_string(),
            ));
        }
        Ok(())
    }

    pub fn rating(&self, score: f64) -> Rating {
        if score >= self.high_threshold {
            Rating::High
        } else if score >= self.medium_threshold {
            Rating::Medium
        } else {
            Rating::Low
        }
    }
}
