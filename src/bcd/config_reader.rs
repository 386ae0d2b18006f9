use crate::bcd::*;

use std::collections::BTreeMap;

use election_confidence::normalize::DEFAULT_SCHOOL_CORPORATIONS;

use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "countyName")]
    pub county_name: String,
    #[serde(rename = "outputPath")]
    pub output_path: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct FileSource {
    /// `csv` or `xlsx`
    pub provider: String,
    #[serde(rename = "filePath")]
    pub file_path: String,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
    #[serde(rename = "firstRowIndex")]
    _first_row_index: Option<JSValue>,
}

impl FileSource {
    /// The first row holding data, starting at 1. Defaults to 2: the first row is a header.
    pub fn first_row_index(&self) -> BcdResult<usize> {
        match self._first_row_index.as_ref() {
            None => Ok(2),
            Some(x) => {
                let idx = read_js_int(x)?;
                if idx == 0 {
                    whatever!("firstRowIndex starts at 1, got 0");
                }
                Ok(idx as usize)
            }
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct TablesConfig {
    pub corruptions: Option<BTreeMap<String, String>>,
    pub abbreviations: Option<BTreeMap<String, String>>,
    /// School corporations spanning several counties. Defaults to the built-in list.
    #[serde(rename = "schoolCorporations")]
    pub school_corporations: Option<Vec<String>>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct RulesConfig {
    #[serde(rename = "turnoutTolerance")]
    pub turnout_tolerance: Option<JSValue>,
    #[serde(rename = "fuzzyThreshold")]
    pub fuzzy_threshold: Option<JSValue>,
    #[serde(rename = "ambiguityMargin")]
    pub ambiguity_margin: Option<JSValue>,
    #[serde(rename = "roundingTolerance")]
    pub rounding_tolerance: Option<JSValue>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ElectionConfig {
    pub id: String,
    /// ISO date (YYYY-MM-DD)
    pub date: String,
    #[serde(rename = "type")]
    pub election_type: String,
    pub name: Option<String>,
    #[serde(rename = "sourceFile")]
    pub source_file: Option<String>,
    #[serde(rename = "importFileType")]
    pub import_file_type: Option<String>,
    #[serde(rename = "sourceType")]
    pub source_type: Option<String>,
    #[serde(rename = "expectedPrecincts")]
    _expected_precincts: Option<JSValue>,
    #[serde(rename = "totalBallotsCast")]
    _total_ballots_cast: Option<JSValue>,
    pub notes: Option<String>,
    #[serde(rename = "resultsFile")]
    pub results_file: FileSource,
    #[serde(rename = "turnoutFile")]
    pub turnout_file: Option<FileSource>,
    #[serde(rename = "crossValidationFile")]
    pub cross_validation_file: Option<FileSource>,
}

impl ElectionConfig {
    pub fn election(&self) -> BcdResult<Election> {
        let election_type = match self.election_type.as_str() {
            "primary" => ElectionType::Primary,
            "general" => ElectionType::General,
            "special" => ElectionType::Special,
            "municipal" => ElectionType::Municipal,
            x => whatever!("Election {}: unknown election type {:?}", self.id, x),
        };
        let year = match self.date.get(0..4).map(|s| s.parse::<u32>()) {
            Some(Ok(y)) => y,
            _ => whatever!("Election {}: could not read a year from date {:?}", self.id, self.date),
        };
        let override_type = match self.source_type.as_deref() {
            Some(s) => match SourceType::parse(s) {
                Some(st) => Some(st),
                None => whatever!("Election {}: unknown source type {:?}", self.id, s),
            },
            None => None,
        };
        // Without any information on the source document, the source type stays unknown.
        let source_type = if override_type.is_none()
            && self.import_file_type.is_none()
            && self.source_file.is_none()
        {
            None
        } else {
            Some(detect_source_type(
                override_type,
                self.import_file_type.as_deref(),
                self.source_file.as_deref(),
            ))
        };
        Ok(Election {
            id: self.id.clone(),
            year,
            election_type,
            date: self.date.clone(),
            name: self.name.clone(),
            source_type,
            total_ballots_cast: self.total_ballots_cast()?,
            notes: self.notes.clone(),
        })
    }

    pub fn expected_precincts(&self) -> BcdResult<Option<u32>> {
        match read_js_opt_int(&self._expected_precincts)? {
            Some(x) => Ok(Some(
                u32::try_from(x).ok().context(ParsingJsonNumberSnafu {})?,
            )),
            None => Ok(None),
        }
    }

    pub fn total_ballots_cast(&self) -> BcdResult<Option<u64>> {
        read_js_opt_int(&self._total_ballots_cast)
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct BcdConfig {
    #[serde(rename = "outputSettings")]
    pub output_settings: OutputSettings,
    pub tables: Option<TablesConfig>,
    pub rules: Option<RulesConfig>,
    pub elections: Vec<ElectionConfig>,
}

pub fn read_config(path: &str) -> BcdResult<BcdConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: BcdConfig = serde_json::from_str(&contents).context(ParsingJsonSnafu {})?;
    Ok(config)
}

pub fn read_summary(path: String) -> BcdResult<JSValue> {
    let contents = fs::read_to_string(path.clone()).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}

/// The scoring rules, with the overrides of the configuration applied.
pub fn validate_rules(rules_config: &Option<RulesConfig>) -> BcdResult<ScoringRules> {
    let mut res = ScoringRules::DEFAULT_RULES;
    if let Some(rc) = rules_config {
        if let Some(x) = rc.turnout_tolerance.as_ref() {
            res.turnout_tolerance = read_js_float(x)?;
        }
        if let Some(x) = rc.fuzzy_threshold.as_ref() {
            res.fuzzy_threshold = read_js_float(x)?;
        }
        if let Some(x) = rc.ambiguity_margin.as_ref() {
            res.ambiguity_margin = read_js_float(x)?;
        }
        if let Some(x) = rc.rounding_tolerance.as_ref() {
            res.rounding_tolerance = read_js_int(x)?;
        }
    }
    res.validate().context(ScoringSnafu {})?;
    debug!("validate_rules: {:?}", res);
    Ok(res)
}

/// The normalization tables: the built-in ones, unless the configuration replaces them.
pub fn validate_tables(tables_config: &Option<TablesConfig>) -> BcdResult<NormalizationTables> {
    match tables_config {
        None => Ok(NormalizationTables::standard()),
        Some(tc) => {
            let pairs = |m: &Option<BTreeMap<String, String>>| -> Vec<(String, String)> {
                m.iter()
                    .flat_map(|m| m.iter())
                    .map(|(p, r)| (p.clone(), r.clone()))
                    .collect()
            };
            let school_corporations: Vec<String> = match tc.school_corporations.as_ref() {
                Some(l) => l.clone(),
                None => DEFAULT_SCHOOL_CORPORATIONS
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            };
            NormalizationTables::new(&pairs(&tc.corruptions), &pairs(&tc.abbreviations))
                .and_then(|t| t.with_school_corporations(&school_corporations))
                .context(ScoringSnafu {})
        }
    }
}

fn read_js_int(x: &JSValue) -> BcdResult<u64> {
    match x {
        JSValue::Number(n) => n.as_u64().context(ParsingJsonNumberSnafu {}),
        JSValue::String(s) => s.trim().parse::<u64>().ok().context(ParsingJsonNumberSnafu {}),
        _ => None.context(ParsingJsonNumberSnafu {}),
    }
}

fn read_js_opt_int(x: &Option<JSValue>) -> BcdResult<Option<u64>> {
    match x {
        None | Some(JSValue::Null) => Ok(None),
        Some(v) => read_js_int(v).map(Some),
    }
}

fn read_js_float(x: &JSValue) -> BcdResult<f64> {
    match x {
        JSValue::Number(n) => n.as_f64().context(ParsingJsonNumberSnafu {}),
        JSValue::String(s) => s.trim().parse::<f64>().ok().context(ParsingJsonNumberSnafu {}),
        _ => None.context(ParsingJsonNumberSnafu {}),
    }
}
