use log::{debug, info, warn};

use election_confidence::builder::ElectionBuilder;
use election_confidence::normalize::NormalizationTables;
use election_confidence::*;
use snafu::{prelude::*, Snafu};

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::bcd::config_reader::*;
use crate::bcd::io_common::{parse_cross_validation_row, parse_result_row, parse_turnout_row};

pub mod config_reader;
mod io_common;
mod io_csv;
mod io_excel;

#[derive(Debug, Snafu)]
pub enum BcdError {
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("The spreadsheet is empty"))]
    EmptyExcel {},
    #[snafu(display("Worksheet {name} not found in {path}"))]
    MissingWorksheet { name: String, path: String },
    #[snafu(display("Line {lineno}: unexpected cell {content}"))]
    ExcelWrongCellType { lineno: u64, content: String },
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error writing file {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Could not parse JSON"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Expected a number in the configuration"))]
    ParsingJsonNumber {},
    #[snafu(display("The configuration file has no parent directory"))]
    MissingParentDir {},
    #[snafu(display("Unknown file provider {provider}"))]
    UnknownProvider { provider: String },
    #[snafu(display("Error opening CSV file"))]
    CsvOpen { source: csv::Error },
    #[snafu(display("Error reading a CSV line"))]
    CsvLineParse { source: csv::Error },
    #[snafu(display("{path}, line {lineno}: expected at least {expected} columns"))]
    LineTooShort {
        path: String,
        lineno: usize,
        expected: usize,
    },
    #[snafu(display("{path}, line {lineno}: could not read a count from {content:?}"))]
    ParsingCount {
        path: String,
        lineno: usize,
        content: String,
    },
    #[snafu(display("{path}, line {lineno}: result without precinct"))]
    OrphanedRow { path: String, lineno: usize },
    #[snafu(display("Invalid scoring input"))]
    Scoring { source: ScoringErrors },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type BcdResult<T> = Result<T, BcdError>;
pub type BBcdResult<T> = Result<T, Box<BcdError>>;

/// A row of a spreadsheet or CSV file, with its line number (starting at 1).
pub type Row = (usize, Vec<String>);

fn read_rows(root_path: &Path, cfs: &FileSource) -> BBcdResult<(String, Vec<Row>)> {
    let p: PathBuf = root_path.join(&cfs.file_path);
    let p2 = p.as_path().display().to_string();
    info!("Attempting to read file {:?}", p2);
    let rows = match cfs.provider.as_str() {
        "csv" => io_csv::read_csv_rows(&p2, cfs)?,
        "xlsx" => io_excel::read_excel_rows(&p2, cfs)?,
        x => {
            return Err(Box::new(BcdError::UnknownProvider {
                provider: x.to_string(),
            }))
        }
    };
    Ok((p2, rows))
}

/// Reads the files of one election and assembles its data.
fn read_election_data(
    root_path: &Path,
    ec: &ElectionConfig,
    tables: &NormalizationTables,
) -> BBcdResult<(ElectionData, Option<Vec<CrossValidationEntry>>)> {
    let election = ec.election()?;
    let mut builder = ElectionBuilder::new(&election, tables);
    if let Some(expected) = ec.expected_precincts()? {
        builder = builder.expected_precincts(expected);
    }

    let (path, rows) = read_rows(root_path, &ec.results_file)?;
    for (lineno, row) in rows.iter() {
        let line = parse_result_row(&path, *lineno, row)?;
        let rid = builder.race_with_seats(&line.race, line.vote_for.unwrap_or(1));
        builder
            .add_result(rid, &line.candidate, &line.precinct, line.votes)
            .context(ScoringSnafu {})?;
    }

    if let Some(cfs) = ec.turnout_file.as_ref() {
        let (path, rows) = read_rows(root_path, cfs)?;
        for (lineno, row) in rows.iter() {
            builder.add_turnout(parse_turnout_row(&path, *lineno, row)?);
        }
    }

    let cross_validation = match ec.cross_validation_file.as_ref() {
        Some(cfs) => {
            let (path, rows) = read_rows(root_path, cfs)?;
            let mut entries: Vec<CrossValidationEntry> = Vec::new();
            for (lineno, row) in rows.iter() {
                entries.push(parse_cross_validation_row(&path, *lineno, row)?);
            }
            Some(entries)
        }
        None => None,
    };

    let data = builder.build();
    debug!(
        "read_election_data: {}: {} races, {} results, {} turnout records",
        ec.id,
        data.races.len(),
        data.results.len(),
        data.turnout.len()
    );
    Ok((data, cross_validation))
}

fn score_to_json(x: f64) -> JSValue {
    json!(format!("{:.4}", x))
}

fn race_match_to_json(m: &RaceMatch, races: &[Race]) -> JSValue {
    let name = |rid: &RaceId| -> JSValue {
        races
            .iter()
            .find(|r| r.id == *rid)
            .map(|r| json!(r.normalized_name))
            .unwrap_or(JSValue::Null)
    };
    match m {
        RaceMatch::Exact(rid) => json!({"exact": name(rid)}),
        RaceMatch::Similar { race, score } => {
            json!({"similar": name(race), "similarity": score_to_json(*score)})
        }
        RaceMatch::Ambiguous(rids) => {
            json!({"ambiguous": rids.iter().map(name).collect::<Vec<JSValue>>()})
        }
        RaceMatch::NoMatch => json!({ "noMatch": true }),
    }
}

fn outcome_to_json(ec: &ElectionConfig, data: &ElectionData, o: &ScoringOutcome) -> JSValue {
    let s = &o.score;
    let election = &data.election;

    let races: Vec<JSValue> = o
        .races
        .iter()
        .map(|nr| {
            json!({
                "rawName": nr.raw_name,
                "normalizedName": nr.normalized_name,
                "changed": nr.changed,
                "clean": nr.clean,
                "level": nr.level.as_str(),
            })
        })
        .collect();

    let mismatches: Vec<JSValue> = o
        .cross_validation
        .mismatches()
        .map(|(check, cause)| {
            json!({
                "race": check.entry.race_label,
                "candidate": check.entry.candidate,
                "sourceVotes": check.entry.votes.to_string(),
                "localVotes": check.local_votes.to_string(),
                "match": race_match_to_json(&check.race_match, &data.races),
                "cause": cause.tag(),
            })
        })
        .collect();

    let sub_scores = json!({
        "sourceType": score_to_json(s.sub_scores.source_type),
        "raceNamesClean": score_to_json(s.sub_scores.race_names_clean),
        "turnoutConsistent": score_to_json(s.sub_scores.turnout_consistent),
        "crossValidated": score_to_json(s.sub_scores.cross_validated),
        "precinctCountMatch": score_to_json(s.sub_scores.precinct_count_match),
    });
    let cross_validation = json!({
        "supplied": o.cross_validation.supplied,
        "matched": o.cross_validation.matched.to_string(),
        "excluded": o.cross_validation.excluded.to_string(),
        "discrepancies": o.cross_validation.discrepancies.to_string(),
        "mismatches": mismatches,
    });
    let incomplete: Vec<&str> = s.incomplete_inputs.iter().map(|i| i.as_str()).collect();

    let mut res: JSMap<String, JSValue> = JSMap::new();
    res.insert("id".to_string(), json!(o.election_id));
    res.insert("date".to_string(), json!(election.date));
    res.insert("name".to_string(), json!(election.name));
    res.insert("type".to_string(), json!(election.election_type.as_str()));
    res.insert("sourceFile".to_string(), json!(ec.source_file));
    res.insert(
        "sourceType".to_string(),
        json!(election.source_type.map(|st| st.as_str())),
    );
    res.insert("score".to_string(), score_to_json(s.score));
    res.insert("rating".to_string(), json!(s.rating.as_str()));
    res.insert("subScores".to_string(), sub_scores);
    res.insert("unvalidated".to_string(), json!(s.unvalidated));
    res.insert(
        "precinctCountKnown".to_string(),
        json!(s.precinct_count_known),
    );
    res.insert(
        "observedPrecincts".to_string(),
        json!(s.observed_precincts.to_string()),
    );
    res.insert(
        "expectedPrecincts".to_string(),
        json!(data.expected_precincts.map(|x| x.to_string())),
    );
    res.insert(
        "corruptedRaceCount".to_string(),
        json!(s.corrupted_race_count.to_string()),
    );
    res.insert("pdfParsedOk".to_string(), json!(s.pdf_parsed_ok));
    res.insert("incompleteInputs".to_string(), json!(incomplete));
    res.insert("turnoutDetail".to_string(), json!(s.turnout_detail));
    res.insert("notes".to_string(), json!(s.notes));
    res.insert("races".to_string(), JSValue::Array(races));
    res.insert("crossValidation".to_string(), cross_validation);
    JSValue::Object(res)
}

fn build_summary_js(config: &BcdConfig, elections: Vec<JSValue>, summary: &BatchSummary) -> JSValue {
    json!({
        "config": {
            "county": config.output_settings.county_name,
        },
        "elections": elections,
        "summary": {
            "high": summary.high.to_string(),
            "medium": summary.medium.to_string(),
            "low": summary.low.to_string(),
            "averageScore": score_to_json(summary.average_score),
        }
    })
}

// The flags printed for elections that are not rated HIGH.
fn flags(o: &ScoringOutcome) -> Vec<String> {
    let s = &o.score;
    let mut res: Vec<String> = Vec::new();
    if s.sub_scores.race_names_clean < 1.0 {
        let unclean = o.races.iter().filter(|nr| !nr.clean).count();
        res.push(format!(
            "unclean_races={} corrupted_races={}",
            unclean, s.corrupted_race_count
        ));
    }
    if s.sub_scores.turnout_consistent < 1.0 {
        res.push("turnout_mismatch".to_string());
    }
    if s.unvalidated {
        res.push("not_cross_validated".to_string());
    } else if o.cross_validation.discrepancies > 0 {
        res.push(format!(
            "discrepancies={}",
            o.cross_validation.discrepancies
        ));
    }
    if !s.precinct_count_known {
        res.push("precincts=unknown".to_string());
    } else if s.sub_scores.precinct_count_match < 1.0 {
        res.push(format!("precincts={}", s.observed_precincts));
    }
    for i in s.incomplete_inputs.iter() {
        res.push(format!("missing_{}", i.as_str()));
    }
    res
}

fn print_report(county: &str, lines: &[(&ElectionData, &ScoringOutcome)], summary: &BatchSummary) {
    println!("{} data quality assessment", county);
    println!("Assessed {} elections:", lines.len());
    println!();
    println!(
        "{:<14} {:<35} {:>6} {:<8} {:<14}",
        "Date", "Name", "Score", "Level", "Source"
    );
    println!("{}", "-".repeat(80));
    for (data, o) in lines.iter() {
        let e = &data.election;
        let name: String = e
            .name
            .clone()
            .unwrap_or_else(|| "Unknown".to_string())
            .chars()
            .take(35)
            .collect();
        println!(
            "{:<14} {:<35} {:>6.3} {:<8} {:<14}",
            e.date,
            name,
            o.score.score,
            o.score.rating.as_str(),
            e.source_type.map(|st| st.as_str()).unwrap_or("unknown")
        );
        if o.score.rating != Rating::High {
            let fl = flags(o);
            if !fl.is_empty() {
                println!("{:>14}   Flags: {}", "", fl.join(", "));
            }
        }
    }
    println!();
    println!(
        "Summary: {} high, {} medium, {} low (average score {:.3})",
        summary.high, summary.medium, summary.low, summary.average_score
    );
}

/// Scores all the elections of a configuration file.
///
/// Elections are assessed in date order. The report is printed on the standard
/// output and the JSON assessment is written to `out_path` (or to the path of the
/// configuration). When a reference assessment is given, any difference is an error.
pub fn run_assessment(
    config_path: &str,
    check_summary_path: Option<String>,
    out_path: Option<String>,
) -> BcdResult<()> {
    let config_p = Path::new(config_path);
    let config = read_config(config_path)?;
    info!("config: {:?}", config);

    let rules = validate_rules(&config.rules)?;
    let tables = validate_tables(&config.tables)?;

    if config.elections.is_empty() {
        whatever!("No election found in configuration {}", config_path);
    }

    let root_p = config_p.parent().context(MissingParentDirSnafu {})?;

    let mut elections: Vec<&ElectionConfig> = config.elections.iter().collect();
    elections.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));

    let mut assessed: Vec<(&ElectionConfig, ElectionData, ScoringOutcome)> = Vec::new();
    for ec in elections {
        let (data, cross_validation) =
            read_election_data(root_p, ec, &tables).map_err(|e| *e)?;
        let outcome = score_election(&data, cross_validation.as_deref(), &tables, &rules)
            .context(ScoringSnafu {})?;
        if outcome.cross_validation.discrepancies > 0 {
            warn!(
                "Election {}: {} cross-validation discrepancies",
                ec.id, outcome.cross_validation.discrepancies
            );
        }
        assessed.push((ec, data, outcome));
    }

    let outcomes: Vec<ScoringOutcome> = assessed.iter().map(|(_, _, o)| o.clone()).collect();
    let summary = summarize(&outcomes);

    let lines: Vec<(&ElectionData, &ScoringOutcome)> =
        assessed.iter().map(|(_, d, o)| (d, o)).collect();
    print_report(&config.output_settings.county_name, &lines, &summary);

    // Assemble the final json
    let elections_js: Vec<JSValue> = assessed
        .iter()
        .map(|(ec, d, o)| outcome_to_json(ec, d, o))
        .collect();
    let result_js = build_summary_js(&config, elections_js, &summary);
    let pretty_js_stats = serde_json::to_string_pretty(&result_js).context(ParsingJsonSnafu {})?;

    let out = out_path.or_else(|| {
        config
            .output_settings
            .output_path
            .as_ref()
            .map(|p| root_p.join(p).display().to_string())
    });
    match out.as_deref() {
        Some("stdout") => println!("{}", pretty_js_stats),
        Some(p) => {
            info!("Writing assessment to {:?}", p);
            fs::write(p, &pretty_js_stats).context(WritingOutputSnafu { path: p })?;
        }
        None => {}
    }

    // The reference assessment, if provided for comparison
    if let Some(summary_p) = check_summary_path {
        let summary_ref = read_summary(summary_p)?;
        let pretty_js_summary_ref =
            serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
        if pretty_js_summary_ref != pretty_js_stats {
            warn!("Found differences with the reference assessment");
            print_diff(
                pretty_js_summary_ref.as_str(),
                pretty_js_stats.as_ref(),
                "\n",
            );
            whatever!("Difference detected between computed assessment and reference assessment")
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    // A fresh directory for the fixtures of one test.
    fn fixture_dir(test_name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("bcdq-{}-{}", test_name, std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write(dir: &Path, name: &str, content: &str) {
        fs::write(dir.join(name), content).unwrap();
    }

    fn write_results(dir: &Path) {
        let mut results = String::from("race,candidate,precinct,votes,vote_for\n");
        for p in ["Center 1", "Center 2", "Eagle 1"] {
            results.push_str(&format!("SHERIFF,Anna Smith,{},120,1\n", p));
            results.push_str(&format!("SHERIFF,Bob Jones,{},80,1\n", p));
            results.push_str(&format!("WEBO SB,Clara Diaz,{},50,1\n", p));
            results.push_str(&format!("Town Council At Large,Dan Wu,{},150,3\n", p));
            results.push_str(&format!("Town Council At Large,Erin Roe,{},130,3\n", p));
        }
        write(dir, "results.csv", &results);
        write(
            dir,
            "turnout.csv",
            "precinct,registered,ballots\nCenter 1,400,210\nCenter 2,400,205\nEagle 1,350,200\n",
        );
        write(
            dir,
            "summary.csv",
            "race,candidate,votes\nSheriff,Anna Smith,360\nSheriff,Bob Jones,240\nWestern Boone School Board,Clara Diaz,900\n",
        );
    }

    fn write_config(dir: &Path, expected_precincts: &str) -> String {
        let config = format!(
            r#"{{
  "outputSettings": {{ "countyName": "Boone", "outputPath": "assessment.json" }},
  "rules": {{ "turnoutTolerance": "0.1", "roundingTolerance": 10 }},
  "elections": [
    {{
      "id": "2012-general",
      "date": "2012-11-06",
      "type": "general",
      "name": "2012 General Election",
      "sourceFile": "2012-General.pdf",
      "expectedPrecincts": {},
      "resultsFile": {{ "provider": "csv", "filePath": "results.csv" }},
      "turnoutFile": {{ "provider": "csv", "filePath": "turnout.csv" }},
      "crossValidationFile": {{ "provider": "csv", "filePath": "summary.csv" }}
    }},
    {{
      "id": "2010-primary",
      "date": "2010-05-04",
      "type": "primary",
      "resultsFile": {{ "provider": "csv", "filePath": "results.csv", "firstRowIndex": "2" }}
    }}
  ]
}}"#,
            expected_precincts
        );
        write(dir, "config.json", &config);
        dir.join("config.json").display().to_string()
    }

    fn read_assessment(dir: &Path) -> JSValue {
        let contents = fs::read_to_string(dir.join("assessment.json")).unwrap();
        serde_json::from_str(&contents).unwrap()
    }

    #[test]
    fn assessment_end_to_end() {
        init();
        let dir = fixture_dir("end-to-end");
        write_results(&dir);
        let config_path = write_config(&dir, "3");
        run_assessment(&config_path, None, None).unwrap();

        let js = read_assessment(&dir);
        let elections = js["elections"].as_array().unwrap();
        assert_eq!(elections.len(), 2);
        // Date order
        assert_eq!(elections[0]["id"], json!("2010-primary"));

        let general = &elections[1];
        assert_eq!(general["sourceType"], json!("digital_pdf"));
        assert_eq!(general["subScores"]["precinctCountMatch"], json!("1.0000"));
        assert_eq!(general["subScores"]["turnoutConsistent"], json!("1.0000"));
        assert_eq!(general["subScores"]["crossValidated"], json!("1.0000"));
        assert_eq!(general["unvalidated"], json!(false));
        assert_eq!(general["crossValidation"]["matched"], json!("2"));
        assert_eq!(general["crossValidation"]["excluded"], json!("1"));
        assert_eq!(
            general["crossValidation"]["mismatches"][0]["cause"],
            json!("school-corp-partial-precincts")
        );
        assert_eq!(
            general["races"][1]["normalizedName"],
            json!("Western Boone School Board")
        );
        assert_eq!(general["races"][0]["clean"], json!(false));

        // No source information, no turnout, no cross-validation.
        let primary = &elections[0];
        assert_eq!(primary["sourceType"], JSValue::Null);
        assert_eq!(primary["unvalidated"], json!(true));
        assert_eq!(primary["precinctCountKnown"], json!(false));
        assert_eq!(
            primary["incompleteInputs"],
            json!(["source_type", "turnout_records", "expected_precinct_count"])
        );
        assert_eq!(js["summary"]["low"], json!("1"));
    }

    #[test]
    fn reference_comparison() {
        init();
        let dir = fixture_dir("reference");
        write_results(&dir);
        let config_path = write_config(&dir, "\"3\"");
        run_assessment(&config_path, None, None).unwrap();
        let reference = dir.join("assessment.json").display().to_string();

        // Same inputs, same assessment.
        let out = dir.join("second.json").display().to_string();
        assert!(run_assessment(&config_path, Some(reference.clone()), Some(out)).is_ok());

        // One more precinct expected.
        let config_path = write_config(&dir, "4");
        let out = dir.join("third.json").display().to_string();
        assert!(run_assessment(&config_path, Some(reference), Some(out)).is_err());
    }

    #[test]
    fn orphaned_rows_are_refused() {
        init();
        let dir = fixture_dir("orphaned");
        write_results(&dir);
        write(
            &dir,
            "results.csv",
            "race,candidate,precinct,votes\nSheriff,Anna Smith,Center 1,120\nSheriff,Anna Smith,,360\n",
        );
        let config_path = write_config(&dir, "3");
        match run_assessment(&config_path, None, None) {
            Err(BcdError::OrphanedRow { lineno, .. }) => assert_eq!(lineno, 3),
            x => panic!("unexpected outcome {:?}", x),
        }
    }

    #[test]
    fn unknown_provider() {
        init();
        let dir = fixture_dir("provider");
        write_results(&dir);
        let config_path = write_config(&dir, "3");
        let config = fs::read_to_string(&config_path)
            .unwrap()
            .replace(r#""provider": "csv", "filePath": "turnout.csv""#, r#""provider": "ess", "filePath": "turnout.csv""#);
        write(&dir, "config.json", &config);
        assert!(matches!(
            run_assessment(&config_path, None, None),
            Err(BcdError::UnknownProvider { .. })
        ));
    }
}
