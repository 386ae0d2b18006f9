pub mod builder;
mod config;
pub mod manual;
pub mod matching;
pub mod normalize;

use log::{debug, info, warn};

use std::collections::{BTreeSet, HashMap};

pub use crate::config::*;
use crate::matching::find_race;
use crate::normalize::*;

const WRITE_IN_KEYWORDS: &[&str] = &["write in", "writein", "write ins"];

const RETENTION_KEYWORDS: &[&str] = &["retain", "retention"];

/// The score of each kind of source document.
pub fn source_type_score(source: SourceType) -> f64 {
    match source {
        SourceType::DigitalPdf => 1.0,
        SourceType::Excel => 0.9,
        SourceType::ManualEntry => 0.5,
        SourceType::ScannedPdf => 0.3,
    }
}

/// Works out the kind of source document of an election.
///
/// An explicit override wins. Re-imports from PDF files are digital PDFs.
/// Otherwise the extension of the source file decides, defaulting to manual entry.
pub fn detect_source_type(
    override_type: Option<SourceType>,
    import_file_type: Option<&str>,
    source_file: Option<&str>,
) -> SourceType {
    if let Some(st) = override_type {
        return st;
    }
    if import_file_type == Some("pdf_reimport") {
        return SourceType::DigitalPdf;
    }
    let ext = source_file
        .and_then(|f| std::path::Path::new(f).extension())
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());
    match ext.as_deref() {
        Some("xlsx") | Some("xls") | Some("csv") => SourceType::Excel,
        Some("pdf") => SourceType::DigitalPdf,
        _ => SourceType::ManualEntry,
    }
}

/// Computes the confidence score of one election.
///
/// Arguments:
/// * `data` the imported races, results and turnout records of the election
/// * `cross_validation` totals taken independently from the source document, if any
/// * `tables` the race name normalization tables
/// * `rules` the weights, thresholds and tolerances
///
/// Missing or unusable inputs never fail the scoring: the affected sub-score falls
/// back to its worst-case value and the input is listed in `incomplete_inputs`.
/// The only error is an invalid set of rules.
pub fn score_election(
    data: &ElectionData,
    cross_validation: Option<&[CrossValidationEntry]>,
    tables: &NormalizationTables,
    rules: &ScoringRules,
) -> Result<ScoringOutcome, ScoringErrors> {
    rules.validate()?;
    let election = &data.election;
    info!(
        "Scoring election {} ({} races, {} results, {} turnout records, {:?} cross-validation entries)",
        election.id,
        data.races.len(),
        data.results.len(),
        data.turnout.len(),
        cross_validation.map(|l| l.len())
    );

    let mut incomplete: Vec<IncompleteInput> = Vec::new();

    // Source document
    let source_type = match election.source_type {
        Some(st) => source_type_score(st),
        None => {
            incomplete.push(IncompleteInput::SourceType);
            0.0
        }
    };

    // Race names
    let normalized_races = normalize_races(&data.races, tables);
    let corrupted_race_count = data
        .races
        .iter()
        .filter(|r| has_embedded_vote_data(&r.raw_name))
        .count() as u32;
    let race_names_clean = if normalized_races.is_empty() {
        incomplete.push(IncompleteInput::Races);
        0.0
    } else {
        let num_clean = normalized_races.iter().filter(|nr| nr.clean).count();
        debug!(
            "score_election: {} races out of {} queued for normalization",
            normalized_races.len() - num_clean,
            normalized_races.len()
        );
        num_clean as f64 / normalized_races.len() as f64
    };

    // Turnout
    let (turnout_o, turnout_detail) = turnout_consistency(data, rules);
    let turnout_consistent = match turnout_o {
        Some(x) => x,
        None => {
            incomplete.push(IncompleteInput::TurnoutRecords);
            0.0
        }
    };

    // Precinct count
    let observed_precincts = observed_precinct_count(data);
    let (precinct_count_match, precinct_count_known) = match data.expected_precincts {
        Some(expected) if expected > 0 => (
            precinct_count_score(observed_precincts, expected),
            true,
        ),
        _ => {
            incomplete.push(IncompleteInput::ExpectedPrecinctCount);
            (0.0, false)
        }
    };

    // Cross-validation. Matching runs on the freshly normalized names.
    let match_races: Vec<Race> = data
        .races
        .iter()
        .zip(normalized_races.iter())
        .map(|(r, nr)| Race {
            normalized_name: nr.normalized_name.clone(),
            ..r.clone()
        })
        .collect();
    let report = cross_validate(&match_races, &data.results, cross_validation, tables, rules);
    let comparable = report.matched + report.discrepancies;
    let (cross_validated, unvalidated) = if comparable == 0 {
        (1.0, true)
    } else {
        (report.matched as f64 / comparable as f64, false)
    };

    let sub_scores = SubScores {
        source_type,
        race_names_clean,
        turnout_consistent,
        cross_validated,
        precinct_count_match,
    };
    let score = rules.weights.apply(&sub_scores);
    let rating = rules.rating(score);

    let pdf_parsed_ok = election.source_type != Some(SourceType::ScannedPdf) && corrupted_race_count == 0;

    let mut notes: Vec<String> = Vec::new();
    if let Some(n) = election.notes.as_ref() {
        notes.push(n.clone());
    }
    if corrupted_race_count > 0 {
        notes.push(format!("{} corrupted race names detected.", corrupted_race_count));
    }
    notes.push(format!("Precincts with data: {}.", observed_precincts));
    if !precinct_count_known {
        notes.push("Expected precinct count unknown.".to_string());
    }
    notes.push(format!("{}.", turnout_detail));
    if !report.supplied {
        notes.push("Not cross-validated: cross_validated assumed.".to_string());
    } else if unvalidated {
        notes.push("No comparable cross-validation totals: cross_validated assumed.".to_string());
    }
    if report.excluded > 0 {
        notes.push(format!(
            "{} explained cross-validation differences excluded from the match rate.",
            report.excluded
        ));
    }

    if !incomplete.is_empty() {
        warn!(
            "Election {}: incomplete scoring inputs: {:?}",
            election.id, incomplete
        );
    }
    info!(
        "Election {}: score {:.3} ({}) sub-scores: {:?}",
        election.id,
        score,
        rating.as_str(),
        sub_scores
    );

    Ok(ScoringOutcome {
        election_id: election.id.clone(),
        score: ConfidenceScore {
            sub_scores,
            score,
            rating,
            unvalidated,
            precinct_count_known,
            observed_precincts,
            corrupted_race_count,
            pdf_parsed_ok,
            incomplete_inputs: incomplete,
            turnout_detail,
            notes,
        },
        races: normalized_races,
        cross_validation: report,
    })
}

fn normalize_races(races: &[Race], tables: &NormalizationTables) -> Vec<NormalizedRace> {
    races
        .iter()
        .map(|r| {
            let n = normalize_race_name(&r.raw_name, tables);
            NormalizedRace {
                race: r.id,
                raw_name: r.raw_name.clone(),
                clean: is_clean_race_name(&r.raw_name, tables),
                level: classify_race_level(&n.normalized),
                normalized_name: n.normalized,
                changed: n.changed,
            }
        })
        .collect()
}

/// The distinct precincts seen in the results and in the turnout records.
fn observed_precinct_count(data: &ElectionData) -> u32 {
    let precincts: BTreeSet<&str> = data
        .results
        .iter()
        .map(|r| r.precinct.as_str())
        .chain(data.turnout.iter().map(|t| t.precinct.as_str()))
        .collect();
    precincts.len() as u32
}

/// 1.0 when the counts agree, else the ratio of the smaller to the larger count.
pub fn precinct_count_score(observed: u32, expected: u32) -> f64 {
    if observed == 0 || expected == 0 {
        return 0.0;
    }
    let (lo, hi) = if observed <= expected {
        (observed, expected)
    } else {
        (expected, observed)
    };
    lo as f64 / hi as f64
}

// Returns None when there is no turnout data at all.
fn turnout_consistency(data: &ElectionData, rules: &ScoringRules) -> (Option<f64>, String) {
    let header_total = data.election.total_ballots_cast.filter(|h| *h > 0);
    if data.turnout.is_empty() {
        let detail = match header_total {
            Some(h) => format!("No precinct turnout data; header says {}", h),
            None => "No turnout data available".to_string(),
        };
        return (None, detail);
    }

    let vote_for: HashMap<RaceId, u32> = data.races.iter().map(|r| (r.id, r.vote_for)).collect();
    let mut race_totals: HashMap<(&str, RaceId), u64> = HashMap::new();
    for r in data.results.iter() {
        *race_totals.entry((r.precinct.as_str(), r.race)).or_insert(0) += r.votes;
    }
    // The largest number of ballots a single race needed in each precinct.
    let mut ballots_needed: HashMap<&str, f64> = HashMap::new();
    for ((precinct, rid), total) in race_totals.iter() {
        let seats = vote_for.get(rid).cloned().unwrap_or(1).max(1);
        let needed = *total as f64 / seats as f64;
        let e = ballots_needed.entry(*precinct).or_insert(0.0);
        if needed > *e {
            *e = needed;
        }
    }

    let mut turnout: HashMap<&str, (Option<u64>, Option<u64>)> = HashMap::new();
    for t in data.turnout.iter() {
        let e = turnout.entry(t.precinct.as_str()).or_insert((None, None));
        e.0 = sum_opt(e.0, t.registered_voters);
        e.1 = sum_opt(e.1, t.ballots_cast);
    }

    let precincts: BTreeSet<&str> = ballots_needed
        .keys()
        .cloned()
        .chain(turnout.keys().cloned())
        .collect();
    let tol = rules.turnout_tolerance;
    let mut num_consistent = 0;
    for p in precincts.iter() {
        let needed = ballots_needed.get(p).cloned();
        let consistent = match (turnout.get(p), needed) {
            (Some((registered, Some(ballots))), Some(needed)) => {
                let over_registered = registered.map(|reg| *ballots > reg).unwrap_or(false);
                !over_registered && needed <= *ballots as f64 * (1.0 + tol)
            }
            // Turnout without any result: only acceptable if nobody voted.
            (Some((_, Some(ballots))), None) => *ballots == 0,
            _ => false,
        };
        if consistent {
            num_consistent += 1;
        } else {
            debug!(
                "turnout_consistency: precinct {:?} does not reconcile: turnout {:?} ballots needed {:?}",
                p,
                turnout.get(p),
                needed
            );
        }
    }
    let fraction = num_consistent as f64 / precincts.len() as f64;

    let turnout_total: u64 = turnout.values().filter_map(|(_, b)| *b).sum();
    let (factor, header_detail) = match header_total {
        Some(h) if turnout_total > 0 => {
            let ratio = turnout_total as f64 / h as f64;
            let factor = if (ratio - 1.0).abs() <= tol {
                1.0
            } else {
                ratio.min(1.0 / ratio)
            };
            (
                factor,
                format!(
                    "; turnout {} vs header {} (ratio {:.2})",
                    turnout_total, h, ratio
                ),
            )
        }
        _ => (1.0, format!("; turnout {} ballots, no header total", turnout_total)),
    };

    let detail = format!(
        "{}/{} precincts reconcile with results{}",
        num_consistent,
        precincts.len(),
        header_detail
    );
    (Some(fraction * factor), detail)
}

fn sum_opt(a: Option<u64>, b: Option<u64>) -> Option<u64> {
    match (a, b) {
        (Some(x), Some(y)) => Some(x + y),
        (x, None) => x,
        (None, y) => y,
    }
}

fn has_keyword(s: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|kw| s.contains(kw))
}

/// Compares the cross-validation totals with the local results.
pub fn cross_validate(
    races: &[Race],
    results: &[ResultRow],
    entries: Option<&[CrossValidationEntry]>,
    tables: &NormalizationTables,
    rules: &ScoringRules,
) -> CrossValidationReport {
    let entries = match entries {
        Some(l) if !l.is_empty() => l,
        _ => {
            info!("cross_validate: no cross-validation data supplied");
            return CrossValidationReport {
                supplied: false,
                checks: Vec::new(),
                matched: 0,
                excluded: 0,
                discrepancies: 0,
            };
        }
    };

    let mut totals: HashMap<(RaceId, String), u64> = HashMap::new();
    for r in results.iter() {
        *totals.entry((r.race, candidate_key(&r.candidate))).or_insert(0) += r.votes;
    }
    let races_by_id: HashMap<RaceId, &Race> = races.iter().map(|r| (r.id, r)).collect();

    let mut checks: Vec<CrossValidationCheck> = Vec::new();
    let (mut matched, mut excluded, mut discrepancies) = (0, 0, 0);
    for entry in entries.iter() {
        let race_match = find_race(&entry.race_label, races, tables, rules);
        let local_votes = race_match
            .race()
            .and_then(|rid| totals.get(&(rid, candidate_key(&entry.candidate))))
            .cloned()
            .unwrap_or(0);

        let status = if race_match.race().is_some() && local_votes == entry.votes {
            CheckStatus::Match
        } else {
            let race = race_match.race().and_then(|rid| races_by_id.get(&rid).cloned());
            CheckStatus::Mismatch(mismatch_cause(
                &race_match,
                race,
                entry,
                local_votes,
                tables,
                rules,
            ))
        };

        match status {
            CheckStatus::Match => matched += 1,
            CheckStatus::Mismatch(cause) if cause.is_explained() => {
                debug!(
                    "cross_validate: {:?} / {:?}: local {} vs source {}: {}",
                    entry.race_label,
                    entry.candidate,
                    local_votes,
                    entry.votes,
                    cause.tag()
                );
                excluded += 1;
            }
            CheckStatus::Mismatch(cause) => {
                warn!(
                    "cross_validate: {:?} / {:?}: local {} vs source {}: {}",
                    entry.race_label,
                    entry.candidate,
                    local_votes,
                    entry.votes,
                    cause.tag()
                );
                discrepancies += 1;
            }
        }
        checks.push(CrossValidationCheck {
            entry: entry.clone(),
            race_match,
            local_votes,
            status,
        });
    }

    info!(
        "cross_validate: {} entries: {} matched, {} explained differences, {} discrepancies",
        entries.len(),
        matched,
        excluded,
        discrepancies
    );
    CrossValidationReport {
        supplied: true,
        checks,
        matched,
        excluded,
        discrepancies,
    }
}

fn mismatch_cause(
    race_match: &RaceMatch,
    race: Option<&Race>,
    entry: &CrossValidationEntry,
    local_votes: u64,
    tables: &NormalizationTables,
    rules: &ScoringRules,
) -> MismatchCause {
    let race = match (race_match, race) {
        (RaceMatch::Ambiguous(_), _) => return MismatchCause::RaceNameMismatch,
        (_, Some(r)) => r,
        // The race is missing from the local data.
        _ => return MismatchCause::DataDiscrepancy,
    };
    let race_key = comparison_key(&race.normalized_name);

    // Only part of the votes of the corporation are local, but some must be.
    if local_votes > 0
        && local_votes < entry.votes
        && tables.is_multi_county_school_race(&race.normalized_name)
    {
        return MismatchCause::SchoolCorpPartialPrecincts;
    }

    let delta = local_votes.abs_diff(entry.votes);
    let write_in = has_keyword(&candidate_key(&entry.candidate), WRITE_IN_KEYWORDS);
    let retention = has_keyword(&race_key, RETENTION_KEYWORDS);
    if (write_in || retention) && delta <= rules.rounding_tolerance {
        return MismatchCause::RoundingWriteIn;
    }

    MismatchCause::DataDiscrepancy
}

/// Counts of ratings over a batch of elections.
#[derive(PartialEq, Debug, Clone)]
pub struct BatchSummary {
    pub high: u32,
    pub medium: u32,
    pub low: u32,
    pub average_score: f64,
}

pub fn summarize(outcomes: &[ScoringOutcome]) -> BatchSummary {
    let mut res = BatchSummary {
        high: 0,
        medium: 0,
        low: 0,
        average_score: 0.0,
    };
    for o in outcomes.iter() {
        match o.score.rating {
            Rating::High => res.high += 1,
            Rating::Medium => res.medium += 1,
            Rating::Low => res.low += 1,
        }
    }
    if !outcomes.is_empty() {
        res.average_score =
            outcomes.iter().map(|o| o.score.score).sum::<f64>() / outcomes.len() as f64;
    }
    res
}
