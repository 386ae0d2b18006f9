use std::path::Path;

use crate::bcd::*;

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}

/// One line of a results export.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ResultLine {
    pub race: String,
    pub candidate: String,
    pub precinct: String,
    pub votes: u64,
    pub vote_for: Option<u32>,
}

fn cell<'a>(path: &str, lineno: usize, row: &'a [String], idx: usize, expected: usize) -> BcdResult<&'a str> {
    row.get(idx).map(|s| s.trim()).context(LineTooShortSnafu {
        path: simplify_file_name(path),
        lineno,
        expected,
    })
}

/// Reads a count. Empty cells are missing counts. Thousands separators are accepted.
pub fn parse_count(path: &str, lineno: usize, s: &str) -> BcdResult<Option<u64>> {
    let s = s.trim().replace(',', "");
    if s.is_empty() {
        return Ok(None);
    }
    if let Ok(x) = s.parse::<u64>() {
        return Ok(Some(x));
    }
    // Spreadsheets store counts as floating point numbers.
    match s.parse::<f64>() {
        Ok(f) if f >= 0.0 && f.fract() == 0.0 => Ok(Some(f as u64)),
        _ => ParsingCountSnafu {
            path: simplify_file_name(path),
            lineno,
            content: s,
        }
        .fail(),
    }
}

fn parse_required_count(path: &str, lineno: usize, s: &str) -> BcdResult<u64> {
    parse_count(path, lineno, s)?.context(ParsingCountSnafu {
        path: simplify_file_name(path),
        lineno,
        content: s,
    })
}

/// Columns: race, candidate, precinct, votes and optionally vote_for.
pub fn parse_result_row(path: &str, lineno: usize, row: &[String]) -> BcdResult<ResultLine> {
    let race = cell(path, lineno, row, 0, 4)?;
    let candidate = cell(path, lineno, row, 1, 4)?;
    let precinct = cell(path, lineno, row, 2, 4)?;
    let votes = cell(path, lineno, row, 3, 4)?;
    if precinct.is_empty() {
        return OrphanedRowSnafu {
            path: simplify_file_name(path),
            lineno,
        }
        .fail();
    }
    let vote_for = match row.get(4) {
        Some(s) => match parse_count(path, lineno, s)? {
            Some(x) => Some(u32::try_from(x).ok().context(ParsingCountSnafu {
                path: simplify_file_name(path),
                lineno,
                content: s.trim(),
            })?),
            None => None,
        },
        None => None,
    };
    let res = ResultLine {
        race: race.to_string(),
        candidate: candidate.to_string(),
        precinct: precinct.to_string(),
        votes: parse_required_count(path, lineno, votes)?,
        vote_for,
    };
    debug!("parse_result_row: {}: {:?}", lineno, res);
    Ok(res)
}

/// Columns: precinct, registered voters, ballots cast. Both counts may be empty.
pub fn parse_turnout_row(path: &str, lineno: usize, row: &[String]) -> BcdResult<TurnoutRecord> {
    let precinct = cell(path, lineno, row, 0, 3)?;
    let registered = cell(path, lineno, row, 1, 3)?;
    let ballots = cell(path, lineno, row, 2, 3)?;
    Ok(TurnoutRecord {
        precinct: precinct.to_string(),
        registered_voters: parse_count(path, lineno, registered)?,
        ballots_cast: parse_count(path, lineno, ballots)?,
    })
}

/// Columns: race label, candidate, votes.
pub fn parse_cross_validation_row(
    path: &str,
    lineno: usize,
    row: &[String],
) -> BcdResult<CrossValidationEntry> {
    let race_label = cell(path, lineno, row, 0, 3)?;
    let candidate = cell(path, lineno, row, 1, 3)?;
    let votes = cell(path, lineno, row, 2, 3)?;
    Ok(CrossValidationEntry {
        race_label: race_label.to_string(),
        candidate: candidate.to_string(),
        votes: parse_required_count(path, lineno, votes)?,
    })
}

// Fully blank lines are dropped by the readers.
pub fn is_blank(row: &[String]) -> bool {
    row.iter().all(|s| s.trim().is_empty())
}
