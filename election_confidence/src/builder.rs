use std::collections::HashMap;

use crate::normalize::{classify_race_level, normalize_race_name, NormalizationTables};
pub use crate::config::*;

/// A builder for assembling the imported data of one election.
///
/// Race names are normalized as races are declared. Results must name a
/// precinct: the builder refuses orphaned results.
///
/// ```
/// use election_confidence::builder::ElectionBuilder;
/// use election_confidence::normalize::NormalizationTables;
/// # use election_confidence::*;
///
/// let election = Election {
///     id: "2010-primary".to_string(),
///     year: 2010,
///     election_type: ElectionType::Primary,
///     date: "2010-05-04".to_string(),
///     name: None,
///     source_type: Some(SourceType::DigitalPdf),
///     total_ballots_cast: None,
///     notes: None,
/// };
/// let tables = NormalizationTables::standard();
/// let mut builder = ElectionBuilder::new(&election, &tables).expected_precincts(53);
///
/// let sheriff = builder.add_race("SHERIFF", 1)?;
/// builder.add_result(sheriff, "Anna", "Center 1", 120)?;
/// let data = builder.build();
/// assert_eq!(data.races[0].normalized_name, "Sheriff");
///
/// # Ok::<(), ScoringErrors>(())
/// ```
pub struct ElectionBuilder<'t> {
    tables: &'t NormalizationTables,
    election: Election,
    races: Vec<Race>,
    race_ids: HashMap<String, RaceId>,
    results: Vec<ResultRow>,
    turnout: Vec<TurnoutRecord>,
    expected_precincts: Option<u32>,
}

impl<'t> ElectionBuilder<'t> {
    pub fn new(election: &Election, tables: &'t NormalizationTables) -> ElectionBuilder<'t> {
        ElectionBuilder {
            tables,
            election: election.clone(),
            races: Vec::new(),
            race_ids: HashMap::new(),
            results: Vec::new(),
            turnout: Vec::new(),
            expected_precincts: None,
        }
    }

    pub fn expected_precincts(self, count: u32) -> ElectionBuilder<'t> {
        ElectionBuilder {
            expected_precincts: Some(count),
            ..self
        }
    }

    /// Declares a race under its raw name, as extracted from the source document.
    pub fn add_race(&mut self, raw_name: &str, vote_for: u32) -> Result<RaceId, ScoringErrors> {
        if self.race_ids.contains_key(raw_name) {
            return Err(ScoringErrors::DuplicateRace(raw_name.to_string()));
        }
        Ok(self.declare(raw_name, vote_for))
    }

    /// Returns the race with this raw name, declaring it with a single seat if needed.
    pub fn race(&mut self, raw_name: &str) -> RaceId {
        self.race_with_seats(raw_name, 1)
    }

    /// Same as [ElectionBuilder::race]. The number of seats only applies when the
    /// race is declared by this call.
    pub fn race_with_seats(&mut self, raw_name: &str, vote_for: u32) -> RaceId {
        match self.race_ids.get(raw_name) {
            Some(rid) => *rid,
            None => self.declare(raw_name, vote_for),
        }
    }

    fn declare(&mut self, raw_name: &str, vote_for: u32) -> RaceId {
        let rid = RaceId((self.races.len() + 1) as u32);
        let n = normalize_race_name(raw_name, self.tables);
        self.races.push(Race {
            id: rid,
            raw_name: raw_name.to_string(),
            level: classify_race_level(&n.normalized),
            normalized_name: n.normalized,
            vote_for: vote_for.max(1),
        });
        self.race_ids.insert(raw_name.to_string(), rid);
        rid
    }

    pub fn add_result(
        &mut self,
        race: RaceId,
        candidate: &str,
        precinct: &str,
        votes: u64,
    ) -> Result<(), ScoringErrors> {
        if race.0 == 0 || race.0 as usize > self.races.len() {
            return Err(ScoringErrors::UnknownRace(race));
        }
        let precinct = precinct.trim();
        if precinct.is_empty() {
            return Err(ScoringErrors::OrphanedResult {
                race,
                candidate: candidate.to_string(),
            });
        }
        self.results.push(ResultRow {
            race,
            candidate: candidate.trim().to_string(),
            precinct: precinct.to_string(),
            votes,
        });
        Ok(())
    }

    pub fn add_turnout(&mut self, record: TurnoutRecord) {
        self.turnout.push(TurnoutRecord {
            precinct: record.precinct.trim().to_string(),
            ..record
        });
    }

    pub fn build(self) -> ElectionData {
        ElectionData {
            election: self.election,
            races: self.races,
            results: self.results,
            turnout: self.turnout,
            expected_precincts: self.expected_precincts,
        }
    }
}
