use log::debug;

use crate::normalize::{comparison_key, normalize_race_name, NormalizationTables};
pub use crate::config::*;

/// Pairs a race label taken from a source document with one of the races of the election.
///
/// The label goes through the same normalization as the race names. Then:
/// 1. an exact match on the comparison key wins, if it is unique
/// 2. otherwise, every race is scored with the normalized Levenshtein similarity
/// of the keys (raised to `substring_score` when one key contains the other).
/// The best race is returned if it reaches `fuzzy_threshold` and no other race
/// is within `ambiguity_margin` of it.
///
/// The function never guesses: ties come back as [RaceMatch::Ambiguous].
pub fn find_race(
    label: &str,
    races: &[Race],
    tables: &NormalizationTables,
    rules: &ScoringRules,
) -> RaceMatch {
    let label_key = comparison_key(&normalize_race_name(label, tables).normalized);
    if label_key.is_empty() {
        return RaceMatch::NoMatch;
    }

    let keyed: Vec<(RaceId, String)> = races
        .iter()
        .map(|r| (r.id, comparison_key(&r.normalized_name)))
        .collect();

    let exact: Vec<RaceId> = keyed
        .iter()
        .filter(|(_, k)| *k == label_key)
        .map(|(rid, _)| *rid)
        .collect();
    if exact.len() == 1 {
        return RaceMatch::Exact(exact[0]);
    }
    if exact.len() > 1 {
        debug!(
            "find_race: {:?} has {} exact matches: {:?}",
            label,
            exact.len(),
            exact
        );
        return RaceMatch::Ambiguous(exact);
    }

    let mut scored: Vec<(RaceId, f64)> = keyed
        .iter()
        .map(|(rid, k)| (*rid, similarity(&label_key, k, rules)))
        .filter(|(_, score)| *score >= rules.fuzzy_threshold)
        .collect();
    // Best score first, race order for stability.
    scored.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    debug!("find_race: {:?} scored candidates: {:?}", label, scored);

    match scored.as_slice() {
        [] => RaceMatch::NoMatch,
        [(rid, score)] => RaceMatch::Similar {
            race: *rid,
            score: *score,
        },
        [(rid, score), (_, second), ..] => {
            if score - second < rules.ambiguity_margin {
                let best = *score;
                RaceMatch::Ambiguous(
                    scored
                        .iter()
                        .filter(|(_, s)| best - s < rules.ambiguity_margin)
                        .map(|(rid, _)| *rid)
                        .collect(),
                )
            } else {
                RaceMatch::Similar {
                    race: *rid,
                    score: *score,
                }
            }
        }
    }
}

fn similarity(a: &str, b: &str, rules: &ScoringRules) -> f64 {
    let lev = strsim::normalized_levenshtein(a, b);
    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    // Very short keys ("sb", "1") are contained in too many names to mean anything.
    if short.len() >= 4 && long.contains(short) {
        lev.max(rules.substring_score)
    } else {
        lev
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn race(id: u32, name: &str) -> Race {
        Race {
            id: RaceId(id),
            raw_name: name.to_string(),
            normalized_name: name.to_string(),
            level: RaceLevel::Other,
            vote_for: 1,
        }
    }

    fn find(label: &str, races: &[Race]) -> RaceMatch {
        find_race(
            label,
            races,
            &NormalizationTables::standard(),
            &ScoringRules::DEFAULT_RULES,
        )
    }

    fn races() -> Vec<Race> {
        vec![
            race(1, "(R) Governor"),
            race(2, "(D) Governor"),
            race(3, "Western Boone School Board"),
            race(4, "Zionsville School Board"),
            race(5, "County Commissioner District 1"),
            race(6, "County Commissioner District 2"),
            race(7, "Boone County Sheriff"),
        ]
    }

    #[test]
    fn exact_match_after_normalization() {
        let rs = races();
        assert_eq!(find("(REP) GOVERNOR", &rs), RaceMatch::Exact(RaceId(1)));
        assert_eq!(find("WEBO SB", &rs), RaceMatch::Exact(RaceId(3)));
        assert_eq!(find("County Comm Dist 2", &rs), RaceMatch::Exact(RaceId(6)));
    }

    #[test]
    fn similar_match() {
        let rs = races();
        match find("Boone County Sherif", &rs) {
            RaceMatch::Similar { race, score } => {
                assert_eq!(race, RaceId(7));
                assert!(score >= 0.8);
            }
            x => panic!("unexpected match {:?}", x),
        }
        match find("Sheriff", &rs) {
            RaceMatch::Similar { race, .. } => assert_eq!(race, RaceId(7)),
            x => panic!("unexpected match {:?}", x),
        }
    }

    #[test]
    fn ambiguous_match() {
        let rs = races();
        assert_eq!(
            find("School Board", &rs),
            RaceMatch::Ambiguous(vec![RaceId(3), RaceId(4)])
        );
        assert_eq!(
            find("County Commissioner District", &rs),
            RaceMatch::Ambiguous(vec![RaceId(5), RaceId(6)])
        );
    }

    #[test]
    fn duplicate_names_are_ambiguous() {
        let rs = vec![race(1, "Trustee"), race(2, "TRUSTEE")];
        assert_eq!(
            find("Trustee", &rs),
            RaceMatch::Ambiguous(vec![RaceId(1), RaceId(2)])
        );
    }

    #[test]
    fn no_match() {
        let rs = races();
        assert_eq!(find("Public Question 1", &rs), RaceMatch::NoMatch);
        assert_eq!(find("   ", &rs), RaceMatch::NoMatch);
        assert_eq!(find("Sheriff", &[]), RaceMatch::NoMatch);
    }
}
