//! Race name cleanup.
//!
//! Names extracted from PDF reports come in many shapes: truncated words
//! (`"County issioner"`), shouted (`"STATE REP DIST 24"`), abbreviated
//! (`"WEBO SB"`), or with vote counts glued to them when the text layout
//! defeated the extractor (`"244 32 0 276 68.15% DAN COATS (R)"`).
//!
//! The normalizer is driven by [NormalizationTables], which are built once and
//! passed explicitly to every call.

use std::collections::HashSet;

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

pub use crate::config::*;

static EMBEDDED_VOTES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d \d.*\d%").unwrap());

static EMBEDDED_VOTES_DECODE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+)\s+(\d+)\s+(\d+)\s+(\d+)\s+([\d.]+)%\s+(.+)$").unwrap()
});

static PARTY_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\((\w+)\)\s+(.+)$").unwrap());

static PARTY_SUFFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(.+?)\s*\(([RDL])\)\s*$").unwrap());

static PARTY_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\(\w{1,3}\)$").unwrap());

static ROMAN_NUMERAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[IVX]+$").unwrap());

const DEFAULT_CORRUPTIONS: &[(&str, &str)] = &[
    ("issioner", "Commissioner"),
    ("ommissioner", "Commissioner"),
    ("ouncil", "Council"),
    ("rosecutor", "Prosecutor"),
    ("uperintendent", "Superintendent"),
    ("reasurer", "Treasurer"),
    ("ecorder", "Recorder"),
    ("ssessor", "Assessor"),
];

const DEFAULT_ABBREVIATIONS: &[(&str, &str)] = &[
    ("WEBO SB", "Western Boone School Board"),
    ("SB", "School Board"),
    ("Dist", "District"),
    ("Comm", "Commissioner"),
    ("Commr", "Commissioner"),
    ("Twp", "Township"),
    ("Pct", "Precinct"),
    ("Rep", "Representative"),
    ("Sen", "Senator"),
    ("Cty", "County"),
    ("Sch", "School"),
    ("Corp", "Corporation"),
    ("Const", "Constitutional"),
    ("Amend", "Amendment"),
    ("Mbr", "Member"),
    ("Pub", "Public"),
    ("Ques", "Question"),
];

/// School corporations with precincts outside Boone County.
pub const DEFAULT_SCHOOL_CORPORATIONS: &[&str] = &["Western Boone"];

// A replacement rule, on whitespace-separated tokens.
#[derive(Eq, PartialEq, Debug, Clone)]
struct Rule {
    // Comparison keys of the pattern tokens.
    pattern: Vec<String>,
    replacement: Vec<String>,
}

/// The lookup tables used by the normalizer.
///
/// Both tables map a pattern (one or more words) to its replacement. Patterns
/// are compared case-insensitively, word by word, ignoring a trailing period.
///
/// Tables built with [NormalizationTables::new] are checked so that
/// normalization stays idempotent: no replacement may contain a word that
/// appears in any pattern, and every replacement must contain a lowercase letter.
///
/// The tables also list the school corporations that span several counties.
/// The results of a county only hold part of the votes of these corporations.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct NormalizationTables {
    corruptions: Vec<Rule>,
    abbreviations: Vec<Rule>,
    // Comparison keys of the corporation names.
    school_corporations: Vec<String>,
}

impl NormalizationTables {
    pub fn new(
        corruptions: &[(String, String)],
        abbreviations: &[(String, String)],
    ) -> Result<NormalizationTables, ScoringErrors> {
        let tables = NormalizationTables::build(corruptions, abbreviations);
        tables.validate()?;
        Ok(tables)
    }

    /// The tables used for the Boone County imports.
    pub fn standard() -> NormalizationTables {
        let owned = |l: &[(&str, &str)]| -> Vec<(String, String)> {
            l.iter()
                .map(|(p, r)| (p.to_string(), r.to_string()))
                .collect()
        };
        let mut tables =
            NormalizationTables::build(&owned(DEFAULT_CORRUPTIONS), &owned(DEFAULT_ABBREVIATIONS));
        tables.school_corporations = DEFAULT_SCHOOL_CORPORATIONS
            .iter()
            .map(|n| comparison_key(n))
            .collect();
        tables
    }

    /// Replaces the list of school corporations that span several counties.
    pub fn with_school_corporations(
        mut self,
        names: &[String],
    ) -> Result<NormalizationTables, ScoringErrors> {
        let mut keys: Vec<String> = Vec::with_capacity(names.len());
        for n in names.iter() {
            let k = comparison_key(n);
            if k.is_empty() {
                return Err(ScoringErrors::InvalidTables(format!(
                    "empty school corporation name {:?}",
                    n
                )));
            }
            keys.push(k);
        }
        self.school_corporations = keys;
        Ok(self)
    }

    /// True if the race is held by a school corporation listed as spanning several counties.
    pub fn is_multi_county_school_race(&self, race_name: &str) -> bool {
        let key = comparison_key(race_name);
        let padded = format!(" {} ", key);
        key.contains("school")
            && self
                .school_corporations
                .iter()
                .any(|c| padded.contains(&format!(" {} ", c)))
    }

    fn build(
        corruptions: &[(String, String)],
        abbreviations: &[(String, String)],
    ) -> NormalizationTables {
        NormalizationTables {
            corruptions: make_rules(corruptions),
            abbreviations: make_rules(abbreviations),
            school_corporations: Vec::new(),
        }
    }

    fn validate(&self) -> Result<(), ScoringErrors> {
        let pattern_words: HashSet<&String> = self
            .corruptions
            .iter()
            .chain(self.abbreviations.iter())
            .flat_map(|r| r.pattern.iter())
            .collect();
        for rule in self.corruptions.iter().chain(self.abbreviations.iter()) {
            if rule.pattern.is_empty() || rule.pattern.iter().any(|w| w.is_empty()) {
                return Err(ScoringErrors::InvalidTables(format!(
                    "empty pattern for replacement {:?}",
                    rule.replacement.join(" ")
                )));
            }
            if rule.replacement.is_empty() {
                return Err(ScoringErrors::InvalidTables(format!(
                    "empty replacement for pattern {:?}",
                    rule.pattern.join(" ")
                )));
            }
            if let Some(w) = rule
                .replacement
                .iter()
                .find(|w| pattern_words.contains(&word_key(w)))
            {
                return Err(ScoringErrors::InvalidTables(format!(
                    "replacement {:?} contains the pattern word {:?}",
                    rule.replacement.join(" "),
                    w
                )));
            }
            if !rule
                .replacement
                .iter()
                .any(|w| w.chars().any(|c| c.is_lowercase()))
            {
                return Err(ScoringErrors::InvalidTables(format!(
                    "replacement {:?} has no lowercase letter",
                    rule.replacement.join(" ")
                )));
            }
        }
        Ok(())
    }

    fn is_corruption_word(&self, word: &str) -> bool {
        let k = word_key(word);
        self.corruptions
            .iter()
            .any(|r| r.pattern.len() == 1 && r.pattern[0] == k)
    }
}

fn make_rules(l: &[(String, String)]) -> Vec<Rule> {
    let mut rules: Vec<Rule> = l
        .iter()
        .map(|(p, r)| Rule {
            pattern: p.split_whitespace().map(word_key).collect(),
            replacement: r.split_whitespace().map(|s| s.to_string()).collect(),
        })
        .collect();
    // Longest patterns first, so that "WEBO SB" wins over "SB".
    rules.sort_by(|a, b| {
        b.pattern
            .len()
            .cmp(&a.pattern.len())
            .then_with(|| a.pattern.cmp(&b.pattern))
    });
    rules
}

fn word_key(w: &str) -> String {
    w.trim_end_matches('.').to_lowercase()
}

#[derive(Eq, PartialEq, Debug, Clone)]
struct Word {
    text: String,
    // Produced by a table replacement.
    replaced: bool,
}

fn apply_rules(words: Vec<Word>, rules: &[Rule]) -> Vec<Word> {
    let mut res: Vec<Word> = Vec::with_capacity(words.len());
    let mut idx = 0;
    while idx < words.len() {
        let hit = rules.iter().find(|r| {
            !r.pattern.is_empty()
                && idx + r.pattern.len() <= words.len()
                && r.pattern
                    .iter()
                    .zip(words[idx..].iter())
                    .all(|(p, w)| !w.replaced && *p == word_key(&w.text))
        });
        match hit {
            Some(rule) => {
                res.extend(rule.replacement.iter().map(|s| Word {
                    text: s.clone(),
                    replaced: true,
                }));
                idx += rule.pattern.len();
            }
            None => {
                res.push(words[idx].clone());
                idx += 1;
            }
        }
    }
    res
}

fn is_all_caps<'a>(words: impl Iterator<Item = &'a str>) -> bool {
    let mut num_letters = 0;
    for w in words {
        for c in w.chars().filter(|c| c.is_alphabetic()) {
            if c.is_lowercase() {
                return false;
            }
            num_letters += 1;
        }
    }
    num_letters > 0
}

fn title_word(w: &str) -> String {
    if PARTY_MARKER.is_match(w) || ROMAN_NUMERAL.is_match(w) || w.contains('.') {
        return w.to_string();
    }
    let mut res = String::with_capacity(w.len());
    let mut seen_letter = false;
    for c in w.chars() {
        if c.is_alphabetic() {
            if seen_letter {
                res.extend(c.to_lowercase());
            } else {
                res.extend(c.to_uppercase());
                seen_letter = true;
            }
        } else {
            res.push(c);
        }
    }
    res
}

/// The result of normalizing one race name.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct NormalizedName {
    pub normalized: String,
    /// True when the normalized name differs from the raw name.
    pub changed: bool,
}

/// Normalizes a race name.
///
/// The steps are applied in order:
/// 1. known truncation patterns are replaced (`"issioner"` -> `"Commissioner"`)
/// 2. names written entirely in capitals are converted to title case
/// 3. abbreviations are expanded (`"Dist"` -> `"District"`)
///
/// Whitespace is collapsed. The function is idempotent.
///
/// ```
/// use election_confidence::normalize::*;
///
/// let tables = NormalizationTables::standard();
/// let n = normalize_race_name("WEBO SB", &tables);
/// assert_eq!(n.normalized, "Western Boone School Board");
/// assert!(n.changed);
/// ```
pub fn normalize_race_name(raw: &str, tables: &NormalizationTables) -> NormalizedName {
    let words: Vec<Word> = raw
        .split_whitespace()
        .map(|s| Word {
            text: s.to_string(),
            replaced: false,
        })
        .collect();

    let mut words = apply_rules(words, &tables.corruptions);

    // The replacements are already in title case, only look at the original words.
    if is_all_caps(words.iter().filter(|w| !w.replaced).map(|w| w.text.as_str())) {
        for w in words.iter_mut().filter(|w| !w.replaced) {
            w.text = title_word(&w.text);
        }
    }

    let words = apply_rules(words, &tables.abbreviations);

    let normalized = words
        .iter()
        .map(|w| w.text.as_str())
        .collect::<Vec<&str>>()
        .join(" ");
    let changed = normalized != raw;
    if changed {
        debug!("normalize_race_name: {:?} -> {:?}", raw, normalized);
    }
    NormalizedName {
        normalized,
        changed,
    }
}

/// Checks a raw race name for extraction defects.
///
/// A name is not clean when it is empty, holds a truncation marker (a known
/// truncated word, a trailing ellipsis or a replacement character), carries
/// vote data, or is written entirely in capitals.
pub fn is_clean_race_name(raw: &str, tables: &NormalizationTables) -> bool {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return false;
    }
    if trimmed.contains('\u{FFFD}') || trimmed.ends_with("...") || trimmed.ends_with('\u{2026}') {
        return false;
    }
    if trimmed.split_whitespace().any(|w| tables.is_corruption_word(w)) {
        return false;
    }
    if has_embedded_vote_data(trimmed) {
        return false;
    }
    // Short acronyms such as "US" are acceptable on their own.
    let num_letters = trimmed.chars().filter(|c| c.is_alphabetic()).count();
    !(num_letters > 3 && is_all_caps(trimmed.split_whitespace()))
}

/// True when vote counts ended up in the name, which happens when the text
/// extraction merged a race header with the first result line.
pub fn has_embedded_vote_data(name: &str) -> bool {
    EMBEDDED_VOTES.is_match(name)
}

/// Vote data recovered from a corrupted race name.
#[derive(PartialEq, Debug, Clone)]
pub struct EmbeddedVoteData {
    pub v1: u64,
    pub v2: u64,
    pub v3: u64,
    pub total: u64,
    pub pct: f64,
    pub candidate: String,
    pub party: Option<String>,
}

/// Decodes names of the form `"244 32 0 276 68.15% DAN COATS (R)"`.
pub fn decode_embedded_vote_data(name: &str) -> Option<EmbeddedVoteData> {
    let caps = EMBEDDED_VOTES_DECODE.captures(name.trim())?;
    let num = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u64>().ok());
    let pct = caps.get(5)?.as_str().parse::<f64>().ok()?;
    let name_str = caps.get(6)?.as_str().trim();

    let (candidate, party) = if let Some(c) = PARTY_SUFFIX.captures(name_str) {
        (c[1].trim().to_string(), Some(c[2].to_string()))
    } else {
        extract_race_party(name_str)
    };

    Some(EmbeddedVoteData {
        v1: num(1)?,
        v2: num(2)?,
        v3: num(3)?,
        total: num(4)?,
        pct,
        candidate,
        party,
    })
}

/// Splits the party prefix of primary race names: `"(R) Governor"` -> `("Governor", Some("R"))`.
pub fn extract_race_party(name: &str) -> (String, Option<String>) {
    if let Some(caps) = PARTY_PREFIX.captures(name) {
        let party = match caps[1].to_uppercase().as_str() {
            "R" | "REP" => Some("R"),
            "D" | "DEM" => Some("D"),
            "L" | "LIB" => Some("L"),
            _ => None,
        };
        if let Some(p) = party {
            return (caps[2].trim().to_string(), Some(p.to_string()));
        }
    }
    (name.to_string(), None)
}

/// The key used to compare race names: lowercase, punctuation turned into
/// spaces, whitespace collapsed. Party prefixes are reduced to their one-letter
/// code so that `"(REP) Governor"` and `"(R) Governor"` compare equal.
pub fn comparison_key(name: &str) -> String {
    let (stripped, party) = extract_race_party(name.trim());
    let s: String = stripped
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    let mut words: Vec<String> = party.map(|p| p.to_lowercase()).into_iter().collect();
    words.extend(s.split_whitespace().map(|w| w.to_string()));
    words.join(" ")
}

/// The key used to compare candidate names: party markers removed, lowercase,
/// punctuation turned into spaces.
pub fn candidate_key(name: &str) -> String {
    name.split_whitespace()
        .filter(|w| !PARTY_MARKER.is_match(w))
        .flat_map(|w| {
            w.to_lowercase()
                .chars()
                .map(|c| if c.is_alphanumeric() { c } else { ' ' })
                .collect::<String>()
                .split_whitespace()
                .map(|s| s.to_string())
                .collect::<Vec<String>>()
        })
        .collect::<Vec<String>>()
        .join(" ")
}

const FEDERAL_KEYWORDS: &[&str] = &[
    "president",
    "united states senator",
    "u.s. senator",
    "united states rep",
    "u.s. rep",
    "us rep",
    "us senator",
    "congress",
];

const STATE_KEYWORDS: &[&str] = &[
    "governor",
    "attorney general",
    "secretary of state",
    "auditor of state",
    "treasurer of state",
    "superintendent of public instruction",
    "state senator",
    "state rep",
    "supreme court",
    "court of appeals",
];

const COUNTY_KEYWORDS: &[&str] = &[
    "county",
    "circuit court",
    "coroner",
    "commissioner",
    "council member",
    "council at large",
    "council district",
    "auditor",
    "recorder",
    "treasurer",
    "sheriff",
    "surveyor",
    "assessor",
    "prosecuting",
    "clerk",
];

const LOCAL_KEYWORDS: &[&str] = &[
    "school",
    "twp",
    "township",
    "town council",
    "town board",
    "trustee",
    "mayor",
    "zionsville",
    "lebanon",
    "whitestown",
    "advance",
    "thorntown",
    "jamestown",
    "ulen",
];

const BALLOT_MEASURE_KEYWORDS: &[&str] = &[
    "public question",
    "constitutional amendment",
    "const amendment",
    "referendum",
    "straight party",
    "retain",
];

const PARTY_KEYWORDS: &[&str] = &[
    "committeeman",
    "committeewoman",
    "committeeperson",
    "delegate",
    "convention",
    "state conv",
];

/// Classifies a race by jurisdiction level, using keyword rules.
pub fn classify_race_level(name: &str) -> RaceLevel {
    let (stripped, _) = extract_race_party(name.trim());
    let clean = stripped.to_lowercase();
    let has = |kws: &[&str]| kws.iter().any(|kw| clean.contains(kw));

    if has(FEDERAL_KEYWORDS) {
        RaceLevel::Federal
    } else if has(STATE_KEYWORDS) {
        RaceLevel::State
    } else if has(COUNTY_KEYWORDS) && !clean.contains("town council") {
        RaceLevel::County
    } else if has(LOCAL_KEYWORDS) {
        RaceLevel::Local
    } else if has(BALLOT_MEASURE_KEYWORDS) {
        RaceLevel::BallotMeasure
    } else if has(PARTY_KEYWORDS) {
        RaceLevel::Party
    } else {
        RaceLevel::Other
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn norm(s: &str) -> String {
        normalize_race_name(s, &NormalizationTables::standard()).normalized
    }

    #[test]
    fn standard_tables_are_valid() {
        let t = NormalizationTables::standard();
        assert_eq!(t.validate(), Ok(()));
    }

    #[test]
    fn truncated_words() {
        assert_eq!(norm("County issioner District 1"), "County Commissioner District 1");
        assert_eq!(norm("COUNTY ISSIONER DIST 2"), "County Commissioner District 2");
    }

    #[test]
    fn all_caps_to_title_case() {
        assert_eq!(norm("CIRCUIT COURT CLERK"), "Circuit Court Clerk");
        assert_eq!(norm("(R) GOVERNOR"), "(R) Governor");
        assert_eq!(norm("JUDGE III"), "Judge III");
        assert_eq!(norm("Mayor of Lebanon"), "Mayor of Lebanon");
    }

    #[test]
    fn abbreviations() {
        assert_eq!(norm("WEBO SB"), "Western Boone School Board");
        assert_eq!(norm("Zionsville SB At Large"), "Zionsville School Board At Large");
        assert_eq!(norm("State Rep Dist. 24"), "State Representative District 24");
        assert_eq!(norm("County Comm Dist 3"), "County Commissioner District 3");
    }

    #[test]
    fn changed_flag() {
        let t = NormalizationTables::standard();
        let n = normalize_race_name("Sheriff", &t);
        assert_eq!(n.normalized, "Sheriff");
        assert!(!n.changed);
        let n = normalize_race_name("  Sheriff ", &t);
        assert_eq!(n.normalized, "Sheriff");
        assert!(n.changed);
    }

    #[test]
    fn multi_county_school_corporations() {
        let t = NormalizationTables::standard();
        assert!(t.is_multi_county_school_race("Western Boone School Board"));
        assert!(t.is_multi_county_school_race("WESTERN BOONE SCHOOL BOARD DIST. 2"));
        assert!(!t.is_multi_county_school_race("Zionsville School Board"));
        // Not a school race.
        assert!(!t.is_multi_county_school_race("Western Boone Fire Territory"));

        let t = t
            .with_school_corporations(&["Zionsville".to_string()])
            .unwrap();
        assert!(t.is_multi_county_school_race("Zionsville School Board At Large"));
        assert!(!t.is_multi_county_school_race("Western Boone School Board"));
        assert!(NormalizationTables::new(&[], &[]).unwrap().school_corporations.is_empty());
        assert!(matches!(
            NormalizationTables::standard().with_school_corporations(&[" - ".to_string()]),
            Err(ScoringErrors::InvalidTables(_))
        ));
    }

    #[test]
    fn rejects_tables_breaking_idempotence() {
        let bad = vec![("Dist".to_string(), "Dist District".to_string())];
        assert!(matches!(
            NormalizationTables::new(&[], &bad),
            Err(ScoringErrors::InvalidTables(_))
        ));
        let shouting = vec![("Twp".to_string(), "TOWNSHIP".to_string())];
        assert!(matches!(
            NormalizationTables::new(&[], &shouting),
            Err(ScoringErrors::InvalidTables(_))
        ));
        let ok = vec![("Twp".to_string(), "Township".to_string())];
        assert!(NormalizationTables::new(&[], &ok).is_ok());
    }

    #[test]
    fn cleanliness() {
        let t = NormalizationTables::standard();
        assert!(is_clean_race_name("County Commissioner District 1", &t));
        assert!(is_clean_race_name("US", &t));
        assert!(!is_clean_race_name("County issioner District 1", &t));
        assert!(!is_clean_race_name("WEBO SB", &t));
        assert!(!is_clean_race_name("CIRCUIT COURT CLERK", &t));
        assert!(!is_clean_race_name("Judge of the Circuit Court No...", &t));
        assert!(!is_clean_race_name("244 32 0 276 68.15% DAN COATS (R)", &t));
        assert!(!is_clean_race_name("   ", &t));
    }

    #[test]
    fn decode_vote_data() {
        let d = decode_embedded_vote_data("244 32 0 276 68.15% DAN COATS (R)").unwrap();
        assert_eq!(d.total, 276);
        assert_eq!(d.v1, 244);
        assert_eq!(d.candidate, "DAN COATS");
        assert_eq!(d.party, Some("R".to_string()));
        let d = decode_embedded_vote_data("10 2 0 12 40.00% (D) JOE SMITH").unwrap();
        assert_eq!(d.candidate, "JOE SMITH");
        assert_eq!(d.party, Some("D".to_string()));
        assert_eq!(decode_embedded_vote_data("Sheriff"), None);
    }

    #[test]
    fn party_prefix() {
        assert_eq!(
            extract_race_party("(R) Governor"),
            ("Governor".to_string(), Some("R".to_string()))
        );
        assert_eq!(
            extract_race_party("(DEM) Mayor"),
            ("Mayor".to_string(), Some("D".to_string()))
        );
        assert_eq!(extract_race_party("(X) Mayor"), ("(X) Mayor".to_string(), None));
    }

    #[test]
    fn comparison_keys() {
        assert_eq!(comparison_key("(R) U.S. Senator"), "r u s senator");
        assert_eq!(comparison_key("(REP) U.S. Senator"), "r u s senator");
        assert_eq!(comparison_key("  State   Representative, District 24"), "state representative district 24");
    }

    #[test]
    fn candidate_keys() {
        assert_eq!(candidate_key("(R) DAN COATS"), "dan coats");
        assert_eq!(candidate_key("Romney-Ryan (R)"), "romney ryan");
        assert_eq!(candidate_key("Write-In"), "write in");
    }

    #[test]
    fn race_levels() {
        assert_eq!(classify_race_level("President of the United States"), RaceLevel::Federal);
        assert_eq!(classify_race_level("(R) Governor"), RaceLevel::State);
        assert_eq!(classify_race_level("County Commissioner District 1"), RaceLevel::County);
        assert_eq!(classify_race_level("Zionsville Town Council"), RaceLevel::Local);
        assert_eq!(classify_race_level("Western Boone School Board"), RaceLevel::Local);
        assert_eq!(classify_race_level("Public Question 1"), RaceLevel::BallotMeasure);
        assert_eq!(classify_race_level("Precinct Committeeman Center 1"), RaceLevel::Party);
        assert_eq!(classify_race_level("Something Else"), RaceLevel::Other);
    }

    proptest! {
        #[test]
        fn normalization_is_idempotent(raw in "[A-Za-z0-9 .()%-]{0,40}") {
            let once = norm(&raw);
            prop_assert_eq!(norm(&once), once);
        }

        #[test]
        fn normalization_of_table_words_is_idempotent(
            words in proptest::collection::vec(
                prop_oneof![
                    Just("issioner"), Just("WEBO"), Just("SB"), Just("Dist."), Just("COMM"),
                    Just("Comm"), Just("county"), Just("(R)"), Just("II"), Just("x"), Just("42"),
                ],
                0..8,
            )
        ) {
            let raw = words.join(" ");
            let once = norm(&raw);
            prop_assert_eq!(norm(&once), once);
        }
    }
}
