/*!

This is the long-form manual for `election_confidence` and `bcdq`.

## What is scored

Every imported election receives a confidence score between 0 and 1, computed as
a weighted sum of five sub-scores:

| sub-score              | weight | meaning                                                        |
|------------------------|--------|----------------------------------------------------------------|
| `source_type`          | 0.25   | quality of the source document                                 |
| `race_names_clean`     | 0.20   | fraction of race names that came out of extraction intact      |
| `turnout_consistent`   | 0.20   | precinct turnout reconciles with the results                   |
| `cross_validated`      | 0.20   | fraction of independent totals that agree with the results     |
| `precinct_count_match` | 0.15   | observed precincts against the number reported by the county   |

The rating is `HIGH` from 0.90, `MEDIUM` from 0.70 and `LOW` below.

### `source_type`

| source type    | score |
|----------------|-------|
| `digital_pdf`  | 1.0   |
| `excel`        | 0.9   |
| `manual_entry` | 0.5   |
| `scanned_pdf`  | 0.3   |

When the configuration does not give a `sourceType`, it is inferred: an
`importFileType` of `pdf_reimport` is a digital PDF, then the extension of
`sourceFile` decides (`.xlsx`, `.xls`, `.csv` are Excel exports, `.pdf` is a
digital PDF), and anything else is manual entry.

### `race_names_clean`

A raw race name is not clean when it:
- is empty
- contains a known truncated word (`issioner`), a Unicode replacement character or a trailing ellipsis
- carries vote counts (`244 32 0 276 68.15% DAN COATS (R)`), which happens when the
  text extraction merged a race header with its first result line
- is written entirely in capitals (short acronyms such as `US` are accepted)

Unclean names are normalized. The outcome lists, for every race, the raw name, the
normalized name and whether they differ.

### `turnout_consistent`

A precinct reconciles when it has a turnout record with ballots cast, no more
ballots than registered voters, and no race needing more ballots than were cast
(with a tolerance of 10%). A race with several seats needs `total / vote_for`
ballots. A precinct with ballots cast but no result does not reconcile.

The fraction of reconciled precincts is scaled down when the sum of the precinct
ballots is more than 10% away from the total printed in the header of the source
document.

### `cross_validated`

Each cross-validation total is paired with a race (see below) and compared with the
sum of the local results for that candidate. Differences get one of these tags:

- `race-name-mismatch`: the label matches several races equally well
- `school-corp-partial-precincts`: the race belongs to a school corporation that
  spans several counties, and the source total is larger than the local one, which
  is not zero. The local data only holds the county's precincts. The corporations
  are listed in the configuration (see below).
- `rounding-writein`: a difference of at most 10 votes on a write-in total or on a
  judicial retention question
- `data-discrepancy`: anything else, including a label with no local race at all

Only `data-discrepancy` lowers the sub-score. The other tags are reported and
left out of the match rate. When there is nothing to compare, the sub-score is 1.0
and the assessment is marked `unvalidated`.

### `precinct_count_match`

The number of distinct precincts in the results and turnout records, compared with
`expectedPrecincts`: the ratio of the smaller count to the larger one. Without
`expectedPrecincts` the sub-score is 0 and the assessment says that the count is
unknown.

Missing inputs never fail the scoring. The affected sub-score falls back to 0 and
the input is listed under `incompleteInputs`.

## Race names

Names are normalized in three steps:
1. known truncated words are replaced (`issioner` becomes `Commissioner`)
2. names written entirely in capitals are converted to title case. Party markers
   such as `(R)`, Roman numerals and words with periods are kept as-is.
3. abbreviations are expanded (`Dist` becomes `District`, `WEBO SB` becomes
   `Western Boone School Board`)

Normalization is idempotent. User-provided tables are rejected if a replacement
reuses a pattern word or has no lowercase letter, since both would let a second
pass change the name again.

Cross-validation labels are normalized the same way, then paired with races:
- an exact match of the comparison keys (lowercase, punctuation removed, party
  prefix reduced to one letter) wins if it is unique
- otherwise races are scored by normalized Levenshtein similarity, raised to 0.90
  when one key contains the other. The best race needs at least 0.80, and no other
  race may be within 0.05 of it.

## Input formats

All the files of an election are row-level exports of the import pipeline. The
`provider` of a file source is `csv` or `xlsx`. Rows before `firstRowIndex`
(1-based, default 2 to skip the header) are ignored.

### results

```text
race,candidate,precinct,votes,vote_for
Sheriff,Anna Smith,Center 1,120,1
Town Council At Large,Bob Jones,Center 1,80,3
```

The `vote_for` column is optional and defaults to 1. A row without a precinct is
an error: county-wide totals do not belong in the results.

### turnout

```text
precinct,registered,ballots
Center 1,1200,640
```

Both counts may be left empty.

### cross-validation

```text
race,candidate,votes
Sheriff,Anna Smith,15230
```

## Configuration

```json
{
  "outputSettings": { "countyName": "Boone", "outputPath": "assessment.json" },
  "rules": { "turnoutTolerance": "0.1", "roundingTolerance": 10 },
  "elections": [
    {
      "id": "2010-primary",
      "date": "2010-05-04",
      "type": "primary",
      "sourceFile": "2010-Primary.pdf",
      "expectedPrecincts": 53,
      "resultsFile": { "provider": "csv", "filePath": "2010-primary-results.csv" },
      "turnoutFile": { "provider": "csv", "filePath": "2010-primary-turnout.csv" },
      "crossValidationFile": { "provider": "csv", "filePath": "2010-primary-summary.csv" }
    }
  ]
}
```

Paths are relative to the configuration file.

Election fields:
- `type`: `primary`, `general`, `special` or `municipal`
- `sourceType` (optional): `digital_pdf`, `excel`, `scanned_pdf` or `manual_entry`.
  Overrides the inference described above.
- `totalBallotsCast` (optional): the header total of the source document
- `notes` (optional): copied into the assessment

The optional `tables` section replaces the built-in normalization tables:

```json
"tables": {
  "corruptions": { "issioner": "Commissioner" },
  "abbreviations": { "Dist": "District", "WEBO SB": "Western Boone School Board" },
  "schoolCorporations": ["Western Boone"]
}
```

`schoolCorporations` lists the school corporations with precincts in other
counties. Without it, the built-in list (`Western Boone`) is used.

The optional `rules` section overrides `turnoutTolerance`, `fuzzyThreshold`,
`ambiguityMargin` and `roundingTolerance`. Values may be numbers or strings.

 */
