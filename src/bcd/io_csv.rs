// Primitives for reading CSV files.

use crate::bcd::io_common::is_blank;
use crate::bcd::*;

pub fn read_csv_rows(path: &str, cfs: &FileSource) -> BBcdResult<Vec<Row>> {
    let first_row = cfs.first_row_index()?;
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .context(CsvOpenSnafu {})?;

    let mut res: Vec<Row> = Vec::new();
    // The index starts at 1 to respect most conventions in the excel world
    for (idx, line_r) in rdr.into_records().enumerate() {
        let lineno = idx + 1;
        if lineno < first_row {
            continue;
        }
        let line = line_r.context(CsvLineParseSnafu {})?;
        let cells: Vec<String> = line.iter().map(|s| s.to_string()).collect();
        if is_blank(&cells) {
            continue;
        }
        debug!("read_csv_rows: lineno: {:?} row: {:?}", lineno, &cells);
        res.push((lineno, cells));
    }
    info!("read_csv_rows: {} rows read from {:?}", res.len(), path);
    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(file_path: &str, first_row: Option<&str>) -> FileSource {
        let js = match first_row {
            Some(r) => json!({"provider": "csv", "filePath": file_path, "firstRowIndex": r}),
            None => json!({"provider": "csv", "filePath": file_path}),
        };
        serde_json::from_value(js).unwrap()
    }

    #[test]
    fn skips_header_and_blank_lines() {
        let dir = std::env::temp_dir().join(format!("bcdq-io-csv-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let p = dir.join("turnout.csv").display().to_string();
        fs::write(&p, "precinct,registered,ballots\nCenter 1,400,210\n,,\nEagle 1,350\n").unwrap();

        let rows = read_csv_rows(&p, &source(&p, None)).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].0, 2);
        assert_eq!(rows[0].1, vec!["Center 1", "400", "210"]);
        assert_eq!(rows[1].0, 4);

        // No header
        let rows = read_csv_rows(&p, &source(&p, Some("1"))).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].1[0], "precinct");
    }

    #[test]
    fn missing_file() {
        let p = std::env::temp_dir()
            .join("bcdq-no-such-dir")
            .join("missing.csv")
            .display()
            .to_string();
        assert!(matches!(
            read_csv_rows(&p, &source(&p, None)).map_err(|e| *e),
            Err(BcdError::CsvOpen { .. })
        ));
    }
}
