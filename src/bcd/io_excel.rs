// Primitives for reading Excel (.xlsx) exports.

use calamine::{open_workbook, DataType, Range, Reader, Xlsx};

use crate::bcd::io_common::is_blank;
use crate::bcd::*;

fn get_range(path: &str, cfs: &FileSource) -> BBcdResult<Range<DataType>> {
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;
    let wrange = match cfs.excel_worksheet_name.as_ref() {
        Some(name) => workbook
            .worksheet_range(name)
            .context(MissingWorksheetSnafu { name, path })?
            .context(OpeningExcelSnafu { path })?,
        None => workbook
            .worksheet_range_at(0)
            .context(EmptyExcelSnafu {})?
            .context(OpeningExcelSnafu { path })?,
    };
    Ok(wrange)
}

fn read_cell(cell: &DataType, lineno: usize) -> BcdResult<String> {
    match cell {
        DataType::String(s) => Ok(s.clone()),
        DataType::Empty => Ok("".to_string()),
        DataType::Int(i) => Ok(i.to_string()),
        // Counts come back as floating point numbers.
        DataType::Float(f) if f.fract() == 0.0 => Ok(format!("{}", *f as i64)),
        DataType::Float(f) => Ok(f.to_string()),
        _ => ExcelWrongCellTypeSnafu {
            lineno: lineno as u64,
            content: format!("{:?}", cell),
        }
        .fail(),
    }
}

pub fn read_excel_rows(path: &str, cfs: &FileSource) -> BBcdResult<Vec<Row>> {
    let wrange = get_range(path, cfs)?;
    let first_row = cfs.first_row_index()?;
    // The range starts at the first non-empty row of the sheet.
    let row_offset = wrange.start().map(|(r, _)| r as usize).unwrap_or(0);
    debug!(
        "read_excel_rows: {:?}: range starts at row {}",
        path,
        row_offset + 1
    );

    let mut res: Vec<Row> = Vec::new();
    for (idx, row) in wrange.rows().enumerate() {
        let lineno = row_offset + idx + 1;
        if lineno < first_row {
            continue;
        }
        let mut cells: Vec<String> = Vec::with_capacity(row.len());
        for elt in row.iter() {
            cells.push(read_cell(elt, lineno)?);
        }
        if is_blank(&cells) {
            continue;
        }
        debug!("read_excel_rows: lineno: {:?} row: {:?}", lineno, &cells);
        res.push((lineno, cells));
    }
    info!("read_excel_rows: {} rows read from {:?}", res.len(), path);
    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells() {
        assert_eq!(read_cell(&DataType::Float(120.0), 2).unwrap(), "120");
        assert_eq!(read_cell(&DataType::Int(7), 2).unwrap(), "7");
        assert_eq!(read_cell(&DataType::Empty, 2).unwrap(), "");
        assert_eq!(
            read_cell(&DataType::String("Center 1".to_string()), 2).unwrap(),
            "Center 1"
        );
        assert!(matches!(
            read_cell(&DataType::Bool(true), 9),
            Err(BcdError::ExcelWrongCellType { lineno: 9, .. })
        ));
    }

    fn fixture() -> String {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("testdata")
            .join("boone.xlsx")
            .display()
            .to_string()
    }

    fn source(js: JSValue) -> FileSource {
        serde_json::from_value(js).unwrap()
    }

    #[test]
    fn reads_first_worksheet() {
        let p = fixture();
        let cfs = source(json!({"provider": "xlsx", "filePath": p}));
        let rows = read_excel_rows(&p, &cfs).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].0, 2);
        assert_eq!(rows[0].1, vec!["Sheriff", "Anna Smith", "Center 1", "120"]);
        assert_eq!(rows[1].1[3], "95");
        let line = parse_result_row(&p, rows[1].0, &rows[1].1).unwrap();
        assert_eq!(line.precinct, "Eagle 1");
        assert_eq!(line.votes, 95);
    }

    #[test]
    fn reads_named_worksheet() {
        let p = fixture();
        // The data starts on the third row of the sheet, after a header.
        let cfs = source(json!({
            "provider": "xlsx",
            "filePath": p,
            "excelWorksheetName": "Turnout",
            "firstRowIndex": "4"
        }));
        let rows = read_excel_rows(&p, &cfs).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].0, 4);
        let t = parse_turnout_row(&p, rows[0].0, &rows[0].1).unwrap();
        assert_eq!(t.precinct, "Center 1");
        assert_eq!(t.registered_voters, Some(400));
        assert_eq!(t.ballots_cast, Some(210));

        let cfs = source(json!({"provider": "xlsx", "filePath": p, "excelWorksheetName": "Summary"}));
        assert!(matches!(
            read_excel_rows(&p, &cfs).map_err(|e| *e),
            Err(BcdError::MissingWorksheet { .. })
        ));
    }

    #[test]
    fn missing_workbook() {
        let p = std::env::temp_dir()
            .join("bcdq-no-such-dir")
            .join("missing.xlsx")
            .display()
            .to_string();
        let cfs: FileSource =
            serde_json::from_value(json!({"provider": "xlsx", "filePath": p})).unwrap();
        assert!(matches!(
            read_excel_rows(&p, &cfs).map_err(|e| *e),
            Err(BcdError::OpeningExcel { .. })
        ));
    }
}
