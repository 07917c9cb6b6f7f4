// Primitives for reading CSV files.

use crate::survey::io_common::{simplify_file_name, RawSheet};
use crate::survey::*;

/// Reads a CSV export of the survey. The first line is the header.
///
/// Fields are kept as text, so that their labels are exactly the characters
/// of the file ("01" stays "01"). Numeric summaries still parse them. Empty
/// fields are missing.
pub fn read_csv(path: &str) -> BSurveyResult<RawSheet> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .context(OpeningCsvSnafu { path })?;

    let mut records = rdr.into_records();
    let header: Vec<Option<String>> = match records.next() {
        Some(line_r) => {
            let line = line_r.context(CsvRecordSnafu { path, lineno: 1usize })?;
            line.iter()
                .map(|s| if s.trim().is_empty() { None } else { Some(s.to_string()) })
                .collect()
        }
        None => {
            return Err(Box::new(SurveyError::EmptySheet {
                path: path.to_string(),
                sheet_name: simplify_file_name(path),
            }))
        }
    };
    debug!("read_csv: header: {:?}", header);

    let mut rows: Vec<Vec<CellValue>> = Vec::new();
    for (idx, line_r) in records.enumerate() {
        // The header is line 1.
        let lineno = idx + 2;
        let line = line_r.context(CsvRecordSnafu { path, lineno })?;
        let cells: Vec<CellValue> = line.iter().map(convert_field).collect();
        debug!("read_csv: lineno: {:?} row: {:?}", lineno, &cells);
        rows.push(cells);
    }
    Ok(RawSheet {
        name: simplify_file_name(path),
        header,
        rows,
    })
}

fn convert_field(s: &str) -> CellValue {
    if s.trim().is_empty() {
        CellValue::Missing
    } else {
        CellValue::Text(s.to_string())
    }
}
