// Reading survey responses from Excel workbooks.

use calamine::DataType;

use crate::survey::io_common::RawSheet;
use crate::survey::*;

pub fn read_xlsx(path: &str, worksheet_name: Option<&str>) -> BSurveyResult<RawSheet> {
    let (name, wrange) = get_range(path, worksheet_name)?;

    // The range only covers the used cells: pad on the left so that positions
    // are counted from column A.
    let col_offset = wrange.start().map(|(_, c)| c as usize).unwrap_or(0);
    let pad = |cells: Vec<CellValue>| -> Vec<CellValue> {
        let mut res = vec![CellValue::Missing; col_offset];
        res.extend(cells);
        res
    };

    let mut iter = wrange.rows();
    let header_row = iter.next().context(EmptySheetSnafu {
        path,
        sheet_name: name.clone(),
    })?;
    let header: Vec<Option<String>> = pad(header_row.iter().map(|dt| convert_cell(dt, 0)).collect())
        .iter()
        .map(|c| c.label())
        .collect();
    debug!("read_xlsx: header: {:?}", header);

    let mut rows: Vec<Vec<CellValue>> = Vec::new();
    for (idx, row) in iter.enumerate() {
        let cells: Vec<CellValue> = row.iter().map(|dt| convert_cell(dt, idx + 1)).collect();
        debug!("read_xlsx: idx: {:?} row: {:?}", idx, &cells);
        rows.push(pad(cells));
    }
    Ok(RawSheet { name, header, rows })
}

/// Excel dates and times are kept as their serial number.
fn convert_cell(dt: &DataType, lineno: usize) -> CellValue {
    match dt {
        DataType::String(s) if s.trim().is_empty() => CellValue::Missing,
        DataType::String(s) => CellValue::Text(s.clone()),
        DataType::Int(i) => CellValue::Number(*i as f64),
        DataType::Float(f) => CellValue::Number(*f),
        DataType::DateTime(f) => CellValue::Number(*f),
        DataType::Bool(b) => CellValue::Text(b.to_string()),
        DataType::Empty => CellValue::Missing,
        _ => {
            warn!(
                "read_xlsx: cell {:?} at row {} is not a value, treated as missing",
                dt, lineno
            );
            CellValue::Missing
        }
    }
}

fn get_range(
    path: &str,
    worksheet_name_o: Option<&str>,
) -> BSurveyResult<(String, calamine::Range<DataType>)> {
    debug!(
        "read_xlsx: path: {:?} worksheet: {:?}",
        &path, &worksheet_name_o
    );
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;
    let available: Vec<String> = workbook.sheet_names().to_vec();

    // A worksheet name was provided, use it.
    if let Some(worksheet_name) = worksheet_name_o {
        let wrange = workbook
            .worksheet_range(worksheet_name)
            .context(MissingWorksheetSnafu {
                path,
                sheet_name: worksheet_name,
                available,
            })?
            .context(OpeningExcelSnafu { path })?;
        Ok((worksheet_name.to_string(), wrange))
    } else {
        let mut all_worksheets = workbook.worksheets();
        if all_worksheets.len() == 1 {
            let (worksheet_name, wrange) = all_worksheets.remove(0);
            debug!(
                "read_xlsx: path: {:?} single worksheet: {:?}",
                &path, &worksheet_name
            );
            Ok((worksheet_name, wrange))
        } else {
            Err(Box::new(SurveyError::AmbiguousWorksheet {
                path: path.to_string(),
                count: all_worksheets.len(),
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells_are_converted() {
        assert_eq!(convert_cell(&DataType::Int(3), 1), CellValue::Number(3.0));
        assert_eq!(
            convert_cell(&DataType::String("65+".to_string()), 1),
            CellValue::Text("65+".to_string())
        );
        assert_eq!(
            convert_cell(&DataType::String("  ".to_string()), 1),
            CellValue::Missing
        );
        assert_eq!(
            convert_cell(&DataType::Bool(true), 1),
            CellValue::Text("true".to_string())
        );
        assert_eq!(convert_cell(&DataType::Empty, 1), CellValue::Missing);
        assert_eq!(
            convert_cell(&DataType::Error(calamine::CellErrorType::Div0), 1),
            CellValue::Missing
        );
    }

    #[test]
    fn leading_empty_columns_keep_positions() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("offset.xlsx");
        let mut workbook = rust_xlsxwriter::Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 2, "Wiek").unwrap();
        sheet.write_string(1, 2, "18-24").unwrap();
        sheet.write_number(2, 3, 4.0).unwrap();
        workbook.save(&path).unwrap();

        let raw = read_xlsx(&path.display().to_string(), None).unwrap();
        assert_eq!(raw.name, "Sheet1");
        assert_eq!(raw.header[2], Some("Wiek".to_string()));
        assert_eq!(raw.rows[0][2], CellValue::Text("18-24".to_string()));
        assert_eq!(raw.rows[1][3], CellValue::Number(4.0));
    }
}
