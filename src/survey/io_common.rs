use crate::survey::*;

use survey_stats::builder::Builder;

/// The content of a worksheet, before any column is selected.
#[derive(PartialEq, Debug, Clone)]
pub struct RawSheet {
    pub name: String,
    /// The first row. Cells without text are `None`.
    pub header: Vec<Option<String>>,
    pub rows: Vec<Vec<CellValue>>,
}

impl RawSheet {
    pub fn width(&self) -> usize {
        self.rows
            .iter()
            .map(|r| r.len())
            .chain(std::iter::once(self.header.len()))
            .max()
            .unwrap_or(0)
    }
}

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}

fn header_position(header: &[Option<String>], name: &str) -> Option<usize> {
    header.iter().position(|h| h.as_deref() == Some(name))
}

/// Finds the position of a column in the sheet.
///
/// When both a position and a header name are given, the header cell at that
/// position must hold the name.
fn resolve_column(sheet: &RawSheet, spec: &ColumnSpec) -> SurveyResult<usize> {
    match (spec.position()?, &spec.name) {
        (Some(idx), name_o) => {
            ensure!(
                idx < sheet.width(),
                ColumnOutOfRangeSnafu {
                    label: spec.label.clone(),
                    position: idx,
                    sheet: sheet.name.clone(),
                    width: sheet.width(),
                }
            );
            if let Some(name) = name_o {
                let found = sheet.header.get(idx).cloned().flatten();
                ensure!(
                    found.as_deref() == Some(name.as_str()),
                    ColumnHeaderMismatchSnafu {
                        label: spec.label.clone(),
                        position: idx,
                        expected: name.clone(),
                        found,
                    }
                );
            }
            Ok(idx)
        }
        (None, Some(name)) => header_position(&sheet.header, name).context(ColumnNotInHeaderSnafu {
            label: spec.label.clone(),
            name: name.clone(),
            sheet: sheet.name.clone(),
        }),
        (None, None) => MissingColumnReferenceSnafu {
            label: spec.label.clone(),
        }
        .fail(),
    }
}

/// Builds the observation table with the requested columns, named by their labels.
///
/// Rows that are entirely empty are skipped. The identity of a row is its
/// position below the header, so skipped rows leave gaps.
pub fn select_table(sheet: &RawSheet, columns: &[ColumnSpec]) -> SurveyResult<Table> {
    let mut positions: Vec<usize> = Vec::new();
    for spec in columns.iter() {
        let idx = resolve_column(sheet, spec)?;
        debug!(
            "select_table: column {:?} at position {} (header: {:?})",
            spec.label,
            idx,
            sheet.header.get(idx)
        );
        positions.push(idx);
    }

    let labels: Vec<String> = columns.iter().map(|c| c.label.clone()).collect();
    let mut builder =
        Builder::with_columns(labels).whatever_context::<_, SurveyError>("invalid column labels")?;
    for (row_id, row) in sheet.rows.iter().enumerate() {
        if row.iter().all(|c| c.is_missing()) {
            debug!("select_table: skipping empty row {}", row_id);
            continue;
        }
        let values: Vec<CellValue> = positions
            .iter()
            .map(|idx| row.get(*idx).cloned().unwrap_or(CellValue::Missing))
            .collect();
        builder
            .add_record(row_id, values)
            .whatever_context::<_, SurveyError>("invalid row")?;
    }
    Ok(builder.build())
}
