pub use crate::config::*;

/// A builder for observation tables.
///
/// Loaders feed it one record at a time. It checks that every record has one
/// value per column.
///
/// ```
/// pub use survey_stats::builder::Builder;
/// # use survey_stats::AssociationError;
///
/// let mut builder = Builder::new(&["Wiek", "Ufa Google"])?;
///
/// builder.add_row_simple(&["18-24", "Raczej tak"])?;
/// builder.add_row_simple(&["65+", ""])?;
///
/// let table = builder.build();
/// assert_eq!(table.len(), 2);
///
/// # Ok::<(), AssociationError>(())
/// ```
pub struct Builder {
    pub(crate) _columns: Vec<String>,
    pub(crate) _records: Vec<Record>,
}

impl Builder {
    pub fn new(columns: &[&str]) -> Result<Builder, AssociationError> {
        let names: Vec<String> = columns.iter().map(|s| s.to_string()).collect();
        Builder::with_columns(names)
    }

    pub fn with_columns(columns: Vec<String>) -> Result<Builder, AssociationError> {
        for (idx, name) in columns.iter().enumerate() {
            if columns[..idx].contains(name) {
                return Err(AssociationError::DuplicateColumn { name: name.clone() });
            }
        }
        Ok(Builder {
            _columns: columns,
            _records: Vec::new(),
        })
    }

    /// Adds a row of text answers. The empty string is a missing answer.
    ///
    /// The row identity is the position of the row in the builder.
    pub fn add_row_simple(&mut self, values: &[&str]) -> Result<(), AssociationError> {
        let cells = values
            .iter()
            .map(|s| {
                if s.is_empty() {
                    CellValue::Missing
                } else {
                    CellValue::Text(s.to_string())
                }
            })
            .collect();
        let row_id = self._records.len();
        self.add_record(row_id, cells)
    }

    /// Adds a row with an explicit identity, usually its position in the source file.
    pub fn add_record(&mut self, row_id: usize, values: Vec<CellValue>) -> Result<(), AssociationError> {
        if values.len() != self._columns.len() {
            return Err(AssociationError::LengthMismatch {
                left: self._columns.len(),
                right: values.len(),
            });
        }
        self._records.push(Record { row_id, values });
        Ok(())
    }

    pub fn build(self) -> Table {
        Table {
            columns: self._columns,
            records: self._records,
        }
    }
}
