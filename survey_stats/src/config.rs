// ********* Input data structures ***********

use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::Display;

/// The content of one cell of the observation table.
///
/// Missing cells are an explicit variant: downstream code has to decide what
/// to do with them instead of carrying a null around.
#[derive(PartialEq, Debug, Clone)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Missing,
}

impl CellValue {
    /// The category label of this cell, as used by recoding maps and
    /// contingency tables.
    ///
    /// Integral numbers are printed without a fractional part, so a rating
    /// stored as `5.0` is labelled `"5"`.
    pub fn label(&self) -> Option<String> {
        match self {
            CellValue::Text(s) => Some(s.clone()),
            CellValue::Number(x) if x.fract() == 0.0 && x.abs() < 1e15 => {
                Some(format!("{}", *x as i64))
            }
            CellValue::Number(x) => Some(x.to_string()),
            CellValue::Missing => None,
        }
    }

    /// Numeric reading of the cell. Text that parses as a number counts,
    /// anything else is treated as missing.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(x) if x.is_finite() => Some(*x),
            CellValue::Number(_) => None,
            CellValue::Text(s) => s.trim().parse::<f64>().ok().filter(|x| x.is_finite()),
            CellValue::Missing => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, CellValue::Missing)
    }
}

/// A row of the observation table, with the position it had in the source.
#[derive(PartialEq, Debug, Clone)]
pub struct Record {
    pub row_id: usize,
    pub values: Vec<CellValue>,
}

/// The observation table: named columns and records.
///
/// Tables are never modified in place. Operations return new tables.
#[derive(PartialEq, Debug, Clone)]
pub struct Table {
    pub columns: Vec<String>,
    pub records: Vec<Record>,
}

impl Table {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Result<usize, AssociationError> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| AssociationError::UnknownColumn {
                name: name.to_string(),
                available: self.columns.clone(),
            })
    }

    /// The values of a column, in row order.
    pub fn column(&self, name: &str) -> Result<Vec<CellValue>, AssociationError> {
        let idx = self.column_index(name)?;
        Ok(self
            .records
            .iter()
            .map(|r| r.values.get(idx).cloned().unwrap_or(CellValue::Missing))
            .collect())
    }

    pub fn row_ids(&self) -> Vec<usize> {
        self.records.iter().map(|r| r.row_id).collect()
    }
}

/// A raw value after recoding or categorization.
#[derive(Eq, PartialEq, Debug, Clone, Hash, Ord, PartialOrd)]
pub enum Category {
    Label(String),
    Missing,
}

impl Category {
    pub fn as_label(&self) -> Option<&str> {
        match self {
            Category::Label(s) => Some(s.as_str()),
            Category::Missing => None,
        }
    }
}

/// Maps a raw answer to its bucket. Keys are matched verbatim: no trimming,
/// no case folding.
pub type RecodingMap = BTreeMap<String, String>;

/// Restricts the raw labels of a column before recoding.
///
/// A label is admitted when it is listed in `include` (if present) and not
/// listed in `exclude`.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct CategoryFilter {
    pub include: Option<Vec<String>>,
    pub exclude: Vec<String>,
}

impl CategoryFilter {
    pub const ALLOW_ALL: CategoryFilter = CategoryFilter {
        include: None,
        exclude: Vec::new(),
    };

    pub fn admits(&self, label: &str) -> bool {
        let included = match &self.include {
            Some(l) => l.iter().any(|s| s == label),
            None => true,
        };
        included && !self.exclude.iter().any(|s| s == label)
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RecodedRow {
    pub row_id: usize,
    pub values: Vec<Category>,
}

/// Columns after recoding. Cells may still be missing.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RecodedTable {
    pub columns: Vec<String>,
    pub rows: Vec<RecodedRow>,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct CompleteRow {
    pub row_id: usize,
    pub values: Vec<String>,
}

/// The rows of a recoded table without any missing value.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct CompleteCases {
    pub columns: Vec<String>,
    pub rows: Vec<CompleteRow>,
    /// Number of rows that had at least one missing value.
    pub dropped: usize,
}

impl CompleteCases {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ******** Output data structures *********

/// Cross-tabulation of two categorical variables.
///
/// Invariant: `counts` has one row per row label and one column per column label.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ContingencyTable {
    pub row_variable: String,
    pub col_variable: String,
    pub row_labels: Vec<String>,
    pub col_labels: Vec<String>,
    pub counts: Vec<Vec<u64>>,
}

impl ContingencyTable {
    /// Builds a table from explicit counts.
    pub fn from_counts(
        row_labels: &[&str],
        col_labels: &[&str],
        counts: &[Vec<u64>],
    ) -> Result<ContingencyTable, AssociationError> {
        if counts.len() != row_labels.len() {
            return Err(AssociationError::RaggedTable {
                row: counts.len(),
                expected: row_labels.len(),
                found: counts.len(),
            });
        }
        for (idx, row) in counts.iter().enumerate() {
            if row.len() != col_labels.len() {
                return Err(AssociationError::RaggedTable {
                    row: idx,
                    expected: col_labels.len(),
                    found: row.len(),
                });
            }
        }
        Ok(ContingencyTable {
            row_variable: "rows".to_string(),
            col_variable: "columns".to_string(),
            row_labels: row_labels.iter().map(|s| s.to_string()).collect(),
            col_labels: col_labels.iter().map(|s| s.to_string()).collect(),
            counts: counts.to_vec(),
        })
    }

    pub fn with_variables(self, row_variable: &str, col_variable: &str) -> ContingencyTable {
        ContingencyTable {
            row_variable: row_variable.to_string(),
            col_variable: col_variable.to_string(),
            ..self
        }
    }

    pub fn num_rows(&self) -> usize {
        self.row_labels.len()
    }

    pub fn num_cols(&self) -> usize {
        self.col_labels.len()
    }

    pub fn row_totals(&self) -> Vec<u64> {
        self.counts.iter().map(|r| r.iter().sum()).collect()
    }

    pub fn col_totals(&self) -> Vec<u64> {
        (0..self.num_cols())
            .map(|j| self.counts.iter().map(|r| r[j]).sum())
            .collect()
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().flatten().sum()
    }

    pub fn transpose(&self) -> ContingencyTable {
        let counts = (0..self.num_cols())
            .map(|j| self.counts.iter().map(|r| r[j]).collect())
            .collect();
        ContingencyTable {
            row_variable: self.col_variable.clone(),
            col_variable: self.row_variable.clone(),
            row_labels: self.col_labels.clone(),
            col_labels: self.row_labels.clone(),
            counts,
        }
    }
}

/// The result of a chi-square test of independence.
#[derive(PartialEq, Debug, Clone)]
pub struct TestResult {
    pub statistic: f64,
    pub degrees_of_freedom: u64,
    pub p_value: f64,
    /// Expected counts under independence, same shape as the observed table.
    pub expected: Vec<Vec<f64>>,
    pub cramers_v: f64,
    /// Number of cells with an expected count below 5.
    pub low_expected_cells: usize,
    pub correction: ContinuityCorrection,
}

impl TestResult {
    /// False when more than 20% of the cells have an expected count below 5.
    pub fn approximation_is_reliable(&self) -> bool {
        let num_cells: usize = self.expected.iter().map(|r| r.len()).sum();
        num_cells == 0 || self.low_expected_cells * 5 <= num_cells
    }
}

impl Display for TestResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "χ² = {:.2}, df = {}, p = {:.3}",
            self.statistic, self.degrees_of_freedom, self.p_value
        )
    }
}

/// Errors that prevent an analysis from completing.
#[derive(PartialEq, Debug, Clone)]
pub enum AssociationError {
    /// The requested column is not part of the table.
    UnknownColumn {
        name: String,
        available: Vec<String>,
    },
    DuplicateColumn {
        name: String,
    },
    /// Two sequences that should be aligned row by row have different lengths.
    LengthMismatch {
        left: usize,
        right: usize,
    },
    /// Fewer than two categories in one dimension of the table.
    InsufficientData {
        variable: String,
        distinct: usize,
    },
    /// An expected count is zero: the statistic is undefined.
    DegenerateTable {
        row: String,
        col: String,
    },
    RaggedTable {
        row: usize,
        expected: usize,
        found: usize,
    },
    Distribution {
        message: String,
    },
}

impl Error for AssociationError {}

impl Display for AssociationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssociationError::UnknownColumn { name, available } => write!(
                f,
                "unknown column {:?} (available columns: {:?})",
                name, available
            ),
            AssociationError::DuplicateColumn { name } => {
                write!(f, "column {:?} is declared more than once", name)
            }
            AssociationError::LengthMismatch { left, right } => write!(
                f,
                "columns have different lengths: {} and {}",
                left, right
            ),
            AssociationError::InsufficientData { variable, distinct } => write!(
                f,
                "insufficient data: variable {:?} has {} distinct categories after recoding, at least 2 are required",
                variable, distinct
            ),
            AssociationError::DegenerateTable { row, col } => write!(
                f,
                "degenerate contingency table: expected count is zero for cell ({:?}, {:?})",
                row, col
            ),
            AssociationError::RaggedTable {
                row,
                expected,
                found,
            } => write!(
                f,
                "contingency table is not rectangular: row {} has {} cells, expected {}",
                row, found, expected
            ),
            AssociationError::Distribution { message } => {
                write!(f, "chi-squared distribution error: {}", message)
            }
        }
    }
}

// ********* Configuration **********

/// The continuity correction applied to the observed counts.
///
/// - Disabled is the textbook Pearson statistic.
///
/// - Yates moves each observed count by at most 0.5 toward its expected count.
/// It only applies to tables with one degree of freedom, other tables are
/// left untouched.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum ContinuityCorrection {
    Disabled,
    Yates,
}

/// How to turn two raw columns of a table into a test of independence.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct AssociationRequest {
    pub row_column: String,
    pub col_column: String,
    pub row_recoding: Option<RecodingMap>,
    pub col_recoding: Option<RecodingMap>,
    pub row_filter: CategoryFilter,
    pub col_filter: CategoryFilter,
    /// Name of the derived row variable. Defaults to the source column.
    pub row_label: Option<String>,
    /// Name of the derived column variable. Defaults to the source column.
    pub col_label: Option<String>,
    pub correction: ContinuityCorrection,
}

impl AssociationRequest {
    /// A request without recoding, filtering or correction.
    pub fn new(row_column: &str, col_column: &str) -> AssociationRequest {
        AssociationRequest {
            row_column: row_column.to_string(),
            col_column: col_column.to_string(),
            row_recoding: None,
            col_recoding: None,
            row_filter: CategoryFilter::ALLOW_ALL,
            col_filter: CategoryFilter::ALLOW_ALL,
            row_label: None,
            col_label: None,
            correction: ContinuityCorrection::Disabled,
        }
    }

    pub fn row_variable(&self) -> &str {
        self.row_label.as_deref().unwrap_or(&self.row_column)
    }

    pub fn col_variable(&self) -> &str {
        self.col_label.as_deref().unwrap_or(&self.col_column)
    }
}

/// Everything produced by one association analysis.
#[derive(PartialEq, Debug, Clone)]
pub struct AssociationOutcome {
    pub contingency: ContingencyTable,
    pub test: TestResult,
    /// Number of observations in the contingency table.
    pub complete_cases: usize,
    /// Number of rows discarded because of a missing or unmapped value.
    pub dropped: usize,
}
