pub mod builder;
mod config;
pub mod manual;
pub mod summary;

use log::{debug, info, warn};
use statrs::distribution::{ChiSquared, ContinuousCDF};

use std::collections::{BTreeMap, BTreeSet};

pub use crate::config::*;

/// Keeps only two columns of a table.
///
/// Row order and row identities are preserved, so that the reduced table can
/// still be related to the source rows.
pub fn select_columns(
    table: &Table,
    column_a: &str,
    column_b: &str,
) -> Result<Table, AssociationError> {
    let idx_a = table.column_index(column_a)?;
    let idx_b = table.column_index(column_b)?;
    let records = table
        .records
        .iter()
        .map(|r| Record {
            row_id: r.row_id,
            values: vec![
                r.values.get(idx_a).cloned().unwrap_or(CellValue::Missing),
                r.values.get(idx_b).cloned().unwrap_or(CellValue::Missing),
            ],
        })
        .collect();
    Ok(Table {
        columns: vec![column_a.to_string(), column_b.to_string()],
        records,
    })
}

/// Replaces every value by its bucket in the recoding map.
///
/// Values that are not an exact key of the map become missing. The output
/// always has the length of the input.
pub fn recode(column: &[CellValue], mapping: &RecodingMap) -> Vec<Category> {
    column
        .iter()
        .map(|v| match v.label().and_then(|l| mapping.get(&l)) {
            Some(bucket) => Category::Label(bucket.clone()),
            None => Category::Missing,
        })
        .collect()
}

/// Uses the raw label of every cell as its category.
pub fn categorize(column: &[CellValue]) -> Vec<Category> {
    column
        .iter()
        .map(|v| match v.label() {
            Some(l) => Category::Label(l),
            None => Category::Missing,
        })
        .collect()
}

/// Turns the cells rejected by the filter into missing cells.
pub fn filter_categories(column: &[CellValue], filter: &CategoryFilter) -> Vec<CellValue> {
    column
        .iter()
        .map(|v| match v.label() {
            Some(l) if filter.admits(&l) => v.clone(),
            _ => CellValue::Missing,
        })
        .collect()
}

impl RecodedTable {
    /// Puts side by side recoded columns that come from the same rows.
    pub fn from_columns(
        row_ids: &[usize],
        columns: Vec<(String, Vec<Category>)>,
    ) -> Result<RecodedTable, AssociationError> {
        for (_, values) in columns.iter() {
            if values.len() != row_ids.len() {
                return Err(AssociationError::LengthMismatch {
                    left: row_ids.len(),
                    right: values.len(),
                });
            }
        }
        let rows = row_ids
            .iter()
            .enumerate()
            .map(|(idx, row_id)| RecodedRow {
                row_id: *row_id,
                values: columns.iter().map(|(_, v)| v[idx].clone()).collect(),
            })
            .collect();
        Ok(RecodedTable {
            columns: columns.into_iter().map(|(name, _)| name).collect(),
            rows,
        })
    }
}

/// Complete-case filtering: drops every row with at least one missing value.
pub fn drop_incomplete(table: &RecodedTable) -> CompleteCases {
    let mut rows: Vec<CompleteRow> = Vec::new();
    let mut dropped: usize = 0;
    for row in table.rows.iter() {
        let values: Option<Vec<String>> = row
            .values
            .iter()
            .map(|c| c.as_label().map(|s| s.to_string()))
            .collect();
        match values {
            Some(values) => rows.push(CompleteRow {
                row_id: row.row_id,
                values,
            }),
            None => {
                debug!("drop_incomplete: dropping row {:?}", row);
                dropped += 1;
            }
        }
    }
    CompleteCases {
        columns: table.columns.clone(),
        rows,
        dropped,
    }
}

/// Cross-tabulates two columns of the complete cases.
///
/// Categories are sorted lexically. Only the categories that occur in the
/// data are present: there is no padding with empty rows or columns.
pub fn build_contingency(
    cases: &CompleteCases,
    row_column: &str,
    col_column: &str,
) -> Result<ContingencyTable, AssociationError> {
    let find = |name: &str| {
        cases
            .columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| AssociationError::UnknownColumn {
                name: name.to_string(),
                available: cases.columns.clone(),
            })
    };
    let row_idx = find(row_column)?;
    let col_idx = find(col_column)?;
    build_contingency_at(cases, row_idx, col_idx)
}

fn build_contingency_at(
    cases: &CompleteCases,
    row_idx: usize,
    col_idx: usize,
) -> Result<ContingencyTable, AssociationError> {
    let mut pairs: BTreeMap<(&str, &str), u64> = BTreeMap::new();
    let mut row_labels: BTreeSet<&str> = BTreeSet::new();
    let mut col_labels: BTreeSet<&str> = BTreeSet::new();
    for row in cases.rows.iter() {
        let r = row.values[row_idx].as_str();
        let c = row.values[col_idx].as_str();
        row_labels.insert(r);
        col_labels.insert(c);
        *pairs.entry((r, c)).or_insert(0) += 1;
    }

    let row_variable = cases.columns[row_idx].clone();
    let col_variable = cases.columns[col_idx].clone();
    debug!(
        "build_contingency: {:?} categories: {:?}, {:?} categories: {:?}",
        row_variable, row_labels, col_variable, col_labels
    );
    if row_labels.len() < 2 {
        return Err(AssociationError::InsufficientData {
            variable: row_variable,
            distinct: row_labels.len(),
        });
    }
    if col_labels.len() < 2 {
        return Err(AssociationError::InsufficientData {
            variable: col_variable,
            distinct: col_labels.len(),
        });
    }

    let counts: Vec<Vec<u64>> = row_labels
        .iter()
        .map(|r| {
            col_labels
                .iter()
                .map(|c| pairs.get(&(*r, *c)).cloned().unwrap_or(0))
                .collect()
        })
        .collect();

    Ok(ContingencyTable {
        row_variable,
        col_variable,
        row_labels: row_labels.iter().map(|s| s.to_string()).collect(),
        col_labels: col_labels.iter().map(|s| s.to_string()).collect(),
        counts,
    })
}

/// Pearson's chi-square test of independence, without continuity correction.
pub fn chi_square_independence(table: &ContingencyTable) -> Result<TestResult, AssociationError> {
    chi_square_independence_with(table, ContinuityCorrection::Disabled)
}

/// Pearson's chi-square test of independence.
///
/// Arguments:
/// * `table` a contingency table with at least 2 rows and 2 columns
/// * `correction` the continuity correction to apply on tables with one degree of freedom
///
/// The p-value is the upper tail of the chi-squared distribution. A table with
/// an empty row or column has a zero expected count and is rejected.
pub fn chi_square_independence_with(
    table: &ContingencyTable,
    correction: ContinuityCorrection,
) -> Result<TestResult, AssociationError> {
    let num_rows = table.num_rows();
    let num_cols = table.num_cols();
    if num_rows < 2 {
        return Err(AssociationError::InsufficientData {
            variable: table.row_variable.clone(),
            distinct: num_rows,
        });
    }
    if num_cols < 2 {
        return Err(AssociationError::InsufficientData {
            variable: table.col_variable.clone(),
            distinct: num_cols,
        });
    }
    if table.counts.len() != num_rows {
        return Err(AssociationError::RaggedTable {
            row: table.counts.len(),
            expected: num_rows,
            found: table.counts.len(),
        });
    }
    for (idx, row) in table.counts.iter().enumerate() {
        if row.len() != num_cols {
            return Err(AssociationError::RaggedTable {
                row: idx,
                expected: num_cols,
                found: row.len(),
            });
        }
    }

    let row_totals: Vec<f64> = table.row_totals().iter().map(|x| *x as f64).collect();
    let col_totals: Vec<f64> = table.col_totals().iter().map(|x| *x as f64).collect();
    let grand_total = table.total() as f64;

    let mut expected: Vec<Vec<f64>> = vec![vec![0.0; num_cols]; num_rows];
    for i in 0..num_rows {
        for j in 0..num_cols {
            let e = if grand_total > 0.0 {
                row_totals[i] * col_totals[j] / grand_total
            } else {
                0.0
            };
            if e <= 0.0 {
                return Err(AssociationError::DegenerateTable {
                    row: table.row_labels[i].clone(),
                    col: table.col_labels[j].clone(),
                });
            }
            expected[i][j] = e;
        }
    }

    let degrees_of_freedom = ((num_rows - 1) * (num_cols - 1)) as u64;
    let apply_yates = correction == ContinuityCorrection::Yates && degrees_of_freedom == 1;

    let mut statistic = 0.0;
    let mut low_expected_cells: usize = 0;
    for i in 0..num_rows {
        for j in 0..num_cols {
            let e = expected[i][j];
            let mut o = table.counts[i][j] as f64;
            if apply_yates {
                let diff = e - o;
                o += diff.signum() * diff.abs().min(0.5);
            }
            statistic += (o - e).powi(2) / e;
            if e < 5.0 {
                low_expected_cells += 1;
            }
        }
    }

    let dist = ChiSquared::new(degrees_of_freedom as f64).map_err(|e| {
        AssociationError::Distribution {
            message: e.to_string(),
        }
    })?;
    let p_value = dist.sf(statistic).clamp(0.0, 1.0);

    let min_dim = (num_rows.min(num_cols) - 1) as f64;
    let cramers_v = (statistic / (grand_total * min_dim)).sqrt();

    let res = TestResult {
        statistic,
        degrees_of_freedom,
        p_value,
        expected,
        cramers_v,
        low_expected_cells,
        correction,
    };
    if !res.approximation_is_reliable() {
        warn!(
            "chi_square_independence: {} of {} cells of {:?} x {:?} have an expected count below 5, the chi-squared approximation may be inaccurate",
            low_expected_cells,
            num_rows * num_cols,
            table.row_variable,
            table.col_variable
        );
    }
    debug!("chi_square_independence: {:?}", res);
    Ok(res)
}

/// Runs the full association analysis on a table: select, filter, recode,
/// drop incomplete rows, cross-tabulate and test.
pub fn run_association(
    table: &Table,
    request: &AssociationRequest,
) -> Result<AssociationOutcome, AssociationError> {
    info!(
        "run_association: {:?} x {:?} over {} rows",
        request.row_column,
        request.col_column,
        table.len()
    );
    let selected = select_columns(table, &request.row_column, &request.col_column)?;

    let row_raw: Vec<CellValue> = selected.records.iter().map(|r| r.values[0].clone()).collect();
    let col_raw: Vec<CellValue> = selected.records.iter().map(|r| r.values[1].clone()).collect();

    let row_categories = prepare_column(&row_raw, &request.row_filter, &request.row_recoding);
    let col_categories = prepare_column(&col_raw, &request.col_filter, &request.col_recoding);

    let recoded = RecodedTable::from_columns(
        &selected.row_ids(),
        vec![
            (request.row_variable().to_string(), row_categories),
            (request.col_variable().to_string(), col_categories),
        ],
    )?;
    let cases = drop_incomplete(&recoded);
    info!(
        "run_association: {} complete cases, {} rows dropped",
        cases.len(),
        cases.dropped
    );

    let contingency = build_contingency_at(&cases, 0, 1)?;
    let test = chi_square_independence_with(&contingency, request.correction)?;
    info!("run_association: {}", test);

    Ok(AssociationOutcome {
        contingency,
        test,
        complete_cases: cases.len(),
        dropped: cases.dropped,
    })
}

fn prepare_column(
    raw: &[CellValue],
    filter: &CategoryFilter,
    recoding: &Option<RecodingMap>,
) -> Vec<Category> {
    let filtered = filter_categories(raw, filter);
    match recoding {
        Some(m) => recode(&filtered, m),
        None => categorize(&filtered),
    }
}

#[cfg(test)]
mod tests {
    use super::builder::Builder;
    use super::*;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn trust_map() -> RecodingMap {
        [
            ("Tak - w pełni", "Positive"),
            ("Raczej tak", "Positive"),
            ("Raczej nie", "Negative"),
            ("Nie", "Negative"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    fn label(s: &str) -> Category {
        Category::Label(s.to_string())
    }

    fn close(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() < tol
    }

    #[test]
    fn recode_maps_known_labels_and_drops_the_rest() {
        let m = trust_map();
        for v in ["Tak - w pełni", "Raczej tak", "Raczej nie", "Nie", "Nie wiem", ""] {
            let res = recode(&[text(v)], &m);
            let expected = match m.get(v) {
                Some(b) => Category::Label(b.clone()),
                None => Category::Missing,
            };
            assert_eq!(res, vec![expected]);
        }
    }

    #[test]
    fn recode_is_literal_and_keeps_cardinality() {
        let m = trust_map();
        let column = vec![
            text("nie"),
            text(" Nie"),
            CellValue::Missing,
            text("Nie"),
            CellValue::Number(3.0),
        ];
        let res = recode(&column, &m);
        assert_eq!(
            res,
            vec![
                Category::Missing,
                Category::Missing,
                Category::Missing,
                label("Negative"),
                Category::Missing
            ]
        );
    }

    #[test]
    fn recode_matches_numbers_by_label() {
        let m: RecodingMap = [("5".to_string(), "High".to_string())].into_iter().collect();
        let res = recode(&[CellValue::Number(5.0), CellValue::Number(4.5)], &m);
        assert_eq!(res, vec![label("High"), Category::Missing]);
    }

    #[test]
    fn filter_rejects_excluded_labels() {
        let filter = CategoryFilter {
            include: None,
            exclude: vec!["65+".to_string()],
        };
        let res = filter_categories(&[text("18-24"), text("65+"), CellValue::Missing], &filter);
        assert_eq!(res, vec![text("18-24"), CellValue::Missing, CellValue::Missing]);

        let only = CategoryFilter {
            include: Some(vec!["Tak".to_string(), "Nie".to_string()]),
            exclude: vec![],
        };
        assert!(only.admits("Tak"));
        assert!(!only.admits("Wolę nie mówić"));
    }

    #[test]
    fn select_columns_keeps_rows_and_identity() {
        let mut builder = Builder::new(&["Wiek", "Płeć", "Trust"]).unwrap();
        builder.add_record(4, vec![text("18-24"), text("K"), text("Nie")]).unwrap();
        builder.add_record(9, vec![text("65+"), text("M"), CellValue::Missing]).unwrap();
        let table = builder.build();

        let res = select_columns(&table, "Trust", "Wiek").unwrap();
        assert_eq!(res.columns, vec!["Trust".to_string(), "Wiek".to_string()]);
        assert_eq!(res.row_ids(), vec![4, 9]);
        assert_eq!(res.records[1].values, vec![CellValue::Missing, text("65+")]);

        let err = select_columns(&table, "Wiek", "Dochód").unwrap_err();
        assert!(matches!(err, AssociationError::UnknownColumn { name, .. } if name == "Dochód"));
    }

    #[test]
    fn drop_incomplete_preserves_order() {
        let recoded = RecodedTable::from_columns(
            &[0, 1, 2, 3, 4],
            vec![
                (
                    "a".to_string(),
                    vec![label("x"), Category::Missing, label("y"), label("z"), label("x")],
                ),
                (
                    "b".to_string(),
                    vec![label("1"), label("2"), Category::Missing, label("3"), label("4")],
                ),
            ],
        )
        .unwrap();
        let cases = drop_incomplete(&recoded);
        assert_eq!(cases.dropped, 2);
        assert!(cases.len() <= recoded.rows.len());
        let ids: Vec<usize> = cases.rows.iter().map(|r| r.row_id).collect();
        assert_eq!(ids, vec![0, 3, 4]);
        assert_eq!(cases.rows[1].values, vec!["z".to_string(), "3".to_string()]);
    }

    #[test]
    fn from_columns_rejects_misaligned_columns() {
        let err = RecodedTable::from_columns(&[0, 1], vec![("a".to_string(), vec![label("x")])])
            .unwrap_err();
        assert_eq!(err, AssociationError::LengthMismatch { left: 2, right: 1 });
    }

    #[test]
    fn contingency_is_sorted_and_sums_to_cases() {
        let recoded = RecodedTable::from_columns(
            &[0, 1, 2, 3, 4, 5],
            vec![
                (
                    "Wiek".to_string(),
                    ["35-44", "18-24", "18-24", "35-44", "25-34", "18-24"]
                        .iter()
                        .map(|s| label(s))
                        .collect(),
                ),
                (
                    "Zapisuje".to_string(),
                    ["Tak", "Nie", "Tak", "Tak", "Nie", "Tak"]
                        .iter()
                        .map(|s| label(s))
                        .collect(),
                ),
            ],
        )
        .unwrap();
        let cases = drop_incomplete(&recoded);
        let ct = build_contingency(&cases, "Wiek", "Zapisuje").unwrap();
        assert_eq!(ct.row_labels, vec!["18-24", "25-34", "35-44"]);
        assert_eq!(ct.col_labels, vec!["Nie", "Tak"]);
        assert_eq!(ct.counts, vec![vec![1, 2], vec![1, 0], vec![0, 2]]);
        assert_eq!(ct.total(), cases.len() as u64);
        assert_eq!(ct.row_totals(), vec![3, 1, 2]);
        assert_eq!(ct.col_totals(), vec![2, 4]);
    }

    #[test]
    fn contingency_needs_two_categories() {
        let recoded = RecodedTable::from_columns(
            &[0, 1, 2],
            vec![
                ("a".to_string(), vec![label("x"), label("y"), label("x")]),
                ("b".to_string(), vec![label("Tak"), label("Tak"), Category::Missing]),
            ],
        )
        .unwrap();
        let err = build_contingency(&drop_incomplete(&recoded), "a", "b").unwrap_err();
        assert_eq!(
            err,
            AssociationError::InsufficientData {
                variable: "b".to_string(),
                distinct: 1
            }
        );
    }

    #[test]
    fn textbook_two_by_two() {
        init();
        let ct = ContingencyTable::from_counts(&["a", "b"], &["x", "y"], &[vec![10, 10], vec![20, 5]])
            .unwrap();
        let res = chi_square_independence(&ct).unwrap();
        assert!(close(res.statistic, 4.5, 1e-9));
        assert_eq!(res.degrees_of_freedom, 1);
        assert!(close(res.p_value, 0.033895, 1e-5));
        assert_eq!(res.to_string(), "χ² = 4.50, df = 1, p = 0.034");
        assert!(res.approximation_is_reliable());
    }

    #[test]
    fn yates_correction_only_for_one_degree_of_freedom() {
        let ct = ContingencyTable::from_counts(&["a", "b"], &["x", "y"], &[vec![10, 10], vec![20, 5]])
            .unwrap();
        let res = chi_square_independence_with(&ct, ContinuityCorrection::Yates).unwrap();
        assert!(close(res.statistic, 3.25125, 1e-9));
        assert!(close(res.p_value, 0.071369, 1e-5));

        let ct3 = ContingencyTable::from_counts(
            &["a", "b"],
            &["x", "y", "z"],
            &[vec![12, 5, 8], vec![7, 9, 3]],
        )
        .unwrap();
        let plain = chi_square_independence(&ct3).unwrap();
        let yates = chi_square_independence_with(&ct3, ContinuityCorrection::Yates).unwrap();
        assert_eq!(plain.statistic, yates.statistic);
        assert!(close(plain.statistic, 3.987337, 1e-5));
        assert!(close(plain.p_value, 0.136195, 1e-5));
    }

    #[test]
    fn expected_counts_preserve_the_total() {
        let ct = ContingencyTable::from_counts(
            &["a", "b", "c"],
            &["x", "y", "z", "w"],
            &[vec![3, 7, 1, 9], vec![4, 4, 12, 2], vec![8, 1, 6, 5]],
        )
        .unwrap();
        let res = chi_square_independence(&ct).unwrap();
        let sum: f64 = res.expected.iter().flatten().sum();
        assert!(close(sum, ct.total() as f64, 1e-9));
        assert_eq!(res.degrees_of_freedom, 6);
        for (i, r) in res.expected.iter().enumerate() {
            let row_sum: f64 = r.iter().sum();
            assert!(close(row_sum, ct.row_totals()[i] as f64, 1e-9));
        }
    }

    #[test]
    fn transposition_does_not_change_the_test() {
        let ct = ContingencyTable::from_counts(
            &["18-24", "25-34", "65+"],
            &["Negatywne", "Pozytywne"],
            &[vec![4, 11], vec![6, 9], vec![10, 3]],
        )
        .unwrap();
        let a = chi_square_independence(&ct).unwrap();
        let b = chi_square_independence(&ct.transpose()).unwrap();
        assert!(close(a.statistic, b.statistic, 1e-9));
        assert!(close(a.p_value, b.p_value, 1e-12));
        assert_eq!(a.degrees_of_freedom, b.degrees_of_freedom);
        assert_eq!(a.degrees_of_freedom, 2);
        assert_eq!(ct.transpose().transpose(), ct);
    }

    #[test]
    fn empty_column_is_degenerate() {
        let ct = ContingencyTable::from_counts(
            &["a", "b"],
            &["x", "y", "z"],
            &[vec![3, 0, 4], vec![5, 0, 2]],
        )
        .unwrap();
        let err = chi_square_independence(&ct).unwrap_err();
        assert_eq!(
            err,
            AssociationError::DegenerateTable {
                row: "a".to_string(),
                col: "y".to_string()
            }
        );

        let zeros = ContingencyTable::from_counts(&["a", "b"], &["x", "y"], &[vec![0, 0], vec![0, 0]])
            .unwrap();
        assert!(matches!(
            chi_square_independence(&zeros),
            Err(AssociationError::DegenerateTable { .. })
        ));
    }

    #[test]
    fn single_row_is_insufficient() {
        let ct = ContingencyTable::from_counts(&["a"], &["x", "y"], &[vec![3, 4]]).unwrap();
        assert!(matches!(
            chi_square_independence(&ct),
            Err(AssociationError::InsufficientData { distinct: 1, .. })
        ));
        let err = ContingencyTable::from_counts(&["a", "b"], &["x", "y"], &[vec![3, 4], vec![1]])
            .unwrap_err();
        assert_eq!(
            err,
            AssociationError::RaggedTable {
                row: 1,
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn small_tables_are_flagged() {
        init();
        let ct = ContingencyTable::from_counts(&["a", "b"], &["x", "y"], &[vec![1, 3], vec![4, 2]])
            .unwrap();
        let res = chi_square_independence(&ct).unwrap();
        assert_eq!(res.low_expected_cells, 4);
        assert!(!res.approximation_is_reliable());
    }

    #[test]
    fn age_by_trust_end_to_end() {
        init();
        let mut builder = Builder::new(&["Wiek", "Trust"]).unwrap();
        builder.add_row_simple(&["18-24", "Tak - w pełni"]).unwrap();
        builder.add_row_simple(&["18-24", "Nie"]).unwrap();
        builder.add_row_simple(&["25-34", "Raczej tak"]).unwrap();
        builder.add_row_simple(&["65+", "Raczej nie"]).unwrap();
        let table = builder.build();

        let mut request = AssociationRequest::new("Wiek", "Trust");
        request.col_recoding = Some(trust_map());
        request.col_label = Some("Trust_dych".to_string());
        let res = run_association(&table, &request).unwrap();

        assert_eq!(res.contingency.num_rows(), 3);
        assert_eq!(res.contingency.num_cols(), 2);
        assert_eq!(res.contingency.col_variable, "Trust_dych");
        assert_eq!(res.contingency.counts, vec![vec![1, 1], vec![0, 1], vec![1, 0]]);
        assert_eq!(res.complete_cases, 4);
        assert_eq!(res.dropped, 0);
        assert_eq!(res.test.to_string(), "χ² = 2.00, df = 2, p = 0.368");
    }

    #[test]
    fn unmapped_answers_are_dropped_before_testing() {
        let mut builder = Builder::new(&["Choroby", "Integracja"]).unwrap();
        for (a, b) in [
            ("Tak", "Tak, to byłoby bardzo pomocne"),
            ("Nie", "Nie"),
            ("Wolę nie mówić", "Może"),
            ("Tak", "Nie wiem"),
            ("Nie", "Może"),
            ("", "Nie"),
        ] {
            builder.add_row_simple(&[a, b]).unwrap();
        }
        let table = builder.build();
        let map: RecodingMap = [
            ("Tak, to byłoby bardzo pomocne", "Pozytywne"),
            ("Może", "Pozytywne"),
            ("Nie", "Negatywne"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        let mut request = AssociationRequest::new("Choroby", "Integracja");
        request.col_recoding = Some(map);
        request.row_filter = CategoryFilter {
            include: Some(vec!["Tak".to_string(), "Nie".to_string()]),
            exclude: vec![],
        };
        let res = run_association(&table, &request).unwrap();
        assert_eq!(res.complete_cases, 3);
        assert_eq!(res.dropped, 3);
        assert_eq!(res.contingency.row_labels, vec!["Nie", "Tak"]);
        assert_eq!(res.contingency.counts, vec![vec![1, 1], vec![0, 1]]);
    }
}
