//! Descriptive summaries of survey answers, grouped by a categorical column.
//!
//! These tables complement the test of independence: average ratings per
//! group, the share of one answer per group and the full distribution of
//! answers per group.

use log::debug;

use std::collections::{BTreeMap, BTreeSet};

use crate::config::*;
use crate::categorize;

/// One row of a table of means. A mean over zero values is `None`.
#[derive(PartialEq, Debug, Clone)]
pub struct MeanRow {
    pub label: String,
    pub means: Vec<Option<f64>>,
    pub count: usize,
}

#[derive(PartialEq, Debug, Clone)]
pub struct GroupMeans {
    pub group_variable: String,
    pub value_variables: Vec<String>,
    pub groups: Vec<MeanRow>,
    /// Means over all the rows, including those without a group.
    pub total: MeanRow,
}

#[derive(PartialEq, Debug, Clone)]
pub struct GroupShare {
    pub group: String,
    pub percent: f64,
    pub count: usize,
}

#[derive(PartialEq, Debug, Clone)]
pub struct AnswerShare {
    pub group_variable: String,
    pub answer: String,
    /// Sorted by decreasing share.
    pub shares: Vec<GroupShare>,
}

#[derive(PartialEq, Debug, Clone)]
pub struct DistributionRow {
    pub group: String,
    /// Percentages per answer, `None` when the group has no answer at all.
    pub percents: Vec<Option<f64>>,
    pub n: u64,
}

#[derive(PartialEq, Debug, Clone)]
pub struct Distribution {
    pub group_variable: String,
    pub answer_variable: String,
    pub answers: Vec<String>,
    pub rows: Vec<DistributionRow>,
}

pub fn round_to(x: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (x * factor).round() / factor
}

/// Average of numeric columns per group, rounded to 2 decimals.
///
/// Cells that are not numbers are ignored, both in the groups and in the total.
pub fn group_means(
    table: &Table,
    group_column: &str,
    value_columns: &[String],
    total_label: &str,
) -> Result<GroupMeans, AssociationError> {
    let groups = categorize(&table.column(group_column)?);
    let mut values: Vec<Vec<Option<f64>>> = Vec::new();
    for name in value_columns.iter() {
        values.push(table.column(name)?.iter().map(|v| v.as_number()).collect());
    }

    let group_names: BTreeSet<&str> = groups.iter().filter_map(|g| g.as_label()).collect();
    debug!("group_means: groups {:?}", group_names);

    let mean_of = |keep: &dyn Fn(usize) -> bool| -> Vec<Option<f64>> {
        values
            .iter()
            .map(|col| {
                let selected: Vec<f64> = col
                    .iter()
                    .enumerate()
                    .filter(|(idx, _)| keep(*idx))
                    .filter_map(|(_, v)| *v)
                    .collect();
                if selected.is_empty() {
                    None
                } else {
                    let m = selected.iter().sum::<f64>() / selected.len() as f64;
                    Some(round_to(m, 2))
                }
            })
            .collect()
    };

    let rows: Vec<MeanRow> = group_names
        .iter()
        .map(|name| {
            let keep = |idx: usize| groups[idx].as_label() == Some(*name);
            MeanRow {
                label: name.to_string(),
                means: mean_of(&keep),
                count: groups.iter().filter(|g| g.as_label() == Some(*name)).count(),
            }
        })
        .collect();
    let total = MeanRow {
        label: total_label.to_string(),
        means: mean_of(&|_: usize| true),
        count: table.len(),
    };

    Ok(GroupMeans {
        group_variable: group_column.to_string(),
        value_variables: value_columns.to_vec(),
        groups: rows,
        total,
    })
}

/// Percentage of rows in each group that gave exactly `answer`, rounded to 1 decimal.
///
/// Rows with no answer stay in the denominator. Rows without a group are
/// ignored.
pub fn answer_share(
    table: &Table,
    group_column: &str,
    answer_column: &str,
    answer: &str,
) -> Result<AnswerShare, AssociationError> {
    let groups = categorize(&table.column(group_column)?);
    let answers = categorize(&table.column(answer_column)?);

    let mut tally: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    for (g, a) in groups.iter().zip(answers.iter()) {
        if let Category::Label(g) = g {
            let e = tally.entry(g.as_str()).or_insert((0, 0));
            e.1 += 1;
            if a.as_label() == Some(answer) {
                e.0 += 1;
            }
        }
    }

    let mut shares: Vec<GroupShare> = tally
        .iter()
        .map(|(g, (hits, count))| GroupShare {
            group: g.to_string(),
            percent: round_to(100.0 * (*hits as f64) / (*count as f64), 1),
            count: *count,
        })
        .collect();
    // Stable: equal shares keep the lexical order of the groups.
    shares.sort_by(|a, b| b.percent.total_cmp(&a.percent));

    Ok(AnswerShare {
        group_variable: group_column.to_string(),
        answer: answer.to_string(),
        shares,
    })
}

/// Distribution of the answers within each group, in percent (1 decimal).
///
/// Arguments:
/// * `group_order` the rows to show, in order. Groups absent from the data are
/// shown without counts. Defaults to all the groups, sorted.
/// * `answer_order` the answers to show, in order. Answers that are not shown
/// still count in the total of their group. Defaults to all the answers, sorted.
pub fn distribution(
    table: &Table,
    group_column: &str,
    answer_column: &str,
    group_order: Option<&[String]>,
    answer_order: Option<&[String]>,
) -> Result<Distribution, AssociationError> {
    let groups = categorize(&table.column(group_column)?);
    let answers = categorize(&table.column(answer_column)?);

    let mut counts: BTreeMap<&str, BTreeMap<&str, u64>> = BTreeMap::new();
    let mut all_answers: BTreeSet<&str> = BTreeSet::new();
    for (g, a) in groups.iter().zip(answers.iter()) {
        if let (Category::Label(g), Category::Label(a)) = (g, a) {
            *counts.entry(g.as_str()).or_default().entry(a.as_str()).or_insert(0) += 1;
            all_answers.insert(a.as_str());
        }
    }

    let shown_answers: Vec<String> = match answer_order {
        Some(l) => l.to_vec(),
        None => all_answers.iter().map(|s| s.to_string()).collect(),
    };
    let shown_groups: Vec<String> = match group_order {
        Some(l) => l.to_vec(),
        None => counts.keys().map(|s| s.to_string()).collect(),
    };

    let rows = shown_groups
        .iter()
        .map(|g| match counts.get(g.as_str()) {
            Some(per_answer) => {
                let n: u64 = per_answer.values().sum();
                DistributionRow {
                    group: g.clone(),
                    percents: shown_answers
                        .iter()
                        .map(|a| {
                            let c = per_answer.get(a.as_str()).cloned().unwrap_or(0);
                            Some(round_to(100.0 * (c as f64) / (n as f64), 1))
                        })
                        .collect(),
                    n,
                }
            }
            None => DistributionRow {
                group: g.clone(),
                percents: vec![None; shown_answers.len()],
                n: 0,
            },
        })
        .collect();

    Ok(Distribution {
        group_variable: group_column.to_string(),
        answer_variable: answer_column.to_string(),
        answers: shown_answers,
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::Builder;

    fn ratings_table() -> Table {
        let mut builder = Builder::new(&["Wiek", "Chatbot AI", "Motywacja"]).unwrap();
        let rows: Vec<(&str, CellValue, CellValue)> = vec![
            ("18-24", CellValue::Number(4.0), CellValue::Number(5.0)),
            ("18-24", CellValue::Number(5.0), CellValue::Text("brak".to_string())),
            ("25-34", CellValue::Text("3".to_string()), CellValue::Number(2.0)),
            ("", CellValue::Number(1.0), CellValue::Missing),
        ];
        for (idx, (g, a, b)) in rows.into_iter().enumerate() {
            let g = if g.is_empty() {
                CellValue::Missing
            } else {
                CellValue::Text(g.to_string())
            };
            builder.add_record(idx, vec![g, a, b]).unwrap();
        }
        builder.build()
    }

    #[test]
    fn means_per_group_and_total() {
        let table = ratings_table();
        let cols = vec!["Chatbot AI".to_string(), "Motywacja".to_string()];
        let res = group_means(&table, "Wiek", &cols, "Razem").unwrap();
        assert_eq!(res.groups.len(), 2);
        assert_eq!(res.groups[0].label, "18-24");
        assert_eq!(res.groups[0].means, vec![Some(4.5), Some(5.0)]);
        assert_eq!(res.groups[0].count, 2);
        assert_eq!(res.groups[1].means, vec![Some(3.0), Some(2.0)]);
        assert_eq!(res.total.label, "Razem");
        // (4 + 5 + 3 + 1) / 4 and (5 + 2) / 2
        assert_eq!(res.total.means, vec![Some(3.25), Some(3.5)]);
        assert_eq!(res.total.count, 4);
    }

    #[test]
    fn means_round_to_two_decimals() {
        let mut builder = Builder::new(&["g", "v"]).unwrap();
        for v in [1.0, 2.0, 2.0] {
            builder
                .add_record(0, vec![CellValue::Text("a".to_string()), CellValue::Number(v)])
                .unwrap();
        }
        let res = group_means(&builder.build(), "g", &["v".to_string()], "Total").unwrap();
        assert_eq!(res.groups[0].means, vec![Some(1.67)]);
    }

    #[test]
    fn share_counts_missing_answers_in_denominator() {
        let mut builder = Builder::new(&["Stan zdrowia", "Raport PDF"]).unwrap();
        let yes = "Tak – bardzo by mi się to przydało";
        for (g, a) in [
            ("Dobry", yes),
            ("Dobry", "Nie"),
            ("Dobry", ""),
            ("Zły", yes),
            ("Przeciętny", "Nie"),
            ("", yes),
        ] {
            builder.add_row_simple(&[g, a]).unwrap();
        }
        let res = answer_share(&builder.build(), "Stan zdrowia", "Raport PDF", yes).unwrap();
        let got: Vec<(String, f64, usize)> = res
            .shares
            .iter()
            .map(|s| (s.group.clone(), s.percent, s.count))
            .collect();
        assert_eq!(
            got,
            vec![
                ("Zły".to_string(), 100.0, 1),
                ("Dobry".to_string(), 33.3, 3),
                ("Przeciętny".to_string(), 0.0, 1),
            ]
        );
    }

    #[test]
    fn distribution_follows_requested_order() {
        let mut builder = Builder::new(&["Stan", "Odp"]).unwrap();
        for (g, a) in [
            ("Dobry", "Tak"),
            ("Dobry", "Tak"),
            ("Dobry", "Nie"),
            ("Dobry", "Może"),
            ("Zły", "Nie"),
            ("Zły", ""),
        ] {
            builder.add_row_simple(&[g, a]).unwrap();
        }
        let table = builder.build();
        let groups = vec!["Zły".to_string(), "Bardzo dobry".to_string(), "Dobry".to_string()];
        let answers = vec!["Tak".to_string(), "Nie".to_string()];
        let res = distribution(&table, "Stan", "Odp", Some(&groups), Some(&answers)).unwrap();
        assert_eq!(res.answers, answers);
        assert_eq!(res.rows[0].group, "Zły");
        assert_eq!(res.rows[0].percents, vec![Some(0.0), Some(100.0)]);
        assert_eq!(res.rows[0].n, 1);
        assert_eq!(res.rows[1].percents, vec![None, None]);
        assert_eq!(res.rows[1].n, 0);
        // "Może" is not shown but still counts in N.
        assert_eq!(res.rows[2].percents, vec![Some(50.0), Some(25.0)]);
        assert_eq!(res.rows[2].n, 4);

        let all = distribution(&table, "Stan", "Odp", None, None).unwrap();
        assert_eq!(all.answers, vec!["Może", "Nie", "Tak"]);
        assert_eq!(all.rows.len(), 2);
    }
}
