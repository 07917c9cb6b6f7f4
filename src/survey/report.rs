// Console and JSON renderings of the analyses.

use survey_stats::summary::{AnswerShare, Distribution, GroupMeans, MeanRow};

use crate::survey::*;

/// Lays out lines of cells in aligned columns.
///
/// The first column is left-aligned, the others are right-aligned.
fn render_grid(lines: &[Vec<String>]) -> String {
    let num_cols = lines.iter().map(|l| l.len()).max().unwrap_or(0);
    let widths: Vec<usize> = (0..num_cols)
        .map(|j| {
            lines
                .iter()
                .filter_map(|l| l.get(j))
                .map(|s| s.chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();
    lines
        .iter()
        .map(|l| {
            let cells: Vec<String> = l
                .iter()
                .enumerate()
                .map(|(j, s)| {
                    if j == 0 {
                        format!("{:<w$}", s, w = widths[j])
                    } else {
                        format!("{:>w$}", s, w = widths[j])
                    }
                })
                .collect();
            cells.join("  ").trim_end().to_string()
        })
        .collect::<Vec<String>>()
        .join("\n")
}

fn blank_line(first: &str, width: usize) -> Vec<String> {
    let mut l = vec![first.to_string()];
    l.extend(std::iter::repeat(String::new()).take(width));
    l
}

fn fmt_opt(x: &Option<f64>, decimals: usize) -> String {
    match x {
        Some(v) => format!("{:.d$}", v, d = decimals),
        None => "-".to_string(),
    }
}

pub fn render_contingency(table: &ContingencyTable) -> String {
    let mut lines: Vec<Vec<String>> = Vec::new();
    let mut header = vec![table.col_variable.clone()];
    header.extend(table.col_labels.iter().cloned());
    lines.push(header);
    lines.push(blank_line(&table.row_variable, table.num_cols()));
    for (label, counts) in table.row_labels.iter().zip(table.counts.iter()) {
        let mut l = vec![label.clone()];
        l.extend(counts.iter().map(|c| c.to_string()));
        lines.push(l);
    }
    render_grid(&lines)
}

pub fn render_association(title: &str, outcome: &AssociationOutcome) -> String {
    let mut res = format!(
        "{}\n{}\n\n{}",
        title,
        render_contingency(&outcome.contingency),
        outcome.test
    );
    if !outcome.test.approximation_is_reliable() {
        let num_cells = outcome.contingency.num_rows() * outcome.contingency.num_cols();
        res.push_str(&format!(
            "\nwarning: {} of {} cells have an expected count below 5",
            outcome.test.low_expected_cells, num_cells
        ));
    }
    res
}

pub fn association_to_json(title: &str, outcome: &AssociationOutcome) -> JSValue {
    let table = &outcome.contingency;
    let test = &outcome.test;
    let correction = match test.correction {
        ContinuityCorrection::Disabled => "none",
        ContinuityCorrection::Yates => "yates",
    };
    json!({
        "title": title,
        "kind": "association",
        "rowVariable": table.row_variable,
        "colVariable": table.col_variable,
        "rowLabels": table.row_labels,
        "colLabels": table.col_labels,
        "counts": table.counts,
        "expected": test.expected,
        "statistic": test.statistic,
        "df": test.degrees_of_freedom,
        "pValue": test.p_value,
        "cramersV": test.cramers_v,
        "lowExpectedCells": test.low_expected_cells,
        "correction": correction,
        "completeCases": outcome.complete_cases,
        "dropped": outcome.dropped,
    })
}

fn mean_line(row: &MeanRow) -> Vec<String> {
    let mut l = vec![row.label.clone()];
    l.extend(row.means.iter().map(|m| fmt_opt(m, 2)));
    l.push(row.count.to_string());
    l
}

pub fn render_group_means(title: &str, means: &GroupMeans) -> String {
    let mut header = vec![means.group_variable.clone()];
    header.extend(means.value_variables.iter().cloned());
    header.push("N".to_string());
    let mut lines = vec![header];
    lines.extend(means.groups.iter().map(mean_line));
    lines.push(mean_line(&means.total));
    format!("{}\n{}", title, render_grid(&lines))
}

fn mean_row_to_json(row: &MeanRow) -> JSValue {
    json!({"group": row.label, "means": row.means, "count": row.count})
}

pub fn group_means_to_json(title: &str, means: &GroupMeans) -> JSValue {
    let groups: Vec<JSValue> = means.groups.iter().map(mean_row_to_json).collect();
    json!({
        "title": title,
        "kind": "groupMeans",
        "groupVariable": means.group_variable,
        "valueVariables": means.value_variables,
        "groups": groups,
        "total": mean_row_to_json(&means.total),
    })
}

pub fn render_answer_share(title: &str, share: &AnswerShare) -> String {
    let mut lines = vec![vec![
        share.group_variable.clone(),
        format!("% {}", share.answer),
        "N".to_string(),
    ]];
    for s in share.shares.iter() {
        lines.push(vec![
            s.group.clone(),
            format!("{:.1}", s.percent),
            s.count.to_string(),
        ]);
    }
    format!("{}\n{}", title, render_grid(&lines))
}

pub fn answer_share_to_json(title: &str, share: &AnswerShare) -> JSValue {
    let shares: Vec<JSValue> = share
        .shares
        .iter()
        .map(|s| json!({"group": s.group, "percent": s.percent, "count": s.count}))
        .collect();
    json!({
        "title": title,
        "kind": "answerShare",
        "groupVariable": share.group_variable,
        "answer": share.answer,
        "shares": shares,
    })
}

pub fn render_distribution(title: &str, dist: &Distribution) -> String {
    let mut header = vec![dist.answer_variable.clone()];
    header.extend(dist.answers.iter().cloned());
    header.push("N".to_string());
    let mut lines = vec![header, blank_line(&dist.group_variable, dist.answers.len() + 1)];
    for row in dist.rows.iter() {
        let mut l = vec![row.group.clone()];
        l.extend(row.percents.iter().map(|p| fmt_opt(p, 1)));
        l.push(row.n.to_string());
        lines.push(l);
    }
    format!("{}\n{}", title, render_grid(&lines))
}

pub fn distribution_to_json(title: &str, dist: &Distribution) -> JSValue {
    let rows: Vec<JSValue> = dist
        .rows
        .iter()
        .map(|r| json!({"group": r.group, "percents": r.percents, "n": r.n}))
        .collect();
    json!({
        "title": title,
        "kind": "distribution",
        "groupVariable": dist.group_variable,
        "answerVariable": dist.answer_variable,
        "answers": dist.answers,
        "rows": rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use survey_stats::summary::GroupShare;

    fn outcome() -> AssociationOutcome {
        let contingency = ContingencyTable::from_counts(
            &["18-24", "25-34", "65+"],
            &["Negative", "Positive"],
            &[vec![1, 1], vec![0, 1], vec![1, 0]],
        )
        .unwrap()
        .with_variables("Wiek", "Zaufanie_dych");
        let test = chi_square_independence(&contingency).unwrap();
        AssociationOutcome {
            contingency,
            test,
            complete_cases: 4,
            dropped: 1,
        }
    }

    #[test]
    fn contingency_layout() {
        let o = outcome();
        let expected = [
            "Zaufanie_dych  Negative  Positive",
            "Wiek",
            "18-24                 1         1",
            "25-34                 0         1",
            "65+                   1         0",
        ]
        .join("\n");
        assert_eq!(render_contingency(&o.contingency), expected);
    }

    #[test]
    fn association_report() {
        let o = outcome();
        let text = render_association("Age by trust", &o);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Age by trust");
        assert_eq!(lines[6], "");
        assert_eq!(lines[7], "χ² = 2.00, df = 2, p = 0.368");
        assert_eq!(lines[8], "warning: 6 of 6 cells have an expected count below 5");

        let js = association_to_json("Age by trust", &o);
        assert_eq!(js["counts"], json!([[1, 1], [0, 1], [1, 0]]));
        assert_eq!(js["df"], json!(2));
        assert_eq!(js["correction"], json!("none"));
        assert_eq!(js["dropped"], json!(1));
    }

    #[test]
    fn share_layout() {
        let share = AnswerShare {
            group_variable: "Stan zdrowia".to_string(),
            answer: "Tak".to_string(),
            shares: vec![
                GroupShare {
                    group: "Zły".to_string(),
                    percent: 100.0,
                    count: 2,
                },
                GroupShare {
                    group: "Przeciętny".to_string(),
                    percent: 33.3,
                    count: 3,
                },
            ],
        };
        let text = render_answer_share("PDF", &share);
        let expected = [
            "PDF",
            "Stan zdrowia  % Tak  N",
            "Zły           100.0  2",
            "Przeciętny     33.3  3",
        ]
        .join("\n");
        assert_eq!(text, expected);
    }
}
