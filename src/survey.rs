mod charts;
pub mod config_reader;
mod io_common;
mod io_csv;
mod io_xlsx;
mod report;

use log::{debug, info, warn};

use snafu::prelude::*;
use survey_stats::summary::{answer_share, distribution, group_means};
use survey_stats::*;

use std::fs;
use std::path::{Path, PathBuf};

use calamine::{open_workbook, Reader, Xlsx};

use serde_json::json;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::survey::config_reader::*;
use crate::survey::io_common::RawSheet;

#[derive(Debug, Snafu)]
pub enum SurveyError {
    // Loading the data
    #[snafu(display("Error opening workbook {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("Worksheet {sheet_name:?} not found in {path} (available worksheets: {available:?})"))]
    MissingWorksheet {
        path: String,
        sheet_name: String,
        available: Vec<String>,
    },
    #[snafu(display("{path} contains {count} worksheets, the worksheet name must be provided"))]
    AmbiguousWorksheet { path: String, count: usize },
    #[snafu(display("The worksheet {sheet_name:?} of {path} has no header row"))]
    EmptySheet { path: String, sheet_name: String },
    #[snafu(display("Error opening CSV file {path}"))]
    OpeningCsv { source: csv::Error, path: String },
    #[snafu(display("Error reading CSV file {path} at line {lineno}"))]
    CsvRecord {
        source: csv::Error,
        path: String,
        lineno: usize,
    },
    #[snafu(display("Unknown input provider {provider:?}: expected xlsx or csv"))]
    UnknownProvider { provider: String },
    #[snafu(display("Error opening {path}"))]
    OpeningConfig {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing {path}"))]
    ParsingConfig {
        source: serde_json::Error,
        path: String,
    },

    // Mapping the columns
    #[snafu(display("Column {label:?}: position {position} is out of range, sheet {sheet:?} has {width} columns"))]
    ColumnOutOfRange {
        label: String,
        position: usize,
        sheet: String,
        width: usize,
    },
    #[snafu(display("Column {label:?}: no header cell named {name:?} in sheet {sheet:?}"))]
    ColumnNotInHeader {
        label: String,
        name: String,
        sheet: String,
    },
    #[snafu(display("Column {label:?}: expected header {expected:?} at position {position}, found {found:?}"))]
    ColumnHeaderMismatch {
        label: String,
        position: usize,
        expected: String,
        found: Option<String>,
    },
    #[snafu(display("Column {label:?}: cannot understand position {position}"))]
    InvalidColumnPosition { label: String, position: String },
    #[snafu(display("Column {label:?}: a position or a header name is required"))]
    MissingColumnReference { label: String },
    #[snafu(display("Column label {label:?} designates two different columns"))]
    ConflictingColumnLabel { label: String },

    // Running the analyses
    #[snafu(display("Analysis {title:?} refers to an unknown recoding {name:?}"))]
    UnknownRecoding { title: String, name: String },
    #[snafu(display("Analysis {title:?} ({columns}, recoding: {recoding}): {source}"))]
    Analysis {
        source: AssociationError,
        title: String,
        columns: String,
        recoding: String,
    },
    #[snafu(display("{failed} of {total} analyses failed"))]
    AnalysesFailed { failed: usize, total: usize },

    // Output
    #[snafu(display("Error writing the summary to {path}"))]
    WritingSummary {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error serializing the summary"))]
    SerializingSummary { source: serde_json::Error },
    #[snafu(display("Error drawing the chart {path}: {message}"))]
    DrawingChart { path: String, message: String },
    #[snafu(display("Difference detected between the computed summary and the reference summary {path}"))]
    ReferenceMismatch { path: String },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type SurveyResult<T> = Result<T, SurveyError>;
pub type BSurveyResult<T> = Result<T, Box<SurveyError>>;

/// Command line values that take precedence over the source of the analysis plan.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct SourceOverrides {
    pub input: Option<String>,
    pub input_type: Option<String>,
    pub worksheet_name: Option<String>,
}

/// The outcome of one configured analysis.
#[derive(Debug)]
pub struct AnalysisOutcome {
    pub title: String,
    pub kind: &'static str,
    pub result: SurveyResult<AnalysisReport>,
}

/// The printed and the JSON form of a successful analysis.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub text: String,
    pub json: JSValue,
}

fn resolve_source(
    config: &SurveyConfig,
    config_dir: &Path,
    overrides: &SourceOverrides,
) -> FileSource {
    let file_path = match &overrides.input {
        Some(p) => p.clone(),
        None => {
            let p: PathBuf = config_dir.join(&config.source.file_path);
            p.as_path().display().to_string()
        }
    };
    FileSource {
        provider: overrides
            .input_type
            .clone()
            .or_else(|| config.source.provider.clone()),
        file_path,
        sheet_name: overrides
            .worksheet_name
            .clone()
            .or_else(|| config.source.sheet_name.clone()),
    }
}

/// Loads the requested columns of the survey.
///
/// The file is closed when this function returns, whether the columns could
/// be found or not.
pub fn load_table(source: &FileSource, columns: &[ColumnSpec]) -> BSurveyResult<Table> {
    info!(
        "Attempting to read survey file {:?} (worksheet {:?})",
        source.file_path, source.sheet_name
    );
    let sheet: RawSheet = match source.provider().as_str() {
        "xlsx" => io_xlsx::read_xlsx(&source.file_path, source.sheet_name.as_deref())?,
        "csv" => io_csv::read_csv(&source.file_path)?,
        x => {
            return Err(Box::new(SurveyError::UnknownProvider {
                provider: x.to_string(),
            }))
        }
    };
    let table = io_common::select_table(&sheet, columns)?;
    info!(
        "Loaded {} rows and {} columns from {:?}",
        table.len(),
        table.columns.len(),
        source.file_path
    );
    Ok(table)
}

fn describe_recoding(row: &Option<String>, col: &Option<String>) -> String {
    match (row, col) {
        (None, None) => "none".to_string(),
        (Some(r), None) => format!("rows: {}", r),
        (None, Some(c)) => format!("columns: {}", c),
        (Some(r), Some(c)) => format!("rows: {}, columns: {}", r, c),
    }
}

fn run_association_spec(
    table: &Table,
    config: &SurveyConfig,
    spec: &AssociationSpec,
) -> SurveyResult<AnalysisReport> {
    let request = AssociationRequest {
        row_column: spec.row_column.label.clone(),
        col_column: spec.col_column.label.clone(),
        row_recoding: config.recoding(&spec.title, &spec.row_recoding)?,
        col_recoding: config.recoding(&spec.title, &spec.col_recoding)?,
        row_filter: spec
            .row_filter
            .as_ref()
            .map(|f| f.to_filter())
            .unwrap_or_default(),
        col_filter: spec
            .col_filter
            .as_ref()
            .map(|f| f.to_filter())
            .unwrap_or_default(),
        row_label: spec.row_label.clone(),
        col_label: spec.col_label.clone(),
        correction: spec.continuity_correction()?,
    };
    let outcome = run_association(table, &request).context(AnalysisSnafu {
        title: spec.title.clone(),
        columns: format!("{} x {}", request.row_column, request.col_column),
        recoding: describe_recoding(&spec.row_recoding, &spec.col_recoding),
    })?;
    Ok(AnalysisReport {
        text: report::render_association(&spec.title, &outcome),
        json: report::association_to_json(&spec.title, &outcome),
    })
}

/// Adds the file name of a chart to the JSON form of its analysis.
fn with_chart(mut js: JSValue, chart: &Option<String>) -> JSValue {
    if let Some(c) = chart {
        js["chart"] = json!(io_common::simplify_file_name(c));
    }
    js
}

fn run_one(
    table: &Table,
    config: &SurveyConfig,
    config_dir: &Path,
    analysis: &AnalysisSpec,
) -> SurveyResult<AnalysisReport> {
    let title = analysis.title().to_string();
    let columns: Vec<String> = analysis.columns().iter().map(|c| c.label.clone()).collect();
    let summary_context = AnalysisSnafu {
        title: title.clone(),
        columns: columns.join(" x "),
        recoding: "none".to_string(),
    };
    match analysis {
        AnalysisSpec::Association(spec) => run_association_spec(table, config, spec),
        AnalysisSpec::GroupMeans(spec) => {
            let value_columns: Vec<String> =
                spec.value_columns.iter().map(|c| c.label.clone()).collect();
            let means = group_means(
                table,
                &spec.group_column.label,
                &value_columns,
                spec.total_label.as_deref().unwrap_or("Total"),
            )
            .context(summary_context)?;
            if let Some(c) = &spec.chart {
                charts::group_means_heatmap(&means, &title, &config_dir.join(c))?;
            }
            Ok(AnalysisReport {
                text: report::render_group_means(&title, &means),
                json: with_chart(report::group_means_to_json(&title, &means), &spec.chart),
            })
        }
        AnalysisSpec::AnswerShare(spec) => {
            let share = answer_share(
                table,
                &spec.group_column.label,
                &spec.answer_column.label,
                &spec.answer,
            )
            .context(summary_context)?;
            if let Some(c) = &spec.chart {
                charts::answer_share_chart(&share, &title, &config_dir.join(c))?;
            }
            Ok(AnalysisReport {
                text: report::render_answer_share(&title, &share),
                json: with_chart(report::answer_share_to_json(&title, &share), &spec.chart),
            })
        }
        AnalysisSpec::Distribution(spec) => {
            let dist = distribution(
                table,
                &spec.group_column.label,
                &spec.answer_column.label,
                spec.group_order.as_deref(),
                spec.answer_order.as_deref(),
            )
            .context(summary_context)?;
            if let Some(c) = &spec.chart {
                charts::distribution_chart(&dist, &title, &config_dir.join(c))?;
            }
            Ok(AnalysisReport {
                text: report::render_distribution(&title, &dist),
                json: with_chart(report::distribution_to_json(&title, &dist), &spec.chart),
            })
        }
    }
}

/// Runs all the analyses of a plan on an already loaded table.
///
/// A failing analysis does not prevent the other ones from running. Chart
/// paths are relative to `config_dir`.
pub fn run_plan(table: &Table, config: &SurveyConfig, config_dir: &Path) -> Vec<AnalysisOutcome> {
    config
        .analyses
        .iter()
        .map(|analysis| {
            debug!("run_plan: running {:?}", analysis);
            let result = run_one(table, config, config_dir, analysis);
            if let Err(e) = &result {
                warn!("Analysis {:?} failed: {}", analysis.title(), e);
            }
            AnalysisOutcome {
                title: analysis.title().to_string(),
                kind: analysis.kind(),
                result,
            }
        })
        .collect()
}

fn build_summary_js(source: &FileSource, outcomes: &[AnalysisOutcome]) -> JSValue {
    let analyses: Vec<JSValue> = outcomes
        .iter()
        .map(|o| match &o.result {
            Ok(r) => r.json.clone(),
            Err(e) => json!({"title": o.title, "kind": o.kind, "error": e.to_string()}),
        })
        .collect();
    json!({
        "source": {
            "file": io_common::simplify_file_name(&source.file_path),
            "worksheet": source.sheet_name,
        },
        "analyses": analyses
    })
}

fn write_summary(pretty_js: &str, out: &str) -> BSurveyResult<()> {
    if out == "stdout" {
        println!("{}", pretty_js);
    } else {
        info!("Writing summary to {:?}", out);
        fs::write(out, pretty_js).context(WritingSummarySnafu { path: out })?;
    }
    Ok(())
}

fn check_reference(pretty_js: &str, reference: &str) -> BSurveyResult<()> {
    let summary_ref = read_summary(reference)?;
    let pretty_js_summary_ref =
        serde_json::to_string_pretty(&summary_ref).context(SerializingSummarySnafu {})?;
    if pretty_js_summary_ref != pretty_js {
        warn!("Found differences with the reference summary");
        print_diff(pretty_js_summary_ref.as_str(), pretty_js, "\n");
        return Err(Box::new(SurveyError::ReferenceMismatch {
            path: reference.to_string(),
        }));
    }
    info!("The summary matches the reference {:?}", reference);
    Ok(())
}

/// Reads the analysis plan, runs every analysis and prints the reports.
pub fn run_analyses(
    config_path: &str,
    overrides: &SourceOverrides,
    out: Option<String>,
    check_summary_path: Option<String>,
) -> BSurveyResult<()> {
    let config = read_config(config_path)?;
    info!("config: {:?}", config);
    let config_dir = Path::new(config_path).parent().unwrap_or_else(|| Path::new(""));
    let source = resolve_source(&config, config_dir, overrides);

    let columns = config.column_specs()?;
    let table = load_table(&source, &columns)?;

    let outcomes = run_plan(&table, &config, config_dir);
    for o in outcomes.iter() {
        match &o.result {
            Ok(r) => println!("{}\n", r.text),
            Err(e) => eprintln!("{}\n{}\n", o.title, e),
        }
    }

    let result_js = build_summary_js(&source, &outcomes);
    let pretty_js = serde_json::to_string_pretty(&result_js).context(SerializingSummarySnafu {})?;
    if let Some(out_p) = out {
        write_summary(&pretty_js, &out_p)?;
    }
    // The reference summary, if provided for comparison
    if let Some(summary_p) = check_summary_path {
        check_reference(&pretty_js, &summary_p)?;
    }

    let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
    if failed > 0 {
        return Err(Box::new(SurveyError::AnalysesFailed {
            failed,
            total: outcomes.len(),
        }));
    }
    Ok(())
}
