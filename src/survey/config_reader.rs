use crate::survey::*;

use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;
use std::collections::BTreeMap;

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct FileSource {
    /// "xlsx" or "csv". Inferred from the file extension when absent.
    pub provider: Option<String>,
    #[serde(rename = "filePath")]
    pub file_path: String,
    #[serde(rename = "sheetName")]
    pub sheet_name: Option<String>,
}

impl FileSource {
    pub fn provider(&self) -> String {
        match &self.provider {
            Some(p) => p.to_lowercase(),
            None => Path::new(&self.file_path)
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| e.to_lowercase())
                .unwrap_or_else(|| "xlsx".to_string()),
        }
    }
}

/// A column of the survey: where to find it and the name it gets in the analyses.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ColumnSpec {
    /// Zero-based position: a number, a numeric string or Excel letters ("B", "AA").
    #[serde(rename = "position")]
    _position: Option<JSValue>,
    /// Exact content of the header cell.
    pub name: Option<String>,
    pub label: String,
}

impl ColumnSpec {
    pub fn at_position(position: usize, label: &str) -> ColumnSpec {
        ColumnSpec {
            _position: Some(JSValue::from(position)),
            name: None,
            label: label.to_string(),
        }
    }

    pub fn named(name: &str, label: &str) -> ColumnSpec {
        ColumnSpec {
            _position: None,
            name: Some(name.to_string()),
            label: label.to_string(),
        }
    }

    pub fn position(&self) -> SurveyResult<Option<usize>> {
        read_js_int(&self._position, &self.label)
    }

    /// True when both specs designate the same column, whatever the notation
    /// of their positions.
    pub fn same_column(&self, other: &ColumnSpec) -> SurveyResult<bool> {
        Ok(self.position()? == other.position()? && self.name == other.name)
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct FilterSpec {
    pub include: Option<Vec<String>>,
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl FilterSpec {
    pub fn to_filter(&self) -> CategoryFilter {
        CategoryFilter {
            include: self.include.clone(),
            exclude: self.exclude.clone(),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct AssociationSpec {
    pub title: String,
    #[serde(rename = "rowColumn")]
    pub row_column: ColumnSpec,
    #[serde(rename = "colColumn")]
    pub col_column: ColumnSpec,
    #[serde(rename = "rowRecoding")]
    pub row_recoding: Option<String>,
    #[serde(rename = "colRecoding")]
    pub col_recoding: Option<String>,
    #[serde(rename = "rowLabel")]
    pub row_label: Option<String>,
    #[serde(rename = "colLabel")]
    pub col_label: Option<String>,
    #[serde(rename = "rowFilter")]
    pub row_filter: Option<FilterSpec>,
    #[serde(rename = "colFilter")]
    pub col_filter: Option<FilterSpec>,
    #[serde(rename = "continuityCorrection")]
    pub _continuity_correction: Option<String>,
}

impl AssociationSpec {
    pub fn continuity_correction(&self) -> SurveyResult<ContinuityCorrection> {
        match self._continuity_correction.as_deref() {
            None | Some("none") => Ok(ContinuityCorrection::Disabled),
            Some("yates") => Ok(ContinuityCorrection::Yates),
            Some(x) => whatever!(
                "analysis {:?}: unknown continuity correction {:?} (expected none or yates)",
                self.title,
                x
            ),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct GroupMeansSpec {
    pub title: String,
    #[serde(rename = "groupColumn")]
    pub group_column: ColumnSpec,
    #[serde(rename = "valueColumns")]
    pub value_columns: Vec<ColumnSpec>,
    #[serde(rename = "totalLabel")]
    pub total_label: Option<String>,
    /// PNG heatmap of the means.
    pub chart: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct AnswerShareSpec {
    pub title: String,
    #[serde(rename = "groupColumn")]
    pub group_column: ColumnSpec,
    #[serde(rename = "answerColumn")]
    pub answer_column: ColumnSpec,
    pub answer: String,
    /// PNG bar chart of the shares.
    pub chart: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct DistributionSpec {
    pub title: String,
    #[serde(rename = "groupColumn")]
    pub group_column: ColumnSpec,
    #[serde(rename = "answerColumn")]
    pub answer_column: ColumnSpec,
    #[serde(rename = "groupOrder")]
    pub group_order: Option<Vec<String>>,
    #[serde(rename = "answerOrder")]
    pub answer_order: Option<Vec<String>>,
    /// PNG stacked bar chart of the percentages.
    pub chart: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum AnalysisSpec {
    Association(AssociationSpec),
    GroupMeans(GroupMeansSpec),
    AnswerShare(AnswerShareSpec),
    Distribution(DistributionSpec),
}

impl AnalysisSpec {
    pub fn title(&self) -> &str {
        match self {
            AnalysisSpec::Association(a) => &a.title,
            AnalysisSpec::GroupMeans(a) => &a.title,
            AnalysisSpec::AnswerShare(a) => &a.title,
            AnalysisSpec::Distribution(a) => &a.title,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            AnalysisSpec::Association(_) => "association",
            AnalysisSpec::GroupMeans(_) => "groupMeans",
            AnalysisSpec::AnswerShare(_) => "answerShare",
            AnalysisSpec::Distribution(_) => "distribution",
        }
    }

    pub fn columns(&self) -> Vec<&ColumnSpec> {
        match self {
            AnalysisSpec::Association(a) => vec![&a.row_column, &a.col_column],
            AnalysisSpec::GroupMeans(a) => {
                let mut l = vec![&a.group_column];
                l.extend(a.value_columns.iter());
                l
            }
            AnalysisSpec::AnswerShare(a) => vec![&a.group_column, &a.answer_column],
            AnalysisSpec::Distribution(a) => vec![&a.group_column, &a.answer_column],
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct SurveyConfig {
    pub source: FileSource,
    #[serde(default)]
    pub recodings: BTreeMap<String, RecodingMap>,
    pub analyses: Vec<AnalysisSpec>,
}

impl SurveyConfig {
    /// All the columns needed by the analyses, each label once.
    ///
    /// The same label may be used by several analyses, as long as it always
    /// designates the same column.
    pub fn column_specs(&self) -> SurveyResult<Vec<ColumnSpec>> {
        let mut res: Vec<ColumnSpec> = Vec::new();
        for analysis in self.analyses.iter() {
            for spec in analysis.columns() {
                match res.iter().find(|s| s.label == spec.label) {
                    Some(existing) => {
                        ensure!(
                            existing.same_column(spec)?,
                            ConflictingColumnLabelSnafu {
                                label: spec.label.clone(),
                            }
                        );
                    }
                    None => res.push(spec.clone()),
                }
            }
        }
        Ok(res)
    }

    pub fn recoding(&self, title: &str, name: &Option<String>) -> SurveyResult<Option<RecodingMap>> {
        match name {
            None => Ok(None),
            Some(n) => self
                .recodings
                .get(n)
                .cloned()
                .map(Some)
                .context(UnknownRecodingSnafu { title, name: n }),
        }
    }
}

pub fn read_config(path: &str) -> BSurveyResult<SurveyConfig> {
    let contents = fs::read_to_string(path).context(OpeningConfigSnafu { path })?;
    let config: SurveyConfig =
        serde_json::from_str(contents.as_str()).context(ParsingConfigSnafu { path })?;
    debug!("read_config: {:?}", config);
    Ok(config)
}

pub fn read_summary(path: &str) -> BSurveyResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningConfigSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingConfigSnafu { path })?;
    Ok(js)
}

fn read_js_int(x: &Option<JSValue>, label: &str) -> SurveyResult<Option<usize>> {
    match x {
        None => Ok(None),
        Some(JSValue::Number(n)) => n
            .as_u64()
            .map(|x| Some(x as usize))
            .context(InvalidColumnPositionSnafu {
                label,
                position: n.to_string(),
            }),
        // Parsing the Excel-style columns: A is 0, Z is 25, AA is 26.
        Some(JSValue::String(s)) if !s.is_empty() && s.chars().all(|c| c.is_ascii_alphabetic()) => {
            let n = s.to_ascii_uppercase().chars().try_fold(0usize, |acc, c| {
                acc.checked_mul(26)?
                    .checked_add(c as usize - 'A' as usize + 1)
            });
            n.map(|x| Some(x - 1)).context(InvalidColumnPositionSnafu {
                label,
                position: s.clone(),
            })
        }
        Some(JSValue::String(s)) => s
            .trim()
            .parse::<usize>()
            .ok()
            .map(Some)
            .context(InvalidColumnPositionSnafu {
                label,
                position: s.clone(),
            }),
        Some(other) => InvalidColumnPositionSnafu {
            label,
            position: other.to_string(),
        }
        .fail(),
    }
}
