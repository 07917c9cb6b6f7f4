/*!

This is the long-form manual for `survey_stats` and `survtab`.

## Overview

A survey export is a table: one row per respondent, one column per question.
The analyses of this crate take two columns of this table and answer the
question "are these two answers related?" with a chi-square test of
independence, or describe one answer per group of respondents.

An association analysis goes through the following steps:
1. select the two columns
2. optionally filter the raw answers of each column (`rowFilter`, `colFilter`)
3. optionally recode each column with a recoding map
4. drop the rows where one of the two values is missing or was not mapped
5. cross-tabulate the remaining rows (categories sorted lexically)
6. run the chi-square test on the contingency table

## Input formats

The following formats are supported:
* `xlsx` Excel workbooks, as exported by Google Forms or Microsoft Forms
* `csv` Comma Separated Values, the first line is the header

When the provider is not given, it is guessed from the extension of the file.

### `xlsx`

If the workbook has more than one worksheet, the name of the worksheet must
be provided, either in the analysis plan (`sheetName`) or on the command line
(`--excel-worksheet-name`). Dates are read as Excel serial numbers and error
cells (`#DIV/0!`, ...) are treated as missing answers.

### `csv`

Fields are read as text and empty fields are missing answers. A field keeps
its exact spelling as a category label: `01` and `1.50` only match the
recoding keys `"01"` and `"1.50"`. Numeric summaries (`groupMeans`) still
read `1.50` as a number.

Numbers stored in an Excel workbook are labelled without a fractional part
when they are integral: a rating stored as `5` matches the key `"5"`.

## Columns

Each column used by an analysis is described by:
* `position`: zero-based position of the column. It can be a number (`9`), a
  string holding a number (`"9"`) or Excel letters (`"J"`, `"AA"`).
* `name`: the exact content of the header cell.
* `label`: the name of the column in the analyses and in the reports.

At least one of `position` and `name` is required. If both are given, the
header cell at that position must hold the name: this catches spreadsheets
where the columns were reordered.

## Recoding maps

A recoding map turns raw answers into buckets, for example a 4-point scale
into two categories:

```json
{
  "Tak - w pełni": "Pozytywne",
  "Raczej tak": "Pozytywne",
  "Raczej nie": "Negatywne",
  "Nie": "Negatywne"
}
```

Keys are compared verbatim: `"nie"` and `"Nie "` do not match `"Nie"`. Answers
that are absent from the map become missing, and the row is left out of the
contingency table. Numbers are matched by their label, so a rating of `5`
matches the key `"5"`.

## Analyses

All the analyses share a `kind` and a `title`.

### `association`

| field | |
|-------|-|
| `rowColumn`, `colColumn` | the two columns |
| `rowRecoding`, `colRecoding` | names of recoding maps (optional) |
| `rowLabel`, `colLabel` | names of the recoded variables (optional) |
| `rowFilter`, `colFilter` | `{"include": [...], "exclude": [...]}` on raw answers (optional) |
| `continuityCorrection` | `"none"` (default) or `"yates"` |

The Yates correction only changes tables with one degree of freedom.

The test needs at least two categories on each side of the table. When more
than 20% of the cells have an expected count below 5, the report carries a
warning: the chi-square approximation is not reliable for such tables.

### `groupMeans`

Averages of numeric columns (`valueColumns`) for each group of
`groupColumn`, plus a total row over all the respondents (`totalLabel`,
`"Total"` by default). Means are rounded to 2 decimals.

### `answerShare`

Percentage of respondents of each group of `groupColumn` that gave exactly
`answer` in `answerColumn`, sorted by decreasing share. Respondents without
an answer count in the denominator.

### `distribution`

Distribution of the answers of `answerColumn` within each group of
`groupColumn`, in percent, with the number of answers per group. `groupOrder`
and `answerOrder` select and order the rows and columns.

### Charts

`groupMeans`, `answerShare` and `distribution` accept a `chart` field with the
path of a PNG file, relative to the analysis plan. The chart is a heatmap of
the means, a bar chart of the shares or stacked bars of the distribution.
Titles and labels need a system font: without one, `survtab` logs a warning
and writes the chart without text. The directory of the chart must exist.

## Output

For each analysis, `survtab` prints the title, the table and, for
associations, a line such as `χ² = 4.50, df = 1, p = 0.034`.

With `--out`, a JSON summary holds one entry per analysis. With
`--reference`, this summary is compared with a previous one and the
differences are printed.

An analysis that fails (not enough categories, a table with an empty row or
column) does not stop the other ones. `survtab` reports it and exits with an
error once all the analyses have run.

*/
