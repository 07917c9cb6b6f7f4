//! PNG charts of the summaries.
//!
//! Charts are 1200x800 bitmaps. The shapes are always drawn. Titles, axis
//! labels and legends need a system font: when none can be loaded, they are
//! left out with a warning and the chart is still written.

use crate::survey::*;

use plotters::coord::Shift;
use plotters::prelude::*;
use survey_stats::summary::{AnswerShare, Distribution, GroupMeans};

type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

const SIZE: (u32, u32) = (1200, 800);
const LOW: (u8, u8, u8) = (240, 248, 255);
const HIGH: (u8, u8, u8) = (8, 48, 107);
const NO_VALUE: RGBColor = RGBColor(220, 220, 220);

fn drawing_failed<E: std::fmt::Display>(path: &Path) -> impl Fn(E) -> SurveyError + '_ {
    move |e| SurveyError::DrawingChart {
        path: path.display().to_string(),
        message: e.to_string(),
    }
}

/// A white canvas with the title on top. Returns the area below the title.
fn canvas<'a>(path: &'a Path, title: &str) -> SurveyResult<Area<'a>> {
    let root = BitMapBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(drawing_failed(path))?;
    let (top, plot) = root.split_vertically(70);
    if let Err(e) = top.titled(title, ("sans-serif", 36)) {
        warn!("Chart {:?}: title not drawn: {}", path, e);
    }
    Ok(plot)
}

fn segment_label(labels: &[String], v: &SegmentValue<usize>) -> String {
    match v {
        SegmentValue::CenterOf(i) => labels.get(*i).cloned().unwrap_or_default(),
        _ => String::new(),
    }
}

fn bar(x: usize, from: f64, to: f64, style: ShapeStyle) -> Rectangle<(SegmentValue<usize>, f64)> {
    let mut r = Rectangle::new(
        [(SegmentValue::Exact(x), from), (SegmentValue::Exact(x + 1), to)],
        style,
    );
    r.set_margin(0, 0, 12, 12);
    r
}

fn shade(t: f64) -> RGBColor {
    let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
    RGBColor(mix(LOW.0, HIGH.0), mix(LOW.1, HIGH.1), mix(LOW.2, HIGH.2))
}

/// Heatmap of the means: one row per group (total last), one column per value.
pub fn group_means_heatmap(means: &GroupMeans, title: &str, path: &Path) -> SurveyResult<()> {
    let plot = canvas(path, title)?;
    let rows: Vec<_> = means.groups.iter().chain(std::iter::once(&means.total)).collect();
    // The first group is drawn at the top.
    let row_labels: Vec<String> = rows.iter().rev().map(|r| r.label.clone()).collect();
    let (nrows, ncols) = (rows.len(), means.value_variables.len());

    let values: Vec<f64> = rows.iter().flat_map(|r| r.means.iter().flatten().copied()).collect();
    let low = values.iter().copied().fold(f64::INFINITY, f64::min);
    let high = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let mut chart = ChartBuilder::on(&plot)
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(160)
        .build_cartesian_2d((0..ncols).into_segmented(), (0..nrows).into_segmented())
        .map_err(drawing_failed(path))?;
    let drawn = chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(ncols + 1)
        .y_labels(nrows + 1)
        .x_label_formatter(&|v| segment_label(&means.value_variables, v))
        .y_label_formatter(&|v| segment_label(&row_labels, v))
        .label_style(("sans-serif", 20))
        .draw();
    if let Err(e) = drawn {
        warn!("Chart {:?}: axis labels not drawn: {}", path, e);
    }

    let cells = rows.iter().enumerate().flat_map(|(r, row)| {
        let y = nrows - 1 - r;
        row.means.iter().enumerate().map(move |(c, m)| {
            let color = match m {
                Some(v) if high > low => shade((v - low) / (high - low)),
                Some(_) => shade(0.5),
                None => NO_VALUE,
            };
            Rectangle::new(
                [
                    (SegmentValue::Exact(c), SegmentValue::Exact(y)),
                    (SegmentValue::Exact(c + 1), SegmentValue::Exact(y + 1)),
                ],
                color.filled(),
            )
        })
    });
    chart.draw_series(cells).map_err(drawing_failed(path))?;
    plot.present().map_err(drawing_failed(path))?;
    info!("Wrote chart {:?}", path);
    Ok(())
}

/// One bar per group, 0 to 100%.
pub fn answer_share_chart(share: &AnswerShare, title: &str, path: &Path) -> SurveyResult<()> {
    let plot = canvas(path, title)?;
    let groups: Vec<String> = share.shares.iter().map(|s| s.group.clone()).collect();

    let mut chart = ChartBuilder::on(&plot)
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(80)
        .build_cartesian_2d((0..groups.len()).into_segmented(), 0f64..100f64)
        .map_err(drawing_failed(path))?;
    let y_desc = format!("% {}", share.answer);
    let drawn = chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(groups.len() + 1)
        .x_label_formatter(&|v| segment_label(&groups, v))
        .x_desc(share.group_variable.as_str())
        .y_desc(y_desc.as_str())
        .label_style(("sans-serif", 20))
        .draw();
    if let Err(e) = drawn {
        warn!("Chart {:?}: axis labels not drawn: {}", path, e);
    }

    chart
        .draw_series(
            share
                .shares
                .iter()
                .enumerate()
                .map(|(i, s)| bar(i, 0.0, s.percent, BLUE.mix(0.7).filled())),
        )
        .map_err(drawing_failed(path))?;
    plot.present().map_err(drawing_failed(path))?;
    info!("Wrote chart {:?}", path);
    Ok(())
}

/// One stacked bar per group, one colour per answer.
pub fn distribution_chart(dist: &Distribution, title: &str, path: &Path) -> SurveyResult<()> {
    let plot = canvas(path, title)?;
    let groups: Vec<String> = dist.rows.iter().map(|r| r.group.clone()).collect();

    let mut chart = ChartBuilder::on(&plot)
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(80)
        .right_y_label_area_size(20)
        .build_cartesian_2d((0..groups.len()).into_segmented(), 0f64..100f64)
        .map_err(drawing_failed(path))?;
    let drawn = chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(groups.len() + 1)
        .x_label_formatter(&|v| segment_label(&groups, v))
        .x_desc(dist.group_variable.as_str())
        .y_desc("%")
        .label_style(("sans-serif", 20))
        .draw();
    if let Err(e) = drawn {
        warn!("Chart {:?}: axis labels not drawn: {}", path, e);
    }

    // Where the next segment of each bar starts.
    let mut floor: Vec<f64> = vec![0.0; dist.rows.len()];
    for (k, answer) in dist.answers.iter().enumerate() {
        let color = Palette99::pick(k).to_rgba();
        let segments: Vec<_> = dist
            .rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let p = row.percents.get(k).copied().flatten().unwrap_or(0.0);
                let seg = bar(i, floor[i], floor[i] + p, color.filled());
                floor[i] += p;
                seg
            })
            .collect();
        chart
            .draw_series(segments)
            .map_err(drawing_failed(path))?
            .label(answer.as_str())
            .legend(move |(x, y)| Rectangle::new([(x, y - 6), (x + 12, y + 6)], color.filled()));
    }
    let legend = chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .label_font(("sans-serif", 20))
        .draw();
    if let Err(e) = legend {
        warn!("Chart {:?}: legend not drawn: {}", path, e);
    }
    plot.present().map_err(drawing_failed(path))?;
    info!("Wrote chart {:?}", path);
    Ok(())
}
