use std::path::PathBuf;

use bcrp_store::SeriesTable;
use plotters::prelude::*;
use serde::Serialize;
use tracing::info;

use super::RenderError;
use crate::client::period::parse_period_label;

const WIDTH: u32 = 1440;
const HEIGHT: u32 = 720;
const FOOTER_HEIGHT: u32 = 36;
const X_LABELS: usize = 12;

const PALETTE: [RGBColor; 5] = [
    RGBColor(0x1a, 0x5f, 0xb4),
    RGBColor(0xe0, 0x1b, 0x24),
    RGBColor(0x33, 0xd1, 0x7a),
    RGBColor(0xff, 0x78, 0x00),
    RGBColor(0x91, 0x41, 0xac),
];
const TITLE_COLOR: RGBColor = RGBColor(0x2c, 0x3e, 0x50);
const AXIS_COLOR: RGBColor = RGBColor(0x34, 0x49, 0x5e);
const FOOTER_COLOR: RGBColor = RGBColor(0x7f, 0x8c, 0x8d);

/// What to draw and where.
#[derive(Debug, Clone)]
pub struct ChartSpec {
    pub title: String,
    /// Legend label per column, positionally aligned with the table codes.
    pub labels: Vec<String>,
    pub output: PathBuf,
}

impl ChartSpec {
    /// Default title and output location for a chart of `codes`.
    #[must_use]
    pub fn for_codes(codes: &[String]) -> Self {
        let first = codes.first().map_or("serie", String::as_str);
        Self {
            title: format!("Serie BCRP: {first}"),
            labels: codes.to_vec(),
            output: std::env::temp_dir().join(format!("bcrp_chart_{first}.svg")),
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    #[must_use]
    pub fn with_labels(mut self, labels: Vec<String>) -> Self {
        self.labels = labels;
        self
    }

    #[must_use]
    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = output.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartOutput {
    pub path: PathBuf,
    pub series: Vec<String>,
    pub points: usize,
}

/// Draws one line per table column into an SVG file.
///
/// The first series gets a translucent area fill. X ticks show period labels
/// converted to `Mon YYYY` when they parse.
///
/// # Errors
/// Returns `RenderError::NoData` when the table has no numeric values,
/// `RenderError::Io` when the output directory cannot be created, and
/// `RenderError::Draw` for backend failures.
pub fn render_line_chart(table: &SeriesTable, spec: &ChartSpec) -> Result<ChartOutput, RenderError> {
    let columns: Vec<Vec<(f64, f64)>> = (0..table.codes.len())
        .map(|idx| {
            table
                .column(idx)
                .into_iter()
                .enumerate()
                .filter_map(|(x, value)| value.map(|y| (index_to_f64(x), y)))
                .collect()
        })
        .collect();
    let (y_min, y_max) = value_range(&columns).ok_or(RenderError::NoData)?;
    let x_max = index_to_f64(table.observations.len().saturating_sub(1)).max(1.0);

    if let Some(parent) = spec.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let tick_labels: Vec<String> = table
        .observations
        .iter()
        .map(|obs| tick_label(&obs.period))
        .collect();
    let draw = |err: &dyn std::fmt::Display| RenderError::Draw(err.to_string());

    let root = SVGBackend::new(&spec.output, (WIDTH, HEIGHT)).into_drawing_area();
    root.fill(&WHITE).map_err(|err| draw(&err))?;
    let (plot_area, footer_area) = root.split_vertically(HEIGHT - FOOTER_HEIGHT);

    let mut chart = ChartBuilder::on(&plot_area)
        .caption(
            &spec.title,
            ("sans-serif", 28).into_font().color(&TITLE_COLOR),
        )
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(80)
        .build_cartesian_2d(0.0..x_max, y_min..y_max)
        .map_err(|err| draw(&err))?;

    let format_x = |x: &f64| {
        tick_labels
            .get(f64_to_index(*x))
            .cloned()
            .unwrap_or_default()
    };
    chart
        .configure_mesh()
        .x_desc("Periodo")
        .y_desc("Valor")
        .axis_desc_style(("sans-serif", 18).into_font().color(&AXIS_COLOR))
        .x_labels(X_LABELS.min(tick_labels.len().max(2)))
        .x_label_formatter(&format_x)
        .light_line_style(BLACK.mix(0.05))
        .bold_line_style(BLACK.mix(0.12))
        .draw()
        .map_err(|err| draw(&err))?;

    let mut points = 0;
    for (idx, series) in columns.iter().enumerate() {
        if series.is_empty() {
            continue;
        }
        points += series.len();
        let color = PALETTE[idx % PALETTE.len()];
        let label = spec
            .labels
            .get(idx)
            .cloned()
            .unwrap_or_else(|| table.column_name(idx));

        if idx == 0 {
            chart
                .draw_series(AreaSeries::new(
                    series.iter().copied(),
                    y_min,
                    color.mix(0.15).filled(),
                ))
                .map_err(|err| draw(&err))?;
        }
        chart
            .draw_series(LineSeries::new(series.iter().copied(), color.stroke_width(3)))
            .map_err(|err| draw(&err))?
            .label(label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 24, y)], color.stroke_width(3)));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.95))
        .border_style(BLACK.mix(0.2))
        .draw()
        .map_err(|err| draw(&err))?;

    footer_area
        .draw(&Text::new(
            format!("Fuente: BCRP | Series: {}", table.codes.join(", ")),
            (20, 8),
            ("sans-serif", 14).into_font().color(&FOOTER_COLOR),
        ))
        .map_err(|err| draw(&err))?;

    root.present().map_err(|err| draw(&err))?;
    info!(path = %spec.output.display(), points, "chart saved");

    Ok(ChartOutput {
        path: spec.output.clone(),
        series: table.codes.clone(),
        points,
    })
}

fn tick_label(period: &str) -> String {
    parse_period_label(period).map_or_else(
        || period.to_string(),
        |date| date.format("%b %Y").to_string(),
    )
}

fn value_range(columns: &[Vec<(f64, f64)>]) -> Option<(f64, f64)> {
    let mut values = columns.iter().flatten().map(|(_, y)| *y);
    let first = values.next()?;
    let (min, max) = values.fold((first, first), |(lo, hi), y| (lo.min(y), hi.max(y)));
    let pad = if (max - min).abs() < f64::EPSILON {
        1.0
    } else {
        (max - min) * 0.05
    };
    Some((min - pad, max + pad))
}

#[allow(clippy::cast_precision_loss)]
const fn index_to_f64(idx: usize) -> f64 {
    idx as f64
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn f64_to_index(x: f64) -> usize {
    if x.is_finite() && x >= 0.0 {
        x.round() as usize
    } else {
        usize::MAX
    }
}
