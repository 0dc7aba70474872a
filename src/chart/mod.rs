//! Line chart scene: every country's series on shared time and case axes.

mod scale;

pub use scale::{compact_count, CaseAxis, ScaleKind, TimeAxis};

use crate::braille::{draw_line, BrailleCanvas};
use crate::color::CATEGORY10;
use crate::locate::{locate, Located, Metric};
use crate::reshape::{CountrySeries, Observation, Reshaped};

/// How far (in braille pixels) the pointer may sit from a line and still
/// hover it
pub const HOVER_TOLERANCE_PX: f64 = 6.0;

/// Value drawn for sample `idx` under `metric`
fn plotted_value(series: &CountrySeries, idx: usize, metric: Metric) -> i64 {
    match metric {
        Metric::Cumulative => series.get(idx).map_or(0, Observation::signed_cases),
        Metric::Daily => series.daily_delta(idx).unwrap_or(0),
    }
}

/// Largest plotted value across all countries
pub fn metric_max(reshaped: &Reshaped, metric: Metric) -> u64 {
    match metric {
        Metric::Cumulative => reshaped.max_cases(),
        Metric::Daily => reshaped
            .series_by_country
            .values()
            .flat_map(|s| (0..s.len()).map(move |i| plotted_value(s, i, metric)))
            .max()
            .unwrap_or(0)
            .max(0) as u64,
    }
}

/// Both axes sized to a plot area in braille pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartAxes {
    pub time: TimeAxis,
    pub cases: CaseAxis,
}

impl ChartAxes {
    /// `None` when the feed has no dates to span
    pub fn new(reshaped: &Reshaped, max: u64, scale: ScaleKind, width: usize, height: usize) -> Option<Self> {
        let (start, end) = reshaped.date_extent()?;
        Some(Self {
            time: TimeAxis::new(start, end, width),
            cases: CaseAxis::new(scale, max, height),
        })
    }
}

/// One Braille layer per palette color, plus the focused country on top
pub struct ChartFrame {
    pub layers: Vec<BrailleCanvas>,
    pub focus: Option<BrailleCanvas>,
}

fn draw_series(canvas: &mut BrailleCanvas, series: &CountrySeries, metric: Metric, axes: &ChartAxes) {
    let mut prev: Option<(i32, i32)> = None;
    for (idx, obs) in series.observations().iter().enumerate() {
        let x = axes.time.x(obs.date).round() as i32;
        let y = axes.cases.y(plotted_value(series, idx, metric) as f64).round() as i32;
        match prev {
            Some((px, py)) => draw_line(canvas, px, py, x, y),
            None => canvas.set_pixel(x, y),
        }
        prev = Some((x, y));
    }
}

/// Draw every series into `width` x `height` cells. Country `i` (in name
/// order) uses palette color `i % 10`.
pub fn render_chart(
    reshaped: &Reshaped,
    metric: Metric,
    axes: &ChartAxes,
    width: usize,
    height: usize,
    focus: Option<&str>,
) -> ChartFrame {
    let mut layers = vec![BrailleCanvas::new(width, height); CATEGORY10.len()];
    let mut focus_layer = None;

    for (idx, (name, series)) in reshaped.series_by_country.iter().enumerate() {
        if focus == Some(name.as_str()) {
            let mut canvas = BrailleCanvas::new(width, height);
            draw_series(&mut canvas, series, metric, axes);
            focus_layer = Some(canvas);
            continue;
        }
        draw_series(&mut layers[idx % CATEGORY10.len()], series, metric, axes);
    }

    ChartFrame {
        layers,
        focus: focus_layer,
    }
}

/// Country line under the pointer and its nearest sample
#[derive(Debug, Clone, Copy)]
pub struct ChartHit<'a> {
    pub country: &'a str,
    pub located: Located<'a>,
}

/// Find the line closest to the pointer row at the pointer's date. Ties
/// go to the first country in name order.
pub fn hit_test<'a>(
    reshaped: &'a Reshaped,
    metric: Metric,
    axes: &ChartAxes,
    px: f64,
    py: f64,
    tolerance: f64,
) -> Option<ChartHit<'a>> {
    let query = axes.time.date_at(px);
    reshaped
        .series_by_country
        .iter()
        .filter_map(|(name, series)| {
            let located = locate(series, query).ok()?;
            let dist = (axes.cases.y(located.value(metric) as f64) - py).abs();
            (dist <= tolerance).then_some((dist, name.as_str(), located))
        })
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, country, located)| ChartHit { country, located })
}
