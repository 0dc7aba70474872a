use crate::chart::{self, ChartAxes, ScaleKind, HOVER_TOLERANCE_PX};
use crate::config::DashboardConfig;
use crate::data::feed::Feed;
use crate::error::{DataError, DataResult};
use crate::locate::Metric;
use crate::map::{ChoroplethRenderer, Country, Viewport};
use crate::names::AliasTable;
use crate::reshape::{self, format_date_label, parse_date_label, CaseValue, Reshaped, Snapshot};
use crate::ui::DashboardLayout;
use chrono::NaiveDate;
use ratatui::layout::Rect;

/// The two navigable scenes, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scene {
    Chart,
    Map,
}

impl Scene {
    pub const ALL: [Scene; 2] = [Scene::Chart, Scene::Map];

    pub fn index(self) -> usize {
        match self {
            Scene::Chart => 0,
            Scene::Map => 1,
        }
    }

    /// Next scene, staying on the last one
    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1).min(Self::ALL.len() - 1)]
    }

    /// Previous scene, staying on the first one
    pub fn prev(self) -> Self {
        Self::ALL[self.index().saturating_sub(1)]
    }

    pub fn title(self) -> &'static str {
        match self {
            Scene::Chart => "Line Chart: COVID-19 Confirmed Cases",
            Scene::Map => "World Map: COVID-19 Confirmed Cases",
        }
    }

    pub fn tab(self) -> &'static str {
        match self {
            Scene::Chart => "Line Chart",
            Scene::Map => "World Map",
        }
    }
}

/// Presentation state the core functions are called with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewState {
    pub active_scene: Scene,
    /// Index into [`Reshaped::dates`]
    pub selected_date: usize,
    pub metric: Metric,
    pub scale: ScaleKind,
}

/// Hover details for the country under the pointer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tooltip {
    pub country: String,
    pub lines: Vec<(&'static str, String)>,
}

/// Application state
pub struct App {
    pub config: DashboardConfig,
    pub aliases: AliasTable,
    feed: Feed,
    pub reshaped: Reshaped,
    /// Top of the case axis for the current metric
    pub chart_max: u64,
    pub snapshot: Option<Snapshot>,
    /// Snapshot value per map country, in the renderer's country order
    pub country_values: Vec<CaseValue>,
    pub map: ChoroplethRenderer,
    pub viewport: Viewport,
    pub view: ViewState,
    /// Exact feed name of the highlighted chart line
    pub focus: Option<String>,
    /// Current mouse cell for the cursor marker and tooltip
    pub mouse_pos: Option<(u16, u16)>,
    /// Last mouse cell while dragging the map
    pub last_mouse: Option<(u16, u16)>,
    pub should_quit: bool,
    size: Rect,
}

impl App {
    pub fn new(config: DashboardConfig, feed: Feed, countries: Vec<Country>, width: u16, height: u16) -> DataResult<Self> {
        let scale = config.scale;
        let reshaped = reshape::reshape(&feed, scale.floor());
        if reshaped.dates.is_empty() {
            return Err(DataError::NoDateColumns);
        }

        let selected_date = match parse_date_label(&config.target_date)
            .and_then(|d| reshaped.dates.iter().position(|x| *x == d))
        {
            Some(idx) => idx,
            None => {
                tracing::warn!(
                    date = %config.target_date,
                    "configured date not in feed, using the latest"
                );
                reshaped.dates.len() - 1
            }
        };

        let view = ViewState {
            active_scene: Scene::Chart,
            selected_date,
            metric: config.metric,
            scale,
        };
        let size = Rect::new(0, 0, width, height);
        let inner = DashboardLayout::new(size).inner;

        let mut app = Self {
            aliases: config.alias_table(),
            config,
            chart_max: chart::metric_max(&reshaped, view.metric),
            feed,
            reshaped,
            snapshot: None,
            country_values: Vec::new(),
            map: ChoroplethRenderer::new(countries),
            viewport: Viewport::world(inner.width as usize * 2, inner.height as usize * 4),
            view,
            focus: None,
            mouse_pos: None,
            last_mouse: None,
            should_quit: false,
            size,
        };
        app.rebuild_snapshot();
        Ok(app)
    }

    pub fn layout(&self) -> DashboardLayout {
        DashboardLayout::new(self.size)
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.size = Rect::new(0, 0, width, height);
        let inner = self.layout().inner;
        self.viewport
            .resize(inner.width as usize * 2, inner.height as usize * 4);
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn selected_date(&self) -> NaiveDate {
        self.reshaped.dates[self.view.selected_date]
    }

    pub fn next_scene(&mut self) {
        self.view.active_scene = self.view.active_scene.next();
    }

    pub fn prev_scene(&mut self) {
        self.view.active_scene = self.view.active_scene.prev();
    }

    /// Move the map date by `delta` feed dates, clamped to the feed
    pub fn step_date(&mut self, delta: isize) {
        let last = self.reshaped.dates.len() - 1;
        let target = self.view.selected_date.saturating_add_signed(delta).min(last);
        if target != self.view.selected_date {
            self.view.selected_date = target;
            self.rebuild_snapshot();
        }
    }

    pub fn toggle_metric(&mut self) {
        self.view.metric = self.view.metric.toggle();
        self.chart_max = chart::metric_max(&self.reshaped, self.view.metric);
    }

    /// Switching scale changes the malformed-cell floor, so everything is
    /// derived again.
    pub fn toggle_scale(&mut self) {
        self.view.scale = self.view.scale.toggle();
        let selected = self.selected_date();
        self.reshaped = reshape::reshape(&self.feed, self.view.scale.floor());
        self.view.selected_date = self
            .reshaped
            .dates
            .iter()
            .position(|d| *d == selected)
            .unwrap_or(self.reshaped.dates.len() - 1);
        self.chart_max = chart::metric_max(&self.reshaped, self.view.metric);
        self.rebuild_snapshot();
    }

    /// Replace the snapshot for the selected date; the old one is dropped
    fn rebuild_snapshot(&mut self) {
        let label = format_date_label(self.selected_date());
        match reshape::snapshot(&self.feed, &label, self.view.scale.floor()) {
            Ok(snapshot) => {
                self.country_values = self.map.resolve_values(&snapshot, &self.aliases);
                self.snapshot = Some(snapshot);
            }
            Err(e) => {
                tracing::warn!(error = %e, "snapshot unavailable");
                self.country_values = vec![CaseValue::NoData; self.map.countries().len()];
                self.snapshot = None;
            }
        }
    }

    pub fn pan(&mut self, dx: i32, dy: i32) {
        self.viewport.pan(dx, dy);
    }

    pub fn zoom_in(&mut self) {
        self.viewport.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.viewport.zoom_out();
    }

    /// Terminal cell to braille pixel inside the map area
    fn map_pixel(&self, col: u16, row: u16) -> Option<(i32, i32)> {
        let inner = self.layout().inner;
        contains(inner, col, row).then(|| {
            (
                (col - inner.x) as i32 * 2 + 1,
                (row - inner.y) as i32 * 4 + 2,
            )
        })
    }

    pub fn zoom_in_at(&mut self, col: u16, row: u16) {
        if let Some((px, py)) = self.map_pixel(col, row) {
            self.viewport.zoom_in_at(px, py);
        }
    }

    pub fn zoom_out_at(&mut self, col: u16, row: u16) {
        if let Some((px, py)) = self.map_pixel(col, row) {
            self.viewport.zoom_out_at(px, py);
        }
    }

    pub fn handle_drag(&mut self, col: u16, row: u16) {
        if let Some((last_col, last_row)) = self.last_mouse {
            let dx = (last_col as i32 - col as i32) * 2;
            let dy = (last_row as i32 - row as i32) * 4;
            self.pan(dx, dy);
        }
        self.last_mouse = Some((col, row));
    }

    pub fn end_drag(&mut self) {
        self.last_mouse = None;
    }

    pub fn set_mouse_pos(&mut self, col: u16, row: u16) {
        self.mouse_pos = Some((col, row));
    }

    /// Axes fitted to the current plot area
    pub fn chart_axes(&self) -> Option<ChartAxes> {
        let plot = self.layout().plot;
        ChartAxes::new(
            &self.reshaped,
            self.chart_max,
            self.view.scale,
            plot.width as usize * 2,
            plot.height as usize * 4,
        )
    }

    /// Map country index under the mouse
    pub fn hovered_country(&self) -> Option<usize> {
        let (col, row) = self.mouse_pos?;
        let (px, py) = self.map_pixel(col, row)?;
        let lonlat = self.viewport.unproject(px as f64, py as f64);
        self.map.country_at(lonlat)
    }

    /// Feed name of the chart line under the mouse
    fn hovered_line(&self) -> Option<chart::ChartHit<'_>> {
        let (col, row) = self.mouse_pos?;
        let plot = self.layout().plot;
        if !contains(plot, col, row) {
            return None;
        }
        let axes = self.chart_axes()?;
        let px = (col - plot.x) as f64 * 2.0 + 0.5;
        let py = (row - plot.y) as f64 * 4.0 + 1.5;
        chart::hit_test(&self.reshaped, self.view.metric, &axes, px, py, HOVER_TOLERANCE_PX)
    }

    /// Highlight the hovered country: on the map this jumps to its chart
    /// line, on the chart it toggles the line under the pointer.
    pub fn focus_hovered(&mut self) {
        match self.view.active_scene {
            Scene::Map => {
                let Some(idx) = self.hovered_country() else {
                    return;
                };
                let name = &self.map.countries()[idx].name;
                match self.reshaped.series_for_key(name, &self.aliases) {
                    Some((feed_name, _)) => {
                        self.focus = Some(feed_name.to_string());
                        self.view.active_scene = Scene::Chart;
                    }
                    None => tracing::debug!(country = %name, "no chart series for map country"),
                }
            }
            Scene::Chart => {
                let hit = self.hovered_line().map(|hit| hit.country.to_string());
                self.focus = match hit {
                    Some(name) if self.focus.as_deref() != Some(name.as_str()) => Some(name),
                    _ => None,
                };
            }
        }
    }

    /// Tooltip for whatever sits under the mouse in the active scene
    pub fn tooltip(&self) -> Option<Tooltip> {
        match self.view.active_scene {
            Scene::Chart => {
                let hit = self.hovered_line()?;
                let obs = hit.located.observation();
                let mut lines = vec![
                    ("Date", obs.date.format("%Y-%m-%d").to_string()),
                    ("Confirmed Cases", obs.cases.to_string()),
                ];
                if self.view.metric == Metric::Daily {
                    lines.push(("New Cases", hit.located.daily_delta().to_string()));
                }
                Some(Tooltip {
                    country: hit.country.to_string(),
                    lines,
                })
            }
            Scene::Map => {
                let idx = self.hovered_country()?;
                let country = &self.map.countries()[idx];
                let date = self
                    .snapshot
                    .as_ref()
                    .map(|s| s.date.format("%Y-%m-%d").to_string())
                    .unwrap_or_default();
                let cases = match self.country_values.get(idx) {
                    Some(CaseValue::Cases(v)) => v.to_string(),
                    _ => "no data".to_string(),
                };
                Some(Tooltip {
                    country: country.name.clone(),
                    lines: vec![("Date", date), ("Confirmed Cases", cases)],
                })
            }
        }
    }
}

fn contains(area: Rect, col: u16, row: u16) -> bool {
    col >= area.x && col < area.x + area.width && row >= area.y && row < area.y + area.height
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec2;

    const FEED: &str = "\
Province/State,Country/Region,Lat,Long,12/31/20,1/1/21,1/2/21
,Freedonia,0,0,5,10,8
North,Sylvania,0,0,1,2,3
South,Sylvania,0,0,1,2,3
";

    fn block(name: &str, lon: f64, lat: f64, size: f64) -> Country {
        let ring = vec![
            DVec2::new(lon, lat),
            DVec2::new(lon + size, lat),
            DVec2::new(lon + size, lat + size),
            DVec2::new(lon, lat + size),
            DVec2::new(lon, lat),
        ];
        Country::new(name, vec![ring]).unwrap()
    }

    fn app() -> App {
        let feed = Feed::from_reader(FEED.as_bytes()).unwrap();
        let countries = vec![
            block("Freedonia", -60.0, -40.0, 120.0),
            block("Atlantis", 150.0, -10.0, 20.0),
        ];
        App::new(DashboardConfig::default(), feed, countries, 100, 40).unwrap()
    }

    #[test]
    fn test_scene_navigation_clamps() {
        assert_eq!(Scene::Chart.prev(), Scene::Chart);
        assert_eq!(Scene::Chart.next(), Scene::Map);
        assert_eq!(Scene::Map.next(), Scene::Map);
        assert_eq!(Scene::Map.prev(), Scene::Chart);
    }

    #[test]
    fn test_initial_date_from_config() {
        let app = app();
        assert_eq!(app.selected_date(), NaiveDate::from_ymd_opt(2021, 1, 1).unwrap());
        let snap = app.snapshot.as_ref().unwrap();
        assert_eq!(snap.get("SYLVANIA"), Some(4));
        assert_eq!(app.country_values, vec![CaseValue::Cases(10), CaseValue::NoData]);
    }

    #[test]
    fn test_step_date_rebuilds_snapshot() {
        let mut app = app();
        app.step_date(1);
        assert_eq!(app.snapshot.as_ref().unwrap().label, "1/2/21");
        assert_eq!(app.country_values[0], CaseValue::Cases(8));

        app.step_date(30);
        assert_eq!(app.view.selected_date, 2);
        app.step_date(-30);
        assert_eq!(app.view.selected_date, 0);
    }

    #[test]
    fn test_unknown_config_date_falls_back_to_latest() {
        let feed = Feed::from_reader(FEED.as_bytes()).unwrap();
        let config = DashboardConfig {
            target_date: "7/4/19".to_string(),
            ..DashboardConfig::default()
        };
        let app = App::new(config, feed, Vec::new(), 80, 24).unwrap();
        assert_eq!(app.snapshot.as_ref().unwrap().label, "1/2/21");
    }

    #[test]
    fn test_feed_without_dates_is_rejected() {
        let feed = Feed::from_reader("Country/Region,notes\nChad,x\n".as_bytes()).unwrap();
        let err = App::new(DashboardConfig::default(), feed, Vec::new(), 80, 24).err();
        assert!(matches!(err, Some(DataError::NoDateColumns)));
    }

    #[test]
    fn test_toggles_keep_selected_date() {
        let mut app = app();
        app.toggle_metric();
        assert_eq!(app.view.metric, Metric::Daily);
        assert_eq!(app.chart_max, 5);

        app.toggle_scale();
        assert_eq!(app.view.scale, ScaleKind::Log);
        assert_eq!(app.selected_date(), NaiveDate::from_ymd_opt(2021, 1, 1).unwrap());
        assert!(app.snapshot.is_some());
    }

    #[test]
    fn test_map_tooltip_and_focus() {
        let mut app = app();
        app.view.active_scene = Scene::Map;
        let inner = app.layout().inner;
        let center = (inner.x + inner.width / 2, inner.y + inner.height / 2);
        app.set_mouse_pos(center.0, center.1);

        let tip = app.tooltip().unwrap();
        assert_eq!(tip.country, "Freedonia");
        assert_eq!(tip.lines[1], ("Confirmed Cases", "10".to_string()));

        let over_atlantis = (inner.y..inner.y + inner.height)
            .flat_map(|row| (inner.x..inner.x + inner.width).map(move |col| (col, row)))
            .find(|&(col, row)| {
                app.set_mouse_pos(col, row);
                app.hovered_country() == Some(1)
            });
        assert!(over_atlantis.is_some());
        let tip = app.tooltip().unwrap();
        assert_eq!(tip.country, "Atlantis");
        assert_eq!(tip.lines[1], ("Confirmed Cases", "no data".to_string()));

        app.set_mouse_pos(center.0, center.1);

        app.focus_hovered();
        assert_eq!(app.focus.as_deref(), Some("Freedonia"));
        assert_eq!(app.view.active_scene, Scene::Chart);
    }

    #[test]
    fn test_no_tooltip_outside_plot() {
        let mut app = app();
        app.set_mouse_pos(0, 0);
        assert!(app.tooltip().is_none());
    }
}
