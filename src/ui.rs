use crate::app::{App, Scene, Tooltip};
use crate::braille::BrailleCanvas;
use crate::chart::{self, compact_count, ChartAxes, ChartFrame};
use crate::color;
use crate::map::MapFrame;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Margin, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget},
    Frame,
};

/// Columns reserved left of the plot for case labels
const Y_GUTTER: u16 = 8;
/// Swatches in the map legend gradient
const LEGEND_STEPS: usize = 12;

/// Screen regions, derived from the terminal size alone so input handling
/// and drawing agree on them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardLayout {
    pub header: Rect,
    pub body: Rect,
    /// Body without its border
    pub inner: Rect,
    /// Chart drawing area inside `inner`, right of the labels
    pub plot: Rect,
    pub info: Rect,
    pub keys: Rect,
}

impl DashboardLayout {
    pub fn new(area: Rect) -> Self {
        let [header, body, info, keys] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(area);

        let inner = body.inner(Margin::new(1, 1));
        let plot = Rect {
            x: inner.x + Y_GUTTER.min(inner.width),
            y: inner.y,
            width: inner.width.saturating_sub(Y_GUTTER),
            height: inner.height.saturating_sub(1),
        };

        Self {
            header,
            body,
            inner,
            plot,
            info,
            keys,
        }
    }
}

/// Render the UI
pub fn render(frame: &mut Frame, app: &App) {
    let layout = app.layout();

    render_header(frame, app, layout.header);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            format!(" {} ", app.view.active_scene.title()),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ));
    frame.render_widget(block, layout.body);

    match app.view.active_scene {
        Scene::Chart => render_chart(frame, app, &layout),
        Scene::Map => render_map(frame, app, &layout),
    }

    render_info(frame, app, layout.info);
    render_keys(frame, layout.keys);

    if let Some(tooltip) = app.tooltip() {
        if let Some(pos) = app.mouse_pos {
            render_tooltip(frame, &tooltip, pos);
        }
    }
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![Span::styled(" ◀ p ", Style::default().fg(Color::DarkGray))];
    for scene in Scene::ALL {
        let style = if scene == app.view.active_scene {
            Style::default().fg(Color::Black).bg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        spans.push(Span::styled(format!(" {}. {} ", scene.index() + 1, scene.tab()), style));
        spans.push(Span::raw(" "));
    }
    spans.push(Span::styled("n ▶", Style::default().fg(Color::DarkGray)));
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_chart(frame: &mut Frame, app: &App, layout: &DashboardLayout) {
    let Some(axes) = app.chart_axes() else {
        frame.render_widget(Paragraph::new(" No dated observations to chart"), layout.inner);
        return;
    };
    let plot = layout.plot;
    if plot.width == 0 || plot.height == 0 {
        return;
    }

    let chart_frame = chart::render_chart(
        &app.reshaped,
        app.view.metric,
        &axes,
        plot.width as usize,
        plot.height as usize,
        app.focus.as_deref(),
    );
    frame.render_widget(ChartWidget { chart: chart_frame }, plot);

    render_axis_labels(frame.buffer_mut(), &axes, layout);
    render_cursor(frame.buffer_mut(), app.mouse_pos, plot);
}

fn render_axis_labels(buf: &mut Buffer, axes: &ChartAxes, layout: &DashboardLayout) {
    let plot = layout.plot;
    let label_style = Style::default().fg(Color::DarkGray);

    let rows = [plot.y, plot.y + plot.height / 2, plot.bottom().saturating_sub(1)];
    for (row, value) in rows.into_iter().zip(axes.cases.tick_values()) {
        let text = format!("{:>width$}", compact_count(value), width = (Y_GUTTER - 1) as usize);
        buf.set_string(layout.inner.x, row, text, label_style);
    }

    let axis_row = plot.bottom();
    if axis_row >= layout.inner.bottom() {
        return;
    }
    let start = axes.time.start.format("%Y-%m-%d").to_string();
    let end = axes.time.end.format("%Y-%m-%d").to_string();
    buf.set_string(plot.x, axis_row, &start, label_style);
    let end_x = plot.right().saturating_sub(end.len() as u16);
    if end_x > plot.x + start.len() as u16 {
        buf.set_string(end_x, axis_row, &end, label_style);
    }
}

/// Braille chart layers drawn back to front, focus line last
struct ChartWidget {
    chart: ChartFrame,
}

fn paint_canvas(canvas: &BrailleCanvas, style: Style, area: Rect, buf: &mut Buffer) {
    for (cx, cy, ch) in canvas.lit_cells() {
        if cx >= area.width as usize || cy >= area.height as usize {
            continue;
        }
        let (x, y) = (area.x + cx as u16, area.y + cy as u16);
        buf[(x, y)].set_char(ch).set_style(style);
    }
}

impl Widget for ChartWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        for (idx, layer) in self.chart.layers.iter().enumerate() {
            paint_canvas(layer, Style::default().fg(color::category(idx)), area, buf);
        }
        if let Some(focus) = &self.chart.focus {
            let style = Style::default().fg(Color::White).add_modifier(Modifier::BOLD);
            paint_canvas(focus, style, area, buf);
        }
    }
}

fn render_map(frame: &mut Frame, app: &App, layout: &DashboardLayout) {
    let inner = layout.inner;
    if !app.map.has_data() {
        let notice = format!(
            " No map geometry loaded ({})",
            app.config.geometry_path.display()
        );
        frame.render_widget(Paragraph::new(notice), inner);
        return;
    }

    let map_frame = app.map.render(
        inner.width as usize,
        inner.height as usize,
        &app.viewport,
        &app.country_values,
        app.config.color_max,
    );
    frame.render_widget(ChoroplethWidget { map: map_frame }, inner);
    render_cursor(frame.buffer_mut(), app.mouse_pos, inner);
}

/// Country fills as cell backgrounds with outline glyphs on top
struct ChoroplethWidget {
    map: MapFrame,
}

impl Widget for ChoroplethWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let rows = (area.height as usize).min(self.map.height);
        let cols = (area.width as usize).min(self.map.width);
        for cy in 0..rows {
            for cx in 0..cols {
                if let Some(fill) = self.map.fill(cx, cy) {
                    buf[(area.x + cx as u16, area.y + cy as u16)].set_bg(fill);
                }
            }
        }
        paint_canvas(&self.map.outlines, Style::default().fg(Color::DarkGray), area, buf);
    }
}

fn render_cursor(buf: &mut Buffer, mouse_pos: Option<(u16, u16)>, area: Rect) {
    if let Some((x, y)) = mouse_pos {
        if x >= area.x && x < area.right() && y >= area.y && y < area.bottom() {
            buf[(x, y)].set_char('╋').set_fg(Color::Red);
        }
    }
}

fn render_info(frame: &mut Frame, app: &App, area: Rect) {
    let dim = Style::default().fg(Color::DarkGray);
    let value = Style::default().fg(Color::Yellow);

    let line = match app.view.active_scene {
        Scene::Chart => Line::from(vec![
            Span::styled(" Metric: ", dim),
            Span::styled(app.view.metric.label(), value),
            Span::styled(" | Scale: ", dim),
            Span::styled(app.view.scale.label(), value),
            Span::styled(" | Countries: ", dim),
            Span::styled(app.reshaped.country_count().to_string(), value),
            Span::styled(" | Focus: ", dim),
            Span::styled(app.focus.as_deref().unwrap_or("none"), value),
        ]),
        Scene::Map => {
            let date = app
                .snapshot
                .as_ref()
                .map(|s| s.label.clone())
                .unwrap_or_else(|| "n/a".to_string());
            let mut spans = vec![
                Span::styled(" Date: ", dim),
                Span::styled(date, value),
                Span::styled("  0 Cases ", dim),
            ];
            for step in 0..LEGEND_STEPS {
                let t = step as f64 / (LEGEND_STEPS - 1) as f64;
                spans.push(Span::styled("█", Style::default().fg(color::ramp_at(t))));
            }
            spans.push(Span::styled(format!(" {} Cases~  ", app.config.color_max), dim));
            spans.push(Span::styled("██", Style::default().fg(color::NO_DATA)));
            spans.push(Span::styled(" no data", dim));
            Line::from(spans)
        }
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn render_keys(frame: &mut Frame, area: Rect) {
    let help = " n/p:scene  [/]:date  {/}:±30d  d:daily  g:log  Enter:focus  hjkl +/-:pan/zoom  q:quit";
    frame.render_widget(
        Paragraph::new(Span::styled(help, Style::default().fg(Color::DarkGray))),
        area,
    );
}

fn render_tooltip(frame: &mut Frame, tooltip: &Tooltip, (col, row): (u16, u16)) {
    let mut lines = vec![Line::from(vec![
        Span::styled("Country: ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(tooltip.country.clone()),
    ])];
    for (label, value) in &tooltip.lines {
        lines.push(Line::from(vec![
            Span::styled(format!("{label}: "), Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(value.clone()),
        ]));
    }

    let screen = frame.area();
    let width = (lines.iter().map(Line::width).max().unwrap_or(0) as u16 + 2).min(screen.width);
    let height = (lines.len() as u16 + 2).min(screen.height);
    let x = (col + 2).min(screen.right().saturating_sub(width));
    let y = row.min(screen.bottom().saturating_sub(height));
    let area = Rect::new(x, y, width, height);

    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        ),
        area,
    );
}
