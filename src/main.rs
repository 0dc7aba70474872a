use anyhow::{Context, Result};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
    MouseEvent, MouseEventKind,
};
use crossterm::execute;
use ratatui::DefaultTerminal;
use std::time::Duration;
use tui_covid::app::{App, Scene};
use tui_covid::config::{Command, DashboardConfig, USAGE};
use tui_covid::data::{self, feed::Feed};
use tui_covid::telemetry;

fn main() -> Result<()> {
    let config = match DashboardConfig::from_args(std::env::args().skip(1))? {
        Command::Run(config) => config,
        Command::Help => {
            println!("{USAGE}");
            return Ok(());
        }
    };

    telemetry::init_file_tracing(&config.log_path)?;

    // Load everything before touching the terminal so errors print normally
    let feed = Feed::open(&config.feed_path)
        .with_context(|| format!("loading case feed {}", config.feed_path.display()))?;
    let countries = match data::load_countries(&config.geometry_path) {
        Ok(countries) => countries,
        Err(e) => {
            tracing::warn!(error = %e, "map geometry unavailable");
            Vec::new()
        }
    };
    tracing::info!(rows = feed.rows().len(), "loaded case feed");

    let mut terminal = ratatui::init();
    terminal.clear()?;
    execute!(std::io::stdout(), EnableMouseCapture)?;

    let result = run(&mut terminal, config, feed, countries);

    let _ = execute!(std::io::stdout(), DisableMouseCapture);
    ratatui::restore();

    result
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    app.set_mouse_pos(mouse.column, mouse.row);

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            app.last_mouse = Some((mouse.column, mouse.row));
            // On the map a click starts a drag; Enter focuses instead
            if app.view.active_scene == Scene::Chart {
                app.focus_hovered();
            }
        }
        _ if app.view.active_scene != Scene::Map => {}
        MouseEventKind::ScrollUp => app.zoom_in_at(mouse.column, mouse.row),
        MouseEventKind::ScrollDown => app.zoom_out_at(mouse.column, mouse.row),
        MouseEventKind::ScrollLeft => app.pan(-15, 0),
        MouseEventKind::ScrollRight => app.pan(15, 0),
        MouseEventKind::Drag(MouseButton::Left) => app.handle_drag(mouse.column, mouse.row),
        MouseEventKind::Up(MouseButton::Left) => app.end_drag(),
        _ => {}
    }
}

fn handle_key(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit(),

        KeyCode::Char('n') | KeyCode::Tab => app.next_scene(),
        KeyCode::Char('p') | KeyCode::BackTab => app.prev_scene(),

        KeyCode::Char(']') => app.step_date(1),
        KeyCode::Char('[') => app.step_date(-1),
        KeyCode::Char('}') => app.step_date(30),
        KeyCode::Char('{') => app.step_date(-30),

        KeyCode::Char('d') | KeyCode::Char('D') => app.toggle_metric(),
        KeyCode::Char('g') | KeyCode::Char('G') => app.toggle_scale(),
        KeyCode::Enter => app.focus_hovered(),

        KeyCode::Left | KeyCode::Char('h') => app.pan(-10, 0),
        KeyCode::Right | KeyCode::Char('l') => app.pan(10, 0),
        KeyCode::Up | KeyCode::Char('k') => app.pan(0, -6),
        KeyCode::Down | KeyCode::Char('j') => app.pan(0, 6),
        KeyCode::Char('+') | KeyCode::Char('=') => app.zoom_in(),
        KeyCode::Char('-') | KeyCode::Char('_') => app.zoom_out(),

        _ => {}
    }
}

fn run(
    terminal: &mut DefaultTerminal,
    config: DashboardConfig,
    feed: Feed,
    countries: Vec<tui_covid::map::Country>,
) -> Result<()> {
    let size = terminal.size()?;
    let mut app = App::new(config, feed, countries, size.width, size.height)?;

    loop {
        terminal.draw(|frame| tui_covid::ui::render(frame, &app))?;

        if event::poll(Duration::from_millis(16))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => handle_key(&mut app, key.code),
                Event::Mouse(mouse) => handle_mouse(&mut app, mouse),
                Event::Resize(width, height) => app.resize(width, height),
                _ => {}
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
