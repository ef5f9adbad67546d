use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::execute;
use ratatui::layout::Rect;
use ratatui::DefaultTerminal;
use sitemap_tui::app::{App, Control, Focus};
use sitemap_tui::{config, data, map, ui};
use tracing::error;
use tracing_subscriber::FmtSubscriber;

#[derive(clap::Parser)]
#[command(name = "sitemap-tui", about = "Terminal map viewer for geotagged site records")]
struct Args {
    /// Path to the configuration payload (JSON)
    #[arg()]
    config: PathBuf,

    /// Path to the site feature collection (GeoJSON)
    #[arg()]
    sites: PathBuf,

    /// Optional basemap outline file (GeoJSON)
    #[arg(long)]
    basemap: Option<PathBuf>,

    /// Verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbosity: u8,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(match args.verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        })
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("installing tracing subscriber")?;

    // Both payloads must be in hand before any UI appears; a failed boot
    // leaves the terminal untouched.
    let config = match data::load_config(&args.config) {
        Ok(config) => config,
        Err(err) => {
            error!("boot failed: {err:#}");
            return Err(err);
        }
    };
    let records = match data::load_sites(&args.sites) {
        Ok(records) => records,
        Err(err) => {
            error!("boot failed: {err:#}");
            return Err(err);
        }
    };
    let basemap = data::load_basemap(args.basemap.as_deref());

    let mut terminal = ratatui::init();
    terminal.clear()?;
    execute!(std::io::stdout(), EnableMouseCapture)?;

    let result = run(&mut terminal, config, records, basemap);

    let _ = execute!(std::io::stdout(), DisableMouseCapture);
    ratatui::restore();

    result
}

fn run(
    terminal: &mut DefaultTerminal,
    config: config::AppConfig,
    records: Vec<data::record::SiteRecord>,
    basemap: Vec<map::basemap::Outline>,
) -> Result<()> {
    let size = terminal.size()?;
    let inner = ui::layout(Rect::new(0, 0, size.width, size.height)).map_inner();
    let mut app = App::new(
        config,
        records,
        basemap,
        inner.width as usize * 2,
        inner.height as usize * 4,
    );
    // pending left-button press that has not turned into a drag
    let mut click_start: Option<(u16, u16)> = None;

    loop {
        terminal.draw(|frame| ui::render(frame, &app))?;

        if event::poll(Duration::from_millis(16))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    handle_key(&mut app, key);
                }
                Event::Mouse(mouse) => {
                    let size = terminal.size()?;
                    let inner = ui::layout(Rect::new(0, 0, size.width, size.height)).map_inner();
                    handle_mouse(&mut app, mouse, inner, &mut click_start);
                }
                Event::Resize(width, height) => {
                    let inner = ui::layout(Rect::new(0, 0, width, height)).map_inner();
                    app.sync_map_size(inner.width as usize * 2, inner.height as usize * 4);
                }
                _ => {}
            }
        }

        // commit a debounced free-text query when its deadline elapses
        app.tick(Instant::now());

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    match app.focus {
        Focus::Map => handle_map_key(app, key),
        Focus::Filters => handle_filter_key(app, key),
    }
}

fn handle_map_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc if app.selected.is_some() => app.selected = None,
        KeyCode::Char('q') | KeyCode::Esc => app.quit(),

        KeyCode::Tab => app.focus = Focus::Filters,

        // Pan with hjkl or arrow keys
        KeyCode::Left | KeyCode::Char('h') => app.pan(-10, 0),
        KeyCode::Right | KeyCode::Char('l') => app.pan(10, 0),
        KeyCode::Up | KeyCode::Char('k') => app.pan(0, -6),
        KeyCode::Down | KeyCode::Char('j') => app.pan(0, 6),

        // Zoom
        KeyCode::Char('+') | KeyCode::Char('=') => app.zoom_in(),
        KeyCode::Char('-') | KeyCode::Char('_') => app.zoom_out(),

        KeyCode::Char('r') | KeyCode::Char('0') => app.reset_view(),
        KeyCode::Char('L') => app.toggle_language(),
        KeyCode::Char('C') => app.clear_all(),

        _ => {}
    }
}

fn handle_filter_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Tab | KeyCode::Esc => app.focus = Focus::Map,

        KeyCode::Up => app.move_cursor(-1),
        KeyCode::Down => app.move_cursor(1),
        KeyCode::Left => {
            if let Some(control) = app.focused_control() {
                app.cycle_control(control, -1);
            }
        }
        KeyCode::Right => {
            if let Some(control) = app.focused_control() {
                app.cycle_control(control, 1);
            }
        }
        KeyCode::Delete => {
            if let Some(control) = app.focused_control() {
                app.clear_control(control);
            }
        }
        KeyCode::Backspace => {
            if app.focused_control() == Some(Control::Query) {
                app.pop_query_char(Instant::now());
            }
        }
        KeyCode::Enter => {
            // commit the query without waiting for the debounce
            if app.focused_control() == Some(Control::Query) {
                app.query_debounce.cancel();
                app.set_query(app.query_input.clone());
            }
        }
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            if app.focused_control() == Some(Control::Query) {
                app.push_query_char(c, Instant::now());
            }
        }
        _ => {}
    }
}

/// Mouse position (terminal cells) to map canvas pixels, when inside the
/// map pane.
fn to_map_px(inner: Rect, col: u16, row: u16) -> Option<(i32, i32)> {
    if col >= inner.x
        && col < inner.x + inner.width
        && row >= inner.y
        && row < inner.y + inner.height
    {
        Some((
            (col - inner.x) as i32 * 2,
            (row - inner.y) as i32 * 4,
        ))
    } else {
        None
    }
}

fn handle_mouse(app: &mut App, mouse: MouseEvent, inner: Rect, click_start: &mut Option<(u16, u16)>) {
    match mouse.kind {
        MouseEventKind::ScrollUp => {
            if let Some((px, py)) = to_map_px(inner, mouse.column, mouse.row) {
                app.viewport.zoom_in_at(px, py);
            }
        }
        MouseEventKind::ScrollDown => {
            if let Some((px, py)) = to_map_px(inner, mouse.column, mouse.row) {
                app.viewport.zoom_out_at(px, py);
            }
        }
        MouseEventKind::Down(MouseButton::Left) => {
            *click_start = Some((mouse.column, mouse.row));
            app.last_mouse = Some((mouse.column, mouse.row));
        }
        MouseEventKind::Drag(MouseButton::Left) => {
            if *click_start != Some((mouse.column, mouse.row)) {
                *click_start = None;
            }
            app.handle_drag(mouse.column, mouse.row);
        }
        MouseEventKind::Up(MouseButton::Left) => {
            app.end_drag();
            if click_start.take() == Some((mouse.column, mouse.row)) {
                if let Some((px, py)) = to_map_px(inner, mouse.column, mouse.row) {
                    app.select_at(px, py);
                }
            }
        }
        MouseEventKind::Down(MouseButton::Right) => {
            app.selected = None;
        }
        _ => {}
    }
}
