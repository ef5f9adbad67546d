//! ratatui layout and widgets: header bar, filter sidebar, braille map with
//! marker overlay, detail panel, status line, footer bar.

use chrono::Datelike;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget},
    Frame,
};

use crate::app::{App, Control, Focus};
use crate::braille::BrailleCanvas;
use crate::config::parse_hex_color;
use crate::detail;
use crate::locale::labels;
use crate::map::basemap;

const SIDEBAR_WIDTH: u16 = 34;

/// Screen regions; computed identically for drawing and for mouse mapping.
pub struct Panes {
    pub header: Rect,
    pub sidebar: Rect,
    pub map: Rect,
    pub status: Rect,
    pub footer: Rect,
}

impl Panes {
    /// Map area inside the border, in character cells.
    pub fn map_inner(&self) -> Rect {
        Block::default().borders(Borders::ALL).inner(self.map)
    }
}

pub fn layout(area: Rect) -> Panes {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);
    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(10)])
        .split(rows[1]);
    Panes {
        header: rows[0],
        sidebar: body[0],
        map: body[1],
        status: rows[2],
        footer: rows[3],
    }
}

fn bar_style(hex: &str) -> Style {
    match parse_hex_color(hex) {
        Some((r, g, b)) => Style::default().bg(Color::Rgb(r, g, b)).fg(Color::White),
        None => Style::default().bg(Color::Blue).fg(Color::White),
    }
}

pub fn render(frame: &mut Frame, app: &App) {
    let panes = layout(frame.area());
    render_header(frame, app, panes.header);
    render_sidebar(frame, app, panes.sidebar);
    render_map(frame, app, &panes);
    render_status(frame, app, panes.status);
    render_footer(frame, app, panes.footer);
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let title = Paragraph::new(Line::from(Span::styled(
        app.config.title(app.lang).to_string(),
        Style::default().add_modifier(Modifier::BOLD),
    )))
    .alignment(Alignment::Center)
    .style(bar_style(&app.config.header_bg));
    frame.render_widget(title, area);
}

/// Label of the current selection for one sidebar control.
fn selection_label(app: &App, control: Control) -> String {
    let l = labels(app.lang);
    match control {
        Control::Categorical(field) => app
            .filters
            .categorical(field)
            .map(|sel| {
                app.categorical_options_for(field)
                    .iter()
                    .find(|o| o.value == sel)
                    .map(|o| o.label.clone())
                    .unwrap_or_else(|| sel.to_string())
            })
            .unwrap_or_else(|| l.all.to_string()),
        Control::Trees => app
            .filters
            .tree_bucket()
            .and_then(|id| app.tree_buckets.iter().find(|b| b.id == id))
            .map(|b| b.label.clone())
            .unwrap_or_else(|| l.all.to_string()),
        Control::Area => app
            .filters
            .area_bucket()
            .and_then(|id| app.area_buckets.iter().find(|b| b.id == id))
            .map(|b| b.label.clone())
            .unwrap_or_else(|| l.all.to_string()),
        Control::Dynamic(idx) => app
            .dynamic
            .get(idx)
            .and_then(|f| {
                app.filters
                    .dynamic(&f.key)
                    .map(|sel| {
                        f.options
                            .iter()
                            .find(|o| o.value == sel)
                            .map(|o| o.label.clone())
                            .unwrap_or_else(|| sel.to_string())
                    })
            })
            .unwrap_or_else(|| l.all.to_string()),
        Control::Query => app.query_input.clone(),
    }
}

fn control_heading(app: &App, control: Control) -> String {
    let l = labels(app.lang);
    match control {
        Control::Categorical(field) => field.heading(l).to_string(),
        Control::Trees => l.trees.to_string(),
        Control::Area => l.area.to_string(),
        Control::Dynamic(idx) => app
            .dynamic
            .get(idx)
            .map(|f| f.label.clone())
            .unwrap_or_default(),
        Control::Query => l.search.to_string(),
    }
}

fn render_sidebar(frame: &mut Frame, app: &App, area: Rect) {
    let l = labels(app.lang);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let focused = app.focus == Focus::Filters;
    let mut lines: Vec<Line> = Vec::new();
    for (idx, control) in app.controls().into_iter().enumerate() {
        let highlighted = focused && idx == app.cursor;
        let style = if highlighted {
            Style::default().fg(Color::Black).bg(Color::Cyan)
        } else {
            Style::default()
        };
        let mut value = selection_label(app, control);
        if control == Control::Query && highlighted {
            value.push('▏');
        }
        lines.push(Line::from(vec![
            Span::styled(format!("{}: ", control_heading(app, control)), style.add_modifier(Modifier::BOLD)),
            Span::styled(value, style),
        ]));
    }
    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        format!("{}: {}/{}", l.sites, app.filtered.len(), app.records.len()),
        Style::default().fg(Color::Green),
    )));
    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_map(frame: &mut Frame, app: &App, panes: &Panes) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            format!(" {} ", app.layer.name(app.lang)),
            Style::default().fg(Color::Cyan),
        ));
    let inner = block.inner(panes.map);
    frame.render_widget(block, panes.map);
    if inner.width == 0 || inner.height == 0 {
        return;
    }

    let cols = inner.width as usize;
    let rows = inner.height as usize;
    let mut viewport = app.viewport.clone();
    viewport.width = cols * 2;
    viewport.height = rows * 4;

    let mut base = BrailleCanvas::new(cols, rows);
    let mut marks = BrailleCanvas::new(cols, rows);
    let mut highlight = BrailleCanvas::new(cols, rows);
    basemap::draw(&app.basemap, &mut base, &viewport);
    let marker_labels =
        app.markers.draw(&mut marks, &mut highlight, &viewport, &app.records, app.selected);

    frame.render_widget(
        MapWidget { base, marks, highlight, labels: marker_labels },
        inner,
    );

    if let Some(site) = app.selected {
        render_detail(frame, app, site, inner);
    }
}

struct MapWidget {
    base: BrailleCanvas,
    marks: BrailleCanvas,
    highlight: BrailleCanvas,
    labels: Vec<(u16, u16, String)>,
}

impl MapWidget {
    fn blit(canvas: &BrailleCanvas, color: Color, area: Rect, buf: &mut Buffer) {
        for row in 0..canvas.rows().min(area.height as usize) {
            let y = area.y + row as u16;
            for (col, ch) in canvas.row_cells(row) {
                if col >= area.width as usize {
                    break;
                }
                let x = area.x + col as u16;
                buf[(x, y)].set_char(ch).set_fg(color);
            }
        }
    }
}

impl Widget for MapWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Self::blit(&self.base, Color::DarkGray, area, buf);
        Self::blit(&self.marks, Color::Yellow, area, buf);
        Self::blit(&self.highlight, Color::Red, area, buf);

        let style = Style::default().fg(Color::White);
        for (lx, ly, text) in &self.labels {
            if *ly >= area.height || *lx >= area.width {
                continue;
            }
            let y = area.y + ly;
            let max_len = (area.width - lx) as usize;
            for (i, ch) in text.chars().take(max_len).enumerate() {
                buf[(area.x + lx + i as u16, y)].set_char(ch).set_style(style);
            }
        }
    }
}

fn render_detail(frame: &mut Frame, app: &App, site: usize, map_inner: Rect) {
    let Some(record) = app.records.get(site) else {
        return;
    };
    let rows = detail::rows(record, app.lang);
    let width = map_inner.width.min(44);
    let height = map_inner.height.min(rows.len() as u16 + 2);
    let area = Rect {
        x: map_inner.x + (map_inner.width.saturating_sub(width)) / 2,
        y: map_inner.y + (map_inner.height.saturating_sub(height)) / 2,
        width,
        height,
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(Span::styled(
            format!(" {} ", detail::heading(record, app.lang)),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ));
    let inner = block.inner(area);
    frame.render_widget(Clear, area);
    frame.render_widget(block, area);

    let lines: Vec<Line> = rows
        .iter()
        .take(inner.height as usize)
        .map(|(label, value)| {
            Line::from(vec![
                Span::styled(format!("{label}: "), Style::default().fg(Color::DarkGray)),
                Span::raw(value.clone()),
            ])
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_status(frame: &mut Frame, app: &App, area: Rect) {
    let l = labels(app.lang);
    let status = Line::from(vec![
        Span::styled(
            format!(" {}: {}/{} ", l.sites, app.filtered.len(), app.records.len()),
            Style::default().fg(Color::Green),
        ),
        Span::styled("| ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.zoom_level(), Style::default().fg(Color::Yellow)),
        Span::styled(" | ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.center_coords(), Style::default().fg(Color::Cyan)),
        Span::styled(" | ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            format!("{} {}", app.lang.code(), app.layer.slug.as_str()),
            Style::default().fg(Color::Magenta),
        ),
        Span::styled(
            " | tab:filters ←→:select hjkl:pan +/-:zoom L:lang C:clear r:reset q:quit",
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    frame.render_widget(Paragraph::new(status), area);
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let year = chrono::Local::now().year();
    let mut text = app.config.footer_text(app.lang, year);
    if !app.layer.attribution.is_empty() {
        text = format!("{text} — {}", app.layer.attribution);
    }
    let footer = Paragraph::new(Line::from(text))
        .alignment(Alignment::Center)
        .style(bar_style(&app.config.footer_bg));
    frame.render_widget(footer, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_regions_tile_the_screen() {
        let panes = layout(Rect::new(0, 0, 120, 40));
        assert_eq!(panes.header.height, 1);
        assert_eq!(panes.status.height, 1);
        assert_eq!(panes.footer.height, 1);
        assert_eq!(panes.sidebar.width, SIDEBAR_WIDTH);
        assert_eq!(panes.map.x, SIDEBAR_WIDTH);
        assert_eq!(
            panes.header.height + panes.sidebar.height + panes.status.height + panes.footer.height,
            40
        );
    }

    #[test]
    fn test_map_inner_excludes_border() {
        let panes = layout(Rect::new(0, 0, 120, 40));
        let inner = panes.map_inner();
        assert_eq!(inner.width, panes.map.width - 2);
        assert_eq!(inner.height, panes.map.height - 2);
    }
}
