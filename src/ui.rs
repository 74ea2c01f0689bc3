use crate::app::App;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
    Frame,
};
use tour_map::braille::BrailleCanvas;
use tour_map::engine::Highlight;
use tour_map::map::{MapLayers, MarkerGlyph};

/// Width of the points panel in columns
const PANEL_WIDTH: u16 = 36;

/// Screen regions of the UI
pub struct Panes {
    pub map: Rect,
    pub points: Rect,
    pub status: Rect,
}

pub fn panes(area: Rect) -> Panes {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Map and panel
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(10), Constraint::Length(PANEL_WIDTH)])
        .split(rows[0]);

    Panes {
        map: cols[0],
        points: cols[1],
        status: rows[1],
    }
}

fn pane_block(title: String) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            title,
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ))
}

/// Area inside the map border, where Braille pixels are drawn
pub fn map_inner(area: Rect) -> Rect {
    pane_block(String::new()).inner(panes(area).map)
}

/// Render the UI
pub fn render(frame: &mut Frame, app: &App) {
    let panes = panes(frame.area());

    render_map(frame, app, panes.map);
    render_points(frame, app, panes.points);
    render_status_bar(frame, app, panes.status);
}

fn render_map(frame: &mut Frame, app: &App, area: Rect) {
    let block = pane_block(format!(" {} ", app.store.name()));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if let Some(layers) = app.layers(inner.width as usize, inner.height as usize) {
        frame.render_widget(MapWidget { layers }, inner);
    }
}

/// Braille map layers with marker glyphs overlaid
struct MapWidget {
    layers: MapLayers,
}

impl MapWidget {
    /// Render a braille canvas layer with a specific color
    fn render_layer(canvas: &BrailleCanvas, color: Color, area: Rect, buf: &mut Buffer) {
        for (row_idx, row_str) in canvas.rows().enumerate().take(area.height as usize) {
            let y = area.y + row_idx as u16;

            for (col_idx, ch) in row_str.chars().enumerate().take(area.width as usize) {
                // Skip empty braille characters (U+2800)
                if ch == '\u{2800}' {
                    continue;
                }
                let x = area.x + col_idx as u16;
                buf[(x, y)].set_char(ch).set_fg(color);
            }
        }
    }

    fn render_marker(marker: &MarkerGlyph, area: Rect, buf: &mut Buffer) {
        if marker.col >= area.width || marker.row >= area.height {
            return;
        }

        let (glyph, style, text) = match marker.highlight {
            Highlight::Selected => (
                '◉',
                Style::default()
                    .fg(Color::LightRed)
                    .add_modifier(Modifier::BOLD),
                format!(" {} {}", marker.label, marker.title),
            ),
            Highlight::Default => ('●', Style::default().fg(Color::White), format!(" {}", marker.label)),
        };

        let x = area.x + marker.col;
        let y = area.y + marker.row;
        buf[(x, y)].set_char(glyph).set_style(style);

        let max_len = (area.width - marker.col - 1) as usize;
        for (i, ch) in text.trim_end().chars().take(max_len).enumerate() {
            buf[(x + 1 + i as u16, y)].set_char(ch).set_style(style);
        }
    }
}

impl Widget for MapWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Back to front: coastlines, route, markers
        Self::render_layer(&self.layers.basemap, Color::Cyan, area, buf);
        Self::render_layer(&self.layers.route, Color::Yellow, area, buf);

        for marker in &self.layers.markers {
            Self::render_marker(marker, area, buf);
        }
    }
}

fn render_points(frame: &mut Frame, app: &App, area: Rect) {
    let points = app.store.by_order();
    let block = pane_block(format!(" Points ({}) ", points.len()));

    let lines: Vec<Line> = points
        .iter()
        .map(|p| {
            let selected = app.selected.as_ref() == Some(&p.id);
            let order = p.order.map_or_else(|| "-".to_string(), |o| o.to_string());
            let coords = match p.coordinates() {
                Ok(at) => Span::styled(
                    format!(" {:.4}, {:.4}", at.lat, at.lng),
                    Style::default().fg(Color::DarkGray),
                ),
                Err(_) => Span::styled(" invalid coordinates", Style::default().fg(Color::Red)),
            };
            let name_style = if selected {
                Style::default()
                    .fg(Color::LightRed)
                    .add_modifier(Modifier::BOLD | Modifier::REVERSED)
            } else {
                Style::default().fg(Color::White)
            };

            Line::from(vec![
                Span::styled(format!("{order:>3} "), Style::default().fg(Color::Yellow)),
                Span::styled(p.name.clone(), name_style),
                coords,
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let (mode, mode_color) = if app.engine.is_read_only() {
        ("VIEW", Color::Green)
    } else {
        ("EDIT", Color::Magenta)
    };

    let mut spans = vec![
        Span::styled(format!(" {mode} "), Style::default().fg(Color::Black).bg(mode_color)),
        Span::styled(" Zoom: ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.zoom_level(), Style::default().fg(Color::Yellow)),
        Span::styled(" | ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.center_coords(), Style::default().fg(Color::Cyan)),
    ];

    if app.store.is_dirty() {
        spans.push(Span::styled(" [+]", Style::default().fg(Color::Yellow)));
    }

    if let Some(status) = &app.status {
        spans.push(Span::styled(" | ", Style::default().fg(Color::DarkGray)));
        spans.push(Span::styled(status.clone(), Style::default().fg(Color::White)));
    }
    if let Some(attribution) = app.attribution() {
        spans.push(Span::styled(format!(" | {attribution}"), Style::default().fg(Color::DarkGray)));
    }
    spans.push(Span::styled(
        " | c:fit r:reset tab:select x:delete v:mode w:save q:quit",
        Style::default().fg(Color::DarkGray),
    ));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
