use crate::ui;
use crossbeam_channel::Receiver;
use ratatui::layout::Rect;
use tour_map::engine::{ClickOutcome, MapSurface, ScreenPos, ViewportChange};
use tour_map::map::{Lod, MapLayers, TerminalSurface};
use tour_map::{MapEngine, MapEvent, PointId, PointStore, SyncReport, TourMapConfig};
use tracing::{info, warn};

/// Application state
pub struct App {
    pub store: PointStore,
    pub engine: MapEngine<TerminalSurface>,
    events: Receiver<MapEvent>,
    /// Selection as tracked by the point list
    pub selected: Option<PointId>,
    /// Latest user-facing message
    pub status: Option<String>,
    pub last_report: SyncReport,
    pub should_quit: bool,
    /// Map pane interior in terminal cells
    map_area: Rect,
    /// Last mouse position for drag tracking
    pub last_mouse: Option<(u16, u16)>,
    dragged: bool,
}

impl App {
    pub fn new(config: &TourMapConfig, store: PointStore, read_only: bool, width: u16, height: u16) -> Self {
        let map_area = ui::map_inner(Rect::new(0, 0, width, height));
        // Braille gives 2x4 resolution per character
        let surface = TerminalSurface::new(
            &config.map,
            map_area.width as usize * 2,
            map_area.height as usize * 4,
        );

        let (tx, events) = crossbeam_channel::unbounded();
        let mut engine = MapEngine::from_config(config, tx);
        engine.initialize(Some(surface), config.map.default_center, read_only);

        let mut app = Self {
            store,
            engine,
            events,
            selected: None,
            status: None,
            last_report: SyncReport::default(),
            should_quit: false,
            map_area,
            last_mouse: None,
            dragged: false,
        };
        app.sync();
        if !app.store.points().is_empty() {
            app.engine.fit_to_points(app.store.points());
        }
        app
    }

    /// Push the current points and selection to the map
    fn sync(&mut self) {
        self.last_report = self.engine.sync(self.store.points(), self.selected.as_ref());
        if !self.last_report.invalid.is_empty() {
            warn!(count = self.last_report.invalid.len(), "points with invalid coordinates");
        }
    }

    /// Apply every pending map event
    pub fn process_events(&mut self) {
        let events: Vec<MapEvent> = self.events.try_iter().collect();
        for event in events {
            match event {
                MapEvent::PointCreationRequested(at) => {
                    let id = self.store.add_point(at);
                    info!(%id, lat = at.lat, lng = at.lng, "point created from map click");
                    self.status = Some(format!("Point {id} added"));
                    self.selected = Some(id);
                }
                MapEvent::PointSelected(id) => {
                    self.selected = id;
                }
            }
            self.sync();
        }
    }

    /// Update the map size when the terminal resizes
    pub fn resize(&mut self, width: u16, height: u16) {
        self.map_area = ui::map_inner(Rect::new(0, 0, width, height));
        let (w, h) = (self.map_area.width as usize * 2, self.map_area.height as usize * 4);
        if let Some(surface) = self.engine.surface_mut() {
            surface.resize(w, h);
        }
    }

    /// Braille pixel at the center of a terminal cell, if it lies on the map
    fn pixel_at(&self, col: u16, row: u16) -> Option<ScreenPos> {
        let area = self.map_area;
        let inside = col >= area.x && col < area.x + area.width && row >= area.y && row < area.y + area.height;
        inside.then(|| ScreenPos::new((col - area.x) as i32 * 2 + 1, (row - area.y) as i32 * 4 + 2))
    }

    pub fn pan(&mut self, dx: i32, dy: i32) {
        if let Some(surface) = self.engine.surface_mut() {
            surface.viewport.pan(dx, dy);
        }
    }

    pub fn zoom_in(&mut self) {
        if let Some(surface) = self.engine.surface_mut() {
            surface.viewport.zoom_in();
        }
    }

    pub fn zoom_out(&mut self) {
        if let Some(surface) = self.engine.surface_mut() {
            surface.viewport.zoom_out();
        }
    }

    /// Zoom in towards a screen position (terminal column/row)
    pub fn zoom_in_at(&mut self, col: u16, row: u16) {
        let Some(at) = self.pixel_at(col, row) else { return };
        if let Some(surface) = self.engine.surface_mut() {
            surface.viewport.zoom_in_at(at.x, at.y);
        }
    }

    /// Zoom out from a screen position (terminal column/row)
    pub fn zoom_out_at(&mut self, col: u16, row: u16) {
        let Some(at) = self.pixel_at(col, row) else { return };
        if let Some(surface) = self.engine.surface_mut() {
            surface.viewport.zoom_out_at(at.x, at.y);
        }
    }

    /// Left button pressed: start a possible drag
    pub fn begin_drag(&mut self, col: u16, row: u16) {
        self.last_mouse = Some((col, row));
        self.dragged = false;
    }

    /// Pan by the mouse movement since the last event
    pub fn handle_drag(&mut self, col: u16, row: u16) {
        if let Some((last_x, last_y)) = self.last_mouse {
            let dx = last_x as i32 - col as i32;
            let dy = last_y as i32 - row as i32;
            if dx != 0 || dy != 0 {
                self.dragged = true;
                self.pan(dx * 2, dy * 4);
            }
        }
        self.last_mouse = Some((col, row));
    }

    /// Left button released; a press without movement is a click
    pub fn end_drag(&mut self, col: u16, row: u16) {
        let was_click = self.last_mouse.is_some() && !self.dragged;
        self.last_mouse = None;
        self.dragged = false;
        if was_click {
            self.click(col, row);
        }
    }

    pub fn click(&mut self, col: u16, row: u16) {
        let Some(at) = self.pixel_at(col, row) else { return };
        match self.engine.click(at) {
            ClickOutcome::Selected(None) => self.status = Some("Selection cleared".to_string()),
            ClickOutcome::Selected(Some(id)) => {
                let name = self.store.get(&id).map(|p| p.name.clone()).unwrap_or_default();
                self.status = Some(format!("Selected {name}"));
            }
            ClickOutcome::CreationRequested(_) | ClickOutcome::Ignored => {}
        }
        self.process_events();
    }

    pub fn fit_to_points(&mut self) {
        self.status = match self.engine.fit_to_points(self.store.points()) {
            Some(ViewportChange::Fitted(_)) => Some("Map Centered".to_string()),
            Some(ViewportChange::Reset) => Some("Map Reset".to_string()),
            None => None,
        };
    }

    pub fn reset_viewport(&mut self) {
        if self.engine.reset_viewport().is_some() {
            self.status = Some("Map Reset".to_string());
        }
    }

    /// Move the selection through the list, wrapping at either end
    pub fn select_step(&mut self, forward: bool) {
        let ids: Vec<PointId> = self.store.by_order().iter().map(|p| p.id.clone()).collect();
        if ids.is_empty() {
            return;
        }
        let current = self.selected.as_ref().and_then(|s| ids.iter().position(|id| id == s));
        let next = match (current, forward) {
            (None, true) => 0,
            (None, false) => ids.len() - 1,
            (Some(i), true) => (i + 1) % ids.len(),
            (Some(i), false) => (i + ids.len() - 1) % ids.len(),
        };
        self.selected = Some(ids[next].clone());
        self.sync();
    }

    pub fn deselect(&mut self) {
        if self.selected.take().is_some() {
            self.engine.deselect();
        }
    }

    pub fn delete_selected(&mut self) {
        let Some(id) = self.selected.take() else { return };
        if let Some(point) = self.store.remove_point(&id) {
            self.status = Some(format!("Removed {}", point.name));
        }
        self.sync();
    }

    pub fn toggle_read_only(&mut self) {
        let read_only = !self.engine.is_read_only();
        self.engine.set_read_only(read_only);
        self.status = Some(if read_only { "View mode" } else { "Edit mode" }.to_string());
    }

    pub fn save(&mut self) {
        self.status = Some(match self.store.save() {
            Ok(path) => format!("Saved {}", path.display()),
            Err(e) => {
                warn!("save failed: {}", e);
                format!("Save failed: {e}")
            }
        });
    }

    /// Request quit
    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn layers(&self, cols: usize, rows: usize) -> Option<MapLayers> {
        self.engine.surface().map(|s| s.render(cols, rows))
    }

    pub fn attribution(&self) -> Option<&str> {
        self.engine.surface().and_then(|s| s.attribution())
    }

    /// Get current zoom level and base map detail as a string
    pub fn zoom_level(&self) -> String {
        self.engine.surface().map_or_else(String::new, |s| {
            let zoom = s.camera().zoom;
            format!("{zoom:.0} ({})", Lod::from_zoom(zoom).resolution())
        })
    }

    /// Get current center coordinates as a string
    pub fn center_coords(&self) -> String {
        self.engine.surface().map_or_else(String::new, |s| {
            let center = s.camera().center;
            format!(
                "{:.4}°{}, {:.4}°{}",
                center.lat.abs(),
                if center.lat >= 0.0 { "N" } else { "S" },
                center.lng.abs(),
                if center.lng >= 0.0 { "E" } else { "W" }
            )
        })
    }
}
