use crate::braille::BrailleCanvas;
use crate::config::{MapConfig, TileProvider};
use crate::engine::{Camera, Highlight, MapSurface, MarkerStyle, ScreenPos};
use crate::map::basemap::{Basemap, LineString, Lod};
use crate::map::geometry::{draw_circle, draw_clipped_dashed_line, draw_clipped_line, Dash};
use crate::map::projection::Viewport;
use crate::point::{LatLng, LatLngBounds};
use std::collections::BTreeMap;
use tracing::info;

/// Key of one overlay on a [`TerminalSurface`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OverlayId(u32);

#[derive(Clone, Debug)]
enum Overlay {
    Marker { at: LatLng, style: MarkerStyle },
    Route(Vec<LatLng>),
}

/// A marker positioned in character cells, ready for the UI to draw
#[derive(Clone, Debug, PartialEq)]
pub struct MarkerGlyph {
    pub col: u16,
    pub row: u16,
    pub label: String,
    pub title: String,
    pub highlight: Highlight,
}

/// Rendered map layers, back to front
pub struct MapLayers {
    pub basemap: BrailleCanvas,
    pub route: BrailleCanvas,
    pub markers: Vec<MarkerGlyph>,
}

/// Map widget drawn with Braille dots in a terminal pane
pub struct TerminalSurface {
    pub viewport: Viewport,
    basemap: Basemap,
    attribution: Option<String>,
    overlays: BTreeMap<OverlayId, Overlay>,
    next_id: u32,
}

/// Pixels a click may miss a marker by (one character cell)
const HIT_X: i32 = 2;
const HIT_Y: i32 = 4;

impl TerminalSurface {
    /// Surface for a pane of `width` x `height` Braille pixels
    pub fn new(config: &MapConfig, width: usize, height: usize) -> Self {
        let center = config.default_center;
        Self {
            viewport: Viewport::new(center.lng, center.lat, config.default_zoom, width, height)
                .with_zoom_limits(config.min_zoom, config.max_zoom),
            basemap: Basemap::default(),
            attribution: None,
            overlays: BTreeMap::new(),
            next_id: 0,
        }
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        self.viewport.width = width;
        self.viewport.height = height;
    }

    pub fn attribution(&self) -> Option<&str> {
        self.attribution.as_deref()
    }

    #[cfg(test)]
    pub fn marker_count(&self) -> usize {
        self.overlays
            .values()
            .filter(|o| matches!(o, Overlay::Marker { .. }))
            .count()
    }

    #[cfg(test)]
    pub fn route_count(&self) -> usize {
        self.overlays
            .values()
            .filter(|o| matches!(o, Overlay::Route(_)))
            .count()
    }

    fn insert(&mut self, overlay: Overlay) -> OverlayId {
        let id = OverlayId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.overlays.insert(id, overlay);
        id
    }

    /// Render all layers into a `cols` x `rows` character grid
    pub fn render(&self, cols: usize, rows: usize) -> MapLayers {
        let mut basemap = BrailleCanvas::new(cols, rows);
        let mut route = BrailleCanvas::new(cols, rows);
        let mut markers = Vec::new();

        for line in self.basemap.lines(Lod::from_zoom(self.viewport.zoom)) {
            self.draw_linestring(&mut basemap, line);
        }

        for overlay in self.overlays.values() {
            match overlay {
                Overlay::Route(path) => self.draw_route(&mut route, path),
                Overlay::Marker { at, style } => {
                    let (px, py) = self.viewport.project(at.lng, at.lat);
                    if !self.viewport.is_visible(px, py) {
                        continue;
                    }
                    let radius = match style.highlight {
                        Highlight::Selected => 2,
                        Highlight::Default => 1,
                    };
                    draw_circle(&mut route, px, py, radius);
                    markers.push(MarkerGlyph {
                        col: (px / 2) as u16,
                        row: (py / 4) as u16,
                        label: style.label.clone(),
                        title: style.title.clone(),
                        highlight: style.highlight,
                    });
                }
            }
        }

        // selected marker last so it draws on top
        markers.sort_by_key(|m| m.highlight == Highlight::Selected);

        MapLayers {
            basemap,
            route,
            markers,
        }
    }

    /// Draw a linestring, clipped to the canvas
    fn draw_linestring(&self, canvas: &mut BrailleCanvas, line: &LineString) {
        let mut prev: Option<glam::DVec2> = None;

        for &(lon, lat) in line {
            let p = self.viewport.to_pixel(lon, lat).floor();
            if let Some(q) = prev {
                // skip segments that wrap around the antimeridian
                if (p - q).abs().element_sum() < self.viewport.width as f64 {
                    draw_clipped_line(canvas, q, p);
                }
            }
            prev = Some(p);
        }
    }

    fn draw_route(&self, canvas: &mut BrailleCanvas, path: &[LatLng]) {
        let mut phase = 0;
        for pair in path.windows(2) {
            let a = self.viewport.to_pixel(pair[0].lng, pair[0].lat).floor();
            let b = self.viewport.to_pixel(pair[1].lng, pair[1].lat).floor();
            draw_clipped_dashed_line(canvas, a, b, Dash::ROUTE, &mut phase);
        }
    }
}

impl MapSurface for TerminalSurface {
    type Overlay = OverlayId;

    fn camera(&self) -> Camera {
        Camera {
            center: LatLng::new(self.viewport.center_lat, self.viewport.center_lon),
            zoom: self.viewport.zoom,
        }
    }

    fn set_view(&mut self, center: LatLng, zoom: f64) {
        self.viewport.set_view(center.lng, center.lat, zoom);
    }

    fn fit_bounds(&mut self, bounds: &LatLngBounds, padding: u16) {
        let (sw, ne) = (bounds.south_west(), bounds.north_east());
        self.viewport.fit_bounds(sw.lat, sw.lng, ne.lat, ne.lng, padding);
    }

    fn add_tile_layer(&mut self, tiles: &TileProvider) {
        self.attribution = Some(tiles.attribution.clone());
        if tiles.url_template.starts_with("http://") || tiles.url_template.starts_with("https://") {
            info!(template = %tiles.url_template, "remote tiles are not drawn in the terminal");
            return;
        }
        self.basemap = Basemap::from_template(&tiles.url_template);
    }

    fn add_marker(&mut self, at: LatLng, style: &MarkerStyle) -> OverlayId {
        self.insert(Overlay::Marker {
            at,
            style: style.clone(),
        })
    }

    fn move_marker(&mut self, marker: OverlayId, to: LatLng) {
        if let Some(Overlay::Marker { at, .. }) = self.overlays.get_mut(&marker) {
            *at = to;
        }
    }

    fn restyle_marker(&mut self, marker: OverlayId, new_style: &MarkerStyle) {
        if let Some(Overlay::Marker { style, .. }) = self.overlays.get_mut(&marker) {
            *style = new_style.clone();
        }
    }

    fn add_route(&mut self, path: &[LatLng]) -> OverlayId {
        self.insert(Overlay::Route(path.to_vec()))
    }

    fn remove_overlay(&mut self, overlay: OverlayId) {
        self.overlays.remove(&overlay);
    }

    fn marker_at(&self, pos: ScreenPos) -> Option<OverlayId> {
        self.overlays
            .iter()
            .filter_map(|(id, o)| match o {
                Overlay::Marker { at, .. } => {
                    let (px, py) = self.viewport.project(at.lng, at.lat);
                    let (dx, dy) = ((px - pos.x).abs(), (py - pos.y).abs());
                    (dx <= HIT_X && dy <= HIT_Y).then_some((dx * dx + dy * dy, *id))
                }
                Overlay::Route(_) => None,
            })
            .min_by_key(|&(dist, _)| dist)
            .map(|(_, id)| id)
    }

    fn to_latlng(&self, pos: ScreenPos) -> LatLng {
        let (lon, lat) = self.viewport.unproject(pos.x, pos.y);
        LatLng::new(lat, lon)
    }

    fn release(&mut self) {
        self.overlays.clear();
        self.basemap = Basemap::default();
        self.attribution = None;
    }
}
