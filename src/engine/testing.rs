//! In-memory `MapSurface` that records what the engine asked it to draw.

use super::surface::{Camera, MapSurface, MarkerStyle, ScreenPos};
use crate::config::TileProvider;
use crate::point::{LatLng, LatLngBounds};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Screen pixels per degree; clicks map straight onto lat/lng
const PX_PER_DEGREE: f64 = 100.0;

#[derive(Clone, Debug, PartialEq)]
pub enum FakeOverlay {
    Marker { at: LatLng, style: MarkerStyle },
    Route(Vec<LatLng>),
}

#[derive(Debug)]
pub struct SurfaceState {
    pub overlays: HashMap<u32, FakeOverlay>,
    pub camera: Camera,
    pub fitted: Option<(LatLngBounds, u16)>,
    pub tile_layers: Vec<TileProvider>,
    pub markers_added: usize,
    pub marker_moves: usize,
    pub routes_added: usize,
    pub releases: usize,
    next: u32,
}

impl SurfaceState {
    pub fn markers(&self) -> impl Iterator<Item = (&LatLng, &MarkerStyle)> {
        self.overlays.values().filter_map(|o| match o {
            FakeOverlay::Marker { at, style } => Some((at, style)),
            FakeOverlay::Route(_) => None,
        })
    }

    pub fn routes(&self) -> Vec<&Vec<LatLng>> {
        self.overlays
            .values()
            .filter_map(|o| match o {
                FakeOverlay::Route(path) => Some(path),
                FakeOverlay::Marker { .. } => None,
            })
            .collect()
    }

    pub fn marker_titled(&self, title: &str) -> Option<(&LatLng, &MarkerStyle)> {
        self.markers().find(|(_, s)| s.title == title)
    }
}

/// Cloneable handle; clones share state so tests can inspect after the engine drops it
#[derive(Clone, Debug)]
pub struct RecordingSurface {
    state: Rc<RefCell<SurfaceState>>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(SurfaceState {
                overlays: HashMap::new(),
                camera: Camera {
                    center: LatLng::new(0.0, 0.0),
                    zoom: 0.0,
                },
                fitted: None,
                tile_layers: Vec::new(),
                markers_added: 0,
                marker_moves: 0,
                routes_added: 0,
                releases: 0,
                next: 0,
            })),
        }
    }

    pub fn state(&self) -> std::cell::Ref<'_, SurfaceState> {
        self.state.borrow()
    }

    /// Screen position that lands exactly on `at`
    pub fn screen_of(at: LatLng) -> ScreenPos {
        ScreenPos::new(
            (at.lng * PX_PER_DEGREE).round() as i32,
            (at.lat * PX_PER_DEGREE).round() as i32,
        )
    }

    fn insert(&mut self, overlay: FakeOverlay) -> u32 {
        let mut state = self.state.borrow_mut();
        let key = state.next;
        state.next += 1;
        state.overlays.insert(key, overlay);
        key
    }
}

impl MapSurface for RecordingSurface {
    type Overlay = u32;

    fn camera(&self) -> Camera {
        self.state.borrow().camera
    }

    fn set_view(&mut self, center: LatLng, zoom: f64) {
        let mut state = self.state.borrow_mut();
        state.camera = Camera { center, zoom };
        state.fitted = None;
    }

    fn fit_bounds(&mut self, bounds: &LatLngBounds, padding: u16) {
        let mut state = self.state.borrow_mut();
        state.camera.center = bounds.center();
        state.fitted = Some((*bounds, padding));
    }

    fn add_tile_layer(&mut self, tiles: &TileProvider) {
        self.state.borrow_mut().tile_layers.push(tiles.clone());
    }

    fn add_marker(&mut self, at: LatLng, style: &MarkerStyle) -> u32 {
        self.state.borrow_mut().markers_added += 1;
        self.insert(FakeOverlay::Marker {
            at,
            style: style.clone(),
        })
    }

    fn move_marker(&mut self, marker: u32, to: LatLng) {
        let mut state = self.state.borrow_mut();
        state.marker_moves += 1;
        if let Some(FakeOverlay::Marker { at, .. }) = state.overlays.get_mut(&marker) {
            *at = to;
        }
    }

    fn restyle_marker(&mut self, marker: u32, new_style: &MarkerStyle) {
        if let Some(FakeOverlay::Marker { style, .. }) =
            self.state.borrow_mut().overlays.get_mut(&marker)
        {
            *style = new_style.clone();
        }
    }

    fn add_route(&mut self, path: &[LatLng]) -> u32 {
        self.state.borrow_mut().routes_added += 1;
        self.insert(FakeOverlay::Route(path.to_vec()))
    }

    fn remove_overlay(&mut self, overlay: u32) {
        let removed = self.state.borrow_mut().overlays.remove(&overlay);
        assert!(removed.is_some(), "overlay {overlay} removed twice");
    }

    fn marker_at(&self, pos: ScreenPos) -> Option<u32> {
        self.state
            .borrow()
            .overlays
            .iter()
            .find_map(|(key, o)| match o {
                FakeOverlay::Marker { at, .. } if Self::screen_of(*at) == pos => Some(*key),
                _ => None,
            })
    }

    fn to_latlng(&self, pos: ScreenPos) -> LatLng {
        LatLng::new(pos.y as f64 / PX_PER_DEGREE, pos.x as f64 / PX_PER_DEGREE)
    }

    fn release(&mut self) {
        self.state.borrow_mut().releases += 1;
    }
}
