use crate::config::TileProvider;
use crate::point::{LatLng, LatLngBounds};
use std::fmt::Debug;
use std::hash::Hash;

/// Camera position of a map widget
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub center: LatLng,
    pub zoom: f64,
}

/// Pixel position on the drawing surface
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScreenPos {
    pub x: i32,
    pub y: i32,
}

impl ScreenPos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Visual variant of a marker
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Highlight {
    #[default]
    Default,
    Selected,
}

/// Everything a widget needs to draw one marker
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MarkerStyle {
    /// Short text drawn on the marker (the tour order)
    pub label: String,
    /// Popup text (the point name)
    pub title: String,
    pub highlight: Highlight,
}

/// A live map widget bound to a drawing surface.
///
/// Overlays are addressed by widget-issued keys; the engine keeps those keys
/// in its own id-keyed arena and never reaches into widget internals.
pub trait MapSurface {
    type Overlay: Copy + Eq + Hash + Debug;

    fn camera(&self) -> Camera;
    fn set_view(&mut self, center: LatLng, zoom: f64);
    /// Fit `bounds` in view, keeping `padding` pixels clear on every side
    fn fit_bounds(&mut self, bounds: &LatLngBounds, padding: u16);

    fn add_tile_layer(&mut self, tiles: &TileProvider);

    fn add_marker(&mut self, at: LatLng, style: &MarkerStyle) -> Self::Overlay;
    fn move_marker(&mut self, marker: Self::Overlay, to: LatLng);
    fn restyle_marker(&mut self, marker: Self::Overlay, style: &MarkerStyle);

    fn add_route(&mut self, path: &[LatLng]) -> Self::Overlay;

    fn remove_overlay(&mut self, overlay: Self::Overlay);

    /// Marker under a screen position, if any
    fn marker_at(&self, pos: ScreenPos) -> Option<Self::Overlay>;
    fn to_latlng(&self, pos: ScreenPos) -> LatLng;

    /// Tear the widget down; no other method is called afterwards
    fn release(&mut self);
}
