use super::surface::MapSurface;
use crate::point::{LatLng, LatLngBounds, Point};
use tracing::debug;

/// What a viewport command did to the camera
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ViewportChange {
    Fitted(LatLngBounds),
    Reset,
}

/// Camera commands issued from outside the map
#[derive(Clone, Debug)]
pub struct ViewportController {
    pub default_center: LatLng,
    pub default_zoom: f64,
    pub padding: u16,
}

impl ViewportController {
    pub fn new(default_center: LatLng, default_zoom: f64, padding: u16) -> Self {
        Self {
            default_center,
            default_zoom,
            padding,
        }
    }

    /// Frame every point with valid coordinates, or fall back to the default view
    pub fn fit_to_points<S: MapSurface>(&self, surface: &mut S, points: &[Point]) -> ViewportChange {
        let coords = points.iter().filter_map(|p| p.coordinates().ok());
        match LatLngBounds::from_coords(coords) {
            Some(bounds) => {
                let center = bounds.center();
                debug!(lat = center.lat, lng = center.lng, "fitting view to points");
                surface.fit_bounds(&bounds, self.padding);
                ViewportChange::Fitted(bounds)
            }
            None => self.reset(surface),
        }
    }

    pub fn reset<S: MapSurface>(&self, surface: &mut S) -> ViewportChange {
        surface.set_view(self.default_center, self.default_zoom);
        ViewportChange::Reset
    }
}
