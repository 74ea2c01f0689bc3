use super::reconcile::ValidSet;
use super::surface::MapSurface;
use crate::point::LatLng;

/// Tour path through valid points: ascending order, unordered as 0,
/// ties kept in snapshot order.
pub fn route_path(valid: &ValidSet<'_>) -> Vec<LatLng> {
    let mut ordered: Vec<_> = valid.points.iter().collect();
    // sort_by_key is stable; index breaks remaining ties explicitly
    ordered.sort_by_key(|v| (v.point.sort_key(), v.index));
    ordered.iter().map(|v| v.at).collect()
}

/// The single live route polyline
#[derive(Clone, Debug, PartialEq)]
pub struct RouteOverlay<O> {
    pub overlay: O,
    pub path: Vec<LatLng>,
}

/// Redraws the route from scratch on every pass
#[derive(Debug)]
pub struct RouteRenderer<O> {
    live: Option<RouteOverlay<O>>,
}

impl<O> Default for RouteRenderer<O> {
    fn default() -> Self {
        Self { live: None }
    }
}

impl<O: Copy> RouteRenderer<O> {
    /// Replace the route with one through `valid`; returns the vertex count drawn
    pub fn render<S>(&mut self, surface: &mut S, valid: &ValidSet<'_>) -> usize
    where
        S: MapSurface<Overlay = O>,
    {
        self.clear(surface);

        if valid.len() < 2 {
            return 0;
        }

        let path = route_path(valid);
        let overlay = surface.add_route(&path);
        let vertices = path.len();
        self.live = Some(RouteOverlay { overlay, path });
        vertices
    }

    pub fn clear<S>(&mut self, surface: &mut S)
    where
        S: MapSurface<Overlay = O>,
    {
        if let Some(route) = self.live.take() {
            surface.remove_overlay(route.overlay);
        }
    }

    #[cfg(test)]
    pub fn current(&self) -> Option<&RouteOverlay<O>> {
        self.live.as_ref()
    }
}
