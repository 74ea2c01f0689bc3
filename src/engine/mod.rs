//! Map reconciliation engine.
//!
//! Keeps a map widget's overlays (one marker per point, one route line)
//! in step with an externally owned point snapshot. The widget is an owned
//! resource: acquired by [`MapEngine::initialize`], released exactly once by
//! [`MapEngine::dispose`] (or on drop). Every operation on a disposed or
//! never-initialized engine is a silent no-op.
//!
//! Notifications flow outward over a channel of [`MapEvent`]s; the engine never
//! mutates the point collection.

mod click;
mod reconcile;
mod route;
mod selection;
mod surface;
mod viewport;

#[cfg(test)]
pub(crate) mod testing;

pub use click::ClickCapture;
pub use reconcile::{MarkerDiff, MarkerHandle, MarkerReconciler, ValidPoint, ValidSet};
pub use route::{route_path, RouteOverlay, RouteRenderer};
pub use selection::{SelectionChange, SelectionController};
pub use surface::{Camera, Highlight, MapSurface, MarkerStyle, ScreenPos};
pub use viewport::{ViewportChange, ViewportController};

use crate::config::{MapConfig, TileProvider, TourMapConfig};
use crate::point::{LatLng, Point, PointId};
use crossbeam_channel::Sender;
use tracing::{debug, info, warn};

/// Notifications from the engine to whoever owns the points
#[derive(Clone, Debug, PartialEq)]
pub enum MapEvent {
    /// The user clicked empty map while editing
    PointCreationRequested(LatLng),
    /// A marker click changed the selection
    PointSelected(Option<PointId>),
}

/// Summary of one reconciliation pass
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SyncReport {
    pub created: usize,
    pub updated: usize,
    pub removed: usize,
    /// Points skipped because their coordinates did not parse
    pub invalid: Vec<PointId>,
    /// Vertices in the route line, 0 when no route is drawn
    pub route_vertices: usize,
}

/// What a click on the map surface resolved to
#[derive(Clone, Debug, PartialEq)]
pub enum ClickOutcome {
    Ignored,
    Selected(Option<PointId>),
    CreationRequested(LatLng),
}

/// Everything that only exists while a widget is mounted
struct MountedMap<S: MapSurface> {
    surface: S,
    markers: MarkerReconciler<S::Overlay>,
    route: RouteRenderer<S::Overlay>,
    viewport: ViewportController,
    clicks: Option<ClickCapture>,
}

pub struct MapEngine<S: MapSurface> {
    config: MapConfig,
    tiles: TileProvider,
    events: Sender<MapEvent>,
    selection: SelectionController,
    mounted: Option<MountedMap<S>>,
}

impl<S: MapSurface> MapEngine<S> {
    pub fn new(config: MapConfig, tiles: TileProvider, events: Sender<MapEvent>) -> Self {
        Self {
            config,
            tiles,
            events,
            selection: SelectionController::default(),
            mounted: None,
        }
    }

    pub fn from_config(config: &TourMapConfig, events: Sender<MapEvent>) -> Self {
        Self::new(config.map.clone(), config.tiles.clone(), events)
    }

    /// Mount the map on `container`.
    ///
    /// Returns false without side effects when already live or when no
    /// surface was supplied; a later call with a surface still succeeds.
    pub fn initialize(&mut self, container: Option<S>, default_center: LatLng, read_only: bool) -> bool {
        if self.mounted.is_some() {
            debug!("map already initialized, ignoring");
            return false;
        }
        let Some(mut surface) = container else {
            warn!("no drawing surface to mount the map on");
            return false;
        };

        surface.set_view(default_center, self.config.default_zoom);
        surface.add_tile_layer(&self.tiles);

        let clicks = (!read_only).then(|| ClickCapture::new(self.events.clone()));
        self.mounted = Some(MountedMap {
            surface,
            markers: MarkerReconciler::default(),
            route: RouteRenderer::default(),
            viewport: ViewportController::new(
                default_center,
                self.config.default_zoom,
                self.config.fit_padding,
            ),
            clicks,
        });

        info!(
            lat = default_center.lat,
            lng = default_center.lng,
            read_only,
            "map initialized"
        );
        true
    }

    /// Bring markers and route in line with `points`
    pub fn sync(&mut self, points: &[Point], selected: Option<&PointId>) -> SyncReport {
        let Some(map) = self.mounted.as_mut() else {
            debug!("sync on unmounted map ignored");
            return SyncReport::default();
        };

        self.selection.set(selected.cloned());

        let valid = ValidSet::build(points);
        let diff = map.markers.reconcile(&mut map.surface, &valid, &self.selection);
        let route_vertices = map.route.render(&mut map.surface, &valid);

        debug!(
            markers = map.markers.len(),
            created = diff.created,
            removed = diff.removed,
            route_vertices,
            "sync pass complete"
        );

        SyncReport {
            created: diff.created,
            updated: diff.updated,
            removed: diff.removed,
            invalid: valid.invalid,
            route_vertices,
        }
    }

    /// Toggle `id` and notify listeners; returns the new selection
    pub fn toggle_selection(&mut self, id: &PointId) -> Option<PointId> {
        let Some(map) = self.mounted.as_mut() else {
            return None;
        };

        let change = self.selection.toggle(id);
        Self::apply_highlights(map, &change);
        self.notify(MapEvent::PointSelected(change.current.clone()));
        change.current
    }

    /// Clear the selection on behalf of an outside caller
    pub fn deselect(&mut self) {
        let Some(map) = self.mounted.as_mut() else {
            return;
        };
        let change = self.selection.clear();
        Self::apply_highlights(map, &change);
    }

    fn apply_highlights(map: &mut MountedMap<S>, change: &SelectionChange) {
        for id in change.affected() {
            let selected = change.current.as_ref() == Some(id);
            map.markers.set_highlight(&mut map.surface, id, selected);
        }
    }

    /// Route a click on the map surface: markers select, empty map requests a point
    pub fn click(&mut self, pos: ScreenPos) -> ClickOutcome {
        let hit = {
            let Some(map) = self.mounted.as_ref() else {
                return ClickOutcome::Ignored;
            };
            map.surface
                .marker_at(pos)
                .and_then(|overlay| map.markers.id_of(overlay).cloned())
        };

        if let Some(id) = hit {
            return ClickOutcome::Selected(self.toggle_selection(&id));
        }

        match &self.mounted {
            Some(MountedMap {
                surface,
                clicks: Some(capture),
                ..
            }) => {
                let at = surface.to_latlng(pos);
                capture.capture(at);
                ClickOutcome::CreationRequested(at)
            }
            _ => ClickOutcome::Ignored,
        }
    }

    /// Enable or disable click capture on the live map
    pub fn set_read_only(&mut self, read_only: bool) {
        let Some(map) = self.mounted.as_mut() else {
            return;
        };
        if read_only {
            map.clicks = None;
        } else if map.clicks.is_none() {
            map.clicks = Some(ClickCapture::new(self.events.clone()));
        }
        debug!(read_only, "click capture updated");
    }

    pub fn fit_to_points(&mut self, points: &[Point]) -> Option<ViewportChange> {
        let map = self.mounted.as_mut()?;
        Some(map.viewport.fit_to_points(&mut map.surface, points))
    }

    pub fn reset_viewport(&mut self) -> Option<ViewportChange> {
        let map = self.mounted.as_mut()?;
        Some(map.viewport.reset(&mut map.surface))
    }

    /// Detach all overlays and release the widget
    pub fn dispose(&mut self) {
        let Some(mut map) = self.mounted.take() else {
            return;
        };
        map.markers.clear(&mut map.surface);
        map.route.clear(&mut map.surface);
        map.surface.release();
        info!("map disposed");
    }

    pub fn is_live(&self) -> bool {
        self.mounted.is_some()
    }

    pub fn is_read_only(&self) -> bool {
        self.mounted.as_ref().map_or(true, |m| m.clicks.is_none())
    }

    pub fn selected(&self) -> Option<&PointId> {
        self.selection.selected()
    }

    pub fn marker_count(&self) -> usize {
        self.mounted.as_ref().map_or(0, |m| m.markers.len())
    }

    pub fn surface(&self) -> Option<&S> {
        self.mounted.as_ref().map(|m| &m.surface)
    }

    pub fn surface_mut(&mut self) -> Option<&mut S> {
        self.mounted.as_mut().map(|m| &mut m.surface)
    }

    fn notify(&self, event: MapEvent) {
        if self.events.send(event).is_err() {
            debug!("map event dropped, no listener");
        }
    }
}

impl<S: MapSurface> Drop for MapEngine<S> {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::testing::RecordingSurface;
    use super::*;
    use crossbeam_channel::Receiver;
    use std::collections::BTreeSet;

    const PARIS: LatLng = LatLng::new(48.8566, 2.3522);

    fn engine() -> (MapEngine<RecordingSurface>, Receiver<MapEvent>) {
        let (tx, rx) = crossbeam_channel::unbounded();
        (MapEngine::from_config(&TourMapConfig::default(), tx), rx)
    }

    fn mounted(read_only: bool) -> (MapEngine<RecordingSurface>, RecordingSurface, Receiver<MapEvent>) {
        let (mut engine, rx) = engine();
        let surface = RecordingSurface::new();
        assert!(engine.initialize(Some(surface.clone()), PARIS, read_only));
        (engine, surface, rx)
    }

    fn marker_ids(engine: &MapEngine<RecordingSurface>) -> BTreeSet<PointId> {
        engine
            .mounted
            .as_ref()
            .map(|m| m.markers.ids().cloned().collect())
            .unwrap_or_default()
    }

    fn tour() -> Vec<Point> {
        vec![
            Point::new("A", "Sacre-Coeur", "48.8867", "2.3431").with_order(2),
            Point::new("B", "Opera", "48.8720", "2.3316").with_order(1),
            Point::new("C", "Pantheon", "48.8462", "2.3464").with_order(3),
        ]
    }

    #[test]
    fn test_initialize_sets_view_and_tiles() {
        let (engine, surface, _rx) = mounted(false);
        let state = surface.state();
        assert_eq!(state.camera.center, PARIS);
        assert_eq!(state.camera.zoom, 13.0);
        assert_eq!(state.tile_layers.len(), 1);
        assert!(!engine.is_read_only());
    }

    #[test]
    fn test_double_initialize_is_noop() {
        let (mut engine, surface, _rx) = mounted(false);
        let other = RecordingSurface::new();
        assert!(!engine.initialize(Some(other.clone()), LatLng::new(0.0, 0.0), true));
        assert!(other.state().tile_layers.is_empty());
        assert_eq!(surface.state().tile_layers.len(), 1);
        assert!(!engine.is_read_only());
    }

    #[test]
    fn test_missing_surface_then_valid_surface() {
        let (mut engine, _rx) = engine();
        assert!(!engine.initialize(None, PARIS, false));
        assert!(!engine.is_live());
        assert_eq!(engine.sync(&tour(), None), SyncReport::default());

        assert!(engine.initialize(Some(RecordingSurface::new()), PARIS, false));
        assert_eq!(engine.sync(&tour(), None).created, 3);
    }

    #[test]
    fn test_marker_set_matches_valid_points() {
        let (mut engine, _surface, _rx) = mounted(false);
        let snapshots = vec![
            tour(),
            vec![
                Point::new(1, "ok", "10", "10"),
                Point::new(2, "bad lat", "x", "10"),
                Point::new(3, "bad lng", "10", ""),
            ],
            vec![],
            vec![Point::new("A", "again", "48.8867", "2.3431")],
        ];

        for points in snapshots {
            engine.sync(&points, None);
            let expected: BTreeSet<PointId> = points
                .iter()
                .filter(|p| p.coordinates().is_ok())
                .map(|p| p.id.clone())
                .collect();
            assert_eq!(marker_ids(&engine), expected);
        }
    }

    #[test]
    fn test_sync_is_idempotent() {
        let (mut engine, surface, _rx) = mounted(false);
        let points = tour();
        let selected = PointId::from("B");

        engine.sync(&points, Some(&selected));
        let overlays_once = surface.state().overlays.len();
        let report = engine.sync(&points, Some(&selected));

        assert_eq!(report.created, 0);
        assert_eq!(report.updated, 3);
        let state = surface.state();
        assert_eq!(state.overlays.len(), overlays_once);
        assert_eq!(state.routes().len(), 1);
        assert_eq!(state.markers().count(), 3);
    }

    #[test]
    fn test_route_visits_points_by_order() {
        let (mut engine, surface, _rx) = mounted(false);
        let report = engine.sync(&tour(), None);
        assert_eq!(report.route_vertices, 3);

        let state = surface.state();
        let routes = state.routes();
        assert_eq!(
            routes[0],
            &vec![
                LatLng::new(48.8720, 2.3316),
                LatLng::new(48.8867, 2.3431),
                LatLng::new(48.8462, 2.3464),
            ]
        );
    }

    #[test]
    fn test_partial_validity() {
        let (mut engine, surface, _rx) = mounted(false);
        let points = vec![
            Point::new(1, "good", "48.85", "2.35"),
            Point::new(2, "bad", "bad", "2.3"),
        ];
        let report = engine.sync(&points, None);

        assert_eq!(marker_ids(&engine), BTreeSet::from([PointId::from(1)]));
        assert_eq!(report.invalid, vec![PointId::from(2)]);
        assert_eq!(report.route_vertices, 0);
        assert!(surface.state().routes().is_empty());
    }

    #[test]
    fn test_deletion_removes_marker_and_route() {
        let (mut engine, surface, _rx) = mounted(false);
        let mut points = tour();
        points.truncate(2);
        engine.sync(&points, None);
        assert_eq!(surface.state().routes().len(), 1);

        points.truncate(1);
        let report = engine.sync(&points, None);
        assert_eq!(report.removed, 1);
        assert_eq!(marker_ids(&engine), BTreeSet::from([PointId::from("A")]));
        assert!(surface.state().routes().is_empty());
        assert_eq!(surface.state().overlays.len(), 1);
    }

    #[test]
    fn test_marker_click_toggles_and_notifies() {
        let (mut engine, surface, rx) = mounted(false);
        let points = tour();
        engine.sync(&points, None);

        let opera = RecordingSurface::screen_of(LatLng::new(48.8720, 2.3316));
        assert_eq!(
            engine.click(opera),
            ClickOutcome::Selected(Some(PointId::from("B")))
        );
        assert_eq!(
            rx.try_recv().unwrap(),
            MapEvent::PointSelected(Some(PointId::from("B")))
        );
        assert_eq!(
            surface.state().marker_titled("Opera").unwrap().1.highlight,
            Highlight::Selected
        );

        assert_eq!(engine.click(opera), ClickOutcome::Selected(None));
        assert_eq!(rx.try_recv().unwrap(), MapEvent::PointSelected(None));
        assert_eq!(
            surface.state().marker_titled("Opera").unwrap().1.highlight,
            Highlight::Default
        );
    }

    #[test]
    fn test_toggle_moves_highlight() {
        let (mut engine, surface, _rx) = mounted(true);
        engine.sync(&tour(), None);

        engine.toggle_selection(&PointId::from("A"));
        engine.toggle_selection(&PointId::from("C"));

        assert_eq!(engine.selected(), Some(&PointId::from("C")));
        let state = surface.state();
        let selected: Vec<_> = state
            .markers()
            .filter(|(_, s)| s.highlight == Highlight::Selected)
            .map(|(_, s)| s.title.clone())
            .collect();
        assert_eq!(selected, vec!["Pantheon".to_string()]);
    }

    #[test]
    fn test_external_deselect_is_silent() {
        let (mut engine, surface, rx) = mounted(false);
        let points = tour();
        engine.sync(&points, Some(&PointId::from("B")));
        assert_eq!(
            surface.state().marker_titled("Opera").unwrap().1.highlight,
            Highlight::Selected
        );

        engine.deselect();

        assert_eq!(engine.selected(), None);
        assert!(surface
            .state()
            .markers()
            .all(|(_, s)| s.highlight == Highlight::Default));
        assert!(rx.try_recv().is_err());

        // a marker click afterwards selects again rather than toggling off
        let opera = RecordingSurface::screen_of(LatLng::new(48.8720, 2.3316));
        assert_eq!(
            engine.click(opera),
            ClickOutcome::Selected(Some(PointId::from("B")))
        );
    }

    #[test]
    fn test_unknown_external_selection_highlights_nothing() {
        let (mut engine, surface, _rx) = mounted(false);
        engine.sync(&tour(), Some(&PointId::from(99)));
        assert!(surface
            .state()
            .markers()
            .all(|(_, s)| s.highlight == Highlight::Default));
    }

    #[test]
    fn test_empty_map_click_requests_point() {
        let (mut engine, _surface, rx) = mounted(false);
        engine.sync(&tour(), None);

        let outcome = engine.click(ScreenPos::new(235, 4880));
        assert_eq!(outcome, ClickOutcome::CreationRequested(LatLng::new(48.80, 2.35)));
        assert_eq!(
            rx.try_recv().unwrap(),
            MapEvent::PointCreationRequested(LatLng::new(48.80, 2.35))
        );
        assert_eq!(engine.marker_count(), 3);
    }

    #[test]
    fn test_read_only_suppresses_creation() {
        let (mut engine, _surface, rx) = mounted(true);
        engine.sync(&tour(), None);
        assert_eq!(engine.click(ScreenPos::new(235, 4880)), ClickOutcome::Ignored);
        assert!(rx.try_recv().is_err());

        engine.set_read_only(false);
        assert!(matches!(
            engine.click(ScreenPos::new(235, 4880)),
            ClickOutcome::CreationRequested(_)
        ));

        engine.set_read_only(true);
        assert_eq!(engine.click(ScreenPos::new(235, 4880)), ClickOutcome::Ignored);
    }

    #[test]
    fn test_viewport_commands() {
        let (mut engine, surface, _rx) = mounted(false);
        let points = vec![
            Point::new(1, "sw", "48.80", "2.30"),
            Point::new(2, "ne", "48.90", "2.40"),
        ];
        assert!(matches!(
            engine.fit_to_points(&points),
            Some(ViewportChange::Fitted(_))
        ));
        assert!(surface.state().fitted.is_some());

        assert_eq!(engine.reset_viewport(), Some(ViewportChange::Reset));
        assert_eq!(surface.state().camera.center, PARIS);
        assert_eq!(engine.fit_to_points(&[]), Some(ViewportChange::Reset));
    }

    #[test]
    fn test_dispose_releases_once_and_silences_everything() {
        let (mut engine, surface, rx) = mounted(false);
        engine.sync(&tour(), None);

        engine.dispose();
        engine.dispose();
        {
            let state = surface.state();
            assert_eq!(state.releases, 1);
            assert!(state.overlays.is_empty());
        }

        assert_eq!(engine.sync(&tour(), None), SyncReport::default());
        assert_eq!(engine.click(ScreenPos::new(235, 4880)), ClickOutcome::Ignored);
        assert_eq!(engine.toggle_selection(&PointId::from("A")), None);
        assert_eq!(engine.fit_to_points(&tour()), None);
        assert_eq!(engine.reset_viewport(), None);
        assert!(rx.try_recv().is_err());
        assert_eq!(surface.state().markers_added, 3);

        let fresh = RecordingSurface::new();
        assert!(engine.initialize(Some(fresh.clone()), PARIS, false));
        assert_eq!(engine.sync(&tour(), None).created, 3);
        assert_eq!(fresh.state().markers().count(), 3);
    }

    #[test]
    fn test_drop_releases_surface() {
        let (engine, surface, _rx) = mounted(true);
        drop(engine);
        assert_eq!(surface.state().releases, 1);
    }
}
