use super::selection::SelectionController;
use super::surface::{Highlight, MapSurface, MarkerStyle};
use crate::point::{LatLng, Point, PointId};
use std::collections::{BTreeMap, HashSet};
use tracing::warn;

/// A point whose coordinates parsed in the current pass
#[derive(Clone, Debug)]
pub struct ValidPoint<'a> {
    /// Position in the supplied snapshot (route tie-break)
    pub index: usize,
    pub point: &'a Point,
    pub at: LatLng,
}

/// Partition of a snapshot into drawable and rejected points
#[derive(Debug, Default)]
pub struct ValidSet<'a> {
    pub points: Vec<ValidPoint<'a>>,
    pub invalid: Vec<PointId>,
}

impl<'a> ValidSet<'a> {
    /// Parse every point, keeping the first occurrence of each id
    pub fn build(points: &'a [Point]) -> Self {
        let mut seen = HashSet::with_capacity(points.len());
        let mut set = ValidSet::default();

        for (index, point) in points.iter().enumerate() {
            match point.coordinates() {
                Ok(at) => {
                    if !seen.insert(&point.id) {
                        warn!(point = %point.id, "duplicate point id in snapshot, keeping first");
                        continue;
                    }
                    set.points.push(ValidPoint { index, point, at });
                }
                Err(e) => {
                    warn!(point = %point.id, "skipping point: {}", e);
                    set.invalid.push(point.id.clone());
                }
            }
        }

        set
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Live marker overlay bound to one point id
#[derive(Clone, Debug, PartialEq)]
pub struct MarkerHandle<O> {
    pub overlay: O,
    pub position: LatLng,
    pub style: MarkerStyle,
}

/// Counts of what one pass did to the marker arena
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MarkerDiff {
    pub created: usize,
    pub updated: usize,
    pub removed: usize,
}

/// Keeps one marker per valid point, keyed by point id
#[derive(Debug)]
pub struct MarkerReconciler<O> {
    handles: BTreeMap<PointId, MarkerHandle<O>>,
}

impl<O> Default for MarkerReconciler<O> {
    fn default() -> Self {
        Self {
            handles: BTreeMap::new(),
        }
    }
}

pub(crate) fn marker_style(point: &Point, selected: bool) -> MarkerStyle {
    MarkerStyle {
        label: point.label(),
        title: point.name.clone(),
        highlight: if selected {
            Highlight::Selected
        } else {
            Highlight::Default
        },
    }
}

impl<O: Copy + Eq + std::fmt::Debug> MarkerReconciler<O> {
    /// Diff the arena against `valid` and apply creates, moves and removals
    pub fn reconcile<S>(
        &mut self,
        surface: &mut S,
        valid: &ValidSet<'_>,
        selection: &SelectionController,
    ) -> MarkerDiff
    where
        S: MapSurface<Overlay = O>,
    {
        let mut diff = MarkerDiff::default();
        let valid_ids: HashSet<&PointId> = valid.points.iter().map(|v| &v.point.id).collect();

        // previous - valid
        let stale: Vec<PointId> = self
            .handles
            .keys()
            .filter(|id| !valid_ids.contains(id))
            .cloned()
            .collect();
        for id in stale {
            if let Some(handle) = self.handles.remove(&id) {
                surface.remove_overlay(handle.overlay);
                diff.removed += 1;
            }
        }

        for v in &valid.points {
            let style = marker_style(v.point, selection.is_selected(&v.point.id));
            match self.handles.get_mut(&v.point.id) {
                Some(handle) => {
                    surface.move_marker(handle.overlay, v.at);
                    handle.position = v.at;
                    surface.restyle_marker(handle.overlay, &style);
                    handle.style = style;
                    diff.updated += 1;
                }
                None => {
                    let overlay = surface.add_marker(v.at, &style);
                    self.handles.insert(
                        v.point.id.clone(),
                        MarkerHandle {
                            overlay,
                            position: v.at,
                            style,
                        },
                    );
                    diff.created += 1;
                }
            }
        }

        diff
    }

    /// Re-apply highlight state to one marker without a full pass
    pub fn set_highlight<S>(&mut self, surface: &mut S, id: &PointId, selected: bool)
    where
        S: MapSurface<Overlay = O>,
    {
        if let Some(handle) = self.handles.get_mut(id) {
            handle.style.highlight = if selected {
                Highlight::Selected
            } else {
                Highlight::Default
            };
            surface.restyle_marker(handle.overlay, &handle.style);
        }
    }

    /// Point bound to a widget overlay
    pub fn id_of(&self, overlay: O) -> Option<&PointId> {
        self.handles
            .iter()
            .find(|(_, h)| h.overlay == overlay)
            .map(|(id, _)| id)
    }

    #[cfg(test)]
    pub fn get(&self, id: &PointId) -> Option<&MarkerHandle<O>> {
        self.handles.get(id)
    }

    #[cfg(test)]
    pub fn ids(&self) -> impl Iterator<Item = &PointId> {
        self.handles.keys()
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Detach every marker from the widget
    pub fn clear<S>(&mut self, surface: &mut S)
    where
        S: MapSurface<Overlay = O>,
    {
        for (_, handle) in std::mem::take(&mut self.handles) {
            surface.remove_overlay(handle.overlay);
        }
    }
}
