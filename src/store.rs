//! In-memory tour backed by a JSON file.

use crate::error::{Result, TourMapError};
use crate::point::{LatLng, Point, PointId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// On-disk shape of a tour file
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Tour {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub points: Vec<Point>,
}

/// The tour being edited, plus where it is saved
#[derive(Debug, Default)]
pub struct PointStore {
    tour: Tour,
    path: Option<PathBuf>,
    dirty: bool,
}

impl PointStore {
    /// Empty tour that has no file yet
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            tour: Tour {
                name: name.into(),
                ..Tour::default()
            },
            path: None,
            dirty: false,
        }
    }

    /// Load a tour file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let tour: Tour = serde_json::from_str(&content)?;
        info!(path = %path.display(), points = tour.points.len(), "tour loaded");
        Ok(Self {
            tour,
            path: Some(path.to_path_buf()),
            dirty: false,
        })
    }

    /// Write the tour back to the file it came from
    pub fn save(&mut self) -> Result<&Path> {
        let path = self
            .path
            .as_deref()
            .ok_or_else(|| TourMapError::Tour("tour has no file to save to".to_string()))?;
        let json = serde_json::to_string_pretty(&self.tour)?;
        fs::write(path, json)?;
        self.dirty = false;
        debug!(path = %path.display(), "tour saved");
        Ok(path)
    }

    pub fn name(&self) -> &str {
        &self.tour.name
    }

    pub fn tour(&self) -> &Tour {
        &self.tour
    }

    /// Unsaved changes since the last load or save
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Snapshot in storage order
    pub fn points(&self) -> &[Point] {
        &self.tour.points
    }

    pub fn get(&self, id: &PointId) -> Option<&Point> {
        self.tour.points.iter().find(|p| &p.id == id)
    }

    /// Points sorted by tour order; unordered points count as 0 and ties keep storage order
    pub fn by_order(&self) -> Vec<&Point> {
        let mut points: Vec<&Point> = self.tour.points.iter().collect();
        points.sort_by_key(|p| p.sort_key());
        points
    }

    /// Add a point at `at` and return its new id
    pub fn add_point(&mut self, at: LatLng) -> PointId {
        let next = self.next_numeric_id();
        let max_order = self.tour.points.iter().filter_map(|p| p.order).max().unwrap_or(0);
        let order = max_order.checked_add(1).unwrap_or_else(|| {
            warn!(max_order, "tour order exhausted, reusing the last position");
            max_order
        });

        let id = PointId::Num(next);
        let point = Point::new(
            next,
            format!("Point {next}"),
            format!("{:.6}", at.lat),
            format!("{:.6}", at.lng),
        )
        .with_order(order);
        self.tour.points.push(point);
        self.dirty = true;
        debug!(%id, order, "point added");
        id
    }

    /// One past the largest numeric id, or the smallest free positive id
    /// once that would overflow
    fn next_numeric_id(&self) -> i64 {
        let used: HashSet<i64> = self
            .tour
            .points
            .iter()
            .filter_map(|p| match p.id {
                PointId::Num(n) => Some(n),
                PointId::Text(_) => None,
            })
            .collect();
        let max = used.iter().copied().max().unwrap_or(0);

        max.checked_add(1).unwrap_or_else(|| {
            warn!(max, "numeric point ids exhausted, filling a gap");
            // more candidates than points, so one is free
            (1..).find(|n| !used.contains(n)).unwrap_or(max)
        })
    }

    /// Remove a point, returning it if it existed
    pub fn remove_point(&mut self, id: &PointId) -> Option<Point> {
        let idx = self.tour.points.iter().position(|p| &p.id == id)?;
        self.dirty = true;
        Some(self.tour.points.remove(idx))
    }
}
