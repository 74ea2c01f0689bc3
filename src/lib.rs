//! Map reconciliation for a tour of points of interest.
//!
//! [`engine::MapEngine`] keeps a map widget's markers, route line, selection
//! highlight and viewport consistent with a snapshot of [`point::Point`]s.
//! [`map::TerminalSurface`] is a Braille terminal implementation of the widget.

pub mod braille;
pub mod config;
pub mod engine;
pub mod error;
pub mod map;
pub mod point;
pub mod store;

pub use config::{MapConfig, TileProvider, TourMapConfig};
pub use engine::{MapEngine, MapEvent, MapSurface, SyncReport};
pub use error::{Result, TourMapError};
pub use point::{LatLng, LatLngBounds, Point, PointId};
pub use store::{PointStore, Tour};
