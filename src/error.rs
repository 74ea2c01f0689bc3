//! Error types for tour-map

use crate::point::{Axis, PointId};
use thiserror::Error;

/// tour-map error type
#[derive(Error, Debug)]
pub enum TourMapError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Tour file error: {0}")]
    Tour(String),

    #[error("Invalid {axis} {raw:?} for point {id}")]
    InvalidCoordinate {
        id: PointId,
        axis: Axis,
        raw: String,
    },
}

impl From<toml::de::Error> for TourMapError {
    fn from(e: toml::de::Error) -> Self {
        TourMapError::Config(e.to_string())
    }
}

impl From<serde_json::Error> for TourMapError {
    fn from(e: serde_json::Error) -> Self {
        TourMapError::Tour(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TourMapError>;
