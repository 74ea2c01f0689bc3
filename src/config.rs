//! Configuration loading for tour-map

use crate::error::Result;
use crate::point::LatLng;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct TourMapConfig {
    #[serde(default)]
    pub map: MapConfig,
    #[serde(default)]
    pub tiles: TileProvider,
}

/// Camera defaults for the map engine
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct MapConfig {
    /// Where the map opens and where "reset" returns to (default: Paris)
    #[serde(default = "default_center")]
    pub default_center: LatLng,

    /// Zoom level used with the default center (default: 13)
    #[serde(default = "default_zoom")]
    pub default_zoom: f64,

    /// Lowest zoom a fit may choose (default: 1)
    #[serde(default = "default_min_zoom")]
    pub min_zoom: f64,

    /// Highest zoom a fit may choose (default: 18)
    #[serde(default = "default_max_zoom")]
    pub max_zoom: f64,

    /// Margin kept between fitted points and the viewport edge, in pixels (default: 8)
    #[serde(default = "default_fit_padding")]
    pub fit_padding: u16,
}

/// Where base map imagery comes from
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct TileProvider {
    /// Tile URL or local path template
    #[serde(default = "default_url_template")]
    pub url_template: String,

    /// Attribution shown alongside the map
    #[serde(default = "default_attribution")]
    pub attribution: String,
}

fn default_center() -> LatLng {
    LatLng::new(48.8566, 2.3522)
}
fn default_zoom() -> f64 {
    13.0
}
fn default_min_zoom() -> f64 {
    1.0
}
fn default_max_zoom() -> f64 {
    18.0
}
fn default_fit_padding() -> u16 {
    8
}
fn default_url_template() -> String {
    "data/ne_{res}_coastline.json".to_string()
}
fn default_attribution() -> String {
    "Made with Natural Earth".to_string()
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            default_center: default_center(),
            default_zoom: default_zoom(),
            min_zoom: default_min_zoom(),
            max_zoom: default_max_zoom(),
            fit_padding: default_fit_padding(),
        }
    }
}

impl Default for TileProvider {
    fn default() -> Self {
        Self {
            url_template: default_url_template(),
            attribution: default_attribution(),
        }
    }
}

impl TourMapConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: TourMapConfig = toml::from_str(&content)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TourMapError;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = TourMapConfig::default();
        assert_eq!(config.map.default_center, LatLng::new(48.8566, 2.3522));
        assert_eq!(config.map.default_zoom, 13.0);
        assert_eq!(config.map.fit_padding, 8);
        assert!(config.tiles.url_template.contains("{res}"));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[map]
default_center = {{ lat = 59.3293, lng = 18.0686 }}
fit_padding = 20

[tiles]
url_template = "https://tile.openstreetmap.org/{{z}}/{{x}}/{{y}}.png"
"#
        )
        .unwrap();

        let config = TourMapConfig::load(file.path()).unwrap();
        assert_eq!(config.map.default_center, LatLng::new(59.3293, 18.0686));
        assert_eq!(config.map.fit_padding, 20);
        assert_eq!(config.map.default_zoom, 13.0);
        assert!(config.tiles.url_template.starts_with("https://"));
        assert_eq!(config.tiles.attribution, "Made with Natural Earth");
    }

    #[test]
    fn test_bad_file_is_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[map]\ndefault_zoom = \"high\"").unwrap();
        assert!(matches!(
            TourMapConfig::load(file.path()),
            Err(TourMapError::Config(_))
        ));
    }
}
