use crate::error::{Result, TourMapError};
use geojson::{GeoJson, Geometry, Value};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// A geographic line (sequence of lon/lat coordinates)
pub type LineString = Vec<(f64, f64)>;

/// Level of detail for base map data
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lod {
    Low,    // 110m - world view
    Medium, // 50m - continental
    High,   // 10m - regional and closer
}

impl Lod {
    const ALL: [Lod; 3] = [Lod::Low, Lod::Medium, Lod::High];

    /// Select LOD based on tile zoom level
    pub fn from_zoom(zoom: f64) -> Self {
        if zoom < 4.0 {
            Lod::Low
        } else if zoom < 7.0 {
            Lod::Medium
        } else {
            Lod::High
        }
    }

    /// Natural Earth resolution tag substituted for `{res}`
    pub fn resolution(self) -> &'static str {
        match self {
            Lod::Low => "110m",
            Lod::Medium => "50m",
            Lod::High => "10m",
        }
    }

    fn slot(self) -> usize {
        self as usize
    }
}

/// Coastlines drawn underneath the tour overlays
#[derive(Clone, Debug, Default)]
pub struct Basemap {
    lines: [Vec<LineString>; 3],
}

impl Basemap {
    /// Load every resolution a local path template resolves to.
    ///
    /// A template without `{res}` is a single file used at all zoom levels.
    /// Missing files are skipped; unreadable ones are logged and skipped.
    pub fn from_template(template: &str) -> Self {
        let mut basemap = Basemap::default();

        if !template.contains("{res}") {
            basemap.load_file(Path::new(template), Lod::Low);
            return basemap;
        }

        for lod in Lod::ALL {
            let path = template.replace("{res}", lod.resolution());
            basemap.load_file(Path::new(&path), lod);
        }
        basemap
    }

    fn load_file(&mut self, path: &Path, lod: Lod) {
        if !path.exists() {
            debug!(path = %path.display(), "no base map file");
            return;
        }
        if let Err(e) = self.load_coastlines(path, lod) {
            warn!(path = %path.display(), "failed to load base map: {}", e);
        }
    }

    /// Load coastline GeoJSON data
    fn load_coastlines(&mut self, path: &Path, lod: Lod) -> Result<()> {
        let content = fs::read_to_string(path)?;
        let geojson: GeoJson = content
            .parse()
            .map_err(|e: geojson::Error| TourMapError::Config(e.to_string()))?;
        process_geojson_lines(&geojson, |line| self.add_line(line, lod));
        debug!(path = %path.display(), lines = self.lines[lod.slot()].len(), "base map loaded");
        Ok(())
    }

    pub fn add_line(&mut self, line: LineString, lod: Lod) {
        self.lines[lod.slot()].push(line);
    }

    /// Lines for the given LOD, falling back to coarser data
    pub fn lines(&self, lod: Lod) -> &[LineString] {
        Lod::ALL[..=lod.slot()]
            .iter()
            .rev()
            .map(|l| &self.lines[l.slot()])
            .find(|lines| !lines.is_empty())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.lines.iter().all(Vec::is_empty)
    }
}

/// Process GeoJSON and extract line features
fn process_geojson_lines<F>(geojson: &GeoJson, mut add_line: F)
where
    F: FnMut(LineString),
{
    match geojson {
        GeoJson::FeatureCollection(fc) => {
            for geometry in fc.features.iter().filter_map(|f| f.geometry.as_ref()) {
                process_geometry_lines(geometry, &mut add_line);
            }
        }
        GeoJson::Feature(f) => {
            if let Some(ref geometry) = f.geometry {
                process_geometry_lines(geometry, &mut add_line);
            }
        }
        GeoJson::Geometry(geometry) => process_geometry_lines(geometry, &mut add_line),
    }
}

fn to_line(coords: &[Vec<f64>]) -> LineString {
    coords
        .iter()
        .filter(|c| c.len() >= 2)
        .map(|c| (c[0], c[1]))
        .collect()
}

fn process_geometry_lines<F>(geometry: &Geometry, add_line: &mut F)
where
    F: FnMut(LineString),
{
    match &geometry.value {
        Value::LineString(coords) => add_line(to_line(coords)),
        Value::MultiLineString(lines) => lines.iter().for_each(|l| add_line(to_line(l))),
        Value::Polygon(rings) => {
            if let Some(exterior) = rings.first() {
                add_line(to_line(exterior));
            }
        }
        Value::MultiPolygon(polygons) => {
            for exterior in polygons.iter().filter_map(|rings| rings.first()) {
                add_line(to_line(exterior));
            }
        }
        Value::GeometryCollection(geometries) => {
            for g in geometries {
                process_geometry_lines(g, add_line);
            }
        }
        _ => {}
    }
}
