use glam::DVec2;
use std::f64::consts::PI;

/// Pixels per tile edge; the world is `TILE_SIZE * 2^zoom` pixels wide
pub const TILE_SIZE: f64 = 256.0;

/// Web Mercator cannot reach the poles
const MAX_LATITUDE: f64 = 85.051_128_78;

/// Web Mercator position normalized to [0, 1] on both axes
#[inline(always)]
pub fn mercator(lon: f64, lat: f64) -> DVec2 {
    let lat_rad = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    DVec2::new(
        (lon + 180.0) / 360.0,
        (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0,
    )
}

/// Inverse of [`mercator`], returns (lon, lat)
#[inline(always)]
pub fn inverse_mercator(m: DVec2) -> (f64, f64) {
    let lon = m.x * 360.0 - 180.0;
    let lat = (PI * (1.0 - 2.0 * m.y)).sinh().atan().to_degrees();
    (lon, lat)
}

/// Viewport representing the visible map area and zoom level
#[derive(Clone, Debug)]
pub struct Viewport {
    /// Center longitude (-180 to 180)
    pub center_lon: f64,
    /// Center latitude (-85 to 85)
    pub center_lat: f64,
    /// Zoom level in tile levels (0 = whole world in one tile)
    pub zoom: f64,
    /// Canvas pixel width
    pub width: usize,
    /// Canvas pixel height
    pub height: usize,
    pub min_zoom: f64,
    pub max_zoom: f64,
}

impl Viewport {
    pub fn new(center_lon: f64, center_lat: f64, zoom: f64, width: usize, height: usize) -> Self {
        Self {
            center_lon,
            center_lat,
            zoom,
            width,
            height,
            min_zoom: 0.0,
            max_zoom: 20.0,
        }
    }

    pub fn with_zoom_limits(mut self, min_zoom: f64, max_zoom: f64) -> Self {
        self.min_zoom = min_zoom;
        self.max_zoom = max_zoom.max(min_zoom);
        self.zoom = self.zoom.clamp(self.min_zoom, self.max_zoom);
        self
    }

    /// World width in pixels at the current zoom
    #[inline(always)]
    fn world_size(&self) -> f64 {
        TILE_SIZE * self.zoom.exp2()
    }

    fn half_extent(&self) -> DVec2 {
        DVec2::new(self.width as f64, self.height as f64) / 2.0
    }

    pub fn set_view(&mut self, lon: f64, lat: f64, zoom: f64) {
        self.center_lon = lon;
        self.center_lat = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE);
        self.zoom = zoom.clamp(self.min_zoom, self.max_zoom);
    }

    /// Pan the viewport by pixel delta
    pub fn pan(&mut self, dx: i32, dy: i32) {
        let world = self.world_size();
        let center = mercator(self.center_lon, self.center_lat) + DVec2::new(dx as f64, dy as f64) / world;
        let (mut lon, lat) = inverse_mercator(DVec2::new(center.x, center.y.clamp(0.0, 1.0)));

        // Wrap longitude
        if lon > 180.0 {
            lon -= 360.0;
        } else if lon < -180.0 {
            lon += 360.0;
        }

        self.center_lon = lon;
        self.center_lat = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE);
    }

    /// Zoom in one level
    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom + 1.0).min(self.max_zoom);
    }

    /// Zoom out one level
    pub fn zoom_out(&mut self) {
        self.zoom = (self.zoom - 1.0).max(self.min_zoom);
    }

    /// Zoom in towards a specific pixel location
    pub fn zoom_in_at(&mut self, px: i32, py: i32) {
        self.zoom_at(px, py, 1.0);
    }

    /// Zoom out from a specific pixel location
    pub fn zoom_out_at(&mut self, px: i32, py: i32) {
        self.zoom_at(px, py, -1.0);
    }

    /// Change zoom by `delta` levels keeping the point under (px, py) fixed
    fn zoom_at(&mut self, px: i32, py: i32, delta: f64) {
        let (lon, lat) = self.unproject(px, py);
        self.zoom = (self.zoom + delta).clamp(self.min_zoom, self.max_zoom);

        let (new_px, new_py) = self.project(lon, lat);
        self.pan(new_px - px, new_py - py);
    }

    /// Unproject pixel coordinates back to geographic coordinates (lon, lat)
    pub fn unproject(&self, px: i32, py: i32) -> (f64, f64) {
        let offset = DVec2::new(px as f64, py as f64) - self.half_extent();
        let m = mercator(self.center_lon, self.center_lat) + offset / self.world_size();
        inverse_mercator(m)
    }

    /// Unrounded pixel position of a geographic coordinate (lon, lat)
    pub fn to_pixel(&self, lon: f64, lat: f64) -> DVec2 {
        let delta = mercator(lon, lat) - mercator(self.center_lon, self.center_lat);
        delta * self.world_size() + self.half_extent()
    }

    /// Project a geographic coordinate (lon, lat) to pixel coordinates
    pub fn project(&self, lon: f64, lat: f64) -> (i32, i32) {
        let p = self.to_pixel(lon, lat).floor();
        (p.x as i32, p.y as i32)
    }

    /// Center on the bounds and pick the largest whole zoom at which they fit
    /// inside the viewport with `padding` pixels spare on every side.
    pub fn fit_bounds(&mut self, south: f64, west: f64, north: f64, east: f64, padding: u16) {
        let sw = mercator(west, south);
        let ne = mercator(east, north);
        let extent = (ne - sw).abs();

        let pad = 2.0 * padding as f64;
        let avail = DVec2::new(
            (self.width as f64 - pad).max(1.0),
            (self.height as f64 - pad).max(1.0),
        );

        let scale = DVec2::new(
            if extent.x > f64::EPSILON { avail.x / extent.x } else { f64::INFINITY },
            if extent.y > f64::EPSILON { avail.y / extent.y } else { f64::INFINITY },
        )
        .min_element();

        let zoom = if scale.is_finite() {
            (scale / TILE_SIZE).log2().floor()
        } else {
            self.max_zoom
        };

        let (lon, lat) = inverse_mercator((sw + ne) / 2.0);
        self.center_lon = lon;
        self.center_lat = lat;
        self.zoom = zoom.clamp(self.min_zoom, self.max_zoom);
    }

    /// Check if a projected point is visible in the viewport
    pub fn is_visible(&self, px: i32, py: i32) -> bool {
        px >= 0 && px < self.width as i32 && py >= 0 && py < self.height as i32
    }
}
