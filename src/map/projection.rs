use glam::DVec2;
use std::f64::consts::PI;

/// Web Mercator is undefined at the poles; clamp to the usual cutoff.
const MAX_LAT: f64 = 85.05;
const MIN_ZOOM: f64 = 0.5;
const MAX_ZOOM: f64 = 40.0;
const ZOOM_STEP: f64 = 1.5;

/// Normalized Mercator coordinates in [0, 1] for a (lon, lat)
#[inline(always)]
fn mercator(lon: f64, lat: f64) -> DVec2 {
    let lat_rad = lat.clamp(-MAX_LAT, MAX_LAT).to_radians();
    DVec2::new(
        (lon + 180.0) / 360.0,
        (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0,
    )
}

/// Visible map area in braille pixels, centered on a geographic point
#[derive(Debug, Clone)]
pub struct Viewport {
    pub center_lon: f64,
    pub center_lat: f64,
    /// 1.0 fits the whole world across the width
    pub zoom: f64,
    pub width: usize,
    pub height: usize,
}

impl Viewport {
    pub fn new(center_lon: f64, center_lat: f64, zoom: f64, width: usize, height: usize) -> Self {
        Self {
            center_lon,
            center_lat,
            zoom,
            width,
            height,
        }
    }

    /// Whole-world view, nudged north where the landmass is
    pub fn world(width: usize, height: usize) -> Self {
        Self::new(0.0, 20.0, 1.0, width, height)
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
    }

    #[inline(always)]
    fn scale(&self) -> f64 {
        self.zoom * self.width as f64
    }

    /// Geographic point to braille pixel (fractional)
    pub fn project(&self, lon: f64, lat: f64) -> DVec2 {
        let offset = mercator(lon, lat) - mercator(self.center_lon, self.center_lat);
        offset * self.scale() + DVec2::new(self.width as f64, self.height as f64) / 2.0
    }

    /// Geographic point to the braille pixel it falls in
    pub fn project_px(&self, lon: f64, lat: f64) -> (i32, i32) {
        let p = self.project(lon, lat);
        (p.x.floor() as i32, p.y.floor() as i32)
    }

    /// Braille pixel back to (lon, lat)
    pub fn unproject(&self, px: f64, py: f64) -> DVec2 {
        let half = DVec2::new(self.width as f64, self.height as f64) / 2.0;
        let m = (DVec2::new(px, py) - half) / self.scale()
            + mercator(self.center_lon, self.center_lat);
        let lon = m.x * 360.0 - 180.0;
        let lat = (PI * (1.0 - 2.0 * m.y)).sinh().atan().to_degrees();
        DVec2::new(lon, lat)
    }

    /// Pan by a braille-pixel delta
    pub fn pan(&mut self, dx: i32, dy: i32) {
        let center = self.project(self.center_lon, self.center_lat);
        let moved = self.unproject(center.x + dx as f64, center.y + dy as f64);
        self.center_lon = moved.x;
        self.center_lat = moved.y.clamp(-MAX_LAT, MAX_LAT);

        if self.center_lon > 180.0 {
            self.center_lon -= 360.0;
        } else if self.center_lon < -180.0 {
            self.center_lon += 360.0;
        }
    }

    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom * ZOOM_STEP).min(MAX_ZOOM);
    }

    pub fn zoom_out(&mut self) {
        self.zoom = (self.zoom / ZOOM_STEP).max(MIN_ZOOM);
    }

    pub fn zoom_in_at(&mut self, px: i32, py: i32) {
        self.zoom_at(px, py, ZOOM_STEP);
    }

    pub fn zoom_out_at(&mut self, px: i32, py: i32) {
        self.zoom_at(px, py, 1.0 / ZOOM_STEP);
    }

    /// Zoom keeping the point under (px, py) fixed on screen
    fn zoom_at(&mut self, px: i32, py: i32, factor: f64) {
        let anchor = self.unproject(px as f64, py as f64);
        self.zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        let (new_px, new_py) = self.project_px(anchor.x, anchor.y);
        self.pan(new_px - px, new_py - py);
    }

    /// Rough bbox check for a projected segment
    pub fn segment_might_be_visible(&self, a: (i32, i32), b: (i32, i32)) -> bool {
        a.0.max(b.0) >= 0
            && a.0.min(b.0) < self.width as i32
            && a.1.max(b.1) >= 0
            && a.1.min(b.1) < self.height as i32
    }
}
