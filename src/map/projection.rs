use glam::DVec2;
use std::f64::consts::PI;

use crate::map::polygon::BoundingBox;

/// Latitude at which Web Mercator becomes a square world
pub const MAX_MERCATOR_LAT: f64 = 85.051_128_779_806_6;

/// Web Mercator x in [0, 1) per world width. Longitudes outside
/// [-180, 180] keep going linearly, which is what the buffer slots rely on.
#[inline(always)]
fn mercator_x(lon: f64) -> f64 {
    (lon + 180.0) / 360.0
}

#[inline(always)]
fn mercator_y(lat: f64) -> f64 {
    let lat_rad = lat.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT) * PI / 180.0;
    (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0
}

#[inline(always)]
fn inverse_mercator_y(y: f64) -> f64 {
    (PI * (1.0 - 2.0 * y)).sinh().atan() * 180.0 / PI
}

/// Viewport representing the visible map area and zoom level.
///
/// One projection (Web Mercator) serves both drawing and the pixel to
/// geographic mapping used by hit-testing. The center longitude is not
/// wrapped: the world buffer supplies the copies that make panning endless.
#[derive(Clone, Debug)]
pub struct Viewport {
    /// Center longitude, unbounded
    pub center_lon: f64,
    /// Center latitude (clamped to the Mercator range)
    pub center_lat: f64,
    /// Pixels per world width = zoom * width
    pub zoom: f64,
    /// Width in braille pixels
    pub width: usize,
    /// Height in braille pixels
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

    /// Whole-world view, slightly north of the equator
    pub fn world(width: usize, height: usize) -> Self {
        Self::new(0.0, 20.0, 1.0, width, height)
    }

    #[inline(always)]
    fn scale(&self) -> f64 {
        self.zoom * self.width as f64
    }

    #[inline(always)]
    fn center(&self) -> DVec2 {
        DVec2::new(mercator_x(self.center_lon), mercator_y(self.center_lat))
    }

    /// Move the view by a pixel delta; longitude is left unwrapped
    pub fn pan(&mut self, dx: i32, dy: i32) {
        let scale = 360.0 / self.scale();
        self.center_lon += dx as f64 * scale;
        self.center_lat -= dy as f64 * scale * 0.5; // Mercator distortion
        self.center_lat = self.center_lat.clamp(-85.0, 85.0);
    }

    /// Center longitude folded into [-180, 180) for display
    pub fn wrapped_center_lon(&self) -> f64 {
        crate::geo::wrap_lon(self.center_lon)
    }

    /// One zoom step in, around the view center
    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom * 1.5).min(100.0);
    }

    /// One zoom step out, around the view center
    pub fn zoom_out(&mut self) {
        self.zoom = (self.zoom / 1.5).max(0.5);
    }

    /// One zoom step in, keeping the pixel under the pointer fixed
    pub fn zoom_in_at(&mut self, px: i32, py: i32) {
        self.zoom_at(px, py, 1.5);
    }

    /// One zoom step out, keeping the pixel under the pointer fixed
    pub fn zoom_out_at(&mut self, px: i32, py: i32) {
        self.zoom_at(px, py, 1.0 / 1.5);
    }

    /// Zoom by factor, keeping the point under the pointer fixed
    fn zoom_at(&mut self, px: i32, py: i32, factor: f64) {
        let (lon, lat) = self.unproject(px, py);

        self.zoom = (self.zoom * factor).clamp(0.5, 100.0);

        let (new_px, new_py) = self.project(lon, lat);
        self.pan(new_px - px, new_py - py);
    }

    /// Exact projection to fractional pixel coordinates
    pub fn project_f(&self, lon: f64, lat: f64) -> DVec2 {
        let p = DVec2::new(mercator_x(lon), mercator_y(lat));
        let half = DVec2::new(self.width as f64, self.height as f64) / 2.0;
        (p - self.center()) * self.scale() + half
    }

    /// Exact inverse of `project_f`
    pub fn unproject_f(&self, x: f64, y: f64) -> DVec2 {
        let half = DVec2::new(self.width as f64, self.height as f64) / 2.0;
        let p = (DVec2::new(x, y) - half) / self.scale() + self.center();
        DVec2::new(p.x * 360.0 - 180.0, inverse_mercator_y(p.y))
    }

    /// Rounded `project_f`
    pub fn project(&self, lon: f64, lat: f64) -> (i32, i32) {
        let p = self.project_f(lon, lat);
        (p.x.floor() as i32, p.y.floor() as i32)
    }

    /// Inverse of `project`
    pub fn unproject(&self, px: i32, py: i32) -> (f64, f64) {
        let p = self.unproject_f(px as f64, py as f64);
        (p.x, p.y)
    }

    /// Geographic extent of the canvas, for culling
    pub fn visible_bounds(&self) -> BoundingBox {
        let top_left = self.unproject_f(0.0, 0.0);
        let bottom_right = self.unproject_f(self.width as f64, self.height as f64);
        BoundingBox::new(top_left.x, bottom_right.y, bottom_right.x, top_left.y)
    }

    /// Cheap bbox test used to cull outline segments before rasterising
    pub fn line_might_be_visible(&self, p1: (i32, i32), p2: (i32, i32)) -> bool {
        let min_x = p1.0.min(p2.0);
        let max_x = p1.0.max(p2.0);
        let min_y = p1.1.min(p2.1);
        let max_y = p1.1.max(p2.1);

        max_x >= 0 && min_x < self.width as i32 && max_y >= 0 && min_y < self.height as i32
    }
}
