use crate::config::{INITIAL_CENTER, INITIAL_ZOOM, MAX_ZOOM, MIN_ZOOM};
use crate::extent::Extent;

/// Meters per pixel at zoom 0 for 256px tiles.
pub const RESOLUTION_Z0: f64 = 156_543.033_928_040_97;
const WHEEL_ZOOM_SENSITIVITY: f64 = 0.002;

/// Viewport manages the transformation between projected map coordinates
/// (EPSG:3857, y up) and canvas pixels (y down).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub center_x: f64,
    pub center_y: f64,
    pub zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            center_x: INITIAL_CENTER.0,
            center_y: INITIAL_CENTER.1,
            zoom: INITIAL_ZOOM,
        }
    }
}

pub fn resolution_for_zoom(zoom: f64) -> f64 {
    RESOLUTION_Z0 / 2f64.powf(zoom)
}

pub fn zoom_for_resolution(resolution: f64) -> f64 {
    (RESOLUTION_Z0 / resolution).log2()
}

impl Viewport {
    pub fn new(center_x: f64, center_y: f64, zoom: f64) -> Self {
        Self {
            center_x,
            center_y,
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
        }
    }

    pub fn resolution(&self) -> f64 {
        resolution_for_zoom(self.zoom)
    }

    /// Convert map coordinates to canvas pixels.
    pub fn world_to_screen(&self, wx: f64, wy: f64, width: f64, height: f64) -> (f64, f64) {
        let res = self.resolution();
        (
            (wx - self.center_x) / res + width / 2.0,
            (self.center_y - wy) / res + height / 2.0,
        )
    }

    /// Convert canvas pixels to map coordinates.
    pub fn screen_to_world(&self, sx: f64, sy: f64, width: f64, height: f64) -> (f64, f64) {
        let res = self.resolution();
        (
            self.center_x + (sx - width / 2.0) * res,
            self.center_y - (sy - height / 2.0) * res,
        )
    }

    /// Map extent currently covered by a canvas of the given size.
    pub fn visible_extent(&self, width: f64, height: f64) -> Extent {
        let res = self.resolution();
        let half_w = width / 2.0 * res;
        let half_h = height / 2.0 * res;
        Extent::new(
            self.center_x - half_w,
            self.center_y - half_h,
            self.center_x + half_w,
            self.center_y + half_h,
        )
    }

    /// Zoom toward a focus point (screen coordinates). Negative delta zooms in.
    pub fn zoom_at(&mut self, delta: f64, screen_x: f64, screen_y: f64, width: f64, height: f64) {
        let new_zoom = (self.zoom - delta * WHEEL_ZOOM_SENSITIVITY).clamp(MIN_ZOOM, MAX_ZOOM);
        self.zoom_to_at(new_zoom, screen_x, screen_y, width, height);
    }

    /// Set an absolute zoom while keeping the map point under the focus fixed.
    pub fn zoom_to_at(&mut self, zoom: f64, screen_x: f64, screen_y: f64, width: f64, height: f64) {
        let (fx, fy) = self.screen_to_world(screen_x, screen_y, width, height);
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        let res = self.resolution();
        self.center_x = fx - (screen_x - width / 2.0) * res;
        self.center_y = fy + (screen_y - height / 2.0) * res;
    }

    /// Pan by a screen-space delta (dragging the map right moves the center left).
    pub fn pan(&mut self, dx: f64, dy: f64) {
        let res = self.resolution();
        self.center_x -= dx * res;
        self.center_y += dy * res;
    }

    /// Viewport that shows `extent` with `padding` pixels on every side.
    /// Returns `None` when the canvas is too small for the padding.
    pub fn fitted(
        extent: &Extent,
        width: f64,
        height: f64,
        padding: f64,
        max_zoom: f64,
    ) -> Option<Viewport> {
        let avail_w = width - padding * 2.0;
        let avail_h = height - padding * 2.0;
        if avail_w <= 0.0 || avail_h <= 0.0 {
            return None;
        }

        let (cx, cy) = extent.center();
        let res_x = extent.width() / avail_w;
        let res_y = extent.height() / avail_h;
        let res = res_x.max(res_y);
        let zoom = if res > 0.0 {
            zoom_for_resolution(res).min(max_zoom)
        } else {
            max_zoom
        };
        Some(Viewport::new(cx, cy, zoom))
    }
}

#[cfg(test)]
mod tests {
    use super::{Viewport, resolution_for_zoom, zoom_for_resolution};
    use crate::extent::Extent;

    fn assert_close(actual: f64, expected: f64, eps: f64) {
        let diff = (actual - expected).abs();
        assert!(diff < eps, "expected {expected}, got {actual} (diff: {diff})");
    }

    #[test]
    fn resolution_halves_per_zoom_level() {
        assert_close(resolution_for_zoom(1.0) * 2.0, resolution_for_zoom(0.0), 1e-9);
        assert_close(zoom_for_resolution(resolution_for_zoom(7.25)), 7.25, 1e-9);
    }

    #[test]
    fn screen_world_roundtrip() {
        let vp = Viewport::new(1000.0, -500.0, 8.0);
        let (wx, wy) = vp.screen_to_world(123.0, 456.0, 800.0, 600.0);
        let (sx, sy) = vp.world_to_screen(wx, wy, 800.0, 600.0);
        assert_close(sx, 123.0, 1e-6);
        assert_close(sy, 456.0, 1e-6);
    }

    #[test]
    fn center_maps_to_canvas_middle() {
        let vp = Viewport::new(10.0, 20.0, 5.0);
        assert_eq!(vp.world_to_screen(10.0, 20.0, 800.0, 600.0), (400.0, 300.0));
    }

    #[test]
    fn north_is_up() {
        let vp = Viewport::new(0.0, 0.0, 5.0);
        let (_, sy) = vp.world_to_screen(0.0, 1000.0, 800.0, 600.0);
        assert!(sy < 300.0);
    }

    #[test]
    fn zoom_at_keeps_focus_fixed() {
        let mut vp = Viewport::new(0.0, 0.0, 6.0);
        let before = vp.screen_to_world(100.0, 50.0, 800.0, 600.0);
        vp.zoom_at(-250.0, 100.0, 50.0, 800.0, 600.0);
        assert!(vp.zoom > 6.0);
        let after = vp.screen_to_world(100.0, 50.0, 800.0, 600.0);
        assert_close(after.0, before.0, 1e-6);
        assert_close(after.1, before.1, 1e-6);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut vp = Viewport::new(0.0, 0.0, 6.0);
        vp.zoom_at(1e9, 0.0, 0.0, 800.0, 600.0);
        assert_eq!(vp.zoom, crate::config::MIN_ZOOM);
    }

    #[test]
    fn pan_moves_content_with_pointer() {
        let mut vp = Viewport::new(0.0, 0.0, 6.0);
        let point = vp.screen_to_world(400.0, 300.0, 800.0, 600.0);
        vp.pan(50.0, 20.0);
        let (sx, sy) = vp.world_to_screen(point.0, point.1, 800.0, 600.0);
        assert_close(sx, 450.0, 1e-6);
        assert_close(sy, 320.0, 1e-6);
    }

    #[test]
    fn fitted_view_contains_extent_inside_padding() {
        let extent = Extent::new(11_000_000.0, 1_000_000.0, 12_000_000.0, 2_500_000.0);
        let vp = Viewport::fitted(&extent, 800.0, 600.0, 40.0, 18.0).unwrap();
        let (x0, y0) = vp.world_to_screen(extent.min_x, extent.max_y, 800.0, 600.0);
        let (x1, y1) = vp.world_to_screen(extent.max_x, extent.min_y, 800.0, 600.0);
        assert!(x0 >= 40.0 - 1e-6 && y0 >= 40.0 - 1e-6);
        assert!(x1 <= 760.0 + 1e-6 && y1 <= 560.0 + 1e-6);
        // The tighter axis touches the padding.
        assert_close(y1 - y0, 520.0, 1e-6);
    }

    #[test]
    fn fitted_point_extent_uses_max_zoom() {
        let extent = Extent::new(5.0, 5.0, 5.0, 5.0);
        let vp = Viewport::fitted(&extent, 800.0, 600.0, 40.0, 16.0).unwrap();
        assert_eq!(vp.zoom, 16.0);
        assert_eq!((vp.center_x, vp.center_y), (5.0, 5.0));
    }

    #[test]
    fn fitted_rejects_tiny_canvas() {
        let extent = Extent::new(0.0, 0.0, 1.0, 1.0);
        assert!(Viewport::fitted(&extent, 60.0, 600.0, 40.0, 16.0).is_none());
    }
}
