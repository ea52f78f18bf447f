use serde::{Deserialize, Serialize};

use crate::config::{MAX_ZOOM, ROAD_TILE_URL, SATELLITE_TILE_URL, TOPO_TILE_URL};
use crate::extent::Extent;
use crate::projection::HALF_WORLD;
use crate::viewport::Viewport;

/// External XYZ raster tile services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileSource {
    Topo,
    Satellite,
    Roads,
}

impl TileSource {
    pub const fn template(self) -> &'static str {
        match self {
            TileSource::Topo => TOPO_TILE_URL,
            TileSource::Satellite => SATELLITE_TILE_URL,
            TileSource::Roads => ROAD_TILE_URL,
        }
    }

    pub fn url(self, tile: TileCoord) -> String {
        self.template()
            .replace("{z}", &tile.z.to_string())
            .replace("{x}", &tile.x.to_string())
            .replace("{y}", &tile.y.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileCoord {
    pub z: u8,
    pub x: u32,
    pub y: u32,
}

impl TileCoord {
    /// Projected extent covered by this tile.
    pub fn extent(&self) -> Extent {
        let size = tile_span(self.z);
        let min_x = -HALF_WORLD + self.x as f64 * size;
        let max_y = HALF_WORLD - self.y as f64 * size;
        Extent::new(min_x, max_y - size, min_x + size, max_y)
    }
}

/// Width of one tile in meters at zoom `z`.
fn tile_span(z: u8) -> f64 {
    HALF_WORLD * 2.0 / f64::from(1u32 << z)
}

/// Integer tile zoom used to draw a view at fractional zoom.
pub fn tile_zoom(view_zoom: f64) -> u8 {
    view_zoom.round().clamp(0.0, MAX_ZOOM) as u8
}

/// Tiles covering the visible extent, nearest to the view center first.
pub fn visible_tiles(vp: &Viewport, width: f64, height: f64) -> Vec<TileCoord> {
    let z = tile_zoom(vp.zoom);
    let n = 1u32 << z;
    let span = tile_span(z);
    let extent = vp.visible_extent(width, height);

    let to_col = |x: f64| ((x + HALF_WORLD) / span).floor().clamp(0.0, (n - 1) as f64) as u32;
    let to_row = |y: f64| ((HALF_WORLD - y) / span).floor().clamp(0.0, (n - 1) as f64) as u32;

    let (x0, x1) = (to_col(extent.min_x), to_col(extent.max_x));
    let (y0, y1) = (to_row(extent.max_y), to_row(extent.min_y));

    let mut tiles = Vec::with_capacity(((x1 - x0 + 1) * (y1 - y0 + 1)) as usize);
    for y in y0..=y1 {
        for x in x0..=x1 {
            tiles.push(TileCoord { z, x, y });
        }
    }

    let (cx, cy) = (vp.center_x, vp.center_y);
    tiles.sort_by(|a, b| {
        let da = distance_sq(a.extent().center(), (cx, cy));
        let db = distance_sq(b.extent().center(), (cx, cy));
        da.total_cmp(&db).then_with(|| a.cmp(b))
    });
    tiles
}

fn distance_sq(a: (f64, f64), b: (f64, f64)) -> f64 {
    let dx = a.0 - b.0;
    let dy = a.1 - b.1;
    dx * dx + dy * dy
}
