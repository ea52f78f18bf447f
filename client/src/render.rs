#![cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]

use diaphan_shared::feature::FeatureSet;
use diaphan_shared::style::{FeatureStyle, MarkerStyle, VectorStyle, feature_style};
use diaphan_shared::tiles::visible_tiles;
use diaphan_shared::{LayerContent, LayerStack, ProvinceColors, TileSource, Viewport};
use geo::LineString;
use web_sys::{CanvasRenderingContext2d, CanvasWindingRule};

use crate::tiles::TileLoader;

const BACKGROUND: &str = "#e5e7eb";
/// Consecutive ring vertices closer than this (in CSS pixels) are merged.
const MIN_SEGMENT_PX: f64 = 0.6;

pub struct FrameInput<'a> {
    pub ctx: &'a CanvasRenderingContext2d,
    pub width: f64,
    pub height: f64,
    pub vp: &'a Viewport,
    pub layers: &'a LayerStack,
    pub tiles: &'a TileLoader,
    pub colors: &'a mut ProvinceColors,
}

pub fn draw_frame(input: FrameInput<'_>) {
    let FrameInput {
        ctx,
        width,
        height,
        vp,
        layers,
        tiles,
        colors,
    } = input;

    ctx.set_fill_style_str(BACKGROUND);
    ctx.fill_rect(0.0, 0.0, width, height);
    tiles.begin_frame();

    for layer in layers.iter() {
        match &layer.content {
            LayerContent::Tiles(source) => draw_tiles(ctx, width, height, vp, tiles, *source),
            LayerContent::Features { features, style } => {
                draw_features(ctx, width, height, vp, features, style, colors)
            }
            LayerContent::Marker(marker) => {
                let (sx, sy) = vp.world_to_screen(marker.x, marker.y, width, height);
                draw_marker(ctx, sx, sy, &marker.style);
            }
        }
    }
}

fn draw_tiles(
    ctx: &CanvasRenderingContext2d,
    width: f64,
    height: f64,
    vp: &Viewport,
    tiles: &TileLoader,
    source: TileSource,
) {
    let wanted = visible_tiles(vp, width, height);
    tiles.request(source, &wanted);

    for coord in wanted {
        let Some(tile) = tiles.lookup(source, coord) else {
            continue;
        };
        let extent = coord.extent();
        let (x0, y0) = vp.world_to_screen(extent.min_x, extent.max_y, width, height);
        let (x1, y1) = vp.world_to_screen(extent.max_x, extent.min_y, width, height);
        // snap outward so neighbouring tiles overlap by up to a pixel
        let (dx, dy) = (x0.floor(), y0.floor());
        let (dw, dh) = (x1.ceil() - dx, y1.ceil() - dy);
        let crop = tile.crop;
        ctx.draw_image_with_html_image_element_and_sw_and_sh_and_dx_and_dy_and_dw_and_dh(
            &tile.image,
            crop.sx,
            crop.sy,
            crop.size,
            crop.size,
            dx,
            dy,
            dw,
            dh,
        )
        .ok();
    }
}

fn draw_features(
    ctx: &CanvasRenderingContext2d,
    width: f64,
    height: f64,
    vp: &Viewport,
    features: &FeatureSet,
    style: &VectorStyle,
    colors: &mut ProvinceColors,
) {
    let view = vp.visible_extent(width, height);
    for idx in features.visible(&view) {
        let Some(feature) = features.get(idx) else {
            continue;
        };
        let paint = feature_style(style, feature, colors, js_sys::Math::random);

        ctx.begin_path();
        for polygon in &feature.geometry.0 {
            trace_ring(ctx, polygon.exterior(), vp, width, height);
            for hole in polygon.interiors() {
                trace_ring(ctx, hole, vp, width, height);
            }
        }
        apply_paint(ctx, &paint);
    }
}

fn trace_ring(
    ctx: &CanvasRenderingContext2d,
    ring: &LineString<f64>,
    vp: &Viewport,
    width: f64,
    height: f64,
) {
    let points = ring_to_screen(ring, vp, width, height, MIN_SEGMENT_PX);
    let Some((&(x, y), rest)) = points.split_first() else {
        return;
    };
    ctx.move_to(x, y);
    for &(x, y) in rest {
        ctx.line_to(x, y);
    }
    ctx.close_path();
}

/// Project a ring to canvas pixels, dropping vertices that land within
/// `min_px` of the previously kept one.
pub fn ring_to_screen(
    ring: &LineString<f64>,
    vp: &Viewport,
    width: f64,
    height: f64,
    min_px: f64,
) -> Vec<(f64, f64)> {
    let mut out: Vec<(f64, f64)> = Vec::with_capacity(ring.0.len());
    let min_sq = min_px * min_px;
    for c in &ring.0 {
        let p = vp.world_to_screen(c.x, c.y, width, height);
        if let Some(&(lx, ly)) = out.last() {
            let (dx, dy) = (p.0 - lx, p.1 - ly);
            if dx * dx + dy * dy < min_sq {
                continue;
            }
        }
        out.push(p);
    }
    if out.len() < 3 {
        out.clear();
    }
    out
}

fn apply_paint(ctx: &CanvasRenderingContext2d, paint: &FeatureStyle) {
    if let Some(fill) = paint.fill {
        ctx.set_fill_style_str(&fill.css());
        ctx.fill_with_canvas_winding_rule(CanvasWindingRule::Evenodd);
    }
    ctx.set_stroke_style_str(&paint.stroke.css());
    ctx.set_line_width(paint.stroke_width);
    ctx.set_line_join("round");
    ctx.stroke();
}

fn draw_marker(ctx: &CanvasRenderingContext2d, sx: f64, sy: f64, style: &MarkerStyle) {
    ctx.begin_path();
    if ctx
        .arc(sx, sy, style.radius, 0.0, std::f64::consts::TAU)
        .is_err()
    {
        return;
    }
    ctx.set_fill_style_str(&style.fill.css());
    ctx.fill();
    ctx.set_stroke_style_str(&style.stroke.css());
    ctx.set_line_width(style.stroke_width);
    ctx.stroke();
}

#[cfg(test)]
mod tests {
    use super::ring_to_screen;
    use diaphan_shared::Viewport;
    use geo::{LineString, coord};

    #[test]
    fn ring_is_projected_around_view_center() {
        let vp = Viewport::new(0.0, 0.0, 0.0);
        let res = vp.resolution();
        let ring = LineString::new(vec![
            coord! { x: 0.0, y: 0.0 },
            coord! { x: 10.0 * res, y: 0.0 },
            coord! { x: 10.0 * res, y: 10.0 * res },
            coord! { x: 0.0, y: 0.0 },
        ]);
        let pts = ring_to_screen(&ring, &vp, 100.0, 100.0, 0.5);
        assert_eq!(pts.len(), 4);
        assert!((pts[0].0 - 50.0).abs() < 1e-9 && (pts[0].1 - 50.0).abs() < 1e-9);
        assert!((pts[2].0 - 60.0).abs() < 1e-9 && (pts[2].1 - 40.0).abs() < 1e-9);
    }

    #[test]
    fn sub_pixel_vertices_collapse() {
        let vp = Viewport::new(0.0, 0.0, 2.0);
        let res = vp.resolution();
        let ring = LineString::new(vec![
            coord! { x: 0.0, y: 0.0 },
            coord! { x: 0.1 * res, y: 0.0 },
            coord! { x: 0.2 * res, y: 0.1 * res },
            coord! { x: 0.0, y: 0.0 },
        ]);
        assert!(ring_to_screen(&ring, &vp, 100.0, 100.0, 0.6).is_empty());
    }
}
