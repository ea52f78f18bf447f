use std::cell::{Cell, RefCell};
use std::rc::Rc;

use diaphan_shared::animation::ViewAnimation;
use diaphan_shared::projection::to_lon_lat;
use diaphan_shared::{Extent, Layer, LayerStack, ProvinceColors, Viewport};
use leptos::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, PointerEvent, WheelEvent};

use crate::app::{MapHost, MapSlot};
use crate::popup::Popup;
use crate::render::{FrameInput, draw_frame};
use crate::render_loop::FrameScheduler;
use crate::tiles::TileLoader;

/// Pointer travel (px) below which a press-release counts as a click.
const CLICK_SLOP_PX: f64 = 5.0;
const PINCH_ZOOM_GAIN: f64 = 2.0;

/// A click on the map, in EPSG:3857. `seq` distinguishes repeated clicks on the same spot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapClick {
    pub seq: u64,
    pub x: f64,
    pub y: f64,
}

impl MapClick {
    pub fn lon_lat(&self) -> (f64, f64) {
        to_lon_lat(self.x, self.y)
    }
}

/// Handle to the live map. Every field is a reactive cell, so the handle is
/// `Copy` and children subscribe to what they need with effects.
#[derive(Clone, Copy)]
pub struct MapInstance {
    pub viewport: RwSignal<Viewport>,
    pub zoom: Memo<f64>,
    /// Canvas size in CSS pixels.
    pub size: RwSignal<(f64, f64)>,
    pub layers: RwSignal<LayerStack>,
    /// Pointer position in map coordinates; `None` outside the canvas.
    pub pointer: RwSignal<Option<(f64, f64)>>,
    pub click: RwSignal<Option<MapClick>>,
    pub animation: RwSignal<Option<ViewAnimation>>,
    pub popup: RwSignal<Option<Popup>>,
    /// `false` once the surface has been unmounted.
    pub attached: RwSignal<bool>,
    pub colors: StoredValue<ProvinceColors>,
}

impl MapInstance {
    /// Create the instance under the current owner. The caller's owner must
    /// outlive the surface so the handle stays valid after unmount.
    pub(crate) fn new() -> Self {
        let viewport = RwSignal::new(Viewport::default());
        Self {
            viewport,
            zoom: Memo::new(move |_| viewport.with(|vp| vp.zoom)),
            size: RwSignal::new((0.0, 0.0)),
            layers: RwSignal::new(LayerStack::new()),
            pointer: RwSignal::new(None),
            click: RwSignal::new(None),
            animation: RwSignal::new(None),
            popup: RwSignal::new(None),
            attached: RwSignal::new(false),
            colors: StoredValue::new(ProvinceColors::new()),
        }
    }

    pub fn put_layer(&self, layer: Layer) {
        self.layers.update(|stack| {
            stack.put(layer);
        });
    }

    pub fn remove_layer(&self, name: &str) {
        if self.layers.with_untracked(|stack| stack.contains(name)) {
            self.layers.update(|stack| {
                stack.remove(name);
            });
        }
    }

    pub fn animate_to(&self, target: Viewport, duration_ms: f64) {
        let from = self.viewport.get_untracked();
        self.animation
            .set(Some(ViewAnimation::new(from, target, now_ms(), duration_ms)));
    }

    /// Animate so `extent` fits the canvas with `padding` pixels on each side.
    pub fn fit_extent(&self, extent: &Extent, padding: f64, max_zoom: f64, duration_ms: f64) {
        let (w, h) = self.size.get_untracked();
        if let Some(target) = Viewport::fitted(extent, w, h, padding, max_zoom) {
            self.animate_to(target, duration_ms);
        }
    }

    /// Map coordinates to CSS pixels relative to the canvas. Tracks view and size.
    pub fn project(&self, x: f64, y: f64) -> (f64, f64) {
        let (w, h) = self.size.get();
        self.viewport.with(|vp| vp.world_to_screen(x, y, w, h))
    }

    fn unproject(&self, sx: f64, sy: f64) -> (f64, f64) {
        let (w, h) = self.size.get_untracked();
        self.viewport
            .with_untracked(|vp| vp.screen_to_world(sx, sy, w, h))
    }
}

fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or_else(js_sys::Date::now)
}

/// Window `resize` listener, removed on drop.
struct ResizeBinding {
    window: web_sys::Window,
    handler: Closure<dyn Fn()>,
}

impl ResizeBinding {
    fn install(on_resize: impl Fn() + 'static) -> Option<Self> {
        let window = web_sys::window()?;
        let handler = Closure::<dyn Fn()>::new(on_resize);
        window
            .add_event_listener_with_callback("resize", handler.as_ref().unchecked_ref())
            .ok()?;
        Some(Self { window, handler })
    }
}

impl Drop for ResizeBinding {
    fn drop(&mut self) {
        let _ = self
            .window
            .remove_event_listener_with_callback("resize", self.handler.as_ref().unchecked_ref());
    }
}

fn local_position(
    canvas: NodeRef<leptos::html::Canvas>,
    client_x: i32,
    client_y: i32,
) -> Option<(f64, f64)> {
    let el = canvas.get_untracked()?;
    let rect = el.get_bounding_client_rect();
    Some((client_x as f64 - rect.left(), client_y as f64 - rect.top()))
}

/// Canvas-backed map. Drives the parent-owned [`MapInstance`] and publishes it
/// into the parent's [`MapSlot`] once the canvas is mounted; on unmount it stops
/// drawing and marks the instance detached.
#[component]
pub fn MapSurface() -> impl IntoView {
    let MapSlot(slot) = expect_context();
    let MapHost(map) = expect_context();
    let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
    let tiles = TileLoader::new();

    let cached_ctx: Rc<RefCell<Option<CanvasRenderingContext2d>>> = Rc::new(RefCell::new(None));
    let draw_tiles = tiles.clone();
    let scheduler = Rc::new(FrameScheduler::new(move || {
        let Some(canvas) = canvas_ref.get_untracked() else {
            return false;
        };
        let canvas: &HtmlCanvasElement = &canvas;
        let Some(parent) = canvas.parent_element() else {
            return false;
        };
        let (w, h) = (parent.client_width() as f64, parent.client_height() as f64);
        if w <= 0.0 || h <= 0.0 {
            return false;
        }
        if map.size.get_untracked() != (w, h) {
            map.size.set((w, h));
        }

        let dpr = web_sys::window()
            .map(|win| win.device_pixel_ratio())
            .unwrap_or(1.0);
        let (pw, ph) = ((w * dpr).round() as u32, (h * dpr).round() as u32);
        if canvas.width() != pw || canvas.height() != ph {
            canvas.set_width(pw);
            canvas.set_height(ph);
            *cached_ctx.borrow_mut() = None;
        }

        let ctx = {
            let mut cache = cached_ctx.borrow_mut();
            if cache.is_none() {
                *cache = canvas
                    .get_context("2d")
                    .ok()
                    .flatten()
                    .and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok());
            }
            let Some(ctx) = cache.clone() else {
                return false;
            };
            ctx
        };
        ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0).ok();

        let mut animating = false;
        if let Some(anim) = map.animation.get_untracked() {
            let now = now_ms();
            map.viewport.set(anim.sample(now));
            if anim.is_finished(now) {
                map.animation.set(None);
            } else {
                animating = true;
            }
        }

        let vp = map.viewport.get_untracked();
        map.layers.with_untracked(|layers| {
            map.colors.update_value(|colors| {
                draw_frame(FrameInput {
                    ctx: &ctx,
                    width: w,
                    height: h,
                    vp: &vp,
                    layers,
                    tiles: &draw_tiles,
                    colors,
                });
            });
        });
        animating
    }));

    let sched_tiles = scheduler.clone();
    tiles.set_on_ready(move || sched_tiles.mark_dirty());

    // Publish once the canvas exists; without it there is nothing to attach.
    Effect::new(move || {
        if canvas_ref.get().is_none() || map.attached.get_untracked() {
            return;
        }
        map.attached.set(true);
        slot.set(Some(map));
    });

    let sched_view = scheduler.clone();
    Effect::new(move || {
        map.viewport.track();
        map.layers.track();
        map.animation.track();
        sched_view.mark_dirty();
    });

    let sched_resize = scheduler.clone();
    let resize = ResizeBinding::install(move || sched_resize.mark_dirty());
    let bindings = StoredValue::new_local((scheduler.clone(), resize));
    on_cleanup(move || {
        bindings.try_with_value(|(scheduler, _)| scheduler.detach());
        map.attached.try_set(false);
    });

    // --- Input handlers ---

    let dragging = Rc::new(Cell::new(false));
    let press = Rc::new(Cell::new((0.0f64, 0.0f64)));
    let last = Rc::new(Cell::new((0.0f64, 0.0f64)));
    let pinch_dist = Rc::new(Cell::new(0.0f64));
    let click_seq = Rc::new(Cell::new(0u64));

    let on_wheel = move |e: WheelEvent| {
        e.prevent_default();
        map.animation.set(None);
        let (w, h) = map.size.get_untracked();
        let Some((x, y)) = local_position(canvas_ref, e.client_x(), e.client_y()) else {
            return;
        };
        map.viewport.update(|vp| vp.zoom_at(e.delta_y(), x, y, w, h));
    };

    let on_pointer_down = {
        let dragging = dragging.clone();
        let press = press.clone();
        let last = last.clone();
        move |e: PointerEvent| {
            dragging.set(true);
            map.animation.set(None);
            let pos = (e.client_x() as f64, e.client_y() as f64);
            press.set(pos);
            last.set(pos);
            if let Some(target) = e.target()
                && let Ok(el) = target.dyn_into::<web_sys::HtmlElement>()
            {
                el.set_pointer_capture(e.pointer_id()).ok();
                el.style().set_property("cursor", "grabbing").ok();
            }
        }
    };

    let on_pointer_move = {
        let dragging = dragging.clone();
        let last = last.clone();
        move |e: PointerEvent| {
            if dragging.get() {
                let (lx, ly) = last.get();
                let (x, y) = (e.client_x() as f64, e.client_y() as f64);
                last.set((x, y));
                map.viewport.update(|vp| vp.pan(x - lx, y - ly));
            }
            if let Some((sx, sy)) = local_position(canvas_ref, e.client_x(), e.client_y()) {
                map.pointer.set(Some(map.unproject(sx, sy)));
            }
        }
    };

    let on_pointer_up = {
        let dragging = dragging.clone();
        move |e: PointerEvent| {
            dragging.set(false);
            if let Some(target) = e.target()
                && let Ok(el) = target.dyn_into::<web_sys::HtmlElement>()
            {
                el.style().set_property("cursor", "grab").ok();
            }
        }
    };

    let on_pointer_leave = move |_: PointerEvent| {
        if map.pointer.get_untracked().is_some() {
            map.pointer.set(None);
        }
    };

    let on_click = {
        let press = press.clone();
        move |e: MouseEvent| {
            let (px, py) = press.get();
            let moved = (e.client_x() as f64 - px).abs().max((e.client_y() as f64 - py).abs());
            if moved >= CLICK_SLOP_PX {
                return;
            }
            let Some((sx, sy)) = local_position(canvas_ref, e.client_x(), e.client_y()) else {
                return;
            };
            let (x, y) = map.unproject(sx, sy);
            let seq = click_seq.get().wrapping_add(1);
            click_seq.set(seq);
            map.click.set(Some(MapClick { seq, x, y }));
        }
    };

    let on_touch_start = {
        let pinch_dist = pinch_dist.clone();
        move |e: web_sys::TouchEvent| {
            let touches = e.touches();
            if touches.length() != 2 {
                return;
            }
            e.prevent_default();
            let (Some(t0), Some(t1)) = (touches.get(0), touches.get(1)) else {
                return;
            };
            let dx = (t1.client_x() - t0.client_x()) as f64;
            let dy = (t1.client_y() - t0.client_y()) as f64;
            pinch_dist.set(dx.hypot(dy));
        }
    };

    let on_touch_move = move |e: web_sys::TouchEvent| {
        let touches = e.touches();
        if touches.length() != 2 {
            return;
        }
        e.prevent_default();
        let (Some(t0), Some(t1)) = (touches.get(0), touches.get(1)) else {
            return;
        };
        let dx = (t1.client_x() - t0.client_x()) as f64;
        let dy = (t1.client_y() - t0.client_y()) as f64;
        let dist = dx.hypot(dy);
        let old = pinch_dist.get();
        if old > 0.0 {
            let mid_x = (t0.client_x() + t1.client_x()) / 2;
            let mid_y = (t0.client_y() + t1.client_y()) / 2;
            if let Some((x, y)) = local_position(canvas_ref, mid_x, mid_y) {
                let (w, h) = map.size.get_untracked();
                let delta = -(dist - old) * PINCH_ZOOM_GAIN;
                map.viewport.update(|vp| vp.zoom_at(delta, x, y, w, h));
            }
        }
        pinch_dist.set(dist);
    };

    view! {
        <div
            style="position: absolute; inset: 0; overflow: hidden;"
            on:wheel=on_wheel
            on:pointerdown=on_pointer_down
            on:pointermove=on_pointer_move
            on:pointerup=on_pointer_up
            on:pointerleave=on_pointer_leave
            on:click=on_click
            on:touchstart=on_touch_start
            on:touchmove=on_touch_move
        >
            <canvas
                node_ref=canvas_ref
                style="position: absolute; inset: 0; width: 100%; height: 100%; touch-action: none; cursor: grab;"
            />
        </div>
    }
}
