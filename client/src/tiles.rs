#![cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use diaphan_shared::config::{TILE_CACHE_MAX_ENTRIES, TILE_LOAD_CONCURRENCY};
use diaphan_shared::{TileCoord, TileSource};
use js_sys::Reflect;
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen::prelude::*;
use web_sys::HtmlImageElement;

const TILE_PIXELS: f64 = 256.0;
/// How many zoom levels up to search for a stand-in while a tile loads.
const MAX_ANCESTOR_LEVELS: u8 = 4;
const ONLOAD_HANDLE_KEY: &str = "__diaphanTileOnload";
const ONERROR_HANDLE_KEY: &str = "__diaphanTileOnerror";

type TileKey = (TileSource, TileCoord);
type ReadyCallback = Rc<dyn Fn()>;

enum Entry {
    Loading,
    Ready { image: HtmlImageElement, last_used: u64 },
    Failed,
}

#[derive(Default)]
struct State {
    entries: HashMap<TileKey, Entry>,
    queue: VecDeque<TileKey>,
    in_flight: usize,
    clock: u64,
}

/// A drawable tile image and the source rectangle (in image pixels) to draw.
pub struct TileImage {
    pub image: HtmlImageElement,
    pub crop: Crop,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Crop {
    pub sx: f64,
    pub sy: f64,
    pub size: f64,
}

/// Part of an ancestor tile `levels` zooms up that covers `coord`.
pub fn ancestor_crop(coord: TileCoord, levels: u8) -> (TileCoord, Crop) {
    let parent = TileCoord {
        z: coord.z - levels,
        x: coord.x >> levels,
        y: coord.y >> levels,
    };
    let mask = (1u32 << levels) - 1;
    let size = TILE_PIXELS / f64::from(1u32 << levels);
    let crop = Crop {
        sx: f64::from(coord.x & mask) * size,
        sy: f64::from(coord.y & mask) * size,
        size,
    };
    (parent, crop)
}

/// Bounded image cache plus a concurrency-limited load queue for XYZ tiles.
#[derive(Clone, Default)]
pub struct TileLoader {
    state: Rc<RefCell<State>>,
    on_ready: Rc<RefCell<Option<ReadyCallback>>>,
}

impl TileLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called each time an image finishes loading.
    pub fn set_on_ready(&self, cb: impl Fn() + 'static) {
        *self.on_ready.borrow_mut() = Some(Rc::new(cb));
    }

    /// Advance the LRU clock; call once per frame.
    pub fn begin_frame(&self) {
        let mut state = self.state.borrow_mut();
        state.clock = state.clock.wrapping_add(1);
    }

    /// Replace the pending queue for `source` with the tiles it still needs.
    pub fn request(&self, source: TileSource, wanted: &[TileCoord]) {
        {
            let mut state = self.state.borrow_mut();
            state.queue.retain(|(s, _)| *s != source);
            for &coord in wanted {
                let key = (source, coord);
                if !state.entries.contains_key(&key) {
                    state.queue.push_back(key);
                }
            }
        }
        self.pump();
    }

    /// The tile itself if loaded, else the nearest loaded ancestor crop.
    pub fn lookup(&self, source: TileSource, coord: TileCoord) -> Option<TileImage> {
        let mut state = self.state.borrow_mut();
        let clock = state.clock;
        for levels in 0..=MAX_ANCESTOR_LEVELS.min(coord.z) {
            let (key_coord, crop) = ancestor_crop(coord, levels);
            if let Some(Entry::Ready { image, last_used }) =
                state.entries.get_mut(&(source, key_coord))
            {
                *last_used = clock;
                return Some(TileImage {
                    image: image.clone(),
                    crop,
                });
            }
        }
        None
    }

    fn pump(&self) {
        loop {
            let key = {
                let mut state = self.state.borrow_mut();
                if state.in_flight >= TILE_LOAD_CONCURRENCY {
                    return;
                }
                let Some(key) = state.queue.pop_front() else {
                    return;
                };
                if state.entries.contains_key(&key) {
                    continue;
                }
                state.entries.insert(key, Entry::Loading);
                state.in_flight += 1;
                key
            };
            self.load(key);
        }
    }

    fn finish(&self, key: TileKey, entry: Entry) {
        let ready = matches!(entry, Entry::Ready { .. });
        {
            let mut state = self.state.borrow_mut();
            state.in_flight = state.in_flight.saturating_sub(1);
            state.entries.insert(key, entry);
            evict(&mut state);
        }
        if ready {
            let cb = self.on_ready.borrow().clone();
            if let Some(cb) = cb {
                cb();
            }
        }
        self.pump();
    }

    fn load(&self, key: TileKey) {
        let (source, coord) = key;
        let img = match HtmlImageElement::new() {
            Ok(img) => img,
            Err(_) => {
                self.finish(key, Entry::Failed);
                return;
            }
        };

        let loader = self.clone();
        let img_for_load = img.clone();
        let onload = Closure::<dyn FnMut()>::new(move || {
            clear_image_handlers(&img_for_load);
            let clock = loader.state.borrow().clock;
            loader.finish(
                key,
                Entry::Ready {
                    image: img_for_load.clone(),
                    last_used: clock,
                },
            );
        });

        let loader = self.clone();
        let img_for_error = img.clone();
        let onerror = Closure::<dyn FnMut()>::new(move || {
            clear_image_handlers(&img_for_error);
            loader.finish(key, Entry::Failed);
        });

        let onload_js = onload.into_js_value();
        let onerror_js = onerror.into_js_value();
        img.set_onload(Some(onload_js.unchecked_ref()));
        img.set_onerror(Some(onerror_js.unchecked_ref()));
        let _ = Reflect::set(img.as_ref(), &JsValue::from_str(ONLOAD_HANDLE_KEY), &onload_js);
        let _ = Reflect::set(img.as_ref(), &JsValue::from_str(ONERROR_HANDLE_KEY), &onerror_js);
        img.set_src(&source.url(coord));
    }
}

/// Drop least recently drawn images once over capacity. In-flight loads stay.
fn evict(state: &mut State) {
    let over = state.entries.len().saturating_sub(TILE_CACHE_MAX_ENTRIES);
    if over == 0 {
        return;
    }
    let mut candidates: Vec<(u64, TileKey)> = state
        .entries
        .iter()
        .filter_map(|(key, entry)| match entry {
            Entry::Ready { last_used, .. } => Some((*last_used, *key)),
            Entry::Failed => Some((0, *key)),
            Entry::Loading => None,
        })
        .collect();
    candidates.sort_unstable_by_key(|(used, _)| *used);
    for (_, key) in candidates.into_iter().take(over) {
        state.entries.remove(&key);
    }
}

fn clear_image_handlers(img: &HtmlImageElement) {
    img.set_onload(None);
    img.set_onerror(None);
    let _ = Reflect::delete_property(img.as_ref(), &JsValue::from_str(ONLOAD_HANDLE_KEY));
    let _ = Reflect::delete_property(img.as_ref(), &JsValue::from_str(ONERROR_HANDLE_KEY));
}
