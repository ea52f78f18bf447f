use std::cell::RefCell;

use diaphan_shared::config::{BASEMAP_LAYER, ROAD_LAYER, SEARCH_HIGHLIGHT_LAYER};
use diaphan_shared::format::{format_coordinate, format_zoom};
use diaphan_shared::layers::z;
use diaphan_shared::projection::to_lon_lat;
use diaphan_shared::style::VectorStyle;
use diaphan_shared::{Layer, SelectionState, TileSource};
use gloo_storage::Storage;
use leptos::prelude::*;
use wasm_bindgen::JsCast;

use crate::boundary::{CommuneLayer, ProvinceLayer};
use crate::locate::LocateButton;
use crate::map::{MapInstance, MapSurface};
use crate::popup::MapPopup;
use crate::search::SearchBox;
use crate::sidebar::Sidebar;

const SETTINGS_KEY: &str = "diaphan_settings";

/// Slot the map surface publishes its instance into. `None` until the canvas mounts.
#[derive(Clone, Copy)]
pub(crate) struct MapSlot(pub RwSignal<Option<MapInstance>>);
/// The map instance itself, owned by [`App`] so it outlives the canvas.
#[derive(Clone, Copy)]
pub(crate) struct MapHost(pub MapInstance);
#[derive(Clone, Copy)]
pub(crate) struct Selection(pub RwSignal<SelectionState>);
#[derive(Clone, Copy)]
pub(crate) struct HoverEnabled(pub RwSignal<bool>);
#[derive(Clone, Copy)]
pub(crate) struct Basemap(pub RwSignal<TileSource>);
#[derive(Clone, Copy)]
pub(crate) struct RoadOverlay(pub RwSignal<bool>);
#[derive(Clone, Copy)]
pub(crate) struct SidebarOpen(pub RwSignal<bool>);

#[derive(serde::Serialize, serde::Deserialize)]
#[serde(default)]
struct Settings {
    hover_enabled: bool,
    basemap: TileSource,
    road_overlay: bool,
    sidebar_open: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            hover_enabled: true,
            basemap: TileSource::Topo,
            road_overlay: false,
            sidebar_open: true,
        }
    }
}

struct KeydownBinding {
    window: web_sys::Window,
    handler: wasm_bindgen::closure::Closure<dyn Fn(web_sys::KeyboardEvent)>,
}

thread_local! {
    static KEYDOWN_BINDING: RefCell<Option<KeydownBinding>> = const { RefCell::new(None) };
}

/// Root component. Owns the map instance and its slot, the selection and the
/// user toggles, and provides them via context.
#[component]
pub fn App() -> impl IntoView {
    let map = MapInstance::new();
    let slot: RwSignal<Option<MapInstance>> = RwSignal::new(None);
    let selection: RwSignal<SelectionState> = RwSignal::new(SelectionState::default());
    let saved: Settings = gloo_storage::SessionStorage::get(SETTINGS_KEY).unwrap_or_default();
    let hover_enabled: RwSignal<bool> = RwSignal::new(saved.hover_enabled);
    let basemap: RwSignal<TileSource> = RwSignal::new(saved.basemap);
    let road_overlay: RwSignal<bool> = RwSignal::new(saved.road_overlay);
    let sidebar_open: RwSignal<bool> = RwSignal::new(saved.sidebar_open);

    provide_context(MapHost(map));
    provide_context(MapSlot(slot));
    provide_context(Selection(selection));
    provide_context(HoverEnabled(hover_enabled));
    provide_context(Basemap(basemap));
    provide_context(RoadOverlay(road_overlay));
    provide_context(SidebarOpen(sidebar_open));

    Effect::new(move || {
        let settings = Settings {
            hover_enabled: hover_enabled.get(),
            basemap: basemap.get(),
            road_overlay: road_overlay.get(),
            sidebar_open: sidebar_open.get(),
        };
        let _ = gloo_storage::SessionStorage::set(SETTINGS_KEY, &settings);
    });

    // Base tiles follow the switcher.
    Effect::new(move || {
        let Some(map) = slot.get() else {
            return;
        };
        map.put_layer(Layer::tiles(BASEMAP_LAYER, z::BASEMAP, basemap.get()));
    });

    Effect::new(move || {
        let Some(map) = slot.get() else {
            return;
        };
        if road_overlay.get() {
            map.put_layer(Layer::tiles(ROAD_LAYER, z::ROADS, TileSource::Roads));
        } else {
            map.remove_layer(ROAD_LAYER);
        }
    });

    Effect::new(move || {
        let Some(map) = slot.get() else {
            return;
        };
        match selection.with(|s| s.highlight.clone()) {
            Some(features) => map.put_layer(Layer::features(
                SEARCH_HIGHLIGHT_LAYER,
                z::HIGHLIGHT,
                features,
                VectorStyle::Highlight,
            )),
            None => map.remove_layer(SEARCH_HIGHLIGHT_LAYER),
        }
    });

    Effect::new(move |prev: Option<bool>| {
        let ready = slot.with(Option::is_some);
        if ready && prev != Some(true) {
            web_sys::console::info_1(&"map ready".into());
        }
        ready
    });

    // Global keyboard shortcuts
    Effect::new(move || {
        let Some(window) = web_sys::window() else {
            return;
        };

        KEYDOWN_BINDING.with(|cell| {
            if let Some(old) = cell.borrow_mut().take() {
                let _ = old.window.remove_event_listener_with_callback(
                    "keydown",
                    old.handler.as_ref().unchecked_ref(),
                );
            }
        });

        let handler = wasm_bindgen::closure::Closure::<dyn Fn(web_sys::KeyboardEvent)>::new(
            move |e: web_sys::KeyboardEvent| {
                let key = e.key();
                let target = e
                    .target()
                    .and_then(|t| t.dyn_into::<web_sys::HtmlElement>().ok());
                let target_tag = target.as_ref().map(|el| el.tag_name()).unwrap_or_default();

                // Don't intercept when typing in an input
                if target_tag == "INPUT" || target_tag == "TEXTAREA" {
                    if key == "Escape"
                        && let Some(el) = target
                    {
                        el.blur().ok();
                    }
                    return;
                }

                if key == "Escape" {
                    selection.update(SelectionState::clear);
                    if let Some(map) = slot.get_untracked() {
                        map.popup.set(None);
                    }
                }
            },
        );

        if window
            .add_event_listener_with_callback("keydown", handler.as_ref().unchecked_ref())
            .is_ok()
        {
            KEYDOWN_BINDING.with(|cell| {
                *cell.borrow_mut() = Some(KeydownBinding {
                    window: window.clone(),
                    handler,
                });
            });
        }
    });

    view! {
        <div style="width: 100%; height: 100%; position: relative; display: flex; font-family: 'Inter', system-ui, sans-serif;">
            <div style="flex: 1; height: 100%; position: relative; overflow: hidden;">
                <MapSurface />
                <ProvinceLayer />
                <CommuneLayer />
                <MapPopup />
                <SearchBox />
                <MapControls />
                <CoordinateReadout />
            </div>
            <Sidebar />
        </div>
    }
}

/// Hover toggle, basemap switcher, road overlay and the locate button.
#[component]
fn MapControls() -> impl IntoView {
    let HoverEnabled(hover_enabled) = expect_context();
    let Basemap(basemap) = expect_context();
    let RoadOverlay(road_overlay) = expect_context();

    let basemap_button = move |source: TileSource, label: &'static str| {
        view! {
            <button
                style="flex: 1; padding: 4px 8px; border: 1px solid #d1d5db; border-radius: 4px; cursor: pointer; font-size: 0.75rem;"
                style:background=move || if basemap.get() == source { "#1e40af" } else { "#ffffff" }
                style:color=move || if basemap.get() == source { "#ffffff" } else { "#111827" }
                on:click=move |_| basemap.set(source)
            >
                {label}
            </button>
        }
    };

    view! {
        <div style="position: absolute; top: 12px; right: 12px; z-index: 20; background: rgba(255,255,255,0.95); border: 1px solid #d1d5db; border-radius: 8px; box-shadow: 0 2px 8px rgba(0,0,0,0.15); padding: 10px 12px; display: flex; flex-direction: column; gap: 8px; font-size: 0.8rem; min-width: 180px;">
            <label style="display: flex; align-items: center; gap: 6px; cursor: pointer;">
                <input
                    type="checkbox"
                    prop:checked=move || hover_enabled.get()
                    on:change=move |_| hover_enabled.update(|v| *v = !*v)
                />
                "Tô màu tỉnh khi di chuột"
            </label>
            <div style="display: flex; gap: 4px;">
                {basemap_button(TileSource::Topo, "Bản đồ")}
                {basemap_button(TileSource::Satellite, "Vệ tinh")}
            </div>
            <label style="display: flex; align-items: center; gap: 6px; cursor: pointer;">
                <input
                    type="checkbox"
                    prop:checked=move || road_overlay.get()
                    on:change=move |_| road_overlay.update(|v| *v = !*v)
                />
                "Đường giao thông"
            </label>
            <LocateButton />
        </div>
    }
}

/// Zoom and pointer lon/lat readout.
#[component]
fn CoordinateReadout() -> impl IntoView {
    let MapSlot(slot) = expect_context();

    let readout = Memo::new(move |_| {
        let map = slot.get()?;
        let zoom = format_zoom(map.zoom.get());
        let position = map.pointer.get().map(|(x, y)| {
            let (lon, lat) = to_lon_lat(x, y);
            (format_coordinate(lon), format_coordinate(lat))
        });
        Some((zoom, position))
    });

    move || {
        let Some((zoom, position)) = readout.get() else {
            return ().into_any();
        };
        let position = match position {
            Some((lon, lat)) => format!("Kinh độ {lon} | Vĩ độ {lat}"),
            None => String::from("Kinh độ - | Vĩ độ -"),
        };
        view! {
            <div style="position: absolute; left: 12px; bottom: 12px; z-index: 20; background: rgba(17,24,39,0.8); color: #f9fafb; border-radius: 6px; padding: 4px 10px; font-size: 0.72rem; font-family: 'JetBrains Mono', monospace; font-variant-numeric: tabular-nums; pointer-events: none;">
                {format!("Zoom {zoom} | {position}")}
            </div>
        }
        .into_any()
    }
}
