use std::sync::Arc;

use diaphan_shared::api::RequestFence;
use diaphan_shared::config::{
    CLICK_MARKER_LAYER, COMMUNE_GEOJSON_URL, COMMUNE_LAYER, PROVINCE_GEOJSON_URL, PROVINCE_LAYER,
};
use diaphan_shared::interaction::{
    ClickOutcome, LayerChange, LayerGate, commune_click_active, hover_active,
    resolve_province_click,
};
use diaphan_shared::layers::z;
use diaphan_shared::style::{CLICK_MARKER, VectorStyle};
use diaphan_shared::{FeatureKind, Layer, LayerContent, Marker, SelectionState, SharedFeatures};
use leptos::prelude::*;
use wasm_bindgen_futures::spawn_local;

use crate::api::{fetch_boundaries, fetch_elevation};
use crate::app::{HoverEnabled, MapSlot, Selection};
use crate::map::MapInstance;
use crate::popup::Popup;

/// Fetch a boundary asset into `target`. Failures are logged and leave it empty.
fn load_boundaries(url: &'static str, kind: FeatureKind, target: RwSignal<Option<SharedFeatures>>) {
    spawn_local(async move {
        match fetch_boundaries(url, kind).await {
            Ok(set) => {
                web_sys::console::info_1(
                    &format!("loaded {} features from {url}", set.len()).into(),
                );
                target.try_set(Some(Arc::new(set)));
            }
            Err(e) => {
                web_sys::console::warn_1(&format!("boundary load failed ({url}): {e}").into());
            }
        }
    });
}

/// Province outlines with hover fill, click-to-select and the province popup.
#[component]
pub fn ProvinceLayer() -> impl IntoView {
    let MapSlot(slot) = expect_context();
    let Selection(selection) = expect_context();
    let HoverEnabled(hover_enabled) = expect_context();
    let features: RwSignal<Option<SharedFeatures>> = RwSignal::new(None);
    // Code of the province under the pointer.
    let hovered: RwSignal<Option<String>> = RwSignal::new(None);

    Effect::new(move || {
        load_boundaries(PROVINCE_GEOJSON_URL, FeatureKind::Province, features);
    });

    Effect::new(move || {
        let Some(map) = slot.get() else {
            return;
        };
        let Some(set) = features.get() else {
            return;
        };
        map.put_layer(Layer::features(
            PROVINCE_LAYER,
            z::PROVINCES,
            set,
            VectorStyle::Province {
                fill_enabled: hover_enabled.get_untracked(),
                hovered: hovered.get_untracked(),
            },
        ));
    });

    // Hit-test the pointer while hovering is allowed; leaving the gate clears it.
    Effect::new(move || {
        let Some(map) = slot.get() else {
            return;
        };
        let active = hover_active(hover_enabled.get(), map.zoom.get());
        let code = match map.pointer.get() {
            Some((x, y)) if active => features.with(|set| {
                let set = set.as_ref()?;
                set.get(set.hit(x, y)?)?.code.clone()
            }),
            _ => None,
        };
        if hovered.get_untracked() != code {
            hovered.set(code);
        }
    });

    Effect::new(move || {
        let fill = hover_enabled.get();
        let code = hovered.get();
        let Some(map) = slot.get() else {
            return;
        };
        let wanted = VectorStyle::Province {
            fill_enabled: fill,
            hovered: code,
        };
        let stale = map.layers.with_untracked(|stack| {
            stack.get(PROVINCE_LAYER).is_some_and(|layer| {
                !matches!(&layer.content, LayerContent::Features { style, .. } if *style == wanted)
            })
        });
        if stale {
            map.layers.update(|stack| {
                stack.restyle(PROVINCE_LAYER, |style| *style = wanted);
            });
        }
    });

    Effect::new(move || {
        let Some(map) = slot.get() else {
            return;
        };
        let Some(click) = map.click.get() else {
            return;
        };
        let zoom = map.zoom.get_untracked();
        let (name, popup) = features.with_untracked(|set| {
            let Some(feature) = set
                .as_ref()
                .and_then(|set| set.get(set.hit(click.x, click.y)?))
            else {
                return (None, None);
            };
            (
                feature.name.clone(),
                Some(Popup::province(feature, (click.x, click.y))),
            )
        });

        match resolve_province_click(zoom, name.as_deref()) {
            ClickOutcome::Select(name) => selection.update(|s| s.select_province(name)),
            ClickOutcome::Clear => selection.update(SelectionState::clear),
        }
        // Commune popups take over once communes are shown.
        if !commune_click_active(zoom) {
            map.popup.set(popup);
        }
    });

    on_cleanup(move || {
        if let Some(Some(map)) = slot.try_get_untracked() {
            map.layers.try_update(|stack| stack.remove(PROVINCE_LAYER));
        }
    });
}

/// Commune outlines, shown from the commune zoom threshold up. The asset is
/// fetched the first time the layer is needed.
#[component]
pub fn CommuneLayer() -> impl IntoView {
    let MapSlot(slot) = expect_context();
    let features: RwSignal<Option<SharedFeatures>> = RwSignal::new(None);
    let requested = StoredValue::new(false);
    let gate = StoredValue::new(LayerGate::communes());
    let elevation_fence = StoredValue::new(RequestFence::default());

    let put = move |map: MapInstance, set: SharedFeatures| {
        map.put_layer(Layer::features(
            COMMUNE_LAYER,
            z::COMMUNES,
            set,
            VectorStyle::Commune,
        ));
    };

    Effect::new(move || {
        let Some(map) = slot.get() else {
            return;
        };
        if !map.attached.get() {
            gate.update_value(LayerGate::reset);
            return;
        }
        let zoom = map.zoom.get();
        match gate.try_update_value(|g| g.update(zoom)).flatten() {
            Some(LayerChange::Attach) => match features.get_untracked() {
                Some(set) => put(map, set),
                None if !requested.get_value() => {
                    requested.set_value(true);
                    load_boundaries(COMMUNE_GEOJSON_URL, FeatureKind::Commune, features);
                }
                None => {}
            },
            Some(LayerChange::Detach) => map.remove_layer(COMMUNE_LAYER),
            None => {}
        }
    });

    // The asset may arrive after the gate opened.
    Effect::new(move || {
        let Some(set) = features.get() else {
            return;
        };
        let Some(map) = slot.get_untracked() else {
            return;
        };
        if gate.with_value(LayerGate::is_attached) {
            put(map, set);
        }
    });

    Effect::new(move || {
        let Some(map) = slot.get() else {
            return;
        };
        let Some(click) = map.click.get() else {
            return;
        };
        // Any newer click invalidates a pending elevation lookup.
        elevation_fence.update_value(RequestFence::cancel);
        if !commune_click_active(map.zoom.get_untracked()) {
            return;
        }
        let (lon, lat) = click.lon_lat();
        let popup = features.with_untracked(|set| {
            let set = set.as_ref()?;
            let feature = set.get(set.hit(click.x, click.y)?)?;
            Some(Popup::commune(feature, (click.x, click.y), (lon, lat)))
        });
        let Some(popup) = popup else {
            map.popup.set(None);
            return;
        };

        map.put_layer(Layer::marker(
            CLICK_MARKER_LAYER,
            Marker {
                x: click.x,
                y: click.y,
                style: CLICK_MARKER,
            },
        ));
        map.popup.set(Some(popup));

        let Some(token) = elevation_fence.try_update_value(RequestFence::issue) else {
            return;
        };
        spawn_local(async move {
            let meters = match fetch_elevation(lon, lat).await {
                Ok(meters) => meters,
                Err(e) => {
                    web_sys::console::warn_1(&format!("elevation lookup failed: {e}").into());
                    None
                }
            };
            if elevation_fence.try_with_value(|f| f.is_current(token)) != Some(true) {
                return;
            }
            map.popup.try_update(|popup| {
                if let Some(popup) = popup.as_mut() {
                    popup.set_elevation(meters);
                }
            });
        });
    });

    on_cleanup(move || {
        if let Some(Some(map)) = slot.try_get_untracked() {
            map.layers.try_update(|stack| {
                stack.remove(COMMUNE_LAYER);
                stack.remove(CLICK_MARKER_LAYER);
            });
        }
    });
}
