use diaphan_shared::config::{
    CURRENT_LOCATION_LAYER, LOCATE_DURATION_MS, LOCATE_MAXIMUM_AGE_MS, LOCATE_TIMEOUT_MS,
    LOCATE_ZOOM,
};
use diaphan_shared::layers::Marker;
use diaphan_shared::locate::{LocateError, LocateGate};
use diaphan_shared::projection::from_lon_lat;
use diaphan_shared::style::CURRENT_LOCATION_MARKER;
use diaphan_shared::{Layer, Viewport};
use leptos::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{Position, PositionError, PositionOptions};

use crate::app::MapSlot;

fn alert(error: LocateError) {
    web_sys::console::warn_1(&format!("locate failed: {error:?}").into());
    if let Some(window) = web_sys::window() {
        window.alert_with_message(&error.message()).ok();
    }
}

/// One-shot position request. Centers the map on the fix and replaces the
/// current-location marker.
#[component]
pub fn LocateButton() -> impl IntoView {
    let MapSlot(slot) = expect_context();
    let gate: RwSignal<LocateGate> = RwSignal::new(LocateGate::default());

    let on_click = move |_| {
        if gate.try_update(LocateGate::try_begin) != Some(true) {
            return;
        }
        let Some(geolocation) = web_sys::window().and_then(|w| w.navigator().geolocation().ok())
        else {
            alert(LocateError::Unsupported);
            gate.update(LocateGate::finish);
            return;
        };

        let on_fix = Closure::once_into_js(move |position: Position| {
            gate.try_update(LocateGate::finish);
            let coords = position.coords();
            let (x, y) = from_lon_lat(coords.longitude(), coords.latitude());
            let Some(Some(map)) = slot.try_get_untracked() else {
                return;
            };
            map.animate_to(Viewport::new(x, y, LOCATE_ZOOM), LOCATE_DURATION_MS);
            map.put_layer(Layer::marker(
                CURRENT_LOCATION_LAYER,
                Marker {
                    x,
                    y,
                    style: CURRENT_LOCATION_MARKER,
                },
            ));
        });
        let on_error = Closure::once_into_js(move |err: PositionError| {
            gate.try_update(LocateGate::finish);
            alert(LocateError::from_code(err.code()));
        });

        let options = PositionOptions::new();
        options.set_enable_high_accuracy(true);
        options.set_timeout(LOCATE_TIMEOUT_MS);
        options.set_maximum_age(LOCATE_MAXIMUM_AGE_MS);
        if geolocation
            .get_current_position_with_error_callback_and_options(
                on_fix.unchecked_ref(),
                Some(on_error.unchecked_ref()),
                &options,
            )
            .is_err()
        {
            alert(LocateError::Unsupported);
            gate.update(LocateGate::finish);
        }
    };

    view! {
        <button
            style="padding: 6px 10px; border: 1px solid #1e40af; border-radius: 4px; background: #1e40af; color: #ffffff; cursor: pointer; font-size: 0.78rem;"
            style:opacity=move || if gate.get().is_busy() { "0.6" } else { "1" }
            prop:disabled=move || gate.get().is_busy()
            on:click=on_click
        >
            {move || gate.get().label()}
        </button>
    }
}
