use std::sync::Arc;

use diaphan_shared::api::RequestFence;
use diaphan_shared::config::{FIT_DURATION_MS, FIT_MAX_ZOOM, FIT_PADDING_PX};
use diaphan_shared::search::{SearchSuggestions, SearchTarget};
use leptos::prelude::*;
use wasm_bindgen_futures::spawn_local;

use crate::api::{
    fetch_commune_geometry, fetch_commune_names, fetch_province_geometry, fetch_province_names,
};
use crate::app::{MapSlot, Selection};

const NO_RESULTS: &str = "Không tìm thấy kết quả";

fn load_names(
    what: &'static str,
    target: RwSignal<Vec<String>>,
    fetch: impl std::future::Future<Output = Result<Vec<String>, String>> + 'static,
) {
    spawn_local(async move {
        match fetch.await {
            Ok(names) => {
                target.try_set(names);
            }
            Err(e) => {
                web_sys::console::warn_1(&format!("{what} names fetch failed: {e}").into());
            }
        }
    });
}

/// Province/commune search with a suggestion dropdown. Choosing a suggestion
/// fits the view to its geometry, highlights it and selects its province.
#[component]
pub fn SearchBox() -> impl IntoView {
    let MapSlot(slot) = expect_context();
    let Selection(selection) = expect_context();
    let provinces: RwSignal<Vec<String>> = RwSignal::new(Vec::new());
    let communes: RwSignal<Vec<String>> = RwSignal::new(Vec::new());
    let query: RwSignal<String> = RwSignal::new(String::new());
    let open: RwSignal<bool> = RwSignal::new(false);
    let fence = StoredValue::new(RequestFence::default());

    Effect::new(move || {
        load_names("province", provinces, fetch_province_names());
        load_names("commune", communes, fetch_commune_names());
    });

    let suggestions = Memo::new(move |_| {
        query.with(|q| {
            provinces.with(|p| communes.with(|c| SearchSuggestions::build(p, c, q)))
        })
    });

    let choose = move |target: SearchTarget| {
        query.set(target.label());
        open.set(false);
        let Some(token) = fence.try_update_value(RequestFence::issue) else {
            return;
        };
        spawn_local(async move {
            let result = match &target {
                SearchTarget::Province(name) => fetch_province_geometry(name).await,
                SearchTarget::Commune { name, province } => {
                    fetch_commune_geometry(province, name).await
                }
            };
            if fence.try_with_value(|f| f.is_current(token)) != Some(true) {
                return;
            }
            let set = match result {
                Ok(set) => set,
                Err(e) => {
                    web_sys::console::warn_1(
                        &format!("geometry fetch failed for {}: {e}", target.label()).into(),
                    );
                    return;
                }
            };
            let Some(extent) = set.extent() else {
                web_sys::console::warn_1(&format!("no geometry for {}", target.label()).into());
                return;
            };
            if let Some(Some(map)) = slot.try_get_untracked() {
                map.fit_extent(&extent, FIT_PADDING_PX, FIT_MAX_ZOOM, FIT_DURATION_MS);
            }
            let province = target.province().to_string();
            selection.try_update(|s| s.apply_search(province, Arc::new(set)));
        });
    };

    let pick_commune = move |label: String| match SearchTarget::commune_from_label(&label) {
        Some(target) => choose(target),
        None => web_sys::console::warn_1(&format!("unrecognized commune label: {label}").into()),
    };

    let item = move |label: String, pick: Box<dyn Fn(String)>| {
        let text = label.clone();
        view! {
            <div
                style="padding: 6px 10px; cursor: pointer; font-size: 0.8rem; color: #111827;"
                on:mousedown=move |e| {
                    e.prevent_default();
                    pick(label.clone());
                }
            >
                {text}
            </div>
        }
    };

    let dropdown = move || {
        if !open.get() || query.with(String::is_empty) {
            return ().into_any();
        }
        let SearchSuggestions {
            provinces,
            communes,
        } = suggestions.get();
        if provinces.is_empty() && communes.is_empty() {
            return view! {
                <div style="padding: 8px 10px; font-size: 0.8rem; color: #6b7280;">{NO_RESULTS}</div>
            }
            .into_any();
        }
        let province_items = provinces
            .into_iter()
            .map(|name| item(name, Box::new(move |n| choose(SearchTarget::Province(n)))))
            .collect_view();
        let commune_items = communes
            .into_iter()
            .map(|label| item(label, Box::new(pick_commune)))
            .collect_view();
        view! {
            <div>
                <div style="padding: 4px 10px; font-size: 0.68rem; font-weight: 700; color: #6b7280; text-transform: uppercase;">"Tỉnh/Thành phố"</div>
                {province_items}
                <div style="padding: 4px 10px; font-size: 0.68rem; font-weight: 700; color: #6b7280; text-transform: uppercase; border-top: 1px solid #e5e7eb;">"Xã/Phường"</div>
                {commune_items}
            </div>
        }
        .into_any()
    };

    view! {
        <div style="position: absolute; top: 12px; left: 12px; z-index: 25; width: 320px; max-width: calc(100% - 24px);">
            <input
                type="text"
                data-search-input=""
                placeholder="Tìm tỉnh, xã..."
                style="width: 100%; box-sizing: border-box; padding: 8px 12px; border: 1px solid #d1d5db; border-radius: 8px; font-size: 0.85rem; box-shadow: 0 2px 8px rgba(0,0,0,0.15); outline: none;"
                prop:value=move || query.get()
                on:input=move |e| {
                    query.set(event_target_value(&e));
                    open.set(true);
                }
                on:focus=move |_| open.set(true)
                on:blur=move |_| open.set(false)
            />
            <div style="margin-top: 4px; background: #ffffff; border-radius: 8px; box-shadow: 0 4px 16px rgba(0,0,0,0.18); max-height: 60vh; overflow-y: auto;">
                {dropdown}
            </div>
        </div>
    }
}
