use diaphan_shared::api::RequestFence;
use diaphan_shared::commune::{CommuneRecord, ProvinceSummary, SidebarView, sort_communes};
use diaphan_shared::format::{format_optional, text_or_missing};
use leptos::prelude::*;
use wasm_bindgen_futures::spawn_local;

use crate::api::{fetch_communes, fetch_province_summary};
use crate::app::{Selection, SidebarOpen};

const SIDEBAR_WIDTH: f64 = 380.0;

/// Header rows for the province summary; every value falls back to `"?"`.
fn summary_rows(summary: Option<&ProvinceSummary>) -> [(&'static str, String); 3] {
    [
        (
            "Mã tỉnh",
            text_or_missing(summary.and_then(|s| s.code.as_deref())).to_string(),
        ),
        (
            "Diện tích (km²)",
            format_optional(summary.and_then(|s| s.area_km2)),
        ),
        ("Dân số", format_optional(summary.and_then(|s| s.population))),
    ]
}

/// Commune table for the selected province, with a live name filter.
#[component]
pub fn Sidebar() -> impl IntoView {
    let Selection(selection) = expect_context();
    let SidebarOpen(open) = expect_context();
    let province = Memo::new(move |_| selection.with(|s| s.province.clone()));
    let communes: RwSignal<Option<Vec<CommuneRecord>>> = RwSignal::new(None);
    let summary: RwSignal<Option<ProvinceSummary>> = RwSignal::new(None);
    let filter: RwSignal<String> = RwSignal::new(String::new());
    let fence = StoredValue::new(RequestFence::default());

    // Each new selection resets the panel, reopens it and refetches.
    Effect::new(move || {
        let current = province.get();
        communes.set(None);
        summary.set(None);
        filter.set(String::new());
        let Some(name) = current else {
            fence.update_value(RequestFence::cancel);
            return;
        };
        open.set(true);
        let Some(token) = fence.try_update_value(RequestFence::issue) else {
            return;
        };
        let is_current = move || fence.try_with_value(|f| f.is_current(token)) == Some(true);

        let rows_for = name.clone();
        spawn_local(async move {
            let rows = match fetch_communes(&rows_for).await {
                Ok(mut rows) => {
                    sort_communes(&mut rows);
                    rows
                }
                Err(e) => {
                    web_sys::console::warn_1(
                        &format!("commune list fetch failed for {rows_for}: {e}").into(),
                    );
                    Vec::new()
                }
            };
            if is_current() {
                communes.try_set(Some(rows));
            }
        });
        spawn_local(async move {
            match fetch_province_summary(&name).await {
                Ok(info) if is_current() => {
                    summary.try_set(Some(info));
                }
                Ok(_) => {}
                Err(e) => {
                    web_sys::console::warn_1(
                        &format!("province summary fetch failed for {name}: {e}").into(),
                    );
                }
            }
        });
    });

    let header = move || {
        let Some(name) = province.get() else {
            return view! {
                <div style="color: #6b7280; font-size: 0.85rem;">"Chọn một tỉnh trên bản đồ để xem danh sách xã/phường."</div>
            }
            .into_any();
        };
        let rows = summary.with(|s| summary_rows(s.as_ref()));
        let rows = rows
            .into_iter()
            .map(|(label, value)| {
                view! {
                    <div style="display: flex; justify-content: space-between; gap: 8px; font-size: 0.8rem;">
                        <span style="color: #6b7280;">{label}</span>
                        <span style="color: #111827; font-variant-numeric: tabular-nums;">{value}</span>
                    </div>
                }
            })
            .collect_view();
        view! {
            <div>
                <div style="font-size: 1.05rem; font-weight: 700; color: #1e40af; margin-bottom: 6px;">{name}</div>
                {rows}
            </div>
        }
        .into_any()
    };

    let body = move || {
        if province.with(Option::is_none) {
            return ().into_any();
        }
        communes.with(|rows| {
            filter.with(|query| match SidebarView::resolve(rows.as_deref(), query) {
                SidebarView::Loading => view! {
                    <div style="padding: 12px 0; color: #6b7280; font-size: 0.8rem;">"Đang tải..."</div>
                }
                .into_any(),
                SidebarView::NotFound => view! {
                    <div style="padding: 12px 0; color: #6b7280; font-size: 0.8rem;">"Không tìm thấy xã/phường"</div>
                }
                .into_any(),
                SidebarView::Table(rows) => {
                    let body = rows
                        .into_iter()
                        .enumerate()
                        .map(|(i, record)| {
                            view! {
                                <tr style="border-bottom: 1px solid #f3f4f6;">
                                    <td style="padding: 4px 6px; color: #9ca3af;">{i + 1}</td>
                                    <td style="padding: 4px 6px;">{record.display_name().to_string()}</td>
                                    <td style="padding: 4px 6px; color: #6b7280;">{text_or_missing(record.code.as_deref()).to_string()}</td>
                                    <td style="padding: 4px 6px; text-align: right;">{format_optional(record.area_km2)}</td>
                                    <td style="padding: 4px 6px; text-align: right;">{format_optional(record.population)}</td>
                                </tr>
                            }
                        })
                        .collect_view();
                    view! {
                        <table style="width: 100%; border-collapse: collapse; font-size: 0.78rem; font-variant-numeric: tabular-nums;">
                            <thead>
                                <tr style="text-align: left; color: #374151; border-bottom: 1px solid #d1d5db;">
                                    <th style="padding: 4px 6px;">"#"</th>
                                    <th style="padding: 4px 6px;">"Tên xã"</th>
                                    <th style="padding: 4px 6px;">"Mã xã"</th>
                                    <th style="padding: 4px 6px; text-align: right;">"Diện tích (km²)"</th>
                                    <th style="padding: 4px 6px; text-align: right;">"Dân số"</th>
                                </tr>
                            </thead>
                            <tbody>{body}</tbody>
                        </table>
                    }
                    .into_any()
                }
            })
        })
    };

    view! {
        <button
            title="Danh sách xã/phường"
            style="position: absolute; bottom: 12px; right: 12px; z-index: 40; padding: 6px 10px; border: 1px solid #d1d5db; border-radius: 6px; background: #ffffff; cursor: pointer; font-size: 0.78rem; box-shadow: 0 2px 8px rgba(0,0,0,0.15);"
            style:display=move || if open.get() { "none" } else { "block" }
            on:click=move |_| open.set(true)
        >
            "\u{00AB} Xã/Phường"
        </button>
        <aside
            style:width=format!("{SIDEBAR_WIDTH}px")
            style:display=move || if open.get() { "flex" } else { "none" }
            style="height: 100%; flex-shrink: 0; flex-direction: column; background: #ffffff; border-left: 1px solid #d1d5db; box-shadow: -2px 0 8px rgba(0,0,0,0.08); position: relative; z-index: 35;"
        >
            <div style="padding: 14px 16px 10px; border-bottom: 1px solid #e5e7eb; position: relative;">
                <button
                    title="Đóng"
                    style="position: absolute; top: 8px; right: 10px; background: none; border: none; cursor: pointer; color: #6b7280; font-size: 1.1rem; line-height: 1;"
                    on:click=move |_| open.set(false)
                >
                    "\u{00D7}"
                </button>
                {header}
                <input
                    type="text"
                    placeholder="Lọc theo tên xã..."
                    style="margin-top: 10px; width: 100%; box-sizing: border-box; padding: 6px 10px; border: 1px solid #d1d5db; border-radius: 6px; font-size: 0.8rem;"
                    prop:value=move || filter.get()
                    prop:disabled=move || province.with(Option::is_none)
                    on:input=move |e| filter.set(event_target_value(&e))
                />
            </div>
            <div style="flex: 1; overflow-y: auto; padding: 0 16px 16px;">{body}</div>
        </aside>
    }
}
