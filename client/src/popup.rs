use diaphan_shared::AdminFeature;
use diaphan_shared::format::{
    format_coordinate, format_elevation, format_optional, text_or_missing,
};
use leptos::prelude::*;

use crate::app::MapSlot;

pub const ELEVATION_LABEL: &str = "Độ cao";
const ELEVATION_LOADING: &str = "Đang tải...";

/// Attribute card anchored to a map position (EPSG:3857).
#[derive(Debug, Clone, PartialEq)]
pub struct Popup {
    pub anchor: (f64, f64),
    pub title: String,
    pub rows: Vec<(String, String)>,
}

impl Popup {
    pub fn province(feature: &AdminFeature, anchor: (f64, f64)) -> Self {
        Self {
            anchor,
            title: feature.display_name().to_string(),
            rows: vec![
                ("Mã tỉnh".into(), text_or_missing(feature.code.as_deref()).into()),
                ("Diện tích (km²)".into(), format_optional(feature.area_km2)),
                ("Dân số".into(), format_optional(feature.population)),
            ],
        }
    }

    /// Commune card with the clicked lon/lat and a pending elevation row.
    pub fn commune(feature: &AdminFeature, anchor: (f64, f64), lon_lat: (f64, f64)) -> Self {
        Self {
            anchor,
            title: feature.display_name().to_string(),
            rows: vec![
                ("Mã xã".into(), text_or_missing(feature.code.as_deref()).into()),
                ("Tỉnh".into(), text_or_missing(feature.province.as_deref()).into()),
                ("Diện tích (km²)".into(), format_optional(feature.area_km2)),
                ("Dân số".into(), format_optional(feature.population)),
                ("Kinh độ".into(), format_coordinate(lon_lat.0)),
                ("Vĩ độ".into(), format_coordinate(lon_lat.1)),
                (ELEVATION_LABEL.into(), ELEVATION_LOADING.into()),
            ],
        }
    }

    pub fn set_row(&mut self, label: &str, value: String) {
        match self.rows.iter_mut().find(|(l, _)| l == label) {
            Some(row) => row.1 = value,
            None => self.rows.push((label.to_string(), value)),
        }
    }

    pub fn set_elevation(&mut self, meters: Option<f64>) {
        self.set_row(ELEVATION_LABEL, format_elevation(meters));
    }
}

/// Renders the map's popup at its anchor, following pans and zooms.
#[component]
pub fn MapPopup() -> impl IntoView {
    let MapSlot(slot) = expect_context();

    move || {
        let Some(map) = slot.get() else {
            return ().into_any();
        };
        let Some(popup) = map.popup.get() else {
            return ().into_any();
        };
        let (sx, sy) = map.project(popup.anchor.0, popup.anchor.1);
        let rows = popup
            .rows
            .into_iter()
            .map(|(label, value)| {
                view! {
                    <tr>
                        <td style="color: #6b7280; padding: 2px 8px 2px 0; white-space: nowrap;">{label}</td>
                        <td style="color: #111827; padding: 2px 0; font-variant-numeric: tabular-nums;">{value}</td>
                    </tr>
                }
            })
            .collect_view();
        view! {
            <div
                style:left=format!("{sx}px")
                style:top=format!("{sy}px")
                style="position: absolute; z-index: 30; transform: translate(-50%, calc(-100% - 12px)); background: #ffffff; border: 1px solid #d1d5db; border-radius: 8px; box-shadow: 0 4px 16px rgba(0,0,0,0.18); padding: 10px 12px; min-width: 200px; font-size: 0.8rem;"
            >
                <button
                    style="position: absolute; top: 4px; right: 6px; background: none; border: none; cursor: pointer; color: #6b7280; font-size: 1rem; line-height: 1;"
                    on:click=move |_| map.popup.set(None)
                >"\u{00D7}"</button>
                <div style="font-weight: 700; margin-bottom: 6px; padding-right: 16px;">{popup.title}</div>
                <table style="border-collapse: collapse;">{rows}</table>
            </div>
        }
        .into_any()
    }
}

#[cfg(test)]
mod tests {
    use super::{ELEVATION_LABEL, Popup};
    use diaphan_shared::extent::Extent;
    use diaphan_shared::{AdminFeature, FeatureKind};
    use geo::MultiPolygon;

    fn commune() -> AdminFeature {
        AdminFeature {
            kind: FeatureKind::Commune,
            code: Some("00004".into()),
            name: Some("Phường Ba Đình".into()),
            province: Some("Hà Nội".into()),
            area_km2: Some(9.2),
            population: None,
            geometry: MultiPolygon(Vec::new()),
            extent: Extent::new(0.0, 0.0, 1.0, 1.0),
        }
    }

    fn value<'a>(popup: &'a Popup, label: &str) -> Option<&'a str> {
        popup.rows.iter().find(|(l, _)| l == label).map(|(_, v)| v.as_str())
    }

    #[test]
    fn commune_popup_shows_attributes_and_pending_elevation() {
        let p = Popup::commune(&commune(), (1.0, 2.0), (105.8341, 21.0355));
        assert_eq!(p.title, "Phường Ba Đình");
        assert_eq!(value(&p, "Dân số"), Some("?"));
        assert_eq!(value(&p, "Diện tích (km²)"), Some("9,2"));
        assert_eq!(value(&p, "Kinh độ"), Some("105.834100"));
        assert_eq!(value(&p, ELEVATION_LABEL), Some("Đang tải..."));
    }

    #[test]
    fn elevation_row_is_replaced_in_place() {
        let mut p = Popup::commune(&commune(), (1.0, 2.0), (105.0, 21.0));
        let rows = p.rows.len();
        p.set_elevation(Some(18.0));
        assert_eq!(value(&p, ELEVATION_LABEL), Some("18 m"));
        p.set_elevation(None);
        assert_eq!(value(&p, ELEVATION_LABEL), Some("?"));
        assert_eq!(p.rows.len(), rows);
    }
}
