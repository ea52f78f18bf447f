//! Commune table rows and province summaries returned by the REST API,
//! plus the ordering and filtering the sidebar applies to them.

use std::cmp::Ordering;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::collate;
use crate::config::WARD_MARKER;
use crate::format::text_or_missing;
use crate::search::matches;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommuneRecord {
    #[serde(rename = "maXa", deserialize_with = "lenient_string")]
    pub code: Option<String>,
    #[serde(rename = "tenXa", deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(rename = "tenTinh", deserialize_with = "lenient_string")]
    pub province: Option<String>,
    #[serde(rename = "dienTich", deserialize_with = "lenient_number")]
    pub area_km2: Option<f64>,
    #[serde(rename = "danSo", deserialize_with = "lenient_number")]
    pub population: Option<f64>,
}

impl CommuneRecord {
    /// Name for display; `"?"` when the source has none.
    pub fn display_name(&self) -> &str {
        text_or_missing(self.name.as_deref())
    }

    /// Name used for ordering and filtering; empty when missing.
    fn sort_key(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }

    pub fn is_ward(&self) -> bool {
        self.sort_key().contains(WARD_MARKER)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvinceSummary {
    #[serde(rename = "maTinh_BNV", deserialize_with = "lenient_string")]
    pub code: Option<String>,
    #[serde(rename = "tenTinh", deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(rename = "dienTich", deserialize_with = "lenient_number")]
    pub area_km2: Option<f64>,
    #[serde(rename = "danSo", deserialize_with = "lenient_number")]
    pub population: Option<f64>,
}

/// Accepts strings or numbers; blank strings and nulls become `None`.
fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Accepts numbers or numeric strings (either decimal separator).
fn lenient_number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', ".").parse().ok(),
        _ => None,
    })
}

/// Wards first, then Vietnamese dictionary order of the name.
pub fn compare_communes(a: &CommuneRecord, b: &CommuneRecord) -> Ordering {
    b.is_ward()
        .cmp(&a.is_ward())
        .then_with(|| collate::compare(a.sort_key(), b.sort_key()))
}

pub fn sort_communes(records: &mut [CommuneRecord]) {
    records.sort_by(compare_communes);
}

/// Rows whose name contains `query`, case-insensitively. An empty query keeps all rows.
pub fn filter_communes<'a>(records: &'a [CommuneRecord], query: &str) -> Vec<&'a CommuneRecord> {
    records
        .iter()
        .filter(|r| query.is_empty() || matches(r.sort_key(), query))
        .collect()
}

/// Sidebar body for the current selection.
#[derive(Debug, Clone, PartialEq)]
pub enum SidebarView<'a> {
    Loading,
    Table(Vec<&'a CommuneRecord>),
    NotFound,
}

impl<'a> SidebarView<'a> {
    pub fn resolve(records: Option<&'a [CommuneRecord]>, query: &str) -> Self {
        let Some(records) = records else {
            return SidebarView::Loading;
        };
        let rows = filter_communes(records, query);
        if rows.is_empty() {
            SidebarView::NotFound
        } else {
            SidebarView::Table(rows)
        }
    }
}
