use diaphan_shared::api::{
    ElevationResponse, commune_geometry_url, commune_names_url, communes_url, elevation_url,
    province_geometry_url, province_names_url, province_summary_url,
};
use diaphan_shared::commune::{CommuneRecord, ProvinceSummary};
use diaphan_shared::feature::parse_features;
use diaphan_shared::{FeatureKind, FeatureSet};
use serde::de::DeserializeOwned;

async fn get(url: &str) -> Result<gloo_net::http::Response, String> {
    let resp = gloo_net::http::Request::get(url)
        .send()
        .await
        .map_err(|e| format!("fetch error: {e}"))?;
    if !resp.ok() {
        return Err(format!("HTTP {} for {url}", resp.status()));
    }
    Ok(resp)
}

async fn get_json<T: DeserializeOwned>(url: &str) -> Result<T, String> {
    get(url)
        .await?
        .json::<T>()
        .await
        .map_err(|e| format!("parse error: {e}"))
}

async fn get_features(url: &str, kind: FeatureKind) -> Result<FeatureSet, String> {
    let text = get(url)
        .await?
        .text()
        .await
        .map_err(|e| format!("read error: {e}"))?;
    parse_features(kind, &text).map_err(|e| e.to_string())
}

/// Static boundary asset (`/data/*.json`).
pub async fn fetch_boundaries(url: &str, kind: FeatureKind) -> Result<FeatureSet, String> {
    get_features(url, kind).await
}

pub async fn fetch_province_names() -> Result<Vec<String>, String> {
    get_json(&province_names_url()).await
}

/// Labels of the form `"<commune>, <province>"`.
pub async fn fetch_commune_names() -> Result<Vec<String>, String> {
    get_json(&commune_names_url()).await
}

pub async fn fetch_communes(province: &str) -> Result<Vec<CommuneRecord>, String> {
    get_json(&communes_url(province)).await
}

pub async fn fetch_province_summary(province: &str) -> Result<ProvinceSummary, String> {
    get_json(&province_summary_url(province)).await
}

pub async fn fetch_province_geometry(province: &str) -> Result<FeatureSet, String> {
    get_features(&province_geometry_url(province), FeatureKind::Province).await
}

pub async fn fetch_commune_geometry(province: &str, commune: &str) -> Result<FeatureSet, String> {
    get_features(&commune_geometry_url(province, commune), FeatureKind::Commune).await
}

/// Elevation in meters at the given point; `Ok(None)` when the service has no value.
pub async fn fetch_elevation(lon: f64, lat: f64) -> Result<Option<f64>, String> {
    let resp: ElevationResponse = get_json(&elevation_url(lon, lat)).await?;
    Ok(resp.meters())
}
