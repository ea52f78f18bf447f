//! Administrative boundary features decoded from GeoJSON.

use std::sync::Arc;

use geo::{Contains, Coord, Geometry, MapCoords, MultiPolygon, Point};
use geojson::GeoJson;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::extent::Extent;
use crate::projection::from_lon_lat;
use crate::spatial::SpatialGrid;

#[derive(Debug, Error)]
pub enum FeatureError {
    #[error("invalid GeoJSON: {0}")]
    GeoJson(#[from] geojson::Error),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Which administrative level a feature describes; selects the property keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureKind {
    Province,
    Commune,
}

impl FeatureKind {
    const fn code_key(self) -> &'static str {
        match self {
            FeatureKind::Province => "maTinh_BNV",
            FeatureKind::Commune => "maXa",
        }
    }

    const fn name_key(self) -> &'static str {
        match self {
            FeatureKind::Province => "tenTinh",
            FeatureKind::Commune => "tenXa",
        }
    }
}

const PROVINCE_NAME_KEY: &str = "tenTinh";
const AREA_KEY: &str = "dienTich";
const POPULATION_KEY: &str = "danSo";

/// A province or commune polygon in EPSG:3857 with its attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct AdminFeature {
    pub kind: FeatureKind,
    pub code: Option<String>,
    pub name: Option<String>,
    /// Parent province name (communes) or own name (provinces).
    pub province: Option<String>,
    pub area_km2: Option<f64>,
    pub population: Option<f64>,
    pub geometry: MultiPolygon<f64>,
    pub extent: Extent,
}

impl AdminFeature {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("?")
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        self.extent.contains(x, y) && self.geometry.contains(&Point::new(x, y))
    }
}

/// Loaded features plus a spatial index over their extents.
#[derive(Debug, Clone)]
pub struct FeatureSet {
    features: Vec<AdminFeature>,
    grid: SpatialGrid,
}

impl FeatureSet {
    pub fn new(features: Vec<AdminFeature>) -> Self {
        let grid = SpatialGrid::build(features.iter().map(|f| f.extent).collect());
        Self { features, grid }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn features(&self) -> &[AdminFeature] {
        &self.features
    }

    pub fn get(&self, idx: usize) -> Option<&AdminFeature> {
        self.features.get(idx)
    }

    /// Combined extent of all features.
    pub fn extent(&self) -> Option<Extent> {
        Extent::union_all(self.features.iter().map(|f| f.extent))
    }

    /// Index of the topmost feature containing the point.
    pub fn hit(&self, x: f64, y: f64) -> Option<usize> {
        self.grid
            .candidates_at(x, y)
            .into_iter()
            .filter(|&idx| self.features[idx].contains(x, y))
            .max()
    }

    /// Indices of features whose extent intersects `view`.
    pub fn visible(&self, view: &Extent) -> Vec<usize> {
        self.grid.query(view)
    }
}

pub type SharedFeatures = Arc<FeatureSet>;

/// Decode a GeoJSON document (collection, single feature, or bare geometry).
pub fn parse_features(kind: FeatureKind, text: &str) -> Result<FeatureSet, FeatureError> {
    let geojson = text.parse::<GeoJson>()?;
    Ok(FeatureSet::new(decode(kind, geojson)?))
}

pub fn features_from_value(kind: FeatureKind, value: Value) -> Result<FeatureSet, FeatureError> {
    let geojson = GeoJson::from_json_value(value)?;
    Ok(FeatureSet::new(decode(kind, geojson)?))
}

fn decode(kind: FeatureKind, geojson: GeoJson) -> Result<Vec<AdminFeature>, FeatureError> {
    let raw: Vec<(Option<geojson::Geometry>, Option<Map<String, Value>>)> = match geojson {
        GeoJson::FeatureCollection(fc) => fc
            .features
            .into_iter()
            .map(|f| (f.geometry, f.properties))
            .collect(),
        GeoJson::Feature(f) => vec![(f.geometry, f.properties)],
        GeoJson::Geometry(g) => vec![(Some(g), None)],
    };

    let mut out = Vec::with_capacity(raw.len());
    for (geometry, properties) in raw {
        let Some(geometry) = geometry else {
            continue;
        };
        let geometry: Geometry<f64> = geometry.value.try_into()?;
        let Some(polygons) = into_multi_polygon(geometry) else {
            continue;
        };
        let projected = polygons.map_coords(|c| {
            let (x, y) = from_lon_lat(c.x, c.y);
            Coord { x, y }
        });
        let Some(extent) = Extent::of_geometry(&Geometry::MultiPolygon(projected.clone())) else {
            continue;
        };
        let props = properties.unwrap_or_default();
        let name = prop_string(&props, kind.name_key());
        let province = match kind {
            FeatureKind::Province => name.clone(),
            FeatureKind::Commune => prop_string(&props, PROVINCE_NAME_KEY),
        };
        out.push(AdminFeature {
            kind,
            code: prop_string(&props, kind.code_key()),
            name,
            province,
            area_km2: prop_f64(&props, AREA_KEY),
            population: prop_f64(&props, POPULATION_KEY),
            geometry: projected,
            extent,
        });
    }
    Ok(out)
}

fn into_multi_polygon(geometry: Geometry<f64>) -> Option<MultiPolygon<f64>> {
    match geometry {
        Geometry::Polygon(p) => Some(MultiPolygon(vec![p])),
        Geometry::MultiPolygon(m) => Some(m),
        Geometry::GeometryCollection(gc) => {
            let polys: Vec<_> = gc
                .into_iter()
                .filter_map(into_multi_polygon)
                .flat_map(|m| m.0)
                .collect();
            (!polys.is_empty()).then(|| MultiPolygon(polys))
        }
        _ => None,
    }
}

fn prop_string(props: &Map<String, Value>, key: &str) -> Option<String> {
    match props.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn prop_f64(props: &Map<String, Value>, key: &str) -> Option<f64> {
    match props.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', ".").parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{FeatureKind, features_from_value, parse_features};
    use crate::projection::from_lon_lat;
    use serde_json::json;

    fn square(lon: f64, lat: f64, size: f64) -> serde_json::Value {
        json!([[
            [lon, lat],
            [lon + size, lat],
            [lon + size, lat + size],
            [lon, lat + size],
            [lon, lat]
        ]])
    }

    fn provinces() -> serde_json::Value {
        json!({
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "properties": { "maTinh_BNV": "01", "tenTinh": "Hà Nội", "dienTich": 3359.84, "danSo": 8587100 },
                    "geometry": { "type": "Polygon", "coordinates": square(105.0, 20.5, 1.0) }
                },
                {
                    "type": "Feature",
                    "properties": { "maTinh_BNV": 79, "tenTinh": "Hồ Chí Minh" },
                    "geometry": { "type": "MultiPolygon", "coordinates": [square(106.0, 10.0, 1.0)] }
                },
                {
                    "type": "Feature",
                    "properties": { "tenTinh": "Điểm" },
                    "geometry": { "type": "Point", "coordinates": [100.0, 10.0] }
                },
                {
                    "type": "Feature",
                    "properties": { "tenTinh": "Rỗng" },
                    "geometry": null
                }
            ]
        })
    }

    #[test]
    fn decodes_polygons_and_skips_other_geometry() {
        let set = features_from_value(FeatureKind::Province, provinces()).unwrap();
        assert_eq!(set.len(), 2);
        let hn = set.get(0).unwrap();
        assert_eq!(hn.code.as_deref(), Some("01"));
        assert_eq!(hn.display_name(), "Hà Nội");
        assert_eq!(hn.province.as_deref(), Some("Hà Nội"));
        assert_eq!(hn.area_km2, Some(3359.84));
        assert_eq!(hn.population, Some(8_587_100.0));
    }

    #[test]
    fn numeric_codes_become_strings_and_missing_values_stay_none() {
        let set = features_from_value(FeatureKind::Province, provinces()).unwrap();
        let hcm = set.get(1).unwrap();
        assert_eq!(hcm.code.as_deref(), Some("79"));
        assert_eq!(hcm.area_km2, None);
        assert_eq!(hcm.population, None);
    }

    #[test]
    fn geometry_is_reprojected_to_mercator() {
        let set = features_from_value(FeatureKind::Province, provinces()).unwrap();
        let hn = set.get(0).unwrap();
        let (x, y) = from_lon_lat(105.0, 20.5);
        assert!((hn.extent.min_x - x).abs() < 1e-6);
        assert!((hn.extent.min_y - y).abs() < 1e-6);
    }

    #[test]
    fn hit_resolves_containing_feature() {
        let set = features_from_value(FeatureKind::Province, provinces()).unwrap();
        let (x, y) = from_lon_lat(105.5, 21.0);
        assert_eq!(set.hit(x, y), Some(0));
        let (x, y) = from_lon_lat(106.5, 10.5);
        assert_eq!(set.hit(x, y), Some(1));
        let (x, y) = from_lon_lat(90.0, 10.5);
        assert_eq!(set.hit(x, y), None);
    }

    #[test]
    fn commune_properties_carry_parent_province() {
        let text = json!({
            "type": "Feature",
            "properties": { "maXa": "00004", "tenXa": "Phường Ba Đình", "tenTinh": "Hà Nội", "danSo": "65000" },
            "geometry": { "type": "Polygon", "coordinates": square(105.8, 21.0, 0.02) }
        })
        .to_string();
        let set = parse_features(FeatureKind::Commune, &text).unwrap();
        let f = set.get(0).unwrap();
        assert_eq!(f.code.as_deref(), Some("00004"));
        assert_eq!(f.display_name(), "Phường Ba Đình");
        assert_eq!(f.province.as_deref(), Some("Hà Nội"));
        assert_eq!(f.population, Some(65_000.0));
    }

    #[test]
    fn missing_name_displays_placeholder() {
        let text = json!({
            "type": "Polygon",
            "coordinates": square(105.0, 20.0, 1.0)
        })
        .to_string();
        let set = parse_features(FeatureKind::Province, &text).unwrap();
        assert_eq!(set.get(0).unwrap().display_name(), "?");
    }

    #[test]
    fn invalid_json_is_an_error() {
        assert!(parse_features(FeatureKind::Province, "{ nope").is_err());
    }
}
