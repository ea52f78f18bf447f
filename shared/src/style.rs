use crate::colors::{FALLBACK_FILL, HOVER_FILL_ALPHA, ProvinceColors, Rgba};
use crate::feature::AdminFeature;

pub const PROVINCE_STROKE: Rgba = Rgba::new(30, 64, 175, 1.0); // #1e40af
pub const PROVINCE_STROKE_WIDTH: f64 = 1.5;
pub const HOVER_STROKE: Rgba = Rgba::new(0, 0, 0, 1.0);
pub const HOVER_STROKE_WIDTH: f64 = 2.0;
pub const COMMUNE_STROKE: Rgba = Rgba::new(255, 0, 255, 1.0); // #FF00FF
pub const COMMUNE_STROKE_WIDTH: f64 = 1.2;
pub const HIGHLIGHT_STROKE: Rgba = Rgba::new(220, 38, 38, 0.95);
pub const HIGHLIGHT_FILL: Rgba = Rgba::new(250, 204, 21, 0.18);
pub const HIGHLIGHT_STROKE_WIDTH: f64 = 3.0;

/// How a vector layer paints its polygons.
#[derive(Debug, Clone, PartialEq)]
pub enum VectorStyle {
    /// Province boundaries; `hovered` holds the administrative code under the pointer.
    Province {
        fill_enabled: bool,
        hovered: Option<String>,
    },
    Commune,
    Highlight,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureStyle {
    pub fill: Option<Rgba>,
    pub stroke: Rgba,
    pub stroke_width: f64,
}

/// Resolve the paint for one feature. Evaluated on every render pass; province
/// colors are drawn from `sample` the first time a code is seen.
pub fn feature_style(
    style: &VectorStyle,
    feature: &AdminFeature,
    colors: &mut ProvinceColors,
    sample: impl FnMut() -> f64,
) -> FeatureStyle {
    match style {
        VectorStyle::Province {
            fill_enabled,
            hovered,
        } => {
            let assigned = feature
                .code
                .as_deref()
                .map(|code| colors.color_for(code, sample));
            let is_hovered = hovered.is_some() && hovered.as_deref() == feature.code.as_deref();
            if is_hovered {
                return FeatureStyle {
                    fill: Some(assigned.unwrap_or(FALLBACK_FILL).with_alpha(HOVER_FILL_ALPHA)),
                    stroke: HOVER_STROKE,
                    stroke_width: HOVER_STROKE_WIDTH,
                };
            }
            let fill = if *fill_enabled { assigned } else { None };
            FeatureStyle {
                fill,
                stroke: PROVINCE_STROKE,
                stroke_width: PROVINCE_STROKE_WIDTH,
            }
        }
        VectorStyle::Commune => FeatureStyle {
            fill: None,
            stroke: COMMUNE_STROKE,
            stroke_width: COMMUNE_STROKE_WIDTH,
        },
        VectorStyle::Highlight => FeatureStyle {
            fill: Some(HIGHLIGHT_FILL),
            stroke: HIGHLIGHT_STROKE,
            stroke_width: HIGHLIGHT_STROKE_WIDTH,
        },
    }
}

/// Circle symbol for point markers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerStyle {
    pub radius: f64,
    pub fill: Rgba,
    pub stroke: Rgba,
    pub stroke_width: f64,
}

pub const CURRENT_LOCATION_MARKER: MarkerStyle = MarkerStyle {
    radius: 8.0,
    fill: Rgba::new(0, 0, 255, 1.0),
    stroke: Rgba::new(255, 255, 255, 1.0),
    stroke_width: 2.0,
};

pub const CLICK_MARKER: MarkerStyle = MarkerStyle {
    radius: 6.0,
    fill: Rgba::new(220, 38, 38, 1.0),
    stroke: Rgba::new(255, 255, 255, 1.0),
    stroke_width: 2.0,
};

#[cfg(test)]
mod tests {
    use super::{COMMUNE_STROKE, HOVER_STROKE, PROVINCE_STROKE, VectorStyle, feature_style};
    use crate::colors::{HOVER_FILL_ALPHA, ProvinceColors};
    use crate::extent::Extent;
    use crate::feature::{AdminFeature, FeatureKind};
    use geo::MultiPolygon;

    fn province(code: Option<&str>) -> AdminFeature {
        AdminFeature {
            kind: FeatureKind::Province,
            code: code.map(str::to_string),
            name: Some("Huế".into()),
            province: Some("Huế".into()),
            area_km2: None,
            population: None,
            geometry: MultiPolygon(Vec::new()),
            extent: Extent::new(0.0, 0.0, 1.0, 1.0),
        }
    }

    fn half() -> f64 {
        0.5
    }

    #[test]
    fn filled_province_uses_assigned_color() {
        let mut colors = ProvinceColors::new();
        let style = VectorStyle::Province {
            fill_enabled: true,
            hovered: None,
        };
        let s = feature_style(&style, &province(Some("46")), &mut colors, half);
        assert_eq!(s.fill, colors.get("46"));
        assert_eq!(s.stroke, PROVINCE_STROKE);
    }

    #[test]
    fn unfilled_province_still_reserves_its_color() {
        let mut colors = ProvinceColors::new();
        let style = VectorStyle::Province {
            fill_enabled: false,
            hovered: None,
        };
        let s = feature_style(&style, &province(Some("46")), &mut colors, half);
        assert_eq!(s.fill, None);
        assert!(colors.get("46").is_some());
    }

    #[test]
    fn hovered_province_is_darkened_with_same_hue() {
        let mut colors = ProvinceColors::new();
        let plain = VectorStyle::Province {
            fill_enabled: true,
            hovered: None,
        };
        let base = feature_style(&plain, &province(Some("46")), &mut colors, half).fill.unwrap();

        let hovered = VectorStyle::Province {
            fill_enabled: true,
            hovered: Some("46".into()),
        };
        let mut calls = 0;
        let s = feature_style(&hovered, &province(Some("46")), &mut colors, || {
            calls += 1;
            0.9
        });
        assert_eq!(calls, 0, "color must not be redrawn on hover");
        assert_eq!(s.stroke, HOVER_STROKE);
        assert_eq!(s.fill, Some(base.with_alpha(HOVER_FILL_ALPHA)));
    }

    #[test]
    fn hover_of_codeless_feature_is_ignored() {
        let mut colors = ProvinceColors::new();
        let style = VectorStyle::Province {
            fill_enabled: true,
            hovered: None,
        };
        let s = feature_style(&style, &province(None), &mut colors, half);
        assert_eq!(s.fill, None);
        assert!(colors.is_empty());
    }

    #[test]
    fn commune_is_outline_only() {
        let mut colors = ProvinceColors::new();
        let s = feature_style(&VectorStyle::Commune, &province(Some("1")), &mut colors, half);
        assert_eq!(s.fill, None);
        assert_eq!(s.stroke, COMMUNE_STROKE);
        assert!(colors.is_empty());
    }
}
