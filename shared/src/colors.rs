use std::collections::HashMap;
use std::fmt;

/// Fill alpha for lazily assigned province colors.
pub const PROVINCE_FILL_ALPHA: f64 = 0.2;
/// Fill alpha for the hovered province.
pub const HOVER_FILL_ALPHA: f64 = 0.25;
/// Fallback for features without an administrative code.
pub const FALLBACK_FILL: Rgba = Rgba::new(200, 200, 200, 0.2);
/// Random channels stay below this bound so fills never wash out to white.
const CHANNEL_LIMIT: f64 = 200.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: f64) -> Self {
        Self { r, g, b, a }
    }

    pub const fn transparent() -> Self {
        Self::new(0, 0, 0, 0.0)
    }

    pub const fn with_alpha(self, a: f64) -> Self {
        Self::new(self.r, self.g, self.b, a)
    }

    /// Color from three uniform samples in `[0, 1)`.
    pub fn random(mut sample: impl FnMut() -> f64, alpha: f64) -> Self {
        let mut channel = || (sample().clamp(0.0, 0.999_999) * CHANNEL_LIMIT).floor() as u8;
        let r = channel();
        let g = channel();
        let b = channel();
        Self::new(r, g, b, alpha)
    }

    pub fn css(&self) -> String {
        rgba_css(self.r, self.g, self.b, self.a)
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgba({},{},{},{})", self.r, self.g, self.b, self.a)
    }
}

/// Format RGBA as a CSS color string.
fn rgba_css(r: u8, g: u8, b: u8, a: f64) -> String {
    format!("rgba({r},{g},{b},{a})")
}

/// Province code -> fill color, assigned on first use and then kept for the
/// lifetime of the map view.
#[derive(Debug, Clone, Default)]
pub struct ProvinceColors {
    assigned: HashMap<String, Rgba>,
}

impl ProvinceColors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Existing color for `code`, or a freshly drawn one that is remembered.
    pub fn color_for(&mut self, code: &str, sample: impl FnMut() -> f64) -> Rgba {
        *self
            .assigned
            .entry(code.to_string())
            .or_insert_with(|| Rgba::random(sample, PROVINCE_FILL_ALPHA))
    }

    pub fn get(&self, code: &str) -> Option<Rgba> {
        self.assigned.get(code).copied()
    }

    pub fn len(&self) -> usize {
        self.assigned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assigned.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{PROVINCE_FILL_ALPHA, ProvinceColors, Rgba};

    fn sequence(values: &'static [f64]) -> impl FnMut() -> f64 {
        let mut i = 0;
        move || {
            let v = values[i % values.len()];
            i += 1;
            v
        }
    }

    #[test]
    fn random_channels_stay_below_limit() {
        let c = Rgba::random(sequence(&[0.0, 0.5, 1.0]), 0.2);
        assert_eq!((c.r, c.g, c.b), (0, 100, 199));
        assert_eq!(c.a, 0.2);
    }

    #[test]
    fn css_matches_rgba_syntax() {
        assert_eq!(Rgba::new(1, 2, 3, 0.25).css(), "rgba(1,2,3,0.25)");
        assert_eq!(Rgba::new(1, 2, 3, 0.25).to_string(), "rgba(1,2,3,0.25)");
    }

    #[test]
    fn province_color_is_stable_once_assigned() {
        let mut colors = ProvinceColors::new();
        let first = colors.color_for("01", sequence(&[0.1, 0.2, 0.3]));
        let again = colors.color_for("01", sequence(&[0.9, 0.9, 0.9]));
        assert_eq!(first, again);
        assert_eq!(first.a, PROVINCE_FILL_ALPHA);
        assert_eq!(colors.len(), 1);
    }

    #[test]
    fn distinct_codes_draw_their_own_colors() {
        let mut colors = ProvinceColors::new();
        let a = colors.color_for("01", sequence(&[0.1, 0.2, 0.3]));
        let b = colors.color_for("79", sequence(&[0.7, 0.8, 0.9]));
        assert_ne!(a, b);
        assert_eq!(colors.get("79"), Some(b));
        assert_eq!(colors.get("48"), None);
    }

    #[test]
    fn with_alpha_keeps_channels() {
        let c = Rgba::new(10, 20, 30, 0.2).with_alpha(0.25);
        assert_eq!(c, Rgba::new(10, 20, 30, 0.25));
    }
}
