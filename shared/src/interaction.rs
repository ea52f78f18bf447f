//! Zoom-conditioned interaction rules for the boundary layers.

use crate::config::{COMMUNE_MIN_ZOOM, HOVER_MAX_ZOOM, SELECT_MAX_ZOOM};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerChange {
    Attach,
    Detach,
}

/// Tracks whether a zoom-gated layer is attached and reports only transitions,
/// so repeated identical zoom updates produce no work.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerGate {
    min_zoom: f64,
    attached: bool,
}

impl LayerGate {
    pub const fn new(min_zoom: f64) -> Self {
        Self {
            min_zoom,
            attached: false,
        }
    }

    pub const fn communes() -> Self {
        Self::new(COMMUNE_MIN_ZOOM)
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn wants(&self, zoom: f64) -> bool {
        zoom >= self.min_zoom
    }

    pub fn update(&mut self, zoom: f64) -> Option<LayerChange> {
        let want = self.wants(zoom);
        if want == self.attached {
            return None;
        }
        self.attached = want;
        Some(if want {
            LayerChange::Attach
        } else {
            LayerChange::Detach
        })
    }

    /// Forget the attachment, e.g. after the host map was detached.
    pub fn reset(&mut self) {
        self.attached = false;
    }
}

/// Province hover restyling runs only while enabled and zoomed out.
pub fn hover_active(enabled: bool, zoom: f64) -> bool {
    enabled && zoom < HOVER_MAX_ZOOM
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    Select(String),
    Clear,
}

/// Province click: selects the hit province name when zoomed out, clears otherwise.
pub fn resolve_province_click(zoom: f64, hit_name: Option<&str>) -> ClickOutcome {
    match hit_name {
        Some(name) if zoom < SELECT_MAX_ZOOM => ClickOutcome::Select(name.to_string()),
        _ => ClickOutcome::Clear,
    }
}

/// Commune clicks (marker, popup, elevation) apply once communes are shown.
pub fn commune_click_active(zoom: f64) -> bool {
    zoom >= COMMUNE_MIN_ZOOM
}

#[cfg(test)]
mod tests {
    use super::{
        ClickOutcome, LayerChange, LayerGate, commune_click_active, hover_active,
        resolve_province_click,
    };

    #[test]
    fn commune_gate_attaches_at_threshold() {
        let mut gate = LayerGate::communes();
        assert_eq!(gate.update(9.99), None);
        assert_eq!(gate.update(10.0), Some(LayerChange::Attach));
        assert!(gate.is_attached());
        assert_eq!(gate.update(10.0), None);
        assert_eq!(gate.update(14.0), None);
        assert_eq!(gate.update(9.5), Some(LayerChange::Detach));
        assert_eq!(gate.update(9.5), None);
        assert!(!gate.is_attached());
    }

    #[test]
    fn attachment_matches_zoom_for_any_sequence() {
        let mut gate = LayerGate::communes();
        for zoom in [2.0, 11.0, 11.0, 6.0, 19.0, 10.0, 9.999, 9.999, 12.5] {
            gate.update(zoom);
            assert_eq!(gate.is_attached(), zoom >= 10.0, "zoom {zoom}");
        }
    }

    #[test]
    fn reset_allows_reattach() {
        let mut gate = LayerGate::communes();
        gate.update(12.0);
        gate.reset();
        assert_eq!(gate.update(12.0), Some(LayerChange::Attach));
    }

    #[test]
    fn gate_copies_compare_by_threshold_and_state() {
        let mut gate = LayerGate::communes();
        let before = gate;
        assert_eq!(before, LayerGate::new(10.0));
        gate.update(12.0);
        assert_ne!(gate, before);
        assert_ne!(LayerGate::new(9.0), LayerGate::communes());
    }

    #[test]
    fn hover_requires_toggle_and_low_zoom() {
        assert!(hover_active(true, 6.0));
        assert!(!hover_active(true, 10.0));
        assert!(!hover_active(false, 6.0));
    }

    #[test]
    fn province_click_selects_below_threshold() {
        assert_eq!(
            resolve_province_click(8.0, Some("Hà Nội")),
            ClickOutcome::Select("Hà Nội".into())
        );
        assert_eq!(resolve_province_click(11.5, Some("Hà Nội")), ClickOutcome::Clear);
        assert_eq!(resolve_province_click(8.0, None), ClickOutcome::Clear);
    }

    #[test]
    fn commune_clicks_follow_commune_visibility() {
        assert!(!commune_click_active(9.0));
        assert!(commune_click_active(10.0));
    }
}
