use crate::feature::SharedFeatures;

/// The selected province and an optional search highlight.
///
/// Clicks and searches write the same `province` field; the last write wins.
#[derive(Debug, Clone, Default)]
pub struct SelectionState {
    pub province: Option<String>,
    pub highlight: Option<SharedFeatures>,
}

impl SelectionState {
    /// Province picked from the map. Drops any search highlight.
    pub fn select_province(&mut self, name: impl Into<String>) {
        self.province = Some(name.into());
        self.highlight = None;
    }

    /// Result of a search: highlight the geometry and select its province.
    pub fn apply_search(&mut self, province: impl Into<String>, highlight: SharedFeatures) {
        self.province = Some(province.into());
        self.highlight = Some(highlight);
    }

    pub fn clear(&mut self) {
        self.province = None;
        self.highlight = None;
    }

    #[cfg(test)]
    fn is_empty(&self) -> bool {
        self.province.is_none() && self.highlight.is_none()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::SelectionState;
    use crate::feature::FeatureSet;

    #[test]
    fn click_clears_search_highlight() {
        let mut s = SelectionState::default();
        s.apply_search("Huế", Arc::new(FeatureSet::empty()));
        assert!(s.highlight.is_some());
        s.select_province("Hà Nội");
        assert_eq!(s.province.as_deref(), Some("Hà Nội"));
        assert!(s.highlight.is_none());
    }

    #[test]
    fn last_write_wins() {
        let mut s = SelectionState::default();
        s.select_province("Hà Nội");
        s.apply_search("Cần Thơ", Arc::new(FeatureSet::empty()));
        assert_eq!(s.province.as_deref(), Some("Cần Thơ"));
        s.select_province("Đà Nẵng");
        assert_eq!(s.province.as_deref(), Some("Đà Nẵng"));
    }

    #[test]
    fn clear_resets_everything() {
        let mut s = SelectionState::default();
        s.apply_search("Huế", Arc::new(FeatureSet::empty()));
        s.clear();
        assert!(s.is_empty());
    }
}
