//! Suggestion filtering for the province/commune search box.

use crate::config::MAX_SEARCH_RESULTS;

/// Case-insensitive substring match.
pub fn matches(name: &str, query: &str) -> bool {
    name.to_lowercase().contains(&query.to_lowercase())
}

/// At most `max` names containing `query`, in source order. An empty query yields nothing.
pub fn filter_names<'a>(names: &'a [String], query: &str, max: usize) -> Vec<&'a str> {
    if query.is_empty() {
        return Vec::new();
    }
    let needle = query.to_lowercase();
    names
        .iter()
        .filter(|n| n.to_lowercase().contains(&needle))
        .take(max)
        .map(String::as_str)
        .collect()
}

/// Filtered suggestions for both categories.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchSuggestions {
    pub provinces: Vec<String>,
    pub communes: Vec<String>,
}

impl SearchSuggestions {
    pub fn build(provinces: &[String], communes: &[String], query: &str) -> Self {
        fn owned(v: Vec<&str>) -> Vec<String> {
            v.into_iter().map(str::to_string).collect()
        }
        Self {
            provinces: owned(filter_names(provinces, query, MAX_SEARCH_RESULTS)),
            communes: owned(filter_names(communes, query, MAX_SEARCH_RESULTS)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.provinces.is_empty() && self.communes.is_empty()
    }
}

/// What a chosen suggestion refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchTarget {
    Province(String),
    Commune { name: String, province: String },
}

impl SearchTarget {
    /// Parse a commune label of the form `"<commune>, <province>"`.
    /// Only the last comma separates the province, since commune names may contain commas.
    pub fn commune_from_label(label: &str) -> Option<Self> {
        let (name, province) = label.rsplit_once(',')?;
        let (name, province) = (name.trim(), province.trim());
        if name.is_empty() || province.is_empty() {
            return None;
        }
        Some(SearchTarget::Commune {
            name: name.to_string(),
            province: province.to_string(),
        })
    }

    /// Province to select once the geometry has been shown.
    pub fn province(&self) -> &str {
        match self {
            SearchTarget::Province(name) => name,
            SearchTarget::Commune { province, .. } => province,
        }
    }

    pub fn label(&self) -> String {
        match self {
            SearchTarget::Province(name) => name.clone(),
            SearchTarget::Commune { name, province } => format!("{name}, {province}"),
        }
    }
}
