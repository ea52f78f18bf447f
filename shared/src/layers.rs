//! Ordered, named map layers.
//!
//! Adding a layer under an existing name replaces it in place, so attaching the
//! same layer twice or re-placing a marker never accumulates entries.

use crate::feature::SharedFeatures;
use crate::style::{MarkerStyle, VectorStyle};
use crate::tiles::TileSource;

/// Draw-order bands. Layers render bottom to top by `z_index`, then insertion order.
pub mod z {
    pub const BASEMAP: i32 = 0;
    pub const ROADS: i32 = 1;
    pub const PROVINCES: i32 = 10;
    pub const COMMUNES: i32 = 11;
    pub const HIGHLIGHT: i32 = 20;
    pub const MARKERS: i32 = 30;
}

/// A single point in map coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Marker {
    pub x: f64,
    pub y: f64,
    pub style: MarkerStyle,
}

#[derive(Debug, Clone)]
pub enum LayerContent {
    Tiles(TileSource),
    Features {
        features: SharedFeatures,
        style: VectorStyle,
    },
    Marker(Marker),
}

#[derive(Debug, Clone)]
pub struct Layer {
    pub name: String,
    pub z_index: i32,
    pub content: LayerContent,
}

impl Layer {
    pub fn tiles(name: &str, z_index: i32, source: TileSource) -> Self {
        Self {
            name: name.to_string(),
            z_index,
            content: LayerContent::Tiles(source),
        }
    }

    pub fn features(
        name: &str,
        z_index: i32,
        features: SharedFeatures,
        style: VectorStyle,
    ) -> Self {
        Self {
            name: name.to_string(),
            z_index,
            content: LayerContent::Features { features, style },
        }
    }

    pub fn marker(name: &str, marker: Marker) -> Self {
        Self {
            name: name.to_string(),
            z_index: z::MARKERS,
            content: LayerContent::Marker(marker),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LayerStack {
    layers: Vec<Layer>,
}

impl LayerStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace by name. Returns `true` if an existing layer was replaced.
    pub fn put(&mut self, layer: Layer) -> bool {
        if let Some(existing) = self.layers.iter_mut().find(|l| l.name == layer.name) {
            let restack = existing.z_index != layer.z_index;
            *existing = layer;
            if restack {
                self.layers.sort_by_key(|l| l.z_index);
            }
            return true;
        }
        let pos = self
            .layers
            .iter()
            .position(|l| l.z_index > layer.z_index)
            .unwrap_or(self.layers.len());
        self.layers.insert(pos, layer);
        false
    }

    /// Remove by name. Returns `true` if a layer was removed.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.layers.len();
        self.layers.retain(|l| l.name != name);
        self.layers.len() != before
    }

    pub fn contains(&self, name: &str) -> bool {
        self.layers.iter().any(|l| l.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|l| l.name == name)
    }

    /// Update the vector style of a named layer in place. No-op for other layer kinds.
    pub fn restyle(&mut self, name: &str, f: impl FnOnce(&mut VectorStyle)) -> bool {
        match self.get_mut(name).map(|l| &mut l.content) {
            Some(LayerContent::Features { style, .. }) => {
                f(style);
                true
            }
            _ => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Layer> {
        self.layers.iter()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    #[cfg(test)]
    fn names(&self) -> Vec<&str> {
        self.layers.iter().map(|l| l.name.as_str()).collect()
    }

    /// Number of point markers across all layers.
    #[cfg(test)]
    fn marker_count(&self) -> usize {
        self.layers
            .iter()
            .filter(|l| matches!(l.content, LayerContent::Marker(_)))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{Layer, LayerContent, LayerStack, Marker, z};
    use crate::config::{BASEMAP_LAYER, COMMUNE_LAYER, CURRENT_LOCATION_LAYER, PROVINCE_LAYER};
    use crate::feature::FeatureSet;
    use crate::style::{CURRENT_LOCATION_MARKER, VectorStyle};
    use crate::tiles::TileSource;

    fn marker(x: f64, y: f64) -> Layer {
        Layer::marker(
            CURRENT_LOCATION_LAYER,
            Marker {
                x,
                y,
                style: CURRENT_LOCATION_MARKER,
            },
        )
    }

    fn communes() -> Layer {
        Layer::features(
            COMMUNE_LAYER,
            z::COMMUNES,
            Arc::new(FeatureSet::empty()),
            VectorStyle::Commune,
        )
    }

    #[test]
    fn two_successive_markers_leave_exactly_one() {
        let mut stack = LayerStack::new();
        assert!(!stack.put(marker(1.0, 2.0)));
        assert!(stack.put(marker(3.0, 4.0)));
        assert_eq!(stack.marker_count(), 1);
        match &stack.get(CURRENT_LOCATION_LAYER).unwrap().content {
            LayerContent::Marker(m) => assert_eq!((m.x, m.y), (3.0, 4.0)),
            other => panic!("unexpected content {other:?}"),
        }
    }

    #[test]
    fn layers_stay_ordered_by_band() {
        let mut stack = LayerStack::new();
        stack.put(marker(0.0, 0.0));
        stack.put(communes());
        stack.put(Layer::tiles(BASEMAP_LAYER, z::BASEMAP, TileSource::Topo));
        stack.put(Layer::features(
            PROVINCE_LAYER,
            z::PROVINCES,
            Arc::new(FeatureSet::empty()),
            VectorStyle::Province {
                fill_enabled: true,
                hovered: None,
            },
        ));
        assert_eq!(
            stack.names(),
            vec![BASEMAP_LAYER, PROVINCE_LAYER, COMMUNE_LAYER, CURRENT_LOCATION_LAYER]
        );
    }

    #[test]
    fn repeated_attach_and_detach_are_idempotent() {
        let mut stack = LayerStack::new();
        stack.put(communes());
        stack.put(communes());
        assert_eq!(stack.len(), 1);
        assert!(stack.remove(COMMUNE_LAYER));
        assert!(!stack.remove(COMMUNE_LAYER));
        assert!(stack.is_empty());
    }

    #[test]
    fn replacing_basemap_keeps_position() {
        let mut stack = LayerStack::new();
        stack.put(Layer::tiles(BASEMAP_LAYER, z::BASEMAP, TileSource::Topo));
        stack.put(communes());
        stack.put(Layer::tiles(BASEMAP_LAYER, z::BASEMAP, TileSource::Satellite));
        assert_eq!(stack.names(), vec![BASEMAP_LAYER, COMMUNE_LAYER]);
        assert!(matches!(
            stack.get(BASEMAP_LAYER).unwrap().content,
            LayerContent::Tiles(TileSource::Satellite)
        ));
    }

    #[test]
    fn restyle_only_touches_vector_layers() {
        let mut stack = LayerStack::new();
        stack.put(Layer::features(
            PROVINCE_LAYER,
            z::PROVINCES,
            Arc::new(FeatureSet::empty()),
            VectorStyle::Province {
                fill_enabled: true,
                hovered: None,
            },
        ));
        stack.put(marker(0.0, 0.0));
        assert!(stack.restyle(PROVINCE_LAYER, |s| {
            if let VectorStyle::Province { hovered, .. } = s {
                *hovered = Some("01".into());
            }
        }));
        assert!(!stack.restyle(CURRENT_LOCATION_LAYER, |_| {}));
        match &stack.get(PROVINCE_LAYER).unwrap().content {
            LayerContent::Features { style, .. } => assert_eq!(
                style,
                &VectorStyle::Province {
                    fill_enabled: true,
                    hovered: Some("01".into()),
                }
            ),
            other => panic!("unexpected content {other:?}"),
        }
    }
}
