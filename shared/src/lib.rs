pub mod animation;
pub mod api;
pub mod collate;
pub mod colors;
pub mod commune;
pub mod config;
pub mod extent;
pub mod feature;
pub mod format;
pub mod interaction;
pub mod layers;
pub mod locate;
pub mod projection;
pub mod search;
pub mod selection;
pub mod spatial;
pub mod style;
pub mod tiles;
pub mod viewport;

pub use colors::{ProvinceColors, Rgba};
pub use extent::Extent;
pub use feature::{AdminFeature, FeatureError, FeatureKind, FeatureSet, SharedFeatures};
pub use layers::{Layer, LayerContent, LayerStack, Marker};
pub use selection::SelectionState;
pub use tiles::{TileCoord, TileSource};
pub use viewport::Viewport;
