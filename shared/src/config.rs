/// Backend base URL. Override at build time with `DIAPHAN_API_BASE`.
pub const API_BASE: &str = match option_env!("DIAPHAN_API_BASE") {
    Some(base) => base,
    None => "http://127.0.0.1:5000",
};

pub const PROVINCE_GEOJSON_URL: &str = "/data/DiaPhan_Tinh_2025.json";
pub const COMMUNE_GEOJSON_URL: &str = "/data/DiaPhan_Xa_2025.json";

pub const TOPO_TILE_URL: &str =
    "https://services.arcgisonline.com/ArcGIS/rest/services/World_Topo_Map/MapServer/tile/{z}/{y}/{x}";
pub const SATELLITE_TILE_URL: &str =
    "https://services.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{z}/{y}/{x}";
pub const ROAD_TILE_URL: &str = "https://services.arcgisonline.com/ArcGIS/rest/services/Reference/World_Transportation/MapServer/tile/{z}/{y}/{x}";

/// Initial view center in EPSG:3857 meters.
pub const INITIAL_CENTER: (f64, f64) = (11_710_584.69, 2_101_345.02);
pub const INITIAL_ZOOM: f64 = 6.0;
pub const MIN_ZOOM: f64 = 2.0;
pub const MAX_ZOOM: f64 = 19.0;

/// Province hover restyling is only active below this zoom.
pub const HOVER_MAX_ZOOM: f64 = 10.0;
/// Province click selection is only honored below this zoom.
pub const SELECT_MAX_ZOOM: f64 = 11.5;
/// Commune boundaries are attached at or above this zoom.
pub const COMMUNE_MIN_ZOOM: f64 = 10.0;

pub const MAX_SEARCH_RESULTS: usize = 10;

pub const FIT_PADDING_PX: f64 = 40.0;
pub const FIT_DURATION_MS: f64 = 800.0;
/// Fitting a single small commune never zooms in past this level.
pub const FIT_MAX_ZOOM: f64 = 16.0;

pub const LOCATE_ZOOM: f64 = 16.0;
pub const LOCATE_DURATION_MS: f64 = 1000.0;
pub const LOCATE_TIMEOUT_MS: u32 = 10_000;
pub const LOCATE_MAXIMUM_AGE_MS: u32 = 0;

pub const TILE_CACHE_MAX_ENTRIES: usize = 512;
pub const TILE_LOAD_CONCURRENCY: usize = 6;

/// Token that marks an urban ward; wards sort ahead of rural communes.
pub const WARD_MARKER: &str = "Phường";

pub const CURRENT_LOCATION_LAYER: &str = "current-location";
pub const CLICK_MARKER_LAYER: &str = "click-position";
pub const SEARCH_HIGHLIGHT_LAYER: &str = "search-highlight";
pub const PROVINCE_LAYER: &str = "province-boundaries";
pub const COMMUNE_LAYER: &str = "commune-boundaries";
pub const BASEMAP_LAYER: &str = "basemap";
pub const ROAD_LAYER: &str = "road-reference";
