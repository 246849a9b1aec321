mod buffer;
mod geometry;
mod hit_test;
pub(crate) mod polygon;
mod projection;
mod renderer;
mod spatial;

pub use buffer::{BufferConfig, OffsetFeature, Slot, SlotLayer, WorldBuffer, WORLD_WIDTH};
pub use hit_test::{feature_at, hover_target, nearest_country, resolve_click, Hit};
pub use polygon::{
    bounding_box, haversine_km, point_in_geometry, point_in_ring, BoundingBox, Feature, Geometry, Polygon, Ring,
    EARTH_RADIUS_KM,
};
pub use projection::{Viewport, MAX_MERCATOR_LAT};
pub use renderer::{Fill, LayerState, MapLayers, MapRenderer, ValidationMarks};
pub use spatial::FeatureGrid;
