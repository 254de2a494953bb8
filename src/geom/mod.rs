mod index;

pub use index::SpatialIndex;
