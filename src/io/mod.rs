//! Reading and writing polygon layers, organised by file format.
//!
//! - `geojson` - GeoJSON `FeatureCollection` files (read, streaming write)
//! - `shp` - ESRI Shapefiles with their dBase table and `.prj` (read)
//! - `crs` - EPSG code detection in CRS names and WKT

mod crs;
mod geojson;
mod shp;

use std::path::Path;

use anyhow::{bail, Result};

use crate::layer::Layer;

pub use geojson::GeoJsonSink;

impl Layer {
    /// Load a polygon layer, choosing the format from the file extension
    /// (`.geojson`/`.json` or `.shp`). The layer is named after the file stem.
    pub fn read(path: &Path) -> Result<Self> {
        let name = path.file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();

        let extension = path.extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "geojson" | "json" => geojson::read_geojson(path, &name),
            "shp" => shp::read_shapefile(path, &name),
            _ => bail!("Unsupported layer format (expected .geojson, .json or .shp): {}", path.display()),
        }
    }

    /// Write the layer as a GeoJSON `FeatureCollection`.
    pub fn write_geojson(&self, path: &Path) -> Result<()> {
        geojson::write_geojson(self, path)
    }
}
