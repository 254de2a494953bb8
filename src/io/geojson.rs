use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, ensure, Context, Result};
use geo::{Coord, LineString, MultiPolygon, Polygon};
use serde_json::{json, Map, Value};

use crate::layer::{AttrValue, Feature, Field, FieldType, Fields, Layer};
use crate::prorata::{FeatureSink, OutputFeature};
use super::crs::{epsg_from_name, epsg_urn};

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

/// Read a polygon layer from a GeoJSON `FeatureCollection` file.
pub(crate) fn read_geojson(path: &Path, name: &str) -> Result<Layer> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read GeoJSON file: {}", path.display()))?;
    let value: Value = serde_json::from_slice(&bytes)
        .with_context(|| format!("Failed to parse GeoJSON file: {}", path.display()))?;
    layer_from_geojson(name, &value)
        .with_context(|| format!("Invalid GeoJSON layer: {}", path.display()))
}

/// Build a layer from a parsed GeoJSON `FeatureCollection`.
pub(crate) fn layer_from_geojson(name: &str, value: &Value) -> Result<Layer> {
    ensure!(
        value["type"].as_str() == Some("FeatureCollection"),
        "expected a FeatureCollection, found {}", value["type"]
    );
    let features = value["features"].as_array()
        .ok_or_else(|| anyhow!("FeatureCollection has no features array"))?;

    let fields = infer_fields(features);
    let epsg = value["crs"]["properties"]["name"].as_str().and_then(epsg_from_name);
    let mut layer = Layer::new(name, fields.clone()).with_epsg(epsg);

    for (i, feature) in features.iter().enumerate() {
        let geometry = parse_geometry(&feature["geometry"])
            .with_context(|| format!("feature #{i}: invalid geometry"))?;

        let properties = feature["properties"].as_object();
        let attributes = fields.names()
            .map(|field| properties.and_then(|p| p.get(field)).map_or(AttrValue::Null, json_to_attr))
            .collect();

        layer.push(geometry, attributes)?;
    }
    Ok(layer)
}

/// Infer the schema from property values, in first-seen order.
/// Integers widen to doubles; any other mix, or only nulls, gives text.
fn infer_fields(features: &[Value]) -> Fields {
    let mut names: Vec<String> = Vec::new();
    let mut types: Vec<Option<FieldType>> = Vec::new();

    for properties in features.iter().filter_map(|f| f["properties"].as_object()) {
        for (key, value) in properties {
            let idx = match names.iter().position(|n| n == key) {
                Some(idx) => idx,
                None => {
                    names.push(key.clone());
                    types.push(None);
                    names.len() - 1
                }
            };

            let ty = match value {
                Value::Null => continue,
                Value::Bool(_) => FieldType::Boolean,
                Value::Number(n) if n.is_i64() || n.is_u64() => FieldType::Integer,
                Value::Number(_) => FieldType::Double,
                _ => FieldType::Text,
            };

            types[idx] = Some(match (types[idx], ty) {
                (None, ty) => ty,
                (Some(a), b) if a == b => a,
                (Some(FieldType::Integer), FieldType::Double) | (Some(FieldType::Double), FieldType::Integer) => FieldType::Double,
                _ => FieldType::Text,
            });
        }
    }

    names.into_iter().zip(types)
        .map(|(name, ty)| Field::new(name, ty.unwrap_or(FieldType::Text)))
        .collect()
}

fn json_to_attr(value: &Value) -> AttrValue {
    match value {
        Value::Null => AttrValue::Null,
        Value::Bool(b) => AttrValue::Bool(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => AttrValue::Int(i),
            None => n.as_f64().map_or(AttrValue::Null, AttrValue::Float),
        },
        Value::String(s) => AttrValue::Text(s.clone()),
        other => AttrValue::Text(other.to_string()),
    }
}

/// Parse a `Polygon`, `MultiPolygon` or `null` geometry.
fn parse_geometry(value: &Value) -> Result<Option<MultiPolygon<f64>>> {
    if value.is_null() { return Ok(None) }

    let coords = value["coordinates"].as_array()
        .ok_or_else(|| anyhow!("geometry has no coordinates array"))?;

    match value["type"].as_str() {
        Some("Polygon") => Ok(Some(MultiPolygon::new(vec![parse_polygon_coords(coords)?]))),
        Some("MultiPolygon") => Ok(Some(MultiPolygon::new(
            coords.iter()
                .map(|polygon| polygon.as_array()
                    .ok_or_else(|| anyhow!("Invalid MultiPolygon: polygon is not an array"))
                    .and_then(|rings| parse_polygon_coords(rings)))
                .collect::<Result<Vec<_>>>()?
        ))),
        Some(other) => bail!("expected a polygon layer, found {other} geometry"),
        None => bail!("geometry has no type"),
    }
}

/// Parse polygon rings: `[exterior, hole, hole, ...]`.
fn parse_polygon_coords(rings: &[Value]) -> Result<Polygon<f64>> {
    let mut rings = rings.iter().map(|ring| ring.as_array()
        .ok_or_else(|| anyhow!("Invalid Polygon: ring is not an array"))
        .and_then(|points| parse_ring_coords(points)));

    let exterior = match rings.next() {
        Some(ring) => ring?,
        None => return Ok(Polygon::new(LineString::new(vec![]), vec![])),
    };
    let interiors = rings.collect::<Result<Vec<_>>>()?;
    Ok(Polygon::new(exterior, interiors))
}

/// Parse a ring from `[[x, y], [x, y], ...]`, closing it if needed.
fn parse_ring_coords(coords: &[Value]) -> Result<LineString<f64>> {
    let mut points = Vec::with_capacity(coords.len() + 1);

    for pair in coords {
        let (x, y) = match pair.as_array().map(Vec::as_slice) {
            Some([x, y, ..]) => (x.as_f64(), y.as_f64()),
            _ => bail!("Invalid coordinate: expected [x, y], found {pair}"),
        };
        let (Some(x), Some(y)) = (x, y) else {
            bail!("Invalid coordinate: x and y must be numbers, found {pair}")
        };
        points.push(Coord { x, y });
    }

    if let (Some(&first), Some(&last)) = (points.first(), points.last()) {
        if first != last { points.push(first) }
    }
    Ok(LineString(points))
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

fn ring_coords(ring: &LineString<f64>) -> Vec<[f64; 2]> {
    ring.coords().map(|c| [c.x, c.y]).collect()
}

fn polygon_coords(polygon: &Polygon<f64>) -> Vec<Vec<[f64; 2]>> {
    std::iter::once(polygon.exterior())
        .chain(polygon.interiors())
        .map(ring_coords)
        .collect()
}

/// GeoJSON geometry: a single part is written as a `Polygon`.
fn geometry_to_json(geom: Option<&MultiPolygon<f64>>) -> Value {
    match geom {
        None => Value::Null,
        Some(mp) if mp.0.len() == 1 => json!({
            "type": "Polygon",
            "coordinates": polygon_coords(&mp.0[0]),
        }),
        Some(mp) => json!({
            "type": "MultiPolygon",
            "coordinates": mp.0.iter().map(polygon_coords).collect::<Vec<_>>(),
        }),
    }
}

fn attr_to_json(value: &AttrValue) -> Value {
    match value {
        AttrValue::Null | AttrValue::Decimal(None) => Value::Null,
        AttrValue::Int(i) => json!(i),
        AttrValue::Float(f) | AttrValue::Decimal(Some(f)) => {
            if f.is_finite() { json!(f) } else { Value::Null }
        }
        AttrValue::Text(s) | AttrValue::Date(s) => json!(s),
        AttrValue::Bool(b) => json!(b),
    }
}

fn feature_to_json(fields: &Fields, feature: &Feature) -> Value {
    let properties: Map<String, Value> = fields.names()
        .enumerate()
        .map(|(idx, name)| (name.to_string(), attr_to_json(feature.attribute(idx))))
        .collect();

    json!({
        "type": "Feature",
        "id": feature.id.0,
        "geometry": geometry_to_json(feature.geometry.as_ref()),
        "properties": properties,
    })
}

/// Streams features to a GeoJSON `FeatureCollection` file, one at a time.
///
/// The collection is only closed by [`GeoJsonSink::finish`].
pub struct GeoJsonSink {
    path: PathBuf,
    writer: BufWriter<File>,
    fields: Fields,
    count: usize,
}

impl GeoJsonSink {
    /// Create the output file and write the collection header.
    pub fn create(path: &Path, name: &str, fields: &Fields, epsg: Option<u32>) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create output file {}", path.display()))?;
        let mut writer = BufWriter::new(file);

        write!(writer, "{{\"type\":\"FeatureCollection\",\"name\":{}", json!(name))?;
        if let Some(epsg) = epsg {
            let crs = json!({ "type": "name", "properties": { "name": epsg_urn(epsg) } });
            write!(writer, ",\"crs\":{crs}")?;
        }
        write!(writer, ",\"features\":[")?;

        Ok(Self { path: path.to_path_buf(), writer, fields: fields.clone(), count: 0 })
    }

    /// Number of features written so far.
    #[inline] pub fn count(&self) -> usize { self.count }

    /// Close the collection and flush the file.
    pub fn finish(mut self) -> Result<PathBuf> {
        writeln!(self.writer, "]}}")?;
        self.writer.flush()
            .with_context(|| format!("Failed to flush output file {}", self.path.display()))?;
        Ok(self.path)
    }

    /// Drop an unfinished collection and remove its file.
    pub fn discard(self) -> Result<()> {
        let Self { path, writer, .. } = self;
        drop(writer);
        std::fs::remove_file(&path)
            .with_context(|| format!("Failed to remove partial output {}", path.display()))
    }
}

impl FeatureSink for GeoJsonSink {
    fn add_feature(&mut self, feature: OutputFeature) -> Result<()> {
        if self.count > 0 { self.writer.write_all(b",")?; }
        writeln!(self.writer)?;
        serde_json::to_writer(&mut self.writer, &feature_to_json(&self.fields, &feature))?;
        self.count += 1;
        Ok(())
    }
}

/// Write a whole layer to a GeoJSON file.
pub(crate) fn write_geojson(layer: &Layer, path: &Path) -> Result<()> {
    let mut sink = GeoJsonSink::create(path, layer.name(), layer.fields(), layer.epsg())?;
    for feature in layer.features() {
        sink.add_feature(feature.clone())?;
    }
    sink.finish()?;
    Ok(())
}
