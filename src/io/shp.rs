use std::path::Path;

use anyhow::{bail, Context, Result};
use geo::{Coord, LineString, MultiPolygon, Polygon};
use log::debug;
use shapefile::dbase::{self, FieldValue};
use shapefile::{PolygonRing, Shape};

use crate::layer::{AttrValue, Field, FieldType, Fields, Layer};
use super::crs::epsg_from_wkt;

/// Read a polygon layer (shapes, dBase attributes, `.prj` CRS) from a `.shp` path.
pub(crate) fn read_shapefile(path: &Path, name: &str) -> Result<Layer> {
    let fields = read_dbf_fields(&path.with_extension("dbf"))?;
    let epsg = std::fs::read_to_string(path.with_extension("prj")).ok()
        .as_deref()
        .and_then(epsg_from_wkt);

    let mut reader = shapefile::Reader::from_path(path)
        .with_context(|| format!("Failed to open shapefile: {}", path.display()))?;

    let mut layer = Layer::new(name, fields).with_epsg(epsg);
    for (i, result) in reader.iter_shapes_and_records().enumerate() {
        let (shape, record) = result
            .with_context(|| format!("Error reading shape+record #{i} in {}", path.display()))?;

        let geometry = shape_to_multipolygon(shape)
            .with_context(|| format!("Invalid shape #{i} in {}", path.display()))?;

        let attributes: Vec<AttrValue> = layer.fields().names()
            .map(|field| record.get(field).map_or(AttrValue::Null, field_value_to_attr))
            .collect();

        layer.push(geometry, attributes)?;
    }
    Ok(layer)
}

/// Field list from the dBase header, in column order.
fn read_dbf_fields(path: &Path) -> Result<Fields> {
    let reader = dbase::Reader::from_path(path)
        .with_context(|| format!("Failed to open dBase table: {}", path.display()))?;

    Ok(reader.fields().iter()
        .filter(|info| info.name() != "DeletionFlag")
        .map(|info| Field::new(info.name().trim(), field_type(info.field_type())))
        .collect())
}

fn field_type(ty: dbase::FieldType) -> FieldType {
    match ty {
        dbase::FieldType::Numeric
        | dbase::FieldType::Float
        | dbase::FieldType::Double
        | dbase::FieldType::Currency => FieldType::Double,
        dbase::FieldType::Integer => FieldType::Integer,
        dbase::FieldType::Logical => FieldType::Boolean,
        dbase::FieldType::Date => FieldType::Date,
        _ => FieldType::Text,
    }
}

/// dBase cell to attribute. `N`/`F` cells are stored as text and keep their
/// possibly-failed conversion as a boxed numeric.
fn field_value_to_attr(value: &FieldValue) -> AttrValue {
    match value {
        FieldValue::Character(Some(s)) => AttrValue::Text(s.trim().to_string()),
        FieldValue::Memo(s) => AttrValue::Text(s.clone()),
        FieldValue::Numeric(n) => AttrValue::Decimal(*n),
        FieldValue::Float(f) => AttrValue::Decimal(f.map(f64::from)),
        FieldValue::Integer(i) => AttrValue::Int(i64::from(*i)),
        FieldValue::Double(d) | FieldValue::Currency(d) => AttrValue::Float(*d),
        FieldValue::Logical(Some(b)) => AttrValue::Bool(*b),
        FieldValue::Date(Some(d)) => AttrValue::Date(format!("{:04}-{:02}-{:02}", d.year(), d.month(), d.day())),
        _ => AttrValue::Null,
    }
}

/// Convert a shape to a MultiPolygon; `NullShape` has no geometry.
/// Z and M values are dropped.
fn shape_to_multipolygon(shape: Shape) -> Result<Option<MultiPolygon<f64>>> {
    match shape {
        Shape::NullShape => Ok(None),
        Shape::Polygon(p) => Ok(Some(rings_to_geo(p.rings(), |pt| Coord { x: pt.x, y: pt.y }))),
        Shape::PolygonM(p) => Ok(Some(rings_to_geo(p.rings(), |pt| Coord { x: pt.x, y: pt.y }))),
        Shape::PolygonZ(p) => Ok(Some(rings_to_geo(p.rings(), |pt| Coord { x: pt.x, y: pt.y }))),
        other => bail!("found non-Polygon shape in layer: {:?}", other.shapetype()),
    }
}

/// Group shapefile rings into polygons: each outer ring takes the inner
/// rings that follow it.
fn rings_to_geo<P>(rings: &[PolygonRing<P>], xy: impl Fn(&P) -> Coord<f64>) -> MultiPolygon<f64> {
    /// Ensure first and last are the same for geo::LineString coords
    fn ensure_closed(coords: &mut Vec<Coord<f64>>) {
        if let (Some(&first), Some(&last)) = (coords.first(), coords.last()) {
            if first != last { coords.push(first) }
        }
    }

    let mut polys: Vec<Polygon<f64>> = Vec::new();
    let mut exterior: Option<LineString<f64>> = None;
    let mut holes: Vec<LineString<f64>> = Vec::new();

    for ring in rings {
        let mut coords = ring.points().iter().map(&xy).collect::<Vec<_>>();
        ensure_closed(&mut coords);
        let ls = LineString(coords);

        match ring {
            PolygonRing::Outer(_) => {
                // flush previous polygon
                if let Some(ext) = exterior.replace(ls) {
                    polys.push(Polygon::new(ext, std::mem::take(&mut holes)));
                }
            }
            PolygonRing::Inner(_) if exterior.is_some() => holes.push(ls),
            PolygonRing::Inner(_) => debug!("inner ring without an outer ring ignored"),
        }
    }
    if let Some(ext) = exterior {
        polys.push(Polygon::new(ext, holes));
    }

    MultiPolygon(polys)
}
