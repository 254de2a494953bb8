use geo::{Area, BooleanOps, HasDimensions, Intersects, MultiPolygon};
use log::debug;

use crate::geom::SpatialIndex;
use crate::layer::{Feature, FeatureId, Layer};
use super::FieldSpec;

/// Per-field sums for one target feature, in request order.
#[derive(Debug, Clone, PartialEq)]
pub struct ProrataResult {
    values: Vec<(String, f64)>,
}

impl ProrataResult {
    /// Every requested field at 0.0.
    pub fn zeros(fields: &FieldSpec) -> Self {
        Self { values: fields.names().iter().map(|name| (name.clone(), 0.0)).collect() }
    }

    /// Sum for `field`, if it was requested.
    pub fn get(&self, field: &str) -> Option<f64> {
        self.values.iter().find(|(name, _)| name == field).map(|&(_, v)| v)
    }

    /// (field, sum) pairs in request order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(name, v)| (name.as_str(), *v))
    }

    #[inline] pub fn len(&self) -> usize { self.values.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.values.is_empty() }
}

/// Source features among `ids` whose geometry really intersects `geom`.
fn intersecting_features<'a>(
    source: &'a Layer,
    ids: &'a [FeatureId],
    geom: &'a MultiPolygon<f64>,
) -> impl Iterator<Item = (&'a Feature, &'a MultiPolygon<f64>)> + 'a {
    ids.iter()
        .filter_map(|&id| source.feature(id))
        .filter_map(|feature| feature.polygons().map(|shape| (feature, shape)))
        .filter(move |(_, shape)| shape.intersects(geom))
}

/// Compute the prorated sums of `fields` for one target feature.
///
/// Every source polygon overlapping the target contributes
/// `value * intersection_area / source_area` per field. Returns `None` when
/// the target has no geometry (the feature is skipped); a target without any
/// overlap yields all zeros.
pub fn compute_prorata(
    target: &Feature,
    source: &Layer,
    index: &SpatialIndex,
    fields: &FieldSpec,
) -> Option<ProrataResult> {
    let geom = target.polygons()?;

    let mut result = ProrataResult::zeros(fields);

    // Bounding-box pruning first, exact test second.
    let ids = index.candidates(geom);
    if ids.is_empty() { return Some(result) }

    for (candidate, shape) in intersecting_features(source, &ids, geom) {
        let shared = shape.intersection(geom);
        if shared.is_empty() {
            debug!("{} of {:?}: empty intersection with target {}", candidate.id, source.name(), target.id);
            continue;
        }

        let source_area = shape.unsigned_area();
        if source_area <= 0.0 {
            debug!("{} of {:?}: degenerate source polygon", candidate.id, source.name());
            continue;
        }

        let shared_area = shared.unsigned_area();
        if shared_area <= 0.0 { continue }

        let ratio = shared_area / source_area;
        for ((_, sum), (_, slot)) in result.values.iter_mut().zip(fields.iter()) {
            *sum += candidate.attribute(slot).to_float() * ratio;
        }
    }

    Some(result)
}
