use std::fmt;

use geo::{HasDimensions, MultiPolygon};

use super::AttrValue;

/// Identifies a feature within one layer.
///
/// Ids are assigned contiguously from `0` in read order and stay stable for
/// the whole run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FeatureId(pub u32);

impl FeatureId {
    #[inline] pub fn idx(self) -> usize { self.0 as usize }
}

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FeatureId({})", self.0)
    }
}

/// A polygonal feature: optional geometry plus one attribute per layer field.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub id: FeatureId,
    pub geometry: Option<MultiPolygon<f64>>,
    pub attributes: Vec<AttrValue>,
}

impl Feature {
    pub fn new(id: FeatureId, geometry: Option<MultiPolygon<f64>>, attributes: Vec<AttrValue>) -> Self {
        Self { id, geometry, attributes }
    }

    /// The geometry, unless it is null or has no polygon parts.
    pub fn polygons(&self) -> Option<&MultiPolygon<f64>> {
        self.geometry.as_ref().filter(|geom| !geom.is_empty())
    }

    /// Attribute at position `idx`, `Null` when out of range.
    #[inline]
    pub fn attribute(&self, idx: usize) -> &AttrValue {
        static NULL: AttrValue = AttrValue::Null;
        self.attributes.get(idx).unwrap_or(&NULL)
    }
}
