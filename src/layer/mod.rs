mod feature;
mod schema;
mod value;

use anyhow::{ensure, Result};
use geo::MultiPolygon;

pub use feature::{Feature, FeatureId};
pub use schema::{Field, FieldType, Fields};
pub use value::AttrValue;

/// An in-memory polygon layer: schema, features in id order, and CRS.
#[derive(Debug, Clone)]
pub struct Layer {
    name: String,
    fields: Fields,
    features: Vec<Feature>,
    epsg: Option<u32>, // EPSG code, if known
}

impl Layer {
    pub fn new(name: impl Into<String>, fields: Fields) -> Self {
        Self { name: name.into(), fields, features: Vec::new(), epsg: None }
    }

    /// Set the EPSG code of the layer's coordinate reference system.
    pub fn with_epsg(mut self, epsg: Option<u32>) -> Self {
        self.epsg = epsg;
        self
    }

    #[inline] pub fn name(&self) -> &str { &self.name }

    #[inline] pub fn fields(&self) -> &Fields { &self.fields }

    #[inline] pub fn epsg(&self) -> Option<u32> { self.epsg }

    #[inline] pub fn len(&self) -> usize { self.features.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.features.is_empty() }

    /// Features in id order.
    #[inline] pub fn features(&self) -> &[Feature] { &self.features }

    #[inline] pub fn feature(&self, id: FeatureId) -> Option<&Feature> { self.features.get(id.idx()) }

    /// Append a feature, assigning it the next id.
    pub fn push(&mut self, geometry: Option<MultiPolygon<f64>>, attributes: Vec<AttrValue>) -> Result<FeatureId> {
        ensure!(
            attributes.len() <= self.fields.len(),
            "feature has {} attributes but layer {:?} declares {} fields",
            attributes.len(), self.name, self.fields.len()
        );
        let id = FeatureId(u32::try_from(self.features.len())?);
        self.features.push(Feature::new(id, geometry, attributes));
        Ok(id)
    }

    /// Attribute named `name` on `feature`, `Null` if the field is unknown.
    pub fn attribute<'a>(&self, feature: &'a Feature, name: &str) -> &'a AttrValue {
        static NULL: AttrValue = AttrValue::Null;
        match self.fields.index_of(name) {
            Some(idx) => feature.attribute(idx),
            None => &NULL,
        }
    }
}
