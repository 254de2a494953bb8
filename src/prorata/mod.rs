//! Area-weighted redistribution of source attributes onto target polygons.
//!
//! For every target polygon, each overlapping source polygon contributes
//! `value * intersection_area / source_area` to the target's sum. Sources are
//! weighted independently: when source polygons overlap each other their
//! shares are added twice, and the weights of one target are not normalised.

mod aggregate;
mod builder;
mod driver;
mod feedback;
mod sink;

use log::info;

use crate::error::ProrataError;
use crate::geom::SpatialIndex;
use crate::layer::{Feature, Fields, Layer};

pub use aggregate::{compute_prorata, ProrataResult};
pub use builder::{build_feature, output_field_name, prepare_output_fields, round_to, OutputFeature};
pub use driver::{RunState, RunSummary};
pub use feedback::{try_is_canceled, try_notify, try_set_progress, Feedback, LogFeedback};
pub use sink::FeatureSink;

/// Suffix of the generated output fields.
pub const SUFFIX: &str = "_prorata";

/// Decimal digits kept in the output values.
pub const PRECISION: u8 = 5;

/// Display length of the generated output fields.
pub const FIELD_LENGTH: u8 = 10;

/// Source fields to redistribute, resolved against the source schema.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    names: Vec<String>,
    slots: Vec<usize>, // position of each name in the source fields
}

impl FieldSpec {
    /// Check that `names` is a non-empty list of distinct numeric fields of
    /// `source`.
    pub fn resolve<S: AsRef<str>>(source: &Layer, names: &[S]) -> Result<Self, ProrataError> {
        if names.is_empty() { return Err(ProrataError::NoFields) }

        let mut spec = Self { names: Vec::with_capacity(names.len()), slots: Vec::with_capacity(names.len()) };
        for name in names.iter().map(AsRef::as_ref) {
            if spec.names.iter().any(|n| n == name) {
                return Err(ProrataError::DuplicateField(name.to_string()))
            }

            let (slot, ty) = source.fields().index_of(name)
                .and_then(|slot| source.fields().get(slot).map(|field| (slot, field.ty)))
                .ok_or_else(|| ProrataError::UnknownField { field: name.to_string(), layer: source.name().to_string() })?;

            if !ty.is_numeric() {
                return Err(ProrataError::NonNumericField {
                    field: name.to_string(),
                    layer: source.name().to_string(),
                    ty: ty.to_string(),
                })
            }

            spec.names.push(name.to_string());
            spec.slots.push(slot);
        }
        Ok(spec)
    }

    #[inline] pub fn len(&self) -> usize { self.names.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.names.is_empty() }

    /// Requested names, in request order.
    #[inline] pub fn names(&self) -> &[String] { &self.names }

    /// (name, source field position) pairs, in request order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.names.iter().map(String::as_str).zip(self.slots.iter().copied())
    }
}

/// A configured prorata run: validated inputs, source index and output schema.
#[derive(Debug)]
pub struct Prorata<'a> {
    target: &'a Layer,
    source: &'a Layer,
    fields: FieldSpec,
    index: SpatialIndex,
    output_fields: Fields,
}

impl<'a> Prorata<'a> {
    /// Validate the configuration, index the source layer and prepare the
    /// output schema.
    pub fn new<S: AsRef<str>>(target: &'a Layer, source: &'a Layer, fields: &[S]) -> Result<Self, ProrataError> {
        if target.is_empty() {
            return Err(ProrataError::EmptyLayer { role: "target", layer: target.name().to_string() })
        }
        if source.is_empty() {
            return Err(ProrataError::EmptyLayer { role: "source", layer: source.name().to_string() })
        }

        let fields = FieldSpec::resolve(source, fields)?;
        info!("fields to prorate: {}", fields.names().join(", "));

        info!("building spatial index over {} source features", source.len());
        let index = SpatialIndex::build(source.features());

        let output_fields = prepare_output_fields(target.fields(), fields.names());

        Ok(Self { target, source, fields, index, output_fields })
    }

    #[inline] pub fn target(&self) -> &Layer { self.target }

    #[inline] pub fn source(&self) -> &Layer { self.source }

    #[inline] pub fn fields(&self) -> &FieldSpec { &self.fields }

    #[inline] pub fn index(&self) -> &SpatialIndex { &self.index }

    /// Target fields extended with one `<field>_prorata` column per request.
    #[inline] pub fn output_fields(&self) -> &Fields { &self.output_fields }

    /// Prorated sums for one target feature, `None` if it has no geometry.
    pub fn compute(&self, target: &Feature) -> Option<ProrataResult> {
        compute_prorata(target, self.source, &self.index, &self.fields)
    }
}
