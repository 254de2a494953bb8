use crate::error::ProrataError;
use crate::layer::{AttrValue, Feature, Field, FieldType, Fields};
use super::{ProrataResult, FIELD_LENGTH, PRECISION, SUFFIX};

/// An output record: the target feature with its prorated columns filled in.
pub type OutputFeature = Feature;

/// Name of the output column holding the sum of `field`.
#[inline]
pub fn output_field_name(field: &str) -> String { format!("{field}{SUFFIX}") }

/// Round `value` to `digits` decimal places (half away from zero).
pub fn round_to(value: f64, digits: u8) -> f64 {
    let scale = 10f64.powi(i32::from(digits));
    let rounded = (value * scale).round() / scale;
    if rounded.is_finite() { rounded } else { value }
}

/// Extend `target_fields` with one `<field>_prorata` double column per field.
/// A column that already exists is kept as is, so preparing twice with the
/// same fields never duplicates a column.
pub fn prepare_output_fields<S: AsRef<str>>(target_fields: &Fields, fields: &[S]) -> Fields {
    let mut output = target_fields.clone();
    for name in fields.iter().map(AsRef::as_ref) {
        let field = Field::new(output_field_name(name), FieldType::Double)
            .with_format(FIELD_LENGTH, PRECISION);
        output.append(field);
    }
    output
}

/// Build the output record for `target`: geometry copied, attributes padded
/// with nulls up to the output schema, then every `<field>_prorata` slot set
/// to the rounded sum.
pub fn build_feature(
    target: &Feature,
    output_fields: &Fields,
    result: &ProrataResult,
) -> Result<OutputFeature, ProrataError> {
    let mut attributes = target.attributes.clone();
    attributes.resize(output_fields.len().max(attributes.len()), AttrValue::Null);

    for (field, value) in result.iter() {
        let name = output_field_name(field);
        let idx = output_fields.index_of(&name)
            .ok_or(ProrataError::MissingOutputSlot(name))?;
        attributes[idx] = AttrValue::Float(round_to(value, PRECISION));
    }

    Ok(Feature::new(target.id, target.geometry.clone(), attributes))
}
