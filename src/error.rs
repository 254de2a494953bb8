//! Typed errors for configuring and running a prorata computation.

use thiserror::Error;

/// Errors raised by [`crate::Prorata`].
///
/// Everything except [`ProrataError::MissingOutputSlot`] is a configuration
/// problem detected before any feature is processed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProrataError {
    /// The target or source layer holds no features.
    #[error("{role} layer {layer:?} contains no features")]
    EmptyLayer { role: &'static str, layer: String },

    /// No field was requested.
    #[error("at least one field to prorate is required")]
    NoFields,

    /// A field was requested twice.
    #[error("field {0:?} is requested more than once")]
    DuplicateField(String),

    /// A requested field does not exist in the source layer.
    #[error("field {field:?} does not exist in source layer {layer:?}")]
    UnknownField { field: String, layer: String },

    /// A requested field exists but is not numeric.
    #[error("field {field:?} of source layer {layer:?} is not numeric (found {ty})")]
    NonNumericField { field: String, layer: String, ty: String },

    /// An output slot for a computed value is missing from the output schema.
    /// Indicates the schema was built from different fields than the result.
    #[error("output schema has no field {0:?}")]
    MissingOutputSlot(String),
}
