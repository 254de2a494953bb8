#![doc = "Area-weighted redistribution (prorata) of numeric attributes between polygon layers"]
mod error;
mod geom;
mod io;
mod layer;
mod prorata;

#[doc(inline)]
pub use error::ProrataError;

#[doc(inline)]
pub use geom::SpatialIndex;

#[doc(inline)]
pub use io::GeoJsonSink;

#[doc(inline)]
pub use layer::{AttrValue, Feature, FeatureId, Field, FieldType, Fields, Layer};

#[doc(inline)]
pub use prorata::{
    build_feature, compute_prorata, output_field_name, prepare_output_fields, round_to,
    try_is_canceled, try_notify, try_set_progress,
    FeatureSink, Feedback, FieldSpec, LogFeedback, OutputFeature, Prorata, ProrataResult,
    RunState, RunSummary, FIELD_LENGTH, PRECISION, SUFFIX,
};
