// Integration tests for the prorata run:
//   no overlap, containment, partition conservation, geometry skips,
//   attribute coercion, schema extension, end-to-end scenarios, cancellation.

use std::cell::Cell;

use anyhow::{bail, Result};
use float_cmp::approx_eq;
use geo::{polygon, Area, MultiPolygon};
use prorata::{
    prepare_output_fields, AttrValue, Feedback, Field, FieldType, Layer, OutputFeature,
    Prorata, RunState,
};

fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> MultiPolygon<f64> {
    MultiPolygon::new(vec![polygon![(x: x0, y: y0), (x: x1, y: y0), (x: x1, y: y1), (x: x0, y: y1)]])
}

/// Target layer with a text `name` field.
fn targets(shapes: Vec<Option<MultiPolygon<f64>>>) -> Layer {
    let mut layer = Layer::new("targets", [Field::new("name", FieldType::Text)].into_iter().collect());
    for (i, shape) in shapes.into_iter().enumerate() {
        layer.push(shape, vec![AttrValue::Text(format!("t{i}"))]).unwrap();
    }
    layer
}

/// Source layer with one numeric field called `field`.
fn sources(field: &str, shapes: Vec<(MultiPolygon<f64>, AttrValue)>) -> Layer {
    let mut layer = Layer::new("sources", [Field::new(field, FieldType::Double)].into_iter().collect());
    for (shape, value) in shapes {
        layer.push(Some(shape), vec![value]).unwrap();
    }
    layer
}

fn value(feature: &OutputFeature, layer_fields: &prorata::Fields, name: &str) -> f64 {
    let idx = layer_fields.index_of(name).unwrap();
    match feature.attribute(idx) {
        AttrValue::Float(v) => *v,
        other => panic!("expected a float in {name}, found {other:?}"),
    }
}

#[test]
fn no_overlap_yields_zeros() {
    let target = targets(vec![Some(rect(0.0, 0.0, 1.0, 1.0))]);
    let source = sources("pop", vec![(rect(10.0, 10.0, 12.0, 12.0), AttrValue::Float(99.0))]);

    let prorata = Prorata::new(&target, &source, &["pop"]).unwrap();
    let result = prorata.compute(&target.features()[0]).unwrap();
    assert_eq!(result.get("pop"), Some(0.0));

    let mut out: Vec<OutputFeature> = Vec::new();
    let summary = prorata.run(&mut out, None).unwrap();
    assert_eq!(summary.written, 1);
    assert_eq!(value(&out[0], prorata.output_fields(), "pop_prorata"), 0.0);
}

#[test]
fn full_containment_scales_by_area_ratio() {
    let inner = rect(2.0, 3.0, 5.0, 7.0);
    let outer = rect(0.0, 0.0, 10.0, 10.0);
    let expected = 37.0 * inner.unsigned_area() / outer.unsigned_area();

    let target = targets(vec![Some(inner)]);
    let source = sources("v", vec![(outer, AttrValue::Float(37.0))]);

    let prorata = Prorata::new(&target, &source, &["v"]).unwrap();
    let got = prorata.compute(&target.features()[0]).unwrap().get("v").unwrap();
    assert!(approx_eq!(f64, got, expected, epsilon = 1e-9 * expected.abs()));
}

#[test]
fn partition_conserves_a_constant_value() {
    let target = targets(vec![Some(rect(0.0, 0.0, 3.0, 2.0))]);
    let cells = (0..3)
        .flat_map(|i| (0..2).map(move |j| (i as f64, j as f64)))
        .map(|(x, y)| (rect(x, y, x + 1.0, y + 1.0), AttrValue::Float(7.0)))
        .collect();
    let source = sources("v", cells);

    let prorata = Prorata::new(&target, &source, &["v"]).unwrap();
    let result = prorata.compute(&target.features()[0]).unwrap();
    // Each of the six cells lies fully inside: 6 * 7.
    assert!(approx_eq!(f64, result.get("v").unwrap(), 42.0, epsilon = 1e-9));

    // A target equal to one cell collects exactly that cell's value.
    let single = targets(vec![Some(rect(1.0, 1.0, 2.0, 2.0))]);
    let prorata = Prorata::new(&single, &source, &["v"]).unwrap();
    let result = prorata.compute(&single.features()[0]).unwrap();
    assert!(approx_eq!(f64, result.get("v").unwrap(), 7.0, epsilon = 1e-9));
}

#[test]
fn null_and_empty_targets_are_skipped() {
    let target = targets(vec![
        None,
        Some(rect(0.0, 0.0, 1.0, 1.0)),
        Some(MultiPolygon::new(vec![])),
    ]);
    let source = sources("pop", vec![(rect(0.0, 0.0, 2.0, 2.0), AttrValue::Float(4.0))]);

    let prorata = Prorata::new(&target, &source, &["pop"]).unwrap();
    assert!(prorata.compute(&target.features()[0]).is_none());
    assert!(prorata.compute(&target.features()[2]).is_none());

    let mut out: Vec<OutputFeature> = Vec::new();
    let summary = prorata.run(&mut out, None).unwrap();
    assert_eq!(summary.state, RunState::Completed);
    assert_eq!((summary.written, summary.skipped, summary.total), (1, 2, 3));
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].id, target.features()[1].id);
    assert_eq!(value(&out[0], prorata.output_fields(), "pop_prorata"), 1.0);
}

#[test]
fn attribute_coercion() {
    let values = [AttrValue::Null, AttrValue::from("3,5"), AttrValue::Float(3.5), AttrValue::from("abc")];
    let floats = values.iter().map(AttrValue::to_float).collect::<Vec<_>>();
    assert_eq!(floats, [0.0, 3.5, 3.5, 0.0]);
}

#[test]
fn output_fields_are_extended_once() {
    let target = targets(vec![Some(rect(0.0, 0.0, 1.0, 1.0))]);
    let once = prepare_output_fields(target.fields(), &["pop", "jobs"]);
    let twice = prepare_output_fields(&once, &["pop", "jobs"]);

    assert_eq!(twice.names().collect::<Vec<_>>(), ["name", "pop_prorata", "jobs_prorata"]);
    assert_eq!(once, twice);
}

#[test]
fn target_already_holding_prorata_column_is_overwritten() {
    let mut target = Layer::new("targets", [
        Field::new("name", FieldType::Text),
        Field::new("pop_prorata", FieldType::Double),
    ].into_iter().collect());
    target.push(Some(rect(0.0, 0.0, 1.0, 1.0)), vec!["a".into(), AttrValue::Float(-1.0)]).unwrap();
    let source = sources("pop", vec![(rect(0.0, 0.0, 1.0, 2.0), AttrValue::Float(10.0))]);

    let prorata = Prorata::new(&target, &source, &["pop"]).unwrap();
    assert_eq!(prorata.output_fields().len(), 2);

    let mut out: Vec<OutputFeature> = Vec::new();
    prorata.run(&mut out, None).unwrap();
    assert_eq!(out[0].attributes, vec!["a".into(), AttrValue::Float(5.0)]);
}

#[test]
fn two_halves_sum_to_fifty() {
    let target = targets(vec![Some(rect(0.0, 0.0, 10.0, 10.0))]);
    let source = sources("pop", vec![
        (rect(0.0, 0.0, 5.0, 10.0), AttrValue::Int(20)),
        (rect(5.0, 0.0, 10.0, 10.0), AttrValue::Int(30)),
    ]);

    let prorata = Prorata::new(&target, &source, &["pop"]).unwrap();
    let mut out: Vec<OutputFeature> = Vec::new();
    let summary = prorata.run(&mut out, None).unwrap();

    assert_eq!(summary.written, 1);
    assert_eq!(out[0].geometry, target.features()[0].geometry);
    assert!(approx_eq!(f64, value(&out[0], prorata.output_fields(), "pop_prorata"), 50.0, epsilon = 1e-9));
}

#[test]
fn partial_overlap_of_a_larger_source() {
    let target = targets(vec![Some(rect(0.0, 0.0, 10.0, 10.0))]);
    // 20 x 10 source overlapping the left half of the target.
    let source = sources("val", vec![(rect(-15.0, 0.0, 5.0, 10.0), AttrValue::Float(10.0))]);

    let prorata = Prorata::new(&target, &source, &["val"]).unwrap();
    let mut out: Vec<OutputFeature> = Vec::new();
    prorata.run(&mut out, None).unwrap();

    assert!(approx_eq!(f64, value(&out[0], prorata.output_fields(), "val_prorata"), 2.5, epsilon = 1e-9));
}

#[test]
fn values_are_rounded_to_five_digits() {
    let target = targets(vec![Some(rect(0.0, 0.0, 1.0, 1.0))]);
    let source = sources("v", vec![(rect(0.0, 0.0, 3.0, 1.0), AttrValue::Float(1.0))]);

    let prorata = Prorata::new(&target, &source, &["v"]).unwrap();
    let mut out: Vec<OutputFeature> = Vec::new();
    prorata.run(&mut out, None).unwrap();
    assert_eq!(value(&out[0], prorata.output_fields(), "v_prorata"), 0.33333);
}

#[test]
fn shape_with_hole_uses_its_true_area() {
    // 4x4 square with a 2x2 hole: area 12, the target covers the left column of width 1.
    let donut = MultiPolygon::new(vec![polygon!(
        exterior: [(x: 0.0, y: 0.0), (x: 4.0, y: 0.0), (x: 4.0, y: 4.0), (x: 0.0, y: 4.0)],
        interiors: [[(x: 1.0, y: 1.0), (x: 3.0, y: 1.0), (x: 3.0, y: 3.0), (x: 1.0, y: 3.0)]]
    )]);
    let target = targets(vec![Some(rect(0.0, 0.0, 1.0, 4.0))]);
    let source = sources("v", vec![(donut, AttrValue::Float(12.0))]);

    let prorata = Prorata::new(&target, &source, &["v"]).unwrap();
    let got = prorata.compute(&target.features()[0]).unwrap().get("v").unwrap();
    assert!(approx_eq!(f64, got, 4.0, epsilon = 1e-9));
}

/// Cancels once `limit` features have been polled.
struct CancelAfter {
    polls: Cell<usize>,
    limit: usize,
}

impl Feedback for CancelAfter {
    fn set_progress(&self, _: u32) -> Result<()> { Ok(()) }
    fn push_info(&self, _: &str) -> Result<()> { Ok(()) }
    fn is_canceled(&self) -> Result<bool> {
        let polls = self.polls.get() + 1;
        self.polls.set(polls);
        Ok(polls > self.limit)
    }
}

#[test]
fn cancellation_keeps_written_features() {
    let target = targets((0..5).map(|i| Some(rect(i as f64, 0.0, i as f64 + 1.0, 1.0))).collect());
    let source = sources("v", vec![(rect(0.0, 0.0, 5.0, 1.0), AttrValue::Float(5.0))]);

    let prorata = Prorata::new(&target, &source, &["v"]).unwrap();
    let feedback = CancelAfter { polls: Cell::new(0), limit: 2 };
    let mut out: Vec<OutputFeature> = Vec::new();
    let summary = prorata.run(&mut out, Some(&feedback)).unwrap();

    assert_eq!(summary.state, RunState::Canceled);
    assert_eq!(summary.written, 2);
    assert_eq!(out.len(), 2);
    assert!(out.iter().all(|f| value(f, prorata.output_fields(), "v_prorata") == 1.0));
}

/// Every call fails, as a host whose UI went away would.
struct Unreachable;

impl Feedback for Unreachable {
    fn set_progress(&self, _: u32) -> Result<()> { bail!("progress bar gone") }
    fn push_info(&self, _: &str) -> Result<()> { bail!("message log closed") }
    fn is_canceled(&self) -> Result<bool> { bail!("host unreachable") }
}

#[test]
fn failing_feedback_does_not_stop_the_run() {
    let target = targets(vec![None, Some(rect(0.0, 0.0, 1.0, 1.0))]);
    let source = sources("v", vec![(rect(0.0, 0.0, 2.0, 1.0), AttrValue::Float(2.0))]);

    let prorata = Prorata::new(&target, &source, &["v"]).unwrap();
    let mut out: Vec<OutputFeature> = Vec::new();
    let summary = prorata.run(&mut out, Some(&Unreachable)).unwrap();

    assert_eq!(summary.state, RunState::Completed);
    assert_eq!((summary.written, summary.skipped), (1, 1));
    assert_eq!(out[0].attributes, vec!["t1".into(), AttrValue::Float(1.0)]);
}

#[test]
fn features_are_written_in_id_order() {
    let target = targets((0..4).rev().map(|i| Some(rect(i as f64, 0.0, i as f64 + 1.0, 1.0))).collect());
    let source = sources("v", vec![(rect(0.0, 0.0, 4.0, 1.0), AttrValue::Float(4.0))]);

    let prorata = Prorata::new(&target, &source, &["v"]).unwrap();
    let mut out: Vec<OutputFeature> = Vec::new();
    prorata.run(&mut out, None).unwrap();

    let ids = out.iter().map(|f| f.id.0).collect::<Vec<_>>();
    assert_eq!(ids, [0, 1, 2, 3]);
}
