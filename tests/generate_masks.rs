use approx::assert_relative_eq;
use coherent_masks::{
    generate_masks, generate_masks_by_name, random_fields, sample_phases, FieldSet, MaskError,
    MaskGenerator, Method,
};
use ndarray::{ArrayD, Axis};
use std::f64::consts::PI;

const WEIGHTS: [f64; 4] = [0.1, 0.2, 0.3, 0.4];

fn fields() -> ArrayD<f64> {
    random_fields(4, &[5, 5], None)
}

#[test]
fn random_phases_shape() {
    let result = sample_phases(&[5, 5], None);
    assert_eq!(result.shape(), &[5, 5]);
}

#[test]
fn random_phases_values_range() {
    let result = sample_phases(&[5, 5], None);
    assert!(result.iter().all(|&phi| phi >= 0.0 && phi <= 2.0 * PI));
}

#[test]
fn random_phases_seed() {
    assert_eq!(sample_phases(&[5, 5], Some(1)), sample_phases(&[5, 5], Some(1)));
}

#[test]
fn phase_randomized_shape_and_reproducibility() {
    let fields = fields();
    let first =
        generate_masks(10, &WEIGHTS, fields.view(), Method::PhaseRandomized, Some(1)).unwrap();
    let second =
        generate_masks(10, &WEIGHTS, fields.view(), Method::PhaseRandomized, Some(1)).unwrap();

    assert_eq!(first.shape(), &[10, 5, 5]);
    assert_eq!(first, second);
}

#[test]
fn appearance_probability_shape_and_selection() {
    let fields = fields();
    let masks = generate_masks_by_name(
        10,
        &WEIGHTS,
        fields.view(),
        "appearance_probability",
        Some(1),
    )
    .unwrap();

    assert_eq!(masks.shape(), &[10, 5, 5]);
    for mask in masks.outer_iter() {
        assert!(fields.outer_iter().any(|field| field == mask));
    }
}

#[test]
fn appearance_probability_reproducible_with_seed() {
    let fields = fields();
    let generator = MaskGenerator::new(Method::AppearanceProbability).with_seed(5);
    assert_eq!(
        generator.generate(25, &WEIGHTS, fields.view()).unwrap(),
        generator.generate(25, &WEIGHTS, fields.view()).unwrap()
    );
}

#[test]
fn invalid_method() {
    let fields = fields();
    let result = generate_masks_by_name(10, &WEIGHTS, fields.view(), "invalid_method", None);
    assert!(matches!(result, Err(MaskError::InvalidMethod(name)) if name == "invalid_method"));
}

#[test]
fn mismatched_weights_fields() {
    let fields = fields();
    let result = generate_masks(
        10,
        &[0.1, 0.2, 0.3],
        fields.view(),
        Method::PhaseRandomized,
        None,
    );
    assert_eq!(
        result.unwrap_err(),
        MaskError::ShapeMismatch {
            weights: 3,
            fields: 4
        }
    );
}

#[test]
fn stacked_field_set_round_trip() {
    let modes: Vec<ArrayD<f64>> = (0..3)
        .map(|n| random_fields(1, &[2, 3], Some(n)).index_axis_move(Axis(0), 0))
        .collect();
    let views: Vec<_> = modes.iter().map(|mode| mode.view()).collect();
    let set = FieldSet::stack(&views).unwrap();

    let masks = generate_masks(
        4,
        &[1.0, 1.0, 2.0],
        set.view(),
        Method::AppearanceProbability,
        Some(2),
    )
    .unwrap();
    assert_eq!(masks.shape(), &[4, 2, 3]);
    assert!(masks.outer_iter().all(|mask| modes.iter().any(|mode| mode.view() == mask)));
}

#[test]
fn superposition_is_linear_in_weights() {
    let fields = fields();
    let doubled: Vec<f64> = WEIGHTS.iter().map(|w| 2.0 * w).collect();
    let base =
        generate_masks(6, &WEIGHTS, fields.view(), Method::PhaseRandomized, Some(3)).unwrap();
    let scaled =
        generate_masks(6, &doubled, fields.view(), Method::PhaseRandomized, Some(3)).unwrap();

    for (&b, &s) in base.iter().zip(scaled.iter()) {
        assert_relative_eq!(2.0 * b, s, max_relative = 1e-12);
    }
}

#[test]
fn docs_example() {
    let fields = fields();

    let masks = generate_masks(10, &WEIGHTS, fields.view(), Method::PhaseRandomized, None).unwrap();
    assert_eq!(masks.shape(), &[10, 5, 5]);

    let masks =
        generate_masks(10, &WEIGHTS, fields.view(), Method::AppearanceProbability, None).unwrap();
    assert_eq!(masks.shape(), &[10, 5, 5]);
}
