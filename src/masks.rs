use crate::error::{MaskError, MaskResult};
use crate::phases::{rng_for, PhaseSampler};
use ndarray::{Array, Array2, ArrayView, Axis, Dimension, LinalgScalar, RemoveAxis};
use num_complex::Complex64;
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, trace};

/// Element type of a basis field: real or complex amplitudes.
pub trait FieldScalar: LinalgScalar + From<f64> + fmt::Debug {}

impl<T> FieldScalar for T where T: LinalgScalar + From<f64> + fmt::Debug {}

/// How the basis modes are combined into one mask.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Method {
    /// Every mask superposes all modes with independent random phases.
    #[default]
    PhaseRandomized,
    /// Every mask is exactly one mode, picked with probability proportional to its weight.
    AppearanceProbability,
}

impl Method {
    pub const ALL: [Method; 2] = [Method::PhaseRandomized, Method::AppearanceProbability];

    pub fn name(self) -> &'static str {
        match self {
            Method::PhaseRandomized => "phase_randomized",
            Method::AppearanceProbability => "appearance_probability",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Method {
    type Err = MaskError;

    fn from_str(s: &str) -> MaskResult<Self> {
        Method::ALL
            .into_iter()
            .find(|method| method.name() == s)
            .ok_or_else(|| MaskError::InvalidMethod(s.to_string()))
    }
}

impl TryFrom<String> for Method {
    type Error = MaskError;

    fn try_from(s: String) -> MaskResult<Self> {
        s.parse()
    }
}

impl From<Method> for String {
    fn from(method: Method) -> Self {
        method.name().to_string()
    }
}

/// Generates mask ensembles from a set of weighted basis fields.
///
/// Each call to [`MaskGenerator::generate`] builds its own generator from the
/// configured seed, so repeated calls with a seed give identical ensembles for
/// both methods.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct MaskGenerator {
    method: Method,
    seed: Option<u64>,
}

impl MaskGenerator {
    pub fn new(method: Method) -> Self {
        Self { method, seed: None }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Build `n_masks` masks from `fields` of shape `(K, *S)`.
    ///
    /// Returns an array of shape `(n_masks, *S)`. The fields are only read.
    pub fn generate<A, D>(
        &self,
        n_masks: usize,
        weights: &[f64],
        fields: ArrayView<'_, A, D>,
    ) -> MaskResult<Array<A, D>>
    where
        A: FieldScalar,
        D: Dimension + RemoveAxis,
    {
        let k = validate(n_masks, weights, &fields)?;
        debug!(
            method = %self.method,
            n_masks,
            modes = k,
            mode_size = fields.len() / k,
            seeded = self.seed.is_some(),
            "generating mask ensemble"
        );

        match self.method {
            Method::PhaseRandomized => phase_randomized(n_masks, weights, &fields, self.seed),
            Method::AppearanceProbability => {
                appearance_probability(n_masks, weights, &fields, self.seed)
            }
        }
    }
}

/// Generate `n_masks` masks with the given method; see [`MaskGenerator`].
pub fn generate_masks<A, D>(
    n_masks: usize,
    weights: &[f64],
    fields: ArrayView<'_, A, D>,
    method: Method,
    seed: Option<u64>,
) -> MaskResult<Array<A, D>>
where
    A: FieldScalar,
    D: Dimension + RemoveAxis,
{
    MaskGenerator { method, seed }.generate(n_masks, weights, fields)
}

/// Like [`generate_masks`], with the method given by name.
///
/// An unrecognised name fails with [`MaskError::InvalidMethod`] before any
/// other input is looked at.
pub fn generate_masks_by_name<A, D>(
    n_masks: usize,
    weights: &[f64],
    fields: ArrayView<'_, A, D>,
    method: &str,
    seed: Option<u64>,
) -> MaskResult<Array<A, D>>
where
    A: FieldScalar,
    D: Dimension + RemoveAxis,
{
    let method: Method = method.parse()?;
    generate_masks(n_masks, weights, fields, method, seed)
}

/// Phase-randomized superposition applying each phase as the unit phasor
/// `exp(iφ)` rather than as a real multiplier.
///
/// Draws the same phase angles as [`Method::PhaseRandomized`] for a given seed.
pub fn generate_phasor_masks<D>(
    n_masks: usize,
    weights: &[f64],
    fields: ArrayView<'_, Complex64, D>,
    seed: Option<u64>,
) -> MaskResult<Array<Complex64, D>>
where
    D: Dimension + RemoveAxis,
{
    let k = validate(n_masks, weights, &fields)?;
    debug!(n_masks, modes = k, seeded = seed.is_some(), "generating phasor mask ensemble");

    let kernel = weighted_kernel(weights, &fields)?;
    let phasors = PhaseSampler::new(seed)
        .sample_matrix(n_masks, k)
        .mapv(|phi| Complex64::from_polar(1.0, phi));

    let masks = phasors.dot(&kernel);
    Ok(masks.into_shape(ensemble_dim(&fields, n_masks))?)
}

/// Turn weights into selection probabilities `w[n] / sum(w)`.
pub fn normalized_probabilities(weights: &[f64]) -> MaskResult<Vec<f64>> {
    check_weights(weights)?;

    let total: f64 = weights.iter().sum();
    if total <= 0.0 {
        return Err(MaskError::NonPositiveWeightSum);
    }

    Ok(weights.iter().map(|w| w / total).collect())
}

/// Mode indices an appearance-probability ensemble would select.
///
/// With `Some(seed)` the result matches the modes picked by
/// [`Method::AppearanceProbability`] for the same seed.
pub fn sample_mode_indices(
    n_masks: usize,
    weights: &[f64],
    seed: Option<u64>,
) -> MaskResult<Vec<usize>> {
    if n_masks == 0 {
        return Err(MaskError::EmptyInput("n_masks must be positive"));
    }
    if weights.is_empty() {
        return Err(MaskError::EmptyInput("at least one weight is required"));
    }

    let probabilities = normalized_probabilities(weights)?;
    draw_mode_indices(n_masks, &probabilities, &mut rng_for(seed))
}

fn check_weights(weights: &[f64]) -> MaskResult<()> {
    match weights
        .iter()
        .enumerate()
        .find(|(_, w)| !w.is_finite() || **w < 0.0)
    {
        Some((index, &value)) => Err(MaskError::InvalidWeight { index, value }),
        None => Ok(()),
    }
}

/* returns the number of modes K */
fn validate<A, D: Dimension>(
    n_masks: usize,
    weights: &[f64],
    fields: &ArrayView<'_, A, D>,
) -> MaskResult<usize> {
    if n_masks == 0 {
        return Err(MaskError::EmptyInput("n_masks must be positive"));
    }
    if fields.ndim() == 0 || fields.len_of(Axis(0)) == 0 {
        return Err(MaskError::EmptyInput("at least one basis field is required"));
    }

    let k = fields.len_of(Axis(0));
    if weights.len() != k {
        return Err(MaskError::ShapeMismatch {
            weights: weights.len(),
            fields: k,
        });
    }
    check_weights(weights)?;

    Ok(k)
}

/* (n_masks, *S) */
fn ensemble_dim<A, D: Dimension>(fields: &ArrayView<'_, A, D>, n_masks: usize) -> D {
    let mut dim = fields.raw_dim();
    dim[0] = n_masks;
    dim
}

/// Flattened `(K, prod(S))` copy of the fields with row `n` scaled by `weights[n]`.
fn weighted_kernel<A, D>(weights: &[f64], fields: &ArrayView<'_, A, D>) -> MaskResult<Array2<A>>
where
    A: FieldScalar,
    D: Dimension,
{
    let k = fields.len_of(Axis(0));
    let mode_size = fields.len() / k;

    let mut kernel = fields.to_shape((k, mode_size))?.into_owned();
    for (mut row, &weight) in kernel.outer_iter_mut().zip(weights) {
        let weight = A::from(weight);
        row.mapv_inplace(|v| v * weight);
    }

    Ok(kernel)
}

fn phase_randomized<A, D>(
    n_masks: usize,
    weights: &[f64],
    fields: &ArrayView<'_, A, D>,
    seed: Option<u64>,
) -> MaskResult<Array<A, D>>
where
    A: FieldScalar,
    D: Dimension,
{
    let k = fields.len_of(Axis(0));
    let kernel = weighted_kernel(weights, fields)?;
    let phases = PhaseSampler::new(seed)
        .sample_matrix(n_masks, k)
        .mapv(<A as From<f64>>::from);

    /* (n_masks x K) . (K x prod(S)) */
    let masks = phases.dot(&kernel);
    Ok(masks.into_shape(ensemble_dim(fields, n_masks))?)
}

fn appearance_probability<A, D>(
    n_masks: usize,
    weights: &[f64],
    fields: &ArrayView<'_, A, D>,
    seed: Option<u64>,
) -> MaskResult<Array<A, D>>
where
    A: FieldScalar,
    D: Dimension + RemoveAxis,
{
    let probabilities = normalized_probabilities(weights)?;
    let indices = draw_mode_indices(n_masks, &probabilities, &mut rng_for(seed))?;

    /* select copies each chosen mode into the output */
    Ok(fields.select(Axis(0), &indices))
}

fn draw_mode_indices<R: Rng>(
    n_masks: usize,
    probabilities: &[f64],
    rng: &mut R,
) -> MaskResult<Vec<usize>> {
    let distribution =
        WeightedIndex::<f64>::new(probabilities).map_err(|_| MaskError::NonPositiveWeightSum)?;
    let indices: Vec<usize> = (0..n_masks).map(|_| distribution.sample(rng)).collect();
    trace!(?indices, "selected modes");

    Ok(indices)
}
