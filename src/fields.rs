use crate::error::{MaskError, MaskResult};
use ndarray::{ArrayD, ArrayViewD, Axis, IxDyn};

/// Basis modes of a common shape, stacked along axis 0.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldSet<A> {
    modes: ArrayD<A>,
}

impl<A: Clone> FieldSet<A> {
    /// Wrap an array of shape `(K, *S)` with `K >= 1`.
    pub fn new(modes: ArrayD<A>) -> MaskResult<Self> {
        if modes.ndim() == 0 || modes.len_of(Axis(0)) == 0 {
            return Err(MaskError::EmptyInput("at least one basis field is required"));
        }
        Ok(Self { modes })
    }

    /// Stack individually supplied modes, which must all share one shape.
    pub fn stack(modes: &[ArrayViewD<'_, A>]) -> MaskResult<Self> {
        let first = modes
            .first()
            .ok_or(MaskError::EmptyInput("at least one basis field is required"))?;

        for (index, mode) in modes.iter().enumerate().skip(1) {
            if mode.shape() != first.shape() {
                return Err(MaskError::FieldShapeMismatch {
                    index,
                    expected: first.shape().to_vec(),
                    actual: mode.shape().to_vec(),
                });
            }
        }

        Self::new(ndarray::stack(Axis(0), modes)?)
    }

    /// Number of modes `K`.
    pub fn len(&self) -> usize {
        self.modes.len_of(Axis(0))
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Shape `S` shared by every mode.
    pub fn mode_shape(&self) -> &[usize] {
        &self.modes.shape()[1..]
    }

    pub fn mode(&self, index: usize) -> ArrayViewD<'_, A> {
        self.modes.index_axis(Axis(0), index)
    }

    pub fn view(&self) -> ArrayViewD<'_, A> {
        self.modes.view()
    }

    pub fn into_inner(self) -> ArrayD<A> {
        self.modes
    }
}

/// `count` modes of shape `shape` with entries uniform in [0, 1).
pub fn random_fields(count: usize, shape: &[usize], seed: Option<u64>) -> ArrayD<f64> {
    let rng = match seed {
        Some(seed) => fastrand::Rng::with_seed(seed),
        None => fastrand::Rng::new(),
    };

    let mut full_shape = Vec::with_capacity(shape.len() + 1);
    full_shape.push(count);
    full_shape.extend_from_slice(shape);

    ArrayD::from_shape_simple_fn(IxDyn(&full_shape), || rng.f64())
}
