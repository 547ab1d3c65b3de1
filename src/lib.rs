//! Random mask ensembles for partially coherent sources.
//!
//! A partially coherent source is modelled as an incoherent superposition of
//! coherent modes. Given `K` basis fields and their relative powers, the crate
//! synthesizes `n_masks` realizations either by superposing every mode with
//! random phases ([`Method::PhaseRandomized`]) or by picking one mode per mask
//! with probability proportional to its weight ([`Method::AppearanceProbability`]).

pub mod config;
pub mod error;
pub mod fields;
#[cfg(feature = "hdf5")]
pub mod io;
pub mod masks;
pub mod phases;

pub use error::{MaskError, MaskResult};
pub use fields::{random_fields, FieldSet};
pub use masks::{
    generate_masks, generate_masks_by_name, generate_phasor_masks, normalized_probabilities,
    sample_mode_indices, FieldScalar, MaskGenerator, Method,
};
pub use phases::{sample_phases, PhaseMatrix, PhaseSampler};
