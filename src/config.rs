use crate::fields::random_fields;
use crate::masks::Method;
use anyhow::{anyhow, Context, Result};
use ndarray::ArrayD;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Where the basis modes come from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FieldConfig {
    /// Modes with entries uniform in [0, 1), one per weight
    Random {
        shape: Vec<usize>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        seed: Option<u64>,
    },
    /// A `(K, *S)` dataset read from an HDF5 file
    Hdf5 {
        path: PathBuf,
        #[serde(default = "default_fields_dataset")]
        dataset: String,
    },
}

fn default_fields_dataset() -> String {
    "fields".to_string()
}

impl FieldConfig {
    fn validate(&self) -> Result<()> {
        match self {
            FieldConfig::Random { shape, .. } => {
                if shape.is_empty() || shape.contains(&0) {
                    return Err(anyhow!(
                        "Field shape must be non-empty with positive extents, got {:?}",
                        shape
                    ));
                }
            }
            FieldConfig::Hdf5 { .. } => {
                if !cfg!(feature = "hdf5") {
                    return Err(anyhow!(
                        "HDF5 field input requires building with the `hdf5` feature"
                    ));
                }
            }
        }
        Ok(())
    }

    /// Load the modes, drawing `count` of them for random sources
    pub fn load(&self, count: usize) -> Result<ArrayD<f64>> {
        match self {
            FieldConfig::Random { shape, seed } => Ok(random_fields(count, shape, *seed)),
            #[cfg(feature = "hdf5")]
            FieldConfig::Hdf5 { path, dataset } => crate::io::read_fields(path, dataset)
                .with_context(|| {
                    format!("Failed to read dataset '{}' from {}", dataset, path.display())
                }),
            #[cfg(not(feature = "hdf5"))]
            FieldConfig::Hdf5 { .. } => Err(anyhow!(
                "HDF5 field input requires building with the `hdf5` feature"
            )),
        }
    }
}

/// Where the ensemble is written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    pub path: PathBuf,
    #[serde(default = "default_masks_dataset")]
    pub dataset: String,
}

pub fn default_masks_dataset() -> String {
    "masks".to_string()
}

/// Complete mask generation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    pub n_masks: usize,
    #[serde(default)]
    pub method: Method,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub weights: Vec<f64>,
    #[serde(default)]
    pub phasor: bool,
    pub fields: FieldConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<OutputConfig>,
}

impl RunConfig {
    /// Load configuration from TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{}'", path.display()))?;

        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: RunConfig =
            toml::from_str(content).map_err(|e| anyhow!("Failed to parse TOML config: {}", e))?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.n_masks == 0 {
            return Err(anyhow!("n_masks must be positive"));
        }
        if self.weights.is_empty() {
            return Err(anyhow!("At least one weight must be given"));
        }
        if self.phasor && self.method != Method::PhaseRandomized {
            return Err(anyhow!(
                "phasor output is only defined for method '{}', got '{}'",
                Method::PhaseRandomized,
                self.method
            ));
        }
        if self.output.is_some() && !cfg!(feature = "hdf5") {
            return Err(anyhow!(
                "Writing masks requires building with the `hdf5` feature"
            ));
        }
        self.fields.validate()?;

        Ok(())
    }

    pub fn print_summary(&self) {
        println!("=== Mask Generation ===");
        println!("Masks: {} ({})", self.n_masks, self.method);
        if self.phasor {
            println!("Phases applied as unit phasors");
        }
        match self.seed {
            Some(seed) => println!("Seed: {}", seed),
            None => println!("Seed: none (entropy)"),
        }
        println!("Weights: {:?}", self.weights);
        match &self.fields {
            FieldConfig::Random { shape, .. } => {
                println!("Fields: {} random modes of shape {:?}", self.weights.len(), shape)
            }
            FieldConfig::Hdf5 { path, dataset } => {
                println!("Fields: {}:{}", path.display(), dataset)
            }
        }
        println!("=======================");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXAMPLE: &str = r#"
n_masks = 10
method = "appearance_probability"
seed = 1
weights = [0.1, 0.2, 0.3, 0.4]

[fields]
kind = "random"
shape = [5, 5]
seed = 7
"#;

    #[test]
    fn test_parse_example() {
        let config = RunConfig::from_toml_str(EXAMPLE).unwrap();
        assert_eq!(config.n_masks, 10);
        assert_eq!(config.method, Method::AppearanceProbability);
        assert_eq!(config.seed, Some(1));
        assert!(!config.phasor);
        assert_eq!(
            config.fields,
            FieldConfig::Random {
                shape: vec![5, 5],
                seed: Some(7)
            }
        );
        assert_eq!(config.fields.load(4).unwrap().shape(), &[4, 5, 5]);
    }

    #[test]
    fn test_method_defaults_to_phase_randomized() {
        let config = RunConfig::from_toml_str(
            "n_masks = 2\nweights = [1.0]\n[fields]\nkind = \"random\"\nshape = [3]\n",
        )
        .unwrap();
        assert_eq!(config.method, Method::PhaseRandomized);
        assert_eq!(config.seed, None);
    }

    #[test]
    fn test_unknown_method_rejected() {
        let content = EXAMPLE.replace("appearance_probability", "bogus");
        let err = RunConfig::from_toml_str(&content).unwrap_err();
        assert!(err.to_string().contains("bogus"), "{err}");
    }

    #[test]
    fn test_validation_errors() {
        assert!(RunConfig::from_toml_str(&EXAMPLE.replace("n_masks = 10", "n_masks = 0")).is_err());
        assert!(RunConfig::from_toml_str(&EXAMPLE.replace("[0.1, 0.2, 0.3, 0.4]", "[]")).is_err());
        assert!(RunConfig::from_toml_str(&EXAMPLE.replace("[5, 5]", "[5, 0]")).is_err());

        let phasor = EXAMPLE.replace("seed = 1\n", "seed = 1\nphasor = true\n");
        assert!(RunConfig::from_toml_str(&phasor).is_err());
    }
}
