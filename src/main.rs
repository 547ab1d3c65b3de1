use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use coherent_masks::config::{default_masks_dataset, FieldConfig, OutputConfig, RunConfig};
use coherent_masks::{generate_masks, generate_phasor_masks, Method};
use ndarray::ArrayD;
use num_complex::Complex64;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(author, version, about = "Generate random masks for partially coherent sources", long_about=None)]
#[command(propagate_version = true)]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// generate masks from random modes described on the command line
    Generate(Generate),
    /// generate masks from a TOML run file
    Run(Run),
}

#[derive(Args)]
struct Generate {
    /// number of masks to generate
    #[arg(short, long)]
    n_masks: usize,

    /// relative power of each mode, comma separated
    #[arg(short, long, value_delimiter = ',', required = true)]
    weights: Vec<f64>,

    /// shape of each mode, comma separated
    #[arg(short, long, value_delimiter = ',', required = true)]
    shape: Vec<usize>,

    /// phase_randomized or appearance_probability
    #[arg(short, long, default_value = "phase_randomized", value_parser = Method::from_str)]
    method: Method,

    /// seed for the mask generator
    #[arg(long)]
    seed: Option<u64>,

    /// seed for the random modes
    #[arg(long)]
    field_seed: Option<u64>,

    /// apply phases as unit phasors exp(i phi)
    #[arg(long)]
    phasor: bool,

    /// HDF5 file to write the ensemble to
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct Run {
    /// path to the run file
    config: PathBuf,
}

impl From<Generate> for RunConfig {
    fn from(args: Generate) -> Self {
        Self {
            n_masks: args.n_masks,
            method: args.method,
            seed: args.seed,
            weights: args.weights,
            phasor: args.phasor,
            fields: FieldConfig::Random {
                shape: args.shape,
                seed: args.field_seed,
            },
            output: args.output.map(|path| OutputConfig {
                path,
                dataset: default_masks_dataset(),
            }),
        }
    }
}

enum Ensemble {
    Real(ArrayD<f64>),
    Complex(ArrayD<Complex64>),
}

impl Ensemble {
    fn shape(&self) -> &[usize] {
        match self {
            Ensemble::Real(masks) => masks.shape(),
            Ensemble::Complex(masks) => masks.shape(),
        }
    }

    /* mean |m|^2 over the pixels of each mask */
    fn mean_intensities(&self) -> Vec<f64> {
        match self {
            Ensemble::Real(masks) => masks
                .outer_iter()
                .map(|mask| mask.iter().map(|v| v * v).sum::<f64>() / mask.len().max(1) as f64)
                .collect(),
            Ensemble::Complex(masks) => masks
                .outer_iter()
                .map(|mask| {
                    mask.iter().map(|c| c.norm_sqr()).sum::<f64>() / mask.len().max(1) as f64
                })
                .collect(),
        }
    }
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn generate(config: &RunConfig) -> Result<Ensemble> {
    let fields = config.fields.load(config.weights.len())?;
    info!(fields = ?fields.shape(), "loaded basis fields");

    let ensemble = if config.phasor {
        let fields = fields.mapv(Complex64::from);
        Ensemble::Complex(generate_phasor_masks(
            config.n_masks,
            &config.weights,
            fields.view(),
            config.seed,
        )?)
    } else {
        Ensemble::Real(generate_masks(
            config.n_masks,
            &config.weights,
            fields.view(),
            config.method,
            config.seed,
        )?)
    };

    Ok(ensemble)
}

#[cfg(feature = "hdf5")]
fn save(ensemble: &Ensemble, output: &OutputConfig) -> Result<()> {
    match ensemble {
        Ensemble::Real(masks) => {
            coherent_masks::io::write_masks(&output.path, &output.dataset, masks)?
        }
        Ensemble::Complex(masks) => {
            coherent_masks::io::write_complex_masks(&output.path, &output.dataset, masks)?
        }
    }
    info!(path = %output.path.display(), "wrote mask ensemble");
    Ok(())
}

#[cfg(not(feature = "hdf5"))]
fn save(_ensemble: &Ensemble, _output: &OutputConfig) -> Result<()> {
    anyhow::bail!("Writing masks requires building with the `hdf5` feature")
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match cli.command {
        Commands::Generate(args) => {
            let config = RunConfig::from(args);
            config.validate()?;
            config
        }
        Commands::Run(args) => RunConfig::from_file(&args.config)?,
    };
    config.print_summary();

    let ensemble = generate(&config).context("mask generation failed")?;

    println!("Ensemble shape: {:?}", ensemble.shape());
    for (i, intensity) in ensemble.mean_intensities().iter().enumerate() {
        println!("  mask {}: mean intensity {:.6}", i, intensity);
    }

    if let Some(output) = &config.output {
        save(&ensemble, output)
            .with_context(|| format!("Failed to write {}", output.path.display()))?;
    }

    Ok(())
}
