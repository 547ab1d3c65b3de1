use hdf5::{File, Result};
use ndarray::ArrayD;
use num_complex::Complex64;
use std::path::Path;

/// Read a `(K, *S)` stack of real modes.
pub fn read_fields(path: &Path, dataset: &str) -> Result<ArrayD<f64>> {
    File::open(path)?.dataset(dataset)?.read_dyn::<f64>()
}

pub fn write_masks(path: &Path, dataset: &str, masks: &ArrayD<f64>) -> Result<()> {
    let file = File::create(path)?;
    let builder = file.new_dataset_builder();
    builder.with_data(masks).create(dataset)?;
    Ok(())
}

/* complex ensembles are stored as `<dataset>/real` and `<dataset>/imag` */
pub fn write_complex_masks(path: &Path, dataset: &str, masks: &ArrayD<Complex64>) -> Result<()> {
    let file = File::create(path)?;
    let group = file.create_group(dataset)?;

    let real = masks.mapv(|c| c.re);
    let imag = masks.mapv(|c| c.im);
    group.new_dataset_builder().with_data(&real).create("real")?;
    group.new_dataset_builder().with_data(&imag).create("imag")?;
    Ok(())
}
