use std::error::Error;
use std::path::PathBuf;

use boltz_mcmc::{run_replicates, ResultsWriter, RunManifest};
use clap::Args;
use log::info;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// YAML configuration describing the run.
    #[arg(long)]
    pub config: PathBuf,
    /// Output directory for run artefacts.
    #[arg(long)]
    pub out: PathBuf,
    /// Override the configured master seed.
    #[arg(long)]
    pub seed: Option<u64>,
}

pub fn run(args: &RunArgs) -> Result<(), Box<dyn Error>> {
    let config = super::load_config(&args.config, args.seed)?;
    if config.sweep.is_some() {
        return Err("configuration has a sweep block; use `boltz-sim sweep`".into());
    }
    super::prepare_out_dir(&args.out, &args.config)?;

    let manifest_path = args.out.join(&config.output.manifest_file);
    let mut manifest = RunManifest::begin(&config);
    manifest.write(&manifest_path)?;

    let mut writer = ResultsWriter::create(&args.out.join(&config.output.results_file))?;
    let trace_dir = super::trace_dir(&config, &args.out);
    let records = run_replicates(&config, trace_dir.as_deref())?;
    writer.write_records(&records)?;

    let (mean, stderr) = super::summarize(&records);
    info!(
        "beta={}: observable {mean:.6} ± {stderr:.6} over {} replicates",
        config.beta,
        records.len()
    );

    info!("wrote {} rows to {}", writer.rows(), writer.path().display());
    manifest.finish(writer.rows());
    manifest.write(&manifest_path)?;
    Ok(())
}
