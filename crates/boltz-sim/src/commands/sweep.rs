use std::error::Error;
use std::path::PathBuf;

use boltz_mcmc::{run_sweep, ResultsWriter, RunManifest};
use clap::Args;
use log::info;

#[derive(Args, Debug)]
pub struct SweepArgs {
    /// YAML configuration with a `sweep` block.
    #[arg(long)]
    pub config: PathBuf,
    /// Output directory for run artefacts.
    #[arg(long)]
    pub out: PathBuf,
    /// Override the configured master seed.
    #[arg(long)]
    pub seed: Option<u64>,
}

pub fn run(args: &SweepArgs) -> Result<(), Box<dyn Error>> {
    let config = super::load_config(&args.config, args.seed)?;
    let Some(sweep) = config.sweep.clone() else {
        return Err("configuration has no sweep block; use `boltz-sim run`".into());
    };
    super::prepare_out_dir(&args.out, &args.config)?;

    let manifest_path = args.out.join(&config.output.manifest_file);
    let mut manifest = RunManifest::begin(&config);
    manifest.write(&manifest_path)?;

    let mut writer = ResultsWriter::create(&args.out.join(&config.output.results_file))?;
    let trace_dir = super::trace_dir(&config, &args.out);
    let mut summary = super::BetaSummary::new(sweep.batches, config.replicate_count);
    let produced = run_sweep(&config, &sweep, trace_dir.as_deref(), |records| {
        writer.write_records(records)?;
        if let Some((beta, mean, stderr, rows)) = summary.push(records) {
            info!("beta={beta}: observable {mean:.6} ± {stderr:.6} over {rows} replicates");
        }
        Ok(())
    })?;
    info!("wrote {produced} rows to {}", writer.path().display());

    manifest.finish(produced);
    manifest.write(&manifest_path)?;
    Ok(())
}
