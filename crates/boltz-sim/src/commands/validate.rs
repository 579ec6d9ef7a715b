use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use serde_json::json;

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// YAML configuration to check.
    #[arg(long)]
    pub config: PathBuf,
}

pub fn run(args: &ValidateArgs) -> Result<(), Box<dyn Error>> {
    let config = super::load_config(&args.config, None)?;
    let points: Vec<_> = match &config.sweep {
        Some(sweep) => sweep
            .betas()
            .into_iter()
            .map(|beta| json!({ "beta": beta, "proposal_scale": sweep.scale.scale_at(beta) }))
            .collect(),
        None => vec![json!({ "beta": config.beta, "proposal_scale": config.proposal_scale })],
    };
    let report = json!({
        "config": config,
        "particle_count": config.particle_count(),
        "recorded_samples_per_chain": config.chain_settings().recorded_samples(),
        "workers": config.worker_count(),
        "points": points,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
