pub mod run;
pub mod sweep;
pub mod validate;

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use boltz_mcmc::{ReplicateRecord, RunConfig};

/// Loads `path`, applies the command-line seed override and validates.
pub fn load_config(path: &Path, seed: Option<u64>) -> Result<RunConfig, Box<dyn Error>> {
    let mut config = RunConfig::load(path)?;
    if let Some(seed) = seed {
        config.seed_policy.master_seed = seed;
    }
    config.validate()?;
    Ok(config)
}

/// Creates the run directory and copies the configuration into it.
pub fn prepare_out_dir(out: &Path, config_path: &Path) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(out)?;
    fs::copy(config_path, out.join("config.yaml")).ok();
    Ok(())
}

/// Trace directory under `out`, when tracing is enabled.
pub fn trace_dir(config: &RunConfig, out: &Path) -> Option<PathBuf> {
    config
        .output
        .trace
        .then(|| out.join(&config.output.trace_dir))
}

/// Mean and standard error of the observable over a set of replicates.
pub fn summarize(records: &[ReplicateRecord]) -> (f64, f64) {
    let n = records.len() as f64;
    if records.is_empty() {
        return (f64::NAN, f64::NAN);
    }
    let mean = records.iter().map(|r| r.observable_estimate).sum::<f64>() / n;
    if records.len() < 2 {
        return (mean, 0.0);
    }
    let variance = records
        .iter()
        .map(|r| (r.observable_estimate - mean).powi(2))
        .sum::<f64>()
        / (n - 1.0);
    (mean, (variance / n).sqrt())
}

/// Collects sweep batches until every batch of one β has arrived.
pub struct BetaSummary {
    per_beta: usize,
    pending: Vec<ReplicateRecord>,
}

impl BetaSummary {
    /// Expects `batches * replicates` rows per β.
    pub fn new(batches: usize, replicates: usize) -> Self {
        Self {
            per_beta: batches * replicates,
            pending: Vec::with_capacity(batches * replicates),
        }
    }

    /// Adds a batch; returns `(beta, mean, stderr, rows)` once the β is complete.
    pub fn push(&mut self, records: &[ReplicateRecord]) -> Option<(f64, f64, f64, usize)> {
        self.pending.extend_from_slice(records);
        if self.pending.is_empty() || self.pending.len() < self.per_beta {
            return None;
        }
        let (mean, stderr) = summarize(&self.pending);
        let summary = (self.pending[0].beta, mean, stderr, self.pending.len());
        self.pending.clear();
        Some(summary)
    }
}
