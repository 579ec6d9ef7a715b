use std::path::Path;

use boltz_core::BoltzError;
use log::info;
use serde::{Deserialize, Serialize};

use crate::config::RunConfig;
use crate::gauge::ScaleSchedule;
use crate::replicate::{run_point, ReplicateRecord};

/// Geometric β ladder with per-β proposal widths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepConfig {
    /// First β of the ladder.
    pub beta_start: f64,
    /// The ladder stops before reaching this β.
    pub beta_stop: f64,
    /// Ratio between consecutive β values.
    #[serde(default = "default_factor")]
    pub factor: f64,
    /// Replicate batches run at every β.
    #[serde(default = "default_batches")]
    pub batches: usize,
    /// Proposal width per β.
    pub scale: ScaleSchedule,
}

fn default_factor() -> f64 {
    1.04
}

fn default_batches() -> usize {
    5
}

impl SweepConfig {
    /// Fails on ladders that are empty or never terminate.
    pub fn validate(&self) -> Result<(), BoltzError> {
        if !self.beta_start.is_finite() || self.beta_start <= 0.0 {
            return Err(BoltzError::config(
                "sweep-start",
                "sweep must start at a positive beta",
                "beta_start",
                self.beta_start,
            ));
        }
        if !self.beta_stop.is_finite() || self.beta_stop <= self.beta_start {
            return Err(BoltzError::config(
                "sweep-stop",
                "sweep must stop above its starting beta",
                "beta_stop",
                self.beta_stop,
            ));
        }
        if !self.factor.is_finite() || self.factor <= 1.0 {
            return Err(BoltzError::config(
                "sweep-factor",
                "sweep factor must exceed one",
                "factor",
                self.factor,
            ));
        }
        if self.batches == 0 {
            return Err(BoltzError::config(
                "sweep-batches",
                "at least one batch per beta is required",
                "batches",
                self.batches,
            ));
        }
        Ok(())
    }

    /// β values visited by the sweep, in order.
    pub fn betas(&self) -> Vec<f64> {
        let mut betas = Vec::new();
        let mut beta = self.beta_start;
        while beta < self.beta_stop {
            betas.push(beta);
            beta *= self.factor;
        }
        betas
    }
}

/// Runs every β of `sweep`, handing each batch's records to `sink` as soon as
/// the batch completes. Returns the number of records produced.
pub fn run_sweep<F>(
    config: &RunConfig,
    sweep: &SweepConfig,
    trace_dir: Option<&Path>,
    mut sink: F,
) -> Result<usize, BoltzError>
where
    F: FnMut(&[ReplicateRecord]) -> Result<(), BoltzError>,
{
    sweep.validate()?;
    let betas = sweep.betas();
    info!(
        "sweep over {} beta values from {} to {}",
        betas.len(),
        sweep.beta_start,
        sweep.beta_stop
    );
    let mut produced = 0;
    for beta in betas {
        let scale = sweep.scale.scale_at(beta);
        for batch in 0..sweep.batches {
            let records = run_point(config, beta, scale, batch, trace_dir)?;
            produced += records.len();
            sink(&records)?;
        }
    }
    Ok(produced)
}
