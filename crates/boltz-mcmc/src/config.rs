use std::fs;
use std::path::{Path, PathBuf};

use boltz_core::errors::ErrorInfo;
use boltz_core::{BoltzError, PotentialLaw};
use serde::{Deserialize, Serialize};

use crate::chain::ChainSettings;
use crate::observable::ObservableKind;
use crate::proposal::{self, ProposalLaw};
use crate::sweep::SweepConfig;

/// YAML-configurable parameters governing a sampling run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Inverse temperature of a single-point run.
    #[serde(default = "default_beta")]
    pub beta: f64,
    /// Proposal width (uniform half-width or Gaussian standard deviation).
    #[serde(default = "default_proposal_scale")]
    pub proposal_scale: f64,
    /// Side length `L` of the box `[-L/2, L/2]^D`.
    #[serde(default = "default_box_length")]
    pub box_length: f64,
    /// Number of `(+1, -1)` charge pairs; the ensemble holds twice as many particles.
    #[serde(default = "default_pair_count")]
    pub particle_pair_count: usize,
    /// Sample steps per chain (post burn-in).
    #[serde(default = "default_sample_count")]
    pub sample_count: usize,
    /// Steps discarded before sampling.
    #[serde(default = "default_burn_in")]
    pub burn_in: usize,
    /// Interval at which the observable is measured.
    #[serde(default = "default_thinning")]
    pub thinning: usize,
    /// Independent chains launched per β.
    #[serde(default = "default_replicate_count")]
    pub replicate_count: usize,
    /// Size of the worker pool; defaults to one worker per replicate.
    #[serde(default)]
    pub workers: Option<usize>,
    /// Spatial dimension of the particles.
    #[serde(default)]
    pub dimensions: Dimensions,
    /// Pair potential law.
    #[serde(default)]
    pub potential: PotentialLaw,
    /// Proposal family.
    #[serde(default)]
    pub proposal: ProposalLaw,
    /// Observable estimated by each chain.
    #[serde(default)]
    pub observable: ObservableKind,
    /// Master seed and labelling.
    #[serde(default)]
    pub seed_policy: SeedPolicy,
    /// Optional β sweep replacing the single `beta`/`proposal_scale` point.
    #[serde(default)]
    pub sweep: Option<SweepConfig>,
    /// Output file layout.
    #[serde(default)]
    pub output: OutputConfig,
}

fn default_beta() -> f64 {
    1.0
}

fn default_proposal_scale() -> f64 {
    0.5
}

fn default_box_length() -> f64 {
    8.0
}

fn default_pair_count() -> usize {
    20
}

fn default_sample_count() -> usize {
    200_000
}

fn default_burn_in() -> usize {
    1000
}

fn default_thinning() -> usize {
    20
}

fn default_replicate_count() -> usize {
    3
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            beta: default_beta(),
            proposal_scale: default_proposal_scale(),
            box_length: default_box_length(),
            particle_pair_count: default_pair_count(),
            sample_count: default_sample_count(),
            burn_in: default_burn_in(),
            thinning: default_thinning(),
            replicate_count: default_replicate_count(),
            workers: None,
            dimensions: Dimensions::default(),
            potential: PotentialLaw::default(),
            proposal: ProposalLaw::default(),
            observable: ObservableKind::default(),
            seed_policy: SeedPolicy::default(),
            sweep: None,
            output: OutputConfig::default(),
        }
    }
}

impl RunConfig {
    /// Parses a configuration from YAML text.
    pub fn from_yaml_str(text: &str) -> Result<Self, BoltzError> {
        serde_yaml::from_str(text)
            .map_err(|err| BoltzError::Serde(ErrorInfo::new("config-parse", err.to_string())))
    }

    /// Loads a configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self, BoltzError> {
        let contents = fs::read_to_string(path)
            .map_err(|err| BoltzError::io("config-read", err, path.display()))?;
        Self::from_yaml_str(&contents).map_err(|err| match err {
            BoltzError::Serde(info) => {
                BoltzError::Serde(info.with_context("path", path.display().to_string()))
            }
            other => other,
        })
    }

    /// Checks every parameter that would otherwise fail mid-run.
    pub fn validate(&self) -> Result<(), BoltzError> {
        if self.particle_pair_count == 0 {
            return Err(BoltzError::config(
                "empty-state",
                "at least one particle pair is required",
                "particle_pair_count",
                self.particle_pair_count,
            ));
        }
        if self.replicate_count == 0 {
            return Err(BoltzError::config(
                "replicate-count",
                "at least one replicate is required",
                "replicate_count",
                self.replicate_count,
            ));
        }
        if self.workers == Some(0) {
            return Err(BoltzError::config(
                "workers",
                "worker pool needs at least one thread",
                "workers",
                0,
            ));
        }
        self.chain_settings().validate()?;
        match &self.sweep {
            Some(sweep) => {
                sweep.validate()?;
                for beta in sweep.betas() {
                    proposal::validate_geometry(sweep.scale.scale_at(beta), self.box_length)?;
                }
            }
            None => {
                validate_beta(self.beta)?;
                proposal::validate_geometry(self.proposal_scale, self.box_length)?;
            }
        }
        Ok(())
    }

    /// Chain budget derived from the configuration.
    pub fn chain_settings(&self) -> ChainSettings {
        ChainSettings {
            burn_in: self.burn_in,
            sample_count: self.sample_count,
            thinning: self.thinning,
        }
    }

    /// Total number of particles per ensemble.
    pub fn particle_count(&self) -> usize {
        2 * self.particle_pair_count
    }

    /// Number of worker threads used for a batch of replicates.
    pub fn worker_count(&self) -> usize {
        self.workers
            .unwrap_or(self.replicate_count)
            .min(self.replicate_count)
            .max(1)
    }
}

/// Fails unless `beta` is finite and non-negative.
pub fn validate_beta(beta: f64) -> Result<(), BoltzError> {
    if beta.is_finite() && beta >= 0.0 {
        Ok(())
    } else {
        Err(BoltzError::config(
            "beta",
            "inverse temperature must be finite and non-negative",
            "beta",
            beta,
        ))
    }
}

/// Spatial dimension, serialized as the integer `2` or `3`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Dimensions {
    /// Particles in a plane.
    #[default]
    Two,
    /// Particles in space.
    Three,
}

impl Dimensions {
    /// Number of coordinates per particle.
    pub fn count(self) -> usize {
        match self {
            Dimensions::Two => 2,
            Dimensions::Three => 3,
        }
    }
}

impl TryFrom<u8> for Dimensions {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            2 => Ok(Dimensions::Two),
            3 => Ok(Dimensions::Three),
            other => Err(format!("unsupported dimension {other}; expected 2 or 3")),
        }
    }
}

impl From<Dimensions> for u8 {
    fn from(value: Dimensions) -> Self {
        value.count() as u8
    }
}

/// Deterministic seeding configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedPolicy {
    /// Master seed from which every replicate seed is derived.
    #[serde(default = "default_master_seed")]
    pub master_seed: u64,
    /// Optional label recorded in the run manifest.
    #[serde(default)]
    pub label: Option<String>,
}

fn default_master_seed() -> u64 {
    0x05EE_D5EE_DD15_5EED_u64
}

impl Default for SeedPolicy {
    fn default() -> Self {
        Self {
            master_seed: default_master_seed(),
            label: None,
        }
    }
}

/// Output file layout, relative to the run directory chosen by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// CSV file receiving one row per replicate per β.
    #[serde(default = "default_results_filename")]
    pub results_file: PathBuf,
    /// JSON manifest describing the run.
    #[serde(default = "default_manifest_filename")]
    pub manifest_file: PathBuf,
    /// Write raw TSV state snapshots at every thinned sample step.
    #[serde(default)]
    pub trace: bool,
    /// Subdirectory for trace files.
    #[serde(default = "default_trace_dir")]
    pub trace_dir: PathBuf,
}

fn default_results_filename() -> PathBuf {
    PathBuf::from("results.csv")
}

fn default_manifest_filename() -> PathBuf {
    PathBuf::from("manifest.json")
}

fn default_trace_dir() -> PathBuf {
    PathBuf::from("trace")
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            results_file: default_results_filename(),
            manifest_file: default_manifest_filename(),
            trace: false,
            trace_dir: default_trace_dir(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yaml_defaults_fill_missing_fields() {
        let config = RunConfig::from_yaml_str("beta: 300.0\nbox_length: 15.0\n").unwrap();
        assert_eq!(config.beta, 300.0);
        assert_eq!(config.burn_in, 1000);
        assert_eq!(config.thinning, 20);
        assert_eq!(config.replicate_count, 3);
        assert_eq!(config.dimensions, Dimensions::Two);
        assert_eq!(config.potential, PotentialLaw::Coulomb);
        assert_eq!(config.proposal, ProposalLaw::Uniform);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn yaml_selects_laws_and_dimension() {
        let text = "dimensions: 3\npotential: lennard-jones\nproposal: gaussian\n";
        let config = RunConfig::from_yaml_str(text).unwrap();
        assert_eq!(config.dimensions, Dimensions::Three);
        assert_eq!(config.potential, PotentialLaw::LennardJones);
        assert_eq!(config.proposal, ProposalLaw::Gaussian);
        assert!(RunConfig::from_yaml_str("dimensions: 4\n").is_err());
    }

    #[test]
    fn validation_fails_fast() {
        let mut config = RunConfig::default();
        config.particle_pair_count = 0;
        assert_eq!(config.validate().unwrap_err().info().code, "empty-state");

        let mut config = RunConfig::default();
        config.box_length = -1.0;
        assert_eq!(config.validate().unwrap_err().info().code, "box-length");

        let mut config = RunConfig::default();
        config.proposal_scale = config.box_length;
        assert_eq!(config.validate().unwrap_err().info().code, "proposal-scale-box");

        let mut config = RunConfig::default();
        config.thinning = 0;
        assert_eq!(config.validate().unwrap_err().info().code, "thinning");

        let mut config = RunConfig::default();
        config.workers = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn worker_count_is_capped_by_replicates() {
        let mut config = RunConfig::default();
        config.replicate_count = 4;
        assert_eq!(config.worker_count(), 4);
        config.workers = Some(16);
        assert_eq!(config.worker_count(), 4);
        config.workers = Some(2);
        assert_eq!(config.worker_count(), 2);
    }
}
