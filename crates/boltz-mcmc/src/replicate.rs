use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use boltz_core::errors::ErrorInfo;
use boltz_core::{BoltzError, Particle, RngHandle};
use log::{debug, info};
use rand::Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::chain::{run_chain, ChainResult};
use crate::config::{validate_beta, Dimensions, RunConfig};
use crate::determinism;
use crate::ensemble::Ensemble;
use crate::proposal::Proposal;
use crate::trace::{TraceSink, TsvTrace};

/// Result row for one replicate chain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReplicateRecord {
    /// Inverse temperature of the chain.
    pub beta: f64,
    /// Batch number within the β point (always 0 outside sweeps).
    pub batch: usize,
    /// Replicate index within the batch.
    pub replicate: usize,
    /// Seed that produced both the initial state and the chain.
    pub seed: u64,
    /// Proposal width used by the chain.
    pub proposal_scale: f64,
    /// Fraction of accepted sample steps.
    pub acceptance_rate: f64,
    /// Observable mean over thinned samples.
    pub observable_estimate: f64,
    /// Mean total potential energy over thinned samples.
    pub mean_energy: f64,
}

impl ReplicateRecord {
    fn new(
        beta: f64,
        batch: usize,
        replicate: usize,
        seed: u64,
        proposal_scale: f64,
        result: ChainResult,
    ) -> Self {
        Self {
            beta,
            batch,
            replicate,
            seed,
            proposal_scale,
            acceptance_rate: result.acceptance_rate,
            observable_estimate: result.observable_estimate,
            mean_energy: result.mean_energy,
        }
    }
}

/// Random initial configuration of `pair_count` charge pairs.
///
/// Charges alternate `+1, -1`; every coordinate is uniform in `[-L/2, L/2)`.
pub fn random_state<R: Rng + ?Sized, const D: usize>(
    box_length: f64,
    pair_count: usize,
    rng: &mut R,
) -> Vec<Particle<D>> {
    let half_width = box_length / 2.0;
    let mut state = Vec::with_capacity(2 * pair_count);
    for _ in 0..pair_count {
        for charge in [1.0, -1.0] {
            let mut position = [0.0; D];
            for x in position.iter_mut() {
                *x = rng.gen_range(-half_width..half_width);
            }
            state.push(Particle::new(charge, position));
        }
    }
    state
}

/// Trace file for one replicate; β is written in full so distinct values never
/// share a file.
fn trace_file_name(beta: f64, batch: usize, replicate: usize) -> String {
    format!("trace_beta{beta}_b{batch}_r{replicate}.tsv")
}

/// Runs the configured replicates at the single point `(config.beta, config.proposal_scale)`.
pub fn run_replicates(
    config: &RunConfig,
    trace_dir: Option<&Path>,
) -> Result<Vec<ReplicateRecord>, BoltzError> {
    run_point(config, config.beta, config.proposal_scale, 0, trace_dir)
}

/// Runs `config.replicate_count` independent chains at `beta` in parallel.
///
/// Each replicate derives its own seed, initial state and ensemble inside its
/// worker; nothing mutable is shared. Records come back ordered by replicate
/// index. The first failing replicate, including one whose worker panicked,
/// fails the whole point so no row is silently dropped.
pub fn run_point(
    config: &RunConfig,
    beta: f64,
    proposal_scale: f64,
    batch: usize,
    trace_dir: Option<&Path>,
) -> Result<Vec<ReplicateRecord>, BoltzError> {
    config.chain_settings().validate()?;
    validate_beta(beta)?;
    if config.particle_pair_count == 0 {
        return Err(BoltzError::config(
            "empty-state",
            "at least one particle pair is required",
            "particle_pair_count",
            0,
        ));
    }
    let proposal = config.proposal.build(proposal_scale, config.box_length)?;
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.worker_count())
        .build()
        .map_err(|err| {
            BoltzError::Replicate(
                ErrorInfo::new("thread-pool", err.to_string())
                    .with_context("workers", config.worker_count().to_string()),
            )
        })?;

    info!(
        "beta={beta}: launching {} replicates (batch {batch}, scale {proposal_scale}, {} workers)",
        config.replicate_count,
        config.worker_count()
    );

    let outcomes: Vec<Result<ReplicateRecord, BoltzError>> = pool.install(|| {
        (0..config.replicate_count)
            .into_par_iter()
            .map(|replicate| {
                let job = ReplicateJob {
                    config,
                    proposal: &proposal,
                    beta,
                    batch,
                    replicate,
                    trace_dir,
                };
                job.execute(ReplicateJob::run)
            })
            .collect()
    });

    outcomes.into_iter().collect()
}

struct ReplicateJob<'a> {
    config: &'a RunConfig,
    proposal: &'a Proposal,
    beta: f64,
    batch: usize,
    replicate: usize,
    trace_dir: Option<&'a Path>,
}

impl ReplicateJob<'_> {
    /// Runs `body`, turning an error or a panic into a `Replicate` error
    /// tagged with this job's coordinates.
    fn execute<F>(&self, body: F) -> Result<ReplicateRecord, BoltzError>
    where
        F: FnOnce(&Self) -> Result<ReplicateRecord, BoltzError>,
    {
        panic::catch_unwind(AssertUnwindSafe(|| body(self)))
            .unwrap_or_else(|payload| Err(self.panicked(payload)))
            .map_err(|err| self.failed(err))
    }

    fn run(&self) -> Result<ReplicateRecord, BoltzError> {
        match self.config.dimensions {
            Dimensions::Two => self.run_in::<2>(),
            Dimensions::Three => self.run_in::<3>(),
        }
    }

    fn run_in<const D: usize>(&self) -> Result<ReplicateRecord, BoltzError> {
        let seed = determinism::replicate_seed(
            self.config.seed_policy.master_seed,
            self.beta,
            self.batch,
            self.replicate,
        );
        let mut rng = RngHandle::from_seed(seed);
        let initial = random_state::<_, D>(
            self.config.box_length,
            self.config.particle_pair_count,
            &mut rng,
        );
        let mut ensemble = Ensemble::new(
            initial,
            self.beta,
            self.config.potential,
            self.proposal.clone(),
            rng,
        )?;

        let mut trace = match self.trace_dir {
            Some(dir) => Some(TsvTrace::create(&dir.join(trace_file_name(
                self.beta,
                self.batch,
                self.replicate,
            )))?),
            None => None,
        };
        let result = run_chain(
            &mut ensemble,
            &self.config.chain_settings(),
            &self.config.observable,
            trace.as_mut().map(|sink| sink as &mut dyn TraceSink<D>),
        )?;
        if let Some(sink) = trace.as_mut() {
            sink.flush()?;
            debug!("trace written to {}", sink.path().display());
        }

        info!(
            "beta={} replicate {}: acceptance {:.4}, observable {:.6}",
            self.beta, self.replicate, result.acceptance_rate, result.observable_estimate
        );
        Ok(ReplicateRecord::new(
            self.beta,
            self.batch,
            self.replicate,
            seed,
            self.proposal_scale(),
            result,
        ))
    }

    fn proposal_scale(&self) -> f64 {
        match self.proposal {
            Proposal::Uniform(kernel) => kernel.delta(),
            Proposal::Gaussian(kernel) => kernel.sigma(),
        }
    }

    fn panicked(&self, payload: Box<dyn std::any::Any + Send>) -> BoltzError {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "replicate worker panicked".to_string());
        BoltzError::Replicate(ErrorInfo::new("replicate-panic", message))
    }

    fn failed(&self, err: BoltzError) -> BoltzError {
        let info = match err {
            BoltzError::Replicate(info) => info,
            other => ErrorInfo::new("replicate-failed", other.to_string()),
        };
        BoltzError::Replicate(
            info.with_context("beta", self.beta.to_string())
                .with_context("batch", self.batch.to_string())
                .with_context("replicate", self.replicate.to_string()),
        )
    }
}
