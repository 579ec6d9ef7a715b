use boltz_core::{BoltzError, PairPotential};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::ensemble::Ensemble;
use crate::observable::Observable;
use crate::proposal::ProposalKernel;
use crate::trace::TraceSink;

/// Step budget of a single chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainSettings {
    /// Steps discarded before sampling starts.
    pub burn_in: usize,
    /// Steps counted towards acceptance and sampled with thinning.
    pub sample_count: usize,
    /// The observable is measured at every sample step that is a multiple of
    /// `thinning`, starting with step zero.
    pub thinning: usize,
}

impl ChainSettings {
    /// Fails when no sample would ever be recorded.
    pub fn validate(&self) -> Result<(), BoltzError> {
        if self.sample_count == 0 {
            return Err(BoltzError::config(
                "sample-count",
                "a chain needs at least one sample step",
                "sample_count",
                self.sample_count,
            ));
        }
        if self.thinning == 0 {
            return Err(BoltzError::config(
                "thinning",
                "thinning interval must be at least one",
                "thinning",
                self.thinning,
            ));
        }
        Ok(())
    }

    /// Number of measurements a chain with these settings records.
    pub fn recorded_samples(&self) -> usize {
        self.sample_count.div_ceil(self.thinning)
    }
}

/// Estimates produced by one completed chain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChainResult {
    /// Accepted sample steps divided by `sample_count`.
    pub acceptance_rate: f64,
    /// Mean of the observable over the thinned samples.
    pub observable_estimate: f64,
    /// Mean total potential energy over the thinned samples.
    pub mean_energy: f64,
    /// Number of thinned samples that entered the means.
    pub samples_recorded: usize,
}

/// Runs burn-in and sampling on `ensemble` and returns the chain estimates.
///
/// When `trace` is supplied it receives a snapshot at every thinned step.
pub fn run_chain<V, P, O, const D: usize>(
    ensemble: &mut Ensemble<V, P, D>,
    settings: &ChainSettings,
    observable: &O,
    mut trace: Option<&mut dyn TraceSink<D>>,
) -> Result<ChainResult, BoltzError>
where
    V: PairPotential,
    P: ProposalKernel,
    O: Observable<D>,
{
    settings.validate()?;

    debug!(
        "burn-in: {} steps at beta={} with {} particles",
        settings.burn_in,
        ensemble.beta(),
        ensemble.len()
    );
    for _ in 0..settings.burn_in {
        ensemble.step();
    }

    let mut accepted = 0usize;
    let mut recorded = 0usize;
    let mut observable_sum = 0.0;
    let mut energy_sum = 0.0;
    for step in 0..settings.sample_count {
        if ensemble.step() {
            accepted += 1;
        }
        if step % settings.thinning == 0 {
            recorded += 1;
            observable_sum += observable.measure(ensemble.state());
            energy_sum += ensemble.total_energy();
            if let Some(sink) = trace.as_deref_mut() {
                sink.record(step, ensemble.state())?;
            }
        }
    }

    let acceptance_rate = accepted as f64 / settings.sample_count as f64;
    if accepted == 0 || accepted == settings.sample_count {
        warn!(
            "acceptance rate {acceptance_rate} at beta={}; the proposal scale is likely mistuned",
            ensemble.beta()
        );
    }
    debug!("sampling finished: {accepted} accepted, {recorded} samples recorded");

    Ok(ChainResult {
        acceptance_rate,
        observable_estimate: observable_sum / recorded as f64,
        mean_energy: energy_sum / recorded as f64,
        samples_recorded: recorded,
    })
}
