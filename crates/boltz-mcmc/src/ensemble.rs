use boltz_core::{
    local_energy, total_energy, BoltzError, PairPotential, Particle, RngHandle,
};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::proposal::ProposalKernel;

/// Record of a single Metropolis step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepOutcome {
    /// Slot of the particle that was moved (or left in place on rejection).
    pub index: usize,
    /// Local energy change `E_new - E_old` of the proposal.
    pub delta_energy: f64,
    /// Uncapped Metropolis ratio `exp(-β ΔE)`.
    pub acceptance_prob: f64,
    /// Whether the proposal replaced the particle.
    pub accepted: bool,
}

/// Metropolis ratio `exp(-β ΔE)`.
///
/// Values above one mean certain acceptance; the comparison `u < ratio`
/// handles that without clamping. Underflow to zero for large uphill moves is
/// the intended outcome.
pub fn acceptance_ratio(beta: f64, delta_energy: f64) -> f64 {
    (-beta * delta_energy).exp()
}

/// Canonical ensemble of `N` particles sampled by single-particle moves.
///
/// The ensemble owns its particles and its RNG stream. It keeps no cached
/// total energy: every step recomputes the O(N) local energy of the chosen
/// particle before and after the move, which is exactly the part of the
/// pairwise Hamiltonian that can change.
#[derive(Debug, Clone)]
pub struct Ensemble<V, P, const D: usize> {
    state: Vec<Particle<D>>,
    beta: f64,
    potential: V,
    proposal: P,
    rng: RngHandle,
}

impl<V, P, const D: usize> Ensemble<V, P, D>
where
    V: PairPotential,
    P: ProposalKernel,
{
    /// Creates an ensemble in its ready state.
    ///
    /// Fails when `initial_state` is empty or `beta` is negative or not finite.
    pub fn new(
        initial_state: Vec<Particle<D>>,
        beta: f64,
        potential: V,
        proposal: P,
        rng: RngHandle,
    ) -> Result<Self, BoltzError> {
        if initial_state.is_empty() {
            return Err(BoltzError::config(
                "empty-state",
                "ensemble needs at least one particle",
                "particle_count",
                0,
            ));
        }
        if !beta.is_finite() || beta < 0.0 {
            return Err(BoltzError::config(
                "beta",
                "inverse temperature must be finite and non-negative",
                "beta",
                beta,
            ));
        }
        Ok(Self {
            state: initial_state,
            beta,
            potential,
            proposal,
            rng,
        })
    }

    /// Performs one Metropolis step and reports whether it was accepted.
    pub fn step(&mut self) -> bool {
        self.step_with_outcome().accepted
    }

    /// Performs one Metropolis step and returns its full record.
    pub fn step_with_outcome(&mut self) -> StepOutcome {
        let index = self.rng.gen_range(0..self.state.len());
        let saved = self.state[index];
        let e_old = local_energy(&self.state, index, &saved, &self.potential);

        let proposed = self.proposal.propose(&saved, &mut self.rng);
        self.state[index] = proposed;
        let e_new = local_energy(&self.state, index, &proposed, &self.potential);

        let delta_energy = e_new - e_old;
        let acceptance_prob = acceptance_ratio(self.beta, delta_energy);
        let accepted = self.rng.gen::<f64>() < acceptance_prob;
        if !accepted {
            self.state[index] = saved;
        }

        StepOutcome {
            index,
            delta_energy,
            acceptance_prob,
            accepted,
        }
    }

    /// Uncapped Metropolis ratio for replacing slot `index` with `candidate`.
    ///
    /// Leaves the ensemble untouched and consumes no randomness.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.len()`.
    pub fn acceptance_ratio(&self, index: usize, candidate: &Particle<D>) -> f64 {
        let e_old = self.local_energy(index);
        let e_new = local_energy(&self.state, index, candidate, &self.potential);
        acceptance_ratio(self.beta, e_new - e_old)
    }

    /// Energy of particle `index` against all other particles.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.len()`.
    pub fn local_energy(&self, index: usize) -> f64 {
        local_energy(&self.state, index, &self.state[index], &self.potential)
    }

    /// Full pairwise Hamiltonian, O(N²).
    pub fn total_energy(&self) -> f64 {
        total_energy(&self.state, &self.potential)
    }

    /// Current particle configuration.
    pub fn state(&self) -> &[Particle<D>] {
        &self.state
    }

    /// Number of particles.
    pub fn len(&self) -> usize {
        self.state.len()
    }

    /// Always false; an ensemble cannot be constructed empty.
    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }

    /// Inverse temperature β.
    pub fn beta(&self) -> f64 {
        self.beta
    }

    /// Pair potential used for energies.
    pub fn potential(&self) -> &V {
        &self.potential
    }
}
