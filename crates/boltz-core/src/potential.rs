//! Pairwise potential laws and the energy sums built on top of them.

use serde::{Deserialize, Serialize};

use crate::particle::Particle;

/// Symmetric pair interaction `V(a, b)`.
///
/// Implementations must be pure: `V(a, b) == V(b, a)`, finite whenever the
/// particles do not coincide, and free of interior mutability so a single
/// value can be shared by every replicate worker.
pub trait PairPotential: Send + Sync {
    /// Interaction energy between `a` and `b`.
    fn evaluate<const D: usize>(&self, a: &Particle<D>, b: &Particle<D>) -> f64;
}

/// Coulomb interaction with a soft `r^-8` repulsive core.
///
/// `V(r) = q_a q_b / r + r^-8`. The core term keeps opposite charges from
/// collapsing onto each other; the minimum for `q_a q_b = -1` sits at
/// `r = 8^(1/7)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScreenedCoulomb;

impl PairPotential for ScreenedCoulomb {
    fn evaluate<const D: usize>(&self, a: &Particle<D>, b: &Particle<D>) -> f64 {
        let r = a.distance(b);
        a.charge() * b.charge() / r + r.powi(-8)
    }
}

/// Lennard-Jones 12-6 potential with unit well parameters, `r^-12 - r^-6`.
///
/// Charges are ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LennardJones;

impl PairPotential for LennardJones {
    fn evaluate<const D: usize>(&self, a: &Particle<D>, b: &Particle<D>) -> f64 {
        let inv_r6 = a.distance_squared(b).powi(-3);
        inv_r6 * inv_r6 - inv_r6
    }
}

/// Configuration tag selecting one of the built-in laws.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PotentialLaw {
    /// [`ScreenedCoulomb`].
    #[default]
    Coulomb,
    /// [`LennardJones`].
    LennardJones,
}

impl PotentialLaw {
    /// Stable label used in manifests and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            PotentialLaw::Coulomb => "coulomb",
            PotentialLaw::LennardJones => "lennard-jones",
        }
    }
}

impl PairPotential for PotentialLaw {
    fn evaluate<const D: usize>(&self, a: &Particle<D>, b: &Particle<D>) -> f64 {
        match self {
            PotentialLaw::Coulomb => ScreenedCoulomb.evaluate(a, b),
            PotentialLaw::LennardJones => LennardJones.evaluate(a, b),
        }
    }
}

/// Full Hamiltonian `Σ_{i<j} V(x_i, x_j)`; O(N²).
pub fn total_energy<V: PairPotential, const D: usize>(state: &[Particle<D>], potential: &V) -> f64 {
    let mut energy = 0.0;
    for (i, a) in state.iter().enumerate() {
        for b in &state[..i] {
            energy += potential.evaluate(a, b);
        }
    }
    energy
}

/// Energy of `candidate` placed in slot `index` against every other particle.
///
/// Slot `index` itself is skipped, so the same `N-1` pairs are summed whether
/// `candidate` is the current occupant or a proposed replacement.
pub fn local_energy<V: PairPotential, const D: usize>(
    state: &[Particle<D>],
    index: usize,
    candidate: &Particle<D>,
    potential: &V,
) -> f64 {
    state
        .iter()
        .enumerate()
        .filter(|(j, _)| *j != index)
        .map(|(_, other)| potential.evaluate(candidate, other))
        .sum()
}
