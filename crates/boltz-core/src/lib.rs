#![deny(missing_docs)]
#![doc = "Core types for the boltz canonical-ensemble sampler: particles, pair potentials, errors and deterministic seeding."]

pub mod errors;
pub mod particle;
pub mod potential;
pub mod rng;

pub use errors::{BoltzError, ErrorInfo};
pub use particle::{Particle, Particle2D, Particle3D};
pub use potential::{
    local_energy, total_energy, LennardJones, PairPotential, PotentialLaw, ScreenedCoulomb,
};
pub use rng::{derive_substream_seed, RngHandle};
