use boltz_core::derive_substream_seed;

/// Derives the seed for one `(beta, batch)` point of a run.
///
/// The master seed, β bits and batch enter as separate hash layers.
pub fn point_seed(master_seed: u64, beta: f64, batch: usize) -> u64 {
    let beta_seed = derive_substream_seed(master_seed, beta.to_bits());
    derive_substream_seed(beta_seed, batch as u64)
}

/// Derives the seed driving both the initial state and the chain of a replicate.
pub fn replicate_seed(master_seed: u64, beta: f64, batch: usize, replicate: usize) -> u64 {
    derive_substream_seed(point_seed(master_seed, beta, batch), replicate as u64)
}
