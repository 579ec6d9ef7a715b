#![deny(missing_docs)]

//! Metropolis sampler for canonical ensembles of charged particles in a box.

/// Burn-in and thinned sampling of a single chain.
pub mod chain;
/// YAML configuration schema and defaults.
pub mod config;
/// Deterministic seed derivation helpers.
pub mod determinism;
/// Single-particle Metropolis steps with local energy updates.
pub mod ensemble;
/// β-dependent proposal widths.
pub mod gauge;
/// Run manifest serialization helpers.
pub mod manifest;
/// Observables estimated along a chain.
pub mod observable;
/// CSV results writer.
pub mod output;
/// Box-confined proposal kernels.
pub mod proposal;
/// Parallel replicate orchestration.
pub mod replicate;
/// Geometric β sweeps.
pub mod sweep;
/// Raw state snapshots.
pub mod trace;

pub use chain::{run_chain, ChainResult, ChainSettings};
pub use config::{Dimensions, OutputConfig, RunConfig, SeedPolicy};
pub use ensemble::{acceptance_ratio, Ensemble, StepOutcome};
pub use gauge::{GaugeCurve, GaugePreset, ScaleSchedule};
pub use manifest::RunManifest;
pub use observable::{AveragePairDistance, Observable, ObservableKind};
pub use output::{read_results, ResultsWriter};
pub use proposal::{Proposal, ProposalKernel, ProposalLaw, TruncatedGaussian, UniformBox};
pub use replicate::{random_state, run_point, run_replicates, ReplicateRecord};
pub use sweep::{run_sweep, SweepConfig};
pub use trace::{read_tsv_trace, MemoryTrace, Snapshot, TraceSink, TsvTrace};
