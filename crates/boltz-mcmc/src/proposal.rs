use boltz_core::{BoltzError, ErrorInfo, Particle};
use rand::distributions::{Distribution, Uniform};
use rand::Rng;
use rand_distr::Normal;
use serde::{Deserialize, Serialize};

/// Symmetric single-particle displacement confined to a cubic box.
///
/// Kernels hold only immutable parameters; all randomness comes from the
/// caller's RNG, so one kernel value may be shared between chains.
pub trait ProposalKernel: Send + Sync {
    /// Draws a replacement for `current`; the charge is preserved.
    ///
    /// `current` must already lie inside the box, otherwise the per-axis
    /// rejection loop may never terminate.
    fn propose<R: Rng + ?Sized, const D: usize>(
        &self,
        current: &Particle<D>,
        rng: &mut R,
    ) -> Particle<D>;

    /// Side length `L` of the box `[-L/2, L/2]^D`.
    fn box_length(&self) -> f64;
}

/// Uniform step `U(-δ, δ)` per axis, resampled until inside the box.
#[derive(Debug, Clone)]
pub struct UniformBox {
    delta: f64,
    half_width: f64,
    step: Uniform<f64>,
}

impl UniformBox {
    /// Builds the kernel for step width `delta` in a box of side `box_length`.
    pub fn new(delta: f64, box_length: f64) -> Result<Self, BoltzError> {
        let half_width = validate_geometry(delta, box_length)?;
        Ok(Self {
            delta,
            half_width,
            step: Uniform::new(-delta, delta),
        })
    }

    /// Maximum displacement per axis.
    pub fn delta(&self) -> f64 {
        self.delta
    }
}

impl ProposalKernel for UniformBox {
    fn propose<R: Rng + ?Sized, const D: usize>(
        &self,
        current: &Particle<D>,
        rng: &mut R,
    ) -> Particle<D> {
        let mut position = *current.position();
        for x in position.iter_mut() {
            *x = resample_axis(*x, self.half_width, || self.step.sample(&mut *rng));
        }
        current.with_position(position)
    }

    fn box_length(&self) -> f64 {
        2.0 * self.half_width
    }
}

/// Gaussian step `N(0, σ)` per axis, truncated to the box by rejection.
#[derive(Debug, Clone)]
pub struct TruncatedGaussian {
    sigma: f64,
    half_width: f64,
    step: Normal<f64>,
}

impl TruncatedGaussian {
    /// Builds the kernel for standard deviation `sigma` in a box of side `box_length`.
    pub fn new(sigma: f64, box_length: f64) -> Result<Self, BoltzError> {
        let half_width = validate_geometry(sigma, box_length)?;
        let step = Normal::new(0.0, sigma).map_err(|err| {
            BoltzError::config("proposal-normal", err.to_string(), "proposal_scale", sigma)
        })?;
        Ok(Self {
            sigma,
            half_width,
            step,
        })
    }

    /// Standard deviation of the untruncated step.
    pub fn sigma(&self) -> f64 {
        self.sigma
    }
}

impl ProposalKernel for TruncatedGaussian {
    fn propose<R: Rng + ?Sized, const D: usize>(
        &self,
        current: &Particle<D>,
        rng: &mut R,
    ) -> Particle<D> {
        let mut position = *current.position();
        for x in position.iter_mut() {
            *x = resample_axis(*x, self.half_width, || self.step.sample(&mut *rng));
        }
        current.with_position(position)
    }

    fn box_length(&self) -> f64 {
        2.0 * self.half_width
    }
}

/// Configuration tag selecting a proposal family.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProposalLaw {
    /// [`UniformBox`].
    #[default]
    Uniform,
    /// [`TruncatedGaussian`].
    Gaussian,
}

impl ProposalLaw {
    /// Builds the kernel for this family with the given width and box.
    pub fn build(self, scale: f64, box_length: f64) -> Result<Proposal, BoltzError> {
        match self {
            ProposalLaw::Uniform => UniformBox::new(scale, box_length).map(Proposal::Uniform),
            ProposalLaw::Gaussian => {
                TruncatedGaussian::new(scale, box_length).map(Proposal::Gaussian)
            }
        }
    }

    /// Stable label used in manifests and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProposalLaw::Uniform => "uniform",
            ProposalLaw::Gaussian => "gaussian",
        }
    }
}

/// A built proposal kernel of either family.
#[derive(Debug, Clone)]
pub enum Proposal {
    /// Uniform-box steps.
    Uniform(UniformBox),
    /// Truncated Gaussian steps.
    Gaussian(TruncatedGaussian),
}

impl ProposalKernel for Proposal {
    fn propose<R: Rng + ?Sized, const D: usize>(
        &self,
        current: &Particle<D>,
        rng: &mut R,
    ) -> Particle<D> {
        match self {
            Proposal::Uniform(kernel) => kernel.propose(current, rng),
            Proposal::Gaussian(kernel) => kernel.propose(current, rng),
        }
    }

    fn box_length(&self) -> f64 {
        match self {
            Proposal::Uniform(kernel) => kernel.box_length(),
            Proposal::Gaussian(kernel) => kernel.box_length(),
        }
    }
}

fn resample_axis(x: f64, half_width: f64, mut draw: impl FnMut() -> f64) -> f64 {
    loop {
        let candidate = x + draw();
        if (-half_width..=half_width).contains(&candidate) {
            return candidate;
        }
    }
}

/// Checks `(scale, box_length)` and returns the half width `L/2`.
pub fn validate_geometry(scale: f64, box_length: f64) -> Result<f64, BoltzError> {
    if !box_length.is_finite() || box_length <= 0.0 {
        return Err(BoltzError::config(
            "box-length",
            "box length must be positive and finite",
            "box_length",
            box_length,
        ));
    }
    if !scale.is_finite() || scale <= 0.0 {
        return Err(BoltzError::config(
            "proposal-scale",
            "proposal scale must be positive and finite",
            "proposal_scale",
            scale,
        ));
    }
    if scale >= box_length {
        return Err(BoltzError::Config(
            ErrorInfo::new(
                "proposal-scale-box",
                "proposal scale must be smaller than the box length",
            )
            .with_context("proposal_scale", scale.to_string())
            .with_context("box_length", box_length.to_string())
            .with_hint("use a gauge curve or a scale well below the box length"),
        ));
    }
    Ok(box_length / 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use boltz_core::{Particle2D, RngHandle};

    #[test]
    fn rejects_scale_not_below_box() {
        let err = UniformBox::new(5.0, 5.0).unwrap_err();
        assert_eq!(err.info().code, "proposal-scale-box");
        assert!(TruncatedGaussian::new(0.5, 0.0).is_err());
        assert!(ProposalLaw::Gaussian.build(-0.1, 4.0).is_err());
    }

    #[test]
    fn charge_is_preserved() {
        let kernel = ProposalLaw::Gaussian.build(0.3, 4.0).unwrap();
        let mut rng = RngHandle::from_seed(5);
        let p = Particle2D::new(-1.0, [0.0, 0.0]);
        assert_eq!(kernel.propose(&p, &mut rng).charge(), -1.0);
    }

    #[test]
    fn uniform_steps_stay_within_delta() {
        let kernel = UniformBox::new(0.25, 10.0).unwrap();
        let mut rng = RngHandle::from_seed(17);
        let p = Particle2D::new(1.0, [1.0, -1.0]);
        for _ in 0..1000 {
            let q = kernel.propose(&p, &mut rng);
            for (a, b) in q.position().iter().zip(p.position()) {
                assert!((a - b).abs() <= 0.25);
            }
        }
    }
}
