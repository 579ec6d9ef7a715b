use boltz_core::Particle;
use serde::{Deserialize, Serialize};

/// Scalar measured on a particle configuration.
pub trait Observable<const D: usize>: Send + Sync {
    /// Evaluates the observable on `state`.
    fn measure(&self, state: &[Particle<D>]) -> f64;
}

/// Mean separation over all unordered pairs, `2/(N(N-1)) Σ_{i<j} |x_i - x_j|`.
///
/// Returns zero for fewer than two particles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AveragePairDistance;

impl<const D: usize> Observable<D> for AveragePairDistance {
    fn measure(&self, state: &[Particle<D>]) -> f64 {
        let n = state.len();
        if n < 2 {
            return 0.0;
        }
        let mut sum = 0.0;
        for (i, a) in state.iter().enumerate() {
            for b in &state[..i] {
                sum += a.distance(b);
            }
        }
        2.0 * sum / (n * (n - 1)) as f64
    }
}

/// Configuration tag selecting the recorded observable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ObservableKind {
    /// [`AveragePairDistance`].
    #[default]
    PairDistance,
}

impl<const D: usize> Observable<D> for ObservableKind {
    fn measure(&self, state: &[Particle<D>]) -> f64 {
        match self {
            ObservableKind::PairDistance => AveragePairDistance.measure(state),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boltz_core::Particle2D;

    #[test]
    fn unit_square_average() {
        let state = [
            Particle2D::new(1.0, [0.0, 0.0]),
            Particle2D::new(1.0, [1.0, 0.0]),
            Particle2D::new(1.0, [1.0, 1.0]),
            Particle2D::new(1.0, [0.0, 1.0]),
        ];
        let expected = (4.0 + 2.0 * 2f64.sqrt()) / 6.0;
        assert!((AveragePairDistance.measure(&state[..]) - expected).abs() < 1e-12);
    }

    #[test]
    fn degenerate_states_measure_zero() {
        let single = [Particle2D::new(1.0, [3.0, 3.0])];
        assert_eq!(ObservableKind::PairDistance.measure(&single[..]), 0.0);
        let empty: [Particle2D; 0] = [];
        assert_eq!(AveragePairDistance.measure(&empty[..]), 0.0);
    }
}
