//! Point particles carrying a charge and a position in `D` dimensions.

/// A charged point particle in `D`-dimensional space.
///
/// Particles are plain `Copy` values: moving a particle means replacing it
/// with a new value, never mutating it in place.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle<const D: usize> {
    charge: f64,
    position: [f64; D],
}

/// Particle confined to a plane.
pub type Particle2D = Particle<2>;
/// Particle in three-dimensional space.
pub type Particle3D = Particle<3>;

impl<const D: usize> Particle<D> {
    /// Creates a particle with the given charge and position.
    pub const fn new(charge: f64, position: [f64; D]) -> Self {
        Self { charge, position }
    }

    /// Electric charge carried by the particle.
    pub fn charge(&self) -> f64 {
        self.charge
    }

    /// Cartesian coordinates of the particle.
    pub fn position(&self) -> &[f64; D] {
        &self.position
    }

    /// Returns a copy of this particle moved to `position`.
    pub fn with_position(&self, position: [f64; D]) -> Self {
        Self {
            charge: self.charge,
            position,
        }
    }

    /// Squared Euclidean separation from `other`.
    pub fn distance_squared(&self, other: &Self) -> f64 {
        self.position
            .iter()
            .zip(other.position.iter())
            .map(|(a, b)| (a - b) * (a - b))
            .sum()
    }

    /// Euclidean separation from `other`.
    pub fn distance(&self, other: &Self) -> f64 {
        self.distance_squared(other).sqrt()
    }

    /// True when every coordinate lies in `[-half_width, half_width]`.
    pub fn is_inside_box(&self, half_width: f64) -> bool {
        self.position
            .iter()
            .all(|&x| (-half_width..=half_width).contains(&x))
    }

    /// Bitwise equality, distinguishing `0.0` from `-0.0` and matching NaNs.
    pub fn bit_identical(&self, other: &Self) -> bool {
        self.charge.to_bits() == other.charge.to_bits()
            && self
                .position
                .iter()
                .zip(other.position.iter())
                .all(|(a, b)| a.to_bits() == b.to_bits())
    }
}
