use boltz_core::{BoltzError, ErrorInfo};
use serde::{Deserialize, Serialize};

/// Piecewise-linear map from β to a tuned proposal width.
///
/// Below the first knot the first width is used, beyond the last knot the
/// last width. The raw Coulomb tuning table instead fell back to its last
/// width (0.11) below its range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<(f64, f64)>", into = "Vec<(f64, f64)>")]
pub struct GaugeCurve {
    knots: Vec<(f64, f64)>,
}

impl GaugeCurve {
    /// Builds a curve from `(beta, scale)` knots with strictly increasing β.
    pub fn new(knots: Vec<(f64, f64)>) -> Result<Self, BoltzError> {
        if knots.is_empty() {
            return Err(BoltzError::Config(ErrorInfo::new(
                "gauge-empty",
                "gauge curve needs at least one knot",
            )));
        }
        for window in knots.windows(2) {
            if let [(beta_a, _), (beta_b, _)] = window {
                if beta_b <= beta_a {
                    return Err(BoltzError::Config(
                        ErrorInfo::new("gauge-order", "gauge knots must have increasing beta")
                            .with_context("beta", beta_b.to_string()),
                    ));
                }
            }
        }
        if let Some((beta, scale)) = knots
            .iter()
            .find(|(beta, scale)| !beta.is_finite() || !scale.is_finite() || *scale <= 0.0)
        {
            return Err(BoltzError::Config(
                ErrorInfo::new("gauge-knot", "gauge knots must be finite with positive scale")
                    .with_context("beta", beta.to_string())
                    .with_context("scale", scale.to_string()),
            ));
        }
        Ok(Self { knots })
    }

    /// Proposal width for `beta`.
    pub fn scale_at(&self, beta: f64) -> f64 {
        let first = self.knots[0];
        if beta < first.0 {
            return first.1;
        }
        for window in self.knots.windows(2) {
            if let [(b0, s0), (b1, s1)] = *window {
                if beta < b1 {
                    return s0 + (s1 - s0) / (b1 - b0) * (beta - b0);
                }
            }
        }
        self.knots[self.knots.len() - 1].1
    }

    /// Uniform-proposal widths for 3D screened Coulomb in a box of side 8.
    pub fn coulomb_uniform() -> Self {
        Self {
            knots: vec![
                (1.0, 2.0),
                (5.0, 2.0),
                (10.0, 1.4),
                (20.0, 0.8),
                (40.0, 0.48),
                (80.0, 0.3),
                (160.0, 0.2),
                (220.0, 0.16),
                (380.0, 0.125),
                (500.0, 0.11),
            ],
        }
    }

    /// Uniform-proposal widths for 3D Lennard-Jones in a box of side 5.
    pub fn lennard_jones_uniform() -> Self {
        Self {
            knots: vec![
                (0.1, 2.0),
                (1.0, 1.8),
                (5.0, 0.3),
                (10.0, 0.15),
                (20.0, 0.09),
                (40.0, 0.06),
                (60.0, 0.05),
                (100.0, 0.038),
            ],
        }
    }
}

impl TryFrom<Vec<(f64, f64)>> for GaugeCurve {
    type Error = BoltzError;

    fn try_from(knots: Vec<(f64, f64)>) -> Result<Self, Self::Error> {
        Self::new(knots)
    }
}

impl From<GaugeCurve> for Vec<(f64, f64)> {
    fn from(curve: GaugeCurve) -> Self {
        curve.knots
    }
}

/// Named gauge curves shipped with the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GaugePreset {
    /// [`GaugeCurve::coulomb_uniform`].
    CoulombUniform,
    /// [`GaugeCurve::lennard_jones_uniform`].
    LennardJonesUniform,
}

impl GaugePreset {
    /// Materialises the preset curve.
    pub fn curve(self) -> GaugeCurve {
        match self {
            GaugePreset::CoulombUniform => GaugeCurve::coulomb_uniform(),
            GaugePreset::LennardJonesUniform => GaugeCurve::lennard_jones_uniform(),
        }
    }
}

/// Source of the proposal width for a given β.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ScaleSchedule {
    /// The same width for every β.
    Fixed {
        /// Proposal width.
        scale: f64,
    },
    /// A built-in gauge curve.
    Preset {
        /// Curve name.
        preset: GaugePreset,
    },
    /// User supplied `(beta, scale)` knots.
    Curve {
        /// Curve knots.
        knots: GaugeCurve,
    },
}

impl ScaleSchedule {
    /// Proposal width for `beta`.
    pub fn scale_at(&self, beta: f64) -> f64 {
        match self {
            ScaleSchedule::Fixed { scale } => *scale,
            ScaleSchedule::Preset { preset } => preset.curve().scale_at(beta),
            ScaleSchedule::Curve { knots } => knots.scale_at(beta),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coulomb_curve_interpolates_and_clamps() {
        let curve = GaugeCurve::coulomb_uniform();
        assert_eq!(curve.scale_at(0.5), 2.0);
        assert_eq!(curve.scale_at(3.0), 2.0);
        assert!((curve.scale_at(7.5) - 1.7).abs() < 1e-12);
        assert!((curve.scale_at(300.0) - 0.1425).abs() < 1e-12);
        assert_eq!(curve.scale_at(10_000.0), 0.11);
    }

    #[test]
    fn lennard_jones_curve_matches_knots() {
        let curve = GaugeCurve::lennard_jones_uniform();
        assert!((curve.scale_at(1.0) - 1.8).abs() < 1e-12);
        assert!((curve.scale_at(50.0) - 0.055).abs() < 1e-12);
        assert_eq!(curve.scale_at(0.01), 2.0);
    }

    #[test]
    fn rejects_unsorted_or_empty_knots() {
        assert!(GaugeCurve::new(Vec::new()).is_err());
        assert!(GaugeCurve::new(vec![(2.0, 0.1), (1.0, 0.2)]).is_err());
        assert!(GaugeCurve::new(vec![(1.0, 0.0)]).is_err());
    }

    #[test]
    fn schedule_parses_from_yaml() {
        let fixed: ScaleSchedule = serde_yaml::from_str("type: fixed\nscale: 0.25\n").unwrap();
        assert_eq!(fixed.scale_at(42.0), 0.25);
        let preset: ScaleSchedule =
            serde_yaml::from_str("type: preset\npreset: coulomb-uniform\n").unwrap();
        assert_eq!(preset.scale_at(1.0), 2.0);
        let custom: ScaleSchedule =
            serde_yaml::from_str("type: curve\nknots: [[1.0, 1.0], [3.0, 0.5]]\n").unwrap();
        assert!((custom.scale_at(2.0) - 0.75).abs() < 1e-12);
        assert!(serde_yaml::from_str::<ScaleSchedule>("type: curve\nknots: []\n").is_err());
    }
}
