use boltz_core::{LennardJones, Particle, Particle2D, RngHandle, ScreenedCoulomb};
use proptest::prelude::*;

use boltz_mcmc::{Ensemble, ProposalKernel, ProposalLaw, TruncatedGaussian, UniformBox};

fn inside(half_width: f64) -> impl Strategy<Value = [f64; 3]> {
    prop::array::uniform3(-half_width..=half_width)
}

proptest! {
    #[test]
    fn uniform_proposals_stay_in_box(
        position in inside(2.5),
        delta in 0.01f64..4.9,
        seed in any::<u64>(),
    ) {
        let kernel = UniformBox::new(delta, 5.0).unwrap();
        let mut rng = RngHandle::from_seed(seed);
        let current = Particle::new(-1.0, position);
        for _ in 0..16 {
            let moved = kernel.propose(&current, &mut rng);
            prop_assert!(moved.is_inside_box(2.5));
            prop_assert_eq!(moved.charge(), -1.0);
            for (a, b) in moved.position().iter().zip(current.position()) {
                prop_assert!((a - b).abs() <= delta + 1e-12);
            }
        }
    }

    #[test]
    fn gaussian_proposals_stay_in_box(
        position in inside(4.0),
        sigma in 0.01f64..7.9,
        seed in any::<u64>(),
    ) {
        let kernel = TruncatedGaussian::new(sigma, 8.0).unwrap();
        let mut rng = RngHandle::from_seed(seed);
        let current = Particle::new(1.0, position);
        for _ in 0..16 {
            let moved = kernel.propose(&current, &mut rng);
            prop_assert!(moved.is_inside_box(4.0));
            prop_assert_eq!(moved.charge(), 1.0);
        }
    }
}

#[test]
fn particles_on_the_wall_can_still_move() {
    let kernel = UniformBox::new(0.2, 2.0).unwrap();
    let mut rng = RngHandle::from_seed(3);
    let corner = Particle2D::new(1.0, [1.0, -1.0]);
    for _ in 0..1000 {
        let moved = kernel.propose(&corner, &mut rng);
        assert!(moved.is_inside_box(1.0));
        assert!(moved.position()[0] <= 1.0 && moved.position()[0] >= 0.8);
        assert!(moved.position()[1] >= -1.0 && moved.position()[1] <= -0.8);
    }
}

#[test]
fn long_chains_never_leave_the_box() {
    for law in [ProposalLaw::Uniform, ProposalLaw::Gaussian] {
        let kernel = law.build(1.5, 3.0).unwrap();
        let state = vec![
            Particle2D::new(1.0, [1.4, 1.4]),
            Particle2D::new(-1.0, [-1.4, -1.4]),
            Particle2D::new(1.0, [0.0, 1.0]),
            Particle2D::new(-1.0, [0.5, -0.5]),
        ];
        let mut ensemble =
            Ensemble::new(state, 0.5, LennardJones, kernel, RngHandle::from_seed(11)).unwrap();
        for _ in 0..20_000 {
            ensemble.step();
        }
        assert!(ensemble.state().iter().all(|p| p.is_inside_box(1.5)));
    }
}

#[test]
fn oversized_scale_is_rejected_at_construction() {
    let err = UniformBox::new(8.0, 8.0).unwrap_err();
    assert_eq!(err.info().code, "proposal-scale-box");
    assert!(err.info().hint.is_some());
    assert!(TruncatedGaussian::new(0.0, 8.0).is_err());
    assert!(ProposalLaw::Gaussian.build(0.5, f64::NAN).is_err());

    let kernel = UniformBox::new(0.1, 8.0).unwrap();
    assert!(Ensemble::<_, _, 2>::new(
        Vec::new(),
        1.0,
        ScreenedCoulomb,
        kernel,
        RngHandle::from_seed(1)
    )
    .is_err());
}
