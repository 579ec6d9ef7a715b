use boltz_core::{RngHandle, ScreenedCoulomb};

use boltz_mcmc::{
    random_state, run_chain, AveragePairDistance, ChainSettings, Ensemble, ProposalLaw,
};

fn acceptance_at(beta: f64) -> f64 {
    let mut rng = RngHandle::from_seed(2024);
    let state = random_state::<_, 2>(8.0, 20, &mut rng);
    let kernel = ProposalLaw::Uniform.build(0.5, 8.0).unwrap();
    let mut ensemble = Ensemble::new(state, beta, ScreenedCoulomb, kernel, rng).unwrap();
    let settings = ChainSettings {
        burn_in: 5_000,
        sample_count: 30_000,
        thinning: 50,
    };
    run_chain(&mut ensemble, &settings, &AveragePairDistance, None)
        .unwrap()
        .acceptance_rate
}

#[test]
fn acceptance_falls_as_beta_rises() {
    let rates: Vec<f64> = [0.1, 10.0, 1000.0].into_iter().map(acceptance_at).collect();
    for rate in &rates {
        assert!((0.0..=1.0).contains(rate));
    }
    assert!(
        rates[0] > rates[1] && rates[1] > rates[2],
        "acceptance not strictly decreasing: {rates:?}"
    );
}

#[test]
fn mean_energy_falls_as_beta_rises() {
    let energy_at = |beta: f64| {
        let mut rng = RngHandle::from_seed(99);
        let state = random_state::<_, 2>(8.0, 10, &mut rng);
        let kernel = ProposalLaw::Uniform.build(0.5, 8.0).unwrap();
        let mut ensemble = Ensemble::new(state, beta, ScreenedCoulomb, kernel, rng).unwrap();
        let settings = ChainSettings {
            burn_in: 10_000,
            sample_count: 20_000,
            thinning: 20,
        };
        run_chain(&mut ensemble, &settings, &AveragePairDistance, None)
            .unwrap()
            .mean_energy
    };
    assert!(energy_at(0.1) > energy_at(50.0));
}
