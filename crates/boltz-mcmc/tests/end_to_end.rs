use boltz_core::BoltzError;

use boltz_mcmc::{run_replicates, Dimensions, RunConfig};

fn cold_config() -> RunConfig {
    let mut config = RunConfig::default();
    config.particle_pair_count = 20;
    config.box_length = 15.0;
    config.beta = 300.0;
    config.proposal_scale = 0.1;
    config.sample_count = 100_000;
    config.burn_in = 0;
    config.thinning = 20;
    config.replicate_count = 2;
    config
}

#[test]
fn cold_coulomb_gas_produces_finite_estimates() {
    let config = cold_config();
    config.validate().unwrap();
    let records = run_replicates(&config, None).unwrap();
    assert_eq!(records.len(), 2);

    let max_separation = 15.0 * 2f64.sqrt();
    for record in &records {
        assert_eq!(record.beta, 300.0);
        assert_eq!(record.proposal_scale, 0.1);
        assert!(
            (0.04..=0.55).contains(&record.acceptance_rate),
            "acceptance {} outside the expected band",
            record.acceptance_rate
        );
        assert!(record.observable_estimate.is_finite());
        assert!(record.observable_estimate > 0.0);
        assert!(record.observable_estimate < max_separation);
        assert!(record.mean_energy.is_finite());
    }
}

#[test]
fn three_dimensional_lennard_jones_run_completes() {
    let text = r#"
dimensions: 3
potential: lennard-jones
proposal: gaussian
box_length: 5.0
beta: 5.0
proposal_scale: 0.3
particle_pair_count: 6
sample_count: 4000
burn_in: 500
thinning: 10
replicate_count: 3
workers: 2
"#;
    let config = RunConfig::from_yaml_str(text).unwrap();
    assert_eq!(config.dimensions, Dimensions::Three);
    let records = run_replicates(&config, None).unwrap();
    assert_eq!(
        records.iter().map(|r| r.replicate).collect::<Vec<_>>(),
        vec![0, 1, 2]
    );
    let max_separation = 5.0 * 3f64.sqrt();
    assert!(records
        .iter()
        .all(|r| r.observable_estimate > 0.0 && r.observable_estimate < max_separation));
}

#[test]
fn invalid_parameters_fail_before_any_chain_runs() {
    let mut config = cold_config();
    config.proposal_scale = 20.0;
    let err = run_replicates(&config, None).unwrap_err();
    assert!(matches!(err, BoltzError::Config(_)));
    assert_eq!(err.info().code, "proposal-scale-box");

    let mut config = cold_config();
    config.thinning = 0;
    assert_eq!(
        run_replicates(&config, None).unwrap_err().info().code,
        "thinning"
    );

    let mut config = cold_config();
    config.beta = -1.0;
    assert_eq!(
        run_replicates(&config, None).unwrap_err().info().code,
        "beta"
    );
}

#[test]
fn unwritable_trace_dir_fails_the_point_with_coordinates() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, b"occupied").unwrap();

    let mut config = cold_config();
    config.sample_count = 200;
    config.thinning = 10;
    let err = run_replicates(&config, Some(&blocker)).unwrap_err();
    assert!(matches!(err, BoltzError::Replicate(_)));
    let info = err.info();
    assert_eq!(info.code, "replicate-failed");
    assert!(info.message.contains("trace-mkdir"));
    assert_eq!(info.context.get("beta").unwrap(), "300");
    assert_eq!(info.context.get("batch").unwrap(), "0");
    assert!(info.context.contains_key("replicate"));
}
