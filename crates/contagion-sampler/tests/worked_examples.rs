use approx::assert_relative_eq;
use contagion_core::{Network, NodeSelection, SimulationConfig, TrialRng, UpdateOrder};
use contagion_sampler::{simulate, MonteCarloConfig, MonteCarloDriver, Scenario};

fn chain() -> Network {
    // A -> B -> C, A -> D
    Network::from_edges(["A", "B", "C", "D"], [("A", "B"), ("B", "C"), ("A", "D")]).unwrap()
}

fn assert_curve(actual: &[f64], expected: &[f64]) {
    assert_eq!(actual.len(), expected.len(), "curve length");
    for (a, e) in actual.iter().zip(expected) {
        assert_relative_eq!(*a, *e, epsilon = 1e-12);
    }
}

#[test]
fn chain_full_transmission() {
    let g = chain();
    let config = SimulationConfig::new(1.0, 0.0, 3, 0);
    let mut rng = TrialRng::new(42);

    let result = simulate(&g, &[0], &[], &config, &mut rng);
    assert_curve(&result.fractions, &[0.25, 0.75, 1.0, 1.0]);
}

#[test]
fn chain_with_control_node() {
    let g = chain();
    let config = SimulationConfig::new(1.0, 0.0, 3, 0);
    let b = g.index_of("B").unwrap();
    let mut rng = TrialRng::new(42);

    // B is isolated: only D catches it, and C is cut off behind B
    let result = simulate(&g, &[0], &[b], &config, &mut rng);
    assert_curve(&result.fractions, &[0.25, 0.5, 0.5, 0.5]);
}

#[test]
fn chain_sequential_policy_cascades() {
    let g = chain();
    let config = SimulationConfig::new(1.0, 0.0, 3, 0).with_update_order(UpdateOrder::Sequential);
    let mut rng = TrialRng::new(42);

    // B is updated before C within step 0, so C falls in the same step
    let result = simulate(&g, &[0], &[], &config, &mut rng);
    assert_curve(&result.fractions, &[0.25, 1.0, 1.0, 1.0]);
}

#[test]
fn full_recovery_after_intervention() {
    let g = chain();
    let config = SimulationConfig::new(1.0, 1.0, 4, 1);
    let mut rng = TrialRng::new(42);

    // Step 0 spreads to B and D; from step 1 every infected node recovers at once
    let result = simulate(&g, &[0], &[], &config, &mut rng);
    assert_curve(&result.fractions, &[0.25, 0.75, 0.25, 0.0, 0.0]);
}

#[test]
fn batch_compares_scenarios() {
    let g = chain();
    let driver = MonteCarloDriver::new(&g, MonteCarloConfig::new(50, 7)).unwrap();
    let base = SimulationConfig::new(1.0, 0.0, 3, 0).with_sources(NodeSelection::explicit(["A"]));

    let scenarios = vec![
        Scenario::new("no control", base.clone()),
        Scenario::new("control B", base.clone().with_controls(NodeSelection::explicit(["B"]))),
        Scenario::new("bad source", base.clone().with_sources(NodeSelection::explicit(["Z"]))),
        Scenario::new(
            "bad beta",
            SimulationConfig { beta: 1.5, ..base.clone() },
        ),
    ];
    let report = driver.run(&scenarios);

    assert_eq!(report.len(), 4);
    assert_curve(&report.get("no control").unwrap().as_ref().unwrap().mean, &[0.25, 0.75, 1.0, 1.0]);
    assert_curve(&report.get("control B").unwrap().as_ref().unwrap().mean, &[0.25, 0.5, 0.5, 0.5]);
    assert!(report.get("bad source").unwrap().is_err());
    assert!(report.get("bad beta").unwrap().is_err());
    assert_eq!(report.successes().count(), 2);
    assert_eq!(report.failures().count(), 2);
}

#[test]
fn random_controls_report_most_common_combination() {
    let g = Network::from_edges(
        ["A1", "M1", "E1", "E2", "E3"],
        [("A1", "M1"), ("M1", "E1"), ("E1", "E2"), ("E2", "E3")],
    )
    .unwrap();
    let config = MonteCarloConfig::new(200, 3).with_excluded(["A1"]);
    let driver = MonteCarloDriver::new(&g, config).unwrap();

    let scenario = Scenario::new(
        "Random control",
        SimulationConfig::new(0.3, 0.3, 10, 2)
            .with_sources(NodeSelection::random(1))
            .with_controls(NodeSelection::random(3)),
    );
    let agg = driver.run_scenario(0, &scenario).unwrap();

    let controls = agg.most_common_controls.expect("random controls are tallied");
    assert_eq!(controls.nodes.len(), 3);
    assert!(controls.count >= 1 && controls.count <= 200);
    assert!(!controls.nodes.contains(&"A1".to_string()));
    // Sorted labels
    let mut sorted = controls.nodes.clone();
    sorted.sort();
    assert_eq!(sorted, controls.nodes);

    let sources = agg.most_common_sources.expect("random sources are tallied");
    assert_eq!(sources.nodes.len(), 1);
    // Four eligible nodes, two hundred draws: the winner appears at least 50 times
    assert!(sources.count >= 50);
}
