//! TOML run files: Monte Carlo settings, scenarios and removal orderings.

use crate::error::{IoError, Result};
use contagion_core::{ContagionError, Network, NodeSelection, SimulationConfig, UpdateOrder, F};
use contagion_robustness::{AttackStrategy, RemovalOrdering, StrategyOrdering};
use contagion_sampler::{MonteCarloConfig, Scenario};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Everything one invocation of the CLI needs besides the network
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    pub monte_carlo: Option<MonteCarloConfig>,
    #[serde(default, rename = "scenario")]
    pub scenarios: Vec<ScenarioSpec>,
    #[serde(default)]
    pub robustness: RobustnessSettings,
    #[serde(default, rename = "ordering")]
    pub orderings: Vec<OrderingSpec>,
}

/// One `[[scenario]]` table
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioSpec {
    pub label: String,
    pub beta: F,
    pub gamma: F,
    pub steps: usize,
    pub intervention_step: usize,
    #[serde(default)]
    pub update_order: UpdateOrder,
    #[serde(default)]
    pub sources: NodeSelection,
    #[serde(default)]
    pub controls: NodeSelection,
}

impl ScenarioSpec {
    pub fn to_scenario(&self) -> Scenario {
        let config = SimulationConfig::new(self.beta, self.gamma, self.steps, self.intervention_step)
            .with_update_order(self.update_order)
            .with_sources(self.sources.clone())
            .with_controls(self.controls.clone());
        Scenario::new(self.label.clone(), config)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RobustnessSettings {
    /// Nodes never picked by generated orderings
    #[serde(default)]
    pub excluded: Vec<String>,
}

/// One `[[ordering]]` table: an explicit node list or a generated strategy
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrderingSpec {
    pub label: Option<String>,
    pub nodes: Option<Vec<String>>,
    pub strategy: Option<AttackStrategy>,
    pub limit: Option<usize>,
    pub seed: Option<u64>,
}

impl OrderingSpec {
    fn validate(&self, index: usize) -> Result<()> {
        match (&self.nodes, &self.strategy) {
            (Some(_), Some(_)) => Err(invalid(format!("ordering {index} sets both nodes and strategy"))),
            (None, None) => Err(invalid(format!("ordering {index} needs nodes or a strategy"))),
            (Some(_), None) if self.label.is_none() => {
                Err(invalid(format!("ordering {index} lists nodes without a label")))
            }
            _ => Ok(()),
        }
    }

    /// Label the resolved ordering will carry
    pub fn effective_label(&self) -> &str {
        match (&self.label, self.strategy) {
            (Some(label), _) => label,
            (None, Some(strategy)) => strategy.description(),
            (None, None) => "",
        }
    }

    /// Explicit lists pass through unchecked; unknown labels fail that
    /// ordering when it is evaluated.
    pub fn to_ordering<S: AsRef<str>>(&self, network: &Network, excluded: &[S]) -> Result<RemovalOrdering> {
        match (&self.nodes, self.strategy) {
            (Some(nodes), _) => Ok(RemovalOrdering::new(self.label.clone().unwrap_or_default(), nodes.clone())),
            (None, Some(strategy)) => {
                let mut plan = StrategyOrdering::new(strategy);
                if let Some(limit) = self.limit {
                    plan = plan.with_limit(limit);
                }
                if let Some(seed) = self.seed {
                    plan = plan.with_seed(seed);
                }
                let mut ordering = plan.build(network, excluded)?;
                if let Some(label) = &self.label {
                    ordering.label = label.clone();
                }
                Ok(ordering)
            }
            (None, None) => Err(invalid("ordering needs nodes or a strategy".to_string())),
        }
    }
}

fn invalid(msg: String) -> IoError {
    IoError::Contagion(ContagionError::InvalidConfig(msg))
}

impl FromStr for RunConfig {
    type Err = IoError;

    fn from_str(s: &str) -> Result<Self> {
        let config: RunConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }
}

impl RunConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        fs::read_to_string(path)?.parse()
    }

    /// Structural checks. Per-scenario parameter ranges are checked by the
    /// driver so a bad scenario fails alone.
    pub fn validate(&self) -> Result<()> {
        if let Some(mc) = &self.monte_carlo {
            if mc.trials == 0 {
                return Err(invalid("monte_carlo.trials must be positive".to_string()));
            }
        }
        if !self.scenarios.is_empty() && self.monte_carlo.is_none() {
            return Err(invalid("scenarios need a [monte_carlo] table".to_string()));
        }

        let mut labels = HashSet::new();
        for scenario in &self.scenarios {
            if !labels.insert(scenario.label.as_str()) {
                return Err(invalid(format!("duplicate scenario label '{}'", scenario.label)));
            }
        }

        let mut labels = HashSet::new();
        for (index, ordering) in self.orderings.iter().enumerate() {
            ordering.validate(index)?;
            if !labels.insert(ordering.effective_label()) {
                return Err(invalid(format!(
                    "duplicate ordering label '{}'; label generated orderings explicitly",
                    ordering.effective_label()
                )));
            }
        }
        Ok(())
    }

    pub fn scenarios(&self) -> Vec<Scenario> {
        self.scenarios.iter().map(ScenarioSpec::to_scenario).collect()
    }

    pub fn monte_carlo(&self) -> Result<MonteCarloConfig> {
        self.monte_carlo
            .clone()
            .ok_or_else(|| invalid("missing [monte_carlo] table".to_string()))
    }

    /// Resolve every `[[ordering]]` table against `network`. Generated
    /// orderings are ranked on the intact network.
    pub fn orderings(&self, network: &Network) -> Result<Vec<RemovalOrdering>> {
        self.orderings
            .iter()
            .map(|spec| spec.to_ordering(network, &self.robustness.excluded))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RUN: &str = r#"
[monte_carlo]
trials = 500
seed = 7
excluded = ["A1"]

[[scenario]]
label = "Source M1"
beta = 0.3
gamma = 0.2
steps = 20
intervention_step = 4
sources = { mode = "explicit", nodes = ["M1"] }

[[scenario]]
label = "Random control"
beta = 0.3
gamma = 0.2
steps = 20
intervention_step = 4
update_order = "sequential"
sources = { mode = "random", count = 1 }
controls = { mode = "random", count = 2 }

[robustness]
excluded = ["A1"]

[[ordering]]
label = "Manual"
nodes = ["E1", "M1"]

[[ordering]]
strategy = "degree"
limit = 2
"#;

    #[test]
    fn test_parses_run_file() {
        let config: RunConfig = RUN.parse().unwrap();
        let mc = config.monte_carlo().unwrap();
        assert_eq!(mc.trials, 500);
        assert_eq!(mc.excluded, vec!["A1"]);

        let scenarios = config.scenarios();
        assert_eq!(scenarios.len(), 2);
        assert_eq!(scenarios[0].config.sources, NodeSelection::explicit(["M1"]));
        assert_eq!(scenarios[0].config.controls, NodeSelection::None);
        assert_eq!(scenarios[1].config.update_order, UpdateOrder::Sequential);
        assert_eq!(scenarios[1].config.controls, NodeSelection::random(2));
    }

    #[test]
    fn test_resolves_orderings() {
        let config: RunConfig = RUN.parse().unwrap();
        let g = Network::from_edges(
            ["A1", "M1", "E1", "E2"],
            [("A1", "M1"), ("A1", "E1"), ("A1", "E2"), ("M1", "E1"), ("E1", "E2")],
        )
        .unwrap();
        let orderings = config.orderings(&g).unwrap();
        assert_eq!(orderings[0], RemovalOrdering::new("Manual", ["E1", "M1"]));
        assert_eq!(orderings[1].label, "Degree-based interference");
        // A1 has the highest degree but is excluded
        assert_eq!(orderings[1].nodes, vec!["E1", "M1"]);
    }

    #[test]
    fn test_rejects_negative_steps() {
        let text = RUN.replace("steps = 20", "steps = -1");
        assert!(matches!(text.parse::<RunConfig>(), Err(IoError::Toml(_))));
    }

    #[test]
    fn test_rejects_zero_trials() {
        let text = RUN.replace("trials = 500", "trials = 0");
        assert!(matches!(
            text.parse::<RunConfig>(),
            Err(IoError::Contagion(ContagionError::InvalidConfig(_)))
        ));
    }

    #[test]
    fn test_rejects_ambiguous_ordering() {
        let text = "[[ordering]]\nlabel = \"x\"\nnodes = [\"A\"]\nstrategy = \"degree\"\n";
        assert!(text.parse::<RunConfig>().is_err());
        assert!("[[ordering]]\nlimit = 3\n".parse::<RunConfig>().is_err());
    }

    #[test]
    fn test_rejects_duplicate_ordering_labels() {
        let twice = "[[ordering]]\nstrategy = \"random\"\nseed = 1\n\n[[ordering]]\nstrategy = \"random\"\nseed = 99\n";
        assert!(matches!(
            twice.parse::<RunConfig>(),
            Err(IoError::Contagion(ContagionError::InvalidConfig(_)))
        ));

        let labelled = "[[ordering]]\nlabel = \"Random 1\"\nstrategy = \"random\"\nseed = 1\n\n\
                        [[ordering]]\nlabel = \"Random 99\"\nstrategy = \"random\"\nseed = 99\n";
        let config: RunConfig = labelled.parse().unwrap();
        assert_eq!(config.orderings[1].effective_label(), "Random 99");

        let clash = "[[ordering]]\nlabel = \"Degree-based interference\"\nnodes = [\"A\"]\n\n\
                     [[ordering]]\nstrategy = \"degree\"\n";
        assert!(clash.parse::<RunConfig>().is_err());
    }

    #[test]
    fn test_rejects_duplicate_labels() {
        let text = RUN.replace("Random control", "Source M1");
        assert!(text.parse::<RunConfig>().is_err());
    }
}
