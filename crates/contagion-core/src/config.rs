use crate::{ContagionError, Result, F};
use serde::{Deserialize, Serialize};

/// How statuses are updated within one step
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateOrder {
    /// Every node reads the statuses from the start of the step (double buffer)
    #[default]
    Synchronous,
    /// Nodes updated in place in ascending id order; later nodes see
    /// earlier same-step transitions
    Sequential,
}

/// Which nodes act as sources or control nodes in a trial
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode")]
pub enum NodeSelection {
    #[default]
    None,
    /// Fixed labels, identical for every trial
    Explicit { nodes: Vec<String> },
    /// Fresh uniform draw of `count` nodes per trial from the eligible pool
    Random { count: usize },
}

impl NodeSelection {
    pub fn explicit<S: Into<String>>(nodes: impl IntoIterator<Item = S>) -> Self {
        NodeSelection::Explicit {
            nodes: nodes.into_iter().map(Into::into).collect(),
        }
    }

    pub fn random(count: usize) -> Self {
        NodeSelection::Random { count }
    }

    pub fn is_random(&self) -> bool {
        matches!(self, NodeSelection::Random { .. })
    }

    pub fn explicit_nodes(&self) -> &[String] {
        match self {
            NodeSelection::Explicit { nodes } => nodes,
            _ => &[],
        }
    }

    pub fn random_count(&self) -> usize {
        match self {
            NodeSelection::Random { count } => *count,
            _ => 0,
        }
    }
}

/// Per-trial parameters of the SIR(C) process
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub beta: F,              // Infection probability per exposed edge per step
    pub gamma: F,             // Recovery probability per step once eligible
    pub steps: usize,
    pub intervention_step: usize, // Earliest step at which recovery may trigger
    #[serde(default)]
    pub update_order: UpdateOrder,
    #[serde(default)]
    pub sources: NodeSelection,
    #[serde(default)]
    pub controls: NodeSelection,
}

impl SimulationConfig {
    pub fn new(beta: F, gamma: F, steps: usize, intervention_step: usize) -> Self {
        Self {
            beta,
            gamma,
            steps,
            intervention_step,
            update_order: UpdateOrder::default(),
            sources: NodeSelection::None,
            controls: NodeSelection::None,
        }
    }

    pub fn with_sources(mut self, sources: NodeSelection) -> Self {
        self.sources = sources;
        self
    }

    pub fn with_controls(mut self, controls: NodeSelection) -> Self {
        self.controls = controls;
        self
    }

    pub fn with_update_order(mut self, order: UpdateOrder) -> Self {
        self.update_order = order;
        self
    }

    pub fn validate(&self) -> Result<()> {
        check_probability("beta", self.beta)?;
        check_probability("gamma", self.gamma)?;
        Ok(())
    }
}

fn check_probability(name: &str, p: F) -> Result<()> {
    if !p.is_finite() || !(0.0..=1.0).contains(&p) {
        return Err(ContagionError::InvalidConfig(format!(
            "{name} must lie in [0, 1], got {p}"
        )));
    }
    Ok(())
}
