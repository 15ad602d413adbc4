use crate::error::Result;
use contagion_core::{Network, F};
use contagion_robustness::{RemovalOrdering, RobustnessReport};
use contagion_sampler::{AggregateResult, BatchReport};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;
use uuid::Uuid;

/// Run manifest for reproducing a result file
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunManifest {
    pub run_id: String,
    pub timestamp: String,
    pub command: String,     // "simulate" | "robustness"
    pub seed: Option<u64>,
    pub trials: Option<usize>,
    pub network: String,
    pub nodes: usize,
    pub edges: usize,
    pub threads: usize,
    pub crate_version: String,
}

impl RunManifest {
    pub fn new(command: &str, network_path: &Path, network: &Network) -> Self {
        Self {
            run_id: Uuid::new_v4().to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            command: command.to_string(),
            seed: None,
            trials: None,
            network: network_path.display().to_string(),
            nodes: network.len(),
            edges: network.num_edges(),
            threads: rayon::current_num_threads(),
            crate_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    pub fn with_monte_carlo(mut self, seed: u64, trials: usize) -> Self {
        self.seed = Some(seed);
        self.trials = Some(trials);
        self
    }
}

/// Outcome of a scenario or ordering as written to disk
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome<T> {
    Ok { label: String, result: T },
    Failed { label: String, error: String },
}

impl<T> Outcome<T> {
    pub fn label(&self) -> &str {
        match self {
            Outcome::Ok { label, .. } | Outcome::Failed { label, .. } => label,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimulationOutput {
    pub manifest: RunManifest,
    pub scenarios: Vec<Outcome<AggregateResult>>,
}

impl SimulationOutput {
    pub fn new(manifest: RunManifest, report: &BatchReport) -> Self {
        let scenarios = report
            .outcomes
            .iter()
            .map(|o| match &o.result {
                Ok(result) => Outcome::Ok {
                    label: o.label.clone(),
                    result: result.clone(),
                },
                Err(e) => Outcome::Failed {
                    label: o.label.clone(),
                    error: e.to_string(),
                },
            })
            .collect();
        Self { manifest, scenarios }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OrderingResult {
    pub nodes: Vec<String>,
    pub efficiency: Vec<F>,
    pub relative_loss: F,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RobustnessOutput {
    pub manifest: RunManifest,
    pub baseline: F,
    pub orderings: Vec<Outcome<OrderingResult>>,
}

impl RobustnessOutput {
    /// `orderings` are the orderings the report was evaluated from, in the
    /// same order as `report.curves`
    pub fn new(
        manifest: RunManifest,
        baseline: F,
        report: &RobustnessReport,
        orderings: &[RemovalOrdering],
    ) -> Self {
        let orderings = report
            .curves
            .iter()
            .zip(orderings)
            .map(|(c, ordering)| match &c.result {
                Ok(curve) => Outcome::Ok {
                    label: c.label.clone(),
                    result: OrderingResult {
                        nodes: ordering.nodes.clone(),
                        efficiency: curve.values.clone(),
                        relative_loss: curve.relative_loss(),
                    },
                },
                Err(e) => Outcome::Failed {
                    label: c.label.clone(),
                    error: e.to_string(),
                },
            })
            .collect();
        Self {
            manifest,
            baseline,
            orderings,
        }
    }
}

/// Pretty JSON to `path`
pub fn write_json<T: Serialize>(value: &T, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)?;
    info!(path = %path.display(), "wrote results");
    Ok(())
}

pub fn read_json<T: for<'de> Deserialize<'de>>(path: impl AsRef<Path>) -> Result<T> {
    let json = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}
