use crate::{simulate, CancelToken, Combination, CombinationTally, SelectionPlan, TrialResult};
use contagion_core::{ContagionError, Network, NodeId, Result, SimulationConfig, TrialRng, F};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Batch-wide Monte Carlo settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloConfig {
    pub trials: usize,
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Incident nodes never eligible for random source/control selection
    #[serde(default)]
    pub excluded: Vec<String>,
}

fn default_seed() -> u64 {
    42
}

impl MonteCarloConfig {
    pub fn new(trials: usize, seed: u64) -> Self {
        Self { trials, seed, excluded: Vec::new() }
    }

    pub fn with_excluded<S: Into<String>>(mut self, excluded: impl IntoIterator<Item = S>) -> Self {
        self.excluded = excluded.into_iter().map(Into::into).collect();
        self
    }
}

/// One labelled configuration to compare against the others in a batch
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub label: String,
    pub config: SimulationConfig,
}

impl Scenario {
    pub fn new(label: impl Into<String>, config: SimulationConfig) -> Self {
        Self { label: label.into(), config }
    }
}

/// Mean infected-fraction curve of a scenario
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AggregateResult {
    pub mean: Vec<F>,
    pub trials: usize,    // Requested
    pub completed: usize, // Actually run before cancellation
    pub cancelled: bool,
    pub most_common_sources: Option<Combination>,
    pub most_common_controls: Option<Combination>,
}

impl AggregateResult {
    pub fn peak(&self) -> Option<(usize, F)> {
        TrialResult { fractions: self.mean.clone() }.peak()
    }

    pub fn final_fraction(&self) -> Option<F> {
        self.mean.last().copied()
    }
}

/// Outcome of one scenario; failures stay local to their scenario
#[derive(Clone, Debug)]
pub struct ScenarioOutcome {
    pub label: String,
    pub result: Result<AggregateResult>,
}

/// Per-scenario outcomes in submission order
#[derive(Clone, Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<ScenarioOutcome>,
}

impl BatchReport {
    /// First outcome with the given label
    pub fn get(&self, label: &str) -> Option<&Result<AggregateResult>> {
        self.outcomes.iter().find(|o| o.label == label).map(|o| &o.result)
    }

    pub fn successes(&self) -> impl Iterator<Item = (&str, &AggregateResult)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok().map(|r| (o.label.as_str(), r)))
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &ContagionError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (o.label.as_str(), e)))
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

/// Seeds and curve of one finished trial
struct TrialSample {
    sources: Vec<NodeId>,
    controls: Vec<NodeId>,
    result: TrialResult,
}

/// Repeats single trials over a shared network and averages them.
///
/// Trials run on the rayon pool. Trial `i` of scenario `s` draws from its own
/// stream (generator keyed by `(seed, i)`, ChaCha stream `s`), and results are
/// reduced in trial order, so the aggregate does not depend on the thread count.
pub struct MonteCarloDriver<'a> {
    network: &'a Network,
    config: MonteCarloConfig,
    excluded: Vec<NodeId>,
    cancel: CancelToken,
    observer: Option<TrialObserver>,
}

/// Called from worker threads with the trial index and curve of every finished trial
pub type TrialObserver = Arc<dyn Fn(usize, &TrialResult) + Send + Sync>;

impl<'a> MonteCarloDriver<'a> {
    pub fn new(network: &'a Network, config: MonteCarloConfig) -> Result<Self> {
        if config.trials == 0 {
            return Err(ContagionError::invalid("trial count must be positive"));
        }
        let excluded = network.resolve(&config.excluded)?;
        Ok(Self {
            network,
            config,
            excluded,
            cancel: CancelToken::new(),
            observer: None,
        })
    }

    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_trial_observer(mut self, observer: TrialObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    pub fn config(&self) -> &MonteCarloConfig {
        &self.config
    }

    /// Run every scenario; one failing scenario never affects the others
    pub fn run(&self, scenarios: &[Scenario]) -> BatchReport {
        let outcomes = scenarios
            .iter()
            .enumerate()
            .map(|(index, scenario)| {
                let result = self.run_scenario(index, scenario);
                if let Err(e) = &result {
                    warn!(scenario = %scenario.label, error = %e, "scenario failed");
                }
                ScenarioOutcome {
                    label: scenario.label.clone(),
                    result,
                }
            })
            .collect();
        BatchReport { outcomes }
    }

    /// Run the trials of one scenario. `index` selects the scenario's seed stream.
    pub fn run_scenario(&self, index: usize, scenario: &Scenario) -> Result<AggregateResult> {
        let config = &scenario.config;
        config.validate()?;
        let plan = SelectionPlan::new(self.network, &config.sources, &config.controls, &self.excluded)?;

        info!(
            scenario = %scenario.label,
            trials = self.config.trials,
            beta = config.beta,
            gamma = config.gamma,
            steps = config.steps,
            intervention_step = config.intervention_step,
            "running scenario"
        );

        let samples: Vec<Option<TrialSample>> = (0..self.config.trials)
            .into_par_iter()
            .map(|trial_id| {
                if self.cancel.is_cancelled() {
                    return None;
                }
                let mut rng = TrialRng::for_scenario_trial(self.config.seed, index as u64, trial_id as u64);
                let seeds = plan.draw(&mut rng);
                let result = simulate(self.network, &seeds.sources, &seeds.controls, config, &mut rng);
                if let Some(observer) = &self.observer {
                    observer(trial_id, &result);
                }
                Some(TrialSample {
                    sources: seeds.sources,
                    controls: seeds.controls,
                    result,
                })
            })
            .collect();

        let mut source_tally = CombinationTally::new();
        let mut control_tally = CombinationTally::new();
        let mut curves = Vec::with_capacity(samples.len());
        for sample in samples.into_iter().flatten() {
            if plan.has_random_sources() {
                source_tally.record(&self.labels(&sample.sources));
            }
            if plan.has_random_controls() {
                control_tally.record(&self.labels(&sample.controls));
            }
            curves.push(sample.result);
        }

        let completed = curves.len();
        let cancelled = completed < self.config.trials;
        if cancelled {
            warn!(scenario = %scenario.label, completed, "batch cancelled, aggregating partial results");
        }
        debug!(scenario = %scenario.label, completed, "trials finished");

        Ok(AggregateResult {
            mean: mean_curve(&curves, config.steps + 1),
            trials: self.config.trials,
            completed,
            cancelled,
            most_common_sources: source_tally.most_common(),
            most_common_controls: control_tally.most_common(),
        })
    }

    fn labels(&self, ids: &[NodeId]) -> Vec<&str> {
        ids.iter().map(|&id| self.network.label(id)).collect()
    }
}

/// Elementwise mean of equally long curves; zeros when there are none
pub fn mean_curve(curves: &[TrialResult], len: usize) -> Vec<F> {
    let mut mean = vec![0.0; len];
    if curves.is_empty() {
        return mean;
    }
    for curve in curves {
        for (m, f) in mean.iter_mut().zip(&curve.fractions) {
            *m += f;
        }
    }
    for m in &mut mean {
        *m /= curves.len() as F;
    }
    mean
}
