pub mod trial;
pub mod selection;
pub mod tally;
pub mod cancel;
pub mod monte_carlo;

pub use trial::{simulate, Trial, TrialResult};
pub use selection::{SelectionPlan, TrialSeeds};
pub use tally::{Combination, CombinationTally};
pub use cancel::CancelToken;
pub use monte_carlo::{
    mean_curve, AggregateResult, BatchReport, MonteCarloConfig, MonteCarloDriver, Scenario,
    ScenarioOutcome, TrialObserver,
};
