pub mod efficiency;
pub mod removal;
pub mod strategy;
pub mod degree;

pub use efficiency::{global_efficiency, global_efficiency_without};
pub use removal::{
    efficiency_over_removal, CurveOutcome, RemovalOrdering, RobustnessCurve, RobustnessEvaluator,
    RobustnessReport,
};

// Attack orderings
pub use strategy::{
    betweenness_centrality, closeness_centrality, degree_centrality, reachability, AttackStrategy,
    StrategyOrdering,
};

pub use degree::{DegreeDistribution, PowerLawFit};
