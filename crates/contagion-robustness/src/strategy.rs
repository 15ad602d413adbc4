use crate::efficiency::{bfs_distances, Direction};
use crate::RemovalOrdering;
use contagion_core::{ContagionError, Network, NodeId, Result, TrialRng, F};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::debug;

/// How an attack ordering ranks nodes on the intact network
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttackStrategy {
    Degree,
    Betweenness,
    Closeness,
    Reachability,
    Random,
}

impl AttackStrategy {
    pub const ALL: [AttackStrategy; 5] = [
        AttackStrategy::Degree,
        AttackStrategy::Betweenness,
        AttackStrategy::Closeness,
        AttackStrategy::Random,
        AttackStrategy::Reachability,
    ];

    pub fn name(self) -> &'static str {
        match self {
            AttackStrategy::Degree => "degree",
            AttackStrategy::Betweenness => "betweenness",
            AttackStrategy::Closeness => "closeness",
            AttackStrategy::Reachability => "reachability",
            AttackStrategy::Random => "random",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            AttackStrategy::Degree => "Degree-based interference",
            AttackStrategy::Betweenness => "Betweenness-based interference",
            AttackStrategy::Closeness => "Closeness-based interference",
            AttackStrategy::Reachability => "Reachability-based interference",
            AttackStrategy::Random => "Random-based interference",
        }
    }

    /// Per-node score, or `None` for the random strategy
    pub fn scores(self, network: &Network) -> Option<Vec<F>> {
        match self {
            AttackStrategy::Degree => Some(degree_centrality(network)),
            AttackStrategy::Betweenness => Some(betweenness_centrality(network)),
            AttackStrategy::Closeness => Some(closeness_centrality(network)),
            AttackStrategy::Reachability => Some(reachability(network)),
            AttackStrategy::Random => None,
        }
    }
}

impl std::str::FromStr for AttackStrategy {
    type Err = ContagionError;

    fn from_str(s: &str) -> Result<Self> {
        AttackStrategy::ALL
            .into_iter()
            .find(|strategy| strategy.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ContagionError::invalid(format!("unknown attack strategy '{s}'")))
    }
}

/// Total degree (in + out) of every node
pub fn degree_centrality(network: &Network) -> Vec<F> {
    (0..network.len()).map(|id| network.degree(id) as F).collect()
}

/// Number of nodes reachable from each node along directed paths, itself excluded
pub fn reachability(network: &Network) -> Vec<F> {
    let removed = vec![false; network.len()];
    (0..network.len())
        .into_par_iter()
        .map_init(
            || (Vec::new(), VecDeque::new()),
            |(dist, queue), source| {
                bfs_distances(network, source, Direction::Outgoing, &removed, dist, queue);
                dist.iter().filter(|&&d| d != 0 && d != usize::MAX).count() as F
            },
        )
        .collect()
}

/// Closeness from incoming distances, scaled by the reachable share
/// (Wasserman-Faust) so nodes few others can reach rank lower.
pub fn closeness_centrality(network: &Network) -> Vec<F> {
    let n = network.len();
    let removed = vec![false; n];
    (0..n)
        .into_par_iter()
        .map_init(
            || (Vec::new(), VecDeque::new()),
            |(dist, queue), target| {
                bfs_distances(network, target, Direction::Incoming, &removed, dist, queue);
                let (reached, total) = dist
                    .iter()
                    .filter(|&&d| d != 0 && d != usize::MAX)
                    .fold((0usize, 0usize), |(r, t), &d| (r + 1, t + d));
                if total == 0 || n <= 1 {
                    return 0.0;
                }
                let r = reached as F;
                (r / total as F) * (r / (n - 1) as F)
            },
        )
        .collect()
}

/// Directed betweenness (Brandes), normalised by `(n - 1)(n - 2)`.
pub fn betweenness_centrality(network: &Network) -> Vec<F> {
    let n = network.len();
    // Per-source dependencies are summed in source order so the result does
    // not depend on how rayon splits the work.
    let per_source: Vec<Vec<F>> = (0..n)
        .into_par_iter()
        .map(|s| source_dependencies(network, s))
        .collect();

    let mut centrality = vec![0.0; n];
    for delta in &per_source {
        for (c, d) in centrality.iter_mut().zip(delta) {
            *c += d;
        }
    }

    if n > 2 {
        let scale = 1.0 / ((n - 1) * (n - 2)) as F;
        centrality.iter_mut().for_each(|c| *c *= scale);
    }
    centrality
}

fn source_dependencies(network: &Network, s: NodeId) -> Vec<F> {
    let n = network.len();
    let mut stack = Vec::with_capacity(n);
    let mut preds: Vec<Vec<NodeId>> = vec![Vec::new(); n];
    let mut sigma = vec![0.0; n];
    let mut dist = vec![usize::MAX; n];
    let mut queue = VecDeque::new();

    sigma[s] = 1.0;
    dist[s] = 0;
    queue.push_back(s);
    while let Some(v) = queue.pop_front() {
        stack.push(v);
        for &w in network.successors(v) {
            if dist[w] == usize::MAX {
                dist[w] = dist[v] + 1;
                queue.push_back(w);
            }
            if dist[w] == dist[v] + 1 {
                sigma[w] += sigma[v];
                preds[w].push(v);
            }
        }
    }

    let mut delta = vec![0.0; n];
    while let Some(w) = stack.pop() {
        for &v in &preds[w] {
            delta[v] += sigma[v] / sigma[w] * (1.0 + delta[w]);
        }
    }
    delta[s] = 0.0;
    delta
}

/// Parameters for generating one attack ordering
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StrategyOrdering {
    pub strategy: AttackStrategy,
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Only read by the random strategy
    #[serde(default)]
    pub seed: u64,
}

fn default_limit() -> usize {
    20
}

impl StrategyOrdering {
    pub fn new(strategy: AttackStrategy) -> Self {
        Self {
            strategy,
            limit: default_limit(),
            seed: 0,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Ranks non-excluded nodes and keeps the first `limit`.
    /// Score ties fall back to node index.
    pub fn build<S: AsRef<str>>(&self, network: &Network, excluded: &[S]) -> Result<RemovalOrdering> {
        let excluded = network.resolve(excluded)?;
        let candidates: Vec<NodeId> = (0..network.len()).filter(|id| !excluded.contains(id)).collect();

        let chosen = match self.strategy.scores(network) {
            Some(scores) => {
                let mut ranked = candidates;
                ranked.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]).then(a.cmp(&b)));
                ranked.truncate(self.limit);
                ranked
            }
            None => {
                let amount = self.limit.min(candidates.len());
                TrialRng::new(self.seed).sample_nodes(&candidates, amount)
            }
        };

        debug!(strategy = self.strategy.name(), nodes = chosen.len(), "ordering generated");
        Ok(RemovalOrdering::new(
            self.strategy.description(),
            chosen.into_iter().map(|id| network.label(id).to_string()),
        ))
    }
}
