use contagion_core::{Network, NodeId, F};
use std::collections::VecDeque;

/// Which adjacency a BFS follows
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Direction {
    Outgoing,
    Incoming,
}

/// Unweighted BFS from `source`, skipping removed nodes.
/// `dist` is reused between calls; unreachable nodes hold `usize::MAX`.
pub(crate) fn bfs_distances(
    network: &Network,
    source: NodeId,
    direction: Direction,
    removed: &[bool],
    dist: &mut Vec<usize>,
    queue: &mut VecDeque<NodeId>,
) {
    dist.clear();
    dist.resize(network.len(), usize::MAX);
    queue.clear();

    dist[source] = 0;
    queue.push_back(source);
    while let Some(u) = queue.pop_front() {
        let du = dist[u];
        let next = match direction {
            Direction::Outgoing => network.successors(u),
            Direction::Incoming => network.predecessors(u),
        };
        for &v in next {
            if !removed[v] && dist[v] == usize::MAX {
                dist[v] = du + 1;
                queue.push_back(v);
            }
        }
    }
}

/// Global efficiency: mean of `1/d(u, v)` over ordered pairs of distinct nodes.
///
/// Unreachable pairs contribute 0 and the sum is always divided by
/// `n (n - 1)`, so the value lies in `[0, 1]`. Graphs with at most one node
/// have efficiency 0.
pub fn global_efficiency(network: &Network) -> F {
    global_efficiency_without(network, &vec![false; network.len()])
}

/// Global efficiency of the subgraph left after dropping every node flagged in
/// `removed`. `n` is the number of surviving nodes.
pub fn global_efficiency_without(network: &Network, removed: &[bool]) -> F {
    let n = removed.iter().filter(|&&r| !r).count();
    if n <= 1 {
        return 0.0;
    }

    let mut dist = Vec::with_capacity(network.len());
    let mut queue = VecDeque::new();
    let mut total = 0.0;

    for u in (0..network.len()).filter(|&u| !removed[u]) {
        bfs_distances(network, u, Direction::Outgoing, removed, &mut dist, &mut queue);
        total += dist
            .iter()
            .filter(|&&d| d != 0 && d != usize::MAX)
            .map(|&d| 1.0 / d as F)
            .sum::<F>();
    }

    total / (n * (n - 1)) as F
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_trivial_graphs() {
        let empty = Network::new(Vec::<String>::new()).unwrap();
        assert_eq!(global_efficiency(&empty), 0.0);

        let single = Network::new(["A"]).unwrap();
        assert_eq!(global_efficiency(&single), 0.0);
    }

    #[test]
    fn test_complete_digraph() {
        let g = Network::from_presence(["A", "B", "C", "D"], |i, j| i != j).unwrap();
        assert_relative_eq!(global_efficiency(&g), 1.0);
    }

    #[test]
    fn test_directed_chain() {
        // A -> B -> C: pairs (A,B)=1, (B,C)=1, (A,C)=1/2, reverse unreachable
        let g = Network::from_edges(["A", "B", "C"], [("A", "B"), ("B", "C")]).unwrap();
        assert_relative_eq!(global_efficiency(&g), 2.5 / 6.0);
    }

    #[test]
    fn test_removal_mask_shrinks_denominator() {
        let g = Network::from_edges(["A", "B", "C"], [("A", "B"), ("B", "C")]).unwrap();
        // Without C only A -> B remains: 1 / (2 * 1)
        assert_relative_eq!(global_efficiency_without(&g, &[false, false, true]), 0.5);
        // Without B nothing is reachable
        assert_eq!(global_efficiency_without(&g, &[false, true, false]), 0.0);
    }

    #[test]
    fn test_self_loops_ignored() {
        let g = Network::from_edges(["A", "B"], [("A", "A"), ("A", "B")]).unwrap();
        assert_relative_eq!(global_efficiency(&g), 0.5);
    }
}
