use crate::{Network, NodeId, NodeStatus, Statuses};

/// Trial-local control policy layered over a shared base network.
///
/// Isolating a node removes every edge it touches, in both directions, so an
/// edge `u -> v` of the base network is live only while neither endpoint is
/// isolated. The base network itself is never mutated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ControlOverlay {
    isolated: Vec<bool>,
}

impl ControlOverlay {
    /// Overlay with every base edge live
    pub fn none(n: usize) -> Self {
        Self {
            isolated: vec![false; n],
        }
    }

    /// Isolate the given control nodes
    pub fn isolate(network: &Network, controls: &[NodeId]) -> Self {
        let mut overlay = Self::none(network.len());
        for &c in controls {
            overlay.isolated[c] = true;
        }
        overlay
    }

    pub fn is_isolated(&self, id: NodeId) -> bool {
        self.isolated.get(id).copied().unwrap_or(false)
    }

    pub fn is_live(&self, u: NodeId, v: NodeId) -> bool {
        !self.is_isolated(u) && !self.is_isolated(v)
    }

    pub fn controlled(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.isolated
            .iter()
            .enumerate()
            .filter(|&(_, &iso)| iso)
            .map(|(id, _)| id)
    }

    /// Predecessors of `v` still connected under this policy
    pub fn live_predecessors<'a>(
        &'a self,
        network: &'a Network,
        v: NodeId,
    ) -> impl Iterator<Item = NodeId> + 'a {
        let cut = self.is_isolated(v);
        network
            .predecessors(v)
            .iter()
            .copied()
            .filter(move |&u| !cut && !self.is_isolated(u))
    }

    /// Successors of `u` still connected under this policy
    pub fn live_successors<'a>(
        &'a self,
        network: &'a Network,
        u: NodeId,
    ) -> impl Iterator<Item = NodeId> + 'a {
        let cut = self.is_isolated(u);
        network
            .successors(u)
            .iter()
            .copied()
            .filter(move |&v| !cut && !self.is_isolated(v))
    }

    /// Base edges removed by this policy
    pub fn removed_edges(&self, network: &Network) -> Vec<(NodeId, NodeId)> {
        network
            .edges()
            .filter(|&(u, v)| !self.is_live(u, v))
            .collect()
    }

    /// Mark every isolated node `Controlled`
    pub fn apply(&self, statuses: &mut Statuses) {
        for id in self.controlled() {
            statuses[id] = NodeStatus::Controlled;
        }
    }

    /// Standalone copy of the network with the removed edges dropped
    pub fn materialize(&self, network: &Network) -> Network {
        network.filter_edges(|u, v| self.is_live(u, v))
    }
}
