use crate::{
    ControlOverlay, Network, NodeId, NodeStatus, SimulationConfig, Statuses, TrialRng,
    UpdateOrder, F,
};

/// SIR(C) transition rule for a single node.
///
/// - Controlled: never transitions.
/// - Susceptible: each infected live predecessor gets its own Bernoulli(beta)
///   trial, in predecessor id order; the first success infects the node.
/// - Infected: once `step >= intervention_step`, recovers with probability gamma.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransitionRule {
    pub beta: F,
    pub gamma: F,
    pub intervention_step: usize,
}

impl TransitionRule {
    pub fn new(beta: F, gamma: F, intervention_step: usize) -> Self {
        Self { beta, gamma, intervention_step }
    }

    /// Status of `node` after `step`, reading neighbour statuses from `view`
    pub fn next_status(
        &self,
        network: &Network,
        overlay: &ControlOverlay,
        view: &[NodeStatus],
        node: NodeId,
        step: usize,
        rng: &mut TrialRng,
    ) -> NodeStatus {
        match view[node] {
            NodeStatus::Controlled => NodeStatus::Controlled,
            NodeStatus::Susceptible => {
                let infected = overlay
                    .live_predecessors(network, node)
                    .filter(|&u| view[u].is_infected())
                    .any(|_| rng.bernoulli(self.beta));
                if infected {
                    NodeStatus::Infected
                } else {
                    NodeStatus::Susceptible
                }
            }
            NodeStatus::Infected if step >= self.intervention_step && rng.bernoulli(self.gamma) => {
                NodeStatus::Recovered
            }
            status => status,
        }
    }
}

impl From<&SimulationConfig> for TransitionRule {
    fn from(config: &SimulationConfig) -> Self {
        Self::new(config.beta, config.gamma, config.intervention_step)
    }
}

/// Apply one step of the rule to every node.
///
/// `scratch` is the second buffer used by the synchronous policy; its contents
/// on entry are irrelevant. On return `current` holds the new statuses.
pub fn advance(
    order: UpdateOrder,
    rule: &TransitionRule,
    network: &Network,
    overlay: &ControlOverlay,
    current: &mut Statuses,
    scratch: &mut Statuses,
    step: usize,
    rng: &mut TrialRng,
) {
    match order {
        UpdateOrder::Synchronous => {
            scratch.0.clear();
            scratch.0.extend_from_slice(current);
            for node in 0..current.len() {
                scratch[node] = rule.next_status(network, overlay, current, node, step, rng);
            }
            std::mem::swap(current, scratch);
        }
        UpdateOrder::Sequential => {
            for node in 0..current.len() {
                let next = rule.next_status(network, overlay, current, node, step, rng);
                current[node] = next;
            }
        }
    }
}
