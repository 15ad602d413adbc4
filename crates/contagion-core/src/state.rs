use crate::{NodeId, F};
use serde::{Deserialize, Serialize};

/// Compartment of a single node within one trial
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeStatus {
    Susceptible,
    Infected,
    Recovered,
    Controlled,
}

impl NodeStatus {
    pub fn is_infected(self) -> bool {
        matches!(self, NodeStatus::Infected)
    }

    /// Recovered and Controlled nodes never change again
    pub fn is_absorbing(self) -> bool {
        matches!(self, NodeStatus::Recovered | NodeStatus::Controlled)
    }

    pub fn symbol(self) -> char {
        match self {
            NodeStatus::Susceptible => 'S',
            NodeStatus::Infected => 'I',
            NodeStatus::Recovered => 'R',
            NodeStatus::Controlled => 'C',
        }
    }
}

/// Status of every node in a trial, indexed by node id
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Statuses(pub Vec<NodeStatus>);

impl Statuses {
    /// Every node susceptible
    pub fn susceptible(n: usize) -> Self {
        Statuses(vec![NodeStatus::Susceptible; n])
    }

    /// Initial condition: sources infected, then control nodes controlled.
    /// A node listed in both ends up controlled.
    pub fn seeded(n: usize, sources: &[NodeId], controls: &[NodeId]) -> Self {
        let mut statuses = Self::susceptible(n);
        for &src in sources {
            statuses.0[src] = NodeStatus::Infected;
        }
        for &c in controls {
            statuses.0[c] = NodeStatus::Controlled;
        }
        statuses
    }

    pub fn count(&self, status: NodeStatus) -> usize {
        self.0.iter().filter(|&&s| s == status).count()
    }

    /// Share of all nodes currently infected; 0 for an empty network
    pub fn infected_fraction(&self) -> F {
        if self.0.is_empty() {
            return 0.0;
        }
        self.count(NodeStatus::Infected) as F / self.0.len() as F
    }
}

impl std::ops::Deref for Statuses {
    type Target = [NodeStatus];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::ops::DerefMut for Statuses {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl From<Vec<NodeStatus>> for Statuses {
    fn from(v: Vec<NodeStatus>) -> Self {
        Statuses(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_seeded_control_overrides_source() {
        let s = Statuses::seeded(4, &[0, 1], &[1]);
        assert_eq!(s[0], NodeStatus::Infected);
        assert_eq!(s[1], NodeStatus::Controlled);
        assert_eq!(s.count(NodeStatus::Susceptible), 2);
        assert_relative_eq!(s.infected_fraction(), 0.25);
    }

    #[test]
    fn test_empty_fraction() {
        assert_eq!(Statuses::susceptible(0).infected_fraction(), 0.0);
    }

    #[test]
    fn test_absorbing() {
        assert!(NodeStatus::Controlled.is_absorbing());
        assert!(NodeStatus::Recovered.is_absorbing());
        assert!(!NodeStatus::Infected.is_absorbing());
        assert_eq!(NodeStatus::Controlled.symbol(), 'C');
    }
}
