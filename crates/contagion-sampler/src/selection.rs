use contagion_core::{ContagionError, Network, NodeId, NodeSelection, Result, TrialRng};

/// Sources and control nodes drawn for one trial
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrialSeeds {
    pub sources: Vec<NodeId>,
    pub controls: Vec<NodeId>,
}

/// Source/control selection of a scenario resolved against a network.
///
/// Random draws come from the eligible pool: every node that is neither
/// excluded nor explicitly named by the scenario. Sources are drawn first;
/// random controls never reuse a node already drawn as a source.
#[derive(Clone, Debug)]
pub struct SelectionPlan {
    explicit_sources: Vec<NodeId>,
    explicit_controls: Vec<NodeId>,
    random_sources: usize,
    random_controls: usize,
    pool: Vec<NodeId>,
}

impl SelectionPlan {
    pub fn new(
        network: &Network,
        sources: &NodeSelection,
        controls: &NodeSelection,
        excluded: &[NodeId],
    ) -> Result<Self> {
        let explicit_sources = network.resolve(sources.explicit_nodes())?;
        let explicit_controls = network.resolve(controls.explicit_nodes())?;
        let random_sources = sources.random_count();
        let random_controls = controls.random_count();

        let mut blocked = vec![false; network.len()];
        for &id in excluded.iter().chain(&explicit_sources).chain(&explicit_controls) {
            blocked[id] = true;
        }
        let pool: Vec<NodeId> = (0..network.len()).filter(|&id| !blocked[id]).collect();

        let wanted = random_sources + random_controls;
        if wanted > pool.len() {
            return Err(ContagionError::InvalidConfig(format!(
                "random selection needs {wanted} nodes but only {} are eligible",
                pool.len()
            )));
        }

        Ok(Self {
            explicit_sources,
            explicit_controls,
            random_sources,
            random_controls,
            pool,
        })
    }

    pub fn pool(&self) -> &[NodeId] {
        &self.pool
    }

    pub fn has_random_sources(&self) -> bool {
        self.random_sources > 0
    }

    pub fn has_random_controls(&self) -> bool {
        self.random_controls > 0
    }

    /// Draw the seeds of one trial. Explicit-only plans consume no randomness.
    pub fn draw(&self, rng: &mut TrialRng) -> TrialSeeds {
        let mut sources = self.explicit_sources.clone();
        let mut controls = self.explicit_controls.clone();

        if self.random_sources > 0 {
            sources.extend(rng.sample_nodes(&self.pool, self.random_sources));
        }
        if self.random_controls > 0 {
            let remaining: Vec<NodeId> = self
                .pool
                .iter()
                .copied()
                .filter(|id| !sources.contains(id))
                .collect();
            controls.extend(rng.sample_nodes(&remaining, self.random_controls));
        }

        TrialSeeds { sources, controls }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn network() -> Network {
        Network::new(["A1", "A2", "M1", "E1", "E2", "H1"]).unwrap()
    }

    #[test]
    fn test_explicit_only() {
        let g = network();
        let plan = SelectionPlan::new(
            &g,
            &NodeSelection::explicit(["M1"]),
            &NodeSelection::explicit(["E1", "E2"]),
            &[],
        )
        .unwrap();
        let mut rng = TrialRng::new(0);
        let seeds = plan.draw(&mut rng);
        assert_eq!(seeds.sources, vec![2]);
        assert_eq!(seeds.controls, vec![3, 4]);
    }

    #[test]
    fn test_random_draws_respect_pool() {
        let g = network();
        let excluded = vec![0, 1];
        let plan = SelectionPlan::new(&g, &NodeSelection::random(1), &NodeSelection::random(3), &excluded)
            .unwrap();
        assert_eq!(plan.pool(), &[2, 3, 4, 5]);

        let mut rng = TrialRng::new(9);
        for _ in 0..200 {
            let seeds = plan.draw(&mut rng);
            assert_eq!(seeds.sources.len(), 1);
            assert_eq!(seeds.controls.len(), 3);
            assert!(!seeds.controls.contains(&seeds.sources[0]));
            assert!(seeds.sources.iter().chain(&seeds.controls).all(|id| *id >= 2));
        }
    }

    #[test]
    fn test_random_source_avoids_explicit_controls() {
        let g = network();
        let plan = SelectionPlan::new(
            &g,
            &NodeSelection::random(1),
            &NodeSelection::explicit(["E1", "E2", "H1"]),
            &[0, 1],
        )
        .unwrap();
        let mut rng = TrialRng::new(1);
        for _ in 0..50 {
            assert_eq!(plan.draw(&mut rng).sources, vec![2]);
        }
    }

    #[test]
    fn test_pool_too_small() {
        let g = network();
        let err = SelectionPlan::new(&g, &NodeSelection::random(2), &NodeSelection::random(3), &[0, 1])
            .unwrap_err();
        assert!(matches!(err, ContagionError::InvalidConfig(_)));
    }

    #[test]
    fn test_unknown_label() {
        let g = network();
        let err = SelectionPlan::new(&g, &NodeSelection::explicit(["Z9"]), &NodeSelection::None, &[])
            .unwrap_err();
        assert_eq!(err, ContagionError::UnknownNode("Z9".to_string()));
    }
}
