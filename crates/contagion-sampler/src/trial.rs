use contagion_core::{
    advance, ControlOverlay, Network, NodeId, SimulationConfig, Statuses, TransitionRule,
    TrialRng, UpdateOrder, F,
};
use serde::{Deserialize, Serialize};

/// Infected fraction per step of one trial, index 0 being the initial condition
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrialResult {
    pub fractions: Vec<F>,
}

impl TrialResult {
    pub fn len(&self) -> usize {
        self.fractions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fractions.is_empty()
    }

    pub fn initial(&self) -> Option<F> {
        self.fractions.first().copied()
    }

    pub fn final_fraction(&self) -> Option<F> {
        self.fractions.last().copied()
    }

    /// Highest fraction and the step it was first reached
    pub fn peak(&self) -> Option<(usize, F)> {
        self.fractions
            .iter()
            .copied()
            .enumerate()
            .fold(None, |best, (step, f)| match best {
                Some((_, b)) if b >= f => best,
                _ => Some((step, f)),
            })
    }
}

/// One SIR(C) trial stepping over a shared base network.
///
/// The trial owns everything it mutates: two status buffers and the control
/// overlay. The base network is only read.
pub struct Trial<'a> {
    network: &'a Network,
    overlay: ControlOverlay,
    rule: TransitionRule,
    order: UpdateOrder,
    current: Statuses,
    scratch: Statuses,
    step: usize,
    steps: usize,
}

impl<'a> Trial<'a> {
    /// Seed the trial: sources infected, control nodes isolated and controlled
    pub fn new(
        network: &'a Network,
        sources: &[NodeId],
        controls: &[NodeId],
        config: &SimulationConfig,
    ) -> Self {
        let overlay = ControlOverlay::isolate(network, controls);
        let mut current = Statuses::seeded(network.len(), sources, &[]);
        overlay.apply(&mut current);

        Self {
            network,
            overlay,
            rule: TransitionRule::from(config),
            order: config.update_order,
            scratch: Statuses::susceptible(network.len()),
            current,
            step: 0,
            steps: config.steps,
        }
    }

    pub fn statuses(&self) -> &Statuses {
        &self.current
    }

    pub fn overlay(&self) -> &ControlOverlay {
        &self.overlay
    }

    /// Steps taken so far
    pub fn step_index(&self) -> usize {
        self.step
    }

    pub fn is_finished(&self) -> bool {
        self.step >= self.steps
    }

    pub fn infected_fraction(&self) -> F {
        self.current.infected_fraction()
    }

    /// Advance one step and return the infected fraction after it
    pub fn step(&mut self, rng: &mut TrialRng) -> F {
        advance(
            self.order,
            &self.rule,
            self.network,
            &self.overlay,
            &mut self.current,
            &mut self.scratch,
            self.step,
            rng,
        );
        self.step += 1;
        self.infected_fraction()
    }

    /// Run the remaining steps, recording the fraction before the first one
    pub fn run(mut self, rng: &mut TrialRng) -> TrialResult {
        let mut fractions = Vec::with_capacity(self.steps - self.step + 1);
        fractions.push(self.infected_fraction());
        while !self.is_finished() {
            fractions.push(self.step(rng));
        }
        TrialResult { fractions }
    }
}

/// Run one trial from scratch
pub fn simulate(
    network: &Network,
    sources: &[NodeId],
    controls: &[NodeId],
    config: &SimulationConfig,
    rng: &mut TrialRng,
) -> TrialResult {
    Trial::new(network, sources, controls, config).run(rng)
}
