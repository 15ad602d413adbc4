use crate::NodeId;
use rand::seq::SliceRandom;
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// Per-trial random stream. Every stochastic decision of a trial draws from
/// the stream handed to it, never from a process-wide generator.
#[derive(Clone, Debug)]
pub struct TrialRng {
    rng: ChaCha20Rng,
}

impl TrialRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }

    /// Mix a stream id into a parent seed
    pub fn derive_seed(global_seed: u64, stream_id: u64) -> u64 {
        global_seed.wrapping_add(stream_id.wrapping_mul(0x9e3779b97f4a7c15))
    }

    pub fn from_trial_id(global_seed: u64, trial_id: u64) -> Self {
        Self::new(Self::derive_seed(global_seed, trial_id))
    }

    /// Stream of trial `trial_id` within scenario `scenario`. The trial id
    /// keys the generator and the scenario selects the ChaCha stream, so
    /// distinct `(scenario, trial)` pairs never share draws.
    pub fn for_scenario_trial(global_seed: u64, scenario: u64, trial_id: u64) -> Self {
        let mut rng = ChaCha20Rng::seed_from_u64(Self::derive_seed(global_seed, trial_id));
        rng.set_stream(scenario);
        Self { rng }
    }

    /// One Bernoulli(p) trial. `p = 0` never succeeds, `p = 1` always does.
    pub fn bernoulli(&mut self, p: f64) -> bool {
        self.rng.gen::<f64>() < p
    }

    /// Uniform sample of `amount` distinct nodes from `pool`
    pub fn sample_nodes(&mut self, pool: &[NodeId], amount: usize) -> Vec<NodeId> {
        pool.choose_multiple(&mut self.rng, amount).copied().collect()
    }
}

impl RngCore for TrialRng {
    fn next_u32(&mut self) -> u32 {
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.rng.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.rng.try_fill_bytes(dest)
    }
}
