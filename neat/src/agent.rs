use crate::config::NeatConfig;
use crate::environment::StepOutcome;
use crate::error::{NeatError, Result};
use crate::genome::Genome;
use rand::Rng;

/// A genome paired with the state it accumulates while being simulated.
#[derive(Debug, Clone, PartialEq)]
pub struct Agent {
    pub brain: Genome,

    /// Raw fitness after `calculate_fitness`, divided down by fitness sharing.
    pub fitness: f64,
    pub alive: bool,

    /// Obstacles passed in the current run.
    pub score: u32,

    /// Score of the agent this one was respawned from.
    pub best_score: u32,

    /// Ticks survived in the current run.
    pub lifespan: u32,

    /// Generation the agent was bred in.
    pub generation: u32,
}

impl Agent {
    /// Create a living agent with the given brain
    pub fn new(brain: Genome) -> Self {
        Self {
            brain,
            fitness: 0.0,
            alive: true,
            score: 0,
            best_score: 0,
            lifespan: 0,
            generation: 0,
        }
    }

    /// Feed the vision vector through the brain and return the first output.
    pub fn think(&mut self, vision: &[f64]) -> Result<f64> {
        let outputs = self.brain.feedforward(vision)?;
        outputs
            .first()
            .copied()
            .ok_or_else(|| NeatError::InvalidGenome("network has no outputs".into()))
    }

    /// Apply the environment's verdict for one tick.
    pub fn record_step(&mut self, outcome: StepOutcome) {
        self.alive = outcome.alive;
        self.score += outcome.score_delta;
        if self.alive {
            self.lifespan += 1;
        }
    }

    /// Rewards obstacles quadratically and survival time linearly.
    pub fn calculate_fitness(&mut self) {
        self.fitness = 1.0 + (self.score as f64).powi(2) + self.lifespan as f64 / 20.0;
    }

    /// A fresh, living copy for the next generation.
    ///
    /// The brain is deep-cloned; fitness and generation tag carry over, the
    /// run state starts again.
    pub fn respawn(&self) -> Self {
        Self {
            brain: self.brain.clone(),
            fitness: self.fitness,
            alive: true,
            score: 0,
            best_score: self.score,
            lifespan: 0,
            generation: self.generation,
        }
    }

    /// Breed with a less fit partner.
    pub fn crossover<R: Rng + ?Sized>(&self, other: &Agent, rng: &mut R, config: &NeatConfig) -> Self {
        Self::new(self.brain.crossover(&other.brain, rng, config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::innovation::InnovationLedger;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn wired_agent() -> Agent {
        let mut ledger = InnovationLedger::default();
        let mut brain = Genome::new(4, 1).unwrap();
        brain.fully_connect(&mut ledger, &mut StdRng::seed_from_u64(1));
        Agent::new(brain)
    }

    #[test]
    fn test_agent_creation() {
        let agent = wired_agent();
        assert!(agent.alive);
        assert_eq!(agent.score, 0);
        assert_eq!(agent.fitness, 0.0);
    }

    #[test]
    fn test_fitness_formula() {
        let mut agent = wired_agent();
        agent.score = 3;
        agent.lifespan = 40;
        agent.calculate_fitness();
        assert_eq!(agent.fitness, 1.0 + 9.0 + 2.0);
    }

    #[test]
    fn test_record_step() {
        let mut agent = wired_agent();
        agent.record_step(StepOutcome {
            alive: true,
            score_delta: 1,
        });
        assert_eq!((agent.score, agent.lifespan), (1, 1));

        agent.record_step(StepOutcome {
            alive: false,
            score_delta: 0,
        });
        assert!(!agent.alive);
        assert_eq!(agent.lifespan, 1);
    }

    #[test]
    fn test_think_returns_sigmoid_range() {
        let mut agent = wired_agent();
        let decision = agent.think(&[0.5, 0.1, -0.3, 0.9]).unwrap();
        assert!(decision > 0.0 && decision < 1.0);
    }

    #[test]
    fn test_think_rejects_short_vision() {
        let mut agent = wired_agent();
        assert!(agent.think(&[0.5]).is_err());
    }

    #[test]
    fn test_respawn_resets_run_state() {
        let mut agent = wired_agent();
        agent.score = 4;
        agent.lifespan = 100;
        agent.alive = false;
        agent.fitness = 12.0;
        agent.generation = 7;

        let next = agent.respawn();
        assert!(next.alive);
        assert_eq!(next.score, 0);
        assert_eq!(next.lifespan, 0);
        assert_eq!(next.best_score, 4);
        assert_eq!(next.fitness, 12.0);
        assert_eq!(next.generation, 7);
        assert_eq!(next.brain, agent.brain);
    }
}
