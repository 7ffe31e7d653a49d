/// What happened to one agent during one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StepOutcome {
    pub alive: bool,
    pub score_delta: u32,
}

/// The world the agents are evaluated in.
///
/// Agents are addressed by their index in the population. The environment
/// owns each agent's body (position, velocity, collisions); the population
/// owns the brains and the fitness bookkeeping.
pub trait Environment {
    /// Prepare bodies for a fresh generation of `agents` agents.
    fn reset(&mut self, agents: usize);

    /// Move shared world state (obstacles) forward by one tick.
    fn advance(&mut self) {}

    /// Sensory vector for one agent, sized to the network's input count.
    fn sense(&self, agent: usize) -> Vec<f64>;

    /// Apply an agent's decision and run its physics for one tick.
    fn step(&mut self, agent: usize, decision: f64) -> StepOutcome;

    fn all_agents_dead(&self) -> bool;

    /// Hard cap on ticks per generation, if any.
    fn tick_limit(&self) -> Option<u64> {
        None
    }
}
