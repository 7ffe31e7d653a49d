use crate::agent::Agent;
use crate::config::NeatConfig;
use crate::environment::Environment;
use crate::error::{NeatError, Result};
use crate::genome::Genome;
use crate::innovation::InnovationLedger;
use crate::species::Species;
use crate::stats::GenerationStats;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Every agent of the run, the species they fall into, and the shared
/// innovation ledger.
pub struct Population {
    config: NeatConfig,
    agents: Vec<Agent>,
    species: Vec<Species>,
    ledger: InnovationLedger,
    generation: u32,

    /// Best score of any generation champion so far.
    best_score: u32,

    /// Best score of any agent so far, updated every tick.
    global_best_score: u32,

    best_agent: Option<Agent>,

    /// Snapshot of each generation champion that raised `best_score`.
    champions: Vec<Agent>,

    mass_extinction_pending: bool,
    rng: StdRng,
}

impl Population {
    /// Create the first generation.
    ///
    /// Every agent starts from a minimal (or fully connected) genome and is
    /// mutated once, so an empty genome always leaves with one connection.
    pub fn new(config: NeatConfig) -> Result<Self> {
        config.validate()?;

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut ledger = InnovationLedger::new(config.innovation_matching);

        let mut agents = Vec::with_capacity(config.population_size);
        for _ in 0..config.population_size {
            let mut brain = Genome::new(config.inputs, config.outputs)?;
            if config.start_fully_connected {
                brain.fully_connect(&mut ledger, &mut rng);
            }
            brain.mutate(&mut ledger, &mut rng, &config);

            let mut agent = Agent::new(brain);
            agent.generation = 1;
            agents.push(agent);
        }

        tracing::info!(
            population = config.population_size,
            inputs = config.inputs,
            outputs = config.outputs,
            "population initialised"
        );

        Ok(Self {
            config,
            agents,
            species: Vec::new(),
            ledger,
            generation: 1,
            best_score: 0,
            global_best_score: 0,
            best_agent: None,
            champions: Vec::new(),
            mass_extinction_pending: false,
            rng,
        })
    }

    pub fn config(&self) -> &NeatConfig {
        &self.config
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn species(&self) -> &[Species] {
        &self.species
    }

    pub fn ledger(&self) -> &InnovationLedger {
        &self.ledger
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn best_score(&self) -> u32 {
        self.best_score
    }

    pub fn global_best_score(&self) -> u32 {
        self.global_best_score
    }

    pub fn best_agent(&self) -> Option<&Agent> {
        self.best_agent.as_ref()
    }

    pub fn champions(&self) -> &[Agent] {
        &self.champions
    }

    /// True once no agent is alive.
    pub fn done(&self) -> bool {
        !self.agents.iter().any(|agent| agent.alive)
    }

    /// The first living agent, or the first agent once all are dead.
    pub fn current_best(&self) -> Option<&Agent> {
        self.agents
            .iter()
            .find(|agent| agent.alive)
            .or_else(|| self.agents.first())
    }

    /// Keep only the strongest species at the next `natural_selection`.
    pub fn request_mass_extinction(&mut self) {
        self.mass_extinction_pending = true;
    }

    pub fn is_mass_extinction_pending(&self) -> bool {
        self.mass_extinction_pending
    }

    /// Let every living agent sense, think and act for one tick.
    pub fn update_alive<E: Environment + ?Sized>(&mut self, env: &mut E) -> Result<()> {
        for (index, agent) in self.agents.iter_mut().enumerate() {
            if !agent.alive {
                continue;
            }

            let vision = env.sense(index);
            let decision = agent.think(&vision)?;
            agent.record_step(env.step(index, decision));

            if agent.score > self.global_best_score {
                self.global_best_score = agent.score;
            }
        }
        Ok(())
    }

    /// Simulate the current generation until every agent is dead (or the
    /// environment's tick cap is hit), then breed the next one.
    pub fn run_generation<E: Environment + ?Sized>(&mut self, env: &mut E) -> Result<GenerationStats> {
        env.reset(self.agents.len());

        let mut ticks: u64 = 0;
        while !self.done() && !env.all_agents_dead() {
            if env.tick_limit().is_some_and(|limit| ticks >= limit) {
                tracing::debug!(ticks, "tick limit reached, ending generation");
                break;
            }
            env.advance();
            self.update_alive(env)?;
            ticks += 1;
        }

        self.natural_selection()
    }

    /// Replace the current generation with its offspring.
    ///
    /// Fails with `PopulationExtinct` when no species survives to breed.
    pub fn natural_selection(&mut self) -> Result<GenerationStats> {
        let evaluated = self.generation;

        self.speciate();
        self.calculate_fitness();

        let best_fitness = self
            .agents
            .iter()
            .map(|agent| agent.fitness)
            .fold(0.0, f64::max);
        let average_fitness =
            self.agents.iter().map(|agent| agent.fitness).sum::<f64>() / self.agents.len() as f64;
        let best_score = self.agents.iter().map(|agent| agent.score).max().unwrap_or(0);

        self.sort_species();
        let generation_best = self.select_best_agent();
        if self.mass_extinction_pending {
            self.mass_extinction();
            self.mass_extinction_pending = false;
        }
        self.cull_species();
        self.kill_species();

        if self.species.is_empty() {
            tracing::warn!(generation = evaluated, "every species was removed");
            return Err(NeatError::PopulationExtinct);
        }

        let children = self.reproduce(generation_best)?;
        self.agents = children;
        self.generation += 1;
        for agent in &mut self.agents {
            agent.brain.generate_network();
        }
        for species in &mut self.species {
            species.clear_members();
        }

        let stats = GenerationStats {
            generation: evaluated,
            species: self.species.len(),
            best_fitness,
            average_fitness,
            best_score,
            global_best_score: self.global_best_score,
            innovations: self.ledger.len(),
        };
        tracing::info!(
            generation = stats.generation,
            species = stats.species,
            best_score = stats.best_score,
            global_best_score = stats.global_best_score,
            "generation complete"
        );
        Ok(stats)
    }

    /// Assign every agent to the first compatible species, founding new
    /// species as needed.
    pub fn speciate(&mut self) {
        for species in &mut self.species {
            species.clear_members();
        }

        for (index, agent) in self.agents.iter().enumerate() {
            match self
                .species
                .iter_mut()
                .find(|species| species.is_compatible(&agent.brain, &self.config))
            {
                Some(species) => species.add_member(index),
                None => self.species.push(Species::new(index, agent)),
            }
        }
    }

    pub fn calculate_fitness(&mut self) {
        for agent in &mut self.agents {
            agent.calculate_fitness();
        }
    }

    /// Rank members inside each species, then order the species best first.
    pub fn sort_species(&mut self) {
        for species in &mut self.species {
            species.rank_members(&self.agents);
        }
        self.species
            .sort_by(|a, b| b.best_fitness().total_cmp(&a.best_fitness()));
    }

    /// Halve each species, share its fitness and refresh its average.
    pub fn cull_species(&mut self) {
        for species in &mut self.species {
            species.cull();
            species.fitness_sharing(&mut self.agents);
            species.set_average_fitness(&self.agents);
        }
    }

    /// Keep only the top species by best fitness.
    pub fn mass_extinction(&mut self) {
        let keep = self.config.mass_extinction_survivors;
        if self.species.len() > keep {
            tracing::warn!(
                removed = self.species.len() - keep,
                kept = keep,
                "mass extinction"
            );
            self.species.truncate(keep);
        }
    }

    /// Remove stale species and species too weak to earn a single child.
    pub fn kill_species(&mut self) {
        let total = self.average_fitness_sum();
        let size = self.config.population_size as f64;
        let limit = self.config.staleness_limit;

        let before = self.species.len();
        self.species.retain(|species| {
            species.staleness() < limit
                && expected_offspring(species.average_fitness(), total, size) >= 1.0
        });

        if self.species.len() < before {
            tracing::debug!(
                removed = before - self.species.len(),
                remaining = self.species.len(),
                "species removed"
            );
        }
    }

    fn average_fitness_sum(&self) -> f64 {
        self.species.iter().map(Species::average_fitness).sum()
    }

    /// Record the fittest agent of this generation, by raw fitness.
    ///
    /// Species order reflects historical bests, so every species' ranked
    /// leader is compared. Must run before fitness sharing.
    fn select_best_agent(&mut self) -> Option<Agent> {
        let agents = &self.agents;
        let index = self
            .species
            .iter()
            .filter_map(|species| species.members().first().copied())
            .reduce(|best, index| {
                if agents[index].fitness > agents[best].fitness {
                    index
                } else {
                    best
                }
            })?;

        let mut best = self.agents[index].clone();
        best.generation = self.generation;

        if best.score > self.best_score {
            tracing::info!(old = self.best_score, new = best.score, "new best score");
            self.best_score = best.score;
            self.champions.push(best.clone());
            self.best_agent = Some(best.clone());
        }

        Some(best)
    }

    fn reproduce(&mut self, generation_best: Option<Agent>) -> Result<Vec<Agent>> {
        let target = self.config.population_size;
        let total = self.average_fitness_sum();
        let next_generation = self.generation + 1;

        let mut children = Vec::with_capacity(target);
        for species in &self.species {
            children.push(species.champion().respawn());

            let share = expected_offspring(species.average_fitness(), total, target as f64).floor() as usize;
            for _ in 1..share {
                let mut child =
                    species.make_offspring(&self.agents, &mut self.ledger, &mut self.rng, &self.config)?;
                child.generation = next_generation;
                children.push(child);
            }
        }

        if children.len() < target {
            if let Some(best) = generation_best {
                children.push(best.respawn());
            }
        }

        let first = self.species.first().ok_or(NeatError::PopulationExtinct)?;
        while children.len() < target {
            let mut child = first.make_offspring(&self.agents, &mut self.ledger, &mut self.rng, &self.config)?;
            child.generation = next_generation;
            children.push(child);
        }

        Ok(children)
    }
}

/// Children a species earns from its share of the summed average fitness.
fn expected_offspring(average: f64, total: f64, population_size: f64) -> f64 {
    if total > 0.0 {
        average / total * population_size
    } else {
        0.0
    }
}
