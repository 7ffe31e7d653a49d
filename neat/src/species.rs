use crate::agent::Agent;
use crate::config::NeatConfig;
use crate::error::{NeatError, Result};
use crate::genes::Innovation;
use crate::genome::Genome;
use crate::innovation::InnovationLedger;
use rand::Rng;
use std::collections::HashMap;

/// Staleness given to a species that lost all its members, guaranteeing
/// removal at the next kill pass.
pub const EMPTY_STALENESS: u32 = 200;

/// A cluster of mutually compatible agents.
///
/// Members are indices into the population's agent list and are only valid
/// for the generation they were assigned in.
#[derive(Debug, Clone)]
pub struct Species {
    members: Vec<usize>,
    representative: Genome,
    champion: Agent,
    best_fitness: f64,
    average_fitness: f64,
    staleness: u32,
}

impl Species {
    /// Found a species around a single agent.
    pub fn new(index: usize, founder: &Agent) -> Self {
        Self {
            members: vec![index],
            representative: founder.brain.clone(),
            champion: founder.clone(),
            best_fitness: founder.fitness,
            average_fitness: 0.0,
            staleness: 0,
        }
    }

    pub fn members(&self) -> &[usize] {
        &self.members
    }

    pub fn representative(&self) -> &Genome {
        &self.representative
    }

    pub fn champion(&self) -> &Agent {
        &self.champion
    }

    pub fn best_fitness(&self) -> f64 {
        self.best_fitness
    }

    pub fn average_fitness(&self) -> f64 {
        self.average_fitness
    }

    pub fn staleness(&self) -> u32 {
        self.staleness
    }

    pub fn add_member(&mut self, index: usize) {
        self.members.push(index);
    }

    pub fn clear_members(&mut self) {
        self.members.clear();
    }

    /// Whether `genome` is close enough to the representative to join.
    pub fn is_compatible(&self, genome: &Genome, config: &NeatConfig) -> bool {
        compatibility_distance(genome, &self.representative, config) < config.compatibility_threshold
    }

    /// Order members best first and refresh the champion.
    ///
    /// Equal fitness keeps the current member order.
    pub fn rank_members(&mut self, agents: &[Agent]) {
        self.members
            .sort_by(|&a, &b| agents[b].fitness.total_cmp(&agents[a].fitness));

        let Some(&top) = self.members.first() else {
            self.staleness = EMPTY_STALENESS;
            return;
        };

        let best = &agents[top];
        if best.fitness > self.best_fitness {
            self.staleness = 0;
            self.best_fitness = best.fitness;
            self.representative = best.brain.clone();
            self.champion = best.clone();
        } else {
            self.staleness += 1;
        }
    }

    /// Drop the bottom half of a ranked species. Pairs and singletons stay.
    pub fn cull(&mut self) {
        let len = self.members.len();
        if len > 2 {
            self.members.truncate(len / 2);
        }
    }

    /// Divide every member's fitness by the member count.
    pub fn fitness_sharing(&self, agents: &mut [Agent]) {
        let size = self.members.len() as f64;
        for &index in &self.members {
            agents[index].fitness /= size;
        }
    }

    pub fn set_average_fitness(&mut self, agents: &[Agent]) {
        self.average_fitness = if self.members.is_empty() {
            0.0
        } else {
            let total: f64 = self.members.iter().map(|&i| agents[i].fitness).sum();
            total / self.members.len() as f64
        };
    }

    /// Roulette-wheel pick weighted by fitness.
    ///
    /// Falls back to the first member when rounding leaves the draw above
    /// the running sum.
    pub fn select_parent<'a, R: Rng + ?Sized>(&self, agents: &'a [Agent], rng: &mut R) -> Option<&'a Agent> {
        let &first = self.members.first()?;

        let total: f64 = self.members.iter().map(|&i| agents[i].fitness).sum();
        let draw = rng.gen::<f64>() * total;

        let mut running = 0.0;
        for &index in &self.members {
            running += agents[index].fitness;
            if running > draw {
                return Some(&agents[index]);
            }
        }

        Some(&agents[first])
    }

    /// Breed one mutated child from this species.
    pub fn make_offspring<R: Rng + ?Sized>(
        &self,
        agents: &[Agent],
        ledger: &mut InnovationLedger,
        rng: &mut R,
        config: &NeatConfig,
    ) -> Result<Agent> {
        let mut child = if rng.gen::<f64>() < config.clone_offspring_prob {
            self.select_parent(agents, rng)
                .ok_or(NeatError::EmptySpecies)?
                .respawn()
        } else {
            let a = self.select_parent(agents, rng).ok_or(NeatError::EmptySpecies)?;
            let b = self.select_parent(agents, rng).ok_or(NeatError::EmptySpecies)?;
            if a.fitness < b.fitness {
                b.crossover(a, rng, config)
            } else {
                a.crossover(b, rng, config)
            }
        };

        child.brain.mutate(ledger, rng, config);
        Ok(child)
    }
}

/// Compatibility distance of `candidate` from `representative`.
///
/// Normalised by the candidate's gene count only, so the measure is not
/// symmetric when the two genomes differ in size.
pub fn compatibility_distance(candidate: &Genome, representative: &Genome, config: &NeatConfig) -> f64 {
    let unmatched = excess_and_disjoint(candidate, representative) as f64;
    let normalizer = candidate.connections().len().max(1) as f64;
    let weight_diff = average_weight_diff(candidate, representative, config.no_match_weight_penalty);

    config.excess_coefficient * unmatched / normalizer + config.weight_diff_coefficient * weight_diff
}

fn weights_by_innovation(genome: &Genome) -> HashMap<Innovation, f64> {
    genome
        .connections()
        .iter()
        .map(|conn| (conn.innovation, conn.weight))
        .collect()
}

/// Genes present in only one of the two genomes.
pub fn excess_and_disjoint(a: &Genome, b: &Genome) -> usize {
    let theirs = weights_by_innovation(b);
    let matching = a.innovations().filter(|i| theirs.contains_key(i)).count();
    a.connections().len() + b.connections().len() - 2 * matching
}

/// Mean absolute weight difference over matching genes, or `penalty` when
/// there is nothing to compare.
pub fn average_weight_diff(a: &Genome, b: &Genome, penalty: f64) -> f64 {
    if a.connections().is_empty() || b.connections().is_empty() {
        return penalty;
    }

    let theirs = weights_by_innovation(b);
    let (matching, total) = a
        .connections()
        .iter()
        .filter_map(|conn| theirs.get(&conn.innovation).map(|w| (conn.weight - w).abs()))
        .fold((0usize, 0.0), |(n, sum), diff| (n + 1, sum + diff));

    if matching == 0 {
        return penalty;
    }
    total / matching as f64
}
