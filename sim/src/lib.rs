pub mod arena;
pub mod bird;
pub mod config;
pub mod course;
pub mod error;

pub use arena::Arena;
pub use bird::Bird;
pub use config::CourseConfig;
pub use course::{Course, Pipe, PipePair};
pub use error::{Result, SimError};

use neat::{GenerationStats, Population};

/// How long to train and when to shake up a stuck population.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrainingPlan {
    pub generations: u32,

    /// Generations without a new global best before a mass extinction is
    /// requested. `None` never requests one.
    pub stagnation_limit: Option<u32>,
}

/// Outcome of a whole training run.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSummary {
    pub generations: u32,
    pub global_best_score: u32,
    pub mass_extinctions: u32,
}

/// Evolve `population` on `arena` for the planned number of generations,
/// handing each generation's statistics to `report`.
pub fn train<F>(
    population: &mut Population,
    arena: &mut Arena,
    plan: TrainingPlan,
    mut report: F,
) -> Result<TrainingSummary>
where
    F: FnMut(&GenerationStats),
{
    let mut summary = TrainingSummary {
        generations: 0,
        global_best_score: population.global_best_score(),
        mass_extinctions: 0,
    };
    let mut since_improvement = 0;

    for _ in 0..plan.generations {
        let stats = population.run_generation(arena)?;
        report(&stats);
        summary.generations += 1;

        if stats.global_best_score > summary.global_best_score {
            summary.global_best_score = stats.global_best_score;
            since_improvement = 0;
        } else {
            since_improvement += 1;
        }

        if plan.stagnation_limit.is_some_and(|limit| since_improvement >= limit) {
            tracing::warn!(
                generation = stats.generation,
                stagnant_for = since_improvement,
                "no progress, requesting mass extinction"
            );
            population.request_mass_extinction();
            summary.mass_extinctions += 1;
            since_improvement = 0;
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use neat::NeatConfig;

    fn setup(seed: u64) -> (Population, Arena) {
        let population = Population::new(NeatConfig {
            population_size: 20,
            seed: Some(seed),
            ..Default::default()
        })
        .unwrap();
        let arena = Arena::new(CourseConfig {
            seed: Some(seed),
            max_ticks: Some(3_000),
            ..Default::default()
        })
        .unwrap();
        (population, arena)
    }

    #[test]
    fn test_training_runs() {
        let (mut population, mut arena) = setup(1);
        let mut reported = Vec::new();

        let summary = train(
            &mut population,
            &mut arena,
            TrainingPlan {
                generations: 3,
                stagnation_limit: None,
            },
            |stats| reported.push(stats.clone()),
        )
        .unwrap();

        assert_eq!(summary.generations, 3);
        assert_eq!(summary.mass_extinctions, 0);
        assert_eq!(reported.len(), 3);
        assert_eq!(
            reported.iter().map(|s| s.generation).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert_eq!(population.generation(), 4);
        assert_eq!(population.agents().len(), 20);
        assert!(arena.ticks <= 3_000);
    }

    #[test]
    fn test_stagnation_requests_mass_extinction() {
        let (mut population, _) = setup(2);
        // Pipes that never move can never be passed, so nobody scores.
        let mut arena = Arena::new(CourseConfig {
            pipe_speed: 0.0,
            seed: Some(2),
            max_ticks: Some(500),
            ..Default::default()
        })
        .unwrap();

        let summary = train(
            &mut population,
            &mut arena,
            TrainingPlan {
                generations: 4,
                stagnation_limit: Some(2),
            },
            |_| {},
        )
        .unwrap();

        assert_eq!(summary.global_best_score, 0);
        assert_eq!(summary.mass_extinctions, 2);
    }
}
