mod trainer;

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use trainer::{RunOptions, Trainer};

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trainer=info,neat=info,sim=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let options = RunOptions::from_env()?;

    tracing::info!("Starting NEAT flock trainer");
    tracing::info!(
        "Population: {}, generations: {}",
        options.settings.neat.population_size,
        options.plan.generations
    );

    let mut trainer = Trainer::new(options)?;
    let summary = trainer.run()?;

    tracing::info!(
        "Finished {} generations, best score {}, {} mass extinctions",
        summary.generations,
        summary.global_best_score,
        summary.mass_extinctions
    );
    if let Some(best) = trainer.population().best_agent() {
        tracing::info!(
            "Best agent: generation {}, score {}, {} nodes, {} connections",
            best.generation,
            best.score,
            best.brain.nodes().len(),
            best.brain.connections().len()
        );
    }

    Ok(())
}
