use anyhow::{bail, Context, Result};
use neat::{NeatConfig, Population};
use serde::{Deserialize, Serialize};
use sim::{Arena, CourseConfig, TrainingPlan, TrainingSummary};
use std::path::Path;
use std::str::FromStr;

const DEFAULT_GENERATIONS: u32 = 100;
const DEFAULT_STAGNATION: u32 = 20;

/// Contents of the `NEAT_CONFIG` file. Missing sections and fields keep
/// their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub neat: NeatConfig,
    pub course: CourseConfig,
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }
}

/// Everything needed to start a run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOptions {
    pub settings: Settings,
    pub plan: TrainingPlan,
}

impl RunOptions {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build options from any variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = match lookup("NEAT_CONFIG") {
            Some(path) => Settings::load(Path::new(&path))?,
            None => Settings::default(),
        };

        if let Some(seed) = parse_var::<u64, _>(&lookup, "NEAT_SEED")? {
            settings.neat.seed = Some(seed);
            settings.course.seed = Some(seed);
        }

        let generations = parse_var(&lookup, "NEAT_GENERATIONS")?.unwrap_or(DEFAULT_GENERATIONS);
        // Zero turns stagnation handling off.
        let stagnation = parse_var(&lookup, "NEAT_STAGNATION")?.unwrap_or(DEFAULT_STAGNATION);

        Ok(Self {
            settings,
            plan: TrainingPlan {
                generations,
                stagnation_limit: (stagnation > 0).then_some(stagnation),
            },
        })
    }
}

fn parse_var<T, F>(lookup: &F, name: &str) -> Result<Option<T>>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(name) else {
        return Ok(None);
    };
    match raw.trim().parse() {
        Ok(value) => Ok(Some(value)),
        Err(_) => bail!("{} must be a non-negative integer, got {:?}", name, raw),
    }
}

pub struct Trainer {
    population: Population,
    arena: Arena,
    plan: TrainingPlan,
}

impl Trainer {
    pub fn new(options: RunOptions) -> Result<Self> {
        let population =
            Population::new(options.settings.neat).context("Invalid NEAT configuration")?;
        let arena = Arena::new(options.settings.course).context("Invalid course configuration")?;

        Ok(Self {
            population,
            arena,
            plan: options.plan,
        })
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    /// Train for the planned generations, logging each generation's
    /// statistics as a JSON line.
    pub fn run(&mut self) -> Result<TrainingSummary> {
        sim::train(&mut self.population, &mut self.arena, self.plan, |stats| {
            match serde_json::to_string(stats) {
                Ok(line) => tracing::info!(target: "trainer::stats", "{}", line),
                Err(e) => tracing::warn!("Failed to serialize generation stats: {}", e),
            }
        })
        .context("Training failed")
    }
}
