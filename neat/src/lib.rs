pub mod agent;
pub mod config;
pub mod environment;
pub mod error;
pub mod genes;
pub mod genome;
pub mod innovation;
pub mod population;
pub mod species;
pub mod stats;

pub use agent::Agent;
pub use config::NeatConfig;
pub use environment::{Environment, StepOutcome};
pub use error::{NeatError, Result};
pub use genes::{sigmoid, ConnectionGene, Innovation, NodeGene, NodeId};
pub use genome::Genome;
pub use innovation::{InnovationLedger, InnovationMatching};
pub use population::Population;
pub use species::{compatibility_distance, Species};
pub use stats::GenerationStats;
