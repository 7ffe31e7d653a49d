use crate::error::{NeatError, Result};
use crate::innovation::InnovationMatching;
use serde::{Deserialize, Serialize};

/// Tunables for genome mutation, speciation and reproduction.
///
/// Every field has a default, so a partial JSON document is enough to
/// override a handful of values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NeatConfig {
    /// Number of agents kept alive each generation.
    pub population_size: usize,

    /// Network inputs, not counting the bias node.
    pub inputs: usize,

    pub outputs: usize,

    /// Connect every input (and the bias) to every output when an agent is
    /// first created. When false, agents start empty and the first mutation
    /// grows a single random connection.
    pub start_fully_connected: bool,

    /// Chance that `mutate` perturbs every connection weight.
    pub weight_mutation_prob: f64,

    /// Chance that a single weight mutation replaces the step with a
    /// uniform jump in `[-1, 1]` instead of a small gaussian nudge.
    pub weight_replace_prob: f64,

    /// The gaussian nudge is `N(0, 1) / weight_perturb_divisor`.
    pub weight_perturb_divisor: f64,

    pub add_connection_prob: f64,
    pub add_node_prob: f64,

    /// Coefficient applied to the disjoint and excess gene count.
    pub excess_coefficient: f64,

    /// Coefficient applied to the mean weight difference of matching genes.
    pub weight_diff_coefficient: f64,

    /// Genomes closer than this share a species.
    pub compatibility_threshold: f64,

    /// Weight difference reported when two genomes share no genes.
    pub no_match_weight_penalty: f64,

    /// Chance a matching gene is inherited disabled when either parent has
    /// it disabled.
    pub disabled_inherit_prob: f64,

    /// Chance an offspring is a mutated clone rather than a crossover child.
    pub clone_offspring_prob: f64,

    /// Species that have not improved for this many generations are removed.
    pub staleness_limit: u32,

    /// Species kept by a mass extinction.
    pub mass_extinction_survivors: usize,

    pub innovation_matching: InnovationMatching,

    /// Seed for the population's random stream. `None` draws from entropy.
    pub seed: Option<u64>,
}

impl Default for NeatConfig {
    fn default() -> Self {
        Self {
            population_size: 500,
            inputs: 4,
            outputs: 1,
            start_fully_connected: false,
            weight_mutation_prob: 0.8,
            weight_replace_prob: 0.1,
            weight_perturb_divisor: 50.0,
            add_connection_prob: 0.05,
            add_node_prob: 0.01,
            excess_coefficient: 1.0,
            weight_diff_coefficient: 0.5,
            compatibility_threshold: 3.0,
            no_match_weight_penalty: 100.0,
            disabled_inherit_prob: 0.75,
            clone_offspring_prob: 0.25,
            staleness_limit: 15,
            mass_extinction_survivors: 5,
            innovation_matching: InnovationMatching::GenomeShape,
            seed: None,
        }
    }
}

impl NeatConfig {
    /// Check that the configuration describes a population that can run.
    pub fn validate(&self) -> Result<()> {
        if self.population_size == 0 {
            return Err(NeatError::InvalidConfig(
                "population_size must be at least 1".into(),
            ));
        }
        if self.inputs == 0 || self.outputs == 0 {
            return Err(NeatError::InvalidConfig(format!(
                "networks need at least one input and one output, got {} and {}",
                self.inputs, self.outputs
            )));
        }

        let probabilities = [
            ("weight_mutation_prob", self.weight_mutation_prob),
            ("weight_replace_prob", self.weight_replace_prob),
            ("add_connection_prob", self.add_connection_prob),
            ("add_node_prob", self.add_node_prob),
            ("disabled_inherit_prob", self.disabled_inherit_prob),
            ("clone_offspring_prob", self.clone_offspring_prob),
        ];
        for (name, value) in probabilities {
            if !(0.0..=1.0).contains(&value) {
                return Err(NeatError::InvalidConfig(format!(
                    "{name} must be within [0, 1], got {value}"
                )));
            }
        }

        if self.weight_perturb_divisor <= 0.0 {
            return Err(NeatError::InvalidConfig(
                "weight_perturb_divisor must be positive".into(),
            ));
        }
        if self.compatibility_threshold <= 0.0 {
            return Err(NeatError::InvalidConfig(
                "compatibility_threshold must be positive".into(),
            ));
        }
        if self.mass_extinction_survivors == 0 {
            return Err(NeatError::InvalidConfig(
                "mass_extinction_survivors must be at least 1".into(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = NeatConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.population_size, 500);
        assert_eq!(config.staleness_limit, 15);
        assert_eq!(config.compatibility_threshold, 3.0);
    }

    #[test]
    fn test_rejects_out_of_range_probability() {
        let config = NeatConfig {
            add_node_prob: 1.5,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("add_node_prob"));
    }

    #[test]
    fn test_rejects_empty_network_shape() {
        let config = NeatConfig {
            outputs: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(NeatError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: NeatConfig =
            serde_json::from_str(r#"{ "population_size": 50, "seed": 7 }"#).unwrap();
        assert_eq!(config.population_size, 50);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.inputs, 4);
        assert_eq!(config.innovation_matching, InnovationMatching::GenomeShape);
    }
}
