use crate::config::NeatConfig;
use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

/// Index of a node inside its genome's node arena.
pub type NodeId = usize;

/// Historical marker shared by every copy of the same structural mutation.
pub type Innovation = u32;

/// Logistic activation used by every hidden and output node.
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// A single computational unit of a network.
///
/// Layer 0 holds the inputs and the bias, the last layer holds the outputs.
/// `input_sum` and `output` are scratch state for one forward pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeGene {
    pub id: NodeId,
    pub layer: usize,
    pub input_sum: f64,
    pub output: f64,
}

impl NodeGene {
    pub fn new(id: NodeId, layer: usize) -> Self {
        Self {
            id,
            layer,
            input_sum: 0.0,
            output: 0.0,
        }
    }

    /// Compute this node's output from the inputs accumulated so far.
    ///
    /// Layer 0 nodes keep the value written into `output` by the caller.
    pub fn activate(&mut self) -> f64 {
        if self.layer != 0 {
            self.output = sigmoid(self.input_sum);
        }
        self.output
    }

    /// A copy with the same identity and layer and cleared scratch state.
    pub fn fresh_copy(&self) -> Self {
        Self::new(self.id, self.layer)
    }
}

/// A weighted edge between two nodes of the same genome.
///
/// Endpoints are arena indices, never references, so a genome can be cloned
/// or crossed over without any node sharing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionGene {
    pub from: NodeId,
    pub to: NodeId,
    pub weight: f64,
    pub enabled: bool,
    pub innovation: Innovation,
}

impl ConnectionGene {
    pub fn new(from: NodeId, to: NodeId, weight: f64, innovation: Innovation) -> Self {
        Self {
            from,
            to,
            weight,
            enabled: true,
            innovation,
        }
    }

    /// Nudge or jump the weight.
    ///
    /// Only the step is bounded; the weight itself may drift anywhere.
    pub fn mutate_weight<R: Rng + ?Sized>(&mut self, rng: &mut R, config: &NeatConfig) {
        if rng.gen::<f64>() < config.weight_replace_prob {
            self.weight += rng.gen_range(-1.0..=1.0);
        } else {
            let gauss: f64 = rng.sample(StandardNormal);
            self.weight += (gauss / config.weight_perturb_divisor).clamp(-1.0, 1.0);
        }
    }

    /// Signal carried to the target node for a given source output.
    pub fn transmit(&self, value: f64) -> f64 {
        value * self.weight
    }
}
