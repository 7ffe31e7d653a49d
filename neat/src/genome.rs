use crate::config::NeatConfig;
use crate::error::{NeatError, Result};
use crate::genes::{ConnectionGene, Innovation, NodeGene, NodeId};
use crate::innovation::InnovationLedger;
use rand::Rng;
use std::collections::{HashMap, HashSet};

/// A layered feed-forward network encoded as node and connection genes.
///
/// Nodes live in an arena where a node's id is its index. Ids are assigned
/// as follows:
/// - `0..inputs` are the input nodes (layer 0)
/// - `inputs..inputs + outputs` are the output nodes (last layer)
/// - `inputs + outputs` is the bias node (layer 0, output pinned to 1)
/// - anything above is a hidden node created by `add_node`
///
/// Every enabled or disabled connection runs from a lower layer to a strictly
/// higher one, and no two connections share the same endpoints.
#[derive(Debug, Clone, PartialEq)]
pub struct Genome {
    nodes: Vec<NodeGene>,
    connections: Vec<ConnectionGene>,
    inputs: usize,
    outputs: usize,
    layers: usize,
    bias_node: NodeId,

    /// Node ids in execution order: layer by layer, ascending.
    network: Vec<NodeId>,

    /// Outgoing connection indices per node id.
    outgoing: Vec<Vec<usize>>,
}

impl Genome {
    /// Create an unconnected genome with one input layer and one output layer.
    pub fn new(inputs: usize, outputs: usize) -> Result<Self> {
        if inputs == 0 || outputs == 0 {
            return Err(NeatError::InvalidGenome(format!(
                "a genome needs at least one input and one output, got {inputs} and {outputs}"
            )));
        }

        let mut nodes = Vec::with_capacity(inputs + outputs + 1);
        for id in 0..inputs {
            nodes.push(NodeGene::new(id, 0));
        }
        for id in inputs..inputs + outputs {
            nodes.push(NodeGene::new(id, 1));
        }
        nodes.push(NodeGene::new(inputs + outputs, 0));

        Ok(Self::assemble(inputs, outputs, 2, nodes, Vec::new()))
    }

    /// Build a genome from explicit genes, checking every structural invariant.
    pub fn from_parts(
        inputs: usize,
        outputs: usize,
        layers: usize,
        nodes: Vec<NodeGene>,
        connections: Vec<ConnectionGene>,
    ) -> Result<Self> {
        let invalid = |msg: String| -> Result<Self> { Err(NeatError::InvalidGenome(msg)) };

        if inputs == 0 || outputs == 0 {
            return invalid("a genome needs at least one input and one output".into());
        }
        if layers < 2 {
            return invalid(format!("a genome needs at least 2 layers, got {layers}"));
        }
        let bias_node = inputs + outputs;
        if nodes.len() <= bias_node {
            return invalid(format!(
                "expected at least {} nodes, got {}",
                bias_node + 1,
                nodes.len()
            ));
        }

        let output_layer = layers - 1;
        let mut per_layer = vec![0usize; layers];
        for (index, node) in nodes.iter().enumerate() {
            if node.id != index {
                return invalid(format!("node at slot {index} carries id {}", node.id));
            }
            if node.layer >= layers {
                return invalid(format!(
                    "node {} sits on layer {} of a {layers}-layer genome",
                    node.id, node.layer
                ));
            }
            let expected = if index < inputs || index == bias_node {
                Some(0)
            } else if index < bias_node {
                Some(output_layer)
            } else {
                None
            };
            match expected {
                Some(layer) if node.layer != layer => {
                    return invalid(format!(
                        "node {} must sit on layer {layer}, found {}",
                        node.id, node.layer
                    ));
                }
                None if node.layer == 0 || node.layer == output_layer => {
                    return invalid(format!(
                        "hidden node {} must sit strictly between the input and output layers",
                        node.id
                    ));
                }
                _ => {}
            }
            per_layer[node.layer] += 1;
        }
        if per_layer[0] != inputs + 1 || per_layer[output_layer] != outputs {
            return invalid("input, bias and output layer populations do not match".into());
        }

        let mut edges = HashSet::new();
        let mut innovations = HashSet::new();
        for conn in &connections {
            let (Some(from), Some(to)) = (nodes.get(conn.from), nodes.get(conn.to)) else {
                return invalid(format!(
                    "connection {} references a missing node ({} -> {})",
                    conn.innovation, conn.from, conn.to
                ));
            };
            if from.layer >= to.layer {
                return invalid(format!(
                    "connection {} runs from layer {} to layer {}",
                    conn.innovation, from.layer, to.layer
                ));
            }
            if !edges.insert((conn.from, conn.to)) {
                return invalid(format!("duplicate edge {} -> {}", conn.from, conn.to));
            }
            if !innovations.insert(conn.innovation) {
                return invalid(format!("duplicate innovation {}", conn.innovation));
            }
        }

        let nodes = nodes.iter().map(NodeGene::fresh_copy).collect();
        Ok(Self::assemble(inputs, outputs, layers, nodes, connections))
    }

    fn assemble(
        inputs: usize,
        outputs: usize,
        layers: usize,
        nodes: Vec<NodeGene>,
        connections: Vec<ConnectionGene>,
    ) -> Self {
        let mut genome = Self {
            nodes,
            connections,
            inputs,
            outputs,
            layers,
            bias_node: inputs + outputs,
            network: Vec::new(),
            outgoing: Vec::new(),
        };
        genome.generate_network();
        genome
    }

    pub fn nodes(&self) -> &[NodeGene] {
        &self.nodes
    }

    pub fn connections(&self) -> &[ConnectionGene] {
        &self.connections
    }

    pub fn node(&self, id: NodeId) -> Option<&NodeGene> {
        self.nodes.get(id)
    }

    pub fn inputs(&self) -> usize {
        self.inputs
    }

    pub fn outputs(&self) -> usize {
        self.outputs
    }

    pub fn layers(&self) -> usize {
        self.layers
    }

    pub fn bias_node(&self) -> NodeId {
        self.bias_node
    }

    /// Cached execution order.
    pub fn network(&self) -> &[NodeId] {
        &self.network
    }

    /// Innovation ids of every connection, in gene order.
    pub fn innovations(&self) -> impl Iterator<Item = Innovation> + '_ {
        self.connections.iter().map(|conn| conn.innovation)
    }

    /// Rebuild the adjacency lists and the layer-ordered execution list.
    ///
    /// Must run after any topology change; the mutation operators call it
    /// themselves.
    pub fn generate_network(&mut self) {
        self.outgoing = vec![Vec::new(); self.nodes.len()];
        for (index, conn) in self.connections.iter().enumerate() {
            self.outgoing[conn.from].push(index);
        }

        self.network.clear();
        for layer in 0..self.layers {
            self.network
                .extend(self.nodes.iter().filter(|n| n.layer == layer).map(|n| n.id));
        }
    }

    /// Whether any connection joins `a` and `b`, in either direction.
    pub fn is_connected(&self, a: NodeId, b: NodeId) -> bool {
        self.connections
            .iter()
            .any(|c| (c.from == a && c.to == b) || (c.from == b && c.to == a))
    }

    /// Whether every pair of nodes on different layers is already joined.
    pub fn is_fully_connected(&self) -> bool {
        let mut per_layer = vec![0usize; self.layers];
        for node in &self.nodes {
            per_layer[node.layer] += 1;
        }

        // Each layer can reach every node on every layer above it.
        let mut max_connections = 0;
        let mut above: usize = per_layer.iter().sum();
        for count in &per_layer {
            above -= count;
            max_connections += count * above;
        }

        max_connections <= self.connections.len()
    }

    /// Join every input and the bias to every output with random weights.
    ///
    /// Pairs that are already joined are left alone, so calling this on a
    /// complete topology changes nothing.
    pub fn fully_connect<R: Rng + ?Sized>(&mut self, ledger: &mut InnovationLedger, rng: &mut R) {
        if self.is_fully_connected() {
            return;
        }

        let sources: Vec<NodeId> = (0..self.inputs).chain([self.bias_node]).collect();
        for from in sources {
            for to in self.inputs..self.inputs + self.outputs {
                if !self.is_connected(from, to) {
                    let weight = rng.gen_range(-1.0..=1.0);
                    self.push_connection(ledger, from, to, weight);
                }
            }
        }

        self.generate_network();
    }

    /// Run the network on one vision vector.
    ///
    /// Accumulators are cleared afterwards, so repeated calls with the same
    /// input and genome give the same output.
    pub fn feedforward(&mut self, inputs: &[f64]) -> Result<Vec<f64>> {
        if inputs.len() != self.inputs {
            return Err(NeatError::InputLength {
                expected: self.inputs,
                actual: inputs.len(),
            });
        }

        for (node, &value) in self.nodes.iter_mut().zip(inputs) {
            node.output = value;
        }
        self.nodes[self.bias_node].output = 1.0;

        for &id in &self.network {
            let output = self.nodes[id].activate();
            for &index in &self.outgoing[id] {
                let conn = &self.connections[index];
                if conn.enabled {
                    self.nodes[conn.to].input_sum += conn.transmit(output);
                }
            }
        }

        let outputs = self.nodes[self.inputs..self.inputs + self.outputs]
            .iter()
            .map(|node| node.output)
            .collect();

        for node in &mut self.nodes {
            node.input_sum = 0.0;
        }

        Ok(outputs)
    }

    /// Apply the composite mutation operator.
    pub fn mutate<R: Rng + ?Sized>(
        &mut self,
        ledger: &mut InnovationLedger,
        rng: &mut R,
        config: &NeatConfig,
    ) {
        if self.connections.is_empty() {
            self.add_connection(ledger, rng);
        }

        if rng.gen::<f64>() < config.weight_mutation_prob {
            for conn in &mut self.connections {
                conn.mutate_weight(rng, config);
            }
        }

        if rng.gen::<f64>() < config.add_connection_prob {
            self.add_connection(ledger, rng);
        }

        if rng.gen::<f64>() < config.add_node_prob {
            self.add_node(ledger, rng);
        }
    }

    /// Join two random unconnected nodes on different layers.
    ///
    /// Returns false, leaving the genome untouched, when no such pair exists.
    pub fn add_connection<R: Rng + ?Sized>(
        &mut self,
        ledger: &mut InnovationLedger,
        rng: &mut R,
    ) -> bool {
        if self.is_fully_connected() {
            tracing::debug!("connection mutation skipped: genome is fully connected");
            return false;
        }

        // Edges are unique, so a free pair exists while the count is below the maximum.
        let count = self.nodes.len();
        let (mut a, mut b) = (rng.gen_range(0..count), rng.gen_range(0..count));
        while self.nodes[a].layer == self.nodes[b].layer || self.is_connected(a, b) {
            a = rng.gen_range(0..count);
            b = rng.gen_range(0..count);
        }
        if self.nodes[a].layer > self.nodes[b].layer {
            std::mem::swap(&mut a, &mut b);
        }

        let weight = rng.gen_range(-1.0..=1.0);
        self.push_connection(ledger, a, b, weight);
        self.generate_network();
        true
    }

    /// Split a random enabled connection with a new hidden node.
    ///
    /// The split connection is disabled and replaced by `from -> new` (weight
    /// 1) and `new -> to` (the old weight), and the bias feeds the new node
    /// with weight 0. If the new node lands on the destination's layer, that
    /// layer and everything above it move up by one.
    pub fn add_node<R: Rng + ?Sized>(&mut self, ledger: &mut InnovationLedger, rng: &mut R) -> bool {
        if self.connections.is_empty() {
            return self.add_connection(ledger, rng);
        }

        let mut candidates: Vec<usize> = self
            .connections
            .iter()
            .enumerate()
            .filter(|(_, c)| c.enabled && c.from != self.bias_node)
            .map(|(index, _)| index)
            .collect();
        if candidates.is_empty() && self.connections.len() == 1 && self.connections[0].enabled {
            candidates.push(0);
        }
        if candidates.is_empty() {
            tracing::debug!("node mutation skipped: no enabled connection to split");
            return false;
        }

        let split = candidates[rng.gen_range(0..candidates.len())];
        self.connections[split].enabled = false;
        let ConnectionGene {
            from, to, weight, ..
        } = self.connections[split].clone();

        let new_id = self.nodes.len();
        let new_layer = self.nodes[from].layer + 1;
        self.nodes.push(NodeGene::new(new_id, new_layer));

        self.push_connection(ledger, from, new_id, 1.0);
        self.push_connection(ledger, new_id, to, weight);
        if from != self.bias_node {
            self.push_connection(ledger, self.bias_node, new_id, 0.0);
        }

        if new_layer == self.nodes[to].layer {
            for node in self.nodes.iter_mut().filter(|n| n.id != new_id) {
                if node.layer >= new_layer {
                    node.layer += 1;
                }
            }
            self.layers += 1;
        }

        self.generate_network();
        true
    }

    /// Breed a child from this (fitter) genome and `other`.
    ///
    /// Genes are aligned by innovation id. A matching gene comes from either
    /// parent with equal odds and is likely disabled if either parent has it
    /// disabled. Genes only this genome carries are inherited as-is; genes
    /// only `other` carries are dropped. The child takes this genome's nodes.
    pub fn crossover<R: Rng + ?Sized>(&self, other: &Genome, rng: &mut R, config: &NeatConfig) -> Genome {
        let theirs: HashMap<Innovation, &ConnectionGene> = other
            .connections
            .iter()
            .map(|conn| (conn.innovation, conn))
            .collect();

        let connections = self
            .connections
            .iter()
            .map(|mine| match theirs.get(&mine.innovation) {
                Some(other_gene) => {
                    let mut enabled = true;
                    if (!mine.enabled || !other_gene.enabled)
                        && rng.gen::<f64>() < config.disabled_inherit_prob
                    {
                        enabled = false;
                    }
                    let weight = if rng.gen::<f64>() < 0.5 {
                        mine.weight
                    } else {
                        other_gene.weight
                    };
                    ConnectionGene {
                        weight,
                        enabled,
                        ..mine.clone()
                    }
                }
                None => mine.clone(),
            })
            .collect();

        let nodes = self.nodes.iter().map(NodeGene::fresh_copy).collect();
        Self::assemble(self.inputs, self.outputs, self.layers, nodes, connections)
    }

    fn push_connection(&mut self, ledger: &mut InnovationLedger, from: NodeId, to: NodeId, weight: f64) {
        let innovation = ledger.get_or_create(from, to, self.innovations());
        self.connections
            .push(ConnectionGene::new(from, to, weight, innovation));
    }
}
