use crate::genes::{Innovation, NodeId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// How the ledger decides that a requested edge was seen before.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InnovationMatching {
    /// Reuse an id only when the edge endpoints match and the requesting
    /// genome holds exactly the same set of innovations as the genome that
    /// first created the edge. Most structural mutations end up with a fresh
    /// id under this rule.
    GenomeShape,

    /// Reuse an id whenever the edge endpoints match.
    EdgeIdentity,
}

/// One structural mutation recorded by the ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct InnovationRecord {
    pub from: NodeId,
    pub to: NodeId,
    pub innovation: Innovation,

    /// Innovations held by the creating genome just before the edge was added.
    pub genome_innovations: BTreeSet<Innovation>,
}

/// Registry of every connection innovation handed out during a run.
///
/// Append-only. Mutation takes `&mut self`, so structural mutations across
/// genomes are serialised by the borrow checker; a parallel breeder would
/// need to wrap the ledger in a lock.
#[derive(Debug, Clone)]
pub struct InnovationLedger {
    matching: InnovationMatching,
    next_innovation: Innovation,
    records: Vec<InnovationRecord>,
}

impl InnovationLedger {
    pub fn new(matching: InnovationMatching) -> Self {
        Self {
            matching,
            next_innovation: 0,
            records: Vec::new(),
        }
    }

    /// Look up the innovation for `from -> to` as requested by a genome
    /// currently holding `genome_innovations`, recording a new one if no
    /// earlier record matches.
    pub fn get_or_create<I>(&mut self, from: NodeId, to: NodeId, genome_innovations: I) -> Innovation
    where
        I: IntoIterator<Item = Innovation>,
    {
        let shape: BTreeSet<Innovation> = genome_innovations.into_iter().collect();

        let existing = self.records.iter().find(|record| {
            record.from == from
                && record.to == to
                && match self.matching {
                    InnovationMatching::GenomeShape => record.genome_innovations == shape,
                    InnovationMatching::EdgeIdentity => true,
                }
        });
        if let Some(record) = existing {
            return record.innovation;
        }

        let innovation = self.next_innovation;
        self.next_innovation += 1;
        self.records.push(InnovationRecord {
            from,
            to,
            innovation,
            genome_innovations: shape,
        });
        innovation
    }

    pub fn matching(&self) -> InnovationMatching {
        self.matching
    }

    /// The id the next novel mutation will receive.
    pub fn next_innovation(&self) -> Innovation {
        self.next_innovation
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[InnovationRecord] {
        &self.records
    }
}

impl Default for InnovationLedger {
    fn default() -> Self {
        Self::new(InnovationMatching::GenomeShape)
    }
}
