use serde::{Deserialize, Serialize};

/// Summary of one completed generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    /// The generation that was evaluated.
    pub generation: u32,

    /// Species that survived into reproduction.
    pub species: usize,

    /// Best fitness before fitness sharing
    pub best_fitness: f64,

    /// Mean fitness before fitness sharing
    pub average_fitness: f64,

    /// Best score reached this generation.
    pub best_score: u32,

    /// Best score reached by any agent in the run so far.
    pub global_best_score: u32,

    /// Innovations recorded in the ledger so far.
    pub innovations: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_serialization() {
        let stats = GenerationStats {
            generation: 3,
            species: 4,
            best_fitness: 17.5,
            average_fitness: 2.25,
            best_score: 4,
            global_best_score: 6,
            innovations: 31,
        };
        let json = serde_json::to_string(&stats).unwrap();
        assert!(json.contains("\"global_best_score\":6"));
        let decoded: GenerationStats = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, stats);
    }
}
