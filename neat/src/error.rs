use thiserror::Error;

/// Errors raised by the evolution engine.
///
/// Only unrecoverable conditions are represented here. A mutation that finds
/// no room to grow is not an error; it is logged and skipped.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum NeatError {
    /// A genome was assembled from parts that do not form a layered
    /// feed-forward network.
    #[error("invalid genome: {0}")]
    InvalidGenome(String),

    /// `feedforward` was handed a vision vector of the wrong size.
    #[error("expected {expected} network inputs, got {actual}")]
    InputLength { expected: usize, actual: usize },

    /// Every species was removed before reproduction.
    #[error("population extinct: no species survived culling")]
    PopulationExtinct,

    /// Offspring were requested from a species with no members.
    #[error("cannot breed from an empty species")]
    EmptySpecies,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, NeatError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extinction_message_names_the_invariant() {
        let message = NeatError::PopulationExtinct.to_string();
        assert_eq!(message, "population extinct: no species survived culling");
    }

    #[test]
    fn test_input_length_message() {
        let err = NeatError::InputLength {
            expected: 4,
            actual: 3,
        };
        assert_eq!(err.to_string(), "expected 4 network inputs, got 3");
    }
}
