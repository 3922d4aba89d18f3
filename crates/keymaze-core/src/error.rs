//! Fatal generation failures
//!
//! Retries inside the pipeline are internal control flow; only unrecoverable
//! outcomes surface here. A fatal error means the configuration (room, key,
//! and switch budgets versus the spatial constraints) is likely
//! unsatisfiable and must be changed by the caller.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerateError {
    #[error("gave up after {attempts} attempts; budgets are likely unsatisfiable for these constraints")]
    RetryLimitExceeded { attempts: u32 },

    #[error(
        "cannot fit {max_keys} key levels into {max_rooms} rooms; lower the key budget or unlock the boss room"
    )]
    RoomBudgetExhausted { max_rooms: usize, max_keys: usize },

    #[error("constraints supplied no candidate entrance rooms")]
    NoEntranceCandidates,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GenerateError::RetryLimitExceeded { attempts: 20 };
        assert!(err.to_string().contains("20 attempts"));

        let err = GenerateError::RoomBudgetExhausted {
            max_rooms: 2,
            max_keys: 3,
        };
        assert!(err.to_string().contains("3 key levels"));
        assert!(err.to_string().contains("2 rooms"));
    }
}
