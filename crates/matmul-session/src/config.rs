use std::time::Duration;

use matmul_codec::{DEFAULT_DIMENSION, DEFAULT_ELEMENT_BOUND, MAX_DIMENSION};

use crate::error::{Result, SessionError};

/// Default delay after each round's handoff.
pub const DEFAULT_PACE: Duration = Duration::from_secs(1);

/// Session parameters, fixed for the session's lifetime.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Rounds to run. Zero ends the session immediately.
    pub round_count: u64,
    /// Dimension N shared by every matrix in the session.
    pub dimension: usize,
    /// Pause after each handoff so producer and consumer output don't interleave.
    pub pace: Duration,
    /// Seed for the operand generator; `None` seeds from OS entropy.
    pub seed: Option<u64>,
    /// Generated elements fall in `0..element_bound`.
    pub element_bound: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            round_count: 1,
            dimension: DEFAULT_DIMENSION,
            pace: DEFAULT_PACE,
            seed: None,
            element_bound: DEFAULT_ELEMENT_BOUND,
        }
    }
}

impl SessionConfig {
    /// Check the parameters before any task starts.
    pub fn validate(&self) -> Result<()> {
        if self.dimension == 0 || self.dimension > MAX_DIMENSION {
            return Err(SessionError::InvalidConfig(format!(
                "dimension must be between 1 and {MAX_DIMENSION}, got {}",
                self.dimension
            )));
        }
        if self.element_bound == 0 {
            return Err(SessionError::InvalidConfig(
                "element bound must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
