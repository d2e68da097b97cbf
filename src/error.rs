//! Error type shared by session control and input validation.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    /// Heat count was empty, non-numeric, or outside the accepted range.
    #[error("Please enter a valid number of heats. ({0})")]
    InvalidHeatCount(String),
    #[error("Invalid delay: {0}")]
    InvalidDelay(String),
    #[error("A session is already running")]
    AlreadyRunning,
    #[error("No session is running")]
    NotRunning,
    #[error("Heat {0} does not exist")]
    NoSuchHeat(u32),
    #[error("Lane {0} does not exist")]
    NoSuchLane(usize),
    #[error("Lane {lane} of heat {heat} is already stopped")]
    LaneAlreadyStopped { heat: u32, lane: usize },
}

impl SessionError {
    /// True for errors caused by the configuration form rather than by
    /// session state.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            SessionError::InvalidHeatCount(_) | SessionError::InvalidDelay(_)
        )
    }
}
