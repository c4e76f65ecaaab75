//! Error types for filter configuration and input validation
//!
//! Invariant violations inside the filter core (NaN weights, odd occlusion
//! edge parity, unit existence mass) are modeling bugs and abort the run via
//! panic with full state context. The errors here cover the recoverable
//! surface: bad configuration and malformed inputs.

use std::fmt;

/// Errors that can occur when building or driving a filter
#[derive(Debug, Clone)]
pub enum FilterError {
    /// Configuration error
    Configuration {
        /// Description of the configuration issue
        description: String,
    },

    /// A measurement referenced a lane outside the configured road
    InvalidLane {
        /// Lane index from the measurement
        lane: usize,
        /// Number of configured lanes
        lanes: usize,
    },
}

impl fmt::Display for FilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterError::Configuration { description } => {
                write!(f, "Configuration error: {}", description)
            }
            FilterError::InvalidLane { lane, lanes } => {
                write!(
                    f,
                    "Measurement references lane {} but only {} lanes are configured",
                    lane, lanes
                )
            }
        }
    }
}

impl std::error::Error for FilterError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_error_display() {
        let err = FilterError::Configuration {
            description: "particle count must be positive".to_string(),
        };
        assert!(err.to_string().contains("particle count"));
    }

    #[test]
    fn test_invalid_lane_display() {
        let err = FilterError::InvalidLane { lane: 7, lanes: 4 };
        assert!(err.to_string().contains("7"));
        assert!(err.to_string().contains("4"));
    }
}
