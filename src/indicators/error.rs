use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndicatorError {
    /// Fewer data points than the calculation needs.
    InsufficientData { required: usize, actual: usize },
    InvalidPeriod(usize),
}

impl fmt::Display for IndicatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorError::InsufficientData { required, actual } => write!(
                f,
                "insufficient data: need at least {} points, got {}",
                required, actual
            ),
            IndicatorError::InvalidPeriod(period) => write!(f, "invalid period: {}", period),
        }
    }
}

impl std::error::Error for IndicatorError {}
