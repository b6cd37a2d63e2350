use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    /// A required line item or series is absent. Indicators surface this as
    /// the "unavailable" state; the aggregator degrades the bucket to zero.
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// Model parameters that would make a formula meaningless, e.g. a DCF
    /// discount rate at or below the terminal growth rate.
    #[error("Invalid model configuration: {0}")]
    InvalidModelConfiguration(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}
