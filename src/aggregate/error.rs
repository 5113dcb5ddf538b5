use polars::error::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AggregateError {
    #[error("Failed to materialize {operation} aggregation: {source}")]
    Collect {
        operation: &'static str,
        #[source]
        source: PolarsError,
    },

    #[error("Failed composing aggregation plan: {0}")]
    Plan(#[from] PolarsError),
}
