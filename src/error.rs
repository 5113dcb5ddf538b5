use crate::aggregate::error::AggregateError;
use crate::areas::error::CatalogError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum KlimastatError {
    #[error(transparent)]
    Aggregate(#[from] AggregateError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}
