mod aggregate;
mod areas;
pub mod columns;
mod error;

pub use error::KlimastatError;

pub use aggregate::error::AggregateError;
pub use aggregate::stats::ClimateStats;

pub use areas::catalog::{AreaCatalog, ContainmentMode, NationTranslations};
pub use areas::error::CatalogError;
pub use areas::resolved::{ResolvedArea, AUTOMATED_SOURCE};
