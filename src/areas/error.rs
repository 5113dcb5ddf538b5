use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to parse GeoJSON area catalog")]
    Parse(#[from] serde_json::Error),
}
