// Ingestion (fetch + CSV decode) feeds processing (date parsing + normalization)

pub mod ingestion;
pub mod processing;
