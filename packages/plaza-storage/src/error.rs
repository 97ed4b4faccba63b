#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Sqlx(#[from] sqlx::Error),
	#[error("Unknown taxonomy reference: {0}")]
	UnknownTaxonomy(String),
	#[error("Not found: {0}")]
	NotFound(String),
}
