pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Unknown taxonomy value: {message}")]
	UnknownTaxonomy { message: String },
	#[error("Not found: {message}")]
	NotFound { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
	#[error("Every content source failed; feed unavailable.")]
	Unavailable,
}
impl From<plaza_storage::Error> for Error {
	fn from(err: plaza_storage::Error) -> Self {
		match err {
			plaza_storage::Error::Sqlx(inner) => Self::Storage { message: inner.to_string() },
			plaza_storage::Error::UnknownTaxonomy(message) => Self::UnknownTaxonomy { message },
			plaza_storage::Error::NotFound(message) => Self::NotFound { message },
		}
	}
}
