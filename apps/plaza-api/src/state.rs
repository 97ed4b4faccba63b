use std::sync::Arc;

use plaza_service::{FeedService, Seams};
use plaza_storage::db::Db;

#[derive(Clone)]
pub struct AppState {
	pub service: FeedService,
}
impl AppState {
	pub async fn new(config: plaza_config::Config) -> color_eyre::Result<Self> {
		let db = Db::connect(&config.storage.postgres).await?;

		db.ensure_schema().await?;

		let service = FeedService::new(Arc::new(config), Seams::postgres(&db));

		Ok(Self { service })
	}

	/// For tests that inject in-memory seams.
	pub fn with_service(service: FeedService) -> Self {
		Self { service }
	}
}
