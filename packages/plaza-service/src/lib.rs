pub mod criteria;
pub mod feed;
pub mod postgres;
pub mod time_serde;
pub mod viewer;

mod error;

use std::{collections::HashMap, future::Future, pin::Pin, sync::Arc};

use uuid::Uuid;

pub use criteria::FeedParams;
pub use error::{Error, Result};
pub use feed::{FeedItemPayload, FeedResponse, TagRef};
use plaza_config::Config;
use plaza_domain::{ConnectionStatus, ContentKind, Criteria, FeedItem, TagAxis, ViewerContext};
use plaza_storage::db::Db;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// One content backend for one kind. Implementations must honor the criteria's
/// hard filters and the viewer's block and connections-only constraints.
pub trait ContentSource
where
	Self: Send + Sync,
{
	fn kind(&self) -> ContentKind;

	fn fetch<'a>(
		&'a self,
		criteria: &'a Criteria,
		viewer: &'a ViewerContext,
		buffer_limit: u32,
	) -> BoxFuture<'a, Result<Vec<FeedItem>>>;
}

pub trait ProfileReader
where
	Self: Send + Sync,
{
	fn viewer_context<'a>(&'a self, viewer_id: Uuid) -> BoxFuture<'a, Result<ViewerContext>>;

	fn connection_statuses<'a>(
		&'a self,
		viewer_id: Uuid,
		owner_ids: &'a [Uuid],
	) -> BoxFuture<'a, Result<HashMap<Uuid, ConnectionStatus>>>;
}

pub trait TaxonomyReader
where
	Self: Send + Sync,
{
	/// Resolves raw filter values (ids or names) on one axis to taxonomy ids.
	fn resolve<'a>(
		&'a self,
		axis: TagAxis,
		raw_values: &'a [String],
	) -> BoxFuture<'a, Result<Vec<Uuid>>>;

	fn names<'a>(&'a self, ids: &'a [Uuid]) -> BoxFuture<'a, Result<HashMap<Uuid, String>>>;
}

/// The pipeline's pluggable backends, bundled so tests can swap in in-memory
/// implementations wholesale.
#[derive(Clone)]
pub struct Seams {
	pub sources: Vec<Arc<dyn ContentSource>>,
	pub profile: Arc<dyn ProfileReader>,
	pub taxonomy: Arc<dyn TaxonomyReader>,
}
impl Seams {
	pub fn postgres(db: &Db) -> Self {
		let sources = ContentKind::ALL
			.into_iter()
			.map(|kind| {
				Arc::new(postgres::PgContentSource::new(kind, db.pool.clone()))
					as Arc<dyn ContentSource>
			})
			.collect();

		Self {
			sources,
			profile: Arc::new(postgres::PgProfileReader::new(db.pool.clone())),
			taxonomy: Arc::new(postgres::PgTaxonomyReader::new(db.pool.clone())),
		}
	}
}

#[derive(Clone)]
pub struct FeedService {
	pub cfg: Arc<Config>,
	pub seams: Seams,
}
impl FeedService {
	pub fn new(cfg: Arc<Config>, seams: Seams) -> Self {
		Self { cfg, seams }
	}

	pub async fn feed(&self, params: FeedParams) -> Result<FeedResponse> {
		feed::feed(self, params).await
	}
}
