//! Postgres-backed seam implementations, thin adapters over `plaza_storage`.

use std::collections::HashMap;

use sqlx::PgPool;
use uuid::Uuid;

use plaza_domain::{ConnectionStatus, ContentKind, Criteria, FeedItem, TagAxis, ViewerContext};
use plaza_storage::{profile, sources, taxonomy};

use crate::{BoxFuture, ContentSource, ProfileReader, Result, TaxonomyReader};

pub struct PgContentSource {
	kind: ContentKind,
	pool: PgPool,
}
impl PgContentSource {
	pub fn new(kind: ContentKind, pool: PgPool) -> Self {
		Self { kind, pool }
	}
}
impl ContentSource for PgContentSource {
	fn kind(&self) -> ContentKind {
		self.kind
	}

	fn fetch<'a>(
		&'a self,
		criteria: &'a Criteria,
		viewer: &'a ViewerContext,
		buffer_limit: u32,
	) -> BoxFuture<'a, Result<Vec<FeedItem>>> {
		Box::pin(async move {
			sources::fetch_kind(&self.pool, self.kind, criteria, viewer, buffer_limit)
				.await
				.map_err(Into::into)
		})
	}
}

pub struct PgProfileReader {
	pool: PgPool,
}
impl PgProfileReader {
	pub fn new(pool: PgPool) -> Self {
		Self { pool }
	}
}
impl ProfileReader for PgProfileReader {
	fn viewer_context<'a>(&'a self, viewer_id: Uuid) -> BoxFuture<'a, Result<ViewerContext>> {
		Box::pin(async move {
			profile::viewer_context(&self.pool, viewer_id).await.map_err(Into::into)
		})
	}

	fn connection_statuses<'a>(
		&'a self,
		viewer_id: Uuid,
		owner_ids: &'a [Uuid],
	) -> BoxFuture<'a, Result<HashMap<Uuid, ConnectionStatus>>> {
		Box::pin(async move {
			profile::connection_status_map(&self.pool, viewer_id, owner_ids)
				.await
				.map_err(Into::into)
		})
	}
}

pub struct PgTaxonomyReader {
	pool: PgPool,
}
impl PgTaxonomyReader {
	pub fn new(pool: PgPool) -> Self {
		Self { pool }
	}
}
impl TaxonomyReader for PgTaxonomyReader {
	fn resolve<'a>(
		&'a self,
		axis: TagAxis,
		raw_values: &'a [String],
	) -> BoxFuture<'a, Result<Vec<Uuid>>> {
		Box::pin(async move {
			taxonomy::resolve_ids_or_names(&self.pool, axis, raw_values)
				.await
				.map_err(Into::into)
		})
	}

	fn names<'a>(&'a self, ids: &'a [Uuid]) -> BoxFuture<'a, Result<HashMap<Uuid, String>>> {
		Box::pin(async move { taxonomy::tag_names(&self.pool, ids).await.map_err(Into::into) })
	}
}
