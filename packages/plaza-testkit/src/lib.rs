//! In-memory seam implementations and fixtures for exercising the feed
//! pipeline without Postgres. The in-memory source applies the same hard
//! filters the real queries push down, so pipeline tests see realistic
//! candidate sets.

use std::{
	collections::HashMap,
	sync::Arc,
	time::Duration,
};

use time::OffsetDateTime;
use uuid::Uuid;

use plaza_config::{Config, Postgres, Service, Storage};
use plaza_domain::{
	ConnectionStatus, ContentKind, Criteria, FeedItem, TagAxis, TagSet, ViewerContext,
	text_matches,
};
use plaza_service::{
	BoxFuture, ContentSource, Error, ProfileReader, Result, Seams, TaxonomyReader,
};

/// A config with in-memory-friendly timeouts; the Postgres DSN is never
/// dialed by tests built on this kit.
pub fn test_config() -> Config {
	Config {
		service: Service { http_bind: "127.0.0.1:0".to_string(), log_level: "warn".to_string() },
		storage: Storage {
			postgres: Postgres {
				dsn: "postgres://unused@localhost/unused".to_string(),
				pool_max_conns: 1,
			},
		},
		feed: plaza_config::Feed { source_timeout_ms: 100, ..Default::default() },
		ranking: Default::default(),
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceBehavior {
	Ok,
	Fail,
	/// Sleeps past the pipeline's per-source timeout.
	Hang,
}

pub struct StaticSource {
	kind: ContentKind,
	items: Vec<FeedItem>,
	behavior: SourceBehavior,
}
impl StaticSource {
	pub fn new(kind: ContentKind, items: Vec<FeedItem>) -> Self {
		Self { kind, items, behavior: SourceBehavior::Ok }
	}

	pub fn failing(kind: ContentKind) -> Self {
		Self { kind, items: Vec::new(), behavior: SourceBehavior::Fail }
	}

	pub fn hanging(kind: ContentKind) -> Self {
		Self { kind, items: Vec::new(), behavior: SourceBehavior::Hang }
	}
}
impl ContentSource for StaticSource {
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
			match self.behavior {
				SourceBehavior::Fail =>
					return Err(Error::Storage { message: "simulated source failure".to_string() }),
				SourceBehavior::Hang => tokio::time::sleep(Duration::from_secs(60)).await,
				SourceBehavior::Ok => {},
			}

			let mut matched: Vec<FeedItem> = self
				.items
				.iter()
				.filter(|item| matches(item, criteria, viewer))
				.cloned()
				.collect();

			// Same order and truncation the storage queries apply.
			matched.sort_by(|a, b| {
				b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id))
			});
			matched.truncate(buffer_limit as usize);

			Ok(matched)
		})
	}
}

/// Mirrors the hard predicates of the Postgres readers.
fn matches(item: &FeedItem, criteria: &Criteria, viewer: &ViewerContext) -> bool {
	if viewer.blocked_either_direction.contains(&item.owner_id) {
		return false;
	}
	if viewer.connections_only
		&& let Some(viewer_id) = viewer.viewer_id
		&& item.owner_id != viewer_id
		&& !viewer.connected_user_ids.contains(&item.owner_id)
	{
		return false;
	}
	if !criteria.countries.is_empty()
		&& !item.country.as_deref().is_some_and(|country| {
			criteria.countries.iter().any(|wanted| wanted.eq_ignore_ascii_case(country))
		}) {
		return false;
	}
	if !criteria.cities.is_empty()
		&& !item.city.as_deref().is_some_and(|city| {
			criteria.cities.iter().any(|wanted| wanted.eq_ignore_ascii_case(city))
		}) {
		return false;
	}
	if !criteria.text_terms.is_empty() && !text_matches(item, &criteria.text_terms) {
		return false;
	}
	if let Some(job_type) = criteria.job_type.as_deref()
		&& item.facets.job_type.as_deref() != Some(job_type)
	{
		return false;
	}
	if let Some(price_type) = criteria.price_type.as_deref()
		&& item.facets.price_type.as_deref() != Some(price_type)
	{
		return false;
	}
	if let Some(season) = criteria.season.as_deref()
		&& item.facets.season.as_deref() != Some(season)
	{
		return false;
	}

	for axis in TagAxis::ALL {
		let ids = criteria.ids(axis);

		if !ids.is_empty() && item.tags.overlap(axis, ids) == 0 {
			return false;
		}
	}

	true
}

#[derive(Default)]
pub struct InMemoryProfile {
	pub contexts: HashMap<Uuid, ViewerContext>,
	pub statuses: HashMap<(Uuid, Uuid), ConnectionStatus>,
}
impl InMemoryProfile {
	pub fn with_viewer(context: ViewerContext) -> Self {
		let mut profile = Self::default();

		if let Some(id) = context.viewer_id {
			profile.contexts.insert(id, context);
		}

		profile
	}
}
impl ProfileReader for InMemoryProfile {
	fn viewer_context<'a>(&'a self, viewer_id: Uuid) -> BoxFuture<'a, Result<ViewerContext>> {
		Box::pin(async move {
			self.contexts
				.get(&viewer_id)
				.cloned()
				.ok_or_else(|| Error::NotFound { message: format!("user {viewer_id}") })
		})
	}

	fn connection_statuses<'a>(
		&'a self,
		viewer_id: Uuid,
		owner_ids: &'a [Uuid],
	) -> BoxFuture<'a, Result<HashMap<Uuid, ConnectionStatus>>> {
		Box::pin(async move {
			Ok(owner_ids
				.iter()
				.filter_map(|owner_id| {
					self.statuses
						.get(&(viewer_id, *owner_id))
						.map(|status| (*owner_id, *status))
				})
				.collect())
		})
	}
}

#[derive(Default)]
pub struct InMemoryTaxonomy {
	pub names: HashMap<Uuid, String>,
}
impl InMemoryTaxonomy {
	pub fn named(entries: &[(Uuid, &str)]) -> Self {
		Self {
			names: entries.iter().map(|(id, name)| (*id, name.to_string())).collect(),
		}
	}
}
impl TaxonomyReader for InMemoryTaxonomy {
	fn resolve<'a>(
		&'a self,
		_axis: TagAxis,
		raw_values: &'a [String],
	) -> BoxFuture<'a, Result<Vec<Uuid>>> {
		Box::pin(async move {
			let mut ids = Vec::with_capacity(raw_values.len());

			for raw in raw_values {
				if let Ok(id) = Uuid::parse_str(raw.trim()) {
					ids.push(id);

					continue;
				}

				let found = self
					.names
					.iter()
					.find(|(_, name)| name.eq_ignore_ascii_case(raw.trim()))
					.map(|(id, _)| *id);

				match found {
					Some(id) => ids.push(id),
					None =>
						return Err(Error::UnknownTaxonomy { message: raw.trim().to_string() }),
				}
			}

			Ok(ids)
		})
	}

	fn names<'a>(&'a self, ids: &'a [Uuid]) -> BoxFuture<'a, Result<HashMap<Uuid, String>>> {
		Box::pin(async move {
			Ok(ids
				.iter()
				.filter_map(|id| self.names.get(id).map(|name| (*id, name.clone())))
				.collect())
		})
	}
}

/// Bundles in-memory seams; pass one source per kind under test.
pub fn seams(
	sources: Vec<StaticSource>,
	profile: InMemoryProfile,
	taxonomy: InMemoryTaxonomy,
) -> Seams {
	Seams {
		sources: sources
			.into_iter()
			.map(|source| Arc::new(source) as Arc<dyn ContentSource>)
			.collect(),
		profile: Arc::new(profile),
		taxonomy: Arc::new(taxonomy),
	}
}

/// A minimal valid item; tests override what they assert on.
pub fn item(kind: ContentKind, title: &str, created_at: OffsetDateTime) -> FeedItem {
	FeedItem {
		kind,
		id: Uuid::new_v4(),
		owner_id: Uuid::new_v4(),
		title: title.to_string(),
		description: Some(format!("{title} description")),
		company: None,
		pitch: None,
		city: None,
		country: None,
		image_count: 0,
		created_at,
		tags: TagSet::default(),
		facets: Default::default(),
	}
}

pub fn viewer(viewer_id: Uuid) -> ViewerContext {
	ViewerContext::anonymous(Some(viewer_id))
}
