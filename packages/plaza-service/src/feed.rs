//! The feed pipeline: resolve viewer, compile criteria, fan out to every
//! selected source, then score, diversify and window the merged candidates.

use std::{sync::Arc, time::Duration};

use time::OffsetDateTime;
use tokio::task::JoinSet;
use tracing::warn;
use uuid::Uuid;

use plaza_domain::{
	ConnectionStatus, ContentKind, Criteria, Facets, FeedItem, FeedMode, Page, ScoredItem,
	TagAxis, ViewerContext, assemble, filter_visible, score, time_ago,
};

use crate::{
	Error, FeedParams, FeedService, Result,
	criteria::{non_empty, split_csv},
	time_serde, viewer,
};

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TagRef {
	pub id: Uuid,
	pub name: String,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct FeedItemPayload {
	pub kind: ContentKind,
	pub id: Uuid,
	pub owner_id: Uuid,
	pub title: String,
	pub description: Option<String>,
	pub company: Option<String>,
	pub pitch: Option<String>,
	pub city: Option<String>,
	pub country: Option<String>,
	pub image_count: u32,
	#[serde(with = "time_serde")]
	pub created_at: OffsetDateTime,
	pub time_ago: String,
	pub match_percentage: u8,
	pub connection_status: ConnectionStatus,
	pub tags: Vec<TagRef>,
	pub facets: Facets,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct FeedResponse {
	pub items: Vec<FeedItemPayload>,
	pub offset: u32,
	pub limit: u32,
	pub mode: FeedMode,
	/// True when at least one source failed or timed out and the page was
	/// assembled from the rest.
	pub partial: bool,
	pub cache_key: String,
}

pub async fn feed(service: &FeedService, params: FeedParams) -> Result<FeedResponse> {
	let cfg = &service.cfg;
	let page = params.page(&cfg.feed)?;
	let kinds = params.kinds()?;
	let viewer_id = params.viewer_uuid()?;
	let viewer =
		Arc::new(viewer::resolve_viewer(service.seams.profile.as_ref(), viewer_id).await);
	let criteria = Arc::new(compile(service, &params, &viewer, kinds, page).await?);
	let cache_key = cache_key(&criteria, viewer.viewer_id);
	let (mut items, mut partial) = fan_out(service, &criteria, &viewer).await?;
	let mut served = Arc::clone(&criteria);

	// Personalized narrowing that matches nothing falls back to a plain
	// recency feed rather than an empty page.
	if criteria.mode == FeedMode::Personalized
		&& criteria.has_taxonomy_filter()
		&& items.is_empty()
	{
		served = Arc::new(criteria.without_personalization());

		let (fallback_items, fallback_partial) = fan_out(service, &served, &viewer).await?;

		items = fallback_items;
		partial = fallback_partial;
	}

	let visible = filter_visible(items, &viewer);
	let now = OffsetDateTime::now_utc();
	let scored: Vec<ScoredItem> = visible
		.into_iter()
		.map(|item| {
			let score = score(&item, &served, &viewer, &cfg.ranking, now);

			ScoredItem { item, score }
		})
		.collect();
	let ranked = assemble(scored, page, cfg.feed.max_seq);

	tracing::debug!(
		mode = ?served.mode,
		partial,
		page_len = ranked.items.len(),
		offset = ranked.offset,
		"feed assembled"
	);

	let items = shape(service, ranked.items, &viewer, now).await?;

	Ok(FeedResponse {
		items,
		offset: ranked.offset,
		limit: ranked.limit,
		mode: served.mode,
		partial,
		cache_key,
	})
}

/// Turns validated parameters into immutable criteria, resolving taxonomy
/// names and folding in stored interests when nothing explicit was given.
async fn compile(
	service: &FeedService,
	params: &FeedParams,
	viewer: &ViewerContext,
	kinds: Vec<ContentKind>,
	page: Page,
) -> Result<Criteria> {
	let explicit = params.has_explicit_filter();
	let mut builder = Criteria::builder().kinds(kinds).page(page);

	if let Some(query) = non_empty(&params.q) {
		builder = builder.text_query(&query);
	}
	builder = builder.countries(split_csv(&params.country)).cities(split_csv(&params.city));

	builder = builder
		.job_type(non_empty(&params.job_type))
		.price_type(non_empty(&params.price_type))
		.season(non_empty(&params.season));

	if explicit {
		for axis in TagAxis::ALL {
			let raw = params.axis_raw(axis);

			if raw.is_empty() {
				continue;
			}

			let ids = service.seams.taxonomy.resolve(axis, &raw).await?;

			builder = builder.axis_ids(axis, ids);
		}

		return Ok(builder.mode(FeedMode::Explicit).build());
	}

	if viewer.has_interests() {
		let interest_axes = [
			(TagAxis::Identity, &viewer.interest_identity_ids),
			(TagAxis::Category, &viewer.interest_category_ids),
			(TagAxis::Subcategory, &viewer.interest_subcategory_ids),
			(TagAxis::Subsubcategory, &viewer.interest_subsubcategory_ids),
		];

		for (axis, interests) in interest_axes {
			if !interests.is_empty() {
				// Sorted so identical requests compile to identical criteria
				// (and one cache key).
				let mut ids: Vec<Uuid> = interests.iter().copied().collect();

				ids.sort_unstable();

				builder = builder.axis_ids(axis, ids);
			}
		}

		return Ok(builder.mode(FeedMode::Personalized).build());
	}

	Ok(builder.mode(FeedMode::Unfiltered).build())
}

/// Queries every selected source concurrently, tolerating individual failures
/// and timeouts. Only a total wipeout is an error.
async fn fan_out(
	service: &FeedService,
	criteria: &Arc<Criteria>,
	viewer: &Arc<ViewerContext>,
) -> Result<(Vec<FeedItem>, bool)> {
	let buffer_limit = criteria.buffer_limit(&service.cfg.feed);
	let timeout = Duration::from_millis(service.cfg.feed.source_timeout_ms);
	let mut set = JoinSet::new();
	let mut selected = 0_usize;

	for source in &service.seams.sources {
		if !criteria.kinds.contains(&source.kind()) {
			continue;
		}

		selected += 1;

		let source = Arc::clone(source);
		let criteria = Arc::clone(criteria);
		let viewer = Arc::clone(viewer);

		set.spawn(async move {
			let kind = source.kind();
			let outcome =
				tokio::time::timeout(timeout, source.fetch(&criteria, &viewer, buffer_limit))
					.await;

			(kind, outcome)
		});
	}

	let mut items = Vec::new();
	let mut failed = 0_usize;

	while let Some(joined) = set.join_next().await {
		match joined {
			Ok((_, Ok(Ok(batch)))) => items.extend(batch),
			Ok((kind, Ok(Err(err)))) => {
				failed += 1;

				warn!(kind = kind.as_str(), error = %err, "content source failed");
			},
			Ok((kind, Err(_))) => {
				failed += 1;

				warn!(kind = kind.as_str(), "content source timed out");
			},
			Err(err) => {
				failed += 1;

				warn!(error = %err, "content source task aborted");
			},
		}
	}

	if selected > 0 && failed == selected {
		return Err(Error::Unavailable);
	}

	Ok((items, failed > 0))
}

/// Decorates the final page: relative age, match percentage, tag names and
/// the viewer's connection edge to each owner.
async fn shape(
	service: &FeedService,
	items: Vec<ScoredItem>,
	viewer: &ViewerContext,
	now: OffsetDateTime,
) -> Result<Vec<FeedItemPayload>> {
	let mut tag_ids: Vec<Uuid> = items.iter().flat_map(|scored| scored.item.tags.all_ids()).collect();

	tag_ids.sort_unstable();
	tag_ids.dedup();

	let names = service.seams.taxonomy.names(&tag_ids).await?;
	let statuses = match viewer.viewer_id {
		Some(viewer_id) => {
			let mut owner_ids: Vec<Uuid> =
				items.iter().map(|scored| scored.item.owner_id).collect();

			owner_ids.sort_unstable();
			owner_ids.dedup();

			Some(
				service
					.seams
					.profile
					.connection_statuses(viewer_id, &owner_ids)
					.await?,
			)
		},
		None => None,
	};

	Ok(items
		.into_iter()
		.map(|scored| {
			let item = scored.item;
			let connection_status = match &statuses {
				Some(statuses) =>
					statuses.get(&item.owner_id).copied().unwrap_or(ConnectionStatus::None),
				None => ConnectionStatus::Unauthenticated,
			};
			let mut tags: Vec<TagRef> = item
				.tags
				.all_ids()
				.filter_map(|id| names.get(&id).map(|name| TagRef { id, name: name.clone() }))
				.collect();

			tags.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
			tags.dedup_by(|a, b| a.id == b.id);

			FeedItemPayload {
				kind: item.kind,
				id: item.id,
				owner_id: item.owner_id,
				title: item.title,
				description: item.description,
				company: item.company,
				pitch: item.pitch,
				city: item.city,
				country: item.country,
				image_count: item.image_count,
				created_at: item.created_at,
				time_ago: time_ago(item.created_at, now),
				match_percentage: scored.score.round().clamp(0.0, 100.0) as u8,
				connection_status,
				tags,
				facets: item.facets,
			}
		})
		.collect())
}

/// Deterministic key over the compiled criteria and viewer identity, suitable
/// for response caching upstream.
fn cache_key(criteria: &Criteria, viewer_id: Option<Uuid>) -> String {
	let mut hasher = blake3::Hasher::new();

	if let Ok(bytes) = serde_json::to_vec(criteria) {
		hasher.update(&bytes);
	}
	if let Some(id) = viewer_id {
		hasher.update(id.as_bytes());
	}

	hasher.finalize().to_hex().to_string()
}
