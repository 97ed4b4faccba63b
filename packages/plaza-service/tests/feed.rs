//! End-to-end pipeline tests over in-memory seams.

use std::sync::Arc;

use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use plaza_domain::{ConnectionStatus, ContentKind, FeedMode, TagAxis};
use plaza_service::{Error, FeedParams, FeedService};
use plaza_testkit::{
	InMemoryProfile, InMemoryTaxonomy, StaticSource, item, seams, test_config, viewer,
};

fn service(sources: Vec<StaticSource>, profile: InMemoryProfile) -> FeedService {
	FeedService::new(Arc::new(test_config()), seams(sources, profile, InMemoryTaxonomy::default()))
}

fn hours_ago(hours: i64) -> OffsetDateTime {
	OffsetDateTime::now_utc() - Duration::hours(hours)
}

#[tokio::test]
async fn unfiltered_feed_orders_by_recency() {
	let older = item(ContentKind::Job, "older", hours_ago(5));
	let newer = item(ContentKind::Job, "newer", hours_ago(1));
	let service = service(
		vec![StaticSource::new(ContentKind::Job, vec![older.clone(), newer.clone()])],
		InMemoryProfile::default(),
	);
	let response = service.feed(FeedParams::default()).await.unwrap();

	assert_eq!(response.mode, FeedMode::Unfiltered);
	assert_eq!(
		response.items.iter().map(|payload| payload.id).collect::<Vec<_>>(),
		vec![newer.id, older.id]
	);
	assert!(!response.partial);
}

#[tokio::test]
async fn explicit_category_filter_narrows_and_ranks() {
	let category = Uuid::new_v4();
	let mut tagged = item(ContentKind::Service, "tagged", hours_ago(10));

	tagged.tags.insert(TagAxis::Category, category);

	let untagged = item(ContentKind::Service, "untagged", hours_ago(1));
	let service = service(
		vec![StaticSource::new(ContentKind::Service, vec![tagged.clone(), untagged])],
		InMemoryProfile::default(),
	);
	let params =
		FeedParams { category_id: Some(category.to_string()), ..Default::default() };
	let response = service.feed(params).await.unwrap();

	assert_eq!(response.mode, FeedMode::Explicit);
	assert_eq!(response.items.len(), 1);
	assert_eq!(response.items[0].id, tagged.id);
	assert!(response.items[0].match_percentage > 0);
}

#[tokio::test]
async fn comma_separated_city_filter_matches_each_city() {
	let mut nairobi = item(ContentKind::Service, "nairobi", hours_ago(1));
	let mut mombasa = item(ContentKind::Service, "mombasa", hours_ago(2));
	let mut kisumu = item(ContentKind::Service, "kisumu", hours_ago(3));

	nairobi.city = Some("Nairobi".to_string());
	mombasa.city = Some("Mombasa".to_string());
	kisumu.city = Some("Kisumu".to_string());

	let service = service(
		vec![StaticSource::new(
			ContentKind::Service,
			vec![nairobi.clone(), mombasa.clone(), kisumu],
		)],
		InMemoryProfile::default(),
	);
	let params = FeedParams { city: Some("Nairobi,Mombasa".to_string()), ..Default::default() };
	let response = service.feed(params).await.unwrap();

	assert_eq!(response.mode, FeedMode::Explicit);
	assert_eq!(
		response.items.iter().map(|payload| payload.id).collect::<Vec<_>>(),
		vec![nairobi.id, mombasa.id]
	);
}

#[tokio::test]
async fn personalized_feed_narrows_to_interests() {
	let interest = Uuid::new_v4();
	let viewer_id = Uuid::new_v4();
	let mut context = viewer(viewer_id);

	context.interest_subcategory_ids.insert(interest);

	let mut matching = item(ContentKind::Product, "matching", hours_ago(8));

	matching.tags.insert(TagAxis::Subcategory, interest);

	let other = item(ContentKind::Product, "other", hours_ago(1));
	let service = service(
		vec![StaticSource::new(ContentKind::Product, vec![matching.clone(), other])],
		InMemoryProfile::with_viewer(context),
	);
	let params = FeedParams { viewer_id: Some(viewer_id.to_string()), ..Default::default() };
	let response = service.feed(params).await.unwrap();

	assert_eq!(response.mode, FeedMode::Personalized);
	assert_eq!(response.items.len(), 1);
	assert_eq!(response.items[0].id, matching.id);
}

#[tokio::test]
async fn personalized_feed_falls_back_to_recency_when_empty() {
	let viewer_id = Uuid::new_v4();
	let mut context = viewer(viewer_id);

	context.interest_category_ids.insert(Uuid::new_v4());

	let plain = item(ContentKind::Moment, "plain", hours_ago(2));
	let service = service(
		vec![StaticSource::new(ContentKind::Moment, vec![plain.clone()])],
		InMemoryProfile::with_viewer(context),
	);
	let params = FeedParams { viewer_id: Some(viewer_id.to_string()), ..Default::default() };
	let response = service.feed(params).await.unwrap();

	assert_eq!(response.mode, FeedMode::Unfiltered);
	assert_eq!(response.items.len(), 1);
	assert_eq!(response.items[0].id, plain.id);
}

#[tokio::test]
async fn blocked_owners_never_surface() {
	let viewer_id = Uuid::new_v4();
	let blocked = item(ContentKind::Need, "blocked", hours_ago(1));
	let visible = item(ContentKind::Need, "visible", hours_ago(2));
	let mut context = viewer(viewer_id);

	context.blocked_either_direction.insert(blocked.owner_id);

	let service = service(
		vec![StaticSource::new(ContentKind::Need, vec![blocked, visible.clone()])],
		InMemoryProfile::with_viewer(context),
	);
	let params = FeedParams { viewer_id: Some(viewer_id.to_string()), ..Default::default() };
	let response = service.feed(params).await.unwrap();

	assert_eq!(
		response.items.iter().map(|payload| payload.id).collect::<Vec<_>>(),
		vec![visible.id]
	);
}

#[tokio::test]
async fn one_failing_source_yields_a_partial_page() {
	let job = item(ContentKind::Job, "job", hours_ago(1));
	let service = service(
		vec![
			StaticSource::new(ContentKind::Job, vec![job.clone()]),
			StaticSource::failing(ContentKind::Event),
		],
		InMemoryProfile::default(),
	);
	let response = service.feed(FeedParams::default()).await.unwrap();

	assert!(response.partial);
	assert_eq!(response.items.len(), 1);
	assert_eq!(response.items[0].id, job.id);
}

#[tokio::test]
async fn hanging_source_times_out_into_a_partial_page() {
	let job = item(ContentKind::Job, "job", hours_ago(1));
	let service = service(
		vec![
			StaticSource::new(ContentKind::Job, vec![job.clone()]),
			StaticSource::hanging(ContentKind::Moment),
		],
		InMemoryProfile::default(),
	);
	let response = service.feed(FeedParams::default()).await.unwrap();

	assert!(response.partial);
	assert_eq!(response.items.len(), 1);
}

#[tokio::test]
async fn every_source_failing_is_unavailable() {
	let service = service(
		vec![StaticSource::failing(ContentKind::Job), StaticSource::failing(ContentKind::Event)],
		InMemoryProfile::default(),
	);

	assert!(matches!(service.feed(FeedParams::default()).await, Err(Error::Unavailable)));
}

#[tokio::test]
async fn unknown_taxonomy_name_is_rejected() {
	let service = service(
		vec![StaticSource::new(ContentKind::Job, Vec::new())],
		InMemoryProfile::default(),
	);
	let params =
		FeedParams { category_id: Some("no-such-category".to_string()), ..Default::default() };

	assert!(matches!(service.feed(params).await, Err(Error::UnknownTaxonomy { .. })));
}

#[tokio::test]
async fn malformed_limit_is_rejected_before_any_fetch() {
	let service =
		service(vec![StaticSource::failing(ContentKind::Job)], InMemoryProfile::default());
	let params = FeedParams { limit: Some("many".to_string()), ..Default::default() };

	assert!(matches!(service.feed(params).await, Err(Error::InvalidRequest { .. })));
}

#[tokio::test]
async fn unknown_viewer_id_degrades_to_anonymous() {
	let job = item(ContentKind::Job, "job", hours_ago(1));
	let service = service(
		vec![StaticSource::new(ContentKind::Job, vec![job])],
		InMemoryProfile::default(),
	);
	let params = FeedParams { viewer_id: Some(Uuid::new_v4().to_string()), ..Default::default() };
	let response = service.feed(params).await.unwrap();

	assert_eq!(response.items.len(), 1);
	assert_eq!(response.items[0].connection_status, ConnectionStatus::Unauthenticated);
}

#[tokio::test]
async fn connection_statuses_decorate_the_page() {
	let viewer_id = Uuid::new_v4();
	let connected = item(ContentKind::Event, "connected", hours_ago(1));
	let stranger = item(ContentKind::Event, "stranger", hours_ago(2));
	let mut profile = InMemoryProfile::with_viewer(viewer(viewer_id));

	profile.statuses.insert((viewer_id, connected.owner_id), ConnectionStatus::Connected);

	let service = service(
		vec![StaticSource::new(ContentKind::Event, vec![connected.clone(), stranger.clone()])],
		profile,
	);
	let params = FeedParams { viewer_id: Some(viewer_id.to_string()), ..Default::default() };
	let response = service.feed(params).await.unwrap();
	let by_id: std::collections::HashMap<Uuid, ConnectionStatus> =
		response.items.iter().map(|payload| (payload.id, payload.connection_status)).collect();

	assert_eq!(by_id[&connected.id], ConnectionStatus::Connected);
	assert_eq!(by_id[&stranger.id], ConnectionStatus::None);
}

#[tokio::test]
async fn adjacent_kinds_are_diversified() {
	let job_a = item(ContentKind::Job, "job a", hours_ago(1));
	let job_b = item(ContentKind::Job, "job b", hours_ago(2));
	let event = item(ContentKind::Event, "event", hours_ago(3));
	let service = service(
		vec![
			StaticSource::new(ContentKind::Job, vec![job_a.clone(), job_b.clone()]),
			StaticSource::new(ContentKind::Event, vec![event.clone()]),
		],
		InMemoryProfile::default(),
	);
	let response = service.feed(FeedParams::default()).await.unwrap();
	let kinds: Vec<ContentKind> = response.items.iter().map(|payload| payload.kind).collect();

	assert_eq!(kinds, vec![ContentKind::Job, ContentKind::Event, ContentKind::Job]);
}

#[tokio::test]
async fn windowing_is_stable_across_pages() {
	let items: Vec<_> = (0..30_i64)
		.map(|index| item(ContentKind::Tourism, &format!("post {index}"), hours_ago(index)))
		.collect();
	let service = service(
		vec![StaticSource::new(ContentKind::Tourism, items)],
		InMemoryProfile::default(),
	);
	let first = service
		.feed(FeedParams { limit: Some("10".to_string()), ..Default::default() })
		.await
		.unwrap();
	let second = service
		.feed(FeedParams {
			limit: Some("10".to_string()),
			offset: Some("10".to_string()),
			..Default::default()
		})
		.await
		.unwrap();
	let wide = service
		.feed(FeedParams { limit: Some("20".to_string()), ..Default::default() })
		.await
		.unwrap();
	let paged: Vec<Uuid> = first
		.items
		.iter()
		.chain(second.items.iter())
		.map(|payload| payload.id)
		.collect();
	let direct: Vec<Uuid> = wide.items.iter().map(|payload| payload.id).collect();

	assert_eq!(paged, direct);
}

#[tokio::test]
async fn tab_selects_kinds_and_cache_key_tracks_criteria() {
	let job = item(ContentKind::Job, "job", hours_ago(1));
	let event = item(ContentKind::Event, "event", hours_ago(2));
	let service = service(
		vec![
			StaticSource::new(ContentKind::Job, vec![job.clone()]),
			StaticSource::new(ContentKind::Event, vec![event]),
		],
		InMemoryProfile::default(),
	);
	let jobs_only = service
		.feed(FeedParams { tab: Some("job".to_string()), ..Default::default() })
		.await
		.unwrap();
	let all = service.feed(FeedParams::default()).await.unwrap();

	assert_eq!(jobs_only.items.iter().map(|payload| payload.id).collect::<Vec<_>>(), vec![job.id]);
	assert_ne!(jobs_only.cache_key, all.cache_key);

	let jobs_again = service
		.feed(FeedParams { tab: Some("job".to_string()), ..Default::default() })
		.await
		.unwrap();

	assert_eq!(jobs_only.cache_key, jobs_again.cache_key);
}

#[tokio::test]
async fn tag_names_are_resolved_for_display() {
	let category = Uuid::new_v4();
	let mut tagged = item(ContentKind::Funding, "campaign", hours_ago(1));

	tagged.tags.insert(TagAxis::Category, category);

	let service = FeedService::new(
		Arc::new(test_config()),
		seams(
			vec![StaticSource::new(ContentKind::Funding, vec![tagged])],
			InMemoryProfile::default(),
			InMemoryTaxonomy::named(&[(category, "Crafts")]),
		),
	);
	let response = service.feed(FeedParams::default()).await.unwrap();
	let tags = &response.items[0].tags;

	assert_eq!(tags.len(), 1);
	assert_eq!(tags[0].id, category);
	assert_eq!(tags[0].name, "Crafts");
}
