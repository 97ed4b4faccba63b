use time::{Duration, OffsetDateTime, macros::datetime};
use uuid::Uuid;

use plaza_config::Ranking;
use plaza_domain::{
	ContentKind, Criteria, FeedItem, FeedMode, Page, TagAxis, TagSet, ViewerContext, score,
};

const NOW: OffsetDateTime = datetime!(2026-03-01 12:00 UTC);

fn item(kind: ContentKind) -> FeedItem {
	FeedItem {
		kind,
		id: Uuid::new_v4(),
		owner_id: Uuid::new_v4(),
		title: "Community pottery workshop".to_string(),
		description: Some("Hands-on wheel throwing for beginners.".to_string()),
		company: None,
		pitch: None,
		city: Some("Nairobi".to_string()),
		country: Some("Kenya".to_string()),
		image_count: 0,
		created_at: NOW,
		tags: TagSet::default(),
		facets: Default::default(),
	}
}

fn explicit_criteria(axis: TagAxis, ids: Vec<Uuid>) -> Criteria {
	Criteria::builder()
		.mode(FeedMode::Explicit)
		.axis_ids(axis, ids)
		.page(Page { limit: 20, offset: 0 })
		.build()
}

#[test]
fn unfiltered_mode_scores_zero() {
	let criteria = Criteria::builder().build();
	let viewer = ViewerContext::anonymous(None);

	assert_eq!(score(&item(ContentKind::Job), &criteria, &viewer, &Ranking::default(), NOW), 0.0);
}

#[test]
fn score_is_bounded() {
	let ranking = Ranking::default();
	let c1 = Uuid::new_v4();
	let s1 = Uuid::new_v4();
	let ss1 = Uuid::new_v4();
	let i1 = Uuid::new_v4();
	let mut full = item(ContentKind::Event);

	full.tags.insert(TagAxis::Category, c1);
	full.tags.insert(TagAxis::Subcategory, s1);
	full.tags.insert(TagAxis::Subsubcategory, ss1);
	full.tags.insert(TagAxis::Identity, i1);

	let criteria = Criteria::builder()
		.mode(FeedMode::Explicit)
		.axis_ids(TagAxis::Category, vec![c1])
		.axis_ids(TagAxis::Subcategory, vec![s1])
		.axis_ids(TagAxis::Subsubcategory, vec![ss1])
		.axis_ids(TagAxis::Identity, vec![i1])
		.text_query("pottery")
		.cities(vec!["Nairobi".to_string()])
		.countries(vec!["Kenya".to_string()])
		.build();
	let mut viewer = ViewerContext::anonymous(Some(Uuid::new_v4()));

	viewer.interest_category_ids.insert(c1);

	let value = score(&full, &criteria, &viewer, &ranking, NOW);

	assert!(value > 0.0);
	assert!(value <= 100.0);

	let bare = item(ContentKind::Need);
	let low = score(&bare, &criteria, &ViewerContext::anonymous(None), &ranking, NOW);

	assert!((0.0..=100.0).contains(&low));
}

#[test]
fn explicit_partial_credit_orders_by_matched_share() {
	let ranking = Ranking::default();
	let viewer = ViewerContext::anonymous(None);
	let a = Uuid::new_v4();
	let b = Uuid::new_v4();
	let criteria = explicit_criteria(TagAxis::Category, vec![a, b]);
	let mut both = item(ContentKind::Job);
	let mut one = item(ContentKind::Job);
	let none = item(ContentKind::Job);

	both.tags.insert(TagAxis::Category, a);
	both.tags.insert(TagAxis::Category, b);
	one.tags.insert(TagAxis::Category, a);

	let score_both = score(&both, &criteria, &viewer, &ranking, NOW);
	let score_one = score(&one, &criteria, &viewer, &ranking, NOW);
	let score_none = score(&none, &criteria, &viewer, &ranking, NOW);

	assert!(score_both > score_one);
	assert!(score_one > score_none);
}

#[test]
fn text_match_awards_flat_bonus() {
	let ranking = Ranking::default();
	let viewer = ViewerContext::anonymous(None);
	let category = Uuid::new_v4();
	let mut criteria = explicit_criteria(TagAxis::Category, vec![category]);

	criteria.text_terms = vec!["pottery".to_string()];

	let mut matching = item(ContentKind::Service);
	let mut plain = item(ContentKind::Service);

	matching.tags.insert(TagAxis::Category, category);
	plain.tags.insert(TagAxis::Category, category);
	plain.title = "Accounting help".to_string();
	plain.description = None;

	let with_text = score(&matching, &criteria, &viewer, &ranking, NOW);
	let without_text = score(&plain, &criteria, &viewer, &ranking, NOW);

	assert!((with_text - without_text - ranking.text_weight).abs() < 1e-4);
}

#[test]
fn city_match_beats_country_only_match() {
	let ranking = Ranking::default();
	let viewer = ViewerContext::anonymous(None);
	let mut criteria = explicit_criteria(TagAxis::Category, vec![Uuid::new_v4()]);

	criteria.cities = vec!["nairobi".to_string()];
	criteria.countries = vec!["Kenya".to_string()];

	let in_city = item(ContentKind::Tourism);
	let mut in_country = item(ContentKind::Tourism);

	in_country.city = Some("Mombasa".to_string());

	let city_score = score(&in_city, &criteria, &viewer, &ranking, NOW);
	let country_score = score(&in_country, &criteria, &viewer, &ranking, NOW);

	assert!(city_score > country_score);
	assert!(country_score > 0.0);
}

#[test]
fn viewer_interests_break_explicit_ties() {
	let ranking = Ranking::default();
	let category = Uuid::new_v4();
	let interest = Uuid::new_v4();
	let criteria = explicit_criteria(TagAxis::Category, vec![category]);
	let mut favored = item(ContentKind::Product);
	let mut other = item(ContentKind::Product);

	favored.tags.insert(TagAxis::Category, category);
	favored.tags.insert(TagAxis::Subcategory, interest);
	other.tags.insert(TagAxis::Category, category);

	let mut viewer = ViewerContext::anonymous(Some(Uuid::new_v4()));

	viewer.interest_subcategory_ids.insert(interest);

	let favored_score = score(&favored, &criteria, &viewer, &ranking, NOW);
	let other_score = score(&other, &criteria, &viewer, &ranking, NOW);

	assert!(favored_score > other_score);
	// The tie-break stays small relative to a whole filter level.
	assert!(favored_score - other_score < ranking.explicit.category);
}

#[test]
fn matching_interest_outranks_non_matching_even_when_older() {
	let ranking = Ranking::default();
	let s1 = Uuid::new_v4();
	let s2 = Uuid::new_v4();
	let criteria = Criteria::builder().mode(FeedMode::Personalized).build();
	let mut viewer = ViewerContext::anonymous(Some(Uuid::new_v4()));

	viewer.interest_subcategory_ids.insert(s1);

	let mut matching = item(ContentKind::Event);
	let mut other = item(ContentKind::Event);

	matching.tags.insert(TagAxis::Subcategory, s1);
	other.tags.insert(TagAxis::Subcategory, s2);
	other.created_at = NOW - Duration::hours(1);

	let a = score(&matching, &criteria, &viewer, &ranking, NOW);
	let b = score(&other, &criteria, &viewer, &ranking, NOW);

	assert!(a > b);
}

#[test]
fn single_incidental_match_is_scaled_down() {
	let ranking = Ranking::default();
	let s1 = Uuid::new_v4();
	let criteria = Criteria::builder().mode(FeedMode::Personalized).build();
	let mut viewer = ViewerContext::anonymous(Some(Uuid::new_v4()));

	viewer.interest_subcategory_ids.insert(s1);

	let mut matching = item(ContentKind::Funding);

	// Old enough that no recency bonus muddies the arithmetic.
	matching.created_at = NOW - Duration::days(30);
	matching.city = None;
	matching.country = None;
	matching.tags.insert(TagAxis::Subcategory, s1);

	let value = score(&matching, &criteria, &viewer, &ranking, NOW);
	let unscaled = ranking.personalized.subcategory;
	let expected = unscaled * (1.0 / ranking.min_factors as f32).max(ranking.min_factor_floor);

	assert!((value - expected).abs() < 1e-3);
	assert!(value < unscaled);
}

#[test]
fn recency_bonus_decays_linearly_within_window() {
	let ranking = Ranking::default();
	let s1 = Uuid::new_v4();
	let criteria = Criteria::builder().mode(FeedMode::Personalized).build();
	let mut viewer = ViewerContext::anonymous(Some(Uuid::new_v4()));

	viewer.interest_subcategory_ids.insert(s1);

	let mut fresh = item(ContentKind::Moment);
	let mut week_old = item(ContentKind::Moment);
	let mut stale = item(ContentKind::Moment);

	for candidate in [&mut fresh, &mut week_old, &mut stale] {
		candidate.tags.insert(TagAxis::Subcategory, s1);
	}

	week_old.created_at = NOW - Duration::days(7);
	stale.created_at = NOW - Duration::days(60);

	let fresh_score = score(&fresh, &criteria, &viewer, &ranking, NOW);
	let week_score = score(&week_old, &criteria, &viewer, &ranking, NOW);
	let stale_score = score(&stale, &criteria, &viewer, &ranking, NOW);

	assert!(fresh_score > week_score);
	assert!(week_score > stale_score);
}

#[test]
fn scoring_is_deterministic() {
	let ranking = Ranking::default();
	let category = Uuid::new_v4();
	let criteria = explicit_criteria(TagAxis::Category, vec![category]);
	let mut candidate = item(ContentKind::Job);

	candidate.tags.insert(TagAxis::Category, category);

	let viewer = ViewerContext::anonymous(None);
	let first = score(&candidate, &criteria, &viewer, &ranking, NOW);
	let second = score(&candidate, &criteria, &viewer, &ranking, NOW);

	assert_eq!(first, second);
}
