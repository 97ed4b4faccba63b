//! Deterministic relevance scoring. A score is a pure function of
//! `(item, criteria, viewer, now)` and always lands in `[0, 100]`.

use std::collections::HashSet;

use plaza_config::{LevelWeights, Ranking};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
	criteria::{Criteria, FeedMode},
	item::FeedItem,
	taxonomy::TagAxis,
	viewer::ViewerContext,
};

pub const MAX_SCORE: f32 = 100.0;

pub fn score(
	item: &FeedItem,
	criteria: &Criteria,
	viewer: &ViewerContext,
	ranking: &Ranking,
	now: OffsetDateTime,
) -> f32 {
	let raw = match criteria.mode {
		FeedMode::Unfiltered => 0.0,
		FeedMode::Explicit => explicit_score(item, criteria, viewer, ranking),
		FeedMode::Personalized => personalized_score(item, viewer, ranking, now),
	};

	raw.clamp(0.0, MAX_SCORE)
}

/// Any query term appearing (case-insensitive substring) in one of the item's
/// text fields counts as a text match.
pub fn text_matches(item: &FeedItem, terms: &[String]) -> bool {
	if terms.is_empty() {
		return false;
	}

	let haystacks = [
		Some(item.title.as_str()),
		item.description.as_deref(),
		item.company.as_deref(),
		item.city.as_deref(),
		item.pitch.as_deref(),
	];

	terms.iter().any(|term| {
		let term = term.to_lowercase();

		haystacks
			.iter()
			.flatten()
			.any(|haystack| haystack.to_lowercase().contains(&term))
	})
}

/// Partial credit for one axis: matched share of the requested set, capped at
/// full credit.
fn filter_credit(item: &FeedItem, axis: TagAxis, filter: &[Uuid]) -> f32 {
	if filter.is_empty() {
		return 0.0;
	}

	let matched = item.tags.overlap(axis, filter);

	(matched as f32 / filter.len() as f32).min(1.0)
}

fn interest_credit(tags: &HashSet<Uuid>, interests: &HashSet<Uuid>) -> f32 {
	if interests.is_empty() {
		return 0.0;
	}

	let matched = tags.intersection(interests).count();

	(matched as f32 / interests.len() as f32).min(1.0)
}

fn location_credit(
	city: Option<&str>,
	country: Option<&str>,
	cities: &[String],
	countries: &[String],
	ranking: &Ranking,
) -> f32 {
	let city_matched = match city {
		Some(city) => cities.iter().any(|wanted| wanted.eq_ignore_ascii_case(city)),
		None => false,
	};

	if city_matched {
		return ranking.city_weight;
	}

	let country_matched = match country {
		Some(country) => countries.iter().any(|wanted| wanted.eq_ignore_ascii_case(country)),
		None => false,
	};

	if country_matched { ranking.country_weight } else { 0.0 }
}

fn explicit_score(
	item: &FeedItem,
	criteria: &Criteria,
	viewer: &ViewerContext,
	ranking: &Ranking,
) -> f32 {
	let weights = &ranking.explicit;
	let mut total = 0.0;

	for (axis, weight) in hierarchy_weights(weights) {
		total += weight * filter_credit(item, axis, criteria.ids(axis));
	}

	if text_matches(item, &criteria.text_terms) {
		total += ranking.text_weight;
	}

	total += location_credit(
		item.city.as_deref(),
		item.country.as_deref(),
		&criteria.cities,
		&criteria.countries,
		ranking,
	);

	// Stored interests never override an explicit filter; they only separate
	// otherwise-equal results.
	total += ranking.tie_breaker_weight * interest_fraction(item, viewer);

	total
}

fn personalized_score(
	item: &FeedItem,
	viewer: &ViewerContext,
	ranking: &Ranking,
	now: OffsetDateTime,
) -> f32 {
	let weights = &ranking.personalized;
	let mut total = 0.0;
	let mut matched_factors = 0_u32;
	let axis_credits = [
		(weights.identity, interest_credit(&item.tags.identity_ids, &viewer.interest_identity_ids)),
		(weights.category, interest_credit(&item.tags.category_ids, &viewer.interest_category_ids)),
		(
			weights.subcategory,
			interest_credit(&item.tags.subcategory_ids, &viewer.interest_subcategory_ids),
		),
		(
			weights.subsubcategory,
			interest_credit(&item.tags.subsubcategory_ids, &viewer.interest_subsubcategory_ids),
		),
	];

	for (weight, credit) in axis_credits {
		if credit > 0.0 {
			matched_factors += 1;
		}

		total += weight * credit;
	}

	let attribute_credit =
		interest_credit(&item.tags.category_ids, &viewer.attribute_category_ids);

	if attribute_credit > 0.0 {
		matched_factors += 1;
		total += ranking.attribute_weight * attribute_credit;
	}

	let viewer_cities: Vec<String> = viewer.city.iter().cloned().collect();
	let viewer_countries: Vec<String> = viewer.country.iter().cloned().collect();
	let location = location_credit(
		item.city.as_deref(),
		item.country.as_deref(),
		&viewer_cities,
		&viewer_countries,
		ranking,
	);

	if location > 0.0 {
		matched_factors += 1;
		total += location;
	}

	total += recency_bonus(item.created_at, now, ranking);

	// A single incidental match must not produce a deceptively high score.
	if matched_factors < ranking.min_factors {
		let scale = (matched_factors as f32 / ranking.min_factors as f32)
			.max(ranking.min_factor_floor);

		total *= scale;
	}

	total
}

/// Linear decay bonus for items younger than the recency window.
fn recency_bonus(created_at: OffsetDateTime, now: OffsetDateTime, ranking: &Ranking) -> f32 {
	let age_days = ((now - created_at).as_seconds_f32() / 86_400.0).max(0.0);
	let window = ranking.recency_window_days;

	if age_days >= window {
		return 0.0;
	}

	ranking.recency_weight * (1.0 - age_days / window)
}

/// Matched share of the viewer's combined interest sets, for tie-breaking.
fn interest_fraction(item: &FeedItem, viewer: &ViewerContext) -> f32 {
	let total_interests = viewer.interest_identity_ids.len()
		+ viewer.interest_category_ids.len()
		+ viewer.interest_subcategory_ids.len()
		+ viewer.interest_subsubcategory_ids.len();

	if total_interests == 0 {
		return 0.0;
	}

	let matched = item.tags.identity_ids.intersection(&viewer.interest_identity_ids).count()
		+ item.tags.category_ids.intersection(&viewer.interest_category_ids).count()
		+ item.tags.subcategory_ids.intersection(&viewer.interest_subcategory_ids).count()
		+ item.tags.subsubcategory_ids.intersection(&viewer.interest_subsubcategory_ids).count();

	(matched as f32 / total_interests as f32).min(1.0)
}

fn hierarchy_weights(weights: &LevelWeights) -> [(TagAxis, f32); 4] {
	[
		(TagAxis::Identity, weights.identity),
		(TagAxis::Category, weights.category),
		(TagAxis::Subcategory, weights.subcategory),
		(TagAxis::Subsubcategory, weights.subsubcategory),
	]
}
