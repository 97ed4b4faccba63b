use std::collections::HashSet;

use uuid::Uuid;

use crate::{item::ContentKind, taxonomy::TagAxis};

/// How the engine arrived at this criteria value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedMode {
	/// No filters, no viewer interests: recency ordering only.
	Unfiltered,
	/// Caller-supplied filters drive the query; viewer interests only break ties.
	Explicit,
	/// Viewer interests pre-narrow the query and drive scoring.
	Personalized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Page {
	pub limit: u32,
	pub offset: u32,
}

/// Normalized query criteria. Every id list is deduplicated; an empty list
/// means unconstrained, never "match nothing". Immutable once built.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Criteria {
	pub mode: FeedMode,
	pub kinds: Vec<ContentKind>,
	pub text_terms: Vec<String>,
	pub countries: Vec<String>,
	pub cities: Vec<String>,
	pub identity_ids: Vec<Uuid>,
	pub category_ids: Vec<Uuid>,
	pub subcategory_ids: Vec<Uuid>,
	pub subsubcategory_ids: Vec<Uuid>,
	pub general_ids: Vec<Uuid>,
	pub industry_ids: Vec<Uuid>,
	pub job_type: Option<String>,
	pub price_type: Option<String>,
	pub season: Option<String>,
	pub page: Page,
}
impl Criteria {
	pub fn builder() -> CriteriaBuilder {
		CriteriaBuilder::default()
	}

	pub fn ids(&self, axis: TagAxis) -> &[Uuid] {
		match axis {
			TagAxis::Identity => &self.identity_ids,
			TagAxis::Category => &self.category_ids,
			TagAxis::Subcategory => &self.subcategory_ids,
			TagAxis::Subsubcategory => &self.subsubcategory_ids,
			TagAxis::General => &self.general_ids,
			TagAxis::Industry => &self.industry_ids,
		}
	}

	pub fn has_taxonomy_filter(&self) -> bool {
		TagAxis::ALL.iter().any(|axis| !self.ids(*axis).is_empty())
	}

	/// Per-source over-fetch size: enough rows to re-rank the whole prefix up
	/// to this page, capped so a deep offset cannot fan out unboundedly.
	pub fn buffer_limit(&self, feed: &plaza_config::Feed) -> u32 {
		let prefix = self.page.offset.saturating_add(self.page.limit);

		prefix.saturating_mul(feed.buffer_factor).max(prefix).min(feed.buffer_cap)
	}

	/// Fallback criteria for when personalized narrowing found nothing: the
	/// taxonomy constraints are dropped, everything else stays.
	pub fn without_personalization(&self) -> Self {
		let mut out = self.clone();

		out.mode = FeedMode::Unfiltered;
		out.identity_ids.clear();
		out.category_ids.clear();
		out.subcategory_ids.clear();
		out.subsubcategory_ids.clear();
		out.general_ids.clear();
		out.industry_ids.clear();

		out
	}
}

#[derive(Debug, Default)]
pub struct CriteriaBuilder {
	mode: Option<FeedMode>,
	kinds: Vec<ContentKind>,
	text_terms: Vec<String>,
	countries: Vec<String>,
	cities: Vec<String>,
	identity_ids: Vec<Uuid>,
	category_ids: Vec<Uuid>,
	subcategory_ids: Vec<Uuid>,
	subsubcategory_ids: Vec<Uuid>,
	general_ids: Vec<Uuid>,
	industry_ids: Vec<Uuid>,
	job_type: Option<String>,
	price_type: Option<String>,
	season: Option<String>,
	page: Option<Page>,
}
impl CriteriaBuilder {
	pub fn mode(mut self, mode: FeedMode) -> Self {
		self.mode = Some(mode);
		self
	}

	pub fn kinds(mut self, kinds: Vec<ContentKind>) -> Self {
		self.kinds = kinds;
		self
	}

	pub fn text_query(mut self, query: &str) -> Self {
		self.text_terms =
			query.split_whitespace().map(|term| term.to_lowercase()).collect();
		self
	}

	pub fn countries(mut self, countries: Vec<String>) -> Self {
		self.countries = countries;
		self
	}

	pub fn cities(mut self, cities: Vec<String>) -> Self {
		self.cities = cities;
		self
	}

	pub fn axis_ids(mut self, axis: TagAxis, ids: Vec<Uuid>) -> Self {
		match axis {
			TagAxis::Identity => self.identity_ids = ids,
			TagAxis::Category => self.category_ids = ids,
			TagAxis::Subcategory => self.subcategory_ids = ids,
			TagAxis::Subsubcategory => self.subsubcategory_ids = ids,
			TagAxis::General => self.general_ids = ids,
			TagAxis::Industry => self.industry_ids = ids,
		}
		self
	}

	pub fn job_type(mut self, value: Option<String>) -> Self {
		self.job_type = value;
		self
	}

	pub fn price_type(mut self, value: Option<String>) -> Self {
		self.price_type = value;
		self
	}

	pub fn season(mut self, value: Option<String>) -> Self {
		self.season = value;
		self
	}

	pub fn page(mut self, page: Page) -> Self {
		self.page = Some(page);
		self
	}

	pub fn build(self) -> Criteria {
		let kinds = if self.kinds.is_empty() { ContentKind::ALL.to_vec() } else { self.kinds };

		Criteria {
			mode: self.mode.unwrap_or(FeedMode::Unfiltered),
			kinds,
			text_terms: dedup_strings(self.text_terms),
			countries: dedup_strings(self.countries),
			cities: dedup_strings(self.cities),
			identity_ids: dedup_ids(self.identity_ids),
			category_ids: dedup_ids(self.category_ids),
			subcategory_ids: dedup_ids(self.subcategory_ids),
			subsubcategory_ids: dedup_ids(self.subsubcategory_ids),
			general_ids: dedup_ids(self.general_ids),
			industry_ids: dedup_ids(self.industry_ids),
			job_type: self.job_type,
			price_type: self.price_type,
			season: self.season,
			page: self.page.unwrap_or(Page { limit: 20, offset: 0 }),
		}
	}
}

fn dedup_ids(ids: Vec<Uuid>) -> Vec<Uuid> {
	let mut seen = HashSet::new();

	ids.into_iter().filter(|id| seen.insert(*id)).collect()
}

fn dedup_strings(values: Vec<String>) -> Vec<String> {
	let mut seen = HashSet::new();

	values
		.into_iter()
		.map(|value| value.trim().to_string())
		.filter(|value| !value.is_empty())
		.filter(|value| seen.insert(value.to_lowercase()))
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn builder_deduplicates_ids_preserving_order() {
		let a = Uuid::new_v4();
		let b = Uuid::new_v4();
		let criteria =
			Criteria::builder().axis_ids(TagAxis::Category, vec![a, b, a, b, a]).build();

		assert_eq!(criteria.category_ids, vec![a, b]);
	}

	#[test]
	fn empty_kinds_means_all_kinds() {
		let criteria = Criteria::builder().build();

		assert_eq!(criteria.kinds.len(), ContentKind::ALL.len());
	}

	#[test]
	fn text_query_splits_and_lowercases() {
		let criteria = Criteria::builder().text_query("  Pottery  Wheel ").build();

		assert_eq!(criteria.text_terms, vec!["pottery".to_string(), "wheel".to_string()]);
	}

	#[test]
	fn buffer_limit_covers_prefix_and_respects_cap() {
		let feed = plaza_config::Feed::default();
		let mut criteria = Criteria::builder().page(Page { limit: 20, offset: 20 }).build();

		assert_eq!(criteria.buffer_limit(&feed), 120);

		criteria.page = Page { limit: 100, offset: 200 };

		assert_eq!(criteria.buffer_limit(&feed), feed.buffer_cap);
	}

	#[test]
	fn fallback_strips_taxonomy_only() {
		let criteria = Criteria::builder()
			.mode(FeedMode::Personalized)
			.axis_ids(TagAxis::Subcategory, vec![Uuid::new_v4()])
			.countries(vec!["Kenya".to_string()])
			.build();
		let fallback = criteria.without_personalization();

		assert_eq!(fallback.mode, FeedMode::Unfiltered);
		assert!(fallback.subcategory_ids.is_empty());
		assert_eq!(fallback.countries, criteria.countries);
	}
}
