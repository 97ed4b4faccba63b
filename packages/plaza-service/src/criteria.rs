//! Raw query parameters and their validation. Everything arrives as optional
//! strings; anything malformed is an `InvalidRequest`, never a silent default.

use uuid::Uuid;

use plaza_config::Feed;
use plaza_domain::{ContentKind, Page, TagAxis};

use crate::{Error, Result};

/// The feed endpoint's query surface, exactly as received. Multi-value
/// parameters are comma-separated; taxonomy values may be ids or names.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct FeedParams {
	/// Content kind selector, comma-separated; absent or `all` means every kind.
	pub tab: Option<String>,
	pub q: Option<String>,
	pub country: Option<String>,
	pub city: Option<String>,
	pub identity_id: Option<String>,
	pub category_id: Option<String>,
	pub subcategory_id: Option<String>,
	pub subsub_category_id: Option<String>,
	pub general_category_ids: Option<String>,
	pub industry_ids: Option<String>,
	pub job_type: Option<String>,
	pub price_type: Option<String>,
	pub season: Option<String>,
	pub limit: Option<String>,
	pub offset: Option<String>,
	pub viewer_id: Option<String>,
}
impl FeedParams {
	pub(crate) fn page(&self, feed: &Feed) -> Result<Page> {
		let limit = match self.limit.as_deref() {
			None | Some("") => feed.default_limit,
			Some(raw) => raw.trim().parse::<u32>().map_err(|_| Error::InvalidRequest {
				message: format!("limit must be a non-negative integer, got {raw:?}"),
			})?,
		};

		if limit == 0 {
			return Err(Error::InvalidRequest { message: "limit must be at least 1".to_string() });
		}
		if limit > feed.max_limit {
			return Err(Error::InvalidRequest {
				message: format!("limit {limit} exceeds the maximum of {}", feed.max_limit),
			});
		}

		let offset = match self.offset.as_deref() {
			None | Some("") => 0,
			Some(raw) => raw.trim().parse::<u32>().map_err(|_| Error::InvalidRequest {
				message: format!("offset must be a non-negative integer, got {raw:?}"),
			})?,
		};

		Ok(Page { limit, offset })
	}

	pub(crate) fn kinds(&self) -> Result<Vec<ContentKind>> {
		let raw = match self.tab.as_deref().map(str::trim) {
			None | Some("") | Some("all") => return Ok(Vec::new()),
			Some(raw) => raw,
		};
		let mut kinds = Vec::new();

		for label in raw.split(',').map(str::trim).filter(|label| !label.is_empty()) {
			let kind = ContentKind::parse(label).ok_or_else(|| Error::InvalidRequest {
				message: format!("unknown content kind {label:?}"),
			})?;

			kinds.push(kind);
		}

		Ok(kinds)
	}

	pub(crate) fn viewer_uuid(&self) -> Result<Option<Uuid>> {
		match self.viewer_id.as_deref().map(str::trim) {
			None | Some("") => Ok(None),
			Some(raw) => Uuid::parse_str(raw).map(Some).map_err(|_| Error::InvalidRequest {
				message: format!("viewer_id must be a UUID, got {raw:?}"),
			}),
		}
	}

	/// Raw (unresolved) values for one taxonomy axis.
	pub(crate) fn axis_raw(&self, axis: TagAxis) -> Vec<String> {
		let raw = match axis {
			TagAxis::Identity => &self.identity_id,
			TagAxis::Category => &self.category_id,
			TagAxis::Subcategory => &self.subcategory_id,
			TagAxis::Subsubcategory => &self.subsub_category_id,
			TagAxis::General => &self.general_category_ids,
			TagAxis::Industry => &self.industry_ids,
		};

		split_csv(raw)
	}

	/// Any caller-supplied narrowing puts the request in explicit-filter mode,
	/// where stored interests only break ties.
	pub(crate) fn has_explicit_filter(&self) -> bool {
		let filters = [
			&self.q,
			&self.country,
			&self.city,
			&self.identity_id,
			&self.category_id,
			&self.subcategory_id,
			&self.subsub_category_id,
			&self.general_category_ids,
			&self.industry_ids,
			&self.job_type,
			&self.price_type,
			&self.season,
		];

		filters.into_iter().any(|value| !value.as_deref().unwrap_or("").trim().is_empty())
	}
}

pub(crate) fn split_csv(raw: &Option<String>) -> Vec<String> {
	raw.as_deref()
		.unwrap_or("")
		.split(',')
		.map(str::trim)
		.filter(|value| !value.is_empty())
		.map(str::to_string)
		.collect()
}

pub(crate) fn non_empty(raw: &Option<String>) -> Option<String> {
	raw.as_deref().map(str::trim).filter(|value| !value.is_empty()).map(str::to_string)
}
