use time::OffsetDateTime;
use uuid::Uuid;

use crate::taxonomy::TagSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
	Job,
	Event,
	Service,
	Product,
	Tourism,
	Funding,
	Need,
	Moment,
}
impl ContentKind {
	pub const ALL: [Self; 8] = [
		Self::Job,
		Self::Event,
		Self::Service,
		Self::Product,
		Self::Tourism,
		Self::Funding,
		Self::Need,
		Self::Moment,
	];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Job => "job",
			Self::Event => "event",
			Self::Service => "service",
			Self::Product => "product",
			Self::Tourism => "tourism",
			Self::Funding => "funding",
			Self::Need => "need",
			Self::Moment => "moment",
		}
	}

	pub fn parse(raw: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|kind| kind.as_str() == raw)
	}
}

/// Kind-specific facet values; a kind that does not carry a facet leaves it
/// unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Facets {
	pub job_type: Option<String>,
	pub price_type: Option<String>,
	pub season: Option<String>,
}

/// The common shape every source row is normalized into. Built fresh per
/// request and never persisted.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct FeedItem {
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
	pub created_at: OffsetDateTime,
	pub tags: TagSet,
	pub facets: Facets,
}

#[derive(Debug, Clone)]
pub struct ScoredItem {
	pub item: FeedItem,
	pub score: f32,
}

/// Display-only relative-age label; ranking always uses the raw timestamp.
pub fn time_ago(created_at: OffsetDateTime, now: OffsetDateTime) -> String {
	let seconds = (now - created_at).whole_seconds().max(0);

	match seconds {
		0..60 => "just now".to_string(),
		60..3_600 => format!("{}m ago", seconds / 60),
		3_600..86_400 => format!("{}h ago", seconds / 3_600),
		86_400..604_800 => format!("{}d ago", seconds / 86_400),
		604_800..2_592_000 => format!("{}w ago", seconds / 604_800),
		2_592_000..31_536_000 => format!("{}mo ago", seconds / 2_592_000),
		_ => format!("{}y ago", seconds / 31_536_000),
	}
}
