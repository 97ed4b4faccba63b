use std::collections::HashSet;

use uuid::Uuid;

/// Which payload shapes the viewer wants in their feed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentTypePref {
	#[default]
	All,
	Text,
	Images,
}
impl ContentTypePref {
	pub fn parse(raw: &str) -> Option<Self> {
		match raw {
			"all" => Some(Self::All),
			"text" => Some(Self::Text),
			"images" => Some(Self::Images),
			_ => None,
		}
	}
}

/// The viewer's connection edge to an item owner, from the viewer's side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
	Connected,
	OutgoingPending,
	IncomingPending,
	None,
	Unauthenticated,
}
impl ConnectionStatus {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Connected => "connected",
			Self::OutgoingPending => "outgoing_pending",
			Self::IncomingPending => "incoming_pending",
			Self::None => "none",
			Self::Unauthenticated => "unauthenticated",
		}
	}
}

/// Everything the pipeline knows about the requesting viewer. Built once at
/// request start, immutable afterward, discarded at request end.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct ViewerContext {
	pub viewer_id: Option<Uuid>,
	pub country: Option<String>,
	pub city: Option<String>,
	pub interest_identity_ids: HashSet<Uuid>,
	pub interest_category_ids: HashSet<Uuid>,
	pub interest_subcategory_ids: HashSet<Uuid>,
	pub interest_subsubcategory_ids: HashSet<Uuid>,
	/// Profile-declared taxonomy, weighted lower than interests.
	pub attribute_category_ids: HashSet<Uuid>,
	pub goal_ids: HashSet<Uuid>,
	pub connected_user_ids: HashSet<Uuid>,
	pub blocked_either_direction: HashSet<Uuid>,
	pub connections_only: bool,
	pub content_type: ContentTypePref,
}
impl ViewerContext {
	pub fn anonymous(viewer_id: Option<Uuid>) -> Self {
		Self { viewer_id, ..Self::default() }
	}

	pub fn has_interests(&self) -> bool {
		!self.interest_identity_ids.is_empty()
			|| !self.interest_category_ids.is_empty()
			|| !self.interest_subcategory_ids.is_empty()
			|| !self.interest_subsubcategory_ids.is_empty()
	}
}
