use time::OffsetDateTime;
use uuid::Uuid;

/// One content row in the shape shared by every kind's SELECT; columns a kind
/// does not carry are selected as typed NULLs.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SourceRow {
	pub item_id: Uuid,
	pub owner_id: Uuid,
	pub title: String,
	pub description: Option<String>,
	pub company: Option<String>,
	pub pitch: Option<String>,
	pub city: Option<String>,
	pub country: Option<String>,
	pub job_type: Option<String>,
	pub price_type: Option<String>,
	pub season: Option<String>,
	pub image_count: i32,
	pub identity_id: Option<Uuid>,
	pub category_id: Option<Uuid>,
	pub subcategory_id: Option<Uuid>,
	pub subsubcategory_id: Option<Uuid>,
	pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AudienceTagRow {
	pub item_id: Uuid,
	pub axis: String,
	pub taxonomy_id: Uuid,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
	pub user_id: Uuid,
	pub country: Option<String>,
	pub city: Option<String>,
	pub connections_only: bool,
	pub content_type: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct InterestRow {
	pub axis: String,
	pub taxonomy_id: Uuid,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ConnectionRow {
	pub requester_id: Uuid,
	pub addressee_id: Uuid,
	pub status: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BlockRow {
	pub blocker_id: Uuid,
	pub blocked_id: Uuid,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TaxonomyNameRow {
	pub id: Uuid,
	pub name: String,
}
