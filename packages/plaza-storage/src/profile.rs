//! Viewer profile assembly: one `ViewerContext` per request, hydrated from the
//! users, interests, connections and blocks tables.

use std::collections::HashMap;

use sqlx::PgPool;
use uuid::Uuid;

use plaza_domain::{ConnectionStatus, ContentTypePref, TagAxis, ViewerContext};

use crate::{
	Error, Result,
	models::{BlockRow, ConnectionRow, InterestRow, UserRow},
};

/// Loads the full viewer context for a known user id.
pub async fn viewer_context(pool: &PgPool, viewer_id: Uuid) -> Result<ViewerContext> {
	let user: UserRow = sqlx::query_as(
		"SELECT user_id, country, city, connections_only, content_type FROM users \
		 WHERE user_id = $1",
	)
	.bind(viewer_id)
	.fetch_optional(pool)
	.await?
	.ok_or_else(|| Error::NotFound(format!("user {viewer_id}")))?;
	let mut context = ViewerContext {
		viewer_id: Some(user.user_id),
		country: user.country,
		city: user.city,
		connections_only: user.connections_only,
		content_type: ContentTypePref::parse(&user.content_type).unwrap_or_default(),
		..ViewerContext::default()
	};
	let interests: Vec<InterestRow> =
		sqlx::query_as("SELECT axis, taxonomy_id FROM user_interests WHERE user_id = $1")
			.bind(viewer_id)
			.fetch_all(pool)
			.await?;

	for interest in interests {
		match TagAxis::parse(&interest.axis) {
			Some(TagAxis::Identity) => {
				context.interest_identity_ids.insert(interest.taxonomy_id);
			},
			Some(TagAxis::Category) => {
				context.interest_category_ids.insert(interest.taxonomy_id);
			},
			Some(TagAxis::Subcategory) => {
				context.interest_subcategory_ids.insert(interest.taxonomy_id);
			},
			Some(TagAxis::Subsubcategory) => {
				context.interest_subsubcategory_ids.insert(interest.taxonomy_id);
			},
			// General and industry interests are not part of the hierarchy and
			// do not feed scoring.
			Some(_) | None => {},
		}
	}

	let attributes: Vec<(Uuid,)> =
		sqlx::query_as("SELECT category_id FROM user_attributes WHERE user_id = $1")
			.bind(viewer_id)
			.fetch_all(pool)
			.await?;

	context.attribute_category_ids.extend(attributes.into_iter().map(|(id,)| id));

	let goals: Vec<(Uuid,)> = sqlx::query_as("SELECT goal_id FROM user_goals WHERE user_id = $1")
		.bind(viewer_id)
		.fetch_all(pool)
		.await?;

	context.goal_ids.extend(goals.into_iter().map(|(id,)| id));

	let connections: Vec<ConnectionRow> = sqlx::query_as(
		"SELECT requester_id, addressee_id, status FROM connections \
		 WHERE status = 'accepted' AND (requester_id = $1 OR addressee_id = $1)",
	)
	.bind(viewer_id)
	.fetch_all(pool)
	.await?;

	for connection in connections {
		let other = if connection.requester_id == viewer_id {
			connection.addressee_id
		} else {
			connection.requester_id
		};

		context.connected_user_ids.insert(other);
	}

	let blocks: Vec<BlockRow> = sqlx::query_as(
		"SELECT blocker_id, blocked_id FROM blocks WHERE blocker_id = $1 OR blocked_id = $1",
	)
	.bind(viewer_id)
	.fetch_all(pool)
	.await?;

	for block in blocks {
		let other = if block.blocker_id == viewer_id { block.blocked_id } else { block.blocker_id };

		context.blocked_either_direction.insert(other);
	}

	Ok(context)
}

/// Resolves the viewer's connection edge to each given owner in one query.
/// Owners with no edge are absent from the map.
pub async fn connection_status_map(
	pool: &PgPool,
	viewer_id: Uuid,
	owner_ids: &[Uuid],
) -> Result<HashMap<Uuid, ConnectionStatus>> {
	if owner_ids.is_empty() {
		return Ok(HashMap::new());
	}

	let rows: Vec<ConnectionRow> = sqlx::query_as(
		"SELECT requester_id, addressee_id, status FROM connections \
		 WHERE (requester_id = $1 AND addressee_id = ANY($2)) \
		    OR (addressee_id = $1 AND requester_id = ANY($2))",
	)
	.bind(viewer_id)
	.bind(owner_ids)
	.fetch_all(pool)
	.await?;
	let mut map = HashMap::new();

	for row in rows {
		let (other, status) = if row.requester_id == viewer_id {
			let status = if row.status == "accepted" {
				ConnectionStatus::Connected
			} else {
				ConnectionStatus::OutgoingPending
			};

			(row.addressee_id, status)
		} else {
			let status = if row.status == "accepted" {
				ConnectionStatus::Connected
			} else {
				ConnectionStatus::IncomingPending
			};

			(row.requester_id, status)
		};

		map.insert(other, status);
	}

	Ok(map)
}
