//! Taxonomy lookups: callers may pass either ids or names for any axis, and
//! item tags are resolved back to names for display.

use std::collections::HashMap;

use sqlx::PgPool;
use uuid::Uuid;

use plaza_domain::TagAxis;

use crate::{Error, Result, models::TaxonomyNameRow};

fn level_table(axis: TagAxis) -> &'static str {
	match axis {
		TagAxis::Identity => "taxonomy_identities",
		TagAxis::Category => "taxonomy_categories",
		TagAxis::Subcategory => "taxonomy_subcategories",
		TagAxis::Subsubcategory => "taxonomy_subsubcategories",
		TagAxis::General => "taxonomy_general",
		TagAxis::Industry => "taxonomy_industries",
	}
}

/// Resolves a mixed list of raw values on one axis: UUIDs pass through as is,
/// anything else is treated as a name and looked up case-insensitively. A name
/// with no row is an `UnknownTaxonomy` error, never a silent drop.
pub async fn resolve_ids_or_names(
	pool: &PgPool,
	axis: TagAxis,
	raw_values: &[String],
) -> Result<Vec<Uuid>> {
	let mut ids = Vec::with_capacity(raw_values.len());
	let mut names = Vec::new();

	for raw in raw_values {
		match Uuid::parse_str(raw.trim()) {
			Ok(id) => ids.push(id),
			Err(_) => names.push(raw.trim().to_lowercase()),
		}
	}

	if names.is_empty() {
		return Ok(ids);
	}

	let table = level_table(axis);
	let rows: Vec<TaxonomyNameRow> =
		sqlx::query_as(&format!("SELECT id, name FROM {table} WHERE LOWER(name) = ANY($1)"))
			.bind(&names)
			.fetch_all(pool)
			.await?;
	let by_name: HashMap<String, Uuid> =
		rows.into_iter().map(|row| (row.name.to_lowercase(), row.id)).collect();

	for name in &names {
		match by_name.get(name) {
			Some(id) => ids.push(*id),
			None => {
				return Err(Error::UnknownTaxonomy(format!("{name} ({})", axis.as_str())));
			},
		}
	}

	Ok(ids)
}

/// Fetches display names for a batch of taxonomy ids across all six axes.
/// Unknown ids are simply absent from the result.
pub async fn tag_names(pool: &PgPool, ids: &[Uuid]) -> Result<HashMap<Uuid, String>> {
	if ids.is_empty() {
		return Ok(HashMap::new());
	}

	let rows: Vec<TaxonomyNameRow> = sqlx::query_as(
		"SELECT id, name FROM taxonomy_identities WHERE id = ANY($1) \
		 UNION ALL SELECT id, name FROM taxonomy_categories WHERE id = ANY($1) \
		 UNION ALL SELECT id, name FROM taxonomy_subcategories WHERE id = ANY($1) \
		 UNION ALL SELECT id, name FROM taxonomy_subsubcategories WHERE id = ANY($1) \
		 UNION ALL SELECT id, name FROM taxonomy_general WHERE id = ANY($1) \
		 UNION ALL SELECT id, name FROM taxonomy_industries WHERE id = ANY($1)",
	)
	.bind(ids)
	.fetch_all(pool)
	.await?;

	Ok(rows.into_iter().map(|row| (row.id, row.name)).collect())
}
