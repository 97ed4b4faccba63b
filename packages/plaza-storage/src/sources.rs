//! One reader per content kind, driven by a static descriptor table so adding
//! a kind means adding one entry, not another bespoke query.

use std::collections::HashMap;

use sqlx::{PgPool, QueryBuilder};
use uuid::Uuid;

use plaza_domain::{ContentKind, Criteria, Facets, FeedItem, TagAxis, ViewerContext};

use crate::{
	Result,
	models::{AudienceTagRow, SourceRow},
};

#[derive(Debug, Clone, Copy)]
pub struct KindTable {
	pub kind: ContentKind,
	pub table: &'static str,
	pub id_col: &'static str,
	pub has_company: bool,
	pub has_pitch: bool,
	pub has_job_type: bool,
	pub has_price_type: bool,
	pub has_season: bool,
	pub has_image_count: bool,
}

const KIND_TABLES: [KindTable; 8] = [
	KindTable {
		kind: ContentKind::Job,
		table: "jobs",
		id_col: "job_id",
		has_company: true,
		has_pitch: false,
		has_job_type: true,
		has_price_type: false,
		has_season: false,
		has_image_count: false,
	},
	KindTable {
		kind: ContentKind::Event,
		table: "events",
		id_col: "event_id",
		has_company: false,
		has_pitch: false,
		has_job_type: false,
		has_price_type: false,
		has_season: false,
		has_image_count: false,
	},
	KindTable {
		kind: ContentKind::Service,
		table: "services",
		id_col: "service_id",
		has_company: false,
		has_pitch: false,
		has_job_type: false,
		has_price_type: true,
		has_season: false,
		has_image_count: false,
	},
	KindTable {
		kind: ContentKind::Product,
		table: "products",
		id_col: "product_id",
		has_company: false,
		has_pitch: false,
		has_job_type: false,
		has_price_type: true,
		has_season: false,
		has_image_count: true,
	},
	KindTable {
		kind: ContentKind::Tourism,
		table: "tourism_posts",
		id_col: "post_id",
		has_company: false,
		has_pitch: false,
		has_job_type: false,
		has_price_type: false,
		has_season: true,
		has_image_count: true,
	},
	KindTable {
		kind: ContentKind::Funding,
		table: "funding_campaigns",
		id_col: "campaign_id",
		has_company: false,
		has_pitch: true,
		has_job_type: false,
		has_price_type: false,
		has_season: false,
		has_image_count: false,
	},
	KindTable {
		kind: ContentKind::Need,
		table: "needs",
		id_col: "need_id",
		has_company: false,
		has_pitch: false,
		has_job_type: false,
		has_price_type: false,
		has_season: false,
		has_image_count: false,
	},
	KindTable {
		kind: ContentKind::Moment,
		table: "moments",
		id_col: "moment_id",
		has_company: false,
		has_pitch: false,
		has_job_type: false,
		has_price_type: false,
		has_season: false,
		has_image_count: true,
	},
];

const HIERARCHY_COLUMNS: [(TagAxis, &str); 4] = [
	(TagAxis::Identity, "identity_id"),
	(TagAxis::Category, "category_id"),
	(TagAxis::Subcategory, "subcategory_id"),
	(TagAxis::Subsubcategory, "subsubcategory_id"),
];

pub fn descriptor(kind: ContentKind) -> &'static KindTable {
	KIND_TABLES
		.iter()
		.find(|entry| entry.kind == kind)
		.unwrap_or(&KIND_TABLES[0])
}

/// Fetches up to `buffer_limit` approved rows of one kind matching the
/// criteria, with block/connection predicates pushed down, and normalizes
/// them into `FeedItem`s.
pub async fn fetch_kind(
	pool: &PgPool,
	kind: ContentKind,
	criteria: &Criteria,
	viewer: &ViewerContext,
	buffer_limit: u32,
) -> Result<Vec<FeedItem>> {
	let desc = descriptor(kind);
	let mut builder = QueryBuilder::new(select_clause(desc));

	builder.push(" WHERE moderation_status = 'approved'");

	if !viewer.blocked_either_direction.is_empty() {
		let blocked: Vec<Uuid> = viewer.blocked_either_direction.iter().copied().collect();

		builder.push(" AND owner_id <> ALL(");
		builder.push_bind(blocked);
		builder.push(")");
	}
	if viewer.connections_only
		&& let Some(viewer_id) = viewer.viewer_id
	{
		// The viewer's own posts stay visible in connections-only mode.
		let mut owners: Vec<Uuid> = viewer.connected_user_ids.iter().copied().collect();

		owners.push(viewer_id);

		builder.push(" AND owner_id = ANY(");
		builder.push_bind(owners);
		builder.push(")");
	}
	if !criteria.countries.is_empty() {
		let countries: Vec<String> =
			criteria.countries.iter().map(|value| value.to_lowercase()).collect();

		builder.push(" AND LOWER(country) = ANY(");
		builder.push_bind(countries);
		builder.push(")");
	}
	if !criteria.cities.is_empty() {
		let cities: Vec<String> =
			criteria.cities.iter().map(|value| value.to_lowercase()).collect();

		builder.push(" AND LOWER(city) = ANY(");
		builder.push_bind(cities);
		builder.push(")");
	}
	if !criteria.text_terms.is_empty() {
		builder.push(" AND (");

		for (index, term) in criteria.text_terms.iter().enumerate() {
			if index > 0 {
				builder.push(" OR ");
			}

			let pattern = like_pattern(term);
			let mut columns = vec!["title", "description", "city"];

			if desc.has_company {
				columns.push("company");
			}
			if desc.has_pitch {
				columns.push("pitch");
			}

			builder.push("(");

			for (column_index, column) in columns.iter().enumerate() {
				if column_index > 0 {
					builder.push(" OR ");
				}

				builder.push(format!("{column} ILIKE "));
				builder.push_bind(pattern.clone());
			}

			builder.push(")");
		}

		builder.push(")");
	}
	if desc.has_job_type
		&& let Some(job_type) = criteria.job_type.as_ref()
	{
		builder.push(" AND job_type = ");
		builder.push_bind(job_type.clone());
	}
	if desc.has_price_type
		&& let Some(price_type) = criteria.price_type.as_ref()
	{
		builder.push(" AND price_type = ");
		builder.push_bind(price_type.clone());
	}
	if desc.has_season
		&& let Some(season) = criteria.season.as_ref()
	{
		builder.push(" AND season = ");
		builder.push_bind(season.clone());
	}

	// An item matches a requested level through its direct reference or any of
	// its audience tags; multiple requested levels must all match.
	for (axis, column) in HIERARCHY_COLUMNS {
		let ids = criteria.ids(axis);

		if ids.is_empty() {
			continue;
		}

		builder.push(format!(" AND ({column} = ANY("));
		builder.push_bind(ids.to_vec());
		builder.push(") OR ");
		push_audience_predicate(&mut builder, desc, axis, ids);
		builder.push(")");
	}

	for axis in [TagAxis::General, TagAxis::Industry] {
		let ids = criteria.ids(axis);

		if ids.is_empty() {
			continue;
		}

		builder.push(" AND ");
		push_audience_predicate(&mut builder, desc, axis, ids);
	}

	builder.push(format!(" ORDER BY created_at DESC, {} ASC LIMIT ", desc.id_col));
	builder.push_bind(i64::from(buffer_limit));

	let rows: Vec<SourceRow> = builder.build_query_as().fetch_all(pool).await?;

	if rows.is_empty() {
		return Ok(Vec::new());
	}

	let item_ids: Vec<Uuid> = rows.iter().map(|row| row.item_id).collect();
	let tag_rows: Vec<AudienceTagRow> = sqlx::query_as(
		"SELECT item_id, axis, taxonomy_id FROM audience_tags WHERE kind = $1 AND item_id = ANY($2)",
	)
	.bind(kind.as_str())
	.bind(&item_ids)
	.fetch_all(pool)
	.await?;
	let mut tags_by_item: HashMap<Uuid, Vec<AudienceTagRow>> = HashMap::new();

	for tag in tag_rows {
		tags_by_item.entry(tag.item_id).or_default().push(tag);
	}

	Ok(rows
		.into_iter()
		.map(|row| {
			let tags = tags_by_item.remove(&row.item_id).unwrap_or_default();

			normalize(kind, row, &tags)
		})
		.collect())
}

/// Maps one raw row into the common item shape, folding the direct taxonomy
/// references into the audience tag superset.
pub fn normalize(kind: ContentKind, row: SourceRow, tags: &[AudienceTagRow]) -> FeedItem {
	let mut item = FeedItem {
		kind,
		id: row.item_id,
		owner_id: row.owner_id,
		title: row.title,
		description: row.description,
		company: row.company,
		pitch: row.pitch,
		city: row.city,
		country: row.country,
		image_count: row.image_count.max(0) as u32,
		created_at: row.created_at,
		tags: Default::default(),
		facets: Facets { job_type: row.job_type, price_type: row.price_type, season: row.season },
	};

	for tag in tags {
		if let Some(axis) = TagAxis::parse(&tag.axis) {
			item.tags.insert(axis, tag.taxonomy_id);
		}
	}

	// A direct reference counts as an implicit audience tag.
	for (axis, direct) in [
		(TagAxis::Identity, row.identity_id),
		(TagAxis::Category, row.category_id),
		(TagAxis::Subcategory, row.subcategory_id),
		(TagAxis::Subsubcategory, row.subsubcategory_id),
	] {
		if let Some(id) = direct {
			item.tags.insert(axis, id);
		}
	}

	item
}

fn select_clause(desc: &KindTable) -> String {
	let company = if desc.has_company { "company" } else { "NULL::text" };
	let pitch = if desc.has_pitch { "pitch" } else { "NULL::text" };
	let job_type = if desc.has_job_type { "job_type" } else { "NULL::text" };
	let price_type = if desc.has_price_type { "price_type" } else { "NULL::text" };
	let season = if desc.has_season { "season" } else { "NULL::text" };
	let image_count = if desc.has_image_count { "image_count" } else { "0" };

	format!(
		"SELECT {id} AS item_id, owner_id, title, description, {company} AS company, \
		 {pitch} AS pitch, city, country, {job_type} AS job_type, {price_type} AS price_type, \
		 {season} AS season, {image_count} AS image_count, identity_id, category_id, \
		 subcategory_id, subsubcategory_id, created_at FROM {table}",
		id = desc.id_col,
		table = desc.table,
	)
}

fn push_audience_predicate(
	builder: &mut QueryBuilder<'_, sqlx::Postgres>,
	desc: &KindTable,
	axis: TagAxis,
	ids: &[Uuid],
) {
	builder.push(format!(
		"EXISTS (SELECT 1 FROM audience_tags at WHERE at.kind = '{}' AND at.axis = '{}' \
		 AND at.item_id = {}.{} AND at.taxonomy_id = ANY(",
		desc.kind.as_str(),
		axis.as_str(),
		desc.table,
		desc.id_col,
	));
	builder.push_bind(ids.to_vec());
	builder.push("))");
}

fn like_pattern(term: &str) -> String {
	let escaped = term.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");

	format!("%{escaped}%")
}

#[cfg(test)]
mod tests {
	use time::OffsetDateTime;

	use super::*;

	fn row() -> SourceRow {
		SourceRow {
			item_id: Uuid::new_v4(),
			owner_id: Uuid::new_v4(),
			title: "Stonework apprentice".to_string(),
			description: None,
			company: Some("Masonry Co".to_string()),
			pitch: None,
			city: Some("Lyon".to_string()),
			country: Some("France".to_string()),
			job_type: Some("full_time".to_string()),
			price_type: None,
			season: None,
			image_count: -1,
			identity_id: None,
			category_id: Some(Uuid::new_v4()),
			subcategory_id: Some(Uuid::new_v4()),
			subsubcategory_id: None,
			created_at: OffsetDateTime::UNIX_EPOCH,
		}
	}

	#[test]
	fn every_kind_has_a_descriptor() {
		for kind in ContentKind::ALL {
			assert_eq!(descriptor(kind).kind, kind);
		}
	}

	#[test]
	fn normalize_folds_direct_refs_into_tags() {
		let row = row();
		let category_id = row.category_id.unwrap();
		let subcategory_id = row.subcategory_id.unwrap();
		let audience = AudienceTagRow {
			item_id: row.item_id,
			axis: "general".to_string(),
			taxonomy_id: Uuid::new_v4(),
		};
		let item = normalize(ContentKind::Job, row, &[audience.clone()]);

		assert!(item.tags.category_ids.contains(&category_id));
		assert!(item.tags.subcategory_ids.contains(&subcategory_id));
		assert!(item.tags.general_ids.contains(&audience.taxonomy_id));
		assert_eq!(item.facets.job_type.as_deref(), Some("full_time"));
		// Negative counts from the row never leak through.
		assert_eq!(item.image_count, 0);
	}

	#[test]
	fn normalize_ignores_unknown_axes() {
		let row = row();
		let bogus = AudienceTagRow {
			item_id: row.item_id,
			axis: "constellation".to_string(),
			taxonomy_id: Uuid::new_v4(),
		};
		let item = normalize(ContentKind::Job, row, &[bogus]);

		assert!(item.tags.general_ids.is_empty());
		assert!(item.tags.industry_ids.is_empty());
	}

	#[test]
	fn select_clause_nulls_unsupported_columns() {
		let clause = select_clause(descriptor(ContentKind::Need));

		assert!(clause.contains("NULL::text AS company"));
		assert!(clause.contains("0 AS image_count"));
		assert!(clause.contains("FROM needs"));

		let jobs = select_clause(descriptor(ContentKind::Job));

		assert!(jobs.contains("company AS company") || jobs.contains(" company,"));
		assert!(jobs.contains("job_type AS job_type"));
	}

	#[test]
	fn like_pattern_escapes_wildcards() {
		assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
	}
}
