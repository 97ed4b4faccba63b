pub fn render_schema() -> &'static str {
	include_str!("../../../sql/init.sql")
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn schema_covers_every_content_kind() {
		let sql = render_schema();

		for table in [
			"jobs",
			"events",
			"services",
			"products",
			"tourism_posts",
			"funding_campaigns",
			"needs",
			"moments",
			"audience_tags",
			"user_interests",
			"connections",
			"blocks",
		] {
			assert!(
				sql.contains(&format!("CREATE TABLE IF NOT EXISTS {table}")),
				"missing table {table}"
			);
		}
	}

	#[test]
	fn schema_statements_are_idempotent() {
		let sql = render_schema();

		for statement in sql.split(';') {
			let trimmed = statement.trim();

			if trimmed.contains("CREATE TABLE") || trimmed.contains("CREATE INDEX") {
				assert!(trimmed.contains("IF NOT EXISTS"), "non-idempotent statement: {trimmed}");
			}
		}
	}
}
