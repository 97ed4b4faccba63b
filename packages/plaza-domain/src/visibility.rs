use crate::{
	item::FeedItem,
	viewer::{ContentTypePref, ViewerContext},
};

/// Drops items the viewer must not (or chose not to) see. Idempotent and
/// order-preserving; block exclusion is re-checked here even when a source
/// already pushed the predicate down.
pub fn filter_visible(items: Vec<FeedItem>, viewer: &ViewerContext) -> Vec<FeedItem> {
	items.into_iter().filter(|item| is_visible(item, viewer)).collect()
}

fn is_visible(item: &FeedItem, viewer: &ViewerContext) -> bool {
	if viewer.blocked_either_direction.contains(&item.owner_id) {
		return false;
	}

	match viewer.content_type {
		ContentTypePref::All => true,
		ContentTypePref::Text =>
			item.description.as_deref().is_some_and(|text| !text.trim().is_empty())
				&& item.image_count == 0,
		ContentTypePref::Images => item.image_count > 0,
	}
}
