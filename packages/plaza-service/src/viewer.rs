use tracing::warn;
use uuid::Uuid;

use plaza_domain::ViewerContext;

use crate::ProfileReader;

/// Loads the viewer context, degrading to an anonymous context when the id is
/// unknown or the lookup fails. A profile problem must not break the feed.
pub(crate) async fn resolve_viewer(
	profile: &dyn ProfileReader,
	viewer_id: Option<Uuid>,
) -> ViewerContext {
	let Some(id) = viewer_id else {
		return ViewerContext::anonymous(None);
	};

	match profile.viewer_context(id).await {
		Ok(context) => context,
		Err(err) => {
			warn!(viewer_id = %id, error = %err, "viewer lookup failed, serving anonymous feed");

			ViewerContext::anonymous(None)
		},
	}
}
