pub mod assemble;
pub mod criteria;
pub mod item;
pub mod score;
pub mod taxonomy;
pub mod viewer;
pub mod visibility;

pub use assemble::{RankedPage, assemble, diversify, sort_candidates};
pub use criteria::{Criteria, CriteriaBuilder, FeedMode, Page};
pub use item::{ContentKind, Facets, FeedItem, ScoredItem, time_ago};
pub use score::{MAX_SCORE, score, text_matches};
pub use taxonomy::{TagAxis, TagSet, TaxonomyLevel, TaxonomyNode};
pub use viewer::{ConnectionStatus, ContentTypePref, ViewerContext};
pub use visibility::filter_visible;
