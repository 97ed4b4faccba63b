use std::collections::HashSet;

use uuid::Uuid;

/// The four tiers of the interest hierarchy, most general first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxonomyLevel {
	Identity,
	Category,
	Subcategory,
	Subsubcategory,
}
impl TaxonomyLevel {
	pub fn parent(self) -> Option<Self> {
		match self {
			Self::Identity => None,
			Self::Category => Some(Self::Identity),
			Self::Subcategory => Some(Self::Category),
			Self::Subsubcategory => Some(Self::Subcategory),
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Identity => "identity",
			Self::Category => "category",
			Self::Subcategory => "subcategory",
			Self::Subsubcategory => "subsubcategory",
		}
	}
}

/// One of the six axes an item can be tagged on: the four hierarchy tiers plus
/// the flat general and industry taxonomies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagAxis {
	Identity,
	Category,
	Subcategory,
	Subsubcategory,
	General,
	Industry,
}
impl TagAxis {
	pub const ALL: [Self; 6] = [
		Self::Identity,
		Self::Category,
		Self::Subcategory,
		Self::Subsubcategory,
		Self::General,
		Self::Industry,
	];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Identity => "identity",
			Self::Category => "category",
			Self::Subcategory => "subcategory",
			Self::Subsubcategory => "subsubcategory",
			Self::General => "general",
			Self::Industry => "industry",
		}
	}

	pub fn parse(raw: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|axis| axis.as_str() == raw)
	}
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TaxonomyNode {
	pub id: Uuid,
	pub name: String,
	pub level: TaxonomyLevel,
	pub parent_id: Option<Uuid>,
}
impl TaxonomyNode {
	/// Tree invariant: a node's parent sits exactly one level up.
	pub fn is_valid_child_of(&self, parent: &TaxonomyNode) -> bool {
		self.parent_id == Some(parent.id) && self.level.parent() == Some(parent.level)
	}
}

/// The full tag superset of one item: direct taxonomy references folded
/// together with its many-to-many audience tags.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TagSet {
	pub identity_ids: HashSet<Uuid>,
	pub category_ids: HashSet<Uuid>,
	pub subcategory_ids: HashSet<Uuid>,
	pub subsubcategory_ids: HashSet<Uuid>,
	pub general_ids: HashSet<Uuid>,
	pub industry_ids: HashSet<Uuid>,
}
impl TagSet {
	pub fn insert(&mut self, axis: TagAxis, id: Uuid) {
		match axis {
			TagAxis::Identity => self.identity_ids.insert(id),
			TagAxis::Category => self.category_ids.insert(id),
			TagAxis::Subcategory => self.subcategory_ids.insert(id),
			TagAxis::Subsubcategory => self.subsubcategory_ids.insert(id),
			TagAxis::General => self.general_ids.insert(id),
			TagAxis::Industry => self.industry_ids.insert(id),
		};
	}

	pub fn axis(&self, axis: TagAxis) -> &HashSet<Uuid> {
		match axis {
			TagAxis::Identity => &self.identity_ids,
			TagAxis::Category => &self.category_ids,
			TagAxis::Subcategory => &self.subcategory_ids,
			TagAxis::Subsubcategory => &self.subsubcategory_ids,
			TagAxis::General => &self.general_ids,
			TagAxis::Industry => &self.industry_ids,
		}
	}

	pub fn is_empty(&self) -> bool {
		TagAxis::ALL.iter().all(|axis| self.axis(*axis).is_empty())
	}

	pub fn all_ids(&self) -> impl Iterator<Item = Uuid> + '_ {
		TagAxis::ALL.into_iter().flat_map(|axis| self.axis(axis).iter().copied())
	}

	/// How many of `filter` this set carries on the given axis.
	pub fn overlap(&self, axis: TagAxis, filter: &[Uuid]) -> usize {
		let tags = self.axis(axis);

		filter.iter().filter(|id| tags.contains(id)).count()
	}
}
