//! Final merge step: one sorted, diversified, windowed page out of every
//! source's scored candidates. Ordering and windowing are enforced only here,
//! never by individual fetchers.

use std::cmp::Ordering;

use crate::{criteria::Page, item::ScoredItem};

#[derive(Debug, Clone)]
pub struct RankedPage {
	pub items: Vec<ScoredItem>,
	pub offset: u32,
	pub limit: u32,
}

pub fn assemble(mut items: Vec<ScoredItem>, page: Page, max_seq: u32) -> RankedPage {
	sort_candidates(&mut items);

	// Diversification runs over the full buffered set before windowing, so
	// adjacent pages cut the same underlying sequence.
	let diversified = diversify(items, max_seq);
	let windowed: Vec<ScoredItem> = diversified
		.into_iter()
		.skip(page.offset as usize)
		.take(page.limit as usize)
		.collect();

	RankedPage { items: windowed, offset: page.offset, limit: page.limit }
}

/// Score is the primary key, recency the tie-break; the id comparison at the
/// end keeps equal candidates in a stable order across runs.
pub fn sort_candidates(items: &mut [ScoredItem]) {
	items.sort_by(|a, b| {
		let ord = cmp_f32_desc(a.score, b.score);

		if ord != Ordering::Equal {
			return ord;
		}

		let ord = b.item.created_at.cmp(&a.item.created_at);

		if ord != Ordering::Equal {
			return ord;
		}

		a.item.id.cmp(&b.item.id)
	});
}

/// Greedy reorder so no kind appears more than `max_seq` times in a row. When
/// every remaining candidate shares the previous pick's kind, the original
/// order wins.
pub fn diversify(items: Vec<ScoredItem>, max_seq: u32) -> Vec<ScoredItem> {
	let max_seq = max_seq.max(1) as usize;
	let mut remaining = items;
	let mut out = Vec::with_capacity(remaining.len());
	let mut run_len = 0_usize;

	while !remaining.is_empty() {
		let last_kind = out.last().map(|picked: &ScoredItem| picked.item.kind);
		let pick = if run_len >= max_seq
			&& let Some(last_kind) = last_kind
		{
			remaining
				.iter()
				.position(|candidate| candidate.item.kind != last_kind)
				.unwrap_or(0)
		} else {
			0
		};
		let picked = remaining.remove(pick);

		run_len = if last_kind == Some(picked.item.kind) { run_len + 1 } else { 1 };

		out.push(picked);
	}

	out
}

fn cmp_f32_desc(lhs: f32, rhs: f32) -> Ordering {
	match rhs.partial_cmp(&lhs) {
		Some(ord) => ord,
		// NaN scores sink to the bottom.
		None =>
			if lhs.is_nan() && rhs.is_nan() {
				Ordering::Equal
			} else if lhs.is_nan() {
				Ordering::Greater
			} else {
				Ordering::Less
			},
	}
}
