use std::cmp::Ordering;

use crate::store::TrackedCard;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Question,
    Answer,
    CreatedAt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// User-controlled view parameters: a case-insensitive substring filter on
/// the question field plus a sort specification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewQuery {
    pub filter: String,
    pub sort_key: SortKey,
    pub direction: Direction,
}

impl Default for ViewQuery {
    fn default() -> Self {
        Self {
            filter: String::new(),
            sort_key: SortKey::Question,
            direction: Direction::Ascending,
        }
    }
}

fn comparator(key: SortKey) -> fn(&TrackedCard, &TrackedCard) -> Ordering {
    match key {
        SortKey::Question => |a, b| a.card.question.cmp(&b.card.question),
        SortKey::Answer => |a, b| a.card.answer.cmp(&b.card.answer),
        SortKey::CreatedAt => |a, b| a.card.created_at.cmp(&b.card.created_at),
    }
}

/// Derives the ordered sequence of cards to display: filter first, then sort
/// by the selected key. Pure and side-effect-free; callers re-run it after
/// any store change or query change. Relative order of equal keys is
/// unspecified.
pub fn project(snapshot: &[TrackedCard], query: &ViewQuery) -> Vec<TrackedCard> {
    let needle = query.filter.to_lowercase();
    let mut view: Vec<TrackedCard> = snapshot
        .iter()
        .filter(|tracked| tracked.card.question.to_lowercase().contains(&needle))
        .cloned()
        .collect();

    let compare = comparator(query.sort_key);
    view.sort_unstable_by(|a, b| match query.direction {
        Direction::Ascending => compare(a, b),
        Direction::Descending => compare(b, a),
    });
    view
}
