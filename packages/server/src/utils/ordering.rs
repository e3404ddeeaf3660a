use chrono::{DateTime, Utc};

/// Ordering inputs of a listing candidate.
pub trait DisplayOrdered {
    /// Editor-assigned slot, 1-based, when pinned.
    fn display_order(&self) -> Option<i32>;
    /// Source-creation time. Newer posts fill slots first among the
    /// unpinned.
    fn created_at(&self) -> DateTime<Utc>;
}

impl DisplayOrdered for crate::entity::post::Model {
    fn display_order(&self) -> Option<i32> {
        self.display_order
    }
    fn created_at(&self) -> DateTime<Utc> {
        self.wp_created_at
    }
}

/// Merge pinned and unpinned candidates into at most `page_size` slots.
///
/// Slot i (1-based) takes the first candidate pinned exactly to i,
/// else the newest remaining unpinned candidate. Once the unpinned run
/// out, leftover pins fill the remaining slots by ascending pin value:
/// these are the losers of duplicate pins and pins past the page.
/// Duplicate pins resolve to whichever candidate came first in the
/// input; pin values are otherwise unconstrained (sparse, duplicate
/// and out-of-range values all merge cleanly).
pub fn resolve_display_order<T: DisplayOrdered>(candidates: Vec<T>, page_size: usize) -> Vec<T> {
    let (pinned, mut unpinned): (Vec<T>, Vec<T>) = candidates
        .into_iter()
        .partition(|c| c.display_order().is_some());

    // Newest first. Stable: equal timestamps keep input order.
    unpinned.sort_by(|a, b| b.created_at().cmp(&a.created_at()));

    let mut pinned: Vec<Option<T>> = pinned.into_iter().map(Some).collect();
    let mut unpinned = unpinned.into_iter();
    let mut result: Vec<T> = Vec::with_capacity(page_size.min(pinned.len() + unpinned.len()));

    for slot in 1..=page_size {
        let exact = pinned
            .iter_mut()
            .find(|c| {
                c.as_ref()
                    .is_some_and(|c| c.display_order() == Some(slot as i32))
            })
            .and_then(|c| c.take());

        if let Some(c) = exact {
            result.push(c);
        } else if let Some(c) = unpinned.next() {
            result.push(c);
        } else if let Some(c) = take_lowest_pin(&mut pinned) {
            result.push(c);
        } else {
            break;
        }
    }

    result
}

fn take_lowest_pin<T: DisplayOrdered>(pinned: &mut [Option<T>]) -> Option<T> {
    let mut best: Option<(usize, i32)> = None;
    for (idx, candidate) in pinned.iter().enumerate() {
        if let Some(pin) = candidate.as_ref().and_then(DisplayOrdered::display_order)
            && best.is_none_or(|(_, best_pin)| pin < best_pin)
        {
            best = Some((idx, pin));
        }
    }
    best.and_then(|(idx, _)| pinned[idx].take())
}
