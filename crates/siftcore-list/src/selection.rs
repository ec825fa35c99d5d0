use siftcore_index::{Record, RecordId};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    pub selected_id: Option<RecordId>,
    pub selected_index: Option<usize>,
}

/// Picks the index to highlight in `filtered`.
///
/// Tries, in order: the previous index if it still holds the explicit
/// selection, a scan for the explicit selection, then the previous position
/// clamped to the new length and moved to the nearest record with a valid id. Without any prior selection the first record
/// with a valid id wins.
pub fn resolve_highlighted(
    filtered: &[Record],
    previous: &SelectionState,
    explicit: Option<&RecordId>,
) -> Option<usize> {
    if filtered.is_empty() {
        return None;
    }

    let last = filtered.len() - 1;
    let first_valid = || filtered.iter().position(|record| record.id.is_valid());

    match (explicit, previous.selected_index) {
        (None, None) => first_valid(),
        (Some(id), previous_index) => {
            if let Some(index) = previous_index {
                if filtered.get(index).is_some_and(|record| &record.id == id) {
                    return Some(index);
                }
            }

            if let Some(index) = filtered.iter().position(|record| &record.id == id) {
                return Some(index);
            }

            match previous_index {
                Some(index) => nearest_valid(filtered, index.min(last)),
                None => first_valid(),
            }
        }
        (None, Some(index)) => nearest_valid(filtered, index.min(last)),
    }
}

/// `index` itself if it holds a valid id, otherwise the closest record that
/// does, looking forward first on ties.
fn nearest_valid(filtered: &[Record], index: usize) -> Option<usize> {
    let valid = |i: usize| filtered.get(i).is_some_and(|record| record.id.is_valid());
    (0..filtered.len()).find_map(|distance| {
        let after = index + distance;
        if valid(after) {
            return Some(after);
        }
        index.checked_sub(distance).filter(|&before| valid(before))
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub index: Option<usize>,
    /// Set when the highlighted record differs from the explicit selection,
    /// i.e. the owner should be asked to select it.
    pub select_request: Option<RecordId>,
}

#[derive(Debug, Default)]
pub struct SelectionTracker {
    state: SelectionState,
}

impl SelectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn reset(&mut self) {
        self.state = SelectionState::default();
    }

    /// Recomputes the highlight for a new filtered list. A selection hint
    /// stands in for the previous index for this one resolution.
    pub fn reconcile(
        &mut self,
        filtered: &[Record],
        explicit: Option<&RecordId>,
        hint: Option<usize>,
    ) -> Resolution {
        let previous = SelectionState {
            selected_id: self.state.selected_id.clone(),
            selected_index: hint.or(self.state.selected_index),
        };

        let index = resolve_highlighted(filtered, &previous, explicit);
        let resolved_id = index
            .and_then(|i| filtered.get(i))
            .map(|record| record.id.clone())
            .filter(RecordId::is_valid);

        let select_request = match (&resolved_id, explicit) {
            (Some(resolved), Some(current)) if resolved == current => None,
            (Some(resolved), _) => Some(resolved.clone()),
            (None, _) => None,
        };

        if let Some(id) = &select_request {
            tracing::debug!(selected = %id, index = ?index, "selection moved to a different note");
        }

        self.state = SelectionState {
            selected_id: resolved_id,
            selected_index: index,
        };

        Resolution {
            index,
            select_request,
        }
    }
}
