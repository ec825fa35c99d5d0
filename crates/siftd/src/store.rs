use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use siftcore_config::DisplayMode;
use siftcore_index::{FilterContext, Record, RecordId};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ContainerSize {
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    pub records: Vec<Record>,
    pub filter: FilterContext,
    pub display_mode: DisplayMode,
    pub container: ContainerSize,
    pub filtered: Vec<Record>,
    /// Bumped whenever `filtered` is replaced or one of its records changes.
    /// The hint only ever belongs to the latest replacement.
    pub filtered_revision: u64,
    pub selection_hint: Option<usize>,
    pub selected_id: Option<RecordId>,
    pub account: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    LoadRecords(Vec<Record>),
    UpsertRecord(Record),
    TrashRecord(RecordId),
    RestoreRecord(RecordId),
    DeleteRecord(RecordId),
    SetQuery(String),
    OpenTag(String),
    SelectTrash,
    ShowAll,
    SetAccount(Option<String>),
    SetDisplayMode(DisplayMode),
    ResizeContainer(ContainerSize),
    FilteredNotes {
        records: Vec<Record>,
        selection_hint: Option<usize>,
    },
    SelectNote(RecordId),
    TogglePinned(RecordId),
}

pub type Listener = Arc<dyn Fn(&AppState) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// The application state container the filtering core talks to.
pub trait StateStore: Send + Sync {
    fn state(&self) -> Arc<AppState>;
    fn dispatch(&self, action: Action);
    fn subscribe(&self, listener: Listener) -> SubscriptionId;
    fn unsubscribe(&self, id: SubscriptionId);
}

/// In-process store. Snapshots are shared `Arc`s; listeners run after the
/// state lock is released, so they may dispatch.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<Arc<AppState>>,
    listeners: Mutex<Vec<(SubscriptionId, Listener)>>,
    next_subscription: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: AppState) -> Self {
        Self {
            state: Mutex::new(Arc::new(state)),
            ..Self::default()
        }
    }
}

impl StateStore for MemoryStore {
    fn state(&self) -> Arc<AppState> {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn dispatch(&self, action: Action) {
        let snapshot = {
            let mut guard = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            reduce(Arc::make_mut(&mut *guard), action);
            guard.clone()
        };

        let listeners: Vec<Listener> = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();
        for listener in listeners {
            listener(&snapshot);
        }
    }

    fn subscribe(&self, listener: Listener) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::Relaxed));
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, listener));
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|(existing, _)| *existing != id);
    }
}

pub fn reduce(state: &mut AppState, action: Action) {
    match action {
        Action::LoadRecords(records) => state.records = records,
        Action::UpsertRecord(record) => {
            if let Some(existing) = state.filtered.iter_mut().find(|r| r.id == record.id) {
                *existing = record.clone();
                state.filtered_revision += 1;
                state.selection_hint = None;
            }
            if let Some(existing) = state.records.iter_mut().find(|r| r.id == record.id) {
                *existing = record;
            } else {
                state.records.push(record);
            }
        }
        Action::TrashRecord(id) => set_trashed(state, &id, true),
        Action::RestoreRecord(id) => set_trashed(state, &id, false),
        Action::DeleteRecord(id) => {
            state.records.retain(|record| record.id != id);
            if let Some(position) = state.filtered.iter().position(|record| record.id == id) {
                state.filtered.remove(position);
                state.filtered_revision += 1;
                state.selection_hint = Some(position);
            }
        }
        Action::SetQuery(query) => state.filter.query = query,
        Action::OpenTag(name) => state.filter.open_tag(name),
        Action::SelectTrash => state.filter.select_trash(),
        Action::ShowAll => state.filter.show_all(),
        Action::SetAccount(account) => {
            state.account = account;
            state.selected_id = None;
        }
        Action::SetDisplayMode(mode) => state.display_mode = mode,
        Action::ResizeContainer(size) => state.container = size,
        Action::FilteredNotes {
            records,
            selection_hint,
        } => {
            state.filtered = records;
            state.selection_hint = selection_hint;
            state.filtered_revision += 1;
        }
        Action::SelectNote(id) => state.selected_id = Some(id),
        Action::TogglePinned(id) => {
            let mut touched_filtered = false;
            for record in state.records.iter_mut().filter(|r| r.id == id) {
                record.content.pinned = !record.content.pinned;
            }
            for record in state.filtered.iter_mut().filter(|r| r.id == id) {
                record.content.pinned = !record.content.pinned;
                touched_filtered = true;
            }
            if touched_filtered {
                state.filtered_revision += 1;
                state.selection_hint = None;
            }
        }
    }
}

fn set_trashed(state: &mut AppState, id: &RecordId, trashed: bool) {
    if let Some(record) = state.records.iter_mut().find(|r| &r.id == id) {
        record.content.trashed = trashed;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use super::*;

    #[test]
    fn upsert_replaces_in_place_and_refreshes_filtered_copy() {
        let store = MemoryStore::new();
        store.dispatch(Action::LoadRecords(vec![
            Record::new("a", "old"),
            Record::new("b", "b"),
        ]));
        store.dispatch(Action::FilteredNotes {
            records: vec![Record::new("a", "old")],
            selection_hint: None,
        });
        let revision = store.state().filtered_revision;

        store.dispatch(Action::UpsertRecord(Record::new("a", "new")));
        let state = store.state();
        assert_eq!(state.records[0].content.text, "new");
        assert_eq!(state.records.len(), 2);
        assert_eq!(state.filtered[0].content.text, "new");
        assert_eq!(state.filtered_revision, revision + 1);
    }

    #[test]
    fn delete_drops_the_filtered_copy_too() {
        let store = MemoryStore::new();
        store.dispatch(Action::LoadRecords(vec![
            Record::new("a", "a"),
            Record::new("b", "b"),
            Record::new("c", "c"),
        ]));
        store.dispatch(Action::FilteredNotes {
            records: vec![Record::new("a", "a"), Record::new("b", "b")],
            selection_hint: None,
        });
        let revision = store.state().filtered_revision;

        store.dispatch(Action::DeleteRecord(RecordId::new("b")));
        let state = store.state();
        assert_eq!(state.records.len(), 2);
        assert_eq!(state.filtered, vec![Record::new("a", "a")]);
        assert_eq!(state.filtered_revision, revision + 1);
        assert_eq!(state.selection_hint, Some(1));

        store.dispatch(Action::DeleteRecord(RecordId::new("c")));
        assert_eq!(store.state().filtered_revision, revision + 1);
    }

    #[test]
    fn listeners_see_each_dispatch_until_unsubscribed() {
        let store = MemoryStore::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        let id = store.subscribe(Arc::new(move |_: &AppState| {
            seen.fetch_add(1, Ordering::SeqCst);
        }));

        store.dispatch(Action::SetQuery("a".into()));
        store.dispatch(Action::ShowAll);
        store.unsubscribe(id);
        store.dispatch(Action::SelectTrash);

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn listener_may_dispatch() {
        let store = Arc::new(MemoryStore::new());
        let inner = store.clone();
        store.subscribe(Arc::new(move |state: &AppState| {
            if state.selected_id.is_none() && !state.filtered.is_empty() {
                inner.dispatch(Action::SelectNote(state.filtered[0].id.clone()));
            }
        }));

        store.dispatch(Action::FilteredNotes {
            records: vec![Record::new("a", "a")],
            selection_hint: None,
        });
        assert_eq!(store.state().selected_id, Some(RecordId::new("a")));
    }

    #[test]
    fn account_change_clears_selection() {
        let store = MemoryStore::new();
        store.dispatch(Action::SelectNote(RecordId::new("a")));
        store.dispatch(Action::SetAccount(Some("someone".into())));
        assert_eq!(store.state().selected_id, None);
    }

    #[test]
    fn snapshots_are_immutable() {
        let store = MemoryStore::new();
        let before = store.state();
        store.dispatch(Action::SetQuery("x".into()));
        assert_eq!(before.filter.query, "");
        assert_eq!(store.state().filter.query, "x");
    }
}
