use std::collections::HashSet;
use std::sync::Arc;

use siftcore_config::DisplayMode;
use siftcore_index::{
    decode_reply, FilterPatch, IndexerPort, IndexerReply, IndexerRequest, Record, RecordId,
};
use siftcore_query::Matcher;

use crate::store::{Action, ContainerSize, StateStore};

/// Application events the coordinator sits in front of.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    RecordsLoaded(Vec<Record>),
    RecordUpserted(Record),
    RecordTrashed(RecordId),
    RecordRestored(RecordId),
    RecordDeleted(RecordId),
    QueryChanged(String),
    TagOpened(String),
    TrashSelected,
    ShowAll,
    AccountChanged(Option<String>),
    DisplayModeChanged(DisplayMode),
    ContainerResized(ContainerSize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Uninitialized,
    Ready,
}

/// Turns events into indexer commands and indexer replies into filtered
/// lists. Commands are fire-and-forget; the last reply applied wins.
pub struct IndexCoordinator<P> {
    port: P,
    store: Arc<dyn StateStore>,
    phase: Phase,
}

impl<P: IndexerPort> IndexCoordinator<P> {
    pub fn new(port: P, store: Arc<dyn StateStore>) -> Self {
        Self {
            port,
            store,
            phase: Phase::Uninitialized,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.phase == Phase::Ready
    }

    pub fn store(&self) -> &Arc<dyn StateStore> {
        &self.store
    }

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::RecordsLoaded(records) => {
                self.store.dispatch(Action::LoadRecords(records));
                self.bulk_load();
            }
            AppEvent::RecordUpserted(record) => {
                let command = IndexerRequest::Upsert {
                    id: record.id.clone(),
                    content: record.content.clone(),
                };
                self.store.dispatch(Action::UpsertRecord(record));
                self.send_when_ready(command);
            }
            AppEvent::RecordTrashed(id) => {
                self.mutate_and_rebuild(&id, Action::TrashRecord(id.clone()), true)
            }
            AppEvent::RecordRestored(id) => {
                self.mutate_and_rebuild(&id, Action::RestoreRecord(id.clone()), true)
            }
            AppEvent::RecordDeleted(id) => {
                self.mutate_and_rebuild(&id, Action::DeleteRecord(id.clone()), false)
            }
            AppEvent::QueryChanged(query) => {
                self.store.dispatch(Action::SetQuery(query.clone()));
                self.send_when_ready(IndexerRequest::Filter(FilterPatch::query(query)));
            }
            AppEvent::TagOpened(name) => {
                self.store.dispatch(Action::OpenTag(name.clone()));
                self.send_when_ready(IndexerRequest::Filter(FilterPatch::tag(name)));
            }
            AppEvent::TrashSelected => {
                self.store.dispatch(Action::SelectTrash);
                self.send_when_ready(IndexerRequest::Filter(FilterPatch::trash()));
            }
            AppEvent::ShowAll => {
                self.store.dispatch(Action::ShowAll);
                self.send_when_ready(IndexerRequest::Filter(FilterPatch::all()));
            }
            AppEvent::AccountChanged(account) => {
                self.store.dispatch(Action::SetAccount(account));
                if self.is_ready() {
                    self.rebuild_now(None);
                }
            }
            AppEvent::DisplayModeChanged(mode) => {
                self.store.dispatch(Action::SetDisplayMode(mode));
            }
            AppEvent::ContainerResized(size) => {
                self.store.dispatch(Action::ResizeContainer(size));
            }
        }
    }

    pub fn handle_reply(&mut self, reply: IndexerReply) {
        match reply {
            IndexerReply::FilterResult { ids } => self.apply_filter_result(&ids),
            IndexerReply::Unknown => tracing::debug!("ignoring unrecognized indexer reply"),
        }
    }

    /// Decodes and applies one raw reply frame. Undecodable frames are
    /// dropped.
    pub fn handle_frame(&mut self, frame: &str) {
        match decode_reply(frame) {
            Ok(reply) => self.handle_reply(reply),
            Err(err) => tracing::debug!(error = %err, "ignoring undecodable indexer frame"),
        }
    }

    /// Recomputes the filtered list in place with the fallback matcher.
    pub fn rebuild_now(&self, selection_hint: Option<usize>) {
        let state = self.store.state();
        let matcher = Matcher::new(&state.filter);
        let records: Vec<Record> = state
            .records
            .iter()
            .filter(|record| matcher.matches(&record.content))
            .cloned()
            .collect();

        tracing::debug!(records = records.len(), hint = ?selection_hint, "synchronous rebuild");
        self.store.dispatch(Action::FilteredNotes {
            records,
            selection_hint,
        });
    }

    fn bulk_load(&mut self) {
        if self.is_ready() {
            tracing::debug!("records reloaded after bulk load; index left as is");
            return;
        }

        let state = self.store.state();
        for record in &state.records {
            self.send(IndexerRequest::Upsert {
                id: record.id.clone(),
                content: record.content.clone(),
            });
        }
        self.send(IndexerRequest::Filter(state.filter.to_patch()));
        self.phase = Phase::Ready;

        tracing::info!(records = state.records.len(), "bulk loaded records into the indexer");
    }

    /// Applies a local record change and rebuilds right away. With
    /// `reindex`, the changed content is also upserted so later filter
    /// replies see it; deleted ids need no upsert since replies drop them.
    fn mutate_and_rebuild(&mut self, id: &RecordId, action: Action, reindex: bool) {
        let hint = self
            .store
            .state()
            .filtered
            .iter()
            .position(|record| &record.id == id);
        self.store.dispatch(action);

        if !self.is_ready() {
            return;
        }

        if reindex {
            let state = self.store.state();
            if let Some(record) = state.records.iter().find(|record| &record.id == id) {
                self.send(IndexerRequest::Upsert {
                    id: record.id.clone(),
                    content: record.content.clone(),
                });
            }
        }
        self.rebuild_now(hint);
    }

    fn apply_filter_result(&self, ids: &[RecordId]) {
        let state = self.store.state();
        let wanted: HashSet<&RecordId> = ids.iter().collect();
        let records: Vec<Record> = state
            .records
            .iter()
            .filter(|record| wanted.contains(&record.id))
            .cloned()
            .collect();

        tracing::debug!(ids = ids.len(), records = records.len(), "applying filter result");
        self.store.dispatch(Action::FilteredNotes {
            records,
            selection_hint: None,
        });
    }

    fn send_when_ready(&self, command: IndexerRequest) {
        if self.is_ready() {
            self.send(command);
        }
    }

    fn send(&self, command: IndexerRequest) {
        if let Err(err) = self.port.send(command) {
            tracing::warn!(error = %err, "indexer unavailable, command dropped");
        }
    }
}
