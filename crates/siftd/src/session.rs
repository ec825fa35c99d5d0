use std::sync::Arc;
use std::time::{Duration, Instant};

use siftcore_config::Settings;
use siftcore_index::{IndexerPort, IndexerReply, RecordId};
use siftcore_list::{FilteredUpdate, KeyChord, KeyOutcome, ListView, MonospaceMeasurer, TextMeasurer};
use siftcore_query::tag_suggestions;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

use crate::coordinator::{AppEvent, IndexCoordinator};
use crate::store::{Action, AppState, StateStore};

/// One list of filtered notes: the coordinator feeding the store, and the
/// list view following it.
pub struct FilterSession<P, M = MonospaceMeasurer> {
    coordinator: IndexCoordinator<P>,
    view: ListView<M>,
    store: Arc<dyn StateStore>,
    seen_revision: Option<u64>,
    seen_selected: Option<RecordId>,
    seen_account: Option<String>,
}

impl<P: IndexerPort> FilterSession<P, MonospaceMeasurer> {
    pub fn with_settings(port: P, store: Arc<dyn StateStore>, settings: &Settings) -> Self {
        Self::new(port, store, ListView::from_settings(settings))
    }
}

impl<P: IndexerPort, M: TextMeasurer> FilterSession<P, M> {
    pub fn new(port: P, store: Arc<dyn StateStore>, view: ListView<M>) -> Self {
        Self {
            coordinator: IndexCoordinator::new(port, store.clone()),
            view,
            store,
            seen_revision: None,
            seen_selected: None,
            seen_account: None,
        }
    }

    pub fn store(&self) -> &Arc<dyn StateStore> {
        &self.store
    }

    pub fn view(&self) -> &ListView<M> {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut ListView<M> {
        &mut self.view
    }

    pub fn coordinator(&self) -> &IndexCoordinator<P> {
        &self.coordinator
    }

    pub fn handle_event(&mut self, event: AppEvent, now: Instant) {
        self.coordinator.handle_event(event);
        self.sync_view(now);
    }

    pub fn handle_reply(&mut self, reply: IndexerReply, now: Instant) {
        self.coordinator.handle_reply(reply);
        self.sync_view(now);
    }

    pub fn handle_frame(&mut self, frame: &str, now: Instant) {
        self.coordinator.handle_frame(frame);
        self.sync_view(now);
    }

    pub fn handle_key(&mut self, chord: &KeyChord, now: Instant) -> KeyOutcome {
        let outcome = self.view.handle_key(chord);
        if let KeyOutcome::Handled { select } = &outcome {
            self.select(select.clone(), now);
        }
        outcome
    }

    pub fn select(&mut self, id: RecordId, now: Instant) {
        self.store.dispatch(Action::SelectNote(id));
        self.sync_view(now);
    }

    /// Flips the pin flag of the highlighted note.
    pub fn toggle_pin(&mut self, now: Instant) -> Option<RecordId> {
        let target = self.view.pin_target()?;
        self.store.dispatch(Action::TogglePinned(target.clone()));
        self.sync_view(now);
        Some(target)
    }

    /// Catches up with the store, then drives the debounced height refresh.
    pub fn tick(&mut self, now: Instant) -> bool {
        self.sync_view(now);
        self.view.tick(now)
    }

    /// Pulls the latest state into the list view. The selection hint is only
    /// honoured on the first pass after the filtered list changed.
    pub fn sync_view(&mut self, now: Instant) {
        let state = self.store.state();

        if state.account != self.seen_account {
            self.seen_account = state.account.clone();
            self.view.reset_selection();
        }

        self.view
            .resize(state.container.width, state.container.height, now);
        self.view.set_display_mode(state.display_mode, now);

        let revision_changed = self.seen_revision != Some(state.filtered_revision);
        if !revision_changed && state.selected_id == self.seen_selected {
            return;
        }

        let request = self.view.apply_filtered(update_for(&state, revision_changed));
        self.seen_revision = Some(state.filtered_revision);
        self.seen_selected = state.selected_id.clone();

        if let Some(id) = request {
            self.seen_selected = Some(id.clone());
            self.store.dispatch(Action::SelectNote(id));
        }
    }
}

fn update_for(state: &AppState, revision_changed: bool) -> FilteredUpdate<'_> {
    FilteredUpdate {
        records: &state.filtered,
        query: &state.filter.query,
        tag_suggestions: tag_suggestions(&state.records, &state.filter).len(),
        selected_id: state.selected_id.as_ref(),
        selection_hint: state.selection_hint.filter(|_| revision_changed),
    }
}

/// Runs the session until the event channel closes, then hands it back.
///
/// Store changes made by other writers are picked up through a store
/// subscription; the debounced refresh is polled every `poll_interval`.
pub async fn drive<P, M>(
    mut session: FilterSession<P, M>,
    mut events: mpsc::UnboundedReceiver<AppEvent>,
    mut replies: mpsc::UnboundedReceiver<IndexerReply>,
    poll_interval: Duration,
) -> FilterSession<P, M>
where
    P: IndexerPort,
    M: TextMeasurer,
{
    let (notify_tx, mut notify_rx) = mpsc::unbounded_channel::<()>();
    let subscription = session.store().subscribe(Arc::new(move |_: &AppState| {
        let _ = notify_tx.send(());
    }));

    let mut ticker = tokio::time::interval(poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    tracing::info!(poll_ms = poll_interval.as_millis() as u64, "filter session started");

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(event) => session.handle_event(event, Instant::now()),
                None => break,
            },
            Some(reply) = replies.recv() => session.handle_reply(reply, Instant::now()),
            Some(()) = notify_rx.recv() => session.sync_view(Instant::now()),
            _ = ticker.tick() => {
                session.tick(Instant::now());
            }
        }
    }

    session.store().unsubscribe(subscription);
    session.view_mut().cancel_pending();
    tracing::info!("filter session stopped");
    session
}
