use std::collections::HashMap;

use siftcore_index::{FilterContext, IndexerReply, IndexerRequest, NoteContent, RecordId};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::matcher::Matcher;

/// Handle to the in-process reference indexer.
pub struct IndexerHandle {
    pub requests: mpsc::UnboundedSender<IndexerRequest>,
    pub replies: mpsc::UnboundedReceiver<IndexerReply>,
    pub task: JoinHandle<()>,
}

#[derive(Default)]
struct Corpus {
    entries: Vec<(RecordId, NoteContent)>,
    position_by_id: HashMap<RecordId, usize>,
    context: FilterContext,
}

impl Corpus {
    fn upsert(&mut self, id: RecordId, content: NoteContent) {
        if let Some(&position) = self.position_by_id.get(&id) {
            self.entries[position].1 = content;
        } else {
            self.position_by_id.insert(id.clone(), self.entries.len());
            self.entries.push((id, content));
        }
    }

    fn run_filter(&self) -> Vec<RecordId> {
        let matcher = Matcher::new(&self.context);
        self.entries
            .iter()
            .filter(|(_, content)| matcher.matches(content))
            .map(|(id, _)| id.clone())
            .collect()
    }
}

/// Spawns the reference indexer on the current tokio runtime.
///
/// Filter commands that queue up behind each other are coalesced: every
/// queued message is applied first and a single reply is produced for the
/// resulting context. Replies list ids in corpus insertion order, which need
/// not match the caller's record order.
pub fn spawn_indexer() -> IndexerHandle {
    let (request_tx, mut request_rx) = mpsc::unbounded_channel::<IndexerRequest>();
    let (reply_tx, reply_rx) = mpsc::unbounded_channel::<IndexerReply>();

    let task = tokio::spawn(async move {
        let mut corpus = Corpus::default();

        while let Some(request) = request_rx.recv().await {
            let mut pending_filter = apply_request(&mut corpus, request);

            while let Ok(queued) = request_rx.try_recv() {
                pending_filter |= apply_request(&mut corpus, queued);
            }

            if !pending_filter {
                continue;
            }

            let ids = corpus.run_filter();
            tracing::debug!(
                matched = ids.len(),
                total = corpus.entries.len(),
                "reference indexer filter complete"
            );
            if reply_tx.send(IndexerReply::FilterResult { ids }).is_err() {
                break;
            }
        }
    });

    IndexerHandle {
        requests: request_tx,
        replies: reply_rx,
        task,
    }
}

fn apply_request(corpus: &mut Corpus, request: IndexerRequest) -> bool {
    match request {
        IndexerRequest::Upsert { id, content } => {
            corpus.upsert(id, content);
            false
        }
        IndexerRequest::Filter(patch) => {
            corpus.context.apply(&patch);
            true
        }
    }
}
