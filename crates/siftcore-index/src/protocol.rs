use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::{IndexError, NoteContent, RecordId};

/// Partial filter update. An absent field leaves the indexer's current value
/// alone; `tag: null` closes the opened tag.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    pub tag: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trash: Option<bool>,
}

impl FilterPatch {
    pub fn query(query: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
            ..Self::default()
        }
    }

    pub fn tag(name: impl Into<String>) -> Self {
        Self {
            tag: Some(Some(name.into())),
            ..Self::default()
        }
    }

    pub fn trash() -> Self {
        Self {
            tag: Some(None),
            trash: Some(true),
            ..Self::default()
        }
    }

    pub fn all() -> Self {
        Self {
            tag: Some(None),
            trash: Some(false),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum IndexerRequest {
    Upsert { id: RecordId, content: NoteContent },
    Filter(FilterPatch),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum IndexerReply {
    FilterResult { ids: Vec<RecordId> },
    #[serde(other)]
    Unknown,
}

/// Request side of the indexer channel. Sending never waits for a reply.
pub trait IndexerPort {
    fn send(&self, request: IndexerRequest) -> Result<(), IndexError>;
}

impl IndexerPort for mpsc::UnboundedSender<IndexerRequest> {
    fn send(&self, request: IndexerRequest) -> Result<(), IndexError> {
        mpsc::UnboundedSender::send(self, request).map_err(|_| IndexError::ChannelClosed)
    }
}

impl<P: IndexerPort + ?Sized> IndexerPort for std::sync::Arc<P> {
    fn send(&self, request: IndexerRequest) -> Result<(), IndexError> {
        (**self).send(request)
    }
}

pub fn encode_request(request: &IndexerRequest) -> Result<String, IndexError> {
    Ok(serde_json::to_string(request)?)
}

pub fn decode_request(frame: &str) -> Result<IndexerRequest, IndexError> {
    Ok(serde_json::from_str(frame)?)
}

pub fn encode_reply(reply: &IndexerReply) -> Result<String, IndexError> {
    Ok(serde_json::to_string(reply)?)
}

pub fn decode_reply(frame: &str) -> Result<IndexerReply, IndexError> {
    Ok(serde_json::from_str(frame)?)
}
