mod protocol;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use protocol::{
    decode_reply, decode_request, encode_reply, encode_request, FilterPatch, IndexerPort,
    IndexerReply, IndexerRequest,
};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Synthetic and placeholder entries carry an empty id.
    pub fn is_valid(&self) -> bool {
        !self.0.is_empty()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NoteContent {
    pub text: String,
    pub tags: Vec<String>,
    pub pinned: bool,
    pub trashed: bool,
    pub published: bool,
}

impl NoteContent {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    #[serde(default)]
    pub content: NoteContent,
    #[serde(default)]
    pub modified_unix_secs: i64,
}

impl Record {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: RecordId::new(id),
            content: NoteContent {
                text: text.into(),
                ..NoteContent::default()
            },
            modified_unix_secs: 0,
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.content.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn trashed(mut self) -> Self {
        self.content.trashed = true;
        self
    }

    pub fn pinned(mut self) -> Self {
        self.content.pinned = true;
        self
    }
}

/// Query, opened tag and trash view. A tag and the trash view are never
/// active together.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterContext {
    pub query: String,
    pub tag: Option<String>,
    pub show_trash: bool,
}

impl FilterContext {
    pub fn open_tag(&mut self, name: impl Into<String>) {
        self.tag = Some(name.into());
        self.show_trash = false;
    }

    pub fn select_trash(&mut self) {
        self.tag = None;
        self.show_trash = true;
    }

    pub fn show_all(&mut self) {
        self.tag = None;
        self.show_trash = false;
    }

    pub fn apply(&mut self, patch: &FilterPatch) {
        if let Some(query) = &patch.query {
            self.query = query.clone();
        }

        match &patch.tag {
            Some(Some(name)) => self.open_tag(name.clone()),
            Some(None) => self.tag = None,
            None => {}
        }

        match patch.trash {
            Some(true) => self.select_trash(),
            Some(false) => self.show_trash = false,
            None => {}
        }
    }

    /// A patch that restates the whole context.
    pub fn to_patch(&self) -> FilterPatch {
        FilterPatch {
            query: Some(self.query.clone()),
            tag: Some(self.tag.clone()),
            trash: Some(self.show_trash),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("indexer channel closed")]
    ChannelClosed,
    #[error("malformed indexer frame: {0}")]
    Codec(#[from] serde_json::Error),
}
