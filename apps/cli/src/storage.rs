use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use siftcore_index::Record;

#[derive(Deserialize)]
#[serde(untagged)]
enum NotesFile {
    Snapshot { notes: Vec<Record> },
    Bare(Vec<Record>),
}

/// Reads notes from either `{"notes": [...]}` or a bare array. Notes without
/// an id are skipped.
pub(crate) fn load_notes(path: &Path) -> Result<Vec<Record>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading notes from {}", path.display()))?;
    let file: NotesFile = serde_json::from_str(&content)
        .with_context(|| format!("parsing notes in {}", path.display()))?;

    let notes = match file {
        NotesFile::Snapshot { notes } | NotesFile::Bare(notes) => notes,
    };
    let total = notes.len();
    let notes: Vec<Record> = notes.into_iter().filter(|note| note.id.is_valid()).collect();
    if notes.len() < total {
        tracing::warn!(skipped = total - notes.len(), "ignoring notes without an id");
    }

    Ok(notes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(content: &str) -> tempfile::NamedTempFile {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), content).unwrap();
        file
    }

    #[test]
    fn reads_snapshot_and_bare_arrays() {
        let snapshot = write(r#"{"notes":[{"id":"a","content":{"text":"hi","tags":["x"]}}]}"#);
        let notes = load_notes(snapshot.path()).unwrap();
        assert_eq!(notes.len(), 1);
        assert!(notes[0].content.has_tag("X"));

        let bare = write(r#"[{"id":"a"},{"id":"b","content":{"trashed":true}}]"#);
        let notes = load_notes(bare.path()).unwrap();
        assert_eq!(notes.len(), 2);
        assert!(notes[1].content.trashed);
    }

    #[test]
    fn drops_notes_without_id() {
        let file = write(r#"[{"id":""},{"id":"kept"}]"#);
        let notes = load_notes(file.path()).unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].id.as_str(), "kept");
    }

    #[test]
    fn reports_the_offending_path() {
        let file = write("{ not json");
        let err = load_notes(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("parsing notes"));
    }
}
