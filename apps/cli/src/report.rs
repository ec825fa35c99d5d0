use std::io::{self, Write};

use siftcore_index::IndexerPort;
use siftcore_list::{note_preview, RowDescriptor, TextMeasurer};
use siftcore_query::tag_suggestions;
use siftd::FilterSession;

const TITLE_WIDTH: usize = 48;

pub(crate) fn print<P, M>(session: &FilterSession<P, M>, out: &mut impl Write) -> io::Result<()>
where
    P: IndexerPort,
    M: TextMeasurer,
{
    let state = session.store().state();
    let view = session.view();

    writeln!(
        out,
        "{} of {} notes, mode {}, width {:.0}px, total height {:.0}px",
        state.filtered.len(),
        state.records.len(),
        view.display_mode().label(),
        view.layout_width(),
        view.total_height(),
    )?;

    let suggestions = tag_suggestions(&state.records, &state.filter);
    if !suggestions.is_empty() {
        writeln!(out, "tags: {}", suggestions.join(", "))?;
    }

    for (row, descriptor) in view.layout().iter().zip(view.rows()) {
        let marker = if view.highlighted_row() == Some(row.index) {
            '>'
        } else {
            ' '
        };
        writeln!(
            out,
            "{marker} {:>3} {:>7.1} {:>5.1}  {}",
            row.index,
            row.top,
            row.height,
            row_label(descriptor),
        )?;
    }

    Ok(())
}

fn row_label(row: &RowDescriptor) -> String {
    match row {
        RowDescriptor::Record(record) => {
            let preview = note_preview(&record.content.text);
            let pin = if record.content.pinned { "* " } else { "" };
            format!("{pin}{}", truncate_end(preview.display_title(), TITLE_WIDTH))
        }
        RowDescriptor::Header => "-- notes --".to_string(),
        RowDescriptor::TagSuggestions(count) => format!("[{count} tag suggestions]"),
        RowDescriptor::EmptyPlaceholder => "(no matching notes)".to_string(),
    }
}

fn truncate_end(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }

    let mut truncated: String = value.chars().take(max_chars.saturating_sub(1)).collect();
    truncated.push('…');
    truncated
}

#[cfg(test)]
mod tests {
    use siftcore_index::Record;

    use super::*;

    #[test]
    fn labels_cover_every_row_kind() {
        assert_eq!(row_label(&RowDescriptor::Header), "-- notes --");
        assert_eq!(
            row_label(&RowDescriptor::TagSuggestions(2)),
            "[2 tag suggestions]"
        );
        assert_eq!(
            row_label(&RowDescriptor::Record(Record::new("a", "\n  Shopping\nmilk").pinned())),
            "* Shopping"
        );
        assert_eq!(
            row_label(&RowDescriptor::Record(Record::new("b", ""))),
            "New Note…"
        );
    }

    #[test]
    fn long_titles_are_cut() {
        let cut = truncate_end(&"x".repeat(60), 10);
        assert_eq!(cut.chars().count(), 10);
        assert!(cut.ends_with('…'));
    }
}
