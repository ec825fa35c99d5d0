use siftcore_index::{Record, RecordId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowDescriptor {
    Record(Record),
    Header,
    TagSuggestions(usize),
    EmptyPlaceholder,
}

impl RowDescriptor {
    /// The record id behind this row, if it is a real record with a valid id.
    pub fn record_id(&self) -> Option<&RecordId> {
        match self {
            Self::Record(record) if record.id.is_valid() => Some(&record.id),
            _ => None,
        }
    }

    pub fn key(&self) -> String {
        match self {
            Self::Record(record) => format!("note:{}", record.id),
            Self::Header => "header".to_string(),
            Self::TagSuggestions(_) => "tag-suggestions".to_string(),
            Self::EmptyPlaceholder => "empty".to_string(),
        }
    }
}

/// Builds the row sequence for a filtered list. With an active query and at
/// least one tag suggestion, a suggestions row and a header lead the list and
/// an empty result shows a placeholder row.
pub fn project(records: &[Record], query: &str, tag_suggestion_count: usize) -> Vec<RowDescriptor> {
    if query.trim().is_empty() || tag_suggestion_count == 0 {
        return records.iter().cloned().map(RowDescriptor::Record).collect();
    }

    let mut rows = Vec::with_capacity(records.len() + 3);
    rows.push(RowDescriptor::TagSuggestions(tag_suggestion_count));
    rows.push(RowDescriptor::Header);
    if records.is_empty() {
        rows.push(RowDescriptor::EmptyPlaceholder);
    } else {
        rows.extend(records.iter().cloned().map(RowDescriptor::Record));
    }
    rows
}

/// Projected rows plus the offset between record indices and row indices.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompositeList {
    rows: Vec<RowDescriptor>,
    record_offset: usize,
    record_count: usize,
}

impl CompositeList {
    pub fn build(records: &[Record], query: &str, tag_suggestion_count: usize) -> Self {
        let rows = project(records, query, tag_suggestion_count);
        // synthetic rows only ever lead the list
        let record_offset = rows.len() - records.len();
        Self {
            rows,
            record_offset,
            record_count: records.len(),
        }
    }

    pub fn rows(&self) -> &[RowDescriptor] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&RowDescriptor> {
        self.rows.get(index)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn record_offset(&self) -> usize {
        self.record_offset
    }

    pub fn row_for_record(&self, record_index: usize) -> Option<usize> {
        (record_index < self.record_count).then_some(record_index + self.record_offset)
    }

    pub fn record_for_row(&self, row_index: usize) -> Option<usize> {
        let record_index = row_index.checked_sub(self.record_offset)?;
        (record_index < self.record_count).then_some(record_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notes(ids: &[&str]) -> Vec<Record> {
        ids.iter().map(|id| Record::new(*id, *id)).collect()
    }

    #[test]
    fn empty_everything_is_empty() {
        assert_eq!(project(&[], "", 0), Vec::new());
    }

    #[test]
    fn no_query_passes_records_through() {
        let records = notes(&["a", "b"]);
        let rows = project(&records, "", 7);
        assert_eq!(
            rows,
            vec![
                RowDescriptor::Record(records[0].clone()),
                RowDescriptor::Record(records[1].clone())
            ]
        );
    }

    #[test]
    fn no_suggestions_passes_records_through() {
        let records = notes(&["a"]);
        assert_eq!(project(&records, "abc", 0).len(), 1);
    }

    #[test]
    fn empty_result_with_suggestions_shows_placeholder() {
        assert_eq!(
            project(&[], "abc", 3),
            vec![
                RowDescriptor::TagSuggestions(3),
                RowDescriptor::Header,
                RowDescriptor::EmptyPlaceholder
            ]
        );
    }

    #[test]
    fn suggestions_lead_records() {
        let records = notes(&["a", "b"]);
        let list = CompositeList::build(&records, "a", 2);
        assert_eq!(list.len(), 4);
        assert_eq!(list.record_offset(), 2);
        assert_eq!(list.row_for_record(1), Some(3));
        assert_eq!(list.record_for_row(1), None);
        assert_eq!(list.record_for_row(2), Some(0));
        assert_eq!(list.row(3).and_then(RowDescriptor::record_id), Some(&records[1].id));
    }

    #[test]
    fn placeholder_row_maps_to_no_record() {
        let list = CompositeList::build(&[], "abc", 1);
        assert_eq!(list.record_for_row(2), None);
        assert_eq!(list.row_for_record(0), None);
    }

    #[test]
    fn projection_is_deterministic() {
        let records = notes(&["a", "b", "c"]);
        assert_eq!(project(&records, "x", 1), project(&records, "x", 1));
    }
}
