use std::ops::Range;
use std::time::Instant;

use siftcore_config::{DisplayMode, ListMetrics, Settings};
use siftcore_index::{Record, RecordId};

use crate::composite::{CompositeList, RowDescriptor};
use crate::debounce::Debounce;
use crate::height::{HeightCache, MonospaceMeasurer, TextMeasurer};
use crate::keyboard::{handle_key, KeyChord, KeyOutcome};
use crate::selection::SelectionTracker;

/// Pixel box for one row, in list coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct RowBox {
    pub index: usize,
    pub key: String,
    pub top: f32,
    pub height: f32,
    pub width: f32,
}

/// Everything the list needs from a fresh filter result.
#[derive(Debug, Clone, Copy)]
pub struct FilteredUpdate<'a> {
    pub records: &'a [Record],
    pub query: &'a str,
    pub tag_suggestions: usize,
    pub selected_id: Option<&'a RecordId>,
    pub selection_hint: Option<usize>,
}

pub struct ListView<M = MonospaceMeasurer> {
    heights: HeightCache<M>,
    selection: SelectionTracker,
    refresh: Debounce,
    composite: CompositeList,
    records: Vec<Record>,
    display_mode: DisplayMode,
    pending_mode: DisplayMode,
    layout_width: f32,
    pending_width: f32,
    viewport_height: f32,
    row_tops: Vec<f32>,
    row_heights: Vec<f32>,
    highlighted_row: Option<usize>,
}

impl ListView<MonospaceMeasurer> {
    pub fn from_settings(settings: &Settings) -> Self {
        let measurer = MonospaceMeasurer::new(settings.list.glyph_width);
        Self::new(settings, measurer)
    }
}

impl<M: TextMeasurer> ListView<M> {
    pub fn new(settings: &Settings, measurer: M) -> Self {
        Self {
            heights: HeightCache::new(measurer, settings.list.clone()),
            selection: SelectionTracker::new(),
            refresh: Debounce::new(settings.debounce.delay(), settings.debounce.max_wait()),
            composite: CompositeList::default(),
            records: Vec::new(),
            display_mode: settings.display_mode,
            pending_mode: settings.display_mode,
            layout_width: 0.0,
            pending_width: 0.0,
            viewport_height: 0.0,
            row_tops: Vec::new(),
            row_heights: Vec::new(),
            highlighted_row: None,
        }
    }

    /// Rebuilds the rows for a new filtered list and re-resolves the
    /// highlight. Returns the note the owner should be asked to select.
    pub fn apply_filtered(&mut self, update: FilteredUpdate<'_>) -> Option<RecordId> {
        self.records = update.records.to_vec();
        self.composite = CompositeList::build(update.records, update.query, update.tag_suggestions);

        let resolution = self.selection.reconcile(
            update.records,
            update.selected_id,
            update.selection_hint,
        );
        self.highlighted_row = resolution
            .index
            .and_then(|index| self.composite.row_for_record(index));

        self.recompute_layout();
        resolution.select_request
    }

    /// Records the new container size. Heights follow once the debounce
    /// settles.
    pub fn resize(&mut self, width: f32, height: f32, now: Instant) {
        self.viewport_height = height.max(0.0);
        if width != self.pending_width {
            self.pending_width = width;
            self.refresh.trigger(now);
        }
    }

    pub fn set_display_mode(&mut self, mode: DisplayMode, now: Instant) {
        if mode != self.pending_mode {
            self.pending_mode = mode;
            self.refresh.trigger(now);
        }
    }

    /// Drives the debounced height refresh. Returns true when the layout was
    /// recomputed.
    pub fn tick(&mut self, now: Instant) -> bool {
        if !self.refresh.poll(now) {
            return false;
        }

        self.layout_width = self.pending_width;
        self.display_mode = self.pending_mode;
        self.recompute_layout();
        true
    }

    /// Forgets the previous highlight, e.g. after an account switch.
    pub fn reset_selection(&mut self) {
        self.selection.reset();
        self.highlighted_row = None;
    }

    /// Drops any pending refresh, e.g. when the list is torn down.
    pub fn cancel_pending(&mut self) {
        self.refresh.cancel();
    }

    pub fn is_refresh_pending(&self) -> bool {
        self.refresh.is_pending()
    }

    fn recompute_layout(&mut self) {
        let metrics = self.heights.metrics().clone();
        let mut tops = Vec::with_capacity(self.composite.len());
        let mut heights = Vec::with_capacity(self.composite.len());
        let mut top = 0.0f32;

        for row in self.composite.rows() {
            let height = match row {
                RowDescriptor::Record(record) => {
                    self.heights
                        .height_for(record, self.layout_width, self.display_mode)
                }
                other => synthetic_row_height(other, &metrics),
            };
            tops.push(top);
            heights.push(height);
            top += height;
        }

        self.row_tops = tops;
        self.row_heights = heights;
    }

    pub fn rows(&self) -> &[RowDescriptor] {
        self.composite.rows()
    }

    pub fn row_count(&self) -> usize {
        self.composite.len()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn display_mode(&self) -> DisplayMode {
        self.display_mode
    }

    pub fn layout_width(&self) -> f32 {
        self.layout_width
    }

    pub fn row_height(&self, index: usize) -> Option<f32> {
        self.row_heights.get(index).copied()
    }

    pub fn total_height(&self) -> f32 {
        match (self.row_tops.last(), self.row_heights.last()) {
            (Some(top), Some(height)) => top + height,
            _ => 0.0,
        }
    }

    pub fn layout(&self) -> Vec<RowBox> {
        self.composite
            .rows()
            .iter()
            .enumerate()
            .map(|(index, row)| self.row_box(index, row))
            .collect()
    }

    fn row_box(&self, index: usize, row: &RowDescriptor) -> RowBox {
        RowBox {
            index,
            key: row.key(),
            top: self.row_tops[index],
            height: self.row_heights[index],
            width: self.layout_width.max(0.0),
        }
    }

    /// Rows intersecting the viewport when scrolled to `scroll_top`.
    pub fn visible_rows(&self, scroll_top: f32) -> Range<usize> {
        let bottom = scroll_top + self.viewport_height;
        let start = self
            .row_tops
            .iter()
            .zip(&self.row_heights)
            .position(|(top, height)| top + height > scroll_top)
            .unwrap_or(self.row_tops.len());
        let end = self.row_tops.partition_point(|top| *top < bottom);
        start..end.max(start)
    }

    /// Scroll offset that keeps the highlighted row fully visible.
    pub fn scroll_into_view(&self, scroll_top: f32) -> f32 {
        let Some(row) = self.highlighted_row else {
            return scroll_top;
        };
        let (top, height) = (self.row_tops[row], self.row_heights[row]);

        if top < scroll_top {
            top
        } else if top + height > scroll_top + self.viewport_height {
            (top + height - self.viewport_height).max(0.0)
        } else {
            scroll_top
        }
    }

    pub fn highlighted_row(&self) -> Option<usize> {
        self.highlighted_row
    }

    pub fn highlighted_record(&self) -> Option<&Record> {
        match self.composite.row(self.highlighted_row?)? {
            RowDescriptor::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn handle_key(&self, chord: &KeyChord) -> KeyOutcome {
        handle_key(chord, self.composite.rows(), self.highlighted_row)
    }

    /// The note a pin toggle should apply to.
    pub fn pin_target(&self) -> Option<RecordId> {
        self.highlighted_record()
            .map(|record| record.id.clone())
            .filter(RecordId::is_valid)
    }

    pub fn cached_heights(&self) -> usize {
        self.heights.len()
    }
}

fn synthetic_row_height(row: &RowDescriptor, metrics: &ListMetrics) -> f32 {
    match row {
        RowDescriptor::Header => metrics.header_height,
        RowDescriptor::TagSuggestions(count) => {
            metrics.tag_suggestion_height * (*count).min(metrics.max_visible_tag_suggestions) as f32
        }
        RowDescriptor::EmptyPlaceholder | RowDescriptor::Record(_) => metrics.base_height(),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::keyboard::{Key, Modifiers};

    fn notes(ids: &[&str]) -> Vec<Record> {
        ids.iter()
            .map(|id| Record::new(*id, format!("{id}\n{}", "body text ".repeat(30))))
            .collect()
    }

    fn update<'a>(records: &'a [Record], query: &'a str, suggestions: usize) -> FilteredUpdate<'a> {
        FilteredUpdate {
            records,
            query,
            tag_suggestions: suggestions,
            selected_id: None,
            selection_hint: None,
        }
    }

    fn sized_view(now: Instant) -> ListView {
        let mut view = ListView::from_settings(&Settings::default());
        view.resize(400.0, 300.0, now);
        view.tick(now + Duration::from_secs(1));
        view
    }

    #[test]
    fn highlight_accounts_for_synthetic_rows() {
        let now = Instant::now();
        let mut view = sized_view(now);
        let records = notes(&["a", "b"]);
        let request = view.apply_filtered(update(&records, "b", 2));

        assert_eq!(request, Some(RecordId::new("a")));
        assert_eq!(view.highlighted_row(), Some(2));
        assert_eq!(view.highlighted_record().map(|r| r.id.as_str()), Some("a"));
    }

    #[test]
    fn layout_stacks_rows() {
        let now = Instant::now();
        let mut view = sized_view(now);
        let records = notes(&["a", "b"]);
        view.apply_filtered(update(&records, "x", 1));

        let metrics = ListMetrics::default();
        let boxes = view.layout();
        assert_eq!(boxes.len(), 4);
        assert_eq!(boxes[0].height, metrics.tag_suggestion_height);
        assert_eq!(boxes[1].top, metrics.tag_suggestion_height);
        assert_eq!(boxes[2].top, boxes[1].top + metrics.header_height);
        assert_eq!(boxes[3].key, "note:b");
        assert_eq!(view.total_height(), boxes[3].top + boxes[3].height);
    }

    #[test]
    fn resize_waits_for_debounce() {
        let now = Instant::now();
        let mut view = sized_view(now);
        let records = notes(&["a"]);
        view.apply_filtered(update(&records, "", 0));
        view.set_display_mode(DisplayMode::Condensed, now);
        let before = view.row_height(0);

        assert!(!view.tick(now + Duration::from_millis(10)));
        assert_eq!(view.row_height(0), before);
        assert!(view.tick(now + Duration::from_millis(60)));
        assert_eq!(view.row_height(0), Some(ListMetrics::default().base_height()));
    }

    #[test]
    fn visible_rows_follow_scroll() {
        let now = Instant::now();
        let mut view = ListView::from_settings(&Settings::default());
        view.resize(400.0, 100.0, now);
        view.set_display_mode(DisplayMode::Condensed, now);
        view.tick(now + Duration::from_secs(1));
        let records = notes(&["a", "b", "c", "d", "e", "f"]);
        view.apply_filtered(update(&records, "", 0));

        // condensed rows are 42px tall
        assert_eq!(view.visible_rows(0.0), 0..3);
        assert_eq!(view.visible_rows(84.0), 2..5);
        assert_eq!(view.visible_rows(10_000.0), 6..6);
    }

    #[test]
    fn keyboard_moves_through_records() {
        let now = Instant::now();
        let mut view = sized_view(now);
        let records = notes(&["a", "b"]);
        view.apply_filtered(update(&records, "", 0));

        let chord = KeyChord::new(
            Key::ArrowDown,
            Modifiers {
                meta: true,
                shift: true,
                ..Modifiers::default()
            },
        );
        assert_eq!(
            view.handle_key(&chord),
            KeyOutcome::Handled {
                select: RecordId::new("b")
            }
        );
    }

    #[test]
    fn scroll_into_view_reveals_highlight() {
        let now = Instant::now();
        let mut view = ListView::from_settings(&Settings::default());
        view.resize(400.0, 100.0, now);
        view.set_display_mode(DisplayMode::Condensed, now);
        view.tick(now + Duration::from_secs(1));
        let records = notes(&["a", "b", "c", "d", "e"]);
        let d = RecordId::new("d");
        view.apply_filtered(FilteredUpdate {
            selected_id: Some(&d),
            ..update(&records, "", 0)
        });

        assert_eq!(view.highlighted_row(), Some(3));
        assert_eq!(view.scroll_into_view(0.0), 4.0 * 42.0 - 100.0);
        assert_eq!(view.scroll_into_view(200.0), 126.0);
    }

    #[test]
    fn empty_result_has_no_pin_target() {
        let mut view = ListView::from_settings(&Settings::default());
        view.apply_filtered(update(&[], "abc", 2));
        assert_eq!(view.pin_target(), None);
        assert_eq!(view.row_count(), 3);
    }
}
