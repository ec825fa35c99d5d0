use std::collections::HashMap;

use siftcore_config::{DisplayMode, ListMetrics};
use siftcore_index::{Record, RecordId};

use crate::preview::note_preview;

/// Rendered width of a single line of preview text at the list font.
pub trait TextMeasurer {
    fn text_width(&self, text: &str) -> f32;
}

#[derive(Debug, Clone, Copy)]
pub struct MonospaceMeasurer {
    glyph_width: f32,
}

impl MonospaceMeasurer {
    pub fn new(glyph_width: f32) -> Self {
        Self { glyph_width }
    }
}

impl TextMeasurer for MonospaceMeasurer {
    fn text_width(&self, text: &str) -> f32 {
        text.chars().count() as f32 * self.glyph_width
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    width: f32,
    mode: DisplayMode,
    /// Note text the preview was derived from.
    text: String,
    preview: String,
    height: f32,
}

/// Memoized row heights keyed by record id.
///
/// An entry only counts as a hit while width, display mode and preview text
/// are all unchanged. Entries are never evicted.
pub struct HeightCache<M = MonospaceMeasurer> {
    measurer: M,
    metrics: ListMetrics,
    entries: HashMap<RecordId, CacheEntry>,
}

impl HeightCache<MonospaceMeasurer> {
    pub fn monospace(metrics: ListMetrics) -> Self {
        let measurer = MonospaceMeasurer::new(metrics.glyph_width);
        Self::new(measurer, metrics)
    }
}

impl<M: TextMeasurer> HeightCache<M> {
    pub fn new(measurer: M, metrics: ListMetrics) -> Self {
        Self {
            measurer,
            metrics,
            entries: HashMap::new(),
        }
    }

    pub fn measurer(&self) -> &M {
        &self.measurer
    }

    pub fn metrics(&self) -> &ListMetrics {
        &self.metrics
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn height_for(&mut self, record: &Record, width: f32, mode: DisplayMode) -> f32 {
        let width = if width.is_finite() { width } else { 0.0 };
        let text = &record.content.text;
        let mut derived = None;

        if let Some(entry) = self.entries.get_mut(&record.id) {
            if entry.width == width && entry.mode == mode {
                if entry.text == *text {
                    return entry.height;
                }
                // edited text can still yield the same preview
                let preview = note_preview(text).body;
                if entry.preview == preview {
                    entry.text.clone_from(text);
                    return entry.height;
                }
                derived = Some(preview);
            }
        }

        let preview = derived.unwrap_or_else(|| note_preview(text).body);
        let height = self.compute_height(&preview, width, mode);
        self.entries.insert(
            record.id.clone(),
            CacheEntry {
                width,
                mode,
                text: text.clone(),
                preview,
                height,
            },
        );
        height
    }

    fn compute_height(&self, preview: &str, width: f32, mode: DisplayMode) -> f32 {
        let base = self.metrics.base_height();
        if mode == DisplayMode::Condensed || preview.is_empty() {
            return base;
        }

        let usable = width - self.metrics.horizontal_padding;
        let text_width = self.measurer.text_width(preview);
        let lines = estimate_lines(text_width, usable).min(mode.max_preview_lines());
        base + self.metrics.line_height * lines as f32
    }
}

/// Wrapped line count for `text_width` laid out in `usable_width`.
/// Non-positive or non-finite inputs produce zero lines.
pub fn estimate_lines(text_width: f32, usable_width: f32) -> u32 {
    if !(usable_width.is_finite() && usable_width > 0.0) {
        return 0;
    }
    if !(text_width.is_finite() && text_width > 0.0) {
        return 0;
    }

    (text_width / usable_width).ceil().min(u32::MAX as f32) as u32
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use rstest::rstest;

    use super::*;

    struct CountingMeasurer {
        calls: Cell<usize>,
    }

    impl TextMeasurer for CountingMeasurer {
        fn text_width(&self, text: &str) -> f32 {
            self.calls.set(self.calls.get() + 1);
            text.chars().count() as f32 * 10.0
        }
    }

    fn counting_cache() -> HeightCache<CountingMeasurer> {
        HeightCache::new(
            CountingMeasurer {
                calls: Cell::new(0),
            },
            ListMetrics::default(),
        )
    }

    fn long_note(id: &str) -> Record {
        Record::new(id, format!("Title\n{}", "lorem ipsum ".repeat(40)))
    }

    #[rstest]
    #[case(0.0)]
    #[case(-250.0)]
    #[case(f32::NAN)]
    #[case(f32::NEG_INFINITY)]
    #[case(10.0)]
    fn non_positive_usable_width_yields_base_height(#[case] width: f32) {
        let mut cache = counting_cache();
        let height = cache.height_for(&long_note("a"), width, DisplayMode::Expanded);
        assert!(height.is_finite());
        assert_eq!(height, ListMetrics::default().base_height());
    }

    #[test]
    fn repeated_lookup_measures_once() {
        let mut cache = counting_cache();
        let note = long_note("a");
        let first = cache.height_for(&note, 400.0, DisplayMode::Comfy);
        let second = cache.height_for(&note, 400.0, DisplayMode::Comfy);

        assert_eq!(first, second);
        assert_eq!(cache.measurer().calls.get(), 1);
    }

    #[test]
    fn width_mode_or_preview_change_is_a_miss() {
        let mut cache = counting_cache();
        let mut note = long_note("a");
        cache.height_for(&note, 400.0, DisplayMode::Comfy);
        cache.height_for(&note, 401.0, DisplayMode::Comfy);
        cache.height_for(&note, 401.0, DisplayMode::Expanded);
        note.content.text = "Title\nsomething else entirely".into();
        cache.height_for(&note, 401.0, DisplayMode::Expanded);

        assert_eq!(cache.measurer().calls.get(), 4);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn edit_outside_the_preview_is_still_a_hit() {
        let mut cache = counting_cache();
        let mut note = long_note("a");
        let first = cache.height_for(&note, 400.0, DisplayMode::Expanded);

        // the preview is capped, so text past the cap never reaches it
        note.content.text.push_str(" trailing words");
        let second = cache.height_for(&note, 400.0, DisplayMode::Expanded);
        let third = cache.height_for(&note, 400.0, DisplayMode::Expanded);

        assert_eq!(first, second);
        assert_eq!(second, third);
        assert_eq!(cache.measurer().calls.get(), 1);
    }

    #[test]
    fn condensed_mode_skips_measurement() {
        let mut cache = counting_cache();
        let height = cache.height_for(&long_note("a"), 400.0, DisplayMode::Condensed);
        assert_eq!(height, ListMetrics::default().base_height());
        assert_eq!(cache.measurer().calls.get(), 0);
    }

    #[test]
    fn lines_are_clamped_per_mode() {
        let metrics = ListMetrics::default();
        let mut cache = counting_cache();
        let note = long_note("a");

        let comfy = cache.height_for(&note, 400.0, DisplayMode::Comfy);
        let expanded = cache.height_for(&note, 400.0, DisplayMode::Expanded);

        assert_eq!(comfy, metrics.base_height() + metrics.line_height);
        assert_eq!(expanded, metrics.base_height() + metrics.line_height * 4.0);
    }

    #[test]
    fn short_preview_uses_its_own_line_count() {
        let metrics = ListMetrics::default();
        let mut cache = counting_cache();
        let note = Record::new("a", "Title\nshort");
        let height = cache.height_for(&note, 400.0, DisplayMode::Expanded);
        assert_eq!(height, metrics.base_height() + metrics.line_height);
    }

    #[test]
    fn empty_preview_is_base_height() {
        let mut cache = counting_cache();
        let height = cache.height_for(&Record::new("a", ""), 400.0, DisplayMode::Expanded);
        assert_eq!(height, ListMetrics::default().base_height());
    }

    #[test]
    fn estimate_lines_rounds_up() {
        assert_eq!(estimate_lines(100.0, 40.0), 3);
        assert_eq!(estimate_lines(80.0, 40.0), 2);
        assert_eq!(estimate_lines(80.0, -1.0), 0);
    }
}
