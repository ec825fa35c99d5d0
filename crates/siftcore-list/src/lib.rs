//! List projection for filtered notes: row sequence, memoized row heights,
//! selection that survives list changes, and keyboard navigation.

pub mod composite;
pub mod debounce;
pub mod height;
pub mod keyboard;
pub mod preview;
pub mod selection;
pub mod view;

pub use composite::{project, CompositeList, RowDescriptor};
pub use debounce::Debounce;
pub use height::{estimate_lines, HeightCache, MonospaceMeasurer, TextMeasurer};
pub use keyboard::{handle_key, Key, KeyChord, KeyOutcome, Modifiers, NavDirection};
pub use preview::{note_preview, NotePreview};
pub use selection::{resolve_highlighted, Resolution, SelectionState, SelectionTracker};
pub use view::{FilteredUpdate, ListView, RowBox};
