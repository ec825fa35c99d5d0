use siftcore_index::RecordId;

use crate::composite::RowDescriptor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowUp,
    ArrowDown,
    Character(char),
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
    pub alt: bool,
}

impl Modifiers {
    /// Ctrl on Linux/Windows, Cmd on macOS. Either one counts.
    pub fn platform(&self) -> bool {
        self.ctrl || self.meta
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyChord {
    pub key: Key,
    pub modifiers: Modifiers,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavDirection {
    Next,
    Previous,
}

impl KeyChord {
    pub fn new(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    /// Platform modifier + Shift + Up/Down or J/K moves the selection.
    pub fn navigation(&self) -> Option<NavDirection> {
        let m = self.modifiers;
        if !(m.platform() && m.shift) || m.alt {
            return None;
        }

        match self.key {
            Key::ArrowDown => Some(NavDirection::Next),
            Key::ArrowUp => Some(NavDirection::Previous),
            Key::Character(c) => match c.to_ascii_lowercase() {
                'j' => Some(NavDirection::Next),
                'k' => Some(NavDirection::Previous),
                _ => None,
            },
            Key::Other => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Selection moved; the input event must not propagate or run its
    /// default action.
    Handled { select: RecordId },
    /// Leave the input event untouched.
    Ignored,
}

impl KeyOutcome {
    pub fn is_handled(&self) -> bool {
        matches!(self, Self::Handled { .. })
    }

    pub fn stop_propagation(&self) -> bool {
        self.is_handled()
    }

    pub fn prevent_default(&self) -> bool {
        self.is_handled()
    }
}

/// The record id one row away from `highlighted_row`, if that row is a real
/// record.
pub fn neighbor(
    rows: &[RowDescriptor],
    highlighted_row: Option<usize>,
    direction: NavDirection,
) -> Option<RecordId> {
    let current = highlighted_row?;
    let target = match direction {
        NavDirection::Next => current.checked_add(1)?,
        NavDirection::Previous => current.checked_sub(1)?,
    };
    rows.get(target)?.record_id().cloned()
}

pub fn handle_key(
    chord: &KeyChord,
    rows: &[RowDescriptor],
    highlighted_row: Option<usize>,
) -> KeyOutcome {
    let Some(direction) = chord.navigation() else {
        return KeyOutcome::Ignored;
    };

    match neighbor(rows, highlighted_row, direction) {
        Some(select) => KeyOutcome::Handled { select },
        None => KeyOutcome::Ignored,
    }
}
