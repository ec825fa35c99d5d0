pub const PREVIEW_CHAR_LIMIT: usize = 300;
pub const UNTITLED: &str = "New Note…";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NotePreview {
    pub title: String,
    pub body: String,
}

impl NotePreview {
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            UNTITLED
        } else {
            &self.title
        }
    }
}

/// Splits note text into a title (first non-blank line) and a single-line
/// body excerpt with whitespace collapsed.
pub fn note_preview(text: &str) -> NotePreview {
    let mut lines = text.lines();
    let title = lines
        .by_ref()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or_default()
        .to_string();

    let mut body = String::new();
    let mut count = 0usize;
    'outer: for line in lines {
        for word in line.split_whitespace() {
            if !body.is_empty() {
                if count >= PREVIEW_CHAR_LIMIT {
                    break 'outer;
                }
                body.push(' ');
                count += 1;
            }
            for ch in word.chars() {
                if count >= PREVIEW_CHAR_LIMIT {
                    break 'outer;
                }
                body.push(ch);
                count += 1;
            }
        }
    }

    NotePreview {
        title,
        body: body.trim_end().to_string(),
    }
}
