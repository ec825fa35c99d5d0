use siftcore_index::{FilterContext, NoteContent, Record, RecordId};

const TAG_PREFIX: &str = "tag:";

/// A query split into lowercase terms. `tag:` terms only look at tag names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedQuery {
    pub terms: Vec<String>,
    pub tag_prefixes: Vec<String>,
}

impl ParsedQuery {
    pub fn parse(query: &str) -> Self {
        let mut parsed = Self::default();
        for token in query.split_whitespace() {
            let lower = token.to_lowercase();
            if let Some(prefix) = lower.strip_prefix(TAG_PREFIX) {
                if !prefix.is_empty() {
                    parsed.tag_prefixes.push(prefix.to_string());
                }
                continue;
            }
            parsed.terms.push(lower);
        }
        parsed
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty() && self.tag_prefixes.is_empty()
    }

    pub fn matches(&self, content: &NoteContent) -> bool {
        let tags_ok = self.tag_prefixes.iter().all(|prefix| {
            content
                .tags
                .iter()
                .any(|tag| tag.to_lowercase().starts_with(prefix.as_str()))
        });
        if !tags_ok {
            return false;
        }

        self.terms.iter().all(|term| {
            contains_case_insensitive(&content.text, term)
                || content
                    .tags
                    .iter()
                    .any(|tag| contains_case_insensitive(tag, term))
        })
    }
}

/// Compiled form of a [`FilterContext`], reused across a whole corpus pass.
#[derive(Debug, Clone)]
pub struct Matcher {
    query: ParsedQuery,
    tag: Option<String>,
    show_trash: bool,
}

impl Matcher {
    pub fn new(ctx: &FilterContext) -> Self {
        Self {
            query: ParsedQuery::parse(&ctx.query),
            tag: ctx.tag.clone(),
            show_trash: ctx.show_trash,
        }
    }

    pub fn matches(&self, content: &NoteContent) -> bool {
        if content.trashed != self.show_trash {
            return false;
        }

        if let Some(tag) = &self.tag {
            if !content.has_tag(tag) {
                return false;
            }
        }

        self.query.is_empty() || self.query.matches(content)
    }
}

pub fn record_matches(record: &Record, ctx: &FilterContext) -> bool {
    Matcher::new(ctx).matches(&record.content)
}

/// Ids of the matching records, in the order the records were given.
pub fn filter_ids(records: &[Record], ctx: &FilterContext) -> Vec<RecordId> {
    let matcher = Matcher::new(ctx);
    records
        .iter()
        .filter(|record| matcher.matches(&record.content))
        .map(|record| record.id.clone())
        .collect()
}

pub fn contains_case_insensitive(haystack: &str, needle_lower: &str) -> bool {
    if needle_lower.is_empty() {
        return true;
    }

    if needle_lower.is_ascii() {
        return contains_ascii_case_insensitive(haystack, needle_lower);
    }

    haystack.to_lowercase().contains(needle_lower)
}

fn contains_ascii_case_insensitive(haystack: &str, needle_lower_ascii: &str) -> bool {
    let h = haystack.as_bytes();
    let n = needle_lower_ascii.as_bytes();
    if n.len() > h.len() {
        return false;
    }

    if n.len() == 1 {
        let b = n[0];
        return h.iter().any(|ch| ch.to_ascii_lowercase() == b);
    }

    let first = n[0];
    for start in 0..=h.len() - n.len() {
        if h[start].to_ascii_lowercase() != first {
            continue;
        }

        if h[start + 1..start + n.len()]
            .iter()
            .zip(&n[1..])
            .all(|(hc, nc)| hc.to_ascii_lowercase() == *nc)
        {
            return true;
        }
    }

    false
}
