mod matcher;
mod suggest;
mod worker;

pub use matcher::{contains_case_insensitive, filter_ids, record_matches, Matcher, ParsedQuery};
pub use suggest::tag_suggestions;
pub use worker::{spawn_indexer, IndexerHandle};
