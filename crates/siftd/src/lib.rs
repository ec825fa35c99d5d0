//! Filter session wiring: the state store boundary, the index coordinator
//! that keeps the background indexer in step with it, and the session that
//! drives the list view from both.

pub mod coordinator;
pub mod session;
pub mod store;

pub use coordinator::{AppEvent, IndexCoordinator};
pub use session::{drive, FilterSession};
pub use store::{
    reduce, Action, AppState, ContainerSize, Listener, MemoryStore, StateStore, SubscriptionId,
};
