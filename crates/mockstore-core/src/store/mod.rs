// ── Reactive entity store ──
//
// In-memory entity storage with push-based change notification.

mod collection;
mod dynamic;
mod entity_store;
mod listener;
mod ops;
mod sequence;

#[cfg(test)]
mod tests;

pub use collection::{EntityCollection, Snapshot};
pub use entity_store::{EntityStore, InitOutcome, StoreLifecycle};
pub use listener::{ListenerId, StoreChange};
pub use ops::{OpOutcome, StoreOp};
