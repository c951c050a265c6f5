pub use arc_shared::{ArcShared, WeakShared};
pub use spin_sync_mutex::SpinSyncMutex;

/// Shared handle backed by `Arc` plus its non-owning companion.
mod arc_shared;
/// Spinlock-protected mutable cell.
mod spin_sync_mutex;
