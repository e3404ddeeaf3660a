pub mod reconciler;
pub mod snapshot;

pub use reconciler::{Reconciler, RestoreFailure, SyncMode, SyncOutcome};
pub use snapshot::{CurationSnapshot, PreservedCuration};
