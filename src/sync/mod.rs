//! Catalog synchronization: staleness policy, observable state and the
//! stale-while-revalidate orchestrator.

mod clock;
mod orchestrator;
pub mod policy;
mod state;

pub use clock::{Clock, ManualClock, SystemClock};
pub use orchestrator::{CatalogSync, SyncOptions};
pub use policy::{default_ttl, is_stale};
pub use state::{ListState, SyncPhase, SyncState};
