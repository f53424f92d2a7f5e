//! Workout domain model and the offline-first local store shared by server and client.

pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod merge;
pub mod models;
pub mod sync;
pub mod timer;

mod memory;
pub use memory::MemoryStore;

#[cfg(not(target_arch = "wasm32"))]
mod file_store;
#[cfg(not(target_arch = "wasm32"))]
pub use file_store::FileStore;

#[cfg(all(target_arch = "wasm32", feature = "web"))]
mod idb;
#[cfg(all(target_arch = "wasm32", feature = "web"))]
pub use idb::IdbStore;

pub use cache::{KeyValueStore, LocalCache};
pub use config::{TrackerConfig, WeightUnit};
pub use error::StoreError;
pub use models::{Exercise, ExerciseName, HistoryEntry, WorkoutDay, WorkoutSet};
pub use sync::{PendingChanges, SyncEngine, SyncRemote, SyncReport};
pub use timer::RestTimer;
