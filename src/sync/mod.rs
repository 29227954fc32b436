//! The synchronization core: loaders, the reconciliation controller and
//! the unsaved-changes guard.

pub mod controller;
pub mod guard;
pub mod loader;

pub use controller::{ChecklistController, LoadTicket, NavOutcome, SyncError};
pub use guard::{GuardState, NavIntent, Resolution};
pub use loader::{LoadEvent, OptionsLoad, TemplatesLoad, load_blocking, spawn_load};
