pub mod checklist;
pub mod config;
pub mod options;
pub mod task;

pub use checklist::*;
pub use config::*;
pub use options::*;
pub use task::*;
