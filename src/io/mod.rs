pub mod config_io;
pub mod file_service;
pub mod http_service;
pub mod service;
pub mod watcher;
