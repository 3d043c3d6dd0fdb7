// marginalia-daemon library: session state, persistence and the local HTTP API.

pub mod api;
pub mod config;
pub mod persist;
pub mod review;
pub mod runtime;
pub mod session;
pub mod startup;
pub mod store;
pub mod watcher;
