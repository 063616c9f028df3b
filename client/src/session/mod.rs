pub mod context;
mod handlers;
pub mod phase;
pub mod phases;
#[allow(clippy::module_inception)]
pub mod session;
pub mod session_config;
pub mod signals;
pub mod top_level;
