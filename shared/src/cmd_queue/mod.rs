pub mod callbacks;
#[allow(clippy::module_inception)]
pub mod cmd_queue;
pub mod command_list;
pub mod config;
pub mod error;
pub mod send_entry;
pub mod stats;
