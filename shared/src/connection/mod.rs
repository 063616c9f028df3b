pub mod error;
pub mod io;
pub mod link_config;
