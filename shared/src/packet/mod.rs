pub mod command;
pub mod error;
pub mod header;
pub mod packet;
pub mod payloads;
