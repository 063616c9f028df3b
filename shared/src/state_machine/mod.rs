pub mod definition;
pub mod error;
pub mod flags;
pub mod machine;
