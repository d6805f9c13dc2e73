#![forbid(unsafe_code)]

pub use command::Command;
pub use error::Error;

pub mod command;
pub mod error;
