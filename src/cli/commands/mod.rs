pub mod annotate;
pub mod collect;
mod command_result;
pub mod init;
pub mod stats;
pub mod transfer;
pub mod wrap;

pub use command_result::*;
