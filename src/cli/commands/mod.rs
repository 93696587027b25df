//! Command implementations

pub mod check;
pub mod completions;
pub mod init;
pub mod proc;
pub mod status;
pub mod step;
