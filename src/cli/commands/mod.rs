//! CLI command implementations
//!
//! Each command exposes `execute`, returning the process exit code.

pub mod chat;
pub mod diagnose;
pub mod init;
pub mod patient;
pub mod validate;
