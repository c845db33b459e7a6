//! Command implementations for nx-vite
//!
//! Each command module turns its CLI arguments into generator options and
//! hands the generator to the host.

pub mod init;
pub mod vitest;
